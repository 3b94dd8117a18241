#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use phojet::event::EventRecord;
use tempfile::TempDir;

/// The hand-made events of `fixtures/events.ron`.
pub fn fixture_events() -> Vec<EventRecord> {
    ron::from_str(include_str!("../fixtures/events.ron")).expect("parse event fixture")
}

pub struct TestRun {
    tmp: TempDir,
}

impl TestRun {
    pub fn new() -> Self {
        Self {
            tmp: TempDir::new().expect("create temp dir"),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.tmp.path().join(name)
    }

    /// Writes `events` as one JSON object per line.
    pub fn write_events(&self, name: &str, events: &[EventRecord]) -> PathBuf {
        let path = self.path(name);
        let mut file = fs::File::create(&path).expect("create events file");
        for event in events {
            let line = serde_json::to_string(event).expect("serialize event");
            writeln!(file, "{line}").expect("write event");
        }
        path
    }

    /// Writes a `run_process` document reading `inputs` and writing `output`.
    /// `extra` lines are appended inside the section.
    pub fn write_config(&self, inputs: &[PathBuf], output: &Path, extra: &str) -> PathBuf {
        let inputs: Vec<String> = inputs
            .iter()
            .map(|input| format!("{:?}", input.display().to_string()))
            .collect();
        let yaml = format!(
            "run_process:\n  debug: false\n  is_mc: false\n  xsec: 1.0\n  mctruthmode: 0\n  input: [{}]\n  output: {:?}\n{extra}",
            inputs.join(", "),
            output.display().to_string(),
        );
        let path = self.path("run_cfg.yaml");
        fs::write(&path, yaml).expect("write config");
        path
    }

    pub fn write_fixture_config(&self, output_name: &str, extra: &str) -> PathBuf {
        let events = self.write_events("events.jsonl", &fixture_events());
        self.write_config(&[events], &self.path(output_name), extra)
    }
}

pub fn cmd() -> Command {
    cargo_bin_cmd!("phojet")
}
