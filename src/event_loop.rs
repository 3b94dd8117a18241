use std::path::Path;
use std::time::Instant;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use rayon::prelude::*;

use crate::config::RunConfig;
use crate::error::AnalysisResult;
use crate::event::EventSource;
use crate::event::chain::EventChain;
use crate::histoer::configs::photon_control_plots;
use crate::histoer::histogrammer::Histogrammer;
use crate::output::open_sink;
use crate::pipeline::{EventOutcome, EventSelection, SelectionPipeline};

/// Event counts of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunSummary {
    pub events: usize,
    pub triggered: usize,
    pub selected_events: usize,
    pub selected_photons: usize,
    pub weight: f64,
}

impl RunSummary {
    pub fn record(&mut self, selection: &EventSelection) {
        self.events += 1;
        match selection.outcome {
            EventOutcome::Rejected => {}
            EventOutcome::NoSelection => self.triggered += 1,
            EventOutcome::Selected => {
                self.triggered += 1;
                self.selected_events += 1;
                self.selected_photons += selection.selected.len();
            }
        }
    }

    pub fn merge(&mut self, other: &RunSummary) {
        self.events += other.events;
        self.triggered += other.triggered;
        self.selected_events += other.selected_events;
        self.selected_photons += other.selected_photons;
    }
}

fn progress_bar(total: usize, show: bool) -> ProgressBar {
    if !show {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::with_draw_target(Some(total as u64), ProgressDrawTarget::stderr());
    if let Ok(style) = ProgressStyle::with_template(
        "Scanning the events {wide_bar} {percent:>3}% [{elapsed_precise}] {pos}/{len}",
    ) {
        bar.set_style(style);
    }
    bar
}

/// Runs the selection over every event of `source`, one after the other.
pub fn run_sequential<S: EventSource>(
    source: &S,
    pipeline: &SelectionPipeline,
    histos: &mut Histogrammer,
    weight: f64,
    show_progress: bool,
) -> AnalysisResult<RunSummary> {
    let total = source.len();
    let bar = progress_bar(total, show_progress);
    let mut summary = RunSummary {
        weight,
        ..RunSummary::default()
    };

    // redraw about 50 times over the run
    let step = (total / 50).max(1);
    for index in 0..total {
        let event = source.event(index)?;
        let selection = pipeline.process(&event, histos, weight);
        summary.record(&selection);
        if index % step == 0 {
            bar.set_position(index as u64);
        }
    }
    bar.finish();

    Ok(summary)
}

/// Same result as [`run_sequential`], with the events spread over a local
/// pool of `threads` workers. Each worker fills its own empty copy of
/// `histos`; the copies are merged back at the end.
pub fn run_parallel<S>(
    source: &S,
    pipeline: &SelectionPipeline,
    histos: &mut Histogrammer,
    weight: f64,
    threads: usize,
    show_progress: bool,
) -> AnalysisResult<RunSummary>
where
    S: EventSource + Sync,
{
    let total = source.len();
    let bar = progress_bar(total, show_progress);
    let template = histos.empty_clone();
    let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;

    let (partial, mut summary) = pool.install(|| {
        (0..total)
            .into_par_iter()
            .try_fold(
                || (template.clone(), RunSummary::default()),
                |(mut local, mut summary), index| {
                    let event = source.event(index)?;
                    let selection = pipeline.process(&event, &mut local, weight);
                    summary.record(&selection);
                    bar.inc(1);
                    AnalysisResult::Ok((local, summary))
                },
            )
            .try_reduce(
                || (template.clone(), RunSummary::default()),
                |(mut left, mut left_summary), (right, right_summary)| {
                    left.merge(right)?;
                    left_summary.merge(&right_summary);
                    Ok((left, left_summary))
                },
            )
    })?;
    bar.finish();

    histos.merge(partial)?;
    summary.weight = weight;
    Ok(summary)
}

/// Full run: open the inputs, book the control plots, loop over the events
/// and write the histograms to `config.output`.
pub fn run_analysis(config: &RunConfig) -> AnalysisResult<RunSummary> {
    let start = Instant::now();

    let mut histos = Histogrammer::from_configs(&photon_control_plots())?;
    let pipeline = SelectionPipeline::from_config(config)?;
    let source = EventChain::open(&config.input)?;

    let total = source.len();
    let xsec_weight = config.xsec_weight(total);
    log::debug!("xsec = {}", config.xsec);
    log::debug!("xsec weight = {xsec_weight}");
    log::debug!("mctruthmode = {}", config.mctruthmode);
    let weight = config.event_weight(total);

    let show_progress = !config.debug;
    let summary = if config.threads > 1 {
        log::info!("Processing {total} events on {} threads", config.threads);
        run_parallel(&source, &pipeline, &mut histos, weight, config.threads, show_progress)?
    } else {
        log::info!("Processing {total} events");
        run_sequential(&source, &pipeline, &mut histos, weight, show_progress)?
    };

    log::info!(
        "{} events: {} triggered, {} selected with {} photons ({:.2?})",
        summary.events,
        summary.triggered,
        summary.selected_events,
        summary.selected_photons,
        start.elapsed()
    );

    let mut sink = open_sink(Path::new(&config.output))?;
    histos.write(sink.as_mut())?;
    log::info!("Results saved in {}", config.output);

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::objects::{Photon, TriggerPath, TriggerResults};
    use crate::event::{EventRecord, Product};
    use crate::histoer::histogrammer::ALL_TAG;
    use crate::pipeline::SELECTED_TAG;
    use std::io::Write;

    const MENU_CONFIG: &str = r#"
run_process:
  debug: true
  is_mc: false
  xsec: 1.0
  mctruthmode: 0
  input: ["unused.jsonl"]
  output: "unused.json"
"#;

    // JSON lines in `dir`, chained back
    fn synthetic_events(dir: &Path, count: usize) -> EventChain {
        let path = dir.join("events.jsonl");
        let mut file = std::fs::File::create(&path).expect("create events");
        for i in 0..count {
            let fired = i % 3 != 0;
            let photon = Photon {
                pt: 100.0 + 10.0 * i as f64,
                eta: if i % 4 == 0 { 2.0 } else { 0.3 },
                hadronic_over_em: 0.001,
                sigma_ieta_ieta: 0.008,
                ..Photon::default()
            };
            let record = EventRecord {
                event: i as u64,
                ..EventRecord::default()
            }
            .with_trigger(TriggerResults::new(
                "HLT",
                vec![TriggerPath::new("HLT_Photon90_R9Id90_HE10_Iso40_EBOnly_v2", fired)],
            ))
            .with_product("fixedGridRhoFastjetAll", Product::Scalar(i as f64 % 20.0))
            .with_product("slimmedPhotons", Product::Photons(vec![photon]));

            let line = serde_json::to_string(&record).expect("serialize");
            writeln!(file, "{line}").expect("write event");
        }
        EventChain::open(&[path]).expect("open events")
    }

    fn pipeline() -> SelectionPipeline {
        let config = RunConfig::from_yaml(MENU_CONFIG).expect("config");
        SelectionPipeline::from_config(&config).expect("pipeline")
    }

    #[test]
    fn summary_counts_outcomes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = synthetic_events(dir.path(), 12);
        let mut histos = Histogrammer::from_configs(&photon_control_plots()).expect("booking");
        let summary =
            run_sequential(&source, &pipeline(), &mut histos, 1.0, false).expect("run");

        assert_eq!(summary.events, 12);
        // i % 3 != 0
        assert_eq!(summary.triggered, 8);
        // triggered and not at eta 2.0: i in {1, 2, 5, 7, 10, 11}
        assert_eq!(summary.selected_events, 6);
        assert_eq!(summary.selected_photons, 6);
        assert_eq!(histos.get("rho", ALL_TAG).expect("rho").entries, 12);
        assert_eq!(histos.get("phopt", SELECTED_TAG).expect("sel").entries, 6);
    }

    #[test]
    fn parallel_run_matches_sequential() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = synthetic_events(dir.path(), 200);
        let pipeline = pipeline();

        let mut sequential = Histogrammer::from_configs(&photon_control_plots()).expect("booking");
        let seq_summary =
            run_sequential(&source, &pipeline, &mut sequential, 1.0, false).expect("run");

        let mut parallel = Histogrammer::from_configs(&photon_control_plots()).expect("booking");
        let par_summary =
            run_parallel(&source, &pipeline, &mut parallel, 1.0, 4, false).expect("run");

        assert_eq!(seq_summary, par_summary);
        for (tag, hist) in sequential.iter() {
            let other = parallel.get(&hist.name, tag).expect("same accumulators");
            assert_eq!(hist.entries, other.entries, "{} {tag}", hist.name);
            for (a, b) in hist.bins.iter().zip(&other.bins) {
                assert!((a.sum - b.sum).abs() < 1e-9, "{} {tag}", hist.name);
            }
        }
        assert_eq!(sequential.len(), parallel.len());
    }
}
