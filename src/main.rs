use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use phojet::{RunConfig, run_analysis};

#[derive(Parser, Debug)]
#[command(name = "phojet", version, about = "Photon + jet selection and control plots")]
struct Cli {
    /// YAML file with a `run_process` section
    config: Option<PathBuf>,
    #[arg(short, long, help = "Log at debug level")]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let Some(config_path) = cli.config else {
        let program = std::env::args()
            .next()
            .unwrap_or_else(|| "phojet".to_owned());
        println!("Usage : {program} parameters_cfg.yaml");
        return ExitCode::SUCCESS;
    };

    let config = match RunConfig::load(&config_path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Failed to read {}: {err}", config_path.display());
            return ExitCode::FAILURE;
        }
    };

    let level = if cli.verbose || config.debug {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run_analysis(&config) {
        Ok(_) => {
            println!("Results saved in {}", config.output);
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("Analysis failed: {err}");
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
