use clap::Parser;
use steply_lookup::config::LookupConfig;
use steply_lookup::error::AppError;
use steply_lookup::interactive::run_interactive;
use steply_lookup::logging::{LogConfig, init_logging};
use steply_lookup::provider::RecordStore;
use steply_lookup::replay::{ReplayScript, run_replay};

mod cli;

use crate::cli::{Cli, Command, InteractiveArgs, ReplayArgs};

fn main() {
    let cli = Cli::parse();

    // Log lines would tear through the alternate screen.
    let wants_logging = !matches!(cli.command, Command::Interactive(_)) || cli.log_file.is_some();
    if wants_logging {
        let log_config = LogConfig::from_verbosity(cli.verbose)
            .with_format(cli.log_format)
            .with_log_file(cli.log_file.clone());
        if let Err(error) = init_logging(&log_config) {
            eprintln!("error: failed to initialize logging: {error}");
            std::process::exit(1);
        }
    }

    let exit_code = match run(&cli) {
        Ok(output) => {
            println!("{output}");
            0
        }
        Err(error) => {
            eprintln!("error: {error}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: &Cli) -> Result<String, AppError> {
    let config = match &cli.config {
        Some(path) => LookupConfig::load(path)?,
        None => LookupConfig::default(),
    };
    match &cli.command {
        Command::Replay(args) => replay(config, args),
        Command::Interactive(args) => interactive(config, args),
    }
}

fn replay(config: LookupConfig, args: &ReplayArgs) -> Result<String, AppError> {
    let store = RecordStore::load(&args.records)?;
    let script = ReplayScript::load(&args.script)?;
    let report = run_replay(&config, store, &script)?;
    Ok(serde_json::to_string_pretty(&report)?)
}

fn interactive(mut config: LookupConfig, args: &InteractiveArgs) -> Result<String, AppError> {
    if let Some(id) = &args.selected_id {
        config.selector = config.selector.with_selected_id(id.clone());
    }
    let store = RecordStore::load(&args.records)?;
    let outcome = run_interactive(&config, store)?;
    Ok(serde_json::to_string_pretty(&outcome)?)
}
