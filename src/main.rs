//! librespeed-cli - command line speed test client

use anyhow::Context;
use clap::Parser;
use librespeed_rs::{
    build_info,
    cli::Cli,
    config::{display_config_summary, validate_config, EnvManager, ConfigParser},
    error::{AppError, ErrorReporter},
    executor::cli_speed_test,
    logging::Logger,
    measurement::HttpServer,
    output::{csv_header, OutputCoordinator},
};
use std::io::{self, Write};
use std::process;

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        process::exit(AppError::internal("panic").exit_code());
    }));

    let cli = Cli::parse();
    let reporter = ErrorReporter::new(cli.use_colors(), cli.verbose || cli.debug);

    if let Err(e) = cli.validate() {
        let error = AppError::validation(e);
        reporter.report_error(&error);
        process::exit(error.exit_code());
    }

    if let Err(e) = run_application(cli).await {
        match e.downcast_ref::<AppError>() {
            Some(error) => {
                reporter.report_error(error);
                process::exit(error.exit_code());
            }
            None => {
                eprintln!("Error: {:#}", e);
                process::exit(1);
            }
        }
    }
}

async fn run_application(cli: Cli) -> anyhow::Result<()> {
    let stdout = io::stdout();

    if cli.env_help {
        print!("{}", EnvManager::display_env_help());
        return Ok(());
    }

    if cli.csv_header {
        let delimiter = u8::try_from(cli.csv_delimiter)
            .map_err(|_| AppError::config("CSV delimiter must be a single ASCII character"))?;
        print!("{}", csv_header(delimiter)?);
        return Ok(());
    }

    let list_only = cli.list;
    let debug = cli.debug;
    let config = ConfigParser::new(cli)
        .parse()
        .context("failed to load configuration")?;
    let options = &config.options;

    let logger = Logger::with_options("librespeed", options);
    if debug {
        logger.debug(&build_info()).log();
        logger
            .debug("Configuration loaded")
            .field("summary", display_config_summary(&config))
            .log();
    }

    if list_only {
        let coordinator = OutputCoordinator::from_options(options);
        let mut out = stdout.lock();
        write!(out, "{}", coordinator.server_list(&config.servers))?;
        return Ok(());
    }

    for warning in validate_config(options, &config.servers)? {
        logger.warn(&warning).log();
    }

    let servers = config
        .servers
        .iter()
        .cloned()
        .map(HttpServer::new)
        .collect::<Result<Vec<_>, _>>()?;

    let mut out = stdout.lock();
    cli_speed_test(&servers, options, &logger, &mut out).await?;
    Ok(())
}
