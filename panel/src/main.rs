//! Golden Path deployment panel - Entry Point

use std::env;

use goldpath::app::options::AppOptions;
use goldpath::app::run::{
    clear_credentials, deploy, list_templates, show_form, DeployArgs, DEFAULT_TEMPLATE,
};
use goldpath::logs::{init_logging, LogLevel};
use goldpath::storage::layout::StorageLayout;
use goldpath::storage::settings::Settings;
use goldpath::utils::{parse_cli_args, version_info};

use anyhow::Context;
use tracing::{error, info};

const USAGE: &str = "\
Usage: goldpath <command> [options]

Commands:
  --list                       Show available Golden Paths
  --form[=<template>]          Show the configuration options of a template
  --deploy                     Dispatch a deployment and monitor it
      --template=<id>          Template to deploy (default gp1)
      --owner=<owner>          Owner of the repository hosting the workflows
      --repo=<repo>            Repository hosting the workflows
      --repo-url=<url>         Application source repository on github.com
      --<field>=<value>        Template fields (see --form)
  --clear-credentials          Forget the stored token and repository
  --version                    Print version information

Options:
  --log-level=<level>          trace, debug, info, warn or error";

#[tokio::main]
async fn main() {
    let cli_args = parse_cli_args(env::args().skip(1));

    if cli_args.contains_key("version") {
        match serde_json::to_string_pretty(&version_info()) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("{}", e),
        }
        return;
    }

    if let Err(e) = run(cli_args).await {
        // logging may not be initialized yet
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli_args: std::collections::HashMap<String, String>) -> anyhow::Result<()> {
    let layout = StorageLayout::default();
    let settings = Settings::load_or_default(&layout.settings_file()).await?;

    let log_level = cli_args
        .get("log-level")
        .map(|l| l.parse::<LogLevel>())
        .transpose()
        .map_err(anyhow::Error::msg)?;
    let options = AppOptions::from_settings(layout, &settings).with_log_level(log_level);

    // keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = init_logging(options.log.clone()).context("Failed to initialize logging")?;

    if cli_args.contains_key("list") {
        list_templates(&options).await?;
    } else if let Some(template) = cli_args.get("form") {
        let template = if template.is_empty() { DEFAULT_TEMPLATE } else { template.as_str() };
        show_form(&options, template).await?;
    } else if cli_args.contains_key("clear-credentials") {
        clear_credentials(&options).await?;
    } else if cli_args.contains_key("deploy") {
        let args = DeployArgs::from_cli(&cli_args);
        let state = deploy(&options, args, await_shutdown_signal()).await?;
        let run_id = state.into_result(options.monitor.max_attempts)?;
        info!("Deployment finished with run {}", run_id);
    } else {
        println!("{}", USAGE);
    }

    Ok(())
}

async fn await_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(s) => s,
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };

        tokio::select! {
            _ = sigterm.recv() => {
                info!("SIGTERM received, stopping monitor...");
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl+C received, stopping monitor...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        info!("Ctrl+C received, stopping monitor...");
    }
}
