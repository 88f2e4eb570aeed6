//! `bloodbank` - CLI for the blood donor registry
//!
//! This binary opens the interactive menu by default and also exposes each
//! workflow as a one-shot subcommand.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use bloodbank::cli::{
    menu, render, Cli, Command, ConfigCommand, NotifyCommand, OutputFormat, SearchCommand,
};
use bloodbank::config::redact;
use bloodbank::workflow::{self, NO_DONOR_DATA};
use bloodbank::{init_logging, Config, NotificationGateway, RecordStore, Report};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    match cli.command.unwrap_or(Command::Menu) {
        Command::Menu => {
            let (config, store) = open(cli.config)?;
            let gateway = NotificationGateway::twilio(config.relay)
                .context("failed to set up the messaging relay")?;
            menu::run(&store, &gateway).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::RegisterUser(cmd) => {
            let (_, store) = open(cli.config)?;
            let report = workflow::register_user(&store, cmd.into())?;
            Ok(print_report(&report))
        }
        Command::RegisterDonor(cmd) => {
            let (_, store) = open(cli.config)?;
            let report = workflow::register_donor(&store, cmd.into())?;
            Ok(print_report(&report))
        }
        Command::Search(cmd) => {
            let (_, store) = open(cli.config)?;
            handle_search(&store, &cmd)
        }
        Command::Notify(cmd) => {
            let (config, _) = open(cli.config)?;
            handle_notify(config, &cmd).await
        }
        Command::Config(cmd) => handle_config(cli.config, cmd),
    }
}

fn open(config_path: Option<PathBuf>) -> anyhow::Result<(Config, RecordStore)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    let store = RecordStore::from_config(&config.storage);
    Ok((config, store))
}

fn print_report(report: &Report) -> ExitCode {
    println!("{}", render::report_line(report));
    if report.is_warning() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn handle_search(store: &RecordStore, cmd: &SearchCommand) -> anyhow::Result<ExitCode> {
    let Some(results) = workflow::search_donors(store, cmd.query())? else {
        if cmd.format == OutputFormat::Json {
            println!("[]");
        } else {
            println!("{NO_DONOR_DATA}");
        }
        return Ok(ExitCode::SUCCESS);
    };

    match cmd.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&results.matches)?);
        }
        OutputFormat::Plain => {
            println!("{}", render::report_line(&results.summary()));
            print!("{}", render::donor_lines(&results.matches));
        }
        OutputFormat::Table => {
            println!("{}", render::report_line(&results.summary()));
            print!("{}", render::donor_table(&results.matches));
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn handle_notify(config: Config, cmd: &NotifyCommand) -> anyhow::Result<ExitCode> {
    let gateway = NotificationGateway::twilio(config.relay)
        .context("failed to set up the messaging relay")?;
    let outcome = gateway.notify(&cmd.to, &cmd.message_text()).await;
    println!("{outcome}");
    if outcome.is_sent() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn handle_config(
    config_path: Option<PathBuf>,
    cmd: ConfigCommand,
) -> anyhow::Result<ExitCode> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = Config::load_from(config_path).context("failed to load configuration")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config.redacted_json())?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!(
                    "  Data directory:     {}",
                    config.storage.data_dir().display()
                );
                println!("  Users file:         {}", config.storage.users_file);
                println!("  Donors file:        {}", config.storage.donors_file);
                println!();
                println!("[Relay]");
                println!("  Account SID:        {}", config.relay.account_sid);
                println!("  Auth token:         {}", redact(&config.relay.auth_token));
                println!("  From address:       {}", config.relay.from_address);
                println!("  Channel:            {}", config.relay.channel);
                println!("  API base:           {}", config.relay.api_base);
                println!("  Configured:         {}", config.relay.is_configured());
            }
        }
        ConfigCommand::Path => {
            let path = config_path.unwrap_or_else(Config::default_config_path);
            println!("{}", path.display());
        }
        ConfigCommand::Validate { file } => {
            let path = file
                .or(config_path)
                .unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => {
                    println!("Configuration error: {e}");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
