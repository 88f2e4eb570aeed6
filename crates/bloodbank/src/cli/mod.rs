//! Command-line interface for bloodbank.
//!
//! This module provides the CLI structure, the interactive menu and the text
//! rendering used by the `bloodbank` binary.

mod commands;
pub mod menu;
pub mod render;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, NotifyCommand, OutputFormat, RegisterDonorCommand, RegisterUserCommand,
    SearchCommand,
};

/// bloodbank - Register blood donors and reach them quickly
///
/// Keeps a registry of users and donors, searches donors by city and blood
/// group, and sends a WhatsApp message to a chosen donor. Run without a
/// command to open the interactive menu.
#[derive(Debug, Parser)]
#[command(name = "bloodbank")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute (defaults to the interactive menu)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Open the interactive menu
    Menu,

    /// Register a user
    RegisterUser(RegisterUserCommand),

    /// Register a blood donor
    RegisterDonor(RegisterDonorCommand),

    /// Search donors by city and blood group
    Search(SearchCommand),

    /// Send a WhatsApp message to a donor
    Notify(NotifyCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                2 => crate::logging::Verbosity::Debug,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::Verbosity;
    use crate::query::BloodGroupFilter;
    use crate::record::BloodGroup;
    use clap::CommandFactory;

    fn cli_with(verbose: u8, quiet: bool) -> Cli {
        Cli {
            config: None,
            verbose,
            quiet,
            command: None,
        }
    }

    #[test]
    fn test_cli_name() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "bloodbank");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(cli_with(3, true).verbosity(), Verbosity::Quiet);
        assert_eq!(cli_with(0, false).verbosity(), Verbosity::Normal);
        assert_eq!(cli_with(1, false).verbosity(), Verbosity::Verbose);
        assert_eq!(cli_with(2, false).verbosity(), Verbosity::Debug);
        assert_eq!(cli_with(5, false).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_parse_no_command() {
        let cli = Cli::try_parse_from(["bloodbank"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_parse_menu() {
        let cli = Cli::try_parse_from(["bloodbank", "menu"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Menu)));
    }

    #[test]
    fn test_parse_register_donor() {
        let args = [
            "bloodbank",
            "register-donor",
            "-n",
            "Asha",
            "-p",
            "+911234",
            "-b",
            "o-",
            "-a",
            "30",
            "--city",
            "Pune",
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        let Some(Command::RegisterDonor(cmd)) = cli.command else {
            panic!("expected register-donor");
        };
        assert_eq!(cmd.blood_group, Some(BloodGroup::ONegative));
        assert_eq!(cmd.age, 30);
        assert_eq!(cmd.city, "Pune");
    }

    #[test]
    fn test_parse_register_donor_rejects_age() {
        let args = ["bloodbank", "register-donor", "-a", "70"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_parse_register_user_defaults() {
        let cli = Cli::try_parse_from(["bloodbank", "register-user", "-n", "Ravi"]).unwrap();
        let Some(Command::RegisterUser(cmd)) = cli.command else {
            panic!("expected register-user");
        };
        assert_eq!(cmd.name, "Ravi");
        assert!(cmd.email.is_empty());
        assert_eq!(cmd.age, 1);
    }

    #[test]
    fn test_parse_search() {
        let args = ["bloodbank", "search", "--city", "pune", "-b", "AB+", "-f", "json"];
        let cli = Cli::try_parse_from(args).unwrap();
        let Some(Command::Search(cmd)) = cli.command else {
            panic!("expected search");
        };
        assert_eq!(cmd.city.as_deref(), Some("pune"));
        assert_eq!(
            cmd.blood_group,
            BloodGroupFilter::Only(BloodGroup::AbPositive)
        );
        assert_eq!(cmd.format, OutputFormat::Json);
    }

    #[test]
    fn test_parse_search_defaults() {
        let cli = Cli::try_parse_from(["bloodbank", "search"]).unwrap();
        let Some(Command::Search(cmd)) = cli.command else {
            panic!("expected search");
        };
        assert!(cmd.city.is_none());
        assert_eq!(cmd.blood_group, BloodGroupFilter::All);
        assert_eq!(cmd.format, OutputFormat::Table);
    }

    #[test]
    fn test_parse_notify() {
        let cli = Cli::try_parse_from(["bloodbank", "notify", "-t", "+911234"]).unwrap();
        let Some(Command::Notify(cmd)) = cli.command else {
            panic!("expected notify");
        };
        assert_eq!(cmd.to, "+911234");
        assert!(cmd.message.is_none());
    }

    #[test]
    fn test_parse_config_show() {
        let cli = Cli::try_parse_from(["bloodbank", "config", "show", "--json"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Config(ConfigCommand::Show { json: true }))
        ));
    }

    #[test]
    fn test_parse_with_config() {
        let args = ["bloodbank", "-c", "/custom/config.toml", "search"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_with_verbose_and_quiet() {
        let cli = Cli::try_parse_from(["bloodbank", "-vv", "search"]).unwrap();
        assert_eq!(cli.verbose, 2);

        let cli = Cli::try_parse_from(["bloodbank", "-q", "search"]).unwrap();
        assert!(cli.quiet);
    }
}
