//! CLI command definitions.
//!
//! This module defines the arguments of the one-shot subcommands. Each
//! form-like command converts into the matching workflow form.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::query::{BloodGroupFilter, DonorQuery};
use crate::record::BloodGroup;
use crate::workflow::{DonorForm, UserForm};

/// Register-user command arguments.
#[derive(Debug, Args)]
pub struct RegisterUserCommand {
    /// Name (required)
    #[arg(short, long, default_value = "")]
    pub name: String,

    /// Email (required)
    #[arg(short, long, default_value = "")]
    pub email: String,

    /// Age in years
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub age: u8,

    /// City or area
    #[arg(long, default_value = "")]
    pub city: String,
}

impl From<RegisterUserCommand> for UserForm {
    fn from(cmd: RegisterUserCommand) -> Self {
        Self {
            name: cmd.name,
            email: cmd.email,
            age: cmd.age,
            city: cmd.city,
        }
    }
}

/// Register-donor command arguments.
#[derive(Debug, Args)]
pub struct RegisterDonorCommand {
    /// Full name (required)
    #[arg(short, long, default_value = "")]
    pub name: String,

    /// WhatsApp phone number, e.g. +91XXXXXXXXXX (required)
    #[arg(short, long, default_value = "")]
    pub phone: String,

    /// Blood group: A+, A-, B+, B-, AB+, AB-, O+ or O- (required)
    #[arg(short, long, value_parser = parse_blood_group)]
    pub blood_group: Option<BloodGroup>,

    /// Age in years
    #[arg(short, long, default_value_t = 18, value_parser = clap::value_parser!(u8).range(18..=65))]
    pub age: u8,

    /// City or area (required)
    #[arg(long, default_value = "")]
    pub city: String,
}

impl From<RegisterDonorCommand> for DonorForm {
    fn from(cmd: RegisterDonorCommand) -> Self {
        Self {
            name: cmd.name,
            phone: cmd.phone,
            blood_group: cmd.blood_group,
            age: cmd.age,
            city: cmd.city,
        }
    }
}

/// Search command arguments.
#[derive(Debug, Args)]
pub struct SearchCommand {
    /// Only donors whose city contains this text (case-insensitive)
    #[arg(long)]
    pub city: Option<String>,

    /// Only donors with this blood group, or "All"
    #[arg(short, long, default_value = "All", value_parser = parse_blood_group_filter)]
    pub blood_group: BloodGroupFilter,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

impl SearchCommand {
    /// The query described by the filter flags.
    #[must_use]
    pub fn query(&self) -> DonorQuery {
        DonorQuery::new(self.city.clone(), self.blood_group)
    }
}

/// Notify command arguments.
#[derive(Debug, Args)]
pub struct NotifyCommand {
    /// Donor phone number to message
    #[arg(short, long)]
    pub to: String,

    /// Message text; defaults to the urgent-need template
    #[arg(short, long)]
    pub message: Option<String>,

    /// City used to fill the default message
    #[arg(long)]
    pub city: Option<String>,

    /// Blood group used to fill the default message
    #[arg(short, long, default_value = "All", value_parser = parse_blood_group_filter)]
    pub blood_group: BloodGroupFilter,
}

impl NotifyCommand {
    /// The message to send: the explicit text, or the filled template.
    #[must_use]
    pub fn message_text(&self) -> String {
        self.message.clone().unwrap_or_else(|| {
            DonorQuery::new(self.city.clone(), self.blood_group).default_message()
        })
    }
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Output format for search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One line per donor
    #[default]
    Plain,
    /// Aligned table
    Table,
    /// JSON output
    Json,
}

fn parse_blood_group(value: &str) -> Result<BloodGroup, String> {
    value.parse().map_err(|e: crate::error::Error| e.to_string())
}

fn parse_blood_group_filter(value: &str) -> Result<BloodGroupFilter, String> {
    value.parse().map_err(|e: crate::error::Error| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_blood_group() {
        assert_eq!(parse_blood_group("AB+"), Ok(BloodGroup::AbPositive));
        assert!(parse_blood_group("Z").unwrap_err().contains("unknown blood group"));
    }

    #[test]
    fn test_parse_blood_group_filter() {
        assert_eq!(parse_blood_group_filter("All"), Ok(BloodGroupFilter::All));
        assert_eq!(
            parse_blood_group_filter("O-"),
            Ok(BloodGroupFilter::Only(BloodGroup::ONegative))
        );
    }

    #[test]
    fn test_register_user_into_form() {
        let cmd = RegisterUserCommand {
            name: "Ravi".to_string(),
            email: "ravi@example.com".to_string(),
            age: 40,
            city: String::new(),
        };
        let form = UserForm::from(cmd);
        assert_eq!(form.name, "Ravi");
        assert_eq!(form.age, 40);
    }

    #[test]
    fn test_register_donor_into_form() {
        let cmd = RegisterDonorCommand {
            name: "Asha".to_string(),
            phone: "+911234".to_string(),
            blood_group: Some(BloodGroup::BNegative),
            age: 25,
            city: "Pune".to_string(),
        };
        let form = DonorForm::from(cmd);
        assert_eq!(form.blood_group, Some(BloodGroup::BNegative));
        assert_eq!(form.city, "Pune");
    }

    #[test]
    fn test_search_query() {
        let cmd = SearchCommand {
            city: Some("pune".to_string()),
            blood_group: BloodGroupFilter::Only(BloodGroup::OPositive),
            format: OutputFormat::Json,
        };
        assert_eq!(
            cmd.query(),
            DonorQuery::new(
                Some("pune".to_string()),
                BloodGroupFilter::Only(BloodGroup::OPositive)
            )
        );
    }

    #[test]
    fn test_notify_message_text() {
        let cmd = NotifyCommand {
            to: "+911234".to_string(),
            message: None,
            city: Some("Pune".to_string()),
            blood_group: BloodGroupFilter::Only(BloodGroup::APositive),
        };
        assert_eq!(
            cmd.message_text(),
            "Hello, we urgently need A+ blood in Pune. Can you help?"
        );

        let cmd = NotifyCommand {
            message: Some("Custom".to_string()),
            ..cmd
        };
        assert_eq!(cmd.message_text(), "Custom");
    }

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Plain);
    }
}
