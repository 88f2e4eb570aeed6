//! `bloodbank` - A blood donor registry with donor search and notification
//!
//! This library keeps two flat tables, registered users and blood donors,
//! searches donors by city and blood group, and sends a WhatsApp message to a
//! chosen donor through a Twilio-compatible relay.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod notify;
pub mod query;
pub mod record;
pub mod store;
pub mod workflow;

pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use notify::{NotificationGateway, Outcome, Relay, RelayError};
pub use query::{BloodGroupFilter, DonorQuery};
pub use record::{BloodGroup, Donor, User};
pub use store::RecordStore;
pub use workflow::Report;
