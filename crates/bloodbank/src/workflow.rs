//! The three user-facing workflows.
//!
//! Each workflow takes already-collected form values, validates them and
//! calls into the record store, the search and the notification gateway.
//! Results come back as a [`Report`] for the front end to show. Validation
//! problems are reports, not errors; only storage failures are errors.

use std::fmt;

use tracing::{debug, info};

use crate::error::Result;
use crate::notify::{NotificationGateway, Relay};
use crate::query::{self, BloodGroupFilter, DonorQuery};
use crate::record::{BloodGroup, Donor, User, DONOR_AGE_RANGE, USER_AGE_RANGE};
use crate::store::{RecordStore, Table};

/// Menu label of the user registration workflow.
pub const USER_REGISTRATION: &str = "User Registration";
/// Menu label of the donor registration workflow.
pub const DONOR_REGISTRATION: &str = "Donor Registration";
/// Menu label of the donor search workflow.
pub const SEARCH_DONORS: &str = "Search Donors";

/// Message shown when the donor table is empty.
pub const NO_DONOR_DATA: &str = "No donor data available yet.";

/// What a workflow has to tell the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    /// The action succeeded.
    Success(String),
    /// The input was rejected; nothing was changed.
    Warning(String),
    /// Neutral information.
    Info(String),
}

impl Report {
    /// The text of the report.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Success(msg) | Self::Warning(msg) | Self::Info(msg) => msg,
        }
    }

    /// Check whether this is a warning.
    #[must_use]
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::Warning(_))
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Values entered on the user registration form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserForm {
    /// Name. Required.
    pub name: String,
    /// Email. Required.
    pub email: String,
    /// Age, 1 to 100.
    pub age: u8,
    /// City or area. Optional; empty means not given.
    pub city: String,
}

/// Values entered on the donor registration form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DonorForm {
    /// Full name. Required.
    pub name: String,
    /// WhatsApp phone number. Required.
    pub phone: String,
    /// Blood group. Required.
    pub blood_group: Option<BloodGroup>,
    /// Age, 18 to 65.
    pub age: u8,
    /// City or area. Required.
    pub city: String,
}

/// Register a user.
///
/// Name and email must be non-empty, otherwise a warning is returned and
/// nothing is stored.
///
/// # Errors
///
/// Returns an error if the users table cannot be read or written.
pub fn register_user(store: &RecordStore, form: UserForm) -> Result<Report> {
    if form.name.is_empty() || form.email.is_empty() {
        debug!("User registration rejected: missing name or email");
        return Ok(Report::Warning(
            "Please fill in all required fields".to_string(),
        ));
    }
    if !USER_AGE_RANGE.contains(&form.age) {
        return Ok(age_warning(&USER_AGE_RANGE));
    }

    let user = User {
        name: form.name,
        email: form.email,
        age: form.age,
        city: Some(form.city).filter(|city| !city.is_empty()),
    };
    store.append(user)?;
    Ok(Report::Success("User registered successfully".to_string()))
}

/// Register a donor.
///
/// Name, phone, blood group and city must all be given, otherwise a warning
/// is returned and nothing is stored.
///
/// # Errors
///
/// Returns an error if the donors table cannot be read or written.
pub fn register_donor(store: &RecordStore, form: DonorForm) -> Result<Report> {
    let Some(blood_group) = form.blood_group else {
        debug!("Donor registration rejected: missing blood group");
        return Ok(Report::Warning("Please complete all fields".to_string()));
    };
    if form.name.is_empty() || form.phone.is_empty() || form.city.is_empty() {
        debug!("Donor registration rejected: missing name, phone or city");
        return Ok(Report::Warning("Please complete all fields".to_string()));
    }
    if !DONOR_AGE_RANGE.contains(&form.age) {
        return Ok(age_warning(&DONOR_AGE_RANGE));
    }

    let donor = Donor {
        name: form.name,
        phone: form.phone,
        blood_group,
        age: form.age,
        city: Some(form.city),
    };
    store.append(donor)?;
    Ok(Report::Success("Donor registered successfully".to_string()))
}

fn age_warning(range: &std::ops::RangeInclusive<u8>) -> Report {
    Report::Warning(format!(
        "Age must be between {} and {}",
        range.start(),
        range.end()
    ))
}

/// A loaded, non-empty donor table ready to be searched.
#[derive(Debug, Clone)]
pub struct DonorSearch {
    donors: Table<Donor>,
}

impl DonorSearch {
    /// Load the donor table.
    ///
    /// Returns `None` when there are no donors yet; in that case no search
    /// should be offered.
    ///
    /// # Errors
    ///
    /// Returns an error if the donors table cannot be read or created.
    pub fn open(store: &RecordStore) -> Result<Option<Self>> {
        let donors: Table<Donor> = store.load()?;
        if donors.is_empty() {
            info!("Donor search requested with an empty donor table");
            return Ok(None);
        }
        Ok(Some(Self { donors }))
    }

    /// Blood group choices for the filter, `All` first.
    #[must_use]
    pub fn blood_group_choices(&self) -> Vec<BloodGroupFilter> {
        query::blood_group_choices(&self.donors)
    }

    /// Run a search.
    #[must_use]
    pub fn run(&self, query: DonorQuery) -> SearchResults {
        let matches: Vec<Donor> = query::search(&self.donors, &query)
            .into_iter()
            .cloned()
            .collect();
        debug!(
            "Search {query:?} matched {} of {} donors",
            matches.len(),
            self.donors.len()
        );
        SearchResults { query, matches }
    }
}

/// The donors matching one search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResults {
    /// The filters that produced these results.
    pub query: DonorQuery,
    /// Matching donors in table order. Index `i` is row `i` of the display.
    pub matches: Vec<Donor>,
}

impl SearchResults {
    /// The `Found N donor(s)` summary line.
    #[must_use]
    pub fn summary(&self) -> Report {
        Report::Info(format!("Found {} donor(s)", self.matches.len()))
    }

    /// Phone numbers of the matches, the choices for notification.
    #[must_use]
    pub fn phones(&self) -> Vec<&str> {
        self.matches.iter().map(|donor| donor.phone.as_str()).collect()
    }

    /// Check whether anything matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// The pre-filled notification message.
    #[must_use]
    pub fn default_message(&self) -> String {
        self.query.default_message()
    }
}

/// Search donors in one step.
///
/// Returns `None` when the donor table is empty.
///
/// # Errors
///
/// Returns an error if the donors table cannot be read or created.
pub fn search_donors(store: &RecordStore, query: DonorQuery) -> Result<Option<SearchResults>> {
    Ok(DonorSearch::open(store)?.map(|search| search.run(query)))
}

/// Send a message to one donor and report what happened.
///
/// Relay failures are reported, never returned as errors.
pub async fn notify_donor<R: Relay>(
    gateway: &NotificationGateway<R>,
    phone: &str,
    message: &str,
) -> Report {
    let outcome = gateway.notify(phone, message).await;
    Report::Info(outcome.to_string())
}
