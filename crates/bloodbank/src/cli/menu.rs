//! Interactive menu loop.
//!
//! Each pass shows the workflow menu, collects one form with `dialoguer`
//! prompts, runs the workflow and prints its report. A workflow that fails,
//! whether on storage or on one of its prompts, prints the error and the
//! menu comes back. Only a failure of the menu prompt itself ends the loop.

use std::ops::RangeInclusive;

use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use tracing::{debug, error};

use crate::error::{Error, Result};
use crate::notify::{NotificationGateway, Relay};
use crate::query::DonorQuery;
use crate::record::{BloodGroup, DONOR_AGE_RANGE, USER_AGE_RANGE};
use crate::store::RecordStore;
use crate::workflow::{
    self, DonorForm, DonorSearch, UserForm, DONOR_REGISTRATION, NO_DONOR_DATA, SEARCH_DONORS,
    USER_REGISTRATION,
};

use super::render;

/// One entry of the top-level menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    /// Register a user.
    UserRegistration,
    /// Register a donor.
    DonorRegistration,
    /// Search donors and optionally message one.
    SearchDonors,
    /// Leave the loop.
    Quit,
}

impl MenuChoice {
    /// Menu entries in display order.
    pub const ALL: [Self; 4] = [
        Self::UserRegistration,
        Self::DonorRegistration,
        Self::SearchDonors,
        Self::Quit,
    ];

    /// The label shown in the menu.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::UserRegistration => USER_REGISTRATION,
            Self::DonorRegistration => DONOR_REGISTRATION,
            Self::SearchDonors => SEARCH_DONORS,
            Self::Quit => "Quit",
        }
    }

    /// Map a selection index back to its entry. Out of range means quit.
    #[must_use]
    pub fn from_index(index: Option<usize>) -> Self {
        index
            .and_then(|i| Self::ALL.get(i).copied())
            .unwrap_or(Self::Quit)
    }
}

/// Run the menu until the user quits.
///
/// # Errors
///
/// Returns an error if the menu itself cannot be shown.
pub async fn run<R: Relay>(store: &RecordStore, gateway: &NotificationGateway<R>) -> Result<()> {
    let theme = ColorfulTheme::default();
    let labels: Vec<&str> = MenuChoice::ALL.iter().map(|choice| choice.label()).collect();

    println!("Blood Donation App");
    loop {
        let selection = Select::with_theme(&theme)
            .with_prompt("Menu")
            .items(labels.as_slice())
            .default(0)
            .interact_opt()?;
        let choice = MenuChoice::from_index(selection);
        debug!("Menu selection: {choice:?}");

        let result = match choice {
            MenuChoice::UserRegistration => user_registration(&theme, store),
            MenuChoice::DonorRegistration => donor_registration(&theme, store),
            MenuChoice::SearchDonors => search_donors(&theme, store, gateway).await,
            MenuChoice::Quit => return Ok(()),
        };

        if let Err(err) = result {
            error!("{} failed: {err}", choice.label());
            println!("{}", failure_line(choice, &err));
        }
        println!();
    }
}

/// The line shown when a workflow fails before the menu comes back.
fn failure_line(choice: MenuChoice, err: &Error) -> String {
    format!("error: {} failed: {err}", choice.label())
}

fn user_registration(theme: &ColorfulTheme, store: &RecordStore) -> Result<()> {
    println!("Register as User");
    let form = UserForm {
        name: text(theme, "Name")?,
        email: text(theme, "Email")?,
        age: age(theme, USER_AGE_RANGE)?,
        city: text(theme, "City / Area")?,
    };
    if !confirm(theme, "Register User?")? {
        return Ok(());
    }

    let report = workflow::register_user(store, form)?;
    println!("{}", render::report_line(&report));
    Ok(())
}

fn donor_registration(theme: &ColorfulTheme, store: &RecordStore) -> Result<()> {
    println!("Register as Donor");
    let name = text(theme, "Full Name")?;
    let phone = text(theme, "WhatsApp Phone Number (e.g. +91XXXXXXXXXX)")?;
    let groups: Vec<&str> = BloodGroup::ALL.iter().map(|group| group.as_str()).collect();
    let blood_group = Select::with_theme(theme)
        .with_prompt("Blood Group")
        .items(groups.as_slice())
        .default(0)
        .interact_opt()?
        .and_then(|i| BloodGroup::ALL.get(i).copied());
    let form = DonorForm {
        name,
        phone,
        blood_group,
        age: age(theme, DONOR_AGE_RANGE)?,
        city: text(theme, "City / Area")?,
    };
    if !confirm(theme, "Register Donor?")? {
        return Ok(());
    }

    let report = workflow::register_donor(store, form)?;
    println!("{}", render::report_line(&report));
    Ok(())
}

async fn search_donors<R: Relay>(
    theme: &ColorfulTheme,
    store: &RecordStore,
    gateway: &NotificationGateway<R>,
) -> Result<()> {
    println!("Search Blood Donors");
    let Some(search) = DonorSearch::open(store)? else {
        println!("{NO_DONOR_DATA}");
        return Ok(());
    };

    let city = text(theme, "Search by City / Area")?;
    let choices = search.blood_group_choices();
    let labels: Vec<String> = choices.iter().map(ToString::to_string).collect();
    let blood_group = Select::with_theme(theme)
        .with_prompt("Select Blood Group")
        .items(labels.as_slice())
        .default(0)
        .interact_opt()?
        .and_then(|i| choices.get(i).copied())
        .unwrap_or_default();

    let results = search.run(DonorQuery::new(Some(city), blood_group));
    println!("{}", render::report_line(&results.summary()));
    print!("{}", render::donor_table(&results.matches));
    if results.is_empty() {
        return Ok(());
    }

    let phones = results.phones();
    let Some(index) = Select::with_theme(theme)
        .with_prompt("Select Donor to Send WhatsApp Message")
        .items(phones.as_slice())
        .default(0)
        .interact_opt()?
    else {
        return Ok(());
    };
    let Some(phone) = phones.get(index) else {
        return Ok(());
    };

    let message: String = Input::with_theme(theme)
        .with_prompt("Message")
        .with_initial_text(results.default_message())
        .allow_empty(true)
        .interact_text()?;
    if !confirm(theme, "Send WhatsApp Message?")? {
        return Ok(());
    }

    let report = workflow::notify_donor(gateway, phone, &message).await;
    println!("{}", render::report_line(&report));
    Ok(())
}

fn text(theme: &ColorfulTheme, prompt: &str) -> Result<String> {
    Input::<String>::with_theme(theme)
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()
        .map_err(Error::from)
}

fn age(theme: &ColorfulTheme, range: RangeInclusive<u8>) -> Result<u8> {
    let (min, max) = range.into_inner();
    Input::<u8>::with_theme(theme)
        .with_prompt("Age")
        .default(min)
        .validate_with(move |value: &u8| -> std::result::Result<(), String> {
            if (min..=max).contains(value) {
                Ok(())
            } else {
                Err(format!("Age must be between {min} and {max}"))
            }
        })
        .interact_text()
        .map_err(Error::from)
}

fn confirm(theme: &ColorfulTheme, prompt: &str) -> Result<bool> {
    Confirm::with_theme(theme)
        .with_prompt(prompt)
        .default(true)
        .interact()
        .map_err(Error::from)
}
