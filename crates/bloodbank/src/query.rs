//! Donor search.
//!
//! A search is a stable linear filter over the donor table on two columns:
//! a case-insensitive substring match on City and an exact match on
//! BloodGroup. Either criterion can be left open.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::record::{BloodGroup, Donor};

/// Label of the "no blood group constraint" choice.
pub const ALL_BLOOD_GROUPS: &str = "All";

/// Blood group criterion of a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BloodGroupFilter {
    /// Any blood group.
    #[default]
    All,
    /// Exactly this blood group.
    Only(BloodGroup),
}

impl BloodGroupFilter {
    /// Check whether a donor's blood group passes this filter.
    #[must_use]
    pub fn accepts(self, group: BloodGroup) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == group,
        }
    }
}

impl fmt::Display for BloodGroupFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(ALL_BLOOD_GROUPS),
            Self::Only(group) => fmt::Display::fmt(group, f),
        }
    }
}

impl FromStr for BloodGroupFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL_BLOOD_GROUPS) {
            Ok(Self::All)
        } else {
            trimmed.parse().map(Self::Only)
        }
    }
}

/// Filter criteria for a donor search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DonorQuery {
    /// Text the donor's city must contain, ignoring case.
    /// `None` or an empty string imposes no constraint.
    pub city: Option<String>,
    /// Blood group the donor must have.
    pub blood_group: BloodGroupFilter,
}

impl DonorQuery {
    /// Create a query from raw filter values.
    #[must_use]
    pub fn new(city: Option<String>, blood_group: BloodGroupFilter) -> Self {
        Self { city, blood_group }
    }

    /// The city filter as typed, empty when absent.
    #[must_use]
    pub fn city_text(&self) -> &str {
        self.city.as_deref().unwrap_or_default()
    }

    /// Check whether a donor passes both criteria.
    ///
    /// A donor without a city never passes a non-empty city filter.
    #[must_use]
    pub fn matches(&self, donor: &Donor) -> bool {
        let needle = self.city_text();
        let city_ok = needle.is_empty()
            || donor
                .city
                .as_deref()
                .is_some_and(|city| city.to_lowercase().contains(&needle.to_lowercase()));
        city_ok && self.blood_group.accepts(donor.blood_group)
    }

    /// The pre-filled notification text for this search.
    ///
    /// The placeholders take the raw filter values, not the selected
    /// donor's own city or blood group.
    #[must_use]
    pub fn default_message(&self) -> String {
        format!(
            "Hello, we urgently need {} blood in {}. Can you help?",
            self.blood_group,
            self.city_text()
        )
    }
}

/// Return the donors matching `query`, in table order.
#[must_use]
pub fn search<'a>(donors: &'a [Donor], query: &DonorQuery) -> Vec<&'a Donor> {
    donors.iter().filter(|donor| query.matches(donor)).collect()
}

/// The blood group choices to offer for a table.
///
/// [`BloodGroupFilter::All`] comes first, followed by the distinct blood
/// groups present in `donors`, sorted by label.
#[must_use]
pub fn blood_group_choices(donors: &[Donor]) -> Vec<BloodGroupFilter> {
    let mut present: Vec<BloodGroup> = donors.iter().map(|donor| donor.blood_group).collect();
    present.sort_by_key(|group| group.as_str());
    present.dedup();

    std::iter::once(BloodGroupFilter::All)
        .chain(present.into_iter().map(BloodGroupFilter::Only))
        .collect()
}
