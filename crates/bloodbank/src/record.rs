//! Record types for bloodbank.
//!
//! This module defines the two kinds of rows the application persists,
//! registered users and blood donors, together with the blood group enum
//! and the canonical column set of each table.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Ages accepted for a registered user.
pub const USER_AGE_RANGE: RangeInclusive<u8> = 1..=100;

/// Ages accepted for a donor.
pub const DONOR_AGE_RANGE: RangeInclusive<u8> = 18..=65;

/// The kind of record a table holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Registered users.
    User,
    /// Registered blood donors.
    Donor,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Donor => write!(f, "donor"),
        }
    }
}

/// A row type that can live in its own flat table.
///
/// The serde field names of an implementor must match [`Record::COLUMNS`],
/// which is also the header row written for an empty table.
pub trait Record: Serialize + DeserializeOwned {
    /// Which table this record belongs to.
    const KIND: Kind;

    /// Header row of the table, in file order.
    const COLUMNS: &'static [&'static str];
}

/// ABO/Rh blood group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BloodGroup {
    /// A positive.
    #[serde(rename = "A+")]
    APositive,
    /// A negative.
    #[serde(rename = "A-")]
    ANegative,
    /// B positive.
    #[serde(rename = "B+")]
    BPositive,
    /// B negative.
    #[serde(rename = "B-")]
    BNegative,
    /// AB positive.
    #[serde(rename = "AB+")]
    AbPositive,
    /// AB negative.
    #[serde(rename = "AB-")]
    AbNegative,
    /// O positive.
    #[serde(rename = "O+")]
    OPositive,
    /// O negative.
    #[serde(rename = "O-")]
    ONegative,
}

impl BloodGroup {
    /// Every blood group, in the order offered on the donor form.
    pub const ALL: [Self; 8] = [
        Self::APositive,
        Self::ANegative,
        Self::BPositive,
        Self::BNegative,
        Self::AbPositive,
        Self::AbNegative,
        Self::OPositive,
        Self::ONegative,
    ];

    /// The label used in tables and on forms, e.g. `AB-`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::APositive => "A+",
            Self::ANegative => "A-",
            Self::BPositive => "B+",
            Self::BNegative => "B-",
            Self::AbPositive => "AB+",
            Self::AbNegative => "AB-",
            Self::OPositive => "O+",
            Self::ONegative => "O-",
        }
    }
}

impl fmt::Display for BloodGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BloodGroup {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|group| group.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| Error::UnknownBloodGroup(s.to_string()))
    }
}

/// A registered user (someone who may need blood).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct User {
    /// Full name.
    pub name: String,
    /// Contact email. Not unique.
    pub email: String,
    /// Age in years.
    pub age: u8,
    /// City or area, if given.
    pub city: Option<String>,
}

impl Record for User {
    const KIND: Kind = Kind::User;
    const COLUMNS: &'static [&'static str] = &["Name", "Email", "Age", "City"];
}

/// A registered blood donor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Donor {
    /// Full name.
    pub name: String,
    /// Phone number in international format, e.g. `+91XXXXXXXXXX`.
    /// This is the address notifications are sent to.
    pub phone: String,
    /// The donor's blood group.
    pub blood_group: BloodGroup,
    /// Age in years.
    pub age: u8,
    /// City or area. Rows edited by hand may leave it blank.
    pub city: Option<String>,
}

impl Record for Donor {
    const KIND: Kind = Kind::Donor;
    const COLUMNS: &'static [&'static str] = &["Name", "Phone", "BloodGroup", "Age", "City"];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_display() {
        assert_eq!(Kind::User.to_string(), "user");
        assert_eq!(Kind::Donor.to_string(), "donor");
    }

    #[test]
    fn test_blood_group_display_and_parse() {
        for group in BloodGroup::ALL {
            let parsed: BloodGroup = group.to_string().parse().unwrap();
            assert_eq!(parsed, group);
        }
    }

    #[test]
    fn test_blood_group_parse_is_lenient_about_case_and_whitespace() {
        assert_eq!(" ab- ".parse::<BloodGroup>().unwrap(), BloodGroup::AbNegative);
        assert_eq!("o+".parse::<BloodGroup>().unwrap(), BloodGroup::OPositive);
    }

    #[test]
    fn test_blood_group_parse_unknown() {
        let err = "C+".parse::<BloodGroup>().unwrap_err();
        assert!(matches!(err, Error::UnknownBloodGroup(ref s) if s == "C+"));
        assert!("".parse::<BloodGroup>().is_err());
    }

    #[test]
    fn test_blood_group_serializes_as_label() {
        let json = serde_json::to_string(&BloodGroup::AbPositive).unwrap();
        assert_eq!(json, "\"AB+\"");
    }

    #[test]
    fn test_donor_field_names_match_columns() {
        let donor = Donor {
            name: "Asha".to_string(),
            phone: "+911234567890".to_string(),
            blood_group: BloodGroup::OPositive,
            age: 30,
            city: Some("Pune".to_string()),
        };
        let value = serde_json::to_value(&donor).unwrap();
        let object = value.as_object().unwrap();
        for column in Donor::COLUMNS {
            assert!(object.contains_key(*column), "missing column {column}");
        }
        assert_eq!(object.len(), Donor::COLUMNS.len());
    }

    #[test]
    fn test_user_field_names_match_columns() {
        let user = User {
            name: "Ravi".to_string(),
            email: "ravi@example.com".to_string(),
            age: 40,
            city: None,
        };
        let value = serde_json::to_value(&user).unwrap();
        let object = value.as_object().unwrap();
        for column in User::COLUMNS {
            assert!(object.contains_key(*column), "missing column {column}");
        }
        assert_eq!(object.len(), User::COLUMNS.len());
    }

    #[test]
    fn test_age_ranges() {
        assert!(USER_AGE_RANGE.contains(&1));
        assert!(!USER_AGE_RANGE.contains(&0));
        assert!(DONOR_AGE_RANGE.contains(&18));
        assert!(DONOR_AGE_RANGE.contains(&65));
        assert!(!DONOR_AGE_RANGE.contains(&66));
    }
}
