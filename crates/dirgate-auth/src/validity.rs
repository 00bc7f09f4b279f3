//! Validity window filtering of directory entries

use chrono::NaiveDate;
use dirgate_core::config::EntryAttributes;
use dirgate_core::types::DirectoryEntry;
use dirgate_core::{VALIDITY_DATE_FORMAT, VALIDITY_END_SENTINEL};
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::error::ValidityError;

/// Current entries of one search, keyed by distinguished name
pub type CandidateSet = HashMap<String, DirectoryEntry>;

/// Inclusive date range during which an entry may authenticate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidityWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ValidityWindow {
    /// Read the window from an entry's validity attributes.
    ///
    /// The start date is required. A missing or blank end date means the
    /// entry never expires and is replaced by the far-future sentinel.
    pub fn from_entry(
        entry: &DirectoryEntry,
        attributes: &EntryAttributes,
    ) -> Result<Self, ValidityError> {
        let start = match entry.attribute(&attributes.valid_from) {
            Some(value) if !value.trim().is_empty() => {
                parse_date(entry, &attributes.valid_from, value)?
            }
            _ => {
                return Err(ValidityError::MissingStartDate {
                    dn: entry.dn.clone(),
                    attribute: attributes.valid_from.clone(),
                })
            }
        };

        let end = match entry.attribute(&attributes.valid_until) {
            Some(value) if !value.trim().is_empty() => {
                parse_date(entry, &attributes.valid_until, value)?
            }
            _ => parse_date(entry, &attributes.valid_until, VALIDITY_END_SENTINEL)?,
        };

        Ok(Self { start, end })
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }
}

/// Exactly `yyyy/MM/dd`: chrono alone accepts one-digit fields
fn has_fixed_shape(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'/',
            _ => b.is_ascii_digit(),
        })
}

fn parse_date(
    entry: &DirectoryEntry,
    attribute: &str,
    value: &str,
) -> Result<NaiveDate, ValidityError> {
    let invalid = || ValidityError::InvalidDate {
        dn: entry.dn.clone(),
        attribute: attribute.to_string(),
        value: value.to_string(),
    };

    if !has_fixed_shape(value) {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(value, VALIDITY_DATE_FORMAT).map_err(|_| invalid())
}

/// Keep the entries whose validity window contains `today`.
///
/// Every entry's dates are checked, current or not: malformed data fails the
/// whole search. Distinguished names must be unique across `entries`.
pub fn filter_current(
    entries: Vec<DirectoryEntry>,
    today: NaiveDate,
    attributes: &EntryAttributes,
) -> Result<CandidateSet, ValidityError> {
    let mut seen = HashSet::with_capacity(entries.len());
    let mut current = CandidateSet::new();

    for entry in entries {
        if !seen.insert(entry.dn.clone()) {
            return Err(ValidityError::DuplicateDn(entry.dn));
        }

        let window = ValidityWindow::from_entry(&entry, attributes)?;
        let is_current = window.contains(today);
        debug!(
            dn = %entry.dn,
            start = %window.start,
            end = %window.end,
            "Entry is {} its validity window",
            if is_current { "inside" } else { "outside" }
        );

        if is_current {
            current.insert(entry.dn.clone(), entry);
        }
    }

    Ok(current)
}
