//! Six-digit `YYMMDD` date tags.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// `chrono` format string for a date tag.
const FORMAT: &str = "%y%m%d";

/// A `YYMMDD` date tag, as stored in a counter's `separator` column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateTag(String);

impl DateTag {
    /// Tag for a calendar date.
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.format(FORMAT).to_string())
    }

    /// Tag for the current local date.
    pub fn today() -> Self {
        Self::from_date(chrono::Local::now().date_naive())
    }

    /// Parse a stored tag. Anything other than six digits naming a real
    /// date yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.len() != 6 || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        NaiveDate::parse_from_str(raw, FORMAT)
            .ok()
            .map(Self::from_date)
    }

    /// The first four characters: two-digit year followed by month.
    pub fn year_month(&self) -> &str {
        &self.0[..4]
    }

    /// The last two characters: day of month.
    pub fn day(&self) -> &str {
        &self.0[4..6]
    }

    /// Return the tag as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DateTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_date() {
        let tag = DateTag::from_date(NaiveDate::from_ymd_opt(2025, 6, 15).unwrap());
        assert_eq!(tag.as_str(), "250615");
        assert_eq!(tag.year_month(), "2506");
        assert_eq!(tag.day(), "15");
    }

    #[test]
    fn test_parse() {
        assert_eq!(DateTag::parse("250101").unwrap().as_str(), "250101");
        assert!(DateTag::parse("251301").is_none());
        assert!(DateTag::parse("25011").is_none());
        assert!(DateTag::parse("2501O1").is_none());
        assert!(DateTag::parse("").is_none());
    }
}
