use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Calendar date that serializes as `YYYY-MM-DD`, the format the API
/// expects in statement queries and payment schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date(pub NaiveDate);

impl Date {
    pub fn new(date: NaiveDate) -> Self {
        Date(date)
    }

    /// Create a date from year, month and day, returning `None` if it does not exist
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Date)
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

impl FromStr for Date {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s, DATE_FORMAT).map(Date)
    }
}

impl Deref for Date {
    type Target = NaiveDate;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<NaiveDate> for Date {
    fn from(date: NaiveDate) -> Self {
        Date(date)
    }
}

impl From<Date> for NaiveDate {
    fn from(d: Date) -> Self {
        d.0
    }
}

impl Serialize for Date {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Date {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_display() {
        let date = Date::from_ymd(2025, 1, 5).unwrap();
        assert_eq!(date.to_string(), "2025-01-05");
    }

    #[test]
    fn test_date_parse() {
        let date: Date = "2025-01-31".parse().unwrap();
        assert_eq!(date, Date::from_ymd(2025, 1, 31).unwrap());
        assert!("31/01/2025".parse::<Date>().is_err());
        assert!("2025-02-30".parse::<Date>().is_err());
    }

    #[test]
    fn test_date_serde() {
        let date = Date::from_ymd(2025, 11, 30).unwrap();
        assert_eq!(serde_json::to_value(date).unwrap(), "2025-11-30");

        let parsed: Option<Date> = serde_json::from_str("null").unwrap();
        assert!(parsed.is_none());
    }
}
