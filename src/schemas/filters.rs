//! SearchFilters Schema
//!
//! Value object describing the user's author/date/sort choices. It is never
//! mutated in place; every change produces a new value.

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::NewsError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    #[default]
    PublishedAt,
    Title,
    Source,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Relative publication window. "Today" means the last 24 hours, not since midnight.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DateRange {
    Today,
    Week,
    Month,
    Year,
}

impl DateRange {
    /// Earliest publication instant kept by this range.
    pub fn cutoff(self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            DateRange::Today => now - Duration::days(1),
            DateRange::Week => now - Duration::days(7),
            DateRange::Month => now
                .checked_sub_months(Months::new(1))
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
            DateRange::Year => now
                .checked_sub_months(Months::new(12))
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
        }
    }

    /// Parses a CLI/config value where an empty string or `all` means "no range".
    pub fn parse_optional(s: &str) -> Result<Option<Self>, NewsError> {
        match s.trim() {
            "" | "all" => Ok(None),
            other => other.parse().map(Some),
        }
    }
}

impl FromStr for SortBy {
    type Err = NewsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "publishedAt" | "published_at" | "date" => Ok(SortBy::PublishedAt),
            "title" => Ok(SortBy::Title),
            "source" => Ok(SortBy::Source),
            other => Err(NewsError::ParseError(format!("unknown sort key: {}", other))),
        }
    }
}

impl FromStr for SortOrder {
    type Err = NewsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(NewsError::ParseError(format!("unknown sort order: {}", other))),
        }
    }
}

impl FromStr for DateRange {
    type Err = NewsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "today" => Ok(DateRange::Today),
            "week" => Ok(DateRange::Week),
            "month" => Ok(DateRange::Month),
            "year" => Ok(DateRange::Year),
            other => Err(NewsError::ParseError(format!("unknown date range: {}", other))),
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DateRange::Today => "today",
            DateRange::Week => "week",
            DateRange::Month => "month",
            DateRange::Year => "year",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub date_range: Option<DateRange>,
    #[serde(default)]
    pub sort_by: SortBy,
    #[serde(default)]
    pub sort_order: SortOrder,
}

impl SearchFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn date_range(mut self, range: Option<DateRange>) -> Self {
        self.date_range = range;
        self
    }

    pub fn sort(mut self, sort_by: SortBy, sort_order: SortOrder) -> Self {
        self.sort_by = sort_by;
        self.sort_order = sort_order;
        self
    }

    /// Whether a field the filter pipeline acts on is set. `category` and
    /// `source` are dropdown values only; facet selections do the narrowing.
    pub fn is_narrowing(&self) -> bool {
        !self.author.is_empty() || self.date_range.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_initial_filters() {
        let filters = SearchFilters::default();
        assert_eq!(filters.sort_by, SortBy::PublishedAt);
        assert_eq!(filters.sort_order, SortOrder::Desc);
        assert!(filters.date_range.is_none());
        assert!(!filters.is_narrowing());
    }

    #[test]
    fn test_cutoffs() {
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 15, 30, 0).unwrap();
        assert_eq!(DateRange::Today.cutoff(now), Utc.with_ymd_and_hms(2024, 6, 9, 15, 30, 0).unwrap());
        assert_eq!(DateRange::Week.cutoff(now), Utc.with_ymd_and_hms(2024, 6, 3, 15, 30, 0).unwrap());
        assert_eq!(DateRange::Month.cutoff(now), Utc.with_ymd_and_hms(2024, 5, 10, 15, 30, 0).unwrap());
        assert_eq!(DateRange::Year.cutoff(now), Utc.with_ymd_and_hms(2023, 6, 10, 15, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_optional_range() {
        assert_eq!(DateRange::parse_optional("").unwrap(), None);
        assert_eq!(DateRange::parse_optional("all").unwrap(), None);
        assert_eq!(DateRange::parse_optional("Week").unwrap(), Some(DateRange::Week));
        assert!(DateRange::parse_optional("fortnight").is_err());
    }

    #[test]
    fn test_json_shape() {
        let filters = SearchFilters::new()
            .author("smith")
            .sort(SortBy::Title, SortOrder::Asc);
        let json = serde_json::to_value(&filters).unwrap();
        assert_eq!(json["sortBy"], "title");
        assert_eq!(json["sortOrder"], "asc");
        assert_eq!(json["author"], "smith");
    }
}
