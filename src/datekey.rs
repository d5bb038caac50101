use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use time::{format_description::FormatItem, macros::format_description, Date};

static YMD_FMT: &[FormatItem<'_>] = format_description!("[year]-[month]-[day]");

/// A calendar day with no time-of-day component, written as `YYYY-MM-DD`.
///
/// This is the key under which marks are stored, so two keys compare equal
/// exactly when they name the same day regardless of the offset in effect
/// when they were produced.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub(crate) struct DateKey(Date);

impl DateKey {
    pub(crate) fn date(self) -> Date {
        self.0
    }

    /// Number of days from `earlier` to `self`; negative if `earlier` is
    /// actually later
    pub(crate) fn days_since(self, earlier: DateKey) -> i64 {
        (self.0 - earlier.0).whole_days()
    }
}

impl From<Date> for DateKey {
    fn from(date: Date) -> DateKey {
        DateKey(date)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.0.format(&YMD_FMT).map_err(|_| fmt::Error)?;
        f.write_str(&s)
    }
}

impl FromStr for DateKey {
    type Err = InvalidDateKey;

    fn from_str(s: &str) -> Result<DateKey, InvalidDateKey> {
        match Date::parse(s.trim(), &YMD_FMT) {
            Ok(date) => Ok(DateKey(date)),
            Err(source) => Err(InvalidDateKey {
                value: s.to_owned(),
                source,
            }),
        }
    }
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("invalid date {value:?}; expected YYYY-MM-DD")]
pub(crate) struct InvalidDateKey {
    value: String,
    #[source]
    source: time::error::Parse,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn test_parse_and_display() {
        let key = "2024-01-10".parse::<DateKey>().unwrap();
        assert_eq!(key.date(), date!(2024 - 01 - 10));
        assert_eq!(key.to_string(), "2024-01-10");
    }

    #[test]
    fn test_parse_surrounding_whitespace() {
        let key = " 2024-02-29\n".parse::<DateKey>().unwrap();
        assert_eq!(key.date(), date!(2024 - 02 - 29));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for s in ["", "2024-1-10", "2024/01/10", "2023-02-29", "2024-13-01", "yesterday"] {
            let e = s.parse::<DateKey>().unwrap_err();
            assert_eq!(e.value, s);
        }
    }

    #[test]
    fn test_days_since() {
        let a = DateKey::from(date!(2024 - 01 - 10));
        let b = DateKey::from(date!(2024 - 01 - 12));
        assert_eq!(b.days_since(a), 2);
        assert_eq!(a.days_since(b), -2);
        assert_eq!(a.days_since(a), 0);
    }

    #[test]
    fn test_ordering_follows_calendar() {
        let mut keys = ["2024-03-01", "2023-12-31", "2024-01-10"]
            .into_iter()
            .map(|s| s.parse::<DateKey>().unwrap())
            .collect::<Vec<_>>();
        keys.sort();
        let strs = keys.iter().map(ToString::to_string).collect::<Vec<_>>();
        assert_eq!(strs, ["2023-12-31", "2024-01-10", "2024-03-01"]);
    }
}
