use chrono::{Local, NaiveDate, Utc};

/// Source of "today" for the daily study cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clock {
    /// Calendar date in the server's local time zone
    Local,
    Utc,
    Fixed(NaiveDate),
}

impl Clock {
    pub fn today(&self) -> NaiveDate {
        match self {
            Clock::Local => Local::now().date_naive(),
            Clock::Utc => Utc::now().date_naive(),
            Clock::Fixed(day) => *day,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "local" => Some(Clock::Local),
            "utc" => Some(Clock::Utc),
            other => NaiveDate::parse_from_str(other, "%Y-%m-%d").ok().map(Clock::Fixed),
        }
    }
}

impl Default for Clock {
    fn default() -> Self {
        Clock::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(Clock::parse("UTC"), Some(Clock::Utc));
        assert_eq!(Clock::parse("local"), Some(Clock::Local));
        assert_eq!(
            Clock::parse("2024-04-01"),
            NaiveDate::from_ymd_opt(2024, 4, 1).map(Clock::Fixed)
        );
        assert_eq!(Clock::parse("tomorrow"), None);
    }

    #[test]
    fn test_fixed_clock_is_stable() {
        let day = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        assert_eq!(Clock::Fixed(day).today(), day);
    }
}
