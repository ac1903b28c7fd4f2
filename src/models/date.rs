use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Publication date at whatever precision the record carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "precision", content = "value", rename_all = "snake_case")]
pub enum PublicationDate {
    Full(NaiveDate),
    YearMonth(i32, u32),
    Year(i32),
    /// Text that could not be normalized, kept verbatim.
    Raw(String),
}

impl PublicationDate {
    /// Builds a date from the separate year / month / day parts of a PubMed
    /// date element. Precision degrades instead of failing: an invalid day
    /// gives year-month, an invalid month gives year.
    pub fn from_parts(year: &str, month: Option<&str>, day: Option<&str>) -> Self {
        let Some(y) = parse_year(year) else {
            let raw = [Some(year), month, day]
                .into_iter()
                .flatten()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            return PublicationDate::Raw(raw);
        };

        let Some(m) = month.and_then(parse_month) else {
            return PublicationDate::Year(y);
        };

        match day
            .and_then(|d| d.trim().parse::<u32>().ok())
            .and_then(|d| NaiveDate::from_ymd_opt(y, m, d))
        {
            Some(date) => PublicationDate::Full(date),
            None => PublicationDate::YearMonth(y, m),
        }
    }

    /// Parses free text such as `2021`, `2021 Mar`, `2021 Mar 15` or
    /// `2021-03-15`. Anything else (ranges, seasons) is kept raw.
    pub fn parse_text(text: &str) -> Self {
        let text = text.trim();

        if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
            return PublicationDate::Full(date);
        }

        let parts: Vec<&str> = text.split_whitespace().collect();
        let Some(year) = parts.first().and_then(|y| parse_year(y)) else {
            return PublicationDate::Raw(text.to_string());
        };

        match parts.as_slice() {
            [_] => PublicationDate::Year(year),
            [_, month] => match parse_month(month) {
                Some(m) => PublicationDate::YearMonth(year, m),
                None => PublicationDate::Raw(text.to_string()),
            },
            [_, month, day] => match parse_month(month)
                .zip(day.parse::<u32>().ok())
                .and_then(|(m, d)| NaiveDate::from_ymd_opt(year, m, d))
            {
                Some(date) => PublicationDate::Full(date),
                None => PublicationDate::Raw(text.to_string()),
            },
            _ => PublicationDate::Raw(text.to_string()),
        }
    }
}

impl fmt::Display for PublicationDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublicationDate::Full(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            PublicationDate::YearMonth(y, m) => write!(f, "{:04}-{:02}", y, m),
            PublicationDate::Year(y) => write!(f, "{:04}", y),
            PublicationDate::Raw(raw) => f.write_str(raw),
        }
    }
}

fn parse_year(text: &str) -> Option<i32> {
    let text = text.trim();
    if text.len() != 4 || !text.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

fn parse_month(text: &str) -> Option<u32> {
    let text = text.trim();
    if let Ok(m) = text.parse::<u32>() {
        return (1..=12).contains(&m).then_some(m);
    }

    let prefix: String = text.chars().take(3).collect::<String>().to_lowercase();
    let month = match prefix.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };

    // "Mar-Apr" style ranges are not a single month
    if text.contains('-') || text.contains('/') {
        return None;
    }
    Some(month)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts_granularities() {
        assert_eq!(
            PublicationDate::from_parts("2023", Some("May"), Some("17")).to_string(),
            "2023-05-17"
        );
        assert_eq!(
            PublicationDate::from_parts("2023", Some("09"), None).to_string(),
            "2023-09"
        );
        assert_eq!(PublicationDate::from_parts("2023", None, None).to_string(), "2023");
    }

    #[test]
    fn test_invalid_day_degrades_to_year_month() {
        assert_eq!(
            PublicationDate::from_parts("2023", Some("Feb"), Some("30")),
            PublicationDate::YearMonth(2023, 2)
        );
    }

    #[test]
    fn test_unknown_month_degrades_to_year() {
        assert_eq!(
            PublicationDate::from_parts("2020", Some("Spring"), None),
            PublicationDate::Year(2020)
        );
    }

    #[test]
    fn test_bad_year_is_raw() {
        assert_eq!(
            PublicationDate::from_parts("n.d.", Some("Jan"), None),
            PublicationDate::Raw("n.d. Jan".to_string())
        );
    }

    #[test]
    fn test_parse_text() {
        assert_eq!(PublicationDate::parse_text("2019").to_string(), "2019");
        assert_eq!(PublicationDate::parse_text("2019 Dec").to_string(), "2019-12");
        assert_eq!(PublicationDate::parse_text("2019 Dec 3").to_string(), "2019-12-03");
        assert_eq!(PublicationDate::parse_text("2019-12-03").to_string(), "2019-12-03");
        assert_eq!(
            PublicationDate::parse_text("2019 Mar-Apr"),
            PublicationDate::Raw("2019 Mar-Apr".to_string())
        );
        assert_eq!(
            PublicationDate::parse_text("1998 Dec-1999 Jan").to_string(),
            "1998 Dec-1999 Jan"
        );
    }
}
