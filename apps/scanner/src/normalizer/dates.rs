use chrono::NaiveDate;

use crate::models::applicant::DateRange;

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

#[derive(Debug, PartialEq)]
enum DateToken {
    Date(NaiveDate),
    Open,
}

/// Parses "Jan 2020 - Present", "06/2016 - 12/2019", "2018 to 2021" into a range.
/// Dates resolve to the first day of the month (January for bare years).
pub fn parse_date_range(text: &str) -> Option<DateRange> {
    let lower = text.to_ascii_lowercase();
    let (left, right) = split_range(&lower)?;

    let start = match parse_date_token(left)? {
        DateToken::Date(d) => d,
        DateToken::Open => return None,
    };
    let end = match parse_date_token(right)? {
        DateToken::Date(d) if d < start => return None,
        DateToken::Date(d) => Some(d),
        DateToken::Open => None,
    };
    Some(DateRange { start, end })
}

fn split_range(lower: &str) -> Option<(&str, &str)> {
    for sep in [" to ", " until "] {
        if let Some(i) = lower.find(sep) {
            return Some((&lower[..i], &lower[i + sep.len()..]));
        }
    }
    lower
        .find('-')
        .map(|i| (&lower[..i], &lower[i + 1..]))
}

fn parse_date_token(token: &str) -> Option<DateToken> {
    let token = token.trim().trim_end_matches('.');
    if matches!(token, "present" | "current" | "now" | "today") {
        return Some(DateToken::Open);
    }

    if let Some((month, year)) = token.split_once('/') {
        let month: u32 = month.trim().parse().ok()?;
        let year: i32 = year.trim().parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, 1).map(DateToken::Date);
    }

    let parts: Vec<&str> = token.split_whitespace().collect();
    match parts.as_slice() {
        [year] => {
            let year: i32 = year.parse().ok()?;
            NaiveDate::from_ymd_opt(year, 1, 1).map(DateToken::Date)
        }
        [month, year] => {
            let month = month_number(month)?;
            let year: i32 = year.parse().ok()?;
            NaiveDate::from_ymd_opt(year, month, 1).map(DateToken::Date)
        }
        _ => None,
    }
}

fn month_number(name: &str) -> Option<u32> {
    let prefix: String = name.trim_end_matches('.').chars().take(3).collect();
    MONTHS
        .iter()
        .position(|m| *m == prefix)
        .map(|i| i as u32 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    #[test]
    fn test_month_name_to_present() {
        let range = parse_date_range("Jan 2020 - Present").unwrap();
        assert_eq!(range.start, ymd(2020, 1));
        assert_eq!(range.end, None);
    }

    #[test]
    fn test_numeric_months() {
        let range = parse_date_range("06/2016 - 12/2019").unwrap();
        assert_eq!(range.start, ymd(2016, 6));
        assert_eq!(range.end, Some(ymd(2019, 12)));
    }

    #[test]
    fn test_bare_years_with_to() {
        let range = parse_date_range("2018 to 2021").unwrap();
        assert_eq!(range.start, ymd(2018, 1));
        assert_eq!(range.end, Some(ymd(2021, 1)));
    }

    #[test]
    fn test_full_month_names_and_abbreviation_dots() {
        let range = parse_date_range("Sept. 2017 - March 2019").unwrap();
        assert_eq!(range.start, ymd(2017, 9));
        assert_eq!(range.end, Some(ymd(2019, 3)));
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        assert!(parse_date_range("2021 - 2018").is_none());
    }

    #[test]
    fn test_open_start_is_rejected() {
        assert!(parse_date_range("present - 2020").is_none());
    }

    #[test]
    fn test_single_date_is_not_a_range() {
        assert!(parse_date_range("Jan 2020").is_none());
    }
}
