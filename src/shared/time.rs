use chrono::{NaiveDate, NaiveTime};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

/// Parses a date as produced by a date input. An empty value clears the field.
pub fn parse_form_date(value: &str) -> Result<Option<NaiveDate>, chrono::ParseError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).map(Some)
}

/// Parses a time as produced by a time input, `HH:MM` with optional seconds.
pub fn parse_form_time(value: &str) -> Result<Option<NaiveTime>, chrono::ParseError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    NaiveTime::parse_from_str(value, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map(Some)
}

pub fn format_form_date(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn format_form_time(time: &NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

#[test]
fn valid_date_test() {
    let date = parse_form_date("2024-03-09").unwrap().unwrap();
    assert_eq!(format_form_date(&date), "2024-03-09");
}

#[test]
fn empty_date_test() {
    assert_eq!(parse_form_date("  ").unwrap(), None);
}

#[test]
fn invalid_date_test() {
    assert!(parse_form_date("09/03/2024").is_err());
}

#[test]
fn valid_time_test() {
    let time = parse_form_time("18:30").unwrap().unwrap();
    assert_eq!(format_form_time(&time), "18:30");
    let time = parse_form_time("07:05:00").unwrap().unwrap();
    assert_eq!(format_form_time(&time), "07:05");
}

#[test]
fn invalid_time_test() {
    assert!(parse_form_time("25:00").is_err());
    assert!(parse_form_time("noon").is_err());
}
