use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use super::ApiError;

pub fn validate_id(kind: &str, id: i32) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid {} ID: {}. ID must be a positive integer",
            kind, id
        )));
    }
    Ok(id)
}

pub fn validate_capacity(capacity: i32) -> Result<i32, ApiError> {
    if capacity < 0 {
        return Err(ApiError::validation(format!(
            "Invalid capacity: {}. Capacity must be zero or more",
            capacity
        )));
    }
    Ok(capacity)
}

pub fn validate_required<'a>(field: &str, value: &'a str) -> Result<&'a str, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation(format!("{} is required", field)));
    }
    Ok(trimmed)
}

/// Combines the separate date and time fields of the show form.
/// Accepts `HH:MM` as browsers send it, and `HH:MM:SS`.
pub fn parse_show_datetime(date: &str, time: &str) -> Result<NaiveDateTime, ApiError> {
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").map_err(|_| {
        ApiError::validation(format!("Invalid date: '{}'. Expected YYYY-MM-DD", date))
    })?;

    let time = time.trim();
    let time = NaiveTime::parse_from_str(time, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M"))
        .map_err(|_| {
            ApiError::validation(format!("Invalid time: '{}'. Expected HH:MM", time))
        })?;

    Ok(date.and_time(time))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SHOW_DATE_FORMAT;

    #[test]
    fn test_validate_id() {
        assert!(validate_id("show", 1).is_ok());
        assert!(validate_id("show", 0).is_err());
        assert!(validate_id("show", -4).is_err());
    }

    #[test]
    fn test_validate_capacity() {
        assert!(validate_capacity(0).is_ok());
        assert!(validate_capacity(1_000_000).is_ok());
        assert!(validate_capacity(-1).is_err());
    }

    #[test]
    fn test_validate_required() {
        assert_eq!(validate_required("Name", "  Hall ").unwrap(), "Hall");
        assert!(validate_required("Name", "   ").is_err());
    }

    #[test]
    fn test_parse_show_datetime() {
        let dt = parse_show_datetime("2023-11-30", "21:00").unwrap();
        assert_eq!(dt.format(SHOW_DATE_FORMAT).to_string(), "2023-11-30 21:00:00");

        let dt = parse_show_datetime("2023-11-30", "22:15:30").unwrap();
        assert_eq!(dt.format(SHOW_DATE_FORMAT).to_string(), "2023-11-30 22:15:30");

        assert!(parse_show_datetime("30/11/2023", "21:00").is_err());
        assert!(parse_show_datetime("2023-11-30", "25:00").is_err());
        assert!(parse_show_datetime("2023-11-30", "").is_err());
    }
}
