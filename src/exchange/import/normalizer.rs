use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d-%m-%Y"];
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

pub(crate) fn clean_text(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub(crate) fn clean_optional(value: Option<String>) -> String {
    value.as_deref().map(clean_text).unwrap_or_default()
}

/// Identifiers are positive integers; exports sometimes write them as floats.
pub(crate) fn parse_id(value: &str) -> Option<u32> {
    let trimmed = value.trim();
    if let Ok(id) = trimmed.parse::<u32>() {
        return Some(id);
    }

    let float = trimmed.parse::<f64>().ok()?;
    if float.is_finite() && float >= 0.0 && float.fract() == 0.0 && float <= f64::from(u32::MAX) {
        Some(float as u32)
    } else {
        None
    }
}

/// Negative, fractional remainder and unparseable quantities collapse toward zero.
pub(crate) fn parse_quantity(value: &str) -> u32 {
    let trimmed = value.trim();
    if let Ok(quantity) = trimmed.parse::<i64>() {
        return u32::try_from(quantity.max(0)).unwrap_or(u32::MAX);
    }

    match trimmed.parse::<f64>() {
        Ok(quantity) if quantity.is_finite() && quantity > 0.0 => {
            quantity.trunc().min(f64::from(u32::MAX)) as u32
        }
        _ => 0,
    }
}

pub(crate) fn parse_date(value: &str) -> Option<NaiveDate> {
    parse_datetime(value).map(|dt| dt.date())
}

pub(crate) fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    // the wall-clock date as written, not the UTC instant
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_local());
    }

    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
    {
        return Some(dt);
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_timestamps_keep_local_time() {
        let parsed = parse_datetime("2025-03-17T23:10:00-05:00").expect("timestamp");
        assert_eq!(
            parsed,
            NaiveDate::from_ymd_opt(2025, 3, 17)
                .expect("valid date")
                .and_hms_opt(23, 10, 0)
                .expect("valid time")
        );
    }

    #[test]
    fn quantities_coerce_to_non_negative() {
        assert_eq!(parse_quantity(" 12 "), 12);
        assert_eq!(parse_quantity("12.0"), 12);
        assert_eq!(parse_quantity("7.9"), 7);
        assert_eq!(parse_quantity("-4"), 0);
        assert_eq!(parse_quantity("-4.5"), 0);
        assert_eq!(parse_quantity("lots"), 0);
        assert_eq!(parse_quantity("NaN"), 0);
        assert_eq!(parse_quantity(""), 0);
    }

    #[test]
    fn ids_accept_integral_floats_only() {
        assert_eq!(parse_id("17"), Some(17));
        assert_eq!(parse_id("17.0"), Some(17));
        assert_eq!(parse_id("17.5"), None);
        assert_eq!(parse_id("-1"), None);
        assert_eq!(parse_id("abc"), None);
    }

    #[test]
    fn dates_accept_common_export_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 17).expect("valid date");
        assert_eq!(parse_date("2025-03-17"), Some(expected));
        assert_eq!(parse_date("3/17/2025"), Some(expected));
        assert_eq!(parse_date("2025-03-17 08:30:00"), Some(expected));
        assert_eq!(parse_date("2025-03-17T23:10:00Z"), Some(expected));
        assert_eq!(parse_date("2025-03-17T23:10:00-05:00"), Some(expected));
        assert_eq!(parse_date("2025-03-17T00:30:00+09:00"), Some(expected));
        assert_eq!(parse_date("next tuesday"), None);
        assert_eq!(parse_date("   "), None);
    }

    #[test]
    fn timestamps_keep_time_of_day() {
        let parsed = parse_datetime("2025-03-05 11:26:00").expect("timestamp");
        assert_eq!(
            parsed,
            NaiveDate::from_ymd_opt(2025, 3, 5)
                .unwrap()
                .and_hms_opt(11, 26, 0)
                .unwrap()
        );
    }

    #[test]
    fn clean_text_collapses_whitespace_and_bom() {
        assert_eq!(clean_text("\u{feff}  New   York "), "New York");
    }
}
