use super::RawValue;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%d-%B-%Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M",
];

pub(crate) fn text(value: &RawValue) -> Option<String> {
    match value {
        RawValue::Empty => None,
        RawValue::Text(raw) => {
            let trimmed = raw.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        RawValue::Number(number) if number.is_finite() => Some(format_number(*number)),
        RawValue::Number(_) => None,
        RawValue::Date(date) => Some(date.to_string()),
        RawValue::DateTime(datetime) => Some(datetime.to_string()),
    }
}

pub(crate) fn number(value: &RawValue) -> Option<f64> {
    let parsed = match value {
        RawValue::Number(number) => *number,
        RawValue::Text(raw) => {
            let trimmed = raw.trim();
            let trimmed = trimmed.strip_suffix('%').unwrap_or(trimmed).trim_end();
            trimmed.parse::<f64>().ok()?
        }
        RawValue::Empty | RawValue::Date(_) | RawValue::DateTime(_) => return None,
    };

    parsed.is_finite().then_some(parsed)
}

/// Whole numbers only; `3.0` is task 3, `3.5` is not a task number.
pub(crate) fn integer(value: &RawValue) -> Option<i64> {
    if let RawValue::Text(raw) = value {
        if let Ok(parsed) = raw.trim().parse::<i64>() {
            return Some(parsed);
        }
    }

    // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive.
    let number = number(value)?;
    if number.fract() != 0.0 || number < i64::MIN as f64 || number >= i64::MAX as f64 {
        return None;
    }
    Some(number as i64)
}

pub(crate) fn progress(value: &RawValue) -> Option<u8> {
    number(value).map(|number| number.clamp(0.0, 100.0).trunc() as u8)
}

pub(crate) fn date(value: &RawValue) -> Option<NaiveDate> {
    match value {
        RawValue::Date(date) => Some(*date),
        RawValue::DateTime(datetime) => Some(datetime.date()),
        RawValue::Text(raw) => parse_date(raw),
        RawValue::Empty | RawValue::Number(_) => None,
    }
}

pub(crate) fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(datetime) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(datetime.date_naive());
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
                .map(|datetime| datetime.date())
        })
}

fn format_number(number: f64) -> String {
    if number.fract() == 0.0 && number.abs() < 1e15 {
        format!("{}", number as i64)
    } else {
        number.to_string()
    }
}
