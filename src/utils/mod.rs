use once_cell::sync::Lazy;
use regex::Regex;

static LEADING_INT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([+-]?[0-9]+)").expect("leading int regex should compile")
});

static LEADING_FLOAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([+-]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?)")
        .expect("leading float regex should compile")
});

/// Integer prefix of `value`, ignoring whatever trails it ("2022–" is 2022).
/// ASCII digits only. A prefix too long for `i64` saturates.
pub fn parse_leading_int(value: &str) -> Option<i64> {
    let digits = LEADING_INT.captures(value)?.get(1)?.as_str();
    Some(digits.parse::<i64>().unwrap_or(if digits.starts_with('-') {
        i64::MIN
    } else {
        i64::MAX
    }))
}

/// Decimal prefix of `value` ("7.5/10" is 7.5).
pub fn parse_leading_float(value: &str) -> Option<f64> {
    LEADING_FLOAT
        .captures(value)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

pub fn format_bool(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

pub fn truncate_chars(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    let mut out: String = value.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
