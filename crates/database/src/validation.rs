//! Input validation for user-authored content.

use std::fmt;

use chrono::{DateTime, Datelike, Utc};

/// Validation error types.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Empty value where one is required.
    Empty(String),
    /// Value too long.
    TooLong { field: String, max: usize, actual: usize },
    /// Invalid hex color.
    InvalidColor(String),
    /// Invalid media URL.
    InvalidUrl(String),
    /// Numeric value outside its allowed range.
    OutOfRange { field: String, min: f64, max: f64, actual: f64 },
    /// Date outside the supported calendar range.
    DateOutOfRange { field: String, year: i32 },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Empty(field) => write!(f, "{} cannot be empty", field),
            ValidationError::TooLong { field, max, actual } => {
                write!(f, "{} is too long ({} chars, max {})", field, actual, max)
            }
            ValidationError::InvalidColor(msg) => write!(f, "Invalid color: {}", msg),
            ValidationError::InvalidUrl(msg) => write!(f, "Invalid URL: {}", msg),
            ValidationError::OutOfRange {
                field,
                min,
                max,
                actual,
            } => write!(f, "{} must be between {} and {} (got {})", field, min, max, actual),
            ValidationError::DateOutOfRange { field, year } => write!(
                f,
                "{} must fall between the years {} and {} (got {})",
                field, MIN_YEAR, MAX_YEAR, year
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Maximum length for titles, names and short labels.
pub const MAX_TITLE_LENGTH: usize = 120;

/// Maximum length for timeline text and coupon descriptions.
pub const MAX_TEXT_LENGTH: usize = 2000;

/// Maximum length for love letter bodies.
pub const MAX_LETTER_LENGTH: usize = 20_000;

/// Maximum allowed length for URLs.
pub const MAX_URL_LENGTH: usize = 2048;

/// Allowed timeline zoom range.
pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 10.0;

/// Largest single XP grant, point credit or price.
pub const MAX_AMOUNT: i64 = 1_000_000;

/// Ceiling for a partner's spendable and lifetime balances.
pub const MAX_BALANCE: i64 = 1_000_000_000_000;

/// Supported calendar years for stored dates.
pub const MIN_YEAR: i32 = 1900;
pub const MAX_YEAR: i32 = 2200;

/// Validate a required text field against a maximum length (in characters).
pub fn validate_text(field: &str, value: &str, max: usize) -> Result<(), ValidationError> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Empty(field.to_string()));
    }

    let len = value.chars().count();
    if len > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
            actual: len,
        });
    }

    Ok(())
}

/// Validate a `#rgb` or `#rrggbb` color.
pub fn validate_color(color: &str) -> Result<(), ValidationError> {
    let color = color.trim();

    let Some(hex) = color.strip_prefix('#') else {
        return Err(ValidationError::InvalidColor("must start with '#'".to_string()));
    };

    if hex.len() != 3 && hex.len() != 6 {
        return Err(ValidationError::InvalidColor(
            "must have 3 or 6 hex digits".to_string(),
        ));
    }

    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ValidationError::InvalidColor(format!(
            "'{}' is not hexadecimal",
            hex
        )));
    }

    Ok(())
}

/// Validate a media URL.
///
/// Accepts absolute `http(s)` URLs and root-relative paths issued by the
/// media store (e.g. `/media/memories/abc.jpg`).
pub fn validate_url(url: &str) -> Result<(), ValidationError> {
    let url = url.trim();

    if url.is_empty() {
        return Err(ValidationError::Empty("url".to_string()));
    }

    if url.len() > MAX_URL_LENGTH {
        return Err(ValidationError::TooLong {
            field: "url".to_string(),
            max: MAX_URL_LENGTH,
            actual: url.len(),
        });
    }

    if url.chars().any(|c| c.is_whitespace()) {
        return Err(ValidationError::InvalidUrl(
            "must not contain whitespace".to_string(),
        ));
    }

    let absolute = url.starts_with("https://") || url.starts_with("http://");
    let rooted = url.starts_with('/') && !url.starts_with("//");
    if !absolute && !rooted {
        return Err(ValidationError::InvalidUrl(
            "must be an http(s) URL or a path starting with '/'".to_string(),
        ));
    }

    Ok(())
}

/// Validate a timeline zoom factor.
pub fn validate_zoom(zoom: f64) -> Result<(), ValidationError> {
    if !zoom.is_finite() || !(MIN_ZOOM..=MAX_ZOOM).contains(&zoom) {
        return Err(ValidationError::OutOfRange {
            field: "zoom".to_string(),
            min: MIN_ZOOM,
            max: MAX_ZOOM,
            actual: zoom,
        });
    }

    Ok(())
}

/// Validate a points amount: `0..=MAX_AMOUNT`.
pub fn validate_amount(field: &str, amount: i64) -> Result<(), ValidationError> {
    if !(0..=MAX_AMOUNT).contains(&amount) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0.0,
            max: MAX_AMOUNT as f64,
            actual: amount as f64,
        });
    }

    Ok(())
}

/// Validate that a balance after a credit does not exceed `MAX_BALANCE`.
pub fn validate_balance(field: &str, balance: i64) -> Result<(), ValidationError> {
    if balance > MAX_BALANCE {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0.0,
            max: MAX_BALANCE as f64,
            actual: balance as f64,
        });
    }

    Ok(())
}

/// Validate that a date falls in `MIN_YEAR..=MAX_YEAR`.
pub fn validate_date(field: &str, date: DateTime<Utc>) -> Result<(), ValidationError> {
    let year = date.year();
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(ValidationError::DateOutOfRange {
            field: field.to_string(),
            year,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_text() {
        assert!(validate_text("title", "Movie night", MAX_TITLE_LENGTH).is_ok());
        assert!(validate_text("title", "  padded  ", MAX_TITLE_LENGTH).is_ok());

        assert!(matches!(
            validate_text("title", "   ", MAX_TITLE_LENGTH),
            Err(ValidationError::Empty(_))
        ));

        // Counted in characters, not bytes
        let hearts = "💖".repeat(MAX_TITLE_LENGTH);
        assert!(validate_text("title", &hearts, MAX_TITLE_LENGTH).is_ok());

        let long = "a".repeat(MAX_TITLE_LENGTH + 1);
        assert!(matches!(
            validate_text("title", &long, MAX_TITLE_LENGTH),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_validate_color() {
        assert!(validate_color("#ff8fab").is_ok());
        assert!(validate_color("#FFF").is_ok());

        assert!(matches!(
            validate_color("ff8fab"),
            Err(ValidationError::InvalidColor(_))
        ));
        assert!(matches!(
            validate_color("#ff8fa"),
            Err(ValidationError::InvalidColor(_))
        ));
        assert!(matches!(
            validate_color("#gggggg"),
            Err(ValidationError::InvalidColor(_))
        ));
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://example.com/a.jpg").is_ok());
        assert!(validate_url("/media/memories/a.jpg").is_ok());

        assert!(matches!(validate_url(""), Err(ValidationError::Empty(_))));
        assert!(matches!(
            validate_url("ftp://example.com/a.jpg"),
            Err(ValidationError::InvalidUrl(_))
        ));
        assert!(matches!(
            validate_url("//evil.example.com/a.jpg"),
            Err(ValidationError::InvalidUrl(_))
        ));
        assert!(matches!(
            validate_url("/media/a b.jpg"),
            Err(ValidationError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_validate_zoom_and_amount() {
        assert!(validate_zoom(1.0).is_ok());
        assert!(validate_zoom(0.0).is_err());
        assert!(validate_zoom(f64::NAN).is_err());
        assert!(validate_zoom(11.0).is_err());

        assert!(validate_amount("amount", 0).is_ok());
        assert!(validate_amount("amount", MAX_AMOUNT).is_ok());
        assert!(validate_amount("amount", -1).is_err());
        assert!(validate_amount("amount", MAX_AMOUNT + 1).is_err());
        assert!(validate_amount("amount", i64::MAX).is_err());

        assert!(validate_balance("points", MAX_BALANCE).is_ok());
        assert!(validate_balance("points", MAX_BALANCE + 1).is_err());
    }

    #[test]
    fn test_validate_date() {
        use chrono::TimeZone;

        let ok = Utc.with_ymd_and_hms(2021, 6, 12, 0, 0, 0).unwrap();
        assert!(validate_date("anniversaryDate", ok).is_ok());

        let ancient = Utc.with_ymd_and_hms(12, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            validate_date("anniversaryDate", ancient),
            Err(ValidationError::DateOutOfRange {
                field: "anniversaryDate".to_string(),
                year: 12
            })
        );

        let far = Utc.with_ymd_and_hms(9999, 1, 1, 0, 0, 0).unwrap();
        assert!(validate_date("timestamp", far).is_err());
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::TooLong {
            field: "title".to_string(),
            max: 120,
            actual: 130,
        };
        assert_eq!(err.to_string(), "title is too long (130 chars, max 120)");

        let err = ValidationError::Empty("text".to_string());
        assert_eq!(err.to_string(), "text cannot be empty");
    }
}
