//! Height and width values from table and column configuration.
//!
//! Sizes arrive either as numbers or as strings such as `"120"` or `"120px"`.
//! Parsing follows integer-prefix rules: leading digits are taken and any
//! unit suffix is ignored.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TableError};

/// A configured size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dimension {
    /// A plain number of pixels.
    Pixels(f64),
    /// A textual size, e.g. `"120px"`.
    Text(String),
}

impl From<u32> for Dimension {
    fn from(px: u32) -> Self {
        Self::Pixels(f64::from(px))
    }
}

impl From<&str> for Dimension {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// Parse a table height.
///
/// Numbers pass through (truncated), strings must start with digits, and an
/// empty string means "no height". Anything else is an
/// [`TableError::InvalidConfiguration`].
pub fn parse_height(height: Option<&Dimension>) -> Result<Option<u32>> {
    match height {
        None => Ok(None),
        Some(Dimension::Pixels(px)) => Ok(pixels(*px)),
        Some(Dimension::Text(text)) if text.is_empty() => Ok(None),
        Some(Dimension::Text(text)) => {
            if text.starts_with(|c: char| c.is_ascii_digit()) {
                Ok(leading_int(text).and_then(|v| u32::try_from(v).ok()))
            } else {
                Err(TableError::invalid_configuration(
                    "height",
                    format!("invalid height '{text}'"),
                ))
            }
        }
    }
}

/// Parse a column width. Unparsable values yield `None`.
pub fn parse_width(width: Option<&Dimension>) -> Option<u32> {
    match width? {
        Dimension::Pixels(px) => pixels(*px),
        Dimension::Text(text) => leading_int(text).and_then(|v| u32::try_from(v).ok()),
    }
}

/// Parse a minimum column width. Follows [`parse_width`]: unparsable and
/// absent values both yield `None`, leaving the renderer's own minimum.
pub fn parse_min_width(min_width: Option<&Dimension>) -> Option<u32> {
    parse_width(min_width)
}

fn pixels(px: f64) -> Option<u32> {
    (px.is_finite() && px >= 0.0 && px <= f64::from(u32::MAX)).then(|| px.trunc() as u32)
}

/// Integer prefix of `text`: optional whitespace, optional sign, digits.
fn leading_int(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let (sign, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1, &trimmed[1..]),
        Some(b'+') => (1, &trimmed[1..]),
        _ => (1, trimmed),
    };
    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    rest[..digits_end].parse::<i64>().ok().map(|v| sign * v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_height() {
        assert_eq!(parse_height(None).unwrap(), None);
        assert_eq!(parse_height(Some(&Dimension::from(200))).unwrap(), Some(200));
        assert_eq!(parse_height(Some(&"300px".into())).unwrap(), Some(300));
        assert_eq!(parse_height(Some(&"300".into())).unwrap(), Some(300));
        assert_eq!(parse_height(Some(&"".into())).unwrap(), None);
        assert!(matches!(
            parse_height(Some(&"auto".into())),
            Err(TableError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_parse_width() {
        assert_eq!(parse_width(None), None);
        assert_eq!(parse_width(Some(&"120px".into())), Some(120));
        assert_eq!(parse_width(Some(&" 64".into())), Some(64));
        assert_eq!(parse_width(Some(&Dimension::Pixels(99.9))), Some(99));
        assert_eq!(parse_width(Some(&"wide".into())), None);
        assert_eq!(parse_width(Some(&"-5".into())), None);
    }

    #[test]
    fn test_parse_min_width() {
        assert_eq!(parse_min_width(None), None);
        assert_eq!(parse_min_width(Some(&"40".into())), Some(40));
        assert_eq!(parse_min_width(Some(&"80px".into())), Some(80));
        assert_eq!(parse_min_width(Some(&"narrow".into())), None);
        assert_eq!(parse_min_width(Some(&Dimension::Pixels(f64::NAN))), None);
    }

    #[test]
    fn test_dimension_deserializes_numbers_and_text() {
        let dims: Vec<Dimension> = serde_json::from_str(r#"[10, "10px"]"#).unwrap();
        assert_eq!(dims, vec![Dimension::Pixels(10.0), Dimension::Text("10px".into())]);
    }
}
