use serde::{Deserialize, Serialize};
use std::fmt;

/// Try to coerce a string into a number.
///
/// Accepts trimmed, non-empty decimal or exponent notation (`"10"`, `" -2.5 "`,
/// `"1e3"`). Empty strings and non-finite spellings (`NaN`, `inf`) do not
/// parse.
#[must_use]
pub fn try_parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Represents a cell value in a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
}

impl CellValue {
    /// The empty text cell used for missing values.
    #[must_use]
    pub fn empty() -> Self {
        CellValue::Text(String::new())
    }

    /// Check if the value displays as an empty string
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Text(s) if s.trim().is_empty())
    }

    /// Try to get the value as a number, coercing text on demand
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) if n.is_finite() => Some(*n),
            CellValue::Number(_) => None,
            CellValue::Text(s) => try_parse_number(s),
        }
    }

    /// Get the display string for the value
    #[must_use]
    pub fn as_text(&self) -> String {
        self.to_string()
    }

    /// Lowercased display string, used by the case-insensitive operators.
    #[must_use]
    pub fn folded(&self) -> String {
        self.to_string().to_lowercase()
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::empty()
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Number(i as f64)
    }
}

impl From<i32> for CellValue {
    fn from(i: i32) -> Self {
        CellValue::Number(f64::from(i))
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => CellValue::empty(),
        }
    }
}
