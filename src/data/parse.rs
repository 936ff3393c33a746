//! Lenient parsers for free-text spreadsheet cells. None of these fail: malformed input
//! becomes "no value" or the default stock status.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Extract a number from arbitrary text by keeping only ASCII digits and `.`.
/// `"330ml"` -> 330, `"¥1,200"` -> 1200, `"5.5%"` -> 5.5, `"1.2.3"` / `"n/a"` -> `None`.
pub fn parse_number(text: &str) -> Option<f64> {
    let digits: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if digits.is_empty() {
        return None;
    }
    if digits.contains('.') {
        return digits.parse::<f64>().ok();
    }
    digits.parse::<f64>().ok().map(f64::trunc)
}

/// Text form of a parsed number; integers print without a fractional part.
pub fn display_number(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v}"),
        _ => String::new(),
    }
}

/// Parse an identifier cell; `"12"`, `"12.0"` and `"#12"` all give 12.
pub fn parse_id(text: &str) -> Option<i64> {
    let value = parse_number(text)?;
    if value > i64::MAX as f64 {
        return None;
    }
    Some(value.trunc() as i64)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    InStock,
    BackOrder,
    Unavailable,
}

const IN_STOCK_SYMBOLS: &[&str] = &["○", "◯", "o", "あり", "在庫あり", "yes", "1", "true"];
const BACK_ORDER_SYMBOLS: &[&str] = &["△", "取り寄せ", "back-order", "backorder"];

impl StockStatus {
    /// Map a raw `in_stock` cell to the tri-state. Anything unrecognized, including empty,
    /// is `Unavailable`.
    pub fn classify(raw: &str) -> Self {
        let v = raw.trim();
        let matches = |set: &[&str]| set.iter().any(|s| v == *s || (s.is_ascii() && v.eq_ignore_ascii_case(s)));
        if matches(IN_STOCK_SYMBOLS) {
            Self::InStock
        } else if matches(BACK_ORDER_SYMBOLS) {
            Self::BackOrder
        } else {
            Self::Unavailable
        }
    }

    /// Symbol written back to the source on admin edits.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::InStock => "○",
            Self::BackOrder => "△",
            Self::Unavailable => "×",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InStock => "in_stock",
            Self::BackOrder => "back_order",
            Self::Unavailable => "unavailable",
        }
    }
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
