//! Parsing of textual opacity statistics

use once_cell::sync::Lazy;
use regex::Regex;

static PARENTHESIZED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(\s*([^()]*?)\s*\)").expect("static regex is valid"));

/// Extract the normalized value from an opacity statistic
///
/// Identify tools print statistics as `raw (normalized)`, e.g.
/// `128.00 (0.5020)`. Returns `None` when there is no parenthesized token or
/// it is not a number.
#[must_use]
pub fn parse_opacity_minimum(text: &str) -> Option<f64> {
    let captures = PARENTHESIZED.captures(text)?;
    captures.get(1)?.as_str().parse::<f64>().ok()
}
