// src/services/price.rs

//! Price text normalization.

use std::sync::LazyLock;

use regex::Regex;

/// Everything that is not part of a number.
static NON_NUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\d.]+").expect("static pattern is valid"));

/// Turn raw price text such as `"£199.50 pw"` into a number.
///
/// All characters other than digits and `.` are dropped before parsing.
/// Returns `None` when nothing numeric remains or the remainder is not a
/// valid number (e.g. `"1.2.3"`).
pub fn normalize_price(text: &str) -> Option<f64> {
    let numeric = NON_NUMERIC.replace_all(text, "");
    if numeric.is_empty() {
        return None;
    }
    numeric.parse().ok()
}
