//! Amount formatting.
//!
//! Amounts use thousands separators and at most three fraction digits
//! with trailing zeros dropped (`1234.5` -> `1,234.5`). Currency amounts
//! carry a glyph; crypto amounts are token counts and are shown bare.

use crate::models::Channel;

/// Format a number with thousands separators.
pub fn amount(val: f64) -> String {
    let negative = val < 0.0;
    let fixed = format!("{:.3}", val.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    let sign = if negative && (int_part != "0" || !frac_part.is_empty()) {
        "-"
    } else {
        ""
    };

    if frac_part.is_empty() {
        format!("{sign}{with_commas}")
    } else {
        format!("{sign}{with_commas}.{frac_part}")
    }
}

/// Format a currency amount: `₹1,234`.
pub fn money(val: f64, symbol: &str) -> String {
    format!("{symbol}{}", amount(val))
}

/// Format an amount the way its channel is displayed.
pub fn channel_amount(channel: Channel, val: f64, symbol: &str) -> String {
    if channel.is_crypto() {
        amount(val)
    } else {
        money(val, symbol)
    }
}
