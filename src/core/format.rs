//! Turns backend numbers into display strings.
//!
//! Every function here is pure and total: missing or non-finite input is
//! rendered as [`NOT_AVAILABLE`] instead of failing.

/// Placeholder shown for values the backend did not provide.
pub const NOT_AVAILABLE: &str = "N/A";

/// Decimals used by [`format_number`] callers that have no preference.
pub const DEFAULT_PRECISION: usize = 4;

/// Formats a ratio as a percentage with two decimals, e.g. `0.1525` -> `15.25%`.
pub fn format_percentage(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.2}%", v * 100.0),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Formats a plain number with a fixed number of decimals.
pub fn format_number(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.precision$}"),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Formats an amount the way an en-US locale renders currency,
/// e.g. `1234.5, "USD"` -> `$1,234.50`.
pub fn format_currency(amount: f64, currency: &str) -> String {
    if !amount.is_finite() {
        return NOT_AVAILABLE.to_string();
    }

    let code = currency.trim().to_ascii_uppercase();
    let digits = minor_units(&code);
    let fixed = format!("{:.*}", digits, amount.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut body = group_thousands(int_part);
    if let Some(frac) = frac_part {
        body.push('.');
        body.push_str(frac);
    }

    // -0.001 rounds to zero and is shown without a sign
    let sign = if amount < 0.0 && !rounds_to_zero(&fixed) {
        "-"
    } else {
        ""
    };

    match currency_symbol(&code) {
        Some(symbol) => format!("{sign}{symbol}{body}"),
        None => format!("{sign}{code} {body}"),
    }
}

/// Formats a transaction amount for display.
///
/// The backend reports outflows as positive and inflows as negative amounts,
/// so inflows get a leading `+` and outflows are shown as plain values.
pub fn format_signed_amount(amount: f64, currency: &str) -> String {
    let formatted = format_currency(amount.abs(), currency);
    let digits = minor_units(&currency.trim().to_ascii_uppercase());
    if amount.is_finite() && amount < 0.0 && !rounds_to_zero(&format!("{:.*}", digits, -amount))
    {
        format!("+{formatted}")
    } else {
        formatted
    }
}

fn rounds_to_zero(fixed: &str) -> bool {
    fixed.chars().all(|c| c == '0' || c == '.')
}

fn currency_symbol(code: &str) -> Option<&'static str> {
    match code {
        "USD" => Some("$"),
        "EUR" => Some("€"),
        "GBP" => Some("£"),
        "JPY" => Some("¥"),
        "INR" => Some("₹"),
        "CAD" => Some("CA$"),
        "AUD" => Some("A$"),
        _ => None,
    }
}

fn minor_units(code: &str) -> usize {
    match code {
        "JPY" | "KRW" => 0,
        _ => 2,
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
