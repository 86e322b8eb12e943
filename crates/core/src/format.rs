//! Display formatting for chart labels, tooltips and tables.
//!
//! Percentages use one decimal, currency is EUR without decimals, and axis
//! labels use compact notation (`€20K`, `1.5M`).

/// `3.4%`
pub fn percent(value: f64) -> String {
    format!("{value:.1}%")
}

/// `€18,231`
pub fn currency_eur(value: f64) -> String {
    let rounded = value.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{sign}€{}", group_thousands(rounded.abs() as u64))
}

/// `12,345`
pub fn count(value: u64) -> String {
    group_thousands(value)
}

/// Compact notation with at most one decimal: `950`, `1.5K`, `20K`, `3.2M`.
pub fn compact(value: f64) -> String {
    let abs = value.abs();
    let sign = if value < 0.0 { "-" } else { "" };
    let (scaled, suffix) = if abs >= 1_000_000_000.0 {
        (abs / 1_000_000_000.0, "B")
    } else if abs >= 1_000_000.0 {
        (abs / 1_000_000.0, "M")
    } else if abs >= 1_000.0 {
        (abs / 1_000.0, "K")
    } else {
        (abs, "")
    };
    format!("{sign}{}{suffix}", trim_decimal(scaled))
}

/// `€20K`
pub fn compact_currency_eur(value: f64) -> String {
    if value < 0.0 {
        format!("-€{}", compact(-value))
    } else {
        format!("€{}", compact(value))
    }
}

/// Axis label for rate metrics: `2.5%`, `3%`.
pub fn compact_percent(value: f64) -> String {
    format!("{}%", trim_decimal(value))
}

fn trim_decimal(value: f64) -> String {
    let one = (value * 10.0).round() / 10.0;
    if (one - one.trunc()).abs() < f64::EPSILON {
        format!("{}", one as i64)
    } else {
        format!("{one:.1}")
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
