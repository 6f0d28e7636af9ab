//! Display helpers for metric values.

/// Abbreviated dollar amount: `$1.5M`, `$2.3B`, `$450K`, `$950`.
pub fn format_currency(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let abs = value.abs();

    if abs >= 1e9 {
        format!("{sign}${:.1}B", abs / 1e9)
    } else if abs >= 1e6 {
        format!("{sign}${:.1}M", abs / 1e6)
    } else if abs >= 1e3 {
        format!("{sign}${:.0}K", abs / 1e3)
    } else {
        format!("{sign}${abs:.0}")
    }
}

/// A fractional rate as a percentage with one decimal: `0.055` -> `5.5%`.
pub fn format_percentage(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}
