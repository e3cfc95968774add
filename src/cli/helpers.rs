//! Shared formatting helpers for CLI output
//!
//! These print breakdown values at the display width of their precision
//! class. Values arrive already rounded by the engine; nothing here
//! re-derives a figure.

/// Monetary amounts: 3 decimal places
pub fn fmt_cost(v: f64) -> String {
    format!("{:.3}", v)
}

/// Hourly rates and hour figures: 4 decimal places
pub fn fmt_rate(v: f64) -> String {
    format!("{:.4}", v)
}

/// Usages, quantities, times, counts: 2 decimal places
pub fn fmt_qty(v: f64) -> String {
    format!("{:.2}", v)
}

/// Percentages: 2 decimal places with a % suffix
pub fn fmt_pct(v: f64) -> String {
    format!("{:.2}%", v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_widths() {
        assert_eq!(fmt_cost(57.5), "57.500");
        assert_eq!(fmt_rate(0.0125), "0.0125");
        assert_eq!(fmt_qty(247.28), "247.28");
        assert_eq!(fmt_pct(63.29), "63.29%");
    }
}
