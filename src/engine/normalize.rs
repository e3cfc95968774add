//! Normalization - defaulting and numeric coercion for untyped sources
//!
//! Inputs arrive from form submissions, stored records, and spreadsheet
//! rows, so numeric fields may show up as strings ("81", "$12.50",
//! "1,234.56", "45%"). Defaulting is total: it fills unset optional
//! fields with their documented defaults and never rejects. Anything
//! that genuinely can't be read as a number is a parse failure at the
//! ingestion boundary, not a normalization failure.

use serde::{Deserialize, Deserializer};

/// Default unit of measure for part and process inputs
pub const DEFAULT_UOM: &str = "ea";

/// Default unit of measure for raw material usage
pub const DEFAULT_MATERIAL_UOM: &str = "kg";

/// Parse a loosely-formatted numeric cell.
///
/// Strips whitespace, a leading currency symbol, thousands separators,
/// and a trailing `%`. Returns `None` for empty or non-numeric input.
pub fn coerce_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let stripped: String = trimmed
        .trim_start_matches(['$', '€', '£'])
        .trim_end_matches('%')
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    stripped.parse::<f64>().ok()
}

/// Deserialize an `f64` that may arrive as a YAML/JSON string
pub fn flexible_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        String(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => coerce_number(&s).ok_or_else(|| {
            serde::de::Error::custom(format!("expected a number, got \"{}\"", s))
        }),
    }
}

/// Deserialize an optional `f64` that may arrive as a string
pub fn flexible_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum MaybeNumber {
        Number(f64),
        String(String),
    }

    match Option::<MaybeNumber>::deserialize(deserializer)? {
        None => Ok(None),
        Some(MaybeNumber::Number(n)) => Ok(Some(n)),
        Some(MaybeNumber::String(s)) => {
            if s.trim().is_empty() {
                Ok(None)
            } else {
                coerce_number(&s)
                    .map(Some)
                    .ok_or_else(|| {
                        serde::de::Error::custom(format!("expected a number, got \"{}\"", s))
                    })
            }
        }
    }
}
