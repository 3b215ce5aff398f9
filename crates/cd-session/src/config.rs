//! Startup configuration entered on the welcome form.
//!
//! Each field falls back to its default when the text is empty or malformed; every fallback
//! produces one advisory line that the frontend shows before the session starts.

use crate::error::SessionError;
use cd_curves::{AlignOptions, DesignPoint};

pub const DEFAULT_IGVS: [f64; 5] = [0.0, 20.0, 40.0, 60.0, 80.0];
pub const DEFAULT_NUM_POINTS: usize = 10;
pub const DEFAULT_DESIGN_FLOW: f64 = 5776.0;

#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Distinct IGV settings in ascending order.
    pub igvs: Vec<f64>,
    /// Resampled rows per IGV, always greater than 1.
    pub num_points: usize,
    pub design_flow: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            igvs: DEFAULT_IGVS.to_vec(),
            num_points: DEFAULT_NUM_POINTS,
            design_flow: DEFAULT_DESIGN_FLOW,
        }
    }
}

impl SessionConfig {
    /// Parse the three form fields, returning the config and the advisories for every field
    /// that fell back to its default.
    pub fn from_form(igv_text: &str, num_points_text: &str, design_flow_text: &str) -> (Self, Vec<String>) {
        let defaults = Self::default();
        let mut advisories = Vec::new();
        let config = Self {
            igvs: or_default(parse_igv_list(igv_text), defaults.igvs, &mut advisories),
            num_points: or_default(
                parse_int_value(num_points_text, "Sample count"),
                defaults.num_points,
                &mut advisories,
            ),
            design_flow: or_default(
                parse_float_value(design_flow_text, "Design flow"),
                defaults.design_flow,
                &mut advisories,
            ),
        };
        (config, advisories)
    }

    pub fn align_options(&self) -> AlignOptions {
        AlignOptions {
            num_points: self.num_points,
            design: DesignPoint::new(self.design_flow),
        }
    }

    /// Texts used to pre-fill the welcome form.
    pub fn form_texts(&self) -> (String, String, String) {
        (
            format_igv_list(&self.igvs),
            self.num_points.to_string(),
            self.design_flow.to_string(),
        )
    }
}

fn or_default<T>(parsed: Result<T, SessionError>, fallback: T, advisories: &mut Vec<String>) -> T {
    match parsed {
        Ok(value) => value,
        Err(SessionError::InvalidInput(message)) => {
            advisories.push(message);
            fallback
        }
        Err(other) => {
            advisories.push(other.to_string());
            fallback
        }
    }
}

/// Comma-separated IGV list; blanks are skipped, any bad entry rejects the whole list.
pub fn parse_igv_list(text: &str) -> Result<Vec<f64>, SessionError> {
    let mut values = Vec::new();
    for part in text.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match part.parse::<f64>() {
            Ok(v) if v.is_finite() => values.push(v),
            _ => {
                return Err(SessionError::InvalidInput(
                    "IGV list is malformed, using the defaults.".to_string(),
                ));
            }
        }
    }
    if values.is_empty() {
        return Err(SessionError::InvalidInput(
            "IGV list is empty, using the defaults.".to_string(),
        ));
    }
    values.sort_by(f64::total_cmp);
    values.dedup();
    Ok(values)
}

/// Integer greater than 1.
pub fn parse_int_value(text: &str, name: &str) -> Result<usize, SessionError> {
    let cleaned = text.trim();
    if cleaned.is_empty() {
        return Err(SessionError::InvalidInput(format!(
            "{name} is empty, using the default {DEFAULT_NUM_POINTS}."
        )));
    }
    let value: i64 = cleaned.parse().map_err(|_| {
        SessionError::InvalidInput(format!(
            "{name} is invalid, using the default {DEFAULT_NUM_POINTS}."
        ))
    })?;
    if value <= 1 {
        return Err(SessionError::InvalidInput(format!(
            "{name} must be greater than 1, using the default {DEFAULT_NUM_POINTS}."
        )));
    }
    usize::try_from(value).map_err(|_| {
        SessionError::InvalidInput(format!(
            "{name} is invalid, using the default {DEFAULT_NUM_POINTS}."
        ))
    })
}

pub fn parse_float_value(text: &str, name: &str) -> Result<f64, SessionError> {
    let cleaned = text.trim();
    if cleaned.is_empty() {
        return Err(SessionError::InvalidInput(format!(
            "{name} is empty, using the default {DEFAULT_DESIGN_FLOW}."
        )));
    }
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(SessionError::InvalidInput(format!(
            "{name} is invalid, using the default {DEFAULT_DESIGN_FLOW}."
        ))),
    }
}

/// `0, 20, 40.5`: whole numbers without a fractional part.
pub fn format_igv_list(igvs: &[f64]) -> String {
    igvs.iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_advisories() {
        let (config, advisories) = SessionConfig::from_form("0, 20, 40, 60, 80", "10", "5776");
        assert_eq!(config, SessionConfig::default());
        assert!(advisories.is_empty());
    }

    #[test]
    fn igv_list_is_sorted_and_deduplicated() {
        assert_eq!(parse_igv_list("40, 0,, 20, 40 ").unwrap(), vec![0.0, 20.0, 40.0]);
    }

    #[test]
    fn one_bad_igv_rejects_the_list() {
        assert!(parse_igv_list("0, 20, abc").is_err());
        assert!(parse_igv_list(" , ").is_err());
    }

    #[test]
    fn sample_count_must_exceed_one() {
        assert_eq!(parse_int_value("12", "Sample count").unwrap(), 12);
        assert!(parse_int_value("1", "Sample count").is_err());
        assert!(parse_int_value("-3", "Sample count").is_err());
        assert!(parse_int_value("10.0", "Sample count").is_err());
    }

    #[test]
    fn each_fallback_adds_one_advisory() {
        let (config, advisories) = SessionConfig::from_form("x", "", "fast");
        assert_eq!(config, SessionConfig::default());
        assert_eq!(advisories.len(), 3);
        assert!(advisories[0].contains("IGV list"));
        assert!(advisories[1].contains("Sample count is empty"));
        assert!(advisories[2].contains("Design flow is invalid"));
    }

    #[test]
    fn partial_fallback_keeps_valid_fields() {
        let (config, advisories) = SessionConfig::from_form("10,5", "0", "5000.5");
        assert_eq!(config.igvs, vec![5.0, 10.0]);
        assert_eq!(config.num_points, DEFAULT_NUM_POINTS);
        assert_eq!(config.design_flow, 5000.5);
        assert_eq!(advisories.len(), 1);
    }

    #[test]
    fn igv_list_formatting() {
        assert_eq!(format_igv_list(&DEFAULT_IGVS), "0, 20, 40, 60, 80");
        assert_eq!(format_igv_list(&[12.5]), "12.5");
    }
}
