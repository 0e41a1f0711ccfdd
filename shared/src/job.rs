//! Print job configuration.
//!
//! `JobConfig` is the daemon-facing option record attached to every print
//! request. Field names serialize in the camelCase form the daemon expects.

use serde::{Deserialize, Serialize};

/// Measurement units for density-based rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    In,
    Mm,
    Cm,
}

/// Per-job rendering and behavior options.
///
/// Immutable once built; construct a fresh one per print call, usually
/// through a [`PrintProfile`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobConfig {
    pub job_name: String,
    /// Number of copies, always >= 1.
    pub copies: u32,
    /// Suppress any OS print dialog (contingent on daemon trust).
    pub silent: bool,
    pub scale_content: bool,
    pub units: Units,
    /// Rendering density in dpi, when the profile controls it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub density: Option<u32>,
}

impl JobConfig {
    pub fn new(job_name: impl Into<String>) -> Self {
        Self {
            job_name: job_name.into(),
            copies: 1,
            silent: false,
            scale_content: false,
            units: Units::In,
            density: None,
        }
    }

    /// Set the number of copies (clamped to at least 1).
    pub fn with_copies(mut self, copies: u32) -> Self {
        self.copies = copies.max(1);
        self
    }

    pub fn with_silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    pub fn with_scale_content(mut self, scale: bool) -> Self {
        self.scale_content = scale;
        self
    }

    pub fn with_units(mut self, units: Units) -> Self {
        self.units = units;
        self
    }

    pub fn with_density(mut self, dpi: u32) -> Self {
        self.density = Some(dpi);
        self
    }
}

/// Preset print configurations.
///
/// The two observed job shapes collapsed into one configurable pipeline:
/// dialog-suppressing receipt printing and scaled/density-controlled page
/// printing are selected here instead of by parallel code paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintProfile {
    /// Receipt printing: silent, unscaled, single copy.
    SilentDialogSuppress,
    /// Page printing: scaled content at a fixed density.
    ScaledDensity { units: Units, density: u32 },
}

impl PrintProfile {
    /// Build the job configuration for this profile.
    pub fn job_config(&self, job_name: impl Into<String>) -> JobConfig {
        match *self {
            PrintProfile::SilentDialogSuppress => JobConfig::new(job_name)
                .with_silent(true)
                .with_scale_content(false),
            PrintProfile::ScaledDensity { units, density } => JobConfig::new(job_name)
                .with_scale_content(true)
                .with_units(units)
                .with_density(density),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copies_never_below_one() {
        let config = JobConfig::new("receipt").with_copies(0);
        assert_eq!(config.copies, 1);
    }

    #[test]
    fn serializes_camel_case() {
        let config = PrintProfile::SilentDialogSuppress.job_config("POS Receipt");
        let json = serde_json::to_value(&config).unwrap();

        assert_eq!(json["jobName"], "POS Receipt");
        assert_eq!(json["scaleContent"], false);
        assert_eq!(json["silent"], true);
        assert_eq!(json["copies"], 1);
        assert_eq!(json["units"], "in");
        // density omitted unless the profile sets it
        assert!(json.get("density").is_none());
    }

    #[test]
    fn scaled_density_profile() {
        let config =
            PrintProfile::ScaledDensity { units: Units::Mm, density: 600 }.job_config("page");
        assert!(config.scale_content);
        assert!(!config.silent);
        assert_eq!(config.density, Some(600));
        assert_eq!(config.units, Units::Mm);
    }
}
