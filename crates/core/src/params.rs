//! User-tunable generation parameters.
//!
//! A [`GenerationParameters`] value is copied, never shared, into each
//! version at submission time, so later slider changes cannot rewrite
//! history.

use serde::{Deserialize, Serialize};

/// Supported output aspect ratios.
///
/// The graph backend renders the first three at fixed resolutions
/// (1280x720, 1152x896, 1024x1024). `Portrait9x16` is offered by the
/// parameter surface but has no graph-template resolution, so the graph
/// builder rejects it as a precondition violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "16:9")]
    Wide16x9,
    #[serde(rename = "4:3")]
    Standard4x3,
    #[serde(rename = "1:1")]
    Square1x1,
    #[serde(rename = "9:16")]
    Portrait9x16,
}

/// Sampling quality trade-off.
///
/// Informational for the fixed graph template (sampler settings do not
/// vary with it); recorded on each version for the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputQuality {
    Speed,
    Quality,
}

/// The tunable knobs of a single generation attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParameters {
    pub aspect_ratio: AspectRatio,
    /// Structural-adherence weight in `[0, 1]`, passed through to the
    /// conditioning strength unmodified.
    pub fidelity: f64,
    /// Stylistic-adherence weight in `[0, 1]`.
    pub style_strength: f64,
    /// Sampler seed, used verbatim when `locked_seed` is set.
    pub seed: u64,
    /// When false a fresh random seed is drawn per submission.
    pub locked_seed: bool,
    /// Back-reference to the preset that seeded these values, if any.
    /// Informational only.
    pub preset_id: Option<String>,
    pub output_quality: OutputQuality,
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self {
            aspect_ratio: AspectRatio::Wide16x9,
            fidelity: 0.8,
            style_strength: 0.5,
            seed: 42,
            locked_seed: false,
            preset_id: None,
            output_quality: OutputQuality::Speed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_ratio_serializes_to_display_form() {
        assert_eq!(
            serde_json::to_string(&AspectRatio::Wide16x9).unwrap(),
            "\"16:9\""
        );
        assert_eq!(
            serde_json::to_string(&AspectRatio::Portrait9x16).unwrap(),
            "\"9:16\""
        );
    }

    #[test]
    fn defaults_match_the_workbench_initial_state() {
        let params = GenerationParameters::default();
        assert_eq!(params.aspect_ratio, AspectRatio::Wide16x9);
        assert_eq!(params.fidelity, 0.8);
        assert_eq!(params.style_strength, 0.5);
        assert_eq!(params.seed, 42);
        assert!(!params.locked_seed);
        assert!(params.preset_id.is_none());
        assert_eq!(params.output_quality, OutputQuality::Speed);
    }
}
