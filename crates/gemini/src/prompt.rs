//! Prompt augmentation for the single-call backend.
//!
//! The hosted model has no structural-conditioning or style-strength
//! knobs, so high parameter values are folded into natural-language
//! qualifiers instead.

use infravision_core::params::GenerationParameters;

/// Fidelity above this threshold adds the structure qualifier.
pub const FIDELITY_THRESHOLD: f64 = 0.7;

/// Style strength above this threshold adds the style qualifier.
pub const STYLE_THRESHOLD: f64 = 0.6;

const STRUCTURE_QUALIFIER: &str =
    " (Strictly follow the structure and geometry of the input image).";
const STYLE_QUALIFIER: &str =
    " (Strongly apply the artistic style, dramatic lighting, high contrast).";

/// Fold parameter weights into the prompt text.
pub fn augment_prompt(prompt: &str, params: &GenerationParameters) -> String {
    let mut augmented = prompt.to_string();
    if params.fidelity > FIDELITY_THRESHOLD {
        augmented.push_str(STRUCTURE_QUALIFIER);
    }
    if params.style_strength > STYLE_THRESHOLD {
        augmented.push_str(STYLE_QUALIFIER);
    }
    augmented
}
