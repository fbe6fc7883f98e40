//! Municipal prompt presets.
//!
//! Static catalog of named prompt templates with per-preset parameter
//! overrides. Config data with a lookup helper; no generation logic
//! lives here.

use serde::Serialize;

use crate::params::GenerationParameters;

/// Infrastructure category a preset targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PresetCategory {
    Road,
    Bridge,
    Tunnel,
    Landscape,
}

/// A named prompt template with default parameter overrides.
#[derive(Debug, Clone, Serialize)]
pub struct Preset {
    pub id: &'static str,
    pub category: PresetCategory,
    /// Display name (the workbench UI is bilingual).
    pub name: &'static str,
    pub prompt_template: &'static str,
    pub default_fidelity: f64,
    pub default_style_strength: f64,
}

/// The built-in municipal preset catalog.
pub const MUNICIPAL_PRESETS: &[Preset] = &[
    Preset {
        id: "road-urban-arterial",
        category: PresetCategory::Road,
        name: "城市主干路 (日景)",
        prompt_template: "photorealistic urban arterial road, 6 lanes, asphalt pavement, \
             crisp white thermoplastic lane markings, median strip with manicured low shrubs, \
             modern LED streetlights, clear blue sky, city skyline in background, \
             4k visualization, cinematic lighting",
        default_fidelity: 0.8,
        default_style_strength: 0.6,
    },
    Preset {
        id: "bridge-highway",
        category: PresetCategory::Bridge,
        name: "高架桥/立交 (工程风)",
        prompt_template: "concrete highway viaduct, precast box girder structure, \
             clean concrete texture, safety crash barriers, smooth asphalt deck, soft sunlight, \
             highly detailed engineering structure, aerial view, architectural photography",
        default_fidelity: 0.9,
        default_style_strength: 0.4,
    },
    Preset {
        id: "street-scape",
        category: PresetCategory::Landscape,
        name: "街道景观提升 (人视)",
        prompt_template: "urban streetscape renovation, permeable paver sidewalks, \
             granite curbstones, mature street trees providing canopy, pedestrian friendly \
             furniture, vibrant commercial frontage, warm morning lighting, depth of field",
        default_fidelity: 0.7,
        default_style_strength: 0.7,
    },
    Preset {
        id: "tunnel-interior",
        category: PresetCategory::Tunnel,
        name: "隧道内部 (现代)",
        prompt_template: "modern tunnel interior, fire-resistant wall cladding, \
             LED strip lighting, emergency signage, asphalt road surface, cinematic lighting, \
             vanishing point perspective, hyperrealistic",
        default_fidelity: 0.85,
        default_style_strength: 0.5,
    },
];

/// Look up a preset by id.
pub fn find_preset(id: &str) -> Option<&'static Preset> {
    MUNICIPAL_PRESETS.iter().find(|p| p.id == id)
}

/// Fold a preset into a parameter set.
///
/// Overwrites only the weights the preset specifies, records the preset
/// back-reference, and returns the template prompt for the prompt field.
pub fn apply_preset(preset: &Preset, params: &mut GenerationParameters) -> String {
    params.fidelity = preset.default_fidelity;
    params.style_strength = preset.default_style_strength;
    params.preset_id = Some(preset.id.to_string());
    preset.prompt_template.to_string()
}
