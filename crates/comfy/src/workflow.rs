//! Workflow graph template and builder.
//!
//! The graph topology is fixed: checkpoint load, positive/negative text
//! encode, empty latent, base-image load, ControlNet load/apply,
//! KSampler, VAE decode, save. Building a request-specific instance
//! rewrites exactly five fields (positive text, latent width/height,
//! sampler seed, base-image filename, conditioning strength) and leaves
//! everything else alone.
//!
//! The builder is pure: identical inputs, including the resolved seed,
//! always produce a byte-identical graph. Drawing a fresh seed for
//! unlocked submissions happens in [`resolve_seed`], outside the builder.

use rand::Rng;
use serde_json::{json, Value};

use infravision_core::error::GenerationError;
use infravision_core::params::{AspectRatio, GenerationParameters};

// ---------------------------------------------------------------------------
// Template constants (backend wire format -- node ids are string keys)
// ---------------------------------------------------------------------------

/// KSampler node.
pub const NODE_SAMPLER: &str = "3";
/// CheckpointLoaderSimple node.
pub const NODE_CHECKPOINT: &str = "4";
/// EmptyLatentImage node (target resolution).
pub const NODE_LATENT: &str = "5";
/// Positive CLIPTextEncode node.
pub const NODE_POSITIVE: &str = "6";
/// Negative CLIPTextEncode node.
pub const NODE_NEGATIVE: &str = "7";
/// VAEDecode node.
pub const NODE_DECODE: &str = "8";
/// SaveImage node.
pub const NODE_SAVE: &str = "9";
/// LoadImage node carrying the structural reference.
pub const NODE_BASE_IMAGE: &str = "10";
/// ControlNetLoader node.
pub const NODE_CONTROLNET: &str = "11";
/// ControlNetApplyAdvanced node.
pub const NODE_CONTROLNET_APPLY: &str = "12";

/// Checkpoint the template samples from.
pub const CHECKPOINT_NAME: &str = "juggernautXL_v9Rundiffusionphoto2.safetensors";

/// ControlNet model used for structural conditioning.
pub const CONTROLNET_NAME: &str = "Union_sdxl_promaxl.safetensors";

/// Fixed suffix appended to every positive prompt.
pub const QUALITY_SUFFIX: &str = ", highly detailed, 8k, photorealistic";

/// Fixed negative prompt.
pub const NEGATIVE_PROMPT: &str = "text, watermark, low quality, blurred, deformation, lowres";

/// Prefix for saved output filenames.
pub const OUTPUT_FILENAME_PREFIX: &str = "Infravision";

/// Exclusive upper bound for freshly drawn seeds.
pub const SEED_BOUND: u64 = 1_000_000_000;

// ---------------------------------------------------------------------------
// Parameter mapping
// ---------------------------------------------------------------------------

/// Map an aspect ratio to the template's target resolution.
///
/// Only the three landscape/square ratios have graph resolutions;
/// anything else is a caller error, rejected before any I/O.
pub fn target_resolution(ratio: AspectRatio) -> Result<(u32, u32), GenerationError> {
    match ratio {
        AspectRatio::Wide16x9 => Ok((1280, 720)),
        AspectRatio::Standard4x3 => Ok((1152, 896)),
        AspectRatio::Square1x1 => Ok((1024, 1024)),
        AspectRatio::Portrait9x16 => Err(GenerationError::Precondition(
            "aspect ratio 9:16 has no workflow resolution".to_string(),
        )),
    }
}

/// Resolve the sampler seed for one submission.
///
/// Locked parameters reuse their stored seed; otherwise a fresh value in
/// `[0, SEED_BOUND)` is drawn.
pub fn resolve_seed(params: &GenerationParameters) -> u64 {
    if params.locked_seed {
        params.seed
    } else {
        rand::rng().random_range(0..SEED_BOUND)
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Build a request-specific workflow graph.
///
/// * `prompt`          - user prompt; the quality suffix is appended.
/// * `base_image_name` - backend-side filename returned by the upload.
/// * `params`          - tunable parameters (resolution, fidelity).
/// * `seed`            - resolved sampler seed (see [`resolve_seed`]).
pub fn build_workflow(
    prompt: &str,
    base_image_name: &str,
    params: &GenerationParameters,
    seed: u64,
) -> Result<Value, GenerationError> {
    let (width, height) = target_resolution(params.aspect_ratio)?;

    Ok(json!({
        NODE_SAMPLER: {
            "inputs": {
                "seed": seed,
                "steps": 25,
                "cfg": 7,
                "sampler_name": "dpmpp_2m",
                "scheduler": "karras",
                "denoise": 1,
                "model": [NODE_CHECKPOINT, 0],
                "positive": [NODE_CONTROLNET_APPLY, 0],
                "negative": [NODE_CONTROLNET_APPLY, 1],
                "latent_image": [NODE_LATENT, 0],
            },
            "class_type": "KSampler",
            "_meta": { "title": "KSampler" },
        },
        NODE_CHECKPOINT: {
            "inputs": { "ckpt_name": CHECKPOINT_NAME },
            "class_type": "CheckpointLoaderSimple",
            "_meta": { "title": "Load Checkpoint" },
        },
        NODE_LATENT: {
            "inputs": {
                "width": width,
                "height": height,
                "batch_size": 1,
            },
            "class_type": "EmptyLatentImage",
            "_meta": { "title": "Empty Latent Image" },
        },
        NODE_POSITIVE: {
            "inputs": {
                "text": format!("{prompt}{QUALITY_SUFFIX}"),
                "clip": [NODE_CHECKPOINT, 1],
            },
            "class_type": "CLIPTextEncode",
            "_meta": { "title": "Positive Prompt" },
        },
        NODE_NEGATIVE: {
            "inputs": {
                "text": NEGATIVE_PROMPT,
                "clip": [NODE_CHECKPOINT, 1],
            },
            "class_type": "CLIPTextEncode",
            "_meta": { "title": "Negative Prompt" },
        },
        NODE_DECODE: {
            "inputs": {
                "samples": [NODE_SAMPLER, 0],
                "vae": [NODE_CHECKPOINT, 2],
            },
            "class_type": "VAEDecode",
            "_meta": { "title": "VAE Decode" },
        },
        NODE_SAVE: {
            "inputs": {
                "filename_prefix": OUTPUT_FILENAME_PREFIX,
                "images": [NODE_DECODE, 0],
            },
            "class_type": "SaveImage",
            "_meta": { "title": "Save Image" },
        },
        NODE_BASE_IMAGE: {
            "inputs": {
                "image": base_image_name,
                "upload": "image",
            },
            "class_type": "LoadImage",
            "_meta": { "title": "Load Base Image" },
        },
        NODE_CONTROLNET: {
            "inputs": { "control_net_name": CONTROLNET_NAME },
            "class_type": "ControlNetLoader",
            "_meta": { "title": "Load ControlNet" },
        },
        NODE_CONTROLNET_APPLY: {
            "inputs": {
                "strength": params.fidelity,
                "start_percent": 0.0,
                "end_percent": 1.0,
                "positive": [NODE_POSITIVE, 0],
                "negative": [NODE_NEGATIVE, 0],
                "control_net": [NODE_CONTROLNET, 0],
                "image": [NODE_BASE_IMAGE, 0],
            },
            "class_type": "ControlNetApplyAdvanced",
            "_meta": { "title": "Apply ControlNet" },
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use infravision_core::params::OutputQuality;

    fn params_with_ratio(ratio: AspectRatio) -> GenerationParameters {
        GenerationParameters {
            aspect_ratio: ratio,
            ..Default::default()
        }
    }

    #[test]
    fn resolution_table_matches_the_template() {
        assert_eq!(target_resolution(AspectRatio::Wide16x9).unwrap(), (1280, 720));
        assert_eq!(target_resolution(AspectRatio::Standard4x3).unwrap(), (1152, 896));
        assert_eq!(target_resolution(AspectRatio::Square1x1).unwrap(), (1024, 1024));
    }

    #[test]
    fn portrait_ratio_is_a_precondition_violation() {
        assert_matches!(
            target_resolution(AspectRatio::Portrait9x16),
            Err(GenerationError::Precondition(_))
        );
        assert_matches!(
            build_workflow("x", "base.png", &params_with_ratio(AspectRatio::Portrait9x16), 1),
            Err(GenerationError::Precondition(_))
        );
    }

    #[test]
    fn locked_seed_is_reused_verbatim() {
        let params = GenerationParameters {
            locked_seed: true,
            seed: 42,
            ..Default::default()
        };
        assert_eq!(resolve_seed(&params), 42);
        assert_eq!(resolve_seed(&params), 42);
    }

    #[test]
    fn unlocked_seed_draws_fresh_values_in_bounds() {
        let params = GenerationParameters::default();
        let draws: Vec<u64> = (0..16).map(|_| resolve_seed(&params)).collect();
        assert!(draws.iter().all(|&s| s < SEED_BOUND));
        // 16 identical draws from a billion-value range would mean a
        // broken RNG, not bad luck.
        assert!(draws.iter().any(|&s| s != draws[0]));
    }

    #[test]
    fn identical_inputs_build_byte_identical_graphs() {
        let params = params_with_ratio(AspectRatio::Square1x1);
        let a = build_workflow("桥", "base.png", &params, 42).unwrap();
        let b = build_workflow("桥", "base.png", &params, 42).unwrap();
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn fidelity_passes_through_unmodified() {
        for fidelity in [0.0, 0.13, 0.5, 0.99, 1.0] {
            let params = GenerationParameters {
                fidelity,
                ..Default::default()
            };
            let graph = build_workflow("x", "base.png", &params, 1).unwrap();
            assert_eq!(
                graph[NODE_CONTROLNET_APPLY]["inputs"]["strength"],
                json!(fidelity)
            );
        }
    }

    #[test]
    fn bridge_scenario_rewrites_exactly_the_dynamic_fields() {
        let params = GenerationParameters {
            aspect_ratio: AspectRatio::Square1x1,
            fidelity: 0.8,
            style_strength: 0.5,
            seed: 42,
            locked_seed: true,
            preset_id: None,
            output_quality: OutputQuality::Speed,
        };
        let seed = resolve_seed(&params);
        let graph = build_workflow("桥", "site_photo.png", &params, seed).unwrap();

        assert_eq!(graph[NODE_LATENT]["inputs"]["width"], json!(1024));
        assert_eq!(graph[NODE_LATENT]["inputs"]["height"], json!(1024));
        assert_eq!(graph[NODE_SAMPLER]["inputs"]["seed"], json!(42));
        assert_eq!(
            graph[NODE_CONTROLNET_APPLY]["inputs"]["strength"],
            json!(0.8)
        );
        assert_eq!(
            graph[NODE_POSITIVE]["inputs"]["text"],
            json!("桥, highly detailed, 8k, photorealistic")
        );
        assert_eq!(
            graph[NODE_BASE_IMAGE]["inputs"]["image"],
            json!("site_photo.png")
        );

        // Fixed topology: sampler draws conditioning from the ControlNet
        // apply node, which wires both prompts and the base image.
        assert_eq!(
            graph[NODE_SAMPLER]["inputs"]["positive"],
            json!([NODE_CONTROLNET_APPLY, 0])
        );
        assert_eq!(graph[NODE_NEGATIVE]["inputs"]["text"], json!(NEGATIVE_PROMPT));
        assert_eq!(
            graph[NODE_SAVE]["inputs"]["filename_prefix"],
            json!(OUTPUT_FILENAME_PREFIX)
        );
    }
}
