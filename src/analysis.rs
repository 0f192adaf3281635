//! The aesthetic-analysis boundary: requests sent to an analyzer, strict
//! validation of what comes back, and two analyzers that need no network.

use std::path::Path;

use anyhow::{Context, Result};
use image::imageops::FilterType;
use kmeans_colors::get_kmeans_hamerly;
use palette::{FromColor, IntoColor, Lab, Srgb};
use serde::{Deserialize, Serialize};

use crate::color::{synthesize_palette_code, Color};
use crate::error::PaletteError;
use crate::sampler::ExtractedColor;

/// Number of dominant colors requested by default.
pub const DEFAULT_TARGET_COUNT: usize = 5;

pub const DEFAULT_INSTRUCTION: &str = "You are an aesthetic design consultant for Lanzhou \
Institute of Technology. Analyze this campus photo and identify the dominant colors. For each, \
suggest a poetic name related to the school's engineering spirit or natural scenery, a matching \
Pantone code, and a brief description of its significance in this context.";

/// Everything an analyzer needs to look at one image.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub image: Vec<u8>,
    pub mime_type: String,
    pub instruction: String,
    pub target_count: usize,
    /// Output schema the response must satisfy, see [`response_schema`].
    pub schema: serde_json::Value,
}

/// An external service that proposes dominant colors for an image.
///
/// Implementations return the raw response text, a JSON array matching
/// [`response_schema`]. The text is validated by
/// [`parse_analysis_response`] before anything reaches the catalog.
pub trait AestheticAnalyzer {
    fn analyze(&self, request: &AnalysisRequest) -> Result<String>;
}

/// One color descriptor exactly as the service sends it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ColorDescriptor {
    hex: String,
    #[serde(rename = "paletteCode", alias = "pantone")]
    palette_code: String,
    #[serde(default, alias = "name", skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

/// JSON schema describing the expected response.
pub fn response_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "hex": {
                    "type": "string",
                    "description": "The HEX color code, e.g. #96191C"
                },
                "paletteCode": {
                    "type": "string",
                    "description": "The matching Pantone code, e.g. PANTONE 19-1763 TCX"
                },
                "label": {
                    "type": "string",
                    "description": "A poetic name for the color"
                },
                "description": {
                    "type": "string",
                    "description": "Brief explanation of the color significance"
                }
            },
            "required": ["hex", "paletteCode"]
        }
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Validate a service response.
///
/// The response is accepted whole or not at all: a missing required field,
/// an unknown field, a malformed hex value or a blank palette code fails
/// the entire response.
pub fn parse_analysis_response(text: &str) -> Result<Vec<ExtractedColor>, PaletteError> {
    let descriptors: Vec<ColorDescriptor> = serde_json::from_str(text.trim())
        .map_err(|e| PaletteError::service_failure(format!("response does not match schema: {e}")))?;
    if descriptors.is_empty() {
        return Err(PaletteError::service_failure("response contained no colors"));
    }

    descriptors
        .into_iter()
        .enumerate()
        .map(|(i, d)| {
            let color = Color::from_hex(d.hex.trim()).map_err(|e| {
                PaletteError::service_failure(format!("color {i}: {e}"))
            })?;
            let palette_code = d.palette_code.trim();
            if palette_code.is_empty() {
                return Err(PaletteError::service_failure(format!(
                    "color {i}: blank palette code"
                )));
            }
            Ok(ExtractedColor {
                color,
                palette_code: palette_code.to_string(),
                label: non_blank(d.label),
                description: non_blank(d.description),
                display_position: None,
            })
        })
        .collect()
}

/// Replays a fixed response, e.g. one saved from a hosted model.
#[derive(Debug, Clone)]
pub struct ReplayAnalyzer {
    response: String,
}

impl ReplayAnalyzer {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let response = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read analysis response: {}", path.display()))?;
        Ok(Self::new(response))
    }
}

impl AestheticAnalyzer for ReplayAnalyzer {
    fn analyze(&self, _request: &AnalysisRequest) -> Result<String> {
        Ok(self.response.clone())
    }
}

/// Longest side of the image the clusterer sees.
const ANALYSIS_EDGE: u32 = 256;
const KMEANS_MAX_ITER: usize = 20;
const KMEANS_CONVERGE: f32 = 5.0;
const KMEANS_SEED: u64 = 42;
/// Squared CIELAB distance under which two clusters count as one color (ΔE < 5).
const MERGE_DISTANCE_SQ: f32 = 25.0;

/// Offline analyzer: k-means clustering in CIELAB.
///
/// Clusters are over-provisioned relative to the requested count so that
/// merging near-duplicates still leaves enough distinct colors.
#[derive(Debug, Clone, Copy)]
pub struct LocalAnalyzer {
    pub clusters: usize,
}

impl Default for LocalAnalyzer {
    fn default() -> Self {
        Self { clusters: 8 }
    }
}

/// A cluster centroid and the share of pixels assigned to it.
#[derive(Debug, Clone)]
struct Cluster {
    lab: Lab,
    share: f32,
}

impl Cluster {
    fn distance_sq(&self, other: &Lab) -> f32 {
        (self.lab.l - other.l).powi(2) + (self.lab.a - other.a).powi(2) + (self.lab.b - other.b).powi(2)
    }
}

impl LocalAnalyzer {
    /// Decode `bytes`, shrink to [`ANALYSIS_EDGE`] and convert every pixel to CIELAB.
    fn lab_pixels(bytes: &[u8]) -> Result<Vec<Lab>> {
        let decoded = image::load_from_memory(bytes).context(
            "unsupported or corrupt image. Supported formats: PNG, JPEG, WebP, BMP, TIFF, GIF",
        )?;
        let scaled = if decoded.width().max(decoded.height()) > ANALYSIS_EDGE {
            decoded.resize(ANALYSIS_EDGE, ANALYSIS_EDGE, FilterType::Lanczos3)
        } else {
            decoded
        };
        let rgb = scaled.to_rgb8();
        Ok(rgb
            .pixels()
            .map(|p| color_to_lab(Color::new(p[0], p[1], p[2])))
            .collect())
    }

    /// Dominant clusters, heaviest first, with near-identical centroids merged.
    fn dominant_clusters(&self, pixels: &[Lab]) -> Vec<Cluster> {
        let result = get_kmeans_hamerly(
            self.clusters.max(1),
            KMEANS_MAX_ITER,
            KMEANS_CONVERGE,
            false,
            pixels,
            KMEANS_SEED,
        );

        let mut members = vec![0usize; result.centroids.len()];
        for &idx in &result.indices {
            members[idx as usize] += 1;
        }

        let total = pixels.len() as f32;
        let mut clusters = merge_close(
            result
                .centroids
                .iter()
                .zip(members)
                .filter(|(_, n)| *n > 0)
                .map(|(lab, n)| Cluster {
                    lab: *lab,
                    share: n as f32 / total,
                }),
        );
        clusters.sort_by(|a, b| b.share.total_cmp(&a.share));
        clusters
    }
}

impl AestheticAnalyzer for LocalAnalyzer {
    fn analyze(&self, request: &AnalysisRequest) -> Result<String> {
        let pixels = Self::lab_pixels(&request.image)?;
        if pixels.is_empty() {
            anyhow::bail!("image has no pixels");
        }
        let descriptors: Vec<ColorDescriptor> = self
            .dominant_clusters(&pixels)
            .into_iter()
            .take(request.target_count)
            .map(|cluster| {
                let color = lab_to_color(cluster.lab);
                ColorDescriptor {
                    hex: color.to_hex(),
                    palette_code: synthesize_palette_code(color),
                    label: None,
                    description: Some(format!(
                        "covers {:.0}% of the image",
                        cluster.share * 100.0
                    )),
                }
            })
            .collect();
        log::debug!("local analyzer found {} color(s)", descriptors.len());
        Ok(serde_json::to_string(&descriptors)?)
    }
}

fn color_to_lab(color: Color) -> Lab {
    let srgb: Srgb<f32> = Srgb::new(color.r, color.g, color.b).into_format();
    srgb.into_color()
}

fn lab_to_color(lab: Lab) -> Color {
    let srgb: Srgb<f32> = Srgb::from_color(lab);
    let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color::new(channel(srgb.red), channel(srgb.green), channel(srgb.blue))
}

/// Fold each cluster into the first kept cluster within [`MERGE_DISTANCE_SQ`],
/// adding its share; clusters with no close neighbour are kept as-is.
fn merge_close(clusters: impl IntoIterator<Item = Cluster>) -> Vec<Cluster> {
    let mut kept: Vec<Cluster> = Vec::new();
    for cluster in clusters {
        match kept
            .iter_mut()
            .find(|k| k.distance_sq(&cluster.lab) < MERGE_DISTANCE_SQ)
        {
            Some(target) => target.share += cluster.share,
            None => kept.push(cluster),
        }
    }
    kept
}
