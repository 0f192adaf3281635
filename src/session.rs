//! Extraction session: owns the catalog and coordinates image loading,
//! automatic extraction and manual sampling.

use std::collections::VecDeque;

use crate::analysis::{
    parse_analysis_response, response_schema, AestheticAnalyzer, AnalysisRequest, DEFAULT_INSTRUCTION,
    DEFAULT_TARGET_COUNT,
};
use crate::catalog::{Catalog, Category, ColorEntry, IdGenerator};
use crate::error::PaletteError;
use crate::sampler::{sample_at, Bounds, Dimensions, ExtractedColor, Point, PixelReader, RasterSurface};

pub const DEFAULT_PREVIEW_CAPACITY: usize = 6;

const EXTRACTED_NAME: &str = "Extracted Color";
const MANUAL_LABEL: &str = "Manual Sample";
const MANUAL_DESCRIPTION: &str = "Local hue sampled from the uploaded image";
const AUTOMATIC_PROVENANCE: &str = "AI image extraction";
const MANUAL_PROVENANCE: &str = "Manual image sampling";

/// Tunables for an [`ExtractionSession`].
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Most recent extracted colors kept for preview. Never below
    /// [`DEFAULT_PREVIEW_CAPACITY`].
    pub preview_capacity: usize,
    /// Colors requested from the analyzer. At least one.
    pub target_count: usize,
    pub instruction: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            preview_capacity: DEFAULT_PREVIEW_CAPACITY,
            target_count: DEFAULT_TARGET_COUNT,
            instruction: DEFAULT_INSTRUCTION.to_string(),
        }
    }
}

/// Identifies one loaded image. Changes every time an image is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionToken(u64);

#[derive(Debug)]
struct LoadedImage {
    bytes: Vec<u8>,
    mime_type: String,
    surface: RasterSurface,
    dimensions: Dimensions,
    token: SessionToken,
}

/// An automatic extraction that has been started but not completed.
#[derive(Debug)]
pub struct PendingExtraction {
    ticket: u64,
    token: SessionToken,
    request: AnalysisRequest,
}

impl PendingExtraction {
    pub fn request(&self) -> &AnalysisRequest {
        &self.request
    }
}

/// State for one user's extraction workflow over the catalog.
///
/// At most one automatic extraction is in flight. Its result is applied
/// only if the image it was started for is still the current image.
#[derive(Debug)]
pub struct ExtractionSession {
    config: SessionConfig,
    catalog: Catalog,
    image: Option<LoadedImage>,
    preview: VecDeque<ExtractedColor>,
    in_flight: Option<u64>,
    next_ticket: u64,
    next_token: u64,
    ids: IdGenerator,
}

fn sniff_mime_type(bytes: &[u8]) -> String {
    image::guess_format(bytes)
        .map(|f| f.to_mime_type().to_string())
        .unwrap_or_else(|_| "application/octet-stream".to_string())
}

impl ExtractionSession {
    pub fn new(catalog: Catalog, mut config: SessionConfig) -> Self {
        if config.preview_capacity < DEFAULT_PREVIEW_CAPACITY {
            log::warn!(
                "preview capacity {} raised to {DEFAULT_PREVIEW_CAPACITY}",
                config.preview_capacity
            );
            config.preview_capacity = DEFAULT_PREVIEW_CAPACITY;
        }
        config.target_count = config.target_count.max(1);
        Self {
            config,
            catalog,
            image: None,
            preview: VecDeque::new(),
            in_flight: None,
            next_ticket: 0,
            next_token: 0,
            ids: IdGenerator::new(),
        }
    }

    /// A session over the seeded catalog with default settings.
    pub fn with_baseline() -> Self {
        Self::new(Catalog::baseline(), SessionConfig::default())
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Most recent extracted colors, newest first.
    pub fn preview(&self) -> impl Iterator<Item = &ExtractedColor> + '_ {
        self.preview.iter()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn image_dimensions(&self) -> Option<Dimensions> {
        self.image.as_ref().map(|img| img.dimensions)
    }

    pub fn current_token(&self) -> Option<SessionToken> {
        self.image.as_ref().map(|img| img.token)
    }

    /// Replace the current image and clear the preview.
    ///
    /// An extraction already in flight stays in flight; its result will be
    /// discarded when it completes. Undecodable bytes leave the previous
    /// image in place.
    pub fn load_image(&mut self, bytes: Vec<u8>) -> Result<Dimensions, PaletteError> {
        let surface = RasterSurface::from_bytes(&bytes)?;
        let dimensions = surface
            .dimensions()
            .filter(|d| d.width > 0 && d.height > 0)
            .ok_or_else(|| PaletteError::surface_unavailable("image has zero dimensions"))?;

        self.next_token += 1;
        let token = SessionToken(self.next_token);
        let mime_type = sniff_mime_type(&bytes);
        log::info!(
            "loaded {}x{} {mime_type} image (session {})",
            dimensions.width,
            dimensions.height,
            token.0
        );
        self.image = Some(LoadedImage {
            bytes,
            mime_type,
            surface,
            dimensions,
            token,
        });
        self.preview.clear();
        Ok(dimensions)
    }

    /// Mark an automatic extraction as in flight and build its request.
    pub fn begin_automatic_extraction(&mut self) -> Result<PendingExtraction, PaletteError> {
        if self.is_busy() {
            return Err(PaletteError::Busy);
        }
        let image = self
            .image
            .as_ref()
            .ok_or_else(|| PaletteError::surface_unavailable("no image loaded"))?;
        let token = image.token;
        let request = AnalysisRequest {
            image: image.bytes.clone(),
            mime_type: image.mime_type.clone(),
            instruction: self.config.instruction.clone(),
            target_count: self.config.target_count,
            schema: response_schema(),
        };

        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.in_flight = Some(ticket);
        log::debug!("automatic extraction {ticket} started");
        Ok(PendingExtraction {
            ticket,
            token,
            request,
        })
    }

    /// Apply the outcome of a pending extraction.
    ///
    /// Clears the busy flag in every case. On success the colors are
    /// prepended to the catalog in one step and replace the preview.
    /// Returns the ids of the new catalog entries.
    pub fn complete_automatic_extraction<E: std::fmt::Display>(
        &mut self,
        pending: PendingExtraction,
        response: Result<String, E>,
    ) -> Result<Vec<String>, PaletteError> {
        if self.in_flight == Some(pending.ticket) {
            self.in_flight = None;
        } else {
            log::warn!("ignoring completion of unknown extraction {}", pending.ticket);
            return Err(PaletteError::StaleSession);
        }
        if self.current_token() != Some(pending.token) {
            log::warn!("discarding extraction {}: image was replaced", pending.ticket);
            return Err(PaletteError::StaleSession);
        }

        let text = response.map_err(|e| {
            log::warn!("aesthetic analysis failed: {e}");
            PaletteError::service_failure(e.to_string())
        })?;
        let colors = parse_analysis_response(&text).inspect_err(|e| {
            log::warn!("rejecting analysis response: {e}");
        })?;

        let entries: Vec<ColorEntry> = colors
            .iter()
            .map(|c| self.entry_for(c, AUTOMATIC_PROVENANCE))
            .collect();
        let ids = entries.iter().map(|e| e.id.clone()).collect();
        self.catalog.prepend(entries)?;

        self.preview = colors.into_iter().collect();
        self.preview.truncate(self.config.preview_capacity);
        Ok(ids)
    }

    /// Run a full automatic extraction against `analyzer`.
    pub fn request_automatic_extraction(
        &mut self,
        analyzer: &dyn AestheticAnalyzer,
    ) -> Result<Vec<String>, PaletteError> {
        let pending = self.begin_automatic_extraction()?;
        let response = analyzer.analyze(pending.request());
        self.complete_automatic_extraction(pending, response)
    }

    /// Sample the pixel under `click` and add it to the preview and catalog.
    /// Returns the id of the new catalog entry.
    pub fn request_manual_sample(
        &mut self,
        bounds: Bounds,
        click: Point,
    ) -> Result<String, PaletteError> {
        if self.is_busy() {
            return Err(PaletteError::Busy);
        }
        let image = self
            .image
            .as_ref()
            .ok_or_else(|| PaletteError::surface_unavailable("no image loaded"))?;

        let mut sample = sample_at(bounds, click, image.dimensions, &image.surface)?;
        sample.label = Some(MANUAL_LABEL.to_string());
        sample.description = Some(MANUAL_DESCRIPTION.to_string());

        let entry = self.entry_for(&sample, MANUAL_PROVENANCE);
        let id = entry.id.clone();
        self.catalog.prepend(vec![entry])?;

        self.preview.push_front(sample);
        self.preview.truncate(self.config.preview_capacity);
        Ok(id)
    }

    fn entry_for(&mut self, color: &ExtractedColor, provenance: &str) -> ColorEntry {
        ColorEntry {
            id: self.ids.next_id(),
            display_name: color
                .label
                .clone()
                .unwrap_or_else(|| EXTRACTED_NAME.to_string()),
            palette_code: color.palette_code.clone(),
            color: color.color,
            provenance: provenance.to_string(),
            category: Category::Campus,
        }
    }
}
