//! Request-level facade over the editor and the segmentation pipeline
//!
//! One [`Investigator`] is built at start-up and shared (read-only) by every
//! request. It owns the single matting handle.

use std::sync::Arc;

use image::RgbaImage;

use crate::config::Config;
use crate::editor::{EditorOptions, RedactOp, RegionEditor};
use crate::enhance::PostProcessor;
use crate::segment::{
    CommandMatting, Extraction, MattingProvider, NoMatting, Result, SegmentOptions,
    SegmentationPipeline,
};
use crate::selection::SelectionSet;

/// Region editing and object extraction
#[derive(Debug)]
pub struct Investigator {
    editor: RegionEditor,
    pipeline: SegmentationPipeline,
    matting_available: bool,
}

impl Default for Investigator {
    fn default() -> Self {
        Self::new(
            EditorOptions::default(),
            Arc::new(NoMatting),
            &SegmentOptions::default(),
            PostProcessor::default(),
        )
    }
}

impl Investigator {
    pub fn new(
        editor: EditorOptions,
        matting: Arc<dyn MattingProvider>,
        segment: &SegmentOptions,
        post: PostProcessor,
    ) -> Self {
        let matting_available = matting.is_available();
        Self {
            editor: RegionEditor::new(editor),
            pipeline: SegmentationPipeline::new(matting, segment).with_post_processor(post),
            matting_available,
        }
    }

    /// Build from configuration, locating the matting executable on `PATH`
    pub fn from_config(config: &Config) -> Self {
        let matting = Self::matting_from_config(config);
        Self::new(
            config.editor_options(),
            matting,
            &config.segment_options(),
            PostProcessor::new(config.enhance_options()),
        )
    }

    fn matting_from_config(config: &Config) -> Arc<dyn MattingProvider> {
        let command = config.segment.matting_command.trim();
        if command.is_empty() {
            tracing::info!("matting disabled");
            return Arc::new(NoMatting);
        }

        match CommandMatting::discover(command, config.matting_timeout()) {
            Some(matting) => match &config.segment.matting_model {
                Some(model) => Arc::new(matting.with_model(model.clone())),
                None => Arc::new(matting),
            },
            None => Arc::new(NoMatting),
        }
    }

    pub fn matting_available(&self) -> bool {
        self.matting_available
    }

    pub fn editor(&self) -> &RegionEditor {
        &self.editor
    }

    pub fn pipeline(&self) -> &SegmentationPipeline {
        &self.pipeline
    }

    /// Crop, blackout or blur
    pub fn redact(&self, op: RedactOp, image: &RgbaImage, selections: &SelectionSet) -> RgbaImage {
        tracing::debug!(%op, selections = selections.len(), "redact");
        self.editor.apply(op, image, selections)
    }

    /// Segment the first selection, then tighten and enhance the cutout
    pub fn select_object(&self, image: &RgbaImage, selections: &SelectionSet) -> Result<Extraction> {
        self.pipeline.select_object(image, selections)
    }
}
