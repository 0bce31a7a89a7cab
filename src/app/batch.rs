// SPDX-License-Identifier: MPL-2.0
//! Headless editing runs.
//!
//! A [`BatchJob`] drives a [`Project`] end to end without any interactive
//! surface: load an image, optionally apply a mask, run one generation,
//! adjust, accept, and export.

use crate::app::config::Config;
use crate::application::generation::Operation;
use crate::application::port::generation::{GenerationError, GenerationQuality, GenerationService};
use crate::domain::editing::ExportQuality;
use crate::editor::{GenerationOutcome, Project};
use crate::error::{ActionBlocked, Error, Result};
use crate::media::{Adjustments, BrushMode, BrushSettings, ExportFormat, ExportOptions, Mask, RasterImage};
use std::path::PathBuf;
use tracing::info;

/// One headless editing run.
#[derive(Debug, Clone)]
pub struct BatchJob {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Mask image; any non-transparent pixel marks the edit region.
    pub mask: Option<PathBuf>,
    /// Reference image for pose transfer.
    pub pose_reference: Option<PathBuf>,
    pub operation: Option<Operation>,
    pub quality: GenerationQuality,
    pub adjustments: Adjustments,
    /// Bake the preview into the image before exporting.
    pub accept: bool,
    /// Export format; detected from the output extension when unset.
    pub format: Option<ExportFormat>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub export_quality: ExportQuality,
}

impl BatchJob {
    /// Creates a job that re-exports `input` with the configured defaults.
    #[must_use]
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>, config: &Config) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            mask: None,
            pose_reference: None,
            operation: None,
            quality: config.editor.generation_quality(),
            adjustments: Adjustments::default(),
            accept: false,
            format: None,
            width: None,
            height: None,
            export_quality: config.export.quality(),
        }
    }

    fn resolve_format(&self, config: &Config) -> ExportFormat {
        self.format
            .or_else(|| ExportFormat::from_path(&self.output))
            .unwrap_or_else(|| config.export.format())
    }
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub generated: bool,
    pub accepted: bool,
    pub format: ExportFormat,
    pub width: u32,
    pub height: u32,
    pub bytes: usize,
    /// Number of history entries at the end of the run.
    pub history_len: usize,
}

/// Executes `job`, writing the export to `job.output`.
///
/// # Errors
///
/// Returns decode errors for unreadable inputs,
/// [`GenerationError::NotConfigured`] when an operation is requested without a
/// service, any guard or generation failure, and export or I/O errors.
pub async fn run(
    job: &BatchJob,
    config: &Config,
    service: Option<&dyn GenerationService>,
) -> Result<BatchReport> {
    let mut project = Project::new();
    project.set_brush(BrushSettings::new(BrushMode::Paint, config.editor.brush_width()));
    project.load_image(RasterImage::open(&job.input)?)?;

    if let Some(path) = &job.mask {
        let bytes = std::fs::read(path)?;
        project.set_mask(Mask::from_encoded(&bytes)?)?;
    }
    if let Some(path) = &job.pose_reference {
        project.set_pose_reference(Some(RasterImage::open(path)?));
    }

    let mut generated = false;
    if let Some(operation) = &job.operation {
        let service = service.ok_or_else(|| {
            Error::Generation(GenerationError::NotConfigured(
                "no generation endpoint set".into(),
            ))
        })?;
        generated = project.generate(service, operation, job.quality).await?
            == GenerationOutcome::Applied;
    }

    project.set_adjustments(job.adjustments);

    let accepted = job.accept && project.has_preview();
    if accepted {
        project.accept()?;
    }

    let (natural_width, natural_height) = project
        .export_dimensions()
        .ok_or(ActionBlocked::NoImage)?;
    let format = job.resolve_format(config);
    let options = ExportOptions::new(
        format,
        job.width.unwrap_or(natural_width),
        job.height.unwrap_or(natural_height),
    )
    .with_quality(job.export_quality);

    let encoded = project.export(&options)?;
    encoded.save_to_file(&job.output)?;

    info!(
        output = %job.output.display(),
        format = format.extension(),
        width = options.width,
        height = options.height,
        bytes = encoded.bytes.len(),
        "export written"
    );

    Ok(BatchReport {
        generated,
        accepted,
        format,
        width: options.width,
        height: options.height,
        bytes: encoded.bytes.len(),
        history_len: project.history().len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::port::generation::{GeneratedImage, GenerationRequest};
    use crate::media::export;
    use image_rs::{Rgba, RgbaImage};
    use std::sync::Mutex;
    use tempfile::tempdir;

    struct RecordingService {
        requests: Mutex<Vec<GenerationRequest>>,
        color: [u8; 4],
    }

    #[async_trait::async_trait]
    impl GenerationService for RecordingService {
        async fn request(
            &self,
            request: GenerationRequest,
        ) -> std::result::Result<GeneratedImage, GenerationError> {
            let (width, height) = image_rs::load_from_memory(&request.images[0].bytes)
                .map(|image| (image.width(), image.height()))
                .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;
            self.requests.lock().unwrap().push(request);
            let bitmap = RgbaImage::from_pixel(width, height, Rgba(self.color));
            Ok(GeneratedImage {
                bytes: export::encode(&bitmap, ExportFormat::Png, ExportQuality::default())
                    .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?,
                mime_type: Some("image/png".into()),
            })
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    fn write_png(path: &std::path::Path, width: u32, height: u32, color: [u8; 4]) {
        RgbaImage::from_pixel(width, height, Rgba(color))
            .save(path)
            .expect("write png");
    }

    #[tokio::test]
    async fn reexport_without_operation_keeps_dimensions() {
        let dir = tempdir().expect("tempdir");
        let input = dir.path().join("in.png");
        write_png(&input, 40, 30, [0, 0, 255, 255]);
        let output = dir.path().join("out.jpg");

        let config = Config::default();
        let job = BatchJob::new(&input, &output, &config);
        let report = run(&job, &config, None).await.expect("run");

        assert_eq!(report.format, ExportFormat::Jpeg);
        assert_eq!((report.width, report.height), (40, 30));
        assert!(!report.generated);
        assert!(output.exists());
    }

    #[tokio::test]
    async fn operation_without_service_is_not_configured() {
        let dir = tempdir().expect("tempdir");
        let input = dir.path().join("in.png");
        write_png(&input, 20, 20, [0, 0, 255, 255]);

        let config = Config::default();
        let mut job = BatchJob::new(&input, dir.path().join("out.png"), &config);
        job.operation = Some(Operation::AutoEnhance);

        match run(&job, &config, None).await {
            Err(Error::Generation(GenerationError::NotConfigured(_))) => {}
            other => panic!("expected not configured, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn accepted_generation_commits_a_new_entry() {
        let dir = tempdir().expect("tempdir");
        let input = dir.path().join("in.png");
        write_png(&input, 32, 32, [0, 0, 255, 255]);
        let output = dir.path().join("out.png");

        let service = RecordingService {
            requests: Mutex::new(Vec::new()),
            color: [255, 0, 0, 255],
        };
        let config = Config::default();
        let mut job = BatchJob::new(&input, &output, &config);
        job.operation = Some(Operation::Colorize);
        job.accept = true;
        job.width = Some(64);
        job.height = Some(64);

        let report = run(&job, &config, Some(&service)).await.expect("run");

        assert!(report.generated);
        assert!(report.accepted);
        assert_eq!(report.history_len, 2);
        assert_eq!(service.requests.lock().unwrap().len(), 1);

        let written = image_rs::open(&output).expect("open export").to_rgba8();
        assert_eq!(written.dimensions(), (64, 64));
        assert_eq!(written.get_pixel(5, 5)[0], 255);
    }

    #[tokio::test]
    async fn magic_erase_without_mask_is_blocked() {
        let dir = tempdir().expect("tempdir");
        let input = dir.path().join("in.png");
        write_png(&input, 20, 20, [0, 0, 255, 255]);

        let service = RecordingService {
            requests: Mutex::new(Vec::new()),
            color: [0, 255, 0, 255],
        };
        let config = Config::default();
        let mut job = BatchJob::new(&input, dir.path().join("out.png"), &config);
        job.operation = Some(Operation::MagicErase);

        let result = run(&job, &config, Some(&service)).await;
        assert!(matches!(
            result,
            Err(Error::Blocked(ActionBlocked::EmptyMask))
        ));
        assert!(service.requests.lock().unwrap().is_empty());
    }

    #[test]
    fn explicit_format_wins_over_extension() {
        let config = Config::default();
        let mut job = BatchJob::new("in.png", "out.jpg", &config);
        assert_eq!(job.resolve_format(&config), ExportFormat::Jpeg);
        job.format = Some(ExportFormat::WebP);
        assert_eq!(job.resolve_format(&config), ExportFormat::WebP);
        let job = BatchJob::new("in.png", "out", &config);
        assert_eq!(job.resolve_format(&config), ExportFormat::Png);
    }
}
