// SPDX-License-Identifier: MPL-2.0
//! Generation lifecycle: request, preview, accept and cancel.
//!
//! A generation is split around the network call. [`Project::begin_generation`]
//! checks preconditions, prepares the request and marks the project busy.
//! [`Project::finish_generation`] takes the service response back. The
//! ticket carries the project epoch, so a response that arrives after the
//! canonical image changed (load, crop, text, undo, redo) is dropped instead
//! of applied to the wrong image.

use crate::application::generation::{self, GenerationInputs, Operation};
use crate::application::port::generation::{
    GeneratedImage, GenerationError, GenerationQuality, GenerationRequest, GenerationService,
};
use crate::editor::Project;
use crate::error::{ActionBlocked, Error, Result};
use crate::media::compositor::{self, GeneratedResult, Layers};
use crate::media::raster::{pixmap_to_rgba, RasterImage};
use crate::media::ExportFormat;
use tracing::{debug, info, warn};

/// A prepared request bound to the project state it was made from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationTicket {
    epoch: u64,
    full_image: bool,
    request: GenerationRequest,
}

impl GenerationTicket {
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    #[must_use]
    pub fn is_full_image(&self) -> bool {
        self.full_image
    }

    #[must_use]
    pub fn request(&self) -> &GenerationRequest {
        &self.request
    }

    /// Request to hand to the service.
    #[must_use]
    pub fn into_request(self) -> GenerationRequest {
        self.request
    }
}

/// What happened to a finished generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// The result is now the project's preview.
    Applied,
    /// The project moved on while the request was in flight.
    Discarded,
}

impl Project {
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Monotonic counter bumped whenever the project is replaced.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    #[must_use]
    pub fn generated(&self) -> Option<&GeneratedResult> {
        self.generated.as_ref()
    }

    #[must_use]
    pub fn has_preview(&self) -> bool {
        self.generated.is_some()
    }

    /// Sets or clears the reference image used by pose transfer.
    pub fn set_pose_reference(&mut self, reference: Option<RasterImage>) {
        self.pose_reference = reference;
    }

    #[must_use]
    pub fn pose_reference(&self) -> Option<&RasterImage> {
        self.pose_reference.as_ref()
    }

    /// Checks preconditions, prepares the request and marks the project busy.
    ///
    /// Any existing preview is dropped. History is not touched.
    ///
    /// # Errors
    ///
    /// Returns [`ActionBlocked`] for a missing image, a running generation or
    /// an operation precondition, and surface errors from input preparation.
    pub fn begin_generation(
        &mut self,
        operation: &Operation,
        quality: GenerationQuality,
    ) -> Result<GenerationTicket> {
        let raster = self.raster.as_ref().ok_or(ActionBlocked::NoImage)?;
        if self.busy {
            return Err(ActionBlocked::Busy.into());
        }

        let prepared = generation::prepare(
            operation,
            &GenerationInputs {
                base: raster,
                mask: &self.mask,
                pose_reference: self.pose_reference.as_ref(),
                quality,
            },
        )?;

        self.generated = None;
        self.compare.reset();
        self.busy = true;
        info!(
            operation = %prepared.request.operation,
            full_image = prepared.full_image,
            epoch = self.epoch,
            "generation started"
        );

        Ok(GenerationTicket {
            epoch: self.epoch,
            full_image: prepared.full_image,
            request: prepared.request,
        })
    }

    /// Takes the service response for `ticket`.
    ///
    /// A response for an older epoch is discarded without touching the
    /// project. Otherwise the busy flag is cleared and, on success, the
    /// decoded image becomes the preview.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Generation`] for a service failure and
    /// [`Error::Decode`] for undecodable result bytes. Neither changes the
    /// canonical image or history.
    pub fn finish_generation(
        &mut self,
        ticket: GenerationTicket,
        response: std::result::Result<GeneratedImage, GenerationError>,
    ) -> Result<GenerationOutcome> {
        if ticket.epoch != self.epoch {
            debug!(
                ticket_epoch = ticket.epoch,
                epoch = self.epoch,
                "discarding stale generation result"
            );
            return Ok(GenerationOutcome::Discarded);
        }
        self.busy = false;

        let image = response.map_err(|err| {
            warn!(operation = %ticket.request.operation, error = %err, "generation failed");
            Error::Generation(err)
        })?;
        let mime = image.mime_type.unwrap_or_default();
        let decoded = RasterImage::decode(image.bytes, &mime)?;

        info!(
            operation = %ticket.request.operation,
            width = decoded.width(),
            height = decoded.height(),
            "generation finished"
        );
        self.generated = Some(GeneratedResult::new(decoded, ticket.full_image));
        self.compare.reset();
        Ok(GenerationOutcome::Applied)
    }

    /// Runs a whole generation against `service`.
    ///
    /// # Errors
    ///
    /// See [`Project::begin_generation`] and [`Project::finish_generation`].
    pub async fn generate(
        &mut self,
        service: &dyn GenerationService,
        operation: &Operation,
        quality: GenerationQuality,
    ) -> Result<GenerationOutcome> {
        let ticket = self.begin_generation(operation, quality)?;
        debug!(service = service.name(), "awaiting generation service");
        let response = service.request(ticket.request().clone()).await;
        self.finish_generation(ticket, response)
    }

    /// Bakes the preview into a new canonical image.
    ///
    /// Composites at the working resolution with the current adjustments,
    /// then adopts the result like a fresh load without resetting history.
    ///
    /// # Errors
    ///
    /// Returns [`ActionBlocked::NothingToAccept`] without a preview, and
    /// surface or encoding errors.
    pub fn accept(&mut self) -> Result<()> {
        let raster = self.raster.as_ref().ok_or(ActionBlocked::NoImage)?;
        let generated = self
            .generated
            .as_ref()
            .ok_or(ActionBlocked::NothingToAccept)?;

        let layers = Layers::new(raster, &self.mask)
            .with_generated(Some(generated))
            .with_adjustments(self.adjustments);
        let (width, height) = layers.working_dimensions();
        let composed = compositor::compose(&layers, width, height, None)?;
        let accepted = RasterImage::from_bitmap(pixmap_to_rgba(&composed)?, ExportFormat::Png)?;

        info!(width, height, "generation accepted");
        self.adopt_raster(accepted)
    }

    /// Drops the preview and its adjustments without touching history.
    pub fn cancel_generation(&mut self) {
        if self.generated.take().is_some() {
            debug!("generation preview discarded");
        }
        self.adjustments.reset();
        self.compare.reset();
    }

    /// Moves to a new epoch so tickets issued for the previous canonical
    /// image are discarded when they come back.
    pub(crate) fn invalidate_generation(&mut self) {
        self.epoch += 1;
        if self.busy {
            debug!(epoch = self.epoch, "in-flight generation is now stale");
        }
        self.busy = false;
    }
}
