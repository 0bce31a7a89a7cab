// SPDX-License-Identifier: MPL-2.0
use super::*;
use crate::application::generation::Operation;
use crate::application::port::generation::{
    GeneratedImage, GenerationError, GenerationQuality, GenerationRequest, GenerationService,
};
use crate::domain::editing::{BrushWidth, ExportQuality};
use crate::media::export::{self, ExportFormat};
use crate::media::BrushMode;
use image_rs::{Rgba, RgbaImage};

const BLUE: [u8; 4] = [0, 0, 255, 255];
const RED: [u8; 4] = [255, 0, 0, 255];

fn raster(width: u32, height: u32, color: [u8; 4]) -> RasterImage {
    RasterImage::from_bitmap(RgbaImage::from_pixel(width, height, Rgba(color)), ExportFormat::Png)
        .expect("raster")
}

fn png(width: u32, height: u32, color: [u8; 4]) -> GeneratedImage {
    let bitmap = RgbaImage::from_pixel(width, height, Rgba(color));
    GeneratedImage {
        bytes: export::encode(&bitmap, ExportFormat::Png, ExportQuality::default()).expect("png"),
        mime_type: Some("image/png".into()),
    }
}

fn loaded(width: u32, height: u32) -> Project {
    let mut project = Project::new();
    project
        .load_image(raster(width, height, BLUE))
        .expect("load image");
    project
}

fn press(x: f32, y: f32) -> Message {
    CanvasMessage::PointerPressed {
        position: Point::new(x, y),
    }
    .into()
}

fn move_to(x: f32, y: f32) -> Message {
    CanvasMessage::PointerMoved {
        position: Point::new(x, y),
    }
    .into()
}

fn release() -> Message {
    CanvasMessage::PointerReleased.into()
}

fn paint_stroke(project: &mut Project) {
    project.update(press(40.0, 40.0));
    project.update(move_to(80.0, 80.0));
    let event = project.update(release());
    assert!(matches!(event, Event::MaskCommitted), "got {event:?}");
}

fn inpaint() -> Operation {
    Operation::Inpaint {
        prompt: "a red door".into(),
    }
}

struct FixedService {
    response: std::result::Result<GeneratedImage, GenerationError>,
}

#[async_trait::async_trait]
impl GenerationService for FixedService {
    async fn request(
        &self,
        _request: GenerationRequest,
    ) -> std::result::Result<GeneratedImage, GenerationError> {
        self.response.clone()
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

#[test]
fn load_image_starts_history_at_first_entry() {
    let project = loaded(200, 100);
    assert_eq!(project.history().index(), Some(0));
    assert_eq!(project.canvas(), CanvasSize::new(200.0, 100.0));
    assert!(project.mask().is_empty());
    assert_eq!(project.tool(), Tool::Inpaint);
}

#[test]
fn finished_stroke_commits_mask() {
    let mut project = loaded(200, 200);
    paint_stroke(&mut project);
    assert!(!project.mask().is_empty());
    assert_eq!(project.history().index(), Some(1));
}

#[test]
fn click_without_movement_commits_nothing() {
    let mut project = loaded(200, 200);
    project.update(press(40.0, 40.0));
    let event = project.update(release());
    assert!(event.is_none());
    assert_eq!(project.history().len(), 1);
}

#[test]
fn erasing_untouched_area_commits_nothing() {
    let mut project = loaded(200, 200);
    paint_stroke(&mut project);
    project.set_brush(BrushSettings::new(BrushMode::Erase, BrushWidth::new(10)));
    project.update(press(180.0, 10.0));
    project.update(move_to(190.0, 10.0));
    assert!(project.update(release()).is_none());
    assert_eq!(project.history().len(), 2);
}

#[test]
fn inpaint_accept_undo_scenario() {
    let mut project = loaded(200, 200);
    paint_stroke(&mut project);
    let painted = project.mask().clone();

    let ticket = project
        .begin_generation(&inpaint(), GenerationQuality::Medium)
        .expect("ticket");
    assert!(!ticket.is_full_image());
    assert_eq!(ticket.request().operation, "inpaint");
    assert!(project.is_busy());
    assert_eq!(project.history().index(), Some(1));

    let outcome = project
        .finish_generation(ticket, Ok(png(200, 200, RED)))
        .expect("finish");
    assert_eq!(outcome, GenerationOutcome::Applied);
    assert!(!project.is_busy());
    assert!(project.has_preview());
    assert_eq!(project.history().index(), Some(1));

    project.set_adjustments(Adjustments::new(10, 0, 0));
    project.accept().expect("accept");
    assert_eq!(project.history().index(), Some(2));
    assert!(project.mask().is_empty());
    assert!(!project.adjustments().has_changes());
    assert!(!project.has_preview());

    assert!(project.undo().expect("undo"));
    assert_eq!(project.history().index(), Some(1));
    assert_eq!(project.mask(), &painted);
    assert!(!project.has_preview());
    let restored = project.raster().expect("raster").bitmap().get_pixel(100, 100).0;
    assert_eq!(restored, BLUE);

    assert!(project.undo().expect("undo"));
    assert_eq!(project.history().index(), Some(0));
    assert!(project.mask().is_empty());
    assert!(!project.undo().expect("undo at start"));
}

#[test]
fn accepted_partial_result_only_replaces_masked_pixels() {
    let mut project = loaded(200, 200);
    paint_stroke(&mut project);
    let ticket = project
        .begin_generation(&inpaint(), GenerationQuality::Low)
        .expect("ticket");
    project
        .finish_generation(ticket, Ok(png(200, 200, RED)))
        .expect("finish");
    project.accept().expect("accept");

    let bitmap = project.raster().expect("raster").bitmap();
    assert_eq!(bitmap.get_pixel(60, 60).0, RED);
    assert_eq!(bitmap.get_pixel(180, 10).0, BLUE);
}

#[test]
fn full_image_result_changes_dimensions_on_accept() {
    let mut project = loaded(100, 80);
    let ticket = project
        .begin_generation(&Operation::Upscale, GenerationQuality::High)
        .expect("ticket");
    assert!(ticket.is_full_image());
    project
        .finish_generation(ticket, Ok(png(200, 160, RED)))
        .expect("finish");
    assert_eq!(project.export_dimensions(), Some((200, 160)));

    project.accept().expect("accept");
    assert_eq!(project.raster().expect("raster").dimensions(), (200, 160));
    assert_eq!(project.canvas(), CanvasSize::new(200.0, 160.0));

    project.undo().expect("undo");
    assert_eq!(project.raster().expect("raster").dimensions(), (100, 80));
    assert_eq!(project.canvas(), CanvasSize::new(100.0, 80.0));
}

#[test]
fn busy_project_rejects_second_generation() {
    let mut project = loaded(64, 64);
    let _ticket = project
        .begin_generation(&Operation::Upscale, GenerationQuality::Medium)
        .expect("ticket");
    let err = project
        .begin_generation(&Operation::Colorize, GenerationQuality::Medium)
        .expect_err("busy");
    assert!(matches!(err, Error::Blocked(ActionBlocked::Busy)));
}

#[test]
fn stale_result_is_discarded_after_new_project() {
    let mut project = loaded(64, 64);
    let ticket = project
        .begin_generation(&Operation::Upscale, GenerationQuality::Medium)
        .expect("ticket");

    project.new_project();
    project.load_image(raster(32, 32, BLUE)).expect("load");

    let outcome = project
        .finish_generation(ticket, Ok(png(128, 128, RED)))
        .expect("finish");
    assert_eq!(outcome, GenerationOutcome::Discarded);
    assert!(!project.has_preview());
    assert!(!project.is_busy());
    assert_eq!(project.raster().expect("raster").dimensions(), (32, 32));
}

#[test]
fn failed_generation_clears_busy_and_keeps_history() {
    let mut project = loaded(64, 64);
    let ticket = project
        .begin_generation(&Operation::Restore, GenerationQuality::Medium)
        .expect("ticket");
    let err = project
        .finish_generation(ticket, Err(GenerationError::Network("offline".into())))
        .expect_err("failure");
    assert!(matches!(err, Error::Generation(GenerationError::Network(_))));
    assert!(!project.is_busy());
    assert!(!project.has_preview());
    assert_eq!(project.history().len(), 1);
}

#[test]
fn magic_erase_without_mask_is_blocked_before_busy() {
    let mut project = loaded(64, 64);
    let err = project
        .begin_generation(&Operation::MagicErase, GenerationQuality::Medium)
        .expect_err("blocked");
    assert!(matches!(err, Error::Blocked(ActionBlocked::EmptyMask)));
    assert!(!project.is_busy());
}

#[test]
fn generation_without_image_is_blocked() {
    let mut project = Project::new();
    let err = project
        .begin_generation(&Operation::Upscale, GenerationQuality::Medium)
        .expect_err("blocked");
    assert!(matches!(err, Error::Blocked(ActionBlocked::NoImage)));
}

#[test]
fn accept_without_preview_is_blocked() {
    let mut project = loaded(64, 64);
    let err = project.accept().expect_err("blocked");
    assert!(matches!(err, Error::Blocked(ActionBlocked::NothingToAccept)));
}

#[test]
fn cancel_generation_keeps_history() {
    let mut project = loaded(64, 64);
    let ticket = project
        .begin_generation(&Operation::Retouch, GenerationQuality::Medium)
        .expect("ticket");
    project
        .finish_generation(ticket, Ok(png(64, 64, RED)))
        .expect("finish");
    project.cancel_generation();
    assert!(!project.has_preview());
    assert_eq!(project.history().len(), 1);
}

#[test]
fn cancel_generation_resets_adjustments() {
    let mut project = loaded(64, 64);
    let ticket = project
        .begin_generation(&Operation::Retouch, GenerationQuality::Medium)
        .expect("ticket");
    project
        .finish_generation(ticket, Ok(png(64, 64, RED)))
        .expect("finish");
    project.set_adjustments(Adjustments::new(40, 20, -10));

    project.update(SidebarMessage::CancelGeneration.into());
    assert!(!project.has_preview());
    assert!(!project.adjustments().has_changes());
}

#[test]
fn undo_with_preview_resets_adjustments() {
    let mut project = loaded(200, 200);
    paint_stroke(&mut project);
    let ticket = project
        .begin_generation(&inpaint(), GenerationQuality::Medium)
        .expect("ticket");
    project
        .finish_generation(ticket, Ok(png(200, 200, RED)))
        .expect("finish");
    project.set_adjustments(Adjustments::new(40, 20, -10));

    assert!(project.undo().expect("undo"));
    assert!(!project.has_preview());
    assert!(!project.adjustments().has_changes());

    project.set_adjustments(Adjustments::new(5, 0, 0));
    assert!(project.redo().expect("redo"));
    assert!(!project.adjustments().has_changes());
}

#[test]
fn result_requested_before_crop_is_discarded() {
    let mut project = loaded(200, 200);
    paint_stroke(&mut project);
    let ticket = project
        .begin_generation(&inpaint(), GenerationQuality::Medium)
        .expect("ticket");

    project.set_tool(Tool::Crop);
    project
        .set_crop_box(CropBox::new(0.0, 0.0, 50.0, 50.0))
        .expect("crop box");
    project.apply_crop().expect("crop");
    assert!(!project.is_busy());

    let outcome = project
        .finish_generation(ticket, Ok(png(200, 200, RED)))
        .expect("finish");
    assert_eq!(outcome, GenerationOutcome::Discarded);
    assert!(!project.has_preview());
    assert_eq!(project.export_dimensions(), Some((50, 50)));
}

#[test]
fn result_requested_before_text_apply_is_discarded() {
    let mut project = loaded(200, 100);
    let ticket = project
        .begin_generation(&Operation::Colorize, GenerationQuality::Medium)
        .expect("ticket");
    project.add_text_layer(10.0, 10.0).expect("layer");
    project.apply_text().expect("apply");

    let outcome = project
        .finish_generation(ticket, Ok(png(300, 300, RED)))
        .expect("finish");
    assert_eq!(outcome, GenerationOutcome::Discarded);
    assert!(!project.has_preview());
    assert_eq!(project.export_dimensions(), Some((200, 100)));
}

#[test]
fn result_requested_before_undo_or_redo_is_discarded() {
    let mut project = loaded(200, 200);
    paint_stroke(&mut project);

    let ticket = project
        .begin_generation(&inpaint(), GenerationQuality::Medium)
        .expect("ticket");
    assert!(project.undo().expect("undo"));
    assert!(!project.is_busy());
    let outcome = project
        .finish_generation(ticket, Ok(png(200, 200, RED)))
        .expect("finish");
    assert_eq!(outcome, GenerationOutcome::Discarded);
    assert!(!project.has_preview());

    let ticket = project
        .begin_generation(&Operation::Colorize, GenerationQuality::Medium)
        .expect("ticket");
    assert!(project.redo().expect("redo"));
    let outcome = project
        .finish_generation(ticket, Ok(png(200, 200, RED)))
        .expect("finish");
    assert_eq!(outcome, GenerationOutcome::Discarded);
    assert!(!project.has_preview());
    assert!(!project.is_busy());
}

#[tokio::test]
async fn generate_runs_service_round_trip() {
    let mut project = loaded(64, 64);
    let service = FixedService {
        response: Ok(png(64, 64, RED)),
    };
    let outcome = project
        .generate(&service, &Operation::AutoEnhance, GenerationQuality::Medium)
        .await
        .expect("generate");
    assert_eq!(outcome, GenerationOutcome::Applied);
    assert!(project.generated().is_some_and(|g| g.is_full_image));
}

#[test]
fn strokes_are_ignored_while_preview_exists() {
    let mut project = loaded(200, 200);
    let ticket = project
        .begin_generation(&Operation::Colorize, GenerationQuality::Medium)
        .expect("ticket");
    project
        .finish_generation(ticket, Ok(png(200, 200, RED)))
        .expect("finish");

    project.update(press(50.0, 100.0));
    project.update(move_to(150.0, 100.0));
    assert!(project.update(release()).is_none());
    assert!(project.mask().is_empty());
    assert_eq!(project.compare().percent(), 75.0);
}

#[test]
fn compare_hold_requires_preview() {
    let mut project = loaded(64, 64);
    let key = |key: &str| KeyboardMessage::KeyPressed {
        key: key.into(),
        modifiers: Modifiers::default(),
    };
    project.update(key("c").into());
    assert!(!project.compare().is_holding());

    let ticket = project
        .begin_generation(&Operation::Colorize, GenerationQuality::Medium)
        .expect("ticket");
    project
        .finish_generation(ticket, Ok(png(64, 64, RED)))
        .expect("finish");
    project.update(key("C").into());
    assert!(project.compare().is_holding());

    project.update(KeyboardMessage::KeyReleased { key: "c".into() }.into());
    assert!(!project.compare().is_holding());
}

#[test]
fn keyboard_shortcuts_undo_and_redo() {
    let mut project = loaded(200, 200);
    paint_stroke(&mut project);
    let command = Modifiers {
        control: true,
        ..Modifiers::default()
    };

    let event = project.update(
        KeyboardMessage::KeyPressed {
            key: "z".into(),
            modifiers: command,
        }
        .into(),
    );
    assert!(matches!(event, Event::HistoryRestored));
    assert!(project.mask().is_empty());

    let event = project.update(
        KeyboardMessage::KeyPressed {
            key: "Z".into(),
            modifiers: Modifiers {
                shift: true,
                ..command
            },
        }
        .into(),
    );
    assert!(matches!(event, Event::HistoryRestored));
    assert!(!project.mask().is_empty());
}

#[test]
fn commit_after_undo_discards_redo() {
    let mut project = loaded(200, 200);
    paint_stroke(&mut project);
    project.undo().expect("undo");
    assert!(project.can_redo());

    project.update(press(150.0, 150.0));
    project.update(move_to(170.0, 170.0));
    project.update(release());
    assert!(!project.can_redo());
    assert_eq!(project.history().len(), 2);
}

#[test]
fn crop_apply_commits_and_undo_restores_size() {
    let mut project = loaded(200, 100);
    project.set_tool(Tool::Crop);
    assert_eq!(project.crop_box(), Some(CropBox::new(0.0, 0.0, 200.0, 100.0)));

    project
        .set_crop_box(CropBox::new(50.0, 25.0, 100.0, 50.0))
        .expect("crop box");
    let event = project.update(SidebarMessage::ApplyCrop.into());
    assert!(matches!(event, Event::ImageReplaced));
    assert_eq!(project.raster().expect("raster").dimensions(), (100, 50));
    assert_eq!(project.tool(), Tool::Inpaint);
    assert!(project.crop_box().is_none());
    assert_eq!(project.history().index(), Some(1));

    project.undo().expect("undo");
    assert_eq!(project.raster().expect("raster").dimensions(), (200, 100));
}

#[test]
fn crop_maps_fitted_canvas_to_natural_pixels() {
    let mut project = loaded(400, 200);
    project.fit_canvas(200.0, 200.0).expect("fit");
    assert_eq!(project.canvas(), CanvasSize::new(200.0, 100.0));

    project
        .set_crop_box(CropBox::new(0.0, 0.0, 100.0, 100.0))
        .expect("crop box");
    project.apply_crop().expect("crop");
    assert_eq!(project.raster().expect("raster").dimensions(), (200, 200));
}

#[test]
fn leaving_crop_tool_discards_box() {
    let mut project = loaded(100, 100);
    project.set_tool(Tool::Crop);
    project.set_tool(Tool::Inpaint);
    assert!(project.crop_box().is_none());
    let err = project.apply_crop().expect_err("no box");
    assert!(matches!(err, Error::Blocked(ActionBlocked::NoCropBox)));
}

#[test]
fn crop_drag_moves_box_through_messages() {
    let mut project = loaded(200, 200);
    project.update(SidebarMessage::SelectTool(Tool::Crop).into());
    project
        .set_crop_box(CropBox::new(50.0, 50.0, 50.0, 50.0))
        .expect("crop box");

    project.update(press(75.0, 75.0));
    project.update(move_to(85.0, 95.0));
    project.update(release());
    assert_eq!(project.crop_box(), Some(CropBox::new(60.0, 70.0, 50.0, 50.0)));
}

#[test]
fn text_press_creates_layer_and_apply_commits() {
    let mut project = loaded(200, 100);
    project.set_tool(Tool::Text);
    let event = project.update(press(20.0, 10.0));
    let Event::TextLayerCreated(id) = event else {
        panic!("expected a text layer, got {event:?}");
    };
    let layer = project.selected_text_layer().expect("selected");
    assert_eq!(layer.id, id);
    assert_eq!((layer.x, layer.y), (10.0, 10.0));

    project.apply_text().expect("apply");
    assert!(project.text_layers().is_empty());
    assert_eq!(project.tool(), Tool::Inpaint);
    assert_eq!(project.history().index(), Some(1));
    assert_eq!(project.raster().expect("raster").dimensions(), (200, 100));
}

#[test]
fn deleting_first_text_layer_leaves_second_unchanged() {
    let mut project = loaded(200, 200);
    let first = project.add_text_layer(10.0, 10.0).expect("first");
    let second = project.add_text_layer(50.0, 50.0).expect("second");
    let before = project.text_layers()[1].clone();

    project.select_text_layer(Some(&first));
    project.delete_text_layer(&first).expect("delete");
    assert_eq!(project.text_layers(), &[before]);
    assert!(project.selected_text_layer().is_none());
    assert_eq!(project.text_layers()[0].id, second);
}

#[test]
fn apply_text_without_layers_is_blocked() {
    let mut project = loaded(64, 64);
    let err = project.apply_text().expect_err("blocked");
    assert!(matches!(err, Error::Blocked(ActionBlocked::NoTextLayers)));
}

#[test]
fn eyedropper_reports_uppercase_hex() {
    let mut project = loaded(50, 50);
    project.set_tool(Tool::Eyedropper);
    let event = project.update(press(10.0, 10.0));
    assert!(matches!(event, Event::ColorPicked(ref color) if color == "#0000FF"));
    assert_eq!(project.picked_color(), "#0000FF");
}

#[test]
fn fit_canvas_keeps_mask() {
    let mut project = loaded(200, 200);
    paint_stroke(&mut project);
    let mask = project.mask().clone();
    project.fit_canvas(100.0, 100.0).expect("fit");
    assert_eq!(project.canvas(), CanvasSize::new(100.0, 100.0));
    assert_eq!(project.mask(), &mask);
}

#[test]
fn render_preview_uses_canvas_size() {
    let mut project = loaded(400, 200);
    project.fit_canvas(100.0, 100.0).expect("fit");
    let preview = project.render_preview().expect("preview");
    assert_eq!((preview.width(), preview.height()), (100, 50));
}

#[test]
fn export_without_image_is_blocked() {
    let project = Project::new();
    let options = ExportOptions::new(ExportFormat::Png, 10, 10);
    let err = project.export(&options).expect_err("blocked");
    assert!(matches!(err, Error::Blocked(ActionBlocked::NoImage)));
    assert_eq!(project.export_dimensions(), None);
}

#[test]
fn export_encodes_requested_size() {
    let project = loaded(120, 80);
    let options = ExportOptions::new(ExportFormat::Jpeg, 60, 40);
    let encoded = project.export(&options).expect("export");
    let decoded = image_rs::load_from_memory(&encoded.bytes).expect("decode");
    assert_eq!((decoded.width(), decoded.height()), (60, 40));
}

#[test]
fn canvas_messages_without_image_do_nothing() {
    let mut project = Project::new();
    assert!(project.update(press(1.0, 1.0)).is_none());
    assert!(project.update(release()).is_none());
}
