//! egui widgets drawn into the overlay each frame.

use crate::{
    camera::{CameraState, Viewport},
    loader::LoadStatus,
    picking::Selection,
    renderer::BloomParams,
    scene::LabelPrimitive,
    shader::point_size_px,
};
use egui::{Align2, Color32, FontId, LayerId, Order};

/// Pixel gap between a point's sprite and the bottom of its label.
const LABEL_GAP_PX: f32 = 4.0;

/// Screen position of the label's bottom-centre in physical pixels, or `None` when it is hidden
/// or behind the camera.
pub fn label_anchor_px(
    label: &LabelPrimitive,
    camera: &CameraState,
    viewport: Viewport,
) -> Option<egui::Pos2> {
    if !label.visible || label.text.is_empty() {
        return None;
    }
    let px = camera.world_to_pixel(label.anchor, viewport)?;
    let lift = point_size_px(camera.view_depth(label.anchor)) * 0.5 + LABEL_GAP_PX;
    Some(egui::pos2(px.x, px.y - lift))
}

/// Paints the selection label above its point. Non-interactive, so it never steals input.
pub fn draw_label(
    ctx: &egui::Context,
    label: &LabelPrimitive,
    camera: &CameraState,
    viewport: Viewport,
) {
    let Some(anchor) = label_anchor_px(label, camera, viewport) else {
        return;
    };
    let ppp = ctx.pixels_per_point();
    let pos = egui::pos2(anchor.x / ppp, anchor.y / ppp);

    let painter = ctx.layer_painter(LayerId::new(Order::Foreground, egui::Id::new("point_label")));
    let galley = painter.layout_no_wrap(
        label.text.clone(),
        FontId::proportional(14.0),
        Color32::WHITE,
    );
    let rect = Align2::CENTER_BOTTOM
        .anchor_size(pos, galley.size())
        .expand(3.0);
    painter.rect_filled(rect, 3.0, Color32::from_black_alpha(160));
    painter.galley(rect.shrink(3.0).min, galley, Color32::WHITE);
}

pub fn draw_hud(ctx: &egui::Context, status: &LoadStatus, selection: &Selection) {
    egui::Area::new(egui::Id::new("hud"))
        .anchor(Align2::LEFT_TOP, egui::vec2(10.0, 10.0))
        .interactable(false)
        .show(ctx, |ui| {
            let color = match status {
                LoadStatus::Failed(_) => Color32::LIGHT_RED,
                _ => Color32::LIGHT_GRAY,
            };
            ui.colored_label(color, status.to_string());
            if let Some(index) = selection.index {
                ui.label(format!("#{index}  {}", selection.label));
            }
        });
}

pub fn draw_debug_panel(ctx: &egui::Context, params: &mut BloomParams) {
    egui::Window::new("Bloom")
        .default_pos(egui::pos2(10.0, 80.0))
        .resizable(false)
        .show(ctx, |ui| {
            ui.checkbox(&mut params.enabled, "Enabled");
            ui.add_enabled_ui(params.enabled, |ui| {
                ui.add(egui::Slider::new(&mut params.intensity, 0.0..=5.0).text("Intensity"));
                ui.add(egui::Slider::new(&mut params.threshold, 0.0..=1.0).text("Threshold"));
                ui.add(egui::Slider::new(&mut params.radius_px, 0.0..=16.0).text("Radius (px)"));
            });
            if ui.button("Reset").clicked() {
                *params = BloomParams::default();
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::DEFAULT_FOV_DEG;
    use glam::Vec3;

    #[test]
    fn label_sits_above_centred_point() {
        let vp = Viewport::new(800, 600);
        let cam = CameraState::new(DEFAULT_FOV_DEG, vp);
        let mut label = LabelPrimitive::default();
        label.show("/alpha", Vec3::ZERO);

        let pos = label_anchor_px(&label, &cam, vp).unwrap();
        assert!((pos.x - 400.0).abs() < 1e-3);
        // Depth 1: 4 px sprite, so half of it plus the gap.
        assert!((pos.y - (300.0 - 2.0 - LABEL_GAP_PX)).abs() < 1e-3);
    }

    #[test]
    fn hidden_or_behind_labels_are_skipped() {
        let vp = Viewport::new(800, 600);
        let cam = CameraState::new(DEFAULT_FOV_DEG, vp);
        let mut label = LabelPrimitive::default();
        assert!(label_anchor_px(&label, &cam, vp).is_none());
        label.show("/behind", Vec3::new(0.0, 0.0, 5.0));
        assert!(label_anchor_px(&label, &cam, vp).is_none());
    }
}
