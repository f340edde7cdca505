//! Gallery panel - egui UI and input routing.
//!
//! Hosts the GL paint callback for the card renderer and translates egui
//! pointer/wheel input into orbit-controller calls. Presses latch only when
//! they start inside the panel rect; moves and releases are processed
//! regardless so a drag can leave the panel without getting stuck.

use std::sync::{Arc, Mutex};

use eframe::egui;
use glam::Vec2;

use crate::render::renderer::CardRenderer;
use crate::shell::GalleryShell;

const BACKDROP: egui::Color32 = egui::Color32::from_rgb(26, 24, 30);

/// Render the gallery viewport inside the provided UI.
pub fn render(ui: &mut egui::Ui, shell: &mut GalleryShell, renderer: &Arc<Mutex<CardRenderer>>) {
    let ctx = ui.ctx().clone();
    let panel_rect = ui.max_rect();
    ui.painter().rect_filled(panel_rect, 0.0, BACKDROP);

    let response = ui.interact(
        panel_rect,
        ui.id().with("gallery_interaction"),
        egui::Sense::click_and_drag(),
    );

    handle_gallery_input(&ctx, panel_rect, shell, response.hovered());

    let aspect = panel_rect.width() / panel_rect.height().max(1.0);
    let plan = shell.scene(aspect);

    // Draw the cards through the GL callback; overlays painted before this
    // point would be overdrawn, so keep them after it.
    let renderer_cb = Arc::clone(renderer);
    ui.painter().add(egui::PaintCallback {
        rect: panel_rect,
        callback: Arc::new(egui_glow::CallbackFn::new(move |_info, painter| {
            let gl = painter.gl();
            renderer_cb.lock().unwrap().paint(gl, &plan);
        })),
    });

    if let Ok(r) = renderer.lock()
        && let Some(err) = r.shader_error()
    {
        ui.painter().text(
            panel_rect.center(),
            egui::Align2::CENTER_CENTER,
            err,
            egui::FontId::proportional(16.0),
            egui::Color32::RED,
        );
    }

    // The sphere animates even when untouched.
    ctx.request_repaint();
}

fn handle_gallery_input(
    ctx: &egui::Context,
    rect: egui::Rect,
    shell: &mut GalleryShell,
    is_hovered: bool,
) {
    let (pressed, released, down, latest_pos, scroll) = ctx.input(|i| {
        (
            i.pointer.button_pressed(egui::PointerButton::Primary),
            i.pointer.button_released(egui::PointerButton::Primary),
            i.pointer.button_down(egui::PointerButton::Primary),
            i.pointer.latest_pos(),
            i.raw_scroll_delta,
        )
    });

    // Wheel zoom only while the cursor is over the panel.
    if is_hovered
        && scroll.y.abs() > 0.1
        && latest_pos.is_some_and(|p| rect.contains(p))
    {
        shell.wheel(scroll.y);
    }

    if pressed
        && let Some(pos) = latest_pos
        && rect.contains(pos)
    {
        shell.pointer_down(to_vec2(pos));
    }

    if down && let Some(pos) = latest_pos {
        // No-op while idle, so presses that started elsewhere stay ignored.
        shell.pointer_move(to_vec2(pos));
    }

    if released {
        let click_eligible = shell.pointer_up();
        if click_eligible
            && let Some(pos) = latest_pos
            && rect.contains(pos)
        {
            shell.click(screen_to_ndc(pos, rect));
        }
    }
}

fn to_vec2(pos: egui::Pos2) -> Vec2 {
    Vec2::new(pos.x, pos.y)
}

/// Screen position -> normalized device coordinates against the panel rect.
///
/// egui is Y-down, NDC is Y-up.
fn screen_to_ndc(pos: egui::Pos2, rect: egui::Rect) -> Vec2 {
    let x = (pos.x - rect.left()) / rect.width().max(1.0) * 2.0 - 1.0;
    let y = 1.0 - (pos.y - rect.top()) / rect.height().max(1.0) * 2.0;
    Vec2::new(x, y)
}
