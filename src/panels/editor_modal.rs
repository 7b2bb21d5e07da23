use egui::{Button, RichText, Sense, Vec2};

use crate::ShapeStudioApp;
use crate::geometry::Shape;
use crate::session::STICKER_PALETTE;
use crate::transform::ZoomDirection;

/// Side length of the square edit surface, which is also the export size
pub const EDIT_SURFACE_SIZE: f32 = 400.0;

pub fn editor_modal(app: &mut ShapeStudioApp, ctx: &egui::Context) {
    if !app.editor().is_open() {
        return;
    }

    let mut open = true;
    egui::Window::new("Edit photo")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, Vec2::ZERO)
        .open(&mut open)
        .show(ctx, |ui| {
            shape_row(app, ui);
            ui.separator();

            // Edit surface
            let (response, painter) = ui.allocate_painter(Vec2::splat(EDIT_SURFACE_SIZE), Sense::drag());
            app.handle_surface_input(ctx, response.rect);
            app.render_preview(ctx, &painter, response.rect);

            ui.separator();
            zoom_row(app, ui);
            ui.separator();
            sticker_rows(app, ui);
            ui.separator();

            ui.horizontal(|ui| {
                let saving = app.is_saving();
                if ui.add_enabled(!saving, Button::new("💾 Save")).clicked() {
                    app.save_edit();
                }
                if ui.button("Cancel").clicked() {
                    app.cancel_edit();
                }
                if saving {
                    ui.spinner();
                }
            });
        });

    if !open {
        app.cancel_edit();
    }
}

fn shape_row(app: &mut ShapeStudioApp, ui: &mut egui::Ui) {
    let current = app.editor().session().map(|s| s.shape());
    ui.horizontal(|ui| {
        ui.label("Shape:");
        for shape in Shape::ALL {
            let label = format!("{} {}", shape.icon(), shape);
            if ui.selectable_label(current == Some(shape), label).clicked() {
                log::info!("Shape selected from UI: {}", shape);
                app.editor_mut().set_shape(shape);
            }
        }
    });
}

fn zoom_row(app: &mut ShapeStudioApp, ui: &mut egui::Ui) {
    let scale = app
        .editor()
        .session()
        .map(|s| s.base().transform.scale)
        .unwrap_or(1.0);
    ui.horizontal(|ui| {
        ui.label("Photo zoom:");
        if ui.button("➖").clicked() {
            app.editor_mut().zoom(ZoomDirection::Out);
        }
        ui.label(format!("{:.0}%", scale * 100.0));
        if ui.button("➕").clicked() {
            app.editor_mut().zoom(ZoomDirection::In);
        }
    });
}

fn sticker_rows(app: &mut ShapeStudioApp, ui: &mut egui::Ui) {
    ui.label("Stickers:");
    egui::Grid::new("sticker_palette").spacing([4.0, 4.0]).show(ui, |ui| {
        for (i, glyph) in STICKER_PALETTE.iter().enumerate() {
            if ui.button(RichText::new(*glyph).size(20.0)).clicked() {
                app.editor_mut().add_sticker(glyph);
            }
            if i % 8 == 7 {
                ui.end_row();
            }
        }
    });

    let selected = app
        .editor()
        .session()
        .and_then(|s| s.selected_sticker().and_then(|id| s.sticker(id)))
        .map(|sticker| (sticker.glyph.clone(), sticker.scale()));

    ui.horizontal(|ui| {
        let Some((glyph, scale)) = selected else {
            ui.weak("Click a sticker to select it");
            return;
        };
        ui.label(format!("Selected {} at {:.0}%", glyph, scale * 100.0));
        if ui.button("➖").clicked() {
            app.editor_mut().zoom_selected_sticker(ZoomDirection::Out);
        }
        if ui.button("➕").clicked() {
            app.editor_mut().zoom_selected_sticker(ZoomDirection::In);
        }
        if ui.button("🗑 Remove").clicked() {
            app.editor_mut().remove_selected_sticker();
        }
    });
}
