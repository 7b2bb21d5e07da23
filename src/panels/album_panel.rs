use egui::Vec2;

use crate::ShapeStudioApp;
use crate::store::PhotoId;

const THUMBNAIL_SIZE: f32 = 96.0;

pub fn album_panel(app: &mut ShapeStudioApp, ctx: &egui::Context) {
    egui::SidePanel::right("album_panel")
        .resizable(true)
        .default_width(240.0)
        .show(ctx, |ui| {
            ui.heading("Album");
            ui.label(format!("{} photos", app.store().len()));
            ui.separator();

            let mut to_remove: Option<PhotoId> = None;
            let mut to_download: Option<PhotoId> = None;
            egui::ScrollArea::vertical().show(ui, |ui| {
                let (store, thumbnails) = app.album_mut();
                for photo in store.photos() {
                    ui.horizontal(|ui| {
                        match thumbnails.get_or_create(ctx, photo) {
                            Some(texture) => {
                                ui.image((texture.id(), Vec2::splat(THUMBNAIL_SIZE)));
                            }
                            None => {
                                ui.label("⚠");
                            }
                        }
                        ui.vertical(|ui| {
                            ui.label(format!("{} {}", photo.shape.icon(), photo.shape));
                            ui.label(format!("{} stickers", photo.stickers.len()));
                            ui.horizontal(|ui| {
                                if ui.small_button("⬇ Download").clicked() {
                                    to_download = Some(photo.id);
                                }
                                if ui.small_button("🗑 Remove").clicked() {
                                    to_remove = Some(photo.id);
                                }
                            });
                        });
                    });
                    ui.separator();
                }
            });

            if let Some(id) = to_download {
                app.download_photo(id);
            }
            if let Some(id) = to_remove {
                app.remove_photo(id);
            }
        });
}
