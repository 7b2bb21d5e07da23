use std::cell::RefCell;
use std::rc::Rc;

use egui::{Pos2, Vec2};
use futures::executor::block_on;
use image::{GenericImageView, Rgba, RgbaImage};
use shape_studio::{
    Compositor, EditorConfig, EditorError, FontGlyphPainter, GlyphPainter, PhotoEditor, Shape,
    SourceImage, ZoomDirection,
};
use tiny_skia::{Mask, Pixmap};

#[derive(Debug, Clone, PartialEq)]
struct GlyphCall {
    text: String,
    center: Pos2,
    font_size: f32,
}

/// Records glyph draws instead of rasterizing them
#[derive(Clone, Default)]
struct RecordingPainter {
    calls: Rc<RefCell<Vec<GlyphCall>>>,
}

impl GlyphPainter for RecordingPainter {
    fn paint_glyph(
        &self,
        _pixmap: &mut Pixmap,
        text: &str,
        center: Pos2,
        font_size: f32,
        _color: [u8; 4],
        _clip: Option<&Mask>,
    ) {
        self.calls.borrow_mut().push(GlyphCall {
            text: text.to_owned(),
            center,
            font_size,
        });
    }
}

fn photo(width: u32, height: u32) -> SourceImage {
    SourceImage::from_rgba(&RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]))).unwrap()
}

fn export_now(editor: &mut PhotoEditor) -> shape_studio::ExportedPhoto {
    let handle = editor.export().unwrap();
    editor.pump();
    block_on(handle).unwrap()
}

#[test]
fn test_circle_export_with_centered_sticker() {
    let painter = RecordingPainter::default();
    let mut editor = PhotoEditor::with_compositor(
        EditorConfig::default(),
        Compositor::with_glyph_painter(painter.clone()),
    );
    editor.open_image(photo(400, 400), Vec2::splat(400.0));
    editor.set_shape(Shape::Circle);
    let id = editor.add_sticker("★").unwrap();

    let exported = export_now(&mut editor);
    assert_eq!((exported.width, exported.height), (400, 400));
    assert_eq!(exported.shape, Shape::Circle);
    assert_eq!(exported.stickers.len(), 1);
    assert_eq!(exported.stickers[0].id, id);
    assert_eq!(exported.stickers[0].glyph, "★");
    assert_eq!((exported.stickers[0].x, exported.stickers[0].y), (0.0, 0.0));
    assert_eq!(exported.stickers[0].scale, 1.0);

    let calls = painter.calls.borrow();
    assert_eq!(
        *calls,
        vec![GlyphCall {
            text: "★".into(),
            center: Pos2::new(200.0, 200.0),
            font_size: 40.0,
        }]
    );

    let decoded = image::load_from_memory(&exported.bytes).unwrap();
    assert_eq!(decoded.dimensions(), (400, 400));
    for (x, y) in [(0, 0), (399, 0), (0, 399), (399, 399), (40, 40), (360, 360)] {
        assert_eq!(decoded.get_pixel(x, y)[3], 0, "pixel ({x}, {y}) should be outside the circle");
    }
    assert_eq!(decoded.get_pixel(200, 200), Rgba([255, 255, 255, 255]));
    assert_eq!(decoded.get_pixel(200, 5)[3], 255);
}

#[test]
fn test_stickers_paint_in_z_order_at_scaled_size() {
    let painter = RecordingPainter::default();
    let mut editor = PhotoEditor::with_compositor(
        EditorConfig::default(),
        Compositor::with_glyph_painter(painter.clone()),
    );
    editor.open_image(photo(100, 100), Vec2::splat(300.0));

    editor.add_sticker("A").unwrap();
    let b = editor.add_sticker("B").unwrap();
    editor.zoom_selected_sticker(ZoomDirection::In);
    editor.session_mut().unwrap().set_sticker_position(b, Vec2::new(-50.0, 25.0));

    export_now(&mut editor);

    let calls = painter.calls.borrow();
    let texts: Vec<_> = calls.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["A", "B"]);
    assert_eq!(calls[1].center, Pos2::new(100.0, 175.0));
    assert!((calls[1].font_size - 44.0).abs() < 1e-3);
}

#[test]
fn test_export_is_deterministic() {
    let build = || {
        let mut editor = PhotoEditor::with_compositor(
            EditorConfig::default(),
            Compositor::with_glyph_painter(FontGlyphPainter::from_egui_defaults()),
        );
        editor.open_image(photo(120, 80), Vec2::splat(200.0));
        editor.set_shape(Shape::Star);
        editor.zoom(ZoomDirection::In);
        editor.session_mut().unwrap().set_base_position(Vec2::new(12.0, -7.0));
        editor.add_sticker("A");
        editor.add_sticker("😊");
        editor
    };

    let mut first = build();
    let mut second = build();
    let a = export_now(&mut first);
    let b = export_now(&mut second);
    assert_eq!(a.bytes, b.bytes);

    // Exporting does not disturb the session
    let c = export_now(&mut first);
    assert_eq!(a.bytes, c.bytes);
}

#[test]
fn test_glyph_ink_lands_near_center() {
    let mut editor = PhotoEditor::with_compositor(
        EditorConfig::default(),
        Compositor::with_glyph_painter(FontGlyphPainter::from_egui_defaults()),
    );
    editor.open_image(photo(200, 200), Vec2::splat(200.0));
    editor.add_sticker("A");

    let frame = editor.compositor().render(editor.session().unwrap()).unwrap();
    let mut dark = Vec::new();
    for y in 0..200 {
        for x in 0..200 {
            let pixel = frame.pixmap().pixel(x, y).unwrap();
            if pixel.red() < 128 {
                dark.push((x as i32, y as i32));
            }
        }
    }

    assert!(!dark.is_empty());
    for (x, y) in dark {
        assert!((x - 100).abs() <= 30 && (y - 100).abs() <= 30);
    }
}

#[test]
fn test_zero_size_surface_is_a_render_failure() {
    let mut editor = PhotoEditor::with_compositor(
        EditorConfig::default(),
        Compositor::with_glyph_painter(RecordingPainter::default()),
    );
    editor.open_image(photo(10, 10), Vec2::new(0.0, 300.0));
    let revision = editor.session().unwrap().revision();

    assert!(matches!(editor.export(), Err(EditorError::RenderFailure(_))));
    assert_eq!(editor.session().unwrap().revision(), revision);
    assert!(!editor.has_pending_export());
}

#[test]
fn test_closing_before_encode_cancels() {
    let mut editor = PhotoEditor::with_compositor(
        EditorConfig::default(),
        Compositor::with_glyph_painter(RecordingPainter::default()),
    );
    editor.open_image(photo(10, 10), Vec2::splat(50.0));

    let mut handle = editor.export().unwrap();
    editor.close();
    editor.pump();

    assert_eq!(handle.try_take(), Some(Err(EditorError::ExportCancelled)));
    assert_eq!(handle.try_take(), None);
}
