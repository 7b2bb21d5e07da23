//! Session lifecycle and the deferred export queue.
//!
//! [`PhotoEditor`] is what the UI talks to. It owns at most one
//! [`EditSession`] at a time together with the drag controller and the
//! compositor, and it turns button clicks into session operations.
//!
//! Exports run in two halves. [`PhotoEditor::export`] renders the frame right
//! away and hands back an [`ExportHandle`]; the PNG encode happens on the next
//! [`PhotoEditor::pump`] (normally the next UI tick), which resolves the
//! handle. Closing the session first drops the queued frame and the handle
//! resolves to [`EditorError::ExportCancelled`] instead.

use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use egui::Vec2;
use futures::channel::oneshot;
use futures::FutureExt;
use log::{debug, info};

use crate::compositor::{Compositor, ExportedPhoto, Frame};
use crate::config::EditorConfig;
use crate::error::{EditorError, EditorResult};
use crate::event::{EventBus, EventHandler, Subscription};
use crate::geometry::Shape;
use crate::input::{InteractionController, PointerEvent, PointerSurface};
use crate::session::{EditSession, SourceImage, StickerId};
use crate::transform::ZoomDirection;

type ExportResult = EditorResult<ExportedPhoto>;

/// Resolves once with the encoded export, or with
/// [`EditorError::ExportCancelled`] if the session closed first.
#[derive(Debug)]
pub struct ExportHandle {
    receiver: oneshot::Receiver<ExportResult>,
    finished: bool,
}

impl ExportHandle {
    fn new(receiver: oneshot::Receiver<ExportResult>) -> Self {
        Self {
            receiver,
            finished: false,
        }
    }

    /// Non-blocking poll for UI loops. Yields `Some` exactly once.
    pub fn try_take(&mut self) -> Option<ExportResult> {
        if self.finished {
            return None;
        }
        let result = match self.receiver.try_recv() {
            Ok(Some(result)) => result,
            Ok(None) => return None,
            Err(oneshot::Canceled) => Err(EditorError::ExportCancelled),
        };
        self.finished = true;
        Some(result)
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl Future for ExportHandle {
    type Output = ExportResult;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        this.receiver.poll_unpin(cx).map(|result| {
            this.finished = true;
            result.unwrap_or(Err(EditorError::ExportCancelled))
        })
    }
}

struct PendingExport {
    frame: Frame,
    sender: oneshot::Sender<ExportResult>,
}

pub struct PhotoEditor {
    config: EditorConfig,
    bus: Rc<EventBus>,
    compositor: Compositor,
    controller: InteractionController,
    session: Option<EditSession>,
    pending: Option<PendingExport>,
    encode: fn(Frame) -> ExportResult,
}

impl std::fmt::Debug for PhotoEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhotoEditor")
            .field("session", &self.session)
            .field("drag", &self.controller.state().name())
            .field("pending_export", &self.pending.is_some())
            .finish()
    }
}

impl Default for PhotoEditor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl PhotoEditor {
    pub fn new(config: EditorConfig) -> Self {
        Self::with_compositor(config, Compositor::new())
    }

    pub fn with_compositor(config: EditorConfig, compositor: Compositor) -> Self {
        Self {
            config,
            bus: Rc::new(EventBus::new()),
            compositor,
            controller: InteractionController::new(),
            session: None,
            pending: None,
            encode: Frame::encode,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// The bus outlives individual sessions; observers stay subscribed
    /// across open/close.
    pub fn bus(&self) -> &Rc<EventBus> {
        &self.bus
    }

    pub fn subscribe(&self, handler: impl EventHandler + 'static) -> Subscription {
        self.bus.subscribe(handler)
    }

    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        self.bus.unsubscribe(subscription)
    }

    pub fn session(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut EditSession> {
        self.session.as_mut()
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    /// Starts a session on encoded image bytes. On failure no session is
    /// created and any previous one is left open.
    pub fn open(&mut self, bytes: &[u8], viewport: Vec2) -> EditorResult<&mut EditSession> {
        let image = SourceImage::decode(bytes)?;
        Ok(self.open_image(image, viewport))
    }

    /// Starts a session on an already decoded image, closing any open one.
    pub fn open_image(&mut self, image: SourceImage, viewport: Vec2) -> &mut EditSession {
        self.close();
        let session = EditSession::new(image, viewport, self.config.clone(), Rc::clone(&self.bus));
        self.session.insert(session)
    }

    /// Swaps the photo of the open session for a newly chosen one.
    pub fn replace_photo(&mut self, bytes: &[u8]) -> EditorResult<()> {
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| EditorError::InvalidInput("no open edit session".into()))?;
        let image = SourceImage::decode(bytes)?;
        self.controller.reset();
        session.replace_image(image);
        Ok(())
    }

    /// Ends the session, discarding its state and any export still waiting
    /// to be encoded. Returns false if nothing was open.
    pub fn close(&mut self) -> bool {
        if let Some(pending) = self.pending.take() {
            info!("Discarding queued export ({:?})", pending.frame);
        }
        self.controller.reset();
        match self.session.take() {
            Some(session) => {
                info!("Closing edit session ({} stickers)", session.stickers().len());
                true
            }
            None => false,
        }
    }

    pub fn set_viewport(&mut self, viewport: Vec2) {
        if let Some(session) = self.session.as_mut() {
            session.set_viewport(viewport);
        }
    }

    pub fn handle_pointer(&mut self, event: PointerEvent, surface: &mut dyn PointerSurface) {
        if let Some(session) = self.session.as_mut() {
            self.controller.handle_event(event, session, surface);
        }
    }

    pub fn zoom(&mut self, direction: ZoomDirection) -> Option<f32> {
        self.session.as_mut().map(|s| s.zoom_base(direction))
    }

    pub fn set_shape(&mut self, shape: Shape) {
        if let Some(session) = self.session.as_mut() {
            session.set_shape(shape);
        }
    }

    pub fn add_sticker(&mut self, glyph: &str) -> Option<StickerId> {
        self.session.as_mut().map(|s| s.add_sticker(glyph))
    }

    pub fn remove_selected_sticker(&mut self) -> bool {
        self.session
            .as_mut()
            .is_some_and(|s| s.remove_selected_sticker())
    }

    pub fn zoom_selected_sticker(&mut self, direction: ZoomDirection) -> Option<f32> {
        self.session.as_mut()?.zoom_selected_sticker(direction)
    }

    /// Renders the open session and queues it for encoding.
    ///
    /// Render errors are returned directly and leave nothing queued. An
    /// export already waiting is encoded first so each handle resolves once.
    pub fn export(&mut self) -> EditorResult<ExportHandle> {
        let session = self
            .session
            .as_ref()
            .ok_or_else(|| EditorError::InvalidInput("no open edit session".into()))?;
        let frame = self.compositor.render(session)?;

        self.pump();

        let (sender, receiver) = oneshot::channel();
        info!("Export queued ({:?})", frame);
        self.pending = Some(PendingExport { frame, sender });
        Ok(ExportHandle::new(receiver))
    }

    pub fn has_pending_export(&self) -> bool {
        self.pending.is_some()
    }

    /// Encodes the queued export, if any, and resolves its handle. Returns
    /// whether there was work to do.
    pub fn pump(&mut self) -> bool {
        let Some(PendingExport { frame, sender }) = self.pending.take() else {
            return false;
        };

        let result = (self.encode)(frame);
        if let Err(err) = &result {
            log::error!("Export failed: {}", err);
        }
        if sender.send(result).is_err() {
            debug!("Export finished after its handle was dropped");
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use image::{Rgba, RgbaImage};

    use super::*;
    use crate::compositor::GlyphPainter;
    use crate::event::{ChangeKind, EventLog};

    struct NoGlyphs;

    impl GlyphPainter for NoGlyphs {
        fn paint_glyph(
            &self,
            _pixmap: &mut tiny_skia::Pixmap,
            _text: &str,
            _center: egui::Pos2,
            _font_size: f32,
            _color: [u8; 4],
            _clip: Option<&tiny_skia::Mask>,
        ) {
        }
    }

    fn png_bytes() -> Vec<u8> {
        let img = RgbaImage::from_pixel(16, 16, Rgba([0, 200, 0, 255]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn editor() -> PhotoEditor {
        PhotoEditor::with_compositor(EditorConfig::default(), Compositor::with_glyph_painter(NoGlyphs))
    }

    #[test]
    fn test_open_rejects_missing_image() {
        let mut editor = editor();
        assert!(matches!(
            editor.open(&[], Vec2::splat(100.0)),
            Err(EditorError::InvalidInput(_))
        ));
        assert!(!editor.is_open());
    }

    #[test]
    fn test_buttons_without_session_are_noops() {
        let mut editor = editor();
        assert_eq!(editor.zoom(ZoomDirection::In), None);
        assert_eq!(editor.add_sticker("★"), None);
        assert!(!editor.remove_selected_sticker());
        assert!(matches!(editor.export(), Err(EditorError::InvalidInput(_))));
    }

    #[test]
    fn test_export_resolves_after_pump() {
        let mut editor = editor();
        editor.open(&png_bytes(), Vec2::splat(64.0)).unwrap();
        editor.set_shape(Shape::Hexagon);
        let id = editor.add_sticker("★").unwrap();

        let mut handle = editor.export().unwrap();
        assert!(handle.try_take().is_none());
        assert!(editor.has_pending_export());

        assert!(editor.pump());
        let photo = handle.try_take().unwrap().unwrap();
        assert_eq!((photo.width, photo.height), (64, 64));
        assert_eq!(photo.shape, Shape::Hexagon);
        assert_eq!(photo.stickers[0].id, id);

        // Resolves only once
        assert!(handle.try_take().is_none());
        assert!(!editor.pump());
    }

    #[test]
    fn test_encode_failure_reaches_handle() {
        let mut editor = editor();
        // An encoder that writes nothing
        editor.encode = |frame| frame.encode_with(|_, _, _| Ok(()));
        editor.open(&png_bytes(), Vec2::splat(32.0)).unwrap();

        let mut handle = editor.export().unwrap();
        assert!(editor.pump());
        assert!(matches!(
            handle.try_take(),
            Some(Err(EditorError::SerializationFailure(_)))
        ));
        assert!(handle.is_finished());
        assert!(!editor.has_pending_export());

        // The session survives and the next export can still succeed
        assert!(editor.is_open());
        editor.encode = Frame::encode;
        let mut retry = editor.export().unwrap();
        editor.pump();
        assert!(matches!(retry.try_take(), Some(Ok(_))));
    }

    #[test]
    fn test_close_cancels_pending_export() {
        let mut editor = editor();
        editor.open(&png_bytes(), Vec2::splat(32.0)).unwrap();
        let handle = editor.export().unwrap();

        assert!(editor.close());
        assert!(!editor.has_pending_export());
        assert_eq!(block_on(handle), Err(EditorError::ExportCancelled));
    }

    #[test]
    fn test_second_export_flushes_first() {
        let mut editor = editor();
        editor.open(&png_bytes(), Vec2::splat(32.0)).unwrap();
        let first = editor.export().unwrap();
        let second = editor.export().unwrap();
        editor.pump();

        assert!(block_on(first).is_ok());
        assert!(block_on(second).is_ok());
    }

    #[test]
    fn test_render_failure_queues_nothing() {
        let mut editor = editor();
        editor.open(&png_bytes(), Vec2::ZERO).unwrap();
        assert!(matches!(editor.export(), Err(EditorError::RenderFailure(_))));
        assert!(!editor.has_pending_export());
        assert!(editor.is_open());
    }

    #[test]
    fn test_bus_survives_sessions() {
        let mut editor = editor();
        let log = EventLog::new();
        editor.subscribe(log.clone());

        editor.open(&png_bytes(), Vec2::splat(32.0)).unwrap();
        editor.zoom(ZoomDirection::Out);
        editor.close();
        editor.open(&png_bytes(), Vec2::splat(32.0)).unwrap();
        editor.add_sticker("😊");

        let kinds: Vec<_> = log.events().iter().map(|e| e.kind()).collect();
        assert_eq!(kinds, vec![ChangeKind::Scale, ChangeKind::StickerAdded]);
    }

    #[test]
    fn test_replace_photo_requires_session() {
        let mut editor = editor();
        assert!(editor.replace_photo(&png_bytes()).is_err());

        editor.open(&png_bytes(), Vec2::splat(32.0)).unwrap();
        editor.zoom(ZoomDirection::In);
        editor.replace_photo(&png_bytes()).unwrap();
        assert_eq!(editor.session().unwrap().base().transform.scale, 1.0);
    }
}
