//! The async boundary around the compositor.
//!
//! Decoding and encoding are blocking pixel work, so they run on tokio's
//! blocking pool. The compositor sits behind a `tokio::sync::Mutex`: each
//! render pass holds it from resize to last glyph, so passes never
//! interleave, and export reads whatever the last completed pass drew.
//!
//! Edits reach the renderer as immutable [`Snapshot`]s. Live edits go
//! through a [`Debouncer`], which keeps only the newest snapshot of a burst:
//!
//! ```text
//! set_template ─┐
//! load_photo ───┼─► Snapshot ─► Debouncer (100 ms quiet) ─► Renderer ─► Compositor
//! load_logo ────┘                                               │
//!                                                  export ◄─────┘ (same lock)
//! ```
//!
//! Photo and logo loads are tagged with a generation when they start. A load
//! that finishes after a newer one started is dropped, and the source bytes
//! are released as soon as decoding ends either way.

use crate::exif::{ExifDecoder, ExifFieldMap, read_exif_segment};
use crate::imaging::{
    Bitmap, Compositor, ExportOptions, RenderError, Scene, Surface, TextMetrics, resolve,
};
use crate::types::{LayoutTemplate, ResolvedConfig};
use std::future::Future;
use std::sync::{Arc, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;

pub type Result<T> = std::result::Result<T, RenderError>;

fn task_error(e: tokio::task::JoinError) -> RenderError {
    RenderError::Task(e.to_string())
}

/// Decode image bytes off the async threads.
pub async fn decode_bitmap(bytes: Vec<u8>) -> Result<Bitmap> {
    tokio::task::spawn_blocking(move || Bitmap::decode(&bytes))
        .await
        .map_err(task_error)?
}

/// A decoded photo and everything derived from its bytes.
#[derive(Debug)]
pub struct LoadedPhoto {
    pub name: String,
    pub bitmap: Bitmap,
    pub fields: ExifFieldMap,
    /// The photo's APP1 segments, empty when it had none.
    pub exif_segment: Vec<u8>,
}

/// Decode a photo, its EXIF fields and its raw EXIF segment in one blocking task.
pub async fn decode_photo(
    bytes: Vec<u8>,
    name: String,
    decoder: Arc<dyn ExifDecoder>,
) -> Result<LoadedPhoto> {
    tokio::task::spawn_blocking(move || {
        let bitmap = Bitmap::decode(&bytes)?;
        let fields = decoder.decode(&bytes);
        let exif_segment = if bytes.starts_with(&[0xFF, 0xD8]) {
            read_exif_segment(&bytes)
        } else {
            Vec::new()
        };
        log::debug!(
            "Decoded {name}: {}x{}, {} bytes of EXIF",
            bitmap.size().width,
            bitmap.size().height,
            exif_segment.len()
        );
        Ok(LoadedPhoto {
            name,
            bitmap,
            fields,
            exif_segment,
        })
    })
    .await
    .map_err(task_error)?
}

/// Everything one render pass reads. Never mutated after creation.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub photo: Option<Arc<LoadedPhoto>>,
    pub logo: Option<Bitmap>,
    pub template: Arc<LayoutTemplate>,
}

impl Snapshot {
    /// Resolve the template for this photo and logo. `None` without a photo.
    pub fn resolve(&self) -> Option<ResolvedConfig> {
        let photo = self.photo.as_ref()?;
        let logo = self.logo.as_ref().map(Bitmap::size).unwrap_or_default();
        Some(resolve(&self.template, photo.bitmap.size(), logo))
    }
}

struct Engine<S: Surface> {
    compositor: Compositor<S>,
    /// The snapshot and geometry of the last completed pass.
    drawn: Option<(Arc<Snapshot>, Option<ResolvedConfig>)>,
}

/// Serialises render passes and exports over one compositor.
pub struct Renderer<S: Surface> {
    engine: Arc<Mutex<Engine<S>>>,
}

impl<S: Surface> Clone for Renderer<S> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
        }
    }
}

impl<S: Surface + 'static> Renderer<S> {
    pub fn new(compositor: Compositor<S>) -> Self {
        Self {
            engine: Arc::new(Mutex::new(Engine {
                compositor,
                drawn: None,
            })),
        }
    }

    /// Run one full pass for `snapshot` and return its geometry.
    pub async fn render(&self, snapshot: Arc<Snapshot>) -> Result<Option<ResolvedConfig>> {
        let engine = Arc::clone(&self.engine);
        tokio::task::spawn_blocking(move || {
            let mut engine = engine.blocking_lock();
            let started = Instant::now();

            let resolved = snapshot.resolve();
            let no_config = ResolvedConfig::default();
            let no_fields = ExifFieldMap::default();
            let photo = snapshot.photo.as_deref();
            engine.compositor.render(&Scene {
                photo: photo.map(|p| &p.bitmap),
                logo: snapshot.logo.as_ref(),
                config: resolved.as_ref().unwrap_or(&no_config),
                fields: photo.map(|p| &p.fields).unwrap_or(&no_fields),
            });

            log::info!("Render pass took {} ms", started.elapsed().as_millis());
            engine.drawn = Some((snapshot, resolved.clone()));
            resolved
        })
        .await
        .map_err(task_error)
    }

    /// Encode what the last pass drew, with that pass's photo EXIF.
    pub async fn export(&self, options: ExportOptions) -> Result<Vec<u8>> {
        let engine = Arc::clone(&self.engine);
        tokio::task::spawn_blocking(move || {
            let engine = engine.blocking_lock();
            let started = Instant::now();

            let exif = engine
                .drawn
                .as_ref()
                .and_then(|(snapshot, _)| snapshot.photo.as_deref())
                .map(|p| p.exif_segment.as_slice())
                .unwrap_or_default();
            let bytes = engine.compositor.export_with_exif(&options, exif)?;

            log::info!(
                "Exported {} bytes of {} in {} ms",
                bytes.len(),
                options.format.mime_type(),
                started.elapsed().as_millis()
            );
            Ok(bytes)
        })
        .await
        .map_err(task_error)?
    }

    /// Geometry of the last completed pass.
    pub async fn resolved(&self) -> Option<ResolvedConfig> {
        let engine = self.engine.lock().await;
        engine.drawn.as_ref().and_then(|(_, resolved)| resolved.clone())
    }

    /// Measure text item `index` of the last pass, as it was drawn.
    pub async fn measure_text(&self, index: usize) -> Option<TextMetrics> {
        let engine = self.engine.lock().await;
        let (snapshot, resolved) = engine.drawn.as_ref()?;
        let item = resolved.as_ref()?.text_items.get(index)?;
        let photo = snapshot.photo.as_deref()?;
        Some(engine.compositor.measure_text(item, &photo.fields))
    }
}

/// Coalesces a rapid stream of values into one action per quiet period.
///
/// Only the newest value of a burst reaches the action; earlier ones are
/// dropped, not queued. Dropping the debouncer discards a pending value.
pub struct Debouncer<T> {
    tx: watch::Sender<Option<T>>,
    task: JoinHandle<()>,
}

impl<T: Clone + Send + Sync + 'static> Debouncer<T> {
    /// Must be called from within a tokio runtime.
    pub fn spawn<F, Fut>(quiet: Duration, mut action: F) -> Self
    where
        F: FnMut(T) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, mut rx) = watch::channel(None::<T>);
        let task = tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                loop {
                    tokio::select! {
                        changed = rx.changed() => {
                            if changed.is_err() {
                                return;
                            }
                        }
                        _ = tokio::time::sleep(quiet) => break,
                    }
                }
                let latest = (*rx.borrow_and_update()).clone();
                if let Some(value) = latest {
                    action(value).await;
                }
            }
        });
        Self { tx, task }
    }

    pub fn submit(&self, value: T) {
        self.tx.send_replace(Some(value));
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// What happened to a photo or logo load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    /// A newer load started before this one finished; its result was dropped.
    Superseded,
}

/// A value plus the generation of the newest load targeting it.
struct Slot<T> {
    generation: u64,
    value: Option<T>,
}

impl<T> Slot<T> {
    fn begin(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.generation == ticket
    }

    /// Clearing also supersedes any load in flight.
    fn clear(&mut self) {
        self.generation += 1;
        self.value = None;
    }
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            generation: 0,
            value: None,
        }
    }
}

struct State {
    photo: Slot<Arc<LoadedPhoto>>,
    logo: Slot<Bitmap>,
    template: Arc<LayoutTemplate>,
}

/// One editing session: a photo, an optional logo and a template.
pub struct EditorSession<S: Surface + 'static> {
    renderer: Renderer<S>,
    decoder: Arc<dyn ExifDecoder>,
    state: std::sync::Mutex<State>,
    debouncer: Debouncer<Arc<Snapshot>>,
}

impl<S: Surface + 'static> EditorSession<S> {
    /// Must be called from within a tokio runtime.
    pub fn new(
        compositor: Compositor<S>,
        decoder: Arc<dyn ExifDecoder>,
        template: LayoutTemplate,
        debounce: Duration,
    ) -> Self {
        let renderer = Renderer::new(compositor);
        let background = renderer.clone();
        let debouncer = Debouncer::spawn(debounce, move |snapshot| {
            let renderer = background.clone();
            async move {
                if let Err(e) = renderer.render(snapshot).await {
                    log::error!("Debounced render failed: {e}");
                }
            }
        });
        Self {
            renderer,
            decoder,
            state: std::sync::Mutex::new(State {
                photo: Slot::default(),
                logo: Slot::default(),
                template: Arc::new(template),
            }),
            debouncer,
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Load a photo. The load is registered when this is called, so of two
    /// overlapping loads the later call always wins.
    pub fn load_photo(
        &self,
        bytes: Vec<u8>,
        name: impl Into<String>,
    ) -> impl Future<Output = Result<LoadOutcome>> + '_ {
        let ticket = self.state().photo.begin();
        let name = name.into();
        let decoder = Arc::clone(&self.decoder);
        async move {
            let loaded = decode_photo(bytes, name, decoder).await;
            let result = {
                let mut state = self.state();
                if !state.photo.is_current(ticket) {
                    log::debug!("Discarding superseded photo load #{ticket}");
                    return Ok(LoadOutcome::Superseded);
                }
                match loaded {
                    Ok(photo) => {
                        state.photo.value = Some(Arc::new(photo));
                        Ok(LoadOutcome::Applied)
                    }
                    Err(e) => {
                        state.photo.value = None;
                        Err(e)
                    }
                }
            };
            self.schedule_render();
            result
        }
    }

    /// Load a logo image; same supersede rules as [`load_photo`](Self::load_photo).
    pub fn load_logo(&self, bytes: Vec<u8>) -> impl Future<Output = Result<LoadOutcome>> + '_ {
        let ticket = self.state().logo.begin();
        async move {
            let decoded = decode_bitmap(bytes).await;
            {
                let mut state = self.state();
                if !state.logo.is_current(ticket) {
                    log::debug!("Discarding superseded logo load #{ticket}");
                    return Ok(LoadOutcome::Superseded);
                }
                state.logo.value = decoded.as_ref().ok().cloned();
            }
            self.schedule_render();
            decoded.map(|_| LoadOutcome::Applied)
        }
    }

    pub fn clear_photo(&self) {
        self.state().photo.clear();
        self.schedule_render();
    }

    pub fn clear_logo(&self) {
        self.state().logo.clear();
        self.schedule_render();
    }

    /// Replace the template and schedule a debounced render.
    pub fn set_template(&self, template: LayoutTemplate) {
        self.state().template = Arc::new(template);
        self.schedule_render();
    }

    pub fn template(&self) -> Arc<LayoutTemplate> {
        Arc::clone(&self.state().template)
    }

    /// EXIF fields of the current photo, empty without one.
    pub fn fields(&self) -> ExifFieldMap {
        self.state()
            .photo
            .value
            .as_ref()
            .map(|p| p.fields.clone())
            .unwrap_or_default()
    }

    pub fn photo_name(&self) -> Option<String> {
        self.state().photo.value.as_ref().map(|p| p.name.clone())
    }

    /// Size in bytes of the current photo's EXIF segment.
    pub fn exif_segment_len(&self) -> usize {
        self.state()
            .photo
            .value
            .as_ref()
            .map_or(0, |p| p.exif_segment.len())
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        let state = self.state();
        Arc::new(Snapshot {
            photo: state.photo.value.clone(),
            logo: state.logo.value.clone(),
            template: Arc::clone(&state.template),
        })
    }

    /// Queue a render of the current state behind the debounce window.
    pub fn schedule_render(&self) {
        self.debouncer.submit(self.snapshot());
    }

    /// Render the current state now, bypassing the debounce window.
    pub async fn render_now(&self) -> Result<Option<ResolvedConfig>> {
        self.renderer.render(self.snapshot()).await
    }

    /// Geometry of the last completed render pass.
    pub async fn resolved(&self) -> Option<ResolvedConfig> {
        self.renderer.resolved().await
    }

    pub async fn measure_text(&self, index: usize) -> Option<TextMetrics> {
        self.renderer.measure_text(index).await
    }

    /// Encode the last completed render pass.
    pub async fn export(&self, options: ExportOptions) -> Result<Vec<u8>> {
        self.renderer.export(options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exif::segments::tests::{encoded_jpeg, fake_app1, jpeg_with_exif};
    use crate::exif::{NomExifDecoder, reinsert_exif_segment};
    use crate::imaging::backend::tests::{MockSurface, RecordedOp};
    use crate::imaging::{ExportFormat, RasterSurface};
    use crate::presets;
    use crate::types::{BorderFraction, PixelSize};

    const FAKE_JPEG: [u8; 10] = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x04, 0xAA, 0xBB, 0x11, 0x22];

    fn session(surface: MockSurface, debounce: Duration) -> EditorSession<MockSurface> {
        EditorSession::new(
            Compositor::new(surface),
            Arc::new(NomExifDecoder::new()),
            presets::bottom_band(),
            debounce,
        )
    }

    // =========================================================================
    // Debouncer
    // =========================================================================

    fn collecting() -> (
        impl FnMut(u32) -> std::future::Ready<()> + Send + 'static,
        tokio::sync::mpsc::UnboundedReceiver<u32>,
    ) {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        (
            move |v| {
                let _ = tx.send(v);
                std::future::ready(())
            },
            rx,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn debouncer_keeps_only_the_last_value_of_a_burst() {
        let (action, mut rx) = collecting();
        let debouncer = Debouncer::spawn(Duration::from_millis(100), action);

        for v in 1..=5 {
            debouncer.submit(v);
            tokio::time::sleep(Duration::from_millis(30)).await;
        }
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(rx.try_recv().ok(), Some(5));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn debouncer_waits_for_the_quiet_period() {
        let (action, mut rx) = collecting();
        let debouncer = Debouncer::spawn(Duration::from_millis(100), action);

        debouncer.submit(7);
        tokio::time::sleep(Duration::from_millis(90)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(rx.try_recv().ok(), Some(7));
    }

    #[tokio::test(start_paused = true)]
    async fn debouncer_fires_once_per_burst() {
        let (action, mut rx) = collecting();
        let debouncer = Debouncer::spawn(Duration::from_millis(100), action);

        debouncer.submit(1);
        debouncer.submit(2);
        tokio::time::sleep(Duration::from_millis(150)).await;
        debouncer.submit(3);
        debouncer.submit(4);
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(rx.try_recv().ok(), Some(2));
        assert_eq!(rx.try_recv().ok(), Some(4));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_debouncer_discards_pending_values() {
        let (action, mut rx) = collecting();
        let debouncer = Debouncer::spawn(Duration::from_millis(100), action);

        debouncer.submit(1);
        drop(debouncer);
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(rx.try_recv().is_err());
    }

    // =========================================================================
    // Session
    // =========================================================================

    #[tokio::test]
    async fn render_and_export_with_exif() {
        let s = session(MockSurface::encoding_to(FAKE_JPEG.to_vec()), Duration::from_secs(60));
        let outcome = s.load_photo(jpeg_with_exif(40, 30), "DSC0001.jpg").await.unwrap();
        assert_eq!(outcome, LoadOutcome::Applied);
        assert_eq!(s.exif_segment_len(), fake_app1().len());

        let resolved = s.render_now().await.unwrap().unwrap();
        assert_eq!(resolved.photo, PixelSize::new(40, 30));
        assert_eq!(resolved.border.bottom, 3);
        assert_eq!(s.resolved().await, Some(resolved));

        let out = s.export(ExportOptions::default()).await.unwrap();
        assert_eq!(out, reinsert_exif_segment(&FAKE_JPEG, &fake_app1()));

        let plain = s
            .export(ExportOptions {
                keep_exif: false,
                ..ExportOptions::default()
            })
            .await
            .unwrap();
        assert_eq!(plain, FAKE_JPEG);
    }

    async fn ops_for(renderer: &Renderer<MockSurface>) -> Vec<RecordedOp> {
        renderer.engine.lock().await.compositor.surface().get_operations()
    }

    async fn loaded(bytes: Vec<u8>, name: &str) -> Arc<LoadedPhoto> {
        let decoder: Arc<dyn ExifDecoder> = Arc::new(NomExifDecoder::new());
        Arc::new(decode_photo(bytes, name.to_string(), decoder).await.unwrap())
    }

    #[tokio::test]
    async fn overlapping_renders_do_not_interleave() {
        let banded = Arc::new(Snapshot {
            photo: Some(loaded(jpeg_with_exif(40, 30), "banded.jpg").await),
            logo: None,
            template: Arc::new(presets::bottom_band()),
        });
        let framed = Arc::new(Snapshot {
            photo: Some(loaded(encoded_jpeg(64, 48), "framed.jpg").await),
            logo: None,
            template: Arc::new(presets::framed()),
        });

        // What each pass draws on its own.
        let mut solo = Vec::new();
        for snapshot in [&banded, &framed] {
            let renderer = Renderer::new(Compositor::new(MockSurface::new()));
            renderer.render(Arc::clone(snapshot)).await.unwrap();
            solo.push(ops_for(&renderer).await);
        }

        let renderer = Renderer::new(Compositor::new(MockSurface::encoding_to(FAKE_JPEG.to_vec())));
        let (a, b) = tokio::join!(
            renderer.render(Arc::clone(&banded)),
            renderer.render(Arc::clone(&framed))
        );
        let (a, b) = (a.unwrap().unwrap(), b.unwrap().unwrap());
        assert_ne!(a.canvas, b.canvas);

        let ops = ops_for(&renderer).await;
        let banded_first = [solo[0].clone(), solo[1].clone()].concat();
        let framed_first = [solo[1].clone(), solo[0].clone()].concat();
        assert!(
            ops == banded_first || ops == framed_first,
            "passes interleaved: {ops:?}"
        );

        // Geometry and export both come from whichever pass finished last.
        let last = if ops == banded_first { &b } else { &a };
        assert_eq!(renderer.resolved().await.as_ref(), Some(last));
        let exported = renderer.export(ExportOptions::default()).await.unwrap();
        if ops == banded_first {
            assert_eq!(last.canvas, PixelSize::new(74, 58));
            assert_eq!(exported, FAKE_JPEG);
        } else {
            assert_eq!(last.canvas, PixelSize::new(40, 33));
            assert_eq!(exported, reinsert_exif_segment(&FAKE_JPEG, &fake_app1()));
        }
    }

    #[tokio::test]
    async fn export_before_render_fails() {
        let s = session(MockSurface::encoding_to(FAKE_JPEG.to_vec()), Duration::from_secs(60));
        assert!(matches!(
            s.export(ExportOptions::default()).await,
            Err(RenderError::NothingToExport)
        ));
    }

    #[tokio::test]
    async fn render_without_photo_leaves_nothing_to_export() {
        let s = session(MockSurface::encoding_to(FAKE_JPEG.to_vec()), Duration::from_secs(60));
        s.load_photo(encoded_jpeg(20, 20), "a.jpg").await.unwrap();
        s.render_now().await.unwrap();
        s.clear_photo();

        assert_eq!(s.render_now().await.unwrap(), None);
        assert!(matches!(
            s.export(ExportOptions::default()).await,
            Err(RenderError::NothingToExport)
        ));
    }

    #[tokio::test]
    async fn corrupt_photo_is_rejected_and_cleared() {
        let s = session(MockSurface::new(), Duration::from_secs(60));
        s.load_photo(encoded_jpeg(20, 20), "a.jpg").await.unwrap();

        let err = s.load_photo(b"garbage".to_vec(), "b.jpg").await;
        assert!(matches!(err, Err(RenderError::Decode(_))));
        assert_eq!(s.photo_name(), None);
        assert!(s.snapshot().photo.is_none());
    }

    #[tokio::test]
    async fn later_load_wins_over_an_earlier_one() {
        let s = session(MockSurface::new(), Duration::from_secs(60));
        let first = s.load_photo(encoded_jpeg(64, 48), "first.jpg");
        let second = s.load_photo(encoded_jpeg(16, 12), "second.jpg");
        let (a, b) = tokio::join!(first, second);

        assert_eq!(a.unwrap(), LoadOutcome::Superseded);
        assert_eq!(b.unwrap(), LoadOutcome::Applied);
        assert_eq!(s.photo_name().as_deref(), Some("second.jpg"));
    }

    #[tokio::test]
    async fn clearing_supersedes_a_load_in_flight() {
        let s = session(MockSurface::new(), Duration::from_secs(60));
        let pending = s.load_logo(encoded_jpeg(8, 8));
        s.clear_logo();
        assert_eq!(pending.await.unwrap(), LoadOutcome::Superseded);
        assert!(s.snapshot().logo.is_none());
    }

    #[tokio::test]
    async fn logo_changes_resolved_placement() {
        let s = session(MockSurface::new(), Duration::from_secs(60));
        s.load_photo(encoded_jpeg(1000, 500), "a.jpg").await.unwrap();
        assert!(s.render_now().await.unwrap().unwrap().logo.is_empty());

        s.load_logo(encoded_jpeg(200, 100)).await.unwrap();
        let resolved = s.render_now().await.unwrap().unwrap();
        assert_eq!((resolved.logo.width, resolved.logo.height), (96, 48));
    }

    #[tokio::test]
    async fn template_edits_render_after_the_debounce() {
        let s = session(MockSurface::new(), Duration::from_millis(10));
        s.load_photo(encoded_jpeg(100, 50), "a.jpg").await.unwrap();
        s.set_template(LayoutTemplate {
            border: BorderFraction::uniform(0.1),
            ..presets::bottom_band()
        });

        let mut canvas = None;
        for _ in 0..200 {
            tokio::time::sleep(Duration::from_millis(10)).await;
            canvas = s.resolved().await.map(|r| r.canvas);
            if canvas == Some(PixelSize::new(120, 70)) {
                break;
            }
        }
        assert_eq!(canvas, Some(PixelSize::new(120, 70)));
    }

    #[tokio::test]
    async fn measure_text_needs_a_render() {
        let s = session(MockSurface::new(), Duration::from_secs(60));
        assert_eq!(s.measure_text(0).await, None);

        s.load_photo(encoded_jpeg(1000, 500), "a.jpg").await.unwrap();
        s.render_now().await.unwrap();
        // Item 2 is the empty capture time line.
        let metrics = s.measure_text(2).await.unwrap();
        assert_eq!(metrics.width, 0.0);
        assert_eq!(s.measure_text(99).await, None);
    }

    #[tokio::test]
    async fn raster_session_exports_decodable_png() {
        let s = EditorSession::new(
            Compositor::new(RasterSurface::new()),
            Arc::new(NomExifDecoder::new()),
            presets::framed(),
            Duration::from_secs(60),
        );
        s.load_photo(encoded_jpeg(50, 40), "a.jpg").await.unwrap();
        s.render_now().await.unwrap();
        let png = s
            .export(ExportOptions {
                format: ExportFormat::Png,
                ..ExportOptions::default()
            })
            .await
            .unwrap();
        let img = image::load_from_memory(&png).unwrap();
        assert_eq!((img.width(), img.height()), (58, 48));
    }
}
