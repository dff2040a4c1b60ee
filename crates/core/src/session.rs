//! Interactive takeoff session
//!
//! `Session` owns every piece of mutable state for one loaded base image:
//! the view, the pending shape, the committed history and the calibration.
//! Each method is one atomic interaction; callers re-render afterwards.

use image::RgbImage;

use crate::annotation::{Shape, ShapeMetadata, ShapePatch, ShapeStyle};
use crate::builder::{MeasureMode, PendingUndo, ShapeBuilder};
use crate::calibration::Calibration;
use crate::config::{clamp_stroke_width, Preferences};
use crate::error::{TakeoffError, TakeoffResult};
use crate::geometry::{to_base_space, DevicePoint, ImagePoint};
use crate::measurement::{ExportRow, GroupTotal, QuantityAggregator, QuantityRow};
use crate::store::AnnotationStore;
use crate::view::ViewState;

/// Identity of a loaded base image, unique for the process lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BaseImageId(u64);

impl BaseImageId {
    fn next() -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// Rasterized site plan that shapes are traced on
#[derive(Debug, Clone)]
pub struct BaseImage {
    id: BaseImageId,
    image: RgbImage,
}

impl BaseImage {
    /// Wrap a bitmap and assign it a fresh identity
    pub fn new(image: RgbImage) -> Self {
        Self { id: BaseImageId::next(), image }
    }

    pub fn id(&self) -> BaseImageId {
        self.id
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// What a device click did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClickOutcome {
    /// Point appended to the pending shape, in base-image space
    Added(ImagePoint),
    /// Same payload as the previous click; nothing changed
    IgnoredDuplicate,
}

/// What an undo removed
#[derive(Debug, Clone, PartialEq)]
pub enum UndoOutcome {
    PendingPoint(ImagePoint),
    Shape(Shape),
    Nothing,
}

/// All mutable state for one takeoff
#[derive(Debug, Clone)]
pub struct Session {
    preferences: Preferences,
    base_image: Option<BaseImage>,
    view: ViewState,
    builder: ShapeBuilder,
    store: AnnotationStore,
    calibration: Option<Calibration>,
    /// Previous click payload and the zoom it was made at
    last_click: Option<(DevicePoint, f64)>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Preferences::default())
    }
}

impl Session {
    /// Start an empty session; nothing can be clicked until an image is loaded
    pub fn new(preferences: Preferences) -> Self {
        let mut view = ViewState::with_default_zoom(preferences.default_zoom);
        view.show_labels = preferences.show_labels;

        Self {
            preferences,
            base_image: None,
            view,
            builder: ShapeBuilder::new(),
            store: AnnotationStore::new(),
            calibration: None,
            last_click: None,
        }
    }

    /// Replace the base image and reset the takeoff
    ///
    /// History, pending points, calibration, zoom and the duplicate-click
    /// memory are reset. Mode and label visibility carry over.
    pub fn load_base_image(&mut self, image: RgbImage) -> BaseImageId {
        let base = BaseImage::new(image);
        let id = base.id();
        tracing::info!(id = id.get(), width = base.width(), height = base.height(), "base image loaded");

        self.base_image = Some(base);
        self.store.clear();
        self.builder.clear();
        self.calibration = None;
        self.last_click = None;
        self.view.reset_zoom();
        id
    }

    pub fn base_image(&self) -> Option<&BaseImage> {
        self.base_image.as_ref()
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn preferences_mut(&mut self) -> &mut Preferences {
        &mut self.preferences
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ViewState {
        &mut self.view
    }

    pub fn mode(&self) -> MeasureMode {
        self.view.active_mode
    }

    /// Switch the interaction mode; pending points are kept
    pub fn set_mode(&mut self, mode: MeasureMode) {
        if self.view.active_mode != mode {
            tracing::debug!(from = %self.view.active_mode, to = %mode, pending = self.builder.len(), "mode switched");
            self.view.active_mode = mode;
        }
    }

    pub fn pending_points(&self) -> &[ImagePoint] {
        self.builder.points()
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    pub fn shapes(&self) -> &[Shape] {
        self.store.shapes()
    }

    pub fn calibration(&self) -> Option<&Calibration> {
        self.calibration.as_ref()
    }

    /// Handle a click at device coordinates on the rendered bitmap
    ///
    /// A click identical to the previous one at the same zoom is treated as
    /// a replayed event and ignored. Otherwise the point is unzoomed and appended.
    pub fn click(&mut self, device: DevicePoint) -> TakeoffResult<ClickOutcome> {
        if self.base_image.is_none() {
            return Err(TakeoffError::NoBaseImage);
        }
        let zoom = self.view.zoom();
        if self.last_click == Some((device, zoom)) {
            tracing::debug!(x = device.x, y = device.y, "duplicate click ignored");
            return Ok(ClickOutcome::IgnoredDuplicate);
        }

        self.last_click = Some((device, zoom));
        let point = to_base_space(device, zoom);
        self.builder.add_point(point);
        Ok(ClickOutcome::Added(point))
    }

    /// Whether the pending shape can be committed in the active mode
    pub fn can_commit(&self) -> bool {
        self.builder.can_commit(self.mode())
    }

    /// Commit the pending points as a shape in the active mode
    ///
    /// Returns the new shape's index. The stroke width is clamped to the
    /// supported range.
    pub fn commit(
        &mut self,
        label: impl Into<String>,
        style: ShapeStyle,
        subtraction: bool,
    ) -> TakeoffResult<usize> {
        let style = ShapeStyle::new(style.color, clamp_stroke_width(style.stroke_width));
        let metadata = ShapeMetadata { subtraction, ..ShapeMetadata::labelled(label) };
        let shape = self.builder.commit(self.mode(), style, metadata)?;

        tracing::info!(kind = ?shape.kind(), label = shape.label(), points = shape.points().len(), "shape committed");
        Ok(self.store.append(shape))
    }

    /// Calibrate from the two pending points and a known real length
    ///
    /// On success the pending points are consumed and every stored shape is
    /// re-measured with the new ratio. On failure the points and any prior
    /// calibration stay as they were. Only Scale mode points are used.
    pub fn apply_calibration(&mut self, real_length: f64) -> TakeoffResult<f64> {
        if self.mode() != MeasureMode::Scale {
            return Err(TakeoffError::CalibrationModeMismatch(self.mode()));
        }
        let (p1, p2) = self.builder.calibration_pair()?;
        let calibration =
            Calibration::two_point(p1, p2, real_length, self.preferences.length_unit.as_str())?;
        let ratio = calibration.ratio();

        tracing::info!(ratio, real_length, unit = calibration.unit(), "calibration applied");
        self.calibration = Some(calibration);
        self.builder.clear();
        Ok(ratio)
    }

    /// Undo one step: a pending point first, then the last committed shape
    pub fn undo(&mut self) -> UndoOutcome {
        let outcome = match self.builder.undo_last_point() {
            PendingUndo::Removed(point) => UndoOutcome::PendingPoint(point),
            PendingUndo::Empty => match self.store.pop_last() {
                Some(shape) => UndoOutcome::Shape(shape),
                None => UndoOutcome::Nothing,
            },
        };
        tracing::debug!(?outcome, "undo");
        outcome
    }

    /// Drop all shapes and pending points; the calibration is kept
    pub fn clear_all(&mut self) {
        self.store.clear();
        self.builder.clear();
        tracing::info!("takeoff cleared");
    }

    pub fn update_shape(&mut self, index: usize, patch: ShapePatch) -> TakeoffResult<()> {
        self.store.update(index, patch)
    }

    pub fn subtraction_copy(&mut self, source_index: usize, label: impl Into<String>) -> TakeoffResult<usize> {
        self.store.subtraction_copy(source_index, label)
    }

    fn aggregator(&self) -> QuantityAggregator<'_> {
        QuantityAggregator::new(self.calibration.as_ref())
    }

    pub fn rows(&self) -> TakeoffResult<Vec<QuantityRow>> {
        self.aggregator().rows(&self.store)
    }

    pub fn totals(&self) -> TakeoffResult<Vec<GroupTotal>> {
        self.aggregator().totals(&self.store)
    }

    pub fn export_rows(&self) -> TakeoffResult<Vec<ExportRow>> {
        self.aggregator().export_rows(&self.store)
    }
}
