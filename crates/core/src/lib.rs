//! Takeoff Core Library
//!
//! Measurement and annotation engine for scanned site plans: calibrate a
//! raster against a known distance, trace distances and areas on it, and
//! aggregate the traced shapes into a quantity takeoff.

pub mod annotation;
pub mod builder;
pub mod calibration;
pub mod config;
pub mod csv_export;
pub mod error;
pub mod geometry;
pub mod measurement;
pub mod policy;
pub mod session;
pub mod store;
pub mod view;

pub use annotation::{Color, Shape, ShapeKind, ShapeMetadata, ShapePatch, ShapeStyle};
pub use builder::{MeasureMode, PendingUndo, ShapeBuilder};
pub use calibration::{calibrate, Calibration};
pub use config::{ItemPreset, Preferences};
pub use csv_export::{export_rows_csv, CsvExportConfig, CsvExportError, CsvExportResult};
pub use error::{TakeoffError, TakeoffResult};
pub use geometry::{
    distance, polygon_area, polyline_length, to_base_space, to_device_space, DevicePoint,
    ImagePoint,
};
pub use measurement::{ExportRow, GroupTotal, QuantityAggregator, QuantityRow};
pub use policy::{KindPolicy, ShapePaint};
pub use session::{BaseImage, BaseImageId, ClickOutcome, Session, UndoOutcome};
pub use store::AnnotationStore;
pub use view::ViewState;
