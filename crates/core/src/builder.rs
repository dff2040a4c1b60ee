//! Click-driven shape building
//!
//! The builder holds the pending (uncommitted) point list. It does not know
//! which mode is active; modes are passed in at commit time, and switching
//! modes keeps whatever points were clicked so far.

use std::fmt;

use crate::annotation::{Shape, ShapeKind, ShapeMetadata, ShapeStyle};
use crate::error::{TakeoffError, TakeoffResult};
use crate::geometry::ImagePoint;

/// Interaction mode selected by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasureMode {
    /// Two clicks define the calibration reference segment
    #[default]
    Scale,
    Distance,
    Area,
}

impl MeasureMode {
    /// Shape kind committed in this mode, `None` for calibration
    pub fn shape_kind(self) -> Option<ShapeKind> {
        match self {
            MeasureMode::Scale => None,
            MeasureMode::Distance => Some(ShapeKind::Distance),
            MeasureMode::Area => Some(ShapeKind::Area),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MeasureMode::Scale => "Scale",
            MeasureMode::Distance => "Distance",
            MeasureMode::Area => "Area",
        }
    }

    fn point_requirement(self) -> &'static str {
        match self {
            MeasureMode::Scale => "exactly 2",
            MeasureMode::Distance | MeasureMode::Area => "at least 2",
        }
    }
}

impl fmt::Display for MeasureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of undoing one step in the builder
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PendingUndo {
    /// The last pending point was removed
    Removed(ImagePoint),
    /// Nothing pending; the caller should undo the last committed shape
    Empty,
}

/// Pending point list for the shape being traced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapeBuilder {
    points: Vec<ImagePoint>,
}

impl ShapeBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Pending points in click order
    pub fn points(&self) -> &[ImagePoint] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Append a point; no deduplication happens here
    pub fn add_point(&mut self, point: ImagePoint) {
        self.points.push(point);
    }

    /// Remove the last pending point, or report that nothing is pending
    pub fn undo_last_point(&mut self) -> PendingUndo {
        match self.points.pop() {
            Some(point) => PendingUndo::Removed(point),
            None => PendingUndo::Empty,
        }
    }

    /// Drop all pending points
    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Whether the pending points are enough to commit in `mode`
    pub fn can_commit(&self, mode: MeasureMode) -> bool {
        match mode.shape_kind() {
            None => self.points.len() == 2,
            Some(kind) => self.points.len() >= kind.policy().min_points,
        }
    }

    /// Commit the pending points as a shape and clear the pending list
    ///
    /// Scale mode never produces a shape; use [`ShapeBuilder::calibration_pair`].
    /// A refused commit keeps the pending points.
    pub fn commit(
        &mut self,
        mode: MeasureMode,
        style: ShapeStyle,
        metadata: ShapeMetadata,
    ) -> TakeoffResult<Shape> {
        let Some(kind) = mode.shape_kind() else {
            return Err(TakeoffError::ScaleCommit);
        };
        if !self.can_commit(mode) {
            return Err(self.insufficient(mode));
        }

        let shape = Shape::new(kind, self.points.clone(), style, metadata)?;
        self.points.clear();
        Ok(shape)
    }

    /// Peek at the two calibration points when exactly two are pending
    pub fn calibration_pair(&self) -> TakeoffResult<(ImagePoint, ImagePoint)> {
        match self.points.as_slice() {
            [p1, p2] => Ok((*p1, *p2)),
            _ => Err(self.insufficient(MeasureMode::Scale)),
        }
    }

    fn insufficient(&self, mode: MeasureMode) -> TakeoffError {
        TakeoffError::InsufficientPoints {
            mode,
            required: mode.point_requirement(),
            actual: self.points.len(),
        }
    }
}
