//! Ordered history of committed shapes
//!
//! Insertion order is the only ordering. The 1-based display number ("No.")
//! of a shape is its current position, so it shifts after `pop_last` and
//! `clear` and must not be cached by consumers.

use crate::annotation::{Shape, ShapePatch};
use crate::error::{TakeoffError, TakeoffResult};

/// Collection of committed shapes for the loaded base image
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationStore {
    shapes: Vec<Shape>,
}

impl AnnotationStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a committed shape and return its index
    pub fn append(&mut self, shape: Shape) -> usize {
        self.shapes.push(shape);
        let index = self.shapes.len() - 1;
        tracing::debug!(index, kind = ?self.shapes[index].kind(), "shape appended");
        index
    }

    /// Remove and return the most recent shape
    pub fn pop_last(&mut self) -> Option<Shape> {
        let popped = self.shapes.pop();
        if popped.is_some() {
            tracing::debug!(remaining = self.shapes.len(), "last shape removed");
        }
        popped
    }

    /// Remove every shape
    pub fn clear(&mut self) {
        self.shapes.clear();
    }

    /// Get a shape by 0-based index
    pub fn get(&self, index: usize) -> Option<&Shape> {
        self.shapes.get(index)
    }

    /// All shapes in insertion order
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// Iterate shapes with their 1-based display numbers
    pub fn numbered(&self) -> impl Iterator<Item = (usize, &Shape)> {
        self.shapes.iter().enumerate().map(|(index, shape)| (index + 1, shape))
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Patch label, subtraction flag, remarks or link of an existing shape
    pub fn update(&mut self, index: usize, patch: ShapePatch) -> TakeoffResult<()> {
        let shape = self.shapes.get_mut(index).ok_or(TakeoffError::ShapeNotFound(index))?;
        shape.apply(patch)
    }

    /// Append a subtractive deep copy of the additive area at `source_index`
    ///
    /// Returns the index of the new shape. Nothing is appended when the
    /// source is missing, not an area, or already a subtraction.
    pub fn subtraction_copy(
        &mut self,
        source_index: usize,
        label: impl Into<String>,
    ) -> TakeoffResult<usize> {
        let source = self.get(source_index).ok_or(TakeoffError::ShapeNotFound(source_index))?;
        let copy = source
            .subtraction_copy(label)
            .ok_or(TakeoffError::InvalidSubtractionSource(source_index))?;

        tracing::info!(source_index, label = copy.label(), "subtraction copy created");
        Ok(self.append(copy))
    }

    /// Indices of shapes usable as subtraction templates
    pub fn subtraction_sources(&self) -> Vec<usize> {
        self.shapes
            .iter()
            .enumerate()
            .filter(|(_, shape)| {
                shape.kind().policy().supports_subtraction && !shape.is_subtraction()
            })
            .map(|(index, _)| index)
            .collect()
    }
}
