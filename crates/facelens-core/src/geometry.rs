//! Overlay geometry: maps source-pixel bounding boxes onto a displayed image.
//!
//! The displayed image keeps its aspect ratio, so a single scale factor
//! derived from the height ratio applies to both axes.

use crate::types::BoundingBox;

/// An on-screen rectangle relative to the displayed image's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn is_empty(&self) -> bool {
        self.w <= 0.0 || self.h <= 0.0
    }
}

/// Heights of the displayed image: as rendered, and as decoded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageGeometry {
    pub rendered_height: f32,
    pub natural_height: f32,
}

impl ImageGeometry {
    pub fn new(rendered_height: f32, natural_height: f32) -> Self {
        Self {
            rendered_height,
            natural_height,
        }
    }

    /// Display scale, or `None` while the natural size is unknown.
    pub fn scale(&self) -> Option<f32> {
        let known = self.natural_height.is_finite() && self.natural_height > 0.0;
        if known && self.rendered_height.is_finite() {
            Some(self.rendered_height / self.natural_height)
        } else {
            None
        }
    }
}

impl Default for ImageGeometry {
    /// Placeholder used before the image has loaded: identity scale.
    fn default() -> Self {
        Self::new(100.0, 100.0)
    }
}

/// Map a `[x0, y0, x1, y1]` box into display space.
///
/// Returns a zero rectangle when `natural_height` is zero or unknown.
pub fn map_box(bbox: &[f32; 4], rendered_height: f32, natural_height: f32) -> Rect {
    let Some(scale) = ImageGeometry::new(rendered_height, natural_height).scale() else {
        return Rect::default();
    };
    let [x0, y0, x1, y1] = *bbox;
    Rect {
        x: x0 * scale,
        y: y0 * scale,
        w: (x1 - x0) * scale,
        h: (y1 - y0) * scale,
    }
}

/// Bounding boxes laid over one displayed image.
///
/// Every view that draws boxes on an image feeds geometry changes
/// (resize, new image) through [`Overlay::observe`]; the mapped
/// rectangles are recomputed only when the geometry actually changed.
#[derive(Debug, Clone, Default)]
pub struct Overlay {
    boxes: Vec<BoundingBox>,
    geometry: ImageGeometry,
    rects: Vec<Rect>,
}

impl Overlay {
    pub fn new(boxes: Vec<BoundingBox>, geometry: ImageGeometry) -> Self {
        let mut overlay = Self {
            boxes,
            geometry,
            rects: Vec::new(),
        };
        overlay.remap();
        overlay
    }

    /// Record the latest geometry. Returns true if the rectangles changed.
    pub fn observe(&mut self, geometry: ImageGeometry) -> bool {
        if geometry == self.geometry {
            return false;
        }
        tracing::trace!(
            rendered = geometry.rendered_height,
            natural = geometry.natural_height,
            "overlay geometry changed"
        );
        self.geometry = geometry;
        self.remap();
        true
    }

    /// Swap in the boxes for a new image.
    pub fn set_boxes(&mut self, boxes: Vec<BoundingBox>) {
        self.boxes = boxes;
        self.remap();
    }

    pub fn clear(&mut self) {
        self.boxes.clear();
        self.rects.clear();
    }

    pub fn boxes(&self) -> &[BoundingBox] {
        &self.boxes
    }

    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    pub fn geometry(&self) -> ImageGeometry {
        self.geometry
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    fn remap(&mut self) {
        let g = self.geometry;
        self.rects = self
            .boxes
            .iter()
            .map(|b| map_box(&b.bbox, g.rendered_height, g.natural_height))
            .collect();
    }
}
