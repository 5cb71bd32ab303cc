//! Drag snapping against the canvas edges and center.

use crate::shapes::SerializableColor;
use kurbo::{Line, Point, Rect, Size};
use serde::{Deserialize, Serialize};

/// Distance (canvas units) within which a dragged edge snaps.
/// Not adjusted for zoom, so snapping feels stronger when zoomed in.
pub const SNAP_THRESHOLD: f64 = 10.0;

/// Dash pattern of guideline strokes.
pub const GUIDELINE_DASH: [f64; 2] = [5.0, 5.0];

/// Direction a guideline runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GuideOrientation {
    Vertical,
    Horizontal,
}

/// The canvas feature a guideline marks. Each anchor has at most one
/// guideline on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GuideAnchor {
    Left,
    Top,
    Right,
    Bottom,
    CenterX,
    CenterY,
}

impl GuideAnchor {
    /// Anchors in evaluation order. When two anchors on the same axis both
    /// trigger, the later one decides the position.
    pub const ALL: [GuideAnchor; 6] = [
        GuideAnchor::Left,
        GuideAnchor::Top,
        GuideAnchor::Right,
        GuideAnchor::Bottom,
        GuideAnchor::CenterX,
        GuideAnchor::CenterY,
    ];

    pub fn orientation(&self) -> GuideOrientation {
        match self {
            GuideAnchor::Left | GuideAnchor::Right | GuideAnchor::CenterX => GuideOrientation::Vertical,
            GuideAnchor::Top | GuideAnchor::Bottom | GuideAnchor::CenterY => GuideOrientation::Horizontal,
        }
    }

    /// Orientation and anchor tag, e.g. `vertical-left`.
    pub fn tag(&self) -> &'static str {
        match self {
            GuideAnchor::Left => "vertical-left",
            GuideAnchor::Top => "horizontal-top",
            GuideAnchor::Right => "vertical-right",
            GuideAnchor::Bottom => "horizontal-bottom",
            GuideAnchor::CenterX => "vertical-center",
            GuideAnchor::CenterY => "horizontal-center",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|anchor| anchor.tag() == tag)
    }

    /// Coordinate of the canvas feature along the snapping axis.
    fn edge(&self, canvas: Size) -> f64 {
        match self {
            GuideAnchor::Left | GuideAnchor::Top => 0.0,
            GuideAnchor::Right => canvas.width,
            GuideAnchor::Bottom => canvas.height,
            GuideAnchor::CenterX => canvas.width / 2.0,
            GuideAnchor::CenterY => canvas.height / 2.0,
        }
    }

    /// The matching coordinate of a dragged box.
    fn candidate(&self, extent: Rect) -> f64 {
        match self {
            GuideAnchor::Left => extent.x0,
            GuideAnchor::Top => extent.y0,
            GuideAnchor::Right => extent.x1,
            GuideAnchor::Bottom => extent.y1,
            GuideAnchor::CenterX => extent.center().x,
            GuideAnchor::CenterY => extent.center().y,
        }
    }

    /// Box origin coordinate that puts the candidate exactly on `edge`.
    fn snapped_origin(&self, extent: Rect, edge: f64) -> f64 {
        match self {
            GuideAnchor::Left | GuideAnchor::Top => edge,
            GuideAnchor::Right => edge - extent.width(),
            GuideAnchor::Bottom => edge - extent.height(),
            GuideAnchor::CenterX => edge - extent.width() / 2.0,
            GuideAnchor::CenterY => edge - extent.height() / 2.0,
        }
    }
}

/// A transient, non-interactive indicator line. Never part of the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guideline {
    pub anchor: GuideAnchor,
    pub start: Point,
    pub end: Point,
    pub stroke: SerializableColor,
    pub stroke_width: f64,
    pub dash: [f64; 2],
    pub opacity: f64,
}

impl Guideline {
    /// The guideline for an anchor, spanning the full canvas.
    pub fn for_anchor(anchor: GuideAnchor, canvas: Size) -> Self {
        let at = anchor.edge(canvas);
        let (start, end) = match anchor.orientation() {
            GuideOrientation::Vertical => (Point::new(at, 0.0), Point::new(at, canvas.height)),
            GuideOrientation::Horizontal => (Point::new(0.0, at), Point::new(canvas.width, at)),
        };
        Self {
            anchor,
            start,
            end,
            stroke: SerializableColor::red(),
            stroke_width: 1.0,
            dash: GUIDELINE_DASH,
            opacity: 0.5,
        }
    }

    pub fn tag(&self) -> &'static str {
        self.anchor.tag()
    }

    pub fn line(&self) -> Line {
        Line::new(self.start, self.end)
    }
}

/// Outcome of one snap evaluation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SnapResult {
    /// Box origin after snapping.
    pub left: f64,
    pub top: f64,
    /// Anchors that triggered, in evaluation order.
    pub anchors: Vec<GuideAnchor>,
}

impl SnapResult {
    pub fn is_snapped(&self) -> bool {
        !self.anchors.is_empty()
    }
}

/// Snap a box against the canvas edges and center.
///
/// All six candidates are measured on the box as dragged; a candidate snaps
/// when strictly closer than `threshold`.
pub fn snap_to_canvas(extent: Rect, canvas: Size, threshold: f64) -> SnapResult {
    let mut result = SnapResult {
        left: extent.x0,
        top: extent.y0,
        anchors: Vec::new(),
    };
    for anchor in GuideAnchor::ALL {
        let edge = anchor.edge(canvas);
        if (anchor.candidate(extent) - edge).abs() < threshold {
            let origin = anchor.snapped_origin(extent, edge);
            match anchor.orientation() {
                GuideOrientation::Vertical => result.left = origin,
                GuideOrientation::Horizontal => result.top = origin,
            }
            result.anchors.push(anchor);
        }
    }
    result
}

/// Guideline changes for the surface produced by one evaluation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GuidelineDiff {
    pub added: Vec<Guideline>,
    pub removed: Vec<GuideAnchor>,
}

impl GuidelineDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Drag-snap session state: which guidelines are currently shown.
#[derive(Debug, Clone)]
pub struct SnapEngine {
    threshold: f64,
    active: Vec<GuideAnchor>,
}

impl Default for SnapEngine {
    fn default() -> Self {
        Self::new(SNAP_THRESHOLD)
    }
}

impl SnapEngine {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            active: Vec::new(),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Anchors whose guidelines are on screen.
    pub fn active(&self) -> &[GuideAnchor] {
        &self.active
    }

    /// Guidelines currently on screen.
    pub fn guidelines(&self, canvas: Size) -> Vec<Guideline> {
        self.active
            .iter()
            .map(|anchor| Guideline::for_anchor(*anchor, canvas))
            .collect()
    }

    /// Evaluate one pointer move. The active guideline set is recomputed from
    /// this move alone: anchors that no longer trigger are removed, new ones
    /// added, and ones still triggering are kept without duplication.
    pub fn evaluate(&mut self, extent: Rect, canvas: Size) -> (SnapResult, GuidelineDiff) {
        let result = snap_to_canvas(extent, canvas, self.threshold);
        let removed: Vec<GuideAnchor> = self
            .active
            .iter()
            .copied()
            .filter(|anchor| !result.anchors.contains(anchor))
            .collect();
        let added: Vec<Guideline> = result
            .anchors
            .iter()
            .filter(|anchor| !self.active.contains(anchor))
            .map(|anchor| Guideline::for_anchor(*anchor, canvas))
            .collect();
        self.active = result.anchors.clone();
        log::trace!(
            "Snap {:?} -> ({:.1}, {:.1}) anchors {:?}",
            extent,
            result.left,
            result.top,
            result.anchors
        );
        (result, GuidelineDiff { added, removed })
    }

    /// End the drag session, returning every anchor that was shown.
    pub fn clear(&mut self) -> Vec<GuideAnchor> {
        std::mem::take(&mut self.active)
    }
}
