//! Selection state and the property snapshot shown to inspectors.

use crate::geometry::union_rects;
use crate::object::DrawableObject;
use crate::scene::SceneGraph;
use crate::shapes::{ObjectId, SerializableColor, Shape, ShapeKind};
use kurbo::Rect;

/// The current selection. Holds ids only; the scene graph owns the objects.
///
/// A composite selection is ephemeral and has no identity of its own, unlike
/// a group.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Empty,
    Single(ObjectId),
    /// Two or more ids, in the order they were selected.
    Composite(Vec<ObjectId>),
}

impl Selection {
    /// Build a selection from ids, dropping duplicates.
    pub fn from_ids(ids: impl IntoIterator<Item = ObjectId>) -> Self {
        let mut unique: Vec<ObjectId> = Vec::new();
        for id in ids {
            if !unique.contains(&id) {
                unique.push(id);
            }
        }
        match unique.len() {
            0 => Selection::Empty,
            1 => Selection::Single(unique[0]),
            _ => Selection::Composite(unique),
        }
    }

    pub fn ids(&self) -> &[ObjectId] {
        match self {
            Selection::Empty => &[],
            Selection::Single(id) => std::slice::from_ref(id),
            Selection::Composite(ids) => ids,
        }
    }

    pub fn len(&self) -> usize {
        self.ids().len()
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Selection::Empty)
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, Selection::Composite(_))
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.ids().contains(&id)
    }

    /// The id of a single selection.
    pub fn single(&self) -> Option<ObjectId> {
        match self {
            Selection::Single(id) => Some(*id),
            _ => None,
        }
    }

    /// Keep only ids matching `keep`. A composite left with one id collapses
    /// to `Single`. Returns `true` if anything was dropped.
    pub fn retain(&mut self, mut keep: impl FnMut(ObjectId) -> bool) -> bool {
        let before = self.len();
        let kept: Vec<ObjectId> = self.ids().iter().copied().filter(|id| keep(*id)).collect();
        if kept.len() == before {
            return false;
        }
        *self = Selection::from_ids(kept);
        true
    }

    /// Union of the members' extents in canvas space: the bounding box a
    /// composite selection is manipulated by.
    pub fn bounding_box(&self, scene: &SceneGraph) -> Option<Rect> {
        union_rects(self.ids().iter().filter_map(|id| scene.get(*id)).map(|o| o.extent()))
    }
}

/// Rounded property values as an inspector displays them.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySnapshot {
    /// `None` for a composite selection.
    pub kind: Option<ShapeKind>,
    pub left: f64,
    pub top: f64,
    /// Scaled width, rounded.
    pub width: f64,
    /// Scaled height, rounded.
    pub height: f64,
    pub angle: f64,
    /// Stored opacity, rounded to two decimals.
    pub opacity: f64,
    pub fill: SerializableColor,
    pub stroke: SerializableColor,
    pub stroke_width: f64,
    pub font_size: Option<f64>,
    pub visible: bool,
    pub locked: bool,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl PropertySnapshot {
    /// Snapshot of a single object.
    pub fn of_object(object: &DrawableObject) -> Self {
        let size = object.scaled_size();
        let font_size = match &object.shape {
            Shape::TextBox(text) => Some(text.font_size),
            _ => None,
        };
        Self {
            kind: Some(object.kind()),
            left: object.transform.left.round(),
            top: object.transform.top.round(),
            width: size.width.round(),
            height: size.height.round(),
            angle: object.transform.angle.round() % 360.0,
            opacity: round2(object.stored_opacity()),
            fill: object.style.fill,
            stroke: object.style.stroke,
            stroke_width: object.style.stroke_width,
            font_size,
            visible: object.is_visible(),
            locked: object.is_locked(),
        }
    }

    /// Snapshot of a composite: geometry from the union box, style from the
    /// first selected member.
    fn of_composite(members: &[&DrawableObject], bounds: Rect) -> Option<Self> {
        let first = members.first()?;
        Some(Self {
            kind: None,
            left: bounds.x0.round(),
            top: bounds.y0.round(),
            width: bounds.width().round(),
            height: bounds.height().round(),
            angle: 0.0,
            locked: members.iter().all(|m| m.is_locked()),
            visible: members.iter().any(|m| m.is_visible()),
            ..Self::of_object(first)
        })
    }
}

/// Tracks the active selection and keeps its snapshot in step with the
/// scene graph.
#[derive(Debug, Clone, Default)]
pub struct SelectionManager {
    selection: Selection,
    snapshot: Option<PropertySnapshot>,
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Displayed property values, `None` when nothing is selected.
    pub fn snapshot(&self) -> Option<&PropertySnapshot> {
        self.snapshot.as_ref()
    }

    pub fn is_selected(&self, id: ObjectId) -> bool {
        self.selection.contains(id)
    }

    /// Replace the selection. Ids absent from the scene are ignored.
    /// Returns `true` if the selection changed.
    pub fn select(&mut self, ids: impl IntoIterator<Item = ObjectId>, scene: &SceneGraph) -> bool {
        let next = Selection::from_ids(ids.into_iter().filter(|id| scene.contains(*id)));
        let changed = next != self.selection;
        if changed {
            log::trace!("Selection {:?} -> {:?}", self.selection, next);
            self.selection = next;
        }
        self.resync(scene);
        changed
    }

    /// Returns `true` if something was selected.
    pub fn clear(&mut self) -> bool {
        self.snapshot = None;
        !std::mem::take(&mut self.selection).is_empty()
    }

    /// Drop ids no longer in the scene. Returns `true` if any were dropped.
    pub fn prune(&mut self, scene: &SceneGraph) -> bool {
        let pruned = self.selection.retain(|id| scene.contains(id));
        if pruned {
            log::trace!("Pruned stale ids, selection now {:?}", self.selection);
        }
        self.resync(scene);
        pruned
    }

    /// Rebuild the snapshot from the authoritative objects.
    pub fn resync(&mut self, scene: &SceneGraph) {
        let members: Vec<&DrawableObject> = self
            .selection
            .ids()
            .iter()
            .filter_map(|id| scene.get(*id))
            .collect();
        self.snapshot = match members.as_slice() {
            [] => None,
            [object] => Some(PropertySnapshot::of_object(object)),
            _ => self
                .selection
                .bounding_box(scene)
                .and_then(|bounds| PropertySnapshot::of_composite(&members, bounds)),
        };
    }
}
