//! The scene graph: the ordered, hierarchical set of drawable objects.
//!
//! The graph owns every object reachable from its root list. Groups own their
//! children. Each object's `z_index` equals its position in its sibling list
//! and is renumbered after every structural change, so indices within a list
//! always form `0..N`.

use crate::object::{DrawableObject, Transform};
use crate::shapes::{ObjectId, ShapeKind};
use kurbo::{Affine, Point, Rect};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use uuid::Uuid;

/// Version written into persisted scenes.
const SCENE_FORMAT_VERSION: u32 = 1;

/// Invariant violations rejected by the scene graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneError {
    #[error("Object id already in scene: {0}")]
    DuplicateId(ObjectId),
    #[error("Group has no children: {0}")]
    EmptyGroup(ObjectId),
}

/// A structural or property change recorded by the graph, drained by the
/// owner to notify the rendering surface and event subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneChange {
    Added(ObjectId),
    Removed(ObjectId),
    Modified(ObjectId),
    Reordered(ObjectId),
}

/// Where an object sits: its parent group (`None` for the root list) and its
/// index in that parent's sibling list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub parent: Option<ObjectId>,
    pub index: usize,
}

/// Summary row for a layers panel.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerItem {
    pub id: ObjectId,
    pub z_index: usize,
    pub kind: ShapeKind,
    /// Stored opacity, independent of visibility.
    pub opacity: f64,
    pub visible: bool,
    pub locked: bool,
    pub name: String,
}

#[derive(Serialize, Deserialize)]
struct SceneFile {
    version: u32,
    objects: Vec<DrawableObject>,
}

/// Ordered collection of drawable objects with parent/child grouping.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    /// Top-level objects, back to front.
    roots: Vec<DrawableObject>,
    /// Path of sibling indices from the root list to each object.
    index: HashMap<ObjectId, Vec<usize>>,
    /// Changes since the last drain.
    changes: Vec<SceneChange>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of top-level objects.
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Number of objects at any depth.
    pub fn object_count(&self) -> usize {
        self.index.len()
    }

    /// Top-level objects, back to front.
    pub fn roots(&self) -> &[DrawableObject] {
        &self.roots
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.index.contains_key(&id)
    }

    /// Look up an object at any depth.
    pub fn get(&self, id: ObjectId) -> Option<&DrawableObject> {
        let path = self.index.get(&id)?;
        node(&self.roots, path)
    }

    /// Mutable lookup that bypasses change tracking.
    pub(crate) fn get_mut(&mut self, id: ObjectId) -> Option<&mut DrawableObject> {
        let path = self.index.get(&id)?;
        node_mut(&mut self.roots, path)
    }

    /// Mutate an object in place and record it as modified.
    ///
    /// The closure must not change the object's id. If it changes a group's
    /// membership the subtree is re-indexed: new or clashing ids are
    /// replaced, empty groups are dropped, and a group left with no children
    /// is dissolved.
    pub fn modify<R>(&mut self, id: ObjectId, f: impl FnOnce(&mut DrawableObject) -> R) -> Option<R> {
        let object = self.get_mut(id)?;
        let before = object.descendant_ids();
        let result = f(object);
        debug_assert_eq!(object.id, id, "object id changed during modify");
        let restructured = object.descendant_ids() != before;
        self.changes.push(SceneChange::Modified(id));
        if restructured {
            self.repair_subtree(id, &before);
        }
        Some(result)
    }

    /// Add an object on top of the root stacking order.
    ///
    /// Nil ids (on the object or any descendant) are replaced with fresh ones.
    /// Fails if any id is already in the scene or if the object contains an
    /// empty group.
    pub fn add(&mut self, mut object: DrawableObject) -> Result<ObjectId, SceneError> {
        assign_missing_ids(&mut object);
        self.validate_incoming(&object)?;
        let id = object.id;
        log::debug!("Adding {} {} at z {}", object.kind().tag(), id, self.roots.len());
        self.roots.push(object);
        self.renumber();
        self.changes.push(SceneChange::Added(id));
        Ok(id)
    }

    /// Delete an object and all of its descendants.
    ///
    /// A group left empty by the removal is dissolved as well. Returns the
    /// removed object, or `None` if the id was absent.
    pub fn remove(&mut self, id: ObjectId) -> Option<DrawableObject> {
        let (object, location) = self.take(id)?;
        log::debug!("Removed {} {}", object.kind().tag(), id);

        let mut parent = location.parent;
        while let Some(parent_id) = parent {
            let empty = self
                .get(parent_id)
                .and_then(|p| p.shape.as_group())
                .is_some_and(|g| g.is_empty());
            if !empty {
                self.changes.push(SceneChange::Modified(parent_id));
                break;
            }
            log::warn!("Dissolving group {} left empty by removal", parent_id);
            parent = self.take(parent_id).and_then(|(_, loc)| loc.parent);
        }
        Some(object)
    }

    /// Move an object to an absolute position in its sibling list.
    ///
    /// `to_index` is clamped to the list's bounds. Returns `true` if the
    /// stacking order changed.
    pub fn reorder(&mut self, id: ObjectId, to_index: usize) -> bool {
        let Some(location) = self.location(id) else {
            return false;
        };
        let Some(siblings) = self.siblings_mut(location.parent) else {
            return false;
        };
        let target = to_index.min(siblings.len().saturating_sub(1));
        if target == location.index {
            return false;
        }
        let object = siblings.remove(location.index);
        siblings.insert(target, object);
        log::debug!("Reordered {} from {} to {}", id, location.index, target);
        self.renumber();
        self.changes.push(SceneChange::Reordered(id));
        true
    }

    /// Lazily iterate every object matching `predicate`, depth first in paint
    /// order (a group comes before its children). Each call walks the
    /// current state afresh.
    pub fn query<P>(&self, predicate: P) -> Query<'_, P>
    where
        P: FnMut(&DrawableObject) -> bool,
    {
        Query {
            stack: vec![self.roots.iter()],
            predicate,
        }
    }

    /// Every object, depth first in paint order.
    pub fn iter(&self) -> impl Iterator<Item = &DrawableObject> {
        self.query(|_| true)
    }

    pub fn location(&self, id: ObjectId) -> Option<Location> {
        let path = self.index.get(&id)?;
        let (&index, parent_path) = path.split_last()?;
        let parent = if parent_path.is_empty() {
            None
        } else {
            Some(node(&self.roots, parent_path)?.id)
        };
        Some(Location { parent, index })
    }

    /// The group directly containing `id`, `None` for top-level or absent ids.
    pub fn parent_of(&self, id: ObjectId) -> Option<ObjectId> {
        self.location(id).and_then(|location| location.parent)
    }

    /// The top-level object that contains `id` (or `id` itself).
    pub fn root_of(&self, id: ObjectId) -> Option<ObjectId> {
        let path = self.index.get(&id)?;
        self.roots.get(*path.first()?).map(|object| object.id)
    }

    /// Whether `ancestor` contains `id` at any depth.
    pub fn is_descendant_of(&self, id: ObjectId, ancestor: ObjectId) -> bool {
        match (self.index.get(&id), self.index.get(&ancestor)) {
            (Some(path), Some(ancestor_path)) => {
                path.len() > ancestor_path.len() && path.starts_with(ancestor_path)
            }
            _ => false,
        }
    }

    /// The sibling list an object belongs to.
    pub fn siblings_of(&self, id: ObjectId) -> Option<&[DrawableObject]> {
        let location = self.location(id)?;
        self.siblings(location.parent)
    }

    /// The children of `parent`, or the root list for `None`.
    pub fn siblings(&self, parent: Option<ObjectId>) -> Option<&[DrawableObject]> {
        match parent {
            None => Some(&self.roots),
            Some(id) => self.get(id)?.shape.as_group().map(|g| g.children()),
        }
    }

    fn siblings_mut(&mut self, parent: Option<ObjectId>) -> Option<&mut Vec<DrawableObject>> {
        match parent {
            None => Some(&mut self.roots),
            Some(id) => self.get_mut(id)?.shape.as_group_mut().map(|g| g.children_mut()),
        }
    }

    /// Current z index of an object within its sibling list.
    pub fn z_index(&self, id: ObjectId) -> Option<usize> {
        self.index.get(&id).and_then(|path| path.last().copied())
    }

    /// Matrix mapping the object's local box into canvas space.
    pub fn absolute_affine(&self, id: ObjectId) -> Option<Affine> {
        let path = self.index.get(&id)?;
        let mut affine = Affine::IDENTITY;
        let mut list = self.roots.as_slice();
        for &i in path {
            let object = list.get(i)?;
            affine = affine * object.affine();
            list = object.shape.as_group().map(|g| g.children()).unwrap_or(&[]);
        }
        Some(affine)
    }

    /// The object's placement expressed in canvas space.
    pub fn absolute_transform(&self, id: ObjectId) -> Option<Transform> {
        self.absolute_affine(id).map(Transform::from_affine)
    }

    /// Canvas-space axis-aligned bounds of an object.
    pub fn absolute_bounds(&self, id: ObjectId) -> Option<Rect> {
        let object = self.get(id)?;
        let affine = self.absolute_affine(id)?;
        Some(affine.transform_rect_bbox(object.size().to_rect()))
    }

    /// Bounds of all top-level objects.
    pub fn bounds(&self) -> Option<Rect> {
        crate::geometry::union_rects(self.roots.iter().map(|o| o.bounds()))
    }

    /// Visible top-level objects under a canvas point, top-most first.
    pub fn objects_at_point(&self, point: Point, tolerance: f64) -> Vec<ObjectId> {
        self.roots
            .iter()
            .rev()
            .filter(|object| object.is_visible() && object.contains_point(point, tolerance))
            .map(|object| object.id)
            .collect()
    }

    /// Top-level objects as layer rows, top-most first.
    pub fn layers(&self) -> Vec<LayerItem> {
        self.roots
            .iter()
            .rev()
            .map(|object| LayerItem {
                id: object.id,
                z_index: object.z_index,
                kind: object.kind(),
                opacity: object.stored_opacity(),
                visible: object.is_visible(),
                locked: object.is_locked(),
                name: object.name.clone(),
            })
            .collect()
    }

    /// Drain the changes recorded since the last call.
    pub fn take_changes(&mut self) -> Vec<SceneChange> {
        std::mem::take(&mut self.changes)
    }

    /// Serialize the scene to JSON. Transient state is not written.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let file = SceneFile {
            version: SCENE_FORMAT_VERSION,
            objects: self.roots.iter().map(DrawableObject::to_persisted).collect(),
        };
        serde_json::to_string_pretty(&file)
    }

    /// Load a scene from JSON.
    ///
    /// Duplicate or missing ids are replaced and empty groups are dropped,
    /// each with a warning.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let file: SceneFile = serde_json::from_str(json)?;
        if file.version != SCENE_FORMAT_VERSION {
            log::warn!("Loading scene format version {} as {}", file.version, SCENE_FORMAT_VERSION);
        }
        let mut seen = HashSet::new();
        let mut roots = Vec::with_capacity(file.objects.len());
        for mut object in file.objects {
            if repair_loaded(&mut object, &mut seen) {
                object.restore_loaded();
                roots.push(object);
            }
        }
        let mut scene = Self {
            roots,
            ..Self::default()
        };
        scene.renumber();
        Ok(scene)
    }

    /// Detach an object without dissolving a parent it leaves empty.
    pub(crate) fn take(&mut self, id: ObjectId) -> Option<(DrawableObject, Location)> {
        let location = self.location(id)?;
        let siblings = self.siblings_mut(location.parent)?;
        let object = siblings.remove(location.index);
        self.renumber();
        self.changes.push(SceneChange::Removed(id));
        Some((object, location))
    }

    /// Insert an already-validated object into a sibling list, clamping the
    /// index. Returns `false` if the parent does not exist.
    pub(crate) fn insert(&mut self, object: DrawableObject, parent: Option<ObjectId>, index: usize) -> bool {
        debug_assert!(!self.contains(object.id), "inserting duplicate id {}", object.id);
        let id = object.id;
        let Some(siblings) = self.siblings_mut(parent) else {
            return false;
        };
        let index = index.min(siblings.len());
        siblings.insert(index, object);
        self.renumber();
        self.changes.push(SceneChange::Added(id));
        true
    }

    fn validate_incoming(&self, object: &DrawableObject) -> Result<(), SceneError> {
        let mut seen = HashSet::new();
        for candidate in Query::all(std::slice::from_ref(object)) {
            if self.contains(candidate.id) || !seen.insert(candidate.id) {
                return Err(SceneError::DuplicateId(candidate.id));
            }
            if candidate.shape.as_group().is_some_and(|g| g.is_empty()) {
                return Err(SceneError::EmptyGroup(candidate.id));
            }
        }
        Ok(())
    }

    fn repair_subtree(&mut self, id: ObjectId, before: &[ObjectId]) {
        log::warn!("Membership of {} changed in place, re-indexing", id);
        let previous: HashSet<ObjectId> = before.iter().copied().collect();
        let mut seen: HashSet<ObjectId> = self
            .index
            .keys()
            .copied()
            .filter(|known| !previous.contains(known))
            .collect();
        let Some(object) = self.get_mut(id) else {
            return;
        };
        let mut emptied = false;
        if let Some(group) = object.shape.as_group_mut() {
            group.children_mut().retain_mut(|child| repair_loaded(child, &mut seen));
            emptied = group.is_empty();
        }
        let after = object.descendant_ids();

        for gone in before.iter().filter(|old| !after.contains(old)) {
            self.changes.push(SceneChange::Removed(*gone));
        }
        for added in after.iter().filter(|new| !previous.contains(new)) {
            self.changes.push(SceneChange::Added(*added));
        }
        self.renumber();
        if emptied {
            log::warn!("Dissolving group {} emptied in place", id);
            self.remove(id);
        }
    }

    /// Recompute every z index and the id index from the tree.
    fn renumber(&mut self) {
        self.index.clear();
        let mut path = Vec::new();
        renumber_list(&mut self.roots, &mut path, &mut self.index);
    }
}

fn renumber_list(
    list: &mut [DrawableObject],
    path: &mut Vec<usize>,
    index: &mut HashMap<ObjectId, Vec<usize>>,
) {
    for (i, object) in list.iter_mut().enumerate() {
        object.z_index = i;
        path.push(i);
        let previous = index.insert(object.id, path.clone());
        debug_assert!(previous.is_none(), "duplicate object id {}", object.id);
        if let Some(group) = object.shape.as_group_mut() {
            renumber_list(group.children_mut(), path, index);
        }
        path.pop();
    }
}

fn node<'a>(roots: &'a [DrawableObject], path: &[usize]) -> Option<&'a DrawableObject> {
    let (first, rest) = path.split_first()?;
    let mut current = roots.get(*first)?;
    for &i in rest {
        current = current.shape.as_group()?.children().get(i)?;
    }
    Some(current)
}

fn node_mut<'a>(roots: &'a mut [DrawableObject], path: &[usize]) -> Option<&'a mut DrawableObject> {
    let (first, rest) = path.split_first()?;
    let mut current = roots.get_mut(*first)?;
    for &i in rest {
        current = current.shape.as_group_mut()?.children_mut().get_mut(i)?;
    }
    Some(current)
}

fn assign_missing_ids(object: &mut DrawableObject) {
    if object.id.is_nil() {
        object.id = Uuid::new_v4();
    }
    if let Some(group) = object.shape.as_group_mut() {
        for child in group.children_mut() {
            assign_missing_ids(child);
        }
    }
}

/// Fix ids and prune empty groups in a loaded or restructured object. Returns
/// `false` if the object itself should be dropped.
fn repair_loaded(object: &mut DrawableObject, seen: &mut HashSet<ObjectId>) -> bool {
    if object.id.is_nil() || !seen.insert(object.id) {
        let fresh = Uuid::new_v4();
        log::warn!("Replacing missing or duplicate id {} with {}", object.id, fresh);
        object.id = fresh;
        seen.insert(fresh);
    }
    if let Some(group) = object.shape.as_group_mut() {
        group.children_mut().retain_mut(|child| repair_loaded(child, seen));
        if group.is_empty() {
            log::warn!("Dropping empty group {}", object.id);
            return false;
        }
    }
    true
}

/// Lazy depth-first iterator returned by [`SceneGraph::query`].
pub struct Query<'a, P> {
    stack: Vec<std::slice::Iter<'a, DrawableObject>>,
    predicate: P,
}

impl<'a> Query<'a, fn(&DrawableObject) -> bool> {
    fn all(list: &'a [DrawableObject]) -> Self {
        Query {
            stack: vec![list.iter()],
            predicate: |_| true,
        }
    }
}

impl<'a, P> Iterator for Query<'a, P>
where
    P: FnMut(&DrawableObject) -> bool,
{
    type Item = &'a DrawableObject;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let object = match self.stack.last_mut()?.next() {
                Some(object) => object,
                None => {
                    self.stack.pop();
                    continue;
                }
            };
            if let Some(group) = object.shape.as_group() {
                self.stack.push(group.children().iter());
            }
            if (self.predicate)(object) {
                return Some(object);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory;
    use crate::shapes::{Group, Shape};
    use kurbo::Size;

    fn rect_at(left: f64, top: f64) -> DrawableObject {
        let mut object = factory::rect(10.0, 10.0);
        object.set_position(left, top);
        object
    }

    fn group_of(children: Vec<DrawableObject>) -> DrawableObject {
        DrawableObject::new(Shape::Group(Group::new(children, Size::new(50.0, 50.0))))
    }

    fn root_ids(scene: &SceneGraph) -> Vec<ObjectId> {
        scene.roots().iter().map(|o| o.id()).collect()
    }

    fn assert_dense(list: &[DrawableObject]) {
        for (i, object) in list.iter().enumerate() {
            assert_eq!(object.z_index(), i);
            if let Some(group) = object.shape.as_group() {
                assert_dense(group.children());
            }
        }
    }

    #[test]
    fn test_add_appends_on_top() {
        let mut scene = SceneGraph::new();
        let a = scene.add(rect_at(0.0, 0.0)).unwrap();
        let b = scene.add(rect_at(5.0, 5.0)).unwrap();
        assert_eq!(scene.z_index(a), Some(0));
        assert_eq!(scene.z_index(b), Some(1));
        assert_eq!(
            scene.take_changes(),
            vec![SceneChange::Added(a), SceneChange::Added(b)]
        );
        assert!(scene.take_changes().is_empty());
    }

    #[test]
    fn test_add_assigns_missing_id() {
        let mut scene = SceneGraph::new();
        let object = DrawableObject::with_id(ObjectId::nil(), Shape::Rect(crate::shapes::Rectangle::new(1.0, 1.0)));
        let id = scene.add(object).unwrap();
        assert!(!id.is_nil());
        assert!(scene.get(id).is_some());
    }

    #[test]
    fn test_add_rejects_duplicate_id() {
        let mut scene = SceneGraph::new();
        let object = rect_at(0.0, 0.0);
        let copy = object.clone();
        let id = scene.add(object).unwrap();
        assert_eq!(scene.add(copy), Err(SceneError::DuplicateId(id)));
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn test_add_rejects_duplicate_child_id() {
        let mut scene = SceneGraph::new();
        let child = rect_at(0.0, 0.0);
        let child_id = child.id();
        scene.add(child.clone()).unwrap();
        let group = group_of(vec![child, rect_at(1.0, 1.0)]);
        assert_eq!(scene.add(group), Err(SceneError::DuplicateId(child_id)));
    }

    #[test]
    fn test_add_rejects_empty_group() {
        let mut scene = SceneGraph::new();
        let group = group_of(Vec::new());
        let id = group.id();
        assert_eq!(scene.add(group), Err(SceneError::EmptyGroup(id)));
    }

    #[test]
    fn test_remove_renumbers() {
        let mut scene = SceneGraph::new();
        let a = scene.add(rect_at(0.0, 0.0)).unwrap();
        let b = scene.add(rect_at(0.0, 0.0)).unwrap();
        let c = scene.add(rect_at(0.0, 0.0)).unwrap();
        assert!(scene.remove(b).is_some());
        assert_eq!(root_ids(&scene), vec![a, c]);
        assert_eq!(scene.z_index(c), Some(1));
        assert!(scene.remove(b).is_none());
    }

    #[test]
    fn test_remove_group_removes_descendants() {
        let mut scene = SceneGraph::new();
        let child = rect_at(0.0, 0.0);
        let child_id = child.id();
        let group_id = scene.add(group_of(vec![child, rect_at(1.0, 1.0)])).unwrap();
        assert_eq!(scene.object_count(), 3);
        scene.remove(group_id);
        assert!(!scene.contains(child_id));
        assert_eq!(scene.object_count(), 0);
    }

    #[test]
    fn test_removing_last_child_dissolves_group() {
        let mut scene = SceneGraph::new();
        let only = rect_at(0.0, 0.0);
        let only_id = only.id();
        let inner = group_of(vec![only]);
        let inner_id = inner.id();
        let outer = group_of(vec![inner, rect_at(3.0, 3.0)]);
        let outer_id = scene.add(outer).unwrap();

        scene.remove(only_id);
        assert!(!scene.contains(inner_id));
        assert!(scene.contains(outer_id));
        assert_eq!(scene.get(outer_id).unwrap().shape.as_group().unwrap().len(), 1);
        assert_dense(scene.roots());
    }

    #[test]
    fn test_modify_emptying_group_dissolves_it() {
        let mut scene = SceneGraph::new();
        let (a, b) = (rect_at(0.0, 0.0), rect_at(20.0, 0.0));
        let (a_id, b_id) = (a.id(), b.id());
        let group = scene.add(group_of(vec![a, b])).unwrap();
        scene.take_changes();

        scene.modify(group, |o| o.shape.as_group_mut().unwrap().children_mut().clear());
        assert!(!scene.contains(group));
        assert!(!scene.contains(a_id));
        assert!(scene.get(b_id).is_none());
        assert_eq!(scene.object_count(), 0);
        let changes = scene.take_changes();
        assert!(changes.contains(&SceneChange::Removed(a_id)));
        assert!(changes.contains(&SceneChange::Removed(group)));
    }

    #[test]
    fn test_modify_reindexes_new_children() {
        let mut scene = SceneGraph::new();
        let group = scene.add(group_of(vec![rect_at(0.0, 0.0), rect_at(20.0, 0.0)])).unwrap();
        let loose = scene.add(rect_at(50.0, 50.0)).unwrap();
        let copy = scene.get(loose).unwrap().clone();

        scene.modify(group, |o| o.shape.as_group_mut().unwrap().children_mut().push(copy));
        assert_eq!(scene.object_count(), 5);
        let copy_id = scene.get(group).unwrap().shape.as_group().unwrap().children()[2].id();
        assert_ne!(copy_id, loose);
        assert_eq!(scene.parent_of(copy_id), Some(group));
        assert_eq!(scene.z_index(copy_id), Some(2));
        assert_eq!(scene.parent_of(loose), None);
        assert_dense(scene.roots());
    }

    #[test]
    fn test_reorder_clamps() {
        let mut scene = SceneGraph::new();
        let a = scene.add(rect_at(0.0, 0.0)).unwrap();
        let b = scene.add(rect_at(0.0, 0.0)).unwrap();
        let c = scene.add(rect_at(0.0, 0.0)).unwrap();

        assert!(scene.reorder(a, 99));
        assert_eq!(root_ids(&scene), vec![b, c, a]);
        assert!(!scene.reorder(a, 2));
        assert!(scene.reorder(a, 0));
        assert_eq!(root_ids(&scene), vec![a, b, c]);
        assert_dense(scene.roots());
        assert!(!scene.reorder(ObjectId::nil(), 0));
    }

    #[test]
    fn test_query_is_lazy_and_restartable() {
        let mut scene = SceneGraph::new();
        let child = rect_at(0.0, 0.0);
        let child_id = child.id();
        let group_id = scene.add(group_of(vec![child, factory::circle(4.0)])).unwrap();
        let top = scene.add(rect_at(1.0, 1.0)).unwrap();

        let rects: Vec<ObjectId> = scene
            .query(|o| o.kind() == ShapeKind::Rect)
            .map(|o| o.id())
            .collect();
        assert_eq!(rects, vec![child_id, top]);

        let all: Vec<ObjectId> = scene.iter().map(|o| o.id()).collect();
        assert_eq!(all.len(), 4);
        assert_eq!(all[0], group_id);

        scene.remove(top);
        assert_eq!(scene.query(|o| o.kind() == ShapeKind::Rect).count(), 1);
    }

    #[test]
    fn test_location_and_ancestry() {
        let mut scene = SceneGraph::new();
        let first = rect_at(0.0, 0.0);
        let second = rect_at(0.0, 0.0);
        let second_id = second.id();
        let group_id = scene.add(group_of(vec![first, second])).unwrap();

        assert_eq!(
            scene.location(second_id),
            Some(Location { parent: Some(group_id), index: 1 })
        );
        assert_eq!(scene.parent_of(group_id), None);
        assert_eq!(scene.root_of(second_id), Some(group_id));
        assert!(scene.is_descendant_of(second_id, group_id));
        assert!(!scene.is_descendant_of(group_id, second_id));
    }

    #[test]
    fn test_absolute_transform_of_nested_child() {
        let mut scene = SceneGraph::new();
        let child = rect_at(5.0, 10.0);
        let child_id = child.id();
        let mut group = group_of(vec![child, rect_at(0.0, 0.0)]);
        group.transform = Transform::at(100.0, 200.0);
        scene.add(group).unwrap();

        let absolute = scene.absolute_transform(child_id).unwrap();
        assert!((absolute.left - 105.0).abs() < 1e-9);
        assert!((absolute.top - 210.0).abs() < 1e-9);
    }

    #[test]
    fn test_objects_at_point_skips_hidden() {
        let mut scene = SceneGraph::new();
        let bottom = scene.add(rect_at(0.0, 0.0)).unwrap();
        let top = scene.add(rect_at(5.0, 5.0)).unwrap();
        assert_eq!(scene.objects_at_point(Point::new(7.0, 7.0), 0.0), vec![top, bottom]);

        scene.modify(top, |o| o.set_visible(false));
        assert_eq!(scene.objects_at_point(Point::new(7.0, 7.0), 0.0), vec![bottom]);
    }

    #[test]
    fn test_layers_top_first() {
        let mut scene = SceneGraph::new();
        let a = scene.add(rect_at(0.0, 0.0)).unwrap();
        let b = scene.add(factory::circle(3.0)).unwrap();
        let layers = scene.layers();
        assert_eq!(layers[0].id, b);
        assert_eq!(layers[0].kind, ShapeKind::Circle);
        assert_eq!(layers[0].name, "circle");
        assert_eq!(layers[1].id, a);
        assert_eq!(layers[1].z_index, 0);
    }

    #[test]
    fn test_json_roundtrip_keeps_hidden_state() {
        let mut scene = SceneGraph::new();
        let id = scene.add(rect_at(3.0, 4.0)).unwrap();
        scene.modify(id, |o| {
            o.style.opacity = 0.6;
            o.set_visible(false);
        });

        let json = scene.to_json().unwrap();
        let loaded = SceneGraph::from_json(&json).unwrap();
        let object = loaded.get(id).unwrap();
        assert!(!object.is_visible());
        assert_eq!(object.effective_opacity(), 0.0);
        assert!((object.stored_opacity() - 0.6).abs() < f64::EPSILON);
        assert_eq!(loaded.z_index(id), Some(0));
    }

    #[test]
    fn test_from_json_repairs_duplicates() {
        let mut scene = SceneGraph::new();
        let object = rect_at(0.0, 0.0);
        scene.add(object.clone()).unwrap();
        let mut json_scene = scene.clone();
        json_scene.roots.push(object);
        let json = json_scene.to_json().unwrap();

        let loaded = SceneGraph::from_json(&json).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.object_count(), 2);
    }
}
