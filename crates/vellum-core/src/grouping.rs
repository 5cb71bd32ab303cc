//! Converting a multi-selection into a group and back.
//!
//! Member transforms are rewritten between parent space and group space so
//! every member keeps its absolute placement across group and ungroup.

use crate::geometry::union_rects;
use crate::object::{DrawableObject, Transform};
use crate::scene::SceneGraph;
use crate::selection::Selection;
use crate::shapes::{Group, ObjectId, Shape};
use kurbo::Vec2;

/// Whether a transform is a pure translation.
fn is_translation(transform: &Transform) -> bool {
    transform.angle == 0.0 && transform.scale_x == 1.0 && transform.scale_y == 1.0
}

/// Express `child` (in the parent's space) in the space of `group`.
pub fn to_group_space(group: &Transform, child: &Transform) -> Transform {
    if is_translation(group) {
        return Transform {
            left: child.left - group.left,
            top: child.top - group.top,
            ..*child
        };
    }
    Transform::from_affine(group.affine().inverse() * child.affine())
}

/// Express `child` (in the space of `group`) in the group's parent space.
pub fn to_parent_space(group: &Transform, child: &Transform) -> Transform {
    if is_translation(group) {
        return Transform {
            left: child.left + group.left,
            top: child.top + group.top,
            ..*child
        };
    }
    Transform::from_affine(group.affine() * child.affine())
}

/// Runs group and ungroup against a scene graph.
///
/// Both operations take the scene by `&mut`, so one cannot start while
/// another is still running.
#[derive(Debug, Clone, Default)]
pub struct GroupingController;

impl GroupingController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group the members of a composite selection.
    ///
    /// The members must share one sibling list and none may contain
    /// another. The group's box is the union of the members' bounds and it
    /// takes the stacking slot of the topmost member. Anything else is a
    /// silent no-op returning `None`.
    pub fn group(&mut self, scene: &mut SceneGraph, selection: &Selection) -> Option<ObjectId> {
        let Selection::Composite(ids) = selection else {
            return None;
        };
        group_members(scene, ids)
    }

    /// Dissolve a group, returning its former children as a selection.
    ///
    /// Children are placed at the group's stacking slot in their original
    /// order. Returns `None` if `id` is not a group.
    pub fn ungroup(&mut self, scene: &mut SceneGraph, id: ObjectId) -> Option<Selection> {
        ungroup_object(scene, id).map(Selection::from_ids)
    }
}

fn group_members(scene: &mut SceneGraph, ids: &[ObjectId]) -> Option<ObjectId> {
    let mut members: Vec<(usize, ObjectId)> = Vec::with_capacity(ids.len());
    let mut parent = None;
    for (i, id) in ids.iter().enumerate() {
        let location = scene.location(*id)?;
        if i == 0 {
            parent = location.parent;
        } else if location.parent != parent {
            log::trace!("Members of a group must share a parent");
            return None;
        }
        members.push((location.index, *id));
    }
    members.sort_by_key(|&(index, _)| index);
    members.dedup_by_key(|&mut (_, id)| id);
    if members.len() < 2 {
        return None;
    }
    let nested = members
        .iter()
        .any(|&(_, a)| members.iter().any(|&(_, b)| scene.is_descendant_of(a, b)));
    if nested {
        return None;
    }

    let bounds = union_rects(members.iter().filter_map(|&(_, id)| scene.get(id)).map(|o| o.bounds()))?;
    let group_transform = Transform::at(bounds.x0, bounds.y0);

    let max_index = members.iter().map(|&(index, _)| index).max()?;
    let mut children = Vec::with_capacity(members.len());
    for &(_, id) in &members {
        let (mut child, _) = scene.take(id)?;
        child.transform = to_group_space(&group_transform, &child.transform);
        children.push(child);
    }

    let mut group = DrawableObject::new(Shape::Group(Group::new(children, bounds.size())));
    group.transform = group_transform;
    let group_id = group.id();
    let slot = max_index - (members.len() - 1);
    if !scene.insert(group, parent, slot) {
        return None;
    }
    log::debug!("Grouped {} objects into {} at z {}", members.len(), group_id, slot);
    Some(group_id)
}

fn ungroup_object(scene: &mut SceneGraph, id: ObjectId) -> Option<Vec<ObjectId>> {
    if !scene.get(id)?.is_group() {
        return None;
    }
    let (group, location) = scene.take(id)?;
    let group_transform = group.transform;
    let Shape::Group(members) = group.shape else {
        return None;
    };

    let mut child_ids = Vec::with_capacity(members.len());
    for (offset, mut child) in members.ungroup().into_iter().enumerate() {
        child.transform = to_parent_space(&group_transform, &child.transform);
        child_ids.push(child.id());
        scene.insert(child, location.parent, location.index + offset);
    }
    log::debug!("Ungrouped {} into {} objects", id, child_ids.len());
    Some(child_ids)
}

/// Offset applied to duplicated objects.
pub const DUPLICATE_OFFSET: Vec2 = Vec2::new(10.0, 10.0);

/// Copy objects with fresh ids, shifted by [`DUPLICATE_OFFSET`], and add
/// them on top of the root list. Returns the new ids.
pub fn duplicate(scene: &mut SceneGraph, ids: &[ObjectId]) -> Vec<ObjectId> {
    let mut sources: Vec<(usize, DrawableObject)> = ids
        .iter()
        .filter_map(|id| scene.get(*id))
        .map(|object| (object.z_index(), object.clone()))
        .collect();
    sources.sort_by_key(|&(index, _)| index);

    let mut added = Vec::with_capacity(sources.len());
    for (_, mut copy) in sources {
        copy.regenerate_ids();
        copy.transform.left += DUPLICATE_OFFSET.x;
        copy.transform.top += DUPLICATE_OFFSET.y;
        match scene.add(copy) {
            Ok(id) => added.push(id),
            Err(error) => log::warn!("Could not add duplicate: {}", error),
        }
    }
    added
}
