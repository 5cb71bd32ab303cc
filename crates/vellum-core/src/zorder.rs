//! Stacking order commands.
//!
//! Every operation works within an object's own sibling list and goes
//! through [`SceneGraph::reorder`], which renumbers the list afterwards.

use crate::scene::SceneGraph;
use crate::shapes::ObjectId;
use std::collections::{BTreeMap, HashSet};

/// Direction of a one-step stacking move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StackDirection {
    /// Towards the front (higher z index).
    Up,
    /// Towards the back.
    Down,
}

impl StackDirection {
    /// `+1` is up, `-1` is down; anything else is not a direction.
    pub fn from_step(step: i32) -> Option<Self> {
        match step {
            1 => Some(StackDirection::Up),
            -1 => Some(StackDirection::Down),
            _ => None,
        }
    }
}

/// Move an object to the top of its sibling list.
pub fn bring_to_front(scene: &mut SceneGraph, id: ObjectId) -> bool {
    match scene.siblings_of(id).map(|s| s.len()) {
        Some(len) => scene.reorder(id, len.saturating_sub(1)),
        None => false,
    }
}

/// Move an object to the bottom of its sibling list.
pub fn send_to_back(scene: &mut SceneGraph, id: ObjectId) -> bool {
    scene.reorder(id, 0)
}

/// Bring several objects to the front, keeping their relative order.
/// Returns the ids that moved.
pub fn bring_all_to_front(scene: &mut SceneGraph, ids: &[ObjectId]) -> Vec<ObjectId> {
    let mut ordered = by_index(scene, ids);
    ordered.sort_by_key(|&(index, _)| index);
    ordered
        .into_iter()
        .filter(|&(_, id)| bring_to_front(scene, id))
        .map(|(_, id)| id)
        .collect()
}

/// Send several objects to the back, keeping their relative order.
/// Returns the ids that moved.
pub fn send_all_to_back(scene: &mut SceneGraph, ids: &[ObjectId]) -> Vec<ObjectId> {
    let mut ordered = by_index(scene, ids);
    ordered.sort_by_key(|&(index, _)| std::cmp::Reverse(index));
    ordered
        .into_iter()
        .filter(|&(_, id)| send_to_back(scene, id))
        .map(|(_, id)| id)
        .collect()
}

/// Move each object one step in its sibling list.
///
/// Members are applied in the direction of travel (highest index first when
/// moving up) so the set never swaps with itself. A member whose next slot is
/// past the list bounds, or held by another member that could not move, stays
/// put. Returns the ids that moved.
pub fn move_by(scene: &mut SceneGraph, ids: &[ObjectId], direction: StackDirection) -> Vec<ObjectId> {
    let moving: HashSet<ObjectId> = ids.iter().copied().collect();

    // Sibling lists are independent; bucket members by parent.
    let mut lists: BTreeMap<Option<ObjectId>, Vec<(usize, ObjectId)>> = BTreeMap::new();
    for id in &moving {
        if let Some(location) = scene.location(*id) {
            lists.entry(location.parent).or_default().push((location.index, *id));
        }
    }

    let mut moved = Vec::new();
    for (parent, mut members) in lists {
        match direction {
            StackDirection::Up => members.sort_by_key(|&(index, _)| std::cmp::Reverse(index)),
            StackDirection::Down => members.sort_by_key(|&(index, _)| index),
        }
        for (_, id) in members {
            let Some(index) = scene.z_index(id) else {
                continue;
            };
            let target = match direction {
                StackDirection::Up => index + 1,
                StackDirection::Down => match index.checked_sub(1) {
                    Some(target) => target,
                    None => continue,
                },
            };
            let occupant = scene
                .siblings(parent)
                .and_then(|siblings| siblings.get(target))
                .map(|object| object.id());
            match occupant {
                Some(other) if !moving.contains(&other) => {
                    if scene.reorder(id, target) {
                        moved.push(id);
                    }
                }
                _ => log::trace!("{} cannot move {:?}", id, direction),
            }
        }
    }
    moved
}

fn by_index(scene: &SceneGraph, ids: &[ObjectId]) -> Vec<(usize, ObjectId)> {
    ids.iter()
        .filter_map(|id| scene.z_index(*id).map(|index| (index, *id)))
        .collect()
}
