//! Discrete alignment and distribution commands.
//!
//! A single object aligns to the canvas; several objects align to the union
//! box of their extents, i.e. to each other. All boxes are taken in canvas
//! space: a top-level object is measured by its unrotated extent, a nested
//! one by its absolute bounds, and moves are mapped back into the parent's
//! space.

use crate::geometry::union_rects;
use crate::scene::SceneGraph;
use crate::shapes::ObjectId;
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};

/// Which edge or center to line up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlignDirection {
    Left,
    Right,
    Top,
    Bottom,
    /// Center along the x axis.
    CenterHorizontal,
    /// Center along the y axis.
    CenterVertical,
}

impl AlignDirection {
    pub const ALL: [AlignDirection; 6] = [
        AlignDirection::Left,
        AlignDirection::Right,
        AlignDirection::Top,
        AlignDirection::Bottom,
        AlignDirection::CenterHorizontal,
        AlignDirection::CenterVertical,
    ];

    /// Short name as used by toolbar actions.
    pub fn name(&self) -> &'static str {
        match self {
            AlignDirection::Left => "left",
            AlignDirection::Right => "right",
            AlignDirection::Top => "top",
            AlignDirection::Bottom => "bottom",
            AlignDirection::CenterHorizontal => "horizontal",
            AlignDirection::CenterVertical => "vertical",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|direction| direction.name() == name)
    }
}

/// Axis along which to space objects evenly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DistributeAxis {
    Horizontal,
    Vertical,
}

/// New origin for `extent` so its edge or center matches `reference`.
/// The other axis is left untouched.
pub fn aligned_origin(extent: Rect, reference: Rect, direction: AlignDirection) -> Point {
    let mut origin = extent.origin();
    match direction {
        AlignDirection::Left => origin.x = reference.x0,
        AlignDirection::Right => origin.x = reference.x1 - extent.width(),
        AlignDirection::Top => origin.y = reference.y0,
        AlignDirection::Bottom => origin.y = reference.y1 - extent.height(),
        AlignDirection::CenterHorizontal => {
            origin.x = reference.x0 + (reference.width() - extent.width()) / 2.0
        }
        AlignDirection::CenterVertical => {
            origin.y = reference.y0 + (reference.height() - extent.height()) / 2.0
        }
    }
    origin
}

/// New origin for `extent` aligned to the canvas.
pub fn align_to_canvas(extent: Rect, canvas: Size, direction: AlignDirection) -> Point {
    aligned_origin(extent, canvas.to_rect(), direction)
}

/// New origins for a set of extents aligned to their union box.
pub fn align_to_bounds(extents: &[Rect], direction: AlignDirection) -> Vec<Point> {
    let Some(bounds) = union_rects(extents.iter().copied()) else {
        return Vec::new();
    };
    extents
        .iter()
        .map(|extent| aligned_origin(*extent, bounds, direction))
        .collect()
}

/// New origins spacing extents with equal gaps between the outermost two,
/// in input order. Fewer than three extents are returned unchanged.
pub fn distribute(extents: &[Rect], axis: DistributeAxis) -> Vec<Point> {
    let mut origins: Vec<Point> = extents.iter().map(|e| e.origin()).collect();
    if extents.len() < 3 {
        return origins;
    }
    let (start, end, length): (fn(&Rect) -> f64, fn(&Rect) -> f64, fn(&Rect) -> f64) = match axis {
        DistributeAxis::Horizontal => (|r: &Rect| r.x0, |r: &Rect| r.x1, |r: &Rect| r.width()),
        DistributeAxis::Vertical => (|r: &Rect| r.y0, |r: &Rect| r.y1, |r: &Rect| r.height()),
    };
    let mut order: Vec<usize> = (0..extents.len()).collect();
    order.sort_by(|&a, &b| start(&extents[a]).total_cmp(&start(&extents[b])));

    let first = &extents[order[0]];
    let span_end = order.iter().map(|&i| end(&extents[i])).fold(f64::MIN, f64::max);
    let occupied: f64 = extents.iter().map(length).sum();
    let gap = (span_end - start(first) - occupied) / (extents.len() - 1) as f64;

    let mut cursor = start(first);
    for &i in &order {
        match axis {
            DistributeAxis::Horizontal => origins[i].x = cursor,
            DistributeAxis::Vertical => origins[i].y = cursor,
        }
        cursor += length(&extents[i]) + gap;
    }
    origins
}

/// Align one object to the canvas. Locked or absent objects are skipped.
/// Returns `true` if the object moved.
pub fn align_object(scene: &mut SceneGraph, id: ObjectId, canvas: Size, direction: AlignDirection) -> bool {
    if scene.get(id).is_none_or(|o| o.is_locked()) {
        return false;
    }
    let Some(extent) = canvas_extent(scene, id) else {
        return false;
    };
    let origin = align_to_canvas(extent, canvas, direction);
    place(scene, id, extent, origin)
}

/// Align several objects to their union box.
///
/// Locked members contribute to the box but are not moved. Returns the ids
/// that moved.
pub fn align_objects(scene: &mut SceneGraph, ids: &[ObjectId], direction: AlignDirection) -> Vec<ObjectId> {
    let members = extents_of(scene, ids);
    let extents: Vec<Rect> = members.iter().map(|(_, extent, _)| *extent).collect();
    let origins = align_to_bounds(&extents, direction);
    apply_origins(scene, &members, &origins)
}

/// Space several objects evenly along an axis. Locked members keep their
/// place. Returns the ids that moved.
pub fn distribute_objects(scene: &mut SceneGraph, ids: &[ObjectId], axis: DistributeAxis) -> Vec<ObjectId> {
    let members = extents_of(scene, ids);
    let extents: Vec<Rect> = members.iter().map(|(_, extent, _)| *extent).collect();
    let origins = distribute(&extents, axis);
    apply_origins(scene, &members, &origins)
}

/// The box an object is aligned by, in canvas space.
fn canvas_extent(scene: &SceneGraph, id: ObjectId) -> Option<Rect> {
    match scene.parent_of(id) {
        None => scene.get(id).map(|o| o.extent()),
        Some(_) => scene.absolute_bounds(id),
    }
}

/// Move an object so its canvas-space box starts at `origin`.
fn place(scene: &mut SceneGraph, id: ObjectId, extent: Rect, origin: Point) -> bool {
    if origin == extent.origin() {
        return false;
    }
    match scene.parent_of(id).and_then(|parent| scene.absolute_affine(parent)) {
        None => scene.modify(id, |o| o.set_position(origin.x, origin.y)).is_some(),
        Some(parent) => {
            let inverse = parent.inverse();
            let delta = (inverse * origin) - (inverse * extent.origin());
            scene
                .modify(id, |o| {
                    let position = o.transform.position() + delta;
                    o.set_position(position.x, position.y);
                })
                .is_some()
        }
    }
}

fn extents_of(scene: &SceneGraph, ids: &[ObjectId]) -> Vec<(ObjectId, Rect, bool)> {
    ids.iter()
        .filter_map(|id| {
            let locked = scene.get(*id)?.is_locked();
            Some((*id, canvas_extent(scene, *id)?, locked))
        })
        .collect()
}

fn apply_origins(scene: &mut SceneGraph, members: &[(ObjectId, Rect, bool)], origins: &[Point]) -> Vec<ObjectId> {
    let mut moved = Vec::new();
    for ((id, extent, locked), origin) in members.iter().zip(origins) {
        if *locked {
            log::trace!("Skipping locked {} during alignment", id);
            continue;
        }
        if place(scene, *id, *extent, *origin) {
            moved.push(*id);
        }
    }
    moved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory;
    use crate::object::DrawableObject;
    use crate::shapes::{Group, Shape};

    const CANVAS: Size = Size::new(500.0, 400.0);

    fn scene_with(positions: &[(f64, f64)]) -> (SceneGraph, Vec<ObjectId>) {
        let mut scene = SceneGraph::new();
        let ids = positions
            .iter()
            .map(|&(left, top)| {
                let mut object = factory::rect(20.0, 10.0);
                object.set_position(left, top);
                scene.add(object).unwrap()
            })
            .collect();
        (scene, ids)
    }

    #[test]
    fn test_direction_names() {
        for direction in AlignDirection::ALL {
            assert_eq!(AlignDirection::from_name(direction.name()), Some(direction));
        }
    }

    #[test]
    fn test_align_to_canvas_moves_one_axis() {
        let extent = Rect::new(30.0, 40.0, 130.0, 90.0);
        assert_eq!(align_to_canvas(extent, CANVAS, AlignDirection::Left), Point::new(0.0, 40.0));
        assert_eq!(align_to_canvas(extent, CANVAS, AlignDirection::Right), Point::new(400.0, 40.0));
        assert_eq!(align_to_canvas(extent, CANVAS, AlignDirection::Bottom), Point::new(30.0, 350.0));
        assert_eq!(
            align_to_canvas(extent, CANVAS, AlignDirection::CenterHorizontal),
            Point::new(200.0, 40.0)
        );
        assert_eq!(
            align_to_canvas(extent, CANVAS, AlignDirection::CenterVertical),
            Point::new(30.0, 175.0)
        );
    }

    #[test]
    fn test_align_to_bounds_right() {
        let extents = [Rect::new(0.0, 0.0, 10.0, 10.0), Rect::new(50.0, 5.0, 100.0, 20.0)];
        let origins = align_to_bounds(&extents, AlignDirection::Right);
        assert_eq!(origins, vec![Point::new(90.0, 0.0), Point::new(50.0, 5.0)]);
        assert!(align_to_bounds(&[], AlignDirection::Right).is_empty());
    }

    #[test]
    fn test_align_objects_left_keeps_tops() {
        let (mut scene, ids) = scene_with(&[(10.0, 1.0), (50.0, 2.0), (30.0, 3.0)]);
        align_objects(&mut scene, &ids, AlignDirection::Left);
        for (id, top) in ids.iter().zip([1.0, 2.0, 3.0]) {
            let object = scene.get(*id).unwrap();
            assert_eq!(object.transform.left, 10.0);
            assert_eq!(object.transform.top, top);
        }
    }

    #[test]
    fn test_locked_member_counts_but_stays() {
        let (mut scene, ids) = scene_with(&[(10.0, 0.0), (50.0, 0.0)]);
        scene.modify(ids[0], |o| o.locked = true);
        // Only the locked member would move to the right edge.
        let moved = align_objects(&mut scene, &ids, AlignDirection::Right);
        assert!(moved.is_empty());
        assert_eq!(scene.get(ids[0]).unwrap().transform.left, 10.0);

        let moved = align_objects(&mut scene, &ids, AlignDirection::Left);
        assert_eq!(moved, vec![ids[1]]);
        assert_eq!(scene.get(ids[1]).unwrap().transform.left, 10.0);
    }

    #[test]
    fn test_align_object_skips_locked() {
        let (mut scene, ids) = scene_with(&[(10.0, 10.0)]);
        assert!(align_object(&mut scene, ids[0], CANVAS, AlignDirection::Top));
        assert_eq!(scene.get(ids[0]).unwrap().transform.top, 0.0);
        assert!(!align_object(&mut scene, ids[0], CANVAS, AlignDirection::Top));

        scene.modify(ids[0], |o| o.locked = true);
        assert!(!align_object(&mut scene, ids[0], CANVAS, AlignDirection::Left));
        assert!(!align_object(&mut scene, ObjectId::nil(), CANVAS, AlignDirection::Left));
    }

    #[test]
    fn test_nested_object_aligns_in_canvas_space() {
        let mut scene = SceneGraph::new();
        let mut a = factory::rect(20.0, 10.0);
        a.set_position(0.0, 0.0);
        let mut b = factory::rect(20.0, 10.0);
        b.set_position(100.0, 0.0);
        let b_id = b.id();
        let mut group = DrawableObject::new(Shape::Group(Group::new(vec![a, b], Size::new(120.0, 10.0))));
        group.set_position(200.0, 200.0);
        scene.add(group).unwrap();

        assert!(align_object(&mut scene, b_id, CANVAS, AlignDirection::Left));
        let bounds = scene.absolute_bounds(b_id).unwrap();
        assert!(bounds.x0.abs() < 1e-9);
        assert!((bounds.y0 - 200.0).abs() < 1e-9);
        assert_eq!(scene.get(b_id).unwrap().transform.left, -200.0);
    }

    #[test]
    fn test_nested_object_in_rotated_group() {
        let mut scene = SceneGraph::new();
        let child = factory::rect(20.0, 10.0);
        let child_id = child.id();
        let mut group = DrawableObject::new(Shape::Group(Group::new(
            vec![child, factory::rect(5.0, 5.0)],
            Size::new(20.0, 10.0),
        )));
        group.set_position(100.0, 100.0);
        group.transform.angle = 90.0;
        scene.add(group).unwrap();

        assert!(align_object(&mut scene, child_id, CANVAS, AlignDirection::Top));
        let bounds = scene.absolute_bounds(child_id).unwrap();
        assert!(bounds.y0.abs() < 1e-9);
        assert!((bounds.x0 - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_mixed_parents_align_to_shared_box() {
        let mut scene = SceneGraph::new();
        let mut loose = factory::rect(20.0, 10.0);
        loose.set_position(40.0, 0.0);
        let loose_id = scene.add(loose).unwrap();
        let nested = factory::rect(20.0, 10.0);
        let nested_id = nested.id();
        let mut group = DrawableObject::new(Shape::Group(Group::new(
            vec![nested, factory::rect(5.0, 5.0)],
            Size::new(20.0, 10.0),
        )));
        group.set_position(10.0, 50.0);
        scene.add(group).unwrap();

        let moved = align_objects(&mut scene, &[loose_id, nested_id], AlignDirection::Left);
        assert_eq!(moved, vec![loose_id]);
        assert_eq!(scene.get(loose_id).unwrap().transform.left, 10.0);
        assert_eq!(scene.absolute_bounds(nested_id).unwrap().x0, 10.0);
    }

    #[test]
    fn test_distribute_even_gaps() {
        let extents = [
            Rect::new(0.0, 0.0, 10.0, 10.0),
            Rect::new(100.0, 0.0, 110.0, 10.0),
            Rect::new(15.0, 0.0, 25.0, 10.0),
        ];
        let origins = distribute(&extents, DistributeAxis::Horizontal);
        assert_eq!(origins[0].x, 0.0);
        assert_eq!(origins[2].x, 50.0);
        assert_eq!(origins[1].x, 100.0);
    }

    #[test]
    fn test_distribute_needs_three() {
        let extents = [Rect::new(0.0, 0.0, 10.0, 10.0), Rect::new(40.0, 7.0, 50.0, 17.0)];
        let origins = distribute(&extents, DistributeAxis::Vertical);
        assert_eq!(origins, vec![Point::new(0.0, 0.0), Point::new(40.0, 7.0)]);
    }
}
