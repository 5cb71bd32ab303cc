//! Editor session state and event handling.
//!
//! [`Canvas`] owns the scene graph and every controller working on it. It is
//! created once per editing session. Interaction events from the rendering
//! surface and user commands both go through it, and each entry point ends by
//! flushing the scene's recorded changes out to the surface and subscribers.

use crate::align::{self, AlignDirection, DistributeAxis};
use crate::config::CanvasConfig;
use crate::events::{CanvasEvent, EventBus, EventFilter, EventKind, SubscriptionId, SurfaceEvent};
use crate::factory::ShapeFactory;
use crate::geometry::normalize_angle;
use crate::grouping::{self, GroupingController};
use crate::object::DrawableObject;
use crate::patch::ObjectPatch;
use crate::scene::{SceneChange, SceneError, SceneGraph};
use crate::selection::{PropertySnapshot, Selection, SelectionManager};
use crate::shapes::{ObjectId, ShapeKind};
use crate::snap::{GuideAnchor, SnapEngine};
use crate::surface::{NullSurface, RenderScheduler, Surface};
use crate::zorder::{self, StackDirection};

/// User commands from toolbars, menus and hotkeys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    GroupSelected,
    UngroupSelected,
    CloneSelected,
    RemoveSelected,
    BringToFront,
    SendToBack,
    MoveUp,
    MoveDown,
    SelectAll,
    DeselectAll,
    Align(AlignDirection),
    Distribute(DistributeAxis),
}

/// The editing session: scene, selection, snapping and the surface link.
#[derive(Debug)]
pub struct Canvas<S: Surface = NullSurface> {
    scene: SceneGraph,
    selection: SelectionManager,
    snap: SnapEngine,
    grouping: GroupingController,
    factory: ShapeFactory,
    config: CanvasConfig,
    bus: EventBus,
    scheduler: RenderScheduler,
    surface: S,
}

impl Default for Canvas<NullSurface> {
    fn default() -> Self {
        Self::new(CanvasConfig::default())
    }
}

impl Canvas<NullSurface> {
    /// A headless session.
    pub fn new(config: CanvasConfig) -> Self {
        Self::with_surface(config, NullSurface)
    }
}

impl<S: Surface> Canvas<S> {
    pub fn with_surface(config: CanvasConfig, surface: S) -> Self {
        Self {
            scene: SceneGraph::new(),
            selection: SelectionManager::new(),
            snap: SnapEngine::new(config.snap_threshold),
            grouping: GroupingController::new(),
            factory: ShapeFactory::new(),
            config,
            bus: EventBus::new(),
            scheduler: RenderScheduler::new(),
            surface,
        }
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn selection(&self) -> &Selection {
        self.selection.selection()
    }

    /// Displayed values for the active selection.
    pub fn snapshot(&self) -> Option<&PropertySnapshot> {
        self.selection.snapshot()
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn factory_mut(&mut self) -> &mut ShapeFactory {
        &mut self.factory
    }

    /// Anchors of the guidelines currently shown.
    pub fn guidelines(&self) -> &[GuideAnchor] {
        self.snap.active()
    }

    pub fn subscribe<F>(&mut self, filter: impl Into<EventFilter>, handler: F) -> SubscriptionId
    where
        F: FnMut(&CanvasEvent) + 'static,
    {
        self.bus.subscribe(filter, handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    /// Paint if anything changed since the last frame. Returns `true` if a
    /// render was requested from the surface.
    pub fn on_animation_frame(&mut self) -> bool {
        let due = self.scheduler.take();
        if due {
            self.surface.request_render();
        }
        due
    }

    pub fn render_pending(&self) -> bool {
        self.scheduler.is_pending()
    }

    // Scene edits

    /// Add an object on top of the stacking order.
    pub fn add_object(&mut self, object: DrawableObject) -> Result<ObjectId, SceneError> {
        let id = self.scene.add(object)?;
        self.flush(None);
        Ok(id)
    }

    /// Create an object of `kind` with the factory defaults and add it.
    pub fn create(&mut self, kind: ShapeKind) -> Option<ObjectId> {
        let object = self.factory.create(kind)?;
        self.add_object(object).ok()
    }

    pub fn remove_object(&mut self, id: ObjectId) -> Option<DrawableObject> {
        let removed = self.scene.remove(id);
        self.flush(None);
        removed
    }

    pub fn reorder(&mut self, id: ObjectId, to_index: usize) -> bool {
        let moved = self.scene.reorder(id, to_index);
        self.flush(None);
        moved
    }

    /// Apply a property patch to the active selection.
    ///
    /// Placement fields apply to each selected object and skip locked ones.
    /// Paint and text fields also cascade into a selected group's children.
    /// Returns the ids written to.
    pub fn apply_patch(&mut self, patch: &ObjectPatch) -> Vec<ObjectId> {
        let mut touched = Vec::new();
        for id in self.selection.selection().ids().to_vec() {
            let geometry = self
                .scene
                .get(id)
                .is_some_and(|o| !o.is_locked() || patch.name.is_some());
            if geometry && self.scene.modify(id, |o| patch.apply_geometry(o)) == Some(true) {
                touched.push(id);
            }
            if patch.changes_style() {
                let mut targets = vec![id];
                targets.extend(self.scene.get(id).map(|o| o.descendant_ids()).unwrap_or_default());
                for target in targets {
                    if self.scene.modify(target, |o| patch.apply_style(o)) == Some(true)
                        && !touched.contains(&target)
                    {
                        touched.push(target);
                    }
                }
            }
        }
        self.fire_modified(&touched);
        self.flush(None);
        touched
    }

    /// Show or hide an object. Hidden objects keep their stored opacity.
    pub fn toggle_visibility(&mut self, id: ObjectId) -> bool {
        if self.scene.modify(id, |o| o.toggle_visibility()).is_none() {
            return false;
        }
        self.fire_modified(&[id]);
        self.flush(None);
        true
    }

    pub fn set_locked(&mut self, id: ObjectId, locked: bool) -> bool {
        let changed = self.scene.get(id).is_some_and(|o| o.locked != locked);
        if !changed {
            return false;
        }
        self.scene.modify(id, |o| o.locked = locked);
        self.fire_modified(&[id]);
        self.flush(None);
        true
    }

    /// Fold an object's scale into its size and reset its stroke width.
    pub fn bake_scale(&mut self, id: ObjectId) -> bool {
        let unlocked = self.scene.get(id).is_some_and(|o| !o.is_locked());
        let baked = unlocked && self.scene.modify(id, |o| o.bake_scale()) == Some(true);
        if baked {
            self.fire_modified(&[id]);
        }
        self.flush(None);
        baked
    }

    pub fn resize_canvas(&mut self, width: f64, height: f64) {
        self.config.resize(width, height);
        self.scheduler.request();
    }

    pub fn reset_canvas(&mut self) {
        self.config.reset();
        self.scheduler.request();
    }

    /// Serialize the scene.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        self.scene.to_json()
    }

    /// Replace the scene with a persisted one. The selection is cleared.
    pub fn load_json(&mut self, json: &str) -> Result<(), serde_json::Error> {
        let scene = SceneGraph::from_json(json)?;
        for object in self.scene.roots() {
            self.surface.remove(object.id());
        }
        self.scene = scene;
        for object in self.scene.roots() {
            self.surface.add(object);
        }
        self.clear_guidelines();
        self.set_selection(Vec::new());
        self.scheduler.request();
        Ok(())
    }

    // Commands

    /// Run a user command. Commands on an empty or unsuitable selection are
    /// silent no-ops. Returns `true` if anything changed.
    pub fn execute(&mut self, command: Command) -> bool {
        log::debug!("Executing {:?}", command);
        let ids = self.selection.selection().ids().to_vec();
        let changed = match command {
            Command::GroupSelected => {
                let selection = self.selection.selection().clone();
                match self.grouping.group(&mut self.scene, &selection) {
                    Some(group_id) => {
                        self.flush(None);
                        self.set_selection(vec![group_id]);
                        true
                    }
                    None => false,
                }
            }
            Command::UngroupSelected => {
                let Some(id) = self.selection.selection().single() else {
                    return false;
                };
                match self.grouping.ungroup(&mut self.scene, id) {
                    Some(children) => {
                        self.flush(None);
                        self.set_selection(children.ids().to_vec());
                        true
                    }
                    None => false,
                }
            }
            Command::CloneSelected => {
                let copies = grouping::duplicate(&mut self.scene, &ids);
                self.flush(None);
                let changed = !copies.is_empty();
                if changed {
                    self.set_selection(copies);
                }
                changed
            }
            Command::RemoveSelected => {
                let mut removed = false;
                for id in &ids {
                    removed |= self.scene.remove(*id).is_some();
                }
                removed
            }
            Command::BringToFront => {
                let moved = zorder::bring_all_to_front(&mut self.scene, &ids);
                self.restack(moved)
            }
            Command::SendToBack => {
                let moved = zorder::send_all_to_back(&mut self.scene, &ids);
                self.restack(moved)
            }
            Command::MoveUp => {
                let moved = zorder::move_by(&mut self.scene, &ids, StackDirection::Up);
                self.restack(moved)
            }
            Command::MoveDown => {
                let moved = zorder::move_by(&mut self.scene, &ids, StackDirection::Down);
                self.restack(moved)
            }
            Command::SelectAll => {
                let all: Vec<ObjectId> = self.scene.roots().iter().map(|o| o.id()).collect();
                self.set_selection(all)
            }
            Command::DeselectAll => self.set_selection(Vec::new()),
            Command::Align(direction) => {
                let moved = match self.selection.selection() {
                    Selection::Empty => Vec::new(),
                    Selection::Single(id) => {
                        let id = *id;
                        if align::align_object(&mut self.scene, id, self.config.size(), direction) {
                            vec![id]
                        } else {
                            Vec::new()
                        }
                    }
                    Selection::Composite(_) => align::align_objects(&mut self.scene, &ids, direction),
                };
                self.fire_modified(&moved);
                !moved.is_empty()
            }
            Command::Distribute(axis) => {
                let moved = align::distribute_objects(&mut self.scene, &ids, axis);
                self.fire_modified(&moved);
                !moved.is_empty()
            }
        };
        self.flush(None);
        changed
    }

    fn restack(&mut self, moved: Vec<ObjectId>) -> bool {
        self.fire_modified(&moved);
        !moved.is_empty()
    }

    // Surface events

    /// Process one interaction event from the rendering surface.
    pub fn handle(&mut self, event: SurfaceEvent) {
        match event {
            SurfaceEvent::ObjectAdded(object) => {
                let id = object.id();
                match self.scene.add(object) {
                    Ok(id) => self.flush(Some(id)),
                    Err(error) => log::warn!("Rejected object {} from surface: {}", id, error),
                }
            }
            SurfaceEvent::ObjectRemoved(id) => {
                self.scene.remove(id);
                self.flush(Some(id));
            }
            SurfaceEvent::ObjectModified(id) => {
                self.clear_guidelines();
                self.selection.resync(&self.scene);
                if self.scene.contains(id) {
                    self.bus.publish(&CanvasEvent::single(EventKind::ObjectModified, id));
                }
                self.scheduler.request();
            }
            SurfaceEvent::ObjectMoving { id, left, top } => self.on_moving(id, left, top),
            SurfaceEvent::ObjectScaling {
                id,
                left,
                top,
                scale_x,
                scale_y,
            } => self.on_transforming(id, EventKind::ObjectScaling, |o| {
                o.set_position(left, top);
                o.transform.scale_x = scale_x;
                o.transform.scale_y = scale_y;
            }),
            SurfaceEvent::ObjectRotating { id, left, top, angle } => {
                self.on_transforming(id, EventKind::ObjectRotating, |o| {
                    o.set_position(left, top);
                    o.transform.angle = normalize_angle(angle);
                })
            }
            SurfaceEvent::SelectionCreated(ids) | SurfaceEvent::SelectionUpdated(ids) => {
                if self.selection.select(ids, &self.scene) {
                    self.publish_selection();
                }
            }
            SurfaceEvent::SelectionCleared => {
                if self.selection.clear() {
                    self.bus.publish(&CanvasEvent::new(EventKind::SelectionCleared, Vec::new()));
                }
            }
            SurfaceEvent::PointerUp => self.clear_guidelines(),
        }
    }

    fn on_moving(&mut self, id: ObjectId, left: f64, top: f64) {
        let Some(object) = self.scene.get(id) else {
            return;
        };
        if object.is_locked() {
            // Put the surface's copy back where the scene has it.
            self.surface.update(object);
            return;
        }
        let mut moved = object.clone();
        moved.set_position(left, top);

        let (left, top, snapped) = if self.scene.parent_of(id).is_none() {
            let (result, diff) = self.snap.evaluate(moved.extent(), self.config.size());
            for anchor in diff.removed {
                self.surface.remove_guideline(anchor);
            }
            for guideline in &diff.added {
                self.surface.add_guideline(guideline);
            }
            (result.left, result.top, result.is_snapped())
        } else {
            (left, top, false)
        };

        self.apply_live(id, EventKind::ObjectMoving, snapped, |o| o.set_position(left, top));
    }

    fn on_transforming(&mut self, id: ObjectId, kind: EventKind, apply: impl FnOnce(&mut DrawableObject)) {
        let Some(object) = self.scene.get(id) else {
            return;
        };
        if object.is_locked() {
            self.surface.update(object);
            return;
        }
        self.apply_live(id, kind, false, apply);
    }

    /// Mirror an in-progress transform from the surface. `object:modified`
    /// is left to the surface at the end of the gesture.
    fn apply_live(
        &mut self,
        id: ObjectId,
        kind: EventKind,
        push_back: bool,
        apply: impl FnOnce(&mut DrawableObject),
    ) {
        self.scene.modify(id, apply);
        self.scene.take_changes();
        if push_back {
            if let Some(object) = self.scene.get(id) {
                self.surface.update(object);
            }
        }
        self.selection.resync(&self.scene);
        self.scheduler.request();
        self.bus.publish(&CanvasEvent::single(kind, id));
    }

    fn clear_guidelines(&mut self) {
        let cleared = self.snap.clear();
        if !cleared.is_empty() {
            for anchor in cleared {
                self.surface.remove_guideline(anchor);
            }
            self.scheduler.request();
        }
    }

    // Plumbing

    /// Replace the selection, mirror it on the surface and publish it.
    fn set_selection(&mut self, ids: Vec<ObjectId>) -> bool {
        let changed = if ids.is_empty() {
            self.selection.clear()
        } else {
            self.selection.select(ids, &self.scene)
        };
        if changed {
            self.surface.set_active_object(self.selection.selection());
            self.publish_selection();
        }
        changed
    }

    fn publish_selection(&mut self) {
        let selection = self.selection.selection();
        let kind = if selection.is_empty() {
            EventKind::SelectionCleared
        } else {
            EventKind::SelectionUpdated
        };
        let event = CanvasEvent::new(kind, selection.ids().to_vec());
        self.bus.publish(&event);
    }

    /// Re-emit `object:modified` on the surface for changes it cannot see.
    fn fire_modified(&mut self, ids: &[ObjectId]) {
        if !ids.is_empty() {
            self.surface
                .fire(&CanvasEvent::new(EventKind::ObjectModified, ids.to_vec()));
        }
    }

    /// Push the scene's recorded changes to the surface and subscribers,
    /// prune the selection, and schedule one render.
    ///
    /// `echo` names an object whose add/remove came from the surface itself
    /// and must not be sent back.
    fn flush(&mut self, echo: Option<ObjectId>) {
        let changes = self.scene.take_changes();
        if changes.is_empty() {
            return;
        }

        let mut updated: Vec<ObjectId> = Vec::new();
        let mut events: Vec<CanvasEvent> = Vec::new();
        for change in &changes {
            match *change {
                SceneChange::Added(id) => {
                    match self.scene.parent_of(id) {
                        None if echo != Some(id) => {
                            if let Some(object) = self.scene.get(id) {
                                self.surface.add(object);
                                // Group and ungroup insert below the top.
                                if object.z_index() + 1 < self.scene.len() {
                                    self.surface.move_to(id, object.z_index());
                                }
                            }
                        }
                        None => {}
                        Some(_) => push_unique(&mut updated, self.scene.root_of(id)),
                    }
                    events.push(CanvasEvent::single(EventKind::ObjectAdded, id));
                }
                SceneChange::Removed(id) => {
                    if echo != Some(id) {
                        self.surface.remove(id);
                    }
                    events.push(CanvasEvent::single(EventKind::ObjectRemoved, id));
                }
                SceneChange::Modified(id) => {
                    push_unique(&mut updated, self.scene.root_of(id));
                    if !events.iter().any(|e| e.kind == EventKind::ObjectModified && e.ids == [id]) {
                        events.push(CanvasEvent::single(EventKind::ObjectModified, id));
                    }
                }
                SceneChange::Reordered(id) => {
                    match (self.scene.parent_of(id), self.scene.z_index(id)) {
                        (None, Some(z_index)) => self.surface.move_to(id, z_index),
                        _ => push_unique(&mut updated, self.scene.root_of(id)),
                    }
                    events.push(CanvasEvent::single(EventKind::ObjectModified, id));
                }
            }
        }

        // Objects added this flush were sent whole; skip redundant updates.
        for id in updated {
            let added = changes.contains(&SceneChange::Added(id));
            if let Some(object) = self.scene.get(id).filter(|_| !added) {
                self.surface.update(object);
            }
        }
        for event in &events {
            self.bus.publish(event);
        }

        if self.selection.prune(&self.scene) {
            self.surface.set_active_object(self.selection.selection());
            self.publish_selection();
        }
        self.scheduler.request();
    }
}

fn push_unique(ids: &mut Vec<ObjectId>, id: Option<ObjectId>) {
    if let Some(id) = id {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
}
