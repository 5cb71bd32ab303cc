//! Outbound contract with the rendering surface.
//!
//! The surface paints objects and reports interaction events; the canvas
//! tells it what changed through the [`Surface`] trait.

use crate::events::{CanvasEvent, EventKind};
use crate::object::DrawableObject;
use crate::selection::Selection;
use crate::shapes::ObjectId;
use crate::snap::{GuideAnchor, Guideline};

/// Calls the canvas makes into the rendering surface.
///
/// Implementations can wrap a retained-mode canvas library, a GPU scene
/// builder, or nothing at all.
pub trait Surface {
    /// A new top-level object appeared in the scene. It goes on top; when it
    /// belongs lower a `move_to` with its final index follows.
    fn add(&mut self, object: &DrawableObject);

    /// An object left the scene. Removals inside a group are also followed
    /// by an `update` of the group.
    fn remove(&mut self, id: ObjectId);

    /// An object's properties changed and should be re-read.
    fn update(&mut self, object: &DrawableObject);

    /// An object moved to a new index in its sibling list.
    fn move_to(&mut self, id: ObjectId, z_index: usize);

    fn add_guideline(&mut self, guideline: &Guideline);

    fn remove_guideline(&mut self, anchor: GuideAnchor);

    /// Make the surface's active object match the selection.
    fn set_active_object(&mut self, selection: &Selection);

    /// Paint once. Called at most once per animation frame.
    fn request_render(&mut self);

    /// Re-emit an event the surface would not detect on its own.
    fn fire(&mut self, event: &CanvasEvent);
}

/// A surface that ignores every call (headless sessions).
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSurface;

impl Surface for NullSurface {
    fn add(&mut self, _object: &DrawableObject) {}
    fn remove(&mut self, _id: ObjectId) {}
    fn update(&mut self, _object: &DrawableObject) {}
    fn move_to(&mut self, _id: ObjectId, _z_index: usize) {}
    fn add_guideline(&mut self, _guideline: &Guideline) {}
    fn remove_guideline(&mut self, _anchor: GuideAnchor) {}
    fn set_active_object(&mut self, _selection: &Selection) {}
    fn request_render(&mut self) {}
    fn fire(&mut self, _event: &CanvasEvent) {}
}

/// One recorded call on a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCall {
    Add(ObjectId),
    Remove(ObjectId),
    Update(ObjectId),
    MoveTo(ObjectId, usize),
    AddGuideline(GuideAnchor),
    RemoveGuideline(GuideAnchor),
    SetActiveObject(Vec<ObjectId>),
    RequestRender,
    Fire(EventKind, Vec<ObjectId>),
}

/// A surface that records every call in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    calls: Vec<SurfaceCall>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[SurfaceCall] {
        &self.calls
    }

    /// Return and forget the calls recorded so far.
    pub fn take_calls(&mut self) -> Vec<SurfaceCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn render_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, SurfaceCall::RequestRender))
            .count()
    }

    /// Events fired through [`Surface::fire`], in order.
    pub fn fired(&self) -> Vec<EventKind> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                SurfaceCall::Fire(kind, _) => Some(*kind),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn add(&mut self, object: &DrawableObject) {
        self.calls.push(SurfaceCall::Add(object.id()));
    }

    fn remove(&mut self, id: ObjectId) {
        self.calls.push(SurfaceCall::Remove(id));
    }

    fn update(&mut self, object: &DrawableObject) {
        self.calls.push(SurfaceCall::Update(object.id()));
    }

    fn move_to(&mut self, id: ObjectId, z_index: usize) {
        self.calls.push(SurfaceCall::MoveTo(id, z_index));
    }

    fn add_guideline(&mut self, guideline: &Guideline) {
        self.calls.push(SurfaceCall::AddGuideline(guideline.anchor));
    }

    fn remove_guideline(&mut self, anchor: GuideAnchor) {
        self.calls.push(SurfaceCall::RemoveGuideline(anchor));
    }

    fn set_active_object(&mut self, selection: &Selection) {
        self.calls.push(SurfaceCall::SetActiveObject(selection.ids().to_vec()));
    }

    fn request_render(&mut self) {
        self.calls.push(SurfaceCall::RequestRender);
    }

    fn fire(&mut self, event: &CanvasEvent) {
        self.calls.push(SurfaceCall::Fire(event.kind, event.ids.clone()));
    }
}

/// Coalesces render requests into at most one paint per animation frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderScheduler {
    pending: bool,
    requests: u64,
}

impl RenderScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the scene as needing a paint.
    pub fn request(&mut self) {
        self.pending = true;
        self.requests += 1;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Consume the pending request. Returns `true` if a paint is due.
    pub fn take(&mut self) -> bool {
        if self.pending {
            log::trace!("Coalesced {} render requests into one frame", self.requests);
        }
        self.requests = 0;
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory;

    #[test]
    fn test_scheduler_coalesces() {
        let mut scheduler = RenderScheduler::new();
        assert!(!scheduler.take());
        scheduler.request();
        scheduler.request();
        scheduler.request();
        assert!(scheduler.is_pending());
        assert!(scheduler.take());
        assert!(!scheduler.take());
    }

    #[test]
    fn test_recording_surface() {
        let mut surface = RecordingSurface::new();
        let object = factory::rect(1.0, 1.0);
        surface.add(&object);
        surface.request_render();
        surface.fire(&CanvasEvent::single(EventKind::ObjectModified, object.id()));

        assert_eq!(surface.render_count(), 1);
        assert_eq!(surface.fired(), vec![EventKind::ObjectModified]);
        assert_eq!(surface.take_calls()[0], SurfaceCall::Add(object.id()));
        assert!(surface.calls().is_empty());
    }
}
