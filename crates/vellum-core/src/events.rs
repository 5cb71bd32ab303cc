//! Event vocabulary shared with the rendering surface, and a typed
//! publish/subscribe bus for listeners inside the editor.

use crate::object::DrawableObject;
use crate::shapes::ObjectId;
use std::fmt;

/// Named events in the canvas event vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    ObjectAdded,
    ObjectRemoved,
    ObjectModified,
    ObjectMoving,
    ObjectScaling,
    ObjectRotating,
    SelectionCreated,
    SelectionUpdated,
    SelectionCleared,
}

impl EventKind {
    pub const ALL: [EventKind; 9] = [
        EventKind::ObjectAdded,
        EventKind::ObjectRemoved,
        EventKind::ObjectModified,
        EventKind::ObjectMoving,
        EventKind::ObjectScaling,
        EventKind::ObjectRotating,
        EventKind::SelectionCreated,
        EventKind::SelectionUpdated,
        EventKind::SelectionCleared,
    ];

    /// Wire name, e.g. `object:modified`.
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::ObjectAdded => "object:added",
            EventKind::ObjectRemoved => "object:removed",
            EventKind::ObjectModified => "object:modified",
            EventKind::ObjectMoving => "object:moving",
            EventKind::ObjectScaling => "object:scaling",
            EventKind::ObjectRotating => "object:rotating",
            EventKind::SelectionCreated => "selection:created",
            EventKind::SelectionUpdated => "selection:updated",
            EventKind::SelectionCleared => "selection:cleared",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Interaction events reported by the rendering surface.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    /// The surface created an object (e.g. a finished draw gesture).
    ObjectAdded(DrawableObject),
    ObjectRemoved(ObjectId),
    /// A transform gesture ended; also marks the end of a drag.
    ObjectModified(ObjectId),
    /// Pointer move while dragging; position in the parent's space.
    ObjectMoving { id: ObjectId, left: f64, top: f64 },
    ObjectScaling {
        id: ObjectId,
        left: f64,
        top: f64,
        scale_x: f64,
        scale_y: f64,
    },
    ObjectRotating {
        id: ObjectId,
        left: f64,
        top: f64,
        angle: f64,
    },
    SelectionCreated(Vec<ObjectId>),
    SelectionUpdated(Vec<ObjectId>),
    SelectionCleared,
    /// Pointer released or drag focus lost.
    PointerUp,
}

impl SurfaceEvent {
    /// The vocabulary entry for this event, `None` for raw pointer input.
    pub fn kind(&self) -> Option<EventKind> {
        Some(match self {
            SurfaceEvent::ObjectAdded(_) => EventKind::ObjectAdded,
            SurfaceEvent::ObjectRemoved(_) => EventKind::ObjectRemoved,
            SurfaceEvent::ObjectModified(_) => EventKind::ObjectModified,
            SurfaceEvent::ObjectMoving { .. } => EventKind::ObjectMoving,
            SurfaceEvent::ObjectScaling { .. } => EventKind::ObjectScaling,
            SurfaceEvent::ObjectRotating { .. } => EventKind::ObjectRotating,
            SurfaceEvent::SelectionCreated(_) => EventKind::SelectionCreated,
            SurfaceEvent::SelectionUpdated(_) => EventKind::SelectionUpdated,
            SurfaceEvent::SelectionCleared => EventKind::SelectionCleared,
            SurfaceEvent::PointerUp => return None,
        })
    }
}

/// An event published by the canvas after its state changed.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasEvent {
    pub kind: EventKind,
    /// Affected objects.
    pub ids: Vec<ObjectId>,
}

impl CanvasEvent {
    pub fn new(kind: EventKind, ids: Vec<ObjectId>) -> Self {
        Self { kind, ids }
    }

    pub fn single(kind: EventKind, id: ObjectId) -> Self {
        Self::new(kind, vec![id])
    }
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sub({})", self.0)
    }
}

/// Which events a subscriber receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventFilter {
    #[default]
    All,
    Kind(EventKind),
}

impl EventFilter {
    pub fn matches(&self, event: &CanvasEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Kind(kind) => *kind == event.kind,
        }
    }
}

impl From<EventKind> for EventFilter {
    fn from(kind: EventKind) -> Self {
        EventFilter::Kind(kind)
    }
}

type EventHandler = Box<dyn FnMut(&CanvasEvent)>;

/// Synchronous publish/subscribe dispatcher, called on the event loop.
///
/// Handlers run in subscription order.
#[derive(Default)]
pub struct EventBus {
    handlers: Vec<(SubscriptionId, EventFilter, EventHandler)>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for events matching `filter`.
    pub fn subscribe<F>(&mut self, filter: impl Into<EventFilter>, handler: F) -> SubscriptionId
    where
        F: FnMut(&CanvasEvent) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, filter.into(), Box::new(handler)));
        log::debug!("Subscription {} added", id);
        id
    }

    /// Returns true if the subscription was found and removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(sub, _, _)| *sub != id);
        let removed = self.handlers.len() != before;
        if removed {
            log::debug!("Subscription {} removed", id);
        }
        removed
    }

    /// Deliver an event to every matching handler. Returns how many ran.
    pub fn publish(&mut self, event: &CanvasEvent) -> usize {
        let mut delivered = 0;
        for (_, filter, handler) in self.handlers.iter_mut() {
            if filter.matches(event) {
                handler(event);
                delivered += 1;
            }
        }
        log::trace!("Published {} to {} handlers", event.kind, delivered);
        delivered
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.len()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.handlers.len())
            .finish()
    }
}
