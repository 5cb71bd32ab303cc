//! Vellum Core Library
//!
//! Scene graph and editing state for the Vellum vector design canvas:
//! object hierarchy and stacking order, selection, drag snapping and
//! alignment, grouping, and the event contract with the rendering surface.

pub mod align;
pub mod canvas;
pub mod config;
pub mod events;
pub mod factory;
pub mod geometry;
pub mod grouping;
pub mod object;
pub mod patch;
pub mod scene;
pub mod selection;
pub mod shapes;
pub mod snap;
pub mod surface;
pub mod zorder;

pub use align::{AlignDirection, DistributeAxis};
pub use canvas::{Canvas, Command};
pub use config::{CanvasConfig, ConfigError};
pub use events::{CanvasEvent, EventBus, EventFilter, EventKind, SubscriptionId, SurfaceEvent};
pub use factory::ShapeFactory;
pub use grouping::GroupingController;
pub use object::{DrawableObject, Transform};
pub use patch::ObjectPatch;
pub use scene::{LayerItem, SceneChange, SceneError, SceneGraph};
pub use selection::{PropertySnapshot, Selection, SelectionManager};
pub use shapes::{ObjectId, Shape, ShapeKind, ShapeStyle};
pub use snap::{GuideAnchor, Guideline, SnapEngine, SnapResult, SNAP_THRESHOLD};
pub use surface::{NullSurface, RecordingSurface, RenderScheduler, Surface, SurfaceCall};
pub use zorder::StackDirection;
