//! Event targets and surface roots
//!
//! The timing logger never walks a render tree. All it needs is the surface
//! an event target lives on, and whether a committed root belongs to that
//! same surface.

use std::collections::HashSet;
use std::sync::Arc;

use crate::SurfaceId;

/// The UI element an event was dispatched to
pub trait EventTarget: Send + Sync {
    fn surface_id(&self) -> SurfaceId;
}

/// Shared, possibly absent event target
pub type SharedEventTarget = Option<Arc<dyn EventTarget>>;

/// Root of a render tree that has been committed to a surface
pub trait SurfaceRoot: Send + Sync {
    fn surface_id(&self) -> SurfaceId;

    /// Does the target belong to the tree under this root?
    fn contains(&self, target: &dyn EventTarget) -> bool {
        target.surface_id() == self.surface_id()
    }
}

/// Surface-id equality between a possibly absent target and a root
#[inline]
pub fn is_target_in_root(target: Option<&dyn EventTarget>, root: &dyn SurfaceRoot) -> bool {
    target.is_some_and(|t| root.contains(t))
}

/// Does the target's surface have a rendering update in flight?
#[inline]
pub fn has_pending_rendering_updates(
    target: Option<&dyn EventTarget>,
    surfaces_with_pending_updates: &HashSet<SurfaceId>,
) -> bool {
    target.is_some_and(|t| surfaces_with_pending_updates.contains(&t.surface_id()))
}

/// Minimal target that only knows its surface
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceTarget(pub SurfaceId);

impl EventTarget for SurfaceTarget {
    fn surface_id(&self) -> SurfaceId {
        self.0
    }
}

/// Minimal committed root that only knows its surface
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommittedRoot(pub SurfaceId);

impl SurfaceRoot for CommittedRoot {
    fn surface_id(&self) -> SurfaceId {
        self.0
    }
}
