//! Identity types for event timing
//!
//! Tags are 64-bit and allocated monotonically by the logger that owns them.
//! Surface and interaction ids are assigned by the host.

use std::fmt;

/// Event tag - correlates every lifecycle call for one tracked event
///
/// `EventTag::EMPTY` means "not tracked". Real tags start at 1.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct EventTag(pub u64);

impl EventTag {
    pub const EMPTY: EventTag = EventTag(0);

    #[inline]
    pub fn new(id: u64) -> Self {
        EventTag(id)
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EventTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "Tag(empty)")
        } else {
            write!(f, "Tag({})", self.0)
        }
    }
}

impl fmt::Display for EventTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Surface identity - an independently rendered UI root
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SurfaceId(pub i32);

impl SurfaceId {
    #[inline]
    pub fn new(id: i32) -> Self {
        SurfaceId(id)
    }
}

impl fmt::Debug for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Surface({})", self.0)
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Interaction identity - groups events belonging to one user interaction
///
/// Zero means no interaction was attached.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct InteractionId(pub u32);

impl InteractionId {
    pub const NONE: InteractionId = InteractionId(0);

    #[inline]
    pub fn new(id: u32) -> Self {
        InteractionId(id)
    }

    #[inline]
    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for InteractionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            write!(f, "Interaction(none)")
        } else {
            write!(f, "Interaction({})", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_tag() {
        assert!(EventTag::EMPTY.is_empty());
        assert!(EventTag::default().is_empty());
        assert!(!EventTag::new(1).is_empty());
    }

    #[test]
    fn test_tag_ordering() {
        assert!(EventTag::new(2) > EventTag::new(1));
        assert!(EventTag::new(1) > EventTag::EMPTY);
    }

    #[test]
    fn test_debug_format() {
        assert_eq!(format!("{:?}", EventTag::EMPTY), "Tag(empty)");
        assert_eq!(format!("{:?}", EventTag::new(7)), "Tag(7)");
        assert_eq!(format!("{:?}", SurfaceId::new(3)), "Surface(3)");
        assert_eq!(format!("{:?}", InteractionId::NONE), "Interaction(none)");
    }
}
