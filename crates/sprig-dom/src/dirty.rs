//! Dirty tracking for the document.

use bitflags::bitflags;

bitflags! {
    /// What changed since the last layout pass.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DirtyFlags: u8 {
        /// No changes
        const NONE       = 0;

        /// Nodes were inserted, removed, or reordered.
        const CHILDREN   = 1 << 0;

        /// Text content changed; text nodes need re-measuring.
        const TEXT       = 1 << 1;

        /// An inline style changed.
        const STYLE      = 1 << 2;

        /// Viewport or text metrics changed.
        const VIEWPORT   = 1 << 3;

        /// A non-style attribute changed. Never affects layout.
        const ATTRIBUTES = 1 << 4;

        /// Event listeners were added or removed. Never affects layout.
        const LISTENERS  = 1 << 5;
    }
}

impl DirtyFlags {
    /// Flags that invalidate computed geometry.
    pub const LAYOUT_GROUP: Self = Self::CHILDREN
        .union(Self::TEXT)
        .union(Self::STYLE)
        .union(Self::VIEWPORT);

    pub fn needs_layout(&self) -> bool {
        self.intersects(Self::LAYOUT_GROUP)
    }
}
