//! Vector math re-exported from [`glam`].
//!
//! Geometry queries hand out [`Vec2`] for positions and offsets.
//!
//! [`glam`]: https://docs.rs/glam

pub use glam::{Vec2, vec2};
