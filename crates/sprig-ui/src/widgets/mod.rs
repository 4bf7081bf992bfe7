//! Ready-made widgets.

pub mod counter;

pub use counter::{Counter, SimpleCounter};
