//! Small helpers shared across layers.

pub mod clock;
pub mod pagination;
pub mod validate;
