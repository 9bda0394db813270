//! Data models for vclick.

mod annotation;
mod point;

pub use annotation::{AnnotationError, AnnotationStore, RemovedPoint};
pub use point::{PixelPoint, RealPoint};
