//! Geometry and color normalization.
//!
//! Geometry is expressed as fractions of the slide size after mapping group
//! children through their enclosing group coordinate spaces. Colors carry
//! their RGB and CIELAB values, computed once when the value is built.

pub mod color;
pub mod geometry;

pub use color::{ColorSource, ColorSpec, ColorTransform, ColorValue};
pub use geometry::{denormalize, normalize, Bounds, ChildExtents, CoordinateSpace, RawTransform};
