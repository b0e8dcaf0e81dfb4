//! Math glue: scalar helpers and the transform builder.
//!
//! Vector and matrix types come from glam.

pub mod transform;
pub mod utils;
