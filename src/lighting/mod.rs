//! Lighting and colour for the shaded pass.
//!
//! - Ambient plus a single directional light, Lambertian diffuse
//! - Hue ramp used to colour bacterial species

pub mod directional;
pub mod palette;

pub use directional::DirectionalLight;
pub use palette::SpeciesPalette;
