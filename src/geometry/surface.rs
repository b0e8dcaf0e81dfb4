//! Surface parameter block with a lazily regenerated mesh.
//!
//! Every setter that changes a value marks the surface dirty; the mesh is
//! rebuilt in full on the next `mesh()` call and the revision counter is
//! bumped so GPU buffers built from the old arrays can be replaced.

use glam::Vec3;

use super::mesh::{self, Mesh};
use crate::error::{Error, Result};
use crate::math::utils::TWO_PI;

/// Per-axis divisors turning the unit sphere into an ellipsoid.
///
/// `a` divides z, `b` divides x, `c` divides y.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Denominators {
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

impl Denominators {
    pub const UNIT: Self = Self { a: 1.0, b: 1.0, c: 1.0 };

    /// Build denominators, rejecting zero, negative and non-finite values.
    pub fn new(a: f32, b: f32, c: f32) -> Result<Self> {
        for (name, value) in [("a", a), ("b", b), ("c", c)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::InvalidSurface { name, value });
            }
        }
        Ok(Self { a, b, c })
    }
}

impl Default for Denominators {
    fn default() -> Self {
        Self::UNIT
    }
}

/// Angular extent actually tessellated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AngleSpans {
    /// Azimuth, in [0, 2π]
    pub horizontal: f32,
    /// Polar angle from the upper pole, in [0, π]
    pub vertical: f32,
}

impl AngleSpans {
    pub const FULL: Self = Self { horizontal: TWO_PI, vertical: std::f32::consts::PI };
}

impl Default for AngleSpans {
    fn default() -> Self {
        Self::FULL
    }
}

/// Tessellation resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segments {
    pub horizontal: u32,
    pub vertical: u32,
}

impl Default for Segments {
    fn default() -> Self {
        Self { horizontal: 60, vertical: 60 }
    }
}

/// Everything the generator needs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceParams {
    pub radius: f32,
    pub denominators: Denominators,
    pub angle_spans: AngleSpans,
    pub segments: Segments,
}

impl Default for SurfaceParams {
    fn default() -> Self {
        Self {
            radius: 1.0,
            denominators: Denominators::UNIT,
            angle_spans: AngleSpans::FULL,
            segments: Segments::default(),
        }
    }
}

/// A parametric surface that owns its mesh.
#[derive(Clone, Debug)]
pub struct Surface {
    params: SurfaceParams,
    origin: Vec3,
    mesh: Mesh,
    dirty: bool,
    revision: u64,
}

impl Surface {
    pub fn new(params: SurfaceParams, origin: Vec3) -> Self {
        Self {
            params,
            origin,
            mesh: Mesh::default(),
            dirty: true,
            revision: 0,
        }
    }

    pub fn params(&self) -> &SurfaceParams {
        &self.params
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn radius(&self) -> f32 {
        self.params.radius
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Bumped every time the mesh is rebuilt.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn set_radius(&mut self, radius: f32) -> Result<()> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(Error::InvalidSurface { name: "radius", value: radius });
        }
        self.update(|p| p.radius = radius);
        Ok(())
    }

    pub fn set_denominators(&mut self, a: f32, b: f32, c: f32) -> Result<()> {
        let denominators = Denominators::new(a, b, c)?;
        self.update(|p| p.denominators = denominators);
        Ok(())
    }

    /// Spans are clamped into [0, 2π] and [0, π].
    pub fn set_angle_spans(&mut self, horizontal: f32, vertical: f32) {
        let spans = AngleSpans {
            horizontal: horizontal.clamp(0.0, TWO_PI),
            vertical: vertical.clamp(0.0, std::f32::consts::PI),
        };
        self.update(|p| p.angle_spans = spans);
    }

    /// Segment counts below one are raised to one.
    pub fn set_segments(&mut self, horizontal: u32, vertical: u32) {
        let segments = Segments {
            horizontal: horizontal.max(1),
            vertical: vertical.max(1),
        };
        self.update(|p| p.segments = segments);
    }

    pub fn set_origin(&mut self, origin: Vec3) {
        if self.origin != origin {
            self.origin = origin;
            self.dirty = true;
        }
    }

    /// The current mesh, regenerated first if any parameter changed.
    pub fn mesh(&mut self) -> &Mesh {
        self.refresh();
        &self.mesh
    }

    /// Like `mesh`, paired with the revision it belongs to.
    pub fn mesh_with_revision(&mut self) -> (&Mesh, u64) {
        self.refresh();
        (&self.mesh, self.revision)
    }

    fn refresh(&mut self) {
        if self.dirty {
            self.mesh = mesh::generate(&self.params, self.origin);
            self.dirty = false;
            self.revision += 1;
        }
    }

    fn update(&mut self, f: impl FnOnce(&mut SurfaceParams)) {
        let before = self.params;
        f(&mut self.params);
        if self.params != before {
            self.dirty = true;
        }
    }
}
