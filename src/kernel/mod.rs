//! Max-filter (dilation) kernels.
//!
//! A dilation replaces every pixel with the maximum over a neighborhood
//! described by a [`Footprint`]. Backends differ only in how they walk the
//! footprint; all of them visit exactly the same in-bounds neighbors and
//! therefore produce identical images.

use crate::image::Image;
use crate::trace::trace_span;
use crate::util::{CdMatchError, CdMatchResult};

pub mod scalar;
pub mod span;

#[cfg(feature = "rayon")]
pub mod rayon;

/// Neighborhood shape.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum KernelShape {
    /// Points with `sum((d / r)^2) <= 1` (circle in 2D, ellipsoid in 3D).
    Ellipsoid,
    /// Points with `|d| <= r` on every axis.
    Box,
}

/// Per-axis neighborhood radii in pixels.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Radii {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Largest accepted radius along any axis, in pixels.
pub const MAX_RADIUS: f64 = 4096.0;

impl Radii {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// In-plane circle; z is left untouched.
    pub fn circle(r: f64) -> Self {
        Self::new(r, r, 0.0)
    }

    pub fn sphere(r: f64) -> Self {
        Self::new(r, r, r)
    }

    fn validate(&self) -> CdMatchResult<()> {
        for r in [self.x, self.y, self.z] {
            if !r.is_finite() || r < 0.0 {
                return Err(CdMatchError::InvalidInput(
                    "dilation radii must be finite and non-negative",
                ));
            }
            if r > MAX_RADIUS {
                return Err(CdMatchError::InvalidInput("dilation radius exceeds MAX_RADIUS"));
            }
        }
        Ok(())
    }
}

/// One row of a footprint: offsets `dz`, `dy` and the in-row half width.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FootprintRow {
    pub dz: isize,
    pub dy: isize,
    pub half_width: usize,
}

/// Neighborhood decomposed into contiguous x-runs.
#[derive(Clone, Debug, PartialEq)]
pub struct Footprint {
    rows: Vec<FootprintRow>,
}

fn axis_term(d: isize, r: f64) -> f64 {
    if r == 0.0 {
        if d == 0 {
            0.0
        } else {
            f64::INFINITY
        }
    } else {
        let q = d as f64 / r;
        q * q
    }
}

impl Footprint {
    /// Builds the footprint for `radii` and `shape`.
    pub fn new(radii: Radii, shape: KernelShape) -> CdMatchResult<Self> {
        radii.validate()?;
        let rx = radii.x.floor() as isize;
        let ry = radii.y.floor() as isize;
        let rz = radii.z.floor() as isize;

        let mut rows = Vec::new();
        for dz in -rz..=rz {
            for dy in -ry..=ry {
                let half_width = match shape {
                    KernelShape::Box => Some(rx as usize),
                    KernelShape::Ellipsoid => {
                        let base = axis_term(dy, radii.y) + axis_term(dz, radii.z);
                        (0..=rx)
                            .take_while(|&dx| base + axis_term(dx, radii.x) <= 1.0)
                            .last()
                            .map(|dx| dx as usize)
                    }
                };
                if let Some(half_width) = half_width {
                    rows.push(FootprintRow { dz, dy, half_width });
                }
            }
        }
        Ok(Self { rows })
    }

    /// Row decomposition; always contains the `(0, 0)` row.
    pub fn rows(&self) -> &[FootprintRow] {
        &self.rows
    }

    /// Number of offsets covered by the footprint.
    pub fn size(&self) -> usize {
        self.rows.iter().map(|row| 2 * row.half_width + 1).sum()
    }
}

/// Strategy for evaluating a dilation.
///
/// Implementations must be pure: the same input and footprint always yield
/// the same output regardless of the backend.
pub trait DilationBackend {
    /// Short backend name, used in trace output.
    fn name(&self) -> &'static str;

    /// Returns the max-filtered copy of `image`.
    fn dilate(&self, image: &Image, footprint: &Footprint) -> CdMatchResult<Image>;
}

/// Dilates `image` with the given radii and shape using `backend`.
pub fn dilate_with<B: DilationBackend + ?Sized>(
    backend: &B,
    image: &Image,
    radii: Radii,
    shape: KernelShape,
) -> CdMatchResult<Image> {
    let footprint = Footprint::new(radii, shape)?;
    let _span = trace_span!(
        "dilate",
        backend = backend.name(),
        footprint = footprint.size()
    )
    .entered();
    backend.dilate(image, &footprint)
}

/// Dilates with the default span backend.
pub fn dilate(image: &Image, radii: Radii, shape: KernelShape) -> CdMatchResult<Image> {
    dilate_with(&span::SpanDilation, image, radii, shape)
}

#[cfg(test)]
mod tests {
    use super::{Footprint, KernelShape, Radii, MAX_RADIUS};

    #[test]
    fn circle_footprint_has_expected_size() {
        let fp = Footprint::new(Radii::circle(2.0), KernelShape::Ellipsoid).unwrap();
        // rows of 1, 3, 5, 3, 1 offsets
        assert_eq!(fp.size(), 13);
        let fp = Footprint::new(Radii::circle(0.0), KernelShape::Ellipsoid).unwrap();
        assert_eq!(fp.size(), 1);
    }

    #[test]
    fn box_footprint_is_full() {
        let fp = Footprint::new(Radii::new(1.0, 2.0, 1.0), KernelShape::Box).unwrap();
        assert_eq!(fp.size(), 3 * 5 * 3);
    }

    #[test]
    fn negative_radius_is_rejected() {
        assert!(Footprint::new(Radii::circle(-1.0), KernelShape::Ellipsoid).is_err());
    }

    #[test]
    fn oversized_radius_is_rejected() {
        assert!(Footprint::new(Radii::circle(1e12), KernelShape::Ellipsoid).is_err());
        assert!(Footprint::new(Radii::new(1.0, 1.0, MAX_RADIUS + 1.0), KernelShape::Box).is_err());
    }
}
