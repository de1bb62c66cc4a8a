//! Standard alignment spaces that query and target images are registered to.

use crate::image::{Dims, Image};
use crate::util::{CdMatchError, CdMatchResult};

/// Template volume size and voxel spacing of an alignment space.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AlignmentSpace {
    pub name: &'static str,
    pub width: usize,
    pub height: usize,
    pub depth: usize,
    /// Voxel size in microns along x, y and z.
    pub voxel_size: [f64; 3],
}

/// Every registered alignment space.
pub static ALIGNMENT_SPACES: [AlignmentSpace; 2] = [
    AlignmentSpace {
        name: "JRC2018_Unisex_20x_HR",
        width: 1210,
        height: 566,
        depth: 174,
        voxel_size: [0.5189161, 0.5189161, 1.0],
    },
    AlignmentSpace {
        name: "JRC2018_VNC_Unisex_40x_DS",
        width: 573,
        height: 1119,
        depth: 219,
        voxel_size: [0.4611220, 0.4611220, 0.7],
    },
];

impl AlignmentSpace {
    /// Finds the space registered under `name`.
    pub fn lookup(name: &str) -> CdMatchResult<&'static AlignmentSpace> {
        ALIGNMENT_SPACES
            .iter()
            .find(|space| space.name == name)
            .ok_or_else(|| CdMatchError::UnknownAlignmentSpace(name.to_owned()))
    }

    /// Volume dimensions.
    pub fn dims(&self) -> Dims {
        Dims {
            width: self.width,
            height: self.height,
            depth: self.depth,
        }
    }

    /// Dimensions of the 2D color depth projection.
    pub fn mip_dims(&self) -> Dims {
        Dims {
            depth: 1,
            ..self.dims()
        }
    }

    /// Fails unless `image` is a projection or volume in this space.
    pub fn check_image(&self, image: &Image) -> CdMatchResult<()> {
        let got = image.dims();
        if got == self.mip_dims() || got == self.dims() {
            return Ok(());
        }
        Err(CdMatchError::DimensionMismatch {
            expected: self.mip_dims().as_tuple(),
            got: got.as_tuple(),
        })
    }
}
