//! Query foreground positions and their shifted/mirrored variants.

use crate::image::{Dims, Image};
use crate::util::{CdMatchError, CdMatchResult};

/// Marks a shifted position that fell outside the image.
pub const SENTINEL: isize = -1;

/// Sorted linear indices of the query foreground.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryMask {
    dims: Dims,
    positions: Vec<usize>,
}

impl QueryMask {
    /// Collects pixels with any channel strictly above `threshold`.
    pub fn from_image(image: &Image, threshold: i32) -> Self {
        let positions = image
            .foreground(threshold)
            .into_iter()
            .enumerate()
            .filter_map(|(idx, fg)| (fg != 0).then_some(idx))
            .collect();
        Self {
            dims: image.dims(),
            positions,
        }
    }

    /// Ascending linear indices.
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn dims(&self) -> Dims {
        self.dims
    }
}

/// Offsets of the shift ring: `(0, 0)` first, then the eight neighbors at
/// each radius `2, 4, ..., xy_shift`.
pub fn shift_offsets(xy_shift: usize) -> CdMatchResult<Vec<(isize, isize)>> {
    if xy_shift % 2 != 0 {
        return Err(CdMatchError::OddShift { shift: xy_shift });
    }
    let mut offsets = Vec::with_capacity(1 + (xy_shift / 2) * 8);
    offsets.push((0, 0));
    for radius in (2..=xy_shift as isize).step_by(2) {
        for dx in [-radius, 0, radius] {
            for dy in [-radius, 0, radius] {
                if dx == 0 && dy == 0 {
                    continue;
                }
                offsets.push((dx, dy));
            }
        }
    }
    Ok(offsets)
}

/// Reflects a linear index around the vertical center line, keeping sentinels.
#[inline]
pub fn mirror_position(pos: isize, width: usize) -> isize {
    if pos < 0 {
        return SENTINEL;
    }
    let width = width as isize;
    pos + (width - 1) - 2 * (pos % width)
}

/// One geometric variant of the query positions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShiftVariant {
    pub dx: isize,
    pub dy: isize,
    pub mirrored: bool,
    /// Target positions aligned with [`QueryMask::positions`]; `SENTINEL` when out of bounds.
    pub positions: Vec<isize>,
}

/// All shift variants of a query mask, mirrored copies last.
#[derive(Clone, Debug)]
pub struct ShiftTable {
    variants: Vec<ShiftVariant>,
    min_index: Option<usize>,
    max_index: Option<usize>,
}

impl ShiftTable {
    /// Builds `1 + (xy_shift / 2) * 8` variants, doubled when `mirror` is set.
    pub fn new(mask: &QueryMask, xy_shift: usize, mirror: bool) -> CdMatchResult<Self> {
        let dims = mask.dims();
        let offsets = shift_offsets(xy_shift)?;
        let mut variants: Vec<ShiftVariant> = offsets
            .iter()
            .map(|&(dx, dy)| ShiftVariant {
                dx,
                dy,
                mirrored: false,
                positions: mask
                    .positions()
                    .iter()
                    .map(|&pos| shift_position(pos, dx, dy, dims))
                    .collect(),
            })
            .collect();
        if mirror {
            let mirrored: Vec<ShiftVariant> = variants
                .iter()
                .map(|v| ShiftVariant {
                    dx: v.dx,
                    dy: v.dy,
                    mirrored: true,
                    positions: v
                        .positions
                        .iter()
                        .map(|&pos| mirror_position(pos, dims.width))
                        .collect(),
                })
                .collect();
            variants.extend(mirrored);
        }

        let valid = variants
            .iter()
            .flat_map(|v| v.positions.iter().copied())
            .filter(|&pos| pos >= 0)
            .map(|pos| pos as usize);
        let (min_index, max_index) = valid.fold((None, None), |(lo, hi), pos| {
            (
                Some(lo.map_or(pos, |lo: usize| lo.min(pos))),
                Some(hi.map_or(pos, |hi: usize| hi.max(pos))),
            )
        });

        Ok(Self {
            variants,
            min_index,
            max_index,
        })
    }

    pub fn variants(&self) -> &[ShiftVariant] {
        &self.variants
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Smallest in-bounds target index touched by any variant.
    pub fn min_index(&self) -> Option<usize> {
        self.min_index
    }

    /// Largest in-bounds target index touched by any variant.
    pub fn max_index(&self) -> Option<usize> {
        self.max_index
    }
}

fn shift_position(pos: usize, dx: isize, dy: isize, dims: Dims) -> isize {
    let (x, y, z) = dims.coords(pos);
    let nx = x as isize + dx;
    let ny = y as isize + dy;
    if nx < 0 || ny < 0 || nx >= dims.width as isize || ny >= dims.height as isize {
        return SENTINEL;
    }
    dims.index(nx as usize, ny as usize, z) as isize
}

#[cfg(test)]
mod tests {
    use super::{mirror_position, shift_offsets, SENTINEL};

    #[test]
    fn ring_has_eight_offsets_per_radius() {
        assert_eq!(shift_offsets(0).unwrap(), vec![(0, 0)]);
        assert_eq!(shift_offsets(2).unwrap().len(), 9);
        assert_eq!(shift_offsets(4).unwrap().len(), 17);
        assert!(shift_offsets(3).is_err());
    }

    #[test]
    fn mirror_reflects_x_within_row() {
        // width 10: x = 2 in row 1 maps to x = 7 in row 1
        assert_eq!(mirror_position(12, 10), 17);
        assert_eq!(mirror_position(17, 10), 12);
        assert_eq!(mirror_position(SENTINEL, 10), SENTINEL);
    }
}
