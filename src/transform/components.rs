//! 3D connected-component labeling with a minimum-volume cutoff.

use crate::image::{Dims, Image};
use crate::trace::{trace_event, trace_span};
use crate::util::CdMatchResult;

/// Configuration for [`label_components`].
#[derive(Clone, Debug)]
pub struct ComponentConfig {
    /// Voxels strictly above this value are foreground.
    pub threshold: i32,
    /// Components with at most this many voxels are discarded.
    pub min_volume: usize,
    /// Upper bound on the number of labels written (at most `u16::MAX`).
    pub max_components: usize,
}

impl Default for ComponentConfig {
    fn default() -> Self {
        Self {
            threshold: 0,
            min_volume: 0,
            max_components: u16::MAX as usize,
        }
    }
}

/// Labeled components, largest first.
#[derive(Clone, Debug)]
pub struct Labeling {
    /// Gray16 label volume; 0 is background, label `i` has `sizes[i - 1]` voxels.
    pub labels: Image,
    /// Voxel counts in descending order.
    pub sizes: Vec<usize>,
}

impl Labeling {
    pub fn num_components(&self) -> usize {
        self.sizes.len()
    }
}

#[derive(Copy, Clone, Debug)]
struct BoundingBox {
    min: [usize; 3],
    max: [usize; 3],
}

fn foreground_bbox(fg: &[u8], dims: Dims, pad: usize) -> Option<BoundingBox> {
    let mut bbox: Option<BoundingBox> = None;
    for (idx, _) in fg.iter().enumerate().filter(|&(_, &v)| v != 0) {
        let (x, y, z) = dims.coords(idx);
        let p = [x, y, z];
        match bbox.as_mut() {
            None => bbox = Some(BoundingBox { min: p, max: p }),
            Some(b) => {
                for axis in 0..3 {
                    b.min[axis] = b.min[axis].min(p[axis]);
                    b.max[axis] = b.max[axis].max(p[axis]);
                }
            }
        }
    }
    let limits = [dims.width - 1, dims.height - 1, dims.depth - 1];
    bbox.map(|b| {
        let mut padded = b;
        for axis in 0..3 {
            padded.min[axis] = b.min[axis].saturating_sub(pad);
            padded.max[axis] = (b.max[axis] + pad).min(limits[axis]);
        }
        padded
    })
}

/// Labels 26-connected foreground components of `volume`.
///
/// Components are ranked by voxel count (ties keep discovery order), those
/// with more than `min_volume` voxels are renumbered from 1, and everything
/// else is cleared.
pub fn label_components(volume: &Image, cfg: &ComponentConfig) -> CdMatchResult<Labeling> {
    let dims = volume.dims();
    let _span = trace_span!(
        "label_components",
        width = dims.width,
        height = dims.height,
        depth = dims.depth
    )
    .entered();

    let fg = volume.foreground(cfg.threshold);

    let mut labels = vec![0u16; dims.len()];
    let Some(bbox) = foreground_bbox(&fg, dims, 2) else {
        trace_event!("components", count = 0usize);
        return Ok(Labeling {
            labels: Image::from_pixels(labels, dims.width, dims.height, dims.depth)?,
            sizes: Vec::new(),
        });
    };

    let mut visited = vec![false; dims.len()];
    let mut components: Vec<Vec<usize>> = Vec::new();
    let mut stack = Vec::new();
    for z in bbox.min[2]..=bbox.max[2] {
        for y in bbox.min[1]..=bbox.max[1] {
            for x in bbox.min[0]..=bbox.max[0] {
                let seed = dims.index(x, y, z);
                if fg[seed] == 0 || visited[seed] {
                    continue;
                }
                visited[seed] = true;
                stack.push(seed);
                let mut voxels = Vec::new();
                while let Some(idx) = stack.pop() {
                    voxels.push(idx);
                    let (cx, cy, cz) = dims.coords(idx);
                    for nz in cz.saturating_sub(1)..=(cz + 1).min(bbox.max[2]) {
                        if nz < bbox.min[2] {
                            continue;
                        }
                        for ny in cy.saturating_sub(1)..=(cy + 1).min(bbox.max[1]) {
                            if ny < bbox.min[1] {
                                continue;
                            }
                            for nx in cx.saturating_sub(1)..=(cx + 1).min(bbox.max[0]) {
                                if nx < bbox.min[0] {
                                    continue;
                                }
                                let n = dims.index(nx, ny, nz);
                                if fg[n] != 0 && !visited[n] {
                                    visited[n] = true;
                                    stack.push(n);
                                }
                            }
                        }
                    }
                }
                components.push(voxels);
            }
        }
    }

    components.sort_by(|a, b| b.len().cmp(&a.len()));
    let max_components = cfg.max_components.min(u16::MAX as usize);
    let mut sizes = Vec::new();
    for voxels in components
        .iter()
        .filter(|voxels| voxels.len() > cfg.min_volume)
        .take(max_components)
    {
        sizes.push(voxels.len());
        let label = sizes.len() as u16;
        for &idx in voxels {
            labels[idx] = label;
        }
    }

    trace_event!(
        "components",
        found = components.len(),
        kept = sizes.len()
    );
    Ok(Labeling {
        labels: Image::from_pixels(labels, dims.width, dims.height, dims.depth)?,
        sizes,
    })
}
