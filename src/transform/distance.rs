//! Exact Euclidean distance transform (lower envelope of parabolas).
//!
//! Foreground pixels start at distance 0 and background at +inf; a 1D
//! squared-distance pass runs along x, then y, then z. The result holds the
//! distance to the nearest foreground pixel.

use crate::image::{Dims, Image};
use crate::util::CdMatchResult;

/// Buffers for the 1D pass.
struct Envelope {
    vertices: Vec<usize>,
    bounds: Vec<f64>,
    input: Vec<f64>,
    output: Vec<f64>,
}

impl Envelope {
    fn new(len: usize) -> Self {
        Self {
            vertices: vec![0; len],
            bounds: vec![0.0; len + 1],
            input: vec![0.0; len],
            output: vec![0.0; len],
        }
    }

    /// Squared-distance transform of `self.input` into `self.output`.
    fn transform(&mut self, n: usize) {
        let f = &self.input[..n];
        let v = &mut self.vertices;
        let z = &mut self.bounds;
        let d = &mut self.output[..n];

        let mut k: isize = -1;
        for q in 0..n {
            if !f[q].is_finite() {
                continue;
            }
            let fq = f[q] + (q * q) as f64;
            loop {
                if k < 0 {
                    k = 0;
                    v[0] = q;
                    z[0] = f64::NEG_INFINITY;
                    z[1] = f64::INFINITY;
                    break;
                }
                let p = v[k as usize];
                let s = (fq - (f[p] + (p * p) as f64)) / (2.0 * (q as f64 - p as f64));
                if s <= z[k as usize] {
                    k -= 1;
                    continue;
                }
                k += 1;
                v[k as usize] = q;
                z[k as usize] = s;
                z[k as usize + 1] = f64::INFINITY;
                break;
            }
        }

        if k < 0 {
            d.fill(f64::INFINITY);
            return;
        }
        let mut j = 0usize;
        for (q, out) in d.iter_mut().enumerate() {
            while z[j + 1] < q as f64 {
                j += 1;
            }
            let p = v[j];
            let dq = q as f64 - p as f64;
            *out = dq * dq + f[p];
        }
    }
}

fn pass_axis(values: &mut [f64], dims: Dims, axis: usize) {
    let (len, stride) = match axis {
        0 => (dims.width, 1),
        1 => (dims.height, dims.width),
        _ => (dims.depth, dims.plane_len()),
    };
    if len <= 1 {
        return;
    }
    let mut env = Envelope::new(len);
    let starts: Vec<usize> = match axis {
        0 => (0..dims.height * dims.depth).map(|r| r * dims.width).collect(),
        1 => (0..dims.depth)
            .flat_map(|z| (0..dims.width).map(move |x| z * dims.plane_len() + x))
            .collect(),
        _ => (0..dims.plane_len()).collect(),
    };
    for start in starts {
        for i in 0..len {
            env.input[i] = values[start + i * stride];
        }
        env.transform(len);
        for i in 0..len {
            values[start + i * stride] = env.output[i];
        }
    }
}

/// Squared distances to the nearest pixel above `threshold`.
pub(crate) fn squared_distances(image: &Image, threshold: i32) -> Vec<f64> {
    let dims = image.dims();
    let mut values: Vec<f64> = image
        .foreground(threshold)
        .into_iter()
        .map(|fg| if fg != 0 { 0.0 } else { f64::INFINITY })
        .collect();
    for axis in 0..3 {
        pass_axis(&mut values, dims, axis);
    }
    values
}

/// Float32 image of Euclidean distances to the nearest pixel above `threshold`.
///
/// Without any foreground every pixel is `+inf`.
pub fn distance_transform(image: &Image, threshold: i32) -> CdMatchResult<Image> {
    let dims = image.dims();
    let data: Vec<f32> = squared_distances(image, threshold)
        .into_iter()
        .map(|d| d.sqrt() as f32)
        .collect();
    Image::from_pixels(data, dims.width, dims.height, dims.depth)
}
