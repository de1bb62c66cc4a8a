//! Reusable image transforms: labeling, contrast, distance, color coding and
//! derived search variants.

pub mod color_code;
pub mod components;
pub mod contrast;
pub mod distance;
pub mod variants;

pub use color_code::{color_depth_mip, ColorCodeConfig};
pub use components::{label_components, ComponentConfig, Labeling};
pub use contrast::{stretch_contrast, ContrastConfig};
pub use distance::distance_transform;
pub use variants::{gradient_image, z_gap_mask, z_gap_mask_with};
