//! Country flag derivation.
//!
//! The game wants every flag three times: large (82x52) next to the source
//! path, medium (41x26) under `gfx/flags/medium/`, and small (10x7) under
//! `gfx/flags/small/`. All three are DDS; the source resolution is never
//! written.

use crate::build::transform::Artifact;
use crate::dds::{encode_dds, DDS_EXTENSION};
use crate::output::swap_extension;
use crate::raster::resize;
use image::RgbaImage;

/// Relative folder holding flag artwork.
pub const FLAGS_DIR: &str = "gfx/flags";

/// One of the three flag sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagSize {
    Large,
    Medium,
    Small,
}

impl FlagSize {
    pub const ALL: [FlagSize; 3] = [FlagSize::Large, FlagSize::Medium, FlagSize::Small];

    /// Pixel dimensions as (width, height).
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            FlagSize::Large => (82, 52),
            FlagSize::Medium => (41, 26),
            FlagSize::Small => (10, 7),
        }
    }

    /// Sub-folder inserted after `gfx/flags`, if any.
    pub fn folder(self) -> Option<&'static str> {
        match self {
            FlagSize::Large => None,
            FlagSize::Medium => Some("medium"),
            FlagSize::Small => Some("small"),
        }
    }
}

/// Check if a relative path is a file inside `gfx/flags`.
pub fn is_flag_path(relative: &str) -> bool {
    relative
        .strip_prefix(FLAGS_DIR)
        .and_then(|rest| rest.strip_prefix('/'))
        .is_some_and(|rest| !rest.is_empty())
}

/// Output-relative path of one flag size.
///
/// `gfx/flags/GER.png` becomes `gfx/flags/GER.dds`,
/// `gfx/flags/medium/GER.dds` and `gfx/flags/small/GER.dds`.
pub fn flag_destination(relative: &str, size: FlagSize) -> String {
    let relative = swap_extension(relative, DDS_EXTENSION);
    match size.folder() {
        None => relative,
        Some(folder) => {
            let mut parts = relative.splitn(3, '/');
            match (parts.next(), parts.next(), parts.next()) {
                (Some(first), Some(second), Some(rest)) => {
                    format!("{}/{}/{}/{}", first, second, folder, rest)
                }
                _ => relative,
            }
        }
    }
}

/// Derive the three flag textures from a decoded source image.
pub fn flag_artifacts(image: &RgbaImage, relative: &str) -> Vec<Artifact> {
    FlagSize::ALL
        .iter()
        .map(|&size| {
            let (width, height) = size.dimensions();
            let resized = resize(image, width, height);
            Artifact::new(flag_destination(relative, size), encode_dds(&resized))
        })
        .collect()
}
