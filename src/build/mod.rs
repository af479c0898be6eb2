//! Build pipeline for HOI4 mods.
//!
//! Turns a mod source folder into an installable output folder plus the
//! `<name>.mod` launcher descriptor that points at it.
//!
//! # Overview
//!
//! The build pipeline consists of:
//! - **Discovery**: List every file under the mod folder
//! - **Classification**: Decide what each file becomes (skip, DDS, flags, PNG, copy)
//! - **Transform**: Produce the artifacts and write them into the output folder
//!
//! # Example
//!
//! ```ignore
//! use hoi4_mod_helper::build::{BuildContext, BuildPipeline};
//!
//! let context = BuildContext::new(mod_root, output_root);
//! let mut pipeline = BuildPipeline::new(context);
//!
//! let result = pipeline.build()?;
//! println!("{}", result.summary());
//! ```

pub mod context;
pub mod error;
pub mod flags;
pub mod pipeline;
pub mod result;
pub mod transform;

pub use context::*;
pub use error::*;
pub use flags::*;
pub use pipeline::*;
pub use result::*;
pub use transform::*;
