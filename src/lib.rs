//! HOI4 Mod Helper - Library for building Hearts of Iron IV mods
//!
//! This library provides functionality to:
//! - Convert mod artwork to uncompressed DDS textures
//! - Derive the three country flag sizes from one source image
//! - Rewrite the mod descriptor so the launcher finds the built folder
//! - Rebuild single files incrementally in watch mode

pub mod build;
pub mod cli;
pub mod config;
pub mod dds;
pub mod descriptor;
pub mod ignore;
pub mod output;
pub mod raster;
pub mod watch;
