//! Testing utilities for the pixguard workspace
//!
//! Shared fixtures: class-file builder, jar writer, image headers and
//! on-disk resource trees.

#![allow(missing_docs)]

pub mod archives;
pub mod classes;
pub mod images;
pub mod resources;

pub use archives::{jar_bytes, read_jar, write_jar};
pub use classes::{ClassBuilder, CodeBuilder};
pub use images::{garbage_bytes, png_bytes};
pub use resources::{drawable_xml, layout_xml, values_xml, ResourceTree};
