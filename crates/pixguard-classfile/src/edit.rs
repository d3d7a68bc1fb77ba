//! Reassembling a class file from its original bytes plus edits
//!
//! Only two kinds of edit are supported:
//!
//! - appending constants to the pool (existing indices never move)
//! - overwriting bytes after the pool with a replacement of equal length
//!
//! Because nothing changes size except the pool tail, every offset stored
//! in the class (branch targets, exception ranges, stack map frames) stays
//! valid.

use crate::class::ClassFile;
use crate::constant_pool::PoolExtension;
use crate::error::{ClassFileError, ClassFileResult};

/// Same-length overwrite at an absolute offset of the original file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BytePatch {
    /// Absolute offset in the original bytes
    pub offset: usize,
    /// Replacement bytes
    pub bytes: Vec<u8>,
}

impl BytePatch {
    /// Create a patch
    #[must_use]
    pub fn new(offset: usize, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            offset,
            bytes: bytes.into(),
        }
    }
}

/// Build the edited class file
///
/// # Errors
///
/// [`ClassFileError::InvalidPatch`] when a patch touches the header or
/// constant pool, runs past the end, or overlaps another patch.
pub fn assemble(
    class: &ClassFile<'_>,
    extension: &PoolExtension<'_>,
    patches: &[BytePatch],
) -> ClassFileResult<Vec<u8>> {
    let raw = class.raw();
    let pool_end = class.constant_pool_end();

    let mut sorted: Vec<&BytePatch> = patches.iter().collect();
    sorted.sort_by_key(|p| p.offset);
    let mut floor = pool_end;
    for patch in &sorted {
        let end = patch.offset + patch.bytes.len();
        if patch.offset < floor || end > raw.len() {
            return Err(ClassFileError::InvalidPatch(patch.offset));
        }
        floor = end;
    }

    let mut out = Vec::with_capacity(raw.len() + extension.bytes().len());
    // magic + version
    out.extend_from_slice(&raw[..8]);
    out.extend_from_slice(&extension.count().to_be_bytes());
    out.extend_from_slice(&raw[10..pool_end]);
    out.extend_from_slice(extension.bytes());

    let tail_start = out.len();
    out.extend_from_slice(&raw[pool_end..]);
    for patch in sorted {
        let at = tail_start + (patch.offset - pool_end);
        out[at..at + patch.bytes.len()].copy_from_slice(&patch.bytes);
    }
    Ok(out)
}
