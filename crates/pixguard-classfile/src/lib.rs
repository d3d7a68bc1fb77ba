//! JVM class-file reading and length-preserving patching
//!
//! This crate provides:
//! - A structural [`ClassFile`] view that borrows the original bytes
//! - Constant pool lookup and append-only extension ([`PoolExtension`])
//! - An exact instruction walker ([`Instructions`])
//! - Reassembly of an edited class from pool additions and byte patches
//!
//! # Example
//!
//! ```rust,ignore
//! use pixguard_classfile::prelude::*;
//!
//! let class = ClassFile::parse(&bytes)?;
//! for (name, value) in class.static_int_constants()? {
//!     println!("{name} = {value:#x}");
//! }
//! ```

mod class;
mod constant_pool;
mod edit;
mod error;
mod insn;
mod reader;

pub use class::{access, AttributeInfo, ClassFile, CodeAttribute, MemberInfo, MAGIC};
pub use constant_pool::{
    decode_modified_utf8, encode_modified_utf8, tag, Constant, ConstantPool, MemberRef,
    MemberRefIndices, MemberRefKind, PoolExtension,
};
pub use edit::{assemble, BytePatch};
pub use error::{ClassFileError, ClassFileResult};
pub use insn::{instruction_length, opcode, Instruction, Instructions};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude for common imports
pub mod prelude {
    pub use crate::class::{ClassFile, CodeAttribute, MemberInfo};
    pub use crate::constant_pool::{Constant, ConstantPool, MemberRef, PoolExtension};
    pub use crate::edit::{assemble, BytePatch};
    pub use crate::error::{ClassFileError, ClassFileResult};
    pub use crate::insn::{opcode, Instruction, Instructions};
}
