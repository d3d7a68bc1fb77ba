//! Error types for class-file decoding and patching

/// Errors while decoding or editing a class file
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassFileError {
    /// Input ended before a complete structure was read
    #[error("unexpected end of class data at offset {offset} (wanted {wanted} bytes)")]
    UnexpectedEof {
        /// Offset where the read started
        offset: usize,
        /// Bytes requested
        wanted: usize,
    },

    /// Not a class file
    #[error("bad magic number {0:#010x}")]
    BadMagic(u32),

    /// Unknown constant pool tag
    #[error("invalid constant pool tag {tag} at index {index}")]
    InvalidConstantTag {
        /// Tag byte found
        tag: u8,
        /// Pool index being decoded
        index: u16,
    },

    /// Index outside the constant pool or pointing at an unusable slot
    #[error("constant pool index {0} out of range")]
    BadConstantIndex(u16),

    /// Constant exists but has the wrong kind
    #[error("constant #{index} is not a {expected}")]
    ConstantKindMismatch {
        /// Pool index
        index: u16,
        /// Expected constant kind
        expected: &'static str,
    },

    /// Unknown or truncated instruction
    #[error("invalid opcode {opcode:#04x} at code offset {offset}")]
    InvalidOpcode {
        /// Opcode byte
        opcode: u8,
        /// Offset within the method's code array
        offset: usize,
    },

    /// Malformed switch or code attribute contents
    #[error("malformed {context} at offset {offset}")]
    Malformed {
        /// Structure being decoded
        context: &'static str,
        /// Offset of the structure
        offset: usize,
    },

    /// Appending constants would exceed the u16 pool limit
    #[error("constant pool would exceed 65535 entries")]
    ConstantPoolOverflow,

    /// Patch lies inside the constant pool or overlaps another patch
    #[error("patch at offset {0} is outside the patchable region or overlaps")]
    InvalidPatch(usize),
}

/// Result alias for class-file operations
pub type ClassFileResult<T> = Result<T, ClassFileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eof_display() {
        let err = ClassFileError::UnexpectedEof { offset: 8, wanted: 2 };
        assert_eq!(
            err.to_string(),
            "unexpected end of class data at offset 8 (wanted 2 bytes)"
        );
    }

    #[test]
    fn magic_display() {
        assert_eq!(ClassFileError::BadMagic(0xdead_beef).to_string(), "bad magic number 0xdeadbeef");
    }
}
