//! Constant pool decoding, lookup, and append-only extension

use crate::error::{ClassFileError, ClassFileResult};
use crate::reader::ByteReader;

/// Constant pool tag bytes
pub mod tag {
    #![allow(missing_docs)]
    pub const UTF8: u8 = 1;
    pub const INTEGER: u8 = 3;
    pub const FLOAT: u8 = 4;
    pub const LONG: u8 = 5;
    pub const DOUBLE: u8 = 6;
    pub const CLASS: u8 = 7;
    pub const STRING: u8 = 8;
    pub const FIELD_REF: u8 = 9;
    pub const METHOD_REF: u8 = 10;
    pub const INTERFACE_METHOD_REF: u8 = 11;
    pub const NAME_AND_TYPE: u8 = 12;
    pub const METHOD_HANDLE: u8 = 15;
    pub const METHOD_TYPE: u8 = 16;
    pub const DYNAMIC: u8 = 17;
    pub const INVOKE_DYNAMIC: u8 = 18;
    pub const MODULE: u8 = 19;
    pub const PACKAGE: u8 = 20;
}

/// One decoded constant pool entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constant {
    /// Slot 0 and the upper half of long/double entries
    Unusable,
    /// Modified UTF-8 string
    Utf8(String),
    /// 32-bit integer
    Integer(i32),
    /// Raw float bits
    Float(u32),
    /// 64-bit integer
    Long(i64),
    /// Raw double bits
    Double(u64),
    /// Class reference by internal name
    Class {
        /// Utf8 index of the internal name
        name_index: u16,
    },
    /// String literal
    String {
        /// Utf8 index of the value
        string_index: u16,
    },
    /// Field reference
    FieldRef(MemberRefIndices),
    /// Class method reference
    MethodRef(MemberRefIndices),
    /// Interface method reference
    InterfaceMethodRef(MemberRefIndices),
    /// Name and descriptor pair
    NameAndType {
        /// Utf8 index of the name
        name_index: u16,
        /// Utf8 index of the descriptor
        descriptor_index: u16,
    },
    /// Method handle
    MethodHandle {
        /// Handle kind (1..=9)
        reference_kind: u8,
        /// Referenced member
        reference_index: u16,
    },
    /// Method type
    MethodType {
        /// Utf8 index of the descriptor
        descriptor_index: u16,
    },
    /// Dynamically computed constant
    Dynamic {
        /// Bootstrap method table index
        bootstrap_method_attr_index: u16,
        /// NameAndType index
        name_and_type_index: u16,
    },
    /// Dynamically computed call site
    InvokeDynamic {
        /// Bootstrap method table index
        bootstrap_method_attr_index: u16,
        /// NameAndType index
        name_and_type_index: u16,
    },
    /// Module reference
    Module {
        /// Utf8 index of the module name
        name_index: u16,
    },
    /// Package reference
    Package {
        /// Utf8 index of the package name
        name_index: u16,
    },
}

impl Constant {
    /// Short kind name used in error messages
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Unusable => "unusable slot",
            Self::Utf8(_) => "Utf8",
            Self::Integer(_) => "Integer",
            Self::Float(_) => "Float",
            Self::Long(_) => "Long",
            Self::Double(_) => "Double",
            Self::Class { .. } => "Class",
            Self::String { .. } => "String",
            Self::FieldRef(_) => "Fieldref",
            Self::MethodRef(_) => "Methodref",
            Self::InterfaceMethodRef(_) => "InterfaceMethodref",
            Self::NameAndType { .. } => "NameAndType",
            Self::MethodHandle { .. } => "MethodHandle",
            Self::MethodType { .. } => "MethodType",
            Self::Dynamic { .. } => "Dynamic",
            Self::InvokeDynamic { .. } => "InvokeDynamic",
            Self::Module { .. } => "Module",
            Self::Package { .. } => "Package",
        }
    }

    /// Long and double entries occupy two slots
    #[inline]
    #[must_use]
    pub const fn is_wide(&self) -> bool {
        matches!(self, Self::Long(_) | Self::Double(_))
    }
}

/// Owner and NameAndType indices shared by the three member-ref kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberRefIndices {
    /// Class index of the owner
    pub class_index: u16,
    /// NameAndType index
    pub name_and_type_index: u16,
}

/// Which member-ref constant a reference came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberRefKind {
    /// `CONSTANT_Fieldref`
    Field,
    /// `CONSTANT_Methodref`
    Method,
    /// `CONSTANT_InterfaceMethodref`
    InterfaceMethod,
}

/// Fully resolved member reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberRef<'p> {
    /// Constant kind
    pub kind: MemberRefKind,
    /// Owner internal name (`a/b/C`)
    pub owner: &'p str,
    /// Member name
    pub name: &'p str,
    /// Member descriptor
    pub descriptor: &'p str,
}

/// Decoded constant pool, indexed as in the class file (1-based)
#[derive(Debug, Clone, Default)]
pub struct ConstantPool {
    entries: Vec<Constant>,
}

impl ConstantPool {
    pub(crate) fn parse(reader: &mut ByteReader<'_>) -> ClassFileResult<Self> {
        let count = reader.u16()?;
        let mut entries = Vec::with_capacity(usize::from(count).max(1));
        entries.push(Constant::Unusable);

        let count = u32::from(count);
        let mut index: u32 = 1;
        while index < count {
            let constant = parse_constant(reader, index as u16)?;
            let wide = constant.is_wide();
            entries.push(constant);
            index += 1;
            if wide {
                entries.push(Constant::Unusable);
                index += 1;
            }
        }

        if index != count {
            // A wide entry in the last slot ran past the declared count
            return Err(ClassFileError::Malformed {
                context: "constant pool",
                offset: reader.position(),
            });
        }

        Ok(Self { entries })
    }

    /// The `constant_pool_count` value (number of slots including slot 0)
    #[inline]
    #[must_use]
    pub fn count(&self) -> u16 {
        self.entries.len() as u16
    }

    /// Entry at `index`
    ///
    /// # Errors
    ///
    /// Returns [`ClassFileError::BadConstantIndex`] for slot 0, out-of-range
    /// indices, and the upper half of wide entries.
    pub fn get(&self, index: u16) -> ClassFileResult<&Constant> {
        match self.entries.get(usize::from(index)) {
            Some(Constant::Unusable) | None => Err(ClassFileError::BadConstantIndex(index)),
            Some(constant) => Ok(constant),
        }
    }

    /// Usable entries with their indices
    pub fn iter(&self) -> impl Iterator<Item = (u16, &Constant)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, c)| !matches!(c, Constant::Unusable))
            .map(|(i, c)| (i as u16, c))
    }

    /// Utf8 entry text
    ///
    /// # Errors
    ///
    /// Fails when the index is invalid or not a Utf8 entry.
    pub fn utf8(&self, index: u16) -> ClassFileResult<&str> {
        match self.get(index)? {
            Constant::Utf8(s) => Ok(s),
            _ => Err(mismatch(index, "Utf8")),
        }
    }

    /// Internal name of a Class entry
    ///
    /// # Errors
    ///
    /// Fails when the index is invalid or not a Class entry.
    pub fn class_name(&self, index: u16) -> ClassFileResult<&str> {
        match self.get(index)? {
            Constant::Class { name_index } => self.utf8(*name_index),
            _ => Err(mismatch(index, "Class")),
        }
    }

    /// Name and descriptor of a NameAndType entry
    ///
    /// # Errors
    ///
    /// Fails when the index is invalid or not a NameAndType entry.
    pub fn name_and_type(&self, index: u16) -> ClassFileResult<(&str, &str)> {
        match self.get(index)? {
            Constant::NameAndType {
                name_index,
                descriptor_index,
            } => Ok((self.utf8(*name_index)?, self.utf8(*descriptor_index)?)),
            _ => Err(mismatch(index, "NameAndType")),
        }
    }

    /// Resolve a field, method or interface-method reference
    ///
    /// # Errors
    ///
    /// Fails when the index is not a member ref or any component is broken.
    pub fn member_ref(&self, index: u16) -> ClassFileResult<MemberRef<'_>> {
        let (kind, indices) = match self.get(index)? {
            Constant::FieldRef(i) => (MemberRefKind::Field, i),
            Constant::MethodRef(i) => (MemberRefKind::Method, i),
            Constant::InterfaceMethodRef(i) => (MemberRefKind::InterfaceMethod, i),
            _ => return Err(mismatch(index, "member reference")),
        };
        let owner = self.class_name(indices.class_index)?;
        let (name, descriptor) = self.name_and_type(indices.name_and_type_index)?;
        Ok(MemberRef {
            kind,
            owner,
            name,
            descriptor,
        })
    }

    /// Index of an existing entry equal to `constant`
    #[must_use]
    pub fn position_of(&self, constant: &Constant) -> Option<u16> {
        self.iter().find(|(_, c)| *c == constant).map(|(i, _)| i)
    }
}

fn mismatch(index: u16, expected: &'static str) -> ClassFileError {
    ClassFileError::ConstantKindMismatch { index, expected }
}

fn parse_constant(reader: &mut ByteReader<'_>, index: u16) -> ClassFileResult<Constant> {
    let t = reader.u8()?;
    let constant = match t {
        tag::UTF8 => {
            let len = reader.u16()?;
            Constant::Utf8(decode_modified_utf8(reader.bytes(usize::from(len))?))
        }
        tag::INTEGER => Constant::Integer(reader.i32()?),
        tag::FLOAT => Constant::Float(reader.u32()?),
        tag::LONG => Constant::Long(reader.u64()? as i64),
        tag::DOUBLE => Constant::Double(reader.u64()?),
        tag::CLASS => Constant::Class {
            name_index: reader.u16()?,
        },
        tag::STRING => Constant::String {
            string_index: reader.u16()?,
        },
        tag::FIELD_REF => Constant::FieldRef(member_indices(reader)?),
        tag::METHOD_REF => Constant::MethodRef(member_indices(reader)?),
        tag::INTERFACE_METHOD_REF => Constant::InterfaceMethodRef(member_indices(reader)?),
        tag::NAME_AND_TYPE => Constant::NameAndType {
            name_index: reader.u16()?,
            descriptor_index: reader.u16()?,
        },
        tag::METHOD_HANDLE => Constant::MethodHandle {
            reference_kind: reader.u8()?,
            reference_index: reader.u16()?,
        },
        tag::METHOD_TYPE => Constant::MethodType {
            descriptor_index: reader.u16()?,
        },
        tag::DYNAMIC => Constant::Dynamic {
            bootstrap_method_attr_index: reader.u16()?,
            name_and_type_index: reader.u16()?,
        },
        tag::INVOKE_DYNAMIC => Constant::InvokeDynamic {
            bootstrap_method_attr_index: reader.u16()?,
            name_and_type_index: reader.u16()?,
        },
        tag::MODULE => Constant::Module {
            name_index: reader.u16()?,
        },
        tag::PACKAGE => Constant::Package {
            name_index: reader.u16()?,
        },
        tag => return Err(ClassFileError::InvalidConstantTag { tag, index }),
    };
    Ok(constant)
}

fn member_indices(reader: &mut ByteReader<'_>) -> ClassFileResult<MemberRefIndices> {
    Ok(MemberRefIndices {
        class_index: reader.u16()?,
        name_and_type_index: reader.u16()?,
    })
}

/// Decode the JVM's modified UTF-8 (NUL as `C0 80`, supplementary
/// characters as surrogate pairs)
#[must_use]
pub fn decode_modified_utf8(bytes: &[u8]) -> String {
    if let Ok(s) = std::str::from_utf8(bytes) {
        if !bytes.contains(&0) {
            return s.to_owned();
        }
    }

    let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b & 0x80 == 0 {
            units.push(u16::from(b));
            i += 1;
        } else if b & 0xe0 == 0xc0 && i + 1 < bytes.len() {
            units.push((u16::from(b & 0x1f) << 6) | u16::from(bytes[i + 1] & 0x3f));
            i += 2;
        } else if b & 0xf0 == 0xe0 && i + 2 < bytes.len() {
            units.push(
                (u16::from(b & 0x0f) << 12)
                    | (u16::from(bytes[i + 1] & 0x3f) << 6)
                    | u16::from(bytes[i + 2] & 0x3f),
            );
            i += 3;
        } else {
            units.push(0xfffd);
            i += 1;
        }
    }
    String::from_utf16_lossy(&units)
}

/// Encode to the JVM's modified UTF-8
#[must_use]
pub fn encode_modified_utf8(value: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(value.len());
    for unit in value.encode_utf16() {
        match unit {
            0x0001..=0x007f => out.push(unit as u8),
            0x0000 | 0x0080..=0x07ff => {
                out.push(0xc0 | (unit >> 6) as u8);
                out.push(0x80 | (unit & 0x3f) as u8);
            }
            _ => {
                out.push(0xe0 | (unit >> 12) as u8);
                out.push(0x80 | ((unit >> 6) & 0x3f) as u8);
                out.push(0x80 | (unit & 0x3f) as u8);
            }
        }
    }
    out
}

/// Append-only additions to an existing pool
///
/// Existing slots are never renumbered. Requests for a constant that
/// already exists (in the original pool or among earlier additions) return
/// the existing index.
#[derive(Debug)]
pub struct PoolExtension<'p> {
    base: &'p ConstantPool,
    added: Vec<(Constant, u16)>,
    next_index: u16,
    bytes: Vec<u8>,
}

impl<'p> PoolExtension<'p> {
    /// Start extending `base`
    #[must_use]
    pub fn new(base: &'p ConstantPool) -> Self {
        Self {
            base,
            added: Vec::new(),
            next_index: base.count(),
            bytes: Vec::new(),
        }
    }

    /// Number of constants appended so far
    #[inline]
    #[must_use]
    pub fn added_count(&self) -> usize {
        self.added.len()
    }

    /// New `constant_pool_count`
    #[inline]
    #[must_use]
    pub fn count(&self) -> u16 {
        self.next_index
    }

    /// Encoded bytes of the appended entries, in index order
    #[inline]
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Index of a Utf8 entry with this text
    ///
    /// # Errors
    ///
    /// [`ClassFileError::ConstantPoolOverflow`] when the pool is full.
    pub fn utf8(&mut self, value: &str) -> ClassFileResult<u16> {
        self.intern(Constant::Utf8(value.to_owned()))
    }

    /// Index of a Class entry for an internal name
    ///
    /// # Errors
    ///
    /// [`ClassFileError::ConstantPoolOverflow`] when the pool is full.
    pub fn class(&mut self, internal_name: &str) -> ClassFileResult<u16> {
        let name_index = self.utf8(internal_name)?;
        self.intern(Constant::Class { name_index })
    }

    /// Index of a NameAndType entry
    ///
    /// # Errors
    ///
    /// [`ClassFileError::ConstantPoolOverflow`] when the pool is full.
    pub fn name_and_type(&mut self, name: &str, descriptor: &str) -> ClassFileResult<u16> {
        let name_index = self.utf8(name)?;
        let descriptor_index = self.utf8(descriptor)?;
        self.intern(Constant::NameAndType {
            name_index,
            descriptor_index,
        })
    }

    /// Index of a Methodref entry
    ///
    /// # Errors
    ///
    /// [`ClassFileError::ConstantPoolOverflow`] when the pool is full.
    pub fn method_ref(
        &mut self,
        owner: &str,
        name: &str,
        descriptor: &str,
    ) -> ClassFileResult<u16> {
        let class_index = self.class(owner)?;
        let name_and_type_index = self.name_and_type(name, descriptor)?;
        self.intern(Constant::MethodRef(MemberRefIndices {
            class_index,
            name_and_type_index,
        }))
    }

    fn intern(&mut self, constant: Constant) -> ClassFileResult<u16> {
        if let Some(index) = self.base.position_of(&constant) {
            return Ok(index);
        }
        if let Some((_, index)) = self.added.iter().find(|(c, _)| *c == constant) {
            return Ok(*index);
        }
        if self.next_index == u16::MAX {
            return Err(ClassFileError::ConstantPoolOverflow);
        }

        let index = self.next_index;
        encode_constant(&constant, &mut self.bytes);
        self.added.push((constant, index));
        self.next_index += 1;
        Ok(index)
    }
}

fn encode_constant(constant: &Constant, out: &mut Vec<u8>) {
    match constant {
        Constant::Utf8(s) => {
            let encoded = encode_modified_utf8(s);
            out.push(tag::UTF8);
            out.extend_from_slice(&(encoded.len() as u16).to_be_bytes());
            out.extend_from_slice(&encoded);
        }
        Constant::Class { name_index } => {
            out.push(tag::CLASS);
            out.extend_from_slice(&name_index.to_be_bytes());
        }
        Constant::NameAndType {
            name_index,
            descriptor_index,
        } => {
            out.push(tag::NAME_AND_TYPE);
            out.extend_from_slice(&name_index.to_be_bytes());
            out.extend_from_slice(&descriptor_index.to_be_bytes());
        }
        Constant::MethodRef(indices) => {
            out.push(tag::METHOD_REF);
            out.extend_from_slice(&indices.class_index.to_be_bytes());
            out.extend_from_slice(&indices.name_and_type_index.to_be_bytes());
        }
        // Only the kinds above are ever interned
        other => unreachable!("cannot append {} constants", other.kind_name()),
    }
}
