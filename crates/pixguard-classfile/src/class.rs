//! Structural view over a class file
//!
//! The view keeps byte offsets into the original buffer instead of copying
//! attribute payloads. Edits are expressed as patches against those
//! offsets (see [`crate::edit`]).

use crate::constant_pool::{Constant, ConstantPool};
use crate::error::{ClassFileError, ClassFileResult};
use crate::reader::ByteReader;

/// Class file magic number
pub const MAGIC: u32 = 0xcafe_babe;

/// Access flag bits used by this crate
pub mod access {
    /// `ACC_PUBLIC`
    pub const PUBLIC: u16 = 0x0001;
    /// `ACC_STATIC`
    pub const STATIC: u16 = 0x0008;
    /// `ACC_FINAL`
    pub const FINAL: u16 = 0x0010;
}

/// An attribute located by offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeInfo {
    /// Utf8 index of the attribute name
    pub name_index: u16,
    /// Absolute offset of the payload (after the length field)
    pub offset: usize,
    /// Payload length
    pub length: usize,
}

/// A field or method header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInfo {
    /// Access flags
    pub access_flags: u16,
    /// Utf8 index of the name
    pub name_index: u16,
    /// Utf8 index of the descriptor
    pub descriptor_index: u16,
    /// Member attributes
    pub attributes: Vec<AttributeInfo>,
}

impl MemberInfo {
    /// Whether `ACC_STATIC` is set
    #[inline]
    #[must_use]
    pub const fn is_static(&self) -> bool {
        self.access_flags & access::STATIC != 0
    }
}

/// Location of a method's bytecode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeAttribute {
    /// Operand stack depth
    pub max_stack: u16,
    /// Local variable slots
    pub max_locals: u16,
    /// Absolute offset of the first instruction
    pub code_offset: usize,
    /// Length of the code array
    pub code_length: usize,
}

/// Parsed class file borrowing the original bytes
#[derive(Debug, Clone)]
pub struct ClassFile<'a> {
    raw: &'a [u8],
    minor_version: u16,
    major_version: u16,
    pool: ConstantPool,
    pool_end: usize,
    access_flags: u16,
    this_class: u16,
    super_class: u16,
    interfaces: Vec<u16>,
    fields: Vec<MemberInfo>,
    methods: Vec<MemberInfo>,
    attributes: Vec<AttributeInfo>,
}

impl<'a> ClassFile<'a> {
    /// Parse the structure of a class file
    ///
    /// # Errors
    ///
    /// Fails on a bad magic number, truncated input, or unknown constant
    /// tags. Trailing bytes after the class attributes are rejected.
    pub fn parse(raw: &'a [u8]) -> ClassFileResult<Self> {
        let mut r = ByteReader::new(raw);

        let magic = r.u32()?;
        if magic != MAGIC {
            return Err(ClassFileError::BadMagic(magic));
        }
        let minor_version = r.u16()?;
        let major_version = r.u16()?;

        let pool = ConstantPool::parse(&mut r)?;
        let pool_end = r.position();

        let access_flags = r.u16()?;
        let this_class = r.u16()?;
        let super_class = r.u16()?;

        let interface_count = r.u16()?;
        let interfaces = (0..interface_count)
            .map(|_| r.u16())
            .collect::<ClassFileResult<Vec<_>>>()?;

        let fields = parse_members(&mut r)?;
        let methods = parse_members(&mut r)?;
        let attributes = parse_attributes(&mut r)?;

        if r.position() != raw.len() {
            return Err(ClassFileError::Malformed {
                context: "trailing class data",
                offset: r.position(),
            });
        }

        Ok(Self {
            raw,
            minor_version,
            major_version,
            pool,
            pool_end,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
        })
    }

    /// Original bytes
    #[inline]
    #[must_use]
    pub fn raw(&self) -> &'a [u8] {
        self.raw
    }

    /// `(major, minor)` version
    #[inline]
    #[must_use]
    pub fn version(&self) -> (u16, u16) {
        (self.major_version, self.minor_version)
    }

    /// Decoded constant pool
    #[inline]
    #[must_use]
    pub fn constant_pool(&self) -> &ConstantPool {
        &self.pool
    }

    /// Offset of the first byte after the constant pool
    #[inline]
    #[must_use]
    pub fn constant_pool_end(&self) -> usize {
        self.pool_end
    }

    /// Class access flags
    #[inline]
    #[must_use]
    pub fn access_flags(&self) -> u16 {
        self.access_flags
    }

    /// Internal name of this class (`a/b/C`)
    ///
    /// # Errors
    ///
    /// Fails when `this_class` does not point at a Class constant.
    pub fn this_class_name(&self) -> ClassFileResult<&str> {
        self.pool.class_name(self.this_class)
    }

    /// Internal name of the superclass, `None` for `java/lang/Object`
    ///
    /// # Errors
    ///
    /// Fails when `super_class` is non-zero and not a Class constant.
    pub fn super_class_name(&self) -> ClassFileResult<Option<&str>> {
        if self.super_class == 0 {
            return Ok(None);
        }
        self.pool.class_name(self.super_class).map(Some)
    }

    /// Interface Class indices
    #[inline]
    #[must_use]
    pub fn interfaces(&self) -> &[u16] {
        &self.interfaces
    }

    /// Field headers
    #[inline]
    #[must_use]
    pub fn fields(&self) -> &[MemberInfo] {
        &self.fields
    }

    /// Method headers
    #[inline]
    #[must_use]
    pub fn methods(&self) -> &[MemberInfo] {
        &self.methods
    }

    /// Class-level attributes
    #[inline]
    #[must_use]
    pub fn attributes(&self) -> &[AttributeInfo] {
        &self.attributes
    }

    /// Member name
    ///
    /// # Errors
    ///
    /// Fails on a broken name index.
    pub fn member_name(&self, member: &MemberInfo) -> ClassFileResult<&str> {
        self.pool.utf8(member.name_index)
    }

    /// Member descriptor
    ///
    /// # Errors
    ///
    /// Fails on a broken descriptor index.
    pub fn member_descriptor(&self, member: &MemberInfo) -> ClassFileResult<&str> {
        self.pool.utf8(member.descriptor_index)
    }

    /// Payload bytes of an attribute
    #[inline]
    #[must_use]
    pub fn attribute_data(&self, attribute: &AttributeInfo) -> &'a [u8] {
        &self.raw[attribute.offset..attribute.offset + attribute.length]
    }

    /// First attribute called `name`
    ///
    /// # Errors
    ///
    /// Fails when an attribute name index is broken.
    pub fn find_attribute<'m>(
        &self,
        attributes: &'m [AttributeInfo],
        name: &str,
    ) -> ClassFileResult<Option<&'m AttributeInfo>> {
        for attribute in attributes {
            if self.pool.utf8(attribute.name_index)? == name {
                return Ok(Some(attribute));
            }
        }
        Ok(None)
    }

    /// Value of a field's `ConstantValue` attribute
    ///
    /// # Errors
    ///
    /// Fails when the attribute is malformed.
    pub fn constant_value(&self, field: &MemberInfo) -> ClassFileResult<Option<&Constant>> {
        let Some(attribute) = self.find_attribute(&field.attributes, "ConstantValue")? else {
            return Ok(None);
        };
        if attribute.length != 2 {
            return Err(ClassFileError::Malformed {
                context: "ConstantValue attribute",
                offset: attribute.offset,
            });
        }
        let data = self.attribute_data(attribute);
        let index = u16::from_be_bytes([data[0], data[1]]);
        self.pool.get(index).map(Some)
    }

    /// Static fields initialized with an integer constant, in declaration order
    ///
    /// # Errors
    ///
    /// Fails when a field header or its `ConstantValue` is malformed.
    pub fn static_int_constants(&self) -> ClassFileResult<Vec<(&str, i32)>> {
        let mut out = Vec::new();
        for field in self.fields.iter().filter(|f| f.is_static()) {
            if let Some(Constant::Integer(value)) = self.constant_value(field)? {
                out.push((self.member_name(field)?, *value));
            }
        }
        Ok(out)
    }

    /// Locate a method's `Code` attribute; `None` for abstract and native methods
    ///
    /// # Errors
    ///
    /// Fails when the attribute header is truncated or its code length
    /// exceeds the attribute.
    pub fn code(&self, method: &MemberInfo) -> ClassFileResult<Option<CodeAttribute>> {
        let Some(attribute) = self.find_attribute(&method.attributes, "Code")? else {
            return Ok(None);
        };
        let mut r = ByteReader::new(self.attribute_data(attribute));
        let max_stack = r.u16()?;
        let max_locals = r.u16()?;
        let code_length = r.u32()? as usize;
        if code_length > attribute.length.saturating_sub(8) {
            return Err(ClassFileError::Malformed {
                context: "Code attribute",
                offset: attribute.offset,
            });
        }
        Ok(Some(CodeAttribute {
            max_stack,
            max_locals,
            code_offset: attribute.offset + 8,
            code_length,
        }))
    }

    /// Bytecode of a located `Code` attribute
    #[inline]
    #[must_use]
    pub fn code_bytes(&self, code: &CodeAttribute) -> &'a [u8] {
        &self.raw[code.code_offset..code.code_offset + code.code_length]
    }
}

fn parse_members(r: &mut ByteReader<'_>) -> ClassFileResult<Vec<MemberInfo>> {
    let count = r.u16()?;
    let mut members = Vec::with_capacity(usize::from(count));
    for _ in 0..count {
        members.push(MemberInfo {
            access_flags: r.u16()?,
            name_index: r.u16()?,
            descriptor_index: r.u16()?,
            attributes: parse_attributes(r)?,
        });
    }
    Ok(members)
}

fn parse_attributes(r: &mut ByteReader<'_>) -> ClassFileResult<Vec<AttributeInfo>> {
    let count = r.u16()?;
    let mut attributes = Vec::with_capacity(usize::from(count));
    for _ in 0..count {
        let name_index = r.u16()?;
        let length = r.u32()? as usize;
        let offset = r.position();
        r.skip(length)?;
        attributes.push(AttributeInfo {
            name_index,
            offset,
            length,
        });
    }
    Ok(attributes)
}
