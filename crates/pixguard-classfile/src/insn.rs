//! Bytecode instruction walking
//!
//! Computes exact instruction lengths, including the alignment padding of
//! `tableswitch`/`lookupswitch` and the `wide` prefix, so that every
//! instruction start in a method body can be visited.

use crate::error::{ClassFileError, ClassFileResult};
use crate::reader::i32_at;

/// Opcodes referenced by name
pub mod opcode {
    #![allow(missing_docs)]
    pub const NOP: u8 = 0x00;
    pub const ICONST_0: u8 = 0x03;
    pub const BIPUSH: u8 = 0x10;
    pub const SIPUSH: u8 = 0x11;
    pub const LDC: u8 = 0x12;
    pub const LDC_W: u8 = 0x13;
    pub const ALOAD_0: u8 = 0x2a;
    pub const ALOAD_1: u8 = 0x2b;
    pub const IINC: u8 = 0x84;
    pub const TABLESWITCH: u8 = 0xaa;
    pub const LOOKUPSWITCH: u8 = 0xab;
    pub const RETURN: u8 = 0xb1;
    pub const INVOKEVIRTUAL: u8 = 0xb6;
    pub const INVOKESPECIAL: u8 = 0xb7;
    pub const INVOKESTATIC: u8 = 0xb8;
    pub const INVOKEINTERFACE: u8 = 0xb9;
    pub const WIDE: u8 = 0xc4;
}

/// One decoded instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction<'c> {
    /// Offset within the code array
    pub offset: usize,
    /// Opcode byte
    pub opcode: u8,
    /// All bytes of the instruction, opcode included
    pub bytes: &'c [u8],
}

impl Instruction<'_> {
    /// Encoded length
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Never true; instructions are at least one byte
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The u16 operand at bytes 1..3, for cp-index instructions
    #[must_use]
    pub fn u16_operand(&self) -> Option<u16> {
        match self.bytes {
            [_, hi, lo, ..] => Some(u16::from_be_bytes([*hi, *lo])),
            _ => None,
        }
    }
}

const fn fixed_length(op: u8) -> Option<usize> {
    match op {
        0x00..=0x0f => Some(1),
        0x10 => Some(2),
        0x11 => Some(3),
        0x12 => Some(2),
        0x13 | 0x14 => Some(3),
        0x15..=0x19 => Some(2),
        0x1a..=0x35 => Some(1),
        0x36..=0x3a => Some(2),
        0x3b..=0x83 => Some(1),
        0x84 => Some(3),
        0x85..=0x98 => Some(1),
        0x99..=0xa8 => Some(3),
        0xa9 => Some(2),
        0xac..=0xb1 => Some(1),
        0xb2..=0xb8 => Some(3),
        0xb9 | 0xba => Some(5),
        0xbb => Some(3),
        0xbc => Some(2),
        0xbd => Some(3),
        0xbe | 0xbf => Some(1),
        0xc0 | 0xc1 => Some(3),
        0xc2 | 0xc3 => Some(1),
        0xc5 => Some(4),
        0xc6 | 0xc7 => Some(3),
        0xc8 | 0xc9 => Some(5),
        _ => None,
    }
}

/// Length of the instruction starting at `offset`
///
/// # Errors
///
/// [`ClassFileError::InvalidOpcode`] for unknown opcodes or instructions
/// running past the end of `code`, [`ClassFileError::Malformed`] for
/// inconsistent switch tables.
pub fn instruction_length(code: &[u8], offset: usize) -> ClassFileResult<usize> {
    let op = *code.get(offset).ok_or(ClassFileError::UnexpectedEof {
        offset,
        wanted: 1,
    })?;
    let invalid = || ClassFileError::InvalidOpcode { opcode: op, offset };

    let len = match op {
        opcode::TABLESWITCH | opcode::LOOKUPSWITCH => {
            let pad = (4 - (offset + 1) % 4) % 4;
            let base = offset + 1 + pad;
            let bad_switch = || ClassFileError::Malformed {
                context: "switch table",
                offset,
            };
            let body = if op == opcode::TABLESWITCH {
                let low = i64::from(i32_at(code, base + 4).map_err(|_| bad_switch())?);
                let high = i64::from(i32_at(code, base + 8).map_err(|_| bad_switch())?);
                if high < low {
                    return Err(bad_switch());
                }
                12 + 4 * (high - low + 1)
            } else {
                let pairs = i64::from(i32_at(code, base + 4).map_err(|_| bad_switch())?);
                if pairs < 0 {
                    return Err(bad_switch());
                }
                8 + 8 * pairs
            };
            usize::try_from(body).map_err(|_| bad_switch())? + 1 + pad
        }
        opcode::WIDE => match code.get(offset + 1) {
            Some(&opcode::IINC) => 6,
            Some(0x15..=0x19 | 0x36..=0x3a | 0xa9) => 4,
            _ => return Err(invalid()),
        },
        _ => fixed_length(op).ok_or_else(invalid)?,
    };

    if offset + len > code.len() {
        return Err(invalid());
    }
    Ok(len)
}

/// Iterator over the instructions of a code array
///
/// Stops after yielding the first error.
#[derive(Debug, Clone)]
pub struct Instructions<'c> {
    code: &'c [u8],
    pos: usize,
    done: bool,
}

impl<'c> Instructions<'c> {
    /// Walk `code` from offset 0
    #[must_use]
    pub fn new(code: &'c [u8]) -> Self {
        Self {
            code,
            pos: 0,
            done: false,
        }
    }
}

impl<'c> Iterator for Instructions<'c> {
    type Item = ClassFileResult<Instruction<'c>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.pos >= self.code.len() {
            return None;
        }
        match instruction_length(self.code, self.pos) {
            Ok(len) => {
                let offset = self.pos;
                self.pos += len;
                Some(Ok(Instruction {
                    offset,
                    opcode: self.code[offset],
                    bytes: &self.code[offset..offset + len],
                }))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn offsets(code: &[u8]) -> Vec<(usize, u8)> {
        Instructions::new(code)
            .map(|i| i.map(|i| (i.offset, i.opcode)))
            .collect::<ClassFileResult<_>>()
            .unwrap()
    }

    #[test]
    fn walks_simple_sequence() {
        // aload_1, sipush 0x1234, invokevirtual #7, return
        let code = [0x2b, 0x11, 0x12, 0x34, 0xb6, 0x00, 0x07, 0xb1];
        assert_eq!(offsets(&code), vec![(0, 0x2b), (1, 0x11), (4, 0xb6), (7, 0xb1)]);
    }

    #[test]
    fn tableswitch_padding_depends_on_offset() {
        // nop at 0, tableswitch at 1: pad 2, default, low=0, high=1, two offsets
        let mut code = vec![0x00, 0xaa, 0, 0];
        code.extend_from_slice(&[0, 0, 0, 20]);
        code.extend_from_slice(&0i32.to_be_bytes());
        code.extend_from_slice(&1i32.to_be_bytes());
        code.extend_from_slice(&[0, 0, 0, 20, 0, 0, 0, 20]);
        code.push(0xb1);
        assert_eq!(instruction_length(&code, 1).unwrap(), 1 + 2 + 12 + 8);
        assert_eq!(offsets(&code).last(), Some(&(24, 0xb1)));
    }

    #[test]
    fn lookupswitch_length() {
        // lookupswitch at 3: no pad, default, npairs=1, one pair
        let mut code = vec![0x00, 0x00, 0x00, 0xab];
        code.extend_from_slice(&[0, 0, 0, 9]);
        code.extend_from_slice(&1i32.to_be_bytes());
        code.extend_from_slice(&[0, 0, 0, 5, 0, 0, 0, 9]);
        code.push(0xb1);
        assert_eq!(instruction_length(&code, 3).unwrap(), 1 + 8 + 8);
    }

    #[test]
    fn wide_forms() {
        assert_eq!(instruction_length(&[0xc4, 0x84, 0, 1, 0, 1], 0).unwrap(), 6);
        assert_eq!(instruction_length(&[0xc4, 0x15, 0, 1], 0).unwrap(), 4);
        assert!(instruction_length(&[0xc4, 0xb1, 0, 1], 0).is_err());
    }

    #[test]
    fn rejects_unknown_and_truncated() {
        assert_eq!(
            instruction_length(&[0xfe], 0),
            Err(ClassFileError::InvalidOpcode { opcode: 0xfe, offset: 0 })
        );
        assert!(instruction_length(&[0xb6, 0x00], 0).is_err());

        let mut walk = Instructions::new(&[0xb1, 0xcb, 0xb1]);
        assert!(walk.next().unwrap().is_ok());
        assert!(walk.next().unwrap().is_err());
        assert!(walk.next().is_none());
    }

    #[test]
    fn u16_operand() {
        let code = [0xb6, 0x01, 0x02];
        let insn = Instructions::new(&code).next().unwrap().unwrap();
        assert_eq!(insn.u16_operand(), Some(0x0102));
    }

    proptest! {
        #[test]
        fn walker_never_overruns(code in proptest::collection::vec(any::<u8>(), 0..256)) {
            let mut end = 0;
            for insn in Instructions::new(&code) {
                match insn {
                    Ok(insn) => {
                        prop_assert_eq!(insn.offset, end);
                        end = insn.offset + insn.len();
                    }
                    Err(_) => break,
                }
            }
            prop_assert!(end <= code.len());
        }
    }
}
