//! Big-endian cursor over class-file bytes

use crate::error::{ClassFileError, ClassFileResult};

pub(crate) struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    #[inline]
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    #[inline]
    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn bytes(&mut self, len: usize) -> ClassFileResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or(ClassFileError::UnexpectedEof {
                offset: self.pos,
                wanted: len,
            })?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    #[inline]
    pub(crate) fn skip(&mut self, len: usize) -> ClassFileResult<()> {
        self.bytes(len).map(|_| ())
    }

    #[inline]
    pub(crate) fn u8(&mut self) -> ClassFileResult<u8> {
        Ok(self.bytes(1)?[0])
    }

    #[inline]
    pub(crate) fn u16(&mut self) -> ClassFileResult<u16> {
        let b = self.bytes(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    #[inline]
    pub(crate) fn u32(&mut self) -> ClassFileResult<u32> {
        let b = self.bytes(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    #[inline]
    pub(crate) fn i32(&mut self) -> ClassFileResult<i32> {
        self.u32().map(|v| v as i32)
    }

    #[inline]
    pub(crate) fn u64(&mut self) -> ClassFileResult<u64> {
        let hi = u64::from(self.u32()?);
        let lo = u64::from(self.u32()?);
        Ok((hi << 32) | lo)
    }
}

/// Read a big-endian i32 at an absolute offset
pub(crate) fn i32_at(data: &[u8], offset: usize) -> ClassFileResult<i32> {
    let mut reader = ByteReader::new(data);
    reader.skip(offset)?;
    reader.i32()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_big_endian() {
        let data = [0xca, 0xfe, 0xba, 0xbe, 0x00, 0x34, 0xff];
        let mut r = ByteReader::new(&data);
        assert_eq!(r.u32().unwrap(), 0xcafe_babe);
        assert_eq!(r.u16().unwrap(), 0x34);
        assert_eq!(r.u8().unwrap(), 0xff);
        assert_eq!(r.position(), 7);
    }

    #[test]
    fn eof_reports_offset() {
        let data = [0u8; 3];
        let mut r = ByteReader::new(&data);
        r.u16().unwrap();
        assert_eq!(
            r.u16(),
            Err(ClassFileError::UnexpectedEof { offset: 2, wanted: 2 })
        );
    }

    #[test]
    fn absolute_i32() {
        let data = [0, 0, 0xff, 0xff, 0xff, 0xfe];
        assert_eq!(i32_at(&data, 2).unwrap(), -2);
        assert!(i32_at(&data, 3).is_err());
    }
}
