use byteorder::{BigEndian, ByteOrder};

use crate::{ClassFileError, Result};

type Endian = BigEndian;

/// Forward-only reader over a borrowed class file image.
///
/// A read that does not fit into the buffer fails with
/// [`ClassFileError::OutOfBounds`] and leaves the position untouched.
pub struct ByteCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn read_u1(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_i1(&mut self) -> Result<i8> {
        Ok(self.read_u1()? as i8)
    }

    pub fn read_u2(&mut self) -> Result<u16> {
        Ok(Endian::read_u16(self.take(2)?))
    }

    pub fn read_i2(&mut self) -> Result<i16> {
        Ok(Endian::read_i16(self.take(2)?))
    }

    pub fn read_u4_raw(&mut self) -> Result<[u8; 4]> {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(self.take(4)?);
        Ok(raw)
    }

    pub fn read_u4(&mut self) -> Result<u32> {
        Ok(Endian::read_u32(self.take(4)?))
    }

    pub fn read_i4(&mut self) -> Result<i32> {
        Ok(Endian::read_i32(self.take(4)?))
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.take(n)
    }

    /// Same as [`ByteCursor::read_bytes`], also returning the bytes decoded as text.
    ///
    /// Class files store modified UTF-8 (`C0 80` for NUL, surrogate pairs for
    /// anything outside the BMP). Bytes that are not valid modified UTF-8 are
    /// decoded lossily, with U+FFFD for the broken sequences.
    pub fn read_string(&mut self, n: usize) -> Result<(&'a [u8], String)> {
        let bytes = self.take(n)?;
        let text = match cesu8::from_java_cesu8(bytes) {
            Ok(text) => text.into_owned(),
            Err(_) => {
                log::debug!("{} bytes at offset {} are not modified UTF-8", n, self.pos - n);
                String::from_utf8_lossy(bytes).into_owned()
            }
        };
        Ok((bytes, text))
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.buf.len())
            .ok_or(ClassFileError::OutOfBounds {
                position: self.pos,
                wanted: n,
                len: self.buf.len(),
            })?;

        let bytes = &self.buf[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }
}

#[cfg(test)]
mod read_tests {
    use super::*;

    #[test]
    fn it_should_read_big_endian_values() {
        let mut cursor = ByteCursor::new(&[0x12, 0x34, 0xca, 0xfe, 0xba, 0xbe, 0xff]);

        assert_eq!(cursor.read_u2().unwrap(), 0x1234);
        assert_eq!(cursor.read_u4().unwrap(), 0xcafebabe);
        assert_eq!(cursor.read_u1().unwrap(), 0xff);
        assert!(cursor.is_empty());
    }

    #[test]
    fn it_should_read_signed_values() {
        let mut cursor = ByteCursor::new(&[0xff, 0xff, 0xfe, 0xff, 0xff, 0xff, 0x80]);

        assert_eq!(cursor.read_i2().unwrap(), -1);
        assert_eq!(cursor.read_i4().unwrap(), -16_777_217);
        assert_eq!(cursor.read_i1().unwrap(), -128);
        assert!(cursor.is_empty());
    }

    #[test]
    fn it_should_keep_the_raw_bytes_in_order() {
        let mut cursor = ByteCursor::new(&[0xca, 0xfe, 0xba, 0xbe]);

        assert_eq!(cursor.read_u4_raw().unwrap(), [0xca, 0xfe, 0xba, 0xbe]);
        assert_eq!(cursor.position(), 4);
    }
}

#[cfg(test)]
mod read_string_tests {
    use super::*;

    #[test]
    fn it_should_decode_the_same_bytes_as_text() {
        let buf = b"Hello!";

        let raw = ByteCursor::new(buf).read_bytes(6).unwrap();
        let mut cursor = ByteCursor::new(buf);
        let (bytes, text) = cursor.read_string(6).unwrap();

        assert_eq!(raw, bytes);
        assert_eq!(raw, text.as_bytes());
        assert_eq!(cursor.position(), 6);
    }

    #[test]
    fn it_should_decode_the_two_byte_nul() {
        let mut cursor = ByteCursor::new(&[b'a', 0xc0, 0x80, b'b']);
        let (bytes, text) = cursor.read_string(4).unwrap();

        assert_eq!(text, "a\0b");
        assert_eq!(bytes, &[b'a', 0xc0, 0x80, b'b']);
    }

    #[test]
    fn it_should_join_surrogate_pairs() {
        let mut cursor = ByteCursor::new(&[0xed, 0xa0, 0xbd, 0xed, 0xb8, 0x80]);

        assert_eq!(cursor.read_string(6).unwrap().1, "\u{1F600}");
    }

    #[test]
    fn it_should_fall_back_to_lossy_text() {
        let mut cursor = ByteCursor::new(&[b'a', 0xff]);

        assert_eq!(cursor.read_string(2).unwrap().1, "a\u{FFFD}");
        assert!(cursor.is_empty());
    }

    #[test]
    fn it_should_fail_if_the_text_is_truncated() {
        let mut cursor = ByteCursor::new(&[b'a']);

        assert!(matches!(
            cursor.read_string(2),
            Err(ClassFileError::OutOfBounds { position: 0, wanted: 2, len: 1 })
        ));
        assert_eq!(cursor.position(), 0);
    }
}
