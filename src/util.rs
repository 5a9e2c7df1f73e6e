//! Useful traits and other utilities that don't really belong anywhere else.

use std::io::{self, Read};

pub trait ReadExt {
    /// Fills `buf` like `read_exact`, but unlike `read_exact`, is forgiving of unexpected EOF.
    ///
    /// Returns how many bytes of `buf` were filled: `buf.len()` unless EOF came first. Anything
    /// past that count is left as it was.
    fn read_block(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

impl<T: Read> ReadExt for T {
    fn read_block(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut cursor = 0;
        while cursor < buf.len() {
            cursor += match self.read(&mut buf[cursor..]) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => 0,
                Err(x) => return Err(x),
            };
        }

        Ok(cursor)
    }
}

#[test]
fn test_read_block() -> io::Result<()> {
    let mut buf = [0u8; 4];
    assert_eq!(io::repeat(0xAA).read_block(&mut buf)?, 4);
    assert_eq!(buf, [0xAA; 4]);

    let mut input = &[1u8, 2, 3, 4, 5, 6][..];
    assert_eq!(input.read_block(&mut buf)?, 4);
    assert_eq!(buf, [1, 2, 3, 4]);
    assert_eq!(input.read_block(&mut buf)?, 2);
    assert_eq!(buf, [5, 6, 3, 4]);
    assert_eq!(input.read_block(&mut buf)?, 0);
    Ok(())
}

#[test]
fn test_read_block_short_reads() -> io::Result<()> {
    // Hand out one byte per read() call
    struct Trickle<'a>(&'a [u8]);
    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.0.len().min(buf.len()).min(1);
            buf[..n].copy_from_slice(&self.0[..n]);
            self.0 = &self.0[n..];
            Ok(n)
        }
    }

    let mut buf = [0u8; 3];
    let mut input = Trickle(&[7u8, 8, 9, 10]);
    assert_eq!(input.read_block(&mut buf)?, 3);
    assert_eq!(buf, [7, 8, 9]);
    assert_eq!(input.read_block(&mut buf)?, 1);
    Ok(())
}
