//! Byte sinks for serialization
//!
//! [`Target`] is the write-side dual of [`Parser`](crate::parse::Parser): the
//! canonical encoder appends to any `Target` and reports how many bytes it
//! wrote, which lets the same code both fill a buffer and measure a value
//! without allocating (via [`ByteCounter`]).

pub trait Target {
    /// Hints that at least `extra` more bytes are about to be pushed
    fn anticipate(&mut self, extra: usize);

    fn push_one(&mut self, b: u8) -> usize;

    fn push_all(&mut self, buf: &[u8]) -> usize;

    fn create() -> Self;

    /// Appends a CBOR initial byte for major type `major` together with its
    /// argument, using the shortest form that can hold `arg`.
    fn push_head(&mut self, major: u8, arg: u64) -> usize {
        let mt = major << 5;
        match arg {
            0..=23 => self.push_one(mt | arg as u8),
            24..=0xff => self.push_one(mt | 24) + self.push_one(arg as u8),
            0x100..=0xffff => self.push_one(mt | 25) + self.push_all(&(arg as u16).to_be_bytes()),
            0x1_0000..=0xffff_ffff => {
                self.push_one(mt | 26) + self.push_all(&(arg as u32).to_be_bytes())
            }
            _ => self.push_one(mt | 27) + self.push_all(&arg.to_be_bytes()),
        }
    }
}

/// Target that discards its input, counting bytes only
pub type ByteCounter = std::io::Sink;

impl Target for ByteCounter {
    #[inline]
    fn anticipate(&mut self, _: usize) {}

    #[inline]
    fn push_one(&mut self, _: u8) -> usize {
        1
    }

    #[inline]
    fn push_all(&mut self, buf: &[u8]) -> usize {
        buf.len()
    }

    fn create() -> Self {
        std::io::sink()
    }
}

impl Target for Vec<u8> {
    #[inline]
    fn push_one(&mut self, b: u8) -> usize {
        self.push(b);
        1
    }

    #[inline]
    fn push_all(&mut self, buf: &[u8]) -> usize {
        self.extend_from_slice(buf);
        buf.len()
    }

    #[inline]
    fn anticipate(&mut self, extra: usize) {
        self.reserve(extra)
    }

    fn create() -> Self {
        Self::new()
    }
}
