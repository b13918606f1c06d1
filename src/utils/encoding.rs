// Canonical byte layout for every hash input in the ledger.
// Integers are fixed-width big-endian, byte strings carry a u64 length prefix,
// and fields are appended strictly in call order.

pub fn u64_be(n: u64) -> [u8; 8] {
    n.to_be_bytes()
}

pub fn i64_be(n: i64) -> [u8; 8] {
    n.to_be_bytes()
}

#[derive(Debug, Default)]
pub struct CanonicalEncoder {
    buf: Vec<u8>,
}

impl CanonicalEncoder {
    pub fn new() -> CanonicalEncoder {
        CanonicalEncoder { buf: Vec::new() }
    }

    pub fn put_u64(&mut self, n: u64) -> &mut Self {
        self.buf.extend_from_slice(&u64_be(n));
        self
    }

    pub fn put_i64(&mut self, n: i64) -> &mut Self {
        self.buf.extend_from_slice(&i64_be(n));
        self
    }

    /// Length-prefixed byte string
    pub fn put_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.put_u64(bytes.len() as u64);
        self.buf.extend_from_slice(bytes);
        self
    }

    /// Raw bytes with no prefix. Only for fields whose width is fixed by position.
    pub fn put_raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integers_are_big_endian() {
        assert_eq!(u64_be(1), [0, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(i64_be(-1), [0xFF; 8]);
    }

    #[test]
    fn test_length_prefix_disambiguates() {
        let mut a = CanonicalEncoder::new();
        a.put_bytes(b"ab").put_bytes(b"c");
        let mut b = CanonicalEncoder::new();
        b.put_bytes(b"a").put_bytes(b"bc");
        assert_ne!(a.finish(), b.finish());
    }

    #[test]
    fn test_field_order_is_preserved() {
        let mut enc = CanonicalEncoder::new();
        enc.put_u64(7).put_raw(&[9, 9]).put_i64(-1);
        let bytes = enc.finish();
        assert_eq!(bytes.len(), 18);
        assert_eq!(&bytes[..8], &u64_be(7));
        assert_eq!(&bytes[8..10], &[9, 9]);
        assert_eq!(&bytes[10..], &[0xFF; 8]);
    }
}
