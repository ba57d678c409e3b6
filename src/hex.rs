/// Value of a single ASCII hex digit.
pub const fn nibble(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// Incremental hex decoder.
///
/// Payload text may be split at any byte by the serial driver, so the high
/// nibble of a pair is carried across calls to [`HexDecoder::push`].
#[derive(Debug, Default, Clone, Copy)]
pub struct HexDecoder {
    high: Option<u8>,
}

impl HexDecoder {
    pub const fn new() -> Self {
        Self { high: None }
    }

    /// Feed one character, returning a byte once a pair completes.
    ///
    /// Characters that are not hex digits are skipped and do not break an
    /// open pair.
    pub fn push(&mut self, c: u8) -> Option<u8> {
        let n = nibble(c)?;
        match self.high.take() {
            Some(h) => Some((h << 4) | n),
            None => {
                self.high = Some(n);
                None
            }
        }
    }
}
