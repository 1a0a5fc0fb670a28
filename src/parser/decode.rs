//! Lenient text decoders tried in order

/// A byte-to-text decoder that drops what it cannot represent instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoder {
    /// 7-bit ASCII; bytes >= 0x80 are dropped.
    Ascii,
    /// UTF-8; invalid sequences are dropped.
    Utf8,
    /// ISO-8859-1; every byte maps to the code point of the same value.
    Latin1,
}

impl Decoder {
    /// Order in which decoders are attempted.
    pub const DEFAULT_ORDER: [Decoder; 3] = [Decoder::Ascii, Decoder::Utf8, Decoder::Latin1];

    /// Decode `bytes`, suppressing per-byte errors.
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            Decoder::Ascii => bytes
                .iter()
                .filter(|b| b.is_ascii())
                .map(|&b| char::from(b))
                .collect(),
            Decoder::Utf8 => bytes.utf8_chunks().map(|chunk| chunk.valid()).collect(),
            Decoder::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Decoder::Ascii => "ascii",
            Decoder::Utf8 => "utf-8",
            Decoder::Latin1 => "latin-1",
        }
    }
}

/// Try each decoder in turn; the first that yields non-blank text wins.
///
/// Returns the trimmed text and the decoder that produced it.
pub fn decode_first(decoders: &[Decoder], bytes: &[u8]) -> Option<(String, Decoder)> {
    decoders.iter().find_map(|&decoder| {
        let text = decoder.decode(bytes);
        let trimmed = text.trim();
        (!trimmed.is_empty()).then(|| (trimmed.to_string(), decoder))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_drops_high_bytes() {
        assert_eq!(Decoder::Ascii.decode(b"12\xff3"), "123");
    }

    #[test]
    fn utf8_drops_invalid_sequences() {
        assert_eq!(Decoder::Utf8.decode(b"a\xc3\xa9\xffb"), "a\u{e9}b");
    }

    #[test]
    fn latin1_maps_every_byte() {
        assert_eq!(Decoder::Latin1.decode(&[0xE9, 0xFF]), "\u{e9}\u{ff}");
    }

    #[test]
    fn ascii_wins_when_it_produces_text() {
        let (text, decoder) = decode_first(&Decoder::DEFAULT_ORDER, b"  120,80 \r").unwrap();
        assert_eq!(text, "120,80");
        assert_eq!(decoder, Decoder::Ascii);
    }

    #[test]
    fn falls_through_to_later_decoders() {
        // Valid UTF-8 with no ASCII content.
        let (text, decoder) = decode_first(&Decoder::DEFAULT_ORDER, "\u{e9}".as_bytes()).unwrap();
        assert_eq!(text, "\u{e9}");
        assert_eq!(decoder, Decoder::Utf8);

        // Invalid UTF-8 and no ASCII: only Latin-1 produces something.
        let (text, decoder) = decode_first(&Decoder::DEFAULT_ORDER, &[0xFF]).unwrap();
        assert_eq!(text, "\u{ff}");
        assert_eq!(decoder, Decoder::Latin1);
    }

    #[test]
    fn blank_input_decodes_to_nothing() {
        assert!(decode_first(&Decoder::DEFAULT_ORDER, b"").is_none());
        assert!(decode_first(&Decoder::DEFAULT_ORDER, b" \t ").is_none());
        assert!(decode_first(&[Decoder::Ascii], &[0x80, 0x81]).is_none());
    }
}
