//! # Byte Generators
//!
//! A generator produces the bytes of one message component. Its length is
//! known up front and never depends on how often or how far it has been
//! read, so lengths computed from one call to `values` agree with whatever a
//! later transmission step re-derives.

use bytes::Bytes;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use settings::Settings;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

static ALL_BYTES: [u8; 256] = {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = i as u8;
        i += 1;
    }
    table
};

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const PUNCTUATION: &[u8] = b"!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";
const WHITESPACE: &[u8] = b" \t\n\r\x0b\x0c";
const PRINTABLE: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ\
!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~ \t\n\r\x0b\x0c";

/// Alphabet a random generator draws from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DataType {
    AsciiLetters,
    AsciiLowercase,
    AsciiUppercase,
    Digits,
    HexDigits,
    OctDigits,
    Punctuation,
    Whitespace,
    Ascii,
    #[default]
    Bytes,
}

impl DataType {
    pub const ALL: [DataType; 10] = [
        DataType::AsciiLetters,
        DataType::AsciiLowercase,
        DataType::AsciiUppercase,
        DataType::Digits,
        DataType::HexDigits,
        DataType::OctDigits,
        DataType::Punctuation,
        DataType::Whitespace,
        DataType::Ascii,
        DataType::Bytes,
    ];

    /// Name used in specification text
    pub fn name(&self) -> &'static str {
        match self {
            DataType::AsciiLetters => "ascii_letters",
            DataType::AsciiLowercase => "ascii_lowercase",
            DataType::AsciiUppercase => "ascii_uppercase",
            DataType::Digits => "digits",
            DataType::HexDigits => "hexdigits",
            DataType::OctDigits => "octdigits",
            DataType::Punctuation => "punctuation",
            DataType::Whitespace => "whitespace",
            DataType::Ascii => "ascii",
            DataType::Bytes => "bytes",
        }
    }

    pub fn alphabet(&self) -> &'static [u8] {
        match self {
            DataType::AsciiLetters => LETTERS,
            DataType::AsciiLowercase => &LETTERS[..26],
            DataType::AsciiUppercase => &LETTERS[26..],
            DataType::Digits => b"0123456789",
            DataType::HexDigits => b"0123456789abcdefABCDEF",
            DataType::OctDigits => b"01234567",
            DataType::Punctuation => PUNCTUATION,
            DataType::Whitespace => WHITESPACE,
            DataType::Ascii => PRINTABLE,
            DataType::Bytes => &ALL_BYTES,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DataType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataType::ALL
            .iter()
            .copied()
            .find(|d| d.name() == s)
            .ok_or_else(|| format!("unknown data type '{}'", s))
    }
}

/// Derive a seed for one consumer of randomness
///
/// With a configured seed the result depends only on that seed and the
/// discriminator. Values with different specs get different seeds; values
/// sharing a spec (`h@4=@4`) produce identical content. Without a configured
/// seed, a fresh one is drawn on every call.
pub fn derive_seed(settings: &Settings, discriminator: &str) -> u64 {
    match settings.seed {
        Some(seed) => {
            let tag = u64::from(crc32fast::hash(discriminator.as_bytes()));
            seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ tag
        }
        None => rand::random(),
    }
}

/// Random content of a fixed length, reproducible from its seed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RandomGenerator {
    datatype: DataType,
    length: usize,
    seed: u64,
}

impl RandomGenerator {
    pub fn new(datatype: DataType, length: usize, seed: u64) -> Self {
        Self {
            datatype,
            length,
            seed,
        }
    }

    pub fn datatype(&self) -> DataType {
        self.datatype
    }

    fn slice(&self, range: Range<usize>) -> Bytes {
        let alphabet = self.datatype.alphabet();
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut out = Vec::with_capacity(range.len());
        for i in 0..range.end {
            let b = alphabet[rng.gen_range(0..alphabet.len())];
            if i >= range.start {
                out.push(b);
            }
        }
        Bytes::from(out)
    }
}

/// Producer of one component's bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generator {
    Literal(Bytes),
    Random(RandomGenerator),
}

impl Generator {
    pub fn literal(data: impl Into<Bytes>) -> Self {
        Generator::Literal(data.into())
    }

    pub fn len(&self) -> usize {
        match self {
            Generator::Literal(data) => data.len(),
            Generator::Random(random) => random.length,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes in `range`, clamped to the generator length
    pub fn slice(&self, range: Range<usize>) -> Bytes {
        let end = range.end.min(self.len());
        let start = range.start.min(end);
        match self {
            Generator::Literal(data) => data.slice(start..end),
            Generator::Random(random) => random.slice(start..end),
        }
    }

    /// Every byte of the generator
    pub fn to_bytes(&self) -> Bytes {
        self.slice(0..self.len())
    }
}

impl From<&'static [u8]> for Generator {
    fn from(data: &'static [u8]) -> Self {
        Generator::Literal(Bytes::from_static(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_generator() {
        let g = Generator::literal(&b"hello"[..]);
        assert_eq!(g.len(), 5);
        assert_eq!(&g.slice(1..3)[..], b"el");
        assert_eq!(&g.slice(3..100)[..], b"lo");
        assert_eq!(&g.slice(10..20)[..], b"");
    }

    #[test]
    fn test_random_generator_is_repeatable() {
        let g = Generator::Random(RandomGenerator::new(DataType::Digits, 64, 42));
        assert_eq!(g.len(), 64);
        assert_eq!(g.to_bytes(), g.to_bytes());
        assert!(g.to_bytes().iter().all(|b| b.is_ascii_digit()));
    }

    #[test]
    fn test_random_slice_matches_full_content() {
        let g = Generator::Random(RandomGenerator::new(DataType::Bytes, 32, 7));
        let full = g.to_bytes();
        assert_eq!(g.slice(10..20), full.slice(10..20));
    }

    #[test]
    fn test_datatype_names() {
        for d in DataType::ALL {
            assert_eq!(d.name().parse::<DataType>().unwrap(), d);
        }
        assert_eq!(DataType::Bytes.alphabet().len(), 256);
        assert_eq!(DataType::Ascii.alphabet().len(), 100);
        assert!("nope".parse::<DataType>().is_err());
    }

    #[test]
    fn test_derive_seed() {
        let seeded = Settings::default().with_seed(3);
        assert_eq!(derive_seed(&seeded, "a"), derive_seed(&seeded, "a"));
        assert_ne!(derive_seed(&seeded, "a"), derive_seed(&seeded, "b"));
        // Same discriminator, same content
        let spec = "@4b,bytes";
        let a = RandomGenerator::new(DataType::Bytes, 4, derive_seed(&seeded, spec));
        let b = RandomGenerator::new(DataType::Bytes, 4, derive_seed(&seeded, spec));
        assert_eq!(Generator::Random(a).to_bytes(), Generator::Random(b).to_bytes());
    }
}
