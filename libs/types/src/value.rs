//! # Specification Values
//!
//! The payload side of a component: a quoted literal, an unquoted ("naked")
//! literal, or a generated value of a given size and alphabet.
//!
//! ```text
//! 'abc\x27'      → Literal   bytes after escape decoding
//! /path          → Naked     unquoted, escapes decoded like a literal
//! @10k,digits    → Generate  10 * 1024 random digits
//! ```
//!
//! Freezing replaces a generated value with a literal holding the bytes it
//! produced, so the resulting spec replays the same content.

use crate::error::EscapeResult;
use crate::escape::{bytes_to_escaped_str, escaped_str_to_bytes};
use crate::generator::{derive_seed, DataType, Generator, RandomGenerator};
use bytes::Bytes;
use settings::Settings;
use std::fmt;
use std::str::FromStr;

/// Literal bytes, stored unescaped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueLiteral {
    val: Bytes,
}

impl ValueLiteral {
    pub fn new(val: impl Into<Bytes>) -> Self {
        Self { val: val.into() }
    }

    /// Build from escaped text as it appears between quotes
    pub fn from_escaped(text: &str) -> EscapeResult<Self> {
        Ok(Self::new(escaped_str_to_bytes(text)?))
    }

    pub fn bytes(&self) -> &Bytes {
        &self.val
    }

    pub fn get_generator(&self) -> Generator {
        Generator::Literal(self.val.clone())
    }

    /// Single-quoted spec; embedded quotes become `\x27`
    pub fn spec(&self) -> String {
        let inner = bytes_to_escaped_str(&self.val, false, false).replace('\'', "\\x27");
        format!("'{}'", inner)
    }

    /// Unquoted spec used by naked literals
    ///
    /// Falls back to the quoted form when the escaped bytes contain a
    /// character a naked value cannot hold.
    pub fn naked_spec(&self) -> String {
        let escaped = bytes_to_escaped_str(&self.val, false, false);
        if !escaped.is_empty() && escaped.chars().all(is_naked_char) {
            escaped
        } else {
            self.spec()
        }
    }
}

/// Characters allowed in an unquoted value
pub fn is_naked_char(c: char) -> bool {
    c.is_ascii_graphic() && !matches!(c, ',' | ':' | '@' | '\'' | '"')
}

/// Size multiplier suffix of a generated value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SizeUnit {
    #[default]
    B,
    K,
    M,
    G,
    T,
}

impl SizeUnit {
    pub fn multiplier(&self) -> usize {
        match self {
            SizeUnit::B => 1,
            SizeUnit::K => 1 << 10,
            SizeUnit::M => 1 << 20,
            SizeUnit::G => 1 << 30,
            SizeUnit::T => 1 << 40,
        }
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            SizeUnit::B => "b",
            SizeUnit::K => "k",
            SizeUnit::M => "m",
            SizeUnit::G => "g",
            SizeUnit::T => "t",
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'b' => Some(SizeUnit::B),
            'k' => Some(SizeUnit::K),
            'm' => Some(SizeUnit::M),
            'g' => Some(SizeUnit::G),
            't' => Some(SizeUnit::T),
            _ => None,
        }
    }
}

/// Largest generated value the grammar accepts, in bytes (1 GiB)
pub const MAX_GENERATED_SIZE: usize = 1 << 30;

/// Random content of `size * unit` bytes drawn from `datatype`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueGenerate {
    pub size: usize,
    pub unit: SizeUnit,
    pub datatype: DataType,
}

impl ValueGenerate {
    pub fn new(size: usize, unit: SizeUnit, datatype: DataType) -> Self {
        Self {
            size,
            unit,
            datatype,
        }
    }

    /// Total byte count, saturating at `usize::MAX`
    pub fn bytes(&self) -> usize {
        self.size.saturating_mul(self.unit.multiplier())
    }

    /// Whether the value fits under [`MAX_GENERATED_SIZE`]
    pub fn within_limit(&self) -> bool {
        self.bytes() <= MAX_GENERATED_SIZE
    }

    pub fn spec(&self) -> String {
        format!("@{}{},{}", self.size, self.unit.suffix(), self.datatype)
    }

    pub fn get_generator(&self, settings: &Settings) -> Generator {
        let seed = derive_seed(settings, &self.spec());
        Generator::Random(RandomGenerator::new(self.datatype, self.bytes(), seed))
    }
}

impl FromStr for SizeUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next().and_then(SizeUnit::from_char), chars.next()) {
            (Some(unit), None) => Ok(unit),
            _ => Err(format!("unknown size unit '{}'", s)),
        }
    }
}

/// Any value a component can carry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Literal(ValueLiteral),
    Naked(ValueLiteral),
    Generate(ValueGenerate),
}

impl Value {
    /// Quoted literal holding `data`
    pub fn literal(data: impl Into<Bytes>) -> Self {
        Value::Literal(ValueLiteral::new(data))
    }

    pub fn get_generator(&self, settings: &Settings) -> Generator {
        match self {
            Value::Literal(lit) | Value::Naked(lit) => lit.get_generator(),
            Value::Generate(gen) => gen.get_generator(settings),
        }
    }

    pub fn spec(&self) -> String {
        match self {
            Value::Literal(lit) => lit.spec(),
            Value::Naked(lit) => lit.naked_spec(),
            Value::Generate(gen) => gen.spec(),
        }
    }

    /// Replace generated content with the literal bytes it produces
    pub fn freeze(&self, settings: &Settings) -> Value {
        match self {
            Value::Generate(gen) => {
                Value::Literal(ValueLiteral::new(gen.get_generator(settings).to_bytes()))
            }
            other => other.clone(),
        }
    }

    /// Literal bytes, when the value is not generated
    pub fn literal_bytes(&self) -> Option<&Bytes> {
        match self {
            Value::Literal(lit) | Value::Naked(lit) => Some(lit.bytes()),
            Value::Generate(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.spec())
    }
}
