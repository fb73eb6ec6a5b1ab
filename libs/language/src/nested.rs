//! # Nested Messages
//!
//! Embeds a complete specification of another message kind inside an outer
//! message as a single escaped literal, e.g. a crafted response carried by a
//! request:
//!
//! ```text
//! get:/p/:s'200:b\x27hello\x27'
//!         └─ preamble "s" + literal, parsed as a Response ─┘
//! ```
//!
//! The literal stays the source of truth and is what the outer message
//! serializes. The parsed inner message exists for structural validation and
//! for freezing; it is rebuilt, never mutated.

use crate::error::{SpecError, SpecResult};
use crate::message::Message;
use crate::parser::{line_column, Parse};
use settings::Settings;
use tracing::debug;
use types::{Generator, ValueLiteral};

/// A literal parsed as an independent message of kind `M`
#[derive(Debug, Clone, PartialEq)]
pub struct NestedMessage<M: Parse> {
    value: ValueLiteral,
    parsed: M,
}

impl<M: Parse + Eq> Eq for NestedMessage<M> {}

impl<M: Parse> NestedMessage<M> {
    /// Parse the literal's decoded text as `M`
    ///
    /// Grammar failures are returned unchanged, positions relative to the
    /// decoded inner text. The outer parser adds the literal's own position.
    pub fn new(value: ValueLiteral) -> SpecResult<Self> {
        let text = std::str::from_utf8(value.bytes()).map_err(|e| {
            let valid = String::from_utf8_lossy(&value.bytes()[..e.valid_up_to()]);
            let (line, column) = line_column(&valid, valid.len());
            SpecError::parse("Nested message is not valid UTF-8", line, column)
        })?;
        let parsed = M::parse(text)?;
        Ok(Self { value, parsed })
    }

    pub fn value(&self) -> &ValueLiteral {
        &self.value
    }

    pub fn parsed(&self) -> &M {
        &self.parsed
    }

    /// The outer literal's bytes, not the re-expanded inner message
    pub fn values(&self, _settings: &Settings) -> Vec<Generator> {
        vec![self.value.get_generator()]
    }

    pub fn spec(&self) -> String {
        format!("{}{}", M::NESTED_PREAMBLE, self.value.spec())
    }

    /// Freeze the inner message and embed its spec as the new literal
    ///
    /// The literal stores the frozen spec unescaped; quoting and escaping of
    /// embedded quotes happen when the literal renders its own spec.
    pub fn freeze(&self, settings: &Settings) -> Self {
        let frozen = self.parsed.freeze(settings);
        let spec = frozen.spec();
        debug!(preamble = M::NESTED_PREAMBLE, len = spec.len(), "nested message frozen");
        Self {
            value: ValueLiteral::new(spec.into_bytes()),
            parsed: frozen,
        }
    }
}
