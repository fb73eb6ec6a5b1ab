//! # Fault and Timing Actions
//!
//! Actions are directives tied to a byte offset of the generated stream.
//! They never contribute to a message's base length; `InjectAt` adds its
//! payload to the maximum length a consumer must be prepared to buffer.
//!
//! ```text
//! p10,5     pause 5 seconds after byte 10
//! pr,f      pause forever at a random offset
//! da        disconnect after the last byte
//! i4,'xx'   inject two extra bytes at offset 4
//! ```
//!
//! Offsets `r` and `a` are symbolic until resolved against the length of the
//! message that carries the action.

use crate::generator::{derive_seed, Generator};
use crate::value::Value;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use settings::Settings;
use std::fmt;
use tracing::trace;

/// Position in the generated stream an action is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Offset {
    At(usize),
    /// Uniformly chosen inside the message
    Random,
    /// One past the end of the message
    End,
}

impl Offset {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Offset::At(_))
    }

    /// Replace a symbolic offset with a concrete one for a message of `length` bytes
    pub fn resolve(&self, length: usize, seed: u64) -> Offset {
        match self {
            Offset::At(_) => *self,
            // An empty message has no interior position; use its start
            Offset::Random if length == 0 => Offset::At(0),
            Offset::Random => Offset::At(StdRng::seed_from_u64(seed).gen_range(0..length)),
            Offset::End => Offset::At(length.saturating_add(1)),
        }
    }

    pub fn spec(&self) -> String {
        match self {
            Offset::At(n) => n.to_string(),
            Offset::Random => "r".to_string(),
            Offset::End => "a".to_string(),
        }
    }
}

/// How long a pause lasts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PauseDuration {
    Seconds(u64),
    Forever,
}

impl PauseDuration {
    pub fn spec(&self) -> String {
        match self {
            PauseDuration::Seconds(s) => s.to_string(),
            PauseDuration::Forever => "f".to_string(),
        }
    }
}

/// What a transmission layer must do when it reaches an action's offset
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Pause(PauseDuration),
    Disconnect,
    Inject(Generator),
}

/// A resolved action, ready for a transmission layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledAction {
    pub offset: usize,
    pub directive: Directive,
}

/// Fault or timing directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    PauseAt {
        offset: Offset,
        duration: PauseDuration,
    },
    DisconnectAt {
        offset: Offset,
    },
    InjectAt {
        offset: Offset,
        value: Value,
    },
}

impl Action {
    pub fn offset(&self) -> Offset {
        match self {
            Action::PauseAt { offset, .. }
            | Action::DisconnectAt { offset }
            | Action::InjectAt { offset, .. } => *offset,
        }
    }

    /// Copy of this action attached to a different offset
    pub fn with_offset(&self, offset: Offset) -> Action {
        match self {
            Action::PauseAt { duration, .. } => Action::PauseAt {
                offset,
                duration: *duration,
            },
            Action::DisconnectAt { .. } => Action::DisconnectAt { offset },
            Action::InjectAt { value, .. } => Action::InjectAt {
                offset,
                value: value.clone(),
            },
        }
    }

    pub fn spec(&self) -> String {
        match self {
            Action::PauseAt { offset, duration } => {
                format!("p{},{}", offset.spec(), duration.spec())
            }
            Action::DisconnectAt { offset } => format!("d{}", offset.spec()),
            Action::InjectAt { offset, value } => format!("i{},{}", offset.spec(), value.spec()),
        }
    }

    /// Resolve a symbolic offset against the length of the carrying message
    pub fn resolve(&self, settings: &Settings, length: usize) -> Action {
        let offset = self.offset();
        if offset.is_resolved() {
            return self.clone();
        }
        let seed = derive_seed(settings, &self.spec());
        let resolved = offset.resolve(length, seed);
        trace!(action = %self, ?resolved, length, "resolved action offset");
        self.with_offset(resolved)
    }

    /// Freeze any generated payload into a literal
    pub fn freeze(&self, settings: &Settings) -> Action {
        match self {
            Action::InjectAt { offset, value } => Action::InjectAt {
                offset: *offset,
                value: value.freeze(settings),
            },
            other => other.clone(),
        }
    }

    /// Extra bytes this action may add to the stream
    pub fn injected_len(&self, settings: &Settings) -> usize {
        match self {
            Action::InjectAt { value, .. } => value.get_generator(settings).len(),
            _ => 0,
        }
    }

    /// Transmission form; `None` while the offset is still symbolic
    pub fn intermediate(&self, settings: &Settings) -> Option<ScheduledAction> {
        let Offset::At(offset) = self.offset() else {
            return None;
        };
        let directive = match self {
            Action::PauseAt { duration, .. } => Directive::Pause(*duration),
            Action::DisconnectAt { .. } => Directive::Disconnect,
            Action::InjectAt { value, .. } => Directive::Inject(value.get_generator(settings)),
        };
        Some(ScheduledAction { offset, directive })
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.spec())
    }
}
