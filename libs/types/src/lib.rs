//! # Fray Specification Types
//!
//! ## Purpose
//!
//! Leaf types of the message-specification engine: the shared escaping
//! format, byte generators, component values and fault/timing actions.
//! Everything here is an immutable value; transformations return new values.
//!
//! ## Architecture Role
//!
//! ```text
//! settings → [types] → language
//!               ↓          ↓
//!         Values/Actions  Tokens, Messages,
//!         Generators      Nested messages
//! ```

pub mod action;
pub mod error;
pub mod escape;
pub mod generator;
pub mod value;

pub use action::{Action, Directive, Offset, PauseDuration, ScheduledAction};
pub use error::{EscapeError, EscapeResult};
pub use escape::{bytes_to_escaped_str, escaped_str_to_bytes};
pub use generator::{derive_seed, DataType, Generator, RandomGenerator};
pub use value::{
    is_naked_char, SizeUnit, Value, ValueGenerate, ValueLiteral, MAX_GENERATED_SIZE,
};
