//! # Fray Language - Message Composition Engine
//!
//! ## Purpose
//!
//! Turns declarative message specifications into validated, immutable
//! messages that can report their exact and worst-case byte length, produce
//! byte generators, derive modified copies and freeze into a literal,
//! replayable specification.
//!
//! ## Architecture Role
//!
//! ```text
//! settings ─┐
//! types ────┼→ [language] → transmission layer
//!           │     ↓
//!           │   parser → Token → Message (Response, Request)
//!           │                      ↑ NestedMessage (recursive)
//! ```
//!
//! ## What This Crate Contains
//! - **Token**: closed enumeration of message components
//! - **Message**: trait carrying uniqueness, derivation, length, freeze and log
//! - **Response / Request**: HTTP/1.1 message kinds
//! - **NestedMessage**: a message embedded in another as an escaped literal
//! - **Parser**: specification text to messages, with positioned errors
//!
//! ## What This Crate Does NOT Contain
//! - Network transport, TLS or serving logic
//! - Configuration loading (belongs in `settings`)
//!
//! ## Examples
//!
//! ```rust
//! use language::{Message, Parse, Response};
//! use settings::Settings;
//!
//! let settings = Settings::default().with_seed(7);
//! let response = Response::parse("200:b@16,digits:i4,'xyz'")?;
//! assert_eq!(response.maximum_length(&settings), response.length(&settings) + 3);
//!
//! let frozen = response.freeze(&settings);
//! assert_eq!(frozen.freeze(&settings).spec(), frozen.spec());
//! # Ok::<(), language::SpecError>(())
//! ```

pub mod error;
pub mod http;
pub mod message;
pub mod nested;
pub mod parser;
pub mod token;

pub use error::{SpecError, SpecResult};
pub use http::{reason_phrase, Request, Response};
pub use message::{LogRecord, LogValue, Message, TokenSet, LOG_TRUNCATE};
pub use nested::NestedMessage;
pub use parser::{parse_request, parse_response, Parse};
pub use token::{Content, Header, HeaderKind, Method, RequestMethod, Token, TokenKind};
