//! # Message Components
//!
//! ## Purpose
//!
//! Closed enumeration of every component a message can carry. Consumers
//! query components by [`TokenKind`] instead of by position, and every
//! transformation (`freeze`, `resolve`) returns a new token of the same kind,
//! so unique names survive every rebuild of a message.
//!
//! ## Uniqueness
//!
//! Non-repeatable kinds carry a unique name equal to their lowercase kind
//! name. Headers and actions repeat freely. [`Content`] tokens, used by
//! hand-assembled message kinds, choose their own name.

use crate::http::Response;
use crate::nested::NestedMessage;
use settings::Settings;
use std::fmt;
use types::{Action, Generator, Value};

const HEADER_SEPARATOR: &[u8] = b": ";
const CRLF: &[u8] = b"\r\n";

/// Tag of a token variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    StatusCode,
    Reason,
    Method,
    Path,
    Header,
    Body,
    Raw,
    Times,
    NestedResponse,
    Content,
    PauseAt,
    DisconnectAt,
    InjectAt,
}

impl TokenKind {
    /// Name enforcing at-most-once occurrence, `None` for repeatable kinds
    pub fn unique_name(&self) -> Option<&'static str> {
        match self {
            TokenKind::StatusCode => Some("statuscode"),
            TokenKind::Reason => Some("reason"),
            TokenKind::Method => Some("method"),
            TokenKind::Path => Some("path"),
            TokenKind::Body => Some("body"),
            TokenKind::Raw => Some("raw"),
            TokenKind::Times => Some("times"),
            TokenKind::NestedResponse => Some("nestedresponse"),
            TokenKind::Header
            | TokenKind::Content
            | TokenKind::PauseAt
            | TokenKind::DisconnectAt
            | TokenKind::InjectAt => None,
        }
    }

    pub fn is_action(&self) -> bool {
        matches!(
            self,
            TokenKind::PauseAt | TokenKind::DisconnectAt | TokenKind::InjectAt
        )
    }
}

/// Well-known request methods, written lowercase in specs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Options,
    Trace,
    Connect,
}

impl Method {
    pub const ALL: [Method; 8] = [
        Method::Get,
        Method::Head,
        Method::Post,
        Method::Put,
        Method::Delete,
        Method::Options,
        Method::Trace,
        Method::Connect,
    ];

    /// Wire form
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Options => "OPTIONS",
            Method::Trace => "TRACE",
            Method::Connect => "CONNECT",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Method::ALL
            .iter()
            .copied()
            .find(|m| m.as_str().eq_ignore_ascii_case(name))
    }
}

/// A known method or an arbitrary value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestMethod {
    Known(Method),
    Custom(Value),
}

impl RequestMethod {
    fn spec(&self) -> String {
        match self {
            RequestMethod::Known(m) => m.as_str().to_ascii_lowercase(),
            RequestMethod::Custom(v) => v.spec(),
        }
    }

    fn values(&self, settings: &Settings) -> Vec<Generator> {
        match self {
            RequestMethod::Known(m) => vec![Generator::from(m.as_str().as_bytes())],
            RequestMethod::Custom(v) => vec![v.get_generator(settings)],
        }
    }

    fn freeze(&self, settings: &Settings) -> RequestMethod {
        match self {
            RequestMethod::Known(_) => self.clone(),
            RequestMethod::Custom(v) => RequestMethod::Custom(v.freeze(settings)),
        }
    }
}

/// Spelling of a header in spec text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderKind {
    /// `h<key>=<value>`
    Custom,
    /// `c<value>`
    ContentType,
    /// `l<value>`
    Location,
    /// `u<value>`
    UserAgent,
}

impl HeaderKind {
    fn fixed_key(&self) -> Option<&'static str> {
        match self {
            HeaderKind::Custom => None,
            HeaderKind::ContentType => Some("Content-Type"),
            HeaderKind::Location => Some("Location"),
            HeaderKind::UserAgent => Some("User-Agent"),
        }
    }

    fn preamble(&self) -> char {
        match self {
            HeaderKind::Custom => 'h',
            HeaderKind::ContentType => 'c',
            HeaderKind::Location => 'l',
            HeaderKind::UserAgent => 'u',
        }
    }
}

/// One header line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    kind: HeaderKind,
    key: Value,
    value: Value,
}

impl Header {
    pub fn new(key: Value, value: Value) -> Self {
        Self {
            kind: HeaderKind::Custom,
            key,
            value,
        }
    }

    /// Shortcut header with a fixed key; `Custom` falls back to an empty key
    pub fn shortcut(kind: HeaderKind, value: Value) -> Self {
        let key = Value::literal(kind.fixed_key().unwrap_or_default());
        Self { kind, key, value }
    }

    pub fn kind(&self) -> HeaderKind {
        self.kind
    }

    pub fn key(&self) -> &Value {
        &self.key
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Case-insensitive key comparison against the generated key bytes
    pub fn has_key(&self, name: &[u8], settings: &Settings) -> bool {
        let key = self.key.get_generator(settings);
        key.len() == name.len() && key.to_bytes().eq_ignore_ascii_case(name)
    }

    fn spec(&self) -> String {
        match self.kind {
            HeaderKind::Custom => format!("h{}={}", self.key.spec(), self.value.spec()),
            shortcut => format!("{}{}", shortcut.preamble(), self.value.spec()),
        }
    }

    fn values(&self, settings: &Settings) -> Vec<Generator> {
        vec![
            self.key.get_generator(settings),
            Generator::from(HEADER_SEPARATOR),
            self.value.get_generator(settings),
            Generator::from(CRLF),
        ]
    }

    fn freeze(&self, settings: &Settings) -> Header {
        Header {
            kind: self.kind,
            key: self.key.freeze(settings),
            value: self.value.freeze(settings),
        }
    }
}

/// Hand-assembled content component with an explicit unique name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content {
    name: Option<String>,
    value: Value,
}

impl Content {
    pub fn new(name: Option<String>, value: Value) -> Self {
        Self { name, value }
    }

    /// Content that may appear at most once per message
    pub fn named(name: impl Into<String>, value: Value) -> Self {
        Self::new(Some(name.into()), value)
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// A single message component
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    StatusCode(u64),
    Reason(Value),
    Method(RequestMethod),
    Path(Value),
    Header(Header),
    Body(Value),
    Raw,
    Times(u64),
    NestedResponse(Box<NestedMessage<Response>>),
    Content(Content),
    Action(Action),
}

impl Token {
    pub fn kind(&self) -> TokenKind {
        match self {
            Token::StatusCode(_) => TokenKind::StatusCode,
            Token::Reason(_) => TokenKind::Reason,
            Token::Method(_) => TokenKind::Method,
            Token::Path(_) => TokenKind::Path,
            Token::Header(_) => TokenKind::Header,
            Token::Body(_) => TokenKind::Body,
            Token::Raw => TokenKind::Raw,
            Token::Times(_) => TokenKind::Times,
            Token::NestedResponse(_) => TokenKind::NestedResponse,
            Token::Content(_) => TokenKind::Content,
            Token::Action(Action::PauseAt { .. }) => TokenKind::PauseAt,
            Token::Action(Action::DisconnectAt { .. }) => TokenKind::DisconnectAt,
            Token::Action(Action::InjectAt { .. }) => TokenKind::InjectAt,
        }
    }

    pub fn unique_name(&self) -> Option<&str> {
        match self {
            Token::Content(content) => content.name.as_deref().filter(|n| !n.is_empty()),
            other => other.kind().unique_name(),
        }
    }

    pub fn as_action(&self) -> Option<&Action> {
        match self {
            Token::Action(action) => Some(action),
            _ => None,
        }
    }

    pub fn as_header(&self) -> Option<&Header> {
        match self {
            Token::Header(header) => Some(header),
            _ => None,
        }
    }

    /// Canonical spec text
    pub fn spec(&self) -> String {
        match self {
            Token::StatusCode(code) => code.to_string(),
            Token::Reason(v) => format!("m{}", v.spec()),
            Token::Method(m) => m.spec(),
            Token::Path(v) => v.spec(),
            Token::Header(h) => h.spec(),
            Token::Body(v) => format!("b{}", v.spec()),
            Token::Raw => "r".to_string(),
            Token::Times(n) => format!("x{}", n),
            Token::NestedResponse(nested) => nested.spec(),
            Token::Content(c) => c.value.spec(),
            Token::Action(action) => action.spec(),
        }
    }

    /// Byte producers for this component; actions produce none
    pub fn values(&self, settings: &Settings) -> Vec<Generator> {
        match self {
            Token::StatusCode(n) | Token::Times(n) => {
                vec![Generator::literal(n.to_string().into_bytes())]
            }
            Token::Reason(v) | Token::Path(v) | Token::Body(v) => vec![v.get_generator(settings)],
            Token::Method(m) => m.values(settings),
            Token::Header(h) => h.values(settings),
            Token::Raw | Token::Action(_) => Vec::new(),
            Token::NestedResponse(nested) => nested.values(settings),
            Token::Content(c) => vec![c.value.get_generator(settings)],
        }
    }

    /// Byte length of everything `values` produces, saturating at `usize::MAX`
    pub fn len(&self, settings: &Settings) -> usize {
        self.values(settings)
            .iter()
            .fold(0usize, |total, g| total.saturating_add(g.len()))
    }

    pub fn is_empty(&self, settings: &Settings) -> bool {
        self.len(settings) == 0
    }

    /// Same component with every generated value fixed to a literal
    pub fn freeze(&self, settings: &Settings) -> Token {
        match self {
            Token::Reason(v) => Token::Reason(v.freeze(settings)),
            Token::Method(m) => Token::Method(m.freeze(settings)),
            Token::Path(v) => Token::Path(v.freeze(settings)),
            Token::Header(h) => Token::Header(h.freeze(settings)),
            Token::Body(v) => Token::Body(v.freeze(settings)),
            Token::NestedResponse(nested) => {
                Token::NestedResponse(Box::new(nested.freeze(settings)))
            }
            Token::Content(c) => Token::Content(Content {
                name: c.name.clone(),
                value: c.value.freeze(settings),
            }),
            Token::Action(action) => Token::Action(action.freeze(settings)),
            Token::StatusCode(_) | Token::Raw | Token::Times(_) => self.clone(),
        }
    }

    /// Resolve symbolic action offsets against the carrying message's length
    pub fn resolve(&self, settings: &Settings, message_length: usize) -> Token {
        match self {
            Token::Action(action) => Token::Action(action.resolve(settings, message_length)),
            other => other.clone(),
        }
    }
}

impl From<Action> for Token {
    fn from(action: Action) -> Self {
        Token::Action(action)
    }
}

impl From<Header> for Token {
    fn from(header: Header) -> Self {
        Token::Header(header)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.spec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{Offset, PauseDuration, SizeUnit, ValueGenerate, DataType};

    #[test]
    fn test_unique_names() {
        assert_eq!(Token::Body(Value::literal("x")).unique_name(), Some("body"));
        assert_eq!(Token::StatusCode(200).unique_name(), Some("statuscode"));
        assert_eq!(Token::Raw.unique_name(), Some("raw"));

        let header = Header::new(Value::literal("a"), Value::literal("b"));
        assert_eq!(Token::Header(header).unique_name(), None);

        let pause = Action::PauseAt {
            offset: Offset::At(0),
            duration: PauseDuration::Forever,
        };
        assert_eq!(Token::Action(pause).unique_name(), None);

        assert_eq!(
            Token::Content(Content::named("header", Value::literal("x"))).unique_name(),
            Some("header")
        );
        assert_eq!(
            Token::Content(Content::named("", Value::literal("x"))).unique_name(),
            None
        );
    }

    #[test]
    fn test_header_values_and_spec() {
        let settings = Settings::default();
        let header = Header::new(Value::literal("Foo"), Value::literal("bar"));
        let token = Token::Header(header);

        assert_eq!(token.spec(), "h'Foo'='bar'");
        assert_eq!(token.len(&settings), b"Foo: bar\r\n".len());

        let ct = Token::Header(Header::shortcut(HeaderKind::ContentType, Value::literal("text/html")));
        assert_eq!(ct.spec(), "c'text/html'");
        let bytes: Vec<u8> = ct
            .values(&settings)
            .iter()
            .flat_map(|g| g.to_bytes().to_vec())
            .collect();
        assert_eq!(bytes, b"Content-Type: text/html\r\n");
    }

    #[test]
    fn test_header_key_match_is_case_insensitive() {
        let settings = Settings::default();
        let header = Header::new(Value::literal("content-LENGTH"), Value::literal("1"));
        assert!(header.has_key(b"Content-Length", &settings));
        assert!(!header.has_key(b"Content-Type", &settings));
    }

    #[test]
    fn test_method_spec_and_values() {
        let settings = Settings::default();
        let get = Token::Method(RequestMethod::Known(Method::Get));
        assert_eq!(get.spec(), "get");
        assert_eq!(get.values(&settings)[0].to_bytes(), &b"GET"[..]);
        assert_eq!(Method::from_name("oPtIoNs"), Some(Method::Options));
        assert_eq!(Method::from_name("patch"), None);
    }

    #[test]
    fn test_freeze_body() {
        let settings = Settings::default().with_seed(99);
        let body = Token::Body(Value::Generate(ValueGenerate::new(8, SizeUnit::B, DataType::Digits)));
        let frozen = body.freeze(&settings);

        assert_eq!(frozen.kind(), TokenKind::Body);
        assert_eq!(frozen.len(&settings), 8);
        assert!(frozen.spec().starts_with("b'"));
        assert_eq!(frozen.freeze(&settings), frozen);
    }

    #[test]
    fn test_action_kinds() {
        let inject = Token::from(Action::InjectAt {
            offset: Offset::End,
            value: Value::literal("abc"),
        });
        assert_eq!(inject.kind(), TokenKind::InjectAt);
        assert!(inject.kind().is_action());
        assert_eq!(inject.len(&Settings::default()), 0);
    }
}
