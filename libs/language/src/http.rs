//! # HTTP/1 Message Kinds
//!
//! Concrete [`Message`] kinds for crafted HTTP/1.1 responses and requests.
//!
//! ```text
//! Response:  HTTP/1.1 SP status SP reason CRLF  headers  CRLF  body
//! Request:   METHOD SP path[nested] SP HTTP/1.1 CRLF  headers  CRLF  body
//! ```
//!
//! Resolving a message adds the headers a well-formed peer expects
//! (`Content-Length`, and `Host` for requests when configured) unless the
//! message is marked raw, then fixes symbolic action offsets.

use crate::error::SpecResult;
use crate::message::{LogValue, Message, TokenSet};
use crate::nested::NestedMessage;
use crate::parser::{parse_request, parse_response, Parse};
use crate::token::{Header, RequestMethod, Token, TokenKind};
use settings::Settings;
use std::fmt;
use tracing::debug;
use types::{Generator, Value};

const VERSION: &[u8] = b"HTTP/1.1";
const SP: &[u8] = b" ";
const CRLF: &[u8] = b"\r\n";

/// Status used when a hand-assembled response carries none
pub const DEFAULT_STATUS: u64 = 200;

/// Canonical reason phrase for a status code
pub fn reason_phrase(code: u64) -> &'static str {
    match code {
        100 => "Continue",
        101 => "Switching Protocols",
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        203 => "Non-Authoritative Information",
        204 => "No Content",
        205 => "Reset Content",
        206 => "Partial Content",
        300 => "Multiple Choices",
        301 => "Moved Permanently",
        302 => "Found",
        303 => "See Other",
        304 => "Not Modified",
        305 => "Use Proxy",
        307 => "Temporary Redirect",
        308 => "Permanent Redirect",
        400 => "Bad Request",
        401 => "Unauthorized",
        402 => "Payment Required",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        406 => "Not Acceptable",
        407 => "Proxy Authentication Required",
        408 => "Request Time-out",
        409 => "Conflict",
        410 => "Gone",
        411 => "Length Required",
        412 => "Precondition Failed",
        413 => "Request Entity Too Large",
        414 => "Request-URI Too Long",
        415 => "Unsupported Media Type",
        416 => "Requested Range not satisfiable",
        417 => "Expectation Failed",
        418 => "I'm a teapot",
        426 => "Upgrade Required",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Time-out",
        505 => "HTTP Version not supported",
        _ => "Unknown code",
    }
}

fn header_generators(message: &impl Message, settings: &Settings) -> Vec<Generator> {
    message
        .toks(TokenKind::Header)
        .into_iter()
        .flat_map(|h| h.values(settings))
        .collect()
}

fn has_header(message: &impl Message, name: &[u8], settings: &Settings) -> bool {
    message
        .tokens()
        .iter()
        .filter_map(Token::as_header)
        .any(|h| h.has_key(name, settings))
}

fn literal_header(key: &'static str, value: String) -> Token {
    Token::Header(Header::new(Value::literal(key), Value::literal(value)))
}

/// A crafted HTTP/1.1 response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    tokens: TokenSet,
}

impl Response {
    pub fn status_code(&self) -> Option<u64> {
        self.tokens().iter().find_map(|t| match t {
            Token::StatusCode(code) => Some(*code),
            _ => None,
        })
    }

    pub fn reason(&self) -> Option<&Token> {
        self.tok(TokenKind::Reason)
    }

    pub fn body(&self) -> Option<&Token> {
        self.tok(TokenKind::Body)
    }

    pub fn headers(&self) -> Vec<&Header> {
        self.tokens().iter().filter_map(Token::as_header).collect()
    }

    pub fn is_raw(&self) -> bool {
        self.tok(TokenKind::Raw).is_some()
    }
}

impl Message for Response {
    fn rebuild(tokens: TokenSet) -> Self {
        Self { tokens }
    }

    fn token_set(&self) -> &TokenSet {
        &self.tokens
    }

    fn values(&self, settings: &Settings) -> Vec<Generator> {
        let code = self.status_code().unwrap_or(DEFAULT_STATUS);
        let mut parts = vec![
            Generator::from(VERSION),
            Generator::from(SP),
            Generator::literal(code.to_string()),
            Generator::from(SP),
        ];
        match self.reason() {
            Some(reason) => parts.extend(reason.values(settings)),
            None => parts.push(Generator::literal(reason_phrase(code))),
        }
        parts.push(Generator::from(CRLF));
        parts.extend(header_generators(self, settings));
        parts.push(Generator::from(CRLF));
        if let Some(body) = self.body() {
            parts.extend(body.values(settings));
        }
        parts
    }

    fn resolve(&self, settings: &Settings) -> Self {
        let mut tokens = self.tokens().to_vec();
        if !self.is_raw() && !has_header(self, b"Content-Length", settings) {
            let length = self.body().map_or(0, |b| b.len(settings));
            debug!(length, "adding implied Content-Length to response");
            tokens.push(literal_header("Content-Length", length.to_string()));
        }
        Self::rebuild(TokenSet::from_trusted(tokens)).resolve_actions(settings)
    }

    fn log_attrs(&self) -> Vec<(&'static str, Option<LogValue<'_>>)> {
        vec![
            ("status_code", self.tok(TokenKind::StatusCode).map(LogValue::Token)),
            ("reason", self.reason().map(LogValue::Token)),
            ("version", Some(LogValue::Bytes(VERSION))),
            ("body", self.body().map(LogValue::Token)),
        ]
    }
}

impl Parse for Response {
    const NESTED_PREAMBLE: &'static str = "s";

    fn parse(spec: &str) -> SpecResult<Self> {
        parse_response(spec)
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.spec())
    }
}

/// A crafted HTTP/1.1 request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    tokens: TokenSet,
}

impl Request {
    pub fn method(&self) -> Option<&RequestMethod> {
        self.tokens().iter().find_map(|t| match t {
            Token::Method(method) => Some(method),
            _ => None,
        })
    }

    pub fn path(&self) -> Option<&Token> {
        self.tok(TokenKind::Path)
    }

    pub fn body(&self) -> Option<&Token> {
        self.tok(TokenKind::Body)
    }

    pub fn headers(&self) -> Vec<&Header> {
        self.tokens().iter().filter_map(Token::as_header).collect()
    }

    pub fn is_raw(&self) -> bool {
        self.tok(TokenKind::Raw).is_some()
    }

    pub fn nested_response(&self) -> Option<&NestedMessage<Response>> {
        self.tokens().iter().find_map(|t| match t {
            Token::NestedResponse(nested) => Some(nested.as_ref()),
            _ => None,
        })
    }

    /// How many times a transmission layer sends the request; 1 by default
    pub fn times(&self) -> u64 {
        self.tokens()
            .iter()
            .find_map(|t| match t {
                Token::Times(n) => Some(*n),
                _ => None,
            })
            .unwrap_or(1)
    }
}

impl Message for Request {
    fn rebuild(tokens: TokenSet) -> Self {
        Self { tokens }
    }

    fn token_set(&self) -> &TokenSet {
        &self.tokens
    }

    fn values(&self, settings: &Settings) -> Vec<Generator> {
        let mut parts = Vec::new();
        if let Some(method) = self.tok(TokenKind::Method) {
            parts.extend(method.values(settings));
        }
        parts.push(Generator::from(SP));
        if let Some(path) = self.path() {
            parts.extend(path.values(settings));
        }
        if let Some(nested) = self.nested_response() {
            parts.extend(nested.values(settings));
        }
        parts.push(Generator::from(SP));
        parts.push(Generator::from(VERSION));
        parts.push(Generator::from(CRLF));
        parts.extend(header_generators(self, settings));
        parts.push(Generator::from(CRLF));
        if let Some(body) = self.body() {
            parts.extend(body.values(settings));
        }
        parts
    }

    fn resolve(&self, settings: &Settings) -> Self {
        let mut tokens = self.tokens().to_vec();
        if !self.is_raw() {
            if let Some(body) = self.body() {
                if !has_header(self, b"Content-Length", settings) {
                    tokens.push(literal_header("Content-Length", body.len(settings).to_string()));
                }
            }
            if let Some(host) = &settings.request_host {
                if !has_header(self, b"Host", settings) {
                    debug!(host = %host, "adding implied Host to request");
                    tokens.push(literal_header("Host", host.clone()));
                }
            }
        }
        Self::rebuild(TokenSet::from_trusted(tokens)).resolve_actions(settings)
    }

    fn log_attrs(&self) -> Vec<(&'static str, Option<LogValue<'_>>)> {
        vec![
            ("method", self.tok(TokenKind::Method).map(LogValue::Token)),
            ("path", self.path().map(LogValue::Token)),
            ("body", self.body().map(LogValue::Token)),
        ]
    }
}

impl Parse for Request {
    const NESTED_PREAMBLE: &'static str = "q";

    fn parse(spec: &str) -> SpecResult<Self> {
        parse_request(spec)
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.spec())
    }
}
