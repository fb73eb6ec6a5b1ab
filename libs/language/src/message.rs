//! # Message Composition Engine
//!
//! ## Purpose
//!
//! A message is an ordered, validated sequence of [`Token`]s. This module
//! owns the structural invariant (no two tokens share a unique name) and the
//! operations every message kind gets for free: lookup by kind, derivation
//! (strike one component, preview-safe copy), exact and worst-case length,
//! bounded logging and freezing into a replayable literal form.
//!
//! ## Architecture
//!
//! ```text
//! tokens ──TokenSet::new──▶ TokenSet ──Message::rebuild──▶ Response / Request
//!              │ (uniqueness)                                    │
//!              ▼                                                 ▼
//!         SpecError::Validation          length / maximum_length / freeze / log
//! ```
//!
//! Message kinds implement the few kind-specific capabilities (`values`,
//! `resolve`, log attributes, `rebuild`); everything else is provided here.
//! Transformations never mutate: they build a new instance of the same kind.

use crate::error::{SpecError, SpecResult};
use crate::token::{Token, TokenKind};
use settings::Settings;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, trace};
use types::{bytes_to_escaped_str, Action, Generator, ScheduledAction};

/// Most bytes of one attribute that ever reach a log record
pub const LOG_TRUNCATE: usize = 1024;

/// Loggable attribute of a message kind
#[derive(Debug, Clone, Copy)]
pub enum LogValue<'a> {
    /// Content comes from the token's generators
    Token(&'a Token),
    /// Fixed bytes owned by the message kind
    Bytes(&'a [u8]),
}

/// Escaped, truncated attribute values plus the message spec
pub type LogRecord = BTreeMap<String, Option<String>>;

/// Ordered tokens with at most one token per unique name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenSet {
    tokens: Vec<Token>,
}

impl TokenSet {
    /// Validate and wrap a token sequence, preserving order
    pub fn new(tokens: Vec<Token>) -> SpecResult<Self> {
        Self::check_unique(&tokens)?;
        trace!(count = tokens.len(), "token set validated");
        Ok(Self { tokens })
    }

    /// Wrap tokens derived from an already validated set by a
    /// kind-preserving transformation or by adding repeatable tokens
    pub(crate) fn from_trusted(tokens: Vec<Token>) -> Self {
        debug_assert!(Self::check_unique(&tokens).is_ok());
        Self { tokens }
    }

    fn check_unique(tokens: &[Token]) -> SpecResult<()> {
        let mut seen = HashSet::new();
        for name in tokens.iter().filter_map(Token::unique_name) {
            if !seen.insert(name) {
                return Err(SpecError::duplicate_clause(name));
            }
        }
        Ok(())
    }

    pub fn as_slice(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn into_vec(self) -> Vec<Token> {
        self.tokens
    }

    /// Subset of tokens; removing tokens cannot break uniqueness
    pub fn retain(&self, mut keep: impl FnMut(&Token) -> bool) -> Self {
        Self {
            tokens: self.tokens.iter().filter(|&t| keep(t)).cloned().collect(),
        }
    }

    /// Token-by-token transformation that must preserve each token's kind
    pub(crate) fn map(&self, f: impl FnMut(&Token) -> Token) -> Self {
        Self::from_trusted(self.tokens.iter().map(f).collect())
    }
}

/// A validated message of a concrete kind
pub trait Message: Sized + Clone + std::fmt::Debug + PartialEq {
    /// Build an instance of this kind around an already validated set
    fn rebuild(tokens: TokenSet) -> Self;

    fn token_set(&self) -> &TokenSet;

    /// Generators for the base content, excluding every action
    fn values(&self, settings: &Settings) -> Vec<Generator>;

    /// Fix implied components and symbolic action offsets
    fn resolve(&self, settings: &Settings) -> Self;

    /// Attributes included in [`Message::log`], in order; `None` when absent
    fn log_attrs(&self) -> Vec<(&'static str, Option<LogValue<'_>>)>;

    /// Validate `tokens` and build a message of this kind
    fn new(tokens: Vec<Token>) -> SpecResult<Self> {
        Ok(Self::rebuild(TokenSet::new(tokens)?))
    }

    fn tokens(&self) -> &[Token] {
        self.token_set().as_slice()
    }

    /// Copy without the tokens whose unique name is `name`
    fn strike_token(&self, name: &str) -> Self {
        Self::rebuild(self.token_set().retain(|t| t.unique_name() != Some(name)))
    }

    /// All tokens of `kind`, in sequence order
    fn toks(&self, kind: TokenKind) -> Vec<&Token> {
        self.tokens().iter().filter(|t| t.kind() == kind).collect()
    }

    /// First token of `kind`
    fn tok(&self, kind: TokenKind) -> Option<&Token> {
        self.tokens().iter().find(|t| t.kind() == kind)
    }

    fn actions(&self) -> Vec<&Action> {
        self.tokens().iter().filter_map(Token::as_action).collect()
    }

    /// Length of the base message without any applied actions
    ///
    /// Saturates at `usize::MAX` for hand-built values beyond any buffer.
    fn length(&self, settings: &Settings) -> usize {
        self.values(settings)
            .iter()
            .fold(0usize, |total, g| total.saturating_add(g.len()))
    }

    /// Length of the base message with every injection applied
    fn maximum_length(&self, settings: &Settings) -> usize {
        self.actions()
            .iter()
            .fold(self.length(settings), |total, a| {
                total.saturating_add(a.injected_len(settings))
            })
    }

    /// Copy that never blocks when consumed: every pause removed
    fn preview_safe(&self) -> Self {
        Self::rebuild(self.token_set().retain(|t| t.kind() != TokenKind::PauseAt))
    }

    /// Resolve every action offset against this message's length
    fn resolve_actions(&self, settings: &Settings) -> Self {
        let length = self.length(settings);
        Self::rebuild(self.token_set().map(|t| t.resolve(settings, length)))
    }

    /// Resolve, then replace every generated value with a literal
    fn freeze(&self, settings: &Settings) -> Self {
        let resolved = self.resolve(settings);
        let frozen = Self::rebuild(resolved.token_set().map(|t| t.freeze(settings)));
        debug!(tokens = frozen.token_set().len(), "message frozen");
        frozen
    }

    /// Bounded, printable record for logging a served message
    fn log(&self, settings: &Settings) -> LogRecord {
        let mut record = LogRecord::new();
        for (name, attr) in self.log_attrs() {
            let rendered = attr.map(|value| match value {
                LogValue::Token(token) => {
                    let mut content: Vec<u8> = Vec::new();
                    for gen in token.values(settings) {
                        let remaining = LOG_TRUNCATE - content.len();
                        if remaining == 0 {
                            break;
                        }
                        content.extend_from_slice(&gen.slice(0..remaining));
                    }
                    bytes_to_escaped_str(&content, false, false)
                }
                LogValue::Bytes(bytes) => {
                    bytes_to_escaped_str(&bytes[..bytes.len().min(LOG_TRUNCATE)], false, false)
                }
            });
            record.insert(name.to_string(), rendered);
        }
        record.insert("spec".to_string(), Some(self.spec()));
        record
    }

    /// Canonical spec text
    fn spec(&self) -> String {
        self.tokens()
            .iter()
            .map(Token::spec)
            .collect::<Vec<_>>()
            .join(":")
    }

    /// Resolved actions ordered by offset, as a transmission layer applies them
    fn schedule(&self, settings: &Settings) -> Vec<ScheduledAction> {
        let resolved = self.resolve(settings);
        let mut scheduled: Vec<ScheduledAction> = resolved
            .actions()
            .into_iter()
            .filter_map(|a| a.intermediate(settings))
            .collect();
        scheduled.sort_by_key(|a| a.offset);
        scheduled
    }
}
