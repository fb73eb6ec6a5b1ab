//! # Fray Language Integration Tests
//!
//! End-to-end checks through the public API:
//! - A hand-assembled message kind built from named content components
//! - Positioned parse errors, including across nested message boundaries
//! - Freezing requests that embed responses
//! - Serialising log records

use language::{
    Content, LogValue, Message, Parse, Request, Response, SpecError, Token, TokenKind, TokenSet,
};
use settings::Settings;
use types::{
    Action, DataType, Generator, Offset, PauseDuration, SizeUnit, Value, ValueGenerate,
};

/// Header block followed by a body, both optional and at most once each
#[derive(Debug, Clone, PartialEq)]
struct Envelope {
    tokens: TokenSet,
}

impl Message for Envelope {
    fn rebuild(tokens: TokenSet) -> Self {
        Self { tokens }
    }

    fn token_set(&self) -> &TokenSet {
        &self.tokens
    }

    fn values(&self, settings: &Settings) -> Vec<Generator> {
        self.toks(TokenKind::Content)
            .into_iter()
            .flat_map(|t| t.values(settings))
            .collect()
    }

    fn resolve(&self, settings: &Settings) -> Self {
        self.resolve_actions(settings)
    }

    fn log_attrs(&self) -> Vec<(&'static str, Option<LogValue<'_>>)> {
        vec![("content", self.tok(TokenKind::Content).map(LogValue::Token))]
    }
}

/// Route engine logs to the test harness output
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .try_init();
}

fn header(data: &'static [u8]) -> Token {
    Token::Content(Content::named("header", Value::literal(data)))
}

fn body(data: &'static [u8]) -> Token {
    Token::Content(Content::named("body", Value::literal(data)))
}

#[test]
fn test_envelope_rejects_two_headers() {
    let err = Envelope::new(vec![header(b"A: 1\r\n"), header(b"B: 2\r\n")]).unwrap_err();
    assert_eq!(err, SpecError::duplicate_clause("header"));
    assert_eq!(
        err.to_string(),
        "Message has multiple header clauses, but should only have one."
    );
}

#[test]
fn test_envelope_lengths_with_injection() {
    let settings = Settings::default();
    let envelope = Envelope::new(vec![header(b"A: 1\r\n"), body(b"hello world")]).unwrap();
    assert_eq!(envelope.length(&settings), 6 + 11);
    assert_eq!(envelope.maximum_length(&settings), envelope.length(&settings));

    let mut tokens = envelope.tokens().to_vec();
    tokens.push(Token::Action(Action::InjectAt {
        offset: Offset::At(3),
        value: Value::literal(&b"12345"[..]),
    }));
    let injected = Envelope::new(tokens).unwrap();

    assert_eq!(injected.length(&settings), envelope.length(&settings));
    assert_eq!(
        injected.maximum_length(&settings),
        envelope.maximum_length(&settings) + 5
    );
}

#[test]
fn test_envelope_strike_then_replace() {
    let envelope = Envelope::new(vec![header(b"A: 1\r\n"), body(b"old")]).unwrap();
    let mut tokens = envelope.strike_token("body").tokens().to_vec();
    tokens.push(body(b"new"));
    let replaced = Envelope::new(tokens).unwrap();

    assert_eq!(replaced.length(&Settings::default()), 6 + 3);
    assert_eq!(replaced.spec(), "'A: 1\\r\\n':'new'");
}

#[test]
fn test_envelope_schedule() {
    let settings = Settings::default().with_seed(3);
    let envelope = Envelope::new(vec![
        body(b"0123456789"),
        Token::Action(Action::DisconnectAt { offset: Offset::End }),
        Token::Action(Action::PauseAt {
            offset: Offset::At(4),
            duration: PauseDuration::Forever,
        }),
    ])
    .unwrap();

    let offsets: Vec<usize> = envelope
        .schedule(&settings)
        .into_iter()
        .map(|a| a.offset)
        .collect();
    assert_eq!(offsets, vec![4, 11]);
}

#[test]
fn test_nested_parse_error_positions() {
    init_tracing();
    let spec = "get:/\n  :s'200:b\\x27unterminated'";
    let err = Request::parse(spec).unwrap_err();

    assert_eq!(err.location(), Some((2, 5)));
    let inner = err.innermost();
    assert!(matches!(inner, SpecError::Parse { line: 1, .. }));
}

#[test]
fn test_huge_hand_built_message_lengths_saturate() {
    let settings = Settings::default().with_seed(9);
    let huge = || Value::Generate(ValueGenerate::new(usize::MAX, SizeUnit::T, DataType::Bytes));
    let envelope = Envelope::new(vec![
        Token::Content(Content::named("body", huge())),
        Token::Action(Action::InjectAt {
            offset: Offset::At(0),
            value: huge(),
        }),
        Token::Action(Action::DisconnectAt { offset: Offset::End }),
    ])
    .unwrap();

    assert_eq!(envelope.length(&settings), usize::MAX);
    assert_eq!(envelope.maximum_length(&settings), usize::MAX);

    let resolved = envelope.resolve(&settings);
    let offsets: Vec<Offset> = resolved.actions().iter().map(|a| a.offset()).collect();
    assert_eq!(offsets, vec![Offset::At(0), Offset::At(usize::MAX)]);
}

#[test]
fn test_request_freeze_freezes_nested_response() {
    init_tracing();
    let settings = Settings::default().with_seed(21);
    let request = Request::parse("get:/:s'200:b@8,ascii_letters:pr,1'").unwrap();
    let frozen = request.freeze(&settings);

    let nested = frozen.nested_response().unwrap();
    let inner = nested.parsed();
    assert!(inner.body().unwrap().spec().starts_with("b'"));
    assert!(inner.actions().iter().all(|a| a.offset().is_resolved()));
    assert!(!frozen.spec().contains('@'));

    // Reparse the frozen spec and freeze again
    let replayed = Request::parse(&frozen.spec()).unwrap();
    assert_eq!(replayed.freeze(&settings).spec(), frozen.spec());
}

#[test]
fn test_preview_safe_response_keeps_content() {
    let response = Response::parse("200:pr,f:b'x':p0,3:i1,'y'").unwrap();
    let preview = response.preview_safe();
    assert_eq!(preview.spec(), "200:b'x':i1,'y'");
}

#[test]
fn test_log_record_serialises() {
    let response = Response::parse("500:b'\\xfe\\xff'").unwrap();
    let record = response.log(&Settings::default());
    let json = serde_json::to_value(&record).unwrap();

    assert_eq!(json["body"], "\\xfe\\xff");
    assert_eq!(json["reason"], serde_json::Value::Null);
    assert_eq!(json["spec"], "500:b'\\xfe\\xff'");
}
