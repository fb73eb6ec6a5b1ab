//! # Specification Parser
//!
//! ## Purpose
//!
//! Turns specification text into validated messages. Every failure carries
//! the 1-based line and column of the offending character; failures inside a
//! nested literal additionally carry the position of the literal itself.
//!
//! ## Grammar
//!
//! The grammar lives in `grammar.pest`:
//!
//! ```text
//! response  := status (":" response-atom)*
//! request   := method ":" path (":" request-atom)*
//! value     := literal | "@" size unit? ("," datatype)?
//! naked     := value | naked-char+
//! offset    := integer | "r" | "a"
//!
//! h value "=" value   header          b value    body
//! c value             content-type    r          raw
//! l value             location        m value    reason (response)
//! u value             user-agent      s literal  nested response (request)
//! p offset "," secs   pause           x integer  times (request)
//! d offset            disconnect      i offset "," value  inject
//! ```
//!
//! Whitespace is allowed around component separators. The whole input must
//! be consumed. Generated values are capped at [`MAX_GENERATED_SIZE`] bytes.

use crate::error::{SpecError, SpecResult};
use crate::http::{Request, Response};
use crate::message::Message;
use crate::nested::NestedMessage;
use crate::token::{Header, HeaderKind, Method, RequestMethod, Token};
use pest::error::{ErrorVariant, LineColLocation};
use pest::Parser;
use pest_derive::Parser;
use std::str::FromStr;
use tracing::trace;
use types::{
    Action, DataType, Offset, PauseDuration, SizeUnit, Value, ValueGenerate, ValueLiteral,
    MAX_GENERATED_SIZE,
};

#[derive(Parser)]
#[grammar = "grammar.pest"]
struct SpecParser;

type Pair<'i> = pest::iterators::Pair<'i, Rule>;

/// A message kind with a textual grammar
pub trait Parse: Message {
    /// Spec prefix identifying a nested message of this kind
    const NESTED_PREAMBLE: &'static str;

    fn parse(spec: &str) -> SpecResult<Self>;
}

/// 1-based line and column of a byte offset
pub(crate) fn line_column(input: &str, offset: usize) -> (usize, usize) {
    let before = &input[..offset.min(input.len())];
    let line = before.matches('\n').count() + 1;
    let column = before.rsplit('\n').next().unwrap_or_default().chars().count() + 1;
    (line, column)
}

pub fn parse_response(spec: &str) -> SpecResult<Response> {
    let tokens = Builder { input: spec }.tokens(Rule::response)?;
    let response = Response::new(tokens)?;
    trace!(spec, "parsed response");
    Ok(response)
}

pub fn parse_request(spec: &str) -> SpecResult<Request> {
    let tokens = Builder { input: spec }.tokens(Rule::request)?;
    let request = Request::new(tokens)?;
    trace!(spec, "parsed request");
    Ok(request)
}

/// Map a grammar failure to a positioned error
fn syntax_error(err: pest::error::Error<Rule>) -> SpecError {
    let (line, column) = match err.line_col {
        LineColLocation::Pos(pos) => pos,
        LineColLocation::Span(start, _) => start,
    };
    let message = match err.variant {
        ErrorVariant::ParsingError { positives, .. } => expected(&positives),
        ErrorVariant::CustomError { message } => message,
    };
    SpecError::parse(message, line, column)
}

fn expected(positives: &[Rule]) -> String {
    let mut names: Vec<&str> = positives.iter().copied().map(describe).collect();
    names.sort_unstable();
    names.dedup();
    if names.is_empty() {
        "Unexpected input".to_string()
    } else {
        format!("Expected {}", names.join(" or "))
    }
}

/// Human name of a grammar rule
fn describe(rule: Rule) -> &'static str {
    match rule {
        Rule::header
        | Rule::content_type
        | Rule::location
        | Rule::user_agent
        | Rule::raw
        | Rule::reason
        | Rule::body
        | Rule::nested_response
        | Rule::times
        | Rule::pause
        | Rule::disconnect
        | Rule::inject => "component",
        Rule::EOI => "end of text",
        Rule::status => "status code",
        Rule::method | Rule::method_name => "method",
        Rule::path | Rule::naked => "path",
        Rule::literal => "literal",
        Rule::single_text | Rule::double_text => "closing quote",
        Rule::generate => "generated value",
        Rule::unit => "size unit",
        Rule::datatype => "datatype",
        Rule::offset | Rule::offset_random | Rule::offset_end => "offset",
        Rule::forever => "pause duration",
        Rule::integer => "integer",
        _ => "valid input",
    }
}

fn error_at(pair: &Pair<'_>, message: impl Into<String>) -> SpecError {
    let (line, column) = pair.as_span().start_pos().line_col();
    SpecError::parse(message, line, column)
}

/// The `index`th child of `pair`
fn part<'i>(pair: &Pair<'i>, index: usize, what: &str) -> SpecResult<Pair<'i>> {
    pair.clone()
        .into_inner()
        .nth(index)
        .ok_or_else(|| error_at(pair, format!("Expected {}", what)))
}

fn integer<T: FromStr>(pair: &Pair<'_>, what: &str) -> SpecResult<T> {
    pair.as_str()
        .parse()
        .map_err(|_| error_at(pair, format!("Integer out of range for {}", what)))
}

fn offset(pair: &Pair<'_>) -> SpecResult<Offset> {
    let inner = part(pair, 0, "offset")?;
    match inner.as_rule() {
        Rule::offset_random => Ok(Offset::Random),
        Rule::offset_end => Ok(Offset::End),
        _ => Ok(Offset::At(integer(&inner, "offset")?)),
    }
}

fn generate(pair: &Pair<'_>) -> SpecResult<ValueGenerate> {
    let mut size = None;
    let mut unit = SizeUnit::B;
    let mut datatype = DataType::default();
    for child in pair.clone().into_inner() {
        let text = child.as_str();
        match child.as_rule() {
            Rule::integer => size = Some(integer(&child, "size")?),
            Rule::unit => {
                unit = text
                    .chars()
                    .next()
                    .and_then(SizeUnit::from_char)
                    .ok_or_else(|| error_at(&child, format!("Unknown size unit '{}'", text)))?
            }
            Rule::datatype => {
                datatype = text
                    .parse()
                    .map_err(|_| error_at(&child, format!("Unknown datatype '{}'", text)))?
            }
            _ => {}
        }
    }

    let size = size.ok_or_else(|| error_at(pair, "Expected size"))?;
    let generate = ValueGenerate::new(size, unit, datatype);
    if !generate.within_limit() {
        return Err(error_at(
            pair,
            format!(
                "Generated value of {} bytes exceeds the {} byte limit",
                generate.bytes(),
                MAX_GENERATED_SIZE
            ),
        ));
    }
    Ok(generate)
}

/// Turns the pairs of one parse into tokens
struct Builder<'i> {
    input: &'i str,
}

impl<'i> Builder<'i> {
    fn tokens(&self, rule: Rule) -> SpecResult<Vec<Token>> {
        let root = SpecParser::parse(rule, self.input)
            .map_err(syntax_error)?
            .next()
            .ok_or_else(|| SpecError::parse("Expected specification", 1, 1))?;

        root.into_inner()
            .filter(|pair| pair.as_rule() != Rule::EOI)
            .map(|pair| self.token(&pair))
            .collect()
    }

    fn token(&self, pair: &Pair<'i>) -> SpecResult<Token> {
        let token = match pair.as_rule() {
            Rule::status => Token::StatusCode(integer(pair, "status code")?),
            Rule::method => Token::Method(self.method(&part(pair, 0, "method")?)?),
            Rule::path => Token::Path(self.value(&part(pair, 0, "path")?)?),
            Rule::header => Token::Header(Header::new(
                self.value(&part(pair, 0, "header name")?)?,
                self.value(&part(pair, 1, "header value")?)?,
            )),
            Rule::content_type => {
                Token::Header(Header::shortcut(HeaderKind::ContentType, self.first_value(pair)?))
            }
            Rule::location => {
                Token::Header(Header::shortcut(HeaderKind::Location, self.first_value(pair)?))
            }
            Rule::user_agent => {
                Token::Header(Header::shortcut(HeaderKind::UserAgent, self.first_value(pair)?))
            }
            Rule::raw => Token::Raw,
            Rule::reason => Token::Reason(self.first_value(pair)?),
            Rule::body => Token::Body(self.first_value(pair)?),
            Rule::nested_response => self.nested_response(&part(pair, 0, "literal")?)?,
            Rule::times => Token::Times(integer(&part(pair, 0, "repeat count")?, "repeat count")?),
            Rule::pause => {
                let offset = offset(&part(pair, 0, "offset")?)?;
                let duration = part(pair, 1, "pause duration")?;
                let duration = match duration.as_rule() {
                    Rule::forever => PauseDuration::Forever,
                    _ => PauseDuration::Seconds(integer(&duration, "pause duration")?),
                };
                Token::Action(Action::PauseAt { offset, duration })
            }
            Rule::disconnect => Token::Action(Action::DisconnectAt {
                offset: offset(&part(pair, 0, "offset")?)?,
            }),
            Rule::inject => Token::Action(Action::InjectAt {
                offset: offset(&part(pair, 0, "offset")?)?,
                value: self.value(&part(pair, 1, "value")?)?,
            }),
            _ => return Err(error_at(pair, "Expected component")),
        };
        Ok(token)
    }

    fn first_value(&self, pair: &Pair<'i>) -> SpecResult<Value> {
        self.value(&part(pair, 0, "value")?)
    }

    fn value(&self, pair: &Pair<'i>) -> SpecResult<Value> {
        match pair.as_rule() {
            Rule::literal => Ok(Value::Literal(self.literal(pair)?)),
            Rule::generate => Ok(Value::Generate(generate(pair)?)),
            Rule::naked => Ok(Value::Naked(self.unescape(pair)?)),
            _ => Err(error_at(pair, "Expected value")),
        }
    }

    fn literal(&self, pair: &Pair<'i>) -> SpecResult<ValueLiteral> {
        self.unescape(&part(pair, 0, "literal text")?)
    }

    /// Decode escaped text, positioning failures at the offending escape
    fn unescape(&self, text: &Pair<'i>) -> SpecResult<ValueLiteral> {
        ValueLiteral::from_escaped(text.as_str()).map_err(|source| {
            let (line, column) =
                line_column(self.input, text.as_span().start() + source.position());
            SpecError::Escape {
                line,
                column,
                source,
            }
        })
    }

    fn method(&self, pair: &Pair<'i>) -> SpecResult<RequestMethod> {
        if pair.as_rule() != Rule::method_name {
            return Ok(RequestMethod::Custom(self.value(pair)?));
        }
        let name = pair.as_str();
        Method::from_name(name)
            .map(RequestMethod::Known)
            .ok_or_else(|| error_at(pair, format!("Unknown method '{}'", name)))
    }

    fn nested_response(&self, literal: &Pair<'i>) -> SpecResult<Token> {
        let (line, column) = literal.as_span().start_pos().line_col();
        let value = self.literal(literal)?;
        let nested = NestedMessage::<Response>::new(value)
            .map_err(|inner| SpecError::nested(line, column, inner))?;
        Ok(Token::NestedResponse(Box::new(nested)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind;

    fn position(err: &SpecError) -> (usize, usize) {
        err.location().unwrap()
    }

    #[test]
    fn test_line_column() {
        assert_eq!(line_column("abc", 0), (1, 1));
        assert_eq!(line_column("abc", 2), (1, 3));
        assert_eq!(line_column("ab\ncd", 4), (2, 2));
        assert_eq!(line_column("ab\n", 3), (2, 1));
    }

    #[test]
    fn test_parse_response_components() {
        let response = parse_response("200:h'X-A'='1':c'text/plain':b'hi':p4,1:da:i0,'!'").unwrap();
        assert_eq!(response.tokens().len(), 7);
        assert_eq!(response.status_code(), Some(200));
        assert_eq!(response.headers().len(), 2);
        assert_eq!(response.actions().len(), 3);
        assert_eq!(
            response.spec(),
            "200:h'X-A'='1':c'text/plain':b'hi':p4,1:da:i0,'!'"
        );
    }

    #[test]
    fn test_parse_generated_values() {
        let response = parse_response("404:b@10k,digits:m@3").unwrap();
        assert_eq!(response.spec(), "404:b@10k,digits:m@3b,bytes");
        assert_eq!(response.body().unwrap().len(&Default::default()), 10 * 1024);
    }

    #[test]
    fn test_parse_double_quoted_literal() {
        let response = parse_response("200:b\"it's\"").unwrap();
        assert_eq!(response.spec(), "200:b'it\\x27s'");
    }

    #[test]
    fn test_whitespace_around_separators() {
        let response = parse_response("  200 :\n  b'x' \n").unwrap();
        assert_eq!(response.spec(), "200:b'x'");
    }

    #[test]
    fn test_parse_request() {
        let request = parse_request("GET:/foo/bar:u'fray':x3").unwrap();
        assert_eq!(request.method(), Some(&RequestMethod::Known(Method::Get)));
        assert_eq!(request.times(), 3);
        assert_eq!(request.spec(), "get:/foo/bar:u'fray':x3");
    }

    #[test]
    fn test_parse_custom_method() {
        let request = parse_request("'PATCH':'/a b'").unwrap();
        assert_eq!(request.spec(), "'PATCH':'/a b'");
        assert!(matches!(
            request.method(),
            Some(RequestMethod::Custom(Value::Literal(_)))
        ));
    }

    #[test]
    fn test_parse_nested_response() {
        let request = parse_request("get:/:s'201:b\"x\"'").unwrap();
        let Some(Token::NestedResponse(nested)) = request.tok(TokenKind::NestedResponse) else {
            panic!("nested response missing");
        };
        assert_eq!(nested.parsed().status_code(), Some(201));
        assert_eq!(request.spec(), "get:/:s'201:b\"x\"'");
    }

    #[test]
    fn test_unknown_component_position() {
        let err = parse_response("200:\n  q'x'").unwrap_err();
        assert_eq!(position(&err), (2, 3));
        assert!(err.to_string().contains("Expected component"));

        // Response-only components are rejected in requests
        let err = parse_request("get:/:m'x'").unwrap_err();
        assert_eq!(position(&err), (1, 7));
    }

    #[test]
    fn test_trailing_garbage() {
        let err = parse_response("200x").unwrap_err();
        assert_eq!(position(&err), (1, 4));
        assert!(err.to_string().contains("end of text"));
    }

    #[test]
    fn test_missing_status() {
        let err = parse_response("b'x'").unwrap_err();
        assert_eq!(position(&err), (1, 1));
        assert!(err.to_string().contains("status code"));
    }

    #[test]
    fn test_unterminated_literal() {
        let err = parse_response("200:b'abc").unwrap_err();
        assert!(matches!(err, SpecError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_bad_escape_position() {
        let err = parse_response("200:b'ab\\xZZ'").unwrap_err();
        match err {
            SpecError::Escape { line, column, .. } => assert_eq!((line, column), (1, 9)),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_unknown_datatype() {
        let err = parse_response("200:b@5,emoji").unwrap_err();
        assert_eq!(err, SpecError::parse("Unknown datatype 'emoji'", 1, 9));
    }

    #[test]
    fn test_unknown_method() {
        let err = parse_request("fetch:/").unwrap_err();
        assert_eq!(err, SpecError::parse("Unknown method 'fetch'", 1, 1));
    }

    #[test]
    fn test_generated_size_limit() {
        let response = parse_response("200:b@1g").unwrap();
        assert_eq!(response.spec(), "200:b@1g,bytes");

        let err = parse_response("200:b@1025m").unwrap_err();
        assert_eq!(position(&err), (1, 6));
        assert!(err.to_string().contains("byte limit"));

        let err = parse_response("200:b@18446744073709551615t").unwrap_err();
        assert_eq!(position(&err), (1, 6));

        let err = parse_request("get:/:i0,@1t").unwrap_err();
        assert_eq!(position(&err), (1, 10));

        // Too large for a size at all
        let err = parse_response("200:b@99999999999999999999999").unwrap_err();
        assert_eq!(position(&err), (1, 7));
    }

    #[test]
    fn test_integer_overflow() {
        let err = parse_response("99999999999999999999999").unwrap_err();
        assert_eq!(position(&err), (1, 1));
    }

    #[test]
    fn test_duplicate_clause() {
        let err = parse_response("200:b'a':b'b'").unwrap_err();
        assert_eq!(err, SpecError::duplicate_clause("body"));
    }

    #[test]
    fn test_nested_error_keeps_both_positions() {
        let err = parse_request("get:/\n:s'200:\"x\"'").unwrap_err();
        match &err {
            SpecError::Nested { line, column, source } => {
                assert_eq!((*line, *column), (2, 3));
                assert_eq!(source.location(), Some((1, 5)));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }
}
