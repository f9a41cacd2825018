//! Evaluation of Python literal expressions.
//!
//! Only expressions Python itself folds into a constant are evaluated:
//! strings (minus f-strings), numbers, booleans and `None`. A negative
//! number is a unary expression and therefore not a literal.

use std::iter::Peekable;
use std::str::Chars;

use tree_sitter::Node;

use crate::catalog::DefaultValue;

/// A constant found in source.
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    /// `None` for the `None` literal.
    pub value: Option<DefaultValue>,
}

impl Literal {
    fn of(value: DefaultValue) -> Self {
        Self { value: Some(value) }
    }

    /// Runtime type name; absent for `None`.
    pub fn type_name(&self) -> Option<&'static str> {
        self.value.as_ref().and_then(DefaultValue::type_name)
    }

    /// The literal as text if it is a `str` constant.
    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            Some(DefaultValue::Str(s)) => Some(s),
            _ => None,
        }
    }
}

/// Evaluate `node` if it is a literal constant.
pub fn evaluate(node: Node, source: &[u8]) -> Option<Literal> {
    let text = node.utf8_text(source).ok()?;
    match node.kind() {
        "parenthesized_expression" => {
            let mut cursor = node.walk();
            let inner: Vec<Node> = node
                .named_children(&mut cursor)
                .filter(|n| n.kind() != "comment")
                .collect();
            match inner.as_slice() {
                [only] => evaluate(*only, source),
                _ => None,
            }
        }
        "string" => {
            let (value, bytes) = decode_string(text)?;
            Some(string_literal(value, bytes))
        }
        "concatenated_string" => {
            let mut cursor = node.walk();
            let mut joined = String::new();
            let mut bytes = false;
            for part in node.named_children(&mut cursor) {
                if part.kind() == "comment" {
                    continue;
                }
                if part.kind() != "string" {
                    return None;
                }
                let (value, is_bytes) = decode_string(part.utf8_text(source).ok()?)?;
                joined.push_str(&value);
                bytes |= is_bytes;
            }
            Some(string_literal(joined, bytes))
        }
        "integer" => parse_int(text).map(|i| Literal::of(DefaultValue::Int(i))),
        "float" => parse_float(text).map(|f| Literal::of(DefaultValue::Float(f))),
        "true" => Some(Literal::of(DefaultValue::Bool(true))),
        "false" => Some(Literal::of(DefaultValue::Bool(false))),
        "none" => Some(Literal { value: None }),
        _ => None,
    }
}

fn string_literal(value: String, bytes: bool) -> Literal {
    if bytes {
        Literal::of(DefaultValue::Bytes(value))
    } else {
        Literal::of(DefaultValue::Str(value))
    }
}

/// Split a string token into prefix, quotes and body, and decode the body.
///
/// Returns the value and whether it is a bytes literal. Formatted strings
/// are not constants and yield `None`.
fn decode_string(text: &str) -> Option<(String, bool)> {
    let quote_start = text.find(['"', '\''])?;
    let prefix = text[..quote_start].to_ascii_lowercase();
    if prefix.contains('f') || prefix.contains('t') {
        return None;
    }

    let quoted = &text[quote_start..];
    let width = if quoted.starts_with("\"\"\"") || quoted.starts_with("'''") {
        3
    } else {
        1
    };
    if quoted.len() < width * 2 {
        return None;
    }
    let body = &quoted[width..quoted.len() - width];

    let value = if prefix.contains('r') {
        body.to_string()
    } else {
        unescape(body)
    };
    Some((value, prefix.contains('b')))
}

fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(escaped) = chars.next() else {
            out.push('\\');
            break;
        };
        match escaped {
            // line continuation
            '\n' => {}
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            '\\' | '\'' | '"' => out.push(escaped),
            'a' => out.push('\x07'),
            'b' => out.push('\x08'),
            'f' => out.push('\x0c'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\x0b'),
            '0'..='7' => {
                let mut code = escaped.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|d| d.to_digit(8)) {
                        Some(d) => {
                            code = code * 8 + d;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.extend(char::from_u32(code));
            }
            'x' => push_hex(&mut out, &mut chars, 'x', 2),
            'u' => push_hex(&mut out, &mut chars, 'u', 4),
            'U' => push_hex(&mut out, &mut chars, 'U', 8),
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }

    out
}

/// Decode a fixed-width hex escape, keeping the text verbatim if malformed.
fn push_hex(out: &mut String, chars: &mut Peekable<Chars<'_>>, marker: char, width: usize) {
    let mut digits = String::with_capacity(width);
    while digits.len() < width {
        match chars.peek() {
            Some(d) if d.is_ascii_hexdigit() => {
                digits.push(*d);
                chars.next();
            }
            _ => break,
        }
    }

    let decoded = (digits.len() == width)
        .then(|| u32::from_str_radix(&digits, 16).ok())
        .flatten()
        .and_then(char::from_u32);
    match decoded {
        Some(c) => out.push(c),
        None => {
            out.push('\\');
            out.push(marker);
            out.push_str(&digits);
        }
    }
}

/// Parse an integer token.
///
/// Catalog defaults are JSON numbers, so values outside `i64` are not
/// kept; such a default is recorded as non-constant.
fn parse_int(text: &str) -> Option<i64> {
    let clean = text.replace('_', "").to_ascii_lowercase();
    let (digits, radix) = if let Some(rest) = clean.strip_prefix("0x") {
        (rest, 16)
    } else if let Some(rest) = clean.strip_prefix("0o") {
        (rest, 8)
    } else if let Some(rest) = clean.strip_prefix("0b") {
        (rest, 2)
    } else {
        (clean.as_str(), 10)
    };
    i64::from_str_radix(digits, radix).ok()
}

fn parse_float(text: &str) -> Option<f64> {
    let clean = text.replace('_', "");
    // imaginary literals are complex numbers
    if clean.ends_with(['j', 'J']) {
        return None;
    }
    clean.parse().ok()
}
