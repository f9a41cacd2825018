//! Catalog record types.

use std::fmt;

use indexmap::IndexSet;
use serde::{Deserialize, Deserializer, Serialize};

/// Marker stored in place of a default whose expression is not a literal.
pub const NON_CONSTANT: &str = "<non-constant>";

/// Object field holding a bytes default on disk.
const BYTES_FIELD: &str = "bytes";

/// Statically known default of an environment variable lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "serde_json::Value", into = "serde_json::Value")]
pub enum DefaultValue {
    Str(String),
    /// A bytes literal, decoded to text; stored as `{"bytes": ...}`.
    Bytes(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// A default was given but it is an expression, not a literal.
    NonConstant,
}

impl DefaultValue {
    /// Runtime type name of the literal, if it is one.
    pub fn type_name(&self) -> Option<&'static str> {
        match self {
            DefaultValue::Str(_) => Some("str"),
            DefaultValue::Bytes(_) => Some("bytes"),
            DefaultValue::Int(_) => Some("int"),
            DefaultValue::Float(_) => Some("float"),
            DefaultValue::Bool(_) => Some("bool"),
            DefaultValue::NonConstant => None,
        }
    }

    /// Whether the value would count as "set" in a boolean context.
    pub fn is_truthy(&self) -> bool {
        match self {
            DefaultValue::Str(s) | DefaultValue::Bytes(s) => !s.is_empty(),
            DefaultValue::Int(i) => *i != 0,
            DefaultValue::Float(f) => *f != 0.0,
            DefaultValue::Bool(b) => *b,
            DefaultValue::NonConstant => true,
        }
    }
}

impl fmt::Display for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Str(s) => write!(f, "{}", s),
            DefaultValue::Bytes(b) => write!(f, "{}", bytes_text(b)),
            DefaultValue::Int(i) => write!(f, "{}", i),
            DefaultValue::Float(v) => write!(f, "{}", float_text(*v)),
            DefaultValue::Bool(true) => write!(f, "True"),
            DefaultValue::Bool(false) => write!(f, "False"),
            DefaultValue::NonConstant => write!(f, "{}", NON_CONSTANT),
        }
    }
}

/// Render a float the way catalog keys have always spelled them (`1.0`, `0.5`, `1e+20`).
fn float_text(v: f64) -> String {
    if v.is_nan() {
        return "nan".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf".to_string() } else { "-inf".to_string() };
    }
    if v != 0.0 && (v.abs() >= 1e16 || v.abs() < 1e-4) {
        let text = format!("{:e}", v);
        return match text.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{:0>2}", mantissa, exp),
            Some((mantissa, exp)) => format!("{}e-{:0>2}", mantissa, &exp[1..]),
            None => text,
        };
    }
    if v.fract() == 0.0 {
        format!("{:.1}", v)
    } else {
        format!("{}", v)
    }
}

/// Render bytes the way Python prints them: `b'raw'`, `b"it's"`, `b'\x00'`.
fn bytes_text(value: &str) -> String {
    let quote = if value.contains('\'') && !value.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(value.len() + 3);
    out.push('b');
    out.push(quote);
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            c => out.push_str(&format!("\\x{:02x}", u32::from(c))),
        }
    }
    out.push(quote);
    out
}

impl TryFrom<serde_json::Value> for DefaultValue {
    type Error = String;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        match value {
            serde_json::Value::String(s) if s == NON_CONSTANT => Ok(DefaultValue::NonConstant),
            serde_json::Value::String(s) => Ok(DefaultValue::Str(s)),
            serde_json::Value::Bool(b) => Ok(DefaultValue::Bool(b)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(DefaultValue::Int(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(DefaultValue::Float(f))
                } else {
                    Err(format!("unsupported default number: {}", n))
                }
            }
            serde_json::Value::Object(mut map) if map.len() == 1 => match map.remove(BYTES_FIELD) {
                Some(serde_json::Value::String(b)) => Ok(DefaultValue::Bytes(b)),
                _ => Err("unsupported default object".to_string()),
            },
            other => Err(format!("unsupported default value: {}", other)),
        }
    }
}

impl From<DefaultValue> for serde_json::Value {
    fn from(value: DefaultValue) -> Self {
        match value {
            DefaultValue::Str(s) => serde_json::Value::String(s),
            DefaultValue::Bytes(b) => {
                let mut map = serde_json::Map::new();
                map.insert(BYTES_FIELD.to_string(), serde_json::Value::String(b));
                serde_json::Value::Object(map)
            }
            DefaultValue::Int(i) => serde_json::Value::from(i),
            DefaultValue::Float(f) => serde_json::Number::from_f64(f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            DefaultValue::Bool(b) => serde_json::Value::Bool(b),
            DefaultValue::NonConstant => serde_json::Value::String(NON_CONSTANT.to_string()),
        }
    }
}

/// A call site: relative file path and 1-indexed line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub line: usize,
}

impl Location {
    pub fn new(file: impl Into<String>, line: usize) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// One distinct (name, default) pair found anywhere in a scanned tree.
///
/// Field order is the on-disk order used by create and update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    #[serde(default)]
    pub has_default: bool,
    #[serde(default)]
    pub default_value: Option<DefaultValue>,
    #[serde(default)]
    pub packages: IndexSet<String>,
    #[serde(default)]
    pub tags: IndexSet<String>,
    #[serde(default)]
    pub locations: Vec<Location>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub inferred_type: String,
}

impl CatalogEntry {
    /// Create an entry with no tags, packages or locations.
    pub fn new(name: impl Into<String>, has_default: bool, default_value: Option<DefaultValue>) -> Self {
        Self {
            name: name.into(),
            has_default,
            default_value,
            packages: IndexSet::new(),
            tags: IndexSet::new(),
            locations: Vec::new(),
            inferred_type: String::new(),
        }
    }

    /// Identity of the entry inside a catalog.
    pub fn key(&self) -> String {
        entry_key(&self.name, self.default_value.as_ref())
    }

    /// Default rendered for humans; `None` when no default exists.
    pub fn default_text(&self) -> String {
        match &self.default_value {
            Some(value) => value.to_string(),
            None => "None".to_string(),
        }
    }
}

/// Catalog key for a name and default: `NAME_<default text>`, `NAME_None` when absent.
pub fn entry_key(name: &str, default_value: Option<&DefaultValue>) -> String {
    match default_value {
        Some(value) => format!("{}_{}", name, value),
        None => format!("{}_None", name),
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
