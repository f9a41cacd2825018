//! Python environment access extractor using tree-sitter.

use std::path::Path;

use streaming_iterator::StreamingIterator;
use tree_sitter::{Language, Node, Parser, Query, QueryCursor};

use super::annotation::{self, UNKNOWN};
use super::literal;
use super::{AnalysisError, EnvAccessExtractor, ParsedFile, RawFinding};
use crate::catalog::DefaultValue;

/// Tree-sitter query for the two supported access shapes.
const ENV_ACCESS_QUERY: &str = r#"
; os.environ.get("NAME", default)
(call
  function: (attribute
    object: (attribute
      object: (identifier) @module
      attribute: (identifier) @mapping)
    attribute: (identifier) @method)
  arguments: (argument_list) @args
  (#eq? @module "os")
  (#eq? @mapping "environ")
  (#eq? @method "get")
) @call

; os.getenv("NAME", default)
(call
  function: (attribute
    object: (identifier) @module
    attribute: (identifier) @method)
  arguments: (argument_list) @args
  (#eq? @module "os")
  (#eq? @method "getenv")
) @call
"#;

/// Argument kinds that are not positional.
const NON_POSITIONAL: &[&str] = &["keyword_argument", "dictionary_splat", "comment"];

pub struct PythonExtractor {
    language: Language,
    query: Query,
}

impl PythonExtractor {
    pub fn new() -> Result<Self, AnalysisError> {
        let language: Language = tree_sitter_python::LANGUAGE.into();
        let query = Query::new(&language, ENV_ACCESS_QUERY)?;
        Ok(Self { language, query })
    }

    fn create_parser(&self) -> Result<Parser, AnalysisError> {
        let mut parser = Parser::new();
        parser.set_language(&self.language)?;
        Ok(parser)
    }

    /// Build a finding from a matched call, or `None` if the call does not
    /// have a literal name.
    fn finding(&self, parsed: &ParsedFile, call: Node, args: Node) -> Option<RawFinding> {
        let source = &parsed.source[..];
        let mut cursor = args.walk();
        let positional: Vec<Node> = args
            .named_children(&mut cursor)
            .filter(|n| !NON_POSITIONAL.contains(&n.kind()))
            .collect();

        let name = literal::evaluate(*positional.first()?, source)?
            .as_str()
            .filter(|name| !name.is_empty())?
            .to_string();

        let (has_default, default_value, literal_type) = match positional.get(1) {
            None => (false, None, None),
            Some(arg) => match literal::evaluate(*arg, source) {
                Some(lit) => {
                    let type_name = lit.type_name();
                    (true, lit.value, type_name)
                }
                None => (true, Some(DefaultValue::NonConstant), None),
            },
        };

        let inferred_type = literal_type
            .map(str::to_string)
            .or_else(|| annotated_type(call, source));

        Some(RawFinding {
            name,
            has_default,
            default_value,
            line: call.start_position().row + 1,
            inferred_type,
        })
    }
}

/// Type annotation of the assignment the call is the value of, if any.
///
/// Parentheses around the call are looked through, but any other wrapper
/// stops the search: `x: int = int(os.getenv(..))` does not count, since
/// the annotated value is the outer call.
fn annotated_type(call: Node, source: &[u8]) -> Option<String> {
    let mut value = call;
    let mut parent = call.parent()?;
    while parent.kind() == "parenthesized_expression" {
        value = parent;
        parent = parent.parent()?;
    }
    if parent.kind() != "assignment" {
        return None;
    }
    let right = parent.child_by_field_name("right")?;
    if right.id() != value.id() {
        return None;
    }
    let annotation = parent.child_by_field_name("type")?;
    let name = annotation::type_name(annotation, source);
    (name != UNKNOWN).then_some(name)
}

/// Line of the first error or missing node.
fn first_error_line(root: Node) -> usize {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            return node.start_position().row + 1;
        }
        if node.has_error() {
            let mut cursor = node.walk();
            let children: Vec<Node> = node.children(&mut cursor).collect();
            // reversed so the earliest child is inspected first
            stack.extend(children.into_iter().rev());
        }
    }
    root.start_position().row + 1
}

impl EnvAccessExtractor for PythonExtractor {
    fn language_id(&self) -> &'static str {
        "python"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["py"]
    }

    fn parse(&self, path: &Path, source: &[u8]) -> Result<ParsedFile, AnalysisError> {
        let mut parser = self.create_parser()?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| AnalysisError::Unparsable {
                path: path.display().to_string(),
            })?;

        let root = tree.root_node();
        if root.has_error() {
            return Err(AnalysisError::Syntax {
                path: path.display().to_string(),
                line: first_error_line(root),
            });
        }

        Ok(ParsedFile {
            tree,
            source: source.to_vec(),
            path: path.to_string_lossy().to_string(),
        })
    }

    fn extract(&self, parsed: &ParsedFile) -> Vec<RawFinding> {
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&self.query, parsed.tree.root_node(), &parsed.source[..]);

        let mut calls = Vec::new();
        while let Some(m) = matches.next() {
            let mut call = None;
            let mut args = None;
            for capture in m.captures {
                match self.query.capture_names()[capture.index as usize] {
                    "call" => call = Some(capture.node),
                    "args" => args = Some(capture.node),
                    _ => {}
                }
            }
            if let (Some(call), Some(args)) = (call, args) {
                calls.push((call, args));
            }
        }

        // Outer calls before the calls nested in their arguments.
        calls.sort_by_key(|(call, _)| (call.start_byte(), std::cmp::Reverse(call.end_byte())));
        calls.dedup_by_key(|(call, _)| call.id());

        calls
            .into_iter()
            .filter_map(|(call, args)| {
                let finding = self.finding(parsed, call, args);
                if finding.is_none() {
                    tracing::trace!(
                        path = %parsed.path,
                        line = call.start_position().row + 1,
                        "skipping environment read without a literal name"
                    );
                }
                finding
            })
            .collect()
    }
}
