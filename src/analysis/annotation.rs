//! Type names from assignment annotations.

use tree_sitter::Node;

/// Placeholder for annotations that cannot be reduced to a type name.
pub const UNKNOWN: &str = "unknown";

/// Wrappers whose parameters are the actual value types.
const UNION_WRAPPERS: &[&str] = &["Optional", "Union"];

/// Reduce an annotation node to a type name.
///
/// - `int` → `int`
/// - `Optional[int]` → `int`, `Union[str, int]` → `Union[str, int]`
/// - `str | None` → `Union[str, None]`
/// - `List[str]` → `List[...]`
pub fn type_name(node: Node, source: &[u8]) -> String {
    let node = unwrap_type(node);
    match node.kind() {
        "identifier" => text(node, source),
        "generic_type" => {
            let mut cursor = node.walk();
            let children: Vec<Node> = node.named_children(&mut cursor).collect();
            let base = children
                .iter()
                .find(|n| n.kind() == "identifier")
                .map(|n| text(*n, source));
            let params = children
                .iter()
                .find(|n| n.kind() == "type_parameter")
                .map(|p| {
                    let mut cursor = p.walk();
                    p.named_children(&mut cursor)
                        .filter(|n| n.kind() != "comment")
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default();
            parameterized(base, &params, source)
        }
        "subscript" => {
            let base = node
                .child_by_field_name("value")
                .filter(|n| n.kind() == "identifier")
                .map(|n| text(n, source));
            let mut cursor = node.walk();
            let params: Vec<Node> = node
                .children_by_field_name("subscript", &mut cursor)
                .collect();
            parameterized(base, &params, source)
        }
        "union_type" | "binary_operator" => {
            let mut members = Vec::new();
            if !collect_union(node, source, &mut members) {
                return UNKNOWN.to_string();
            }
            format!("Union[{}]", members.join(", "))
        }
        "none" => "None".to_string(),
        _ => UNKNOWN.to_string(),
    }
}

fn parameterized(base: Option<String>, params: &[Node], source: &[u8]) -> String {
    let Some(base) = base else {
        return UNKNOWN.to_string();
    };
    if !UNION_WRAPPERS.contains(&base.as_str()) {
        return format!("{}[...]", base);
    }

    // A single parameter may itself be a tuple in the subscript form.
    let members: Vec<Node> = match params {
        [only] if unwrap_type(*only).kind() == "tuple" => {
            let tuple = unwrap_type(*only);
            let mut cursor = tuple.walk();
            tuple.named_children(&mut cursor).collect()
        }
        _ => params.to_vec(),
    };

    match members.as_slice() {
        [] => UNKNOWN.to_string(),
        [only] => member_name(*only, source),
        many => {
            let names: Vec<String> = many.iter().map(|m| member_name(*m, source)).collect();
            format!("Union[{}]", names.join(", "))
        }
    }
}

fn member_name(node: Node, source: &[u8]) -> String {
    let node = unwrap_type(node);
    match node.kind() {
        "identifier" => text(node, source),
        "none" => "None".to_string(),
        _ => UNKNOWN.to_string(),
    }
}

/// Flatten `a | b | c`; false when an operator other than `|` shows up.
fn collect_union(node: Node, source: &[u8], members: &mut Vec<String>) -> bool {
    let node = unwrap_type(node);
    match node.kind() {
        "union_type" | "binary_operator" => {
            if node.kind() == "binary_operator" {
                let op = node
                    .child_by_field_name("operator")
                    .and_then(|n| n.utf8_text(source).ok());
                if op != Some("|") {
                    return false;
                }
            }
            let mut cursor = node.walk();
            let operands: Vec<Node> = node.named_children(&mut cursor).collect();
            operands
                .into_iter()
                .all(|operand| collect_union(operand, source, members))
        }
        _ => {
            members.push(member_name(node, source));
            true
        }
    }
}

/// Strip the grammar's `type` wrapper node.
fn unwrap_type(node: Node) -> Node {
    if node.kind() == "type" && node.named_child_count() == 1 {
        if let Some(inner) = node.named_child(0) {
            return inner;
        }
    }
    node
}

fn text(node: Node, source: &[u8]) -> String {
    node.utf8_text(source).unwrap_or(UNKNOWN).to_string()
}
