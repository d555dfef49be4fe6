//! Example synthesis.
//!
//! Turns a loaded parameter forest into one representative JSON value.
//! Synthesis is total: every type has an explicit fallback, so generation
//! always produces *some* JSON no matter how sparse or malformed a node's
//! example metadata is. Key order follows sibling sort_order throughout
//! (serde_json is built with `preserve_order`).

use crate::param::{ParamNode, ParamType};
use crate::Result;
use serde_json::{Map, Value};

/// Placeholder prefix for string parameters without an example value.
/// The generated value is this prefix plus the parameter name; the editing
/// frontend relies on the exact concatenation.
const STRING_PLACEHOLDER_PREFIX: &str = "示例";

/// Default number emitted when a number parameter has no example value.
const DEFAULT_NUMBER: i64 = 12345;

/// Arrays are rendered with this many copies of the single synthesized
/// element.
const ARRAY_EXAMPLE_LEN: usize = 2;

/// Build the ordered name → value map for a forest of root parameters.
pub fn build_example(roots: &[ParamNode]) -> Map<String, Value> {
    let mut out = Map::new();
    for node in roots {
        out.insert(node.name.clone(), node_value(node));
    }
    out
}

/// Build the example map and pretty-print it.
pub fn render_example(roots: &[ParamNode]) -> Result<String> {
    let example = Value::Object(build_example(roots));
    Ok(serde_json::to_string_pretty(&example)?)
}

fn node_value(node: &ParamNode) -> Value {
    match node.param_type {
        ParamType::Object => Value::Object(build_example(&node.children)),

        ParamType::Array => {
            // The first child is the element template. An object template
            // contributes the build of its *own* children (the array wraps
            // one level of the element schema); anything else contributes
            // its scalar synthesis. The one element is then repeated —
            // extra array children are ignored.
            let mut items = Vec::new();
            if let Some(first) = node.children.first() {
                let element = if first.param_type == ParamType::Object {
                    Value::Object(build_example(&first.children))
                } else {
                    scalar_value(first)
                };
                for _ in 0..ARRAY_EXAMPLE_LEN {
                    items.push(element.clone());
                }
            }
            Value::Array(items)
        }

        _ => scalar_value(node),
    }
}

fn scalar_value(node: &ParamNode) -> Value {
    let example = node.example_value.as_deref().filter(|s| !s.is_empty());

    match node.param_type {
        ParamType::Number => match example {
            Some(text) => parse_number(text),
            None => Value::from(DEFAULT_NUMBER),
        },
        ParamType::Boolean => match example {
            Some(text) => Value::Bool(text.eq_ignore_ascii_case("true")),
            None => Value::Bool(true),
        },
        // string is the catch-all: an object/array-typed node forced
        // through scalar synthesis (non-object array template) degrades to
        // string semantics
        _ => match example {
            Some(text) => Value::from(text),
            None => Value::from(format!("{}{}", STRING_PLACEHOLDER_PREFIX, node.name)),
        },
    }
}

/// Parse a numeric example: a decimal point means float, otherwise integer.
/// Unparseable text degrades to integer 0 rather than failing generation.
fn parse_number(text: &str) -> Value {
    if text.contains('.') {
        match text.parse::<f64>() {
            Ok(f) => serde_json::Number::from_f64(f)
                .map(Value::Number)
                .unwrap_or_else(|| Value::from(0)),
            Err(_) => Value::from(0),
        }
    } else {
        match text.parse::<i64>() {
            Ok(i) => Value::from(i),
            Err(_) => Value::from(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str, ty: ParamType, example: Option<&str>, children: Vec<ParamNode>) -> ParamNode {
        ParamNode {
            id: 0,
            interface_id: 1,
            parent_id: None,
            name: name.to_string(),
            param_type: ty,
            required: false,
            description: None,
            example_value: example.map(|s| s.to_string()),
            sort_order: 0,
            children,
        }
    }

    #[test]
    fn test_number_synthesis_fallbacks() {
        let cases = [
            (Some("3.5"), serde_json::json!(3.5)),
            (Some("3"), serde_json::json!(3)),
            (Some("abc"), serde_json::json!(0)),
            (None, serde_json::json!(12345)),
        ];
        for (example, expected) in cases {
            let n = node("amount", ParamType::Number, example, vec![]);
            assert_eq!(node_value(&n), expected, "example {:?}", example);
        }
    }

    #[test]
    fn test_boolean_synthesis_fallbacks() {
        let n = node("active", ParamType::Boolean, Some("false"), vec![]);
        assert_eq!(node_value(&n), serde_json::json!(false));

        let n = node("active", ParamType::Boolean, Some("TRUE"), vec![]);
        assert_eq!(node_value(&n), serde_json::json!(true));

        let n = node("active", ParamType::Boolean, None, vec![]);
        assert_eq!(node_value(&n), serde_json::json!(true));
    }

    #[test]
    fn test_string_placeholder_uses_name() {
        let n = node("token", ParamType::String, None, vec![]);
        assert_eq!(node_value(&n), serde_json::json!("示例token"));

        let n = node("token", ParamType::String, Some("abc123"), vec![]);
        assert_eq!(node_value(&n), serde_json::json!("abc123"));

        // empty example text counts as absent
        let n = node("token", ParamType::String, Some(""), vec![]);
        assert_eq!(node_value(&n), serde_json::json!("示例token"));
    }

    #[test]
    fn test_object_without_children_is_empty_map() {
        let n = node("meta", ParamType::Object, None, vec![]);
        assert_eq!(node_value(&n), serde_json::json!({}));
    }

    #[test]
    fn test_object_children_keep_order() {
        let n = node(
            "user",
            ParamType::Object,
            None,
            vec![
                node("zeta", ParamType::String, Some("z"), vec![]),
                node("alpha", ParamType::Number, Some("1"), vec![]),
            ],
        );
        let value = node_value(&n);
        let keys: Vec<&String> = value.as_object().expect("object").keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_array_duplicates_object_template() {
        // the array wraps the first child's children, and always emits two
        // copies regardless of how many children were supplied
        let n = node(
            "items",
            ParamType::Array,
            None,
            vec![
                node(
                    "item",
                    ParamType::Object,
                    None,
                    vec![
                        node("id", ParamType::Number, Some("7"), vec![]),
                        node("name", ParamType::String, None, vec![]),
                    ],
                ),
                node("ignored", ParamType::String, Some("x"), vec![]),
            ],
        );
        assert_eq!(
            node_value(&n),
            serde_json::json!([
                {"id": 7, "name": "示例name"},
                {"id": 7, "name": "示例name"}
            ])
        );
    }

    #[test]
    fn test_array_of_scalars_and_empty_array() {
        let n = node(
            "codes",
            ParamType::Array,
            None,
            vec![node("code", ParamType::Number, Some("42"), vec![])],
        );
        assert_eq!(node_value(&n), serde_json::json!([42, 42]));

        let n = node("codes", ParamType::Array, None, vec![]);
        assert_eq!(node_value(&n), serde_json::json!([]));
    }

    #[test]
    fn test_render_is_pretty_and_root_ordered() {
        let roots = vec![
            node("b", ParamType::String, Some("two"), vec![]),
            node("a", ParamType::Number, Some("1"), vec![]),
        ];
        let text = render_example(&roots).expect("render");
        assert!(text.contains('\n'));
        let b_pos = text.find("\"b\"").expect("b key");
        let a_pos = text.find("\"a\"").expect("a key");
        assert!(b_pos < a_pos, "root order must follow input order");
    }

    #[test]
    fn test_synthesis_is_pure() {
        let roots = vec![node(
            "user",
            ParamType::Object,
            None,
            vec![node("id", ParamType::Number, None, vec![])],
        )];
        assert_eq!(
            render_example(&roots).expect("first"),
            render_example(&roots).expect("second")
        );
    }
}
