//! Parameter tree types.
//!
//! A parameter is one field of an interface's payload. Parameters nest:
//! `object` and `array` parameters carry children, scalars are leaves. The
//! store keeps them as flat rows with parent references; this module holds
//! the in-memory tree shape plus the draft → forest construction used on the
//! save path.

use serde::{Deserialize, Serialize};

/// Parameter value type.
///
/// The stored `type` column is free text, so parsing is lenient: anything
/// unrecognized collapses to `String`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Number,
    Boolean,
    Object,
    Array,
}

impl ParamType {
    /// Parse a type name, case-insensitively. Unknown names default to
    /// `String`.
    pub fn parse(s: &str) -> ParamType {
        match s.to_lowercase().as_str() {
            "number" => ParamType::Number,
            "boolean" => ParamType::Boolean,
            "object" => ParamType::Object,
            "array" => ParamType::Array,
            _ => ParamType::String, // default fallback
        }
    }

    /// Canonical lowercase name, as written to the store.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Number => "number",
            ParamType::Boolean => "boolean",
            ParamType::Object => "object",
            ParamType::Array => "array",
        }
    }
}

impl Default for ParamType {
    fn default() -> Self {
        ParamType::String
    }
}

/// One node of a parameter tree.
///
/// `id` is the store rowid (0 for nodes not yet persisted). `parent_id` is
/// `None` for top-level parameters. `children` is populated when the full
/// tree is loaded, ordered by `sort_order` ascending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamNode {
    pub id: i64,
    pub interface_id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
    pub param_type: ParamType,
    pub required: bool,
    pub description: Option<String>,
    pub example_value: Option<String>,
    pub sort_order: i32,
    pub children: Vec<ParamNode>,
}

impl ParamNode {
    /// Check if this node is a leaf (no children).
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Count this node plus all descendants.
    pub fn subtree_size(&self) -> usize {
        1 + self.children.iter().map(|c| c.subtree_size()).sum::<usize>()
    }
}

/// Incoming parameter descriptor, arbitrarily nested.
///
/// `type` arrives as raw text and is normalized when the forest is built.
/// Any caller-supplied ordering field is ignored: sibling order is the
/// payload order, re-numbered 0-based at save time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamDraft {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: Option<String>,
    pub required: Option<bool>,
    pub description: Option<String>,
    pub example_value: Option<String>,
    #[serde(default)]
    pub children: Vec<ParamDraft>,
}

/// Build a `ParamNode` forest from a draft payload.
///
/// Depth-first pre-order walk. At each level `sort_order` is the 0-based
/// position within that sibling sequence. Defaults are applied here, once:
/// missing/unrecognized type → string, missing required → false. A draft
/// with children but a scalar type is accepted as-is; its children are kept
/// (the editor is allowed to save inconsistent intermediate states).
///
/// Parent links are not assigned here — they only exist in the store, where
/// they come from the nesting itself, so a payload can never introduce a
/// cycle.
pub fn build_forest(interface_id: i64, drafts: &[ParamDraft]) -> Vec<ParamNode> {
    drafts
        .iter()
        .enumerate()
        .map(|(pos, draft)| ParamNode {
            id: 0,
            interface_id,
            parent_id: None,
            name: draft.name.clone(),
            param_type: draft
                .param_type
                .as_deref()
                .map(ParamType::parse)
                .unwrap_or_default(),
            required: draft.required.unwrap_or(false),
            description: draft.description.clone(),
            example_value: draft.example_value.clone(),
            sort_order: pos as i32,
            children: build_forest(interface_id, &draft.children),
        })
        .collect()
}
