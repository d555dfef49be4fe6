//! paradoc — API parameter documentation engine
//!
//! Each documented interface declares a tree of parameters (nested objects,
//! arrays, scalars). This crate:
//! - persists an edited tree atomically (whole-tree replace into SQLite),
//! - reconstructs the tree from the flat row store,
//! - synthesizes a representative pretty-printed JSON example from the
//!   tree's type and example-value metadata.
//!
//! HTTP routing, auth and the rest of the CRUD surface live outside this
//! crate; callers hand in a resolved interface id and a tree payload.

pub mod engine;
pub mod param;
pub mod store;
pub mod synth;

pub use engine::DocEngine;
pub use param::{build_forest, ParamDraft, ParamNode, ParamType};
pub use store::{ApiInterface, InterfaceDraft, ParameterStore};
pub use synth::{build_example, render_example};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Interface not found: {0}")]
    InterfaceNotFound(i64),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("JSON generation failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
