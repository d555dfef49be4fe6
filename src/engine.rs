//! Engine facade.
//!
//! `DocEngine` wires the parameter store and the synthesis pass together:
//! save a nested payload as one whole-tree replace, load it back as a
//! forest, or render the interface's JSON example. One engine per store;
//! every call is a single synchronous unit of work.

use crate::param::{build_forest, ParamDraft, ParamNode};
use crate::store::{ApiInterface, InterfaceDraft, ParameterStore};
use crate::synth::render_example;
use crate::Result;
use std::path::Path;

pub struct DocEngine {
    store: ParameterStore,
}

impl DocEngine {
    /// Open an engine over a store at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            store: ParameterStore::open(path)?,
        })
    }

    /// Engine over an in-memory store.
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            store: ParameterStore::open_in_memory()?,
        })
    }

    /// Wrap an already-opened store.
    pub fn with_store(store: ParameterStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &ParameterStore {
        &self.store
    }

    // ========== Interfaces ==========

    pub fn create_interface(&self, draft: &InterfaceDraft) -> Result<ApiInterface> {
        self.store.create_interface(draft)
    }

    pub fn get_interface(&self, id: i64) -> Result<ApiInterface> {
        self.store.get_interface(id)
    }

    pub fn list_interfaces(&self) -> Result<Vec<ApiInterface>> {
        self.store.list_interfaces()
    }

    pub fn update_interface(&self, id: i64, draft: &InterfaceDraft) -> Result<ApiInterface> {
        self.store.update_interface(id, draft)
    }

    pub fn delete_interface(&self, id: i64) -> Result<()> {
        self.store.delete_interface(id)
    }

    // ========== Parameter trees ==========

    /// Save a nested parameter payload for an interface.
    ///
    /// Walks the drafts depth-first, assigning each node its 0-based
    /// position among its siblings as sort_order, then hands the whole
    /// forest to the store as a single atomic replace — nodes are never
    /// persisted one at a time, so a failed save leaves the previous tree
    /// intact.
    pub fn save_parameters(&self, interface_id: i64, drafts: &[ParamDraft]) -> Result<()> {
        let forest = build_forest(interface_id, drafts);
        self.store.replace_all(interface_id, &forest)
    }

    /// Load the full parameter forest, ordered by sort_order at every level.
    pub fn get_parameter_tree(&self, interface_id: i64) -> Result<Vec<ParamNode>> {
        self.store.load_tree(interface_id)
    }

    /// Generate the pretty-printed JSON example for an interface.
    pub fn generate_example(&self, interface_id: i64) -> Result<String> {
        let roots = self.store.load_tree(interface_id)?;
        let text = render_example(&roots)?;
        tracing::debug!(
            "Generated example for interface {} ({} bytes)",
            interface_id,
            text.len()
        );
        Ok(text)
    }
}
