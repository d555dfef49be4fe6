//! Flat SQLite store for interfaces and their parameter trees.
//!
//! Parameters are rows with a nullable `parent_id`; the tree only ever
//! exists in memory, rebuilt by grouping rows by parent. Saving a tree is a
//! whole-tree replace: delete every row the interface owns, re-insert the
//! new forest, all inside one transaction so a reader never observes a
//! half-replaced tree.

use crate::param::{ParamNode, ParamType};
use crate::{Error, Result};
use rusqlite::{params, Connection, Row, Transaction};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

/// A documented HTTP interface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiInterface {
    pub id: i64,
    pub name: String,
    pub method: String,
    pub path: Option<String>,
    pub description: Option<String>,
    pub sort_order: i32,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Fields for creating or updating an interface.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InterfaceDraft {
    pub name: String,
    pub method: Option<String>,
    pub path: Option<String>,
    pub description: Option<String>,
    pub sort_order: Option<i32>,
}

/// SQLite-backed store. The connection sits behind a mutex, so concurrent
/// calls against the same store are serialized.
pub struct ParameterStore {
    conn: Mutex<Connection>,
}

impl ParameterStore {
    /// Open (or create) a store at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Self::init_db(&conn)?;
        tracing::info!("Opened parameter store at {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory store. Used by tests and dry runs.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_db(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init_db(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS interfaces (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                method TEXT NOT NULL DEFAULT 'GET',
                path TEXT,
                description TEXT,
                sort_order INTEGER NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS parameters (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                interface_id INTEGER NOT NULL REFERENCES interfaces(id),
                parent_id INTEGER REFERENCES parameters(id),
                name TEXT NOT NULL,
                type TEXT NOT NULL DEFAULT 'string',
                required INTEGER NOT NULL DEFAULT 0,
                description TEXT,
                example_value TEXT,
                sort_order INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX IF NOT EXISTS idx_parameters_interface ON parameters(interface_id);
            CREATE INDEX IF NOT EXISTS idx_parameters_parent ON parameters(parent_id);
        "#,
        )?;
        Ok(())
    }

    // ========== Interface registry ==========

    /// Create an interface, returning its assigned id.
    pub fn create_interface(&self, draft: &InterfaceDraft) -> Result<ApiInterface> {
        let conn = self.conn.lock().unwrap();
        let now = chrono::Utc::now().timestamp();
        conn.execute(
            r#"INSERT INTO interfaces (name, method, path, description, sort_order, created_at, updated_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)"#,
            params![
                draft.name,
                draft.method.as_deref().unwrap_or("GET"),
                draft.path,
                draft.description,
                draft.sort_order.unwrap_or(0),
                now,
            ],
        )?;
        let id = conn.last_insert_rowid();
        tracing::debug!("Created interface {} ({})", id, draft.name);
        Self::interface_by_id(&conn, id)
    }

    /// Fetch one interface; `InterfaceNotFound` if it does not exist.
    pub fn get_interface(&self, id: i64) -> Result<ApiInterface> {
        let conn = self.conn.lock().unwrap();
        Self::interface_by_id(&conn, id)
    }

    /// All interfaces, sort_order ascending.
    pub fn list_interfaces(&self) -> Result<Vec<ApiInterface>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, name, method, path, description, sort_order, created_at, updated_at
             FROM interfaces ORDER BY sort_order ASC, id ASC",
        )?;
        let rows = stmt.query_map([], Self::row_to_interface)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Update an interface's fields; `InterfaceNotFound` if missing.
    pub fn update_interface(&self, id: i64, draft: &InterfaceDraft) -> Result<ApiInterface> {
        let conn = self.conn.lock().unwrap();
        let now = chrono::Utc::now().timestamp();
        let changed = conn.execute(
            r#"UPDATE interfaces
               SET name = ?2, method = ?3, path = ?4, description = ?5, sort_order = ?6, updated_at = ?7
               WHERE id = ?1"#,
            params![
                id,
                draft.name,
                draft.method.as_deref().unwrap_or("GET"),
                draft.path,
                draft.description,
                draft.sort_order.unwrap_or(0),
                now,
            ],
        )?;
        if changed == 0 {
            return Err(Error::InterfaceNotFound(id));
        }
        Self::interface_by_id(&conn, id)
    }

    /// Delete an interface and all of its parameters, in one transaction.
    pub fn delete_interface(&self, id: i64) -> Result<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        Self::ensure_interface(&tx, id)?;
        tx.execute("DELETE FROM parameters WHERE interface_id = ?1", params![id])?;
        tx.execute("DELETE FROM interfaces WHERE id = ?1", params![id])?;
        tx.commit()?;
        tracing::info!("Deleted interface {}", id);
        Ok(())
    }

    // ========== Parameter trees ==========

    /// Replace the entire parameter forest of an interface.
    ///
    /// The delete and all inserts run in one transaction: a failure anywhere
    /// rolls back to the previous tree. Fails with `InterfaceNotFound` (and
    /// writes nothing) when the interface does not exist.
    pub fn replace_all(&self, interface_id: i64, roots: &[ParamNode]) -> Result<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        Self::ensure_interface(&tx, interface_id)?;
        tx.execute(
            "DELETE FROM parameters WHERE interface_id = ?1",
            params![interface_id],
        )?;
        Self::insert_forest(&tx, interface_id, None, roots)?;
        tx.commit()?;
        let total: usize = roots.iter().map(|n| n.subtree_size()).sum();
        tracing::info!(
            "Replaced parameter tree of interface {} ({} nodes)",
            interface_id,
            total
        );
        Ok(())
    }

    fn insert_forest(
        tx: &Transaction,
        interface_id: i64,
        parent_id: Option<i64>,
        nodes: &[ParamNode],
    ) -> Result<()> {
        for node in nodes {
            tx.execute(
                r#"INSERT INTO parameters (interface_id, parent_id, name, type, required, description, example_value, sort_order)
                   VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"#,
                params![
                    interface_id,
                    parent_id,
                    node.name,
                    node.param_type.as_str(),
                    node.required,
                    node.description,
                    node.example_value,
                    node.sort_order,
                ],
            )?;
            let id = tx.last_insert_rowid();
            Self::insert_forest(tx, interface_id, Some(id), &node.children)?;
        }
        Ok(())
    }

    /// Top-level parameters only (parent IS NULL), sort_order ascending.
    /// Children are not populated.
    pub fn load_top_level(&self, interface_id: i64) -> Result<Vec<ParamNode>> {
        let conn = self.conn.lock().unwrap();
        Self::ensure_interface(&conn, interface_id)?;
        let mut stmt = conn.prepare(
            "SELECT id, interface_id, parent_id, name, type, required, description, example_value, sort_order
             FROM parameters WHERE interface_id = ?1 AND parent_id IS NULL
             ORDER BY sort_order ASC, id ASC",
        )?;
        let rows = stmt.query_map(params![interface_id], Self::row_to_node)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// The full forest with children materialized at every level.
    ///
    /// One query, then a group-by-parent adjacency build: rows arrive in
    /// sort_order, so each sibling group comes out ordered without a second
    /// sort.
    pub fn load_tree(&self, interface_id: i64) -> Result<Vec<ParamNode>> {
        let conn = self.conn.lock().unwrap();
        Self::ensure_interface(&conn, interface_id)?;
        let mut stmt = conn.prepare(
            "SELECT id, interface_id, parent_id, name, type, required, description, example_value, sort_order
             FROM parameters WHERE interface_id = ?1
             ORDER BY sort_order ASC, id ASC",
        )?;
        let rows = stmt.query_map(params![interface_id], Self::row_to_node)?;

        let mut by_parent: HashMap<Option<i64>, Vec<ParamNode>> = HashMap::new();
        for row in rows {
            let node = row?;
            by_parent.entry(node.parent_id).or_default().push(node);
        }

        let roots = by_parent.remove(&None).unwrap_or_default();
        Ok(Self::attach_children(roots, &mut by_parent))
    }

    fn attach_children(
        nodes: Vec<ParamNode>,
        by_parent: &mut HashMap<Option<i64>, Vec<ParamNode>>,
    ) -> Vec<ParamNode> {
        nodes
            .into_iter()
            .map(|mut node| {
                let children = by_parent.remove(&Some(node.id)).unwrap_or_default();
                node.children = Self::attach_children(children, by_parent);
                node
            })
            .collect()
    }

    /// Remove every parameter of an interface. Idempotent: deleting zero
    /// rows is fine, and the interface itself need not exist.
    pub fn delete_all(&self, interface_id: i64) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let removed = conn.execute(
            "DELETE FROM parameters WHERE interface_id = ?1",
            params![interface_id],
        )?;
        tracing::debug!(
            "Deleted {} parameters of interface {}",
            removed,
            interface_id
        );
        Ok(())
    }

    // ========== Row mapping ==========

    fn ensure_interface(conn: &Connection, id: i64) -> Result<()> {
        let exists: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM interfaces WHERE id = ?1)",
                params![id],
                |row| row.get(0),
            )?;
        if exists {
            Ok(())
        } else {
            Err(Error::InterfaceNotFound(id))
        }
    }

    fn interface_by_id(conn: &Connection, id: i64) -> Result<ApiInterface> {
        use rusqlite::OptionalExtension;
        conn.query_row(
            "SELECT id, name, method, path, description, sort_order, created_at, updated_at
             FROM interfaces WHERE id = ?1",
            params![id],
            Self::row_to_interface,
        )
        .optional()?
        .ok_or(Error::InterfaceNotFound(id))
    }

    fn row_to_interface(row: &Row) -> rusqlite::Result<ApiInterface> {
        Ok(ApiInterface {
            id: row.get(0)?,
            name: row.get(1)?,
            method: row.get(2)?,
            path: row.get(3)?,
            description: row.get(4)?,
            sort_order: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }

    fn row_to_node(row: &Row) -> rusqlite::Result<ParamNode> {
        let type_str: String = row.get(4)?;
        Ok(ParamNode {
            id: row.get(0)?,
            interface_id: row.get(1)?,
            parent_id: row.get(2)?,
            name: row.get(3)?,
            // type is normalized at write time, but the column is free
            // text, so re-normalize on the way out too
            param_type: ParamType::parse(&type_str),
            required: row.get(5)?,
            description: row.get(6)?,
            example_value: row.get(7)?,
            sort_order: row.get(8)?,
            children: Vec::new(),
        })
    }
}
