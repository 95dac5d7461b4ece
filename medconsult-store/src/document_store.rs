//! SQLite-based document storage
//!
//! Schema:
//!   - documents: (collection, id) -> JSON value, rowid keeps insertion order
//!   - idx_users_email: unique lower-cased `email` within the users collection

use crate::error::{Result, StoreError};
use medconsult_core::{Document, Pagination, User};
use rusqlite::{params, types::Value as SqlValue, Connection, OptionalExtension, Transaction};
use std::ops::Deref;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Comparable field value for [`Filter::Eq`]
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
}

impl From<&FieldValue> for SqlValue {
    fn from(value: &FieldValue) -> Self {
        match value {
            FieldValue::Text(s) => SqlValue::Text(s.clone()),
            FieldValue::Integer(i) => SqlValue::Integer(*i),
        }
    }
}

/// Predicate on a top-level JSON field of a document
#[derive(Debug, Clone, PartialEq)]
pub enum Filter<'a> {
    Eq(&'a str, FieldValue),
    EqIgnoreCase(&'a str, &'a str),
    ContainsIgnoreCase(&'a str, &'a str),
    /// String field starts with the given prefix
    Prefix(&'a str, &'a str),
}

impl Filter<'_> {
    fn field(&self) -> &str {
        match self {
            Filter::Eq(f, _)
            | Filter::EqIgnoreCase(f, _)
            | Filter::ContainsIgnoreCase(f, _)
            | Filter::Prefix(f, _) => f,
        }
    }

    /// SQL condition using `?2` as JSON path and `?3` as operand
    fn condition(&self) -> &'static str {
        match self {
            Filter::Eq(..) => "json_extract(value, ?2) = ?3",
            Filter::EqIgnoreCase(..) => "lower(json_extract(value, ?2)) = lower(?3)",
            Filter::ContainsIgnoreCase(..) => {
                "instr(lower(json_extract(value, ?2)), lower(?3)) > 0"
            }
            Filter::Prefix(..) => "substr(json_extract(value, ?2), 1, length(?3)) = ?3",
        }
    }

    fn operand(&self) -> SqlValue {
        match self {
            Filter::Eq(_, v) => v.into(),
            Filter::EqIgnoreCase(_, s) | Filter::ContainsIgnoreCase(_, s) | Filter::Prefix(_, s) => {
                SqlValue::Text((*s).to_string())
            }
        }
    }
}

/// LIMIT/OFFSET pair; `-1` is SQLite for "no limit"
fn bounds(page: Option<Pagination>) -> (i64, i64) {
    match page {
        Some(p) => (i64::from(p.limit()), p.offset() as i64),
        None => (-1, 0),
    }
}

/// SQLite-based document store
pub struct DocumentStore {
    conn: Mutex<Connection>,
}

impl DocumentStore {
    /// Open the store (create if not exists)
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;

        // Enable WAL mode for read-write concurrency
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS documents (
                collection TEXT NOT NULL,
                id TEXT NOT NULL,
                value TEXT NOT NULL,
                PRIMARY KEY (collection, id)
            )",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents(collection)",
            [],
        )?;
        conn.execute(
            &format!(
                "CREATE UNIQUE INDEX IF NOT EXISTS idx_users_email
                 ON documents(lower(json_extract(value, '$.email')))
                 WHERE collection = '{}'",
                User::COLLECTION
            ),
            [],
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    pub fn get(&self, collection: &str, id: &str) -> Result<Option<String>> {
        get(&*self.lock()?, collection, id)
    }

    /// Insert a new document; fails with `Duplicate` if the id or a unique
    /// field already exists.
    pub fn insert(&self, collection: &str, id: &str, value: &str) -> Result<()> {
        insert(&*self.lock()?, collection, id, value)
    }

    /// Overwrite an existing document. Returns false if it does not exist.
    pub fn replace(&self, collection: &str, id: &str, value: &str) -> Result<bool> {
        replace(&*self.lock()?, collection, id, value)
    }

    pub fn delete(&self, collection: &str, id: &str) -> Result<bool> {
        delete(&*self.lock()?, collection, id)
    }

    /// List documents of a collection in insertion order
    pub fn list(&self, collection: &str, page: Option<Pagination>) -> Result<Vec<String>> {
        let conn = self.lock()?;
        let (limit, offset) = bounds(page);
        let mut stmt = conn.prepare(
            "SELECT value FROM documents WHERE collection = ?1 ORDER BY rowid LIMIT ?2 OFFSET ?3",
        )?;
        let rows = stmt.query_map(params![collection, limit, offset], |row| {
            row.get::<_, String>(0)
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }

    /// List documents matching a filter in insertion order
    pub fn find(
        &self,
        collection: &str,
        filter: &Filter<'_>,
        page: Option<Pagination>,
    ) -> Result<Vec<String>> {
        let conn = self.lock()?;
        let (limit, offset) = bounds(page);
        let sql = format!(
            "SELECT value FROM documents WHERE collection = ?1 AND {} ORDER BY rowid LIMIT ?4 OFFSET ?5",
            filter.condition()
        );
        let path = format!("$.{}", filter.field());
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params![collection, path, filter.operand(), limit, offset],
            |row| row.get::<_, String>(0),
        )?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }

    /// Document counts by collection
    pub fn count_by_collection(&self) -> Result<Vec<(String, i64)>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT collection, COUNT(*) FROM documents GROUP BY collection ORDER BY collection",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }

    /// Execute multiple operations atomically within an SQLite transaction
    pub fn in_transaction<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&TransactionOps<'_>) -> Result<T>,
    {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let ops = TransactionOps { tx: &tx };
        let result = f(&ops)?;
        tx.commit()?;
        Ok(result)
    }
}

/// Operations available within a transaction
pub struct TransactionOps<'a> {
    tx: &'a Transaction<'a>,
}

impl TransactionOps<'_> {
    pub fn get(&self, collection: &str, id: &str) -> Result<Option<String>> {
        get(self.tx.deref(), collection, id)
    }

    pub fn insert(&self, collection: &str, id: &str, value: &str) -> Result<()> {
        insert(self.tx.deref(), collection, id, value)
    }

    pub fn replace(&self, collection: &str, id: &str, value: &str) -> Result<bool> {
        replace(self.tx.deref(), collection, id, value)
    }

    pub fn delete(&self, collection: &str, id: &str) -> Result<bool> {
        delete(self.tx.deref(), collection, id)
    }

    /// Typed read of a document
    pub fn load<T: Document>(&self, id: &str) -> Result<Option<T>> {
        self.get(T::COLLECTION, id)?
            .map(|json| serde_json::from_str(&json).map_err(Into::into))
            .transpose()
    }

    /// Typed overwrite of an existing document
    pub fn save<T: Document>(&self, doc: &T) -> Result<bool> {
        let json = serde_json::to_string(doc)?;
        self.replace(T::COLLECTION, doc.id(), &json)
    }
}

fn get(conn: &Connection, collection: &str, id: &str) -> Result<Option<String>> {
    conn.query_row(
        "SELECT value FROM documents WHERE collection = ?1 AND id = ?2",
        params![collection, id],
        |row| row.get::<_, String>(0),
    )
    .optional()
    .map_err(Into::into)
}

fn insert(conn: &Connection, collection: &str, id: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO documents (collection, id, value) VALUES (?1, ?2, ?3)",
        params![collection, id, value],
    )
    .map_err(|e| StoreError::from_write(collection, e))?;
    Ok(())
}

fn replace(conn: &Connection, collection: &str, id: &str, value: &str) -> Result<bool> {
    let rows = conn
        .execute(
            "UPDATE documents SET value = ?3 WHERE collection = ?1 AND id = ?2",
            params![collection, id, value],
        )
        .map_err(|e| StoreError::from_write(collection, e))?;
    Ok(rows > 0)
}

fn delete(conn: &Connection, collection: &str, id: &str) -> Result<bool> {
    let rows = conn.execute(
        "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
        params![collection, id],
    )?;
    Ok(rows > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> DocumentStore {
        DocumentStore::open(":memory:").unwrap()
    }

    #[test]
    fn test_insert_and_get() {
        let store = store();
        let data = r#"{"id":"d1","name":"Dr. Ana"}"#;
        store.insert("doctors", "d1", data).unwrap();

        assert_eq!(store.get("doctors", "d1").unwrap().as_deref(), Some(data));
        assert_eq!(store.get("patients", "d1").unwrap(), None);
    }

    #[test]
    fn test_insert_duplicate_id() {
        let store = store();
        store.insert("doctors", "d1", "{}").unwrap();
        let err = store.insert("doctors", "d1", "{}").unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { .. }));
    }

    #[test]
    fn test_unique_user_email_is_case_insensitive() {
        let store = store();
        store
            .insert("users", "u1", r#"{"id":"u1","email":"ana@example.com"}"#)
            .unwrap();
        let err = store
            .insert("users", "u2", r#"{"id":"u2","email":"ANA@example.com"}"#)
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { .. }));

        // Other collections are not constrained
        store
            .insert("doctors", "d1", r#"{"id":"d1","email":"ana@example.com"}"#)
            .unwrap();
    }

    #[test]
    fn test_replace_and_delete() {
        let store = store();
        assert!(!store.replace("doctors", "d1", "{}").unwrap());

        store.insert("doctors", "d1", r#"{"v":1}"#).unwrap();
        assert!(store.replace("doctors", "d1", r#"{"v":2}"#).unwrap());
        assert_eq!(store.get("doctors", "d1").unwrap().as_deref(), Some(r#"{"v":2}"#));

        assert!(store.delete("doctors", "d1").unwrap());
        assert!(!store.delete("doctors", "d1").unwrap());
        assert_eq!(store.get("doctors", "d1").unwrap(), None);
    }

    #[test]
    fn test_list_paginates_in_insertion_order() {
        let store = store();
        for i in 0..15 {
            let id = format!("z{:02}", 15 - i);
            store
                .insert("patients", &id, &format!(r#"{{"id":"{}"}}"#, id))
                .unwrap();
        }

        assert_eq!(store.list("patients", None).unwrap().len(), 15);

        let page2 = store.list("patients", Some(Pagination::new(2, 10))).unwrap();
        assert_eq!(page2.len(), 5);
        assert_eq!(page2[0], r#"{"id":"z05"}"#);
    }

    #[test]
    fn test_find_filters() {
        let store = store();
        store
            .insert("patients", "p1", r#"{"name":"Joana Silva","age":30,"date":"2025-03-10T09:00:00Z"}"#)
            .unwrap();
        store
            .insert("patients", "p2", r#"{"name":"Carlos","age":41,"date":"2025-03-11T09:00:00Z"}"#)
            .unwrap();

        let by_age = store
            .find("patients", &Filter::Eq("age", FieldValue::Integer(41)), None)
            .unwrap();
        assert_eq!(by_age.len(), 1);

        let by_name = store
            .find("patients", &Filter::ContainsIgnoreCase("name", "silva"), None)
            .unwrap();
        assert_eq!(by_name.len(), 1);

        let exact = store
            .find("patients", &Filter::EqIgnoreCase("name", "CARLOS"), None)
            .unwrap();
        assert_eq!(exact.len(), 1);

        let by_day = store
            .find("patients", &Filter::Prefix("date", "2025-03-10"), None)
            .unwrap();
        assert_eq!(by_day.len(), 1);

        let none = store
            .find("patients", &Filter::Eq("name", FieldValue::Text("joana".into())), None)
            .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_count_by_collection() {
        let store = store();
        store.insert("doctors", "d1", "{}").unwrap();
        store.insert("doctors", "d2", "{}").unwrap();
        store.insert("patients", "p1", "{}").unwrap();

        let counts = store.count_by_collection().unwrap();
        assert_eq!(
            counts,
            vec![("doctors".to_string(), 2), ("patients".to_string(), 1)]
        );
    }

    #[test]
    fn test_in_transaction_rollback() {
        let store = store();

        let result: Result<()> = store.in_transaction(|ops| {
            ops.insert("consults", "c1", "{}")?;
            Err(StoreError::Other("forced error".into()))
        });

        assert!(result.is_err());
        assert!(store.get("consults", "c1").unwrap().is_none());
    }

    #[test]
    fn test_in_transaction_commit() {
        let store = store();
        store.in_transaction(|ops| {
            ops.insert("consults", "c1", "{}")?;
            ops.insert("doctors", "d1", "{}")?;
            Ok(())
        })
        .unwrap();

        assert!(store.get("consults", "c1").unwrap().is_some());
        assert!(store.get("doctors", "d1").unwrap().is_some());
    }
}
