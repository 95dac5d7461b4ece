use crate::document_store::{DocumentStore, Filter};
use crate::error::Result;
use medconsult_core::{Document, Pagination};
use std::marker::PhantomData;

/// Typed view over the documents of one collection
pub struct Collection<'a, T> {
    store: &'a DocumentStore,
    _marker: PhantomData<T>,
}

impl<'a, T: Document> Collection<'a, T> {
    pub fn new(store: &'a DocumentStore) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    pub fn get(&self, id: &str) -> Result<Option<T>> {
        self.store
            .get(T::COLLECTION, id)?
            .map(|json| decode(&json))
            .transpose()
    }

    pub fn exists(&self, id: &str) -> Result<bool> {
        Ok(self.store.get(T::COLLECTION, id)?.is_some())
    }

    pub fn insert(&self, doc: &T) -> Result<()> {
        let json = serde_json::to_string(doc)?;
        self.store.insert(T::COLLECTION, doc.id(), &json)
    }

    pub fn replace(&self, doc: &T) -> Result<bool> {
        let json = serde_json::to_string(doc)?;
        self.store.replace(T::COLLECTION, doc.id(), &json)
    }

    pub fn delete(&self, id: &str) -> Result<bool> {
        self.store.delete(T::COLLECTION, id)
    }

    pub fn list(&self, page: Option<Pagination>) -> Result<Vec<T>> {
        decode_all(self.store.list(T::COLLECTION, page)?)
    }

    pub fn find(&self, filter: &Filter<'_>, page: Option<Pagination>) -> Result<Vec<T>> {
        decode_all(self.store.find(T::COLLECTION, filter, page)?)
    }

    pub fn find_one(&self, filter: &Filter<'_>) -> Result<Option<T>> {
        Ok(self
            .find(filter, Some(Pagination::new(1, 1)))?
            .into_iter()
            .next())
    }
}

fn decode<T: Document>(json: &str) -> Result<T> {
    serde_json::from_str(json).map_err(Into::into)
}

fn decode_all<T: Document>(rows: Vec<String>) -> Result<Vec<T>> {
    rows.iter().map(|json| decode(json)).collect()
}
