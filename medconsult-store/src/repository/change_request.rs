use crate::collection::Collection;
use crate::document_store::DocumentStore;
use crate::error::Result;
use medconsult_core::{ChangeRequest, Pagination};

pub struct ChangeRequestRepository<'a> {
    requests: Collection<'a, ChangeRequest>,
}

impl<'a> ChangeRequestRepository<'a> {
    pub fn new(store: &'a DocumentStore) -> Self {
        Self {
            requests: Collection::new(store),
        }
    }

    pub fn create(&self, request: &ChangeRequest) -> Result<()> {
        self.requests.insert(request)
    }

    pub fn find_by_id(&self, id: &str) -> Result<Option<ChangeRequest>> {
        self.requests.get(id)
    }

    pub fn list(&self, page: Pagination) -> Result<Vec<ChangeRequest>> {
        self.requests.list(Some(page))
    }
}
