use chrono::Utc;
use medconsult_core::validation::ChangeRequestFields;
use medconsult_core::{ChangeRequest, Pagination};
use medconsult_store::ChangeRequestRepository;

use super::new_id;
use crate::error::AppError;
use crate::AppState;

pub struct ChangeRequestService<'a> {
    requests: ChangeRequestRepository<'a>,
}

impl<'a> ChangeRequestService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self {
            requests: ChangeRequestRepository::new(&state.store),
        }
    }

    pub fn create(&self, fields: ChangeRequestFields) -> Result<ChangeRequest, AppError> {
        let request = ChangeRequest {
            id: new_id(),
            title: fields.title,
            description: fields.description,
            created_at: Utc::now(),
        };
        self.requests.create(&request)?;
        Ok(request)
    }

    pub fn get_by_id(&self, id: &str) -> Result<ChangeRequest, AppError> {
        self.requests
            .find_by_id(id)?
            .ok_or_else(|| AppError::not_found("Request not found"))
    }

    pub fn list(&self, page: Pagination) -> Result<Vec<ChangeRequest>, AppError> {
        Ok(self.requests.list(page)?)
    }
}
