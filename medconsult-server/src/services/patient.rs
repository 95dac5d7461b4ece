use medconsult_core::validation::PatientFields;
use medconsult_core::{Pagination, Patient};
use medconsult_store::PatientRepository;

use super::new_id;
use crate::error::AppError;
use crate::AppState;

const PATIENT_NOT_FOUND: &str = "Patient not found";

pub struct PatientService<'a> {
    patients: PatientRepository<'a>,
}

impl<'a> PatientService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self {
            patients: PatientRepository::new(&state.store),
        }
    }

    pub fn create(&self, fields: PatientFields) -> Result<Patient, AppError> {
        let patient = Patient {
            id: new_id(),
            name: fields.name,
            age: fields.age,
            consult_ids: Vec::new(),
        };
        self.patients.create(&patient)?;
        Ok(patient)
    }

    pub fn list(&self, page: Pagination) -> Result<Vec<Patient>, AppError> {
        Ok(self.patients.list(page)?)
    }

    pub fn get_by_id(&self, id: &str) -> Result<Patient, AppError> {
        self.patients
            .find_by_id(id)?
            .ok_or_else(|| AppError::not_found(PATIENT_NOT_FOUND))
    }

    pub fn find_by_name(&self, name: &str) -> Result<Vec<Patient>, AppError> {
        Ok(self.patients.find_by_name(name)?)
    }

    pub fn find_by_age(&self, age: u32) -> Result<Vec<Patient>, AppError> {
        Ok(self.patients.find_by_age(age)?)
    }

    pub fn update(&self, id: &str, fields: PatientFields) -> Result<Patient, AppError> {
        self.patients
            .update(id, &fields)?
            .ok_or_else(|| AppError::not_found(PATIENT_NOT_FOUND))
    }

    pub fn delete(&self, id: &str) -> Result<(), AppError> {
        if !self.patients.delete(id)? {
            return Err(AppError::not_found(PATIENT_NOT_FOUND));
        }
        Ok(())
    }
}
