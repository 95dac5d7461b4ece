use chrono::{NaiveDate, Utc};
use medconsult_core::validation::ConsultFields;
use medconsult_core::{Consult, Pagination};
use medconsult_store::{ConsultRepository, DoctorRepository, PatientRepository};

use super::new_id;
use crate::error::AppError;
use crate::AppState;

const CONSULT_NOT_FOUND: &str = "Consult not found";

pub struct ConsultService<'a> {
    consults: ConsultRepository<'a>,
    doctors: DoctorRepository<'a>,
    patients: PatientRepository<'a>,
}

impl<'a> ConsultService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self {
            consults: ConsultRepository::new(&state.store),
            doctors: DoctorRepository::new(&state.store),
            patients: PatientRepository::new(&state.store),
        }
    }

    /// Patient first, then doctor, matching the order clients see errors in
    fn check_references(&self, fields: &ConsultFields) -> Result<(), AppError> {
        if !self.patients.exists(&fields.patient_id)? {
            return Err(AppError::not_found("Patient not found"));
        }
        if !self.doctors.exists(&fields.doctor_id)? {
            return Err(AppError::not_found("Doctor not found"));
        }
        Ok(())
    }

    /// Book a consult. The doctor's and patient's back-reference lists are
    /// updated in the same transaction as the insert.
    pub fn create(&self, fields: ConsultFields) -> Result<Consult, AppError> {
        self.check_references(&fields)?;

        let now = Utc::now();
        let consult = Consult {
            id: new_id(),
            date: fields.date,
            shift: fields.shift,
            doctor_id: fields.doctor_id,
            patient_id: fields.patient_id,
            description: fields.description,
            created_at: now,
            updated_at: now,
        };
        self.consults.create(&consult)?;
        tracing::info!(
            consult_id = %consult.id,
            doctor_id = %consult.doctor_id,
            patient_id = %consult.patient_id,
            "Consult booked"
        );
        Ok(consult)
    }

    pub fn update(&self, id: &str, fields: ConsultFields) -> Result<Consult, AppError> {
        let existing = self.get_by_id(id)?;
        self.check_references(&fields)?;

        let consult = Consult {
            id: existing.id,
            date: fields.date,
            shift: fields.shift,
            doctor_id: fields.doctor_id,
            patient_id: fields.patient_id,
            description: fields.description,
            created_at: existing.created_at,
            updated_at: Utc::now(),
        };
        if self.consults.update(&consult)?.is_none() {
            return Err(AppError::not_found(CONSULT_NOT_FOUND));
        }
        Ok(consult)
    }

    pub fn delete(&self, id: &str) -> Result<(), AppError> {
        if self.consults.delete(id)?.is_none() {
            return Err(AppError::not_found(CONSULT_NOT_FOUND));
        }
        tracing::info!(consult_id = %id, "Consult cancelled");
        Ok(())
    }

    pub fn get_by_id(&self, id: &str) -> Result<Consult, AppError> {
        self.consults
            .find_by_id(id)?
            .ok_or_else(|| AppError::not_found(CONSULT_NOT_FOUND))
    }

    pub fn list(&self, page: Pagination) -> Result<Vec<Consult>, AppError> {
        Ok(self.consults.list(page)?)
    }

    pub fn find_by_date(&self, day: NaiveDate) -> Result<Vec<Consult>, AppError> {
        Ok(self.consults.find_by_date(day)?)
    }

    pub fn find_by_doctor(&self, doctor_id: &str) -> Result<Vec<Consult>, AppError> {
        Ok(self.consults.find_by_doctor(doctor_id)?)
    }

    pub fn find_by_patient(&self, patient_id: &str) -> Result<Vec<Consult>, AppError> {
        Ok(self.consults.find_by_patient(patient_id)?)
    }
}
