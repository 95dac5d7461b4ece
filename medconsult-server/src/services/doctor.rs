use medconsult_core::validation::DoctorFields;
use medconsult_core::{Doctor, Pagination};
use medconsult_store::DoctorRepository;

use super::new_id;
use crate::error::AppError;
use crate::AppState;

const DOCTOR_NOT_FOUND: &str = "Doctor not found";

pub struct DoctorService<'a> {
    doctors: DoctorRepository<'a>,
}

impl<'a> DoctorService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self {
            doctors: DoctorRepository::new(&state.store),
        }
    }

    pub fn create(&self, fields: DoctorFields) -> Result<Doctor, AppError> {
        let doctor = Doctor {
            id: new_id(),
            name: fields.name,
            specialty: fields.specialty,
            consult_ids: Vec::new(),
        };
        self.doctors.create(&doctor)?;
        Ok(doctor)
    }

    pub fn list(&self, page: Pagination) -> Result<Vec<Doctor>, AppError> {
        Ok(self.doctors.list(page)?)
    }

    pub fn get_by_id(&self, id: &str) -> Result<Doctor, AppError> {
        self.doctors
            .find_by_id(id)?
            .ok_or_else(|| AppError::not_found(DOCTOR_NOT_FOUND))
    }

    pub fn find_by_name(&self, name: &str) -> Result<Vec<Doctor>, AppError> {
        Ok(self.doctors.find_by_name(name)?)
    }

    pub fn find_by_specialty(&self, specialty: &str) -> Result<Vec<Doctor>, AppError> {
        Ok(self.doctors.find_by_specialty(specialty)?)
    }

    pub fn update(&self, id: &str, fields: DoctorFields) -> Result<Doctor, AppError> {
        self.doctors
            .update(id, &fields)?
            .ok_or_else(|| AppError::not_found(DOCTOR_NOT_FOUND))
    }

    pub fn delete(&self, id: &str) -> Result<(), AppError> {
        if !self.doctors.delete(id)? {
            return Err(AppError::not_found(DOCTOR_NOT_FOUND));
        }
        Ok(())
    }
}
