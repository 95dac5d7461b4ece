//! Per-entity repositories over the document store

mod change_request;
mod consult;
mod doctor;
mod patient;
mod user;

pub use change_request::ChangeRequestRepository;
pub use consult::ConsultRepository;
pub use doctor::DoctorRepository;
pub use patient::PatientRepository;
pub use user::UserRepository;

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{TimeZone, Utc};
    use medconsult_core::{Consult, Doctor, Patient, Role, Shift, User};

    pub fn user(id: &str, email: &str, role: Role) -> User {
        let now = Utc::now();
        User {
            id: id.to_string(),
            name: format!("User {}", id),
            email: email.to_string(),
            password_hash: "$argon2id$v=19$stub".to_string(),
            role,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn doctor(id: &str, name: &str, specialty: &str) -> Doctor {
        Doctor {
            id: id.to_string(),
            name: name.to_string(),
            specialty: specialty.to_string(),
            consult_ids: Vec::new(),
        }
    }

    pub fn patient(id: &str, name: &str, age: u32) -> Patient {
        Patient {
            id: id.to_string(),
            name: name.to_string(),
            age,
            consult_ids: Vec::new(),
        }
    }

    pub fn consult(id: &str, doctor_id: &str, patient_id: &str, day: u32) -> Consult {
        let date = Utc.with_ymd_and_hms(2025, 3, day, 9, 30, 0).unwrap();
        Consult {
            id: id.to_string(),
            date,
            shift: Shift::Morning,
            doctor_id: doctor_id.to_string(),
            patient_id: patient_id.to_string(),
            description: "Check-up".to_string(),
            created_at: date,
            updated_at: date,
        }
    }
}
