//! Doctor, patient, consult and change-request rules

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use super::required;
use crate::error::{Result, ValidationError};
use crate::model::Shift;
use crate::payload::{ChangeRequestPayload, ConsultPayload, DoctorPayload, PatientPayload};

const MAX_PATIENT_AGE: f64 = 150.0;

#[derive(Debug, Clone, PartialEq)]
pub struct DoctorFields {
    pub name: String,
    pub specialty: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PatientFields {
    pub name: String,
    pub age: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConsultFields {
    pub date: DateTime<Utc>,
    pub shift: Shift,
    pub doctor_id: String,
    pub patient_id: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChangeRequestFields {
    pub title: String,
    pub description: String,
}

pub fn validate_doctor(payload: &DoctorPayload) -> Result<DoctorFields> {
    let name = required(payload.name.as_deref(), "Name")?;
    let specialty = required(payload.specialty.as_deref(), "Specialty")?;
    Ok(DoctorFields {
        name: name.to_string(),
        specialty: specialty.to_string(),
    })
}

pub fn validate_patient(payload: &PatientPayload) -> Result<PatientFields> {
    let name = required(payload.name.as_deref(), "Name")?;
    let age = match payload.age {
        Some(age) if age.fract() == 0.0 && (0.0..=MAX_PATIENT_AGE).contains(&age) => age as u32,
        Some(_) => {
            return Err(ValidationError::new(
                "Age must be a whole number between 0 and 150",
            ));
        }
        None => return Err(ValidationError::new("Age is required")),
    };
    Ok(PatientFields {
        name: name.to_string(),
        age,
    })
}

pub fn validate_consult(payload: &ConsultPayload) -> Result<ConsultFields> {
    let date = required(payload.date.as_deref(), "Date")?;
    let date = parse_consult_date(date).ok_or_else(|| {
        ValidationError::new("Date must be an ISO 8601 date or date-time")
    })?;
    let shift: Shift = payload
        .shift
        .as_deref()
        .unwrap_or_default()
        .trim()
        .parse()
        .map_err(ValidationError::new)?;
    let doctor_id = required(payload.doctor_id.as_deref(), "Doctor id")?;
    let patient_id = required(payload.patient_id.as_deref(), "Patient id")?;
    let description = required(payload.description.as_deref(), "Description")?;

    Ok(ConsultFields {
        date,
        shift,
        doctor_id: doctor_id.to_string(),
        patient_id: patient_id.to_string(),
        description: description.to_string(),
    })
}

pub fn validate_change_request(payload: &ChangeRequestPayload) -> Result<ChangeRequestFields> {
    let title = required(payload.title.as_deref(), "Title")?;
    let description = required(payload.description.as_deref(), "Description")?;
    Ok(ChangeRequestFields {
        title: title.to_string(),
        description: description.to_string(),
    })
}

/// Accepts RFC 3339 (`2025-03-10T09:30:00Z`), a local date-time without an
/// offset (read as UTC), or a bare date (midnight UTC).
pub fn parse_consult_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn consult() -> ConsultPayload {
        ConsultPayload {
            date: Some("2025-03-10T09:30:00Z".to_string()),
            shift: Some("MORNING".to_string()),
            doctor_id: Some("d1".to_string()),
            patient_id: Some("p1".to_string()),
            description: Some("Annual check-up".to_string()),
        }
    }

    #[test]
    fn test_doctor_requires_fields() {
        let ok = DoctorPayload {
            name: Some("Dr. House".to_string()),
            specialty: Some("Diagnostics".to_string()),
        };
        assert_eq!(validate_doctor(&ok).unwrap().specialty, "Diagnostics");

        let missing = DoctorPayload {
            name: Some("Dr. House".to_string()),
            specialty: Some("".to_string()),
        };
        assert_eq!(
            validate_doctor(&missing).unwrap_err().message,
            "Specialty is required"
        );
    }

    #[test]
    fn test_patient_age() {
        let mut payload = PatientPayload {
            name: Some("Joana".to_string()),
            age: None,
        };
        assert_eq!(
            validate_patient(&payload).unwrap_err().message,
            "Age is required"
        );
        for age in [30.5, -1.0, 151.0] {
            payload.age = Some(age);
            assert_eq!(
                validate_patient(&payload).unwrap_err().message,
                "Age must be a whole number between 0 and 150"
            );
        }
        payload.age = Some(30.0);
        assert_eq!(validate_patient(&payload).unwrap().age, 30);
    }

    #[test]
    fn test_consult_valid() {
        let fields = validate_consult(&consult()).unwrap();
        assert_eq!(fields.shift, Shift::Morning);
        assert_eq!(fields.date.hour(), 9);
        assert_eq!(fields.doctor_id, "d1");
    }

    #[test]
    fn test_consult_rejects_unknown_shift() {
        let mut payload = consult();
        payload.shift = Some("EVENING".to_string());
        assert_eq!(
            validate_consult(&payload).unwrap_err().message,
            "Shift must be MORNING or AFTERNOON"
        );
        payload.shift = None;
        assert!(validate_consult(&payload).is_err());
    }

    #[test]
    fn test_consult_requires_references() {
        let mut payload = consult();
        payload.patient_id = None;
        assert_eq!(
            validate_consult(&payload).unwrap_err().message,
            "Patient id is required"
        );
    }

    #[test]
    fn test_consult_rejects_bad_date() {
        let mut payload = consult();
        payload.date = Some("next tuesday".to_string());
        assert!(validate_consult(&payload).is_err());
    }

    #[test]
    fn test_parse_consult_date_forms() {
        let d = parse_consult_date("2025-03-10").unwrap();
        assert_eq!((d.year(), d.month(), d.day(), d.hour()), (2025, 3, 10, 0));

        let d = parse_consult_date("2025-03-10T14:00").unwrap();
        assert_eq!(d.hour(), 14);

        let d = parse_consult_date("2025-03-10T14:00:00-03:00").unwrap();
        assert_eq!(d.hour(), 17);
    }

    #[test]
    fn test_change_request_requires_title() {
        let payload = ChangeRequestPayload {
            title: None,
            description: Some("Move to Friday".to_string()),
        };
        assert_eq!(
            validate_change_request(&payload).unwrap_err().message,
            "Title is required"
        );
    }
}
