//! Request bodies as they arrive from clients.
//!
//! Every field is optional so that a missing field is reported by the
//! validation layer with a readable message instead of a decode error.

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPayload {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    /// Required when registering a doctor
    pub specialty: Option<String>,
    /// Required when registering a client
    pub age: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginPayload {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DoctorPayload {
    pub name: Option<String>,
    pub specialty: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatientPayload {
    pub name: Option<String>,
    pub age: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultPayload {
    pub date: Option<String>,
    pub shift: Option<String>,
    pub doctor_id: Option<String>,
    pub patient_id: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdatePayload {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChangePayload {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChangeRequestPayload {
    pub title: Option<String>,
    pub description: Option<String>,
}
