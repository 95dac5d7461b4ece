//! medconsult-core - domain model and validation for the consult manager.
//!
//! Nothing in this crate performs I/O.

pub mod error;
pub mod model;
pub mod payload;
pub mod validation;

pub use error::{Result, ValidationError};
pub use model::{
    ChangeRequest, Consult, Document, Doctor, Pagination, Patient, PublicUser, Role, Shift, User,
};
pub use payload::{
    ChangeRequestPayload, ConsultPayload, DoctorPayload, LoginPayload, PasswordChangePayload,
    PatientPayload, RegisterPayload, UserUpdatePayload,
};
