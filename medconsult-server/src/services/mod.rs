//! Domain services.
//!
//! Services orchestrate repositories and enforce cross-entity rules. Store
//! failures are converted to [`AppError`](crate::error::AppError) through
//! `From<StoreError>`: unexpected ones become 500s, while errors that are
//! already typed pass through `?` unchanged.

mod account;
mod change_request;
mod consult;
mod doctor;
mod patient;
mod user;

pub use account::AuthService;
pub use change_request::ChangeRequestService;
pub use consult::ConsultService;
pub use doctor::DoctorService;
pub use patient::PatientService;
pub use user::UserService;

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
