//! medconsult-store - SQLite document persistence
//!
//! Entities are stored as JSON documents grouped by collection; the typed
//! repositories in [`repository`] are the only intended entry point for
//! services.

pub mod collection;
pub mod document_store;
pub mod error;
pub mod repository;

pub use collection::Collection;
pub use document_store::{DocumentStore, FieldValue, Filter, TransactionOps};
pub use error::{Result, StoreError};
pub use repository::{
    ChangeRequestRepository, ConsultRepository, DoctorRepository, PatientRepository,
    UserRepository,
};
