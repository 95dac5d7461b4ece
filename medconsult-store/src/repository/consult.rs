//! Consult persistence.
//!
//! Doctors and patients keep a `consultIds` back-reference list. Every write
//! here that touches a consult also updates those lists inside the same
//! SQLite transaction, so a consult is never left unreferenced by its doctor
//! or patient.

use chrono::NaiveDate;

use crate::collection::Collection;
use crate::document_store::{DocumentStore, FieldValue, Filter, TransactionOps};
use crate::error::{Result, StoreError};
use medconsult_core::{Consult, Doctor, Document, Pagination, Patient};

/// Documents carrying a consult back-reference list
trait ConsultHolder: Document {
    fn consult_ids_mut(&mut self) -> &mut Vec<String>;
}

impl ConsultHolder for Doctor {
    fn consult_ids_mut(&mut self) -> &mut Vec<String> {
        &mut self.consult_ids
    }
}

impl ConsultHolder for Patient {
    fn consult_ids_mut(&mut self) -> &mut Vec<String> {
        &mut self.consult_ids
    }
}

/// Append `consult_id` to the owner's list unless already present.
/// A missing owner aborts the transaction.
fn link<H: ConsultHolder>(ops: &TransactionOps<'_>, owner_id: &str, consult_id: &str) -> Result<()> {
    let mut owner = ops
        .load::<H>(owner_id)?
        .ok_or_else(|| StoreError::not_found(H::COLLECTION, owner_id))?;
    let ids = owner.consult_ids_mut();
    if !ids.iter().any(|id| id == consult_id) {
        ids.push(consult_id.to_string());
        ops.save(&owner)?;
    }
    Ok(())
}

/// Drop `consult_id` from the owner's list; a vanished owner is ignored.
fn unlink<H: ConsultHolder>(ops: &TransactionOps<'_>, owner_id: &str, consult_id: &str) -> Result<()> {
    if let Some(mut owner) = ops.load::<H>(owner_id)? {
        let ids = owner.consult_ids_mut();
        let before = ids.len();
        ids.retain(|id| id != consult_id);
        if ids.len() != before {
            ops.save(&owner)?;
        }
    }
    Ok(())
}

pub struct ConsultRepository<'a> {
    store: &'a DocumentStore,
    consults: Collection<'a, Consult>,
}

impl<'a> ConsultRepository<'a> {
    pub fn new(store: &'a DocumentStore) -> Self {
        Self {
            store,
            consults: Collection::new(store),
        }
    }

    /// Insert the consult and append its id to the doctor's and the
    /// patient's back-reference lists.
    pub fn create(&self, consult: &Consult) -> Result<()> {
        let json = serde_json::to_string(consult)?;
        self.store.in_transaction(|ops| {
            ops.insert(Consult::COLLECTION, &consult.id, &json)?;
            link::<Doctor>(ops, &consult.doctor_id, &consult.id)?;
            link::<Patient>(ops, &consult.patient_id, &consult.id)?;
            Ok(())
        })
    }

    /// Overwrite a consult, moving its id between back-reference lists when
    /// the doctor or patient changed. Returns the previous version, or None
    /// if the consult does not exist.
    pub fn update(&self, consult: &Consult) -> Result<Option<Consult>> {
        self.store.in_transaction(|ops| {
            let Some(previous) = ops.load::<Consult>(&consult.id)? else {
                return Ok(None);
            };

            if previous.doctor_id != consult.doctor_id {
                link::<Doctor>(ops, &consult.doctor_id, &consult.id)?;
                unlink::<Doctor>(ops, &previous.doctor_id, &consult.id)?;
            }
            if previous.patient_id != consult.patient_id {
                link::<Patient>(ops, &consult.patient_id, &consult.id)?;
                unlink::<Patient>(ops, &previous.patient_id, &consult.id)?;
            }

            ops.save(consult)?;
            Ok(Some(previous))
        })
    }

    /// Delete a consult and its back-references. Returns the removed consult.
    pub fn delete(&self, id: &str) -> Result<Option<Consult>> {
        self.store.in_transaction(|ops| {
            let Some(consult) = ops.load::<Consult>(id)? else {
                return Ok(None);
            };
            ops.delete(Consult::COLLECTION, id)?;
            unlink::<Doctor>(ops, &consult.doctor_id, id)?;
            unlink::<Patient>(ops, &consult.patient_id, id)?;
            Ok(Some(consult))
        })
    }

    pub fn find_by_id(&self, id: &str) -> Result<Option<Consult>> {
        self.consults.get(id)
    }

    pub fn list(&self, page: Pagination) -> Result<Vec<Consult>> {
        self.consults.list(Some(page))
    }

    /// Consults on the given calendar day (UTC)
    pub fn find_by_date(&self, day: NaiveDate) -> Result<Vec<Consult>> {
        let prefix = day.format("%Y-%m-%d").to_string();
        self.consults.find(&Filter::Prefix("date", &prefix), None)
    }

    pub fn find_by_doctor(&self, doctor_id: &str) -> Result<Vec<Consult>> {
        self.consults.find(
            &Filter::Eq("doctorId", FieldValue::Text(doctor_id.to_string())),
            None,
        )
    }

    pub fn find_by_patient(&self, patient_id: &str) -> Result<Vec<Consult>> {
        self.consults.find(
            &Filter::Eq("patientId", FieldValue::Text(patient_id.to_string())),
            None,
        )
    }
}
