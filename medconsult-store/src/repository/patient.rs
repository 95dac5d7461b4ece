use crate::collection::Collection;
use crate::document_store::{DocumentStore, FieldValue, Filter};
use crate::error::Result;
use medconsult_core::validation::PatientFields;
use medconsult_core::{Pagination, Patient};

pub struct PatientRepository<'a> {
    store: &'a DocumentStore,
    patients: Collection<'a, Patient>,
}

impl<'a> PatientRepository<'a> {
    pub fn new(store: &'a DocumentStore) -> Self {
        Self {
            store,
            patients: Collection::new(store),
        }
    }

    pub fn create(&self, patient: &Patient) -> Result<()> {
        self.patients.insert(patient)
    }

    pub fn find_by_id(&self, id: &str) -> Result<Option<Patient>> {
        self.patients.get(id)
    }

    pub fn exists(&self, id: &str) -> Result<bool> {
        self.patients.exists(id)
    }

    pub fn list(&self, page: Pagination) -> Result<Vec<Patient>> {
        self.patients.list(Some(page))
    }

    pub fn find_by_name(&self, name: &str) -> Result<Vec<Patient>> {
        self.patients
            .find(&Filter::ContainsIgnoreCase("name", name), None)
    }

    pub fn find_by_age(&self, age: u32) -> Result<Vec<Patient>> {
        self.patients
            .find(&Filter::Eq("age", FieldValue::Integer(i64::from(age))), None)
    }

    /// Apply new name/age, keeping the consult back-references
    pub fn update(&self, id: &str, fields: &PatientFields) -> Result<Option<Patient>> {
        self.store.in_transaction(|ops| {
            let Some(mut patient) = ops.load::<Patient>(id)? else {
                return Ok(None);
            };
            patient.name = fields.name.clone();
            patient.age = fields.age;
            ops.save(&patient)?;
            Ok(Some(patient))
        })
    }

    pub fn delete(&self, id: &str) -> Result<bool> {
        self.patients.delete(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures;

    #[test]
    fn test_find_by_age() {
        let store = DocumentStore::open(":memory:").unwrap();
        let repo = PatientRepository::new(&store);
        repo.create(&fixtures::patient("p1", "Joana", 30)).unwrap();
        repo.create(&fixtures::patient("p2", "Carlos", 41)).unwrap();
        repo.create(&fixtures::patient("p3", "Rita", 30)).unwrap();

        let thirty = repo.find_by_age(30).unwrap();
        assert_eq!(thirty.len(), 2);
        assert!(repo.find_by_age(99).unwrap().is_empty());
    }

    #[test]
    fn test_update_and_delete() {
        let store = DocumentStore::open(":memory:").unwrap();
        let repo = PatientRepository::new(&store);
        repo.create(&fixtures::patient("p1", "Joana", 30)).unwrap();

        let fields = PatientFields {
            name: "Joana Silva".to_string(),
            age: 31,
        };
        assert_eq!(repo.update("p1", &fields).unwrap().unwrap().age, 31);

        assert!(repo.delete("p1").unwrap());
        assert!(!repo.exists("p1").unwrap());
    }
}
