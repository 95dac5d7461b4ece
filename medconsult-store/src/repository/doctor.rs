use crate::collection::Collection;
use crate::document_store::{DocumentStore, Filter};
use crate::error::Result;
use medconsult_core::validation::DoctorFields;
use medconsult_core::{Doctor, Pagination};

pub struct DoctorRepository<'a> {
    store: &'a DocumentStore,
    doctors: Collection<'a, Doctor>,
}

impl<'a> DoctorRepository<'a> {
    pub fn new(store: &'a DocumentStore) -> Self {
        Self {
            store,
            doctors: Collection::new(store),
        }
    }

    pub fn create(&self, doctor: &Doctor) -> Result<()> {
        self.doctors.insert(doctor)
    }

    pub fn find_by_id(&self, id: &str) -> Result<Option<Doctor>> {
        self.doctors.get(id)
    }

    pub fn exists(&self, id: &str) -> Result<bool> {
        self.doctors.exists(id)
    }

    pub fn list(&self, page: Pagination) -> Result<Vec<Doctor>> {
        self.doctors.list(Some(page))
    }

    /// Case-insensitive literal substring match
    pub fn find_by_name(&self, name: &str) -> Result<Vec<Doctor>> {
        self.doctors
            .find(&Filter::ContainsIgnoreCase("name", name), None)
    }

    pub fn find_by_specialty(&self, specialty: &str) -> Result<Vec<Doctor>> {
        self.doctors
            .find(&Filter::EqIgnoreCase("specialty", specialty), None)
    }

    /// Apply new name/specialty, keeping the consult back-references
    pub fn update(&self, id: &str, fields: &DoctorFields) -> Result<Option<Doctor>> {
        self.store.in_transaction(|ops| {
            let Some(mut doctor) = ops.load::<Doctor>(id)? else {
                return Ok(None);
            };
            doctor.name = fields.name.clone();
            doctor.specialty = fields.specialty.clone();
            ops.save(&doctor)?;
            Ok(Some(doctor))
        })
    }

    pub fn delete(&self, id: &str) -> Result<bool> {
        self.doctors.delete(id)
    }
}
