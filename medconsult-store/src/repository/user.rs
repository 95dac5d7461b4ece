use crate::collection::Collection;
use crate::document_store::{DocumentStore, FieldValue, Filter};
use crate::error::Result;
use medconsult_core::{Document, Pagination, Role, User};

pub struct UserRepository<'a> {
    store: &'a DocumentStore,
    users: Collection<'a, User>,
}

impl<'a> UserRepository<'a> {
    pub fn new(store: &'a DocumentStore) -> Self {
        Self {
            store,
            users: Collection::new(store),
        }
    }

    /// Insert a new user. A taken email surfaces as `StoreError::Duplicate`.
    pub fn create(&self, user: &User) -> Result<()> {
        self.users.insert(user)
    }

    pub fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        self.users.get(id)
    }

    pub fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        self.users
            .find_one(&Filter::EqIgnoreCase("email", email.trim()))
    }

    pub fn list(&self, page: Pagination) -> Result<Vec<User>> {
        self.users.list(Some(page))
    }

    /// Case-insensitive substring match on the name. The needle is taken
    /// literally, not as a pattern.
    pub fn list_by_name(&self, name: &str, page: Pagination) -> Result<Vec<User>> {
        self.users
            .find(&Filter::ContainsIgnoreCase("name", name), Some(page))
    }

    pub fn list_by_role(&self, role: Role, page: Pagination) -> Result<Vec<User>> {
        self.users.find(
            &Filter::Eq("role", FieldValue::Text(role.as_str().to_string())),
            Some(page),
        )
    }

    /// Overwrite a user; returns false if it no longer exists
    pub fn update(&self, user: &User) -> Result<bool> {
        self.users.replace(user)
    }

    /// Delete a user, returning the removed document
    pub fn delete(&self, id: &str) -> Result<Option<User>> {
        self.store.in_transaction(|ops| {
            let user = ops.load::<User>(id)?;
            if user.is_some() {
                ops.delete(User::COLLECTION, id)?;
            }
            Ok(user)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::repository::fixtures;

    #[test]
    fn test_duplicate_email_rejected() {
        let store = DocumentStore::open(":memory:").unwrap();
        let repo = UserRepository::new(&store);

        repo.create(&fixtures::user("u1", "ana@example.com", Role::Client))
            .unwrap();
        let err = repo
            .create(&fixtures::user("u2", "ana@example.com", Role::Doctor))
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { .. }));
    }

    #[test]
    fn test_update_into_taken_email_rejected() {
        let store = DocumentStore::open(":memory:").unwrap();
        let repo = UserRepository::new(&store);
        repo.create(&fixtures::user("u1", "ana@example.com", Role::Client))
            .unwrap();
        let mut bob = fixtures::user("u2", "bob@example.com", Role::Client);
        repo.create(&bob).unwrap();

        bob.email = "ana@example.com".to_string();
        assert!(matches!(
            repo.update(&bob).unwrap_err(),
            StoreError::Duplicate { .. }
        ));
    }

    #[test]
    fn test_lookups() {
        let store = DocumentStore::open(":memory:").unwrap();
        let repo = UserRepository::new(&store);
        let mut ana = fixtures::user("u1", "ana@example.com", Role::Employee);
        ana.name = "Ana Lima".to_string();
        repo.create(&ana).unwrap();
        repo.create(&fixtures::user("u2", "bob@example.com", Role::Client))
            .unwrap();

        let found = repo.find_by_email(" ANA@example.com").unwrap().unwrap();
        assert_eq!(found.id, "u1");
        assert!(repo.find_by_email("nobody@example.com").unwrap().is_none());

        let page = Pagination::default();
        assert_eq!(repo.list_by_name("lima", page).unwrap().len(), 1);
        // Pattern characters match literally
        assert!(repo.list_by_name("^ana", page).unwrap().is_empty());
        assert!(repo.list_by_name("a.a", page).unwrap().is_empty());
        assert_eq!(repo.list_by_role(Role::Client, page).unwrap()[0].id, "u2");
        assert_eq!(repo.list(page).unwrap().len(), 2);
    }

    #[test]
    fn test_delete_returns_user() {
        let store = DocumentStore::open(":memory:").unwrap();
        let repo = UserRepository::new(&store);
        repo.create(&fixtures::user("u1", "ana@example.com", Role::Client))
            .unwrap();

        let deleted = repo.delete("u1").unwrap().unwrap();
        assert_eq!(deleted.email, "ana@example.com");
        assert!(repo.delete("u1").unwrap().is_none());
        assert!(repo.find_by_id("u1").unwrap().is_none());
    }
}
