use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::fmt;
use std::str::FromStr;

/// A persisted entity: stored as one JSON document in a named collection.
pub trait Document: Serialize + DeserializeOwned {
    const COLLECTION: &'static str;

    fn id(&self) -> &str;
}

/// Account role carried in issued tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Root,
    Client,
    Doctor,
    Employee,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Root, Role::Client, Role::Doctor, Role::Employee];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Root => "root",
            Role::Client => "client",
            Role::Doctor => "doctor",
            Role::Employee => "employee",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| "Role must be one of: root, client, doctor, employee".to_string())
    }
}

/// Time-of-day slot of a consult
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Shift {
    Morning,
    Afternoon,
}

impl FromStr for Shift {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MORNING" => Ok(Shift::Morning),
            "AFTERNOON" => Ok(Shift::Afternoon),
            _ => Err("Shift must be MORNING or AFTERNOON".to_string()),
        }
    }
}

/// Stored account. Holds the password hash, so it is never rendered to
/// clients directly; see [`PublicUser`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for User {
    const COLLECTION: &'static str = "users";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Client-facing view of a [`User`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub id: String,
    pub name: String,
    pub specialty: String,
    /// Consults booked with this doctor, in booking order
    #[serde(default)]
    pub consult_ids: Vec<String>,
}

impl Document for Doctor {
    const COLLECTION: &'static str = "doctors";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: String,
    pub name: String,
    pub age: u32,
    #[serde(default)]
    pub consult_ids: Vec<String>,
}

impl Document for Patient {
    const COLLECTION: &'static str = "patients";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Consult {
    pub id: String,
    pub date: DateTime<Utc>,
    pub shift: Shift,
    pub doctor_id: String,
    pub patient_id: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for Consult {
    const COLLECTION: &'static str = "consults";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Reschedule/cancel ask filed by staff
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRequest {
    pub id: String,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl Document for ChangeRequest {
    const COLLECTION: &'static str = "requests";

    fn id(&self) -> &str {
        &self.id
    }
}

/// `?page=&limit=` query parameters. Pages are 1-based.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Pagination {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl Pagination {
    pub const DEFAULT_LIMIT: u32 = 10;
    pub const MAX_LIMIT: u32 = 100;

    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }

    pub fn offset(&self) -> u64 {
        let page = self.page.unwrap_or(1).max(1);
        u64::from(page - 1) * u64::from(self.limit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!("employee".parse::<Role>(), Ok(Role::Employee));
        assert!("admin".parse::<Role>().is_err());
        assert!("Root".parse::<Role>().is_err());
    }

    #[test]
    fn test_shift_serializes_uppercase() {
        let value = serde_json::to_value(Shift::Afternoon).unwrap();
        assert_eq!(value, "AFTERNOON");
        assert_eq!("MORNING".parse::<Shift>(), Ok(Shift::Morning));
        assert!("morning".parse::<Shift>().is_err());
    }

    #[test]
    fn test_public_user_drops_hash() {
        let now = Utc::now();
        let user = User {
            id: "u1".to_string(),
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            role: Role::Client,
            created_at: now,
            updated_at: now,
        };

        let stored = serde_json::to_value(&user).unwrap();
        assert!(stored.get("passwordHash").is_some());

        let public = serde_json::to_value(PublicUser::from(&user)).unwrap();
        assert!(public.get("passwordHash").is_none());
        assert_eq!(public["role"], "client");
    }

    #[test]
    fn test_pagination_defaults_and_clamp() {
        let p = Pagination::default();
        assert_eq!(p.limit(), 10);
        assert_eq!(p.offset(), 0);

        let p = Pagination::new(2, 10);
        assert_eq!(p.offset(), 10);

        let p = Pagination::new(0, 500);
        assert_eq!(p.limit(), 100);
        assert_eq!(p.offset(), 0);
    }
}
