use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Role assigned when a registration request does not name one.
pub const DEFAULT_ROLE: &str = "customer";

/// User record as owned by the user directory.
///
/// The directory stores the bcrypt hash under the `password` field; it is
/// never the plaintext and never leaves this service.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct UserRecord {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(rename = "password")]
    pub password_hash: String,
    pub role: String,
}

/// User to be created in the directory. `password_hash` is already hashed.
#[derive(Clone, Debug, Serialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    #[serde(rename = "password")]
    pub password_hash: String,
    pub role: String,
}

/// Public projection of a [`UserRecord`], safe to return to clients.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, ToSchema)]
pub struct UserSummary {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
}

impl From<&UserRecord> for UserSummary {
    fn from(record: &UserRecord) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            email: record.email.clone(),
            role: record.role.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_reads_directory_schema() {
        let json = r#"{"id":7,"name":"A","email":"a@x.com","password":"$2b$04$abc","role":"customer"}"#;
        let record: UserRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, 7);
        assert_eq!(record.password_hash, "$2b$04$abc");
    }

    #[test]
    fn test_summary_has_no_password() {
        let record = UserRecord {
            id: 1,
            name: "A".into(),
            email: "a@x.com".into(),
            password_hash: "$2b$04$abc".into(),
            role: "admin".into(),
        };
        let value = serde_json::to_value(UserSummary::from(&record)).unwrap();
        assert!(value.get("password").is_none());
        assert!(value.get("password_hash").is_none());
        assert_eq!(value["role"], "admin");
    }
}
