//! User records, registration payloads and public views

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::validation::{FieldRules, Rule, Validator};

pub const USER_SCHEMA: &[FieldRules] = &[
    FieldRules {
        field: "firstName",
        rules: &[
            Rule::NotNull("A first name is required"),
            Rule::NotEmpty("Please provide a first name"),
        ],
    },
    FieldRules {
        field: "lastName",
        rules: &[
            Rule::NotNull("A last name is required"),
            Rule::NotEmpty("Please provide a last name"),
        ],
    },
    FieldRules {
        field: "emailAddress",
        rules: &[
            Rule::NotNull("An email address is required"),
            Rule::Email("Please provide a valid email address"),
        ],
    },
    FieldRules {
        field: "password",
        rules: &[
            Rule::NotNull("A password is required"),
            Rule::NotEmpty("Please provide a password"),
        ],
    },
];

/// Reported when registration collides with an existing email address
pub const DUPLICATE_EMAIL_MESSAGE: &str = "The email address you entered already exists";

/// A stored user. Deliberately not `Serialize`: responses go through [`UserInfo`].
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Registration body as submitted by the client
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email_address: Option<String>,
    pub password: Option<String>,
}

/// A registration that passed validation; password still in plain text
#[derive(Debug, Clone)]
pub struct ValidRegistration {
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
    pub password: String,
}

/// A user ready for insertion
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
    pub password_hash: String,
}

impl RegisterRequest {
    /// Check every field, collecting all failures
    pub fn validate(self) -> Result<ValidRegistration> {
        Validator::new()
            .field(USER_SCHEMA, "firstName", self.first_name.as_deref())
            .field(USER_SCHEMA, "lastName", self.last_name.as_deref())
            .field(USER_SCHEMA, "emailAddress", self.email_address.as_deref())
            .field(USER_SCHEMA, "password", self.password.as_deref())
            .finish()?;

        // finish() rejected any missing field above
        Ok(ValidRegistration {
            first_name: self.first_name.unwrap_or_default(),
            last_name: self.last_name.unwrap_or_default(),
            email_address: self.email_address.unwrap_or_default(),
            password: self.password.unwrap_or_default(),
        })
    }
}

impl ValidRegistration {
    pub fn with_hash(self, password_hash: String) -> NewUser {
        NewUser {
            first_name: self.first_name,
            last_name: self.last_name,
            email_address: self.email_address,
            password_hash,
        }
    }
}

/// Public user fields returned in responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email_address: user.email_address.clone(),
        }
    }
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email_address: user.email_address,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn complete() -> RegisterRequest {
        RegisterRequest {
            first_name: Some("Joe".to_string()),
            last_name: Some("Smith".to_string()),
            email_address: Some("joe@smith.com".to_string()),
            password: Some("joepassword".to_string()),
        }
    }

    #[test]
    fn test_complete_registration_is_valid() {
        let valid = complete().validate().unwrap();
        assert_eq!(valid.email_address, "joe@smith.com");
        assert_eq!(valid.password, "joepassword");
    }

    #[test]
    fn test_empty_registration_reports_every_field() {
        match RegisterRequest::default().validate() {
            Err(Error::Validation(errors)) => assert_eq!(
                errors,
                vec![
                    "A first name is required",
                    "A last name is required",
                    "An email address is required",
                    "A password is required",
                ]
            ),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_email() {
        let request = RegisterRequest {
            email_address: Some("joe".to_string()),
            ..complete()
        };
        match request.validate() {
            Err(Error::Validation(errors)) => {
                assert_eq!(errors, vec!["Please provide a valid email address"])
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_user_info_omits_password() {
        let now = Utc::now();
        let user = User {
            id: 7,
            first_name: "Joe".to_string(),
            last_name: "Smith".to_string(),
            email_address: "joe@smith.com".to_string(),
            password_hash: "$2b$04$hash".to_string(),
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(UserInfo::from(&user)).unwrap();
        let object = json.as_object().unwrap();

        assert_eq!(object.len(), 4);
        assert_eq!(json["firstName"], "Joe");
        assert_eq!(json["emailAddress"], "joe@smith.com");
        assert!(!json.to_string().contains("hash"));
    }
}
