//! Caller identity carried by bearer tokens

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;

/// Permissions granted to a caller by the identity provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Librarian permission: see every loan and renew copies
    CanMarkReturned,
    AddAuthor,
    ChangeAuthor,
    DeleteAuthor,
    AddBook,
    ChangeBook,
    DeleteBook,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::CanMarkReturned => "can_mark_returned",
            Permission::AddAuthor => "add_author",
            Permission::ChangeAuthor => "change_author",
            Permission::DeleteAuthor => "delete_author",
            Permission::AddBook => "add_book",
            Permission::ChangeBook => "change_book",
            Permission::DeleteBook => "delete_book",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JWT Claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: i32,
    #[serde(default)]
    pub permissions: Vec<Permission>,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }

    // Authorization checks
    pub fn require(&self, permission: Permission) -> Result<(), AppError> {
        if self.has_permission(permission) {
            Ok(())
        } else {
            Err(AppError::Authorization(format!(
                "Missing permission: {}",
                permission
            )))
        }
    }

    pub fn require_mark_returned(&self) -> Result<(), AppError> {
        self.require(Permission::CanMarkReturned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(permissions: Vec<Permission>) -> UserClaims {
        let now = chrono::Utc::now().timestamp();
        UserClaims {
            sub: "librarian".to_string(),
            user_id: 2,
            permissions,
            exp: now + 3600,
            iat: now,
        }
    }

    #[test]
    fn require_checks_granted_permissions() {
        let librarian = claims(vec![Permission::CanMarkReturned]);
        assert!(librarian.require_mark_returned().is_ok());
        assert!(matches!(
            librarian.require(Permission::DeleteBook),
            Err(AppError::Authorization(_))
        ));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = claims(vec![]).create_token("secret-a").unwrap();
        assert!(UserClaims::from_token(&token, "secret-a").is_ok());
        assert!(UserClaims::from_token(&token, "secret-b").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let mut expired = claims(vec![Permission::CanMarkReturned]);
        expired.exp = chrono::Utc::now().timestamp() - 3600;
        let token = expired.create_token("secret").unwrap();
        assert!(UserClaims::from_token(&token, "secret").is_err());
    }
}
