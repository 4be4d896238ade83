use once_cell::sync::Lazy;
use regex::Regex;

use warbler_types::{User, DEFAULT_IMAGE_URL};

use crate::db::repositories::{NewUser, UserRepository};
use crate::db::{DbPool, ModelError};
use crate::password::{hash_password, verify_password, PasswordError};

/// Loose address check: something@something.tld, no whitespace
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("Failed to compile email regex")
});

impl From<PasswordError> for ModelError {
    fn from(err: PasswordError) -> Self {
        ModelError::Hash(err.to_string())
    }
}

/// Validate signup input and hash the password.
///
/// Nothing is written: the returned [`NewUser`] still has to be inserted, and
/// that insert is where a missing or duplicate username/email is rejected.
pub fn signup(
    username: Option<&str>,
    email: Option<&str>,
    password: Option<&str>,
    image_url: Option<&str>,
) -> Result<NewUser, ModelError> {
    let password = match password {
        Some(p) if !p.is_empty() => p,
        _ => return Err(ModelError::Validation("Password must be non-empty".to_string())),
    };

    let image_url = image_url
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .unwrap_or(DEFAULT_IMAGE_URL);

    Ok(NewUser {
        username: username.map(str::to_string),
        email: email.map(str::to_string),
        password: hash_password(password)?,
        image_url: image_url.to_string(),
    })
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// Signup, login and password checks on top of [`UserRepository`]
pub struct AccountService {
    users: UserRepository,
}

impl AccountService {
    pub fn new(pool: DbPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Sign up and persist in one step
    pub fn register(
        &self,
        username: Option<&str>,
        email: Option<&str>,
        password: Option<&str>,
        image_url: Option<&str>,
    ) -> Result<User, ModelError> {
        let new_user = signup(username, email, password, image_url)?;
        let user = self.users.insert(&new_user)?;
        tracing::info!("Registered user {} ({})", user.username, user.id);
        Ok(user)
    }

    /// Find the user named `username` whose password matches.
    ///
    /// Unknown usernames and wrong passwords both give `Ok(None)`.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<Option<User>, ModelError> {
        let Some(user) = self.users.get_by_username(username)? else {
            return Ok(None);
        };

        match verify_password(password, &user.password) {
            Ok(true) => Ok(Some(user)),
            Ok(false) => Ok(None),
            Err(e) => {
                tracing::warn!("Stored password for user {} is unusable: {}", user.id, e);
                Ok(None)
            }
        }
    }
}
