//! Account service: registration, login, token authentication, profiles, and
//! admin user management.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::credentials::{PasswordHasher, TokenSigner};
use crate::domain::{NewUser, PageRequest, Paged, User, UserPatch, UserRole};
use crate::error::ApiError;
use crate::persistence::Store;

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 8;

/// A signed-in user and their bearer token.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthSession {
    /// The authenticated account.
    pub user: User,
    /// Bearer token for the `Authorization` header.
    pub token: String,
    /// When the token stops being accepted.
    pub expires_at: chrono::DateTime<Utc>,
}

/// Validated sign-up input.
#[derive(Debug, Clone)]
pub struct Registration {
    /// Display name.
    pub name: String,
    /// Email address; normalized before storage.
    pub email: String,
    /// Plain-text password.
    pub password: String,
}

/// Self-service profile changes.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    /// New display name.
    pub name: Option<String>,
    /// New phone.
    pub phone: Option<String>,
    /// New avatar URL.
    pub avatar_url: Option<String>,
    /// New home city.
    pub city_id: Option<Uuid>,
    /// New plain-text password.
    pub password: Option<String>,
}

/// Lowercases and trims an email, checking it has a local part and a
/// dotted domain.
///
/// # Errors
///
/// Returns a validation message when the address is malformed.
pub fn normalize_email(raw: &str) -> Result<String, String> {
    let email = raw.trim().to_lowercase();
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| {
            !local.is_empty()
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && domain.contains('.')
                && !domain.contains('@')
        })
        && !email.chars().any(char::is_whitespace);
    if valid {
        Ok(email)
    } else {
        Err(format!("email `{}` is not a valid address", raw.trim()))
    }
}

/// Checks the password policy.
///
/// # Errors
///
/// Returns a validation message when the password is too short.
pub fn check_password(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        ));
    }
    Ok(())
}

/// Account operations over the store.
#[derive(Debug, Clone)]
pub struct AuthService {
    store: Arc<dyn Store>,
    hasher: PasswordHasher,
    signer: TokenSigner,
}

impl AuthService {
    /// Creates the service.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, hasher: PasswordHasher, signer: TokenSigner) -> Self {
        Self {
            store,
            hasher,
            signer,
        }
    }

    /// Creates a `user` account and signs it in.
    ///
    /// # Errors
    ///
    /// [`ApiError::Validation`] for a bad email, name, or password;
    /// [`ApiError::Conflict`] when the email is already registered.
    pub async fn register(&self, input: Registration) -> Result<AuthSession, ApiError> {
        let mut errors = Vec::new();
        let name = input.name.trim().to_string();
        if name.is_empty() {
            errors.push("name must not be empty".to_string());
        }
        let email = normalize_email(&input.email).unwrap_or_else(|e| {
            errors.push(e);
            String::new()
        });
        if let Err(e) = check_password(&input.password) {
            errors.push(e);
        }
        if !errors.is_empty() {
            return Err(ApiError::Validation(errors));
        }

        if self.store.find_user_by_email(&email).await?.is_some() {
            return Err(ApiError::Conflict(format!(
                "email {email} is already registered"
            )));
        }
        let user = self
            .store
            .create_user(NewUser {
                name,
                email,
                password_hash: self.hasher.hash(&input.password),
                role: UserRole::User,
            })
            .await?;

        tracing::info!(user_id = %user.id, "user registered");
        self.session_for(user)
    }

    /// Signs in with email and password.
    ///
    /// # Errors
    ///
    /// [`ApiError::Unauthorized`] when the credentials do not match.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, ApiError> {
        let rejected = || ApiError::Unauthorized("invalid email or password".to_string());
        let Some(user) = self.find_login(email).await? else {
            let _ = self.hasher.verify_missing(password);
            return Err(rejected());
        };
        if !self.hasher.verify(password, &user.password_hash) {
            tracing::debug!(user_id = %user.id, "login rejected");
            return Err(rejected());
        }
        tracing::debug!(user_id = %user.id, "login");
        self.session_for(user)
    }

    async fn find_login(&self, email: &str) -> Result<Option<User>, ApiError> {
        match normalize_email(email) {
            Ok(email) => self.store.find_user_by_email(&email).await,
            Err(_) => Ok(None),
        }
    }

    /// Resolves a bearer token to its current user record.
    ///
    /// # Errors
    ///
    /// [`ApiError::Unauthorized`] when the token is invalid or its user no
    /// longer exists.
    pub async fn authenticate(&self, token: &str) -> Result<User, ApiError> {
        let user_id = self.signer.verify(token, Utc::now())?;
        self.store
            .get_user(user_id)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("account no longer exists".to_string()))
    }

    /// Loads a user's own profile.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotFound`] when the user does not exist.
    pub async fn profile(&self, user_id: Uuid) -> Result<User, ApiError> {
        self.store
            .get_user(user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("user", user_id))
    }

    /// Applies self-service profile changes.
    ///
    /// # Errors
    ///
    /// [`ApiError::Validation`] for a blank name, short password, or unknown
    /// city.
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        changes: ProfileChanges,
    ) -> Result<User, ApiError> {
        let mut errors = Vec::new();
        let name = changes.name.map(|n| n.trim().to_string());
        if name.as_deref().is_some_and(str::is_empty) {
            errors.push("name must not be empty".to_string());
        }
        if let Some(password) = &changes.password
            && let Err(e) = check_password(password)
        {
            errors.push(e);
        }
        if let Some(city_id) = changes.city_id
            && self.store.get_city(city_id).await?.is_none()
        {
            errors.push(format!("city_id {city_id} does not exist"));
        }
        if !errors.is_empty() {
            return Err(ApiError::Validation(errors));
        }

        let password_hash = changes.password.map(|p| self.hasher.hash(&p));
        self.store
            .update_user(
                user_id,
                UserPatch {
                    name,
                    phone: changes.phone,
                    avatar_url: changes.avatar_url,
                    city_id: changes.city_id,
                    password_hash,
                    role: None,
                },
            )
            .await
    }

    /// Ensures an admin account exists for `email`, creating it or promoting
    /// an existing account.
    ///
    /// # Errors
    ///
    /// [`ApiError::Validation`] when the seed credentials are unusable.
    pub async fn ensure_admin(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let email = normalize_email(email).map_err(ApiError::invalid_field)?;
        check_password(password).map_err(ApiError::invalid_field)?;

        if let Some(existing) = self.store.find_user_by_email(&email).await? {
            if existing.role == UserRole::Admin {
                return Ok(existing);
            }
            let promoted = self
                .store
                .update_user(
                    existing.id,
                    UserPatch {
                        role: Some(UserRole::Admin),
                        ..UserPatch::default()
                    },
                )
                .await?;
            tracing::info!(user_id = %promoted.id, "existing account promoted to admin");
            return Ok(promoted);
        }

        let admin = self
            .store
            .create_user(NewUser {
                name: "Administrator".to_string(),
                email,
                password_hash: self.hasher.hash(password),
                role: UserRole::Admin,
            })
            .await?;
        tracing::info!(user_id = %admin.id, "admin account seeded");
        Ok(admin)
    }

    /// Lists accounts for the admin panel.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    pub async fn list_users(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<Paged<User>, ApiError> {
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        self.store.list_users(search, page).await
    }

    /// Changes another account's name or role.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotFound`] for an unknown user; [`ApiError::Validation`]
    /// for a blank name.
    pub async fn admin_update_user(
        &self,
        id: Uuid,
        name: Option<String>,
        role: Option<UserRole>,
    ) -> Result<User, ApiError> {
        let name = name.map(|n| n.trim().to_string());
        if name.as_deref().is_some_and(str::is_empty) {
            return Err(ApiError::invalid_field("name must not be empty"));
        }
        let user = self
            .store
            .update_user(
                id,
                UserPatch {
                    name,
                    role,
                    ..UserPatch::default()
                },
            )
            .await?;
        if let Some(role) = role {
            tracing::info!(user_id = %id, %role, "user role changed");
        }
        Ok(user)
    }

    /// Deletes an account and everything it owns. Admins cannot delete
    /// themselves.
    ///
    /// # Errors
    ///
    /// [`ApiError::Conflict`] for self-deletion; [`ApiError::NotFound`] for
    /// an unknown user.
    pub async fn delete_user(&self, actor: &User, id: Uuid) -> Result<(), ApiError> {
        if actor.id == id {
            return Err(ApiError::Conflict(
                "admins cannot delete their own account".to_string(),
            ));
        }
        self.store.delete_user(id).await?;
        tracing::info!(user_id = %id, deleted_by = %actor.id, "user deleted");
        Ok(())
    }

    fn session_for(&self, user: User) -> Result<AuthSession, ApiError> {
        let issued = self.signer.issue(user.id, Utc::now())?;
        Ok(AuthSession {
            user,
            token: issued.token,
            expires_at: issued.expires_at,
        })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    fn service() -> AuthService {
        AuthService::new(
            Arc::new(MemoryStore::new()),
            PasswordHasher::with_rounds(2),
            TokenSigner::new("unit-test-secret", 3600),
        )
    }

    fn registration(email: &str) -> Registration {
        Registration {
            name: "Dana".to_string(),
            email: email.to_string(),
            password: "long enough".to_string(),
        }
    }

    #[test]
    fn email_normalization() {
        assert_eq!(
            normalize_email("  Dana@Example.COM "),
            Ok("dana@example.com".to_string())
        );
        assert!(normalize_email("no-at-sign").is_err());
        assert!(normalize_email("@example.com").is_err());
        assert!(normalize_email("a@localhost").is_err());
        assert!(normalize_email("a b@example.com").is_err());
    }

    #[tokio::test]
    async fn register_then_authenticate() {
        let auth = service();
        let Ok(session) = auth.register(registration("Dana@Example.com")).await else {
            panic!("register failed");
        };
        assert_eq!(session.user.email, "dana@example.com");
        assert_eq!(session.user.role, UserRole::User);

        let Ok(user) = auth.authenticate(&session.token).await else {
            panic!("token rejected");
        };
        assert_eq!(user.id, session.user.id);
    }

    #[tokio::test]
    async fn register_collects_every_problem() {
        let auth = service();
        let result = auth
            .register(Registration {
                name: " ".to_string(),
                email: "bad".to_string(),
                password: "short".to_string(),
            })
            .await;
        let Err(ApiError::Validation(messages)) = result else {
            panic!("expected validation error");
        };
        assert_eq!(messages.len(), 3);
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let auth = service();
        let Ok(_) = auth.register(registration("dana@example.com")).await else {
            panic!("register failed");
        };
        let again = auth.register(registration("DANA@example.com")).await;
        assert!(matches!(again, Err(ApiError::Conflict(_))));
    }

    #[tokio::test]
    async fn login_checks_password() {
        let auth = service();
        let Ok(_) = auth.register(registration("dana@example.com")).await else {
            panic!("register failed");
        };
        assert!(auth.login("dana@example.com", "long enough").await.is_ok());
        assert!(matches!(
            auth.login("dana@example.com", "wrong password").await,
            Err(ApiError::Unauthorized(_))
        ));
        assert!(matches!(
            auth.login("nobody@example.com", "long enough").await,
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn unknown_email_and_wrong_password_look_the_same() {
        let auth = service();
        let Ok(_) = auth.register(registration("dana@example.com")).await else {
            panic!("register failed");
        };
        let Err(ApiError::Unauthorized(wrong_password)) =
            auth.login("dana@example.com", "wrong password").await
        else {
            panic!("expected unauthorized for a wrong password");
        };
        let Err(ApiError::Unauthorized(unknown)) =
            auth.login("nobody@example.com", "wrong password").await
        else {
            panic!("expected unauthorized for an unknown email");
        };
        let Err(ApiError::Unauthorized(malformed)) = auth.login("not-an-email", "x").await else {
            panic!("expected unauthorized for a malformed email");
        };
        assert_eq!(unknown, wrong_password);
        assert_eq!(malformed, wrong_password);
    }

    #[tokio::test]
    async fn password_change_takes_effect() {
        let auth = service();
        let Ok(session) = auth.register(registration("dana@example.com")).await else {
            panic!("register failed");
        };
        let changes = ProfileChanges {
            password: Some("another secret".to_string()),
            ..ProfileChanges::default()
        };
        let Ok(_) = auth.update_profile(session.user.id, changes).await else {
            panic!("update failed");
        };
        assert!(auth.login("dana@example.com", "long enough").await.is_err());
        assert!(auth.login("dana@example.com", "another secret").await.is_ok());
    }

    #[tokio::test]
    async fn ensure_admin_is_idempotent_and_promotes() {
        let auth = service();
        let Ok(session) = auth.register(registration("boss@example.com")).await else {
            panic!("register failed");
        };
        let Ok(admin) = auth.ensure_admin("boss@example.com", "long enough").await else {
            panic!("seed failed");
        };
        assert_eq!(admin.id, session.user.id);
        assert_eq!(admin.role, UserRole::Admin);

        let Ok(again) = auth.ensure_admin("boss@example.com", "long enough").await else {
            panic!("seed failed");
        };
        assert_eq!(again.id, admin.id);
    }

    #[tokio::test]
    async fn admin_cannot_delete_self() {
        let auth = service();
        let Ok(admin) = auth.ensure_admin("root@example.com", "long enough").await else {
            panic!("seed failed");
        };
        let result = auth.delete_user(&admin, admin.id).await;
        assert!(matches!(result, Err(ApiError::Conflict(_))));
    }
}
