use std::sync::Arc;

use crate::{
    Error, NewUser, User, UserId,
    crypto::{hash_password, verify_password},
    error::AuthError,
    repositories::UserRepository,
    security::{LoginGuard, LoginGuardConfig},
    session::{Claims, TokenIssuer},
    validation::{normalize_email, sanitize_input, validate_email, validate_password},
};

/// Tokens handed back after a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

/// Registration, password login and token refresh.
pub struct AuthService<U: UserRepository> {
    users: Arc<U>,
    guard: LoginGuard<U>,
    tokens: Arc<TokenIssuer>,
}

impl<U: UserRepository> AuthService<U> {
    pub fn new(users: Arc<U>, tokens: Arc<TokenIssuer>, guard_config: LoginGuardConfig) -> Self {
        Self {
            guard: LoginGuard::new(users.clone(), guard_config),
            users,
            tokens,
        }
    }

    pub fn login_guard(&self) -> &LoginGuard<U> {
        &self.guard
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> Result<User, Error> {
        let email = normalize_email(email);
        validate_email(&email)?;
        validate_password(password)?;

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AuthError::UserAlreadyExists.into());
        }

        let clean = |v: Option<&str>| v.map(sanitize_input).filter(|v| !v.is_empty());
        let new_user = NewUser::new(&email, hash_password(password))
            .with_name(clean(first_name), clean(last_name));
        let user = self.users.create(new_user).await?;

        tracing::info!(user_id = %user.id, email = %user.email, "New user registered");
        Ok(user)
    }

    /// Password login guarded by the per-account lockout.
    ///
    /// A locked account is rejected before the password is looked at. Unknown
    /// emails and wrong passwords produce the same error.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, Error> {
        let email = normalize_email(email);

        if let Some(locked_until) = self.guard.check_locked_at(&email, chrono::Utc::now()).await? {
            tracing::warn!(email = %email, locked_until = %locked_until, "Login attempt on locked account");
            return Err(AuthError::AccountLocked { locked_until }.into());
        }

        let user = match self.users.find_by_email(&email).await? {
            Some(user) if verify_password(password, &user.password_hash) => user,
            _ => {
                self.guard.record_failure(&email).await?;
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        if !user.is_active {
            return Err(AuthError::AccountInactive.into());
        }

        self.guard.record_success(&email).await?;

        let access_token = self.tokens.issue_access(&user.id, user.role)?;
        let refresh_token = self.tokens.issue_refresh(&user.id, user.role)?;

        tracing::info!(user_id = %user.id, "User logged in");
        Ok(LoginOutcome {
            user,
            access_token,
            refresh_token,
        })
    }

    /// Exchanges a refresh token for a new access token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, Error> {
        let claims = self.tokens.verify_refresh(refresh_token)?;
        let user = self
            .users
            .find_by_id(&claims.user_id())
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| Error::NotFound("User not found or inactive".to_string()))?;

        self.tokens.issue_access(&user.id, user.role)
    }

    pub async fn profile(&self, user_id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| Error::NotFound("User not found".to_string()))
    }

    /// Validates a bearer access token.
    pub fn authenticate(&self, access_token: &str) -> Result<Claims, Error> {
        self.tokens.verify_access(access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Role,
        error::{SessionError, ValidationError},
        session::JwtConfig,
        testing::MockUserRepository,
    };

    const PASSWORD: &str = "Correct-Horse-9!";

    fn service(repo: Arc<MockUserRepository>) -> AuthService<MockUserRepository> {
        let tokens = Arc::new(TokenIssuer::new(JwtConfig::new_hs256(b"auth-service-test-secret".to_vec())));
        AuthService::new(repo, tokens, LoginGuardConfig::default())
    }

    #[tokio::test]
    async fn test_register_and_login() {
        let repo = Arc::new(MockUserRepository::default());
        let auth = service(repo.clone());

        let user = auth
            .register(" Alice@Example.com ", PASSWORD, Some("Alice"), Some("<b>Martin</b>"))
            .await
            .unwrap();
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.role, Role::User);
        assert_eq!(user.last_name.as_deref(), Some("bMartinb"));

        let outcome = auth.login("ALICE@example.com", PASSWORD).await.unwrap();
        assert_eq!(outcome.user.id, user.id);
        let claims = auth.authenticate(&outcome.access_token).unwrap();
        assert_eq!(claims.user_id(), user.id);

        let fresh = auth.refresh(&outcome.refresh_token).await.unwrap();
        assert!(auth.authenticate(&fresh).is_ok());
        assert!(repo.user("alice@example.com").unwrap().last_login.is_some());
    }

    #[tokio::test]
    async fn test_register_rejects_duplicates_and_weak_passwords() {
        let auth = service(Arc::new(MockUserRepository::default()));
        auth.register("bob@example.com", PASSWORD, None, None).await.unwrap();

        let err = auth
            .register("BOB@example.com", PASSWORD, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::UserAlreadyExists)));

        let err = auth
            .register("carol@example.com", "short", None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(ValidationError::WeakPassword(_))));

        let err = auth
            .register("dave@tempmail.org", PASSWORD, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(ValidationError::InvalidEmail)));
    }

    #[tokio::test]
    async fn test_lockout_after_five_failures() {
        let repo = Arc::new(MockUserRepository::default());
        let auth = service(repo.clone());
        auth.register("eve@example.com", PASSWORD, None, None).await.unwrap();

        for _ in 0..5 {
            let err = auth.login("eve@example.com", "Wrong-Password-1!").await.unwrap_err();
            assert!(matches!(err, Error::Auth(AuthError::InvalidCredentials)));
        }

        // even the right password is refused while locked
        let err = auth.login("eve@example.com", PASSWORD).await.unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::AccountLocked { .. })));
        assert_eq!(
            err.to_string(),
            "Authentication error: Account is temporarily locked due to multiple failed login attempts"
        );
        assert_eq!(repo.lock_state("eve@example.com").unwrap().failed_login_attempts, 5);
    }

    #[tokio::test]
    async fn test_unknown_email_is_invalid_credentials() {
        let auth = service(Arc::new(MockUserRepository::default()));
        let err = auth.login("nobody@example.com", PASSWORD).await.unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_inactive_account() {
        let repo = Arc::new(MockUserRepository::default());
        let auth = service(repo.clone());
        let user = auth.register("frank@example.com", PASSWORD, None, None).await.unwrap();
        repo.set_active(&user.id, false).await.unwrap();

        let err = auth.login("frank@example.com", PASSWORD).await.unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::AccountInactive)));

        // a wrong password still counts as a failure
        auth.login("frank@example.com", "nope").await.unwrap_err();
        assert_eq!(repo.lock_state("frank@example.com").unwrap().failed_login_attempts, 1);
    }

    #[tokio::test]
    async fn test_refresh_rejects_access_token() {
        let auth = service(Arc::new(MockUserRepository::default()));
        auth.register("gina@example.com", PASSWORD, None, None).await.unwrap();
        let outcome = auth.login("gina@example.com", PASSWORD).await.unwrap();

        let err = auth.refresh(&outcome.access_token).await.unwrap_err();
        assert!(matches!(err, Error::Session(SessionError::WrongTokenType { .. })));
    }
}
