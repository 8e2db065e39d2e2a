use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Rate limit error: {0}")]
    RateLimit(#[from] RateLimitError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Cryptographic error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Delivery error: {0}")]
    Delivery(String),
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is temporarily locked due to multiple failed login attempts")]
    AccountLocked {
        locked_until: chrono::DateTime<chrono::Utc>,
    },

    #[error("Account is deactivated")]
    AccountInactive,

    #[error("User with this email already exists")]
    UserAlreadyExists,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Admin access required")]
    Forbidden,
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid or disposable email address")]
    InvalidEmail,

    #[error("{0}")]
    WeakPassword(String),

    #[error("{0} is required")]
    MissingField(String),

    #[error("{field} exceeds maximum length of {max}")]
    TooLong { field: String, max: usize },

    #[error("{0}")]
    InvalidField(String),
}

/// Rejections from the request rate limiter.
///
/// The three variants carry distinct client-facing messages; all of them carry
/// a retry-after hint in whole seconds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RateLimitError {
    #[error("IP temporarily blocked due to suspicious activity")]
    Blocked { retry_after_seconds: u64 },

    #[error("Rate limit exceeded. IP temporarily blocked.")]
    Escalated { retry_after_seconds: u64 },

    #[error("Too many requests. Please try again later.")]
    TooManyRequests { retry_after_seconds: u64 },
}

impl RateLimitError {
    pub fn retry_after_seconds(&self) -> u64 {
        match self {
            RateLimitError::Blocked {
                retry_after_seconds,
            }
            | RateLimitError::Escalated {
                retry_after_seconds,
            }
            | RateLimitError::TooManyRequests {
                retry_after_seconds,
            } => *retry_after_seconds,
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session expired")]
    Expired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Wrong token type: expected {expected}")]
    WrongTokenType { expected: &'static str },
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Record not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("JWT signing failed: {0}")]
    JwtSigning(String),
}

impl Error {
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Auth(_))
    }

    pub fn is_validation_error(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    pub fn is_rate_limit_error(&self) -> bool {
        matches!(self, Error::RateLimit(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_) | Error::Storage(StorageError::NotFound))
    }

    /// Errors whose detail must stay in the logs.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Error::Storage(_) | Error::Crypto(_) | Error::Delivery(_)
        )
    }
}
