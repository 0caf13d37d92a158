use super::DomainError;
use thiserror::Error;

/// Application-level errors, including infrastructure failures that
/// `DomainError` never carries (a domain error is always the caller's fault
/// or a genuine business-rule violation; `AppError` is everything else too).
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Downstream service unreachable: {0}")]
    DependencyUnavailable(String),

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Permission denied")]
    Forbidden,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Booking conflict")]
    Conflict,

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// The stable error kind surfaced in the `error` field of error responses
/// and used for status-code mapping, per the error-kind table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Unauthenticated,
    Forbidden,
    NotFound,
    Conflict,
    DependencyUnavailable,
    Internal,
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Domain(e) => match e {
                DomainError::TenantNotFound(_)
                | DomainError::UserNotFound(_)
                | DomainError::CategoryNotFound(_)
                | DomainError::ResourceNotFound(_)
                | DomainError::WebhookNotFound(_)
                | DomainError::BookingNotFound(_) => ErrorKind::NotFound,

                DomainError::BookingConflict => ErrorKind::Conflict,

                DomainError::TenantDomainExists(_)
                | DomainError::EmailAlreadyExists(_) => ErrorKind::Conflict,

                DomainError::TenantInactive
                | DomainError::ResourceInactive
                | DomainError::OutOfHours
                | DomainError::BadIntervalMultiple
                | DomainError::AdvanceWindowExceeded
                | DomainError::CancellationWindowViolated { .. }
                | DomainError::InvalidStateTransition
                | DomainError::InvalidRecurrencePattern(_) => ErrorKind::Validation,

                DomainError::InvalidCredentials
                | DomainError::InvalidToken
                | DomainError::TokenExpired => ErrorKind::Unauthenticated,

                DomainError::PermissionDenied | DomainError::CrossTenantAccess => {
                    ErrorKind::Forbidden
                }
            },
            AppError::Database(_) | AppError::Internal(_) => ErrorKind::Internal,
            AppError::DependencyUnavailable(_) => ErrorKind::DependencyUnavailable,
            AppError::Unauthenticated => ErrorKind::Unauthenticated,
            AppError::Forbidden => ErrorKind::Forbidden,
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::Validation(_) => ErrorKind::Validation,
            AppError::Conflict => ErrorKind::Conflict,
        }
    }

    /// HTTP status code for this error, per the error-kind table.
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::Validation => 422,
            ErrorKind::Unauthenticated => 401,
            ErrorKind::Forbidden => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::DependencyUnavailable => 503,
            ErrorKind::Internal => 500,
        }
    }

    /// Machine-readable error code for the response body's `error` field.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Domain(e) => match e {
                DomainError::TenantNotFound(_) => "TENANT_NOT_FOUND",
                DomainError::TenantDomainExists(_) => "TENANT_DOMAIN_EXISTS",
                DomainError::TenantInactive => "TENANT_INACTIVE",
                DomainError::UserNotFound(_) => "USER_NOT_FOUND",
                DomainError::EmailAlreadyExists(_) => "EMAIL_EXISTS",
                DomainError::CategoryNotFound(_) => "CATEGORY_NOT_FOUND",
                DomainError::ResourceNotFound(_) => "RESOURCE_NOT_FOUND",
                DomainError::ResourceInactive => "RESOURCE_INACTIVE",
                DomainError::WebhookNotFound(_) => "WEBHOOK_NOT_FOUND",
                DomainError::BookingNotFound(_) => "BOOKING_NOT_FOUND",
                DomainError::BookingConflict => "BOOKING_CONFLICT",
                DomainError::OutOfHours => "OUT_OF_HOURS",
                DomainError::BadIntervalMultiple => "BAD_INTERVAL_MULTIPLE",
                DomainError::AdvanceWindowExceeded => "ADVANCE_WINDOW_EXCEEDED",
                DomainError::CancellationWindowViolated { .. } => "CANCELLATION_WINDOW_VIOLATED",
                DomainError::InvalidStateTransition => "INVALID_STATE_TRANSITION",
                DomainError::InvalidRecurrencePattern(_) => "INVALID_RECURRENCE_PATTERN",
                DomainError::InvalidCredentials => "INVALID_CREDENTIALS",
                DomainError::InvalidToken => "INVALID_TOKEN",
                DomainError::TokenExpired => "TOKEN_EXPIRED",
                DomainError::PermissionDenied => "PERMISSION_DENIED",
                DomainError::CrossTenantAccess => "CROSS_TENANT_ACCESS",
            },
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::DependencyUnavailable(_) => "DEPENDENCY_UNAVAILABLE",
            AppError::Unauthenticated => "UNAUTHENTICATED",
            AppError::Forbidden => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Conflict => "CONFLICT",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("database error: {:?}", err);
        AppError::Database(err.to_string())
    }
}

/// Result type alias for application operations.
pub type AppResult<T> = Result<T, AppError>;
