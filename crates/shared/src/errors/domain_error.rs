use thiserror::Error;

/// Domain-level errors representing business rule violations.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Tenant not found: {0}")]
    TenantNotFound(String),

    #[error("Tenant domain already in use: {0}")]
    TenantDomainExists(String),

    #[error("Tenant is not active")]
    TenantInactive,

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Email already registered for this tenant: {0}")]
    EmailAlreadyExists(String),

    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Resource is not active")]
    ResourceInactive,

    #[error("Webhook not found: {0}")]
    WebhookNotFound(String),

    #[error("Booking not found: {0}")]
    BookingNotFound(String),

    #[error("Booking conflicts with an existing booking")]
    BookingConflict,

    #[error("Requested time is outside resource working hours")]
    OutOfHours,

    #[error("Start time must align to the tenant's booking interval")]
    BadIntervalMultiple,

    #[error("Booking start must be within the tenant's advance booking window")]
    AdvanceWindowExceeded,

    #[error("Booking is too close to start time to cancel (minimum {min_hours} hours notice)")]
    CancellationWindowViolated { min_hours: i32 },

    #[error("Booking cannot transition from its current status")]
    InvalidStateTransition,

    #[error("Recurring pattern is invalid: {0}")]
    InvalidRecurrencePattern(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid or malformed token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("User does not have permission to perform this action")]
    PermissionDenied,

    #[error("Cross-tenant access is not permitted")]
    CrossTenantAccess,
}
