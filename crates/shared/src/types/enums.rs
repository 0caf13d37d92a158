use serde::{Deserialize, Serialize};
use sqlx::Type;

/// A user's role within its tenant. Carried in JWT claims as `user_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, Default)]
#[sqlx(type_name = "user_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Admin,
    #[default]
    User,
}

impl std::fmt::Display for UserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserType::Admin => write!(f, "admin"),
            UserType::User => write!(f, "user"),
        }
    }
}

/// Lifecycle status of a booking. `Pendente` is initial, `Cancelado` terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "booking_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pendente,
    Confirmado,
    Cancelado,
}

impl BookingStatus {
    /// Legal transitions, per the booking state machine. Cascade handlers
    /// perform `* -> Cancelado` unconditionally and do not go through this.
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (BookingStatus::Pendente, BookingStatus::Confirmado)
                | (BookingStatus::Pendente, BookingStatus::Cancelado)
                | (BookingStatus::Confirmado, BookingStatus::Cancelado)
        )
    }

    pub fn is_active(&self) -> bool {
        matches!(self, BookingStatus::Pendente | BookingStatus::Confirmado)
    }
}

/// Operating status of a bookable resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "resource_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ResourceStatus {
    Disponivel,
    Manutencao,
    Indisponivel,
}

/// The kind of thing a category groups: a physical space, a person, or a
/// software seat/license.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "category_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CategoryType {
    Fisico,
    Humano,
    Software,
}

/// Recurrence cadence for a `RecurringPattern`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "recurrence_frequency", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceFrequency {
    Daily,
    Weekly,
    Monthly,
}

/// A dotted event kind carried by the event fabric and subscribed to by
/// tenant webhooks, e.g. `booking.created`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    BookingCreated,
    BookingUpdated,
    BookingCancelled,
    BookingStatusChanged,
    ResourceDeleted,
    UserDeleted,
    TenantDeleted,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::BookingCreated => "booking.created",
            EventKind::BookingUpdated => "booking.updated",
            EventKind::BookingCancelled => "booking.cancelled",
            EventKind::BookingStatusChanged => "booking.status_changed",
            EventKind::ResourceDeleted => "resource.deleted",
            EventKind::UserDeleted => "user.deleted",
            EventKind::TenantDeleted => "tenant.deleted",
        }
    }

    /// Which logical stream this event kind is published on.
    pub fn stream(&self) -> &'static str {
        match self {
            EventKind::BookingCreated
            | EventKind::BookingUpdated
            | EventKind::BookingCancelled
            | EventKind::BookingStatusChanged => "booking-events",
            EventKind::ResourceDeleted | EventKind::UserDeleted | EventKind::TenantDeleted => {
                "deletion-events"
            }
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "booking.created" => Ok(EventKind::BookingCreated),
            "booking.updated" => Ok(EventKind::BookingUpdated),
            "booking.cancelled" => Ok(EventKind::BookingCancelled),
            "booking.status_changed" => Ok(EventKind::BookingStatusChanged),
            "resource.deleted" => Ok(EventKind::ResourceDeleted),
            "user.deleted" => Ok(EventKind::UserDeleted),
            "tenant.deleted" => Ok(EventKind::TenantDeleted),
            other => Err(format!("unrecognized event kind: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booking_state_machine_allows_only_documented_transitions() {
        assert!(BookingStatus::Pendente.can_transition_to(BookingStatus::Confirmado));
        assert!(BookingStatus::Pendente.can_transition_to(BookingStatus::Cancelado));
        assert!(BookingStatus::Confirmado.can_transition_to(BookingStatus::Cancelado));
        assert!(!BookingStatus::Confirmado.can_transition_to(BookingStatus::Pendente));
        assert!(!BookingStatus::Cancelado.can_transition_to(BookingStatus::Confirmado));
    }
}
