//! Authorization as a pure function of `(claims, action, target) -> permit|deny`.
//! Cross-tenant access is always deny, regardless of role.

use serde::{Deserialize, Serialize};
use shared::types::{TenantId, UserId, UserType};

/// The caller identity decoded from a verified JWT.
#[derive(Debug, Clone, Copy)]
pub struct Claims {
    pub user_id: UserId,
    pub tenant_id: TenantId,
    pub user_type: UserType,
}

/// A user's fine-grained permissions, loaded from the user-service store.
/// Distinct from `user_type`: `admin` bypasses these, a plain `user` needs
/// them granted individually.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Permissions {
    pub can_book: bool,
    pub can_manage_resources: bool,
    pub can_manage_users: bool,
    pub can_view_all_bookings: bool,
}

/// An action requiring authorization, paired with the tenant it targets and
/// (where relevant) the resource-owning user.
#[derive(Debug, Clone, Copy)]
pub enum Action {
    /// Any operation scoped to a tenant's admin console (tenant settings,
    /// webhooks, delete tenant).
    AdminOfTenant,
    /// Listing or managing users across the tenant.
    ManageUsers,
    /// Creating/updating/deleting a resource or category.
    ManageResources,
    /// Creating a booking.
    Book,
    /// Viewing another user's bookings.
    ViewAllBookings,
    /// Acting on one's own record (profile read/update, own bookings).
    Self_ { owner: UserId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Permit,
    Deny,
}

impl Decision {
    pub fn is_permit(&self) -> bool {
        matches!(self, Decision::Permit)
    }
}

/// Decide whether `claims` may perform `action` against resources owned by
/// `target_tenant`. Cross-tenant access is always denied first, before any
/// role or permission check runs.
pub fn authorize(
    claims: &Claims,
    action: Action,
    target_tenant: TenantId,
    permissions: Option<Permissions>,
) -> Decision {
    if claims.tenant_id != target_tenant {
        return Decision::Deny;
    }

    let is_admin = claims.user_type == UserType::Admin;
    let permit = match action {
        Action::AdminOfTenant => is_admin,
        Action::ManageUsers => is_admin,
        Action::ManageResources => {
            is_admin || permissions.is_some_and(|p| p.can_manage_resources)
        }
        Action::Book => is_admin || permissions.is_some_and(|p| p.can_book),
        Action::ViewAllBookings => {
            is_admin || permissions.is_some_and(|p| p.can_view_all_bookings)
        }
        Action::Self_ { owner } => is_admin || claims.user_id == owner,
    };

    if permit {
        Decision::Permit
    } else {
        Decision::Deny
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn claims(user_type: UserType, tenant: TenantId) -> Claims {
        Claims {
            user_id: UserId::from_uuid(Uuid::new_v4()),
            tenant_id: tenant,
            user_type,
        }
    }

    #[test]
    fn cross_tenant_access_is_always_denied() {
        let tenant_a = TenantId::from_uuid(Uuid::new_v4());
        let tenant_b = TenantId::from_uuid(Uuid::new_v4());
        let admin = claims(UserType::Admin, tenant_a);

        let decision = authorize(&admin, Action::AdminOfTenant, tenant_b, None);
        assert_eq!(decision, Decision::Deny);
    }

    #[test]
    fn plain_user_without_permission_is_denied_manage_resources() {
        let tenant = TenantId::from_uuid(Uuid::new_v4());
        let user = claims(UserType::User, tenant);
        let decision = authorize(
            &user,
            Action::ManageResources,
            tenant,
            Some(Permissions::default()),
        );
        assert_eq!(decision, Decision::Deny);
    }

    #[test]
    fn plain_user_with_can_book_permission_is_permitted() {
        let tenant = TenantId::from_uuid(Uuid::new_v4());
        let user = claims(UserType::User, tenant);
        let perms = Permissions {
            can_book: true,
            ..Default::default()
        };
        let decision = authorize(&user, Action::Book, tenant, Some(perms));
        assert_eq!(decision, Decision::Permit);
    }

    #[test]
    fn self_access_permitted_for_owner_even_without_permissions() {
        let tenant = TenantId::from_uuid(Uuid::new_v4());
        let user = claims(UserType::User, tenant);
        let decision = authorize(&user, Action::Self_ { owner: user.user_id }, tenant, None);
        assert_eq!(decision, Decision::Permit);
    }

    #[test]
    fn admin_bypasses_granular_permissions() {
        let tenant = TenantId::from_uuid(Uuid::new_v4());
        let admin = claims(UserType::Admin, tenant);
        let decision = authorize(&admin, Action::ManageUsers, tenant, None);
        assert_eq!(decision, Decision::Permit);
    }
}
