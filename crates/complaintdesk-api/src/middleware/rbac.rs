//! Role guards for handlers.

use complaintdesk_core::error::AppError;

use crate::extractors::AuthUser;

/// Checks that the authenticated user has the Admin role.
pub fn require_admin(auth: &AuthUser) -> Result<(), AppError> {
    if !auth.is_admin() {
        return Err(AppError::authorization(
            "Access denied. Admin privileges required.",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use complaintdesk_auth::Identity;
    use complaintdesk_core::error::ErrorKind;
    use complaintdesk_entity::user::UserRole;
    use complaintdesk_service::RequestContext;
    use uuid::Uuid;

    use super::*;

    fn auth_user(role: UserRole) -> AuthUser {
        AuthUser(RequestContext::new(Identity {
            user_id: Uuid::new_v4(),
            display_name: "Sam".to_string(),
            role,
        }))
    }

    #[test]
    fn test_admin_passes() {
        assert!(require_admin(&auth_user(UserRole::Admin)).is_ok());
    }

    #[test]
    fn test_regular_user_is_forbidden() {
        let err = require_admin(&auth_user(UserRole::User)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
        assert_eq!(err.message, "Access denied. Admin privileges required.");
    }
}
