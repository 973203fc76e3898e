//! Super-Admin Identity Gate
//!
//! The role stored in the profile can be flipped by the client, so super-admin
//! exposure is bounded by a fixed allow-list of emails compiled into the
//! binary. A user must carry the `super_admin` role AND be on the list.

use igrejas_shared::types::{User, UserRole};

/// Emails allowed into the SaaS console, lowercase
const SUPER_ADMIN_ALLOW_LIST: &[&str] = &["altechzero@gmail.com"];

/// Case-insensitive allow-list membership. Missing or blank email is never listed.
pub fn is_whitelisted_email(email: Option<&str>) -> bool {
    let Some(email) = email.map(str::trim).filter(|e| !e.is_empty()) else {
        return false;
    };
    let email = email.to_lowercase();
    SUPER_ADMIN_ALLOW_LIST.iter().any(|allowed| *allowed == email)
}

/// Role claim and allow-list must agree
pub fn is_authorized_super_admin(user: &User) -> bool {
    if user.role != UserRole::SuperAdmin {
        return false;
    }
    is_whitelisted_email(Some(&user.email))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn user(role: UserRole, email: &str) -> User {
        User {
            id: Uuid::new_v4(),
            igreja_id: None,
            name: "Teste".to_string(),
            email: email.to_string(),
            avatar_url: None,
            role,
            subscription: None,
            is_whitelist: false,
        }
    }

    #[test]
    fn test_empty_or_missing_email_is_rejected() {
        assert!(!is_whitelisted_email(Some("")));
        assert!(!is_whitelisted_email(Some("   ")));
        assert!(!is_whitelisted_email(None));
    }

    #[test]
    fn test_allow_list_is_case_insensitive() {
        assert!(is_whitelisted_email(Some("ALTECHZERO@GMAIL.COM")));
        assert!(is_whitelisted_email(Some("altechzero@gmail.com")));
        assert!(is_whitelisted_email(Some(" AltechZero@Gmail.com ")));
        assert!(!is_whitelisted_email(Some("altechzero@gmail.com.br")));
    }

    #[test]
    fn test_role_alone_is_not_enough() {
        assert!(!is_authorized_super_admin(&user(
            UserRole::SuperAdmin,
            "random@x.com"
        )));
    }

    #[test]
    fn test_allow_listed_email_needs_the_role() {
        assert!(!is_authorized_super_admin(&user(
            UserRole::AdminIgreja,
            "altechzero@gmail.com"
        )));
    }

    #[test]
    fn test_role_and_allow_list_together() {
        assert!(is_authorized_super_admin(&user(
            UserRole::SuperAdmin,
            "AltechZero@gmail.com"
        )));
    }

    #[test]
    fn test_is_whitelist_flag_is_not_trusted() {
        let mut impostor = user(UserRole::SuperAdmin, "random@x.com");
        impostor.is_whitelist = true;
        assert!(!is_authorized_super_admin(&impostor));
    }
}
