//! Access evaluation for the user resource.
//!
//! A pure predicate over (actor, method, path): no I/O, no shared state,
//! evaluated per request by every CRUD handler before it touches storage.

use axum::http::Method;

use crate::services::{AccessTokenClaims, ServiceError};

/// Canonical collection path for the user resource.
pub const USER_COLLECTION_PATH: &str = "/api/user";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    Deny,
}

/// Build the canonical single-item path for a user id. Handlers derive it
/// from the parsed route parameter so the own-resource rule compares
/// canonical paths, never raw request strings.
pub fn user_path(id: impl std::fmt::Display) -> String {
    format!("{}/{}", USER_COLLECTION_PATH, id)
}

/// Decide whether `actor` may perform `method` on `path`.
///
/// Rules in order, first match wins:
/// 1. staff may do anything;
/// 2. POST is public (self-registration);
/// 3. an authenticated user may act on exactly their own resource path;
/// 4. the collection may be read by anyone;
/// 5. everything else is denied.
pub fn decide(actor: Option<&AccessTokenClaims>, method: &Method, path: &str) -> Access {
    if actor.is_some_and(|claims| claims.is_staff) {
        return Access::Allow;
    }

    if *method == Method::POST {
        return Access::Allow;
    }

    if let Some(claims) = actor {
        // exact match only - a prefix or suffix of the own path stays denied
        if path == user_path(&claims.sub) {
            return Access::Allow;
        }
    }

    if path == USER_COLLECTION_PATH && is_read_only(method) {
        return Access::Allow;
    }

    Access::Deny
}

/// `decide`, surfacing denial as the service error.
pub fn authorize(
    actor: Option<&AccessTokenClaims>,
    method: &Method,
    path: &str,
) -> Result<(), ServiceError> {
    match decide(actor, method, path) {
        Access::Allow => Ok(()),
        Access::Deny => Err(ServiceError::PermissionDenied),
    }
}

fn is_read_only(method: &Method) -> bool {
    *method == Method::GET || *method == Method::HEAD || *method == Method::OPTIONS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(sub: &str, is_staff: bool) -> AccessTokenClaims {
        AccessTokenClaims {
            sub: sub.to_string(),
            is_staff,
            token_type: "access".to_string(),
            exp: 0,
            iat: 0,
            jti: "jti".to_string(),
        }
    }

    #[test]
    fn staff_is_allowed_everything() {
        let staff = claims("11111111-1111-1111-1111-111111111111", true);
        let other = user_path("22222222-2222-2222-2222-222222222222");

        for method in [Method::GET, Method::POST, Method::PATCH, Method::DELETE] {
            assert_eq!(decide(Some(&staff), &method, &other), Access::Allow);
            assert_eq!(
                decide(Some(&staff), &method, USER_COLLECTION_PATH),
                Access::Allow
            );
        }
    }

    #[test]
    fn anonymous_may_post() {
        assert_eq!(
            decide(None, &Method::POST, USER_COLLECTION_PATH),
            Access::Allow
        );
    }

    #[test]
    fn authenticated_user_may_act_on_own_resource() {
        let sub = "11111111-1111-1111-1111-111111111111";
        let user = claims(sub, false);
        let own = user_path(sub);

        for method in [Method::GET, Method::PATCH, Method::DELETE] {
            assert_eq!(decide(Some(&user), &method, &own), Access::Allow);
        }
    }

    #[test]
    fn authenticated_user_may_not_touch_another_resource() {
        let user = claims("11111111-1111-1111-1111-111111111111", false);
        let other = user_path("22222222-2222-2222-2222-222222222222");

        for method in [Method::GET, Method::PATCH, Method::DELETE] {
            assert_eq!(decide(Some(&user), &method, &other), Access::Deny);
        }
    }

    #[test]
    fn own_resource_match_is_exact_not_prefix() {
        let sub = "11111111-1111-1111-1111-111111111111";
        let user = claims(sub, false);

        let padded = format!("{}x", user_path(sub));
        assert_eq!(decide(Some(&user), &Method::DELETE, &padded), Access::Deny);

        let nested = format!("{}/extra", user_path(sub));
        assert_eq!(decide(Some(&user), &Method::DELETE, &nested), Access::Deny);

        let trailing = format!("{}/", user_path(sub));
        assert_eq!(decide(Some(&user), &Method::DELETE, &trailing), Access::Deny);
    }

    #[test]
    fn collection_reads_are_public() {
        assert_eq!(
            decide(None, &Method::GET, USER_COLLECTION_PATH),
            Access::Allow
        );
        let user = claims("11111111-1111-1111-1111-111111111111", false);
        assert_eq!(
            decide(Some(&user), &Method::GET, USER_COLLECTION_PATH),
            Access::Allow
        );
    }

    #[test]
    fn single_item_reads_of_others_are_denied() {
        // collection reads are public but item reads stay owner/staff-only
        let other = user_path("22222222-2222-2222-2222-222222222222");
        assert_eq!(decide(None, &Method::GET, &other), Access::Deny);

        let user = claims("11111111-1111-1111-1111-111111111111", false);
        assert_eq!(decide(Some(&user), &Method::GET, &other), Access::Deny);
    }

    #[test]
    fn anonymous_writes_are_denied() {
        let target = user_path("22222222-2222-2222-2222-222222222222");
        for method in [Method::PATCH, Method::DELETE, Method::PUT] {
            assert_eq!(decide(None, &method, &target), Access::Deny);
        }
        assert_eq!(
            decide(None, &Method::DELETE, USER_COLLECTION_PATH),
            Access::Deny
        );
    }
}
