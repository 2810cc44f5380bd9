//! Campus-scoped access policy.
//!
//! Single consolidation point for row visibility: every query over books,
//! loans or loan requests derives its campus filter here instead of
//! re-deriving role logic per endpoint. The builder is pure; it never
//! touches the database and has no error path — an absent user collapses
//! to [`ScopeFilter::DenyAll`].

use serde::Deserialize;
use utoipa::ToSchema;

use crate::models::user::{Role, UserClaims};

/// Scope requested by the caller, usually via a `?scope=` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ScopeRequest {
    /// Rows belonging to the caller's own campus (the default)
    Local,
    /// All campuses, where the caller's role allows it
    Global,
}

impl Default for ScopeRequest {
    fn default() -> Self {
        ScopeRequest::Local
    }
}

/// Effective row filter for a query over campus-scoped resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeFilter {
    /// No row is visible (unauthenticated caller)
    DenyAll,
    Rows {
        /// Restrict to this campus; `None` means all campuses
        campus_id: Option<i32>,
        /// Include soft-deleted rows in the result set
        include_deleted: bool,
    },
}

impl ScopeFilter {
    /// Compute the effective filter for the acting user.
    ///
    /// - admin: global access regardless of the requested scope
    /// - staff: local scope (the default) pins to the user's campus
    /// - regular-user: local pins to the user's campus; global drops the
    ///   campus filter but keeps every other filter the caller specified
    pub fn scope_for(
        user: Option<&UserClaims>,
        requested: Option<ScopeRequest>,
        include_deleted: bool,
    ) -> Self {
        let Some(user) = user else {
            return ScopeFilter::DenyAll;
        };

        let requested = requested.unwrap_or_default();
        let campus_id = match (user.role, requested) {
            (Role::Admin, _) => None,
            (_, ScopeRequest::Global) => None,
            (_, ScopeRequest::Local) => Some(user.campus_id),
        };

        // The deleted view is reserved for staff and admin
        let include_deleted = include_deleted && user.role != Role::RegularUser;

        ScopeFilter::Rows {
            campus_id,
            include_deleted,
        }
    }

    /// In-memory predicate over a (campus_id, is_deleted) row
    pub fn permits(&self, row_campus_id: i32, row_is_deleted: bool) -> bool {
        match *self {
            ScopeFilter::DenyAll => false,
            ScopeFilter::Rows {
                campus_id,
                include_deleted,
            } => {
                if row_is_deleted && !include_deleted {
                    return false;
                }
                campus_id.map(|c| c == row_campus_id).unwrap_or(true)
            }
        }
    }

    /// Push the filter as SQL conditions onto a dynamic WHERE clause.
    ///
    /// `campus_col` and `deleted_col` are trusted column expressions owned
    /// by the calling repository. Returns the campus id to bind, if any;
    /// the caller binds it at position `params + 1`.
    pub fn push_conditions(
        &self,
        conditions: &mut Vec<String>,
        campus_col: &str,
        deleted_col: &str,
        params: usize,
    ) -> Option<i32> {
        match *self {
            ScopeFilter::DenyAll => {
                conditions.push("FALSE".to_string());
                None
            }
            ScopeFilter::Rows {
                campus_id,
                include_deleted,
            } => {
                if !include_deleted {
                    conditions.push(format!("{} = FALSE", deleted_col));
                }
                if campus_id.is_some() {
                    conditions.push(format!("{} = ${}", campus_col, params + 1));
                }
                campus_id
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: Role, campus_id: i32) -> UserClaims {
        UserClaims {
            sub: "test".to_string(),
            user_id: 1,
            role,
            campus_id,
            exp: 0,
            iat: 0,
        }
    }

    #[test]
    fn missing_user_denies_everything() {
        let filter = ScopeFilter::scope_for(None, Some(ScopeRequest::Global), false);
        assert_eq!(filter, ScopeFilter::DenyAll);
        assert!(!filter.permits(1, false));
    }

    #[test]
    fn admin_sees_all_campuses() {
        let user = claims(Role::Admin, 1);
        for requested in [None, Some(ScopeRequest::Local), Some(ScopeRequest::Global)] {
            let filter = ScopeFilter::scope_for(Some(&user), requested, false);
            assert!(filter.permits(1, false));
            assert!(filter.permits(2, false));
        }
    }

    #[test]
    fn staff_default_scope_is_own_campus() {
        let user = claims(Role::Staff, 1);
        let filter = ScopeFilter::scope_for(Some(&user), None, false);
        assert!(filter.permits(1, false));
        assert!(!filter.permits(2, false));
    }

    #[test]
    fn regular_user_global_scope_drops_campus_filter() {
        let user = claims(Role::RegularUser, 1);
        let local = ScopeFilter::scope_for(Some(&user), Some(ScopeRequest::Local), false);
        assert!(!local.permits(2, false));

        let global = ScopeFilter::scope_for(Some(&user), Some(ScopeRequest::Global), false);
        assert!(global.permits(2, false));
    }

    #[test]
    fn soft_deleted_rows_are_hidden_by_default() {
        let user = claims(Role::Staff, 1);
        let filter = ScopeFilter::scope_for(Some(&user), None, false);
        assert!(!filter.permits(1, true));

        let with_deleted = ScopeFilter::scope_for(Some(&user), None, true);
        assert!(with_deleted.permits(1, true));
    }

    #[test]
    fn deleted_view_is_not_available_to_regular_users() {
        let user = claims(Role::RegularUser, 1);
        let filter = ScopeFilter::scope_for(Some(&user), None, true);
        assert!(!filter.permits(1, true));
    }

    #[test]
    fn deny_all_pushes_false_condition() {
        let mut conditions = Vec::new();
        let bind = ScopeFilter::DenyAll.push_conditions(&mut conditions, "campus_id", "is_deleted", 0);
        assert_eq!(conditions, vec!["FALSE".to_string()]);
        assert!(bind.is_none());
    }

    #[test]
    fn campus_filter_binds_next_parameter() {
        let user = claims(Role::Staff, 3);
        let filter = ScopeFilter::scope_for(Some(&user), None, false);
        let mut conditions = Vec::new();
        let bind = filter.push_conditions(&mut conditions, "b.campus_id", "b.is_deleted", 2);
        assert_eq!(
            conditions,
            vec!["b.is_deleted = FALSE".to_string(), "b.campus_id = $3".to_string()]
        );
        assert_eq!(bind, Some(3));
    }
}
