//! Role-based visibility for clients and files.
//!
//! An [`AccessPolicy`] maps a caller to a [`Visibility`]:
//! - privileged roles (`gmd`, `chairman` by default) get [`Visibility::Unrestricted`]
//! - every other role gets [`Visibility::OwnedBy`] its own user id
//!
//! The same `Visibility` value is used to check single records in memory and to
//! extend SQL queries, so the filtering rule exists in one place.

use sqlx::{Postgres, QueryBuilder};

use crate::features::auth::model::AuthenticatedUser;

#[derive(Debug, Clone)]
pub struct AccessPolicy {
    privileged_roles: Vec<String>,
}

/// What a single caller is allowed to see and act on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visibility {
    Unrestricted,
    OwnedBy(String),
}

impl AccessPolicy {
    pub fn new(privileged_roles: Vec<String>) -> Self {
        Self { privileged_roles }
    }

    pub fn is_privileged(&self, user: &AuthenticatedUser) -> bool {
        self.privileged_roles.iter().any(|r| user.has_role(r))
    }

    pub fn visibility(&self, user: &AuthenticatedUser) -> Visibility {
        if self.is_privileged(user) {
            Visibility::Unrestricted
        } else {
            Visibility::OwnedBy(user.user_id.clone())
        }
    }
}

impl Visibility {
    /// Whether a file uploaded by `uploaded_by` is visible and mutable
    pub fn permits(&self, uploaded_by: &str) -> bool {
        match self {
            Visibility::Unrestricted => true,
            Visibility::OwnedBy(owner) => owner == uploaded_by,
        }
    }

    /// Whether a client is listed, given the uploaders of all its files.
    ///
    /// Mirrors `LEFT JOIN files f ... WHERE f.uploaded_by = $owner OR f.id IS NULL`:
    /// clients without files are always listed, clients with files only when at
    /// least one of them passes [`Visibility::permits`].
    pub fn lists_client<'a>(&self, uploaders: impl Iterator<Item = &'a str>) -> bool {
        if *self == Visibility::Unrestricted {
            return true;
        }
        let mut has_files = false;
        for uploader in uploaders {
            if self.permits(uploader) {
                return true;
            }
            has_files = true;
        }
        !has_files
    }

    /// Append ` AND <column> = $n` for restricted callers.
    pub fn push_owner_filter(&self, qb: &mut QueryBuilder<'_, Postgres>, column: &str) {
        if let Visibility::OwnedBy(owner) = self {
            qb.push(" AND ")
                .push(column)
                .push(" = ")
                .push_bind(owner.clone());
        }
    }

    /// Append the join filter for the client listing, or nothing for unrestricted callers.
    ///
    /// `files_alias` is the alias of the left-joined `files` table.
    pub fn push_client_join_filter(&self, qb: &mut QueryBuilder<'_, Postgres>, files_alias: &str) {
        if let Visibility::OwnedBy(owner) = self {
            qb.push(" WHERE (")
                .push(files_alias)
                .push(".uploaded_by = ")
                .push_bind(owner.clone())
                .push(" OR ")
                .push(files_alias)
                .push(".id IS NULL)");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::constants::{ROLE_CHAIRMAN, ROLE_GMD};

    fn policy() -> AccessPolicy {
        AccessPolicy::new(vec![ROLE_GMD.to_string(), ROLE_CHAIRMAN.to_string()])
    }

    #[test]
    fn test_privileged_roles_are_unrestricted() {
        let policy = policy();
        for role in [ROLE_GMD, ROLE_CHAIRMAN] {
            let user = AuthenticatedUser::new("u1", role);
            assert_eq!(policy.visibility(&user), Visibility::Unrestricted);
        }
    }

    #[test]
    fn test_other_roles_are_scoped_to_owner() {
        let user = AuthenticatedUser::new("u7", "accountant");
        let visibility = policy().visibility(&user);

        assert_eq!(visibility, Visibility::OwnedBy("u7".to_string()));
        assert!(visibility.permits("u7"));
        assert!(!visibility.permits("u8"));
    }

    #[test]
    fn test_role_match_is_exact() {
        let user = AuthenticatedUser::new("u1", "GMD");
        assert!(!policy().is_privileged(&user));
    }

    #[test]
    fn test_lists_client_rule() {
        let scoped = Visibility::OwnedBy("a".to_string());

        // no files at all
        assert!(scoped.lists_client(std::iter::empty()));
        // only own files
        assert!(scoped.lists_client(["a", "a"].into_iter()));
        // mixed
        assert!(scoped.lists_client(["b", "a"].into_iter()));
        // only other users' files
        assert!(!scoped.lists_client(["b", "c"].into_iter()));

        assert!(Visibility::Unrestricted.lists_client(["b"].into_iter()));
    }

    #[test]
    fn test_push_owner_filter_binds_owner() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM files WHERE client_id = ");
        qb.push_bind(1_i64);
        Visibility::OwnedBy("a".to_string()).push_owner_filter(&mut qb, "uploaded_by");

        assert_eq!(
            qb.sql(),
            "SELECT * FROM files WHERE client_id = $1 AND uploaded_by = $2"
        );
    }

    #[test]
    fn test_unrestricted_pushes_nothing() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1 FROM clients c");
        Visibility::Unrestricted.push_client_join_filter(&mut qb, "f");
        Visibility::Unrestricted.push_owner_filter(&mut qb, "f.uploaded_by");

        assert_eq!(qb.sql(), "SELECT 1 FROM clients c");
    }

    #[test]
    fn test_push_client_join_filter() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1 FROM clients c");
        Visibility::OwnedBy("a".to_string()).push_client_join_filter(&mut qb, "f");

        assert_eq!(
            qb.sql(),
            "SELECT 1 FROM clients c WHERE (f.uploaded_by = $1 OR f.id IS NULL)"
        );
    }
}
