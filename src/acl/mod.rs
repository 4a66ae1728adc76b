//! Row-scope access control for My Vote.
//!
//! Every caller is either an administrator, who sees every row, or a ward
//! member, who is confined to one ward. A ward member's booth identifiers
//! are resolved once when the caller is built and reused for every query.

mod query_filter;

use serde::{Deserialize, Serialize};

use crate::error::{AclError, Result};
use crate::query::{ScalarValue, Table};
use crate::store::{Predicate, RowQuery, RowStore};

pub use query_filter::apply_scope;

/// Caller roles reported by the capability query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Unrestricted access.
    Admin,
    /// Restricted to an assigned ward.
    WardMember,
}

impl Role {
    /// Parse a role from a string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "admin" => Some(Role::Admin),
            "ward_member" => Some(Role::WardMember),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::WardMember => "ward_member",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The identity a query runs under.
#[derive(Debug, Clone, PartialEq)]
pub enum Caller {
    Admin,
    WardMember {
        ward_id: ScalarValue,
        /// Booths belonging to the ward, pre-resolved.
        booth_ids: Vec<ScalarValue>,
    },
}

impl Caller {
    /// Build a ward member with known booths.
    pub fn ward_member(ward_id: impl Into<ScalarValue>, booth_ids: Vec<ScalarValue>) -> Self {
        Caller::WardMember {
            ward_id: ward_id.into(),
            booth_ids,
        }
    }

    /// Build a caller from a capability answer, looking up the ward's booths.
    ///
    /// The booth lookup is a direct store read; scope is what is being built
    /// here, so it cannot go through the scoped executor.
    pub async fn resolve(
        store: &dyn RowStore,
        role: Role,
        ward_id: Option<ScalarValue>,
    ) -> Result<Self> {
        match role {
            Role::Admin => Ok(Caller::Admin),
            Role::WardMember => {
                let ward_id = ward_id.ok_or(AclError::MissingWard)?;
                let query = RowQuery::rows(Table::Booths, None)
                    .with_predicate(Predicate::eq("ward_id", ward_id.clone()));

                let booth_ids: Vec<ScalarValue> = store
                    .query(&query)
                    .await?
                    .into_rows()
                    .iter()
                    .filter_map(|row| row.get("id").and_then(ScalarValue::from_json))
                    .collect();

                tracing::debug!(ward_id = %ward_id, booths = booth_ids.len(), "Resolved ward member scope");

                Ok(Caller::WardMember { ward_id, booth_ids })
            }
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Caller::Admin => Role::Admin,
            Caller::WardMember { .. } => Role::WardMember,
        }
    }

    pub fn is_restricted(&self) -> bool {
        matches!(self, Caller::WardMember { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryRowStore;
    use serde_json::json;

    #[test]
    fn test_role_from_str() {
        assert_eq!(Role::from_str("admin"), Some(Role::Admin));
        assert_eq!(Role::from_str("ward_member"), Some(Role::WardMember));
        assert_eq!(Role::from_str("Ward-Member"), Some(Role::WardMember));
        assert_eq!(Role::from_str("voter"), None);
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&Role::WardMember).unwrap(), "\"ward_member\"");
    }

    #[tokio::test]
    async fn test_resolve_admin() {
        let store = MemoryRowStore::new();
        let caller = Caller::resolve(&store, Role::Admin, None).await.unwrap();
        assert_eq!(caller, Caller::Admin);
        assert!(!caller.is_restricted());
    }

    #[tokio::test]
    async fn test_resolve_ward_member_booths() {
        let store = MemoryRowStore::from_json(&json!({
            "booths": [
                {"id": 1, "name": "GLPS", "booth_no": "1", "ward_id": 7},
                {"id": 2, "name": "UPS", "booth_no": "2", "ward_id": 7},
                {"id": 3, "name": "HS", "booth_no": "3", "ward_id": 8}
            ]
        }))
        .unwrap();

        let caller = Caller::resolve(&store, Role::WardMember, Some(ScalarValue::from(7_i64)))
            .await
            .unwrap();

        match caller {
            Caller::WardMember { ward_id, booth_ids } => {
                assert_eq!(ward_id, ScalarValue::from(7_i64));
                assert_eq!(booth_ids, vec![ScalarValue::from(1_i64), ScalarValue::from(2_i64)]);
            }
            Caller::Admin => panic!("expected ward member"),
        }
    }

    #[tokio::test]
    async fn test_resolve_ward_member_requires_ward() {
        let store = MemoryRowStore::new();
        let err = Caller::resolve(&store, Role::WardMember, None).await.unwrap_err();
        assert!(matches!(err, crate::error::MyVoteError::Acl(AclError::MissingWard)));
    }
}
