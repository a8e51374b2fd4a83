//! Server-reported session, bucket and collection state.
//!
//! These shapes are read-only inputs. They are produced by whatever talks to
//! the server and replaced wholesale when a new snapshot arrives; nothing
//! in this crate mutates them.

use serde::{Deserialize, Serialize};

use crate::permissions::{self, PermissionEntry, PermissionsList};
use crate::principal::Principal;

/// The signer capability as advertised by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerCapability {
    /// Default reviewers group name, may contain `{collection_id}`.
    #[serde(default)]
    pub reviewers_group: Option<String>,
    /// Default editors group name, may contain `{collection_id}`.
    #[serde(default)]
    pub editors_group: Option<String>,
}

/// The history capability. Its presence is all that matters here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryCapability {
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    #[serde(default)]
    pub signer: Option<SignerCapability>,
    #[serde(default)]
    pub history: Option<HistoryCapability>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: Option<String>,
    /// `None` when the server did not report principals for this user.
    #[serde(default)]
    pub principals: Option<Vec<Principal>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub capabilities: Capabilities,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// `None` when the permissions endpoint is not available.
    #[serde(default)]
    pub permissions: Option<PermissionsList>,
    #[serde(default)]
    pub server_info: ServerInfo,
}

impl SessionState {
    pub fn auth(&self) -> AuthContext<'_> {
        let user = self.server_info.user.as_ref();
        AuthContext {
            user_id: user.and_then(|u| u.id.as_deref()),
            principals: user.and_then(|u| u.principals.as_deref()),
            permissions: self.permissions.as_deref(),
        }
    }

    pub fn signer(&self) -> Option<&SignerCapability> {
        self.server_info.capabilities.signer.as_ref()
    }

    pub fn has_history(&self) -> bool {
        self.server_info.capabilities.history.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceData {
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketState {
    pub data: ResourceData,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionState {
    pub data: ResourceData,
}

impl BucketState {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            data: ResourceData { id: id.into() },
        }
    }
}

impl CollectionState {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            data: ResourceData { id: id.into() },
        }
    }
}

/// Who is acting and what they may do, borrowed from a [`SessionState`].
///
/// The permission evaluator and the group resolver take this explicitly
/// instead of reaching for the session themselves.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthContext<'a> {
    pub user_id: Option<&'a str>,
    pub principals: Option<&'a [Principal]>,
    pub permissions: Option<&'a [PermissionEntry]>,
}

impl AuthContext<'_> {
    /// `false` when no principal list was reported.
    pub fn has_principal(&self, principal: &Principal) -> bool {
        self.principals
            .map(|principals| principals.contains(principal))
            .unwrap_or(false)
    }

    pub fn can_create_bucket(&self) -> bool {
        permissions::can_create_bucket(self.permissions)
    }

    pub fn can_edit_bucket(&self, bid: &str) -> bool {
        permissions::can_edit_bucket(self.permissions, bid)
    }

    pub fn can_create_collection(&self, bid: &str) -> bool {
        permissions::can_create_collection(self.permissions, bid)
    }

    pub fn can_edit_collection(&self, bid: &str, cid: &str) -> bool {
        permissions::can_edit_collection(self.permissions, bid, cid)
    }

    pub fn can_create_group(&self, bid: &str) -> bool {
        permissions::can_create_group(self.permissions, bid)
    }

    pub fn can_edit_group(&self, bid: &str, gid: Option<&str>) -> bool {
        permissions::can_edit_group(self.permissions, bid, gid)
    }

    pub fn can_create_record(&self, bid: &str, cid: &str) -> bool {
        permissions::can_create_record(self.permissions, bid, cid)
    }

    pub fn can_edit_record(&self, bid: &str, cid: &str, rid: &str) -> bool {
        permissions::can_edit_record(self.permissions, bid, cid, rid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_session() {
        let json = r#"{
            "permissions": [
                {"resource_name": "bucket", "bucket_id": "stage", "permissions": ["write"]}
            ],
            "server_info": {
                "user": {"id": "fxa:yo", "principals": ["fxa:yo", "/buckets/stage/groups/certs_editors"]},
                "capabilities": {
                    "signer": {"editors_group": "{collection_id}_editors", "reviewers_group": "{collection_id}_reviewers"},
                    "history": {}
                }
            }
        }"#;
        let session: SessionState = serde_json::from_str(json).unwrap();
        let auth = session.auth();
        assert_eq!(auth.user_id, Some("fxa:yo"));
        assert!(auth.has_principal(&Principal::group("stage", "certs_editors")));
        assert!(auth.can_edit_collection("stage", "certs"));
        assert!(session.has_history());
        assert_eq!(
            session.signer().unwrap().editors_group.as_deref(),
            Some("{collection_id}_editors")
        );
    }

    #[test]
    fn test_missing_permissions_is_unknown() {
        let session: SessionState = serde_json::from_str(r#"{"server_info": {}}"#).unwrap();
        assert!(session.permissions.is_none());
        assert!(session.auth().can_edit_bucket("anything"));
        assert!(!session.has_history());
        assert!(!session.auth().has_principal(&Principal::Everyone));
    }
}
