//! # Permission evaluation
//!
//! The server reports the current user's effective permissions as a flat
//! list of [`PermissionEntry`] values, one per resource on which the user
//! holds something. Every check here is a predicate over a single entry,
//! combined with [`can`]: the check passes if any entry matches.
//!
//! ## Unknown permissions
//!
//! A missing list (`None`) is not the same as an empty one. `None` means the
//! server does not expose the permissions endpoint, so nothing can be
//! computed and [`can`] answers `true` for every predicate. An empty list
//! denies everything. This fail-open default is security relevant: the
//! server still enforces its own ACLs, the console only decides what to
//! show.
//!
//! ## Inheritance
//!
//! `write` on a bucket implies `write` on everything inside it, and `write`
//! on a collection implies `write` on its records. Creation rights are
//! their own permission names (`bucket:create`, `collection:create`, ...).

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

mod form;

pub use form::{
    form_data_to_permissions, permissions_to_form_data, PermissionsForm, PrincipalPermissions,
    ServerPermissions,
};

pub const WRITE: &str = "write";
pub const READ: &str = "read";
pub const BUCKET_CREATE: &str = "bucket:create";
pub const COLLECTION_CREATE: &str = "collection:create";
pub const GROUP_CREATE: &str = "group:create";
pub const RECORD_CREATE: &str = "record:create";

/// The kind of resource a [`PermissionEntry`] is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    Root,
    Bucket,
    Collection,
    Group,
    Record,
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceType::Root => write!(f, "root"),
            ResourceType::Bucket => write!(f, "bucket"),
            ResourceType::Collection => write!(f, "collection"),
            ResourceType::Group => write!(f, "group"),
            ResourceType::Record => write!(f, "record"),
        }
    }
}

/// One entry of the permissions endpoint.
///
/// Each variant only carries the identifiers that make sense for its
/// resource type, so a root entry can never be mistaken for a bucket one.
/// The wire shape is the server's: a `resource_name` tag, the ids, and a
/// `permissions` array. Extra fields (`id`, `uri`) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "resource_name", rename_all = "lowercase")]
pub enum PermissionEntry {
    Root {
        permissions: BTreeSet<String>,
    },
    Bucket {
        bucket_id: String,
        permissions: BTreeSet<String>,
    },
    Collection {
        bucket_id: String,
        collection_id: String,
        permissions: BTreeSet<String>,
    },
    Group {
        bucket_id: String,
        group_id: String,
        permissions: BTreeSet<String>,
    },
    Record {
        bucket_id: String,
        collection_id: String,
        record_id: String,
        permissions: BTreeSet<String>,
    },
}

impl PermissionEntry {
    pub fn resource_type(&self) -> ResourceType {
        match self {
            PermissionEntry::Root { .. } => ResourceType::Root,
            PermissionEntry::Bucket { .. } => ResourceType::Bucket,
            PermissionEntry::Collection { .. } => ResourceType::Collection,
            PermissionEntry::Group { .. } => ResourceType::Group,
            PermissionEntry::Record { .. } => ResourceType::Record,
        }
    }

    /// Permission names granted on this resource.
    pub fn permissions(&self) -> &BTreeSet<String> {
        match self {
            PermissionEntry::Root { permissions }
            | PermissionEntry::Bucket { permissions, .. }
            | PermissionEntry::Collection { permissions, .. }
            | PermissionEntry::Group { permissions, .. }
            | PermissionEntry::Record { permissions, .. } => permissions,
        }
    }

    pub fn grants(&self, permission: &str) -> bool {
        self.permissions().contains(permission)
    }

    /// Bucket the entry is scoped to; `None` for root entries.
    pub fn bucket_id(&self) -> Option<&str> {
        match self {
            PermissionEntry::Root { .. } => None,
            PermissionEntry::Bucket { bucket_id, .. }
            | PermissionEntry::Collection { bucket_id, .. }
            | PermissionEntry::Group { bucket_id, .. }
            | PermissionEntry::Record { bucket_id, .. } => Some(bucket_id),
        }
    }

    fn is_bucket(&self, bid: &str) -> bool {
        matches!(self, PermissionEntry::Bucket { bucket_id, .. } if bucket_id == bid)
    }

    fn is_collection(&self, bid: &str, cid: &str) -> bool {
        matches!(
            self,
            PermissionEntry::Collection { bucket_id, collection_id, .. }
                if bucket_id == bid && collection_id == cid
        )
    }

    fn is_group(&self, bid: &str, gid: &str) -> bool {
        matches!(
            self,
            PermissionEntry::Group { bucket_id, group_id, .. }
                if bucket_id == bid && group_id == gid
        )
    }

    fn is_record(&self, bid: &str, cid: &str, rid: &str) -> bool {
        matches!(
            self,
            PermissionEntry::Record { bucket_id, collection_id, record_id, .. }
                if bucket_id == bid && collection_id == cid && record_id == rid
        )
    }
}

/// The permissions reported for the current session.
pub type PermissionsList = Vec<PermissionEntry>;

/// Evaluate `predicate` against a permissions list.
///
/// Returns `true` when the list is unknown (`None`), otherwise `true` iff at
/// least one entry matches.
pub fn can<F>(permissions: Option<&[PermissionEntry]>, predicate: F) -> bool
where
    F: Fn(&PermissionEntry) -> bool,
{
    match permissions {
        None => true,
        Some(entries) => entries.iter().any(predicate),
    }
}

pub fn can_create_bucket(permissions: Option<&[PermissionEntry]>) -> bool {
    can(permissions, |entry| {
        entry.resource_type() == ResourceType::Root && entry.grants(BUCKET_CREATE)
    })
}

pub fn can_edit_bucket(permissions: Option<&[PermissionEntry]>, bid: &str) -> bool {
    can(permissions, |entry| entry.is_bucket(bid) && entry.grants(WRITE))
}

pub fn can_create_collection(permissions: Option<&[PermissionEntry]>, bid: &str) -> bool {
    can(permissions, |entry| {
        entry.is_bucket(bid) && entry.grants(COLLECTION_CREATE)
    })
}

pub fn can_edit_collection(permissions: Option<&[PermissionEntry]>, bid: &str, cid: &str) -> bool {
    can(permissions, |entry| {
        (entry.is_bucket(bid) || entry.is_collection(bid, cid)) && entry.grants(WRITE)
    })
}

pub fn can_create_group(permissions: Option<&[PermissionEntry]>, bid: &str) -> bool {
    can(permissions, |entry| {
        entry.is_bucket(bid) && entry.grants(GROUP_CREATE)
    })
}

/// Editing a group that does not exist yet (`gid` empty or `None`) is
/// always denied, even when the permissions list is unknown.
pub fn can_edit_group(permissions: Option<&[PermissionEntry]>, bid: &str, gid: Option<&str>) -> bool {
    let Some(gid) = gid.filter(|gid| !gid.is_empty()) else {
        return false;
    };
    can(permissions, |entry| {
        (entry.is_bucket(bid) || entry.is_group(bid, gid)) && entry.grants(WRITE)
    })
}

pub fn can_create_record(permissions: Option<&[PermissionEntry]>, bid: &str, cid: &str) -> bool {
    can(permissions, |entry| {
        (entry.is_bucket(bid) && entry.grants(WRITE))
            || (entry.is_collection(bid, cid) && entry.grants(RECORD_CREATE))
    })
}

pub fn can_edit_record(
    permissions: Option<&[PermissionEntry]>,
    bid: &str,
    cid: &str,
    rid: &str,
) -> bool {
    can(permissions, |entry| {
        (entry.is_bucket(bid) || entry.is_collection(bid, cid) || entry.is_record(bid, cid, rid))
            && entry.grants(WRITE)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn perms(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn bucket(bid: &str, names: &[&str]) -> PermissionEntry {
        PermissionEntry::Bucket {
            bucket_id: bid.into(),
            permissions: perms(names),
        }
    }

    fn collection(bid: &str, cid: &str, names: &[&str]) -> PermissionEntry {
        PermissionEntry::Collection {
            bucket_id: bid.into(),
            collection_id: cid.into(),
            permissions: perms(names),
        }
    }

    #[test]
    fn test_unknown_list_fails_open() {
        assert!(can(None, |_| false));
        assert!(can_create_bucket(None));
        assert!(can_edit_bucket(None, "b"));
        assert!(can_edit_collection(None, "b", "c"));
        assert!(can_create_record(None, "b", "c"));
        assert!(can_edit_record(None, "b", "c", "r"));
    }

    #[test]
    fn test_empty_list_denies() {
        let list: PermissionsList = vec![];
        assert!(!can(Some(&list), |_| true));
        assert!(!can_edit_bucket(Some(&list), "b"));
    }

    #[test]
    fn test_create_bucket_needs_root_entry() {
        let root = vec![PermissionEntry::Root {
            permissions: perms(&[BUCKET_CREATE]),
        }];
        assert!(can_create_bucket(Some(&root)));

        let elsewhere = vec![bucket("b", &[BUCKET_CREATE])];
        assert!(!can_create_bucket(Some(&elsewhere)));
    }

    #[test]
    fn test_edit_bucket_scoped_to_bid() {
        let list = vec![bucket("stage", &[WRITE]), bucket("main", &[READ])];
        assert!(can_edit_bucket(Some(&list), "stage"));
        assert!(!can_edit_bucket(Some(&list), "main"));
        assert!(!can_edit_bucket(Some(&list), "other"));
    }

    #[test]
    fn test_create_collection() {
        let list = vec![bucket("stage", &[COLLECTION_CREATE])];
        assert!(can_create_collection(Some(&list), "stage"));
        assert!(!can_create_collection(Some(&list), "main"));
        assert!(!can_edit_bucket(Some(&list), "stage"));
    }

    #[test]
    fn test_edit_collection_from_bucket_or_collection() {
        let from_bucket = vec![bucket("stage", &[WRITE])];
        assert!(can_edit_collection(Some(&from_bucket), "stage", "anything"));

        let from_collection = vec![collection("stage", "certs", &[WRITE])];
        assert!(can_edit_collection(Some(&from_collection), "stage", "certs"));
        assert!(!can_edit_collection(Some(&from_collection), "stage", "other"));
        assert!(!can_edit_collection(Some(&from_collection), "main", "certs"));

        let read_only = vec![collection("stage", "certs", &[READ])];
        assert!(!can_edit_collection(Some(&read_only), "stage", "certs"));
    }

    #[test]
    fn test_groups() {
        let list = vec![
            bucket("stage", &[GROUP_CREATE]),
            PermissionEntry::Group {
                bucket_id: "stage".into(),
                group_id: "editors".into(),
                permissions: perms(&[WRITE]),
            },
        ];
        assert!(can_create_group(Some(&list), "stage"));
        assert!(can_edit_group(Some(&list), "stage", Some("editors")));
        assert!(!can_edit_group(Some(&list), "stage", Some("reviewers")));
        assert!(!can_edit_group(Some(&list), "stage", None));
        assert!(!can_edit_group(None, "stage", Some("")));
    }

    #[test]
    fn test_create_record() {
        let list = vec![collection("stage", "certs", &[RECORD_CREATE])];
        assert!(can_create_record(Some(&list), "stage", "certs"));
        assert!(!can_create_record(Some(&list), "stage", "other"));

        let bucket_write = vec![bucket("stage", &[WRITE])];
        assert!(can_create_record(Some(&bucket_write), "stage", "other"));
    }

    #[test]
    fn test_edit_record_inherits() {
        let record = vec![PermissionEntry::Record {
            bucket_id: "stage".into(),
            collection_id: "certs".into(),
            record_id: "r1".into(),
            permissions: perms(&[WRITE]),
        }];
        assert!(can_edit_record(Some(&record), "stage", "certs", "r1"));
        assert!(!can_edit_record(Some(&record), "stage", "certs", "r2"));
        assert!(!can_edit_record(Some(&record), "stage", "other", "r1"));

        let coll = vec![collection("stage", "certs", &[WRITE])];
        assert!(can_edit_record(Some(&coll), "stage", "certs", "any"));

        let bkt = vec![bucket("stage", &[WRITE])];
        assert!(can_edit_record(Some(&bkt), "stage", "x", "y"));
    }

    #[test]
    fn test_deserialize_server_entries() {
        let json = r#"[
            {"resource_name": "root", "id": "", "uri": "/", "permissions": ["bucket:create"]},
            {"resource_name": "bucket", "bucket_id": "stage", "id": "stage", "uri": "/buckets/stage", "permissions": ["write", "read"]},
            {"resource_name": "collection", "bucket_id": "stage", "collection_id": "certs", "permissions": ["write"]},
            {"resource_name": "record", "bucket_id": "stage", "collection_id": "certs", "record_id": "r", "permissions": ["read"]}
        ]"#;
        let list: PermissionsList = serde_json::from_str(json).unwrap();
        assert_eq!(list.len(), 4);
        assert_eq!(list[0].resource_type(), ResourceType::Root);
        assert_eq!(list[0].bucket_id(), None);
        assert_eq!(list[1], bucket("stage", &[WRITE, READ]));
        assert_eq!(list[3].resource_type().to_string(), "record");
    }

    #[test]
    fn test_deserialize_unknown_resource_fails() {
        let json = r#"{"resource_name": "attachment", "permissions": []}"#;
        assert!(serde_json::from_str::<PermissionEntry>(json).is_err());
    }
}
