//! Conversion between the server's ACL object and its form representation.
//!
//! The server stores ACLs keyed by permission name:
//!
//! ```text
//! { "write": ["account:alice", "/buckets/stage/groups/editors"],
//!   "read":  ["system.Everyone"] }
//! ```
//!
//! The edit form groups the same data by principal, splitting out the two
//! system principals and the groups of the current bucket:
//!
//! ```text
//! { "anonymous": ["read"], "authenticated": [],
//!   "groups": { "editors": ["write"] },
//!   "principals": [{ "principal": "account:alice", "permissions": ["write"] }] }
//! ```
//!
//! Every `(principal, permission)` pair appears exactly once on each side,
//! so converting there and back yields the original object up to the order
//! of principals within a permission.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::principal::Principal;

/// Permission name to granted principals, as stored by the server.
pub type ServerPermissions = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrincipalPermissions {
    pub principal: String,
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionsForm {
    /// Permissions granted to `system.Everyone`.
    #[serde(default)]
    pub anonymous: Vec<String>,
    /// Permissions granted to `system.Authenticated`.
    #[serde(default)]
    pub authenticated: Vec<String>,
    /// Permissions granted to groups of the current bucket, by group id.
    #[serde(default)]
    pub groups: BTreeMap<String, Vec<String>>,
    /// Every other principal, sorted by principal.
    #[serde(default)]
    pub principals: Vec<PrincipalPermissions>,
}

pub fn permissions_to_form_data(bid: &str, permissions: &ServerPermissions) -> PermissionsForm {
    let mut form = PermissionsForm::default();
    let mut others: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for (permission, principals) in permissions {
        for raw in principals {
            let principal = raw
                .parse::<Principal>()
                .unwrap_or_else(|_| Principal::User(raw.clone()));
            match principal {
                Principal::Everyone => form.anonymous.push(permission.clone()),
                Principal::Authenticated => form.authenticated.push(permission.clone()),
                _ => match principal.group_of(bid) {
                    Some(gid) => form
                        .groups
                        .entry(gid.to_string())
                        .or_default()
                        .push(permission.clone()),
                    None => others
                        .entry(raw.clone())
                        .or_default()
                        .push(permission.clone()),
                },
            }
        }
    }

    form.principals = others
        .into_iter()
        .map(|(principal, permissions)| PrincipalPermissions {
            principal,
            permissions,
        })
        .collect();
    form
}

pub fn form_data_to_permissions(bid: &str, form: &PermissionsForm) -> ServerPermissions {
    let mut permissions = ServerPermissions::new();

    for permission in &form.anonymous {
        grant(&mut permissions, permission, Principal::Everyone.to_string());
    }
    for permission in &form.authenticated {
        grant(&mut permissions, permission, Principal::Authenticated.to_string());
    }
    for (gid, granted) in &form.groups {
        let principal = Principal::group(bid, gid.as_str()).to_string();
        for permission in granted {
            grant(&mut permissions, permission, principal.clone());
        }
    }
    for entry in &form.principals {
        for permission in &entry.permissions {
            grant(&mut permissions, permission, entry.principal.clone());
        }
    }

    permissions
}

fn grant(permissions: &mut ServerPermissions, permission: &str, principal: String) {
    let principals = permissions.entry(permission.to_string()).or_default();
    if !principals.contains(&principal) {
        principals.push(principal);
    }
}
