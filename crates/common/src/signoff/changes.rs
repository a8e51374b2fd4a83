//! Summary of the records changed since the last review cycle.

use serde::{Deserialize, Serialize};

use crate::links::RouteLink;

use super::CollectionRef;

/// History query flag asking the history view to hide the signer's own
/// service-account edits.
pub const EXCLUDE_SIGNER_QUERY: &str = "exclude_signer";

/// A diff summary computed by the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangesList {
    /// Timestamp of the reference version.
    pub since: u64,
    #[serde(default)]
    pub updated: u64,
    #[serde(default)]
    pub deleted: u64,
}

impl ChangesList {
    pub fn is_empty(&self) -> bool {
        self.updated == 0 && self.deleted == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSummary {
    pub updated: u64,
    pub deleted: u64,
    /// Filtered history of `collection` since the reference version. Only
    /// present when the server has the history capability.
    pub history: Option<RouteLink>,
}

impl ChangeSummary {
    /// `None` when there is nothing to show.
    pub fn new(collection: &CollectionRef, changes: &ChangesList, has_history: bool) -> Option<Self> {
        if changes.is_empty() {
            return None;
        }
        let history = has_history.then(|| {
            RouteLink::history(collection)
                .with_query("since", changes.since.to_string())
                .with_query(EXCLUDE_SIGNER_QUERY, "true")
        });
        Some(Self {
            updated: changes.updated,
            deleted: changes.deleted,
            history,
        })
    }

    pub fn updated_label(&self) -> String {
        format!("+{}", self.updated)
    }

    pub fn deleted_label(&self) -> String {
        format!("-{}", self.deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::links::RouteName;

    #[test]
    fn test_nothing_changed_renders_nothing() {
        let changes = ChangesList {
            since: 42,
            updated: 0,
            deleted: 0,
        };
        assert!(ChangeSummary::new(&CollectionRef::new("b", "c"), &changes, true).is_none());
    }

    #[test]
    fn test_summary_with_history_link() {
        let changes = ChangesList {
            since: 1500,
            updated: 3,
            deleted: 1,
        };
        let summary = ChangeSummary::new(&CollectionRef::new("stage", "certs"), &changes, true).unwrap();
        assert_eq!(summary.updated_label(), "+3");
        assert_eq!(summary.deleted_label(), "-1");

        let link = summary.history.unwrap();
        assert_eq!(link.name, RouteName::CollectionHistory);
        assert_eq!(link.params, CollectionRef::new("stage", "certs"));
        assert_eq!(link.query_value("since"), Some("1500"));
        assert_eq!(link.query_value(EXCLUDE_SIGNER_QUERY), Some("true"));
    }

    #[test]
    fn test_summary_without_history_capability() {
        let changes = ChangesList {
            since: 1,
            updated: 0,
            deleted: 2,
        };
        let summary = ChangeSummary::new(&CollectionRef::new("b", "c"), &changes, false).unwrap();
        assert!(summary.history.is_none());
        assert_eq!(summary.updated_label(), "+0");
    }
}
