//! Shared fixtures for signoff workflow integration tests
#![allow(dead_code)]

use std::collections::BTreeSet;

use common::permissions::PermissionEntry;
use common::session::{
    BucketState, Capabilities, CollectionState, HistoryCapability, ServerInfo, SessionState,
    SignerCapability, User,
};
use common::signoff::{
    ChangesList, CollectionRef, CollectionsInfo, SignoffSource, SignoffState, SignoffStatus,
    ToolbarView,
};

pub const SOURCE_BUCKET: &str = "stage";
pub const COLLECTION: &str = "certs";

/// A session for `user_id` holding `write` on the source bucket and the given principals.
pub fn session(user_id: &str, principals: &[&str]) -> SessionState {
    SessionState {
        permissions: Some(vec![PermissionEntry::Bucket {
            bucket_id: SOURCE_BUCKET.into(),
            permissions: BTreeSet::from(["write".to_string()]),
        }]),
        server_info: ServerInfo {
            user: Some(User {
                id: Some(user_id.into()),
                principals: Some(principals.iter().map(|p| p.parse().unwrap()).collect()),
            }),
            capabilities: Capabilities {
                signer: Some(SignerCapability {
                    editors_group: Some("{collection_id}_editors".into()),
                    reviewers_group: Some("{collection_id}_reviewers".into()),
                }),
                history: Some(HistoryCapability::default()),
            },
        },
    }
}

pub fn editor() -> SessionState {
    session("fxa:editor", &["fxa:editor", "/buckets/stage/groups/certs_editors"])
}

pub fn reviewer() -> SessionState {
    session("fxa:reviewer", &["fxa:reviewer", "/buckets/stage/groups/certs_reviewers"])
}

/// Signoff state of a freshly edited source collection.
pub fn edited_signoff() -> SignoffState {
    SignoffState::new(Some(CollectionsInfo {
        source: SignoffSource {
            bid: SOURCE_BUCKET.into(),
            cid: COLLECTION.into(),
            status: Some(SignoffStatus::WorkInProgress),
            last_edit_by: Some("fxa:editor".into()),
            last_edit_date: Some("2024-03-01T10:00:00+00:00".into()),
            ..Default::default()
        },
        destination: CollectionRef::new("prod", COLLECTION),
        preview: Some(CollectionRef::new("preview", COLLECTION)),
        changes_on_source: Some(ChangesList {
            since: 1_700_000_000_000,
            updated: 4,
            deleted: 1,
        }),
        changes_on_preview: None,
    }))
}

/// Toolbar as rendered on the source collection page.
pub fn toolbar(session: &SessionState, signoff: &SignoffState) -> Option<ToolbarView> {
    ToolbarView::build(
        session,
        &BucketState::new(SOURCE_BUCKET),
        &CollectionState::new(COLLECTION),
        signoff,
    )
}
