//! Shared fixtures for the HTML console tests
#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;

use ::common::actions::ActionRequest;
use ::common::permissions::PermissionEntry;
use ::common::session::{
    Capabilities, HistoryCapability, ServerInfo, SessionState, SignerCapability, User,
};
use ::common::signoff::{
    ChangesList, CollectionRef, CollectionsInfo, SignoffSource, SignoffState, SignoffStatus,
};
use service::snapshots::CollectionView;
use service::{action_queue, ActionQueueConfig, ActionReceiver, ServiceConfig, ServiceState, SnapshotStore};

pub const PAGE: &str = "/buckets/stage/collections/certs";

pub fn session(user_id: &str, group: &str) -> SessionState {
    SessionState {
        permissions: Some(vec![PermissionEntry::Bucket {
            bucket_id: "stage".into(),
            permissions: BTreeSet::from(["write".to_string()]),
        }]),
        server_info: ServerInfo {
            user: Some(User {
                id: Some(user_id.into()),
                principals: Some(vec![
                    user_id.parse().unwrap(),
                    format!("/buckets/stage/groups/{}", group).parse().unwrap(),
                ]),
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
    session("fxa:editor", "certs_editors")
}

pub fn reviewer() -> SessionState {
    session("fxa:reviewer", "certs_reviewers")
}

pub fn signoff(status: SignoffStatus) -> SignoffState {
    SignoffState::new(Some(CollectionsInfo {
        source: SignoffSource {
            bid: "stage".into(),
            cid: "certs".into(),
            status: Some(status),
            last_edit_by: Some("fxa:editor".into()),
            last_edit_date: Some("2024-03-01T10:00:00+00:00".into()),
            last_review_request_by: Some("fxa:editor".into()),
            ..Default::default()
        },
        destination: CollectionRef::new("prod", "certs"),
        preview: Some(CollectionRef::new("preview", "certs")),
        changes_on_source: Some(ChangesList {
            since: 1_700_000_000_000,
            updated: 2,
            deleted: 1,
        }),
        changes_on_preview: None,
    }))
}

pub struct Harness {
    pub store: Arc<SnapshotStore>,
    pub receiver: Option<ActionReceiver>,
    pub sender: flume::Sender<ActionRequest>,
    pub config: ServiceConfig,
}

impl Harness {
    pub fn new(session: SessionState, status: SignoffStatus) -> Self {
        let store = Arc::new(SnapshotStore::new(session));
        let page = CollectionRef::new("stage", "certs");
        store.insert_view(CollectionView::new(&page, signoff(status)));
        store.insert_view(CollectionView::new(
            &CollectionRef::new("stage", "plain"),
            SignoffState::default(),
        ));
        let (sender, receiver) = action_queue(ActionQueueConfig::default());
        Self {
            store,
            receiver: Some(receiver),
            sender,
            config: ServiceConfig::default(),
        }
    }

    pub fn read_only(mut self) -> Self {
        self.config.read_only = true;
        self
    }

    pub fn router(&self) -> Router {
        let state = ServiceState::new(self.store.clone(), self.sender.clone());
        service::http::router(self.config.clone(), state)
    }

    /// Next queued action, if any.
    pub fn next_action(&self) -> Option<ActionRequest> {
        self.receiver.as_ref().and_then(|r| r.try_recv())
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::ACCEPT, "text/html")
        .body(Body::empty())
        .unwrap()
}

pub fn post(uri: &str, form: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .unwrap()
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
