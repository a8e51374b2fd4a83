//! In-memory snapshots of what the server last reported.
//!
//! The console never talks to a remote server itself. It serves whatever
//! session and collection snapshots it was loaded with, and the effect
//! worker replaces the signoff metadata of a pipeline when an action
//! lands. Every page render re-derives its view from these snapshots.

use std::collections::BTreeMap;
use std::path::Path;

use parking_lot::RwLock;
use serde::Deserialize;

use common::session::{BucketState, CollectionState, SessionState};
use common::signoff::{
    CollectionRef, CollectionsInfo, SignoffSource, SignoffState, ToolbarView, Transition,
};

/// One collection page as the console renders it.
#[derive(Debug, Clone, Default)]
pub struct CollectionView {
    pub bucket: BucketState,
    pub collection: CollectionState,
    pub signoff: SignoffState,
}

impl CollectionView {
    pub fn new(page: &CollectionRef, signoff: SignoffState) -> Self {
        Self {
            bucket: BucketState::new(page.bid.as_str()),
            collection: CollectionState::new(page.cid.as_str()),
            signoff,
        }
    }

    pub fn page(&self) -> CollectionRef {
        CollectionRef::new(self.bucket.data.id.as_str(), self.collection.data.id.as_str())
    }

    /// Whether this page shows the pipeline whose source is `source`.
    pub fn follows(&self, source: &CollectionRef) -> bool {
        self.signoff
            .source()
            .is_some_and(|s| s.bid == source.bid && s.cid == source.cid)
    }
}

/// On-disk layout of a snapshot file.
#[derive(Debug, Default, Deserialize)]
pub struct SnapshotFile {
    #[serde(default)]
    pub session: SessionState,
    #[serde(default)]
    pub collections: Vec<CollectionSnapshot>,
}

#[derive(Debug, Deserialize)]
pub struct CollectionSnapshot {
    pub bucket: String,
    pub collection: String,
    #[serde(default)]
    pub signoff: SignoffState,
}

#[derive(Debug, Default)]
pub struct SnapshotStore {
    session: RwLock<SessionState>,
    views: RwLock<BTreeMap<CollectionRef, CollectionView>>,
}

impl SnapshotStore {
    pub fn new(session: SessionState) -> Self {
        Self {
            session: RwLock::new(session),
            views: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn from_file(file: SnapshotFile) -> Self {
        let store = Self::new(file.session);
        for snapshot in file.collections {
            let page = CollectionRef::new(snapshot.bucket, snapshot.collection);
            store.insert_view(CollectionView::new(&page, snapshot.signoff));
        }
        store
    }

    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let raw = std::fs::read_to_string(path)?;
        let file: SnapshotFile = serde_json::from_str(&raw)?;
        tracing::info!(
            path = %path.display(),
            collections = file.collections.len(),
            "loaded snapshot file"
        );
        Ok(Self::from_file(file))
    }

    pub fn session(&self) -> SessionState {
        self.session.read().clone()
    }

    /// Swap in a new session snapshot, e.g. after a login or a permissions refresh.
    pub fn replace_session(&self, session: SessionState) {
        *self.session.write() = session;
    }

    pub fn insert_view(&self, view: CollectionView) {
        self.views.write().insert(view.page(), view);
    }

    pub fn remove_view(&self, page: &CollectionRef) -> Option<CollectionView> {
        self.views.write().remove(page)
    }

    pub fn view(&self, page: &CollectionRef) -> Option<CollectionView> {
        self.views.read().get(page).cloned()
    }

    pub fn pages(&self) -> Vec<CollectionRef> {
        self.views.read().keys().cloned().collect()
    }

    /// Build the toolbar for `page` against the current session.
    ///
    /// `Ok(None)` means the page exists but shows no toolbar.
    pub fn toolbar(&self, page: &CollectionRef) -> Result<Option<ToolbarView>, SnapshotError> {
        let session = self.session.read();
        let views = self.views.read();
        let view = views
            .get(page)
            .ok_or_else(|| SnapshotError::UnknownCollection(page.clone()))?;
        Ok(ToolbarView::build(
            &session,
            &view.bucket,
            &view.collection,
            &view.signoff,
        ))
    }

    /// Run `f` against the session and a mutable view of `page`.
    pub fn with_view_mut<R>(
        &self,
        page: &CollectionRef,
        f: impl FnOnce(&SessionState, &mut CollectionView) -> R,
    ) -> Result<R, SnapshotError> {
        let session = self.session.read();
        let mut views = self.views.write();
        let view = views
            .get_mut(page)
            .ok_or_else(|| SnapshotError::UnknownCollection(page.clone()))?;
        Ok(f(&session, view))
    }

    /// Current signoff metadata of the pipeline whose source is `source`.
    pub fn source(&self, source: &CollectionRef) -> Option<SignoffSource> {
        self.views
            .read()
            .values()
            .find(|view| view.follows(source))
            .and_then(|view| view.signoff.source().cloned())
    }

    /// Replace the pipeline metadata on every page that shows `source`.
    ///
    /// Only pages waiting on `transition` have their in-flight action
    /// settled; a modal open on any other page is left alone. Returns the
    /// number of pages touched.
    pub fn complete_action(
        &self,
        source: &CollectionRef,
        transition: Transition,
        update: impl Fn(&mut CollectionsInfo),
    ) -> usize {
        let mut views = self.views.write();
        let mut touched = 0;
        for (page, view) in views.iter_mut().filter(|(_, view)| view.follows(source)) {
            if let Some(info) = view.signoff.collections_info.as_mut() {
                update(info);
            }
            if view.signoff.confirmation.complete(transition) {
                tracing::debug!(%page, %transition, "in-flight action settled");
            }
            touched += 1;
        }
        touched
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("unknown collection: {0}")]
    UnknownCollection(CollectionRef),
    #[error("failed to read snapshot file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid snapshot file: {0}")]
    Json(#[from] serde_json::Error),
}
