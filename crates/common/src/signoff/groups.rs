//! Editors and reviewers group membership.
//!
//! The signer names the groups allowed to request and approve reviews.
//! Names may be templated per collection (`{collection_id}_editors`), and a
//! source collection may override the server default with its own name.
//! Membership is a plain containment check of the group's principal URI in
//! the session's principal set.

use crate::principal::Principal;
use crate::session::{AuthContext, SessionState, SignerCapability};

use super::SignoffSource;

/// The only placeholder group templates understand.
pub const COLLECTION_ID_PLACEHOLDER: &str = "{collection_id}";

/// Which of the signer's groups to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    Editors,
    Reviewers,
}

impl GroupKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupKey::Editors => "editors_group",
            GroupKey::Reviewers => "reviewers_group",
        }
    }

    fn from_source<'a>(&self, source: &'a SignoffSource) -> Option<&'a str> {
        match self {
            GroupKey::Editors => source.editors_group.as_deref(),
            GroupKey::Reviewers => source.reviewers_group.as_deref(),
        }
    }

    fn from_signer<'a>(&self, signer: &'a SignerCapability) -> Option<&'a str> {
        match self {
            GroupKey::Editors => signer.editors_group.as_deref(),
            GroupKey::Reviewers => signer.reviewers_group.as_deref(),
        }
    }
}

/// Substitute `{collection_id}` in a group name template.
///
/// A template without the placeholder is a literal group name. Any other
/// `{...}` text is left untouched, so it can only match a group literally
/// named that way.
pub fn resolve_template(pattern: &str, collection_id: &str) -> String {
    pattern.replace(COLLECTION_ID_PLACEHOLDER, collection_id)
}

/// Resolves signer group membership for the current user.
#[derive(Debug, Clone, Copy)]
pub struct GroupMembershipResolver<'a> {
    auth: AuthContext<'a>,
    signer: Option<&'a SignerCapability>,
}

impl<'a> GroupMembershipResolver<'a> {
    pub fn new(auth: AuthContext<'a>, signer: Option<&'a SignerCapability>) -> Self {
        Self { auth, signer }
    }

    pub fn from_session(session: &'a SessionState) -> Self {
        Self::new(session.auth(), session.signer())
    }

    /// The concrete group id `key` resolves to for `source`, if any.
    pub fn group_name(&self, key: GroupKey, source: &SignoffSource) -> Option<String> {
        let template = key
            .from_source(source)
            .or_else(|| self.signer.and_then(|signer| key.from_signer(signer)))?;
        Some(resolve_template(template, &source.cid))
    }

    pub fn is_member(&self, key: GroupKey, source: Option<&SignoffSource>) -> bool {
        let Some(source) = source else {
            return false;
        };
        if self.auth.principals.is_none() {
            return false;
        }
        let Some(group_id) = self.group_name(key, source) else {
            tracing::debug!(group = key.as_str(), "no signer group configured");
            return false;
        };
        self.auth
            .has_principal(&Principal::group(source.bid.as_str(), group_id))
    }

    pub fn is_editor(&self, source: Option<&SignoffSource>) -> bool {
        self.is_member(GroupKey::Editors, source)
    }

    pub fn is_reviewer(&self, source: Option<&SignoffSource>) -> bool {
        self.is_member(GroupKey::Reviewers, source)
    }

    /// Whether the current user is the one who requested the pending review.
    ///
    /// Both ids must be known; an anonymous session never matches.
    pub fn has_requested_review(&self, source: Option<&SignoffSource>) -> bool {
        match (self.auth.user_id, source.and_then(|s| s.last_review_request_by.as_deref())) {
            (Some(user_id), Some(requested_by)) => user_id == requested_by,
            _ => false,
        }
    }
}
