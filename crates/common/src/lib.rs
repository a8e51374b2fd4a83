/**
 * Workflow actions the console can commit,
 *  and the dispatcher seam they leave through.
 */
pub mod actions;
/**
 * Named routes and the link builder trait
 *  used to turn them into hrefs.
 */
pub mod links;
/**
 * ACL evaluation over the server's permissions
 *  list, and the permissions form transform.
 */
pub mod permissions;
/**
 * Principal parsing: system principals,
 *  bucket groups and opaque user ids.
 */
pub mod principal;
/**
 * Server-reported session state and the
 *  auth context derived from it.
 */
pub mod session;
/**
 * The review/signoff workflow: group membership,
 *  step derivation, guards, confirmations and
 *  the toolbar view model.
 */
pub mod signoff;
/**
 * Helper for setting build version information
 *  at compile time.
 */
pub mod version;

pub mod prelude {
    pub use crate::actions::{ActionDispatcher, ActionRequest, DispatchError, SignoffAction};
    pub use crate::links::{LinkBuilder, RouteLink, RouteName};
    pub use crate::permissions::{can, PermissionEntry, PermissionsList};
    pub use crate::principal::Principal;
    pub use crate::session::{AuthContext, BucketState, CollectionState, SessionState};
    pub use crate::signoff::{
        CollectionRef, CollectionsInfo, ConfirmationController, ConfirmationKind, SignoffSource,
        SignoffState, SignoffStatus, ToolbarView, WorkflowStep,
    };
    pub use crate::version::build_info;
}
