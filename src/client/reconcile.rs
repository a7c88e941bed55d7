//! # Pull Reconciliation
//!
//! Merge rules applied when a freshly pulled document meets local state.
//! The protocol is merge-by-replacement: the remote document replaces the
//! local one, except that unpushed local edits must not be clobbered and
//! device-only fields never cross the sync boundary in either direction.
//!
//! - No pending intent: adopt the remote document wholesale, keeping only
//!   this device's local-only fields on top
//! - Pending intent: keep the local body (it is about to be re-pushed)
//!   and adopt the remote `_version` as the new base, so the follow-up
//!   push lands as last-local-writer-wins on top of last-known-remote

use crate::shared::Document;

/// Merge a pulled document into local state.
///
/// `pending` says whether an unacknowledged local mutation exists. The
/// returned document is what local storage should hold afterwards.
pub fn reconcile(local: &Document, mut remote: Document, pending: bool) -> Document {
    // Never accept another device's local-only fields
    remote.strip_device_fields();

    if pending {
        // Local unpushed edits win; the remote version becomes the base
        // the re-push builds on.
        let mut merged = local.clone();
        merged.version = remote.version;
        merged
    } else {
        // Remote replaces local, with this device's fields layered back
        let device = local.device_fields();
        remote.apply_device_fields(device);
        remote
    }
}
