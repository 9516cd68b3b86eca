//! Create/update/delete pipeline and store reconciliation.
//!
//! Every mutation goes to the server first; the store is only touched
//! after an acknowledgment, so a failed mutation leaves the cached view
//! exactly as it was. The reconciliation differs deliberately by
//! operation:
//!
//! - **create** never inserts locally. The new record's position in the
//!   sorted, filtered, paginated view is the server's decision, so the
//!   only correct placement is a full refetch. Resist the urge to unify
//!   this with update's patch — a local insert would misplace records.
//! - **update** patches the one record in place for immediate feedback,
//!   then refetches to restore canonical ordering and pagination.
//! - **delete** removes the record directly; a refetch would only
//!   renumber pages under the user's feet.

use std::sync::Arc;

use taskhub_api::task::{Task, TaskFields, TaskId};
use taskhub_api::user::{UserChange, UserId};

use crate::attachments::{AttachmentError, DocumentUpload, stage_documents};
use crate::gateway::{ApiError, Gateway};
use crate::query::QueryController;
use crate::store::DomainStore;

/// Errors surfaced by mutation operations.
#[derive(Debug, thiserror::Error)]
pub enum MutationError {
    /// The title field was empty. Checked locally; never reaches the wire.
    #[error("title is required")]
    TitleRequired,

    /// An attachment was refused admission. Checked locally; never
    /// reaches the wire.
    #[error(transparent)]
    Attachment(#[from] AttachmentError),

    /// The server (or the transport) rejected the mutation.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Executes mutations against the gateway and reconciles the store.
pub struct MutationPipeline<G: Gateway> {
    gateway: Arc<G>,
    store: Arc<DomainStore>,
    query: Arc<QueryController<G>>,
}

impl<G: Gateway> MutationPipeline<G> {
    /// Creates a pipeline over the shared gateway, store, and controller.
    #[must_use]
    pub fn new(
        gateway: Arc<G>,
        store: Arc<DomainStore>,
        query: Arc<QueryController<G>>,
    ) -> Self {
        Self {
            gateway,
            store,
            query,
        }
    }

    // --- tasks -----------------------------------------------------------

    /// Creates a task with up to three PDF attachments.
    ///
    /// Admission runs first and entirely client-side: an over-limit or
    /// non-PDF document set fails here without any network traffic. On
    /// success the current query is refetched so the server decides where
    /// (and whether) the new record appears in the view.
    ///
    /// # Errors
    ///
    /// Returns [`MutationError::TitleRequired`] or
    /// [`MutationError::Attachment`] before any call, or the server's
    /// error afterwards — in every failure case the store is untouched.
    pub async fn create_task(
        &self,
        fields: TaskFields,
        documents: Vec<DocumentUpload>,
    ) -> Result<Task, MutationError> {
        if fields.title.is_empty() {
            return Err(MutationError::TitleRequired);
        }
        let documents = stage_documents(&[], documents)?;

        let created = self.gateway.create_task(&fields, &documents).await?;
        tracing::info!(task = %created.id, "task created");

        self.query.refresh().await;
        Ok(created)
    }

    /// Updates a task's metadata fields (attachments are immutable).
    ///
    /// Pessimistic: nothing is applied locally until the server
    /// acknowledges. The in-place patch then gives immediate feedback
    /// while the follow-up refetch restores canonical ordering — and
    /// drops the record from view if it no longer matches the active
    /// filter.
    ///
    /// # Errors
    ///
    /// Returns the server's error; no local patch is applied on failure.
    pub async fn update_task(
        &self,
        id: &TaskId,
        fields: TaskFields,
    ) -> Result<(), MutationError> {
        if fields.title.is_empty() {
            return Err(MutationError::TitleRequired);
        }

        self.gateway.update_task(id, &fields).await?;
        self.store.patch_task(id, &fields);
        tracing::info!(task = %id, "task updated");

        self.query.refresh().await;
        Ok(())
    }

    /// Deletes a task and, server-side, its attached documents.
    ///
    /// Destructive and irreversible — the caller is responsible for
    /// having asked the user first.
    ///
    /// # Errors
    ///
    /// Returns the server's error; the record stays in the store.
    pub async fn delete_task(&self, id: &TaskId) -> Result<(), MutationError> {
        self.gateway.delete_task(id).await?;
        self.store.remove_task(id);
        tracing::info!(task = %id, "task deleted");
        Ok(())
    }

    /// Downloads one attached document's bytes.
    ///
    /// # Errors
    ///
    /// Returns the server's error (404 when the document vanished).
    pub async fn download_document(
        &self,
        id: &TaskId,
        stored_name: &str,
    ) -> Result<Vec<u8>, MutationError> {
        Ok(self.gateway.download_document(id, stored_name).await?)
    }

    // --- users (admin) ---------------------------------------------------

    /// Fetches the user directory into the store (admin only).
    ///
    /// Uses the same sequence gating as task fetches, so a list that
    /// completes after a logout is discarded.
    ///
    /// # Errors
    ///
    /// Returns the server's error (403 for non-admin callers); the
    /// failure also clears the cached user list.
    pub async fn fetch_users(&self) -> Result<(), MutationError> {
        let seq = self.store.issue_user_fetch();
        self.store.mark_users_loading();

        match self.gateway.list_users().await {
            Ok(users) => {
                if !self.store.replace_users(seq, users) {
                    tracing::debug!(?seq, "discarded stale user fetch result");
                }
                Ok(())
            }
            Err(e) => {
                if !self.store.fail_users(seq, e.message.clone()) {
                    tracing::debug!(?seq, "discarded stale user fetch failure");
                }
                Err(e.into())
            }
        }
    }

    /// Applies a single-field change to a user account (admin only).
    ///
    /// [`UserChange`] carries either a role or a password, never both —
    /// the two are distinct operations on the wire. Role changes are
    /// patched into the store; password changes leave the read model
    /// alone (passwords are write-only).
    ///
    /// # Errors
    ///
    /// Returns the server's error; the store is untouched on failure.
    pub async fn update_user(
        &self,
        id: &UserId,
        change: UserChange,
    ) -> Result<(), MutationError> {
        self.gateway.update_user(id, &change).await?;
        if let UserChange::Role { role } = change {
            self.store.patch_user_role(id, role);
        }
        tracing::info!(user = %id, "user updated");
        Ok(())
    }

    /// Deletes a user account (admin only). Destructive; the caller
    /// confirms with the operator first.
    ///
    /// # Errors
    ///
    /// Returns the server's error; the record stays in the store.
    pub async fn delete_user(&self, id: &UserId) -> Result<(), MutationError> {
        self.gateway.delete_user(id).await?;
        self.store.remove_user(id);
        tracing::info!(user = %id, "user deleted");
        Ok(())
    }
}
