//! Error recorder
//!
//! Turns drafts into identified error records and writes them in bounded
//! batches. Drafts missing an execution, validation or message are never
//! persisted; they are logged and still handed back to the caller.

use crate::storage::{Storage, StorageResult};
use std::sync::Arc;
use tracing::{debug, error};
use validation_types::{ErrorDraft, ResourceKind, ResourceUri, ValidationError, ValidationErrorId};

/// Records validation errors into storage
#[derive(Clone)]
pub struct ErrorRecorder {
    storage: Arc<dyn Storage>,
    base_uri: String,
    batch_size: usize,
}

impl ErrorRecorder {
    pub fn new(storage: Arc<dyn Storage>, base_uri: impl Into<String>, batch_size: usize) -> Self {
        Self {
            storage,
            base_uri: base_uri.into(),
            batch_size: batch_size.max(1),
        }
    }

    fn identify(&self, draft: ErrorDraft) -> ValidationError {
        let id = ValidationErrorId::generate();
        let uri = ResourceUri::for_resource(&self.base_uri, ResourceKind::Error, &id);
        ValidationError::from_draft(id, uri, draft)
    }

    /// Record a single error
    ///
    /// Returns `None` when the draft is incomplete; nothing is written then.
    pub async fn insert_error(&self, draft: ErrorDraft) -> StorageResult<Option<ValidationError>> {
        if !draft.is_complete() {
            error!(?draft, "Refusing to record incomplete validation error");
            return Ok(None);
        }

        let record = self.identify(draft);
        self.storage
            .insert_validation_errors(std::slice::from_ref(&record))
            .await?;
        Ok(Some(record))
    }

    /// Record many errors, one storage write per batch
    ///
    /// Every draft yields a returned record in input order, including
    /// incomplete drafts that were skipped at write time.
    pub async fn insert_errors(&self, drafts: Vec<ErrorDraft>) -> StorageResult<Vec<ValidationError>> {
        let records: Vec<ValidationError> =
            drafts.into_iter().map(|draft| self.identify(draft)).collect();

        for (index, chunk) in records.chunks(self.batch_size).enumerate() {
            let batch: Vec<ValidationError> = chunk
                .iter()
                .filter(|record| {
                    let complete = record.is_complete();
                    if !complete {
                        error!(
                            error_id = %record.id,
                            execution = ?record.execution,
                            validation = ?record.validation,
                            message = ?record.message,
                            "Skipping incomplete validation error"
                        );
                    }
                    complete
                })
                .cloned()
                .collect();

            debug!(batch = index, size = batch.len(), "Writing validation errors");
            self.storage.insert_validation_errors(&batch).await?;
        }

        Ok(records)
    }
}

impl std::fmt::Debug for ErrorRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorRecorder")
            .field("base_uri", &self.base_uri)
            .field("batch_size", &self.batch_size)
            .finish()
    }
}
