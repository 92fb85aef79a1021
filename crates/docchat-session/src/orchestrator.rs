//! Session orchestrator: sequences upload, ingestion, and grounded chat.
//!
//! Holds the session, the document store, and the two collaborator handles,
//! which are injected once at construction rather than rebuilt per call.
//! Operations take `&mut self`: at most one operation is in flight per
//! session, and concurrent interaction contexts own independent
//! orchestrators.

use tracing::{info, warn};

use docchat_core::types::{ChatTurn, DocumentRef, IndexHandle};
use docchat_rag::ingestion::IngestionService;
use docchat_rag::retrieval::RetrievalService;
use docchat_store::DocumentStore;

use crate::error::SessionError;
use crate::phase::Phase;
use crate::session::Session;

/// Drives one session through stage -> ingest -> ask -> reset.
pub struct SessionOrchestrator<I: IngestionService, R: RetrievalService> {
    session: Session,
    store: DocumentStore,
    ingestion: I,
    retrieval: R,
}

impl<I: IngestionService, R: RetrievalService> SessionOrchestrator<I, R> {
    /// Create an orchestrator with an empty `Idle` session.
    pub fn new(store: DocumentStore, ingestion: I, retrieval: R) -> Self {
        Self {
            session: Session::new(),
            store,
            ingestion,
            retrieval,
        }
    }

    /// Read-only view of the session for the view layer.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Persist uploaded document bytes and stage them for ingestion.
    ///
    /// Replaces any previously staged document (at most one active document
    /// per session), invalidates a previous index handle, and clears the
    /// history, which referred to the previous document. On any failure the
    /// session is left untouched.
    pub fn stage_document(
        &mut self,
        bytes: &[u8],
        filename: &str,
    ) -> Result<DocumentRef, SessionError> {
        if bytes.is_empty() {
            return Err(SessionError::InvalidInput(
                "document bytes are empty".to_string(),
            ));
        }

        let document = self
            .store
            .stage(bytes, filename)
            .map_err(|e| SessionError::Storage(e.to_string()))?;

        if let Some(previous) = self.session.document.take() {
            if let Err(e) = self.store.remove(&previous) {
                warn!(error = %e, "Failed to remove previously staged document");
            }
        }

        self.session.document = Some(document.clone());
        self.session.index_handle = None;
        self.session.history.clear();
        self.session
            .transition("stage_document", Phase::DocumentStaged)?;

        info!(
            document = %document.id,
            filename,
            size = document.size,
            "Document staged"
        );
        Ok(document)
    }

    /// Run ingestion for the staged document and store the index handle.
    ///
    /// Allowed from `DocumentStaged`, from `Ready`/`Chatting` (re-ingestion,
    /// replacing the handle), and from `Failed` (retry). From `Idle` there is
    /// nothing to ingest. No result caching: calling again with the same
    /// document re-runs ingestion. A failed re-ingestion also discards the
    /// history: the index those turns were grounded in no longer exists.
    pub async fn build_index(
        &mut self,
        document: &DocumentRef,
    ) -> Result<IndexHandle, SessionError> {
        let staged = match &self.session.document {
            Some(staged) if staged.id == document.id => staged.clone(),
            Some(_) => {
                return Err(SessionError::InvalidInput(
                    "document reference does not match the staged document".to_string(),
                ))
            }
            None => {
                return Err(SessionError::PreconditionFailed {
                    operation: "build_index",
                    phase: self.session.phase,
                })
            }
        };

        self.session.transition("build_index", Phase::Embedding)?;
        // A stale handle never outlives the index it named.
        self.session.index_handle = None;

        match self.ingestion.create_index(&staged).await {
            Ok(handle) => {
                self.session.index_handle = Some(handle.clone());
                self.session.transition("build_index", Phase::Ready)?;
                info!(document = %staged.id, handle = %handle, "Index built");
                Ok(handle)
            }
            Err(e) => {
                self.session.transition("build_index", Phase::Failed)?;
                // The conversation was grounded in the replaced index.
                self.session.history.clear();
                warn!(document = %staged.id, error = %e, "Ingestion failed");
                Err(e.into())
            }
        }
    }

    /// Answer a question grounded in the indexed document.
    ///
    /// The user turn is appended before the retrieval call, so the
    /// conversation record reflects what was asked even if the call fails;
    /// on failure no assistant turn is appended and the phase is exactly
    /// what it was before the call.
    pub async fn ask(&mut self, query: &str) -> Result<String, SessionError> {
        let handle = match (&self.session.index_handle, self.session.phase) {
            (Some(handle), Phase::Ready | Phase::Chatting) => handle.clone(),
            _ => {
                return Err(SessionError::PreconditionFailed {
                    operation: "ask",
                    phase: self.session.phase,
                })
            }
        };

        let query = query.trim();
        if query.is_empty() {
            return Err(SessionError::InvalidInput("query is empty".to_string()));
        }

        self.session.history.push(ChatTurn::user(query));

        match self
            .retrieval
            .answer(&handle, query, &self.session.history)
            .await
        {
            Ok(answer) => {
                self.session.history.push(ChatTurn::assistant(answer.clone()));
                self.session.transition("ask", Phase::Chatting)?;
                Ok(answer)
            }
            Err(e) => {
                warn!(error = %e, "Retrieval failed; user turn kept, phase unchanged");
                Err(e.into())
            }
        }
    }

    /// Clear the session back to empty `Idle`. Never fails; removal of the
    /// staged file is best-effort.
    pub fn reset(&mut self) {
        if let Some(document) = self.session.document.take() {
            if let Err(e) = self.store.remove(&document) {
                warn!(error = %e, "Failed to remove staged document on reset");
            }
        }
        self.session = Session::new();
        info!("Session reset");
    }
}
