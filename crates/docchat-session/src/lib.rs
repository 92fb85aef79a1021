//! Session orchestration for single-document retrieval-augmented chat.
//!
//! The [`SessionOrchestrator`] owns one [`Session`] and drives its lifecycle
//! through the phase state machine:
//!
//! ```text
//! Idle --stage_document--> DocumentStaged
//! DocumentStaged/Ready/Chatting/Failed --build_index--> Embedding
//! Embedding --success--> Ready / --failure--> Failed
//! Ready --ask(success)--> Chatting --ask--> Chatting
//! Ready/Chatting --stage_document--> DocumentStaged (index invalidated)
//! any --reset--> Idle
//! ```
//!
//! All mutation of the session funnels through the orchestrator's
//! operations; the view layer only reads state and forwards user actions.

pub mod error;
pub mod orchestrator;
pub mod phase;
pub mod session;

pub use error::SessionError;
pub use orchestrator::SessionOrchestrator;
pub use phase::Phase;
pub use session::Session;
