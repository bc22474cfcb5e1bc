//! AI Action Domain
//!
//! Every AI-backed feature of the CRM follows the same contract: the client
//! posts `{ action, ...fields }` to a named function, the server builds a
//! system prompt and a user prompt, asks the completion gateway once, pulls
//! a JSON object out of the reply and wraps it in an envelope.
//!
//! This crate owns that contract:
//!
//! - **Catalog**: the routing table from function and action names to prompts
//! - **Prompt**: assembly of the system/user prompt pair
//! - **Extract**: best-effort JSON extraction from free text
//! - **Envelope**: the success/failure response shape
//! - **Financial**: ratio pre-computation for statement analysis
//! - **Dispatcher**: the request pipeline tying the above to a `CompletionPort`
//!
//! ```text
//! request -> catalog lookup -> validate -> precompute -> prompt
//!         -> CompletionPort::complete -> extract -> ActionOutcome
//! ```

pub mod catalog;
pub mod request;
pub mod prompt;
pub mod extract;
pub mod envelope;
pub mod financial;
pub mod ports;
pub mod dispatcher;
pub mod error;

pub use catalog::{ActionCatalog, ActionSpec, FunctionSpec, Precompute};
pub use request::{ActionRequest, ActionContext};
pub use prompt::{PromptPair, build_prompt};
pub use extract::{Extracted, extract_json};
pub use envelope::Envelope;
pub use financial::{FinancialStatement, RatioSet, compute_ratios};
pub use ports::{CompletionPort, CompletionRequest, CompletionResponse, TokenUsage};
pub use dispatcher::{ActionDispatcher, ActionOutcome};
pub use error::ActionError;
