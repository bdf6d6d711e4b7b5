//! Suggestion engine for a keyboard-driven launcher.
//!
//! Each keystroke becomes a search session. The [`Orchestrator`] answers it in
//! two stages: a synchronous fuzzy scan of the static catalog, then a
//! concurrent fan-out to every [`Provider`] (or, inside a drilldown, to the
//! provider that owns the current context). Provider batches are scored and
//! merged into one ranked [`ResultStore`] as they arrive. Starting a session
//! supersedes the previous one; batches from superseded sessions never reach
//! the store.
//!
//! The host drives the orchestrator from one thread, reads
//! [`StoreSnapshot`]s, and redraws whenever an [`EngineEvent`] arrives.

mod candidate;
mod catalog;
mod config;
mod error;
mod navigation;
mod orchestrator;
mod provider;
mod session;
mod store;

pub use candidate::{ArgsHint, Candidate, Category, IconRef, MatchMode, Payload, ProviderId, ScoredCandidate};
pub use config::EngineConfig;
pub use error::{Error, ProviderError, Result};
pub use kestrel_worker::Generation;
pub use navigation::{NavigationFrame, NavigationStack};
pub use orchestrator::{CancelOutcome, CommitOutcome, Launch, Orchestrator};
pub use provider::{Provider, ProviderRegistry, SuggestRequest, SuggestionSink};
pub use store::{EngineEvent, ResultStore, StoreSnapshot};
