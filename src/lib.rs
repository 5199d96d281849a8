// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # atlas
//!
//! A personal desktop automation agent: free-form utterances are resolved to
//! a closed set of side-effecting actions, or forwarded verbatim to the host
//! shell.
//!
//! ## Architecture
//!
//! - **Note matcher** (`notes`): deterministic note-taking commands, resolved
//!   before anything else
//! - **Fast path** (`resolve`): regex extraction for intents whose free-text
//!   payloads an external classifier would mis-segment
//! - **Constrained classifier** (`classify`): an external model restricted to
//!   a closed output grammar
//! - **Dispatcher** (`exec`): maps every resolved intent to exactly one
//!   handler; unmatched text runs as a raw shell command, by design
//! - **Chat fallback** (`chat`): conversational replies behind a wake phrase
//!
//! ## Library usage
//!
//! ```no_run
//! use atlas::agent::Agent;
//! use atlas::config::AgentConfig;
//!
//! let config = AgentConfig::load(None).unwrap();
//! let agent = Agent::new(config).unwrap();
//! let reply = agent.handle("note buy milk");
//! println!("{}", reply.response);
//! ```

pub mod agent;
pub mod chat;
pub mod classify;
pub mod config;
pub mod error;
pub mod exec;
pub mod intent;
pub mod llm;
pub mod notes;
pub mod paths;
pub mod resolve;
