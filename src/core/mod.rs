//! # Core Application Logic
//!
//! Everything that is not a surface. The REPL and the web UI both sit on top
//! of the same [`agent::Agent`].
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │                         │
//!                    │  • tools    (catalog)   │
//!                    │  • symbolic (algebra)   │
//!                    │  • agent    (tool loop) │
//!                    │  • session  (chat log)  │
//!                    │  • config               │
//!                    └───────────┬─────────────┘
//!                                │
//!                  ┌─────────────┴─────────────┐
//!                  ▼                           ▼
//!           ┌────────────┐              ┌────────────┐
//!           │    REPL    │              │   Web UI   │
//!           │  (stdin)   │              │   (axum)   │
//!           └────────────┘              └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`tools`]: the operation catalog and every math operation
//! - [`symbolic`]: polynomial parsing, expansion, factoring and solving
//! - [`agent`]: the tool-calling loop that answers one question
//! - [`session`]: in-memory chat transcripts for the web UI
//! - [`config`]: layered configuration

pub mod agent;
pub mod config;
pub mod session;
pub mod symbolic;
pub mod tools;
