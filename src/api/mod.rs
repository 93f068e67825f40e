//! Purpose: Define the stable public Rust API boundary for ocarina-bridge.
//! Exports: Core types and operations needed by the CLI and embedders.
//! Role: Public, additive-only surface over `core`, `engine`, and `probe`.
//! Invariants: Callers never need to reach into `core::*` paths directly.

#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::capture::{CaptureRegion, Captured, capture};
pub use crate::core::diagnostics::{ClassifiedDiagnostics, classify};
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::fault::{Fault, extract_message};
pub use crate::core::wrapper::{CallResult, call};
pub use crate::engine::{Backend, Engine, NameLookup, NodeId, Query, Session};
pub use crate::probe::{ProbeEngine, ProbeScript, WriteMode, render_fault};
