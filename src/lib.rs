//! Purpose: Library crate behind the `ocarina-bridge` CLI and any embedding of the native engine.
//! Exports: `api` (stable surface), `core` (capture, classify, extract, wrap), `engine`, `probe`.
//! Role: Makes every native engine call return captured output and classified diagnostics.
//! Invariants: Native faults are data (`CallResult::errors`), never panics or `Err`.
//! Invariants: Only one capture region is open per process at a time.
pub mod api;
pub mod core;
pub mod engine;
pub mod probe;
