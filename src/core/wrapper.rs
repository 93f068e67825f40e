//! Purpose: Run one native call inside a capture region and fold everything into a `CallResult`.
//! Exports: `CallResult`, `call`.
//! Role: Uniform protocol applied to every native entry point (capture, call, classify, assemble).
//! Invariants: Native faults never escape; they become the last entry of `errors`.
//! Invariants: Only capture failures surface as `Err`.
//! Invariants: Logging happens strictly before entering and after leaving the region.
use serde::Serialize;

use crate::core::capture::capture;
use crate::core::diagnostics::{ClassifiedDiagnostics, classify};
use crate::core::error::Error;
use crate::core::fault::Fault;

/// Outcome of one wrapped native call.
///
/// `value` is `None` when the call faulted. `info` is everything written to
/// stdout during the call.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct CallResult<T> {
    pub value: Option<T>,
    pub info: String,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl<T> CallResult<T> {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> CallResult<U> {
        CallResult {
            value: self.value.map(f),
            info: self.info,
            warnings: self.warnings,
            errors: self.errors,
        }
    }

    pub fn into_parts(self) -> (Option<T>, String, Vec<String>, Vec<String>) {
        (self.value, self.info, self.warnings, self.errors)
    }
}

/// Runs one native call through the capture, classify and assemble protocol.
///
/// A panic in `f` is not a fault: streams are restored, captured output is
/// dropped and the panic propagates.
pub fn call<T>(label: &str, f: impl FnOnce() -> Result<T, Fault>) -> Result<CallResult<T>, Error> {
    tracing::debug!(call = label, "entering native call");
    let (outcome, captured) = capture(f)?;

    let ClassifiedDiagnostics {
        warnings,
        mut errors,
    } = classify(&captured.stderr_text());

    let value = match outcome {
        Ok(value) => Some(value),
        Err(fault) => {
            let message = fault.message();
            let message = message.trim();
            tracing::warn!(call = label, fault = message, "native call faulted");
            if !message.is_empty() {
                errors.push(message.to_string());
            }
            None
        }
    };

    tracing::debug!(
        call = label,
        warnings = warnings.len(),
        errors = errors.len(),
        stdout_bytes = captured.stdout.len(),
        "native call finished"
    );
    Ok(CallResult {
        value,
        info: captured.stdout_text(),
        warnings,
        errors,
    })
}
