// Stream capture, diagnostic classification, fault extraction, and the call wrapper.
pub mod capture;
pub mod diagnostics;
pub mod error;
pub mod fault;
pub(crate) mod text;
pub mod wrapper;
