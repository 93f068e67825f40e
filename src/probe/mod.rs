//! Purpose: Provide an `Engine` whose output comes from real C code, for self-tests and diagnostics.
//! Exports: `ProbeEngine`, `ProbeScript`, `WriteMode`, `render_fault`.
//! Role: Stand-in native engine proving that C stdio and raw descriptor writes are captured.
//! Invariants: Every entry point emits the scripted text once, then faults if scripted to.
//! Invariants: All FFI interaction is confined to this module + `sys`.
use std::ffi::CString;

use crate::core::fault::Fault;
use crate::engine::{Backend, Engine, NameLookup, NodeId, Query};

pub mod sys;

const STDOUT_FD: i32 = 1;
const STDERR_FD: i32 = 2;
const PROBE_EXCEPTION: &str = "OCARINA_BRIDGE.PROBE_ERROR";

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum WriteMode {
    /// Buffered C `FILE` streams (`fputs` on `stdout`/`stderr`).
    #[default]
    Stdio,
    /// Unbuffered `write(2)` on fd 1 and fd 2.
    Raw,
}

/// What each probe call writes, and whether it then fails.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ProbeScript {
    pub stdout: String,
    pub stderr: String,
    pub mode: WriteMode,
    pub fault: Option<String>,
}

impl ProbeScript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stdout(mut self, text: impl Into<String>) -> Self {
        self.stdout = text.into();
        self
    }

    pub fn with_stderr(mut self, text: impl Into<String>) -> Self {
        self.stderr = text.into();
        self
    }

    pub fn with_mode(mut self, mode: WriteMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_fault(mut self, message: impl Into<String>) -> Self {
        self.fault = Some(message.into());
        self
    }
}

#[derive(Debug, Default)]
pub struct ProbeEngine {
    script: ProbeScript,
    calls: Vec<String>,
}

impl ProbeEngine {
    pub fn new(script: ProbeScript) -> Self {
        Self {
            script,
            calls: Vec::new(),
        }
    }

    pub fn set_script(&mut self, script: ProbeScript) {
        self.script = script;
    }

    /// Entry points invoked so far, with their arguments.
    pub fn calls(&self) -> &[String] {
        &self.calls
    }

    fn emit(&mut self, call: String) -> Result<(), Fault> {
        self.calls.push(call);
        let written = match self.script.mode {
            WriteMode::Stdio => write_stdio(&self.script.stdout, &self.script.stderr),
            WriteMode::Raw => write_raw(STDOUT_FD, &self.script.stdout)
                .and_then(|()| write_raw(STDERR_FD, &self.script.stderr)),
        };
        written.map_err(|message| Fault::new(render_fault(PROBE_EXCEPTION, &message)))?;
        match &self.script.fault {
            Some(message) => Err(Fault::new(render_fault(PROBE_EXCEPTION, message))),
            None => Ok(()),
        }
    }
}

impl Engine for ProbeEngine {
    fn version(&mut self) -> Result<(), Fault> {
        self.emit("version".to_string())
    }

    fn status(&mut self) -> Result<(), Fault> {
        self.emit("status".to_string())
    }

    fn reset(&mut self) -> Result<(), Fault> {
        self.emit("reset".to_string())
    }

    fn load(&mut self, filename: &str) -> Result<(), Fault> {
        self.emit(format!("load {filename}"))
    }

    fn analyze(&mut self) -> Result<bool, Fault> {
        self.emit("analyze".to_string()).map(|()| true)
    }

    fn instantiate(&mut self, root_system: &str) -> Result<(), Fault> {
        self.emit(format!("instantiate {root_system}"))
    }

    fn generate(&mut self, backend: Backend) -> Result<(), Fault> {
        self.emit(format!("generate {backend}"))
    }

    fn list(&mut self, query: &Query) -> Result<Vec<NodeId>, Fault> {
        self.emit(query.entry_point().to_string()).map(|()| Vec::new())
    }

    fn name_of(&mut self, lookup: NameLookup, node: &NodeId) -> Result<String, Fault> {
        self.emit(format!("{} {}", lookup.entry_point(), node.as_str()))
            .map(|()| node.as_str().to_string())
    }

    fn node_id(&mut self, name: &str) -> Result<NodeId, Fault> {
        self.emit(format!("get_node_id {name}"))
            .map(|()| NodeId::new(name))
    }

    fn root(&mut self) -> Result<NodeId, Fault> {
        self.emit("get_root".to_string()).map(|()| NodeId::new("root"))
    }
}

/// Renders a fault the way the native runtime does: name, message, traceback trailer.
///
/// Message lines after the first are indented to line up under the `Message: ` marker.
pub fn render_fault(exception: &str, message: &str) -> String {
    let mut text = format!("Exception name: {exception}\n");
    let mut lines = message.lines();
    text.push_str("Message: ");
    text.push_str(lines.next().unwrap_or_default());
    text.push('\n');
    for line in lines {
        text.push_str("         ");
        text.push_str(line);
        text.push('\n');
    }
    text.push_str("Call stack traceback locations:\n0x401a2c 0x4021f0 0x7f3e2a1c\n");
    text
}

fn write_stdio(stdout: &str, stderr: &str) -> Result<(), String> {
    let out = CString::new(stdout).map_err(|_| "probe stdout contains NUL".to_string())?;
    let err = CString::new(stderr).map_err(|_| "probe stderr contains NUL".to_string())?;
    let rc = unsafe { sys::ocb_probe_stdio(out.as_ptr(), err.as_ptr()) };
    if rc != 0 {
        return Err(format!(
            "probe stdio write failed: {}",
            std::io::Error::last_os_error()
        ));
    }
    Ok(())
}

fn write_raw(fd: i32, text: &str) -> Result<(), String> {
    if text.is_empty() {
        return Ok(());
    }
    let rc = unsafe { sys::ocb_probe_raw(fd, text.as_ptr().cast(), text.len()) };
    if rc != 0 {
        return Err(format!(
            "probe write to fd {fd} failed: {}",
            std::io::Error::last_os_error()
        ));
    }
    Ok(())
}
