//! Purpose: End-to-end checks of stream capture against the C probe engine.
//! Exports: `Check`, `run_checks`.
//! Role: Backs `ocarina-bridge selftest`; proves capture works on this host before real use.
//! Invariants: Checks run sequentially on the calling thread; each opens its own region.
//! Invariants: A failing check is reported, not raised; only capture faults abort the run.

use ocarina_bridge::api::{
    CaptureRegion, Error, ErrorKind, ProbeEngine, ProbeScript, Session, WriteMode,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub(super) struct Check {
    pub(super) name: &'static str,
    pub(super) ok: bool,
    pub(super) detail: String,
}

impl Check {
    fn expect<T: PartialEq + std::fmt::Debug>(name: &'static str, actual: T, expected: T) -> Self {
        let ok = actual == expected;
        let detail = if ok {
            String::new()
        } else {
            format!("expected {expected:?}, got {actual:?}")
        };
        Self { name, ok, detail }
    }
}

pub(super) fn run_checks() -> Result<Vec<Check>, Error> {
    Ok(vec![
        stdio_stdout_is_captured()?,
        raw_stderr_is_classified()?,
        fault_is_recovered()?,
        nested_region_is_rejected()?,
        descriptors_are_restored()?,
    ])
}

fn stdio_stdout_is_captured() -> Result<Check, Error> {
    let script = ProbeScript::new().with_stdout("selftest: parsing model\n");
    let mut session = Session::new(ProbeEngine::new(script));
    let result = session.status()?;
    Ok(Check::expect(
        "stdio_stdout_captured",
        result.info.as_str(),
        "selftest: parsing model\n",
    ))
}

fn raw_stderr_is_classified() -> Result<Check, Error> {
    let script = ProbeScript::new()
        .with_stderr("Warning: w1\nError: e1\nmore e1\n")
        .with_mode(WriteMode::Raw);
    let mut session = Session::new(ProbeEngine::new(script));
    let result = session.analyze()?;
    Ok(Check::expect(
        "raw_stderr_classified",
        (result.warnings, result.errors),
        (vec!["w1".to_string()], vec!["e1\nmore e1".to_string()]),
    ))
}

fn fault_is_recovered() -> Result<Check, Error> {
    let script = ProbeScript::new()
        .with_stderr("Error: missing.aadl not found\n")
        .with_fault("cannot open missing.aadl");
    let mut session = Session::new(ProbeEngine::new(script));
    let result = session.load("missing.aadl")?;
    Ok(Check::expect(
        "fault_recovered",
        (result.value, result.errors),
        (
            None,
            vec![
                "missing.aadl not found".to_string(),
                "cannot open missing.aadl".to_string(),
            ],
        ),
    ))
}

fn nested_region_is_rejected() -> Result<Check, Error> {
    let region = CaptureRegion::enter()?;
    let nested = CaptureRegion::enter().map(drop).map_err(|err| err.kind());
    region.exit()?;
    Ok(Check::expect(
        "nested_region_rejected",
        nested,
        Err(ErrorKind::Busy),
    ))
}

fn descriptors_are_restored() -> Result<Check, Error> {
    let before = stream_identity();
    let script = ProbeScript::new()
        .with_stdout("out\n")
        .with_stderr("Error: boom\n")
        .with_fault("boom");
    let mut session = Session::new(ProbeEngine::new(script));
    session.reset()?;
    let after = stream_identity();
    Ok(Check::expect("descriptors_restored", after, before))
}

#[cfg(unix)]
fn stream_identity() -> Option<[(u64, u64); 2]> {
    fn identity(fd: i32) -> Option<(u64, u64)> {
        let mut stat = std::mem::MaybeUninit::<libc::stat>::uninit();
        let rc = unsafe { libc::fstat(fd, stat.as_mut_ptr()) };
        if rc != 0 {
            return None;
        }
        let stat = unsafe { stat.assume_init() };
        Some((stat.st_dev as u64, stat.st_ino as u64))
    }
    Some([
        identity(libc::STDOUT_FILENO)?,
        identity(libc::STDERR_FILENO)?,
    ])
}

#[cfg(not(unix))]
fn stream_identity() -> Option<[(u64, u64); 2]> {
    None
}
