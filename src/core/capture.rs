//! Purpose: Redirect the process-wide stdout/stderr descriptors into private sinks for a scope.
//! Exports: `CaptureRegion`, `Captured`, `capture`.
//! Role: Lowest layer of the call wrapper; intercepts Rust, C stdio, and raw `write(2)` output.
//! Invariants: At most one region is open per process; entry is serialized by a global mutex.
//! Invariants: Entry is all-or-nothing: both streams are swapped or neither is.
//! Invariants: Descriptors are restored exactly once on every exit path, unwinding included.
//! Invariants: Nothing in this module logs; a subscriber writing to stderr would be captured.
use std::cell::Cell;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::sync::{Mutex, MutexGuard, PoisonError};

use bstr::ByteSlice;

use crate::core::error::{Error, ErrorKind};

static CAPTURE_LOCK: Mutex<()> = Mutex::new(());

thread_local! {
    static REGION_ACTIVE: Cell<bool> = const { Cell::new(false) };
}

/// Raw bytes written to stdout and stderr while a region was open.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Captured {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl Captured {
    pub fn stdout_text(&self) -> String {
        self.stdout.to_str_lossy().into_owned()
    }

    pub fn stderr_text(&self) -> String {
        self.stderr.to_str_lossy().into_owned()
    }
}

/// An open redirection of fd 1 and fd 2 into anonymous temporary files.
///
/// Dropping an unclosed region restores the original descriptors and discards
/// whatever was captured; call [`CaptureRegion::exit`] to keep it.
pub struct CaptureRegion {
    saved_stdout: fd::Saved,
    saved_stderr: fd::Saved,
    stdout_sink: File,
    stderr_sink: File,
    restored: bool,
    _slot: RegionSlot,
}

impl CaptureRegion {
    pub fn enter() -> Result<Self, Error> {
        let slot = RegionSlot::acquire()?;
        flush_all();

        let saved_stdout =
            fd::save(fd::STDOUT).map_err(|err| capture_error("failed to duplicate stdout", err))?;
        let saved_stderr =
            fd::save(fd::STDERR).map_err(|err| capture_error("failed to duplicate stderr", err))?;
        let stdout_sink = tempfile::tempfile()
            .map_err(|err| capture_error("failed to create stdout sink", err))?;
        let stderr_sink = tempfile::tempfile()
            .map_err(|err| capture_error("failed to create stderr sink", err))?;

        fd::point_at(fd::STDOUT, &stdout_sink)
            .map_err(|err| capture_error("failed to redirect stdout", err))?;
        if let Err(err) = fd::point_at(fd::STDERR, &stderr_sink) {
            let rollback = fd::restore(fd::STDOUT, &saved_stdout);
            return Err(redirect_failure(err, rollback));
        }

        Ok(Self {
            saved_stdout,
            saved_stderr,
            stdout_sink,
            stderr_sink,
            restored: false,
            _slot: slot,
        })
    }

    /// Restores the original descriptors and returns everything written in between.
    pub fn exit(mut self) -> Result<Captured, Error> {
        let restored = self.restore();
        let stdout = read_sink(&mut self.stdout_sink, "stdout");
        let stderr = read_sink(&mut self.stderr_sink, "stderr");
        restored?;
        Ok(Captured {
            stdout: stdout?,
            stderr: stderr?,
        })
    }

    fn restore(&mut self) -> Result<(), Error> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;
        flush_all();
        let stdout = fd::restore(fd::STDOUT, &self.saved_stdout);
        let stderr = fd::restore(fd::STDERR, &self.saved_stderr);
        stdout.map_err(|err| capture_error("failed to restore stdout", err))?;
        stderr.map_err(|err| capture_error("failed to restore stderr", err))?;
        Ok(())
    }
}

impl Drop for CaptureRegion {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

/// Runs `f` inside a capture region and returns its value with the captured output.
///
/// If `f` panics, the descriptors are restored before the panic continues and
/// anything `f` wrote before panicking is discarded with the region.
pub fn capture<T>(f: impl FnOnce() -> T) -> Result<(T, Captured), Error> {
    let region = CaptureRegion::enter()?;
    let value = f();
    let captured = region.exit()?;
    Ok((value, captured))
}

struct RegionSlot {
    _lock: MutexGuard<'static, ()>,
}

impl RegionSlot {
    fn acquire() -> Result<Self, Error> {
        if REGION_ACTIVE.with(Cell::get) {
            return Err(Error::new(ErrorKind::Busy)
                .with_message("a capture region is already open on this thread")
                .with_hint("Close the current region before wrapping another native call."));
        }
        // Poisoning is ignored: a panicking region restored the streams in Drop.
        let lock = CAPTURE_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        REGION_ACTIVE.with(|active| active.set(true));
        Ok(Self { _lock: lock })
    }
}

impl Drop for RegionSlot {
    fn drop(&mut self) {
        REGION_ACTIVE.with(|active| active.set(false));
    }
}

fn flush_all() {
    let _ = io::stdout().flush();
    let _ = io::stderr().flush();
    fd::flush_c_stdio();
}

fn read_sink(sink: &mut File, stream: &str) -> Result<Vec<u8>, Error> {
    let mut bytes = Vec::new();
    sink.seek(SeekFrom::Start(0))
        .and_then(|_| sink.read_to_end(&mut bytes))
        .map_err(|err| capture_error(format!("failed to read captured {stream}"), err))?;
    Ok(bytes)
}

/// Error for a failed stderr swap after stdout was already swapped and then rolled back.
fn redirect_failure(err: io::Error, rollback: io::Result<()>) -> Error {
    let error = capture_error("failed to redirect stderr", err);
    match rollback {
        Ok(()) => error,
        Err(rollback) => error
            .with_message(format!(
                "failed to redirect stderr; stdout is still redirected ({rollback})"
            ))
            .with_hint("Process stdout is unusable; restart before making further native calls."),
    }
}

fn capture_error(message: impl Into<String>, err: io::Error) -> Error {
    let kind = if err.kind() == io::ErrorKind::Unsupported {
        ErrorKind::Unavailable
    } else {
        ErrorKind::Io
    };
    Error::new(kind).with_message(message).with_source(err)
}

#[cfg(unix)]
mod fd {
    use std::fs::File;
    use std::io;
    use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};

    pub(super) type Saved = OwnedFd;

    pub(super) const STDOUT: RawFd = libc::STDOUT_FILENO;
    pub(super) const STDERR: RawFd = libc::STDERR_FILENO;

    pub(super) fn save(slot: RawFd) -> io::Result<Saved> {
        let rc = unsafe { libc::dup(slot) };
        if rc < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(unsafe { OwnedFd::from_raw_fd(rc) })
    }

    pub(super) fn point_at(slot: RawFd, sink: &File) -> io::Result<()> {
        dup2(sink.as_raw_fd(), slot)
    }

    pub(super) fn restore(slot: RawFd, saved: &Saved) -> io::Result<()> {
        dup2(saved.as_raw_fd(), slot)
    }

    pub(super) fn flush_c_stdio() {
        unsafe {
            libc::fflush(std::ptr::null_mut());
        }
    }

    fn dup2(src: RawFd, slot: RawFd) -> io::Result<()> {
        loop {
            let rc = unsafe { libc::dup2(src, slot) };
            if rc >= 0 {
                return Ok(());
            }
            let err = io::Error::last_os_error();
            if err.raw_os_error() == Some(libc::EINTR) {
                continue;
            }
            return Err(err);
        }
    }
}

#[cfg(not(unix))]
mod fd {
    use std::fs::File;
    use std::io;

    pub(super) type Saved = ();

    pub(super) const STDOUT: i32 = 1;
    pub(super) const STDERR: i32 = 2;

    pub(super) fn save(_slot: i32) -> io::Result<Saved> {
        Err(unsupported())
    }

    pub(super) fn point_at(_slot: i32, _sink: &File) -> io::Result<()> {
        Err(unsupported())
    }

    pub(super) fn restore(_slot: i32, _saved: &Saved) -> io::Result<()> {
        Err(unsupported())
    }

    pub(super) fn flush_c_stdio() {}

    fn unsupported() -> io::Error {
        io::Error::new(
            io::ErrorKind::Unsupported,
            "descriptor-level stdio capture requires a unix target",
        )
    }
}
