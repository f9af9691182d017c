//! Locating and driving the OpenSCAD executable.
//!
//! Used twice: the exact tier of text measurement and the OpenSCAD render
//! backend. Every invocation is a blocking subprocess with a deadline; a
//! process still running at the deadline is killed.

use crate::errors::BackendError;
use std::ffi::OsStr;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

/// Default bound on a single OpenSCAD run.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Install locations checked before `PATH`.
pub const KNOWN_PATHS: &[&str] = &[
    "/Applications/OpenSCAD.app/Contents/MacOS/OpenSCAD",
    "/usr/bin/openscad",
    "/usr/local/bin/openscad",
    "/opt/homebrew/bin/openscad",
    "C:/Program Files/OpenSCAD/openscad.exe",
];

#[cfg(windows)]
const EXECUTABLE_NAME: &str = "openscad.exe";
#[cfg(not(windows))]
const EXECUTABLE_NAME: &str = "openscad";

/// Find an OpenSCAD executable in the known install locations, then on
/// `PATH`.
pub fn find_openscad() -> Option<PathBuf> {
    KNOWN_PATHS
        .iter()
        .map(PathBuf::from)
        .find(|path| path.is_file())
        .or_else(|| {
            let path_var = std::env::var_os("PATH")?;
            std::env::split_paths(&path_var)
                .map(|dir| dir.join(EXECUTABLE_NAME))
                .find(|candidate| candidate.is_file())
        })
}

/// Quote `value` as an OpenSCAD string literal.
pub fn string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// An OpenSCAD executable with a per-run deadline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpenScad {
    program: PathBuf,
    timeout: Duration,
}

impl OpenScad {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        OpenScad {
            program: program.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Use the first executable [`find_openscad`] reports.
    pub fn discover() -> Result<Self, BackendError> {
        find_openscad().map(Self::new).ok_or(BackendError::NotFound)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Render `source` to `output`; the output format follows its extension.
    pub fn render(&self, source: &str, output: &Path) -> Result<(), BackendError> {
        let workdir = tempfile::Builder::new().prefix("magnetic-label").tempdir()?;
        let scad_file = workdir.path().join("model.scad");
        std::fs::write(&scad_file, source)?;

        let mut command = Command::new(&self.program);
        command.arg("-o").arg(output).arg(&scad_file);
        debug!(program = %self.program.display(), output = %output.display(), "running OpenSCAD");
        run_with_timeout(command, self.timeout)?;

        match std::fs::metadata(output) {
            Ok(meta) if meta.len() > 0 => Ok(()),
            Ok(_) => Err(BackendError::EmptyOutput),
            Err(_) => Err(BackendError::MissingOutput(output.to_path_buf())),
        }
    }
}

/// Run `command` to completion, killing it once `timeout` has passed.
///
/// Stdout is discarded; stderr is collected on a separate thread so a chatty
/// child cannot block on a full pipe.
pub fn run_with_timeout(mut command: Command, timeout: Duration) -> Result<(), BackendError> {
    let program = display_name(command.get_program());
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => BackendError::NotFound,
            _ => BackendError::Io(e),
        })?;

    let stderr_reader = child.stderr.take().map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = String::new();
            // a partial read still carries the useful part of the message
            let _ = pipe.read_to_string(&mut buf);
            buf
        })
    });

    let deadline = Instant::now() + timeout;
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Err(BackendError::Timeout { program, timeout });
        }
        thread::sleep(POLL_INTERVAL);
    };

    let stderr = stderr_reader
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default();
    if status.success() {
        Ok(())
    } else {
        Err(BackendError::Failed {
            program,
            status: status.to_string(),
            stderr: stderr.trim().to_string(),
        })
    }
}

fn display_name(program: &OsStr) -> String {
    Path::new(program)
        .file_name()
        .unwrap_or(program)
        .to_string_lossy()
        .into_owned()
}
