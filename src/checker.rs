//! Hand-off to an external type checker. The crate never simulates a machine: an
//! artifact goes in and an opaque verdict comes back.

use crate::types::TypingMachineError;
use serde::Serialize;
use std::fmt;
use std::io::{Read, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::debug;

/// Outcome reported by a checker for one artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    /// The query type checks: the machine accepts the word.
    Accept,
    /// The query does not type check: the machine rejects the word.
    Reject,
    /// The checker ran out of stack, time, or crashed before deciding.
    ResourceExhausted,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Accept => write!(f, "accept"),
            Verdict::Reject => write!(f, "reject"),
            Verdict::ResourceExhausted => write!(f, "resource exhausted"),
        }
    }
}

/// Anything that can decide a rendered artifact.
pub trait Checker {
    fn check(&self, artifact: &str) -> Result<Verdict, TypingMachineError>;
}

/// Runs `<program> <args...> <file>` on a temporary `.py` file holding the artifact,
/// e.g. `mypy`. Exit code 0 accepts, 1 rejects, and anything else (including death by
/// signal or the timeout) is resource exhaustion.
#[derive(Debug, Clone)]
pub struct CommandChecker {
    program: String,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl CommandChecker {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: None,
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn verdict(status: Option<ExitStatus>) -> Verdict {
        match status.and_then(|status| status.code()) {
            Some(0) => Verdict::Accept,
            Some(1) => Verdict::Reject,
            _ => Verdict::ResourceExhausted,
        }
    }
}

impl Checker for CommandChecker {
    fn check(&self, artifact: &str) -> Result<Verdict, TypingMachineError> {
        let checker_error = |context: &str, e: std::io::Error| {
            TypingMachineError::CheckerError(format!("{context}: {e}"))
        };

        let mut file = tempfile::Builder::new()
            .prefix("typing_machine_")
            .suffix(".py")
            .tempfile()
            .map_err(|e| checker_error("Failed to create artifact file", e))?;
        file.write_all(artifact.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|e| checker_error("Failed to write artifact file", e))?;

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(file.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            // Own group, so a timeout also reaches processes the checker starts.
            command.process_group(0);
        }
        let mut child = command
            .spawn()
            .map_err(|e| checker_error(&format!("Failed to run {}", self.program), e))?;

        let stdout_handle = drain(child.stdout.take());
        let stderr_handle = drain(child.stderr.take());

        let start = Instant::now();
        let status = loop {
            if let Some(status) = child
                .try_wait()
                .map_err(|e| checker_error("Failed to wait for checker", e))?
            {
                break Some(status);
            }
            if self.timeout.is_some_and(|timeout| start.elapsed() >= timeout) {
                kill_tree(&mut child);
                let _ = child.wait();
                break None;
            }
            std::thread::sleep(Duration::from_millis(10));
        };

        // After a timeout an escaped grandchild may still hold the pipes open, so the
        // drain threads are left to finish on their own.
        let (stdout, stderr) = match status {
            Some(_) => (
                stdout_handle.join().unwrap_or_default(),
                stderr_handle.join().unwrap_or_default(),
            ),
            None => (Vec::new(), Vec::new()),
        };
        let verdict = Self::verdict(status);

        debug!(
            program = %self.program,
            status = ?status,
            elapsed_ms = start.elapsed().as_millis() as u64,
            stdout = %String::from_utf8_lossy(&stdout).trim(),
            stderr = %String::from_utf8_lossy(&stderr).trim(),
            %verdict,
            "checker finished"
        );

        Ok(verdict)
    }
}

/// Kills the checker together with everything it started.
#[cfg(unix)]
fn kill_tree(child: &mut Child) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    if killpg(Pid::from_raw(child.id() as i32), Signal::SIGKILL).is_err() {
        let _ = child.kill();
    }
}

#[cfg(not(unix))]
fn kill_tree(child: &mut Child) {
    let _ = child.kill();
}

/// Reads a child pipe to the end on its own thread so the child never blocks on a full pipe.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<Vec<u8>> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        buf
    })
}
