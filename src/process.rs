//! Blocking child-process execution with full output capture.
//!
//! Both pipes are drained on their own threads while the parent waits, so a child that writes more than a pipe
//! buffer's worth of output can never deadlock against us. With a time limit, the child is polled with `try_wait`
//! and killed once the deadline passes.
//!
//! Killing the child does not close the pipes when it has started processes of its own (a shell running a command
//! without `exec`, a `system()` call). On unix a timed child therefore gets its own process group and the whole
//! group is killed. Either way the readers are only waited for a short grace period after a kill; whatever they
//! collected by then is the captured output.

use std::io::{self, Read};
use std::process::{Command, ExitStatus, Stdio};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How long the output readers may keep running once a timed-out child has been killed.
const DRAIN_GRACE: Duration = Duration::from_millis(250);

/// Raw result of one child process.
#[derive(Debug)]
pub struct CapturedOutput {
    pub exit_code: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// The child was killed for running past its limit.
    pub timed_out: bool,
}

impl CapturedOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0 && !self.timed_out
    }
}

/// Run `command` to completion with `stdin` attached, capturing stdout and stderr.
///
/// ## Errors
/// Returns the spawn or wait error; a non-zero exit is not an error.
pub fn run_captured(mut command: Command, stdin: Stdio, timeout: Option<Duration>) -> io::Result<CapturedOutput> {
    // A limit too large to add to the clock is no limit at all.
    let deadline = timeout.and_then(|limit| Instant::now().checked_add(limit));

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        if deadline.is_some() {
            command.process_group(0);
        }
    }

    let mut child = command
        .stdin(stdin)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let stdout = Drain::spawn(child.stdout.take());
    let stderr = Drain::spawn(child.stderr.take());

    let (status, timed_out) = match deadline {
        None => (child.wait()?, false),
        Some(deadline) => loop {
            if let Some(status) = child.try_wait()? {
                break (status, false);
            }
            if Instant::now() >= deadline {
                tracing::warn!(pid = child.id(), ?timeout, "time limit exceeded, killing child");
                kill_process_group(child.id());
                // The child may have exited between try_wait and kill.
                let _ = child.kill();
                break (child.wait()?, true);
            }
            thread::sleep(POLL_INTERVAL);
        },
    };

    let grace = timed_out.then_some(DRAIN_GRACE);
    Ok(CapturedOutput {
        exit_code: exit_code(status),
        stdout: stdout.finish(grace)?,
        stderr: stderr.finish(grace)?,
        timed_out,
    })
}

/// Kill every process in the group led by `pid`.
///
/// Best effort through the `kill` utility. The group only exists when the child was spawned with a time limit.
#[cfg(unix)]
fn kill_process_group(pid: u32) {
    let result = Command::new("kill")
        .arg("-KILL")
        .arg("--")
        .arg(format!("-{pid}"))
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();
    if let Err(e) = result {
        tracing::debug!(pid, error = %e, "could not kill process group");
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: u32) {}

/// Exit code of a finished child; a signal-terminated child reports the negated signal number.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }
    -1
}

/// A pipe being read to the end on a background thread.
struct Drain {
    buf: Arc<Mutex<Vec<u8>>>,
    handle: JoinHandle<io::Result<()>>,
}

impl Drain {
    fn spawn<R: Read + Send + 'static>(pipe: Option<R>) -> Self {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&buf);
        let handle = thread::spawn(move || {
            let Some(mut pipe) = pipe else {
                return Ok(());
            };
            let mut chunk = [0u8; 8192];
            loop {
                let n = match pipe.read(&mut chunk) {
                    Ok(0) => return Ok(()),
                    Ok(n) => n,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e),
                };
                sink.lock().unwrap_or_else(PoisonError::into_inner).extend_from_slice(&chunk[..n]);
            }
        });
        Self { buf, handle }
    }

    /// Wait for end of file, or for at most `grace` if given, and return everything read so far.
    ///
    /// A reader still blocked after the grace period is left behind; it exits once the last writer closes the pipe.
    fn finish(self, grace: Option<Duration>) -> io::Result<Vec<u8>> {
        let Self { buf, handle } = self;
        if let Some(grace) = grace {
            let give_up = Instant::now() + grace;
            while !handle.is_finished() && Instant::now() < give_up {
                thread::sleep(POLL_INTERVAL);
            }
            if !handle.is_finished() {
                tracing::debug!("output pipe still open after kill, keeping partial output");
                return Ok(take_buffer(&buf));
            }
        }
        handle
            .join()
            .map_err(|_| io::Error::other("output reader thread panicked"))??;
        Ok(take_buffer(&buf))
    }
}

fn take_buffer(buf: &Mutex<Vec<u8>>) -> Vec<u8> {
    std::mem::take(&mut *buf.lock().unwrap_or_else(PoisonError::into_inner))
}
