//! Child process execution: launch the solution with piped stdio,
//! feed it the test input, and wait for it under a wall-clock
//! deadline, killing it if the deadline passes.

use crate::prelude::*;
use async_process::{Command, Stdio};
use async_std::future::timeout;
use futures::{AsyncReadExt, AsyncWriteExt};
use std::process::ExitStatus;
use std::time::Instant;

fn one_sec() -> Duration {
    Duration::from_secs(1)
}

fn thirty_two_mib() -> Byte {
    Byte::from_str("32 MiB").unwrap()
}

/// Limits applied to one solution run.
#[serde_with::serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct RunLimit {
    /// Wall-clock deadline.
    #[serde_as(as = "serde_with::DurationSeconds<f64>")]
    #[serde(default = "one_sec")]
    pub time: Duration,
    /// Cap on captured stdout and stderr, each.
    #[serde_as(as = "serde_with::DisplayFromStr")]
    #[serde(default = "thirty_two_mib")]
    pub output: Byte,
}

impl Default for RunLimit {
    fn default() -> Self {
        Self {
            time: one_sec(),
            output: thirty_two_mib(),
        }
    }
}

/// A solution run that has terminated, either by itself or because
/// the deadline passed and it was killed.
#[derive(Debug)]
pub struct FinishedRun {
    stdout: String,
    stderr: String,
    status: Option<ExitStatus>,
    wall_time: Duration,
}

impl FinishedRun {
    /// Whether the run was killed at the deadline.
    pub fn timed_out(&self) -> bool {
        self.status.is_none()
    }

    /// Whether the run ended abnormally: killed, signaled, or a
    /// non-zero exit code.
    pub fn is_failed(&self) -> bool {
        self.status.map_or(true, |s| !s.success())
    }

    /// Wall-clock time between launch and termination.
    pub fn wall_time_usage(&self) -> Duration {
        self.wall_time
    }

    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    pub fn stderr(&self) -> &str {
        &self.stderr
    }
}

/// Launch `cmd`, write `input` to its stdin, and capture stdout and
/// stderr until it exits or `lim.time` elapses. On the deadline the
/// child is killed and reaped before this returns, so no orphan
/// survives the call. The elapsed wall time is recorded in every
/// outcome.
///
/// Stdin feeding and output draining run concurrently inside the
/// deadline; a solution may interleave reads and writes freely.
pub async fn run_solution(cmd: &[String], input: &str, lim: &RunLimit) -> Result<FinishedRun> {
    if cmd.is_empty() {
        return Err(Error::EmptyRunCommand);
    }
    debug!("launching {:?}", cmd);

    let start = Instant::now();
    let mut child = Command::new(&cmd[0])
        .args(&cmd[1..])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(Error::SpawnError)?;

    let mut stdin = child.stdin.take();
    let mut stdout = child.stdout.take();
    let mut stderr = child.stderr.take();
    let cap = lim.output.get_bytes() as u64;

    let mut out_buf = Vec::new();
    let mut err_buf = Vec::new();
    let wait = async {
        let feed = async {
            if let Some(mut pipe) = stdin.take() {
                pipe.write_all(input.as_bytes()).await?;
                pipe.flush().await?;
                // dropping the handle closes the pipe, signalling
                // end of input
            }
            Ok::<_, std::io::Error>(())
        };
        let drain_out = async {
            if let Some(pipe) = stdout.take() {
                pipe.take(cap).read_to_end(&mut out_buf).await?;
            }
            Ok::<_, std::io::Error>(())
        };
        let drain_err = async {
            if let Some(pipe) = stderr.take() {
                pipe.take(cap).read_to_end(&mut err_buf).await?;
            }
            Ok::<_, std::io::Error>(())
        };
        futures::try_join!(feed, drain_out, drain_err)?;
        child.status().await
    };
    let waited = timeout(lim.time, wait).await;

    let status = match waited {
        Ok(status) => Some(status.map_err(Error::IOError)?),
        Err(_) => {
            info!("deadline of {:?} passed, killing the solution", lim.time);
            if let Err(e) = child.kill() {
                warn!("cannot kill the solution: {}", e);
            }
            child.status().await.map_err(Error::IOError)?;
            None
        }
    };
    let wall_time = start.elapsed();

    Ok(FinishedRun {
        stdout: String::from_utf8_lossy(&out_buf).into_owned(),
        stderr: String::from_utf8_lossy(&err_buf).into_owned(),
        status,
        wall_time,
    })
}
