//! # Child-process worker.
//!
//! Every line the process writes to stdout is one message. `worker_data`, if
//! set, is written to stdin and stdin is closed. The worker resolves when the
//! process exits.

use std::ffi::OsString;
use std::fmt;
use std::io;
use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;

use super::{Worker, WorkerOutput};
use crate::error::TaskError;

type MessageFn = Arc<dyn Fn(&str) + Send + Sync>;

/// Runs a program as a child process.
///
/// # Example
/// ```rust,no_run
/// use taskgate::{ProcessWorker, Worker};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let out = ProcessWorker::new("sh")
///     .args(["-c", "echo starting; echo ready"])
///     .on_message(|line| println!("worker: {line}"))
///     .run()
///     .await
///     .unwrap();
/// assert_eq!(out.last_message.as_deref(), Some("ready"));
/// # }
/// ```
#[derive(Clone)]
pub struct ProcessWorker {
    program: OsString,
    args: Vec<OsString>,
    worker_data: Option<String>,
    on_message: Option<MessageFn>,
}

impl ProcessWorker {
    /// Worker for `program` with no arguments.
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            worker_data: None,
            on_message: None,
        }
    }

    /// Appends one argument.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends arguments.
    pub fn args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Data written to the process's stdin.
    pub fn worker_data(mut self, data: impl Into<String>) -> Self {
        self.worker_data = Some(data.into());
        self
    }

    /// Called for every message (stdout line) as it arrives.
    pub fn on_message(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_message = Some(Arc::new(f));
        self
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(if self.worker_data.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        cmd
    }
}

fn spawn_error(program: &OsString, err: io::Error) -> TaskError {
    match err.kind() {
        io::ErrorKind::Unsupported => TaskError::NotSupported {
            capability: "child processes".to_string(),
        },
        _ => TaskError::fail(format!("spawn {}: {err}", program.to_string_lossy())),
    }
}

#[async_trait]
impl Worker for ProcessWorker {
    async fn run(&self) -> Result<WorkerOutput, TaskError> {
        let mut child = self
            .command()
            .spawn()
            .map_err(|e| spawn_error(&self.program, e))?;

        let writer = match (self.worker_data.clone(), child.stdin.take()) {
            // Separate task so a chatty child cannot block on a full stdout pipe.
            (Some(data), Some(mut stdin)) => Some(tokio::spawn(async move {
                match stdin.write_all(data.as_bytes()).await {
                    // A child may exit without reading its input.
                    Err(err) if err.kind() == io::ErrorKind::BrokenPipe => Ok(()),
                    res => res,
                }
            })),
            _ => None,
        };

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| TaskError::fail("stdout is not captured"))?;
        let mut lines = BufReader::new(stdout).lines();

        let mut last_message = None;
        while let Some(line) = lines.next_line().await.map_err(TaskError::fail)? {
            if let Some(f) = &self.on_message {
                f(&line);
            }
            last_message = Some(line);
        }

        let status = child.wait().await.map_err(TaskError::fail)?;
        if let Some(writer) = writer {
            writer
                .await
                .map_err(TaskError::from_join)?
                .map_err(|e| TaskError::fail(format!("write worker data: {e}")))?;
        }
        Ok(WorkerOutput {
            last_message,
            exit_code: status.code(),
        })
    }
}

impl fmt::Debug for ProcessWorker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessWorker")
            .field("program", &self.program)
            .field("args", &self.args)
            .field("worker_data", &self.worker_data.is_some())
            .finish()
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::worker::with_worker;
    use crate::{Task, with_timeout};
    use parking_lot::Mutex;
    use std::time::Duration;

    #[tokio::test]
    async fn reports_last_message_and_exit_code() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();

        let out = ProcessWorker::new("sh")
            .args(["-c", "echo first; echo second; exit 3"])
            .on_message(move |line| sink.lock().push(line.to_string()))
            .run()
            .await
            .unwrap();

        assert_eq!(out.last_message.as_deref(), Some("second"));
        assert_eq!(out.exit_code, Some(3));
        assert_eq!(*seen.lock(), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn passes_worker_data_on_stdin() {
        let out = ProcessWorker::new("sh")
            .args(["-c", "read x; echo got:$x"])
            .worker_data("hello\n")
            .run()
            .await
            .unwrap();
        assert_eq!(out.last_message.as_deref(), Some("got:hello"));
        assert_eq!(out.exit_code, Some(0));
    }

    #[tokio::test]
    async fn child_ignoring_worker_data_still_succeeds() {
        // Larger than a pipe buffer, so the write outlives the child.
        let data = "x".repeat(1 << 20);
        let out = ProcessWorker::new("sh")
            .args(["-c", "echo done; exit 0"])
            .worker_data(data)
            .run()
            .await
            .unwrap();
        assert_eq!(out.last_message.as_deref(), Some("done"));
        assert_eq!(out.exit_code, Some(0));
    }

    #[tokio::test]
    async fn silent_process_has_no_message() {
        let out = ProcessWorker::new("true").run().await.unwrap();
        assert_eq!(out, WorkerOutput { last_message: None, exit_code: Some(0) });
    }

    #[tokio::test]
    async fn missing_program_fails() {
        let err = ProcessWorker::new("/definitely/not/a/program")
            .run()
            .await
            .unwrap_err();
        assert_eq!(err.as_label(), "task_failed");
    }

    #[tokio::test]
    async fn composes_with_timeout() {
        let task: Task<(), WorkerOutput> =
            with_worker(ProcessWorker::new("sh").args(["-c", "sleep 5"]));
        let err = with_timeout(task, Duration::from_millis(20)).await.unwrap_err();
        assert!(err.is_timeout());
    }
}
