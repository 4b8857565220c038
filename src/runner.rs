//! Spawns the external downloader and streams its console output
//!
//! The runner owns all blocking work for one download: process spawn, a live
//! line-by-line tail of the child's output, and the final wait. It never
//! touches the UI; everything flows back through a [`WorkerEvent`] channel,
//! and every run ends with exactly one `Finished` event.

use std::process::{ExitStatus, Stdio};

use once_cell::sync::OnceCell;
use thiserror::Error;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    process::Command,
    runtime::Runtime,
    sync::mpsc::UnboundedSender,
};
use tracing::{error, info};

use crate::model::{RunOutcome, WorkerEvent};
use crate::progress::parse_progress_from_line;

/// Name of the external downloading tool, resolved on the search path.
pub const DOWNLOADER: &str = "yt-dlp";

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

// Global Tokio runtime stored in a OnceCell for lazy init
static RUNTIME: OnceCell<Runtime> = OnceCell::new();

/// Shared runtime hosting download workers and thumbnail fetches.
pub fn runtime() -> &'static Runtime {
    RUNTIME.get_or_init(|| Runtime::new().expect("failed to start tokio runtime"))
}

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("failed to start {tool}: {source}")]
    Spawn {
        tool: String,
        source: std::io::Error,
    },

    #[error("failed to read {tool} output: {source}")]
    Stream {
        tool: String,
        source: std::io::Error,
    },

    #[error("failed waiting for {tool}: {source}")]
    Wait {
        tool: String,
        source: std::io::Error,
    },
}

/// Runs one download to completion, forwarding console lines as they arrive.
pub async fn run_download(args: Vec<String>, events: UnboundedSender<WorkerEvent>) {
    run_tool(DOWNLOADER, args, events).await;
}

/// Runs `program args...`, relaying output and the terminal outcome through
/// `events`. Failures are reported, never propagated.
pub async fn run_tool(program: &str, args: Vec<String>, events: UnboundedSender<WorkerEvent>) {
    let _ = events.send(WorkerEvent::Log(format!(
        "Running command:\n{} {}\n",
        program,
        args.join(" ")
    )));
    let _ = events.send(WorkerEvent::Log("Downloading... please wait.".to_owned()));

    let outcome = match stream_process(program, &args, &events).await {
        Ok(status) if status.success() => {
            let _ = events.send(WorkerEvent::Log("✅ Download Complete!".to_owned()));
            info!(program, "download finished");
            RunOutcome::Success
        }
        Ok(status) => {
            let code = status.code();
            let line = match code {
                Some(code) => format!("❌ Error: Exit code {code}"),
                None => "❌ Error: terminated by signal".to_owned(),
            };
            let _ = events.send(WorkerEvent::Log(line));
            error!(program, ?code, "download failed");
            RunOutcome::Failed(code)
        }
        Err(err) => {
            let _ = events.send(WorkerEvent::Log(format!("❌ Exception: {err}")));
            error!(program, %err, "download aborted");
            RunOutcome::Error(err.to_string())
        }
    };

    let _ = events.send(WorkerEvent::Finished(outcome));
}

/// Spawns the child and tails both output pipes into the event channel until
/// it exits. Stderr is drained concurrently so neither pipe can fill up and
/// stall the child.
async fn stream_process(
    program: &str,
    args: &[String],
    events: &UnboundedSender<WorkerEvent>,
) -> Result<ExitStatus, RunnerError> {
    info!(program, ?args, "spawning downloader");

    let mut child = hidden_command(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| RunnerError::Spawn {
            tool: program.to_owned(),
            source,
        })?;

    let stdout = child.stdout.take().expect("stdout is piped");
    let stderr = child.stderr.take().expect("stderr is piped");

    let stderr_task = {
        let events = events.clone();
        let mut lines = BufReader::new(stderr).lines();
        tokio::spawn(async move {
            while let Ok(Some(line)) = lines.next_line().await {
                forward_line(&events, &line);
            }
        })
    };

    let mut lines = BufReader::new(stdout).lines();
    loop {
        let line = lines
            .next_line()
            .await
            .map_err(|source| RunnerError::Stream {
                tool: program.to_owned(),
                source,
            })?;
        match line {
            Some(line) => forward_line(events, &line),
            None => break,
        }
    }

    let status = child.wait().await.map_err(|source| RunnerError::Wait {
        tool: program.to_owned(),
        source,
    })?;

    // Stderr is fully drained once the child is gone.
    let _ = stderr_task.await;

    Ok(status)
}

fn forward_line(events: &UnboundedSender<WorkerEvent>, line: &str) {
    let trimmed = line.trim();
    if let Some(fraction) = parse_progress_from_line(trimmed) {
        let _ = events.send(WorkerEvent::Progress(fraction));
    }
    let _ = events.send(WorkerEvent::Log(trimmed.to_owned()));
}

fn hidden_command(program: &str) -> Command {
    let mut command = Command::new(program);
    #[cfg(windows)]
    command.creation_flags(CREATE_NO_WINDOW);
    command
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};

    async fn drain(mut rx: UnboundedReceiver<WorkerEvent>) -> (Vec<String>, Vec<RunOutcome>) {
        let mut logs = Vec::new();
        let mut outcomes = Vec::new();
        while let Some(event) = rx.recv().await {
            match event {
                WorkerEvent::Log(line) => logs.push(line),
                WorkerEvent::Finished(outcome) => outcomes.push(outcome),
                WorkerEvent::Progress(_) => {}
            }
        }
        (logs, outcomes)
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn zero_exit_takes_the_success_path() {
        let (tx, rx) = unbounded_channel();
        run_tool("echo", vec!["hello world".to_owned()], tx).await;
        let (logs, outcomes) = drain(rx).await;
        assert_eq!(outcomes, vec![RunOutcome::Success]);
        assert!(logs.iter().any(|l| l == "hello world"));
        assert!(logs.iter().any(|l| l.contains("Download Complete")));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn nonzero_exit_reports_the_code() {
        let (tx, rx) = unbounded_channel();
        run_tool("false", Vec::new(), tx).await;
        let (logs, outcomes) = drain(rx).await;
        assert_eq!(outcomes, vec![RunOutcome::Failed(Some(1))]);
        assert!(logs.iter().any(|l| l.contains("Exit code 1")));
        assert!(!logs.iter().any(|l| l.contains("Download Complete")));
    }

    #[tokio::test]
    async fn spawn_failure_is_caught_and_reported() {
        let (tx, rx) = unbounded_channel();
        run_tool("streamgrab-no-such-tool", Vec::new(), tx).await;
        let (logs, outcomes) = drain(rx).await;
        assert_eq!(outcomes.len(), 1, "exactly one Finished event");
        assert!(matches!(outcomes[0], RunOutcome::Error(_)));
        assert!(logs.iter().any(|l| l.contains("Exception")));
        assert!(!logs.iter().any(|l| l.contains("Download Complete")));
    }
}
