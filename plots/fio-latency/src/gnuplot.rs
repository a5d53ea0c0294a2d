use std::process::Stdio;

use common::util::CommandError;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    process::{Child, ChildStdin, Command},
};
use tracing::debug;

use crate::PlotError;

/// A scripting connection to a plotting program
#[async_trait::async_trait]
pub trait PlotSession: Send {
    /// Sends a single command line
    async fn send(&mut self, cmd: &str) -> Result<(), PlotError>;
    /// Ends the session and waits for the program to finish rendering
    async fn close(&mut self) -> Result<(), PlotError>;
}

/// gnuplot driven over stdin
#[derive(Debug)]
pub struct GnuplotSession {
    program: String,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
}

impl GnuplotSession {
    pub fn spawn(program: &str) -> Result<Self, PlotError> {
        let mut child = Command::new(program)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| CommandError::SpawnError {
                program: program.to_owned(),
                source,
            })?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| std::io::Error::other("Could not take stdin"))?;
        debug!("Spawned {program}");

        Ok(Self {
            program: program.to_owned(),
            child: Some(child),
            stdin: Some(stdin),
        })
    }
}

#[async_trait::async_trait]
impl PlotSession for GnuplotSession {
    async fn send(&mut self, cmd: &str) -> Result<(), PlotError> {
        let stdin = self.stdin.as_mut().ok_or(PlotError::SessionClosed)?;
        debug!("{}> {cmd}", self.program);
        stdin.write_all(cmd.as_bytes()).await?;
        stdin.write_all(b"\n").await?;
        stdin.flush().await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), PlotError> {
        if let Some(mut stdin) = self.stdin.take() {
            // The program may already be gone, exit status is checked below
            if let Err(err) = stdin.write_all(b"quit\n").await {
                debug!("Could not send quit to {}: {err}", self.program);
            }
        }
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };

        let mut stderr = String::new();
        if let Some(mut pipe) = child.stderr.take() {
            pipe.read_to_string(&mut stderr).await?;
        }
        let status = child.wait().await?;
        if !status.success() {
            return Err(CommandError::RunError {
                program: self.program.clone(),
                code: status.code(),
                stderr: stderr.trim().to_owned(),
            }
            .into());
        }
        if !stderr.trim().is_empty() {
            debug!("{} stderr: {}", self.program, stderr.trim());
        }
        Ok(())
    }
}
