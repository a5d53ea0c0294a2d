use std::{io::ErrorKind, path::Path, process::Stdio};

use thiserror::Error;
use tokio::{fs::remove_file, process::Command};
use tracing::debug;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Could not spawn {program}: {source}")]
    SpawnError {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with code {code:?}: {stderr}")]
    RunError {
        program: String,
        code: Option<i32>,
        stderr: String,
    },
}

/// Runs `program` to completion and returns its stdout, failing on a non-zero exit
pub async fn simple_command_with_output(
    program: &str,
    args: &[&str],
) -> Result<String, CommandError> {
    debug!("program={} args={}", program, args.join(" "));
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|source| CommandError::SpawnError {
            program: program.to_owned(),
            source,
        })?;

    if !output.status.success() {
        return Err(CommandError::RunError {
            program: program.to_owned(),
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Removes `path`, treating an already missing file as success.
/// Returns whether a file was actually deleted.
pub async fn remove_file_if_exists(path: &Path) -> std::io::Result<bool> {
    match remove_file(path).await {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err),
    }
}
