//! Lancement d'un processus enfant annulable

use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use super::ToolError;
use crate::cancel::CancelToken;

/// Lance `command` et attend sa fin
///
/// stdout et stderr sont capturés (stdout journalisé en debug). Le processus
/// est tué si `cancel` est déclenché ou si le futur est abandonné.
pub async fn run(mut command: Command, cancel: &CancelToken, label: &str) -> Result<(), ToolError> {
    let program = command
        .as_std()
        .get_program()
        .to_string_lossy()
        .into_owned();

    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    debug!(tool = label, command = ?command.as_std(), "Starting external tool");

    let child = command.spawn().map_err(|source| ToolError::Spawn {
        program: program.clone(),
        source,
    })?;

    let output = tokio::select! {
        output = child.wait_with_output() => output?,
        _ = cancel.cancelled() => {
            debug!(tool = label, "Cancelled, killing child process");
            return Err(ToolError::Cancelled { program });
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout);
    if !stdout.trim().is_empty() {
        debug!(tool = label, "{}", stdout.trim_end());
    }

    if !output.status.success() {
        return Err(ToolError::ExitStatus {
            program,
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(())
}
