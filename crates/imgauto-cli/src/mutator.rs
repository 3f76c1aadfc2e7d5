//! Mutators available from the command line.

use std::io::{self, ErrorKind};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use imgauto_core::{Error, ImagePolicy, Mutator, Result, UpdateResult};
use tokio::io::AsyncWriteExt;
use tokio::process::{ChildStdin, Command};
use tracing::debug;

/// Applies image policies by running an external command, or not at all.
#[derive(Debug, Clone)]
pub enum CliMutator {
    /// Leave the working copy untouched.
    Noop,
    /// Run a program with fixed arguments; the manifests directory is
    /// appended as the last argument.
    Command {
        program: String,
        args: Vec<String>,
        /// The program is killed once this elapses.
        timeout: Duration,
    },
}

impl CliMutator {
    /// Build a mutator from a `--mutator` command line.
    ///
    /// # Errors
    /// Returns error if the command line is blank.
    pub fn from_command_line(command: Option<&str>, timeout: Duration) -> Result<Self> {
        let Some(command) = command else {
            return Ok(Self::Noop);
        };
        let mut words = command.split_whitespace().map(String::from);
        let program = words
            .next()
            .ok_or_else(|| Error::Mutation("mutator command is empty".into()))?;
        Ok(Self::Command {
            program,
            args: words.collect(),
            timeout,
        })
    }
}

impl Mutator for CliMutator {
    async fn apply_setters(&self, root: &Path, policies: &[ImagePolicy]) -> Result<UpdateResult> {
        let Self::Command {
            program,
            args,
            timeout,
        } = self
        else {
            return Ok(UpdateResult::default());
        };

        debug!(program, root = %root.display(), policies = policies.len(), "running mutator");
        let mut child = Command::new(program)
            .args(args)
            .arg(root)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::Mutation(format!("failed to start {program}: {e}")))?;

        // stdin is fed while stdout and stderr are drained
        let input = serde_json::to_vec(policies)?;
        let writer = tokio::spawn(write_input(child.stdin.take(), input));

        let output = tokio::time::timeout(*timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                Error::Mutation(format!(
                    "{program} did not finish within {}",
                    humantime::format_duration(*timeout)
                ))
            })??;
        writer.await.map_err(io::Error::other)??;

        if !output.status.success() {
            return Err(Error::Mutation(format!(
                "{program} exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        if stdout.trim().is_empty() {
            return Ok(UpdateResult::default());
        }
        serde_json::from_str(&stdout)
            .map_err(|e| Error::Mutation(format!("{program} printed an invalid update result: {e}")))
    }
}

/// Write `input` and close stdin. A mutator that exits without reading its
/// input is not an error.
async fn write_input(stdin: Option<ChildStdin>, input: Vec<u8>) -> io::Result<()> {
    let Some(mut stdin) = stdin else {
        return Ok(());
    };
    match stdin.write_all(&input).await {
        Err(e) if e.kind() != ErrorKind::BrokenPipe => Err(e),
        _ => Ok(()),
    }
}
