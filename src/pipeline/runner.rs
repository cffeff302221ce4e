//! Best-effort execution of written notebooks.

use crate::config::RunnerSettings;
use std::path::Path;
use std::process::{Command, Stdio};

/// Launches an external program on a written artifact.
#[cfg_attr(test, mockall::automock)]
pub trait NotebookRunner {
    /// Start execution of the notebook at `path`. Returns once the process is
    /// launched; its outcome is not observed.
    fn run(&self, path: &Path) -> std::io::Result<()>;
}

/// Runs a configured command, e.g.
/// `jupyter nbconvert --to notebook --inplace --execute <path>`.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    program: String,
    args: Vec<String>,
}

impl CommandRunner {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn from_settings(settings: &RunnerSettings) -> Self {
        Self::new(settings.command.clone(), settings.args.clone())
    }

    pub fn command_line(&self, path: &Path) -> Vec<String> {
        let mut line = Vec::with_capacity(self.args.len() + 2);
        line.push(self.program.clone());
        line.extend(self.args.iter().cloned());
        line.push(path.display().to_string());
        line
    }
}

impl Default for CommandRunner {
    fn default() -> Self {
        Self::from_settings(&RunnerSettings::default())
    }
}

impl NotebookRunner for CommandRunner {
    fn run(&self, path: &Path) -> std::io::Result<()> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        tracing::info!("Started {} (pid {}) on {:?}", self.program, child.id(), path);

        // Reap the process in the background so it does not linger as a zombie.
        let program = self.program.clone();
        std::thread::spawn(move || match child.wait() {
            Ok(status) if status.success() => tracing::debug!("{} finished", program),
            Ok(status) => tracing::warn!("{} exited with {}", program, status),
            Err(e) => tracing::warn!("Failed to wait for {}: {}", program, e),
        });
        Ok(())
    }
}
