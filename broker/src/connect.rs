use std::path::PathBuf;
use std::process::ExitStatus;

use tracing::info;

use crate::error::BrokerError;

/// Launches the remote shell after the interactive browser has exited and
/// the terminal has been restored. Stdio is inherited so the session runs
/// in the operator's terminal; the child's exit status becomes ours.
pub enum Connector {
    Tsh { tsh: PathBuf },
    /// Demo mode: a plain `ssh` to the configured target, ignoring the
    /// selected hostname.
    Ssh { ssh: PathBuf, target: String },
}

impl Connector {
    pub fn run(&self, hostname: &str) -> Result<ExitStatus, BrokerError> {
        let (program, args) = match self {
            Connector::Tsh { tsh } => (tsh.clone(), vec!["ssh".to_string(), hostname.to_string()]),
            Connector::Ssh { ssh, target } => (ssh.clone(), vec![target.clone()]),
        };
        info!(program = %program.display(), ?args, "launching remote shell");

        std::process::Command::new(&program)
            .args(&args)
            .status()
            .map_err(|err| BrokerError::CommandFailed {
                command: format!("{} {}", program.display(), args.join(" ")),
                message: err.to_string(),
            })
    }
}
