use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProcessControlError {
    #[error("cannot run {command}: {message}")]
    Command { command: String, message: String },

    #[error("{process} is still running after a forced termination")]
    StillRunning { process: String },

    #[error("cannot launch {process}: {message}")]
    Launch { process: String, message: String },
}

/// Lifecycle hooks of the target application.
pub trait ProcessController: Send + Sync {
    fn is_running(&self) -> Result<bool, ProcessControlError>;

    fn request_quit(&self) -> Result<(), ProcessControlError>;

    fn force_terminate(&self) -> Result<(), ProcessControlError>;

    fn launch(&self) -> Result<(), ProcessControlError>;

    fn process_name(&self) -> &str;
}
