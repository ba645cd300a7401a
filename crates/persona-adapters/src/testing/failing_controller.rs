use persona_core::{ProcessControlError, ProcessController};

/// Application that cannot be stopped, or cannot be launched.
pub struct FailingProcessController {
    survives_termination: bool,
    launch_error: Option<ProcessControlError>,
}

impl FailingProcessController {
    pub fn unkillable() -> Self {
        Self {
            survives_termination: true,
            launch_error: None,
        }
    }

    pub fn launch_failure() -> Self {
        Self {
            survives_termination: false,
            launch_error: Some(ProcessControlError::Launch {
                process: "Failing".to_string(),
                message: "executable not found".to_string(),
            }),
        }
    }
}

impl ProcessController for FailingProcessController {
    fn is_running(&self) -> Result<bool, ProcessControlError> {
        Ok(self.survives_termination)
    }

    fn request_quit(&self) -> Result<(), ProcessControlError> {
        Ok(())
    }

    fn force_terminate(&self) -> Result<(), ProcessControlError> {
        Ok(())
    }

    fn launch(&self) -> Result<(), ProcessControlError> {
        match &self.launch_error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn process_name(&self) -> &str {
        "Failing"
    }
}
