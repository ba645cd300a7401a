use persona_core::{ProcessControlError, ProcessController};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessCall {
    RequestQuit,
    ForceTerminate,
    Launch,
}

/// In-memory application that records lifecycle calls.
pub struct StubProcessController {
    running: Mutex<bool>,
    quits_gracefully: bool,
    calls: Mutex<Vec<ProcessCall>>,
}

impl StubProcessController {
    pub fn new() -> Self {
        Self::with_state(false, true)
    }

    pub fn running() -> Self {
        Self::with_state(true, true)
    }

    /// Running, ignores quit requests, dies on forced termination.
    pub fn stubborn() -> Self {
        Self::with_state(true, false)
    }

    fn with_state(running: bool, quits_gracefully: bool) -> Self {
        Self {
            running: Mutex::new(running),
            quits_gracefully,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn given_running(&self, running: bool) {
        *self.running.lock().unwrap() = running;
    }

    pub fn calls(&self) -> Vec<ProcessCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn launch_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| **call == ProcessCall::Launch)
            .count()
    }

    fn record(&self, call: ProcessCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Default for StubProcessController {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessController for StubProcessController {
    fn is_running(&self) -> Result<bool, ProcessControlError> {
        Ok(*self.running.lock().unwrap())
    }

    fn request_quit(&self) -> Result<(), ProcessControlError> {
        self.record(ProcessCall::RequestQuit);
        if self.quits_gracefully {
            *self.running.lock().unwrap() = false;
        }
        Ok(())
    }

    fn force_terminate(&self) -> Result<(), ProcessControlError> {
        self.record(ProcessCall::ForceTerminate);
        *self.running.lock().unwrap() = false;
        Ok(())
    }

    fn launch(&self) -> Result<(), ProcessControlError> {
        self.record(ProcessCall::Launch);
        *self.running.lock().unwrap() = true;
        Ok(())
    }

    fn process_name(&self) -> &str {
        "Stub"
    }
}
