mod failing_controller;
mod stub_controller;

pub use failing_controller::FailingProcessController;
pub use stub_controller::{ProcessCall, StubProcessController};
