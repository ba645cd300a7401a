mod system_controller;

pub use system_controller::SystemProcessController;
