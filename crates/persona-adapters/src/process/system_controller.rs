use std::process::{Command, Output, Stdio};

use persona_core::{ApplicationConfig, ProcessControlError, ProcessController};
use tracing::debug;

/// Drives the target application through the platform's process tools:
/// `pgrep`/`kill` and `open` or `osascript` on macOS, `pgrep`/`kill` and the
/// configured launch command on Linux, `tasklist`/`taskkill` on Windows.
#[derive(Debug, Clone)]
pub struct SystemProcessController {
    process_name: String,
    launch_command: String,
}

impl SystemProcessController {
    pub fn new(process_name: impl Into<String>, launch_command: impl Into<String>) -> Self {
        Self {
            process_name: process_name.into(),
            launch_command: launch_command.into(),
        }
    }

    pub fn from_config(config: &ApplicationConfig) -> Self {
        Self::new(&config.process_name, &config.launch_command)
    }

    #[cfg(not(windows))]
    fn matching_pids(&self) -> Result<Vec<String>, ProcessControlError> {
        let output = run("pgrep", &["-f", &self.process_name])?;
        let own_pid = std::process::id().to_string();

        Ok(String::from_utf8_lossy(&output.stdout)
            .split_whitespace()
            .filter(|pid| *pid != own_pid)
            .map(String::from)
            .collect())
    }

    #[cfg(not(windows))]
    fn signal(&self, signal: &str) -> Result<(), ProcessControlError> {
        let pids = self.matching_pids()?;
        if pids.is_empty() {
            return Ok(());
        }

        let mut arguments = vec![signal];
        arguments.extend(pids.iter().map(String::as_str));
        run("kill", &arguments)?;
        Ok(())
    }

    #[cfg(windows)]
    fn image_name(&self) -> String {
        if self.process_name.to_lowercase().ends_with(".exe") {
            self.process_name.clone()
        } else {
            format!("{}.exe", self.process_name)
        }
    }
}

impl ProcessController for SystemProcessController {
    #[cfg(not(windows))]
    fn is_running(&self) -> Result<bool, ProcessControlError> {
        Ok(!self.matching_pids()?.is_empty())
    }

    #[cfg(windows)]
    fn is_running(&self) -> Result<bool, ProcessControlError> {
        let image = self.image_name();
        let filter = format!("IMAGENAME eq {}", image);
        let output = run("tasklist", &["/FI", &filter, "/NH"])?;
        Ok(String::from_utf8_lossy(&output.stdout)
            .to_lowercase()
            .contains(&image.to_lowercase()))
    }

    #[cfg(target_os = "macos")]
    fn request_quit(&self) -> Result<(), ProcessControlError> {
        let script = format!("quit app \"{}\"", self.process_name);
        run("osascript", &["-e", &script])?;
        Ok(())
    }

    #[cfg(all(unix, not(target_os = "macos")))]
    fn request_quit(&self) -> Result<(), ProcessControlError> {
        self.signal("-TERM")
    }

    #[cfg(windows)]
    fn request_quit(&self) -> Result<(), ProcessControlError> {
        run("taskkill", &["/IM", &self.image_name()])?;
        Ok(())
    }

    #[cfg(not(windows))]
    fn force_terminate(&self) -> Result<(), ProcessControlError> {
        self.signal("-9")
    }

    #[cfg(windows)]
    fn force_terminate(&self) -> Result<(), ProcessControlError> {
        run("taskkill", &["/F", "/IM", &self.image_name()])?;
        Ok(())
    }

    #[cfg(target_os = "macos")]
    fn launch(&self) -> Result<(), ProcessControlError> {
        spawn_detached("open", &["-a", &self.process_name], &self.process_name)
    }

    #[cfg(all(unix, not(target_os = "macos")))]
    fn launch(&self) -> Result<(), ProcessControlError> {
        let program = which::which(&self.launch_command).map_err(|error| {
            ProcessControlError::Launch {
                process: self.process_name.clone(),
                message: format!("{} not found: {}", self.launch_command, error),
            }
        })?;
        let program = program.to_string_lossy().into_owned();
        spawn_detached(&program, &[], &self.process_name)
    }

    #[cfg(windows)]
    fn launch(&self) -> Result<(), ProcessControlError> {
        spawn_detached(
            "cmd",
            &["/C", "start", "", &self.launch_command],
            &self.process_name,
        )
    }

    fn process_name(&self) -> &str {
        &self.process_name
    }
}

/// Runs a command to completion. A non-zero exit is not an error: `pgrep`
/// and `taskkill` use it to report "nothing matched".
fn run(program: &str, arguments: &[&str]) -> Result<Output, ProcessControlError> {
    debug!(program, ?arguments, "running process command");
    Command::new(program)
        .args(arguments)
        .stdin(Stdio::null())
        .output()
        .map_err(|error| ProcessControlError::Command {
            command: program.to_string(),
            message: error.to_string(),
        })
}

fn spawn_detached(
    program: &str,
    arguments: &[&str],
    process_name: &str,
) -> Result<(), ProcessControlError> {
    debug!(program, ?arguments, "launching application");
    detached_command(program, arguments)
        .spawn()
        .map(|_| ())
        .map_err(|error| ProcessControlError::Launch {
            process: process_name.to_string(),
            message: error.to_string(),
        })
}

/// The launched application gets its own process group so that a hangup of
/// persona's terminal does not reach it.
fn detached_command(program: &str, arguments: &[&str]) -> Command {
    let mut command = Command::new(program);
    command
        .args(arguments)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }

    command
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_config_uses_application_settings() {
        let config = ApplicationConfig::default();

        let controller = SystemProcessController::from_config(&config);

        assert_eq!(controller.process_name(), "Cursor");
        assert_eq!(controller.launch_command, "cursor");
    }

    #[test]
    fn missing_program_is_a_command_error() {
        let result = run("persona-definitely-missing-binary", &[]);

        assert!(matches!(result, Err(ProcessControlError::Command { .. })));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn detached_command_leads_its_own_process_group() {
        let output = detached_command("sh", &["-c", "cut -d' ' -f1,5 /proc/$$/stat"])
            .stdout(Stdio::piped())
            .output()
            .unwrap();

        let stat = String::from_utf8_lossy(&output.stdout);
        let fields: Vec<&str> = stat.split_whitespace().collect();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0], fields[1]);
    }
}
