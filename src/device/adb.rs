//! ADB device bridge
//!
//! Detects an attached phone with `adb devices` and copies a fixed folder
//! off it with `adb pull`. `adb pull <remote>/ <local>` recreates the last
//! component of the remote path under `<local>`, so a successful pull of
//! `/sdcard/Download/Meta View/` into `PhoneDump` leaves the files in
//! `PhoneDump/Meta View`, which is what the caller gets back.

use crate::core::config::DeviceConfig;
use crate::core::error::DeviceError;
use crate::device::traits::{CommandRunner, CommandStatus};
use log::{debug, info, warn};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

/// Parse `adb devices` output and report whether a device is ready
///
/// Only the last non-empty line is considered. It must have the shape
/// `<serial>\tdevice`; the `List of devices attached` header and states
/// such as `unauthorized` or `offline` do not count.
pub fn parse_device_list(stdout: &str) -> bool {
    let Some(last) = stdout.lines().map(str::trim).filter(|l| !l.is_empty()).last() else {
        return false;
    };

    let mut fields = last.split_whitespace();
    match (fields.next(), fields.next()) {
        (Some(_serial), Some(state)) => state == "device",
        _ => false,
    }
}

/// Talks to a phone through `adb`
#[derive(Debug, Clone)]
pub struct DeviceBridge<R: CommandRunner> {
    runner: R,
    adb_path: String,
    remote_path: String,
    local_dir: PathBuf,
    pull_timeout: Duration,
    detect_timeout: Duration,
}

impl<R: CommandRunner> DeviceBridge<R> {
    pub fn new(runner: R, config: &DeviceConfig) -> Self {
        Self {
            runner,
            adb_path: config.adb_path.clone(),
            remote_path: config.remote_path.clone(),
            local_dir: config.effective_local_dir(),
            pull_timeout: Duration::from_secs(config.pull_timeout_secs),
            detect_timeout: Duration::from_secs(config.detect_timeout_secs),
        }
    }

    /// Override the staging directory
    pub fn with_local_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.local_dir = dir.into();
        self
    }

    /// Staging directory handed to `adb pull`
    pub fn local_dir(&self) -> &PathBuf {
        &self.local_dir
    }

    /// Folder the pulled files end up in
    pub fn pulled_folder(&self) -> PathBuf {
        let name = self
            .remote_path
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default();
        self.local_dir.join(name)
    }

    /// Check that exactly the kind of output a connected device produces
    /// comes back from `adb devices`
    pub fn detect_device(&self) -> Result<(), DeviceError> {
        let output = self
            .runner
            .run(&self.adb_path, &["devices"], self.detect_timeout)
            .map_err(|e| self.tool_unavailable(e))?;

        if !output.success() {
            warn!("adb devices ended with {:?}", output.status);
            return Err(DeviceError::NoDevice);
        }

        if parse_device_list(&output.stdout) {
            debug!("Device detected");
            Ok(())
        } else {
            debug!("No device in adb output: {:?}", output.stdout);
            Err(DeviceError::NoDevice)
        }
    }

    /// `detect_device` for callers that only need a yes/no; the reason is
    /// emitted as a log line
    pub fn is_device_connected<F: FnMut(String)>(&self, mut emit: F) -> bool {
        match self.detect_device() {
            Ok(()) => true,
            Err(e) => {
                emit(format!("❌ {}", e));
                false
            }
        }
    }

    /// Pull the remote folder and return where its files landed
    pub fn pull_from_device<F: FnMut(String)>(&self, mut emit: F) -> Result<PathBuf, DeviceError> {
        self.detect_device()?;

        fs::create_dir_all(&self.local_dir).map_err(|e| DeviceError::Io {
            path: self.local_dir.clone(),
            message: e.to_string(),
        })?;

        emit("📱 Pulling files from phone...".to_string());
        info!(
            "Pulling {} into {}",
            self.remote_path,
            self.local_dir.display()
        );

        let local = self.local_dir.to_string_lossy();
        let output = self
            .runner
            .run(
                &self.adb_path,
                &["pull", self.remote_path.as_str(), &*local],
                self.pull_timeout,
            )
            .map_err(|e| self.tool_unavailable(e))?;

        match output.status {
            CommandStatus::Exited(Some(0)) => {
                emit(format!(
                    "✅ Pull complete. Files saved to: {}",
                    self.local_dir.display()
                ));
                Ok(self.pulled_folder())
            }
            CommandStatus::TimedOut => {
                warn!("adb pull timed out after {:?}", self.pull_timeout);
                Err(DeviceError::PullTimedOut(self.pull_timeout.as_secs()))
            }
            CommandStatus::Exited(code) => {
                let reason = output.stderr_tail().map(str::to_string);
                warn!("adb pull failed with exit code {:?}: {:?}", code, reason);
                Err(DeviceError::PullFailed { code, reason })
            }
        }
    }

    fn tool_unavailable(&self, err: io::Error) -> DeviceError {
        warn!("Could not start {}: {}", self.adb_path, err);
        DeviceError::ToolUnavailable {
            program: self.adb_path.clone(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::mock::ScriptedRunner;
    use crate::device::traits::CommandOutput;
    use tempfile::TempDir;

    const ATTACHED: &str = "List of devices attached\nR58M12ABCDE\tdevice\n\n";

    fn bridge(runner: ScriptedRunner, temp: &TempDir) -> DeviceBridge<ScriptedRunner> {
        DeviceBridge::new(runner, &DeviceConfig::default())
            .with_local_dir(temp.path().join("PhoneDump"))
    }

    #[test]
    fn test_parse_device_list() {
        assert!(parse_device_list(ATTACHED));
        assert!(parse_device_list("emulator-5554 device product:sdk model:x"));
        assert!(!parse_device_list("List of devices attached\n\n"));
        assert!(!parse_device_list("List of devices attached\nR58M12ABCDE\tunauthorized\n"));
        assert!(!parse_device_list("List of devices attached\nR58M12ABCDE\toffline\n"));
        assert!(!parse_device_list(""));
    }

    #[test]
    fn test_pulled_folder_uses_last_remote_component() {
        let temp = TempDir::new().unwrap();
        let bridge = bridge(ScriptedRunner::new(), &temp);
        assert_eq!(
            bridge.pulled_folder(),
            temp.path().join("PhoneDump").join("Meta View")
        );
    }

    #[test]
    fn test_no_device_reports_and_skips_pull() {
        let temp = TempDir::new().unwrap();
        let runner = ScriptedRunner::new()
            .push_output(CommandOutput::exited(0, "List of devices attached\n\n"));
        let bridge = bridge(runner.clone(), &temp);

        let mut lines = Vec::new();
        assert!(!bridge.is_device_connected(|l| lines.push(l)));
        assert_eq!(
            lines,
            vec!["❌ No ADB device found. Check connection and USB Debugging.".to_string()]
        );

        let runner = ScriptedRunner::new()
            .push_output(CommandOutput::exited(0, "List of devices attached\n"));
        let bridge = DeviceBridge::new(runner.clone(), &DeviceConfig::default())
            .with_local_dir(temp.path().join("PhoneDump"));
        let err = bridge.pull_from_device(|_| {}).unwrap_err();
        assert_eq!(err, DeviceError::NoDevice);
        assert_eq!(runner.calls().len(), 1);
    }

    #[test]
    fn test_missing_adb_is_tool_unavailable() {
        let temp = TempDir::new().unwrap();
        let runner = ScriptedRunner::new().push_spawn_error(io::ErrorKind::NotFound);
        let bridge = bridge(runner, &temp);

        let err = bridge.detect_device().unwrap_err();
        assert!(matches!(err, DeviceError::ToolUnavailable { .. }));
    }

    #[test]
    fn test_nonzero_detect_exit_is_no_device() {
        let temp = TempDir::new().unwrap();
        let runner = ScriptedRunner::new().push_output(CommandOutput::exited(1, ATTACHED));
        let bridge = bridge(runner, &temp);
        assert_eq!(bridge.detect_device(), Err(DeviceError::NoDevice));
    }

    #[test]
    fn test_successful_pull() {
        let temp = TempDir::new().unwrap();
        let runner = ScriptedRunner::new()
            .push_output(CommandOutput::exited(0, ATTACHED))
            .push_output(CommandOutput::exited(0, "1 file pulled"));
        let bridge = bridge(runner.clone(), &temp);

        let mut lines = Vec::new();
        let path = bridge.pull_from_device(|l| lines.push(l)).unwrap();

        assert_eq!(path, temp.path().join("PhoneDump").join("Meta View"));
        assert!(temp.path().join("PhoneDump").is_dir());
        assert_eq!(lines[0], "📱 Pulling files from phone...");
        assert!(lines[1].starts_with("✅ Pull complete. Files saved to: "));

        let calls = runner.calls();
        assert_eq!(calls[0].args, vec!["devices"]);
        assert_eq!(calls[1].args[0], "pull");
        assert_eq!(calls[1].args[1], "/sdcard/Download/Meta View/");
        assert_eq!(calls[1].timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_pull_exit_code_one_is_failure() {
        let temp = TempDir::new().unwrap();
        let runner = ScriptedRunner::new()
            .push_output(CommandOutput::exited(0, ATTACHED))
            .push_output(CommandOutput::exited(1, ""));
        let bridge = bridge(runner, &temp);

        let err = bridge.pull_from_device(|_| {}).unwrap_err();
        assert_eq!(
            err,
            DeviceError::PullFailed {
                code: Some(1),
                reason: None
            }
        );
        assert!(err.to_string().contains("pull failed"));
    }

    #[test]
    fn test_pull_failure_carries_adb_error_line() {
        let temp = TempDir::new().unwrap();
        let runner = ScriptedRunner::new()
            .push_output(CommandOutput::exited(0, ATTACHED))
            .push_output(CommandOutput::exited(1, "").with_stderr(
                "adb: error: failed to stat remote object '/sdcard/Download/Meta View/': No such file or directory\n",
            ));
        let bridge = bridge(runner, &temp);

        let err = bridge.pull_from_device(|_| {}).unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("ADB pull failed (exit code 1): adb: error: failed to stat"));
        assert!(message.contains("No such file or directory"));
    }

    #[test]
    fn test_pull_timeout_is_distinct() {
        let temp = TempDir::new().unwrap();
        let runner = ScriptedRunner::new()
            .push_output(CommandOutput::exited(0, ATTACHED))
            .push_output(CommandOutput::timed_out());
        let bridge = bridge(runner, &temp);

        let err = bridge.pull_from_device(|_| {}).unwrap_err();
        assert_eq!(err, DeviceError::PullTimedOut(30));
        assert!(err.to_string().contains("timed out"));
    }
}
