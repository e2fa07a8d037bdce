use std::time::Duration;

/// Application configuration constants
pub struct AppConfig;

impl AppConfig {
    // Logging
    pub const DEFAULT_LOG_FILTER: &'static str = "bat_observe=info";

    // Polling
    pub const DEFAULT_POLL_ATTEMPTS: u32 = 5;
    pub const DEFAULT_POLL_DELAY_MS: u64 = 2000;

    // Control plane
    pub const DEFAULT_CLI_BINARY: &'static str = "bosh";
    pub const LIST_VMS_ARGS: &'static str = "vms --details";
    pub const CLI_TIMEOUT_SECS: u64 = 600;

    // Secure shell
    pub const DEFAULT_SSH_USER: &'static str = "vcap";
    pub const DEFAULT_SSH_PORT: u16 = 22;
    pub const SSH_CONNECT_TIMEOUT_SECS: u64 = 30;
    pub const SSH_COMMAND_TIMEOUT_SECS: u64 = 300;
    pub const SSH_PRIVATE_KEY_ENV: &'static str = "BAT_VCAP_PRIVATE_KEY";
    pub const SSH_PASSWORD_ENV: &'static str = "BAT_VCAP_PASSWORD";

    // Disks
    pub const PERSISTENT_DISK_MOUNT: &'static str = "/var/vcap/store";
    pub const DF_COMMAND: &'static str = "df -x tmpfs -x devtmpfs -x debugfs -l | tail -n +2";

    // Log bundles
    pub const LOG_BUNDLE_EXTENSION: &'static str = "tgz";
}

/// Bounds for the convergence loops in [`crate::vm::VmObserver`].
///
/// Every attempt completes (including its control-plane round trip) before
/// the delay starts. No delay follows the final attempt. An `attempts` of
/// zero, however it was set, still polls once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            attempts: AppConfig::DEFAULT_POLL_ATTEMPTS,
            delay: Duration::from_millis(AppConfig::DEFAULT_POLL_DELAY_MS),
        }
    }
}

impl PollConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of attempts. Zero is treated as one.
    pub fn attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Back-to-back polling.
    pub fn no_delay(self) -> Self {
        self.delay(Duration::ZERO)
    }
}
