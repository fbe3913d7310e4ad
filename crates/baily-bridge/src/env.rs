//! Runtime-mode flag handling.
//!
//! The embedded server builds assets differently per mode; the bridge
//! refuses to start unless the mode is `test`. The flag is read here once by
//! the surrounding glue and passed into the bridge explicitly — the bridge
//! itself never touches the process environment.

/// Environment variable carrying the runtime mode.
pub const RUNTIME_MODE_VAR: &str = "NODE_ENV";

/// The mode required for test-runner builds.
pub const RUNTIME_MODE_TEST: &str = "test";

/// Read the runtime mode from the process environment.
///
/// Returns `None` when the variable is unset or not valid Unicode.
#[must_use]
pub fn runtime_mode() -> Option<String> {
    std::env::var(RUNTIME_MODE_VAR).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_runtime_mode_reads_the_flag() {
        std::env::set_var(RUNTIME_MODE_VAR, "test");
        assert_eq!(runtime_mode().as_deref(), Some("test"));

        std::env::remove_var(RUNTIME_MODE_VAR);
        assert_eq!(runtime_mode(), None);
    }
}
