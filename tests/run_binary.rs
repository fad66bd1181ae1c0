#[cfg(test)]
mod run_binary {
    use std::process::Command;

    const BIN: &str = env!("CARGO_BIN_EXE_bluechi-monitor");

    #[test]
    fn unreachable_bus_exits_with_error() {
        let output = Command::new(BIN)
            .args(["--address", "unix:path=/nonexistent/bluechi-monitor/bus"])
            .env("XDG_CONFIG_HOME", "/nonexistent")
            .output()
            .expect("failed to execute process");
        assert_eq!(output.status.code(), Some(1));
        assert!(output.stdout.is_empty());
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("Failed to connect to bus"), "stderr: {stderr}");
    }

    #[test]
    fn missing_config_file_exits_with_error() {
        let output = Command::new(BIN)
            .args(["--config", "/nonexistent/bluechi-monitor.toml"])
            .output()
            .expect("failed to execute process");
        assert_eq!(output.status.code(), Some(1));
        assert!(output.stdout.is_empty());
    }

    #[test]
    fn bad_flags_are_rejected() {
        let output = Command::new(BIN)
            .args(["--session", "--address", "unix:path=/tmp/bus"])
            .output()
            .expect("failed to execute process");
        assert!(!output.status.success());
        assert!(output.stdout.is_empty());
    }
}
