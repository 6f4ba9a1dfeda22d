//! Supervisor teardown on termination signals
//!
//! CI pipelines kill the supervisor with SIGTERM, not Ctrl-C. The safety net
//! has to fire for those too and force-kill every registered launch before
//! the supervisor exits.

#![cfg(unix)]

use std::os::unix::process::ExitStatusExt;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use tempfile::TempDir;

fn pid_is_alive(pid: u32) -> bool {
    use nix::sys::signal::kill;
    use nix::unistd::Pid;
    kill(Pid::from_raw(pid as i32), None).is_ok()
}

#[test]
fn test_sigterm_to_supervisor_kills_registered_launches() {
    let dir = TempDir::new().unwrap();
    let pid_file = dir.path().join("ready.pid");
    let config_path = dir.path().join("launchkit.toml");
    let work_dir = dir.path().join("work");

    // The first launch becomes ready and gets registered; the second never
    // prints its marker, so the supervisor sits in the readiness wait when
    // the signal arrives.
    let config = format!(
        r#"
[[launches]]
id = "ready"
program = "sh"
startup_marker = "READY"
start_timeout_seconds = 10

[launches.launcher_arguments]
vm_options = ["-c", "echo $$ > {pid_file}; echo READY >&2; exec sleep 60", "svc"]

[[launches]]
id = "never-ready"
program = "sh"
startup_marker = "READY"
start_timeout_seconds = 30

[launches.launcher_arguments]
vm_options = ["-c", "exec sleep 30", "svc"]
"#,
        pid_file = pid_file.display()
    );
    std::fs::write(&config_path, config).unwrap();

    let mut supervisor = Command::new(env!("CARGO_BIN_EXE_launchkit"))
        .arg("--config")
        .arg(&config_path)
        .arg("--work-dir")
        .arg(&work_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    // Wait for the first launch to come up and get registered
    let deadline = Instant::now() + Duration::from_secs(10);
    let service_pid: u32 = loop {
        if let Ok(content) = std::fs::read_to_string(&pid_file) {
            if let Ok(pid) = content.trim().parse() {
                break pid;
            }
        }
        assert!(Instant::now() < deadline, "first launch never came up");
        std::thread::sleep(Duration::from_millis(100));
    };
    // Registration happens right after the marker line
    std::thread::sleep(Duration::from_millis(500));

    {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;
        kill(Pid::from_raw(supervisor.id() as i32), Signal::SIGTERM).unwrap();
    }

    let deadline = Instant::now() + Duration::from_secs(10);
    let status = loop {
        if let Some(status) = supervisor.try_wait().unwrap() {
            break status;
        }
        assert!(Instant::now() < deadline, "supervisor ignored SIGTERM");
        std::thread::sleep(Duration::from_millis(100));
    };
    // Exit through the interrupt hook, not the default signal disposition
    assert_eq!(status.code(), Some(130), "signal: {:?}", status.signal());

    // The registered service must not outlive the supervisor
    let deadline = Instant::now() + Duration::from_secs(5);
    while pid_is_alive(service_pid) {
        assert!(
            Instant::now() < deadline,
            "registered launch {service_pid} outlived the supervisor"
        );
        std::thread::sleep(Duration::from_millis(50));
    }
}
