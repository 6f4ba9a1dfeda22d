//! End-to-end launch lifecycle scenarios
//!
//! Drives the full start/readiness/stop flow with real shell processes that
//! stand in for launched services: they print their startup marker on stderr
//! (or don't) and then idle until they are stopped.

#![cfg(unix)]

use std::collections::HashMap;
use std::time::{Duration, Instant};

use launchkit_cli::commands::{start_launches, stop_launches};
use launchkit_config::{Launch, LaunchSet, LauncherArguments};
use launchkit_process::{ProcessError, ProcessTracker, TerminationStrategy};
use serial_test::serial;
use tempfile::TempDir;

/// A launch whose "service" is an inline shell script.
///
/// The script ends up as `sh -c <script> <name> -p <id>`; the trailing
/// launcher flags land in the script's positional parameters and are ignored.
fn script_launch(id: &str, script: &str, marker: &str, timeout_secs: u64) -> Launch {
    Launch {
        id: id.to_string(),
        skip: false,
        program: "sh".to_string(),
        feature_file: None,
        startup_marker: marker.to_string(),
        start_timeout_seconds: timeout_secs,
        launcher_arguments: LauncherArguments {
            vm_options: vec!["-c".to_string(), script.to_string(), "svc".to_string()],
            ..Default::default()
        },
        environment_variables: HashMap::new(),
        working_directory: None,
    }
}

fn launch_set(launches: Vec<Launch>) -> LaunchSet {
    LaunchSet {
        environment_variables: HashMap::new(),
        launches,
    }
}

fn test_tracker() -> ProcessTracker {
    ProcessTracker::new(TerminationStrategy::for_host().with_grace_period(Duration::from_secs(5)))
}

fn pid_is_alive(pid: u32) -> bool {
    use nix::sys::signal::kill;
    use nix::unistd::Pid;
    kill(Pid::from_raw(pid as i32), None).is_ok()
}

/// Poll until the pid is gone; killed processes need a moment to be reaped.
fn wait_until_dead(pid: u32) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while pid_is_alive(pid) {
        assert!(Instant::now() < deadline, "process {pid} did not die");
        std::thread::sleep(Duration::from_millis(50));
    }
}

#[tokio::test]
#[serial]
async fn test_launch_becomes_ready_and_is_tracked() {
    let work_dir = TempDir::new().unwrap();
    let tracker = test_tracker();
    let set = launch_set(vec![script_launch(
        "svc-1",
        "echo starting >&2; sleep 1; echo READY >&2; exec sleep 60",
        "READY",
        5,
    )]);

    let start = Instant::now();
    start_launches(&set, work_dir.path(), &tracker).await.unwrap();

    // Readiness resolved at roughly the time the marker was printed
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(900));
    assert!(elapsed < Duration::from_secs(4));

    assert!(tracker.is_tracked("svc-1"));
    let pid = tracker.pid_of("svc-1").unwrap();
    assert!(pid_is_alive(pid));

    stop_launches(&set.launches, &tracker).await.unwrap();
    assert!(!tracker.is_tracked("svc-1"));
    wait_until_dead(pid);
}

#[tokio::test]
#[serial]
async fn test_launch_that_never_signals_readiness_times_out() {
    let work_dir = TempDir::new().unwrap();
    let pid_file = work_dir.path().join("svc-2.pid");
    let tracker = test_tracker();
    let set = launch_set(vec![script_launch(
        "svc-2",
        &format!("echo $$ > {}; echo starting >&2; exec sleep 60", pid_file.display()),
        "READY",
        2,
    )]);

    let start = Instant::now();
    let err = start_launches(&set, work_dir.path(), &tracker)
        .await
        .unwrap_err();

    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(2));
    assert!(elapsed < Duration::from_secs(10));

    match err.downcast_ref::<ProcessError>() {
        Some(ProcessError::StartTimeout { id, seconds }) => {
            assert_eq!(id, "svc-2");
            assert_eq!(*seconds, 2);
        }
        other => panic!("expected StartTimeout, got {other:?}"),
    }

    // The launch was never registered and its process was terminated
    assert!(!tracker.is_tracked("svc-2"));
    let pid: u32 = std::fs::read_to_string(&pid_file)
        .unwrap()
        .trim()
        .parse()
        .unwrap();
    wait_until_dead(pid);
}

#[tokio::test]
#[serial]
async fn test_service_survives_logging_after_readiness() {
    let work_dir = TempDir::new().unwrap();
    let tracker = test_tracker();
    // Real services keep writing to stderr long after the startup marker;
    // those writes must not kill the tracked process
    let set = launch_set(vec![script_launch(
        "chatty",
        "echo READY >&2; sleep 1; echo still here >&2; exec sleep 60",
        "READY",
        5,
    )]);

    start_launches(&set, work_dir.path(), &tracker).await.unwrap();
    let pid = tracker.pid_of("chatty").unwrap();

    // Well past the post-start write
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(pid_is_alive(pid), "service died after logging post-startup");
    assert!(tracker.is_tracked("chatty"));

    stop_launches(&set.launches, &tracker).await.unwrap();
    wait_until_dead(pid);
}

#[tokio::test]
#[serial]
async fn test_stopping_twice_is_safe() {
    let work_dir = TempDir::new().unwrap();
    let tracker = test_tracker();
    let set = launch_set(vec![script_launch(
        "svc-3",
        "echo READY >&2; exec sleep 60",
        "READY",
        5,
    )]);

    start_launches(&set, work_dir.path(), &tracker).await.unwrap();
    let pid = tracker.pid_of("svc-3").unwrap();

    stop_launches(&set.launches, &tracker).await.unwrap();
    wait_until_dead(pid);

    // Second stop pass only logs a warning
    stop_launches(&set.launches, &tracker).await.unwrap();
    assert!(!tracker.is_tracked("svc-3"));
}

#[tokio::test]
#[serial]
async fn test_launches_start_in_order_and_stop_independently() {
    let work_dir = TempDir::new().unwrap();
    let tracker = test_tracker();
    let set = launch_set(vec![
        script_launch("first", "echo READY >&2; exec sleep 60", "READY", 5),
        script_launch("second", "echo READY >&2; exec sleep 60", "READY", 5),
    ]);

    start_launches(&set, work_dir.path(), &tracker).await.unwrap();
    assert!(tracker.is_tracked("first"));
    assert!(tracker.is_tracked("second"));

    let second_pid = tracker.pid_of("second").unwrap();
    tracker.stop("first").await.unwrap();

    // Stopping one launch leaves the other registered and running
    assert!(!tracker.is_tracked("first"));
    assert!(tracker.is_tracked("second"));
    assert!(pid_is_alive(second_pid));

    tracker.stop("second").await.unwrap();
    wait_until_dead(second_pid);
}

#[tokio::test]
#[serial]
async fn test_skipped_launch_is_bypassed() {
    let work_dir = TempDir::new().unwrap();
    let tracker = test_tracker();
    let mut launch = script_launch("skipped", "exit 1", "READY", 5);
    launch.skip = true;
    // A skipped launch is never spawned, a broken program must not matter
    launch.program = "does-not-exist".to_string();
    let set = launch_set(vec![launch]);

    start_launches(&set, work_dir.path(), &tracker).await.unwrap();
    assert!(!tracker.is_tracked("skipped"));
    stop_launches(&set.launches, &tracker).await.unwrap();
}

#[tokio::test]
#[serial]
async fn test_spawn_failure_aborts_the_run() {
    let work_dir = TempDir::new().unwrap();
    let tracker = test_tracker();
    let mut launch = script_launch("broken", "exit 1", "READY", 5);
    launch.program = "definitely-not-a-real-binary".to_string();
    let set = launch_set(vec![launch]);

    let err = start_launches(&set, work_dir.path(), &tracker)
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ProcessError>(),
        Some(ProcessError::SpawnFailed(_))
    ));
    assert!(!tracker.is_tracked("broken"));
}
