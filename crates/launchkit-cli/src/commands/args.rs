//! Argument-vector building
//!
//! Turns a declarative [`Launch`] into the concrete command line and
//! environment of the process to spawn:
//!
//! ```text
//! <program> [vm options..] [-f <feature file>] -p <id> [-D k=v ..] [-V k=v ..]
//! ```

use std::collections::HashMap;
use std::path::Path;

use launchkit_config::Launch;
use launchkit_process::ProcessConfig;

/// Build the process configuration for one launch.
///
/// `shared_env` applies to every launch; the launch's own environment
/// variables override it. The launch's working directory, when declared, wins
/// over the supervisor-wide `work_dir`.
pub fn build_process_config(
    launch: &Launch,
    shared_env: &HashMap<String, String>,
    work_dir: &Path,
) -> ProcessConfig {
    let mut config = ProcessConfig::new(&launch.program);

    for vm_option in &launch.launcher_arguments.vm_options {
        if !vm_option.is_empty() {
            config = config.arg(vm_option);
        }
    }

    if let Some(feature_file) = &launch.feature_file {
        config = config.arg("-f").arg(feature_file.display().to_string());
    }

    config = config.arg("-p").arg(&launch.id);

    for (key, value) in &launch.launcher_arguments.framework_properties {
        config = config.arg("-D").arg(format!("{key}={value}"));
    }
    for (key, value) in &launch.launcher_arguments.variables {
        config = config.arg("-V").arg(format!("{key}={value}"));
    }

    let dir = launch.working_directory.as_deref().unwrap_or(work_dir);
    config
        .working_dir(dir)
        .envs(shared_env)
        .envs(&launch.environment_variables)
}
