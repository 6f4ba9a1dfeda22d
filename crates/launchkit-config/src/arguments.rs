//! Additional arguments passed to the launched program

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Extra arguments forwarded to the launcher command line.
///
/// Ordered maps keep the generated argument vector deterministic.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LauncherArguments {
    /// VM options inserted right after the program, before any launcher flags
    #[serde(default)]
    pub vm_options: Vec<String>,
    /// Framework properties, each passed as `-D key=value`
    #[serde(default)]
    pub framework_properties: BTreeMap<String, String>,
    /// Free-form variables, each passed as `-V key=value`
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
}

impl LauncherArguments {
    /// True when no extra arguments were declared
    pub fn is_empty(&self) -> bool {
        self.vm_options.is_empty()
            && self.framework_properties.is_empty()
            && self.variables.is_empty()
    }
}
