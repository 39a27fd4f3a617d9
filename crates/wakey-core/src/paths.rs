use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = ".wakey/config.yaml";
pub const ALARMS_FILE: &str = ".wakey/alarms.yaml";

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn alarms_path(root: &Path) -> PathBuf {
    root.join(ALARMS_FILE)
}
