use std::path::{Path, PathBuf};

/// Resolve the directory that holds `.wakey/`.
///
/// Priority:
/// 1. `--root` flag / `WAKEY_ROOT` env var (passed in as `explicit`)
/// 2. The user's home directory
/// 3. The current directory
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }
    if let Some(home) = home::home_dir() {
        return home;
    }
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}
