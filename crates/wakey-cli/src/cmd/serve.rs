use anyhow::Result;
use std::path::Path;
use wakey_core::config::Config;

/// Run the scheduler and HTTP API until Ctrl-C.
pub fn run(root: &Path, port: Option<u16>) -> Result<()> {
    let port = match port {
        Some(p) => p,
        None => Config::load(root)?.server.port,
    };
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(wakey_server::serve(root.to_path_buf(), port))
}
