use std::path::{Path, PathBuf};

pub const STATE_DIR: &str = ".ayue";
pub const DAEMON_SOCKET: &str = "daemon.sock";

/// Per-project runtime directory, `<root>/.ayue`.
pub fn state_dir(root: &Path) -> PathBuf {
    root.join(STATE_DIR)
}

pub fn socket_path(root: &Path) -> PathBuf {
    state_dir(root).join(DAEMON_SOCKET)
}
