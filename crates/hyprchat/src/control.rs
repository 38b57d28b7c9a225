use std::env;
use std::path::PathBuf;
use strum::{Display as StrumDisplay, EnumString};

const SOCKET_NAME: &str = "chatwheel.sock";

/// Line commands accepted on the daemon's control socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, StrumDisplay)]
#[strum(serialize_all = "lowercase")]
pub enum ControlCommand {
    Show,
    Hide,
}

pub fn socket_path() -> PathBuf {
    env::var_os("XDG_RUNTIME_DIR")
        .map(PathBuf::from)
        .filter(|dir| dir.is_dir())
        .unwrap_or_else(env::temp_dir)
        .join(SOCKET_NAME)
}
