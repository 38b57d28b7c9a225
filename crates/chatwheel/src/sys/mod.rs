pub mod hotkey;
pub mod runtime;
pub mod server;
