pub mod control;
pub mod inject;
pub mod keys;
mod macros;
pub mod wm;
