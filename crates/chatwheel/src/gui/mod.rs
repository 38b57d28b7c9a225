pub mod app;
pub mod dialog;
pub mod menu;
pub mod theme;
pub mod window;
