use std::f64::consts::PI;

pub mod model;
pub mod view;

pub use model::{CursorAction, Menu, State, Wedge, slice_at};
pub use view::draw;

pub const SLOT_COUNT: usize = 8;
pub const ANGLE_STEP: f64 = 2.0 * PI / SLOT_COUNT as f64;
pub const START_OFFSET: f64 = -PI / 2.0; // slice 0 starts at 12 o'clock
pub const LABEL_RADIUS_FACTOR: f64 = 0.6;
pub const LABEL_FONT_SIZE: f64 = 13.0;
pub const BORDER_WIDTH: f64 = 2.0;
