use crate::config::{ChatMessage, Config, ConfigError};
use crate::gui::menu::{ANGLE_STEP, LABEL_RADIUS_FACTOR, SLOT_COUNT, START_OFFSET};
use hyprchat::wm::Point;

/// Index of the slice under `cursor`, or `None` inside the dead zone or outside the wheel.
///
/// Slice 0 starts at the top and indices run clockwise, each covering `360 / count` degrees.
pub fn slice_at(
    center: Point,
    cursor: Point,
    count: usize,
    dead_zone: f64,
    outer_radius: f64,
) -> Option<usize> {
    if count == 0 {
        return None;
    }

    let (dx, dy) = (cursor.x - center.x, cursor.y - center.y);
    let dist = dx.hypot(dy);
    if dist <= dead_zone || dist >= outer_radius {
        return None;
    }

    // screen y grows downwards, so atan2 already runs clockwise
    let angle = (dy.atan2(dx).to_degrees() + 90.0).rem_euclid(360.0);
    let idx = (angle / (360.0 / count as f64)) as usize;
    Some(idx.min(count - 1))
}

#[derive(Debug, Clone, PartialEq)]
pub struct Menu([ChatMessage; SLOT_COUNT]);

impl Menu {
    pub fn new(messages: [ChatMessage; SLOT_COUNT]) -> Self {
        Self(messages)
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let messages: [ChatMessage; SLOT_COUNT] = config
            .messages
            .clone()
            .try_into()
            .map_err(|v: Vec<ChatMessage>| ConfigError::MessageCount(v.len()))?;
        Ok(Self(messages))
    }

    pub fn get(&self, index: usize) -> Option<&ChatMessage> {
        self.0.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChatMessage> {
        self.0.iter()
    }
}

/// Angular span of one slice in radians, in cairo's (clockwise) convention.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wedge {
    pub start: f64,
    pub end: f64,
}

impl Wedge {
    pub fn new(index: usize) -> Self {
        let start = START_OFFSET + index as f64 * ANGLE_STEP;
        Self {
            start,
            end: start + ANGLE_STEP,
        }
    }

    pub fn mid(&self) -> f64 {
        (self.start + self.end) / 2.0
    }

    pub fn label_position(&self, center: Point, radius: f64) -> Point {
        let r = radius * LABEL_RADIUS_FACTOR;
        Point::new(
            center.x + r * self.mid().cos(),
            center.y + r * self.mid().sin(),
        )
    }
}

pub struct State {
    pub menu: Menu,
    pub center: Point,
    pub hover_index: Option<usize>,
    pub visible: bool,
    pub radius: f64,
    pub dead_zone: f64,
}

impl State {
    pub fn new(menu: Menu, radius: f64, dead_zone: f64) -> Self {
        Self {
            menu,
            center: Point::default(),
            hover_index: None,
            visible: false,
            radius,
            dead_zone,
        }
    }

    pub fn open(&mut self, center: Point) {
        self.center = center;
        self.hover_index = None;
        self.visible = true;
    }

    /// Hides the wheel and hands back whatever was selected.
    pub fn close(&mut self) -> Option<usize> {
        self.visible = false;
        self.hover_index.take()
    }

    pub fn update_cursor(&mut self, cursor: Point) -> CursorAction {
        let new_idx = slice_at(
            self.center,
            cursor,
            SLOT_COUNT,
            self.dead_zone,
            self.radius,
        );
        let changed = self.hover_index != new_idx;
        self.hover_index = new_idx;
        CursorAction::new(changed)
    }

    pub fn hovered_message(&self) -> Option<&ChatMessage> {
        self.hover_index.and_then(|i| self.menu.get(i))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CursorAction {
    pub should_redraw: bool,
}

impl CursorAction {
    pub fn new(should_redraw: bool) -> Self {
        Self { should_redraw }
    }
}
