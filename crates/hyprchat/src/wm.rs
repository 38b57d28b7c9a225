use derive_more::{AsRef, Deref, Display, From, Into};
use hyprland::data::{Clients, CursorPosition, Monitors};
use hyprland::dispatch::{Dispatch, DispatchType, WindowIdentifier};
use hyprland::error::HyprError;
use hyprland::prelude::*;
use hyprland::shared::Address;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_TARGET_TITLES: &[&str] = &["Warcraft III", "Warcraft III: Reforged"];

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct WindowTitle(String);

crate::impl_string_newtype!(WindowTitle);

impl From<&str> for WindowTitle {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Deref, From, Into, AsRef)]
pub struct MonitorName(String);

crate::impl_string_newtype!(MonitorName);

#[derive(Debug, Error)]
pub enum WmError {
    #[error(transparent)]
    Hypr(#[from] HyprError),
}

/// Locates and raises the window that receives injected keystrokes.
pub trait WindowManager {
    type Target;

    fn find_target(&self, titles: &[WindowTitle]) -> Result<Option<Self::Target>, WmError>;

    fn focus(&self, target: &Self::Target) -> Result<(), WmError>;
}

#[derive(Debug, Clone)]
pub struct ClientWindow {
    pub address: Address,
    pub title: WindowTitle,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Hyprland;

impl WindowManager for Hyprland {
    type Target = ClientWindow;

    fn find_target(&self, titles: &[WindowTitle]) -> Result<Option<ClientWindow>, WmError> {
        let clients = Clients::get()?
            .into_iter()
            .map(|c| (c.title.clone(), c));

        Ok(pick_by_title(titles, clients).map(|c| ClientWindow {
            address: c.address,
            title: WindowTitle(c.title),
        }))
    }

    fn focus(&self, target: &ClientWindow) -> Result<(), WmError> {
        log::debug!("Focusing '{}'", target.title);
        Ok(focus_window(&target.address)?)
    }
}

/// First wanted title (in order) with an exact match among the candidates.
pub fn pick_by_title<T>(
    wanted: &[WindowTitle],
    candidates: impl IntoIterator<Item = (String, T)>,
) -> Option<T> {
    let mut candidates: Vec<(String, T)> = candidates.into_iter().collect();
    let idx = wanted
        .iter()
        .find_map(|w| candidates.iter().position(|(title, _)| title == w.as_str()))?;
    Some(candidates.swap_remove(idx).1)
}

pub fn focus_window(address: &Address) -> Result<(), HyprError> {
    Dispatch::call(DispatchType::FocusWindow(WindowIdentifier::Address(
        address.clone(),
    )))
}

pub fn get_active_monitor() -> Option<MonitorName> {
    Monitors::get()
        .ok()?
        .into_iter()
        .find(|m| m.focused)
        .map(|m| MonitorName(m.name))
}

pub fn get_cursor_pos_on_active_monitor() -> Option<Point> {
    let cursor = CursorPosition::get().ok()?;
    let monitors = Monitors::get().ok()?;
    let focused = monitors.into_iter().find(|m| m.focused)?;

    let x = cursor.x as f64 - focused.x as f64;
    let y = cursor.y as f64 - focused.y as f64;

    Some(Point::new(x, y))
}
