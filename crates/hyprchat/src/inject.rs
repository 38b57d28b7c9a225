use crate::keys::{Chord, KeyCode, KeySink, Stroke};
use crate::wm::{WindowManager, WmError};
use std::io;
use std::thread;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InjectError {
    #[error("Character {0:?} cannot be typed on the virtual keyboard")]
    Unmappable(char),
    #[error("Failed to focus target window: {0}")]
    Focus(#[from] WmError),
    #[error("Failed to emit key events: {0}")]
    Io(#[from] io::Error),
}

/// Pauses between the steps of a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delays {
    /// After focusing the target, before opening chat.
    pub focus: Duration,
    /// After opening chat, before typing.
    pub open_chat: Duration,
    /// After typing, before submitting.
    pub submit: Duration,
}

impl Default for Delays {
    fn default() -> Self {
        Self {
            focus: Duration::from_millis(50),
            open_chat: Duration::from_millis(100),
            submit: Duration::from_millis(50),
        }
    }
}

impl Delays {
    pub const NONE: Self = Self {
        focus: Duration::ZERO,
        open_chat: Duration::ZERO,
        submit: Duration::ZERO,
    };
}

/// Resolves every character up front so nothing is sent for a text that can't be typed.
pub fn plan(text: &str) -> Result<Vec<Stroke>, InjectError> {
    text.chars()
        .map(|c| Stroke::for_char(c).ok_or(InjectError::Unmappable(c)))
        .collect()
}

/// Focuses `target`, opens its chat with `open_chat`, types `text` and submits it.
pub fn deliver<W, K>(
    wm: &W,
    target: &W::Target,
    keyboard: &mut K,
    open_chat: &Chord,
    delays: &Delays,
    text: &str,
) -> Result<(), InjectError>
where
    W: WindowManager,
    K: KeySink + ?Sized,
{
    let strokes = plan(text)?;

    wm.focus(target)?;
    thread::sleep(delays.focus);

    keyboard.send(&open_chat.events())?;
    thread::sleep(delays.open_chat);

    for stroke in &strokes {
        keyboard.send(&stroke.events())?;
    }
    thread::sleep(delays.submit);

    keyboard.send(&Stroke::plain(KeyCode::KEY_ENTER).events())?;
    log::info!("Sent {} characters", strokes.len());
    Ok(())
}
