use crate::config::{ChatMessage, Config, ConfigError};
use crate::gui::menu::{CursorAction, Menu, State};
use hyprchat::inject::{self, InjectError};
use hyprchat::keys::KeySink;
use hyprchat::wm::{Point, WindowManager, WindowTitle, WmError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OpenError {
    #[error("None of the target windows are open: {}", list_titles(.0))]
    TargetNotFound(Vec<WindowTitle>),
    #[error("Failed to query windows: {0}")]
    Wm(#[from] WmError),
}

fn list_titles(titles: &[WindowTitle]) -> String {
    titles
        .iter()
        .map(|t| format!("'{}'", t))
        .collect::<Vec<_>>()
        .join(", ")
}

/// A selected message and the window it was picked for.
#[derive(Debug, Clone, PartialEq)]
pub struct Outgoing<T> {
    pub message: ChatMessage,
    pub target: T,
}

/// Owns the wheel state and everything needed to act on it.
pub struct Controller<W: WindowManager, K: KeySink> {
    state: State,
    config: Config,
    wm: W,
    keyboard: K,
    target: Option<W::Target>,
}

impl<W: WindowManager, K: KeySink> Controller<W, K> {
    pub fn new(config: Config, wm: W, keyboard: K) -> Result<Self, ConfigError> {
        let menu = Menu::from_config(&config)?;
        let state = State::new(menu, config.menu.radius, config.menu.dead_zone);
        Ok(Self {
            state,
            config,
            wm,
            keyboard,
            target: None,
        })
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_open(&self) -> bool {
        self.state.visible
    }

    /// Locates the target and shows the wheel around `cursor`. Ignored while already open.
    pub fn open(&mut self, cursor: Point) -> Result<(), OpenError> {
        if self.state.visible {
            return Ok(());
        }

        let titles = &self.config.target_titles;
        let target = self
            .wm
            .find_target(titles)?
            .ok_or_else(|| OpenError::TargetNotFound(titles.clone()))?;

        self.target = Some(target);
        self.state.open(cursor);
        log::debug!("Opened at ({:.0}, {:.0})", cursor.x, cursor.y);
        Ok(())
    }

    pub fn tick(&mut self, cursor: Point) -> CursorAction {
        if !self.state.visible {
            return CursorAction::default();
        }
        self.state.update_cursor(cursor)
    }

    /// Hides the wheel. Returns what to send, if a slice was selected.
    pub fn close(&mut self) -> Option<Outgoing<W::Target>> {
        if !self.state.visible {
            return None;
        }
        let target = self.target.take();
        let selected = self.state.close()?;
        let message = self.state.menu.get(selected).cloned()?;
        Some(Outgoing {
            message,
            target: target?,
        })
    }

    /// Hides the wheel without sending anything.
    pub fn cancel(&mut self) {
        self.state.close();
        self.target = None;
    }

    pub fn send(&mut self, outgoing: &Outgoing<W::Target>) -> Result<(), InjectError> {
        inject::deliver(
            &self.wm,
            &outgoing.target,
            &mut self.keyboard,
            &self.config.typing.open_chat,
            &self.config.typing.delays(),
            &outgoing.message,
        )
    }

    /// Swaps in a new config. The wheel is closed first if it was open.
    pub fn reload(&mut self, config: Config) -> Result<(), ConfigError> {
        config.validate()?;
        let menu = Menu::from_config(&config)?;
        self.cancel();
        self.state = State::new(menu, config.menu.radius, config.menu.dead_zone);
        self.config = config;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_config;
    use hyprchat::inject::plan;
    use hyprchat::keys::{KeyCode, KeyEvent, Stroke};
    use std::cell::RefCell;
    use std::io;
    use std::rc::Rc;
    use std::time::Duration;

    #[derive(Clone, Default)]
    struct RecordingKeyboard {
        events: Rc<RefCell<Vec<KeyEvent>>>,
    }

    impl KeySink for RecordingKeyboard {
        fn send(&mut self, events: &[KeyEvent]) -> io::Result<()> {
            self.events.borrow_mut().extend_from_slice(events);
            Ok(())
        }
    }

    struct FakeWm {
        open_titles: Vec<String>,
        focused: Rc<RefCell<Vec<String>>>,
    }

    impl WindowManager for FakeWm {
        type Target = String;

        fn find_target(&self, titles: &[WindowTitle]) -> Result<Option<String>, WmError> {
            Ok(titles
                .iter()
                .find(|t| self.open_titles.iter().any(|o| o == t.as_str()))
                .map(|t| t.to_string()))
        }

        fn focus(&self, target: &String) -> Result<(), WmError> {
            self.focused.borrow_mut().push(target.clone());
            Ok(())
        }
    }

    struct Harness {
        controller: Controller<FakeWm, RecordingKeyboard>,
        events: Rc<RefCell<Vec<KeyEvent>>>,
        focused: Rc<RefCell<Vec<String>>>,
    }

    fn harness(open_titles: &[&str]) -> Harness {
        let mut config = default_config().unwrap();
        config.typing.focus_delay = Duration::ZERO;
        config.typing.open_chat_delay = Duration::ZERO;
        config.typing.submit_delay = Duration::ZERO;

        let keyboard = RecordingKeyboard::default();
        let events = keyboard.events.clone();
        let focused = Rc::new(RefCell::new(Vec::new()));
        let wm = FakeWm {
            open_titles: open_titles.iter().map(|t| t.to_string()).collect(),
            focused: focused.clone(),
        };

        Harness {
            controller: Controller::new(config, wm, keyboard).unwrap(),
            events,
            focused,
        }
    }

    const CENTER: Point = Point { x: 500.0, y: 500.0 };
    const UP: Point = Point { x: 500.0, y: 400.0 };
    const RIGHT: Point = Point { x: 600.0, y: 500.0 };

    fn expected_events(c: &Controller<FakeWm, RecordingKeyboard>, text: &str) -> Vec<KeyEvent> {
        let mut expected = c.config().typing.open_chat.events();
        for stroke in plan(text).unwrap() {
            expected.extend(stroke.events());
        }
        expected.extend(Stroke::plain(KeyCode::KEY_ENTER).events());
        expected
    }

    #[test]
    fn test_open_without_target_aborts() {
        let mut h = harness(&["kitty"]);

        let err = h.controller.open(CENTER).unwrap_err();
        assert!(matches!(err, OpenError::TargetNotFound(ref t) if t.len() == 2));
        assert!(!h.controller.is_open());

        h.controller.tick(UP);
        assert_eq!(h.controller.close(), None);
        assert!(h.events.borrow().is_empty());
        assert!(h.focused.borrow().is_empty());
    }

    #[test]
    fn test_close_without_selection_sends_nothing() {
        let mut h = harness(&["Warcraft III"]);
        h.controller.open(CENTER).unwrap();
        h.controller.tick(Point::new(505.0, 505.0));

        assert_eq!(h.controller.close(), None);
        assert!(!h.controller.is_open());
        assert!(h.events.borrow().is_empty());
    }

    #[test]
    fn test_close_with_selection_types_message_then_submits() {
        let mut h = harness(&["Warcraft III: Reforged"]);
        h.controller.open(CENTER).unwrap();
        assert!(h.controller.tick(RIGHT).should_redraw);

        let outgoing = h.controller.close().unwrap();
        assert_eq!(outgoing.message.as_str(), "Push now!");
        assert_eq!(outgoing.target, "Warcraft III: Reforged");

        h.controller.send(&outgoing).unwrap();
        assert_eq!(*h.focused.borrow(), vec!["Warcraft III: Reforged".to_string()]);
        assert_eq!(*h.events.borrow(), expected_events(&h.controller, "Push now!"));

        let enters = h
            .events
            .borrow()
            .iter()
            .filter(|e| e.code == KeyCode::KEY_ENTER && e.pressed)
            .count();
        assert_eq!(enters, 2); // open chat + submit
    }

    #[test]
    fn test_reopen_before_send_keeps_both_targets() {
        let mut h = harness(&["Warcraft III"]);
        h.controller.open(CENTER).unwrap();
        h.controller.tick(UP);
        let first = h.controller.close().unwrap();

        // wheel reopened before the first message went out
        h.controller.open(CENTER).unwrap();
        h.controller.tick(RIGHT);
        h.controller.send(&first).unwrap();

        let second = h.controller.close().unwrap();
        assert_eq!(second.message.as_str(), "Push now!");
        assert_eq!(second.target, "Warcraft III");
        h.controller.send(&second).unwrap();

        assert_eq!(h.focused.borrow().len(), 2);
        let mut expected = expected_events(&h.controller, "Well played!");
        expected.extend(expected_events(&h.controller, "Push now!"));
        assert_eq!(*h.events.borrow(), expected);
    }

    #[test]
    fn test_reopen_resets_selection() {
        let mut h = harness(&["Warcraft III"]);
        h.controller.open(CENTER).unwrap();
        h.controller.tick(UP);
        assert_eq!(h.controller.state().hover_index, Some(0));
        h.controller.close();

        h.controller.open(Point::new(100.0, 100.0)).unwrap();
        assert_eq!(h.controller.state().hover_index, None);
        assert_eq!(h.controller.state().center, Point::new(100.0, 100.0));
    }

    #[test]
    fn test_open_twice_keeps_center() {
        let mut h = harness(&["Warcraft III"]);
        h.controller.open(CENTER).unwrap();
        h.controller.tick(UP);
        h.controller.open(RIGHT).unwrap();

        assert_eq!(h.controller.state().center, CENTER);
        assert_eq!(h.controller.state().hover_index, Some(0));
    }

    #[test]
    fn test_cancel_sends_nothing() {
        let mut h = harness(&["Warcraft III"]);
        h.controller.open(CENTER).unwrap();
        h.controller.tick(UP);
        h.controller.cancel();

        assert!(!h.controller.is_open());
        assert_eq!(h.controller.close(), None);
        assert!(h.events.borrow().is_empty());
    }

    #[test]
    fn test_tick_while_closed_is_inert() {
        let mut h = harness(&["Warcraft III"]);
        assert!(!h.controller.tick(UP).should_redraw);
        assert_eq!(h.controller.state().hover_index, None);
    }

    #[test]
    fn test_reload_swaps_menu() {
        let mut h = harness(&["Warcraft III"]);
        h.controller.open(CENTER).unwrap();

        let mut config = h.controller.config().clone();
        config.messages[0] = ChatMessage::new("Rush!");
        config.menu.radius = 200.0;
        h.controller.reload(config).unwrap();

        assert!(!h.controller.is_open());
        assert_eq!(h.controller.state().radius, 200.0);
        assert_eq!(
            h.controller.state().menu.get(0).map(|m| m.as_str()),
            Some("Rush!")
        );

        let mut bad = h.controller.config().clone();
        bad.messages.truncate(3);
        assert!(h.controller.reload(bad).is_err());
        assert_eq!(h.controller.state().radius, 200.0);
    }
}
