use evdev::uinput::VirtualDevice;
use evdev::{AttributeSet, BusType, EventType, InputEvent, InputId};
pub use evdev::KeyCode;
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::fmt;
use std::io;
use std::str::FromStr;
use strum::{Display as StrumDisplay, EnumIter, EnumString, IntoEnumIterator};
use thiserror::Error;

pub const DEVICE_NAME: &str = "chatwheel virtual keyboard";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub pressed: bool,
}

impl KeyEvent {
    pub fn down(code: KeyCode) -> Self {
        Self {
            code,
            pressed: true,
        }
    }

    pub fn up(code: KeyCode) -> Self {
        Self {
            code,
            pressed: false,
        }
    }
}

/// Anything that can put key events into the input stream.
pub trait KeySink {
    fn send(&mut self, events: &[KeyEvent]) -> io::Result<()>;
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter, StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
pub enum Modifier {
    #[strum(to_string = "SHIFT")]
    Shift,
    #[strum(to_string = "CTRL", serialize = "CONTROL")]
    Ctrl,
    #[strum(to_string = "ALT")]
    Alt,
    #[strum(to_string = "SUPER", serialize = "META", serialize = "WIN")]
    Super,
}

impl Modifier {
    pub fn key_code(&self) -> KeyCode {
        match self {
            Self::Shift => KeyCode::KEY_LEFTSHIFT,
            Self::Ctrl => KeyCode::KEY_LEFTCTRL,
            Self::Alt => KeyCode::KEY_LEFTALT,
            Self::Super => KeyCode::KEY_LEFTMETA,
        }
    }

    /// Both physical keys carrying this modifier, left first.
    pub fn key_codes(&self) -> [KeyCode; 2] {
        let right = match self {
            Self::Shift => KeyCode::KEY_RIGHTSHIFT,
            Self::Ctrl => KeyCode::KEY_RIGHTCTRL,
            Self::Alt => KeyCode::KEY_RIGHTALT,
            Self::Super => KeyCode::KEY_RIGHTMETA,
        };
        [self.key_code(), right]
    }
}

/// A single character resolved against the US layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stroke {
    pub code: KeyCode,
    pub shift: bool,
}

impl Stroke {
    pub fn plain(code: KeyCode) -> Self {
        Self { code, shift: false }
    }

    pub fn shifted(code: KeyCode) -> Self {
        Self { code, shift: true }
    }

    pub fn for_char(c: char) -> Option<Self> {
        if c.is_ascii_uppercase() {
            return letter_code(c.to_ascii_lowercase()).map(Self::shifted);
        }
        if let Some(code) = letter_code(c) {
            return Some(Self::plain(code));
        }

        let stroke = match c {
            ' ' => Self::plain(KeyCode::KEY_SPACE),
            '1' => Self::plain(KeyCode::KEY_1),
            '2' => Self::plain(KeyCode::KEY_2),
            '3' => Self::plain(KeyCode::KEY_3),
            '4' => Self::plain(KeyCode::KEY_4),
            '5' => Self::plain(KeyCode::KEY_5),
            '6' => Self::plain(KeyCode::KEY_6),
            '7' => Self::plain(KeyCode::KEY_7),
            '8' => Self::plain(KeyCode::KEY_8),
            '9' => Self::plain(KeyCode::KEY_9),
            '0' => Self::plain(KeyCode::KEY_0),
            '!' => Self::shifted(KeyCode::KEY_1),
            '@' => Self::shifted(KeyCode::KEY_2),
            '#' => Self::shifted(KeyCode::KEY_3),
            '$' => Self::shifted(KeyCode::KEY_4),
            '%' => Self::shifted(KeyCode::KEY_5),
            '^' => Self::shifted(KeyCode::KEY_6),
            '&' => Self::shifted(KeyCode::KEY_7),
            '*' => Self::shifted(KeyCode::KEY_8),
            '(' => Self::shifted(KeyCode::KEY_9),
            ')' => Self::shifted(KeyCode::KEY_0),
            '-' => Self::plain(KeyCode::KEY_MINUS),
            '_' => Self::shifted(KeyCode::KEY_MINUS),
            '=' => Self::plain(KeyCode::KEY_EQUAL),
            '+' => Self::shifted(KeyCode::KEY_EQUAL),
            '[' => Self::plain(KeyCode::KEY_LEFTBRACE),
            '{' => Self::shifted(KeyCode::KEY_LEFTBRACE),
            ']' => Self::plain(KeyCode::KEY_RIGHTBRACE),
            '}' => Self::shifted(KeyCode::KEY_RIGHTBRACE),
            '\\' => Self::plain(KeyCode::KEY_BACKSLASH),
            '|' => Self::shifted(KeyCode::KEY_BACKSLASH),
            ';' => Self::plain(KeyCode::KEY_SEMICOLON),
            ':' => Self::shifted(KeyCode::KEY_SEMICOLON),
            '\'' => Self::plain(KeyCode::KEY_APOSTROPHE),
            '"' => Self::shifted(KeyCode::KEY_APOSTROPHE),
            ',' => Self::plain(KeyCode::KEY_COMMA),
            '<' => Self::shifted(KeyCode::KEY_COMMA),
            '.' => Self::plain(KeyCode::KEY_DOT),
            '>' => Self::shifted(KeyCode::KEY_DOT),
            '/' => Self::plain(KeyCode::KEY_SLASH),
            '?' => Self::shifted(KeyCode::KEY_SLASH),
            '`' => Self::plain(KeyCode::KEY_GRAVE),
            '~' => Self::shifted(KeyCode::KEY_GRAVE),
            _ => return None,
        };
        Some(stroke)
    }

    /// Down/up pair, wrapped in shift when needed.
    pub fn events(&self) -> Vec<KeyEvent> {
        let tap = [KeyEvent::down(self.code), KeyEvent::up(self.code)];
        if self.shift {
            let shift = Modifier::Shift.key_code();
            let mut events = vec![KeyEvent::down(shift)];
            events.extend(tap);
            events.push(KeyEvent::up(shift));
            events
        } else {
            tap.to_vec()
        }
    }
}

fn letter_code(c: char) -> Option<KeyCode> {
    let code = match c {
        'a' => KeyCode::KEY_A,
        'b' => KeyCode::KEY_B,
        'c' => KeyCode::KEY_C,
        'd' => KeyCode::KEY_D,
        'e' => KeyCode::KEY_E,
        'f' => KeyCode::KEY_F,
        'g' => KeyCode::KEY_G,
        'h' => KeyCode::KEY_H,
        'i' => KeyCode::KEY_I,
        'j' => KeyCode::KEY_J,
        'k' => KeyCode::KEY_K,
        'l' => KeyCode::KEY_L,
        'm' => KeyCode::KEY_M,
        'n' => KeyCode::KEY_N,
        'o' => KeyCode::KEY_O,
        'p' => KeyCode::KEY_P,
        'q' => KeyCode::KEY_Q,
        'r' => KeyCode::KEY_R,
        's' => KeyCode::KEY_S,
        't' => KeyCode::KEY_T,
        'u' => KeyCode::KEY_U,
        'v' => KeyCode::KEY_V,
        'w' => KeyCode::KEY_W,
        'x' => KeyCode::KEY_X,
        'y' => KeyCode::KEY_Y,
        'z' => KeyCode::KEY_Z,
        _ => return None,
    };
    Some(code)
}

const NAMED_KEYS: &[(&str, KeyCode)] = &[
    ("ENTER", KeyCode::KEY_ENTER),
    ("RETURN", KeyCode::KEY_ENTER),
    ("TAB", KeyCode::KEY_TAB),
    ("SPACE", KeyCode::KEY_SPACE),
    ("ESCAPE", KeyCode::KEY_ESC),
    ("ESC", KeyCode::KEY_ESC),
    ("BACKSPACE", KeyCode::KEY_BACKSPACE),
    ("F1", KeyCode::KEY_F1),
    ("F2", KeyCode::KEY_F2),
    ("F3", KeyCode::KEY_F3),
    ("F4", KeyCode::KEY_F4),
    ("F5", KeyCode::KEY_F5),
    ("F6", KeyCode::KEY_F6),
    ("F7", KeyCode::KEY_F7),
    ("F8", KeyCode::KEY_F8),
    ("F9", KeyCode::KEY_F9),
    ("F10", KeyCode::KEY_F10),
    ("F11", KeyCode::KEY_F11),
    ("F12", KeyCode::KEY_F12),
];

fn key_by_name(name: &str) -> Option<KeyCode> {
    let upper = name.to_ascii_uppercase();
    if let Some((_, code)) = NAMED_KEYS.iter().find(|(n, _)| *n == upper) {
        return Some(*code);
    }

    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Stroke::for_char(c.to_ascii_lowercase())
            .filter(|s| !s.shift)
            .map(|s| s.code),
        _ => None,
    }
}

fn key_name(code: KeyCode) -> String {
    if let Some((name, _)) = NAMED_KEYS.iter().find(|(_, c)| *c == code) {
        return name.to_string();
    }
    (' '..='~')
        .find(|&c| Stroke::for_char(c) == Some(Stroke::plain(code)))
        .map(|c| c.to_ascii_uppercase().to_string())
        .unwrap_or_else(|| format!("{:?}", code))
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChordParseError {
    #[error("Empty key chord")]
    Empty,
    #[error("Unknown modifier '{0}'")]
    UnknownModifier(String),
    #[error("Unknown key '{0}'")]
    UnknownKey(String),
}

/// Modifiers held around a single key tap, written as `SHIFT+ENTER`.
#[derive(Debug, Clone, PartialEq, Eq, SerializeDisplay, DeserializeFromStr)]
pub struct Chord {
    pub mods: Vec<Modifier>,
    pub key: KeyCode,
}

impl Chord {
    pub fn new(mods: Vec<Modifier>, key: KeyCode) -> Self {
        Self { mods, key }
    }

    pub fn events(&self) -> Vec<KeyEvent> {
        let mut events: Vec<_> = self
            .mods
            .iter()
            .map(|m| KeyEvent::down(m.key_code()))
            .collect();
        events.push(KeyEvent::down(self.key));
        events.push(KeyEvent::up(self.key));
        events.extend(self.mods.iter().rev().map(|m| KeyEvent::up(m.key_code())));
        events
    }

    /// Modifier field of a Hyprland `bind` line, e.g. `CTRL SHIFT`.
    pub fn hyprland_mods(&self) -> String {
        self.mods
            .iter()
            .map(|m| m.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Key field of a Hyprland `bind` line. xkb keycodes are evdev codes offset by 8.
    pub fn hyprland_key(&self) -> String {
        format!("code:{}", self.key.0 + 8)
    }
}

impl FromStr for Chord {
    type Err = ChordParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts: Vec<&str> = s.split('+').map(str::trim).collect();
        let key_part = parts.pop().filter(|k| !k.is_empty()).ok_or(ChordParseError::Empty)?;
        let key =
            key_by_name(key_part).ok_or_else(|| ChordParseError::UnknownKey(key_part.to_string()))?;

        let mods = parts
            .into_iter()
            .map(|p| {
                p.parse::<Modifier>()
                    .map_err(|_| ChordParseError::UnknownModifier(p.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { mods, key })
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for m in &self.mods {
            write!(f, "{}+", m)?;
        }
        write!(f, "{}", key_name(self.key))
    }
}

/// Every key the virtual device is allowed to emit.
pub fn supported_keys() -> AttributeSet<KeyCode> {
    let mut keys = AttributeSet::<KeyCode>::new();
    for m in Modifier::iter() {
        keys.insert(m.key_code());
    }
    for (_, code) in NAMED_KEYS {
        keys.insert(*code);
    }
    for c in ' '..='~' {
        if let Some(stroke) = Stroke::for_char(c) {
            keys.insert(stroke.code);
        }
    }
    keys
}

pub struct UinputKeyboard {
    device: VirtualDevice,
}

impl UinputKeyboard {
    pub fn new() -> io::Result<Self> {
        let device = VirtualDevice::builder()?
            .name(DEVICE_NAME)
            .input_id(InputId::new(BusType::BUS_USB, 0x1209, 0xc4a7, 1))
            .with_keys(&supported_keys())?
            .build()?;
        log::debug!("Created uinput device '{}'", DEVICE_NAME);
        Ok(Self { device })
    }
}

// Key events only; emit appends the SYN_REPORT itself.
fn raw_events(events: &[KeyEvent]) -> Vec<InputEvent> {
    events
        .iter()
        .map(|e| InputEvent::new(EventType::KEY.0, e.code.0, e.pressed as i32))
        .collect()
}

impl KeySink for UinputKeyboard {
    fn send(&mut self, events: &[KeyEvent]) -> io::Result<()> {
        self.device.emit(&raw_events(events))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_printable_ascii_is_mapped() {
        for c in ' '..='~' {
            assert!(Stroke::for_char(c).is_some(), "no stroke for {:?}", c);
        }
        assert_eq!(Stroke::for_char('é'), None);
        assert_eq!(Stroke::for_char('\n'), None);
    }

    #[test]
    fn test_shift_only_where_needed() {
        assert_eq!(Stroke::for_char('w'), Some(Stroke::plain(KeyCode::KEY_W)));
        assert_eq!(Stroke::for_char('W'), Some(Stroke::shifted(KeyCode::KEY_W)));
        assert_eq!(Stroke::for_char('!'), Some(Stroke::shifted(KeyCode::KEY_1)));
        assert_eq!(Stroke::for_char('1'), Some(Stroke::plain(KeyCode::KEY_1)));
    }

    #[test]
    fn test_shifted_stroke_events() {
        let events = Stroke::shifted(KeyCode::KEY_G).events();
        assert_eq!(
            events,
            vec![
                KeyEvent::down(KeyCode::KEY_LEFTSHIFT),
                KeyEvent::down(KeyCode::KEY_G),
                KeyEvent::up(KeyCode::KEY_G),
                KeyEvent::up(KeyCode::KEY_LEFTSHIFT),
            ]
        );
    }

    #[test]
    fn test_chord_parsing() {
        let chord: Chord = "shift+Enter".parse().unwrap();
        assert_eq!(chord.mods, vec![Modifier::Shift]);
        assert_eq!(chord.key, KeyCode::KEY_ENTER);

        let chord: Chord = "CONTROL + g".parse().unwrap();
        assert_eq!(chord, Chord::new(vec![Modifier::Ctrl], KeyCode::KEY_G));
        assert_eq!(chord.to_string(), "CTRL+G");

        let bare: Chord = "F9".parse().unwrap();
        assert!(bare.mods.is_empty());

        assert_eq!("".parse::<Chord>(), Err(ChordParseError::Empty));
        assert_eq!(
            "HYPER+G".parse::<Chord>(),
            Err(ChordParseError::UnknownModifier("HYPER".into()))
        );
        assert_eq!(
            "CTRL+Nope".parse::<Chord>(),
            Err(ChordParseError::UnknownKey("Nope".into()))
        );
    }

    #[test]
    fn test_chord_events_release_in_reverse() {
        let chord: Chord = "CTRL+SHIFT+ENTER".parse().unwrap();
        assert_eq!(
            chord.events(),
            vec![
                KeyEvent::down(KeyCode::KEY_LEFTCTRL),
                KeyEvent::down(KeyCode::KEY_LEFTSHIFT),
                KeyEvent::down(KeyCode::KEY_ENTER),
                KeyEvent::up(KeyCode::KEY_ENTER),
                KeyEvent::up(KeyCode::KEY_LEFTSHIFT),
                KeyEvent::up(KeyCode::KEY_LEFTCTRL),
            ]
        );
    }

    #[test]
    fn test_raw_events_carry_no_sync() {
        let raw = raw_events(&Stroke::shifted(KeyCode::KEY_A).events());
        assert_eq!(raw.len(), 4);
        assert!(raw.iter().all(|e| e.event_type() == EventType::KEY));
        assert_eq!(raw[0].code(), KeyCode::KEY_LEFTSHIFT.0);
        assert_eq!(raw[0].value(), 1);
        assert_eq!(raw[3].value(), 0);
    }

    #[test]
    fn test_modifier_key_codes() {
        assert_eq!(
            Modifier::Ctrl.key_codes(),
            [KeyCode::KEY_LEFTCTRL, KeyCode::KEY_RIGHTCTRL]
        );
        assert_eq!(Modifier::Super.key_codes()[1], KeyCode::KEY_RIGHTMETA);
    }

    #[test]
    fn test_chord_hyprland_fields() {
        let chord: Chord = "CTRL+G".parse().unwrap();
        assert_eq!(chord.hyprland_mods(), "CTRL");
        assert_eq!(chord.hyprland_key(), format!("code:{}", KeyCode::KEY_G.0 + 8));
    }

    #[test]
    fn test_chord_deserialization() {
        let chord: Chord = serde_json::from_str("\"SHIFT+RETURN\"").unwrap();
        assert_eq!(chord, Chord::new(vec![Modifier::Shift], KeyCode::KEY_ENTER));
        assert!(serde_json::from_str::<Chord>("\"SHIFT+\"").is_err());
    }
}
