use crate::config::HotkeyConfig;
use hyprchat::control::ControlCommand;
use hyprchat::keys::Chord;
use hyprland::error::HyprError;
use hyprland::keyword::Keyword;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HotkeyError {
    #[error("Failed to register hotkey {chord} with Hyprland: {source}")]
    Register {
        chord: Chord,
        #[source]
        source: HyprError,
    },
}

fn combo(chord: &Chord) -> String {
    format!("{}, {}", chord.hyprland_mods(), chord.hyprland_key())
}

// Releasing a modifier key first leaves the mask empty when the main key
// comes up, so each modifier key gets its own release bind.
fn release_combos(chord: &Chord) -> Vec<String> {
    let mut combos = vec![combo(chord)];
    for m in &chord.mods {
        for code in m.key_codes() {
            combos.push(format!("{}, code:{}", m, code.0 + 8));
        }
    }
    combos
}

fn bind_line(combo: &str, hotkey: &HotkeyConfig, cmd: ControlCommand) -> String {
    format!("{}, exec, {} {}", combo, hotkey.command, cmd)
}

fn set_keyword(keyword: &str, value: String) -> Result<(), HyprError> {
    Keyword::set(keyword, value)
}

/// Pressing the chord shows the wheel, releasing any part of it hides (and sends).
pub fn register(hotkey: &HotkeyConfig) -> Result<(), HotkeyError> {
    register_with(hotkey, set_keyword)
}

pub fn unregister(hotkey: &HotkeyConfig) {
    unregister_with(hotkey, set_keyword)
}

fn register_with<F>(hotkey: &HotkeyConfig, mut set: F) -> Result<(), HotkeyError>
where
    F: FnMut(&str, String) -> Result<(), HyprError>,
{
    let show = bind_line(&combo(&hotkey.chord), hotkey, ControlCommand::Show);
    let hides = release_combos(&hotkey.chord)
        .into_iter()
        .map(|c| bind_line(&c, hotkey, ControlCommand::Hide));

    let result = std::iter::once(("bind", show))
        .chain(hides.map(|line| ("bindr", line)))
        .try_for_each(|(keyword, line)| set(keyword, line));

    if let Err(source) = result {
        unregister_with(hotkey, set);
        return Err(HotkeyError::Register {
            chord: hotkey.chord.clone(),
            source,
        });
    }
    log::info!("Registered hotkey {}", hotkey.chord);
    Ok(())
}

fn unregister_with<F>(hotkey: &HotkeyConfig, mut set: F)
where
    F: FnMut(&str, String) -> Result<(), HyprError>,
{
    for combo in release_combos(&hotkey.chord) {
        if let Err(e) = set("unbind", combo.clone()) {
            log::warn!("Failed to unbind {}: {}", combo, e);
        }
    }
}
