use anyhow::Context;
use chatwheel::config;
use chatwheel::controller::Controller;
use chatwheel::gui::app::AppModel;
use chatwheel::gui::dialog;
use chatwheel::sys::{hotkey, runtime};
use hyprchat::keys::UinputKeyboard;
use hyprchat::wm::Hyprland;
use relm4::prelude::*;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:#}", e);
            dialog::fatal("Chat wheel could not start", &format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<()> {
    let config = config::load_config().context("Invalid configuration")?;
    let keyboard = UinputKeyboard::new()
        .context("Failed to create the virtual keyboard (is /dev/uinput writable?)")?;
    let controller = Controller::new(config, Hyprland, keyboard)?;

    hotkey::register(&controller.config().hotkey)?;

    let (tx, rx) = async_channel::bounded(32);

    // Start Background Services
    runtime::start_background_services(tx);

    let app = RelmApp::new("org.chatwheel.daemon");

    app.run::<AppModel>((controller, rx));
    Ok(())
}
