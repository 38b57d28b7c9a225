use clap::{Parser, Subcommand};
use hyprchat::control::{self, ControlCommand};
use hyprchat::inject::{self, Delays};
use hyprchat::keys::{Chord, UinputKeyboard};
use hyprchat::wm::{DEFAULT_TARGET_TITLES, Hyprland, WindowManager, WindowTitle};
use std::io::Write;
use std::os::unix::net::UnixStream;
use std::thread;
use std::time::Duration;

// libinput needs a moment to pick up a freshly created uinput device.
const DEVICE_SETTLE: Duration = Duration::from_millis(300);

#[derive(Parser, Debug)]
#[command(name = "hyprchat", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Open the chat wheel at the cursor.
    Show,
    /// Close the chat wheel and send the highlighted message
    Hide,
    /// Type a message straight into the game's chat
    Say {
        /// The text to send
        text: String,

        /// Window title to send to (repeatable, first match wins)
        #[arg(short = 't', long = "title")]
        titles: Vec<String>,

        /// Key chord that opens the chat box
        #[arg(short = 'c', long, default_value = "SHIFT+ENTER")]
        chord: Chord,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Show => send_command(ControlCommand::Show),
        Commands::Hide => send_command(ControlCommand::Hide),
        Commands::Say {
            text,
            titles,
            chord,
        } => say(&text, titles, &chord),
    }
}

fn say(text: &str, titles: Vec<String>, chord: &Chord) -> anyhow::Result<()> {
    let titles: Vec<WindowTitle> = if titles.is_empty() {
        DEFAULT_TARGET_TITLES.iter().map(|t| WindowTitle::from(*t)).collect()
    } else {
        titles.into_iter().map(WindowTitle::new).collect()
    };

    // Fail before touching uinput if the text can't be typed.
    inject::plan(text)?;

    let wm = Hyprland;
    let Some(target) = wm.find_target(&titles)? else {
        anyhow::bail!(
            "No window titled {} found.",
            titles
                .iter()
                .map(|t| format!("'{}'", t))
                .collect::<Vec<_>>()
                .join(" or ")
        );
    };

    let mut keyboard = UinputKeyboard::new()?;
    thread::sleep(DEVICE_SETTLE);

    inject::deliver(&wm, &target, &mut keyboard, chord, &Delays::default(), text)?;
    Ok(())
}

fn send_command(cmd: ControlCommand) -> anyhow::Result<()> {
    let path = control::socket_path();
    let mut stream = UnixStream::connect(&path).map_err(|e| {
        anyhow::anyhow!(
            "Failed to connect to chatwheel daemon at {}: {}. Is chatwheel running?",
            path.display(),
            e
        )
    })?;

    writeln!(stream, "{}", cmd)?;
    Ok(())
}
