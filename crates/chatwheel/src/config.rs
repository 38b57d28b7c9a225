use crate::events::AppEvent;
use crate::gui::menu::SLOT_COUNT;
use async_channel::Sender;
use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File, FileFormat};
use derive_more::{AsRef, Deref, Display, From, Into};
use directories::ProjectDirs;
use hyprchat::inject::{self, Delays, InjectError};
use hyprchat::keys::Chord;
use hyprchat::wm::WindowTitle;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use serde_with::{DurationMilliSeconds, serde_as};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct ChatMessage(String);

hyprchat::impl_string_newtype!(ChatMessage);

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HotkeyConfig {
    pub chord: Chord,
    pub command: String,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TypingConfig {
    pub open_chat: Chord,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "focus_delay_ms")]
    pub focus_delay: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "open_chat_delay_ms")]
    pub open_chat_delay: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "submit_delay_ms")]
    pub submit_delay: Duration,
}

impl TypingConfig {
    pub fn delays(&self) -> Delays {
        Delays {
            focus: self.focus_delay,
            open_chat: self.open_chat_delay,
            submit: self.submit_delay,
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MenuConfig {
    pub radius: f64,
    pub dead_zone: f64,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "poll_interval_ms")]
    pub poll_interval: Duration,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    pub messages: Vec<ChatMessage>,
    pub target_titles: Vec<WindowTitle>,
    pub hotkey: HotkeyConfig,
    pub typing: TypingConfig,
    pub menu: MenuConfig,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),
    #[error("Expected {expected} messages, found {0}", expected = SLOT_COUNT)]
    MessageCount(usize),
    #[error("Message '{message}' cannot be typed: {source}")]
    Untypeable {
        message: ChatMessage,
        #[source]
        source: InjectError,
    },
    #[error("Dead zone ({dead_zone}) must be smaller than the radius ({radius})")]
    DeadZone { dead_zone: f64, radius: f64 },
    #[error("No target window titles configured")]
    NoTargets,
    #[error("Poll interval must be greater than zero")]
    PollInterval,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.messages.len() != SLOT_COUNT {
            return Err(ConfigError::MessageCount(self.messages.len()));
        }
        if let Some((message, source)) = self
            .messages
            .iter()
            .find_map(|m| inject::plan(m).err().map(|e| (m.clone(), e)))
        {
            return Err(ConfigError::Untypeable { message, source });
        }
        if self.target_titles.is_empty() {
            return Err(ConfigError::NoTargets);
        }
        let MenuConfig {
            radius, dead_zone, ..
        } = self.menu;
        if !(0.0..radius).contains(&dead_zone) {
            return Err(ConfigError::DeadZone { dead_zone, radius });
        }
        if self.menu.poll_interval.is_zero() {
            return Err(ConfigError::PollInterval);
        }
        Ok(())
    }
}

pub fn get_config_path() -> Result<std::path::PathBuf, ConfigError> {
    let proj_dirs = ProjectDirs::from("org", "chatwheel", "chatwheel")
        .ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

fn builder() -> ConfigBuilder<DefaultState> {
    config::Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
}

fn env_source() -> Environment {
    Environment::with_prefix("CHATWHEEL")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

fn finish(builder: ConfigBuilder<DefaultState>) -> Result<Config, ConfigError> {
    let config: Config = builder.build()?.try_deserialize()?;
    config.validate()?;
    Ok(config)
}

/// Built-in defaults only.
pub fn default_config() -> Result<Config, ConfigError> {
    finish(builder())
}

pub fn load_config() -> Result<Config, ConfigError> {
    let config_path = get_config_path()?;

    finish(
        builder()
            .add_source(File::from(config_path).required(false))
            .add_source(env_source()),
    )
}

pub async fn run_async_watcher(tx: Sender<AppEvent>) {
    let config_path = match get_config_path() {
        Ok(p) => p,
        Err(e) => {
            log::error!("Config watcher error: {}", e);
            return;
        }
    };
    let config_dir = match config_path.parent() {
        Some(p) => p.to_path_buf(),
        None => return,
    };

    if let Err(e) = fs_err::create_dir_all(&config_dir) {
        log::error!("Failed to create config directory for watching: {}", e);
        return;
    }

    let (bridge_tx, bridge_rx) = async_channel::unbounded();

    let mut watcher = match RecommendedWatcher::new(
        move |res| {
            let _ = bridge_tx.send_blocking(res);
        },
        notify::Config::default(),
    ) {
        Ok(w) => w,
        Err(e) => {
            log::error!("Failed to create watcher: {}", ConfigError::from(e));
            return;
        }
    };

    if let Err(e) = watcher.watch(&config_dir, RecursiveMode::NonRecursive) {
        log::error!("Failed to watch config directory: {}", ConfigError::from(e));
        return;
    }

    while let Ok(res) = bridge_rx.recv().await {
        match res {
            Ok(event) => {
                let meaningful_event = matches!(
                    event.kind,
                    EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
                );

                if meaningful_event
                    && event.paths.iter().any(|p| p == &config_path)
                    && tx.send(AppEvent::ConfigReload).await.is_err()
                {
                    break;
                }
            }
            Err(e) => log::error!("Watch error: {}", e),
        }
    }
}
