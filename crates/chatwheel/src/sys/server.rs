use crate::events::AppEvent;
use async_channel::Sender;
use hyprchat::control::{self, ControlCommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::UnixListener;

pub async fn run_server(tx: Sender<AppEvent>) {
    let socket_path = control::socket_path();

    // Cleanup old socket if it exists
    if std::fs::metadata(&socket_path).is_ok() {
        let _ = std::fs::remove_file(&socket_path);
    }

    let listener = match UnixListener::bind(&socket_path) {
        Ok(l) => l,
        Err(e) => {
            log::error!("Failed to bind {}: {}", socket_path.display(), e);
            return;
        }
    };
    log::debug!("Listening on {}", socket_path.display());

    loop {
        match listener.accept().await {
            Ok((mut stream, _)) => {
                let tx = tx.clone();
                tokio::spawn(async move {
                    let reader = BufReader::new(&mut stream);
                    let mut lines = reader.lines();

                    while let Ok(Some(line)) = lines.next_line().await {
                        let event = match line.trim().parse::<ControlCommand>() {
                            Ok(ControlCommand::Show) => AppEvent::Show,
                            Ok(ControlCommand::Hide) => AppEvent::Hide,
                            Err(_) => {
                                log::warn!("Unknown control command '{}'", line.trim());
                                continue;
                            }
                        };
                        let _ = tx.send(event).await;
                    }
                });
            }
            Err(e) => {
                log::error!("Failed to accept connection: {}", e);
            }
        }
    }
}
