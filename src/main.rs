mod config;
mod serial;
mod telemetry;

use tokio::sync::mpsc;
use tracing::{debug, error, info};

use serial::{SensorLine, reader::SerialReader};
use telemetry::{StateSink, TelemetryError, client::TelemetryClient};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = match config::Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        "Starting door-to-thingspeak bridge (port={} baud={}, endpoint={})",
        config.serial.port, config.serial.baud_rate, config.telemetry.endpoint,
    );

    let reader = match SerialReader::open(&config.serial) {
        Ok(r) => r,
        Err(e) => {
            error!("Failed to open serial port {}: {}", config.serial.port, e);
            std::process::exit(1);
        }
    };

    let client = match TelemetryClient::new(&config.telemetry) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to build HTTP client: {}", e);
            std::process::exit(1);
        }
    };

    let (line_tx, mut line_rx) = mpsc::channel::<SensorLine>(100);

    // Serial I/O is blocking; the reader gets its own thread off the runtime.
    let reader_handle = tokio::task::spawn_blocking(move || {
        reader.run(line_tx);
    });

    // Main loop: forward door states + handle shutdown
    loop {
        tokio::select! {
            maybe_line = line_rx.recv() => {
                match maybe_line {
                    Some(line) => forward_line(&client, &line).await,
                    None => {
                        error!("Serial reader stopped, shutting down");
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Received SIGINT, shutting down");
                break;
            }
            _ = async {
                let mut sigterm = tokio::signal::unix::signal(
                    tokio::signal::unix::SignalKind::terminate()
                ).expect("Failed to register SIGTERM handler");
                sigterm.recv().await;
            } => {
                info!("Received SIGTERM, shutting down");
                break;
            }
        }
    }

    // Closing the channel tells the reader to return and release the port.
    drop(line_rx);
    let _ = reader_handle.await;
    info!("door-to-thingspeak bridge stopped");
}

/// Classify one sensor line and report it. Unrecognized lines are ignored;
/// every failure is logged and swallowed so the loop keeps running.
async fn forward_line<S: StateSink>(sink: &S, line: &SensorLine) {
    let Some(state) = telemetry::classify(&line.text) else {
        debug!("Ignoring unrecognized line: {:?}", line.text);
        return;
    };

    match sink.report(state).await {
        Ok(()) => {
            info!("Data sent to ThingSpeak: Door State = {}", state.field_value());
        }
        Err(TelemetryError::Status(status)) => {
            error!("Error sending data to ThingSpeak: status {}", status);
        }
        Err(e) => {
            error!("Error sending data to ThingSpeak: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;
    use reqwest::StatusCode;
    use telemetry::{DoorState, MockStateSink};

    fn line(text: &str) -> SensorLine {
        SensorLine {
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn unlocked_line_reports_state_one() {
        let mut sink = MockStateSink::new();
        sink.expect_report()
            .with(eq(DoorState::Unlocked))
            .times(1)
            .returning(|_| Ok(()));

        forward_line(&sink, &line("Door Unlocked")).await;
    }

    #[tokio::test]
    async fn locked_line_reports_state_zero() {
        let mut sink = MockStateSink::new();
        sink.expect_report()
            .with(eq(DoorState::Locked))
            .times(1)
            .returning(|_| Ok(()));

        forward_line(&sink, &line("Door Locked")).await;
    }

    #[tokio::test]
    async fn unrecognized_line_reports_nothing() {
        let mut sink = MockStateSink::new();
        sink.expect_report().times(0);

        forward_line(&sink, &line("Status: OK")).await;
    }

    #[tokio::test]
    async fn non_success_status_is_swallowed() {
        let mut sink = MockStateSink::new();
        sink.expect_report()
            .times(1)
            .returning(|_| Err(TelemetryError::Status(StatusCode::SERVICE_UNAVAILABLE)));

        // Must log and return, not panic or propagate.
        forward_line(&sink, &line("Door Unlocked")).await;
    }

    #[tokio::test]
    async fn transport_error_is_swallowed() {
        // A real connection-refused error from reqwest; nothing listens on
        // port 1.
        let err = reqwest::Client::new()
            .get("http://127.0.0.1:1")
            .send()
            .await
            .expect_err("request to a closed port should fail");

        let mut sink = MockStateSink::new();
        sink.expect_report()
            .times(1)
            .return_once(move |_| Err(TelemetryError::Transport(err)));

        // Must log and return, not panic or propagate.
        forward_line(&sink, &line("Door Locked")).await;
    }

    #[tokio::test]
    async fn each_line_reports_exactly_once() {
        let mut sink = MockStateSink::new();
        sink.expect_report()
            .with(eq(DoorState::Unlocked))
            .times(2)
            .returning(|_| Ok(()));
        sink.expect_report()
            .with(eq(DoorState::Locked))
            .times(1)
            .returning(|_| Ok(()));

        forward_line(&sink, &line("Door Unlocked")).await;
        forward_line(&sink, &line("Door Locked")).await;
        forward_line(&sink, &line("Door Unlocked")).await;
    }
}
