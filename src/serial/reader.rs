use std::io::Read;
use std::time::Duration;

use serialport::SerialPort;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::config::SerialConfig;

use super::{LineFramer, SensorLine};

/// Owns the serial connection to the door sensor for the process lifetime.
///
/// The port is opened once at startup and released when `run` returns,
/// which happens as soon as the line channel closes.
pub struct SerialReader {
    port: Box<dyn SerialPort>,
    port_name: String,
    poll_interval: Duration,
}

impl SerialReader {
    pub fn open(config: &SerialConfig) -> Result<Self, serialport::Error> {
        let port = serialport::new(&config.port, config.baud_rate)
            .timeout(Duration::from_millis(100))
            .open()?;

        Ok(Self {
            port,
            port_name: config.port.clone(),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
        })
    }

    /// Blocking poll loop. Once per interval, checks for unread bytes and
    /// drains them through the line framer, sending each decoded line to
    /// `line_tx`. Run via `spawn_blocking`; serialport I/O is synchronous.
    pub fn run(mut self, line_tx: mpsc::Sender<SensorLine>) {
        let mut framer = LineFramer::new();
        let mut buf = [0u8; 512];

        loop {
            if line_tx.is_closed() {
                info!("Line channel closed, releasing {}", self.port_name);
                return;
            }

            match self.port.bytes_to_read() {
                Ok(0) => {}
                Ok(_) => match self.port.read(&mut buf) {
                    Ok(0) => {}
                    Ok(n) => {
                        for framed in framer.push(&buf[..n]) {
                            match framed {
                                Ok(line) => {
                                    debug!("Read line from {}: {:?}", self.port_name, line.text);
                                    if line_tx.blocking_send(line).is_err() {
                                        info!("Line channel closed, releasing {}", self.port_name);
                                        return;
                                    }
                                }
                                Err(e) => {
                                    warn!("Skipping unreadable line from {}: {}", self.port_name, e);
                                }
                            }
                        }
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::TimedOut => {}
                    Err(e) => error!("Serial read error on {}: {}", self.port_name, e),
                },
                Err(e) => error!("Failed to query unread bytes on {}: {}", self.port_name, e),
            }

            std::thread::sleep(self.poll_interval);
        }
    }
}
