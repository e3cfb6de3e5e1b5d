use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub serial: SerialConfig,
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone)]
pub struct SerialConfig {
    pub port: String,
    pub baud_rate: u32,
    /// Delay between checks for unread bytes on the port.
    pub poll_interval_ms: u64,
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub endpoint: String,
    pub api_key: String,
    pub http_timeout_secs: u64,
}

fn env_required(key: &str) -> Result<String, String> {
    env::var(key).map_err(|_| format!("{key} environment variable is required"))
}

fn env_or_default<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let config = Self {
            serial: SerialConfig {
                port: env_or_default("SERIAL_PORT", "/dev/ttyUSB0".to_string()),
                baud_rate: env_or_default("SERIAL_BAUD", 9600),
                poll_interval_ms: env_or_default("SERIAL_POLL_INTERVAL_MS", 1000),
            },
            telemetry: TelemetryConfig {
                endpoint: env_or_default(
                    "THINGSPEAK_URL",
                    "https://api.thingspeak.com/update".to_string(),
                ),
                api_key: env_required("THINGSPEAK_API_KEY")?,
                http_timeout_secs: env_or_default("HTTP_TIMEOUT_SECS", 10),
            },
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), String> {
        if self.serial.port.is_empty() {
            return Err("SERIAL_PORT must not be empty".into());
        }
        if self.serial.baud_rate == 0 {
            return Err("SERIAL_BAUD must be > 0".into());
        }
        if self.serial.poll_interval_ms == 0 {
            return Err("SERIAL_POLL_INTERVAL_MS must be > 0".into());
        }
        if self.telemetry.endpoint.is_empty() {
            return Err("THINGSPEAK_URL must not be empty".into());
        }
        if self.telemetry.api_key.is_empty() {
            return Err("THINGSPEAK_API_KEY must not be empty".into());
        }
        if self.telemetry.http_timeout_secs == 0 {
            return Err("HTTP_TIMEOUT_SECS must be > 0".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config {
            serial: SerialConfig {
                port: "/dev/ttyUSB0".to_string(),
                baud_rate: 9600,
                poll_interval_ms: 1000,
            },
            telemetry: TelemetryConfig {
                endpoint: "https://api.thingspeak.com/update".to_string(),
                api_key: "KEY123".to_string(),
                http_timeout_secs: 10,
            },
        }
    }

    #[test]
    fn valid_config_passes_validation() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn empty_port_rejected() {
        let mut config = valid_config();
        config.serial.port.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_baud_rejected() {
        let mut config = valid_config();
        config.serial.baud_rate = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_poll_interval_rejected() {
        let mut config = valid_config();
        config.serial.poll_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_api_key_rejected() {
        let mut config = valid_config();
        config.telemetry.api_key.clear();
        assert!(config.validate().is_err());
    }
}
