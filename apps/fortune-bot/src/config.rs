use std::fmt::{Debug, Formatter};
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use fortune_core::{DEFAULT_IMAGE_URL, DEFAULT_TIMEZONE, InvalidTimezone, Timezone};
use fortune_gate::DEFAULT_SEND_HOUR;
use fortune_notifier::DEFAULT_LINE_API_BASE;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
pub const DEFAULT_NOTIFIER_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("required environment variable `{0}` is missing or empty")]
    Missing(&'static str),
    #[error("invalid value for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
    #[error(transparent)]
    Timezone(#[from] InvalidTimezone),
}

/// Process configuration, read once at startup.
#[derive(Clone)]
pub struct BotConfig {
    pub channel_access_token: String,
    pub channel_secret: String,
    /// Recipient of the scheduled push and of `/send_fortune`.
    pub default_recipient: String,
    pub image_url: String,
    pub addr: SocketAddr,
    pub timezone: Timezone,
    pub send_hour: u32,
    pub line_api_base: String,
    pub notifier_timeout: Duration,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let channel_access_token = required(&lookup, "CHANNEL_ACCESS_TOKEN")?;
        let channel_secret = required(&lookup, "CHANNEL_SECRET")?;
        let default_recipient = required(&lookup, "LINE_USER_ID")?;

        let image_url = optional(&lookup, "AI_IMAGE_URL").unwrap_or_else(|| DEFAULT_IMAGE_URL.into());
        let bind_addr = optional(&lookup, "BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.into());
        let ip = parse(&bind_addr, "BIND_ADDR", IpAddr::from_str)?;
        let port = match optional(&lookup, "PORT") {
            Some(raw) => parse(&raw, "PORT", u16::from_str)?,
            None => DEFAULT_PORT,
        };
        let timezone = timezone_from_lookup(&lookup)?;
        let send_hour = match optional(&lookup, "FORTUNE_SEND_HOUR") {
            Some(raw) => {
                let hour = parse(&raw, "FORTUNE_SEND_HOUR", u32::from_str)?;
                if hour > 23 {
                    return Err(ConfigError::Invalid {
                        key: "FORTUNE_SEND_HOUR",
                        reason: format!("{hour} is not an hour of the day"),
                    });
                }
                hour
            }
            None => DEFAULT_SEND_HOUR,
        };
        let line_api_base =
            optional(&lookup, "LINE_API_BASE").unwrap_or_else(|| DEFAULT_LINE_API_BASE.into());
        let timeout_secs = match optional(&lookup, "NOTIFIER_TIMEOUT_SECS") {
            Some(raw) => match parse(&raw, "NOTIFIER_TIMEOUT_SECS", u64::from_str)? {
                0 => {
                    return Err(ConfigError::Invalid {
                        key: "NOTIFIER_TIMEOUT_SECS",
                        reason: "timeout must be at least one second".into(),
                    });
                }
                secs => secs,
            },
            None => DEFAULT_NOTIFIER_TIMEOUT_SECS,
        };

        Ok(Self {
            channel_access_token,
            channel_secret,
            default_recipient,
            image_url,
            addr: SocketAddr::new(ip, port),
            timezone,
            send_hour,
            line_api_base,
            notifier_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl Debug for BotConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotConfig")
            .field("channel_access_token", &"<redacted>")
            .field("channel_secret", &"<redacted>")
            .field("default_recipient", &self.default_recipient)
            .field("image_url", &self.image_url)
            .field("addr", &self.addr)
            .field("timezone", &self.timezone)
            .field("send_hour", &self.send_hour)
            .field("line_api_base", &self.line_api_base)
            .field("notifier_timeout", &self.notifier_timeout)
            .finish()
    }
}

/// Resolves `FORTUNE_TIMEZONE` on its own, for commands that need no credentials.
pub fn timezone_from_lookup(
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Timezone, ConfigError> {
    let name = optional(&lookup, "FORTUNE_TIMEZONE").unwrap_or_else(|| DEFAULT_TIMEZONE.into());
    Ok(Timezone::parse(&name)?)
}

fn optional(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<String, ConfigError> {
    optional(lookup, key).ok_or(ConfigError::Missing(key))
}

fn parse<T, E: std::fmt::Display>(
    raw: &str,
    key: &'static str,
    parser: impl Fn(&str) -> Result<T, E>,
) -> Result<T, ConfigError> {
    parser(raw).map_err(|err| ConfigError::Invalid {
        key,
        reason: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("CHANNEL_ACCESS_TOKEN", "token-abc"),
        ("CHANNEL_SECRET", "secret-xyz"),
        ("LINE_USER_ID", "U123"),
    ];

    #[test]
    fn defaults_apply() {
        let cfg = BotConfig::from_lookup(lookup(&REQUIRED)).unwrap();
        assert_eq!(cfg.default_recipient, "U123");
        assert_eq!(cfg.image_url, DEFAULT_IMAGE_URL);
        assert_eq!(cfg.addr, "0.0.0.0:5000".parse().unwrap());
        assert_eq!(cfg.timezone.name(), "Asia/Tokyo");
        assert_eq!(cfg.send_hour, 8);
        assert_eq!(cfg.line_api_base, "https://api.line.me");
        assert_eq!(cfg.notifier_timeout, Duration::from_secs(10));
    }

    #[test]
    fn overrides_are_read() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("PORT", "8080"),
            ("BIND_ADDR", "127.0.0.1"),
            ("AI_IMAGE_URL", "https://example.com/x.png"),
            ("FORTUNE_TIMEZONE", "Europe/Berlin"),
            ("FORTUNE_SEND_HOUR", "21"),
            ("LINE_API_BASE", "mock://line"),
            ("NOTIFIER_TIMEOUT_SECS", "3"),
        ]);
        let cfg = BotConfig::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(cfg.addr, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(cfg.image_url, "https://example.com/x.png");
        assert_eq!(cfg.timezone.name(), "Europe/Berlin");
        assert_eq!(cfg.send_hour, 21);
        assert_eq!(cfg.line_api_base, "mock://line");
        assert_eq!(cfg.notifier_timeout, Duration::from_secs(3));
    }

    #[test]
    fn each_required_variable_is_enforced() {
        for (missing, _) in REQUIRED {
            let pairs: Vec<_> = REQUIRED.iter().copied().filter(|(k, _)| *k != missing).collect();
            let err = BotConfig::from_lookup(lookup(&pairs)).unwrap_err();
            assert!(matches!(err, ConfigError::Missing(key) if key == missing));
        }
    }

    #[test]
    fn blank_required_variable_counts_as_missing() {
        let mut pairs = REQUIRED.to_vec();
        pairs[1] = ("CHANNEL_SECRET", "   ");
        let err = BotConfig::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("CHANNEL_SECRET")));
    }

    #[test]
    fn invalid_values_are_reported() {
        for (key, value) in [
            ("PORT", "not-a-port"),
            ("BIND_ADDR", "localhost:1"),
            ("FORTUNE_SEND_HOUR", "24"),
            ("NOTIFIER_TIMEOUT_SECS", "-1"),
            ("NOTIFIER_TIMEOUT_SECS", "0"),
        ] {
            let mut pairs = REQUIRED.to_vec();
            pairs.push((key, value));
            let err = BotConfig::from_lookup(lookup(&pairs)).unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid { key: k, .. } if k == key),
                "{key}={value} gave {err:?}"
            );
        }

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("FORTUNE_TIMEZONE", "Mars/Olympus"));
        let err = BotConfig::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Timezone(_)));
    }

    #[test]
    fn debug_redacts_credentials() {
        let cfg = BotConfig::from_lookup(lookup(&REQUIRED)).unwrap();
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("token-abc"));
        assert!(!rendered.contains("secret-xyz"));
        assert!(rendered.contains("U123"));
    }
}
