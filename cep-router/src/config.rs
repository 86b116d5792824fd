use crate::cep::Cep;
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const BRASILAPI_URL_ENV: &str = "BRASILAPI_URL";
pub const VIACEP_URL_ENV: &str = "VIACEP_URL";
pub const TIMEOUT_ENV: &str = "TIMEOUT";
pub const PORT_ENV: &str = "PORT";

const DEFAULT_BRASILAPI_URL: &str = "https://brasilapi.com.br/api/cep/v1/%s";
const DEFAULT_VIACEP_URL: &str = "http://viacep.com.br/ws/%s/json/";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);
const DEFAULT_PORT: u16 = 8080;
const PLACEHOLDER: &str = "%s";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Port cannot be 0")]
    InvalidPort,

    #[error("Timeout cannot be 0")]
    ZeroTimeout,

    #[error("URL template must contain exactly one '%s' placeholder: {0}")]
    InvalidPlaceholder(String),

    #[error("URL template does not produce a valid URL: {0}")]
    InvalidUrl(String),
}

/// Service configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Listener for lookup requests
    pub listener: Listener,
    /// Optional listener for `/health` and `/ready`
    pub admin_listener: Option<Listener>,
    /// Budget shared by both upstream lookups of a request
    #[serde(deserialize_with = "deserialize_duration")]
    pub timeout: Duration,
    /// Lookup URL templates, one per provider
    pub upstreams: Upstreams,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            listener: Listener::default(),
            admin_listener: None,
            timeout: DEFAULT_TIMEOUT,
            upstreams: Upstreams::default(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.listener.validate()?;
        if let Some(admin_listener) = &self.admin_listener {
            admin_listener.validate()?;
        }

        if self.timeout.is_zero() {
            return Err(ValidationError::ZeroTimeout);
        }

        Ok(())
    }

    /// Applies `BRASILAPI_URL`, `VIACEP_URL`, `TIMEOUT` and `PORT` as read
    /// through `lookup`. Empty values are ignored. An unparsable timeout or
    /// port keeps the current value.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ValidationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.is_empty());

        if let Some(value) = non_empty(BRASILAPI_URL_ENV) {
            self.upstreams.brasilapi = UrlTemplate::try_from(value)?;
        }

        if let Some(value) = non_empty(VIACEP_URL_ENV) {
            self.upstreams.viacep = UrlTemplate::try_from(value)?;
        }

        if let Some(value) = non_empty(TIMEOUT_ENV) {
            match parse_duration(&value) {
                Some(timeout) => self.timeout = timeout,
                None => tracing::warn!(
                    value = %value,
                    "Ignoring invalid {TIMEOUT_ENV}, keeping {:?}",
                    self.timeout
                ),
            }
        }

        if let Some(value) = non_empty(PORT_ENV) {
            match value.parse::<u16>() {
                Ok(port) => self.listener.port = port,
                Err(e) => tracing::warn!(
                    value = %value,
                    "Ignoring invalid {PORT_ENV} ({e}), keeping {}",
                    self.listener.port
                ),
            }
        }

        Ok(())
    }
}

/// Network listener configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Listener {
    /// Host address to bind to (e.g., "0.0.0.0" or "127.0.0.1")
    pub host: String,
    /// Port number to listen on
    pub port: u16,
}

impl Default for Listener {
    fn default() -> Self {
        Listener {
            host: "0.0.0.0".into(),
            port: DEFAULT_PORT,
        }
    }
}

impl Listener {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        Ok(())
    }
}

/// Lookup URL templates of the two providers
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Upstreams {
    pub brasilapi: UrlTemplate,
    pub viacep: UrlTemplate,
}

impl Default for Upstreams {
    fn default() -> Self {
        Upstreams {
            brasilapi: UrlTemplate(DEFAULT_BRASILAPI_URL.into()),
            viacep: UrlTemplate(DEFAULT_VIACEP_URL.into()),
        }
    }
}

/// A URL with exactly one `%s` placeholder for the postal code.
///
/// Checked on construction: the template must yield a valid URL once a
/// postal code is substituted.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(try_from = "String")]
pub struct UrlTemplate(String);

impl UrlTemplate {
    pub fn render(&self, cep: &Cep) -> String {
        self.0.replacen(PLACEHOLDER, cep.as_str(), 1)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UrlTemplate {
    type Error = ValidationError;

    fn try_from(template: String) -> Result<Self, Self::Error> {
        if template.matches(PLACEHOLDER).count() != 1 {
            return Err(ValidationError::InvalidPlaceholder(template));
        }

        let sample = template.replacen(PLACEHOLDER, "00000000", 1);
        if let Err(e) = Url::parse(&sample) {
            return Err(ValidationError::InvalidUrl(format!("{template} ({e})")));
        }

        Ok(UrlTemplate(template))
    }
}

impl TryFrom<&str> for UrlTemplate {
    type Error = ValidationError;

    fn try_from(template: &str) -> Result<Self, Self::Error> {
        UrlTemplate::try_from(template.to_string())
    }
}

impl fmt::Display for UrlTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parses Go-style durations such as `1s`, `250ms`, `1.5s` or `1m30s`.
pub fn parse_duration(input: &str) -> Option<Duration> {
    let input = input.trim();
    if input == "0" {
        return Some(Duration::ZERO);
    }
    if input.is_empty() {
        return None;
    }

    let is_number = |c: char| c.is_ascii_digit() || c == '.';
    let mut nanos = 0f64;
    let mut rest = input;

    while !rest.is_empty() {
        let number_end = rest.find(|c: char| !is_number(c)).unwrap_or(rest.len());
        if number_end == 0 {
            return None;
        }
        let value: f64 = rest[..number_end].parse().ok()?;
        rest = &rest[number_end..];

        let unit_end = rest.find(is_number).unwrap_or(rest.len());
        let unit_nanos = match &rest[..unit_end] {
            "ns" => 1.0,
            "us" | "µs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            _ => return None,
        };
        nanos += value * unit_nanos;
        rest = &rest[unit_end..];
    }

    Some(Duration::from_nanos(nanos.round() as u64))
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_duration(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid duration: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_parse_valid_config() {
        let yaml = r#"
listener:
    host: "127.0.0.1"
    port: 3000
admin_listener:
    host: "127.0.0.1"
    port: 3001
timeout: 250ms
upstreams:
    brasilapi: "http://127.0.0.1:9000/api/cep/v1/%s"
    viacep: "http://127.0.0.1:9001/ws/%s/json/"
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_ok());

        assert_eq!(config.listener.port, 3000);
        assert_eq!(config.admin_listener.as_ref().unwrap().port, 3001);
        assert_eq!(config.timeout, Duration::from_millis(250));
        assert_eq!(
            config.upstreams.viacep.as_str(),
            "http://127.0.0.1:9001/ws/%s/json/"
        );
    }

    #[test]
    fn test_defaults() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert!(config.validate().is_ok());

        assert_eq!(config.listener.host, "0.0.0.0");
        assert_eq!(config.listener.port, 8080);
        assert_eq!(config.admin_listener, None);
        assert_eq!(config.timeout, Duration::from_secs(1));
        assert_eq!(config.upstreams.brasilapi.as_str(), DEFAULT_BRASILAPI_URL);
        assert_eq!(config.upstreams.viacep.as_str(), DEFAULT_VIACEP_URL);
    }

    #[test]
    fn test_validation_errors() {
        let mut config = Config::default();
        config.listener.port = 0;
        assert_eq!(config.validate(), Err(ValidationError::InvalidPort));

        let mut config = Config::default();
        config.admin_listener = Some(Listener {
            host: "127.0.0.1".into(),
            port: 0,
        });
        assert_eq!(config.validate(), Err(ValidationError::InvalidPort));

        let mut config = Config::default();
        config.timeout = Duration::ZERO;
        assert_eq!(config.validate(), Err(ValidationError::ZeroTimeout));
    }

    #[test]
    fn test_deserialization_errors() {
        // Template without placeholder
        assert!(serde_yaml::from_str::<Config>("upstreams: {viacep: \"http://x/ws/json\"}").is_err());

        // Template that is not a URL
        assert!(serde_yaml::from_str::<Config>("upstreams: {viacep: \"viacep/%s\"}").is_err());

        // Invalid duration
        assert!(serde_yaml::from_str::<Config>("timeout: soon").is_err());

        // Invalid port type
        assert!(
            serde_yaml::from_str::<Config>(r#"listener: {host: "0.0.0.0", port: "http"}"#).is_err()
        );
    }

    #[test]
    fn test_url_template() {
        let template = UrlTemplate::try_from("http://viacep.com.br/ws/%s/json/").unwrap();
        let cep = Cep::parse("01310100").unwrap();
        assert_eq!(template.render(&cep), "http://viacep.com.br/ws/01310100/json/");

        assert!(matches!(
            UrlTemplate::try_from("http://x/%s/%s"),
            Err(ValidationError::InvalidPlaceholder(_))
        ));
        assert!(matches!(
            UrlTemplate::try_from("no-scheme/%s"),
            Err(ValidationError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let env = HashMap::from([
            (BRASILAPI_URL_ENV, "http://localhost:1/cep/%s"),
            (VIACEP_URL_ENV, "http://localhost:2/ws/%s/json/"),
            (TIMEOUT_ENV, "1m30s"),
            (PORT_ENV, "9090"),
        ]);

        let mut config = Config::default();
        config
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.upstreams.brasilapi.as_str(), "http://localhost:1/cep/%s");
        assert_eq!(config.upstreams.viacep.as_str(), "http://localhost:2/ws/%s/json/");
        assert_eq!(config.timeout, Duration::from_secs(90));
        assert_eq!(config.listener.port, 9090);
    }

    #[test]
    fn test_invalid_env_values() {
        let env = HashMap::from([(TIMEOUT_ENV, "forever"), (PORT_ENV, "http"), (VIACEP_URL_ENV, "")]);

        let mut config = Config::default();
        config
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config, Config::default());

        let result = Config::default().apply_overrides(|key| {
            (key == BRASILAPI_URL_ENV).then(|| "http://localhost/cep".to_string())
        });
        assert!(matches!(result, Err(ValidationError::InvalidPlaceholder(_))));
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("1s"), Some(Duration::from_secs(1)));
        assert_eq!(parse_duration("500ms"), Some(Duration::from_millis(500)));
        assert_eq!(parse_duration("1.5s"), Some(Duration::from_millis(1500)));
        assert_eq!(parse_duration("2m"), Some(Duration::from_secs(120)));
        assert_eq!(parse_duration("1h1m1s"), Some(Duration::from_secs(3661)));
        assert_eq!(parse_duration("10us"), Some(Duration::from_micros(10)));
        assert_eq!(parse_duration("0"), Some(Duration::ZERO));

        assert_eq!(parse_duration(""), None);
        assert_eq!(parse_duration("10"), None);
        assert_eq!(parse_duration("s"), None);
        assert_eq!(parse_duration("1d"), None);
        assert_eq!(parse_duration("-1s"), None);
    }
}
