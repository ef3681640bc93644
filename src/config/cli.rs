//! Command-line flags and environment overrides.

use std::path::PathBuf;

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};

use crate::config::loader::{load_config, read_config, ConfigError};
use crate::config::schema::ProxyConfig;
use crate::config::validation::validate_config;

#[derive(Debug, Parser)]
#[command(name = "segment-proxy")]
#[command(about = "Reverse proxy for Segment analytics SDK traffic", long_about = None)]
pub struct Cli {
    /// Port to bind
    #[arg(long, env = "SEGMENT_PROXY_PORT")]
    pub port: Option<String>,

    /// Host used for rewriting references to api.segment.io in JS
    #[arg(long, env = "SEGMENT_PROXY_HOST")]
    pub host: Option<String>,

    /// Log every request and response to stdout (env accepts 1/0, yes/no, true/false)
    #[arg(long, env = "SEGMENT_PROXY_DEBUG", action = ArgAction::SetTrue, value_parser = BoolishValueParser::new())]
    pub debug: bool,

    /// Optional TOML file; flags take precedence over it
    #[arg(short, long, env = "SEGMENT_PROXY_CONFIG")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Layer flags over the config file (or defaults) and validate the result.
    pub fn into_config(self) -> Result<ProxyConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) if !self.has_overrides() => return load_config(path),
            Some(path) => read_config(path)?,
            None => ProxyConfig::default(),
        };

        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if let Some(host) = self.host {
            config.rewrite.host = host;
        }
        if self.debug {
            config.debug = true;
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }

    fn has_overrides(&self) -> bool {
        self.port.is_some() || self.host.is_some() || self.debug
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Parsing reads SEGMENT_PROXY_* variables; tests that parse hold this lock.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn parse(args: &[&str]) -> Cli {
        let _env = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        Cli::try_parse_from(std::iter::once("segment-proxy").chain(args.iter().copied())).unwrap()
    }

    fn temp_config(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("segment-proxy-cli-{}-{}.toml", name, std::process::id()));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_no_flags_gives_defaults() {
        assert_eq!(parse(&[]).into_config().unwrap(), ProxyConfig::default());
    }

    #[test]
    fn test_flags_override_defaults() {
        let config = parse(&["--port", "9000", "--host", "proxy.example.com", "--debug"])
            .into_config()
            .unwrap();

        assert_eq!(config.listener.port, "9000");
        assert_eq!(config.rewrite.host, "proxy.example.com");
        assert!(config.debug);
    }

    #[test]
    fn test_flags_override_file() {
        let path = temp_config("override", "[listener]\nport = \"7000\"\n\n[rewrite]\nhost = \"file.example.com\"\n");

        let config = parse(&["--config", path.to_str().unwrap(), "--host", "flag.example.com"])
            .into_config()
            .unwrap();

        assert_eq!(config.listener.port, "7000");
        assert_eq!(config.rewrite.host, "flag.example.com");
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_file_only_is_loaded_and_validated() {
        let path = temp_config("file-only", "[listener]\nport = \"7001\"\n");
        let config = parse(&["--config", path.to_str().unwrap()]).into_config().unwrap();
        assert_eq!(config.listener.port, "7001");
        std::fs::remove_file(path).unwrap();

        let path = temp_config("file-only-bad", "[listener]\nport = \"seventy\"\n");
        let err = parse(&["--config", path.to_str().unwrap()]).into_config().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_invalid_port_flag_fails_validation() {
        assert!(matches!(
            parse(&["--port", "99999"]).into_config(),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_debug_env_accepts_boolish_values() {
        let _env = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());

        for (value, expected) in [("1", true), ("yes", true), ("true", true), ("0", false), ("off", false)] {
            std::env::set_var("SEGMENT_PROXY_DEBUG", value);
            let cli = Cli::try_parse_from(["segment-proxy"]);
            std::env::remove_var("SEGMENT_PROXY_DEBUG");
            assert_eq!(cli.unwrap().debug, expected, "SEGMENT_PROXY_DEBUG={value}");
        }
    }
}
