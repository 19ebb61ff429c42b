//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! The process-level `toml` configuration (user/group to drop
//! privileges to, pidfile path, logging), distinct from the
//! NETCONF-visible startup options document (`ncd_utils::options::Options`,
//! search paths/sockets/features/buffer thresholds) that lives
//! alongside it.

#![allow(clippy::derivable_impls)]

use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub user: String,
    pub group: String,
    pub pidfile: String,
    /// Path to the startup options document read by `ncd_utils::options::Options`.
    pub options_path: String,
    pub logging: Logging,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Logging {
    pub file: LoggingFile,
    pub stdout: LoggingStdout,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingFile {
    pub enabled: bool,
    pub dir: String,
    pub name: String,
    pub rotation: LoggingFileRotation,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingStdout {
    pub enabled: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoggingFileRotation {
    #[default]
    Never,
    Hourly,
    Daily,
}

// ===== impl Config =====

impl Config {
    const DFLT_FILEPATH: &'static str = "/etc/ncd.toml";

    pub(crate) fn load(config_file: Option<&str>) -> Config {
        let config_file = config_file.unwrap_or(Config::DFLT_FILEPATH);

        match std::fs::read_to_string(config_file) {
            Ok(config_str) => toml::from_str(&config_str).expect("failed to parse configuration file"),
            Err(err) => {
                eprintln!("failed to load configuration file: {err}");
                eprintln!("falling back to default configuration...");
                Config::default()
            }
        }
    }
}

impl Default for Config {
    fn default() -> Config {
        Config {
            user: "ncd".to_owned(),
            group: "ncd".to_owned(),
            pidfile: "/var/run/ncd.pid".to_owned(),
            options_path: "/etc/ncd/options.xml".to_owned(),
            logging: Default::default(),
        }
    }
}

impl Default for LoggingFile {
    fn default() -> LoggingFile {
        LoggingFile {
            enabled: true,
            dir: "/var/log".to_owned(),
            name: "ncd.log".to_owned(),
            rotation: Default::default(),
        }
    }
}

impl Default for LoggingStdout {
    fn default() -> LoggingStdout {
        LoggingStdout { enabled: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_deny_unknown_fields_still_parse_empty_document() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.user, "ncd");
        assert!(!config.logging.stdout.enabled);
        assert!(config.logging.file.enabled);
    }

    #[test]
    fn overrides_user_and_leaves_rest_default() {
        let config: Config = toml::from_str(r#"user = "netconf""#).unwrap();
        assert_eq!(config.user, "netconf");
        assert_eq!(config.group, "ncd");
    }
}
