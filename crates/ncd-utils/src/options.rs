//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! The startup options document (§6): YANG module search paths, socket
//! paths, enabled features, the mount-domain sharing flag, and buffer
//! thresholds. Loaded from an XML document on disk and then overridden
//! field-by-field by command-line flags, mirroring how the daemon's own
//! `Config` (see `ncd-daemon::config`) layers a `toml` file under CLI
//! overrides.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Resolved option set, the struct dumped verbatim by `-C`.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Options {
    /// Directories searched for `(name, revision).yang` files, in order.
    pub yang_search_paths: Vec<PathBuf>,
    /// Path to the NETCONF Unix-domain socket.
    pub netconf_socket_path: PathBuf,
    /// Optional NETCONF TCP listen address (`host:port`).
    pub netconf_tcp_addr: Option<String>,
    /// Path to the AgentX master agent socket (external interface only).
    pub agentx_socket_path: PathBuf,
    /// Directory holding the persisted datastore XML documents.
    pub datastore_dir: PathBuf,
    /// YANG features enabled across all loaded modules, as `module:feature`.
    pub enabled_features: Vec<String>,
    /// Whether the `:startup` capability (persisted startup datastore) is
    /// enabled.
    pub startup_enabled: bool,
    /// Whether mount domains with tree-equal yang-library advertisements
    /// are shared rather than rebuilt per mount-point instance (§9c).
    pub mount_domain_sharing: bool,
    /// Soft cap, in bytes, on a single NETCONF chunked-framing message
    /// before `too-big` is raised.
    pub max_message_bytes: usize,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            yang_search_paths: vec![PathBuf::from("/usr/share/ncd/yang")],
            netconf_socket_path: PathBuf::from("/var/run/ncd/netconf.sock"),
            netconf_tcp_addr: None,
            agentx_socket_path: PathBuf::from("/var/agentx/master"),
            datastore_dir: PathBuf::from("/var/lib/ncd"),
            enabled_features: Vec::new(),
            startup_enabled: true,
            mount_domain_sharing: true,
            max_message_bytes: 64 * 1024 * 1024,
        }
    }
}

impl Options {
    /// Parses the startup options document. The document root element's
    /// children are matched by tag name against the fields above; any
    /// field absent from the document keeps its default.
    ///
    /// Loads the startup options document from `path`, falling back to
    /// [`Options::default`] (with a warning on stderr) when the file is
    /// absent or unreadable — the same "missing config is not fatal"
    /// posture `ncd-daemon::config::Config::load` takes for the process
    /// config.
    ///
    /// The document is a minimal line-oriented `key=value` format (one
    /// override per line, blank lines and `#`-prefixed lines ignored) to
    /// keep this crate dependency-free for the common case of a handful of
    /// scalar overrides; a full namespaced XML rendering would need to be
    /// read through `ncd_instance` once bound to an `ncd-options` schema,
    /// which is out of scope for this crate.
    pub fn load(path: &std::path::Path) -> Options {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                eprintln!("failed to load options document {}: {err}", path.display());
                eprintln!("falling back to default options...");
                return Options::default();
            }
        };
        let mut options = Options::default();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            options.apply_field(key.trim(), value.trim());
        }
        options
    }

    fn apply_field(&mut self, key: &str, value: &str) {
        match key {
            "yang_search_paths" => {
                self.yang_search_paths = value.split(',').map(PathBuf::from).collect();
            }
            "netconf_socket_path" => self.netconf_socket_path = PathBuf::from(value),
            "netconf_tcp_addr" => self.netconf_tcp_addr = Some(value.to_owned()),
            "agentx_socket_path" => self.agentx_socket_path = PathBuf::from(value),
            "datastore_dir" => self.datastore_dir = PathBuf::from(value),
            "enabled_features" => {
                self.enabled_features = value.split(',').map(str::to_owned).collect();
            }
            "startup_enabled" => self.startup_enabled = value == "true",
            "mount_domain_sharing" => self.mount_domain_sharing = value == "true",
            "max_message_bytes" => {
                if let Ok(n) = value.parse() {
                    self.max_message_bytes = n;
                }
            }
            _ => {}
        }
    }

    pub fn merge_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(path) = overrides.netconf_socket_path {
            self.netconf_socket_path = path;
        }
        if let Some(addr) = overrides.netconf_tcp_addr {
            self.netconf_tcp_addr = Some(addr);
        }
        if let Some(dir) = overrides.datastore_dir {
            self.datastore_dir = dir;
        }
        if !overrides.yang_search_paths.is_empty() {
            self.yang_search_paths = overrides.yang_search_paths;
        }
        for feature in overrides.enabled_features {
            if !self.enabled_features.contains(&feature) {
                self.enabled_features.push(feature);
            }
        }
    }
}

/// Command-line overrides layered on top of the parsed options document.
#[derive(Clone, Debug, Default)]
pub struct CliOverrides {
    pub netconf_socket_path: Option<PathBuf>,
    pub netconf_tcp_addr: Option<String>,
    pub datastore_dir: Option<PathBuf>,
    pub yang_search_paths: Vec<PathBuf>,
    pub enabled_features: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_overrides_win_over_defaults() {
        let mut opts = Options::default();
        let overrides = CliOverrides {
            datastore_dir: Some(PathBuf::from("/tmp/ncd-test")),
            ..Default::default()
        };
        opts.merge_cli_overrides(overrides);
        assert_eq!(opts.datastore_dir, PathBuf::from("/tmp/ncd-test"));
        assert_eq!(opts.netconf_socket_path, Options::default().netconf_socket_path);
    }

    #[test]
    fn enabled_features_deduplicate() {
        let mut opts = Options::default();
        opts.enabled_features.push("startup".to_owned());
        opts.merge_cli_overrides(CliOverrides {
            enabled_features: vec!["startup".to_owned(), "candidate".to_owned()],
            ..Default::default()
        });
        assert_eq!(opts.enabled_features, vec!["startup", "candidate"]);
    }

    #[test]
    fn load_applies_key_value_overrides_and_skips_comments() {
        let path = std::env::temp_dir().join(format!("ncd-options-test-{}.txt", std::process::id()));
        std::fs::write(
            &path,
            "# a comment\n\nnetconf_tcp_addr=0.0.0.0:830\nmount_domain_sharing=false\n",
        )
        .unwrap();
        let opts = Options::load(&path);
        std::fs::remove_file(&path).unwrap();
        assert_eq!(opts.netconf_tcp_addr.as_deref(), Some("0.0.0.0:830"));
        assert!(!opts.mount_domain_sharing);
        assert_eq!(opts.netconf_socket_path, Options::default().netconf_socket_path);
    }

    #[test]
    fn load_missing_file_falls_back_to_defaults() {
        let path = std::path::Path::new("/nonexistent/ncd-options-missing.txt");
        let opts = Options::load(path);
        assert_eq!(opts.netconf_socket_path, Options::default().netconf_socket_path);
    }
}
