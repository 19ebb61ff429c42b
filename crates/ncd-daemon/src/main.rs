//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! The process entry point (§4.9): wires option/module loading, the
//! shared backend task, and the NETCONF listener together. Grounded on
//! `holo-daemon::main`'s phases (load config, init tracing, drop
//! privileges, run), trimmed of the teacher's northbound plugin
//! machinery (gRPC/gNMI clients, plugin loading) since this daemon's
//! only live transport is NETCONF, with RESTCONF/CLI/SNMP wired by
//! external callers against `ncd-netconf::BackendHandle` instead.

mod config;
mod error;
mod listener;
mod logging;
mod modules;
mod persistence;
mod pidfile;
mod privdrop;

use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use config::Config;
use error::DaemonError;
use ncd_store::Datastores;
use ncd_utils::options::Options;
use nix::unistd::Uid;
use tracing::{error, info};

/// The synthetic root element name every persisted datastore document
/// and bound fragment is wrapped in; not itself a YANG identifier.
const DATASTORE_ROOT: &str = "config";

#[derive(Parser)]
#[command(name = "ncd", about = "NETCONF/RESTCONF configuration management daemon")]
struct Cli {
    /// Path to the startup options document (search paths, sockets,
    /// enabled features, the mount-domain sharing flag).
    #[arg(short = 'c', long = "config", value_name = "file")]
    options_path: Option<String>,
    /// Print the resolved startup options and exit without serving.
    #[arg(short = 'C', long = "dump-options")]
    dump_options: bool,
    /// Path to the process configuration file (user/group, logging, pidfile).
    #[arg(long = "daemon-config", value_name = "file")]
    daemon_config: Option<String>,
}

fn init(config: &Config, options: &Options) -> Result<(Arc<ncd_yang::SchemaDomain>, Datastores), DaemonError> {
    let sources = modules::discover(&options.yang_search_paths)?;
    let domain = ncd_yang::load_domain(sources, &options.enabled_features)?;

    let running_path = options.datastore_dir.join("running.xml");
    let running = persistence::load(&running_path, &domain, DATASTORE_ROOT)?;
    let startup = if options.startup_enabled {
        let startup_path = options.datastore_dir.join("startup.xml");
        Some(persistence::load(&startup_path, &domain, DATASTORE_ROOT)?)
    } else {
        None
    };

    let store = Datastores {
        candidate: running.clone(),
        running,
        startup,
        locks: ncd_store::Locks::new(),
        candidate_state: ncd_store::CandidateState::default(),
        hooks: Vec::new(),
    };
    Ok((Arc::new(domain), store))
}

fn main() {
    let cli = Cli::parse();
    let config = Config::load(cli.daemon_config.as_deref());
    let options_path = cli.options_path.unwrap_or_else(|| config.options_path.clone());
    let options = Options::load(Path::new(&options_path));

    if cli.dump_options {
        println!("{}", toml::to_string(&options).expect("options always serialize"));
        return;
    }

    if !Uid::effective().is_root() {
        eprintln!("need privileged user");
        std::process::exit(1);
    }

    logging::init(&config.logging);

    let (domain, store) = match init(&config, &options) {
        Ok(ready) => ready,
        Err(e) => {
            error!(error = %e, "fatal initialization failure");
            std::process::exit(1);
        }
    };

    if let Err(e) = privdrop::drop_to(&config.user) {
        error!(error = %e, "failed to drop root privileges");
        std::process::exit(1);
    }

    let pidfile = match pidfile::Pidfile::write(&config.pidfile) {
        Ok(pidfile) => pidfile,
        Err(e) => {
            error!(error = %e, "failed to write pidfile");
            std::process::exit(1);
        }
    };

    info!("starting up");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to create async runtime");

    let exit_code = runtime.block_on(async move {
        let backend = ncd_netconf::backend::spawn(domain, store);
        match listener::serve(
            &options.netconf_socket_path,
            options.netconf_tcp_addr.as_deref(),
            backend,
            options.max_message_bytes,
        )
        .await
        {
            Ok(()) => 0,
            Err(e) => {
                error!(error = %e, "netconf listener failed");
                1
            }
        }
    });

    pidfile.unlink();
    std::process::exit(exit_code);
}
