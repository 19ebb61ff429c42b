//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Tracing layer setup, grounded on `holo-daemon::main::init_tracing`
//! (stdout + rotating file layers), trimmed of the teacher's journald
//! and tokio-console integrations since neither is a workspace
//! dependency here.

use tracing_appender::rolling;
use tracing_subscriber::prelude::*;

use crate::config::{Logging, LoggingFileRotation};

pub fn init(config: &Logging) {
    let file = config.file.enabled.then(|| {
        let appender = match config.file.rotation {
            LoggingFileRotation::Never => rolling::never(&config.file.dir, &config.file.name),
            LoggingFileRotation::Hourly => rolling::hourly(&config.file.dir, &config.file.name),
            LoggingFileRotation::Daily => rolling::daily(&config.file.dir, &config.file.name),
        };
        tracing_subscriber::fmt::layer().with_writer(appender).with_target(false).with_ansi(false)
    });

    let stdout = config.stdout.enabled.then(|| tracing_subscriber::fmt::layer().with_target(false));

    let env_filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive("ncd=debug".parse().unwrap())
        .from_env_lossy();

    tracing_subscriber::registry().with(env_filter).with(file).with(stdout).init();
}
