//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Writes the process pidfile at startup and unlinks it on clean exit
//! (original spec §6: "daemons unlink their pidfile on clean exit").

use std::path::{Path, PathBuf};

pub struct Pidfile {
    path: PathBuf,
}

impl Pidfile {
    pub fn write(path: impl Into<PathBuf>) -> std::io::Result<Pidfile> {
        let path = path.into();
        std::fs::write(&path, format!("{}\n", std::process::id()))?;
        Ok(Pidfile { path })
    }

    pub fn unlink(self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

impl AsRef<Path> for Pidfile {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_unlink_round_trips() {
        let path = std::env::temp_dir().join(format!("ncd-test-{}.pid", std::process::id()));
        let pidfile = Pidfile::write(&path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.trim(), std::process::id().to_string());
        pidfile.unlink();
        assert!(!path.exists());
    }
}
