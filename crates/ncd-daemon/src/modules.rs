//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Discovers YANG module source files under the configured search
//! paths and resolves `(name, revision)` per the original spec §6:
//! exact match when a file names one revision only, else the latest by
//! lexicographic revision date when the same module name appears more
//! than once across the search path.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// `name@revision.yang` or bare `name.yang`; everything after the
/// first `@` up to `.yang` is treated as the revision date.
fn split_module_filename(filename: &str) -> Option<(&str, Option<&str>)> {
    let stem = filename.strip_suffix(".yang")?;
    match stem.split_once('@') {
        Some((name, revision)) => Some((name, Some(revision))),
        None => Some((stem, None)),
    }
}

/// Scans `search_paths` in order, returning one `(module, source)` pair
/// per distinct module name. When the same name is found more than
/// once (possibly with different revisions, possibly across different
/// search path directories), the entry with the lexicographically
/// greatest revision wins; an unrevisioned file only wins against
/// another unrevisioned file, since an empty revision string already
/// sorts before every real date.
pub fn discover(search_paths: &[impl AsRef<Path>]) -> std::io::Result<Vec<(String, String)>> {
    let mut best: HashMap<String, (String, String)> = HashMap::new();
    for dir in search_paths {
        let entries = match fs::read_dir(dir.as_ref()) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => return Err(e),
        };
        for entry in entries {
            let entry = entry?;
            let filename = entry.file_name();
            let Some(filename) = filename.to_str() else { continue };
            let Some((name, revision)) = split_module_filename(filename) else { continue };
            let revision = revision.unwrap_or("").to_owned();
            let text = fs::read_to_string(entry.path())?;
            let replace = match best.get(name) {
                Some((existing_rev, _)) => revision > *existing_rev,
                None => true,
            };
            if replace {
                best.insert(name.to_owned(), (revision, text));
            }
        }
    }
    Ok(best.into_iter().map(|(name, (_, text))| (name, text)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_latest_revision_across_search_paths() {
        let dir = std::env::temp_dir().join(format!("ncd-modules-test-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("ex@2020-01-01.yang"), "module ex { namespace \"urn:ex\"; prefix ex; }").unwrap();
        fs::write(dir.join("ex@2023-06-01.yang"), "module ex { namespace \"urn:ex2\"; prefix ex; }").unwrap();

        let found = discover(&[&dir]).unwrap();
        fs::remove_dir_all(&dir).unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, "ex");
        assert!(found[0].1.contains("urn:ex2"));
    }

    #[test]
    fn missing_search_path_is_not_an_error() {
        let found = discover(&[Path::new("/nonexistent/ncd-yang-search-path")]).unwrap();
        assert!(found.is_empty());
    }
}
