// Copyright (C) 2022 Leandro Lisboa Penz <lpenz@lpenz.org>
// This file is subject to the terms and conditions defined in
// file 'LICENSE', which is part of this source code package.

//! Versions of installed Python distributions, read from their
//! `.dist-info`/`METADATA` or `.egg-info`/`PKG-INFO` metadata.

use futures::future::join_all;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path;
use tokio::process::Command;
use tokio_stream::wrappers::ReadDirStream;
use tokio_stream::StreamExt;
use tracing::event;
use tracing::instrument;
use tracing::Level;

use crate::error::Error;
use crate::error::Result;

static NAME_SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-_.]+").unwrap());

const SYS_PATH_SCRIPT: &str = "import sys; print('\\n'.join(p for p in sys.path if p))";

/// Distribution name normalization, as in PEP 503
pub fn normalize_name(name: &str) -> String {
    NAME_SEPARATORS.replace_all(name, "-").to_lowercase()
}

/// The directories of the interpreter's `sys.path`
#[instrument(level = "debug")]
pub async fn interpreter_paths(python: &str) -> Result<Vec<path::PathBuf>> {
    let output = Command::new(python)
        .arg("-c")
        .arg(SYS_PATH_SCRIPT)
        .output()
        .await
        .map_err(|e| Error::source_unavailable(python, e))?;
    if !output.status.success() {
        return Err(Error::source_unavailable(
            python,
            format!("sys.path query failed with {}", output.status),
        ));
    }
    let paths = String::from_utf8_lossy(&output.stdout)
        .lines()
        .filter(|line| !line.is_empty())
        .map(path::PathBuf::from)
        .collect::<Vec<_>>();
    event!(Level::DEBUG, python = python, paths = ?paths, "got sys.path");
    Ok(paths)
}

/// Distribution name of a metadata entry: `foo_bar-1.0.dist-info` -> `foo_bar`
fn distribution_name(filename: &str) -> Option<&str> {
    let stem = filename
        .strip_suffix(".dist-info")
        .or_else(|| filename.strip_suffix(".egg-info"))?;
    stem.split('-').next()
}

/// Metadata entry in `dir` for the distribution with normalized name `wanted`
#[instrument(level = "debug")]
async fn find_in_dir(dir: &path::Path, wanted: &str) -> Option<path::PathBuf> {
    let entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) => {
            event!(Level::DEBUG, dir = ?dir, error = %e, "skipping search directory");
            return None;
        }
    };
    let mut found = ReadDirStream::new(entries)
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry.path()),
            Err(ref e) => {
                event!(Level::WARN, dir = ?dir, error = ?e, "error reading directory entry");
                None
            }
        })
        .filter(|path| {
            path.file_name()
                .and_then(|f| f.to_str())
                .and_then(distribution_name)
                .map(|name| normalize_name(name) == wanted)
                .unwrap_or(false)
        })
        .collect::<Vec<_>>()
        .await;
    // prefer dist-info over egg-info
    found.sort_by_key(|path| path.extension().map(|e| e != "dist-info").unwrap_or(true));
    found.into_iter().next()
}

/// The `Version` header of a metadata file
fn header_version(contents: &str) -> Option<&str> {
    contents
        .lines()
        .take_while(|line| !line.trim().is_empty())
        .find_map(|line| line.strip_prefix("Version:"))
        .map(str::trim)
}

#[instrument(level = "debug", fields(entry = ?entry.display()))]
async fn metadata_version(entry: &path::Path) -> Result<String> {
    let is_dir = tokio::fs::metadata(entry)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false);
    let filename = if is_dir {
        if entry.extension().map(|e| e == "dist-info").unwrap_or(false) {
            entry.join("METADATA")
        } else {
            entry.join("PKG-INFO")
        }
    } else {
        entry.to_owned()
    };
    let origin = filename.display().to_string();
    let contents = tokio::fs::read_to_string(&filename)
        .await
        .map_err(|e| Error::source_unavailable(&origin, e))?;
    header_version(&contents)
        .map(String::from)
        .ok_or_else(|| Error::source_unavailable(&origin, "no Version header"))
}

/// Version of the installed distribution `name`; the first directory
/// holding it wins.
#[instrument(level = "debug")]
pub async fn package_version(name: &str, dirs: &[path::PathBuf]) -> Result<String> {
    let wanted = normalize_name(name);
    let found = join_all(dirs.iter().map(|dir| find_in_dir(dir, &wanted))).await;
    let entry = found.into_iter().flatten().next().ok_or_else(|| {
        Error::source_unavailable(
            format!("package {}", name),
            "no installed distribution found",
        )
    })?;
    event!(Level::INFO, package = name, entry = ?entry, "found distribution");
    metadata_version(&entry).await
}

#[test]
fn test_normalize_name() {
    assert_eq!(normalize_name("Foo.Bar__baz"), "foo-bar-baz");
    assert_eq!(normalize_name("typing_extensions"), "typing-extensions");
    assert_eq!(normalize_name("pytest"), "pytest");
}

#[test]
fn test_distribution_name() {
    assert_eq!(distribution_name("foo_bar-1.0.dist-info"), Some("foo_bar"));
    assert_eq!(distribution_name("foo-1.0-py3.12.egg-info"), Some("foo"));
    assert_eq!(distribution_name("foo.egg-info"), Some("foo"));
    assert_eq!(distribution_name("foo_bar"), None);
    assert_eq!(distribution_name("foo-1.0.tar.gz"), None);
}

#[test]
fn test_header_version() {
    let metadata = "Metadata-Version: 2.1\nName: foo\nVersion: 1.2.3rc1\n\nVersion: 9.9\n";
    assert_eq!(header_version(metadata), Some("1.2.3rc1"));
    assert_eq!(header_version("Metadata-Version: 2.1\nName: foo\n"), None);
}

#[tokio::test]
async fn test_package_version() -> anyhow::Result<()> {
    let empty = tempfile::tempdir()?;
    let site = tempfile::tempdir()?;
    let dist_info = site.path().join("Foo_Bar-2.0.1.dist-info");
    tokio::fs::create_dir(&dist_info).await?;
    tokio::fs::write(
        dist_info.join("METADATA"),
        "Metadata-Version: 2.1\nName: Foo-Bar\nVersion: 2.0.1\n\nlong description\n",
    )
    .await?;
    tokio::fs::write(
        site.path().join("legacy-0.3-py3.12.egg-info"),
        "Metadata-Version: 1.0\nName: legacy\nVersion: 0.3\n",
    )
    .await?;
    let dirs = [
        path::PathBuf::from("/nonexistent/vspect/site-packages"),
        empty.path().to_owned(),
        site.path().to_owned(),
    ];
    assert_eq!(package_version("foo.bar", &dirs).await?, "2.0.1");
    assert_eq!(package_version("Legacy", &dirs).await?, "0.3");
    assert!(matches!(
        package_version("missing", &dirs).await,
        Err(Error::SourceUnavailable { .. })
    ));
    Ok(())
}
