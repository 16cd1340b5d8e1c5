// Copyright (C) 2022 Leandro Lisboa Penz <lpenz@lpenz.org>
// This file is subject to the terms and conditions defined in
// file 'LICENSE', which is part of this source code package.

//! Static `[project].version` of a `pyproject.toml`.

use serde::Deserialize;
use std::path;
use tracing::event;
use tracing::instrument;
use tracing::Level;

use crate::error::Error;
use crate::error::Result;

pub const MANIFEST_NAME: &str = "pyproject.toml";

#[derive(Deserialize, Debug)]
struct PyProject {
    project: Option<Project>,
}

#[derive(Deserialize, Debug)]
struct Project {
    version: Option<String>,
    #[serde(default)]
    dynamic: Vec<String>,
}

/// The manifest file for `path`, which can also be the directory holding it
pub async fn manifest_path(path: &path::Path) -> path::PathBuf {
    match tokio::fs::metadata(path).await {
        Ok(metadata) if metadata.is_dir() => path.join(MANIFEST_NAME),
        _ => path.to_owned(),
    }
}

#[instrument(level = "debug", fields(path = ?path.display()))]
pub async fn read_version(path: &path::Path) -> Result<String> {
    let filename = manifest_path(path).await;
    let origin = filename.display().to_string();
    let contents = tokio::fs::read_to_string(&filename)
        .await
        .map_err(|e| Error::source_unavailable(&origin, e))?;
    static_version(&origin, &contents)
}

fn static_version(origin: &str, contents: &str) -> Result<String> {
    let pyproject: PyProject =
        toml::from_str(contents).map_err(|e| Error::source_unavailable(origin, e))?;
    let project = pyproject
        .project
        .ok_or_else(|| Error::source_unavailable(origin, "no [project] table"))?;
    if project.dynamic.iter().any(|d| d == "version") {
        event!(Level::WARN, origin = origin, "version is dynamic");
        return Err(Error::source_unavailable(
            origin,
            "version is dynamic, only statically defined versions can be read",
        ));
    }
    project
        .version
        .ok_or_else(|| Error::source_unavailable(origin, "no version in [project] table"))
}

#[test]
fn test_static_version() -> Result<()> {
    let s = r#"
[build-system]
requires = ["hatchling"]

[project]
name = "example"
version = "1.2.3.post4"
dependencies = ["packaging"]
"#;
    assert_eq!(static_version("test", s)?, "1.2.3.post4");
    Ok(())
}

#[test]
fn test_dynamic_version() {
    let s = r#"
[project]
name = "example"
dynamic = ["version", "readme"]
"#;
    assert!(matches!(
        static_version("test", s),
        Err(Error::SourceUnavailable { reason, .. }) if reason.contains("dynamic")
    ));
}

#[test]
fn test_missing_version() {
    for s in [
        "[project]\nname = \"example\"\n",
        "[tool.poetry]\nversion = \"1.0\"\n",
        "project = [",
    ] {
        assert!(matches!(
            static_version("test", s),
            Err(Error::SourceUnavailable { .. })
        ));
    }
}
