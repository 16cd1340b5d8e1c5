// Copyright (C) 2022 Leandro Lisboa Penz <lpenz@lpenz.org>
// This file is subject to the terms and conditions defined in
// file 'LICENSE', which is part of this source code package.

//! Where raw version strings come from.
//!
//! A [`Source`] is either a literal string, an installed Python
//! distribution looked up in [`package`] metadata, or the static version
//! of a [`pyproject`] manifest. Any lookup failure is reported as
//! [`Error::SourceUnavailable`](crate::error::Error::SourceUnavailable).

use std::fmt;
use std::path;
use tracing::event;
use tracing::instrument;
use tracing::Level;

use crate::error::Result;

pub mod package;
pub mod pyproject;

/// Directories searched for installed distributions
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum SearchPath {
    /// Ask the given interpreter for its `sys.path`
    Interpreter(String),
    Dirs(Vec<path::PathBuf>),
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Source {
    Literal(String),
    Package { name: String, search: SearchPath },
    Manifest(path::PathBuf),
}

impl Source {
    #[instrument(level = "debug")]
    pub async fn raw_version(&self) -> Result<String> {
        let raw = match self {
            Source::Literal(raw) => raw.clone(),
            Source::Package { name, search } => {
                let dirs = match search {
                    SearchPath::Interpreter(python) => package::interpreter_paths(python).await?,
                    SearchPath::Dirs(dirs) => dirs.clone(),
                };
                package::package_version(name, &dirs).await?
            }
            Source::Manifest(path) => pyproject::read_version(path).await?,
        };
        event!(Level::INFO, source = %self, raw = %raw, "got raw version");
        Ok(raw)
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Literal(raw) => write!(f, "literal {:?}", raw),
            Source::Package { name, .. } => write!(f, "package {}", name),
            Source::Manifest(path) => write!(f, "manifest {}", path.display()),
        }
    }
}

#[tokio::test]
async fn test_literal() -> Result<()> {
    let source = Source::Literal(" 1.2.3 ".into());
    assert_eq!(source.raw_version().await?, " 1.2.3 ");
    Ok(())
}
