// Copyright (C) 2022 Leandro Lisboa Penz <lpenz@lpenz.org>
// This file is subject to the terms and conditions defined in
// file 'LICENSE', which is part of this source code package.

use anyhow::Result;
use std::path;
use tracing::event;
use tracing::instrument;
use tracing::Level;

use clap::Parser;
use clap::Subcommand;

use crate::source::SearchPath;
use crate::source::Source;
use crate::template;
use crate::template::Template;
use crate::version::Version;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Lightweight utility for working with Python package version strings",
    long_about = None
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Parse a provided version string and format it
    #[command(
        long_about = "Parse a valid PEP 440 version string and format it.",
        after_long_help = template::fields_help()
    )]
    Parse {
        /// Version string to parse
        #[arg(value_name = "VERSION")]
        version_string: String,
        /// Format string to use for formatting the version
        #[arg(default_value = template::DEFAULT_TEMPLATE)]
        format_string: String,
    },
    /// Get an installed package's version and format it
    #[command(
        long_about = "Get an installed package's version and format it.",
        after_long_help = template::fields_help()
    )]
    Package {
        /// Package name to get version of
        package_name: String,
        /// Format string to use for formatting the version
        #[arg(default_value = template::DEFAULT_TEMPLATE)]
        format_string: String,
        /// Python interpreter whose sys.path is searched
        #[arg(long, env = "VSPECT_PYTHON", default_value = "python3")]
        python: String,
        /// Search this directory instead of the interpreter's sys.path; repeatable
        #[arg(long = "site-packages", value_name = "DIR")]
        site_packages: Vec<path::PathBuf>,
    },
    /// Read a version from a pyproject.toml file and format it
    #[command(
        long_about = "Read a version from a pyproject.toml file and format it. \
                      Requires the version to be statically defined.",
        after_long_help = template::fields_help()
    )]
    Read {
        /// File path or directory of a pyproject.toml file
        path: path::PathBuf,
        /// Format string to use for formatting the version
        #[arg(default_value = template::DEFAULT_TEMPLATE)]
        format_string: String,
    },
}

impl Command {
    pub fn source(&self) -> Source {
        match self {
            Command::Parse { version_string, .. } => Source::Literal(version_string.clone()),
            Command::Package {
                package_name,
                python,
                site_packages,
                ..
            } => Source::Package {
                name: package_name.clone(),
                search: if site_packages.is_empty() {
                    SearchPath::Interpreter(python.clone())
                } else {
                    SearchPath::Dirs(site_packages.clone())
                },
            },
            Command::Read { path, .. } => Source::Manifest(path.clone()),
        }
    }

    pub fn format_string(&self) -> &str {
        match self {
            Command::Parse { format_string, .. }
            | Command::Package { format_string, .. }
            | Command::Read { format_string, .. } => format_string,
        }
    }
}

/// Get the version from the command's source and render it.
/// The template is compiled first, so a bad one fails before any lookup.
#[instrument(level = "debug")]
pub async fn run(command: &Command) -> crate::error::Result<String> {
    let template = Template::parse(command.format_string())?;
    let source = command.source();
    let raw = source.raw_version().await?;
    let version = Version::parse(&raw)?;
    event!(
        Level::INFO,
        source = %source,
        version = %version,
        "parsed version"
    );
    Ok(template.render(&version))
}

#[tokio::main]
pub async fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::init();
    match run(&args.command).await {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(e) => {
            event!(Level::ERROR, error = ?e, command = ?args.command);
            Err(e.into())
        }
    }
}

#[test]
fn test_args() {
    use clap::CommandFactory;
    Args::command().debug_assert();
}

#[test]
fn test_parse_args() -> Result<()> {
    let args = Args::try_parse_from(["vspect", "parse", "1.2.3"])?;
    assert_eq!(
        args.command,
        Command::Parse {
            version_string: "1.2.3".into(),
            format_string: "{version}".into(),
        }
    );
    let args = Args::try_parse_from([
        "vspect",
        "package",
        "--site-packages",
        "/a",
        "pytest",
        "{major}",
        "--site-packages",
        "/b",
    ])?;
    assert_eq!(args.command.format_string(), "{major}");
    assert_eq!(
        args.command.source(),
        Source::Package {
            name: "pytest".into(),
            search: SearchPath::Dirs(vec!["/a".into(), "/b".into()]),
        }
    );
    let args = Args::try_parse_from(["vspect", "read", "."])?;
    assert_eq!(args.command.source(), Source::Manifest(".".into()));
    assert!(Args::try_parse_from(["vspect"]).is_err());
    Ok(())
}

#[tokio::test]
async fn test_run() -> Result<()> {
    let command = Command::Parse {
        version_string: "9!6.7.9a1+foo".into(),
        format_string: "{epoch}{release_version} {pre} {local_segment}".into(),
    };
    assert_eq!(run(&command).await?, "9!6.7.9 a1 foo");
    let command = Command::Parse {
        version_string: "not-a-version".into(),
        format_string: "{version}".into(),
    };
    assert_eq!(
        run(&command).await,
        Err(crate::error::Error::InvalidVersion("not-a-version".into()))
    );
    Ok(())
}
