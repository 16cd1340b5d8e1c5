// Copyright (C) 2022 Leandro Lisboa Penz <lpenz@lpenz.org>
// This file is subject to the terms and conditions defined in
// file 'LICENSE', which is part of this source code package.

use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn vspect() -> Result<Command> {
    let mut cmd = Command::cargo_bin("vspect")?;
    cmd.env_remove("RUST_LOG");
    Ok(cmd)
}

#[test]
fn test_help() -> Result<()> {
    vspect()?
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Lightweight utility for working with Python package version strings",
        ))
        .stdout(predicate::str::contains("parse"))
        .stdout(predicate::str::contains("package"))
        .stdout(predicate::str::contains("read"));
    vspect()?
        .args(["parse", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Parse a valid PEP 440 version string and format it.",
        ))
        .stdout(predicate::str::contains("major_minor_version"));
    vspect()?
        .args(["package", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Get an installed package's version and format it.",
        ));
    Ok(())
}

#[test]
fn test_no_command() -> Result<()> {
    vspect()?.assert().failure();
    Ok(())
}

#[test]
fn test_parse() -> Result<()> {
    vspect()?
        .args(["parse", "1.2.3"])
        .assert()
        .success()
        .stdout("1.2.3\n");
    vspect()?
        .args(["parse", "1.2.3.post4.dev5"])
        .assert()
        .success()
        .stdout("1.2.3.post4.dev5\n");
    vspect()?
        .args(["parse", "1.2.3", "{major}.{minor}"])
        .assert()
        .success()
        .stdout("1.2\n");
    vspect()?
        .args(["parse", "V1.0-RC1", "{{{version}}}"])
        .assert()
        .success()
        .stdout("{1.0rc1}\n");
    Ok(())
}

#[test]
fn test_parse_errors() -> Result<()> {
    vspect()?
        .args(["parse", "not-a-version"])
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("not-a-version"));
    vspect()?
        .args(["parse", "1.2.3", "{unknown_field}"])
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("unknown_field"));
    vspect()?
        .args(["parse", "1.2.3", "{major"])
        .assert()
        .failure()
        .stdout("");
    Ok(())
}

#[test]
fn test_read() -> Result<()> {
    let dir = TempDir::new()?;
    fs::write(
        dir.path().join("pyproject.toml"),
        "[project]\nname = \"example\"\nversion = \"9!6.7.9a1+foo\"\n",
    )?;
    vspect()?
        .arg("read")
        .arg(dir.path())
        .assert()
        .success()
        .stdout("9!6.7.9a1+foo\n");
    vspect()?
        .arg("read")
        .arg(dir.path().join("pyproject.toml"))
        .arg("{public_version}")
        .assert()
        .success()
        .stdout("9!6.7.9a1\n");
    Ok(())
}

#[test]
fn test_read_dynamic() -> Result<()> {
    let dir = TempDir::new()?;
    fs::write(
        dir.path().join("pyproject.toml"),
        "[project]\nname = \"example\"\ndynamic = [\"version\"]\n",
    )?;
    vspect()?
        .arg("read")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("dynamic"));
    vspect()?
        .arg("read")
        .arg(dir.path().join("missing.toml"))
        .assert()
        .failure();
    Ok(())
}

#[test]
fn test_package() -> Result<()> {
    let site = TempDir::new()?;
    let dist_info = site.path().join("example_pkg-3.1.4.dist-info");
    fs::create_dir(&dist_info)?;
    fs::write(
        dist_info.join("METADATA"),
        "Metadata-Version: 2.1\nName: example-pkg\nVersion: 3.1.4.post1\n",
    )?;
    vspect()?
        .args(["package", "Example.Pkg", "{major_minor_version}{post}"])
        .arg("--site-packages")
        .arg(site.path())
        .assert()
        .success()
        .stdout("3.1.post1\n");
    vspect()?
        .args(["package", "not-installed"])
        .arg("--site-packages")
        .arg(site.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("not-installed"));
    Ok(())
}
