// Copyright (C) 2020 Leandro Lisboa Penz <lpenz@lpenz.org>
// This file is subject to the terms and conditions defined in
// file 'LICENSE', which is part of this source code package.

use anyhow::Result;
use man::prelude::*;
use std::env;
use std::error::Error;
use std::fs::{self, File};
use std::io::Write;
use std::path;

fn generate_man_page<P: AsRef<path::Path>>(outdir: P) -> anyhow::Result<()> {
    let outdir = outdir.as_ref();
    let man_path = outdir.join("vspect.1");
    let manpage = Manual::new("vspect")
        .about("Parse PEP 440 version strings and render them through format templates")
        .author(Author::new("Leandro Lisboa Penz").email("lpenz@lpenz.org"))
        .flag(
            Flag::new()
                .short("-h")
                .long("--help")
                .help("Prints help information"),
        )
        .flag(
            Flag::new()
                .short("-V")
                .long("--version")
                .help("Prints version information"),
        )
        .option(
            Opt::new("python")
                .long("--python")
                .default_value("python3")
                .help(
                    "package: Python interpreter whose sys.path is searched; \
                       also read from VSPECT_PYTHON",
                ),
        )
        .option(
            Opt::new("DIR").long("--site-packages").help(
                "package: search DIR instead of the interpreter's sys.path; \
                   can be given more than once",
            ),
        )
        .arg(Arg::new("COMMAND"))
        .arg(Arg::new("ARGUMENT"))
        .arg(Arg::new("[ FORMAT_STRING ]"))
        .description(
            "vspect gets a PEP 440 version string, given literally (parse VERSION),
from an installed Python package (package NAME) or from the static version of
a pyproject.toml (read PATH), and prints it rendered through FORMAT_STRING,
which defaults to {version}. Replacement fields are version, base_version,
major_minor_version, public_version, release_version, major, minor, micro,
patch, epoch, epoch_number, pre, post, post_number, dev, dev_number, local and
local_segment; {{ and }} stand for literal braces.",
        )
        .example(
            Example::new()
                .text("Print the normalized form of a version")
                .command("vspect parse 1.0-RC1"),
        )
        .example(
            Example::new()
                .text("Print the major and minor version of the installed pytest")
                .command("vspect package pytest 'v{major}.{minor}'"),
        )
        .example(
            Example::new()
                .text("Print the base version declared in ./pyproject.toml")
                .command("vspect read . '{base_version}'"),
        )
        .render();
    File::create(&man_path)?.write_all(manpage.as_bytes())?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let mut outdir = path::PathBuf::from(
        env::var_os("OUT_DIR").ok_or_else(|| anyhow::anyhow!("error getting OUT_DIR"))?,
    );
    fs::create_dir_all(&outdir)?;
    generate_man_page(&outdir)?;
    // build/vspect-*/out
    outdir.pop();
    // build/vspect-*
    outdir.pop();
    // build
    outdir.pop();
    // .
    // (either target/release or target/build)
    generate_man_page(&outdir)?;
    Ok(())
}
