// Copyright (C) 2022 Leandro Lisboa Penz <lpenz@lpenz.org>
// This file is subject to the terms and conditions defined in
// file 'LICENSE', which is part of this source code package.

pub mod cmd;

pub mod error;

pub mod version;

pub mod template;

pub mod source;

pub use error::Error;
pub use error::Result;
pub use template::format;
pub use template::Template;
pub use version::Version;

/// Parse a version string, see [`Version::parse`]
pub fn parse(raw: &str) -> Result<Version> {
    Version::parse(raw)
}
