// Copyright (C) 2022 Leandro Lisboa Penz <lpenz@lpenz.org>
// This file is subject to the terms and conditions defined in
// file 'LICENSE', which is part of this source code package.

//! [`Error`] and [`Result`] types.

use thiserror;

pub type Result<T, E = Error> = core::result::Result<T, E>;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("invalid version {0:?}")]
    InvalidVersion(String),
    #[error("unknown field {0:?} in format string")]
    UnknownField(String),
    #[error("invalid format string: {0}")]
    TemplateSyntax(String),
    #[error("unable to get version from {origin}: {reason}")]
    SourceUnavailable { origin: String, reason: String },
}

impl Error {
    pub fn source_unavailable(origin: impl Into<String>, reason: impl ToString) -> Error {
        Error::SourceUnavailable {
            origin: origin.into(),
            reason: reason.to_string(),
        }
    }
}
