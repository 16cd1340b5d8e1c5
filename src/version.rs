// Copyright (C) 2022 Leandro Lisboa Penz <lpenz@lpenz.org>
// This file is subject to the terms and conditions defined in
// file 'LICENSE', which is part of this source code package.

//! PEP 440 [`Version`] type and its parser.
//!
//! Parsing accepts every spelling the scheme allows (any case, `-`/`_`/`.`
//! separators, implicit numbers, leading zeros, a leading `v`) and keeps
//! only the normalized components, so equivalent spellings compare equal
//! and render to the same canonical string.

use once_cell::sync::Lazy;
use regex::Captures;
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use tracing::instrument;

use crate::error::Error;
use crate::error::Result;

/// Version grammar, after the regex in PEP 440's appendix B
static VERSION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?xi)
        ^\s*
        v?
        (?:(?P<epoch>[0-9]+)!)?
        (?P<release>[0-9]+(?:\.[0-9]+)*)
        (?P<pre_field>
            [-_\.]?
            (?P<pre_l>alpha|a|beta|b|preview|pre|c|rc)
            [-_\.]?
            (?P<pre_n>[0-9]+)?
        )?
        (?P<post_field>
            (?:-(?P<post_n1>[0-9]+))
            |
            (?:
                [-_\.]?
                (?P<post_l>post|rev|r)
                [-_\.]?
                (?P<post_n2>[0-9]+)?
            )
        )?
        (?P<dev_field>
            [-_\.]?
            dev
            [-_\.]?
            (?P<dev_n>[0-9]+)?
        )?
        (?:\+(?P<local>[a-z0-9]+(?:[-_\.][a-z0-9]+)*))?
        \s*$",
    )
    .unwrap()
});

/// Pre-release kind, rendered in its short form
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub enum PreRelease {
    Alpha,
    Beta,
    Rc,
}

impl FromStr for PreRelease {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "a" | "alpha" => Ok(PreRelease::Alpha),
            "b" | "beta" => Ok(PreRelease::Beta),
            "c" | "rc" | "pre" | "preview" => Ok(PreRelease::Rc),
            _ => Err(Error::InvalidVersion(s.into())),
        }
    }
}

impl fmt::Display for PreRelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                PreRelease::Alpha => "a",
                PreRelease::Beta => "b",
                PreRelease::Rc => "rc",
            }
        )
    }
}

/// One dot-separated component of the local segment.
///
/// Numeric components compare as integers, the others as lowercase
/// strings.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub enum LocalSegment {
    Number(u64),
    String(String),
}

impl From<&str> for LocalSegment {
    fn from(component: &str) -> LocalSegment {
        match component.parse::<u64>() {
            Ok(number) => LocalSegment::Number(number),
            Err(_) if component.bytes().all(|b| b.is_ascii_digit()) => {
                // Too large for u64: keep it textual, still without leading zeros
                let trimmed = component.trim_start_matches('0');
                LocalSegment::String(trimmed.into())
            }
            Err(_) => LocalSegment::String(component.to_ascii_lowercase()),
        }
    }
}

impl fmt::Display for LocalSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocalSegment::Number(number) => write!(f, "{}", number),
            LocalSegment::String(string) => write!(f, "{}", string),
        }
    }
}

/// A parsed version, such as `1.2.3` or `9!6.7.9a1.post2.dev3+foo.4`
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct Version {
    epoch: u64,
    release: Vec<u64>,
    pre: Option<(PreRelease, u64)>,
    post: Option<u64>,
    dev: Option<u64>,
    local: Option<Vec<LocalSegment>>,
}

impl Version {
    #[instrument(level = "debug")]
    pub fn parse(raw: &str) -> Result<Version> {
        let captures = VERSION_RE
            .captures(raw)
            .ok_or_else(|| Error::InvalidVersion(raw.into()))?;
        Version::from_captures(raw, &captures)
    }

    fn from_captures(raw: &str, captures: &Captures) -> Result<Version> {
        let number = |name: &str| -> Result<Option<u64>> {
            captures
                .name(name)
                .map(|m| {
                    m.as_str()
                        .parse::<u64>()
                        .map_err(|_| Error::InvalidVersion(raw.into()))
                })
                .transpose()
        };
        let epoch = number("epoch")?.unwrap_or_default();
        let release = captures
            .name("release")
            .ok_or_else(|| Error::InvalidVersion(raw.into()))?
            .as_str()
            .split('.')
            .map(|n| n.parse::<u64>().map_err(|_| Error::InvalidVersion(raw.into())))
            .collect::<Result<Vec<_>>>()?;
        let pre = match captures.name("pre_l") {
            Some(kind) => Some((
                kind.as_str()
                    .parse::<PreRelease>()
                    .map_err(|_| Error::InvalidVersion(raw.into()))?,
                number("pre_n")?.unwrap_or_default(),
            )),
            None => None,
        };
        let post = if captures.name("post_field").is_some() {
            Some(number("post_n1")?.or(number("post_n2")?).unwrap_or_default())
        } else {
            None
        };
        let dev = if captures.name("dev_field").is_some() {
            Some(number("dev_n")?.unwrap_or_default())
        } else {
            None
        };
        let local = captures.name("local").map(|local| {
            local
                .as_str()
                .split(['-', '_', '.'])
                .map(LocalSegment::from)
                .collect::<Vec<_>>()
        });
        Ok(Version {
            epoch,
            release,
            pre,
            post,
            dev,
            local,
        })
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// The release components; never empty
    pub fn release(&self) -> &[u64] {
        &self.release
    }

    pub fn pre(&self) -> Option<(PreRelease, u64)> {
        self.pre
    }

    pub fn post(&self) -> Option<u64> {
        self.post
    }

    pub fn dev(&self) -> Option<u64> {
        self.dev
    }

    pub fn local(&self) -> Option<&[LocalSegment]> {
        self.local.as_deref()
    }

    /// First release component, falling back to the epoch if there is none.
    pub fn major(&self) -> u64 {
        self.release.first().copied().unwrap_or(self.epoch)
    }

    /// Second release component. Shorter releases are padded with zeros,
    /// so `1` has minor `0`.
    pub fn minor(&self) -> u64 {
        self.release.get(1).copied().unwrap_or_default()
    }

    /// Third release component, zero-padded like [`Version::minor`].
    pub fn micro(&self) -> u64 {
        self.release.get(2).copied().unwrap_or_default()
    }

    /// The release components joined by `.`
    pub fn release_string(&self) -> String {
        self.release
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Epoch and release only: `9!1.2.3`
    pub fn base_version(&self) -> String {
        if self.epoch == 0 {
            self.release_string()
        } else {
            format!("{}!{}", self.epoch, self.release_string())
        }
    }

    /// Everything except the local segment
    pub fn public(&self) -> String {
        let mut s = self.base_version();
        if let Some((kind, n)) = self.pre {
            s.push_str(&format!("{}{}", kind, n));
        }
        if let Some(post) = self.post {
            s.push_str(&format!(".post{}", post));
        }
        if let Some(dev) = self.dev {
            s.push_str(&format!(".dev{}", dev));
        }
        s
    }

    /// The normalized local segment, without the `+`
    pub fn local_string(&self) -> Option<String> {
        self.local.as_ref().map(|segments| {
            segments
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(".")
        })
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Version::parse(s)
    }
}

/// Canonical form
impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.public())?;
        if let Some(local) = self.local_string() {
            write!(f, "+{}", local)?;
        }
        Ok(())
    }
}

#[test]
fn test_parse_components() -> Result<()> {
    let v = Version::parse("9!6.7.9a1.post2.dev3+Foo-004.bar")?;
    assert_eq!(v.epoch(), 9);
    assert_eq!(v.release(), &[6, 7, 9]);
    assert_eq!(v.pre(), Some((PreRelease::Alpha, 1)));
    assert_eq!(v.post(), Some(2));
    assert_eq!(v.dev(), Some(3));
    assert_eq!(
        v.local(),
        Some(
            &[
                LocalSegment::String("foo".into()),
                LocalSegment::Number(4),
                LocalSegment::String("bar".into()),
            ][..]
        )
    );
    assert_eq!(v.to_string(), "9!6.7.9a1.post2.dev3+foo.4.bar");
    Ok(())
}

#[test]
fn test_parse_minimal() -> Result<()> {
    let v = Version::parse("1")?;
    assert_eq!(v.epoch(), 0);
    assert_eq!(v.release(), &[1]);
    assert_eq!(v.pre(), None);
    assert_eq!(v.post(), None);
    assert_eq!(v.dev(), None);
    assert_eq!(v.local(), None);
    assert_eq!((v.major(), v.minor(), v.micro()), (1, 0, 0));
    Ok(())
}

#[test]
fn test_normalization() -> Result<()> {
    let cases = [
        ("1.0dev", "1.0.dev0"),
        ("1.0-dev1", "1.0.dev1"),
        ("1.0.DEV", "1.0.dev0"),
        ("1.0_dev_2", "1.0.dev2"),
        ("1.0a", "1.0a0"),
        ("1.0.alpha1", "1.0a1"),
        ("1.0-ALPHA1", "1.0a1"),
        ("1.0beta", "1.0b0"),
        ("1.0-B1", "1.0b1"),
        ("1.0c", "1.0rc0"),
        ("1.0.C1", "1.0rc1"),
        ("1.0pre2", "1.0rc2"),
        ("1.0-preview3", "1.0rc3"),
        ("1.0RC", "1.0rc0"),
        ("1.0post", "1.0.post0"),
        ("1.0-POST1", "1.0.post1"),
        ("1.0r", "1.0.post0"),
        ("1.0.rev1", "1.0.post1"),
        ("1.0-5", "1.0.post5"),
        ("1.0-r5", "1.0.post5"),
        ("1.0b2-346", "1.0b2.post346"),
        ("1.0+AbC", "1.0+abc"),
        ("1.0+ubuntu-1_2", "1.0+ubuntu.1.2"),
        ("1.01", "1.1"),
        ("1.0a05", "1.0a5"),
        ("1.0c056", "1.0rc56"),
        ("1.0.post000", "1.0.post0"),
        ("1.1.dev09000", "1.1.dev9000"),
        ("00!1.2", "1.2"),
        ("0100!0.0", "100!0.0"),
        ("v1.0", "1.0"),
        ("V1.0", "1.0"),
        ("   v1.0\t\n", "1.0"),
    ];
    for (raw, canonical) in cases {
        let version = Version::parse(raw)?;
        assert_eq!(version.to_string(), canonical, "{}", raw);
        assert_eq!(version, Version::parse(canonical)?, "{}", raw);
    }
    Ok(())
}

#[test]
fn test_canonical_is_idempotent() -> Result<()> {
    for raw in [
        "1.0.dev456",
        "1.0a12.dev456",
        "1.0b2.post345.dev456",
        "1.0rc2",
        "1.0.post456.dev34",
        "1.2+123abc",
        "1.2+1234.abc",
        "1!1.2.post33+123456",
        "2024.10.16",
    ] {
        let once = Version::parse(raw)?.to_string();
        assert_eq!(once, raw);
        assert_eq!(Version::parse(&once)?.to_string(), once);
    }
    Ok(())
}

#[test]
fn test_invalid() {
    for raw in [
        "",
        "not-a-version",
        "french toast",
        "1.0+a+",
        "1.0++",
        "1.0+_foobar",
        "1.0+foo&asd",
        "1.0+1+1",
        "1..0",
        ".1",
        "1.0.",
        "!1.0",
        "1.0a1a2",
        "1.0.dev1.post1",
        "99999999999999999999999.0",
    ] {
        assert_eq!(
            Version::parse(raw),
            Err(Error::InvalidVersion(raw.into())),
            "{}",
            raw
        );
    }
}

#[test]
fn test_derived_strings() -> Result<()> {
    let v: Version = "9!1.2.3rc1.post4.dev5+local.7".parse()?;
    assert_eq!(v.base_version(), "9!1.2.3");
    assert_eq!(v.public(), "9!1.2.3rc1.post4.dev5");
    assert_eq!(v.release_string(), "1.2.3");
    assert_eq!(v.local_string().as_deref(), Some("local.7"));
    Ok(())
}
