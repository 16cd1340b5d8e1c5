// Copyright (C) 2022 Leandro Lisboa Penz <lpenz@lpenz.org>
// This file is subject to the terms and conditions defined in
// file 'LICENSE', which is part of this source code package.

//! Format strings: [`Template`] and its replacement [`Field`]s.
//!
//! A template is plain text with `{field}` placeholders; `{{` and `}}`
//! stand for literal braces. Templates are compiled before anything is
//! rendered, so a bad template never produces partial output.

use std::fmt;
use std::str::FromStr;
use tracing::event;
use tracing::instrument;
use tracing::Level;

use crate::error::Error;
use crate::error::Result;
use crate::version::Version;

pub const DEFAULT_TEMPLATE: &str = "{version}";

/// A replacement field that can be used in a template
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Field {
    Version,
    BaseVersion,
    MajorMinorVersion,
    PublicVersion,
    ReleaseVersion,
    Major,
    Minor,
    Micro,
    Patch,
    Epoch,
    EpochNumber,
    Pre,
    Post,
    PostNumber,
    Dev,
    DevNumber,
    Local,
    LocalSegment,
}

impl Field {
    pub const ALL: [Field; 18] = [
        Field::Version,
        Field::BaseVersion,
        Field::MajorMinorVersion,
        Field::PublicVersion,
        Field::ReleaseVersion,
        Field::Major,
        Field::Minor,
        Field::Micro,
        Field::Patch,
        Field::Epoch,
        Field::EpochNumber,
        Field::Pre,
        Field::Post,
        Field::PostNumber,
        Field::Dev,
        Field::DevNumber,
        Field::Local,
        Field::LocalSegment,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Field::Version => "version",
            Field::BaseVersion => "base_version",
            Field::MajorMinorVersion => "major_minor_version",
            Field::PublicVersion => "public_version",
            Field::ReleaseVersion => "release_version",
            Field::Major => "major",
            Field::Minor => "minor",
            Field::Micro => "micro",
            Field::Patch => "patch",
            Field::Epoch => "epoch",
            Field::EpochNumber => "epoch_number",
            Field::Pre => "pre",
            Field::Post => "post",
            Field::PostNumber => "post_number",
            Field::Dev => "dev",
            Field::DevNumber => "dev_number",
            Field::Local => "local",
            Field::LocalSegment => "local_segment",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Field::Version => "The full version string.",
            Field::BaseVersion => {
                "The base version string. Excludes dev, pre, post, and local. \
                 Example: 1.2.3.post4.dev5 -> 1.2.3"
            }
            Field::MajorMinorVersion => {
                "The major and minor version string. Example: 1.2.3 -> 1.2"
            }
            Field::PublicVersion => {
                "The public version string, excludes local. \
                 Example: 9!1.2.3.post4+local -> 9!1.2.3.post4"
            }
            Field::ReleaseVersion => {
                "The release version string, excludes epoch, dev, pre, post, and local. \
                 Example: 9!1.2.3.post4 -> 1.2.3"
            }
            Field::Major => "The major version number. Example: 1.2.3 -> 1",
            Field::Minor => "The minor version number, 0 if missing. Example: 1.2.3 -> 2",
            Field::Micro => "The micro version number, 0 if missing. Example: 1.2.3 -> 3",
            Field::Patch => "Alias for 'micro'.",
            Field::Epoch => {
                "The epoch string including the '!'. Empty string if epoch is 0. \
                 Example: 1!2.3 -> 1!"
            }
            Field::EpochNumber => {
                "The epoch number. Empty string if epoch is 0. Example: 1!2.3 -> 1"
            }
            Field::Pre => "The pre-release string. Empty string if none. Example: 1.2.3a4 -> a4",
            Field::Post => {
                "The post-release string including the '.post'. Empty string if none. \
                 Example: 1.2.3.post4 -> .post4"
            }
            Field::PostNumber => {
                "The post-release number. Empty string if none. Example: 1.2.3.post4 -> 4"
            }
            Field::Dev => {
                "The dev-release string including the '.dev'. Empty string if none. \
                 Example: 1.2.3.dev5 -> .dev5"
            }
            Field::DevNumber => {
                "The dev-release number. Empty string if none. Example: 1.2.3.dev5 -> 5"
            }
            Field::Local => {
                "The local version string including the '+'. Empty string if none. \
                 Example: 1.2.3+local -> +local"
            }
            Field::LocalSegment => {
                "The local version segment. Empty string if none. Example: 1.2.3+local -> local"
            }
        }
    }

    /// Compute the value of the field for the given version
    pub fn render(&self, version: &Version) -> String {
        match self {
            Field::Version => version.to_string(),
            Field::BaseVersion => version.base_version(),
            Field::MajorMinorVersion => format!("{}.{}", version.major(), version.minor()),
            Field::PublicVersion => version.public(),
            Field::ReleaseVersion => version.release_string(),
            Field::Major => version.major().to_string(),
            Field::Minor => version.minor().to_string(),
            Field::Micro | Field::Patch => version.micro().to_string(),
            Field::Epoch => match version.epoch() {
                0 => String::new(),
                n => format!("{}!", n),
            },
            Field::EpochNumber => match version.epoch() {
                0 => String::new(),
                n => n.to_string(),
            },
            Field::Pre => version
                .pre()
                .map(|(kind, n)| format!("{}{}", kind, n))
                .unwrap_or_default(),
            Field::Post => version
                .post()
                .map(|n| format!(".post{}", n))
                .unwrap_or_default(),
            Field::PostNumber => version.post().map(|n| n.to_string()).unwrap_or_default(),
            Field::Dev => version
                .dev()
                .map(|n| format!(".dev{}", n))
                .unwrap_or_default(),
            Field::DevNumber => version.dev().map(|n| n.to_string()).unwrap_or_default(),
            Field::Local => version
                .local_string()
                .map(|s| format!("+{}", s))
                .unwrap_or_default(),
            Field::LocalSegment => version.local_string().unwrap_or_default(),
        }
    }
}

impl FromStr for Field {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        if name.is_empty() {
            return Err(Error::TemplateSyntax(
                "empty field name; use {{ and }} for literal braces".into(),
            ));
        }
        if name.contains([':', '!']) {
            return Err(Error::TemplateSyntax(format!(
                "format specs and conversions are not supported, found in {{{}}}",
                name
            )));
        }
        Field::ALL
            .iter()
            .find(|f| f.name() == name)
            .copied()
            .ok_or_else(|| Error::UnknownField(name.into()))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
enum Piece {
    Literal(String),
    Field(Field),
}

/// A compiled format string
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Template {
    pieces: Vec<Piece>,
}

impl Template {
    #[instrument(level = "debug")]
    pub fn parse(template: &str) -> Result<Template> {
        let mut pieces = Vec::new();
        let mut literal = String::new();
        let mut chars = template.char_indices().peekable();
        while let Some((pos, c)) = chars.next() {
            match c {
                '{' if matches!(chars.peek(), Some((_, '{'))) => {
                    chars.next();
                    literal.push('{');
                }
                '}' if matches!(chars.peek(), Some((_, '}'))) => {
                    chars.next();
                    literal.push('}');
                }
                '}' => {
                    return Err(Error::TemplateSyntax(format!(
                        "single '}}' at position {}",
                        pos
                    )));
                }
                '{' => {
                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some((_, '}')) => break,
                            Some((inner, '{')) => {
                                return Err(Error::TemplateSyntax(format!(
                                    "unexpected '{{' in field name at position {}",
                                    inner
                                )));
                            }
                            Some((_, c)) => name.push(c),
                            None => {
                                return Err(Error::TemplateSyntax(format!(
                                    "'{{' at position {} is never closed",
                                    pos
                                )));
                            }
                        }
                    }
                    if !literal.is_empty() {
                        pieces.push(Piece::Literal(std::mem::take(&mut literal)));
                    }
                    pieces.push(Piece::Field(name.parse()?));
                }
                c => literal.push(c),
            }
        }
        if !literal.is_empty() {
            pieces.push(Piece::Literal(literal));
        }
        Ok(Template { pieces })
    }

    /// The fields referenced by the template, in order of appearance
    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.pieces.iter().filter_map(|p| match p {
            Piece::Field(field) => Some(*field),
            Piece::Literal(_) => None,
        })
    }

    pub fn render(&self, version: &Version) -> String {
        let mut output = String::new();
        for piece in &self.pieces {
            match piece {
                Piece::Literal(s) => output.push_str(s),
                Piece::Field(field) => {
                    let value = field.render(version);
                    event!(Level::DEBUG, field = %field, value = %value, "rendered field");
                    output.push_str(&value);
                }
            }
        }
        output
    }
}

impl Default for Template {
    fn default() -> Self {
        Template {
            pieces: vec![Piece::Field(Field::Version)],
        }
    }
}

impl FromStr for Template {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Template::parse(s)
    }
}

/// Render `version` through the format string `template`
pub fn format(version: &Version, template: &str) -> Result<String> {
    Ok(Template::parse(template)?.render(version))
}

/// Help text listing every field, for the command line
pub fn fields_help() -> String {
    let mut help = String::from(
        "The optional format string has {field} replacement fields, \
         for example: 'v{major}.{minor}'. Use {{ and }} for literal braces.\n\n\
         Available replacement fields are:\n",
    );
    for field in Field::ALL {
        help.push_str(&format!("\n{}\n  {}", field, field.description()));
    }
    help
}

#[cfg(test)]
fn render_all(raw: &str) -> Result<Vec<(&'static str, String)>> {
    let version = Version::parse(raw)?;
    Field::ALL
        .iter()
        .map(|f| -> Result<(&'static str, String)> {
            Ok((f.name(), format(&version, &format!("{{{}}}", f))?))
        })
        .collect()
}

#[test]
fn test_fields_plain() -> Result<()> {
    assert_eq!(
        render_all("1.2.3")?,
        [
            ("version", "1.2.3"),
            ("base_version", "1.2.3"),
            ("major_minor_version", "1.2"),
            ("public_version", "1.2.3"),
            ("release_version", "1.2.3"),
            ("major", "1"),
            ("minor", "2"),
            ("micro", "3"),
            ("patch", "3"),
            ("epoch", ""),
            ("epoch_number", ""),
            ("pre", ""),
            ("post", ""),
            ("post_number", ""),
            ("dev", ""),
            ("dev_number", ""),
            ("local", ""),
            ("local_segment", ""),
        ]
        .map(|(f, v)| (f, v.to_string()))
    );
    Ok(())
}

#[test]
fn test_fields_post_dev() -> Result<()> {
    assert_eq!(
        render_all("1.2.3.post4.dev5")?,
        [
            ("version", "1.2.3.post4.dev5"),
            ("base_version", "1.2.3"),
            ("major_minor_version", "1.2"),
            ("public_version", "1.2.3.post4.dev5"),
            ("release_version", "1.2.3"),
            ("major", "1"),
            ("minor", "2"),
            ("micro", "3"),
            ("patch", "3"),
            ("epoch", ""),
            ("epoch_number", ""),
            ("pre", ""),
            ("post", ".post4"),
            ("post_number", "4"),
            ("dev", ".dev5"),
            ("dev_number", "5"),
            ("local", ""),
            ("local_segment", ""),
        ]
        .map(|(f, v)| (f, v.to_string()))
    );
    Ok(())
}

#[test]
fn test_fields_epoch_pre_local() -> Result<()> {
    assert_eq!(
        render_all("9!6.7.9a1+foo")?,
        [
            ("version", "9!6.7.9a1+foo"),
            ("base_version", "9!6.7.9"),
            ("major_minor_version", "6.7"),
            ("public_version", "9!6.7.9a1"),
            ("release_version", "6.7.9"),
            ("major", "6"),
            ("minor", "7"),
            ("micro", "9"),
            ("patch", "9"),
            ("epoch", "9!"),
            ("epoch_number", "9"),
            ("pre", "a1"),
            ("post", ""),
            ("post_number", ""),
            ("dev", ""),
            ("dev_number", ""),
            ("local", "+foo"),
            ("local_segment", "foo"),
        ]
        .map(|(f, v)| (f, v.to_string()))
    );
    Ok(())
}

#[test]
fn test_short_release() -> Result<()> {
    let v = Version::parse("2")?;
    assert_eq!(format(&v, "{major}.{minor}.{micro}.{patch}")?, "2.0.0.0");
    assert_eq!(format(&v, "{major_minor_version}")?, "2.0");
    assert_eq!(format(&v, "{release_version}")?, "2");
    Ok(())
}

#[test]
fn test_mixed_template() -> Result<()> {
    let v = Version::parse("1.2.3")?;
    assert_eq!(format(&v, "{major}.{minor}")?, "1.2");
    assert_eq!(format(&v, "v{major}-{micro} tag")?, "v1-3 tag");
    assert_eq!(format(&v, "{{{version}}}")?, "{1.2.3}");
    assert_eq!(format(&v, "{{}}")?, "{}");
    assert_eq!(format(&v, "no fields")?, "no fields");
    assert_eq!(format(&v, "")?, "");
    assert_eq!(format(&v, "ünï{major}çødé")?, "ünï1çødé");
    let v = Version::parse("9!6.7.9a1+foo")?;
    assert_eq!(format(&v, "{epoch}{release_version}")?, "9!6.7.9");
    Ok(())
}

#[test]
fn test_unknown_field() -> Result<()> {
    for raw in ["1.2.3", "9!6.7.9a1+foo", "0"] {
        let v = Version::parse(raw)?;
        assert_eq!(
            format(&v, "{unknown_field}"),
            Err(Error::UnknownField("unknown_field".into()))
        );
        assert_eq!(
            format(&v, "{major}.{Minor}"),
            Err(Error::UnknownField("Minor".into()))
        );
    }
    Ok(())
}

#[test]
fn test_syntax_errors() -> Result<()> {
    let v = Version::parse("1.2.3")?;
    for template in [
        "{major",
        "major}",
        "{ma{jor}}",
        "{}",
        "{major:03}",
        "{version!r}",
        "{major}}",
    ] {
        assert!(
            matches!(format(&v, template), Err(Error::TemplateSyntax(_))),
            "{}",
            template
        );
    }
    Ok(())
}

#[test]
fn test_template_fields() -> Result<()> {
    let template = Template::parse("{major}.{minor}{local}")?;
    assert_eq!(
        template.fields().collect::<Vec<_>>(),
        [Field::Major, Field::Minor, Field::Local]
    );
    assert_eq!(Template::default(), Template::parse(DEFAULT_TEMPLATE)?);
    Ok(())
}

#[test]
fn test_fields_help_lists_all() {
    let help = fields_help();
    for field in Field::ALL {
        assert!(help.contains(&format!("\n{}\n  ", field.name())), "{}", field);
    }
}
