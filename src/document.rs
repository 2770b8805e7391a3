//! Defines the [`Document`] and [`DocumentSet`] types along with the logic for
//! parsing a document's frontmatter. A document's output location is not
//! known at parse time; it is assigned later by [`crate::resolve`] once the
//! whole set has been loaded.

use chrono::NaiveDate;
use log::{debug, warn};
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The file name that marks a document as the index of its directory.
pub const INDEX_FILE_NAME: &str = "index.md";

/// The extension of content files. Matched case-insensitively.
pub const MARKDOWN_EXTENSION: &str = ".md";

/// The frontmatter fence line.
const FENCE: &str = "---";

/// The role a document plays on the site.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    /// A standalone page rendered from its own body.
    Normal,

    /// A page which renders an aggregated listing of other documents instead
    /// of its body.
    List,
}

impl Default for Kind {
    fn default() -> Self {
        Kind::Normal
    }
}

/// The structured metadata of a [`Document`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Metadata {
    pub title: Option<String>,
    pub kind: Kind,
    pub description: Option<String>,

    /// The hero image. Either site-rooted (`/images/a.png`) or bare
    /// (`images/a.png`); both refer to the same file.
    pub image: Option<String>,

    /// The publication date. `None` if missing or unparsable.
    pub date: Option<NaiveDate>,
    pub author: Option<String>,
    pub tags: Vec<String>,

    /// On listing documents, selects documents having any of these tags.
    pub tag_filter: Vec<String>,

    /// On listing documents, selects documents by any of these authors.
    /// Takes precedence over [`Metadata::tag_filter`].
    pub author_filter: Vec<String>,
}

/// A site-root-relative output directory, without leading or trailing
/// separators. The site root itself is the empty location.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OutputLocation(String);

impl OutputLocation {
    /// The location of the site root.
    pub fn root() -> OutputLocation {
        OutputLocation(String::new())
    }

    /// Constructs a location from a forward-slash directory path.
    pub fn new(directory: &str) -> OutputLocation {
        OutputLocation(directory.trim_matches('/').to_owned())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The site-rooted URL path for the location, before any mount prefix is
    /// applied: `/` for the root and `/{location}/` otherwise.
    pub fn url_path(&self) -> String {
        match self.is_root() {
            true => String::from("/"),
            false => format!("/{}/", self.0),
        }
    }

    /// The directory on disk under `output_root`.
    pub fn directory(&self, output_root: &Path) -> PathBuf {
        self.0
            .split('/')
            .filter(|component| !component.is_empty())
            .fold(output_root.to_owned(), |dir, component| dir.join(component))
    }
}

/// One content unit: metadata, body, and (once resolved) its output location.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub metadata: Metadata,

    /// The markdown body. Replaced in place by [`crate::rewrite`].
    pub body: String,

    /// The forward-slash path relative to the content root. Unique within a
    /// [`DocumentSet`].
    pub source_path: String,

    /// Assigned once by [`crate::resolve::assign_output_locations`]; synthetic
    /// documents carry one from creation.
    pub output_location: Option<OutputLocation>,

    pub is_directory_index: bool,
}

impl Document {
    /// Constructs a document whose output location has not been resolved.
    pub fn new(source_path: &str, metadata: Metadata, body: String) -> Document {
        let source_path = source_path.replace('\\', "/");
        Document {
            is_directory_index: file_name(&source_path) == INDEX_FILE_NAME,
            source_path,
            metadata,
            body,
            output_location: None,
        }
    }

    /// Parses a document from the contents of its source file. The file may
    /// begin with a YAML frontmatter block fenced by `---` lines; without one,
    /// the whole file is the body and the metadata takes its defaults.
    pub fn parse(source_path: &str, input: &str) -> Result<Document> {
        let input = input.trim_start_matches('\u{feff}');
        let (metadata, body) = match split_frontmatter(input)? {
            None => (Metadata::default(), input),
            Some((yaml, body)) => {
                let frontmatter: Frontmatter = match yaml.trim().is_empty() {
                    true => Frontmatter::default(),
                    false => serde_yaml::from_str(yaml)?,
                };
                (frontmatter.into_metadata(source_path), body.trim())
            }
        };
        Ok(Document::new(source_path, metadata, body.to_owned()))
    }

    /// The title, or the empty string if there is none.
    pub fn title(&self) -> &str {
        self.metadata.title.as_deref().unwrap_or_default()
    }

    /// The directory of the source path relative to the content root (empty
    /// for documents at the root).
    pub fn source_directory(&self) -> &str {
        source_directory(&self.source_path)
    }

    /// The site-rooted URL path of the resolved output location, before any
    /// mount prefix is applied.
    pub fn url_path(&self) -> Option<String> {
        self.output_location.as_ref().map(OutputLocation::url_path)
    }
}

/// Returns the directory portion of a forward-slash path (empty if the path
/// has no directory).
pub fn source_directory(source_path: &str) -> &str {
    match source_path.rfind('/') {
        Some(i) => &source_path[..i],
        None => "",
    }
}

/// Returns the final component of a forward-slash path.
pub fn file_name(source_path: &str) -> &str {
    match source_path.rfind('/') {
        Some(i) => &source_path[i + 1..],
        None => source_path,
    }
}

/// Reports whether `path` names a content file.
pub fn has_markdown_extension(path: &str) -> bool {
    path.to_ascii_lowercase().ends_with(MARKDOWN_EXTENSION)
}

/// Returns the file name of `source_path` without its content extension.
pub fn file_stem(source_path: &str) -> &str {
    let name = file_name(source_path);
    match has_markdown_extension(name) {
        true => &name[..name.len() - MARKDOWN_EXTENSION.len()],
        false => name,
    }
}

/// Splits `input` into its frontmatter and body. Returns `None` when the input
/// doesn't open with a fence line.
fn split_frontmatter(input: &str) -> Result<Option<(&str, &str)>> {
    let mut lines = input.split_inclusive('\n');
    match lines.next() {
        Some(first) if first.trim_end() == FENCE => {
            let yaml_start = first.len();
            let mut offset = yaml_start;
            for line in lines {
                if line.trim_end() == FENCE {
                    return Ok(Some((
                        &input[yaml_start..offset],
                        &input[offset + line.len()..],
                    )));
                }
                offset += line.len();
            }
            Err(Error::FrontmatterMissingEndFence)
        }
        _ => Ok(None),
    }
}

#[derive(Deserialize, Default)]
struct Frontmatter {
    #[serde(default)]
    title: Option<String>,

    #[serde(default, rename = "type")]
    kind: Option<String>,

    #[serde(default)]
    description: Option<String>,

    #[serde(default)]
    image: Option<String>,

    #[serde(default)]
    date: Option<String>,

    #[serde(default)]
    author: Option<String>,

    #[serde(default, deserialize_with = "nullable_list")]
    tags: Vec<String>,

    #[serde(default, rename = "tagFilter", deserialize_with = "nullable_list")]
    tag_filter: Vec<String>,

    #[serde(default, rename = "authorFilter", deserialize_with = "nullable_list")]
    author_filter: Vec<String>,
}

impl Frontmatter {
    fn into_metadata(self, source_path: &str) -> Metadata {
        Metadata {
            kind: match self.kind.as_deref().map(str::trim) {
                Some(kind) if kind.eq_ignore_ascii_case("list") => Kind::List,
                None | Some("") => Kind::Normal,
                Some(kind) if kind.eq_ignore_ascii_case("normal") => Kind::Normal,
                Some(kind) => {
                    warn!("{}: unknown type `{}`; treating as normal", source_path, kind);
                    Kind::Normal
                }
            },
            date: self.date.as_deref().and_then(|date| {
                let parsed = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok();
                if parsed.is_none() {
                    debug!("{}: ignoring unparsable date `{}`", source_path, date);
                }
                parsed
            }),
            title: non_empty(self.title),
            description: non_empty(self.description),
            image: non_empty(self.image),
            author: non_empty(self.author),
            tags: distinct(self.tags),
            tag_filter: distinct(self.tag_filter),
            author_filter: distinct(self.author_filter),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// Drops blank and repeated values, keeping the first occurrence of each.
fn distinct(values: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        if !value.trim().is_empty() && !out.contains(&value) {
            out.push(value);
        }
    }
    out
}

// A YAML key with no value (`tags:`) deserializes as null rather than as an
// empty sequence.
fn nullable_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// The ordered collection of every [`Document`] in one build. Source paths are
/// unique within the set.
#[derive(Clone, Debug, Default)]
pub struct DocumentSet {
    documents: Vec<Document>,

    /// Maps each source path to its document's position in `documents`.
    index: HashMap<String, usize>,
}

impl DocumentSet {
    /// Constructs a set from `documents`, dropping (with a warning) any
    /// document whose source path is already taken.
    pub fn new(documents: Vec<Document>) -> DocumentSet {
        let mut set = DocumentSet {
            documents: Vec::with_capacity(documents.len()),
            index: HashMap::with_capacity(documents.len()),
        };
        for document in documents {
            let source_path = document.source_path.clone();
            if !set.insert(document) {
                warn!("duplicate source path `{}`; ignoring", source_path);
            }
        }
        set
    }

    /// Appends `document` unless a document with the same source path is
    /// already present. Returns whether the document was appended.
    pub fn insert(&mut self, document: Document) -> bool {
        if self.index.contains_key(&document.source_path) {
            return false;
        }
        self.index
            .insert(document.source_path.clone(), self.documents.len());
        self.documents.push(document);
        true
    }

    /// Looks up a document by exact source path.
    pub fn get(&self, source_path: &str) -> Option<&Document> {
        self.index.get(source_path).map(|&i| &self.documents[i])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Document> {
        self.documents.iter()
    }

    /// Iterates mutably in set order. Callers must not change a document's
    /// `source_path`, which keys the set.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Document> {
        self.documents.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl<'a> IntoIterator for &'a DocumentSet {
    type Item = &'a Document;
    type IntoIter = std::slice::Iter<'a, Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.iter()
    }
}

/// Represents the result of parsing a [`Document`].
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing a [`Document`].
#[derive(Debug, Error)]
pub enum Error {
    /// Returned when the opening frontmatter fence was found but the closing
    /// one was missing.
    #[error("missing closing `---` for frontmatter")]
    FrontmatterMissingEndFence,

    /// Returned when the frontmatter isn't valid YAML.
    #[error("invalid frontmatter: {0}")]
    DeserializeYaml(#[from] serde_yaml::Error),
}
