//! Defines the [`Parser`] and [`Error`] types. The parser walks a content
//! root and loads every markdown file beneath it into a [`DocumentSet`]. See
//! [`Document::parse`] for the format of an individual file.

use crate::document::{self, has_markdown_extension, Document, DocumentSet};
use log::debug;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

/// Parses [`Document`]s from source files.
pub struct Parser<'a> {
    /// The directory whose markdown files make up the site.
    content_root: &'a Path,

    /// Directories which are never descended into, typically the output
    /// directory when it lives under the content root.
    excluded: Vec<PathBuf>,
}

impl<'a> Parser<'a> {
    pub fn new(content_root: &'a Path) -> Parser<'a> {
        Parser {
            content_root,
            excluded: Vec::new(),
        }
    }

    /// Skips `directory` (and everything beneath it) while walking.
    pub fn exclude(mut self, directory: &Path) -> Parser<'a> {
        self.excluded.push(directory.to_owned());
        self
    }

    /// Walks the content root and parses every file whose extension is `.md`
    /// (in any case). Hidden files and directories are skipped. Entries are
    /// visited in file-name order, which fixes the order of the returned
    /// [`DocumentSet`].
    pub fn parse_documents(&self) -> Result<DocumentSet> {
        let mut documents = Vec::new();
        let walker = WalkDir::new(self.content_root)
            .sort_by(|a, b| a.file_name().cmp(b.file_name()))
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !self.is_skipped(entry));

        for result in walker {
            let entry = result?;
            if !entry.file_type().is_file() {
                continue;
            }
            let source_path = self.source_path(entry.path())?;
            if has_markdown_extension(&source_path) {
                debug!("Parsing `{}`", source_path);
                documents.push(self.parse_document(entry.path(), &source_path)?);
            }
        }

        Ok(DocumentSet::new(documents))
    }

    fn is_skipped(&self, entry: &DirEntry) -> bool {
        let hidden = entry
            .file_name()
            .to_str()
            .map_or(false, |name| name.starts_with('.'));
        hidden || self.excluded.iter().any(|excluded| excluded == entry.path())
    }

    /// Converts `path` into a forward-slash path relative to the content
    /// root.
    fn source_path(&self, path: &Path) -> Result<String> {
        let relative = path
            .strip_prefix(self.content_root)
            .map_err(|_| Error::InvalidFileName(path.to_owned()))?;
        let mut components = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(name) => components.push(
                    name.to_str()
                        .ok_or_else(|| Error::InvalidFileName(path.to_owned()))?,
                ),
                _ => return Err(Error::InvalidFileName(path.to_owned())),
            }
        }
        Ok(components.join("/"))
    }

    fn parse_document(&self, path: &Path, source_path: &str) -> Result<Document> {
        let parse = || -> Result<Document> {
            let contents = std::fs::read_to_string(path)?;
            Ok(Document::parse(source_path, &contents)?)
        };
        parse().map_err(|e| Error::Annotated(format!("parsing `{}`", source_path), Box::new(e)))
    }
}

/// Represents the result of a [`Parser`] operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing the content tree.
#[derive(Debug, Error)]
pub enum Error {
    /// Returned when a source file's path isn't valid UTF-8 or isn't beneath
    /// the content root.
    #[error("invalid file name: {0:?}")]
    InvalidFileName(PathBuf),

    /// Returned when a file's frontmatter is malformed.
    #[error(transparent)]
    Document(#[from] document::Error),

    /// Returned for I/O errors reading a source file.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Returned for I/O errors walking the content root.
    #[error(transparent)]
    WalkDir(#[from] walkdir::Error),

    /// An error with an annotation.
    #[error("{0}: {1}")]
    Annotated(String, Box<Error>),
}
