//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the output static site: parsing the documents
//! ([`crate::parser`]), resolving their output locations
//! ([`crate::resolve`]), rewriting links ([`crate::rewrite`]), adding the tag
//! and author listings ([`crate::tag`]), rendering pages ([`crate::write`]),
//! copying static assets, and generating the RSS feed ([`crate::feed`]).

use crate::config::Config;
use crate::feed::{write_feed, Error as FeedError, FeedConfig, FEED_FILE_NAME};
use crate::parser::{Error as ParseError, Parser};
use crate::resolve::assign_output_locations;
use crate::rewrite::rewrite_all;
use crate::tag::append_synthetic_documents;
use crate::url::extract_domain;
use crate::write::{parse_template, Error as WriteError, Writer, DEFAULT_TEMPLATE};
use gtmpl::Template;
use log::{debug, error, info};
use std::ffi::OsString;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The project directories copied verbatim into the output directory.
pub const STATIC_DIRECTORIES: [&str; 3] = ["css", "js", "images"];

/// The name of the domain-pinning file written for static hosts.
pub const CNAME_FILE_NAME: &str = "CNAME";

/// Options which vary between builds of the same project.
#[derive(Clone, Debug)]
pub struct BuildOptions {
    /// The root directory of the generated site. Removed and recreated by
    /// every build.
    pub output_directory: PathBuf,

    /// Selects the development mount prefix.
    pub dev: bool,
}

/// Builds the site from a [`Config`] object. This calls into
/// [`Parser::parse_documents`], [`Writer::write_documents`], and
/// [`write_feed`] which do the heavy-lifting. Each phase finishes over the
/// whole document set before the next one starts.
pub fn build_site(config: &Config, options: &BuildOptions) -> Result<()> {
    let base_path = config.base_path(options.dev);
    let template = load_template(config)?;

    let content_directory = resolve_directory(config.content_directory())?;
    let output_directory = resolve_directory(&options.output_directory)?;
    if content_directory.starts_with(&output_directory) {
        return Err(Error::UnsafeOutputDirectory(options.output_directory.clone()));
    }
    // Blow away the old output so pages from removed documents don't linger.
    rmdir(&output_directory)?;

    let mut documents = Parser::new(&content_directory)
        .exclude(&output_directory)
        .parse_documents()?;
    info!("Parsed {} documents", documents.len());

    assign_output_locations(&mut documents);
    rewrite_all(&mut documents, &base_path);
    let synthetic = append_synthetic_documents(&mut documents);
    debug!("Added {} tag and author listings", synthetic);

    let writer = Writer {
        template: &template,
        config,
        base_path: &base_path,
        documents: &documents,
        output_directory: &output_directory,
    };
    writer.write_documents()?;
    writer.write_not_found()?;

    for directory in STATIC_DIRECTORIES.iter() {
        let src = config.project_directory.join(directory);
        if src.is_dir() {
            copy_dir(&src, &output_directory.join(directory))?;
        } else {
            debug!("No `{}` directory; skipping", directory);
        }
    }

    if let Some(domain) = extract_domain(&config.website.url) {
        let path = output_directory.join(CNAME_FILE_NAME);
        match std::fs::write(&path, format!("{}\n", domain)) {
            Ok(()) => info!("Created: {} (CNAME)", path.display()),
            Err(e) => error!("Creating `{}`: {}", path.display(), e),
        }
    }

    let feed_path = output_directory.join(FEED_FILE_NAME);
    write_feed(
        &FeedConfig {
            website: &config.website,
            base_path: &base_path,
        },
        &documents,
        BufWriter::new(File::create(&feed_path)?),
    )?;
    info!("Generated: {}", feed_path.display());

    Ok(())
}

/// Removes the output directory.
pub fn clean(output_directory: &Path) -> Result<()> {
    rmdir(output_directory)?;
    info!("Removed: {}", output_directory.display());
    Ok(())
}

// Resolves `dir` to the absolute path it names once created: the deepest
// existing ancestor is canonicalized, which follows symlinks, and the
// remaining components are applied lexically.
fn resolve_directory(dir: &Path) -> Result<PathBuf> {
    let resolve_error = |err| Error::ResolveDirectory {
        path: dir.to_owned(),
        err,
    };
    let mut existing = dir.to_owned();
    let mut missing: Vec<OsString> = Vec::new();
    let mut resolved = loop {
        match existing.canonicalize() {
            Ok(resolved) => break resolved,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if existing == Path::new(".") {
                    return Err(resolve_error(e));
                }
                let mut components = existing.components();
                match components.next_back() {
                    Some(component) => missing.push(component.as_os_str().to_owned()),
                    None => return Err(resolve_error(e)),
                }
                existing = match components.as_path() {
                    parent if parent.as_os_str().is_empty() => PathBuf::from("."),
                    parent => parent.to_owned(),
                };
            }
            Err(e) => return Err(resolve_error(e)),
        }
    };
    for component in missing.iter().rev() {
        match component.to_str() {
            Some("..") => {
                resolved.pop();
            }
            Some(".") => {}
            _ => resolved.push(component),
        }
    }
    Ok(resolved)
}

fn copy_dir(src: &Path, dst: &Path) -> Result<()> {
    std::fs::create_dir_all(dst)?;
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            copy_dir(&entry.path(), &dst.join(entry.file_name()))?;
        } else {
            std::fs::copy(entry.path(), dst.join(entry.file_name()))?;
        }
    }
    Ok(())
}

// Loads the configured template file, or the built-in template when none is
// configured.
fn load_template(config: &Config) -> Result<Template> {
    match &config.template {
        None => Ok(parse_template(DEFAULT_TEMPLATE)?),
        Some(path) => {
            let contents =
                std::fs::read_to_string(path).map_err(|e| Error::OpenTemplateFile {
                    path: path.to_owned(),
                    err: e,
                })?;
            Ok(parse_template(&contents)?)
        }
    }
}

/// The result of a fallible build operation.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can be during parsing, writing,
/// cleaning output directories, opening template files, and other I/O.
#[derive(Debug, Error)]
pub enum Error {
    /// Returned for errors during parsing.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Returned for errors templating or writing pages.
    #[error(transparent)]
    Write(#[from] WriteError),

    /// Returned for I/O problems while cleaning the output directory.
    #[error("Cleaning directory '{}': {}", .path.display(), .err)]
    Clean { path: PathBuf, err: std::io::Error },

    /// Returned when a directory's absolute path can't be determined.
    #[error("Resolving directory '{}': {}", .path.display(), .err)]
    ResolveDirectory { path: PathBuf, err: std::io::Error },

    /// Returned when the output directory contains the project, since
    /// building removes the output directory first.
    #[error("Refusing to build into '{}': it contains the project", .0.display())]
    UnsafeOutputDirectory(PathBuf),

    /// Returned for I/O problems while opening the template file.
    #[error("Opening template file '{}': {}", .path.display(), .err)]
    OpenTemplateFile { path: PathBuf, err: std::io::Error },

    /// Returned for errors writing the feed.
    #[error(transparent)]
    Feed(#[from] FeedError),

    /// Returned for other I/O errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn rmdir(dir: &Path) -> Result<()> {
    match std::fs::remove_dir_all(dir) {
        Ok(x) => Ok(x),
        Err(e) => match e.kind() {
            std::io::ErrorKind::NotFound => Ok(()),
            _ => Err(Error::Clean {
                path: dir.to_owned(),
                err: e,
            }),
        },
    }
}
