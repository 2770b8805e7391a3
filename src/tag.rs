//! Synthetic author and tag listing documents, and the HTML fragments which
//! link to them.
//!
//! Every distinct author and every distinct tag observed across the
//! [`DocumentSet`] gets a listing document at `authors/{slug}/` or
//! `tags/{slug}/`. Values are distinct by slug, so `Rust` and `rust` share a
//! page; the first spelling encountered titles it, and every spelling which
//! maps to the slug joins its filter.

use crate::document::{Document, DocumentSet, Kind, Metadata, OutputLocation, INDEX_FILE_NAME};
use crate::url::BasePath;
use html_escape::{encode_double_quoted_attribute, encode_text};
use log::warn;

/// The output directory of author listing pages.
pub const AUTHORS_DIRECTORY: &str = "authors";

/// The output directory of tag listing pages.
pub const TAGS_DIRECTORY: &str = "tags";

/// The output location of the listing page for `author`, or `None` if the
/// author's name doesn't produce a slug.
pub fn author_location(author: &str) -> Option<OutputLocation> {
    location(AUTHORS_DIRECTORY, author)
}

/// The output location of the listing page for `tag`, or `None` if the tag
/// doesn't produce a slug.
pub fn tag_location(tag: &str) -> Option<OutputLocation> {
    location(TAGS_DIRECTORY, tag)
}

fn location(directory: &str, value: &str) -> Option<OutputLocation> {
    match slug::slugify(value) {
        slug if slug.is_empty() => None,
        slug => Some(OutputLocation::new(&format!("{}/{}", directory, slug))),
    }
}

/// Renders `author` as a link to their listing page (plain text if they
/// have none).
pub fn author_link(author: &str, base_path: &BasePath) -> String {
    match author_location(author) {
        Some(location) => format!(
            r#"<a href="{}">{}</a>"#,
            encode_double_quoted_attribute(&base_path.site_path(&location.url_path())),
            encode_text(author),
        ),
        None => encode_text(author).into_owned(),
    }
}

/// Renders each tag as a badge linking to its listing page, separated by
/// spaces.
pub fn tag_badges(tags: &[String], base_path: &BasePath) -> String {
    tags.iter()
        .map(|tag| {
            let badge = format!(
                r#"<span class="badge bg-secondary tag-badge">{}</span>"#,
                encode_text(tag)
            );
            match tag_location(tag) {
                Some(location) => format!(
                    r#"<a href="{}" class="tag-link">{}</a>"#,
                    encode_double_quoted_attribute(&base_path.site_path(&location.url_path())),
                    badge,
                ),
                None => badge,
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Creates the author and tag listing documents for `documents`: authors
/// first, then tags, each in order of first appearance.
pub fn synthetic_documents(documents: &DocumentSet) -> Vec<Document> {
    let mut synthetic: Vec<Document> = Vec::new();

    let authors = documents.iter().filter_map(|d| d.metadata.author.as_deref());
    for author in authors {
        push_listing(
            &mut synthetic,
            author_location(author),
            author,
            |metadata| &mut metadata.author_filter,
            || Metadata {
                title: Some(format!("Posts by {}", author)),
                ..listing_metadata()
            },
        );
    }

    let tags = documents.iter().flat_map(|d| d.metadata.tags.iter());
    for tag in tags {
        push_listing(
            &mut synthetic,
            tag_location(tag),
            tag,
            |metadata| &mut metadata.tag_filter,
            || Metadata {
                title: Some(format!("Posts tagged with {}", tag)),
                ..listing_metadata()
            },
        );
    }

    synthetic
}

fn listing_metadata() -> Metadata {
    Metadata {
        kind: Kind::List,
        ..Metadata::default()
    }
}

// Adds `value` to the filter of the listing at `location`, creating the
// listing if it doesn't exist yet.
fn push_listing<S, F>(
    synthetic: &mut Vec<Document>,
    location: Option<OutputLocation>,
    value: &str,
    filter: S,
    metadata: F,
) where
    S: Fn(&mut Metadata) -> &mut Vec<String>,
    F: FnOnce() -> Metadata,
{
    let location = match location {
        Some(location) => location,
        None => {
            warn!("`{}` has no usable slug; no listing page is created", value);
            return;
        }
    };
    let index = match synthetic
        .iter()
        .position(|d| d.output_location.as_ref() == Some(&location))
    {
        Some(index) => index,
        None => {
            let source_path = format!("{}/{}", location.as_str(), INDEX_FILE_NAME);
            let mut document = Document::new(&source_path, metadata(), String::new());
            document.output_location = Some(location);
            synthetic.push(document);
            synthetic.len() - 1
        }
    };

    let filter = filter(&mut synthetic[index].metadata);
    let normalized = value.trim().to_lowercase();
    if !filter.iter().any(|f| f.trim().to_lowercase() == normalized) {
        filter.push(value.to_owned());
    }
}

/// Appends the synthetic listing documents to `documents`. A synthetic
/// document whose source path is taken by a real document is skipped. Returns
/// the number of documents appended.
pub fn append_synthetic_documents(documents: &mut DocumentSet) -> usize {
    let mut appended = 0;
    for document in synthetic_documents(documents) {
        let source_path = document.source_path.clone();
        match documents.insert(document) {
            true => appended += 1,
            false => warn!(
                "`{}` already exists; skipping its generated listing page",
                source_path
            ),
        }
    }
    appended
}
