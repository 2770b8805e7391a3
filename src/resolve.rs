//! Assigns every [`Document`] its [`OutputLocation`] and answers lookups from
//! source paths to output locations. Assignment needs the complete
//! [`DocumentSet`] to exist, and must finish before any link is rewritten.

use crate::document::{file_stem, Document, DocumentSet, OutputLocation};
use log::debug;

/// Assigns an output location to every document in `documents` which does
/// not already have one.
///
/// Directory indexes are published at their source directory. Every other
/// document is published at its source directory joined with the slug of its
/// title, falling back to the file name (without extension) when the title
/// doesn't produce a slug. Colliding locations are not deduplicated: the
/// document rendered last overwrites the others on disk.
pub fn assign_output_locations(documents: &mut DocumentSet) {
    for document in documents.iter_mut() {
        if document.output_location.is_none() {
            let location = output_location(document);
            debug!("{} => {}", document.source_path, location.url_path());
            document.output_location = Some(location);
        }
    }
}

/// Computes the output location for a single document.
pub fn output_location(document: &Document) -> OutputLocation {
    let directory = document.source_directory();
    if document.is_directory_index {
        return OutputLocation::new(directory);
    }

    let slug = match slug::slugify(document.title()) {
        slug if slug.is_empty() => file_stem(&document.source_path).to_owned(),
        slug => slug,
    };
    match directory.is_empty() {
        true => OutputLocation::new(&slug),
        false => OutputLocation::new(&format!("{}/{}", directory, slug)),
    }
}

impl DocumentSet {
    /// Returns the output location of the document whose source path is
    /// exactly `source_path`. Returns `None` when no document matches (or
    /// the match hasn't been resolved yet); the site root is returned as
    /// [`OutputLocation::root`], never as `None`.
    pub fn locate(&self, source_path: &str) -> Option<&OutputLocation> {
        self.get(source_path)
            .and_then(|document| document.output_location.as_ref())
    }
}
