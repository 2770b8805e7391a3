//! Rewrites image references and intra-site links in document bodies.
//!
//! Rewriting is line oriented: a link or image reference broken across lines
//! is left as written. Links to other content files are replaced with the
//! published URL of the target document, which is why rewriting must wait
//! until [`crate::resolve::assign_output_locations`] has run over the entire
//! [`DocumentSet`].

use crate::document::{has_markdown_extension, Document, DocumentSet};
use crate::url::BasePath;
use lazy_static::lazy_static;
use log::debug;
use regex::{Captures, Regex};

lazy_static! {
    static ref IMAGE: Regex = Regex::new(r"!\[(.*?)\]\((.*?)\)").unwrap();
    static ref LINK: Regex = Regex::new(r"\[(.*?)\]\((.*?)\)").unwrap();
}

/// The maximum display width of images embedded in document bodies.
const IMAGE_MAX_WIDTH: &str = "800px";

/// Rewrites document bodies against a fully resolved [`DocumentSet`].
pub struct LinkRewriter<'a> {
    documents: &'a DocumentSet,
    base_path: &'a BasePath,
}

impl<'a> LinkRewriter<'a> {
    pub fn new(documents: &'a DocumentSet, base_path: &'a BasePath) -> LinkRewriter<'a> {
        LinkRewriter {
            documents,
            base_path,
        }
    }

    /// Returns the rewritten body of `document`.
    pub fn rewrite(&self, document: &Document) -> String {
        document
            .body
            .split('\n')
            .map(|line| self.rewrite_line(document, line))
            .collect::<Vec<String>>()
            .join("\n")
    }

    fn rewrite_line(&self, document: &Document, line: &str) -> String {
        let line = IMAGE.replace_all(line, |caps: &Captures| {
            format!(
                r#"<img src="{}" alt="{}" style="max-width:{};width:100%;height:auto;" class="mb-3 img-fluid"/>"#,
                &caps[2], &caps[1], IMAGE_MAX_WIDTH,
            )
        });
        LINK.replace_all(&line, |caps: &Captures| {
            match self.resolve_link(document, &caps[2]) {
                Some(url) => format!("[{}]({})", &caps[1], url),
                None => caps[0].to_owned(),
            }
        })
        .into_owned()
    }

    /// Resolves a link target found in `document` to a published URL. Returns
    /// `None` for external links, non-content targets, and content targets
    /// which don't match any document.
    fn resolve_link(&self, document: &Document, target: &str) -> Option<String> {
        let lowered = target.to_ascii_lowercase();
        if lowered.starts_with("http://") || lowered.starts_with("https://") {
            return None;
        }
        if !has_markdown_extension(target) {
            return None;
        }

        let directory = document.source_directory();
        let candidate = if target.starts_with("../") {
            normalize(&join(directory, target))
        } else if !target.contains('/') {
            join(directory, target)
        } else {
            target.to_owned()
        };

        match self.documents.locate(&candidate) {
            Some(location) => Some(self.base_path.site_path(&location.url_path())),
            None => {
                debug!(
                    "{}: leaving dangling link `{}` unrewritten",
                    document.source_path, target
                );
                None
            }
        }
    }
}

/// Rewrites the body of every document in `documents`. All new bodies are
/// computed against the unmodified set before any of them is stored.
pub fn rewrite_all(documents: &mut DocumentSet, base_path: &BasePath) {
    let bodies: Vec<String> = {
        let rewriter = LinkRewriter::new(documents, base_path);
        documents.iter().map(|d| rewriter.rewrite(d)).collect()
    };
    for (document, body) in documents.iter_mut().zip(bodies) {
        document.body = body;
    }
}

fn join(directory: &str, path: &str) -> String {
    match directory.is_empty() {
        true => path.to_owned(),
        false => format!("{}/{}", directory, path),
    }
}

/// Lexically collapses `.` and `..` components. Leading `..` components which
/// would climb above the content root are kept, so such paths never match a
/// document.
fn normalize(path: &str) -> String {
    let mut components: Vec<&str> = Vec::new();
    for component in path.split('/') {
        match component {
            "" | "." => {}
            ".." => match components.last() {
                Some(&last) if last != ".." => {
                    components.pop();
                }
                _ => components.push(".."),
            },
            _ => components.push(component),
        }
    }
    components.join("/")
}
