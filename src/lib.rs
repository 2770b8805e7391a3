//! The library code for the `folio` static site generator. A build proceeds
//! in distinct phases, each of which finishes over the whole
//! [`document::DocumentSet`] before the next begins:
//!
//! 1. Parsing documents from source files on disk ([`crate::parser`])
//! 2. Assigning every document its output location ([`crate::resolve`])
//! 3. Rewriting intra-site links against those locations ([`crate::rewrite`])
//! 4. Adding a listing document for every tag and author ([`crate::tag`])
//! 5. Rendering every document to disk ([`crate::write`])
//!
//! The ordering matters: a link can only be rewritten once its target has a
//! location, and a listing page can only be rendered once every document it
//! aggregates is in the set. Rendering a page is either converting its body
//! from markdown ([`crate::markdown`]) or, for `list` pages, grouping the
//! selected documents by year and month ([`crate::listing`]). Every link the
//! site emits passes through [`url::BasePath`] so the same build can be
//! served from the domain root or from a subpath.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod document;
pub mod feed;
pub mod listing;
pub mod markdown;
pub mod parser;
pub mod resolve;
pub mod rewrite;
pub mod tag;
pub mod url;
pub mod value;
pub mod write;
