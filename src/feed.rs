//! Support for creating an RSS feed from the dated documents of a site.

use crate::config::Website;
use crate::document::{Document, DocumentSet};
use crate::url::BasePath;
use chrono::{TimeZone, Utc};
use rss::{
    CategoryBuilder, Channel, ChannelBuilder, Enclosure, EnclosureBuilder, GuidBuilder, Item,
    ItemBuilder,
};
use std::io::Write;
use thiserror::Error;

/// The name of the feed file at the output root.
pub const FEED_FILE_NAME: &str = "rss.xml";

/// Bundled configuration for creating a feed.
pub struct FeedConfig<'a> {
    pub website: &'a Website,
    pub base_path: &'a BasePath,
}

/// Creates a feed from the dated documents in `documents` and writes the
/// result to a [`std::io::Write`].
pub fn write_feed<W: Write>(config: &FeedConfig, documents: &DocumentSet, w: W) -> Result<()> {
    let mut w = feed(config, documents).write_to(w)?;
    w.flush()?;
    Ok(())
}

/// Creates the feed channel. Items are the dated documents, newest first;
/// documents sharing a date keep their order in the set.
pub fn feed(config: &FeedConfig, documents: &DocumentSet) -> Channel {
    let mut dated: Vec<&Document> = documents
        .iter()
        .filter(|d| d.metadata.date.is_some())
        .collect();
    dated.sort_by(|a, b| b.metadata.date.cmp(&a.metadata.date));

    ChannelBuilder::default()
        .title(config.website.name.clone())
        .link(config.website.url.clone())
        .description(format!("RSS feed for {}", config.website.name))
        .items(dated.into_iter().filter_map(|d| item(config, d)).collect::<Vec<Item>>())
        .build()
}

fn item(config: &FeedConfig, document: &Document) -> Option<Item> {
    let site_url = config.website.url.trim_end_matches('/');
    let link = format!(
        "{}{}",
        site_url,
        config.base_path.site_path(&document.url_path()?)
    );
    let pub_date = document
        .metadata
        .date
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| Utc.from_utc_datetime(&midnight).to_rfc2822());

    Some(
        ItemBuilder::default()
            .title(document.metadata.title.clone())
            .guid(Some(GuidBuilder::default().value(link.clone()).permalink(true).build()))
            .link(Some(link))
            .description(document.metadata.description.clone())
            .pub_date(pub_date)
            .categories(
                document
                    .metadata
                    .tags
                    .iter()
                    .map(|tag| CategoryBuilder::default().name(tag.clone()).build())
                    .collect::<Vec<_>>(),
            )
            .enclosure(document.metadata.image.as_deref().map(|image| {
                enclosure(&format!(
                    "{}{}",
                    site_url,
                    config.base_path.site_path(image.trim_start_matches('/'))
                ))
            }))
            .build(),
    )
}

fn enclosure(url: &str) -> Enclosure {
    EnclosureBuilder::default()
        .url(url.to_owned())
        .length(String::from("0"))
        .mime_type(mime_type(url).to_owned())
        .build()
}

/// Guesses the MIME type of an image from its extension.
fn mime_type(url: &str) -> &'static str {
    let extension = url
        .rsplit('/')
        .next()
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, extension)| extension.to_ascii_lowercase());
    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("avif") => "image/avif",
        _ => "image/png",
    }
}

/// The result of a fallible feed operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem writing a feed.
#[derive(Debug, Error)]
pub enum Error {
    /// Returned when there is a generic I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Returned when the feed can't be serialized.
    #[error(transparent)]
    Rss(#[from] rss::Error),
}
