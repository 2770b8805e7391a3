//! Responsible for templating [`Document`]s into HTML pages and writing them
//! to disk. Each document is written to `{location}/index.html` under the
//! output directory, and a `404.html` page is written at the output root.

use crate::config::{Config, Quacker};
use crate::document::{Document, DocumentSet, Kind, OutputLocation};
use crate::listing::Aggregator;
use crate::markdown;
use crate::tag::{author_link, tag_badges};
use crate::url::BasePath;
use crate::value::{attribute, html, object, text};
use chrono::NaiveDate;
use gtmpl::{Template, Value};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The page template used when the project doesn't configure one.
pub const DEFAULT_TEMPLATE: &str = include_str!("../theme/page.html");

/// The file each document is written to within its output directory.
pub const PAGE_FILE_NAME: &str = "index.html";

/// The file name of the not-found page.
pub const NOT_FOUND_FILE_NAME: &str = "404.html";

/// Parses a page template.
pub fn parse_template(source: &str) -> Result<Template> {
    let mut template = Template::default();
    template
        .parse(source)
        .map_err(|e| Error::Template(e.to_string()))?;
    Ok(template)
}

/// A resolved navigation entry.
#[derive(Clone, Debug, PartialEq)]
pub struct MenuLink {
    pub title: String,
    pub href: String,
}

/// Writes HTML pages for a fully resolved and rewritten [`DocumentSet`].
pub struct Writer<'a> {
    /// The template applied to every page.
    pub template: &'a Template,

    pub config: &'a Config,

    /// The mount prefix applied to every emitted link.
    pub base_path: &'a BasePath,

    pub documents: &'a DocumentSet,

    /// The root directory of the generated site.
    pub output_directory: &'a Path,
}

impl Writer<'_> {
    /// Renders and writes a page for every document, in set order. When two
    /// documents share an output location, the later one overwrites the
    /// earlier. Returns the number of pages written.
    pub fn write_documents(&self) -> Result<usize> {
        let menu = self.menu();
        let aggregator = Aggregator::new(self.documents, self.base_path);
        let mut written: HashSet<&OutputLocation> = HashSet::new();

        for document in self.documents {
            let location = match &document.output_location {
                Some(location) => location,
                None => {
                    warn!("`{}` has no output location; skipping", document.source_path);
                    continue;
                }
            };
            if !written.insert(location) {
                debug!(
                    "`{}` overwrites an earlier page at `{}`",
                    document.source_path,
                    location.url_path()
                );
            }

            let content = match document.metadata.kind {
                Kind::List => aggregator.render_listing(document),
                Kind::Normal => markdown::to_html(&document.body),
            };
            let file_path = location
                .directory(self.output_directory)
                .join(PAGE_FILE_NAME);
            self.write_page(&Page::from_document(document, content), &menu, &file_path)?;
        }
        Ok(written.len())
    }

    /// Writes the not-found page to the output root.
    pub fn write_not_found(&self) -> Result<PathBuf> {
        let page = Page {
            title: Some("404 Not Found"),
            content: format!(
                r#"<p>Go <a href="{}">home</a> to find what you're looking for</p>"#,
                html_escape::encode_double_quoted_attribute(&self.base_path.site_path("/"))
            ),
            ..Page::default()
        };
        let file_path = self.output_directory.join(NOT_FOUND_FILE_NAME);
        self.write_page(&page, &self.menu(), &file_path)?;
        Ok(file_path)
    }

    /// Resolves the configured menu entries to links. An entry's path names
    /// a source document (a leading `/` or `./` is ignored); entries naming
    /// no document link to the site root.
    pub fn menu(&self) -> Vec<MenuLink> {
        self.config
            .menu
            .iter()
            .map(|entry| {
                let path = entry.path.trim();
                let path = path
                    .strip_prefix("./")
                    .or_else(|| path.strip_prefix('/'))
                    .unwrap_or(path);
                let href = match self.documents.locate(path) {
                    Some(location) => self.base_path.site_path(&location.url_path()),
                    None => {
                        debug!(
                            "menu entry `{}` names no document (`{}`); linking to the site root",
                            entry.title, entry.path
                        );
                        self.base_path.site_path("/")
                    }
                };
                MenuLink {
                    title: entry.title.clone(),
                    href,
                }
            })
            .collect()
    }

    fn write_page(&self, page: &Page, menu: &[MenuLink], file_path: &Path) -> Result<()> {
        if let Some(dir) = file_path.parent() {
            std::fs::create_dir_all(dir)?;
        }

        let context = gtmpl::Context::from(self.page_value(page, menu))
            .map_err(|e| Error::Template(e.to_string()))?;
        let mut out: Vec<u8> = Vec::new();
        self.template
            .execute(&mut out, &context)
            .map_err(|e| Error::Template(e.to_string()))?;
        std::fs::write(file_path, out)?;

        info!("Generated: {}", file_path.display());
        Ok(())
    }

    /// Converts a [`Page`] into the [`Value`] handed to the template.
    fn page_value(&self, page: &Page, menu: &[MenuLink]) -> Value {
        let website = &self.config.website;
        let site_path = |path: &str| attribute(&self.base_path.site_path(path));

        let page_title = match page.title {
            Some(title) => format!("{} - {}", title, website.name),
            None => website.name.clone(),
        };
        let (image, og_image) = match page.image {
            Some(image) => {
                let image = self.base_path.site_path(image.trim_start_matches('/'));
                let og_image = format!("{}{}", website.url.trim_end_matches('/'), image);
                (attribute(&image), attribute(&og_image))
            }
            None => (Value::String(String::new()), Value::String(String::new())),
        };

        object(vec![
            ("page_title", text(&page_title)),
            ("site_name", text(&website.name)),
            ("title", text(page.title.unwrap_or_default())),
            ("description", text(page.description.unwrap_or_default())),
            ("image", image),
            ("og_image", og_image),
            ("home", site_path("/")),
            ("favicon", site_path("/images/favicon.ico")),
            ("stylesheet", site_path("/css/bootstrap.min.css")),
            ("script", site_path("/js/bootstrap.js")),
            ("feed", site_path("/rss.xml")),
            ("menu", Value::Array(menu.iter().map(Value::from).collect())),
            (
                "author_line",
                html(match page.author {
                    Some(author) => format!("by {}", author_link(author, self.base_path)),
                    None => String::new(),
                }),
            ),
            (
                "date",
                html(match page.date {
                    Some(date) => format!(
                        r#"<div class="text-muted mb-2">{}</div>"#,
                        date.format("%b %-d, %Y")
                    ),
                    None => String::new(),
                }),
            ),
            ("tags", html(tag_badges(page.tags, self.base_path))),
            ("is_list", Value::Bool(page.is_list)),
            ("content", html(page.content.clone())),
            ("has_quacker", Value::Bool(self.config.quacker.is_some())),
            (
                "quacker",
                Value::from(self.config.quacker.as_ref().unwrap_or(&Quacker::default())),
            ),
        ])
    }
}

/// An output HTML page: either a document or the not-found page.
#[derive(Default)]
struct Page<'a> {
    title: Option<&'a str>,
    description: Option<&'a str>,
    image: Option<&'a str>,
    author: Option<&'a str>,
    date: Option<NaiveDate>,
    tags: &'a [String],
    is_list: bool,

    /// The rendered body or listing.
    content: String,
}

impl<'a> Page<'a> {
    fn from_document(document: &'a Document, content: String) -> Page<'a> {
        let metadata = &document.metadata;
        Page {
            title: metadata.title.as_deref(),
            description: metadata.description.as_deref(),
            image: metadata.image.as_deref(),
            author: metadata.author.as_deref(),
            date: metadata.date,
            tags: &metadata.tags,
            is_list: metadata.kind == Kind::List,
            content,
        }
    }
}

/// The result of a fallible page-writing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug, Error)]
pub enum Error {
    /// An error parsing or executing the template.
    #[error("template error: {0}")]
    Template(String),

    /// An error writing the output files.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::resolve::assign_output_locations;
    use crate::rewrite::rewrite_all;
    use crate::tag::append_synthetic_documents;

    const PROJECT: &str = "website:
  url: https://example.com/
  name: Example & Co
  basePath: /blog
menu:
  - title: Home
    path: index.md
  - title: About
    path: /about.md
  - title: Also About
    path: ./about.md
  - title: Missing
    path: nowhere.md
";

    struct Fixture {
        config: Config,
        base_path: BasePath,
        documents: DocumentSet,
        template: Template,
    }

    fn fixture(project: &str, documents: Vec<Document>) -> Result<Fixture> {
        let config = Config::parse(Path::new("/site"), project)
            .map_err(|e| Error::Template(e.to_string()))?;
        let base_path = config.base_path(false);
        let mut documents = DocumentSet::new(documents);
        assign_output_locations(&mut documents);
        rewrite_all(&mut documents, &base_path);
        append_synthetic_documents(&mut documents);
        Ok(Fixture {
            config,
            base_path,
            documents,
            template: parse_template(DEFAULT_TEMPLATE)?,
        })
    }

    fn document(source_path: &str, input: &str) -> Document {
        match Document::parse(source_path, input) {
            Ok(document) => document,
            Err(e) => panic!("parsing `{}`: {}", source_path, e),
        }
    }

    fn site() -> Vec<Document> {
        vec![
            document("index.md", "---\ntitle: Home\n---\nSee [about](about.md)."),
            document(
                "about.md",
                "---\ntitle: About Me\ndescription: Who <I> am\nimage: images/me.png\n---\n# Hi",
            ),
            document("blog/index.md", "---\ntitle: Posts\ntype: list\n---\n"),
            document(
                "blog/first.md",
                "---\ntitle: First\ndate: 2024-03-05\nauthor: Ada\ntags: [rust]\n---\nOne",
            ),
        ]
    }

    fn writer<'a>(fixture: &'a Fixture, output_directory: &'a Path) -> Writer<'a> {
        Writer {
            template: &fixture.template,
            config: &fixture.config,
            base_path: &fixture.base_path,
            documents: &fixture.documents,
            output_directory,
        }
    }

    fn read(path: PathBuf) -> Result<String> {
        Ok(std::fs::read_to_string(path)?)
    }

    #[test]
    fn test_menu() -> Result<()> {
        let fixture = fixture(PROJECT, site())?;
        let output = Path::new("/unused");
        let hrefs: Vec<(String, String)> = writer(&fixture, output)
            .menu()
            .into_iter()
            .map(|link| (link.title, link.href))
            .collect();
        assert_eq!(
            vec![
                (String::from("Home"), String::from("/blog/")),
                (String::from("About"), String::from("/blog/about-me/")),
                (String::from("Also About"), String::from("/blog/about-me/")),
                (String::from("Missing"), String::from("/blog/")),
            ],
            hrefs
        );
        Ok(())
    }

    #[test]
    fn test_write_documents() -> Result<()> {
        let fixture = fixture(PROJECT, site())?;
        let output = tempfile::tempdir()?;
        let written = writer(&fixture, output.path()).write_documents()?;
        // Four documents plus the Ada author page and the rust tag page.
        assert_eq!(6, written);

        let home = read(output.path().join("index.html"))?;
        assert!(home.contains("<title>Home - Example &amp; Co</title>"), "{}", home);
        assert!(home.contains(r#"<a href="/blog/about-me/">about</a>"#), "{}", home);
        assert!(home.contains(r#"<link rel="stylesheet" href="/blog/css/bootstrap.min.css">"#));
        assert!(home.contains(r#"<a class="nav-link" href="/blog/about-me/">About</a>"#));
        assert!(!home.contains("subscribe-form"));

        let about = read(output.path().join("about-me").join("index.html"))?;
        assert!(about.contains(r#"<h1 id="hi">Hi</h1>"#), "{}", about);
        assert!(about.contains("Who &lt;I&gt; am"), "{}", about);
        assert!(about.contains(r#"<img src="/blog/images/me.png""#), "{}", about);
        assert!(about.contains(r#"content="https://example.com/blog/images/me.png""#));

        let first = read(output.path().join("blog").join("first").join("index.html"))?;
        assert!(first.contains(r#"by <a href="/blog/authors/ada/">Ada</a>"#), "{}", first);
        assert!(first.contains(r#"<div class="text-muted mb-2">Mar 5, 2024</div>"#));
        assert!(first.contains(r#"href="/blog/tags/rust/""#));

        let listing = read(output.path().join("blog").join("index.html"))?;
        assert!(listing.contains(r#"<div class="blog-list">"#), "{}", listing);
        assert!(listing.contains(r#"href="/blog/blog/first/""#), "{}", listing);

        let tag = read(output.path().join("tags").join("rust").join("index.html"))?;
        assert!(tag.contains("Posts tagged with rust"), "{}", tag);
        assert!(tag.contains(r#"href="/blog/blog/first/""#), "{}", tag);
        Ok(())
    }

    #[test]
    fn test_colliding_locations_last_write_wins() -> Result<()> {
        let fixture = fixture(
            PROJECT,
            vec![
                document("a.md", "---\ntitle: Same\n---\nfrom a"),
                document("b.md", "---\ntitle: Same\n---\nfrom b"),
            ],
        )?;
        let output = tempfile::tempdir()?;
        assert_eq!(1, writer(&fixture, output.path()).write_documents()?);
        let page = read(output.path().join("same").join("index.html"))?;
        assert!(page.contains("from b"), "{}", page);
        assert!(!page.contains("from a"), "{}", page);
        Ok(())
    }

    #[test]
    fn test_write_not_found() -> Result<()> {
        let fixture = fixture(
            "website:\n  url: example.com\n  name: Example\nquacker:\n  domain: example.com\n  site_owner: me\n  target: q.example.net\n",
            site(),
        )?;
        let output = tempfile::tempdir()?;
        let path = writer(&fixture, output.path()).write_not_found()?;
        assert_eq!(output.path().join("404.html"), path);

        let page = read(path)?;
        assert!(page.contains("<title>404 Not Found - Example</title>"), "{}", page);
        assert!(page.contains(r#"Go <a href="/">home</a>"#), "{}", page);
        assert!(page.contains(r#"action="https://q.example.net/subscribe""#), "{}", page);
        Ok(())
    }

    #[test]
    fn test_invalid_template() {
        assert!(matches!(
            parse_template("{{if .title}}unterminated"),
            Err(Error::Template(_))
        ));
    }
}
