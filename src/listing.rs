//! Aggregates documents into the chronological listings rendered by `list`
//! pages: the dated documents of a directory, or of a set of tags or authors
//! anywhere on the site, grouped by year and then by month.

use crate::document::{Document, DocumentSet};
use crate::tag::{author_link, tag_badges};
use crate::url::BasePath;
use chrono::Datelike;
use html_escape::{encode_double_quoted_attribute, encode_text};
use log::warn;
use std::fmt::Write;

/// The documents of one calendar month, newest first.
#[derive(Debug)]
pub struct MonthGroup<'a> {
    /// The month number, starting at 1 for January.
    pub month: u32,

    /// The English name of the month.
    pub name: String,
    pub documents: Vec<&'a Document>,
}

/// The documents of one calendar year, grouped by month, newest first.
#[derive(Debug)]
pub struct YearGroup<'a> {
    pub year: i32,
    pub months: Vec<MonthGroup<'a>>,
}

/// Selects and renders listings against a resolved [`DocumentSet`].
pub struct Aggregator<'a> {
    documents: &'a DocumentSet,
    base_path: &'a BasePath,
}

impl<'a> Aggregator<'a> {
    pub fn new(documents: &'a DocumentSet, base_path: &'a BasePath) -> Aggregator<'a> {
        Aggregator {
            documents,
            base_path,
        }
    }

    /// Selects the documents aggregated by `listing`, newest first. Directory
    /// indexes and undated documents are never selected. An author filter
    /// takes precedence over a tag filter; without either, the documents in
    /// the listing's own directory are selected. Documents sharing a date keep
    /// the order of the set.
    pub fn select(&self, listing: &Document) -> Vec<&'a Document> {
        let author_filter = &listing.metadata.author_filter;
        let tag_filter = &listing.metadata.tag_filter;
        let directory = listing.source_directory();

        let mut selected: Vec<&'a Document> = self
            .documents
            .iter()
            .filter(|d| !d.is_directory_index && d.metadata.date.is_some())
            .filter(|d| {
                if !author_filter.is_empty() {
                    d.metadata
                        .author
                        .as_deref()
                        .map_or(false, |author| matches_any(author_filter, author))
                } else if !tag_filter.is_empty() {
                    d.metadata.tags.iter().any(|tag| matches_any(tag_filter, tag))
                } else {
                    d.source_directory() == directory
                }
            })
            .collect();

        selected.sort_by(|a, b| b.metadata.date.cmp(&a.metadata.date));
        selected
    }

    /// Selects the documents aggregated by `listing` and groups them by year
    /// and month.
    pub fn group(&self, listing: &Document) -> Vec<YearGroup<'a>> {
        group_by_year_month(self.select(listing))
    }

    /// Renders the grouped listing for `listing` as an HTML fragment.
    pub fn render_listing(&self, listing: &Document) -> String {
        let mut html = String::from(r#"<div class="blog-list">"#);
        html.push('\n');
        for year in self.group(listing) {
            let _ = writeln!(html, r#"<h3 class="mt-5 mb-3">{}</h3>"#, year.year);
            for month in &year.months {
                let _ = writeln!(html, r#"<h5 class="mb-2">{}</h5>"#, month.name);
                html.push_str(
                    r#"<ul class="list-group mb-4" style="padding-left: 20px; margin-left: 0;">"#,
                );
                html.push('\n');
                for document in &month.documents {
                    self.render_entry(&mut html, document);
                }
                html.push_str("</ul>\n");
            }
        }
        html.push_str("</div>");
        html
    }

    fn render_entry(&self, html: &mut String, document: &Document) {
        let url_path = match document.url_path() {
            Some(url_path) => url_path,
            None => {
                warn!("`{}` has no output location; leaving it out of listings", document.source_path);
                return;
            }
        };
        let author = match &document.metadata.author {
            Some(author) => format!(" by {}", author_link(author, self.base_path)),
            None => String::new(),
        };
        let _ = writeln!(
            html,
            r#"<li><a class="text-decoration-none" href="{}">{}</a> <span class="text-muted small">{} {}</span></li>"#,
            encode_double_quoted_attribute(&self.base_path.site_path(&url_path)),
            encode_text(document.title()),
            author,
            tag_badges(&document.metadata.tags, self.base_path),
        );
    }
}

fn matches_any(filter: &[String], value: &str) -> bool {
    let value = value.trim().to_lowercase();
    filter.iter().any(|f| f.trim().to_lowercase() == value)
}

/// Partitions dated documents (sorted newest first) into year groups, and
/// each year into month groups, preserving the order of `documents` within
/// each group. Undated documents are skipped.
pub fn group_by_year_month(documents: Vec<&Document>) -> Vec<YearGroup<'_>> {
    let mut years: Vec<YearGroup> = Vec::new();
    for document in documents {
        let date = match document.metadata.date {
            Some(date) => date,
            None => continue,
        };

        if years.last().map_or(true, |y| y.year != date.year()) {
            years.push(YearGroup {
                year: date.year(),
                months: Vec::new(),
            });
        }
        let months = match years.last_mut() {
            Some(year) => &mut year.months,
            None => continue,
        };

        if months.last().map_or(true, |m| m.month != date.month()) {
            months.push(MonthGroup {
                month: date.month(),
                name: date.format("%B").to_string(),
                documents: Vec::new(),
            });
        }
        if let Some(month) = months.last_mut() {
            month.documents.push(document);
        }
    }
    years
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::document::Result;
    use crate::resolve::assign_output_locations;

    fn post(source_path: &str, frontmatter: &str) -> Result<Document> {
        Document::parse(source_path, &format!("---\n{}\n---\nbody", frontmatter))
    }

    fn resolved(documents: Vec<Document>) -> DocumentSet {
        let mut documents = DocumentSet::new(documents);
        assign_output_locations(&mut documents);
        documents
    }

    fn selected_paths(documents: &DocumentSet, listing: &str) -> Vec<String> {
        let base_path = BasePath::default();
        let aggregator = Aggregator::new(documents, &base_path);
        match documents.get(listing) {
            Some(listing) => aggregator
                .select(listing)
                .into_iter()
                .map(|d| d.source_path.clone())
                .collect(),
            None => panic!("no listing `{}`", listing),
        }
    }

    #[test]
    fn test_group_by_year_and_month() -> Result<()> {
        let documents = resolved(vec![
            post("blog/index.md", "title: Blog\ntype: list")?,
            post("blog/a.md", "title: A\ndate: 2024-01-05")?,
            post("blog/b.md", "title: B\ndate: 2024-01-20")?,
            post("blog/c.md", "title: C\ndate: 2023-12-01")?,
        ]);
        let base_path = BasePath::default();
        let aggregator = Aggregator::new(&documents, &base_path);
        let listing = documents.get("blog/index.md").expect("listing exists");

        let groups: Vec<(i32, Vec<(String, Vec<&str>)>)> = aggregator
            .group(listing)
            .into_iter()
            .map(|y| {
                (
                    y.year,
                    y.months
                        .into_iter()
                        .map(|m| {
                            (
                                m.name,
                                m.documents.iter().map(|d| d.source_path.as_str()).collect(),
                            )
                        })
                        .collect(),
                )
            })
            .collect();

        assert_eq!(
            vec![
                (2024, vec![(String::from("January"), vec!["blog/b.md", "blog/a.md"])]),
                (2023, vec![(String::from("December"), vec!["blog/c.md"])]),
            ],
            groups
        );
        Ok(())
    }

    #[test]
    fn test_months_descending_within_year() -> Result<()> {
        let documents = resolved(vec![
            post("index.md", "type: list")?,
            post("a.md", "date: 2024-03-01")?,
            post("b.md", "date: 2024-11-30")?,
            post("c.md", "date: 2024-03-15")?,
        ]);
        let base_path = BasePath::default();
        let aggregator = Aggregator::new(&documents, &base_path);
        let listing = documents.get("index.md").expect("listing exists");
        let groups = aggregator.group(listing);
        assert_eq!(1, groups.len());
        let months: Vec<u32> = groups[0].months.iter().map(|m| m.month).collect();
        assert_eq!(vec![11, 3], months);
        assert_eq!(2, groups[0].months[1].documents.len());
        Ok(())
    }

    #[test]
    fn test_ties_keep_encounter_order() -> Result<()> {
        let documents = resolved(vec![
            post("index.md", "type: list")?,
            post("x.md", "date: 2024-05-05")?,
            post("y.md", "date: 2024-06-01")?,
            post("z.md", "date: 2024-05-05")?,
            post("w.md", "date: 2024-05-05")?,
        ]);
        assert_eq!(
            vec!["y.md", "x.md", "z.md", "w.md"],
            selected_paths(&documents, "index.md")
        );
        Ok(())
    }

    #[test]
    fn test_undated_and_index_documents_are_excluded() -> Result<()> {
        let documents = resolved(vec![
            post("notes/index.md", "type: list\ndate: 2024-01-01\ntags: [a]\nauthor: Ada")?,
            post("notes/dated.md", "date: 2024-01-02\ntags: [a]\nauthor: Ada")?,
            post("notes/undated.md", "tags: [a]\nauthor: Ada")?,
            post("notes/bad-date.md", "date: someday\ntags: [a]\nauthor: Ada")?,
            post("by-tag.md", "type: list\ntagFilter: [a]")?,
            post("by-author.md", "type: list\nauthorFilter: [Ada]")?,
        ]);
        for listing in &["notes/index.md", "by-tag.md", "by-author.md"] {
            assert_eq!(vec!["notes/dated.md"], selected_paths(&documents, listing));
        }
        Ok(())
    }

    #[test]
    fn test_tag_filter_spans_directories() -> Result<()> {
        let documents = resolved(vec![
            post("tags/a/index.md", "type: list\ntagFilter: [\" A \"]")?,
            post("one/first.md", "date: 2024-01-01\ntags: [a]")?,
            post("two/second.md", "date: 2024-01-02\ntags: [b]")?,
            post("three/third.md", "date: 2024-01-03\ntags: [a, b]")?,
        ]);
        assert_eq!(
            vec!["three/third.md", "one/first.md"],
            selected_paths(&documents, "tags/a/index.md")
        );
        Ok(())
    }

    #[test]
    fn test_tag_listing_includes_every_spelling_of_its_slug() -> Result<()> {
        let mut documents = resolved(vec![
            post("a.md", "date: 2024-01-01\ntags: [C]")?,
            post("b.md", "date: 2024-01-02\ntags: [C++]")?,
        ]);
        crate::tag::append_synthetic_documents(&mut documents);
        assert_eq!(vec!["b.md", "a.md"], selected_paths(&documents, "tags/c/index.md"));
        Ok(())
    }

    #[test]
    fn test_author_filter_takes_precedence() -> Result<()> {
        let documents = resolved(vec![
            post("people.md", "type: list\nauthorFilter: [\"grace hopper \"]\ntagFilter: [a]")?,
            post("x/one.md", "date: 2024-01-01\nauthor: Grace Hopper")?,
            post("y/two.md", "date: 2024-01-02\nauthor: Ada\ntags: [a]")?,
            post("people-2.md", "date: 2024-01-03\nauthor: GRACE HOPPER")?,
        ]);
        assert_eq!(
            vec!["people-2.md", "x/one.md"],
            selected_paths(&documents, "people.md")
        );
        Ok(())
    }

    #[test]
    fn test_unfiltered_listing_uses_own_directory() -> Result<()> {
        let documents = resolved(vec![
            post("blog/index.md", "type: list")?,
            post("blog/a.md", "date: 2024-01-01")?,
            post("blog/nested/b.md", "date: 2024-01-02")?,
            post("c.md", "date: 2024-01-03")?,
        ]);
        assert_eq!(vec!["blog/a.md"], selected_paths(&documents, "blog/index.md"));
        Ok(())
    }

    #[test]
    fn test_render_listing() -> Result<()> {
        let documents = resolved(vec![
            post("blog/index.md", "type: list")?,
            post("blog/a.md", "title: Fish & Chips\ndate: 2024-01-05\nauthor: Ada\ntags: [food]")?,
            post("blog/b.md", "title: Later\ndate: 2024-02-01")?,
        ]);
        let base_path = BasePath::new("/site");
        let aggregator = Aggregator::new(&documents, &base_path);
        let listing = documents.get("blog/index.md").expect("listing exists");
        let html = aggregator.render_listing(listing);

        let wanted = concat!(
            "<div class=\"blog-list\">\n",
            "<h3 class=\"mt-5 mb-3\">2024</h3>\n",
            "<h5 class=\"mb-2\">February</h5>\n",
            "<ul class=\"list-group mb-4\" style=\"padding-left: 20px; margin-left: 0;\">\n",
            "<li><a class=\"text-decoration-none\" href=\"/site/blog/later/\">Later</a> ",
            "<span class=\"text-muted small\"> </span></li>\n",
            "</ul>\n",
            "<h5 class=\"mb-2\">January</h5>\n",
            "<ul class=\"list-group mb-4\" style=\"padding-left: 20px; margin-left: 0;\">\n",
            "<li><a class=\"text-decoration-none\" href=\"/site/blog/fish-chips/\">Fish &amp; Chips</a> ",
            "<span class=\"text-muted small\"> by <a href=\"/site/authors/ada/\">Ada</a> ",
            "<a href=\"/site/tags/food/\" class=\"tag-link\"><span class=\"badge bg-secondary tag-badge\">food</span></a>",
            "</span></li>\n",
            "</ul>\n",
            "</div>",
        );
        assert_eq!(wanted, html);
        Ok(())
    }

    #[test]
    fn test_render_empty_listing() -> Result<()> {
        let documents = resolved(vec![post("index.md", "type: list")?]);
        let base_path = BasePath::default();
        let aggregator = Aggregator::new(&documents, &base_path);
        let listing = documents.get("index.md").expect("listing exists");
        assert_eq!("<div class=\"blog-list\">\n</div>", aggregator.render_listing(listing));
        Ok(())
    }
}
