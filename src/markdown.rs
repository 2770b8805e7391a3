//! Converts rewritten document bodies from markdown to HTML.

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};
use std::collections::HashSet;

/// Converts `markdown` to HTML. Tables, footnotes, strikethrough, task lists
/// and smart punctuation are enabled. Inline HTML (such as the `<img>` tags
/// produced by [`crate::rewrite`]) passes through unchanged. Every heading
/// gets an `id` derived from its text, so `#anchor` links can target it.
pub fn to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(
        &mut out,
        with_heading_ids(Parser::new_ext(markdown, options)).into_iter(),
    );
    out
}

// Replaces the start of each heading with raw HTML carrying an `id`. The id
// is the slug of the heading's text, suffixed with `-1`, `-2`, ... when an
// earlier heading already took it.
fn with_heading_ids<'a, I>(events: I) -> Vec<Event<'a>>
where
    I: Iterator<Item = Event<'a>>,
{
    let mut out: Vec<Event<'a>> = Vec::new();
    let mut used: HashSet<String> = HashSet::new();
    let mut open: Option<(usize, u32, String)> = None;

    for event in events {
        match &event {
            Event::Start(Tag::Heading(level)) => {
                open = Some((out.len(), *level, String::new()));
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some((_, _, heading)) = &mut open {
                    heading.push_str(text);
                }
            }
            Event::End(Tag::Heading(_)) => {
                if let Some((start, level, heading)) = open.take() {
                    let id = unique_id(&mut used, &heading);
                    out[start] = Event::Html(CowStr::from(format!(
                        r#"<h{} id="{}">"#,
                        level, id
                    )));
                }
            }
            _ => {}
        }
        out.push(event);
    }
    out
}

fn unique_id(used: &mut HashSet<String>, heading: &str) -> String {
    let base = match slug::slugify(heading) {
        slug if slug.is_empty() => String::from("heading"),
        slug => slug,
    };
    let mut id = base.clone();
    let mut suffix = 1;
    while !used.insert(id.clone()) {
        id = format!("{}-{}", base, suffix);
        suffix += 1;
    }
    id
}

#[cfg(test)]
mod test {
    use super::*;

    struct TestCase {
        name: &'static str,
        input: &'static str,
        wanted: &'static str,
    }

    #[test]
    fn test_to_html() {
        let test_cases = [
            TestCase {
                name: "paragraph",
                input: "Hello, world",
                wanted: "<p>Hello, world</p>\n",
            },
            TestCase {
                name: "heading",
                input: "# Title",
                wanted: "<h1 id=\"title\">Title</h1>\n",
            },
            TestCase {
                name: "link",
                input: "[next](/blog/next/)",
                wanted: "<p><a href=\"/blog/next/\">next</a></p>\n",
            },
            TestCase {
                name: "strikethrough",
                input: "~~gone~~",
                wanted: "<p><del>gone</del></p>\n",
            },
            TestCase {
                name: "inline-html",
                input: "See <img src=\"/a.png\" alt=\"a\"/> here",
                wanted: "<p>See <img src=\"/a.png\" alt=\"a\"/> here</p>\n",
            },
        ];

        for test_case in &test_cases {
            assert_eq!(
                test_case.wanted,
                to_html(test_case.input),
                "test case `{}`",
                test_case.name
            );
        }
    }

    #[test]
    fn test_heading_ids() {
        let html = to_html("# Hello `World`\n\ntext\n\n## Hello World\n\n### ???\n\n## Hello World");
        assert_eq!(
            concat!(
                "<h1 id=\"hello-world\">Hello <code>World</code></h1>\n",
                "<p>text</p>\n",
                "<h2 id=\"hello-world-1\">Hello World</h2>\n",
                "<h3 id=\"heading\">???</h3>\n",
                "<h2 id=\"hello-world-2\">Hello World</h2>\n",
            ),
            html
        );
    }

    #[test]
    fn test_tables() {
        let html = to_html("| a | b |\n|---|---|\n| 1 | 2 |");
        assert!(html.starts_with("<table>"), "{}", html);
        assert!(html.contains("<td>1</td>"), "{}", html);
    }
}
