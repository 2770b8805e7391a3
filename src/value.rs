//! Conversions from site types into template [`Value`]s. Every string placed
//! in a value is already HTML-escaped (or is trusted HTML), since the template
//! engine does no escaping of its own.

use crate::config::Quacker;
use crate::write::MenuLink;
use gtmpl::Value;
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::collections::HashMap;

/// Builds a [`Value::Object`] from field/value pairs.
pub fn object<I>(fields: I) -> Value
where
    I: IntoIterator<Item = (&'static str, Value)>,
{
    Value::Object(
        fields
            .into_iter()
            .map(|(key, value)| (key.to_owned(), value))
            .collect::<HashMap<String, Value>>(),
    )
}

/// A string value for use as text content.
pub fn text(s: &str) -> Value {
    Value::String(encode_text(s).into_owned())
}

/// A string value for use inside a double-quoted attribute.
pub fn attribute(s: &str) -> Value {
    Value::String(encode_double_quoted_attribute(s).into_owned())
}

/// A string value holding trusted HTML.
pub fn html(s: String) -> Value {
    Value::String(s)
}

impl From<&MenuLink> for Value {
    fn from(link: &MenuLink) -> Value {
        object(vec![("title", text(&link.title)), ("href", attribute(&link.href))])
    }
}

impl From<&Quacker> for Value {
    fn from(quacker: &Quacker) -> Value {
        object(vec![
            ("domain", attribute(&quacker.domain)),
            ("site_owner", attribute(&quacker.site_owner)),
            ("target", attribute(&quacker.target)),
        ])
    }
}
