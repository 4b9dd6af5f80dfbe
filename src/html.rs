//! HTML lookup capability for the login page
//!
//! The login step only needs to find one element by DOM id and read one of
//! its attributes. [`HtmlParser`] keeps that behind a small trait so the
//! parsing library can be swapped without touching the protocol code.

use std::collections::HashMap;

/// Element found in a parsed page, detached from the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlElement {
    /// Tag name
    pub name: String,
    /// Attributes as written in the page (entities decoded)
    pub attributes: HashMap<String, String>,
}

impl HtmlElement {
    /// Read an attribute
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// Minimal HTML capability: locate an element by id
pub trait HtmlParser: Send + Sync {
    /// Parse `page` and return the first element whose `id` equals `id`
    fn find_by_id(&self, page: &str, id: &str) -> Option<HtmlElement>;
}

/// [`HtmlParser`] backed by the `scraper` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct ScraperHtmlParser;

impl HtmlParser for ScraperHtmlParser {
    fn find_by_id(&self, page: &str, id: &str) -> Option<HtmlElement> {
        let escaped = id.replace('\\', "\\\\").replace('"', "\\\"");
        let selector = scraper::Selector::parse(&format!("[id=\"{escaped}\"]")).ok()?;
        let document = scraper::Html::parse_document(page);

        document.select(&selector).next().map(|element| {
            let value = element.value();
            HtmlElement {
                name: value.name().to_string(),
                attributes: value
                    .attrs()
                    .map(|(name, value)| (name.to_string(), value.to_string()))
                    .collect(),
            }
        })
    }
}
