//! HTML extraction of links and forms
//!
//! This module parses an HTML body to extract:
//! - Raw `href` values of anchors, in document order
//! - Forms with their action, method and inputs
//!
//! Nothing here resolves URLs; the coordinator normalizes and scope-filters
//! the raw values against the page URL.

use scraper::{ElementRef, Html, Selector};

/// A form as written in the markup, before its action is resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawForm {
    /// The `action` attribute, `""` when absent
    pub action: String,
    /// The lowercased `method` attribute, `"get"` when absent or blank
    pub method: String,
    /// `(name, type)` of each input, textarea and select in document order
    pub inputs: Vec<(Option<String>, String)>,
}

/// Everything extracted from one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageExtract {
    /// Trimmed, non-empty anchor `href` values in document order
    pub links: Vec<String>,
    pub forms: Vec<RawForm>,
}

/// Parses HTML content and extracts links and forms
///
/// Malformed markup never fails: the HTML5 tree builder recovers and whatever
/// it produces is extracted.
///
/// # Example
///
/// ```
/// use webscan_crawler::crawler::extract;
///
/// let html = r#"<a href="/a">A</a><form method="POST"><input name="q"></form>"#;
/// let page = extract(html);
/// assert_eq!(page.links, vec!["/a".to_string()]);
/// assert_eq!(page.forms[0].method, "post");
/// assert_eq!(page.forms[0].inputs[0], (Some("q".to_string()), "input".to_string()));
/// ```
pub fn extract(html: &str) -> PageExtract {
    let document = Html::parse_document(html);

    PageExtract {
        links: extract_links(&document),
        forms: extract_forms(&document),
    }
}

fn extract_links(document: &Html) -> Vec<String> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .map(str::to_string)
        .collect()
}

fn extract_forms(document: &Html) -> Vec<RawForm> {
    let (Ok(forms), Ok(inputs)) = (
        Selector::parse("form"),
        Selector::parse("input, textarea, select"),
    ) else {
        return Vec::new();
    };

    document
        .select(&forms)
        .map(|form| extract_form(form, &inputs))
        .collect()
}

fn extract_form(form: ElementRef<'_>, inputs: &Selector) -> RawForm {
    let element = form.value();

    let action = element.attr("action").unwrap_or_default().to_string();
    let method = element
        .attr("method")
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_lowercase)
        .unwrap_or_else(|| "get".to_string());

    let inputs = form
        .select(inputs)
        .map(|input| {
            let value = input.value();
            let name = value.attr("name").map(str::to_string);
            let input_type = value
                .attr("type")
                .map(str::to_string)
                .unwrap_or_else(|| value.name().to_string());
            (name, input_type)
        })
        .collect();

    RawForm {
        action,
        method,
        inputs,
    }
}
