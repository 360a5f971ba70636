//! Single-pass rewriter turning a rendered page into a gr8s template.
//!
//! [`HtmlScanner`] consumes parse events and re-serializes the document line
//! by line, splicing template directives in at four insertion points:
//!
//! - the text of `<title>` becomes [`PAGE_TITLE`]
//! - `</head>` is preceded by the meta tags / canonical link block
//! - `</main>` is preceded by the body content block
//! - `</footer>` is preceded by the additional links block
//!
//! Pages without `<main>` or `<footer>` get the corresponding block right
//! before `</body>` instead, so each block ends up in the output exactly once.
//!
//! A title whose text already equals [`PAGE_TITLE`] is taken as proof the page
//! went through the scanner before, and is rejected. A hand-written page whose
//! real title is literally `{{ page_title }}` is rejected as well.

use tracing::debug;

use crate::core::ProcessingError;

use super::events::EventSink;
use super::template::{
    removal_script, BODY_CONTENT_BLOCK, FOOTER_LINKS_BLOCK, META_TAGS_BLOCK, PAGE_TITLE,
    REMOVE_ADDED_LINKS, REMOVE_PRERENDERED_TEXT,
};
use super::utils::is_void_element;

/// Fixed for the lifetime of one scanner
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScannerOptions {
    /// Drop the server-rendered body text once the page has loaded
    pub remove_prerendered_content: bool,
    /// Drop the server-rendered additional links once the page has loaded
    pub remove_prerendered_links: bool,
}

/// Text substitution waiting for the next text event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct PendingReplacement {
    directive: &'static str,
    /// Element that armed the replacement
    element: &'static str,
}

pub struct HtmlScanner {
    lines: Vec<String>,
    text_replacement: Option<PendingReplacement>,
    body_text_added: bool,
    footer_links_added: bool,
    options: ScannerOptions,
}

impl HtmlScanner {
    pub fn new(options: ScannerOptions) -> Self {
        HtmlScanner {
            lines: Vec::new(),
            text_replacement: None,
            body_text_added: false,
            footer_links_added: false,
            options,
        }
    }

    pub fn on_open_tag(&mut self, name: &str, attributes: &[(String, String)]) {
        self.lines.push(serialize_open_tag(name, attributes));

        if name.eq_ignore_ascii_case("title") {
            self.text_replacement = Some(PendingReplacement {
                directive: PAGE_TITLE,
                element: "title",
            });
        }
    }

    pub fn on_text(&mut self, text: &str) -> Result<(), ProcessingError> {
        if let Some(replacement) = self.text_replacement.take() {
            if replacement.directive.trim() == text.trim() {
                return Err(ProcessingError::AlreadyProcessed);
            }

            debug!("replacing <{}> text with {}", replacement.element, replacement.directive);
            self.lines.push(replacement.directive.to_string());
            return Ok(());
        }

        if !text.is_empty() {
            self.lines.push(text.to_string());
        }

        Ok(())
    }

    pub fn on_close_tag(&mut self, name: &str) {
        let tag_name = name.to_ascii_lowercase();

        // An empty element never delivered the text to replace
        if let Some(replacement) = self.text_replacement {
            if replacement.element == tag_name {
                self.text_replacement = None;
                self.lines.push(replacement.directive.to_string());
            }
        }

        match tag_name.as_str() {
            "head" => {
                self.lines.push(META_TAGS_BLOCK.to_string());
            }
            "main" => {
                self.lines.push(BODY_CONTENT_BLOCK.to_string());
                self.body_text_added = true;
            }
            "footer" => {
                self.lines.push(FOOTER_LINKS_BLOCK.to_string());
                self.footer_links_added = true;
            }
            "body" => {
                if !self.body_text_added {
                    debug!("no <main> element, adding body content before </body>");
                    self.lines.push(BODY_CONTENT_BLOCK.to_string());
                    self.body_text_added = true;
                }
                if !self.footer_links_added {
                    debug!("no <footer> element, adding additional links before </body>");
                    self.lines.push(FOOTER_LINKS_BLOCK.to_string());
                    self.footer_links_added = true;
                }

                let mut statements = Vec::new();
                if self.options.remove_prerendered_content {
                    statements.push(REMOVE_PRERENDERED_TEXT);
                }
                if self.options.remove_prerendered_links {
                    statements.push(REMOVE_ADDED_LINKS);
                }
                if let Some(script) = removal_script(&statements) {
                    self.lines.push(script);
                }
            }
            _ => {}
        }

        if !is_void_element(&tag_name) {
            self.lines.push(format!("</{}>", name));
        }
    }

    /// Output fragments produced so far
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The rewritten document
    pub fn into_output(self) -> String {
        self.lines.join("\n")
    }
}

impl EventSink for HtmlScanner {
    fn on_open_tag(&mut self, name: &str, attributes: &[(String, String)]) {
        HtmlScanner::on_open_tag(self, name, attributes)
    }

    fn on_text(&mut self, text: &str) -> Result<(), ProcessingError> {
        HtmlScanner::on_text(self, text)
    }

    fn on_close_tag(&mut self, name: &str) {
        HtmlScanner::on_close_tag(self, name)
    }
}

/// Serializes an opening tag
///
/// `data-href` on `<link>` becomes `href`, which turns lazily loaded
/// stylesheets into regular ones. Attributes with an empty value are written
/// without `=""`.
pub fn serialize_open_tag(name: &str, attributes: &[(String, String)]) -> String {
    let is_link = name.eq_ignore_ascii_case("link");
    let mut tag = format!("<{}", name);

    for (attr_name, attr_value) in attributes {
        let attr_name = if is_link && attr_name == "data-href" {
            "href"
        } else {
            attr_name.as_str()
        };

        tag.push(' ');
        tag.push_str(attr_name);
        if !attr_value.is_empty() {
            tag.push_str("=\"");
            tag.push_str(attr_value);
            tag.push('"');
        }
    }

    tag.push('>');
    tag
}
