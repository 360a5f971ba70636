use minify_html::{minify, Cfg};
use tracing::debug;

use crate::core::PrepareError;

/// Minifier settings for a prepared index
///
/// Template directives (`{{ }}` and `{% %}`) must reach the server untouched,
/// and the `<html>`/`<head>` tags and closing tags stay so that the document
/// keeps the shape the directives were inserted into.
static TEMPLATE_SAFE_CONFIG: Cfg = Cfg {
    minify_js: true,
    minify_css: true,
    do_not_minify_doctype: true,
    ensure_spec_compliant_unquoted_attribute_values: true,
    keep_closing_tags: true,
    keep_html_and_head_opening_tags: true,
    keep_spaces_between_attributes: true,
    keep_comments: false,
    keep_input_type_text_attr: true,
    keep_ssi_comments: false,
    preserve_brace_template_syntax: true,
    preserve_chevron_percent_template_syntax: false,
    remove_bangs: false,
    remove_processing_instructions: false,
};

pub fn minify_document(html: &str) -> Result<String, PrepareError> {
    let minified = minify(html.as_bytes(), &TEMPLATE_SAFE_CONFIG);
    debug!(
        before = html.len(),
        after = minified.len(),
        "minified prepared document"
    );

    String::from_utf8(minified).map_err(|error| PrepareError::Minify(error.to_string()))
}
