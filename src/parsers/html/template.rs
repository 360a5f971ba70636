//! Template directives understood by the gr8s rendering server.
//!
//! These strings are the contract with the downstream renderer and have to be
//! emitted byte for byte. Bump them together with the server when the dialect
//! changes.

/// Replaces the text of the document's `<title>` element.
pub const PAGE_TITLE: &str = "{{ page_title }}";

/// Appended right before `</head>`.
pub const META_TAGS_BLOCK: &str = r#"{% for tag in meta_tags %}<meta property="{{ tag[0] }}" content="{{ tag[1] }}">
{% endfor %}
{% if canonical_url %}<link rel="canonical" href="{{ canonical_url }}" >{% endif %}"#;

/// Appended before `</main>`, or before `</body>` when the page has no `<main>`.
pub const BODY_CONTENT_BLOCK: &str = r#"{% if gr8s_html_payload %}{{ gr8s_html_payload }}{% else %}<div class="prerendered-text">{{ body_text }}</div>{% endif %}
{% if gr8s_json_payload %}<script id="gr8s-json-payload" type="application/json">{{ gr8s_json_payload }}</script>{% endif %}
"#;

/// Appended before `</footer>`, or before `</body>` when the page has no `<footer>`.
pub const FOOTER_LINKS_BLOCK: &str = r#"{% for link in additional_links %}
<a class="add-link" href="{{ link.url }}">{{ link.title }}</a>
{% endfor %}"#;

/// Removes the server-rendered body text once the page has loaded.
pub const REMOVE_PRERENDERED_TEXT: &str =
    "document.querySelectorAll('.prerendered-text').forEach((e) => e.remove())";

/// Removes the server-rendered additional links once the page has loaded.
pub const REMOVE_ADDED_LINKS: &str =
    "document.querySelectorAll('.add-link').forEach((e) => e.remove())";

/// Wraps removal statements into a `DOMContentLoaded` listener.
///
/// Returns `None` when there is nothing to remove, so no empty script ends up
/// in the page.
pub fn removal_script(statements: &[&str]) -> Option<String> {
    if statements.is_empty() {
        return None;
    }

    Some(format!(
        "  <script>\n  document.addEventListener(\"DOMContentLoaded\", function() {{\n    {}\n  }})\n  </script>",
        statements.join("\n    ")
    ))
}
