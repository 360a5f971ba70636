//! # Parsers
//!
//! - `html` - HTML parsing, the parse-event stream and the template scanner

pub mod html;

pub use html::{collect_events, html_to_dom, walk, DocumentEvent, EventSink, HtmlScanner, ScannerOptions};
