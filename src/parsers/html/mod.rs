//! HTML handling, split into:
//!
//! - `utils`: void and raw text element tables, escaping
//! - `dom`: parsing into an `RcDom`
//! - `events`: the open-tag / text / close-tag stream over a parsed tree
//! - `template`: directives understood by the gr8s server
//! - `scanner`: the rewriter splicing those directives into the stream

pub mod dom;
pub mod events;
pub mod scanner;
pub mod template;
pub mod utils;

pub use dom::{get_node_name, html_to_dom};
pub use events::{collect_events, walk, DocumentEvent, EventSink};
pub use scanner::{serialize_open_tag, HtmlScanner, ScannerOptions};
pub use utils::{is_raw_text_element, is_void_element, VOID_ELEMENTS};
