use encoding_rs::Encoding;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// Parses HTML bytes into a DOM
///
/// Unknown encoding labels fall back to lossy UTF-8. A byte order mark is
/// stripped by the decoder.
pub fn html_to_dom(data: &[u8], document_encoding: &str) -> RcDom {
    let encoding = Encoding::for_label(document_encoding.as_bytes()).unwrap_or(encoding_rs::UTF_8);
    let (s, _, _) = encoding.decode(data);

    parse_document(RcDom::default(), Default::default()).one(s.as_ref())
}

pub fn get_node_name(node: &Handle) -> Option<&str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(&*name.local),
        _ => None,
    }
}
