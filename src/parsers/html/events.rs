//! Parse-event stream over a parsed document.
//!
//! html5ever builds a tree, while the template scanner wants the flat
//! open-tag / text / close-tag stream an event parser would produce. [`walk`]
//! replays the tree in document order. Text and attribute values are handed
//! out in their markup form (re-escaped), so a sink can serialize them as-is.

use markup5ever_rcdom::{Handle, NodeData};

use crate::core::ProcessingError;

use super::utils::{escape_attribute_value, escape_text, is_raw_text_element};

/// One parse event
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DocumentEvent {
    OpenTag {
        name: String,
        attributes: Vec<(String, String)>,
    },
    Text(String),
    CloseTag(String),
}

/// Receiver of parse events
///
/// Events arrive strictly in document order, one call at a time. Only text
/// can be rejected.
pub trait EventSink {
    fn on_open_tag(&mut self, name: &str, attributes: &[(String, String)]);
    fn on_text(&mut self, text: &str) -> Result<(), ProcessingError>;
    fn on_close_tag(&mut self, name: &str);
}

impl DocumentEvent {
    pub fn dispatch<S: EventSink + ?Sized>(&self, sink: &mut S) -> Result<(), ProcessingError> {
        match self {
            DocumentEvent::OpenTag { name, attributes } => sink.on_open_tag(name, attributes),
            DocumentEvent::Text(text) => sink.on_text(text)?,
            DocumentEvent::CloseTag(name) => sink.on_close_tag(name),
        }
        Ok(())
    }
}

/// Feeds every element and text node below `node` to `sink`
///
/// Comments, doctypes and processing instructions produce no events. Every
/// opened element is closed, void elements included.
pub fn walk<S: EventSink + ?Sized>(node: &Handle, sink: &mut S) -> Result<(), ProcessingError> {
    walk_node(node, None, sink)
}

/// Records the event stream instead of acting on it
pub fn collect_events(node: &Handle) -> Vec<DocumentEvent> {
    let mut recorder = EventRecorder::default();
    // The recorder never rejects a text, so the stream is complete either way
    match walk(node, &mut recorder) {
        Ok(()) | Err(ProcessingError::AlreadyProcessed) => recorder.events,
    }
}

fn walk_node<S: EventSink + ?Sized>(
    node: &Handle,
    parent_name: Option<&str>,
    sink: &mut S,
) -> Result<(), ProcessingError> {
    match &node.data {
        NodeData::Document => {
            for child_node in node.children.borrow().iter() {
                walk_node(child_node, None, sink)?;
            }
        }
        NodeData::Element {
            name,
            attrs,
            template_contents,
            ..
        } => {
            let tag_name: &str = &name.local;
            let attributes: Vec<(String, String)> = attrs
                .borrow()
                .iter()
                .map(|attr| {
                    let attr_name = match &attr.name.prefix {
                        Some(prefix) => format!("{}:{}", prefix, attr.name.local),
                        None => attr.name.local.to_string(),
                    };
                    (attr_name, escape_attribute_value(&attr.value))
                })
                .collect();

            sink.on_open_tag(tag_name, &attributes);

            if let Some(contents) = template_contents.borrow().as_ref() {
                for child_node in contents.children.borrow().iter() {
                    walk_node(child_node, Some(tag_name), sink)?;
                }
            }
            for child_node in node.children.borrow().iter() {
                walk_node(child_node, Some(tag_name), sink)?;
            }

            sink.on_close_tag(tag_name);
        }
        NodeData::Text { contents } => {
            let contents = contents.borrow();
            let text = if parent_name.is_some_and(is_raw_text_element) {
                contents.to_string()
            } else {
                escape_text(&contents)
            };
            sink.on_text(&text)?;
        }
        NodeData::Doctype { .. }
        | NodeData::Comment { .. }
        | NodeData::ProcessingInstruction { .. } => {}
    }

    Ok(())
}

#[derive(Default)]
struct EventRecorder {
    events: Vec<DocumentEvent>,
}

impl EventSink for EventRecorder {
    fn on_open_tag(&mut self, name: &str, attributes: &[(String, String)]) {
        self.events.push(DocumentEvent::OpenTag {
            name: name.to_string(),
            attributes: attributes.to_vec(),
        });
    }

    fn on_text(&mut self, text: &str) -> Result<(), ProcessingError> {
        self.events.push(DocumentEvent::Text(text.to_string()));
        Ok(())
    }

    fn on_close_tag(&mut self, name: &str) {
        self.events.push(DocumentEvent::CloseTag(name.to_string()));
    }
}
