//! YAML front-end: text → semantic graph.
//!
//! The serde-style YAML loaders resolve aliases away while loading, which
//! would erase the recursion mechanism entirely, so this adapter drives the
//! event parser directly and keeps anchors and aliases as first-class
//! nodes.
//!
//! The event layer names anchors by numeric id only. Ids are assigned
//! sequentially per definition site, so a preliminary pass over the scanner
//! tokens recovers the textual names: the k-th anchor token is the name of
//! anchor id k. Real names matter: tags and aliases reference anchors by
//! name, and diagnostics should say `*loop`, not `*3`.

use miette::Diagnostic;
use saphyr_parser::scanner::{Scanner, TokenType};
use saphyr_parser::{Event, Marker, Parser, ScanError, Tag};
use thiserror::Error;
use tracing::trace;

use crate::semantic::{SemanticKind, SemanticNode};

/// Errors while turning YAML text into a semantic graph.
#[derive(Debug, Error, Diagnostic)]
pub enum LoadError {
    /// The YAML text itself does not scan/parse.
    #[error("yaml error: {0}")]
    #[diagnostic(code(yawl::loader::scan))]
    Scan(#[from] ScanError),

    /// The event stream ended mid-node.
    #[error("unexpected end of yaml event stream")]
    #[diagnostic(code(yawl::loader::truncated))]
    Truncated,

    /// An event arrived where the grammar does not allow it.
    #[error("unexpected yaml event: {0}")]
    #[diagnostic(code(yawl::loader::unexpected_event))]
    Unexpected(String),
}

/// Load YAML text into a stream-rooted semantic graph.
pub fn load_str(text: &str) -> Result<SemanticNode, LoadError> {
    let mut source = EventSource {
        events: Parser::new_from_str(text),
        names: anchor_names(text),
    };
    source.stream()
}

/// Textual anchor names in definition order (anchor id k → index k-1).
///
/// Scan faults are ignored here; the parser pass reports them properly.
fn anchor_names(text: &str) -> Vec<String> {
    let mut names = Vec::new();
    for token in Scanner::new(text.chars()) {
        if let TokenType::Anchor(name) = token.1 {
            names.push(name.to_string());
        }
    }
    names
}

struct EventSource<I> {
    events: I,
    names: Vec<String>,
}

impl<I> EventSource<I>
where
    I: Iterator<Item = Result<(Event, Marker), ScanError>>,
{
    fn next_event(&mut self) -> Result<Event, LoadError> {
        loop {
            match self.events.next() {
                Some(Ok((Event::Nothing, _))) => continue,
                Some(Ok((event, _span))) => return Ok(event),
                Some(Err(e)) => return Err(e.into()),
                None => return Err(LoadError::Truncated),
            }
        }
    }

    fn anchor_name(&self, aid: usize) -> Option<String> {
        if aid == 0 {
            return None;
        }
        Some(
            self.names
                .get(aid - 1)
                .cloned()
                .unwrap_or_else(|| format!("a{aid}")),
        )
    }

    fn stream(&mut self) -> Result<SemanticNode, LoadError> {
        let event = self.next_event()?;
        if !matches!(event, Event::StreamStart) {
            return Err(LoadError::Unexpected(format!("{event:?}")));
        }
        let mut documents = Vec::new();
        loop {
            match self.next_event()? {
                Event::DocumentStart => documents.push(self.document()?),
                Event::StreamEnd => break,
                other => return Err(LoadError::Unexpected(format!("{other:?}"))),
            }
        }
        trace!(documents = documents.len(), "loaded stream");
        Ok(SemanticNode::stream(documents))
    }

    fn document(&mut self) -> Result<SemanticNode, LoadError> {
        let event = self.next_event()?;
        let root = self.node(event)?;
        match self.next_event()? {
            Event::DocumentEnd => Ok(SemanticNode::document(root)),
            other => Err(LoadError::Unexpected(format!("{other:?}"))),
        }
    }

    fn node(&mut self, event: Event) -> Result<SemanticNode, LoadError> {
        match event {
            Event::Scalar(value, _style, aid, tag) => {
                let text = value.to_string();
                // A bare `~` is YAML's empty node; it compiles to the
                // identity wire, so normalize it to the empty scalar.
                let mut node = if text == "~" {
                    SemanticNode::empty_scalar()
                } else {
                    SemanticNode::scalar(text)
                };
                node.tag = tag.as_ref().and_then(|t| local_tag(t));
                node.anchor = self.anchor_name(aid);
                Ok(node)
            }
            Event::Alias(aid) => {
                let name = self
                    .anchor_name(aid)
                    .ok_or_else(|| LoadError::Unexpected("alias with id 0".into()))?;
                Ok(SemanticNode::alias(name))
            }
            Event::SequenceStart(aid, tag) => {
                let mut children = Vec::new();
                loop {
                    match self.next_event()? {
                        Event::SequenceEnd => break,
                        event => children.push(self.node(event)?),
                    }
                }
                let mut node = SemanticNode::sequence(children);
                node.tag = tag.as_ref().and_then(|t| local_tag(t));
                node.anchor = self.anchor_name(aid);
                Ok(node)
            }
            Event::MappingStart(aid, tag) => {
                let mut children = Vec::new();
                loop {
                    match self.next_event()? {
                        Event::MappingEnd => break,
                        event => children.push(self.node(event)?),
                    }
                }
                let mut node = SemanticNode {
                    kind: SemanticKind::Mapping,
                    children,
                    ..Default::default()
                };
                node.tag = tag.as_ref().and_then(|t| local_tag(t));
                node.anchor = self.anchor_name(aid);
                Ok(node)
            }
            other => Err(LoadError::Unexpected(format!("{other:?}"))),
        }
    }
}

/// Application tags only: `!name` keeps `name`; core-schema tags
/// (`tag:yaml.org,…`) are type hints the language ignores.
fn local_tag(tag: &Tag) -> Option<String> {
    if tag.suffix.is_empty()
        || tag.handle.starts_with("tag:yaml.org")
        || tag.suffix.starts_with("tag:yaml.org")
    {
        return None;
    }
    Some(tag.suffix.to_string())
}
