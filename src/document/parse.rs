use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag};

use super::{DocumentTree, NodeData, NodeId, TreeBuilder, TreeError};

/// Parse Markdown source into a fresh [`DocumentTree`]. This is the only
/// way to obtain a tree: the editor re-parses the whole source after every
/// edit instead of patching nodes in place.
pub fn parse(source: &str) -> Result<DocumentTree, TreeError> {
    let mut builder = TreeBuilder::new(source.len());
    let mut stack: Vec<NodeId> = vec![builder.root()];
    let options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    for (event, range) in Parser::new_ext(source, options).into_offset_iter() {
        let parent = stack.last().copied().unwrap_or(NodeId::ROOT);
        match event {
            Event::Start(tag) => {
                // Unsupported containers stay transparent: their children
                // attach to the enclosing node, keeping the stack balanced.
                let id = match container_data(tag) {
                    Some(data) => builder.push(parent, range, data),
                    None => parent,
                };
                stack.push(id);
            }
            Event::End(_) => {
                if stack.len() > 1 {
                    stack.pop();
                }
            }
            Event::Text(_) => {
                builder.push(parent, range, NodeData::Text);
            }
            Event::Code(_) => {
                builder.push(parent, range, NodeData::InlineCode);
            }
            Event::SoftBreak => {
                builder.push(parent, range, NodeData::SoftBreak);
            }
            Event::HardBreak => {
                builder.push(parent, range, NodeData::HardBreak);
            }
            Event::Rule => {
                builder.push(parent, range, NodeData::Rule);
            }
            Event::TaskListMarker(checked) => {
                builder.push(parent, range, NodeData::TaskMarker { checked });
            }
            Event::Html(_)
            | Event::InlineHtml(_)
            | Event::FootnoteReference(_)
            | Event::InlineMath(_)
            | Event::DisplayMath(_) => {}
        }
    }
    let tree = builder.build()?;
    tracing::debug!(
        source_len = source.len(),
        nodes = tree.len(),
        "parsed document"
    );
    Ok(tree)
}

fn container_data(tag: Tag<'_>) -> Option<NodeData> {
    match tag {
        Tag::Paragraph => Some(NodeData::Paragraph),
        Tag::Heading { level, .. } => Some(NodeData::Heading {
            level: heading_level(level),
        }),
        Tag::BlockQuote(_) => Some(NodeData::BlockQuote),
        Tag::CodeBlock(kind) => Some(NodeData::CodeBlock {
            language: match kind {
                CodeBlockKind::Fenced(language) if !language.is_empty() => {
                    Some(language.to_string())
                }
                _ => None,
            },
        }),
        Tag::List(start) => Some(NodeData::List {
            ordered: start.is_some(),
            start,
        }),
        Tag::Item => Some(NodeData::ListItem),
        Tag::Emphasis => Some(NodeData::Emphasis),
        Tag::Strong => Some(NodeData::Strong),
        Tag::Strikethrough => Some(NodeData::Strikethrough),
        Tag::Link { dest_url, .. } => Some(NodeData::Link {
            destination: dest_url.to_string(),
        }),
        Tag::Image { dest_url, .. } => Some(NodeData::Image {
            destination: dest_url.to_string(),
        }),
        _ => None,
    }
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
