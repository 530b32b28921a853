//! Markdown parsing into a document tree

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag};

use super::pipeline::TransformError;

/// Node types of the document tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Root,
    Paragraph,
    Heading(u8),
    BlockQuote,
    List,
    Item,
    CodeBlock(Option<String>),
    Emphasis,
    Strong,
    Strikethrough,
    Link(String),
    Image(String),
    Table,
    TableHead,
    TableRow,
    TableCell,
    FootnoteDefinition(String),
    Container,
    Text,
    InlineCode,
    Html,
    Break,
    Rule,
    FootnoteReference(String),
    TaskListMarker(bool),
}

impl NodeKind {
    fn is_block(&self) -> bool {
        matches!(
            self,
            NodeKind::Paragraph
                | NodeKind::Heading(_)
                | NodeKind::BlockQuote
                | NodeKind::List
                | NodeKind::Item
                | NodeKind::CodeBlock(_)
                | NodeKind::Table
                | NodeKind::TableHead
                | NodeKind::TableRow
                | NodeKind::TableCell
                | NodeKind::FootnoteDefinition(_)
                | NodeKind::Container
        )
    }
}

/// A node of a parsed markdown document.
///
/// Leaves carry their text in `value`; containers carry children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub value: Option<String>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            value: None,
            children: Vec::new(),
        }
    }

    pub fn leaf(kind: NodeKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: Some(value.into()),
            children: Vec::new(),
        }
    }

    pub fn with_children(kind: NodeKind, children: Vec<Node>) -> Self {
        Self {
            kind,
            value: None,
            children,
        }
    }

    /// Concatenate every textual leaf in document order, ignoring markup
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out, false);
        out
    }

    /// Like [`Node::to_text`], but block boundaries become line breaks so
    /// words of adjacent paragraphs do not run together
    pub fn to_plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out, true);
        out
    }

    fn collect_text(&self, out: &mut String, separate_blocks: bool) {
        if let Some(value) = &self.value {
            out.push_str(value);
        }
        for child in &self.children {
            child.collect_text(out, separate_blocks);
        }
        if separate_blocks && self.kind.is_block() && !out.ends_with('\n') {
            out.push('\n');
        }
    }
}

/// Parse markdown source into a tree rooted at a [`NodeKind::Root`] node
pub fn parse(markdown: &str) -> Result<Node, TransformError> {
    // Front-matter is split off beforehand, so no metadata blocks here
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_HEADING_ATTRIBUTES;
    build_tree(Parser::new_ext(markdown, options))
}

/// Parse MDX source: top-level `import`/`export` statements are dropped and
/// the rest is treated as markdown
pub fn parse_mdx(source: &str) -> Result<Node, TransformError> {
    parse(&strip_esm(source))
}

/// Assemble a tree from a stream of start/end events
pub fn build_tree<'a, I>(events: I) -> Result<Node, TransformError>
where
    I: IntoIterator<Item = Event<'a>>,
{
    let mut stack = vec![Node::new(NodeKind::Root)];

    for event in events {
        match event {
            Event::Start(tag) => stack.push(Node::new(kind_for(tag))),
            Event::End(_) => {
                // The root is never closed by an event
                if stack.len() < 2 {
                    return Err(TransformError::Unbalanced { depth: 0 });
                }
                let node = stack.pop().ok_or(TransformError::Unbalanced { depth: 0 })?;
                push_child(&mut stack, node)?;
            }
            Event::Text(text) => {
                push_child(&mut stack, Node::leaf(NodeKind::Text, text.to_string()))?
            }
            Event::Code(code) => {
                push_child(&mut stack, Node::leaf(NodeKind::InlineCode, code.to_string()))?
            }
            Event::Html(html) | Event::InlineHtml(html) => {
                push_child(&mut stack, Node::leaf(NodeKind::Html, html.to_string()))?
            }
            Event::InlineMath(math) | Event::DisplayMath(math) => {
                push_child(&mut stack, Node::leaf(NodeKind::Text, math.to_string()))?
            }
            Event::SoftBreak | Event::HardBreak => {
                push_child(&mut stack, Node::leaf(NodeKind::Break, "\n"))?
            }
            Event::Rule => push_child(&mut stack, Node::new(NodeKind::Rule))?,
            Event::FootnoteReference(label) => push_child(
                &mut stack,
                Node::new(NodeKind::FootnoteReference(label.to_string())),
            )?,
            Event::TaskListMarker(checked) => {
                push_child(&mut stack, Node::new(NodeKind::TaskListMarker(checked)))?
            }
        }
    }

    match stack.len() {
        1 => stack.pop().ok_or(TransformError::Unbalanced { depth: 0 }),
        depth => Err(TransformError::Unbalanced { depth: depth - 1 }),
    }
}

fn push_child(stack: &mut [Node], node: Node) -> Result<(), TransformError> {
    let parent = stack
        .last_mut()
        .ok_or(TransformError::Unbalanced { depth: 0 })?;
    parent.children.push(node);
    Ok(())
}

fn kind_for(tag: Tag<'_>) -> NodeKind {
    match tag {
        Tag::Paragraph => NodeKind::Paragraph,
        Tag::Heading { level, .. } => NodeKind::Heading(level as u8),
        Tag::BlockQuote(_) => NodeKind::BlockQuote,
        Tag::CodeBlock(CodeBlockKind::Fenced(lang)) if !lang.is_empty() => {
            NodeKind::CodeBlock(Some(lang.to_string()))
        }
        Tag::CodeBlock(_) => NodeKind::CodeBlock(None),
        Tag::List(_) => NodeKind::List,
        Tag::Item => NodeKind::Item,
        Tag::Emphasis => NodeKind::Emphasis,
        Tag::Strong => NodeKind::Strong,
        Tag::Strikethrough => NodeKind::Strikethrough,
        Tag::Link { dest_url, .. } => NodeKind::Link(dest_url.to_string()),
        Tag::Image { dest_url, .. } => NodeKind::Image(dest_url.to_string()),
        Tag::Table(_) => NodeKind::Table,
        Tag::TableHead => NodeKind::TableHead,
        Tag::TableRow => NodeKind::TableRow,
        Tag::TableCell => NodeKind::TableCell,
        Tag::FootnoteDefinition(label) => NodeKind::FootnoteDefinition(label.to_string()),
        _ => NodeKind::Container,
    }
}

/// Remove top-level ESM statements (`import ...`, `export ...`) outside
/// fenced code blocks. A statement runs until its brackets are balanced.
fn strip_esm(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut fence: Option<&str> = None;
    let mut esm_depth = 0usize;

    for line in source.split_inclusive('\n') {
        if esm_depth > 0 {
            esm_depth = bracket_depth(line, esm_depth);
            continue;
        }

        let trimmed = line.trim_start();
        match fence {
            Some(marker) => {
                if trimmed.starts_with(marker) {
                    fence = None;
                }
            }
            None => {
                if trimmed.starts_with("```") {
                    fence = Some("```");
                } else if trimmed.starts_with("~~~") {
                    fence = Some("~~~");
                } else if line.starts_with("import ") || line.starts_with("export ") {
                    esm_depth = bracket_depth(line, 0);
                    continue;
                }
            }
        }
        out.push_str(line);
    }

    out
}

/// Open bracket count after scanning `line`, skipping quoted strings
fn bracket_depth(line: &str, mut depth: usize) -> usize {
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in line.chars() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' | '`' => quote = Some(c),
            '{' | '(' | '[' => depth += 1,
            '}' | ')' | ']' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }

    depth
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_builds_tree() {
        let tree = parse("# Title\n\nHello *world*.").unwrap();
        assert_eq!(tree.kind, NodeKind::Root);
        assert_eq!(tree.children.len(), 2);
        assert_eq!(tree.children[0].kind, NodeKind::Heading(1));
        assert_eq!(tree.children[1].kind, NodeKind::Paragraph);
        assert_eq!(tree.children[1].children[1].kind, NodeKind::Emphasis);
    }

    #[test]
    fn test_to_text_concatenates_leaves() {
        let tree = parse("Some `code` and [a link](https://x.dev) here.").unwrap();
        assert_eq!(tree.to_text(), "Some code and a link here.");
    }

    #[test]
    fn test_to_text_includes_code_and_image_alt() {
        let tree = parse("![A cat](cat.png)\n\n```rust\nfn main() {}\n```\n").unwrap();
        assert_eq!(tree.to_text(), "A catfn main() {}\n");
    }

    #[test]
    fn test_plain_text_separates_blocks() {
        let tree = parse("# One\n\nTwo words\nthree").unwrap();
        assert_eq!(tree.to_text(), "OneTwo words\nthree");
        assert_eq!(tree.to_plain_text(), "One\nTwo words\nthree\n");
    }

    #[test]
    fn test_unbalanced_events_are_rejected() {
        let events = vec![Event::Start(Tag::Paragraph), Event::Text("open".into())];
        let err = build_tree(events).unwrap_err();
        assert!(matches!(err, TransformError::Unbalanced { depth: 1 }));

        let events = vec![Event::End(pulldown_cmark::TagEnd::Paragraph)];
        assert!(build_tree(events).is_err());
    }

    #[test]
    fn test_mdx_imports_are_dropped() {
        let source = "import Chart from '../Chart.astro';\nexport const x = 1;\n\nReal text.\n\n```js\nimport fs from 'fs';\n```\n";
        let tree = parse_mdx(source).unwrap();
        let text = tree.to_text();
        assert!(!text.contains("Chart"));
        assert!(!text.contains("export"));
        assert!(text.contains("Real text."));
        assert!(text.contains("import fs from 'fs';"));
    }

    #[test]
    fn test_multiline_mdx_statements_are_dropped() {
        let source = "import {\n  Chart,\n  Table,\n} from './widgets';\nexport const meta = {\n  title: \"Braces } inside\",\n  draft: false,\n};\n\nOnly this counts.\n";
        assert_eq!(strip_esm(source), "\nOnly this counts.\n");

        let text = parse_mdx(source).unwrap().to_plain_text();
        assert_eq!(text.split_whitespace().count(), 3);
    }
}
