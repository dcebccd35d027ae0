//! Fenced diagram-block extraction from host Markdown documents
//!
//! Only embedded diagram blocks matter here; the surrounding Markdown is
//! never interpreted beyond headings (which supply machine display names).

use pulldown_cmark::{Event, Parser, Tag, TagEnd};

/// One diagram block isolated from a host document
#[derive(Debug, Clone, PartialEq)]
pub struct DiagramBlock {
    /// Raw diagram source, starting at the header line
    pub source: String,

    /// Display-name hint: nearest preceding heading, else a fallback
    /// derived from the caller's name
    pub name_hint: String,

    /// Document line of the opening fence (0 for bare diagram input);
    /// diagram content starts on the next line
    pub fence_line: usize,
}

/// Check whether text begins with a diagram header line
pub fn is_diagram_source(text: &str) -> bool {
    let Some(first) = text.lines().map(str::trim).find(|l| !l.is_empty()) else {
        return false;
    };
    let mut words = first.split_whitespace();
    match (words.next(), words.next()) {
        (Some("flowchart") | Some("graph"), Some(direction)) => {
            matches!(direction, "TD" | "TB" | "BT" | "RL" | "LR")
        }
        _ => false,
    }
}

/// Extract all diagram blocks from a document.
///
/// A document that is itself bare diagram source (no fences) yields a
/// single block covering the whole text.
pub fn extract_blocks(document: &str, fallback_name: &str) -> Vec<DiagramBlock> {
    let mut blocks = Vec::new();

    let mut heading: Option<String> = None;
    let mut heading_buffer = String::new();
    let mut in_heading = false;

    let mut in_code_block = false;
    let mut code_content = String::new();
    let mut code_start = 0usize;

    for (event, range) in Parser::new(document).into_offset_iter() {
        match event {
            Event::Start(Tag::Heading { .. }) => {
                in_heading = true;
                heading_buffer.clear();
            }
            Event::End(TagEnd::Heading(_)) => {
                in_heading = false;
                if !heading_buffer.trim().is_empty() {
                    heading = Some(heading_buffer.trim().to_string());
                }
            }
            Event::Start(Tag::CodeBlock(_)) => {
                in_code_block = true;
                code_content.clear();
                code_start = range.start;
            }
            Event::End(TagEnd::CodeBlock) => {
                in_code_block = false;
                if is_diagram_source(&code_content) {
                    let name_hint = heading
                        .take()
                        .unwrap_or_else(|| format!("{} {}", fallback_name, blocks.len() + 1));
                    blocks.push(DiagramBlock {
                        source: code_content.clone(),
                        name_hint,
                        fence_line: line_of_offset(document, code_start),
                    });
                }
                code_content.clear();
            }
            Event::Text(text) => {
                if in_heading {
                    heading_buffer.push_str(&text);
                } else if in_code_block {
                    code_content.push_str(&text);
                }
            }
            _ => {}
        }
    }

    if blocks.is_empty() && is_diagram_source(document) {
        blocks.push(DiagramBlock {
            source: document.to_string(),
            name_hint: fallback_name.to_string(),
            fence_line: 0,
        });
    }

    blocks
}

/// 1-based line number of a byte offset
fn line_of_offset(document: &str, offset: usize) -> usize {
    document[..offset.min(document.len())].bytes().filter(|&b| b == b'\n').count() + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_diagram_source() {
        assert!(is_diagram_source("flowchart TD\nA-->B"));
        assert!(is_diagram_source("\n  graph LR\nA-->B"));
        assert!(!is_diagram_source("graph XY\nA-->B"));
        assert!(!is_diagram_source("# heading"));
        assert!(!is_diagram_source(""));
    }

    #[test]
    fn test_extract_fenced_blocks() {
        let document = "# Registration Flow\n\nSome prose.\n\n```mermaid\nflowchart TD\nStart-->Menu\n```\n\n## Top Up\n\n```\ngraph LR\nA-->B\n```\n";
        let blocks = extract_blocks(document, "doc");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].name_hint, "Registration Flow");
        assert!(blocks[0].source.starts_with("flowchart TD"));
        assert_eq!(blocks[0].fence_line, 5);
        assert_eq!(blocks[1].name_hint, "Top Up");
    }

    #[test]
    fn test_non_diagram_code_blocks_skipped() {
        let document = "```js\nconsole.log('hi');\n```\n";
        assert!(extract_blocks(document, "doc").is_empty());
    }

    #[test]
    fn test_fallback_naming() {
        let document = "```mermaid\nflowchart TD\nA-->B\n```\n";
        let blocks = extract_blocks(document, "menu");
        assert_eq!(blocks[0].name_hint, "menu 1");
    }

    #[test]
    fn test_bare_diagram_document() {
        let blocks = extract_blocks("flowchart TD\nA-->B\n", "wallet");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].name_hint, "wallet");
        assert_eq!(blocks[0].fence_line, 0);
    }

    #[test]
    fn test_heading_used_once() {
        let document = "# Shared\n\n```mermaid\nflowchart TD\nA-->B\n```\n\n```mermaid\nflowchart TD\nC-->D\n```\n";
        let blocks = extract_blocks(document, "doc");
        assert_eq!(blocks[0].name_hint, "Shared");
        assert_eq!(blocks[1].name_hint, "doc 2");
    }
}
