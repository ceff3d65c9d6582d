use regex::Regex;
use std::sync::OnceLock;

/// A line that starts a node entry in a Clash proxy list. Both representations
/// are covered: the inline flow form (`- {name: ..., ...}`) and the block form
/// (`- name: ...` with fields continuing on indented lines).
fn node_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"^\s*-\s*(\{|name\s*:)"#).unwrap())
}

/// A top-level mapping key, e.g. `proxy-groups:` or `rules:`. Ends the proxy
/// list section.
fn section_header() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"^[A-Za-z][A-Za-z0-9_-]*\s*:"#).unwrap())
}

/// Splits raw subscription text into complete node blocks.
///
/// The proxy list section is everything between the `proxies:` header and the
/// next top-level key; list-only responses (no `proxies:` header, as returned
/// by conversion backends in `list=true` mode) are scanned whole. Each block
/// runs from one node marker up to, but not including, the next one, so
/// multi-line fields are never truncated mid-node.
pub fn split_into_node_blocks(text: &str) -> Vec<String> {
    let section = proxies_section(text).unwrap_or(text);

    let mut blocks: Vec<String> = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in section.lines() {
        if node_marker().is_match(line) {
            push_block(&mut blocks, &mut current);
            current.push(line);
        } else if !current.is_empty() {
            current.push(line);
        }
    }
    push_block(&mut blocks, &mut current);
    blocks
}

fn push_block(blocks: &mut Vec<String>, current: &mut Vec<&str>) {
    if current.is_empty() {
        return;
    }
    let mut lines: Vec<&str> = std::mem::take(current);
    while let Some(last) = lines.last() {
        if last.trim().is_empty() {
            lines.pop();
        } else {
            break;
        }
    }
    let block = lines.join("\n");
    if block.contains("name") || block.contains('{') {
        blocks.push(block);
    }
}

/// Returns the slice between the `proxies:` header line and the next
/// top-level section header, or `None` when the document has no such header.
fn proxies_section(text: &str) -> Option<&str> {
    let mut offset = 0usize;
    let mut start: Option<usize> = None;
    for line in text.split_inclusive('\n') {
        let at = offset;
        offset += line.len();
        let trimmed_end = line.trim_end();
        match start {
            None => {
                if trimmed_end == "proxies:" {
                    start = Some(offset);
                }
            }
            Some(s) => {
                if section_header().is_match(trimmed_end) {
                    return Some(&text[s..at]);
                }
            }
        }
    }
    start.map(|s| &text[s..])
}
