use std::collections::HashSet;
use std::sync::OnceLock;

use regex::{NoExpand, Regex};

use crate::config::RenameStyle;

/// An extracted node ready for rendering: the cleaned text block and the
/// unique display name its `name:` field now carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRecord {
    pub block: String,
    pub name: String,
}

/// Matches the `name:` field in any of the three quoting styles a backend may
/// emit: double-quoted, single-quoted, or bare up to the next delimiter.
fn name_field() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"name\s*:\s*(?:"([^"]*)"|'([^']*)'|([^,\}\n]+))"#).unwrap())
}

/// Filters, deduplicates and rewrites raw node blocks.
///
/// Nodes whose name contains an exclusion keyword are dropped. The first
/// occurrence of a name keeps it bare; later duplicates get a deterministic
/// suffix in the configured style. The `name:` field is rewritten in place,
/// every other field is left untouched.
pub fn normalize_blocks(
    blocks: &[String],
    exclusions: &[String],
    style: RenameStyle,
) -> Vec<NodeRecord> {
    let mut taken: HashSet<String> = HashSet::new();
    let mut out = Vec::new();

    for block in blocks {
        let Some(original) = extract_display_name(block) else {
            continue;
        };
        if is_excluded(&original, exclusions) {
            continue;
        }

        let mut unique = original.clone();
        let mut counter = 1u32;
        while taken.contains(&unique) {
            unique = match style {
                RenameStyle::Underscore => format!("{original}_{counter}"),
                RenameStyle::Bracket => format!("{original} [{counter}]"),
            };
            counter += 1;
        }
        taken.insert(unique.clone());

        let rewritten = name_field().replace(block, NoExpand(&format!("name: \"{unique}\"")));
        out.push(NodeRecord {
            block: reindent(&rewritten),
            name: unique,
        });
    }

    out
}

pub fn extract_display_name(block: &str) -> Option<String> {
    let caps = name_field().captures(block)?;
    let raw = caps
        .get(1)
        .or_else(|| caps.get(2))
        .or_else(|| caps.get(3))?
        .as_str()
        .trim();
    if raw.is_empty() {
        None
    } else {
        Some(raw.to_string())
    }
}

fn is_excluded(name: &str, exclusions: &[String]) -> bool {
    let lower = name.to_lowercase();
    exclusions.iter().any(|kw| lower.contains(kw))
}

/// Rebases a block to two-space indentation under the output `proxies:` key,
/// keeping the relative indentation of continuation lines.
fn reindent(block: &str) -> String {
    let first = block.lines().next().unwrap_or("");
    let base = first.len() - first.trim_start().len();
    block
        .lines()
        .map(|line| {
            let stripped = strip_indent(line, base);
            if stripped.trim().is_empty() {
                String::new()
            } else {
                format!("  {stripped}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn strip_indent(line: &str, max: usize) -> &str {
    let mut taken = 0;
    for (i, ch) in line.char_indices() {
        if taken >= max || ch != ' ' {
            return &line[i..];
        }
        taken += 1;
    }
    ""
}

/// Synthetic entry emitted under the `placeholder` empty-result policy so the
/// downstream client still loads something it can display.
pub fn placeholder_node() -> NodeRecord {
    let name = "NO-USABLE-NODES";
    NodeRecord {
        block: format!(
            "  - {{name: \"{name}\", type: ss, server: 127.0.0.1, port: 1, cipher: aes-128-gcm, password: subfuse}}"
        ),
        name: name.to_string(),
    }
}
