//! Lexical parsing of node program source.
//!
//! Produces a flat, ordered listing of instruction-slot text plus a label
//! table. This stage never fails and never decodes an instruction — a
//! malformed line only surfaces as [`crate::error::CoreError::IllegalInstruction`]
//! the first time the node's program counter reaches it (see
//! [`crate::instruction::decode`]).

use std::collections::HashMap;

/// Hardware-inspired cap on instructions per node.
///
/// Documented, not enforced — `parse` accepts longer programs without
/// error, matching the un-enforced `TODO` in the original reference this
/// grammar is drawn from.
pub const MAX_INSTRUCTIONS: usize = 15;

/// Hardware-inspired cap on characters per source line.
///
/// Documented, not enforced, for the same reason as [`MAX_INSTRUCTIONS`].
pub const MAX_LINE_LEN: usize = 20;

/// The result of parsing a node's program source.
#[derive(Debug, Clone, Default)]
pub struct ParsedProgram {
    /// Trimmed instruction text, one entry per slot. An empty string marks
    /// a skippable (blank or label-only) slot.
    pub slots: Vec<String>,
    /// Label name (already lowercased, trimmed) to slot index.
    pub labels: HashMap<String, usize>,
}

impl ParsedProgram {
    /// Whether the slot at `index` is skippable (blank or label-only).
    #[must_use]
    pub fn is_blank(&self, index: usize) -> bool {
        self.slots.get(index).is_some_and(|s| s.is_empty())
    }
}

/// Parse node program source into an ordered slot listing and label table.
///
/// Behaviors (see spec §4.1):
/// - The entire source is lowercased first.
/// - Per physical line, anything from the first `#` onward is stripped.
/// - If the remaining line contains `:`, it is split on the *first* `:`;
///   the trimmed left side becomes a label mapping to the index of the
///   slot about to be appended, and the trimmed right side becomes that
///   slot's instruction text (possibly empty).
/// - Commas are left in place here; [`crate::instruction::decode`] treats
///   them as whitespace-equivalent at decode time.
#[must_use]
pub fn parse(source: &str) -> ParsedProgram {
    let lowered = source.to_lowercase();
    let mut slots = Vec::new();
    let mut labels = HashMap::new();

    for raw_line in lowered.lines() {
        let line = match raw_line.find('#') {
            Some(idx) => &raw_line[..idx],
            None => raw_line,
        };

        let text = match line.find(':') {
            Some(idx) => {
                let label = line[..idx].trim().to_string();
                labels.insert(label, slots.len());
                &line[idx + 1..]
            }
            None => line,
        };

        slots.push(text.trim().to_string());
    }

    ParsedProgram { slots, labels }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_comments() {
        let p = parse("add 1 # comment here");
        assert_eq!(p.slots, vec!["add 1"]);
    }

    #[test]
    fn label_on_its_own_line() {
        let p = parse("l:\nadd 1");
        assert_eq!(p.slots, vec!["", "add 1"]);
        assert_eq!(p.labels.get("l"), Some(&0));
    }

    #[test]
    fn label_sharing_a_line_with_an_instruction() {
        let p = parse("l: add 1");
        assert_eq!(p.slots, vec!["add 1"]);
        assert_eq!(p.labels.get("l"), Some(&0));
    }

    #[test]
    fn splits_on_first_colon_only() {
        let p = parse("l: mov 1, acc # a: b");
        assert_eq!(p.slots, vec!["mov 1, acc"]);
        assert_eq!(p.labels.get("l"), Some(&0));
    }

    #[test]
    fn blank_lines_are_skippable_slots() {
        let p = parse("jmp l\nadd 10\n\nl: add 5\n\n");
        assert!(p.is_blank(2));
        assert!(!p.is_blank(0));
    }

    #[test]
    fn is_case_insensitive() {
        let p = parse("MOV ACC, RIGHT");
        assert_eq!(p.slots, vec!["mov acc, right"]);
    }
}
