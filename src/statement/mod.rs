//! Statement classification.
//!
//! Turns raw source text into an ordered stream of trimmed statements, each
//! tagged with a coarse [`StatementKind`] that every later pipeline stage
//! keys off. Comments (`//` and `/* ... */`, including multi-line) and blank
//! lines are removed first, so statement indices refer to the stripped
//! stream, not physical line numbers.
//!
//! Classification is keyword-prefix based: each physical line is treated as
//! one atomic statement regardless of brace depth. No nesting or
//! brace-matching is tracked, and multi-line conditions are not understood.
//! The [`Classify`] trait keeps this heuristic behind a strategy seam so a
//! real parser can replace it without touching the CFG or dataflow stages —
//! downstream code depends only on the per-statement `kind` tag.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Coarse syntactic role of a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    /// Conditional opener: `if`, `else if`, `else`.
    Branch,
    /// Loop opener: `for`, `while`.
    Loop,
    /// `switch` header.
    SwitchHeader,
    /// `case` or `default` label.
    CaseLabel,
    /// Contains whole-word `return`.
    Return,
    /// Contains whole-word `break`.
    Break,
    /// Anything else.
    Plain,
}

impl std::fmt::Display for StatementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatementKind::Branch => write!(f, "branch"),
            StatementKind::Loop => write!(f, "loop"),
            StatementKind::SwitchHeader => write!(f, "switch_header"),
            StatementKind::CaseLabel => write!(f, "case_label"),
            StatementKind::Return => write!(f, "return"),
            StatementKind::Break => write!(f, "break"),
            StatementKind::Plain => write!(f, "plain"),
        }
    }
}

impl StatementKind {
    /// Kinds that are targets of control transfer (leader rule 2).
    #[inline]
    pub fn is_control_opener(self) -> bool {
        matches!(
            self,
            StatementKind::Branch
                | StatementKind::Loop
                | StatementKind::SwitchHeader
                | StatementKind::CaseLabel
        )
    }

    /// Kinds that terminate local fall-through (no sequential edge out).
    #[inline]
    pub fn terminates_flow(self) -> bool {
        matches!(self, StatementKind::Return | StatementKind::Break)
    }
}

/// One statement of the stripped source stream.
///
/// Immutable once produced; consumed read-only by all downstream stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementLine {
    /// Position in the stripped statement stream (0-based).
    pub index: usize,
    /// Trimmed statement text, comments removed.
    pub text: String,
    /// Derived classification tag.
    pub kind: StatementKind,
}

/// Strategy for tagging a statement with its [`StatementKind`].
///
/// The default [`KeywordClassifier`] is a deliberate non-AST heuristic; a
/// future tree-based classifier only needs to honor this output contract.
pub trait Classify {
    /// Classify one trimmed, comment-free statement.
    fn kind_of(&self, text: &str) -> StatementKind;
}

static RETURN_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\breturn\b").expect("static regex"));
static BREAK_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bbreak\b").expect("static regex"));

/// Keyword-prefix statement classifier.
///
/// A line is Branch if it begins with `if`, `else if`, or `else`; Loop for
/// `for`/`while`; SwitchHeader for `switch`; CaseLabel for `case`/`default`.
/// Return/Break require the keyword as a whole word but may appear anywhere
/// in the line. Prefix matching is intentionally naive (e.g. `iffy = 1`
/// classifies as Branch); it fails on multi-line conditions by design.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordClassifier;

impl Classify for KeywordClassifier {
    fn kind_of(&self, text: &str) -> StatementKind {
        // `else if` is covered by the `else` prefix; listed for clarity.
        if text.starts_with("if") || text.starts_with("else if") || text.starts_with("else") {
            StatementKind::Branch
        } else if text.starts_with("for") || text.starts_with("while") {
            StatementKind::Loop
        } else if text.starts_with("switch") {
            StatementKind::SwitchHeader
        } else if text.starts_with("case") || text.starts_with("default") {
            StatementKind::CaseLabel
        } else if RETURN_WORD.is_match(text) {
            StatementKind::Return
        } else if BREAK_WORD.is_match(text) {
            StatementKind::Break
        } else {
            StatementKind::Plain
        }
    }
}

/// Classify a full source text with the default [`KeywordClassifier`].
pub fn classify(source: &str) -> Vec<StatementLine> {
    classify_with(source, &KeywordClassifier)
}

/// Classify a full source text with an explicit strategy.
///
/// Strips `//` line comments and `/* ... */` block comments (spanning
/// multiple lines included), discards blank lines, trims the rest, and tags
/// each surviving line. The returned indices are contiguous from 0.
pub fn classify_with(source: &str, strategy: &dyn Classify) -> Vec<StatementLine> {
    let stripped = strip_comments(source);

    let statements: Vec<StatementLine> = stripped
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .enumerate()
        .map(|(index, text)| StatementLine {
            index,
            text: text.to_string(),
            kind: strategy.kind_of(text),
        })
        .collect();

    tracing::debug!(statements = statements.len(), "classified source");
    statements
}

/// Remove `//` line comments and `/* ... */` block comments.
///
/// Block comments may span lines; their interior is dropped entirely, which
/// can join the surrounding text of the first and last line. Newlines inside
/// a block comment are not preserved, matching the stripped-stream model
/// where only surviving statement text matters.
fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    let mut in_block = false;
    let mut in_line = false;

    while let Some(c) = chars.next() {
        if in_block {
            if c == '*' && chars.peek() == Some(&'/') {
                chars.next();
                in_block = false;
            }
            continue;
        }
        if in_line {
            if c == '\n' {
                in_line = false;
                out.push('\n');
            }
            continue;
        }
        match c {
            '/' if chars.peek() == Some(&'/') => {
                chars.next();
                in_line = true;
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                in_block = true;
            }
            _ => out.push(c),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<StatementKind> {
        classify(source).into_iter().map(|s| s.kind).collect()
    }

    #[test]
    fn strips_line_comments_and_blanks() {
        let src = "int x = 1; // init\n\n   \ny = 2;\n";
        let stmts = classify(src);
        assert_eq!(stmts.len(), 2);
        assert_eq!(stmts[0].text, "int x = 1;");
        assert_eq!(stmts[1].text, "y = 2;");
        assert_eq!(stmts[1].index, 1);
    }

    #[test]
    fn strips_multiline_block_comments() {
        let src = "a = 1;\n/* this\nspans\nlines */\nb = 2;\n";
        let stmts = classify(src);
        assert_eq!(stmts.len(), 2);
        assert_eq!(stmts[0].text, "a = 1;");
        assert_eq!(stmts[1].text, "b = 2;");
    }

    #[test]
    fn classifies_control_keywords_by_prefix() {
        assert_eq!(
            kinds("if (x) {\nelse {\nfor (i = 0;;) {\nwhile (1) {\nswitch (x) {\ncase 1:\ndefault:\n"),
            vec![
                StatementKind::Branch,
                StatementKind::Branch,
                StatementKind::Loop,
                StatementKind::Loop,
                StatementKind::SwitchHeader,
                StatementKind::CaseLabel,
                StatementKind::CaseLabel,
            ]
        );
    }

    #[test]
    fn return_and_break_need_word_boundaries() {
        assert_eq!(kinds("x = breakfast;"), vec![StatementKind::Plain]);
        assert_eq!(kinds("x = returned;"), vec![StatementKind::Plain]);
        assert_eq!(kinds("return x;"), vec![StatementKind::Return]);
        assert_eq!(kinds("break;"), vec![StatementKind::Break]);
        // Whole-word match may appear mid-line.
        assert_eq!(kinds("y = 1; return y;"), vec![StatementKind::Return]);
    }

    #[test]
    fn empty_source_yields_no_statements() {
        assert!(classify("").is_empty());
        assert!(classify("// only a comment\n/* and a block */").is_empty());
    }

    #[test]
    fn indices_are_contiguous_after_stripping() {
        let stmts = classify("a = 1;\n// gone\nb = 2;\nc = 3;\n");
        let idx: Vec<usize> = stmts.iter().map(|s| s.index).collect();
        assert_eq!(idx, vec![0, 1, 2]);
    }
}
