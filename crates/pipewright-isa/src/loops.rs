//! Loop extraction: split a listing into preamble, loop body and postamble.
//!
//! Works on text lines only; nothing here parses instructions.

use log::debug;

use crate::error::{IsaError, Result};
use crate::parser::strip_comment;

/// Branch mnemonics that may close a loop.
pub const LOOP_BRANCHES: &[&str] = &[
    "b", "bnz", "bne", "bgt", "b.ne", "b.gt", "b.hi", "cbnz", "le", "letp",
];

/// A labeled loop cut out of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loop {
    label: String,
    preamble: Vec<String>,
    body: Vec<String>,
    closing_branch: String,
    postamble: Vec<String>,
}

impl Loop {
    /// Loop label, without the colon.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Lines before the label.
    pub fn preamble(&self) -> &[String] {
        &self.preamble
    }

    /// Lines between the label and the closing branch.
    pub fn body(&self) -> &[String] {
        &self.body
    }

    /// The branch line that closed the loop, as found in the source.
    pub fn closing_branch(&self) -> &str {
        &self.closing_branch
    }

    /// Lines after the closing branch.
    pub fn postamble(&self) -> &[String] {
        &self.postamble
    }

    /// Rebuild the full listing around a replacement body.
    pub fn reassemble<S: AsRef<str>>(&self, body: &[S]) -> Vec<String> {
        let capacity = self.preamble.len() + body.len() + self.postamble.len() + 2;
        let mut lines = Vec::with_capacity(capacity);
        lines.extend(self.preamble.iter().cloned());
        lines.push(format!("{}:", self.label));
        lines.extend(body.iter().map(|l| l.as_ref().to_string()));
        lines.push(self.closing_branch.clone());
        lines.extend(self.postamble.iter().cloned());
        lines
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Preamble,
    Body,
    Postamble,
}

/// Extract the loop starting at `label:` and closed by the first loop branch
/// back to `label`.
pub fn extract_loop<S: AsRef<str>>(lines: &[S], label: &str) -> Result<Loop> {
    let mut state = ScanState::Preamble;
    let mut preamble = Vec::new();
    let mut body = Vec::new();
    let mut postamble = Vec::new();
    let mut closing_branch = None;

    for line in lines {
        let line = line.as_ref();
        match state {
            ScanState::Preamble => match split_label(line) {
                Some((found, remainder)) if found == label => {
                    if !remainder.is_empty() {
                        body.push(remainder.to_string());
                    }
                    state = ScanState::Body;
                }
                _ => preamble.push(line.to_string()),
            },
            ScanState::Body => {
                if is_loop_branch(line, label) {
                    closing_branch = Some(line.to_string());
                    state = ScanState::Postamble;
                } else {
                    body.push(line.to_string());
                }
            }
            ScanState::Postamble => postamble.push(line.to_string()),
        }
    }

    match (state, closing_branch) {
        (ScanState::Preamble, _) => Err(IsaError::LoopNotFound {
            label: label.to_string(),
        }),
        (ScanState::Postamble, Some(closing_branch)) => {
            debug!(
                "loop '{label}': {} preamble, {} body, {} postamble lines",
                preamble.len(),
                body.len(),
                postamble.len()
            );
            Ok(Loop {
                label: label.to_string(),
                preamble,
                body,
                closing_branch,
                postamble,
            })
        }
        _ => Err(IsaError::LoopNotClosed {
            label: label.to_string(),
        }),
    }
}

/// Split `label: remainder`, returning `None` for lines without a label.
fn split_label(line: &str) -> Option<(&str, &str)> {
    let text = strip_comment(line);
    let (label, remainder) = text.split_once(':')?;
    let label = label.trim();
    let is_ident = !label.is_empty()
        && label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
    is_ident.then(|| (label, remainder.trim()))
}

fn is_loop_branch(line: &str, label: &str) -> bool {
    let text = strip_comment(line);
    let (mnemonic, operands) = text
        .split_once(char::is_whitespace)
        .unwrap_or((text, ""));
    let target = operands.rsplit(',').next().map(str::trim).unwrap_or("");
    LOOP_BRANCHES
        .iter()
        .any(|b| mnemonic.eq_ignore_ascii_case(b))
        && target == label
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing() -> Vec<&'static str> {
        vec![
            "mov r0, #0",
            "mov r1, #16",
            "start:",
            "vldrw.u32 q0, [r2]",
            "vmul.s32 q1, q0, q0",
            "vstrw.u32 q1, [r3]",
            "bnz start",
            "mov r0, #1",
            "bx lr",
        ]
    }

    #[test]
    fn extracts_three_segments() {
        let source = listing();
        let lp = extract_loop(&source, "start").unwrap();
        assert_eq!(lp.label(), "start");
        assert_eq!(lp.preamble(), &source[0..2]);
        assert_eq!(lp.body(), &source[3..6]);
        assert_eq!(lp.closing_branch(), "bnz start");
        assert_eq!(lp.postamble(), &source[7..9]);
    }

    #[test]
    fn reassembly_reproduces_listing() {
        let source = listing();
        let lp = extract_loop(&source, "start").unwrap();
        let rebuilt = lp.reassemble(lp.body());
        assert_eq!(rebuilt, source);
        assert_eq!(&rebuilt[2..7], &source[2..7]);
    }

    #[test]
    fn label_remainder_starts_body() {
        let source = ["start: vadd.s32 q0, q1, q2", "nop", "le lr, start"];
        let lp = extract_loop(&source, "start").unwrap();
        assert_eq!(lp.body(), ["vadd.s32 q0, q1, q2", "nop"]);
        assert!(lp.preamble().is_empty());
        assert!(lp.postamble().is_empty());
    }

    #[test]
    fn other_labels_stay_in_preamble() {
        let source = ["outer:", "nop", "inner:", "nop", "cbnz x0, inner", "b outer"];
        let lp = extract_loop(&source, "inner").unwrap();
        assert_eq!(lp.preamble(), ["outer:", "nop"]);
        assert_eq!(lp.postamble(), ["b outer"]);
    }

    #[test]
    fn branch_to_other_label_is_body() {
        let source = ["start:", "nop", "bne elsewhere", "bne start"];
        let lp = extract_loop(&source, "start").unwrap();
        assert_eq!(lp.body(), ["nop", "bne elsewhere"]);
    }

    #[test]
    fn missing_label() {
        let err = extract_loop(&["nop", "bnz start"], "start").unwrap_err();
        assert!(matches!(err, IsaError::LoopNotFound { .. }));
    }

    #[test]
    fn unterminated_loop() {
        let err = extract_loop(&["start:", "nop", "nop"], "start").unwrap_err();
        assert!(matches!(err, IsaError::LoopNotClosed { ref label } if label == "start"));
    }
}
