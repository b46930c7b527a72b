//! Assembly text parser.
//!
//! A line is tried against every variant of the active dialect in declaration
//! order. A variant matches when its mnemonic, datatype suffix and operand
//! template agree and every operand names a register of its slot's class.
//! Every variant that matches contributes an [`Instruction`]; a line that fits
//! several variants yields several candidates, and choosing between them is
//! left to the consumer.
//!
//! Operand syntax:
//!
//! ```text
//! mnemonic[.dt] op0, op1, ...
//! mnemonic[.dt] op0, ..., [base{, #offset}]{!}{, #postinc}
//! ```

use log::{debug, trace};

use crate::arch::Arch;
use crate::error::{Attempt, Attempts, IsaError, MatchFailure, Result};
use crate::instruction::{Address, InstrDef, Instruction};
use crate::register::RegisterFile;

/// Markers starting an end-of-line comment.
const COMMENT_MARKERS: [&str; 2] = ["//", "@"];

/// One instruction line of a listing with its parse candidates.
#[derive(Debug, Clone)]
pub struct ParsedLine {
    /// 1-based line number within the listing.
    pub number: usize,
    /// Source text as given.
    pub text: String,
    /// All variants that parse the line, in dialect order.
    pub candidates: Vec<Instruction>,
}

/// Remove an end-of-line comment and surrounding whitespace.
pub fn strip_comment(line: &str) -> &str {
    let end = COMMENT_MARKERS
        .iter()
        .filter_map(|m| line.find(m))
        .min()
        .unwrap_or(line.len());
    line[..end].trim()
}

/// Parse one line into every matching variant of `arch`.
///
/// Fails with [`IsaError::NoMatchingVariant`] listing each tried variant and
/// its mismatch when nothing matches.
pub fn parse_line(arch: &Arch, line: &str) -> Result<Vec<Instruction>> {
    let text = strip_comment(line);
    let (mnemonic, suffix, operands) = split_mnemonic(text);

    let mut candidates = Vec::new();
    let mut attempts = Vec::new();
    for def in arch.defs() {
        match match_variant(def, arch.registers(), mnemonic, suffix, operands) {
            Ok(parts) => candidates.push(Instruction::from_operands(
                def,
                parts.operands,
                parts.datatype,
                parts.address,
            )?),
            Err(reason) => {
                trace!("{}: '{text}' rejected by {}: {reason}", arch.name, def.name);
                attempts.push(Attempt {
                    variant: def.name,
                    reason,
                });
            }
        }
    }

    if candidates.is_empty() {
        return Err(IsaError::NoMatchingVariant {
            arch: arch.name,
            line: text.to_string(),
            attempts: Attempts(attempts),
        });
    }
    if candidates.len() > 1 {
        debug!(
            "{}: '{text}' is ambiguous between {}",
            arch.name,
            candidates
                .iter()
                .map(|c| c.def().name)
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    Ok(candidates)
}

/// Parse every instruction line of a listing.
///
/// Blank and comment-only lines are skipped. The first line that fails aborts
/// the whole listing with its line number attached.
pub fn parse_body<S: AsRef<str>>(arch: &Arch, lines: &[S]) -> Result<Vec<ParsedLine>> {
    let mut parsed = Vec::new();
    for (idx, line) in lines.iter().enumerate() {
        let line = line.as_ref();
        if strip_comment(line).is_empty() {
            continue;
        }
        let candidates = parse_line(arch, line).map_err(|e| IsaError::AtLine {
            line: idx + 1,
            source: Box::new(e),
        })?;
        parsed.push(ParsedLine {
            number: idx + 1,
            text: line.to_string(),
            candidates,
        });
    }
    Ok(parsed)
}

/// A representative source line for `def`, using distinct canonical register
/// names per slot and the first legal datatype suffix.
pub fn canonical_line(arch: &Arch, def: &InstrDef) -> String {
    render_line(arch, def, def.datatype.map(|kind| kind.suffixes()[0]))
}

/// One canonical line per legal datatype suffix of `def`, in suffix order.
pub fn variant_lines(arch: &Arch, def: &InstrDef) -> Vec<String> {
    match def.datatype {
        Some(kind) => kind
            .suffixes()
            .iter()
            .map(|&suffix| render_line(arch, def, Some(suffix)))
            .collect(),
        None => vec![render_line(arch, def, None)],
    }
}

fn render_line(arch: &Arch, def: &InstrDef, suffix: Option<&str>) -> String {
    let mut line = def.mnemonic.to_string();
    if let Some(suffix) = suffix {
        line.push('.');
        line.push_str(suffix);
    }
    let mut operands: Vec<String> = def
        .slot_classes()
        .enumerate()
        .map(|(slot, class)| {
            let names = arch.registers().names(class);
            names[slot % names.len()].to_string()
        })
        .collect();
    if def.memory.is_some() {
        if let Some(base) = operands.pop() {
            operands.push(format!("[{base}]"));
        }
    }
    if !operands.is_empty() {
        line.push(' ');
        line.push_str(&operands.join(", "));
    }
    line
}

/// Fields captured by a successful template match.
struct Captured {
    operands: Vec<String>,
    datatype: Option<String>,
    address: Option<Address>,
}

fn split_mnemonic(text: &str) -> (&str, Option<&str>, &str) {
    let (token, rest) = text
        .split_once(char::is_whitespace)
        .unwrap_or((text, ""));
    match token.split_once('.') {
        Some((base, suffix)) => (base, Some(suffix), rest.trim()),
        None => (token, None, rest.trim()),
    }
}

fn match_variant(
    def: &InstrDef,
    registers: &RegisterFile,
    mnemonic: &str,
    suffix: Option<&str>,
    operands: &str,
) -> std::result::Result<Captured, MatchFailure> {
    if !mnemonic.eq_ignore_ascii_case(def.mnemonic) {
        return Err(MatchFailure::Mnemonic {
            expected: def.template(),
            found: mnemonic.to_string(),
        });
    }

    let datatype = match (def.datatype, suffix) {
        (None, None) => None,
        (None, Some(found)) => {
            return Err(MatchFailure::UnexpectedDataType {
                found: found.to_string(),
            })
        }
        (Some(kind), None) => {
            return Err(MatchFailure::MissingDataType {
                allowed: kind.suffixes(),
            })
        }
        (Some(kind), Some(found)) => {
            let found = found.to_ascii_lowercase();
            if !kind.accepts(&found) {
                return Err(MatchFailure::DataType {
                    found,
                    allowed: kind.suffixes(),
                });
            }
            Some(found)
        }
    };

    let (operands, address) = if def.memory.is_some() {
        let (operands, address) = match_memory_operands(operands, def.operand_count())?;
        (operands, Some(address))
    } else {
        (match_register_operands(operands, def.operand_count())?, None)
    };
    check_register_classes(def, registers, &operands)?;

    Ok(Captured {
        operands,
        datatype,
        address,
    })
}

fn match_register_operands(
    text: &str,
    expected: usize,
) -> std::result::Result<Vec<String>, MatchFailure> {
    let tokens = split_operands(text);
    if tokens.len() != expected {
        return Err(MatchFailure::OperandCount {
            expected,
            found: tokens.len(),
        });
    }
    tokens.into_iter().map(register_token).collect()
}

fn match_memory_operands(
    text: &str,
    expected: usize,
) -> std::result::Result<(Vec<String>, Address), MatchFailure> {
    let open = text.find('[').ok_or_else(|| address_error("missing '['"))?;
    let close = text[open..]
        .find(']')
        .map(|i| open + i)
        .ok_or_else(|| address_error("missing ']'"))?;

    let before = text[..open].trim();
    let registers = if before.is_empty() {
        Vec::new()
    } else {
        let before = before
            .strip_suffix(',')
            .ok_or_else(|| address_error("expected ',' before '['"))?;
        split_operands(before)
    };
    if registers.len() + 1 != expected {
        return Err(MatchFailure::OperandCount {
            expected,
            found: registers.len() + 1,
        });
    }

    let inside = &text[open + 1..close];
    let (base, pre_index) = match inside.split_once(',') {
        Some((base, offset)) => (base, Some(immediate(offset)?)),
        None => (inside, None),
    };
    let base = register_token(base.trim())?;

    let mut after = text[close + 1..].trim();
    let writeback = match after.strip_prefix('!') {
        Some(rest) => {
            after = rest.trim();
            true
        }
        None => false,
    };
    let post_index = if after.is_empty() {
        None
    } else {
        let post = after
            .strip_prefix(',')
            .ok_or_else(|| address_error(&format!("unexpected '{after}' after address")))?;
        Some(immediate(post)?)
    };
    if writeback && post_index.is_some() {
        return Err(MatchFailure::WritebackWithPostIndex);
    }

    let mut operands = registers
        .into_iter()
        .map(register_token)
        .collect::<std::result::Result<Vec<_>, _>>()?;
    operands.push(base.clone());
    Ok((
        operands,
        Address {
            base,
            pre_index,
            post_index,
            writeback,
        },
    ))
}

/// Every operand must be a register name of its slot's class.
fn check_register_classes(
    def: &InstrDef,
    registers: &RegisterFile,
    operands: &[String],
) -> std::result::Result<(), MatchFailure> {
    for (slot, (class, token)) in def.slot_classes().zip(operands).enumerate() {
        if !registers.contains(class, token) {
            return Err(MatchFailure::RegisterClass {
                slot,
                token: token.clone(),
                expected: class,
            });
        }
    }
    Ok(())
}

fn split_operands(text: &str) -> Vec<&str> {
    if text.trim().is_empty() {
        Vec::new()
    } else {
        text.split(',').map(str::trim).collect()
    }
}

fn register_token(token: &str) -> std::result::Result<String, MatchFailure> {
    let mut chars = token.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(token.to_string())
    } else {
        Err(MatchFailure::Operand {
            token: token.to_string(),
        })
    }
}

fn immediate(token: &str) -> std::result::Result<String, MatchFailure> {
    let token = token.trim();
    let value = token
        .strip_prefix('#')
        .map(str::trim)
        .ok_or_else(|| address_error(&format!("immediate '{token}' must start with '#'")))?;
    if value.is_empty() {
        return Err(address_error("empty immediate"));
    }
    Ok(value.to_string())
}

fn address_error(detail: &str) -> MatchFailure {
    MatchFailure::Address {
        detail: detail.to_string(),
    }
}
