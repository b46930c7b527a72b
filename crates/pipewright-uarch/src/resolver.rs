//! Ordered attribute tables keyed on instruction variants and predicates.
//!
//! A table is a list of `(key, value)` rules scanned in declaration order; the
//! first rule whose key matches wins. Narrow rules that should shadow a broader
//! one must therefore be declared before it.

use pipewright_isa::{Instruction, Opcode};

use crate::error::{CostError, Result};

/// Side-effect free test over an instruction instance.
pub type Predicate = fn(&Instruction) -> bool;

/// Rule key.
#[derive(Clone)]
pub enum Key {
    /// Exact variant.
    Op(Opcode),
    /// Capability test.
    Pred(Predicate),
    /// Matches if any member matches.
    AnyOf(Vec<Key>),
}

impl Key {
    pub fn pred(p: Predicate) -> Self {
        Key::Pred(p)
    }

    /// Group of variants.
    pub fn ops(ops: &[Opcode]) -> Self {
        Key::AnyOf(ops.iter().copied().map(Key::Op).collect())
    }

    pub fn any(keys: impl IntoIterator<Item = Key>) -> Self {
        Key::AnyOf(keys.into_iter().collect())
    }

    pub fn matches(&self, inst: &Instruction) -> bool {
        match self {
            Key::Op(op) => inst.opcode() == *op,
            Key::Pred(p) => p(inst),
            Key::AnyOf(keys) => keys.iter().any(|k| k.matches(inst)),
        }
    }
}

impl From<Opcode> for Key {
    fn from(op: Opcode) -> Self {
        Key::Op(op)
    }
}

impl std::fmt::Debug for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Key::Op(op) => write!(f, "{op:?}"),
            Key::Pred(_) => write!(f, "<predicate>"),
            Key::AnyOf(keys) => f.debug_tuple("AnyOf").field(keys).finish(),
        }
    }
}

/// An ordered rule table.
#[derive(Debug, Clone)]
pub struct AttrTable<V> {
    name: &'static str,
    owner: &'static str,
    rules: Vec<(Key, V)>,
    default: Option<V>,
}

impl<V> AttrTable<V> {
    /// Empty table `name` belonging to target `owner`.
    pub fn new(owner: &'static str, name: &'static str) -> Self {
        Self {
            name,
            owner,
            rules: Vec::new(),
            default: None,
        }
    }

    /// Append a rule.
    pub fn rule(mut self, key: impl Into<Key>, value: V) -> Self {
        self.rules.push((key.into(), value));
        self
    }

    /// Value used when no rule matches.
    pub fn with_default(mut self, value: V) -> Self {
        self.default = Some(value);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// First matching value, then the default.
    pub fn lookup(&self, inst: &Instruction) -> Option<&V> {
        self.rules
            .iter()
            .find(|(key, _)| key.matches(inst))
            .map(|(_, value)| value)
            .or(self.default.as_ref())
    }

    /// Like [`AttrTable::lookup`], but a miss is a modeling defect.
    pub fn resolve(&self, inst: &Instruction) -> Result<&V> {
        self.lookup(inst).ok_or_else(|| CostError::NoRule {
            table: self.name,
            target: self.owner,
            instruction: inst.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use pipewright_isa::{parse_line, ARM_AARCH64, ARM_V81M};

    use super::*;

    fn parse(arch: &pipewright_isa::Arch, line: &str, op: Opcode) -> Instruction {
        parse_line(arch, line)
            .unwrap()
            .into_iter()
            .find(|i| i.opcode() == op)
            .unwrap()
    }

    #[test]
    fn first_match_wins() {
        let fmul = parse(&ARM_V81M, "vmul.f32 q0, q1, q2", Opcode::Vmul);
        let imul = parse(&ARM_V81M, "vmul.s32 q0, q1, q2", Opcode::Vmul);

        let narrow_first = AttrTable::new("test", "latency")
            .rule(Key::pred(Instruction::is_float), 4)
            .rule(Key::any([Opcode::Vmul.into(), Key::pred(Instruction::is_vector_mul)]), 2);
        let broad_first = AttrTable::new("test", "latency")
            .rule(Key::any([Key::pred(Instruction::is_vector_mul), Opcode::Vmul.into()]), 2)
            .rule(Key::pred(Instruction::is_float), 4);

        assert_eq!(narrow_first.resolve(&fmul).unwrap(), &4);
        assert_eq!(narrow_first.resolve(&imul).unwrap(), &2);
        assert_eq!(broad_first.resolve(&fmul).unwrap(), &2);
        assert_eq!(broad_first.resolve(&imul).unwrap(), &2);
    }

    #[test]
    fn tuple_member_order_is_irrelevant() {
        let load = parse(&ARM_AARCH64, "ldr v0, [x1]", Opcode::Ldr);
        let a = AttrTable::new("test", "units")
            .rule(Key::any([Key::pred(Instruction::is_load), Opcode::Str.into()]), "mem");
        let b = AttrTable::new("test", "units")
            .rule(Key::any([Opcode::Str.into(), Key::pred(Instruction::is_load)]), "mem");
        assert_eq!(a.resolve(&load).unwrap(), b.resolve(&load).unwrap());
    }

    #[test]
    fn miss_names_table_and_instruction() {
        let nop = parse(&ARM_AARCH64, "nop", Opcode::Nop);
        let table: AttrTable<u32> = AttrTable::new("Some_Target", "inverse_throughput")
            .rule(Key::ops(&[Opcode::MulV, Opcode::Mla]), 1);
        let err = table.resolve(&nop).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("inverse_throughput"));
        assert!(msg.contains("Some_Target"));
        assert!(msg.contains("nop"));
    }

    #[test]
    fn default_catches_misses() {
        let nop = parse(&ARM_AARCH64, "nop", Opcode::Nop);
        let table = AttrTable::new("test", "latency")
            .rule(Opcode::MulV, 4)
            .with_default(1);
        assert_eq!(table.resolve(&nop).unwrap(), &1);
        assert_eq!(table.len(), 1);
    }
}
