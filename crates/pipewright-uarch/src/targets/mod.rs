//! Built-in microarchitecture models.
//!
//! Each submodule declares one target's execution units and its three cost
//! tables. Numbers are per-target data and carry no shared meaning; only the
//! shapes (conjunctive units, paired latencies, hooks) are common.

mod apple_m1;
mod cortex_a55;
mod cortex_a72;
mod cortex_m55;
mod cortex_m85;
mod neoverse_n1;

pub use apple_m1::{AppleM1Firestorm, AppleM1Icestorm};
pub use cortex_a55::CortexA55;
pub use cortex_a72::CortexA72Frontend;
pub use cortex_m55::CortexM55;
pub use cortex_m85::CortexM85;
pub use neoverse_n1::NeoverseN1;

use pipewright_isa::Instruction;

/// Whether output `output_index` of `src` is the accumulator `dst` reads and
/// writes back.
pub(crate) fn feeds_accumulator(
    src: &Instruction,
    output_index: usize,
    dst: &Instruction,
) -> bool {
    if !dst.is_multiply_accumulate() {
        return false;
    }
    match (src.written(output_index), dst.in_outs().first()) {
        (Some(written), Some(acc)) => written == acc,
        _ => false,
    }
}

pub(crate) fn is_any_load(inst: &Instruction) -> bool {
    inst.is_load() || inst.is_stack_load()
}

pub(crate) fn is_any_store(inst: &Instruction) -> bool {
    inst.is_store() || inst.is_stack_store()
}

/// Floating-point vector arithmetic.
pub(crate) fn is_float_vector_op(inst: &Instruction) -> bool {
    inst.is_float() && (inst.is_vector_mul() || inst.is_vector_add_sub())
}

#[cfg(test)]
pub(crate) fn parse_as(
    arch: &pipewright_isa::Arch,
    line: &str,
    op: pipewright_isa::Opcode,
) -> Instruction {
    pipewright_isa::parse_line(arch, line)
        .unwrap()
        .into_iter()
        .find(|i| i.opcode() == op)
        .unwrap()
}
