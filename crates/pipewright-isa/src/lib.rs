//! Instruction modeling for the Pipewright scheduling cost layer.
//!
//! - **Registers:** closed register classes and per-dialect name spaces
//! - **Instructions:** static variant definitions and parsed instances
//! - **Dialects:** the architecture registry (`Arm_v81M`, `Arm_AArch64`)
//! - **Parser:** assembly text to candidate instructions
//! - **Loops:** preamble / body / postamble extraction

pub mod arch;
pub mod datatype;
pub mod error;
pub mod instruction;
pub mod loops;
pub mod parser;
pub mod register;

pub use arch::{get_arch, list_archs, Arch, ARM_AARCH64, ARM_V81M};
pub use datatype::DataTypeKind;
pub use error::{Attempt, IsaError, MatchFailure, Result};
pub use instruction::{Address, InstrDef, Instruction, MemoryAccess, Opcode};
pub use loops::{extract_loop, Loop};
pub use parser::{canonical_line, parse_body, parse_line, variant_lines, ParsedLine};
pub use register::{RegisterClass, RegisterFile};
