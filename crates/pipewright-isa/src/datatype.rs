//! Datatype suffixes embedded in mnemonics (`vmul.s32`, `fmul.f16`).

use std::fmt;

const INTEGER: &[&str] = &["i8", "i16", "i32", "s8", "s16", "s32", "u8", "u16", "u32"];
const SIGNED: &[&str] = &["s8", "s16", "s32"];
const FLOAT: &[&str] = &["f16", "f32"];
const ANY: &[&str] = &[
    "i8", "i16", "i32", "s8", "s16", "s32", "u8", "u16", "u32", "f16", "f32",
];
const WORD: &[&str] = &["u32", "s32", "f32"];

/// Kind of suffix placeholder a mnemonic template carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataTypeKind {
    /// Integer lanes of any width and signedness.
    Integer,
    /// Signed integer lanes only.
    Signed,
    /// Floating-point lanes.
    Float,
    /// Integer or floating-point lanes.
    Any,
    /// 32-bit lanes (word-sized memory accesses).
    Word,
}

impl DataTypeKind {
    /// All concrete suffixes this placeholder expands to.
    pub fn suffixes(self) -> &'static [&'static str] {
        match self {
            DataTypeKind::Integer => INTEGER,
            DataTypeKind::Signed => SIGNED,
            DataTypeKind::Float => FLOAT,
            DataTypeKind::Any => ANY,
            DataTypeKind::Word => WORD,
        }
    }

    /// Whether `suffix` is a legal expansion of this placeholder.
    pub fn accepts(self, suffix: &str) -> bool {
        self.suffixes().contains(&suffix)
    }
}

impl fmt::Display for DataTypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataTypeKind::Integer => write!(f, "<int>"),
            DataTypeKind::Signed => write!(f, "<signed>"),
            DataTypeKind::Float => write!(f, "<float>"),
            DataTypeKind::Any => write!(f, "<dt>"),
            DataTypeKind::Word => write!(f, "<word>"),
        }
    }
}

/// Whether a concrete suffix denotes floating-point lanes.
pub fn is_float_suffix(suffix: &str) -> bool {
    suffix.starts_with('f')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_excludes_float() {
        assert!(DataTypeKind::Integer.accepts("u16"));
        assert!(!DataTypeKind::Integer.accepts("f32"));
    }

    #[test]
    fn any_is_integer_plus_float() {
        let any = DataTypeKind::Any.suffixes();
        for s in DataTypeKind::Integer
            .suffixes()
            .iter()
            .chain(DataTypeKind::Float.suffixes())
        {
            assert!(any.contains(s));
        }
        assert_eq!(
            any.len(),
            DataTypeKind::Integer.suffixes().len() + DataTypeKind::Float.suffixes().len()
        );
    }

    #[test]
    fn word_is_32_bit() {
        assert!(DataTypeKind::Word.suffixes().iter().all(|s| s.ends_with("32")));
        assert!(is_float_suffix("f16"));
        assert!(!is_float_suffix("s16"));
    }
}
