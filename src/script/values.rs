//! Literal decoding and result comparison.
//!
//! The engine boundary carries every numeric value through a single 64-bit
//! container. Script literals are decimal integers (floats are already given
//! as their bit patterns), so decoding never looks at the type tag. The tag
//! only matters when comparing: 32-bit types are compared on their low 32
//! bits, everything else on the full container.

use super::command::{LiteralText, ValueLiteral, ValueType};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValueError {
    #[error("invalid {ty} literal: {text}")]
    InvalidLiteral { ty: ValueType, text: String },
    #[error("unsupported {ty} literal: {text}")]
    UnsupportedLiteral { ty: ValueType, text: String },
}

/// A normalized actual/expected pair that failed to compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mismatch {
    pub got: i64,
    pub expected: i64,
}

/// Decode a literal into the 64-bit container.
///
/// Accepts the signed 64-bit range as well as unsigned values up to
/// `u64::MAX`, which are reinterpreted bit for bit.
pub fn decode(literal: &ValueLiteral) -> Result<i64, ValueError> {
    let text = match &literal.value {
        LiteralText::Scalar(text) => text,
        LiteralText::Lanes(_) => {
            return Err(ValueError::UnsupportedLiteral {
                ty: literal.ty.clone(),
                text: literal.value.to_string(),
            })
        }
    };
    let trimmed = text.trim();
    trimmed
        .parse::<i64>()
        .or_else(|_| trimmed.parse::<u64>().map(|v| v as i64))
        .map_err(|_| ValueError::InvalidLiteral {
            ty: literal.ty.clone(),
            text: text.clone(),
        })
}

/// Bring a container into its comparable form for the given type.
///
/// `i32` and `f32` keep only the low 32 bits, zero-extended; other types are
/// returned unchanged.
pub fn normalize(raw: i64, ty: &ValueType) -> i64 {
    match ty {
        ValueType::I32 | ValueType::F32 => i64::from(raw as u32),
        _ => raw,
    }
}

/// Compare an actual container against an expected literal, returning the
/// normalized pair when they differ.
///
/// The expected literal's type tag drives normalization of both sides.
pub fn check_expected(actual: i64, expected: &ValueLiteral) -> Result<Option<Mismatch>, ValueError> {
    let expected_raw = decode(expected)?;
    let got = normalize(actual, &expected.ty);
    let expected = normalize(expected_raw, &expected.ty);
    if got == expected {
        Ok(None)
    } else {
        Ok(Some(Mismatch { got, expected }))
    }
}
