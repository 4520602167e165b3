//! Scalar element types carried by tensor and scalar IR nodes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse classification of a [`DType`], mirroring a type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DTypeKind {
    Bool,
    Int,
    UInt,
    Float,
}

/// Enumerates scalar element types understood by the creation operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DType {
    Bool,
    Si8,
    Si16,
    Si32,
    Si64,
    Ui8,
    Ui16,
    Ui32,
    Ui64,
    F16,
    Bf16,
    F32,
    F64,
}

impl DType {
    /// Returns the type code of this dtype.
    pub fn kind(self) -> DTypeKind {
        match self {
            DType::Bool => DTypeKind::Bool,
            DType::Si8 | DType::Si16 | DType::Si32 | DType::Si64 => DTypeKind::Int,
            DType::Ui8 | DType::Ui16 | DType::Ui32 | DType::Ui64 => DTypeKind::UInt,
            DType::F16 | DType::Bf16 | DType::F32 | DType::F64 => DTypeKind::Float,
        }
    }

    /// Returns `true` for signed integers only.
    ///
    /// This is the test used by `arange` when deciding whether its bounds are integral.
    pub fn is_signed_int(self) -> bool {
        self.kind() == DTypeKind::Int
    }

    pub fn is_unsigned_int(self) -> bool {
        self.kind() == DTypeKind::UInt
    }

    /// Returns `true` when the dtype is any signed or unsigned integer.
    pub fn is_integer(self) -> bool {
        matches!(self.kind(), DTypeKind::Int | DTypeKind::UInt)
    }

    pub fn is_float(self) -> bool {
        self.kind() == DTypeKind::Float
    }

    pub fn is_bool(self) -> bool {
        self == DType::Bool
    }

    /// Returns the storage bit-width of the scalar.
    pub fn bitwidth(self) -> usize {
        match self {
            DType::Bool => 1,
            DType::Si8 | DType::Ui8 => 8,
            DType::Si16 | DType::Ui16 | DType::F16 | DType::Bf16 => 16,
            DType::Si32 | DType::Ui32 | DType::F32 => 32,
            DType::Si64 | DType::Ui64 | DType::F64 => 64,
        }
    }

    /// Canonical short spelling used by the text printer.
    pub fn as_str(self) -> &'static str {
        match self {
            DType::Bool => "i1",
            DType::Si8 => "si8",
            DType::Si16 => "si16",
            DType::Si32 => "si32",
            DType::Si64 => "si64",
            DType::Ui8 => "ui8",
            DType::Ui16 => "ui16",
            DType::Ui32 => "ui32",
            DType::Ui64 => "ui64",
            DType::F16 => "f16",
            DType::Bf16 => "bf16",
            DType::F32 => "f32",
            DType::F64 => "f64",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a dtype string does not name a supported element type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported dtype `{0}`")]
pub struct ParseDTypeError(pub String);

impl FromStr for DType {
    type Err = ParseDTypeError;

    fn from_str(src: &str) -> Result<Self, Self::Err> {
        let normalized = src.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "i1" | "bool" => Ok(DType::Bool),
            "si8" | "i8" | "int8" => Ok(DType::Si8),
            "si16" | "i16" | "int16" => Ok(DType::Si16),
            "si32" | "i32" | "int32" => Ok(DType::Si32),
            "si64" | "i64" | "int64" => Ok(DType::Si64),
            "ui8" | "u8" | "uint8" => Ok(DType::Ui8),
            "ui16" | "u16" | "uint16" => Ok(DType::Ui16),
            "ui32" | "u32" | "uint32" => Ok(DType::Ui32),
            "ui64" | "u64" | "uint64" => Ok(DType::Ui64),
            "f16" | "float16" => Ok(DType::F16),
            "bf16" | "bfloat16" => Ok(DType::Bf16),
            "f32" | "float32" => Ok(DType::F32),
            "f64" | "float64" => Ok(DType::F64),
            _ => Err(ParseDTypeError(src.trim().to_string())),
        }
    }
}
