//! Shape and struct-info helpers for callers building IR by hand.

use crate::ir::dtype::DType;
use crate::ir::expr::ShapeExpr;
use crate::ir::prim::{PrimExpr, PrimVar};
use crate::ir::struct_info::StructInfo;

/// Builds a static shape from explicit dimensions.
pub fn shape_static(dims: &[i64]) -> ShapeExpr {
    ShapeExpr::from(dims)
}

/// Builds a mixed static/dynamic shape; dynamic dims become `si64` symbols `d{idx}`.
pub fn shape_mixed(dims: &[Option<i64>]) -> ShapeExpr {
    dims.iter()
        .enumerate()
        .map(|(idx, dim)| match dim {
            Some(value) => PrimExpr::int64(*value),
            None => PrimExpr::Var(PrimVar::new(format!("d{idx}"), DType::Si64)),
        })
        .collect()
}

pub fn tensor_static(dtype: DType, dims: &[i64]) -> StructInfo {
    StructInfo::tensor(shape_static(dims), Some(dtype))
}

pub fn tensor_mixed(dtype: DType, dims: &[Option<i64>]) -> StructInfo {
    StructInfo::tensor(shape_mixed(dims), Some(dtype))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixed_shapes_name_dynamic_dims_by_position() {
        let shape = shape_mixed(&[Some(2), None, Some(4)]);
        assert_eq!(shape.values()[0], PrimExpr::int64(2));
        assert_eq!(shape.values()[1], PrimExpr::var("d1", DType::Si64));
        assert_eq!(shape.rank(), 3);
    }
}
