use std::collections::HashMap;

use rstest::rstest;

use relax_rs::ir::utils::{tensor_mixed, tensor_static};
use relax_rs::ir::{
    Constant, DType, Expr, PrimExpr, ShapeExpr, StructInfo, TensorShape, Var, VarId,
};
use relax_rs::ops::infer::infer_struct_info;
use relax_rs::ops::{
    arange, eye, eye_like, full, full_like, hamming_window, ones, ones_like, tril, triu, zeros,
    zeros_like,
};
use relax_rs::{Arg, InferError, InferResult};

struct Env {
    vars: HashMap<VarId, StructInfo>,
    next: u32,
}

impl Env {
    fn new() -> Self {
        Self {
            vars: HashMap::new(),
            next: 0,
        }
    }

    fn bind(&mut self, name: &str, sinfo: StructInfo) -> Var {
        let var = Var::new(VarId(self.next), name);
        self.next += 1;
        self.vars.insert(var.id, sinfo);
        var
    }

    fn infer(&self, expr: &Expr) -> InferResult<StructInfo> {
        let op = expr
            .as_call()
            .unwrap_or_else(|| panic!("expected a call, got {expr}"));
        infer_struct_info(op, &self.vars)
    }
}

fn n() -> PrimExpr {
    PrimExpr::var("n", DType::Si64)
}

#[rstest]
#[case(&[])]
#[case(&[Some(5)])]
#[case(&[None, Some(3)])]
#[case(&[Some(2), None, None])]
#[case(&[None, Some(1), None, Some(8)])]
fn like_ops_reproduce_the_source_shape(#[case] dims: &[Option<i64>]) {
    let mut env = Env::new();
    let source = tensor_mixed(DType::F16, dims);
    let x = env.bind("x", source.clone());

    assert_eq!(env.infer(&zeros_like(x.clone(), None).expect("zeros_like")), Ok(source.clone()));
    assert_eq!(env.infer(&ones_like(x.clone(), None).expect("ones_like")), Ok(source.clone()));
    assert_eq!(
        env.infer(&full_like(x.clone(), 2.5, None).expect("full_like")),
        Ok(source.clone())
    );

    let cast = env
        .infer(&full_like(x, 0, Some(DType::F32)).expect("full_like"))
        .expect("inferred");
    assert_eq!(cast.tensor_shape(), source.tensor_shape());
    assert_eq!(cast.dtype(), Some(DType::F32));
}

#[test]
fn like_ops_propagate_unknown_rank_and_dtype() {
    let mut env = Env::new();
    let x = env.bind("x", StructInfo::tensor_unknown(None));
    assert_eq!(
        env.infer(&zeros_like(x.clone(), None).expect("zeros_like")),
        Ok(StructInfo::tensor_unknown(None))
    );
    assert_eq!(
        env.infer(&ones_like(x, Some(DType::Si32)).expect("ones_like")),
        Ok(StructInfo::tensor_unknown(Some(DType::Si32)))
    );
}

#[test]
fn like_ops_require_a_tensor_source() {
    let mut env = Env::new();
    let x = env.bind("x", StructInfo::prim(DType::Si64));
    let err = env
        .infer(&zeros_like(x, None).expect("zeros_like"))
        .expect_err("prim source");
    assert!(matches!(
        err,
        InferError::ExpectedTensor {
            op: "relax.zeros_like",
            param: "x",
            ..
        }
    ));
}

#[test]
fn unbound_sources_are_reported() {
    let env = Env::new();
    let ghost = Var::new(VarId(42), "ghost");
    assert_eq!(
        env.infer(&ones_like(ghost, None).expect("ones_like")),
        Err(InferError::UnboundVar("ghost".to_string()))
    );
}

#[test]
fn eye_without_m_is_square_and_rank_two() {
    let env = Env::new();
    let sinfo = env
        .infer(&eye(n(), None, 0, DType::F32).expect("eye"))
        .expect("inferred");
    assert_eq!(sinfo.ndim(), Some(2));
    assert_eq!(sinfo, StructInfo::tensor(ShapeExpr::new([n(), n()]), Some(DType::F32)));
}

#[test]
fn eye_with_m_uses_both_sizes() {
    let env = Env::new();
    assert_eq!(
        env.infer(&eye(3, Some(Arg::from(5)), 1, DType::F64).expect("eye")),
        Ok(tensor_static(DType::F64, &[3, 5]))
    );
}

#[test]
fn eye_like_accepts_matrices_and_unknown_ranks() {
    let mut env = Env::new();
    let matrix = env.bind("m", tensor_mixed(DType::F32, &[None, Some(4)]));
    let unknown = env.bind("u", StructInfo::tensor_unknown(Some(DType::F32)));
    let cube = env.bind("c", tensor_static(DType::F32, &[2, 2, 2]));

    assert_eq!(
        env.infer(&eye_like(matrix, 0, Some(DType::Bool)).expect("eye_like")),
        Ok(tensor_mixed(DType::Bool, &[None, Some(4)]))
    );
    assert!(env
        .infer(&eye_like(unknown, 0, None).expect("eye_like"))
        .is_ok());
    assert_eq!(
        env.infer(&eye_like(cube, 0, None).expect("eye_like")),
        Err(InferError::RankMismatch {
            op: "relax.eye_like",
            expected: "rank 2",
            ndim: 3,
        })
    );
}

#[rstest]
#[case(0, 10, 1, 10)]
#[case(1, 10, 2, 5)]
#[case(2, 11, 3, 3)]
#[case(-3, 3, 1, 6)]
#[case(4, 4, 1, 0)]
fn integer_arange_lengths_fold(
    #[case] start: i64,
    #[case] end: i64,
    #[case] step: i64,
    #[case] expected: i64,
) {
    let env = Env::new();
    let sinfo = env
        .infer(&arange(start, Some(Arg::from(end)), step, None).expect("arange"))
        .expect("inferred");
    assert_eq!(sinfo, tensor_static(DType::Si64, &[expected]));
}

#[rstest]
#[case(0, i64::MIN + 2, -1)]
#[case(0, i64::MAX, 1)]
#[case(i64::MIN, i64::MAX, 1)]
#[case(i64::MAX, i64::MIN, -1)]
#[case(i64::MIN, 0, i64::MAX)]
#[case(0, 1, i64::MIN)]
fn extreme_arange_bounds_infer_without_overflow(
    #[case] start: i64,
    #[case] end: i64,
    #[case] step: i64,
) {
    let env = Env::new();
    let sinfo = env
        .infer(&arange(start, Some(Arg::from(end)), step, None).expect("arange"))
        .expect("inferred");
    assert_eq!(sinfo.ndim(), Some(1));
    assert_eq!(sinfo.dtype(), Some(DType::Si64));
}

#[test]
fn overflowing_arange_lengths_stay_symbolic() {
    let env = Env::new();
    let sinfo = env
        .infer(&arange(0, Some(Arg::from(i64::MIN + 2)), -1, None).expect("arange"))
        .expect("inferred");
    let length = PrimExpr::floordiv(PrimExpr::int64(i64::MIN), PrimExpr::int64(-1));
    assert_eq!(sinfo, StructInfo::tensor(ShapeExpr::new([length]), Some(DType::Si64)));

    let sinfo = env
        .infer(&arange(0, Some(Arg::from(i64::MAX)), 1, None).expect("arange"))
        .expect("inferred");
    assert_eq!(sinfo, tensor_static(DType::Si64, &[i64::MAX]));
}

#[test]
fn float_arange_length_rounds_up() {
    let env = Env::new();
    let sinfo = env
        .infer(&arange(0, Some(Arg::from(1.5)), 1, None).expect("arange"))
        .expect("inferred");
    assert_eq!(sinfo, tensor_static(DType::F32, &[2]));

    let sinfo = env
        .infer(&arange(0.0, Some(Arg::from(1.0)), 0.25, None).expect("arange"))
        .expect("inferred");
    assert_eq!(sinfo, tensor_static(DType::F32, &[4]));
}

#[test]
fn symbolic_arange_simplifies_to_its_end() {
    let env = Env::new();
    let sinfo = env
        .infer(&arange(n(), None, 1, None).expect("arange"))
        .expect("inferred");
    assert_eq!(sinfo, StructInfo::tensor(ShapeExpr::new([n()]), Some(DType::Si64)));
}

#[test]
fn full_reads_its_shape_and_fill_dtype() {
    let mut env = Env::new();
    let shape = env.bind("s", StructInfo::shape(ShapeExpr::new([PrimExpr::int64(2), n()])));
    let sinfo = env
        .infer(&full(shape.clone(), 7, None).expect("full"))
        .expect("inferred");
    assert_eq!(
        sinfo,
        StructInfo::tensor(ShapeExpr::new([PrimExpr::int64(2), n()]), Some(DType::Si64))
    );

    let sinfo = env
        .infer(&full(shape, 7, Some(DType::F16)).expect("full"))
        .expect("inferred");
    assert_eq!(sinfo.dtype(), Some(DType::F16));
}

#[test]
fn full_with_shape_of_known_rank_only() {
    let mut env = Env::new();
    let shape = env.bind("s", StructInfo::shape_ndim(Some(3)));
    assert_eq!(
        env.infer(&full(shape, Constant::float(0.0, DType::F64), None).expect("full")),
        Ok(StructInfo::tensor_ndim(3, Some(DType::F64)))
    );
}

#[test]
fn full_rejects_non_shape_operands() {
    let mut env = Env::new();
    let tensor = env.bind("t", tensor_static(DType::Si64, &[2]));
    let err = env
        .infer(&full(tensor, 0.0, None).expect("full"))
        .expect_err("tensor is not a shape");
    assert!(matches!(
        err,
        InferError::ExpectedShape {
            op: "relax.full",
            param: "shape",
            ..
        }
    ));
}

#[test]
fn fill_values_must_be_scalars() {
    let mut env = Env::new();
    let vector = env.bind("v", tensor_static(DType::F32, &[3]));
    let unknown = env.bind("u", StructInfo::tensor_unknown(Some(DType::F32)));
    let x = env.bind("x", tensor_static(DType::F32, &[2, 2]));

    assert_eq!(
        env.infer(&full(vec![2], vector.clone(), None).expect("full")),
        Err(InferError::FillValueNotScalar {
            op: "relax.full",
            found: "rank 1".to_string(),
        })
    );
    assert_eq!(
        env.infer(&full(vec![2], unknown.clone(), None).expect("full")),
        Err(InferError::FillValueNotScalar {
            op: "relax.full",
            found: "unknown rank".to_string(),
        })
    );
    assert!(env
        .infer(&full_like(x.clone(), unknown, None).expect("full_like"))
        .is_ok());
    assert!(env
        .infer(&full_like(x, vector, None).expect("full_like"))
        .is_err());
}

#[test]
fn ones_and_zeros_use_their_explicit_dtype() {
    let env = Env::new();
    assert_eq!(
        env.infer(&ones(vec![2, 3], DType::Bf16).expect("ones")),
        Ok(tensor_static(DType::Bf16, &[2, 3]))
    );
    assert_eq!(
        env.infer(&zeros(Vec::<i64>::new(), DType::Ui8).expect("zeros")),
        Ok(tensor_static(DType::Ui8, &[]))
    );
}

#[rstest]
#[case(&[Some(4), Some(4)])]
#[case(&[None, Some(3), Some(5)])]
fn triangles_preserve_shape_and_dtype(#[case] dims: &[Option<i64>]) {
    let mut env = Env::new();
    let source = tensor_mixed(DType::F16, dims);
    let x = env.bind("x", source.clone());
    assert_eq!(env.infer(&tril(x.clone(), 0).expect("tril")), Ok(source.clone()));
    assert_eq!(env.infer(&triu(x, 1).expect("triu")), Ok(source));
}

#[test]
fn triangles_need_at_least_two_dimensions() {
    let mut env = Env::new();
    let vector = env.bind("v", tensor_static(DType::F32, &[8]));
    let unknown = env.bind("u", StructInfo::tensor_ndim(5, None));
    assert_eq!(
        env.infer(&tril(vector, 0).expect("tril")),
        Err(InferError::RankMismatch {
            op: "relax.tril",
            expected: "rank >= 2",
            ndim: 1,
        })
    );
    assert_eq!(
        env.infer(&triu(unknown, 0).expect("triu")),
        Ok(StructInfo::tensor_ndim(5, None))
    );
}

#[test]
fn hamming_window_has_rank_one() {
    let env = Env::new();
    let window = PrimExpr::var("w", DType::Si64);
    assert_eq!(
        env.infer(&hamming_window(window.clone(), true, 0.54, 0.46, DType::F32).expect("window")),
        Ok(StructInfo::tensor(ShapeExpr::new([window]), Some(DType::F32)))
    );
}

#[test]
fn hamming_window_rejects_integer_dtypes_and_empty_windows() {
    let env = Env::new();
    assert_eq!(
        env.infer(&hamming_window(8, true, 0.54, 0.46, DType::Si32).expect("window")),
        Err(InferError::IntegerDType {
            op: "relax.hamming_window",
            dtype: DType::Si32,
        })
    );
    assert_eq!(
        env.infer(&hamming_window(8, true, 0.54, 0.46, DType::Ui8).expect("window")),
        Err(InferError::IntegerDType {
            op: "relax.hamming_window",
            dtype: DType::Ui8,
        })
    );
    assert_eq!(
        env.infer(&hamming_window(0, false, 0.54, 0.46, DType::F32).expect("window")),
        Err(InferError::NonPositiveWindow {
            op: "relax.hamming_window",
            window_size: PrimExpr::int64(0),
        })
    );
}

#[test]
fn hamming_window_accepts_boolean_dtype() {
    let env = Env::new();
    assert_eq!(
        env.infer(&hamming_window(4, true, 0.54, 0.46, DType::Bool).expect("window")),
        Ok(tensor_static(DType::Bool, &[4]))
    );
}

#[test]
fn nested_calls_are_inferred_recursively() {
    let env = Env::new();
    let inner = ones(vec![2, 3], DType::F32).expect("ones");
    let outer = zeros_like(inner, None).expect("zeros_like");
    let sinfo = env.infer(&outer).expect("inferred");
    assert_eq!(sinfo.tensor_shape(), Some(&TensorShape::Known(ShapeExpr::from([2, 3]))));
}
