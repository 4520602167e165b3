use std::{
    env, fs,
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};

use relax_rs::ir::utils::tensor_static;
use relax_rs::ir::{DType, Function, PrimExpr, ShapeExpr, StructInfo, Var, VarId};
use relax_rs::ops::{arange, eye, full_like, ones, tril, zeros_like};
use relax_rs::passes::InferStructInfoPass;
use relax_rs::{Arg, BlockBuilder, InferError, InferenceConfig};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn unique_path(ext: &str) -> PathBuf {
    let mut path = env::temp_dir();
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before unix epoch")
        .as_nanos();
    path.push(format!("relax_rs_function_{timestamp}.{ext}"));
    path
}

fn sample_function() -> Function {
    let mut bb = BlockBuilder::new("main");
    let x = bb.add_param("x", tensor_static(DType::F32, &[2, 3]));
    let zeros = bb
        .emit("z", zeros_like(x.clone(), None).expect("zeros_like"))
        .expect("zeros_like infers");
    let filled = bb
        .emit("f", full_like(x, 1.5, Some(DType::F16)).expect("full_like"))
        .expect("full_like infers");
    let n = PrimExpr::var("n", DType::Si64);
    let range = bb
        .emit("r", arange(n, None, 1, None).expect("arange"))
        .expect("arange infers");
    bb.finish([zeros, filled, range]).expect("finish")
}

#[test]
fn emit_infers_each_binding_immediately() {
    init_logging();
    let mut bb = BlockBuilder::new("main");
    let x = bb.add_param("x", tensor_static(DType::F32, &[4, 4]));
    let lower = bb
        .emit("lower", tril(x, -1).expect("tril"))
        .expect("tril infers");
    assert_eq!(bb.struct_info(&lower), Some(&tensor_static(DType::F32, &[4, 4])));

    let id = bb
        .emit("id", eye(4, None, 0, DType::F32).expect("eye"))
        .expect("eye infers");
    assert_eq!(bb.struct_info(&id), Some(&tensor_static(DType::F32, &[4, 4])));
}

#[test]
fn failed_emit_binds_nothing() {
    let mut bb = BlockBuilder::new("main");
    let v = bb.add_param("v", tensor_static(DType::F32, &[8]));
    let err = bb
        .emit("bad", tril(v, 0).expect("tril"))
        .expect_err("rank-1 input");
    assert!(matches!(err, InferError::RankMismatch { ndim: 1, .. }));
    let function = bb.finish(Vec::new()).expect("finish");
    assert!(function.bindings.is_empty());
}

#[test]
fn finish_rejects_undeclared_outputs() {
    let bb = BlockBuilder::new("main");
    let stray = Var::new(VarId(99), "stray");
    assert_eq!(
        bb.finish([stray]).expect_err("stray output"),
        InferError::UnboundVar("stray".to_string())
    );
}

#[test]
fn pass_reports_failures_and_keeps_going() {
    init_logging();
    let mut bb = BlockBuilder::new("main");
    let v = bb.add_param("v", tensor_static(DType::F32, &[8]));
    let lower = bb.bind("lower", tril(v.clone(), 0).expect("tril"));
    let dependent = bb.bind("dependent", zeros_like(lower.clone(), None).expect("zeros_like"));
    let fine = bb.bind("fine", zeros_like(v, None).expect("zeros_like"));
    let function = bb.finish([dependent.clone(), fine.clone()]).expect("finish");

    let report = InferStructInfoPass::default().run(&function);
    assert!(!report.is_ok());
    assert!(!report.aborted);
    assert_eq!(report.diagnostics.len(), 2);
    assert!(matches!(
        report.error_for(&lower),
        Some(InferError::RankMismatch {
            op: "relax.tril",
            ..
        })
    ));
    assert_eq!(
        report.error_for(&dependent),
        Some(&InferError::UnresolvedOperand {
            op: "relax.zeros_like",
            param: "x",
            var: "lower".to_string(),
        })
    );
    assert_eq!(report.get(&fine), Some(&tensor_static(DType::F32, &[8])));
    assert_eq!(report.get(&lower), None);
}

#[test]
fn fail_fast_stops_at_the_first_diagnostic() {
    let mut bb = BlockBuilder::new("main");
    let v = bb.add_param("v", tensor_static(DType::F32, &[8]));
    bb.bind("lower", tril(v.clone(), 0).expect("tril"));
    let fine = bb.bind("fine", zeros_like(v, None).expect("zeros_like"));
    let function = bb.finish([fine.clone()]).expect("finish");

    let pass = InferStructInfoPass::new(InferenceConfig { fail_fast: true });
    let report = pass.run(&function);
    assert!(report.aborted);
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.get(&fine), None);
}

#[test]
fn deferred_like_bindings_resolve_in_the_pass() {
    let mut bb = BlockBuilder::new("main");
    let shape = ShapeExpr::new([PrimExpr::var("b", DType::Si64), PrimExpr::int64(16)]);
    let x = bb.add_param("x", StructInfo::tensor(shape.clone(), Some(DType::Bf16)));
    let y = bb.bind("y", zeros_like(x, None).expect("zeros_like"));
    let w = bb.bind("w", ones(Arg::from(shape.clone()), DType::F32).expect("ones"));
    let function = bb.finish([y.clone(), w.clone()]).expect("finish");
    assert!(function.bindings.iter().all(|binding| binding.struct_info.is_none()));

    let report = InferStructInfoPass::new(InferenceConfig::default()).run(&function);
    assert!(report.is_ok());
    assert_eq!(report.get(&y), Some(&StructInfo::tensor(shape.clone(), Some(DType::Bf16))));

    let annotated = report.annotate(function);
    assert_eq!(
        annotated.struct_info(w.id),
        Some(&StructInfo::tensor(shape, Some(DType::F32)))
    );
}

#[test]
fn function_renders_as_text() {
    let rendered = sample_function().to_text();
    assert!(
        rendered.starts_with("func @main(%x: tensor<f32 x 2x3>) {"),
        "unexpected header:\n{rendered}"
    );
    assert!(
        rendered.contains("%z = relax.zeros_like(%x) : tensor<f32 x 2x3>"),
        "missing zeros_like binding:\n{rendered}"
    );
    assert!(
        rendered.contains(
            "%r = relax.arange(prim(0: si64), prim(n: si64), prim(1: si64), dtype=si64) : tensor<si64 x n>"
        ),
        "missing arange binding:\n{rendered}"
    );
    assert!(rendered.contains("return (%z, %f, %r)"), "{rendered}");
}

#[test]
fn function_json_roundtrip() {
    let function = sample_function();
    let json = function.to_json_string().expect("serialize json");
    let decoded = Function::from_json_str(&json).expect("deserialize json");
    assert_eq!(decoded, function);
}

#[test]
fn function_bincode_roundtrip() {
    let function = sample_function();
    let bytes = function.to_bincode_bytes().expect("serialize bincode");
    let decoded = Function::from_bincode_slice(&bytes).expect("deserialize bincode");
    assert_eq!(decoded, function);
}

#[test]
fn function_save_and_load_from_disk() {
    let function = sample_function();

    let json_path = unique_path("json");
    function.save_json(&json_path).expect("save json");
    let loaded = Function::load_json(&json_path).expect("load json");
    assert_eq!(loaded, function);
    let _ = fs::remove_file(&json_path);

    let bin_path = unique_path("bin");
    function.save_bincode(&bin_path).expect("save bincode");
    let loaded = Function::load_bincode(&bin_path).expect("load bincode");
    assert_eq!(loaded, function);
    let _ = fs::remove_file(&bin_path);
}

#[test]
fn loading_a_missing_file_names_the_path() {
    let path = unique_path("missing.json");
    let err = Function::load_json(&path).expect_err("missing file");
    assert!(format!("{err:#}").contains("failed to read"), "{err:#}");
}

#[test]
fn inference_config_parses_with_defaults() {
    assert_eq!(
        InferenceConfig::from_json_str("{}").expect("empty config"),
        InferenceConfig::default()
    );
    assert!(
        InferenceConfig::from_json_str(r#"{"fail_fast": true}"#)
            .expect("fail_fast config")
            .fail_fast
    );
    assert!(InferenceConfig::from_json_str(r#"{"fail_fast": "sometimes"}"#).is_err());

    let pass = InferStructInfoPass::new(InferenceConfig::from_env());
    assert_eq!(pass.name(), InferStructInfoPass::NAME);
}
