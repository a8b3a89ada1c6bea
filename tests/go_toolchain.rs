// tests/go_toolchain.rs

#![cfg(unix)]

use std::error::Error;
use std::path::Path;

use hotrun::errors::HotrunError;
use hotrun::exec::{CompileRequest, GoToolchain, Toolchain};
use hotrun::types::BuildStep;
use hotrun_test_utils::init_tracing;

type TestResult = Result<(), Box<dyn Error>>;

/// `sh build -o <out> ...` runs this script from the working directory.
fn write_build_script(dir: &Path, body: &str) -> std::io::Result<()> {
    std::fs::write(dir.join("build"), body)
}

fn request(output: &str) -> CompileRequest {
    CompileRequest {
        output: output.into(),
        ..CompileRequest::default()
    }
}

#[tokio::test]
async fn compile_failure_carries_only_stderr() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let root = dir.path().canonicalize()?;
    write_build_script(
        &root,
        "echo \"GOGC=$GOGC\" >&2\npwd -P >&2\necho 'noise on stdout'\nexit 2\n",
    )?;
    let toolchain = GoToolchain::new("sh", vec!["true".into()], &root);

    match toolchain.compile(&request("app")).await {
        Err(HotrunError::Build { step, stderr }) => {
            assert_eq!(step, BuildStep::Compile);
            assert!(stderr.contains("GOGC=off"), "stderr: {stderr}");
            assert!(stderr.contains(&root.display().to_string()), "stderr: {stderr}");
            assert!(!stderr.contains("noise on stdout"), "stderr: {stderr}");
        }
        other => panic!("expected a compile error, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn compile_passes_output_name_to_the_tool() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    // $1 is `-o`, $2 the output name.
    write_build_script(dir.path(), ": > \"$2\"\n")?;
    let toolchain = GoToolchain::new("sh", vec!["true".into()], dir.path());

    toolchain.compile(&request("app")).await?;

    assert!(dir.path().join("app").is_file());
    Ok(())
}

#[tokio::test]
async fn docs_failure_surfaces_stderr() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let toolchain = GoToolchain::new(
        "sh",
        vec!["sh".into(), "-c".into(), "echo nodocs >&2; exit 3".into()],
        dir.path(),
    );

    let err = match toolchain.generate_docs().await {
        Err(err) => err,
        Ok(()) => return Err("doc generation unexpectedly succeeded".into()),
    };

    assert!(matches!(
        &err,
        HotrunError::Build { step: BuildStep::Docs, stderr } if stderr.trim() == "nodocs"
    ));
    assert_eq!(err.to_string().trim_end(), "doc generation step failed: nodocs");
    Ok(())
}

#[tokio::test]
async fn docs_success_is_ok() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let toolchain = GoToolchain::new(
        "sh",
        vec!["sh".into(), "-c".into(), "exit 0".into()],
        dir.path(),
    );

    toolchain.generate_docs().await?;
    Ok(())
}
