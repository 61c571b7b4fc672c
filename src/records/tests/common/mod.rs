use ast::{AstFile, Expr, PositionalParam, TypeDecl, TypeName};
use compiler::BuildOptions;
use diagnostics::{DiagnosticFlags, Diagnostics};
use records::Compilation;
use source_files::SourceFiles;
use tracing_subscriber::EnvFilter;

/// Logs to the test writer when `RECORDS_LOG` is set, e.g. `RECORDS_LOG=build_records=trace`
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_env("RECORDS_LOG"))
        .with_test_writer()
        .try_init();
}

pub fn compile(file: AstFile, options: BuildOptions, f: impl FnOnce(&Compilation, Vec<&'static str>)) {
    init_logging();

    let source_files = SourceFiles::new();
    let diagnostics = Diagnostics::new(&source_files, DiagnosticFlags::collecting());
    let asg = records::declare(&file, &source_files, &diagnostics);
    let compilation = records::compile(&asg, &diagnostics, &options).unwrap();

    f(&compilation, diagnostics.codes());
}

/// `record A;` and `record B(int I) : A;`
pub fn a_and_b() -> Vec<TypeDecl> {
    vec![
        TypeDecl::record("A"),
        TypeDecl::record("B")
            .inherits("A")
            .with_params([PositionalParam::new("I", TypeName::Int)]),
    ]
}

pub fn new_b(value: i64) -> Expr {
    Expr::new_object("B", [Expr::int(value)])
}
