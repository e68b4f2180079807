mod common;

use std::path::Path;
use std::process::Command;

use minicc::{compile, compile_file, CompileError};

fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{name}", env!("CARGO_MANIFEST_DIR"))
}

fn eval(source: &str) -> i64 {
    let asm = compile(source.as_bytes()).unwrap();
    common::run(&asm)
}

#[test]
fn return_0() {
    let asm = compile(b"int main() { return 0; }").unwrap();
    assert!(asm.contains(".globl main"));
    assert!(asm.contains("main:"));
    assert!(asm.contains("pushq $0"));
    assert!(asm.contains("ret"));
}

#[test]
fn full_asm_format() {
    let asm = compile(b"int main() { return 7; }").unwrap();
    assert_eq!(
        asm,
        "    .text\n    .globl main\nmain:\n    pushq $7\n    popq %rax\n    ret\n"
    );
}

#[test]
fn multiline_source() {
    assert_eq!(eval("int main() {\n    return 123;\n}\n"), 123);
}

#[test]
fn empty_input_has_only_the_header() {
    assert_eq!(compile(b"").unwrap(), "    .text\n    .globl main\n");
}

#[test]
fn subtraction_is_left_associative() {
    assert_eq!(eval("int main() { return 1 - 2 - 3; }"), -4);
}

#[test]
fn multiplication_binds_tighter() {
    assert_eq!(eval("int main() { return 2 + 3 * 4; }"), 14);
    assert_eq!(eval("int main() { return 1 + 2 * 3 - 4; }"), 3);
    assert_eq!(eval("int main() { return (2 + 3) * 4; }"), 20);
}

#[test]
fn division_truncates_toward_zero() {
    assert_eq!(eval("int main() { return -7 / 2; }"), -3);
    assert_eq!(eval("int main() { return -7 % 2; }"), -1);
    assert_eq!(eval("int main() { return 7 % -2; }"), 1);
}

#[test]
fn unary_minus_and_plus() {
    assert_eq!(eval("int main() { return -(3 - 10); }"), 7);
    assert_eq!(eval("int main() { return +5; }"), 5);
}

#[test]
fn large_constant() {
    assert_eq!(eval("int main() { return 4294967296 + 1; }"), 4_294_967_297);
}

#[test]
fn char_constant_value() {
    assert_eq!(eval("int main() { return 'a' - '\\n'; }"), 97 - 10);
}

#[test]
fn if_else_chain() {
    let source = "int main() { if (0) return 1; else if (2 - 2) return 2; else return 3; }";
    assert_eq!(eval(source), 3);
}

#[test]
fn if_without_else_falls_through() {
    assert_eq!(eval("int main() { if (0) return 1; return 9; }"), 9);
}

#[test]
fn while_body_runs_until_return() {
    assert_eq!(eval("int main() { while (1) { 5; return 4; } return 8; }"), 4);
    assert_eq!(eval("int main() { while (0) return 1; return 2; }"), 2);
}

#[test]
fn conditional_expression() {
    assert_eq!(eval("int main() { return 1 ? 5 : 6; }"), 5);
    assert_eq!(eval("int main() { return 0 ? 5 : 1 ? 7 : 8; }"), 7);
    assert_eq!(eval("int main() { return (3 - 3 ? 10 : 20) + 1; }"), 21);
}

#[test]
fn each_function_is_its_own_label() {
    let asm = compile(b"int seven() { return 7; }\nint main() { return 0; }").unwrap();
    assert_eq!(common::run_function(&asm, "seven"), 7);
    assert_eq!(common::run(&asm), 0);
}

#[test]
fn macro_substitution() {
    assert_eq!(eval("#define N 5\nint main() { return N * 2; }"), 10);
}

#[test]
fn macro_redefinition_overwrites() {
    assert_eq!(eval("#define N 5\n#define N 7\nint main() { return N; }"), 7);
}

#[test]
fn macro_value_after_block_comment() {
    assert_eq!(eval("#define N /* five */ 5\nint main() { return N; }"), 5);
}

#[test]
fn ifdef_name_must_be_on_the_same_line() {
    let err = compile(b"#ifdef\nmain\nint main() { return 1; }\n#endif\nint x;").unwrap_err();
    assert!(matches!(err, CompileError::Preprocess { .. }));
    assert!(err.to_string().contains("#ifdef expects an identifier"));
}

#[test]
fn undef_removes_macro() {
    let err = compile(b"#define N 5\n#undef N\nint main() { return N; }").unwrap_err();
    assert!(matches!(err, CompileError::Codegen { .. }));
}

#[test]
fn ifdef_else_selects_branch() {
    let source = "#ifdef FOO\nint main() { return 1; }\n#else\nint main() { return 2; }\n#endif\n";
    assert_eq!(eval(source), 2);

    let source = format!("#define FOO\n{source}");
    assert_eq!(eval(&source), 1);
}

#[test]
fn ifndef_guard() {
    let source = "#ifndef LIMIT\n#define LIMIT 3\n#endif\nint main() { return LIMIT; }";
    assert_eq!(eval(source), 3);
}

#[test]
fn system_include_is_skipped() {
    assert_eq!(eval("#include <stdlib.h>\nint main() { return 1; }"), 1);
}

#[test]
fn quoted_include_resolves_from_working_directory() {
    assert_eq!(
        eval("#include \"tests/fixtures/inc/two.h\"\nint main() { return TWO; }"),
        2
    );
}

#[test]
fn nested_includes_resolve_relative_to_includer() {
    let mut out = Vec::new();
    compile_file(Path::new(&fixture("main.c")), &mut out).unwrap();
    let asm = String::from_utf8(out).unwrap();
    assert_eq!(common::run(&asm), 42);
}

#[test]
fn missing_include_reports_path() {
    let err = compile_file(Path::new(&fixture("missing_include.c")), &mut Vec::new()).unwrap_err();
    let CompileError::Include { path, source } = &err else {
        panic!("expected include error, got {err:?}");
    };
    assert!(path.ends_with("nowhere.h"));
    assert!(matches!(**source, CompileError::Io { .. }));
    assert_eq!(err.position(), None);
}

#[test]
fn error_inside_included_file() {
    let err = compile_file(Path::new(&fixture("bad_include.c")), &mut Vec::new()).unwrap_err();
    assert!(matches!(err, CompileError::Include { .. }));
    assert!(err.to_string().contains("unterminated string literal"));
    assert_eq!(err.position(), Some((1, 18)));
}

#[test]
fn missing_file_is_io_error() {
    let err = compile_file(Path::new(&fixture("absent.c")), &mut Vec::new()).unwrap_err();
    assert!(matches!(err, CompileError::Io { .. }));
}

#[test]
fn error_invalid_token() {
    let err = compile(b"int main() { return @; }").unwrap_err();
    assert!(err.to_string().contains("unexpected character: '@'"));
    assert_eq!(err.position(), Some((1, 21)));
}

#[test]
fn error_unterminated_string() {
    let err = compile(b"int main() { \"abc\n; return 0; }").unwrap_err();
    assert!(matches!(err, CompileError::Lex { .. }));
}

#[test]
fn error_unknown_directive() {
    let err = compile(b"#pragma once\nint main() { return 0; }").unwrap_err();
    assert!(matches!(err, CompileError::Preprocess { .. }));
}

#[test]
fn error_missing_semicolon() {
    let err = compile(b"int main() { return 42 }").unwrap_err();
    assert!(err.to_string().contains("expected ';'"));
}

#[test]
fn error_missing_brace() {
    let err = compile(b"int main() { return 0;").unwrap_err();
    assert!(err.to_string().contains("expected '}'"));
}

#[test]
fn error_variable_use() {
    let err = compile(b"int main() { int x; return x; }").unwrap_err();
    assert!(err.to_string().contains("identifier `x` has no storage"));
}

#[test]
fn cli_prints_assembly() {
    let output = Command::new(env!("CARGO_BIN_EXE_minicc"))
        .arg(fixture("main.c"))
        .output()
        .unwrap();
    assert!(output.status.success());
    let asm = String::from_utf8(output.stdout).unwrap();
    assert_eq!(common::run(&asm), 42);
}

#[test]
fn cli_reports_errors() {
    let output = Command::new(env!("CARGO_BIN_EXE_minicc"))
        .arg(fixture("bad_include.c"))
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("unterminated string literal"));
}

#[test]
fn cli_token_stage() {
    let output = Command::new(env!("CARGO_BIN_EXE_minicc"))
        .args(["--stage", "preprocess"])
        .arg(fixture("main.c"))
        .output()
        .unwrap();
    assert!(output.status.success());
    let listing = String::from_utf8(output.stdout).unwrap();
    assert!(listing.contains("\t40\n"));
    assert!(listing.contains("\t2\n"));
    assert!(!listing.contains("VALUE"));
}
