//! End-to-end checks of the library pipeline: source text in, C++ out.

use std::path::PathBuf;

use nubbc::{CompileError, compile, compile_to_path, generate_cpp};

fn scratch(name: &str) -> PathBuf {
  std::env::temp_dir().join(format!("nubbc-{}-{name}.cpp", std::process::id()))
}

#[test]
fn declaration_then_print() {
  let emitter = compile("LET int a = 1\nPRINT a\n").unwrap();
  let code = emitter.code();
  let decl = code.find("int a { 1 };").expect("declaration emitted");
  let print = code.find("std::cout << a;").expect("print emitted");
  assert!(decl < print);
}

#[test]
fn conditional_guards_print() {
  let cpp = generate_cpp("IF 1 == 1 THEN\nPRINT \"hi\"\nENDIF\n").unwrap();
  assert!(cpp.contains("if (1==1)\n{\nstd::cout << \"hi\\n\";\n}\n"));
}

#[test]
fn script_output_is_wrapped_in_main() {
  let cpp = generate_cpp("PRINT \"hello\"\n").unwrap();
  assert_eq!(
    cpp,
    "// Generated by nubbc\n\
     #include <iostream>\n\
     #include <limits>\n\
     #include <string>\n\
     #include <vector>\n\
     \n\
     int main()\n\
     {\n\
     std::cout << \"hello\\n\";\n\
     \treturn 0;\n\
     }\n"
  );
}

#[test]
fn function_program_has_no_implicit_main() {
  let cpp = generate_cpp("FUNCTION main:\nPRINT \"hello\"\nRETURN 0\nENDFUNCTION\n").unwrap();
  assert_eq!(cpp.matches("int main()").count(), 1);
  assert!(cpp.ends_with("int main()\n{\nstd::cout << \"hello\\n\";\nreturn 0;\n}\n"));
}

#[test]
fn globals_are_shared_by_functions() {
  let source = "LET int counter = 0\n\
                FUNCTION VOID bump:\n\
                LET counter = counter + 1\n\
                ENDFUNCTION\n\
                FUNCTION main:\n\
                CALL bump\n\
                PRINT counter\n\
                RETURN 0\n\
                ENDFUNCTION\n";
  let cpp = generate_cpp(source).unwrap();
  let global = cpp.find("int counter { 0 };").expect("global emitted");
  let bump = cpp.find("void bump()").expect("function emitted");
  assert!(global < bump);
  assert_eq!(cpp.matches("int main()").count(), 1);
  assert!(!cpp.contains("\treturn 0;"));
}

#[test]
fn undefined_goto_target_aborts_without_output() {
  let path = scratch("missing-label");
  let _ = std::fs::remove_file(&path);

  let err = compile_to_path("GOTO missing\n", &path).unwrap_err();
  assert!(matches!(err, CompileError::Semantic { .. }));
  assert!(err.to_string().contains("undefined label: missing"));
  assert!(!path.exists());
}

#[test]
fn unterminated_string_aborts() {
  let err = compile("PRINT \"never closed\n").unwrap_err();
  assert!(matches!(err, CompileError::Lexical { line: 1, .. }));
  assert!(err.to_string().contains("Illegal character found in string"));
}

#[test]
fn only_first_error_is_reported() {
  let err = compile("PRINT ghost\nPRINT \"oops\n").unwrap_err();
  assert!(matches!(err, CompileError::Semantic { line: 1, .. }));
}

#[test]
fn referenced_labels_must_all_be_declared() {
  let ok = "GOTO end\nLABEL start\nGOTO start\nLABEL end\n";
  assert!(compile(ok).is_ok());

  let err = compile("LABEL start\nGOTO start\nGOTO elsewhere\n").unwrap_err();
  assert_eq!(err.line(), Some(3));
}

#[test]
fn compiling_twice_is_byte_identical() {
  let source = std::fs::read_to_string(concat!(env!("CARGO_MANIFEST_DIR"), "/demos/guess.nubb"))
    .unwrap();
  let first = scratch("first");
  let second = scratch("second");

  compile_to_path(&source, &first).unwrap();
  compile_to_path(&source, &second).unwrap();

  let a = std::fs::read(&first).unwrap();
  let b = std::fs::read(&second).unwrap();
  std::fs::remove_file(&first).unwrap();
  std::fs::remove_file(&second).unwrap();
  assert!(!a.is_empty());
  assert_eq!(a, b);
}

#[test]
fn demo_programs_compile() {
  for name in ["guess.nubb", "functions.nubb"] {
    let path = format!("{}/demos/{name}", env!("CARGO_MANIFEST_DIR"));
    let source = std::fs::read_to_string(&path).unwrap();
    if let Err(err) = generate_cpp(&source) {
      panic!("{name} failed to compile: {err}");
    }
  }
}
