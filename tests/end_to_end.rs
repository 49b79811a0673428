//! End-to-end scenarios over the full translate pipeline (no downstream
//! compiler invocation — these exercise transpile + emit only).

use bifc::config::TranspilerConfig;
use bifc::{translate_source, translate_to_cpp};

#[test]
fn division_promotes_integer_literals() {
    let config = TranspilerConfig::default();
    let result = translate_source("x = 10\ny = 5\nprint(x / y)\n", &config).unwrap();
    assert!(result.body.contains(&"auto x = 10;".to_string()));
    assert!(result.body.contains(&"auto y = 5;".to_string()));
    assert!(result
        .body
        .contains(&"std::cout << x / y << std::endl;".to_string()));
}

#[test]
fn if_else_emits_matching_braces() {
    let config = TranspilerConfig::default();
    let source = "n = 3\nif n > 0:\n    print(n)\nelse:\n    print(0)\n";
    let result = translate_source(source, &config).unwrap();
    assert_eq!(
        result.body,
        vec![
            "auto n = 3;".to_string(),
            "if (n > 0) {".to_string(),
            "std::cout << n << std::endl;".to_string(),
            "}".to_string(),
            "else {".to_string(),
            "std::cout << 0 << std::endl;".to_string(),
            "}".to_string(),
        ]
    );
}

#[test]
fn while_loop_declares_once_then_reassigns() {
    let config = TranspilerConfig::default();
    let source = "i = 10\nwhile i > 0:\n    print(i)\n    i = i - 1\n";
    let result = translate_source(source, &config).unwrap();
    assert_eq!(result.body[0], "auto i = 10;");
    assert!(result.body.contains(&"i = i - 1;".to_string()));
    assert_eq!(result.body.iter().filter(|l| l.as_str() == "}").count(), 1);
}

#[test]
fn logic_functions_rewrite_to_boolean_operators() {
    let config = TranspilerConfig::default();
    let source = "flag = and(True, not(False))\nprint(flag)\n";
    let result = translate_source(source, &config).unwrap();
    assert_eq!(result.body[0], "auto flag = ((true) && ((!(false))));");
}

#[test]
fn module_import_rendered_with_header_and_using_decl() {
    let config = TranspilerConfig::default();
    let source = "import BIFMath\nprint(BIFMath.sqrt(9))\n";
    let cpp = translate_to_cpp(source, &config).unwrap();
    assert!(cpp.contains("#include \"libs/BIFMath/BIFMath.h\""));
    assert!(cpp.contains("using bif::math::BIFMath;"));
    assert!(cpp.contains("std::cout << BIFMath::sqrt(9.0) << std::endl;"));
}

#[test]
fn tab_character_is_a_lexical_error() {
    let config = TranspilerConfig::default();
    let err = translate_source("x = 1\n\tprint(x)\n", &config).unwrap_err();
    assert_eq!(err.to_string(), "Line 2: Tabs are not allowed. Use 4 spaces.");
}

#[test]
fn expression_without_division_is_numerically_unchanged() {
    let config = TranspilerConfig::default();
    let result = translate_source("print(1 + 2)\n", &config).unwrap();
    assert_eq!(result.body, vec!["std::cout << 1 + 2 << std::endl;".to_string()]);
}

#[test]
fn imports_appear_once_in_first_seen_order() {
    let config = TranspilerConfig::default();
    let source = "import BIFMath\nimport BIFitertools\nimport BIFMath\nprint(1)\n";
    let result = translate_source(source, &config).unwrap();
    assert_eq!(result.imports, vec!["BIFMath".to_string(), "BIFitertools".to_string()]);
}
