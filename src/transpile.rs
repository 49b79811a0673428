//! The statement transpiler: a line-oriented driver over indentation,
//! turning source-language statements into target-language lines.

use crate::error::TranspileError;
use crate::registry::ModuleRegistry;
use crate::rewriter::normalize_expression;
use crate::scanner::{self, is_valid_identifier, split_top_level_args, strip_comment};
use std::collections::{HashMap, HashSet};

/// Output of a full transpile run: the emitted body lines (unindented —
/// the emitter applies indentation when assembling `main`) and the
/// first-seen-order list of imported modules.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TranspileResult {
    pub body: Vec<String>,
    pub imports: Vec<String>,
}

/// Per-run mutable state: the indent stack, the expect-indent flag, the
/// set of names already declared, and the import bookkeeping. Lives only
/// for the duration of one `transpile` call.
struct TranspileState<'a> {
    registry: &'a ModuleRegistry,
    body: Vec<String>,
    indent_stack: Vec<usize>,
    expect_indent: bool,
    defined: HashSet<String>,
    imports: Vec<String>,
    imported_names: HashMap<String, String>,
}

impl<'a> TranspileState<'a> {
    fn new(registry: &'a ModuleRegistry) -> Self {
        TranspileState {
            registry,
            body: Vec::new(),
            indent_stack: vec![0],
            expect_indent: false,
            defined: HashSet::new(),
            imports: Vec::new(),
            imported_names: HashMap::new(),
        }
    }

    fn normalize(&self, expr: &str) -> String {
        normalize_expression(expr, &self.imports, &self.imported_names)
    }

    fn add_import(&mut self, module_name: &str, lineno: usize) -> Result<(), TranspileError> {
        if !self.registry.contains(module_name) {
            return Err(TranspileError::syntactic(
                lineno,
                format!("Unknown module '{}'.", module_name),
            ));
        }
        if !self.imports.iter().any(|m| m == module_name) {
            self.imports.push(module_name.to_string());
        }
        Ok(())
    }
}

/// Transpile a complete source-language program (one string per line, in
/// order) into the target-language body and import list.
pub fn transpile(lines: &[String], registry: &ModuleRegistry) -> Result<TranspileResult, TranspileError> {
    let mut state = TranspileState::new(registry);

    for (index, raw_line) in lines.iter().enumerate() {
        let lineno = index + 1;
        process_line(&mut state, raw_line, lineno)?;
    }

    while state.indent_stack.len() > 1 {
        state.body.push("}".to_string());
        state.indent_stack.pop();
    }

    Ok(TranspileResult {
        body: state.body,
        imports: state.imports,
    })
}

fn process_line(state: &mut TranspileState<'_>, raw_line: &str, lineno: usize) -> Result<(), TranspileError> {
    let mut line = strip_comment(raw_line);
    while matches!(line.chars().last(), Some('\n') | Some('\r')) {
        line.pop();
    }

    if line.contains('\t') {
        return Err(TranspileError::lexical(
            lineno,
            "Tabs are not allowed. Use 4 spaces.",
        ));
    }

    let Some(first_non_space) = line.find(|c: char| c != ' ') else {
        return Ok(());
    };

    if first_non_space % 4 != 0 {
        return Err(TranspileError::lexical(
            lineno,
            "Indentation must be multiples of 4 spaces.",
        ));
    }
    let indent = first_non_space;

    if indent > *state.indent_stack.last().unwrap() {
        if !state.expect_indent {
            return Err(TranspileError::structural(lineno, "Unexpected indentation."));
        }
        state.indent_stack.push(indent);
        state.expect_indent = false;
    }

    while indent < *state.indent_stack.last().unwrap() {
        state.body.push("}".to_string());
        state.indent_stack.pop();
    }

    if state.expect_indent && indent == *state.indent_stack.last().unwrap() {
        return Err(TranspileError::structural(lineno, "Expected indented block."));
    }

    let stripped = &line[first_non_space..];
    classify_and_emit(state, stripped, lineno)
}

fn classify_and_emit(state: &mut TranspileState<'_>, stripped: &str, lineno: usize) -> Result<(), TranspileError> {
    if let Some(rest) = stripped.strip_prefix("import ") {
        let module_name = rest.trim_start();
        state.add_import(module_name, lineno)?;
        return Ok(());
    }

    if let Some(rest) = stripped.strip_prefix("from ") {
        return emit_from_import(state, rest, lineno);
    }

    if stripped.starts_with("for ") && stripped.ends_with(':') {
        return emit_for(state, stripped, lineno);
    }

    if stripped.starts_with("if ") && stripped.ends_with(':') {
        let expr = stripped[3..stripped.len() - 1].trim_end();
        state
            .body
            .push(format!("if ({}) {{", state.normalize(expr)));
        state.expect_indent = true;
        return Ok(());
    }

    if stripped.starts_with("while ") && stripped.ends_with(':') {
        let expr = stripped[6..stripped.len() - 1].trim_end();
        state
            .body
            .push(format!("while ({}) {{", state.normalize(expr)));
        state.expect_indent = true;
        return Ok(());
    }

    if stripped == "else:" {
        state.body.push("else {".to_string());
        state.expect_indent = true;
        return Ok(());
    }

    if stripped.starts_with("print(") && stripped.ends_with(')') {
        return emit_print(state, stripped);
    }

    if let Some((name, expr)) = split_assignment(stripped) {
        return emit_assignment(state, name, expr, lineno);
    }

    state.body.push(format!("{};", state.normalize(stripped)));
    Ok(())
}

fn emit_from_import(state: &mut TranspileState<'_>, rest: &str, lineno: usize) -> Result<(), TranspileError> {
    let Some(import_pos) = rest.find(" import ") else {
        return Err(TranspileError::syntactic(lineno, "Invalid import syntax."));
    };
    let module_name = rest[..import_pos].trim();
    state.add_import(module_name, lineno)?;

    let names_part = &rest[import_pos + " import ".len()..];
    let mut has_name = false;
    for raw_name in names_part.split(',') {
        let name = raw_name.trim();
        if name.is_empty() {
            continue;
        }
        has_name = true;
        if !is_valid_identifier(name) {
            return Err(TranspileError::syntactic(
                lineno,
                format!("Invalid import name '{}'.", name),
            ));
        }
        state
            .imported_names
            .insert(name.to_string(), module_name.to_string());
    }

    if !has_name {
        return Err(TranspileError::syntactic(lineno, "No imports listed."));
    }
    Ok(())
}

fn emit_for(state: &mut TranspileState<'_>, stripped: &str, lineno: usize) -> Result<(), TranspileError> {
    let header = &stripped[4..stripped.len() - 1];
    let Some(in_pos) = header.find(" in ") else {
        return Err(TranspileError::syntactic(lineno, "Invalid for-loop syntax."));
    };
    let name = header[..in_pos].trim();
    let iterable = header[in_pos + " in ".len()..].trim();

    if !is_valid_identifier(name) {
        return Err(TranspileError::syntactic(lineno, "Invalid variable name."));
    }

    let items = split_top_level_args(iterable);
    if items.is_empty() {
        return Err(TranspileError::syntactic(lineno, "Empty for-loop iterable."));
    }

    let joined = items
        .iter()
        .map(|item| state.normalize(item))
        .collect::<Vec<_>>()
        .join(", ");

    state.body.push(format!(
        "for (auto {} : std::vector<double>{{{}}}) {{",
        name, joined
    ));
    state.expect_indent = true;
    Ok(())
}

fn emit_print(state: &mut TranspileState<'_>, stripped: &str) -> Result<(), TranspileError> {
    let inner = &stripped[6..stripped.len() - 1];
    if inner.trim_start().is_empty() {
        state.body.push("std::cout << std::endl;".to_string());
        return Ok(());
    }

    let args = split_top_level_args(inner);
    if args.len() == 1 {
        state
            .body
            .push(format!("std::cout << {} << std::endl;", state.normalize(&args[0])));
    } else {
        let mut line = String::from("std::cout");
        for (idx, arg) in args.iter().enumerate() {
            if idx > 0 {
                line.push_str(" << \" \"");
            }
            line.push_str(" << ");
            line.push_str(&state.normalize(arg));
        }
        line.push_str(" << std::endl;");
        state.body.push(line);
    }
    Ok(())
}

fn emit_assignment(
    state: &mut TranspileState<'_>,
    name: &str,
    expr: &str,
    lineno: usize,
) -> Result<(), TranspileError> {
    let name = name.trim();
    let expr = expr.trim();
    if !is_valid_identifier(name) {
        return Err(TranspileError::syntactic(lineno, "Invalid variable name."));
    }

    let normalized = state.normalize(expr);
    if state.defined.insert(name.to_string()) {
        state.body.push(format!("auto {} = {};", name, normalized));
    } else {
        state.body.push(format!("{} = {};", name, normalized));
    }
    Ok(())
}

/// Find a top-level `=` that isn't part of `==`, `!=`, `<=`, or `>=`, and
/// split the line there. Returns `None` if no such `=` exists.
fn split_assignment(line: &str) -> Option<(&str, &str)> {
    let bytes = line.as_bytes();
    for (i, &byte) in bytes.iter().enumerate() {
        if byte != b'=' {
            continue;
        }
        let prev = if i > 0 { Some(bytes[i - 1]) } else { None };
        let next = bytes.get(i + 1).copied();
        if matches!(prev, Some(b'=') | Some(b'!') | Some(b'<') | Some(b'>')) || next == Some(b'=') {
            continue;
        }
        return Some((&line[..i], &line[i + 1..]));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(src: &str) -> Vec<String> {
        src.lines().map(|l| l.to_string()).collect()
    }

    #[test]
    fn assignment_and_division_promotes_integers() {
        let registry = ModuleRegistry::standard();
        let result = transpile(
            &lines("x = 10\ny = 5\nprint(x / y)"),
            &registry,
        )
        .unwrap();
        assert_eq!(
            result.body,
            vec![
                "auto x = 10;",
                "auto y = 5;",
                "std::cout << x / y << std::endl;",
            ]
        );
    }

    #[test]
    fn if_else_blocks() {
        let registry = ModuleRegistry::standard();
        let result = transpile(
            &lines("n = 3\nif n > 0:\n    print(n)\nelse:\n    print(0)"),
            &registry,
        )
        .unwrap();
        assert_eq!(
            result.body,
            vec![
                "auto n = 3;",
                "if (n > 0) {",
                "std::cout << n << std::endl;",
                "}",
                "else {",
                "std::cout << 0 << std::endl;",
                "}",
            ]
        );
    }

    #[test]
    fn while_loop_reassigns_after_first_declaration() {
        let registry = ModuleRegistry::standard();
        let result = transpile(
            &lines("i = 10\nwhile i > 0:\n    print(i)\n    i = i - 1"),
            &registry,
        )
        .unwrap();
        assert_eq!(
            result.body,
            vec![
                "auto i = 10;",
                "while (i > 0) {",
                "std::cout << i << std::endl;",
                "i = i - 1;",
                "}",
            ]
        );
    }

    #[test]
    fn logic_functions_rewrite_through_assignment() {
        let registry = ModuleRegistry::standard();
        let result = transpile(
            &lines("flag = and(True, not(False))\nprint(flag)"),
            &registry,
        )
        .unwrap();
        assert_eq!(
            result.body,
            vec![
                "auto flag = ((true) && ((!(false))));",
                "std::cout << flag << std::endl;",
            ]
        );
    }

    #[test]
    fn module_import_and_access() {
        let registry = ModuleRegistry::standard();
        let result = transpile(
            &lines("import BIFMath\nprint(BIFMath.sqrt(9))"),
            &registry,
        )
        .unwrap();
        assert_eq!(result.imports, vec!["BIFMath"]);
        assert_eq!(
            result.body,
            vec!["std::cout << BIFMath::sqrt(9.0) << std::endl;"]
        );
    }

    #[test]
    fn from_import_qualifies_bare_names() {
        let registry = ModuleRegistry::standard();
        let result = transpile(
            &lines("from BIFMath import sqrt\nprint(sqrt(9))"),
            &registry,
        )
        .unwrap();
        assert_eq!(
            result.body,
            vec!["std::cout << BIFMath::sqrt(9) << std::endl;"]
        );
    }

    #[test]
    fn unknown_module_is_a_fatal_error() {
        let registry = ModuleRegistry::standard();
        let err = transpile(&lines("import Nope"), &registry).unwrap_err();
        assert_eq!(err.to_string(), "Line 1: Unknown module 'Nope'.");
    }

    #[test]
    fn tab_is_rejected() {
        let registry = ModuleRegistry::standard();
        let err = transpile(&lines("x = 1\n\ty = 2"), &registry).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Line 2: Tabs are not allowed. Use 4 spaces."
        );
    }

    #[test]
    fn non_multiple_of_four_indent_is_rejected() {
        let registry = ModuleRegistry::standard();
        let err = transpile(&lines("if True:\n  print(1)"), &registry).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Line 2: Indentation must be multiples of 4 spaces."
        );
    }

    #[test]
    fn unexpected_indentation_is_rejected() {
        let registry = ModuleRegistry::standard();
        let err = transpile(&lines("x = 1\n    y = 2"), &registry).unwrap_err();
        assert_eq!(err.to_string(), "Line 2: Unexpected indentation.");
    }

    #[test]
    fn expected_indented_block_is_rejected() {
        let registry = ModuleRegistry::standard();
        let err = transpile(&lines("if True:\nprint(1)"), &registry).unwrap_err();
        assert_eq!(err.to_string(), "Line 2: Expected indented block.");
    }

    #[test]
    fn for_loop_over_literal_list() {
        let registry = ModuleRegistry::standard();
        let result = transpile(&lines("for x in 1, 2, 3:\n    print(x)"), &registry).unwrap();
        assert_eq!(
            result.body[0],
            "for (auto x : std::vector<double>{1.0, 2.0, 3.0}) {"
        );
    }

    #[test]
    fn empty_for_iterable_is_rejected() {
        let registry = ModuleRegistry::standard();
        let err = transpile(&lines("for x in :\n    print(x)"), &registry).unwrap_err();
        assert_eq!(err.to_string(), "Line 1: Empty for-loop iterable.");
    }

    #[test]
    fn print_with_no_args_emits_bare_endl() {
        let registry = ModuleRegistry::standard();
        let result = transpile(&lines("print()"), &registry).unwrap();
        assert_eq!(result.body, vec!["std::cout << std::endl;"]);
    }

    #[test]
    fn print_with_multiple_args_joins_with_space() {
        let registry = ModuleRegistry::standard();
        let result = transpile(&lines("print(1, 2)"), &registry).unwrap();
        assert_eq!(
            result.body,
            vec!["std::cout << 1 << \" \" << 2 << std::endl;"]
        );
    }

    #[test]
    fn comparison_operators_are_not_misread_as_assignment() {
        let registry = ModuleRegistry::standard();
        let result = transpile(&lines("if x == 1:\n    print(x)"), &registry).unwrap();
        assert_eq!(result.body[0], "if (x == 1) {");
    }

    #[test]
    fn bare_expression_statement_fallback() {
        let registry = ModuleRegistry::standard();
        let result = transpile(&lines("foo()"), &registry).unwrap();
        assert_eq!(result.body, vec!["foo();"]);
    }

    #[test]
    fn indent_stack_drains_at_eof() {
        let registry = ModuleRegistry::standard();
        let result = transpile(&lines("if True:\n    if True:\n        print(1)"), &registry).unwrap();
        assert_eq!(result.body.iter().filter(|l| l.as_str() == "}").count(), 2);
    }
}
