//! The expression rewriter: a fixed pipeline of pure, string-literal-safe
//! `String -> String` passes.
//!
//! Order matters and is enforced by [`normalize_expression`] alone — the
//! individual passes are exposed for unit testing but callers outside this
//! module should go through `normalize_expression` so the ordering
//! invariant (logic-functions, then keywords, then input, then module
//! access, then imported names, then — only if division is present —
//! integer-literal promotion) can't drift.

use crate::scanner::{self, StringScanner};
use std::collections::HashMap;

/// Rewrite `and(...)`, `or(...)`, `not(...)` call forms into their C++
/// boolean-operator equivalents. Any arity other than the one each
/// operator supports (`not` takes exactly one argument; `and`/`or` take
/// two or more) is left verbatim — it isn't this pass's job to validate
/// arity, just to rewrite what it recognizes.
pub fn rewrite_logic_functions(expr: &str) -> String {
    let bytes = expr.as_bytes();
    let mut out = String::with_capacity(expr.len());
    let mut scanner = StringScanner::new();
    let mut i = 0;

    while i < bytes.len() {
        let byte = bytes[i];
        if scanner.advance(byte) {
            out.push(byte as char);
            i += 1;
            continue;
        }

        let mut matched = false;
        for name in ["and", "or", "not"] {
            let token_len = name.len() + 1; // include the '('
            let boundary = scanner::is_identifier_boundary(prev_char(expr, i));
            if boundary
                && bytes[i..].len() >= token_len
                && &expr[i..i + name.len()] == name
                && bytes[i + name.len()] == b'('
            {
                if let Some(end_index) = find_matching_paren(expr, i + name.len()) {
                    let content = &expr[i + name.len() + 1..end_index];
                    let args = scanner::split_top_level_args(content);
                    match (name, args.len()) {
                        ("not", 1) => {
                            out.push_str("(!(");
                            out.push_str(&args[0]);
                            out.push_str("))");
                        }
                        ("and", n) if n >= 2 => {
                            out.push('(');
                            for (idx, arg) in args.iter().enumerate() {
                                if idx > 0 {
                                    out.push_str(" && ");
                                }
                                out.push('(');
                                out.push_str(arg);
                                out.push(')');
                            }
                            out.push(')');
                        }
                        ("or", n) if n >= 2 => {
                            out.push('(');
                            for (idx, arg) in args.iter().enumerate() {
                                if idx > 0 {
                                    out.push_str(" || ");
                                }
                                out.push('(');
                                out.push_str(arg);
                                out.push(')');
                            }
                            out.push(')');
                        }
                        _ => {
                            out.push_str(&expr[i..=end_index]);
                        }
                    }
                    i = end_index + 1;
                    matched = true;
                    break;
                }
            }
        }

        if matched {
            continue;
        }

        // Push one UTF-8 char's worth of bytes; identifiers/operators we
        // match above are ASCII, so non-ASCII bytes only ever appear
        // inside content we're copying through verbatim.
        let ch_len = utf8_len(byte);
        out.push_str(&expr[i..i + ch_len]);
        i += ch_len;
    }

    out
}

/// Byte index just past the char starting at byte `index` (handles
/// multi-byte UTF-8 without requiring a `char_indices` re-walk).
fn utf8_len(first_byte: u8) -> usize {
    if first_byte & 0x80 == 0 {
        1
    } else if first_byte & 0xE0 == 0xC0 {
        2
    } else if first_byte & 0xF0 == 0xE0 {
        3
    } else {
        4
    }
}

fn prev_char(expr: &str, byte_index: usize) -> Option<char> {
    expr[..byte_index].chars().next_back()
}

/// Find the index of the `)` that closes the `(` at `open_paren_index`,
/// honouring nested parens and string literals. Returns `None` if
/// unterminated.
fn find_matching_paren(expr: &str, open_paren_index: usize) -> Option<usize> {
    let bytes = expr.as_bytes();
    let mut depth = 0i32;
    let mut scanner = StringScanner::new();
    let mut i = open_paren_index;

    while i < bytes.len() {
        let byte = bytes[i];
        if scanner.advance(byte) {
            i += 1;
            continue;
        }
        match byte {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Whole-word keyword/literal substitution outside string literals:
/// `and -> &&`, `or -> ||`, `not -> !`, `True -> true`, `False -> false`,
/// `None -> nullptr`.
pub fn replace_keywords(expr: &str) -> String {
    let replacements: HashMap<&str, &str> = HashMap::from([
        ("and", "&&"),
        ("or", "||"),
        ("not", "!"),
        ("True", "true"),
        ("False", "false"),
        ("None", "nullptr"),
    ]);

    let mut out = String::with_capacity(expr.len());
    let mut word = String::new();
    let mut scanner = StringScanner::new();

    let mut flush_word = |word: &mut String, out: &mut String| {
        if !word.is_empty() {
            out.push_str(replacements.get(word.as_str()).copied().unwrap_or(word));
            word.clear();
        }
    };

    for ch in expr.chars() {
        if ch.is_ascii() && scanner.advance(ch as u8) {
            flush_word(&mut word, &mut out);
            out.push(ch);
            continue;
        }
        if ch.is_alphanumeric() || ch == '_' {
            word.push(ch);
        } else {
            flush_word(&mut word, &mut out);
            out.push(ch);
        }
    }
    flush_word(&mut word, &mut out);
    out
}

/// Replace literal `input(` with `bif_input(` outside string literals.
pub fn replace_input_calls(expr: &str) -> String {
    const FROM: &str = "input(";
    const TO: &str = "bif_input(";

    let mut out = String::with_capacity(expr.len());
    let mut scanner = StringScanner::new();
    let bytes = expr.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        let byte = bytes[i];
        if scanner.advance(byte) {
            out.push(byte as char);
            i += 1;
            continue;
        }

        if expr[i..].starts_with(FROM) {
            out.push_str(TO);
            i += FROM.len();
            continue;
        }

        let ch_len = utf8_len(byte);
        out.push_str(&expr[i..i + ch_len]);
        i += ch_len;
    }
    out
}

/// Replace every outside-string occurrence of `Module.` with `Module::`,
/// for each module identifier in `modules` (the current run's ordered
/// imports list).
pub fn replace_module_access(expr: &str, modules: &[String]) -> String {
    if modules.is_empty() {
        return expr.to_string();
    }

    let mut out = String::with_capacity(expr.len());
    let mut scanner = StringScanner::new();
    let bytes = expr.as_bytes();
    let mut i = 0;

    'outer: while i < bytes.len() {
        if !scanner.in_string() {
            for module_name in modules {
                let token_len = module_name.len() + 1;
                if bytes[i..].len() >= token_len
                    && expr[i..].starts_with(module_name.as_str())
                    && bytes[i + module_name.len()] == b'.'
                {
                    out.push_str(module_name);
                    out.push_str("::");
                    i += token_len;
                    continue 'outer;
                }
            }
        }
        let ch_len = utf8_len(bytes[i]);
        scanner.advance(bytes[i]);
        out.push_str(&expr[i..i + ch_len]);
        i += ch_len;
    }
    out
}

/// Replace bare identifiers bound via `from M import name` with
/// `M::name`.
pub fn replace_imported_names(expr: &str, imported: &HashMap<String, String>) -> String {
    if imported.is_empty() {
        return expr.to_string();
    }

    let mut out = String::with_capacity(expr.len());
    let mut word = String::new();
    let mut scanner = StringScanner::new();

    let mut flush_word = |word: &mut String, out: &mut String| {
        if word.is_empty() {
            return;
        }
        if let Some(module) = imported.get(word.as_str()) {
            out.push_str(module);
            out.push_str("::");
            out.push_str(word);
        } else {
            out.push_str(word);
        }
        word.clear();
    };

    for ch in expr.chars() {
        if ch.is_ascii() && scanner.advance(ch as u8) {
            flush_word(&mut word, &mut out);
            out.push(ch);
            continue;
        }
        if ch.is_alphanumeric() || ch == '_' {
            word.push(ch);
        } else {
            flush_word(&mut word, &mut out);
            out.push(ch);
        }
    }
    flush_word(&mut word, &mut out);
    out
}

/// Append `.0` to any bare integer literal (one with no `.` and no
/// exponent) so that division involving it is floating-point. Only called
/// when [`scanner::expr_has_division`] is true for the expression.
pub fn promote_int_literals_for_division(expr: &str) -> String {
    let bytes = expr.as_bytes();
    let mut out = String::with_capacity(expr.len());
    let mut scanner = StringScanner::new();
    let mut i = 0;

    while i < bytes.len() {
        let byte = bytes[i];
        if scanner.advance(byte) {
            out.push(byte as char);
            i += 1;
            continue;
        }

        if byte.is_ascii_digit() && scanner::is_identifier_boundary(prev_char(expr, i)) {
            let start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }

            let mut is_float = false;
            if i < bytes.len() && bytes[i] == b'.' {
                is_float = true;
                i += 1;
                while i < bytes.len() && bytes[i].is_ascii_digit() {
                    i += 1;
                }
            }

            if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
                is_float = true;
                i += 1;
                if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
                    i += 1;
                }
                while i < bytes.len() && bytes[i].is_ascii_digit() {
                    i += 1;
                }
            }

            out.push_str(&expr[start..i]);
            if !is_float {
                out.push_str(".0");
            }
            continue;
        }

        let ch_len = utf8_len(byte);
        out.push_str(&expr[i..i + ch_len]);
        i += ch_len;
    }

    out
}

/// Run the full ordered pipeline: logic-functions, keywords, input-call,
/// module-access, imported-name qualification, and (gated on division)
/// integer-literal promotion.
pub fn normalize_expression(
    expr: &str,
    imports: &[String],
    imported_names: &HashMap<String, String>,
) -> String {
    let mut out = rewrite_logic_functions(expr);
    out = replace_keywords(&out);
    out = replace_input_calls(&out);
    out = replace_module_access(&out, imports);
    out = replace_imported_names(&out, imported_names);
    if scanner::expr_has_division(&out) {
        out = promote_int_literals_for_division(&out);
    }
    out
}
