use std::collections::HashSet;

use minic::ErrorReporter;

use crate::common::{compile_to_text, str_to_code_ref};

mod common;

const PROGRAM: &str = r"
    int count = 3;
    float ratio;
    bool flags[2] = {true, false};

    int square(int n) {
        return n * n;
    }

    void report(float value, bool ok) {
        if (ok) putFloat(value); else putLn();
    }

    int main() {
        int i;
        int sum;
        for (i = 0; i < count; i = i + 1) {
            sum = sum + square(i);
        }
        ratio = sum / 2;
        report(ratio, flags[0] || sum > 10);
        while (sum > 0) sum = sum - 1;
        return 0;
    }
";

/// Splits the text into `(header, lines)` per method
fn methods(text: &str) -> Vec<(String, Vec<String>)> {
    let mut methods = Vec::new();
    let mut current: Option<(String, Vec<String>)> = None;
    for line in text.lines().map(str::trim) {
        if line.starts_with(".method") {
            current = Some((line.to_string(), Vec::new()));
        } else if line == ".end method" {
            methods.extend(current.take());
        } else if let Some((_, body)) = current.as_mut() {
            body.push(line.to_string());
        }
    }
    methods
}

#[test]
fn class_skeleton() {
    let text = compile_to_text(PROGRAM);
    let lines = text.lines().collect::<Vec<_>>();
    assert_eq!(
        lines[..7],
        [
            "; Jasmin assembly code",
            "; MiniC v. 1.0",
            ".class public Test",
            ".super java/lang/Object",
            ".field static count I",
            ".field static ratio F",
            ".field static flags [Z",
        ]
    );
    let headers = methods(&text)
        .into_iter()
        .map(|(header, _)| header)
        .collect::<Vec<_>>();
    assert_eq!(
        headers,
        vec![
            ".method static <clinit>()V",
            ".method public <init>()V",
            ".method public square(I)I",
            ".method public report(FZ)V",
            ".method public static main([Ljava/lang/String;)V",
        ]
    );
}

#[test]
fn every_function_declares_its_limits() {
    let text = compile_to_text(PROGRAM);
    for (header, body) in methods(&text).into_iter().skip(2) {
        assert!(
            body.iter().any(|line| line == ".limit stack 150"),
            "{header} has no stack limit"
        );
        assert!(
            body.iter().any(|line| line.starts_with(".limit locals ")),
            "{header} has no locals limit"
        );
    }
    let (_, main) = methods(&text).pop().expect("main");
    assert!(main.contains(&".limit locals 4".to_string()));
}

#[test]
fn branch_targets_are_defined_once_per_method() {
    let text = compile_to_text(PROGRAM);
    for (header, body) in methods(&text) {
        let mut defined = HashSet::new();
        for label in body.iter().filter_map(|line| line.strip_suffix(':')) {
            assert!(defined.insert(label.to_string()), "{header} redefines {label}");
        }
        for line in body.iter() {
            let Some((op, target)) = line.split_once(' ') else {
                continue;
            };
            if op.starts_with("if") || op == "goto" {
                assert!(defined.contains(target), "{header} jumps to undefined {target}");
            }
        }
    }
}

#[test]
fn globals_go_through_static_fields() {
    let text = compile_to_text(PROGRAM);
    assert!(text.contains("getstatic Test.count I"));
    assert!(text.contains("putstatic Test.ratio F"));
    assert!(text.contains("getstatic Test.flags [Z"));
    assert!(text.contains("newarray boolean"));
    assert!(text.contains("baload"));
}

#[test]
fn user_functions_are_instance_methods() {
    let text = compile_to_text(PROGRAM);
    assert!(text.contains("invokevirtual Test/square(I)I"));
    assert!(text.contains("invokevirtual Test/report(FZ)V"));
    assert!(text.contains("invokestatic minic/lang/System/putFloat(F)V"));
    let (_, square) = methods(&text)
        .into_iter()
        .find(|(header, _)| header.contains("square"))
        .expect("square");
    assert_eq!(
        square
            .iter()
            .filter(|line| !line.starts_with('.') && !line.starts_with(';'))
            .cloned()
            .collect::<Vec<_>>(),
        vec![
            "Label0:", "iload_1", "iload_1", "imul", "ireturn", "Label1:", "iconst_0", "ireturn",
        ]
    );
}

#[test]
fn no_code_for_erroneous_programs() {
    let mut reporter = ErrorReporter::new();
    let result = minic::compile(
        str_to_code_ref("int main() { return x; }"),
        "Broken",
        &mut reporter,
    );
    assert!(matches!(result, Ok(None)));
    assert_eq!(reporter.num_errors(), 1);

    let mut reporter = ErrorReporter::new();
    let result = minic::compile(
        str_to_code_ref("int main() { int x; x = string; return 0; }"),
        "Broken",
        &mut reporter,
    );
    assert!(matches!(result, Ok(None)));
    assert_eq!(reporter.num_errors(), 1);

    let mut reporter = ErrorReporter::new();
    let result = minic::compile(str_to_code_ref("int main() {"), "Broken", &mut reporter);
    assert!(matches!(result, Ok(None)));
    assert!(reporter.has_errors());
}
