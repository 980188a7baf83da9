use crate::common::analyze_using_probe;

mod common;

#[test]
fn missing_semicolon() {
    let probe = analyze_using_probe("int main() { return 0 }");
    assert!(probe.program.is_none());
    assert_eq!(
        probe.printed(),
        vec!["ERROR: \";\" expected here 23..23, line 1."]
    );
}

#[test]
fn first_syntax_error_wins() {
    let probe = analyze_using_probe("int main() { x = ; y = ; }");
    assert_eq!(probe.errors().len(), 1);
    assert_eq!(probe.top_error_message(), Some("Primary expression expected"));
}

#[test]
fn relational_operators_do_not_chain() {
    let probe = analyze_using_probe("int main() { bool b; b = 1 < 2 < 3; return 0; }");
    assert!(probe.program.is_none());
    assert_eq!(probe.top_error_message(), Some("\";\" expected here"));
}

#[test]
fn trailing_tokens_after_program() {
    let probe = analyze_using_probe("int main() { return 0; } }");
    assert_eq!(
        probe.top_error_message(),
        Some("\"}\" not expected after end of program")
    );
}

#[test]
fn syntax_errors_stop_before_semantic_analysis() {
    let probe = analyze_using_probe("int main() { undeclared = 1 return 0; }");
    assert!(probe.symbols.is_none());
    assert!(probe.codes().is_empty());
}

#[test]
fn multi_line_positions() {
    let src = "int main() {\n  int a;\n  a = 1\n  return a;\n}\n";
    let probe = analyze_using_probe(src);
    assert_eq!(
        probe.printed(),
        vec!["ERROR: \";\" expected here 3..8, line 4."]
    );
}
