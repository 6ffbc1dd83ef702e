//! Black-box scenario: sending an unknown selector raises `DoesNotUnderstand`
//! naming both the selector and the receiver's prototype chain.

use mylang::diagnostics::RuntimeErrorKind;
use mylang::MyLangError;

#[test]
fn unknown_selector_on_a_fresh_clone_does_not_understand() {
    let err = mylang::run_and_capture("x = Object clone\nx foo\n").unwrap_err();
    let MyLangError::Runtime(err) = err else {
        panic!("expected a runtime error, got {err:?}");
    };
    match err.kind {
        RuntimeErrorKind::DoesNotUnderstand { selector, proto_chain } => {
            assert_eq!(selector, "foo");
            assert_eq!(proto_chain, vec!["Object".to_string()]);
        }
        other => panic!("expected DoesNotUnderstand, got {other:?}"),
    }
}

#[test]
fn division_by_zero_is_a_runtime_error() {
    let err = mylang::run_and_capture("1 / 0\n").unwrap_err();
    let MyLangError::Runtime(err) = err else {
        panic!("expected a runtime error, got {err:?}");
    };
    assert!(matches!(err.kind, RuntimeErrorKind::DivisionByZero));
}

#[test]
fn unterminated_string_is_a_lex_error() {
    let err = mylang::run_and_capture("x = \"unterminated\n").unwrap_err();
    assert!(matches!(err, MyLangError::Lex(_)));
}
