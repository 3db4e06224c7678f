use proptest::prelude::*;
use shell_line::{Invocation, ParseError, parse_line, parse_line_with};
use std::collections::HashMap;

fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn parse(line: &str) -> Result<Invocation, ParseError> {
    parse_line_with(line, &vars(&[("PATH", "/bin")]))
}

#[test]
fn whitespace_only_lines_are_empty_commands() {
    for line in ["", " ", "\t \n ", "\u{2003}"] {
        assert_eq!(parse(line), Err(ParseError::EmptyCommand), "{line:?}");
    }
}

#[test]
fn single_quotes_are_verbatim() {
    let inv = parse("echo 'a|b;c'").unwrap();
    assert_eq!(inv.command, "echo");
    assert_eq!(inv.arguments, ["a|b;c"]);
}

#[test]
fn escaped_metacharacters() {
    assert_eq!(parse("echo \\|\\&").unwrap().arguments, ["|&"]);
}

#[test]
fn assignment_command_boundary() {
    let inv = parse("X=1 Y=2 echo Z=3").unwrap();
    assert_eq!(inv.environment_assignments, ["X=1", "Y=2"]);
    assert_eq!(inv.command, "echo");
    assert_eq!(inv.arguments, ["Z=3"]);
}

#[test]
fn non_identifier_assignment_is_the_command() {
    let inv = parse("1=1").unwrap();
    assert_eq!(inv.command, "1=1");
    assert!(inv.environment_assignments.is_empty());
    assert!(inv.arguments.is_empty());
}

#[test]
fn variables_expand_and_unset_ones_are_empty() {
    let inv = parse("echo $PATH $MISSING").unwrap();
    assert_eq!(inv.arguments, ["/bin", ""]);
}

#[test]
fn unsupported_expansions_have_distinct_errors() {
    assert_eq!(
        parse("echo $(cat f)"),
        Err(ParseError::CommandSubstitutionOrArithmeticExpansionNotSupported)
    );
    assert_eq!(parse("echo ${x}"), Err(ParseError::ParameterExpansionNotSupported));
    assert_eq!(parse("echo $@"), Err(ParseError::SpecialParametersNotSupported('@')));
    assert_eq!(parse("echo $3"), Err(ParseError::PositionalParametersNotSupported('3')));
}

#[test]
fn unterminated_quotes() {
    assert_eq!(parse("echo 'abc"), Err(ParseError::UnterminatedString));
    assert_eq!(parse("echo \"abc"), Err(ParseError::UnterminatedString));
}

#[test]
fn line_continuation_is_invisible() {
    let inv = parse("ec\\\nho foo").unwrap();
    assert_eq!(inv.command, "echo");
    assert_eq!(inv.arguments, ["foo"]);
}

#[test]
fn redirections_and_control_operators_are_rejected() {
    for (line, ch) in [
        ("cat < in", '<'),
        ("echo > out", '>'),
        ("a && b", '&'),
        ("a || b", '|'),
        ("(sub)", '('),
        ("ls *", '*'),
        ("echo # comment", '#'),
        ("cd ~", '~'),
    ] {
        assert_eq!(parse(line), Err(ParseError::UnsupportedCharacter(ch)), "{line}");
    }
}

#[test]
fn default_lookup_reads_process_environment() {
    let path = std::env::var("PATH").unwrap_or_default();
    let inv = parse_line("echo \"$PATH\"").unwrap();
    assert_eq!(inv.arguments, [path]);
}

fn invocations() -> impl Strategy<Value = Invocation> {
    let field = r#"[a-zA-Z0-9 _./'"|&;<>()$*?#~=%é\\\t\n-]{0,12}"#;
    (
        prop::collection::vec(("[A-Za-z_][A-Za-z0-9_]{0,6}", field), 0..3),
        r#"[a-zA-Z0-9 _./'"|&;<>()$*?#~=%é\\\t\n-]{1,12}"#,
        prop::collection::vec(field, 0..4),
    )
        .prop_map(|(env, command, arguments)| Invocation {
            command,
            arguments,
            environment_assignments: env
                .into_iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect(),
        })
}

proptest! {
    #[test]
    fn rendered_invocations_parse_back_unchanged(inv in invocations()) {
        let line = inv.to_line();
        let reparsed = parse_line_with(&line, &vars(&[("PATH", "/bin")]));
        prop_assert_eq!(reparsed, Ok(inv), "line: {}", line);
    }

    #[test]
    fn parsing_arbitrary_input_terminates(line in any::<String>()) {
        let _ = parse_line_with(&line, &vars(&[]));
    }
}
