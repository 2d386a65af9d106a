//! Tests for statement parsing and the canonical printer

use vcl_ast::{
    CaseTest, DeclarationKind, ExprKind, IfKeyword, Position, Statement, StatementKind, ToVcl,
};
use vcl_parser::{parse, ParseError};

fn statements_of(source: &str) -> Vec<Statement> {
    let program = parse(source).expect("parse failed");
    program
        .subroutine("vcl_recv")
        .expect("missing vcl_recv")
        .body
        .statements
        .clone()
}

#[test]
fn else_if_keywords_are_kept_in_order() {
    let source = r#"sub vcl_recv {
  if (req.http.A) {
    esi;
  } else if (req.http.B) {
    esi;
  } elseif (req.http.C) {
    esi;
  } elsif (req.http.D) {
    esi;
  } else {
    restart;
  }
}"#;
    let statements = statements_of(source);
    let StatementKind::If(chain) = &statements[0].kind else {
        panic!("expected if statement");
    };

    let keywords: Vec<_> = chain.another.iter().map(|c| c.keyword).collect();
    assert_eq!(
        keywords,
        vec![IfKeyword::ElseIf, IfKeyword::Elseif, IfKeyword::Elsif]
    );
    let positions: Vec<_> = chain
        .another
        .iter()
        .map(|c| c.meta.position.clone().unwrap())
        .collect();
    assert_eq!(
        positions,
        vec![Position::new(4, 5), Position::new(6, 5), Position::new(8, 5)]
    );
    let alternative = chain.alternative.as_ref().expect("missing else");
    assert_eq!(alternative.consequence.statements[0].kind, StatementKind::Restart);
}

#[test]
fn switch_keeps_default_at_its_textual_index() {
    let source = r#"sub vcl_recv {
  switch (req.http.K) {
  case "a":
    break;
  default:
    break;
  case ~"^b":
    fallthrough;
  }
}"#;
    let statements = statements_of(source);
    let StatementKind::Switch(switch) = &statements[0].kind else {
        panic!("expected switch statement");
    };
    assert_eq!(switch.cases.len(), 3);
    assert_eq!(switch.default_index(), Some(1));
    assert_eq!(switch.cases[0].test, Some(CaseTest::Exact("a".into())));
    assert_eq!(switch.cases[2].test, Some(CaseTest::Regex("^b".into())));
    assert_eq!(switch.cases[2].statements[0].kind, StatementKind::Fallthrough);
}

#[test]
fn statement_variants_parse() {
    let source = r#"sub vcl_recv {
  declare local var.n INTEGER;
  set var.n += 1;
  add req.http.Via = "edge";
  unset req.http.Cookie;
  remove req.http.Debug;
  log "hit";
  synthetic "body";
  synthetic.base64 "Ym9keQ==";
  std.collect(req.http.Via);
  call other;
  goto end;
  end:
  error 403 "Forbidden";
  return(lookup);
}"#;
    let labels: Vec<_> = statements_of(source).iter().map(|s| s.label()).collect();
    assert_eq!(
        labels,
        vec![
            "declare statement",
            "set statement",
            "add statement",
            "unset statement",
            "remove statement",
            "log statement",
            "synthetic statement",
            "synthetic.base64 statement",
            "function call statement",
            "call statement",
            "goto statement",
            "goto destination",
            "error statement",
            "return statement",
        ]
    );
}

#[test]
fn inline_if_is_an_expression() {
    let statements = statements_of("sub vcl_recv {\n  set req.http.Foo = if(req.http.Bar, \"a\", \"b\");\n}");
    let StatementKind::Set { value, .. } = &statements[0].kind else {
        panic!("expected set statement");
    };
    assert!(matches!(value.kind, ExprKind::If { .. }));
    assert_eq!(value.meta.position, Some(Position::new(2, 22)));
}

#[test]
fn keyword_states_in_return() {
    for state in ["restart", "error", "pass"] {
        let source = format!("sub vcl_recv {{\n  return({});\n}}", state);
        let statements = statements_of(&source);
        let StatementKind::Return(Some(value)) = &statements[0].kind else {
            panic!("expected return with value");
        };
        let ExprKind::Grouped(inner) = &value.kind else {
            panic!("expected grouped state");
        };
        assert_eq!(inner.kind, ExprKind::Ident(state.to_string()));
    }
}

#[test]
fn missing_semicolon_is_reported() {
    let err = parse("sub vcl_recv {\n  esi\n}").unwrap_err();
    assert!(matches!(err, ParseError::UnexpectedToken { .. }));
}

#[test]
fn printed_program_parses_to_the_same_tree() {
    let source = r#"table redirects STRING {
  "/old": "/new",
}

sub vcl_recv {
  if (req.http.A == "1" && !req.http.B) {
    set req.http.X = if(req.http.C, "c", "d");
  } else if (req.url ~ "^/api") {
    switch (req.http.K) {
    case "a":
      log "a";
      break;
    default:
      break;
    }
  } else {
    error 404 "Not Found";
  }
  return(pass);
}
"#;
    let program = parse(source).expect("parse failed");
    let printed = program.to_vcl(0);
    let reparsed = parse(&printed).expect("printed program failed to parse");

    let kinds = |p: &vcl_ast::Program| -> Vec<String> {
        p.declarations
            .iter()
            .map(|d| match &d.kind {
                DeclarationKind::Subroutine(sub) => sub.name.clone(),
                DeclarationKind::Table(table) => table.name.clone(),
                DeclarationKind::Backend(backend) => backend.name.clone(),
                DeclarationKind::Import(name) => name.clone(),
            })
            .collect()
    };
    assert_eq!(kinds(&program), kinds(&reparsed));
    assert_eq!(printed, reparsed.to_vcl(0));
}
