//! Coverage instrumentation
//!
//! Rewrites a parsed program so that running it through the interpreter
//! records subroutine, statement and branch coverage. Every marker is a plain
//! call statement such as `coverage.branch("branch_12_3_2");` spliced in
//! before the node it covers, and the identifier is registered in the
//! [`CoverageRegistry`] while the tree is rewritten.
//!
//! Identifiers are `<prefix>_<line>_<column>[_<suffix>]` where the position is
//! the one of the covered node, so instrumenting the same source twice yields
//! the same identifiers.
//!
//! Conditional chains are reshaped into nested if/else pairs:
//!
//! ```text
//! if (a) { A } else if (b) { B } else { C }
//! ```
//!
//! becomes
//!
//! ```text
//! coverage.statement("stmt_1_1");
//! if (a) {
//!   coverage.branch("branch_1_1_1");
//!   A
//! } else {
//!   coverage.branch("branch_1_1_2");
//!   if (b) {
//!     coverage.branch("branch_1_20_1");
//!     B
//!   } else {
//!     coverage.branch("branch_1_1_3");
//!     C
//!   }
//! }
//! ```

use std::mem;

use vcl_ast::{
    Block, CaseClause, DeclarationKind, ElseClause, Expr, ExprKind, FunctionCall, IfKeyword,
    IfStatement, Meta, Program, Statement, StatementKind, SubroutineDecl, SwitchStatement,
};

use crate::coverage::{CoverageKind, CoverageNode, CoverageRegistry};
use crate::exception::Exception;

/// Instrument every subroutine of `program` in place.
///
/// Top-level declarations other than subroutines (backends, tables, imports)
/// are left untouched.
pub fn instrument(program: &mut Program, registry: &CoverageRegistry) -> Result<(), Exception> {
    Instrumenter::new(registry).instrument_program(program)
}

pub struct Instrumenter<'a> {
    registry: &'a CoverageRegistry,
}

impl<'a> Instrumenter<'a> {
    pub fn new(registry: &'a CoverageRegistry) -> Self {
        Self { registry }
    }

    pub fn instrument_program(&self, program: &mut Program) -> Result<(), Exception> {
        for declaration in &mut program.declarations {
            if let DeclarationKind::Subroutine(sub) = &mut declaration.kind {
                self.instrument_subroutine(sub, &declaration.meta)?;
            }
        }

        tracing::debug!(
            subroutines = self.registry.count(CoverageKind::Subroutine),
            statements = self.registry.count(CoverageKind::Statement),
            branches = self.registry.count(CoverageKind::Branch),
            "instrumented program"
        );
        Ok(())
    }

    fn instrument_subroutine(&self, sub: &mut SubroutineDecl, meta: &Meta) -> Result<(), Exception> {
        let label = format!("subroutine {}", sub.name);
        let marker = self.create_marker(CoverageKind::Subroutine, &label, meta, &[])?;
        let body = mem::take(&mut sub.body.statements);
        sub.body.statements = prepend(marker, self.instrument_statements(body)?);
        Ok(())
    }

    /// Instrument a statement list, keeping every original statement in place
    /// and inserting its markers right before it.
    pub fn instrument_statements(&self, statements: Vec<Statement>) -> Result<Vec<Statement>, Exception> {
        let mut instrumented = Vec::with_capacity(statements.len() * 2);
        for mut statement in statements {
            instrumented.extend(self.instrument_statement(&mut statement)?);
            instrumented.push(statement);
        }
        Ok(instrumented)
    }

    /// Returns the statements to insert before `statement`. Blocks and
    /// branching statements are rewritten in place.
    fn instrument_statement(&self, statement: &mut Statement) -> Result<Vec<Statement>, Exception> {
        let label = statement.label();
        let meta = &statement.meta;

        let mut inserted = Vec::new();
        match &mut statement.kind {
            StatementKind::Block(block) => {
                let body = mem::take(&mut block.statements);
                block.statements = self.instrument_statements(body)?;
            }

            StatementKind::If(if_statement) => {
                inserted.push(self.create_marker(CoverageKind::Statement, label, meta, &[])?);
                self.instrument_if(if_statement, meta)?;
            }

            StatementKind::Switch(switch) => {
                inserted.push(self.create_marker(CoverageKind::Statement, label, meta, &[])?);
                self.instrument_switch(switch, meta)?;
            }

            // Covered by whatever marker precedes the call; only its
            // arguments may hide a branch.
            StatementKind::FunctionCall(call) => {
                for argument in &call.arguments {
                    inserted.extend(self.instrument_expression(argument)?);
                }
            }

            StatementKind::Error { code, argument } => {
                inserted.push(self.create_marker(CoverageKind::Statement, label, meta, &[])?);
                for operand in [code.as_ref(), argument.as_ref()].into_iter().flatten() {
                    inserted.extend(self.instrument_expression(operand)?);
                }
            }

            StatementKind::Return(value) => {
                inserted.push(self.create_marker(CoverageKind::Statement, label, meta, &[])?);
                if let Some(value) = value {
                    inserted.extend(self.instrument_expression(value)?);
                }
            }

            StatementKind::Set { value, .. }
            | StatementKind::Add { value, .. }
            | StatementKind::Log(value)
            | StatementKind::Synthetic(value)
            | StatementKind::SyntheticBase64(value) => {
                inserted.push(self.create_marker(CoverageKind::Statement, label, meta, &[])?);
                inserted.extend(self.instrument_expression(value)?);
            }

            StatementKind::Declare { .. }
            | StatementKind::Unset(_)
            | StatementKind::Remove(_)
            | StatementKind::Call(_)
            | StatementKind::Restart
            | StatementKind::Esi
            | StatementKind::Break
            | StatementKind::Fallthrough
            | StatementKind::Goto(_)
            | StatementKind::GotoDestination(_) => {
                inserted.push(self.create_marker(CoverageKind::Statement, label, meta, &[])?);
            }
        }

        Ok(inserted)
    }

    /// Branch markers are numbered in source order: 1 for the `if`, then one
    /// per `else if`, then the trailing `else`. Every `else if` turns into a
    /// plain `if` nested in a synthetic `else` block, and is itself
    /// instrumented as a chain of its own.
    fn instrument_if(&self, statement: &mut IfStatement, meta: &Meta) -> Result<(), Exception> {
        const LABEL: &str = "if statement";
        let mut branch = 1;

        let body = mem::take(&mut statement.consequence.statements);
        statement.consequence.statements = prepend(
            self.branch_marker(LABEL, meta, branch)?,
            self.instrument_statements(body)?,
        );

        let mut nested = Vec::with_capacity(statement.another.len());
        for clause in mem::take(&mut statement.another) {
            branch += 1;
            let (mut inner, inner_meta) = clause.into_if_statement();
            self.instrument_if(&mut inner, &inner_meta)?;
            nested.push((self.branch_marker(LABEL, meta, branch)?, inner, inner_meta));
        }

        let mut tail = match statement.alternative.take() {
            Some(mut alternative) => {
                branch += 1;
                let body = mem::take(&mut alternative.consequence.statements);
                alternative.consequence.statements = prepend(
                    self.branch_marker(LABEL, meta, branch)?,
                    self.instrument_statements(body)?,
                );
                Some(alternative)
            }
            None => None,
        };

        // Link from the innermost clause outwards
        for (marker, mut inner, inner_meta) in nested.into_iter().rev() {
            inner.alternative = tail;
            let inner = Statement::new(StatementKind::If(inner), inner_meta);
            tail = Some(ElseClause {
                consequence: Block::new(vec![marker, inner], Meta::synthetic()),
                meta: Meta::synthetic(),
            });
        }
        statement.alternative = tail;

        Ok(())
    }

    /// Each case, default included, starts with a numbered marker keyed on
    /// the switch and an unnumbered marker keyed on the case itself.
    fn instrument_switch(&self, statement: &mut SwitchStatement, meta: &Meta) -> Result<(), Exception> {
        for (index, case) in statement.cases.iter_mut().enumerate() {
            let mut statements = vec![
                self.branch_marker("switch statement", meta, index + 1)?,
                self.create_marker(CoverageKind::Branch, case_label(case), &case.meta, &[])?,
            ];
            statements.extend(self.instrument_statements(mem::take(&mut case.statements))?);
            case.statements = statements;
        }
        Ok(())
    }

    /// Collect the statements needed to cover inline conditionals found
    /// anywhere inside `expr`. The expression itself is never changed.
    pub fn instrument_expression(&self, expr: &Expr) -> Result<Vec<Statement>, Exception> {
        let mut inserted = Vec::new();
        match &expr.kind {
            ExprKind::Call(call) => {
                for argument in &call.arguments {
                    inserted.extend(self.instrument_expression(argument)?);
                }
            }
            ExprKind::Grouped(inner) => inserted.extend(self.instrument_expression(inner)?),
            ExprKind::Infix { left, right, .. } => {
                inserted.extend(self.instrument_expression(left)?);
                inserted.extend(self.instrument_expression(right)?);
            }
            ExprKind::Postfix { left, .. } => inserted.extend(self.instrument_expression(left)?),
            ExprKind::Prefix { right, .. } => inserted.extend(self.instrument_expression(right)?),
            ExprKind::If { condition, .. } => {
                inserted.push(self.instrument_if_expression(condition, &expr.meta)?);
            }
            ExprKind::Ident(_)
            | ExprKind::String(_)
            | ExprKind::Integer(_)
            | ExprKind::Float(_)
            | ExprKind::Bool(_) => {}
        }
        Ok(inserted)
    }

    /// `if(c, a, b)` yields a synthetic `if (c) { true marker } else { false marker }`.
    /// The condition is evaluated again when the original expression runs.
    /// Side effects of the condition happen twice, and the first time before
    /// the rest of the statement: a `~` match here overwrites `re.group.N`
    /// before the instrumented statement reads it.
    fn instrument_if_expression(&self, condition: &Expr, meta: &Meta) -> Result<Statement, Exception> {
        const LABEL: &str = "if expression";
        let on_true = self.create_marker(CoverageKind::Branch, LABEL, meta, &["true"])?;
        let on_false = self.create_marker(CoverageKind::Branch, LABEL, meta, &["false"])?;

        let statement = IfStatement {
            keyword: IfKeyword::If,
            condition: condition.clone(),
            consequence: Block::new(vec![on_true], Meta::synthetic()),
            another: Vec::new(),
            alternative: Some(ElseClause {
                consequence: Block::new(vec![on_false], Meta::synthetic()),
                meta: Meta::synthetic(),
            }),
        };
        Ok(Statement::new(StatementKind::If(statement), Meta::synthetic()))
    }

    fn branch_marker(&self, label: &str, meta: &Meta, branch: usize) -> Result<Statement, Exception> {
        self.create_marker(CoverageKind::Branch, label, meta, &[&branch.to_string()])
    }

    /// Register a marker identifier for the node at `meta` and build the call
    /// statement that records it.
    pub fn create_marker(
        &self,
        kind: CoverageKind,
        label: &str,
        meta: &Meta,
        suffix: &[&str],
    ) -> Result<Statement, Exception> {
        let position = meta.position().ok_or_else(|| {
            Exception::system(format!(
                "cannot create {} coverage marker: {} has no source position",
                kind, label
            ))
        })?;

        let mut id = format!("{}_{}_{}", kind.prefix(), position.line, position.column);
        if !suffix.is_empty() {
            id.push('_');
            id.push_str(&suffix.join("_"));
        }

        self.registry
            .setup(kind, id.clone(), CoverageNode::new(label, position.clone()));
        Ok(marker_statement(kind, id))
    }
}

/// `coverage.<kind>("<id>");`
fn marker_statement(kind: CoverageKind, id: String) -> Statement {
    let call = FunctionCall {
        name: kind.function_name().to_string(),
        arguments: vec![Expr::synthetic_string(id)],
    };
    Statement::new(StatementKind::FunctionCall(call), Meta::synthetic())
}

fn case_label(case: &CaseClause) -> &'static str {
    match case.test {
        Some(_) => "case clause",
        None => "default clause",
    }
}

fn prepend(first: Statement, mut rest: Vec<Statement>) -> Vec<Statement> {
    rest.insert(0, first);
    rest
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vcl_ast::ToVcl;

    fn instrumented(source: &str) -> (Program, CoverageRegistry) {
        let mut program = vcl_parser::parse(source).unwrap();
        let registry = CoverageRegistry::new();
        instrument(&mut program, &registry).unwrap();
        (program, registry)
    }

    fn body(program: &Program) -> &[Statement] {
        &program.subroutines().next().unwrap().body.statements
    }

    /// Identifier recorded by a marker statement, if it is one
    fn marker_id(statement: &Statement) -> Option<&str> {
        match &statement.kind {
            StatementKind::FunctionCall(call) if call.name.starts_with("coverage.") => {
                match &call.arguments[0].kind {
                    ExprKind::String(id) => Some(id),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    fn ids(registry: &CoverageRegistry, kind: CoverageKind) -> Vec<String> {
        registry.ids(kind)
    }

    const CHAIN: &str = r#"sub vcl_recv {
  if (req.http.A) {
    set req.http.X = "1";
  } else if (req.http.B) {
    set req.http.X = "2";
  } elseif (req.http.C) {
    set req.http.X = "3";
  } else {
    set req.http.X = "4";
  }
}
"#;

    #[test]
    fn test_subroutine_marker_comes_first() {
        let (program, registry) = instrumented("sub vcl_recv {\n  esi;\n}\n");
        let statements = body(&program);
        assert_eq!(marker_id(&statements[0]), Some("sub_1_1"));
        assert_eq!(marker_id(&statements[1]), Some("stmt_2_3"));
        assert_eq!(statements[2].kind, StatementKind::Esi);
        assert_eq!(ids(&registry, CoverageKind::Subroutine), vec!["sub_1_1"]);
    }

    #[test]
    fn test_non_subroutine_declarations_are_ignored() {
        let source = "backend origin {\n  .host = \"example.com\";\n}\ntable t {\n  \"a\": \"b\",\n}\n";
        let (program, registry) = instrumented(source);
        assert!(registry.is_empty());
        assert_eq!(program, vcl_parser::parse(source).unwrap());
    }

    #[test]
    fn test_branch_numbers_follow_source_order() {
        let (_, registry) = instrumented(CHAIN);
        let root: Vec<_> = ids(&registry, CoverageKind::Branch)
            .into_iter()
            .filter(|id| id.starts_with("branch_2_3_"))
            .collect();
        assert_eq!(
            root,
            vec!["branch_2_3_1", "branch_2_3_2", "branch_2_3_3", "branch_2_3_4"]
        );
    }

    #[test]
    fn test_else_if_clauses_get_local_markers() {
        let (_, registry) = instrumented(CHAIN);
        let branches = ids(&registry, CoverageKind::Branch);
        assert!(branches.contains(&"branch_4_5_1".to_string()));
        assert!(branches.contains(&"branch_6_5_1".to_string()));
        assert_eq!(branches.len(), 6);
        // the chain gets one statement marker, not one per clause
        assert_eq!(
            ids(&registry, CoverageKind::Statement),
            vec!["stmt_2_3", "stmt_3_5", "stmt_5_5", "stmt_7_5", "stmt_9_5"]
        );
    }

    #[test]
    fn test_chain_becomes_nested_if_else() {
        let (program, _) = instrumented(CHAIN);
        let statements = body(&program);
        assert_eq!(marker_id(&statements[1]), Some("stmt_2_3"));

        let StatementKind::If(root) = &statements[2].kind else {
            panic!("expected if statement");
        };
        assert!(root.another.is_empty());
        assert_eq!(marker_id(&root.consequence.statements[0]), Some("branch_2_3_1"));
        assert_eq!(marker_id(&root.consequence.statements[1]), Some("stmt_3_5"));

        let second = &root.alternative.as_ref().unwrap().consequence.statements;
        assert_eq!(second.len(), 2);
        assert_eq!(marker_id(&second[0]), Some("branch_2_3_2"));
        let StatementKind::If(else_if) = &second[1].kind else {
            panic!("expected nested if");
        };
        assert_eq!(else_if.keyword, IfKeyword::If);
        assert_eq!(marker_id(&else_if.consequence.statements[0]), Some("branch_4_5_1"));

        let third = &else_if.alternative.as_ref().unwrap().consequence.statements;
        assert_eq!(marker_id(&third[0]), Some("branch_2_3_3"));
        let StatementKind::If(elseif) = &third[1].kind else {
            panic!("expected nested if");
        };
        assert_eq!(marker_id(&elseif.consequence.statements[0]), Some("branch_6_5_1"));

        let last = &elseif.alternative.as_ref().unwrap().consequence.statements;
        assert_eq!(marker_id(&last[0]), Some("branch_2_3_4"));
        assert_eq!(marker_id(&last[1]), Some("stmt_9_5"));
        assert!(matches!(last[2].kind, StatementKind::Set { .. }));
    }

    #[test]
    fn test_if_without_else() {
        let (program, registry) = instrumented("sub vcl_recv {\n  if (req.http.A) {\n    esi;\n  }\n}\n");
        assert_eq!(ids(&registry, CoverageKind::Branch), vec!["branch_2_3_1"]);
        let StatementKind::If(root) = &body(&program)[2].kind else {
            panic!("expected if statement");
        };
        assert!(root.alternative.is_none());
    }

    #[test]
    fn test_switch_gets_marker_pair_per_case() {
        let source = r#"sub vcl_recv {
  switch (req.http.X) {
  case "a":
    esi;
    break;
  case ~"^b":
    break;
  default:
    break;
  }
}
"#;
        let (program, registry) = instrumented(source);
        let StatementKind::Switch(switch) = &body(&program)[2].kind else {
            panic!("expected switch statement");
        };

        let pairs: Vec<(&str, &str)> = switch
            .cases
            .iter()
            .map(|case| {
                (
                    marker_id(&case.statements[0]).unwrap(),
                    marker_id(&case.statements[1]).unwrap(),
                )
            })
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("branch_2_3_1", "branch_3_3"),
                ("branch_2_3_2", "branch_6_3"),
                ("branch_2_3_3", "branch_8_3"),
            ]
        );
        assert_eq!(registry.count(CoverageKind::Branch), 6);
        assert!(registry.contains(CoverageKind::Statement, "stmt_2_3"));
        assert!(registry.contains(CoverageKind::Statement, "stmt_4_5"));
    }

    #[test]
    fn test_switch_default_keeps_its_textual_number() {
        let source = r#"sub vcl_recv {
  switch (req.http.X) {
  case "a":
    break;
  default:
    fallthrough;
  case "b":
    break;
  }
}
"#;
        let (program, _) = instrumented(source);
        let StatementKind::Switch(switch) = &body(&program)[2].kind else {
            panic!("expected switch statement");
        };

        let pairs: Vec<_> = switch
            .cases
            .iter()
            .map(|case| {
                (
                    marker_id(&case.statements[0]).unwrap(),
                    marker_id(&case.statements[1]).unwrap(),
                )
            })
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("branch_2_3_1", "branch_3_3"),
                ("branch_2_3_2", "branch_5_3"),
                ("branch_2_3_3", "branch_7_3"),
            ]
        );
        assert_eq!(switch.default_index(), Some(1));
    }

    #[test]
    fn test_else_if_chain_without_else() {
        let source = r#"sub vcl_recv {
  if (req.http.A) {
    esi;
  } else if (req.http.B) {
    restart;
  }
}
"#;
        let (program, registry) = instrumented(source);
        assert_eq!(
            ids(&registry, CoverageKind::Branch),
            vec!["branch_2_3_1", "branch_2_3_2", "branch_4_5_1"]
        );

        let StatementKind::If(root) = &body(&program)[2].kind else {
            panic!("expected if statement");
        };
        let second = &root.alternative.as_ref().unwrap().consequence.statements;
        assert_eq!(second.len(), 2);
        assert_eq!(marker_id(&second[0]), Some("branch_2_3_2"));
        let StatementKind::If(else_if) = &second[1].kind else {
            panic!("expected nested if");
        };
        assert_eq!(marker_id(&else_if.consequence.statements[0]), Some("branch_4_5_1"));
        assert!(else_if.alternative.is_none());
    }

    #[test]
    fn test_function_call_statement_has_no_marker() {
        let source = "sub vcl_recv {\n  std.collect(req.http.A, if(req.http.B, \"x\", \"y\"));\n}\n";
        let (program, registry) = instrumented(source);
        let statements = body(&program);

        assert_eq!(statements.len(), 3);
        assert_eq!(marker_id(&statements[0]), Some("sub_1_1"));
        let StatementKind::If(synthetic) = &statements[1].kind else {
            panic!("expected synthetic if");
        };
        assert!(statements[1].meta.is_synthetic());
        assert_eq!(marker_id(&synthetic.consequence.statements[0]), Some("branch_2_27_true"));
        let alternative = &synthetic.alternative.as_ref().unwrap().consequence.statements;
        assert_eq!(marker_id(&alternative[0]), Some("branch_2_27_false"));
        assert!(matches!(statements[2].kind, StatementKind::FunctionCall(_)));
        assert_eq!(registry.count(CoverageKind::Statement), 0);
    }

    #[test]
    fn test_inline_conditional_in_set() {
        let source = "sub vcl_recv {\n  set req.http.Foo = if(req.http.Bar, \"a\", \"b\");\n}\n";
        let (program, registry) = instrumented(source);
        let statements = body(&program);

        assert_eq!(marker_id(&statements[1]), Some("stmt_2_3"));
        let StatementKind::If(synthetic) = &statements[2].kind else {
            panic!("expected synthetic if");
        };
        assert_eq!(
            synthetic.condition.kind,
            ExprKind::Ident("req.http.Bar".into())
        );
        assert!(matches!(statements[3].kind, StatementKind::Set { .. }));
        assert_eq!(
            ids(&registry, CoverageKind::Branch),
            vec!["branch_2_22_false", "branch_2_22_true"]
        );
    }

    #[test]
    fn test_inline_conditionals_found_in_nested_expressions() {
        let source = "sub vcl_recv {\n  log \"v=\" + std.tolower(if(req.http.A, \"X\", \"Y\")) + (if(req.http.B, \"1\", \"2\"));\n}\n";
        let (program, registry) = instrumented(source);
        let statements = body(&program);
        assert_eq!(statements.len(), 5);
        assert!(matches!(statements[2].kind, StatementKind::If(_)));
        assert!(matches!(statements[3].kind, StatementKind::If(_)));
        assert_eq!(registry.count(CoverageKind::Branch), 4);
    }

    #[test]
    fn test_error_and_return_operands() {
        let source = "sub vcl_recv {\n  error if(req.http.A, 403, 404) \"nope\";\n  return(pass);\n}\n";
        let (program, registry) = instrumented(source);
        let statements = body(&program);
        assert_eq!(marker_id(&statements[1]), Some("stmt_2_3"));
        assert!(matches!(statements[2].kind, StatementKind::If(_)));
        assert!(matches!(statements[3].kind, StatementKind::Error { .. }));
        assert_eq!(marker_id(&statements[4]), Some("stmt_3_3"));
        assert!(matches!(statements[5].kind, StatementKind::Return(_)));
        assert_eq!(registry.count(CoverageKind::Branch), 2);
    }

    #[test]
    fn test_nested_blocks_are_instrumented_without_marker() {
        let (program, registry) = instrumented("sub vcl_recv {\n  {\n    restart;\n  }\n}\n");
        let statements = body(&program);
        assert_eq!(statements.len(), 2);
        let StatementKind::Block(block) = &statements[1].kind else {
            panic!("expected block");
        };
        assert_eq!(marker_id(&block.statements[0]), Some("stmt_3_5"));
        assert_eq!(registry.count(CoverageKind::Statement), 1);
    }

    #[test]
    fn test_identifiers_are_deterministic() {
        let (first_program, first) = instrumented(CHAIN);
        let (second_program, second) = instrumented(CHAIN);
        assert_eq!(first.snapshot(), second.snapshot());
        assert_eq!(first_program.to_vcl(0), second_program.to_vcl(0));
    }

    #[test]
    fn test_missing_position_is_system_exception() {
        let registry = CoverageRegistry::new();
        let instrumenter = Instrumenter::new(&registry);
        let err = instrumenter
            .create_marker(CoverageKind::Statement, "set statement", &Meta::synthetic(), &[])
            .unwrap_err();
        assert!(err.is_system());
        assert!(err.position.is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_suffix_parts_are_joined() {
        let registry = CoverageRegistry::new();
        let instrumenter = Instrumenter::new(&registry);
        let meta = Meta::at(vcl_ast::Position::new(7, 9));
        let marker = instrumenter
            .create_marker(CoverageKind::Branch, "if statement", &meta, &["2", "x"])
            .unwrap();
        assert_eq!(marker_id(&marker), Some("branch_7_9_2_x"));
        assert!(marker.meta.is_synthetic());
    }
}
