//! Exceptions raised while instrumenting or interpreting a program
//!
//! Two classes exist. A runtime exception is caused by the program being
//! interpreted and points at the offending node. A system exception signals a
//! defect in this toolchain (an invariant of a tree rewrite was violated, for
//! example) and is rendered with a note asking for a bug report.

use std::fmt;

use thiserror::Error;
use vcl_ast::{Position, SubroutineDecl};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExceptionKind {
    Runtime,
    System,
}

impl ExceptionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ExceptionKind::Runtime => "RuntimeException",
            ExceptionKind::System => "SystemException",
        }
    }
}

impl fmt::Display for ExceptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[{}] {}{}{}", self.kind, self.message, self.location(), self.note())]
pub struct Exception {
    pub kind: ExceptionKind,
    pub position: Option<Position>,
    pub message: String,
}

impl Exception {
    pub fn runtime(position: Option<&Position>, message: impl Into<String>) -> Self {
        Self {
            kind: ExceptionKind::Runtime,
            position: position.cloned(),
            message: message.into(),
        }
    }

    pub fn system(message: impl Into<String>) -> Self {
        Self {
            kind: ExceptionKind::System,
            position: None,
            message: message.into(),
        }
    }

    /// Call depth limit reached; the message lists every frame of the stack
    pub fn max_call_stack_exceeded(position: Option<&Position>, stack: &[&SubroutineDecl]) -> Self {
        let frames = stack
            .iter()
            .map(|sub| {
                let (file, line) = match sub.body.meta.position() {
                    Some(p) => (p.file.clone().unwrap_or_default(), p.line),
                    None => (String::new(), 0),
                };
                format!("{} in {}:{}", sub.name, file, line)
            })
            .collect::<Vec<_>>()
            .join("\n");

        Self::runtime(
            position,
            format!("max call stack exceeded. Call stack:\n{}", frames),
        )
    }

    pub fn is_system(&self) -> bool {
        self.kind == ExceptionKind::System
    }

    fn location(&self) -> String {
        let Some(position) = &self.position else {
            return String::new();
        };
        let file = match &position.file {
            Some(file) if !file.is_empty() => format!(" in {}", file),
            _ => String::new(),
        };
        format!("{} at line: {}, position: {}", file, position.line, position.column)
    }

    fn note(&self) -> &'static str {
        match self.kind {
            ExceptionKind::Runtime => "",
            ExceptionKind::System => {
                "\n\nThis exception is caused by the vcl interpreter.\nIt may be a bug, please report it to the vcl maintainers."
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use vcl_ast::{Block, Meta};

    #[test]
    fn test_runtime_exception_with_position() {
        let position = Position::new(3, 5).with_file("main.vcl");
        let err = Exception::runtime(Some(&position), "undefined variable");
        assert_eq!(
            err.to_string(),
            "[RuntimeException] undefined variable in main.vcl at line: 3, position: 5"
        );
    }

    #[test]
    fn test_runtime_exception_without_file() {
        let err = Exception::runtime(Some(&Position::new(1, 2)), "boom");
        assert_eq!(err.to_string(), "[RuntimeException] boom at line: 1, position: 2");
    }

    #[test]
    fn test_system_exception_mentions_bug() {
        let err = Exception::system("node has no position");
        let rendered = err.to_string();
        assert!(err.is_system());
        assert!(rendered.starts_with("[SystemException] node has no position"));
        assert!(rendered.contains("It may be a bug"));
    }

    #[test]
    fn test_system_exception_with_position_keeps_note_last() {
        let mut err = Exception::system("bad tree");
        err.position = Some(Position::new(2, 3));
        let rendered = err.to_string();
        assert!(rendered.starts_with("[SystemException] bad tree at line: 2, position: 3\n\n"));
        assert!(rendered.ends_with("report it to the vcl maintainers."));

        let source: &dyn std::error::Error = &err;
        assert!(source.source().is_none());
    }

    #[test]
    fn test_max_call_stack_lists_frames() {
        let sub = SubroutineDecl {
            name: "loop".into(),
            body: Block::new(vec![], Meta::at(Position::new(4, 10).with_file("a.vcl"))),
        };
        let err = Exception::max_call_stack_exceeded(None, &[&sub, &sub]);
        assert!(err.message.contains("loop in a.vcl:4\nloop in a.vcl:4"));
    }
}
