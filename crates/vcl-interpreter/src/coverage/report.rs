//! Coverage report generation

use std::fmt;

use serde::{Deserialize, Serialize};
use vcl_ast::Position;

use super::CoverageKind;

/// One registry entry as seen by a report consumer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageRecord {
    pub kind: CoverageKind,
    pub id: String,
    pub label: String,
    pub position: Position,
    pub hits: u64,
}

impl CoverageRecord {
    pub fn is_covered(&self) -> bool {
        self.hits > 0
    }
}

/// Executed/total counts of one coverage kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoverageSummary {
    pub executed: usize,
    pub total: usize,
    /// Percentage of executed markers; 0.0 when there are none
    pub percent: f64,
}

impl CoverageSummary {
    fn of(records: &[CoverageRecord], kind: CoverageKind) -> Self {
        let (executed, total) = records
            .iter()
            .filter(|r| r.kind == kind)
            .fold((0, 0), |(executed, total), r| {
                (executed + usize::from(r.is_covered()), total + 1)
            });
        let percent = if total == 0 {
            0.0
        } else {
            executed as f64 * 100.0 / total as f64
        };
        Self {
            executed,
            total,
            percent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageReport {
    pub subroutines: CoverageSummary,
    pub statements: CoverageSummary,
    pub branches: CoverageSummary,
    pub entries: Vec<CoverageRecord>,
}

impl CoverageReport {
    pub fn from_records(entries: Vec<CoverageRecord>) -> Self {
        Self {
            subroutines: CoverageSummary::of(&entries, CoverageKind::Subroutine),
            statements: CoverageSummary::of(&entries, CoverageKind::Statement),
            branches: CoverageSummary::of(&entries, CoverageKind::Branch),
            entries,
        }
    }

    pub fn summary(&self, kind: CoverageKind) -> CoverageSummary {
        match kind {
            CoverageKind::Subroutine => self.subroutines,
            CoverageKind::Statement => self.statements,
            CoverageKind::Branch => self.branches,
        }
    }

    pub fn entry(&self, kind: CoverageKind, id: &str) -> Option<&CoverageRecord> {
        self.entries.iter().find(|r| r.kind == kind && r.id == id)
    }

    pub fn uncovered(&self) -> impl Iterator<Item = &CoverageRecord> {
        self.entries.iter().filter(|r| !r.is_covered())
    }
}

impl fmt::Display for CoverageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Coverage report")?;
        for kind in CoverageKind::ALL {
            let summary = self.summary(kind);
            writeln!(
                f,
                "  {:<12} {:>4}/{:<4} ({:.2}%)",
                format!("{}:", kind),
                summary.executed,
                summary.total,
                summary.percent
            )?;
        }

        let mut uncovered = self.uncovered().peekable();
        if uncovered.peek().is_some() {
            writeln!(f)?;
            writeln!(f, "Not covered:")?;
            for record in uncovered {
                writeln!(f, "  {:<24} {:<28} {}", record.id, record.label, record.position)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(kind: CoverageKind, id: &str, hits: u64) -> CoverageRecord {
        CoverageRecord {
            kind,
            id: id.into(),
            label: "set statement".into(),
            position: Position::new(1, 1),
            hits,
        }
    }

    #[test]
    fn test_summary_percent() {
        let report = CoverageReport::from_records(vec![
            record(CoverageKind::Statement, "stmt_1_1", 1),
            record(CoverageKind::Statement, "stmt_2_1", 0),
            record(CoverageKind::Statement, "stmt_3_1", 4),
            record(CoverageKind::Statement, "stmt_4_1", 0),
        ]);
        assert_eq!(report.statements.executed, 2);
        assert_eq!(report.statements.total, 4);
        assert_eq!(report.statements.percent, 50.0);
    }

    #[test]
    fn test_empty_kind_is_zero_percent() {
        let report = CoverageReport::from_records(vec![]);
        assert_eq!(report.branches.total, 0);
        assert_eq!(report.branches.percent, 0.0);
    }

    #[test]
    fn test_display_lists_uncovered() {
        let report = CoverageReport::from_records(vec![
            record(CoverageKind::Branch, "branch_1_1_1", 1),
            record(CoverageKind::Branch, "branch_1_1_2", 0),
        ]);
        let text = report.to_string();
        assert!(text.contains("branch:"));
        assert!(text.contains("Not covered:"));
        assert!(text.contains("branch_1_1_2"));
        assert!(!text.contains("branch_1_1_1 "));
    }

    #[test]
    fn test_report_serializes_to_json() {
        let report = CoverageReport::from_records(vec![record(CoverageKind::Subroutine, "sub_1_1", 0)]);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["subroutines"]["total"], 1);
        assert_eq!(json["entries"][0]["kind"], "subroutine");
    }
}
