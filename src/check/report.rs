//! The validation report and its console rendering.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use smol_str::SmolStr;

/// ANSI escape that starts red console output.
pub const RED: &str = "\x1b[31m";
/// ANSI escape that resets console colors.
pub const RESET: &str = "\x1b[0m";

// ============================================================================
// REPORT KINDS
// ============================================================================

/// What kind of structural contract was broken. Sections print in
/// declaration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReportKind {
    MissingMembers,
    UnreachableMembers,
    MoreRestrictiveAccess,
    AccessKindMismatch,
    MissingOverwrites,
}

impl ReportKind {
    pub fn header(self) -> &'static str {
        match self {
            ReportKind::MissingMembers => "Missing members",
            ReportKind::UnreachableMembers => "Unreachable members",
            ReportKind::MoreRestrictiveAccess => "More restrictive access",
            ReportKind::AccessKindMismatch => "Static or instance mismatch",
            ReportKind::MissingOverwrites => "Missing overwrites",
        }
    }
}

// ============================================================================
// ERROR REPORT
// ============================================================================

/// Collected validation errors: kind → qualified class name → member
/// descriptors, each level in insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ErrorReport {
    sections: BTreeMap<ReportKind, IndexMap<SmolStr, Vec<String>>>,
}

impl ErrorReport {
    /// Create a new empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `member` of `class` under `kind`.
    pub fn add(&mut self, kind: ReportKind, class: &str, member: impl Into<String>) {
        self.sections
            .entry(kind)
            .or_default()
            .entry(SmolStr::new(class))
            .or_default()
            .push(member.into());
    }

    pub fn missing_member(&mut self, class: &str, member: impl Into<String>) {
        self.add(ReportKind::MissingMembers, class, member);
    }

    pub fn unreachable_member(&mut self, class: &str, member: impl Into<String>) {
        self.add(ReportKind::UnreachableMembers, class, member);
    }

    pub fn more_restrictive_access(&mut self, class: &str, member: impl Into<String>) {
        self.add(ReportKind::MoreRestrictiveAccess, class, member);
    }

    pub fn access_kind_mismatch(&mut self, class: &str, member: impl Into<String>) {
        self.add(ReportKind::AccessKindMismatch, class, member);
    }

    pub fn missing_overwrite(&mut self, class: &str, member: impl Into<String>) {
        self.add(ReportKind::MissingOverwrites, class, member);
    }

    /// Descriptors recorded for `class` under `kind`.
    pub fn members(&self, kind: ReportKind, class: &str) -> &[String] {
        self.sections
            .get(&kind)
            .and_then(|classes| classes.get(class))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Classes with at least one entry under `kind`.
    pub fn classes(&self, kind: ReportKind) -> impl Iterator<Item = &str> + '_ {
        self.sections
            .get(&kind)
            .into_iter()
            .flat_map(|classes| classes.keys().map(SmolStr::as_str))
    }

    pub fn kinds(&self) -> impl Iterator<Item = ReportKind> + '_ {
        self.sections.keys().copied()
    }

    /// Total number of recorded descriptors.
    pub fn len(&self) -> usize {
        self.sections
            .values()
            .flat_map(|classes| classes.values())
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// One section per kind, uncolored. Each class contributes a header line
    /// followed by ` * <member>` lines.
    pub fn render(&self, module: &str) -> Vec<String> {
        self.sections
            .iter()
            .map(|(kind, classes)| {
                let mut text = String::new();
                for (class, members) in classes {
                    text.push('\n');
                    text.push_str(&format!("{} in '{module}' @ {class}\n", kind.header()));
                    for member in members {
                        text.push_str(&format!(" * {member}\n"));
                    }
                }
                text.pop();
                text
            })
            .collect()
    }

    /// Print every section to stderr in red.
    pub fn print(&self, module: &str) {
        for section in self.render(module) {
            eprintln!("{}", red(&section));
        }
    }
}

pub fn red(text: &str) -> String {
    format!("{RED}{text}{RESET}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_report() {
        let report = ErrorReport::new();
        assert!(report.is_empty());
        assert_eq!(report.len(), 0);
        assert!(report.render("fabric").is_empty());
    }

    #[test]
    fn test_render_groups_by_class() {
        let mut report = ErrorReport::new();
        report.missing_member("a.C", "m()");
        report.missing_member("a.C", "n(int)");
        report.missing_member("a.D", "K");

        assert_eq!(
            report.render("forge"),
            ["\nMissing members in 'forge' @ a.C\n * m()\n * n(int)\n\nMissing members in 'forge' @ a.D\n * K"]
        );
    }

    #[test]
    fn test_sections_follow_kind_order() {
        let mut report = ErrorReport::new();
        report.access_kind_mismatch("a.C", "g()");
        report.unreachable_member("a.C", "K");

        let kinds: Vec<_> = report.kinds().collect();
        assert_eq!(
            kinds,
            [ReportKind::UnreachableMembers, ReportKind::AccessKindMismatch]
        );
        assert_eq!(report.members(ReportKind::UnreachableMembers, "a.C"), ["K"]);
        assert!(report.members(ReportKind::MissingMembers, "a.C").is_empty());
    }

    #[test]
    fn test_red_wrapping() {
        assert_eq!(red("x"), "\x1b[31mx\x1b[0m");
    }
}
