//! Structural checks between platform classes and their common counterparts.

use rustc_hash::FxHashSet;
use tracing::debug;

use super::ErrorReport;
use crate::hir::access::{
    self, format_member, has_different_access_kind, has_more_restrictive_access,
    public_constants_of, public_members_of, structural_members_of,
};
use crate::hir::{ClassRef, CommonModel, JavaModel, MemberRef};

/// Runs every check over a platform model and collects the findings.
///
/// Checks never short-circuit each other: a class may appear under several
/// report kinds at once.
pub struct Validator<'a> {
    common: &'a CommonModel,
    report: ErrorReport,
}

impl<'a> Validator<'a> {
    /// Create a new validator against `common`.
    pub fn new(common: &'a CommonModel) -> Self {
        Self {
            common,
            report: ErrorReport::new(),
        }
    }

    /// Check every class of `model`, then the overwrite targets.
    pub fn check_model(&mut self, model: &JavaModel) {
        let classes = model.classes();
        for class in &classes {
            self.check_class(class);
        }
        let declared: FxHashSet<&str> = classes.iter().map(|c| c.qualified_name.as_str()).collect();
        self.check_overwrite_targets(&declared);
    }

    /// Compare one platform class with its counterpart, if it has one.
    pub fn check_class(&mut self, class: &ClassRef<'_>) {
        let Some(common) = self.common.common_class_by_name(&class.qualified_name) else {
            return;
        };
        self.check_missing_members(class, &common);
        self.check_unreachable_constants(class, &common);
        self.check_overridden_members(class, &common);
    }

    /// Every public common member must be declared by the platform class.
    fn check_missing_members(&mut self, class: &ClassRef<'_>, common: &ClassRef<'_>) {
        for member in public_members_of(common.decl) {
            if !access::overrides_member(class.decl, common.decl, member) {
                let descriptor = format_member(common.relative_name(), common.decl, member);
                self.report.missing_member(&class.qualified_name, descriptor);
            }
        }
    }

    /// A redeclared public constant shadows the common value.
    fn check_unreachable_constants(&mut self, class: &ClassRef<'_>, common: &ClassRef<'_>) {
        for constant in public_constants_of(common.decl) {
            if access::overrides_member(class.decl, common.decl, constant) {
                let descriptor = format_member(common.relative_name(), common.decl, constant);
                self.report.unreachable_member(&class.qualified_name, descriptor);
            }
        }
    }

    /// Overriding members must keep the access level and staticness.
    fn check_overridden_members(&mut self, class: &ClassRef<'_>, common: &ClassRef<'_>) {
        for member in structural_members_of(common.decl) {
            let Some(child) = access::overridden_member(class.decl, common.decl, member) else {
                continue;
            };
            let child = MemberRef::new(class.decl, child);
            let parent = MemberRef::new(common.decl, member);
            let descriptor = || format_member(class.relative_name(), class.decl, child.member);
            if has_more_restrictive_access(child, parent) {
                self.report
                    .more_restrictive_access(&class.qualified_name, descriptor());
            }
            if has_different_access_kind(child, parent) {
                self.report
                    .access_kind_mismatch(&class.qualified_name, descriptor());
            }
        }
    }

    /// Every `@OverwriteTarget` needs a platform class of the same name.
    fn check_overwrite_targets(&mut self, declared: &FxHashSet<&str>) {
        for target in self.common.overwrite_targets() {
            if !declared.contains(target.qualified_name.as_str()) {
                self.report
                    .missing_overwrite(&target.qualified_name, target.relative_name());
            }
        }
    }

    /// Finish validation and return the report.
    pub fn finish(self) -> ErrorReport {
        debug!(errors = self.report.len(), "validation finished");
        self.report
    }
}

/// Validate `model` against `common`.
pub fn validate(model: &JavaModel, common: &CommonModel) -> ErrorReport {
    let mut validator = Validator::new(common);
    validator.check_model(model);
    validator.finish()
}
