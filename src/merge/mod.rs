//! Rewrite passes that fold common code into marked platform classes.
//!
//! Passes run in a fixed order over the whole platform model:
//! [`InheritMissingMembers`], [`Inherit`], [`OverwriteClass`], [`Overwrite`].
//! Inherited members must exist before `@Overwrite` targets are checked on
//! the same class. Every class a pass touches is recorded in the [`EmitSet`];
//! all other classes are copied to the output untouched.

mod inherit;
mod overwrite;

use indexmap::IndexSet;
use smol_str::SmolStr;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::hir::marks::{Annotated, Mark, any_member_marked};
use crate::hir::{ClassRef, CommonModel, JavaModel, SourceFile, TypeScope, qualify};
use crate::syntax::TypeDecl;

pub use inherit::{Inherit, InheritMissingMembers};
pub use overwrite::{Overwrite, OverwriteClass};

/// Classes rewritten by the merge passes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EmitSet {
    classes: IndexSet<SmolStr>,
    top_level: IndexSet<SmolStr>,
}

impl EmitSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, scope: &TypeScope) {
        self.classes.insert(scope.qualified_name.clone());
        self.top_level.insert(scope.top_level.clone());
    }

    pub fn contains(&self, qualified_name: &str) -> bool {
        self.classes.contains(qualified_name)
    }

    /// Was `qualified_name`, or any type nested in it, touched?
    pub fn contains_top_level(&self, qualified_name: &str) -> bool {
        self.top_level.contains(qualified_name)
    }

    /// Does `file` declare a touched type? Such files are printed from the
    /// model; the rest are copied.
    pub fn touches_file(&self, file: &SourceFile) -> bool {
        file.unit
            .types
            .iter()
            .any(|t| self.contains_top_level(&qualify(file.package(), &t.name)))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.classes.iter().map(SmolStr::as_str)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// State shared by the passes of one merge.
pub struct PassContext<'a> {
    pub common: &'a CommonModel,
    pub emit: &'a mut EmitSet,
}

impl<'a> PassContext<'a> {
    /// The common class `qualified_name` overwrites. Missing counterparts
    /// are fatal.
    pub fn counterpart(&self, qualified_name: &str) -> Result<ClassRef<'a>> {
        counterpart(self.common, qualified_name)
    }
}

/// One rewrite pass, applied to every type declaration of the model.
pub trait Processor {
    fn name(&self) -> &'static str;

    fn process(
        &self,
        cx: &mut PassContext<'_>,
        scope: &TypeScope,
        decl: &mut TypeDecl,
    ) -> Result<()>;
}

/// Run every pass over `model` and return the classes they touched.
pub fn run(model: &mut JavaModel, common: &CommonModel) -> Result<EmitSet> {
    let mut emit = EmitSet::new();
    let passes: [&dyn Processor; 4] = [&InheritMissingMembers, &Inherit, &OverwriteClass, &Overwrite];
    for pass in passes {
        let mut cx = PassContext {
            common,
            emit: &mut emit,
        };
        model.visit_types_mut(|scope, decl| pass.process(&mut cx, scope, decl))?;
        debug!(pass = pass.name(), touched = cx.emit.len(), "pass finished");
    }
    info!(classes = emit.len(), "merged platform classes");
    Ok(emit)
}

/// Check the marks of `model` without rewriting anything: every marked class
/// needs a counterpart and every `@Overwrite` member a target.
pub fn verify(model: &JavaModel, common: &CommonModel) -> Result<()> {
    const CLASS_MARKS: [Mark; 3] = [
        Mark::InheritMissingMembers,
        Mark::Inherit,
        Mark::OverwriteClass,
    ];
    for class in model.classes() {
        let marked = CLASS_MARKS.iter().any(|&mark| class.decl.has_mark(mark))
            || any_member_marked(class.decl, Mark::Overwrite);
        if !marked {
            continue;
        }
        let target = counterpart(common, &class.qualified_name)?;
        overwrite::check_overwritten_members(class.decl, target.decl, &class.qualified_name)?;
    }
    Ok(())
}

fn counterpart<'c>(common: &'c CommonModel, qualified_name: &str) -> Result<ClassRef<'c>> {
    common
        .common_class_by_name(qualified_name)
        .ok_or_else(|| Error::MissingCommonClass {
            class: SmolStr::new(qualified_name),
        })
}
