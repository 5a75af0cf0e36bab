//! The common model and its process-wide cache.
//!
//! Every platform module of a build compares itself against the same common
//! module, so the common sources are loaded once and shared.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use smol_str::SmolStr;
use tracing::debug;

use super::marks::{Annotated, Mark};
use super::{ClassId, ClassRef, JavaModel};
use crate::error::{Error, Result};

/// A loaded common module, indexed by qualified class name.
#[derive(Debug)]
pub struct CommonModel {
    model: JavaModel,
    /// Qualified name → declaration, in model order
    classes: IndexMap<SmolStr, ClassId>,
    /// Classes marked `@OverwriteTarget`
    targets: Vec<SmolStr>,
}

impl CommonModel {
    pub fn new(model: JavaModel) -> Self {
        let mut classes = IndexMap::new();
        let mut targets = Vec::new();
        for class in model.classes() {
            if class.decl.has_mark(Mark::OverwriteTarget) {
                targets.push(class.qualified_name.clone());
            }
            classes.insert(class.qualified_name, class.id);
        }
        debug!(
            classes = classes.len(),
            targets = targets.len(),
            "indexed common model"
        );
        Self {
            model,
            classes,
            targets,
        }
    }

    pub fn model(&self) -> &JavaModel {
        &self.model
    }

    /// Exact lookup by qualified name (`pkg.Outer$Inner`).
    pub fn common_class_by_name(&self, qualified_name: &str) -> Option<ClassRef<'_>> {
        self.classes
            .get(qualified_name)
            .and_then(|id| self.model.class(id))
    }

    /// Every common class, nested types included.
    pub fn all_common_classes(&self) -> impl Iterator<Item = ClassRef<'_>> + '_ {
        self.classes.values().filter_map(|id| self.model.class(id))
    }

    /// Common classes each platform module is expected to overwrite.
    pub fn overwrite_targets(&self) -> impl Iterator<Item = ClassRef<'_>> + '_ {
        self.targets
            .iter()
            .filter_map(|name| self.common_class_by_name(name))
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// Build-wide holder of the [`CommonModel`].
///
/// The first caller of [`CommonCache::get_or_init`] loads the model; every
/// other caller, concurrent or later, receives the same instance.
#[derive(Debug, Default)]
pub struct CommonCache {
    slot: RwLock<Option<Arc<CommonModel>>>,
}

impl CommonCache {
    pub const fn new() -> Self {
        Self {
            slot: RwLock::new(None),
        }
    }

    /// The cache shared by every module of the current process.
    pub fn global() -> &'static CommonCache {
        static GLOBAL: CommonCache = CommonCache::new();
        &GLOBAL
    }

    /// Return the cached model, loading it with `load` if this is the first
    /// request. A failed load leaves the cache empty.
    pub fn get_or_init<F>(&self, load: F) -> Result<Arc<CommonModel>>
    where
        F: FnOnce() -> Result<CommonModel>,
    {
        // Fast path: already loaded (read lock)
        if let Some(model) = self.slot.read().as_ref() {
            return Ok(Arc::clone(model));
        }

        // Slow path: load under the write lock
        let mut slot = self.slot.write();

        // Double-check after acquiring write lock
        if let Some(model) = slot.as_ref() {
            return Ok(Arc::clone(model));
        }

        let model = Arc::new(load()?);
        debug!(classes = model.len(), "common model cached");
        *slot = Some(Arc::clone(&model));
        Ok(model)
    }

    /// The cached model. Fails if nothing has been loaded yet.
    pub fn get(&self) -> Result<Arc<CommonModel>> {
        self.slot.read().clone().ok_or(Error::PluginOrdering)
    }

    pub fn is_initialized(&self) -> bool {
        self.slot.read().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hir::SourceRoots;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn common_model() -> CommonModel {
        let model = JavaModel::parse(
            SourceRoots::new(["/common"]),
            [
                (
                    PathBuf::from("/common/a/A.java"),
                    "package a; @OverwriteTarget public class A { public static class B {} }"
                        .to_string(),
                ),
                (
                    PathBuf::from("/common/a/C.java"),
                    "package a; public class C {}".to_string(),
                ),
            ],
        )
        .unwrap();
        CommonModel::new(model)
    }

    #[test]
    fn test_lookup_by_qualified_name() {
        let common = common_model();

        assert_eq!(common.len(), 3);
        assert!(common.common_class_by_name("a.A$B").is_some());
        assert!(common.common_class_by_name("a.B").is_none());
        let targets: Vec<_> = common
            .overwrite_targets()
            .map(|c| c.qualified_name.to_string())
            .collect();
        assert_eq!(targets, ["a.A"]);
    }

    #[test]
    fn test_get_before_init_is_an_ordering_error() {
        let cache = CommonCache::new();
        assert!(matches!(cache.get(), Err(Error::PluginOrdering)));
        assert!(!cache.is_initialized());
    }

    #[test]
    fn test_concurrent_init_loads_once() {
        let cache = CommonCache::new();
        let loads = AtomicUsize::new(0);

        let models: Vec<Arc<CommonModel>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    scope.spawn(|| {
                        cache
                            .get_or_init(|| {
                                loads.fetch_add(1, Ordering::SeqCst);
                                Ok(common_model())
                            })
                            .unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert!(models.iter().all(|m| Arc::ptr_eq(m, &models[0])));
        assert!(Arc::ptr_eq(&cache.get().unwrap(), &models[0]));
    }

    #[test]
    fn test_failed_load_can_be_retried() {
        let cache = CommonCache::new();
        let err = cache.get_or_init(|| Err(Error::PluginOrdering)).unwrap_err();
        assert!(matches!(err, Error::PluginOrdering));
        assert!(!cache.is_initialized());

        cache.get_or_init(|| Ok(common_model())).unwrap();
        assert!(cache.is_initialized());
    }
}
