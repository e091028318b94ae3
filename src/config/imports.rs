//! Recursive `@import` resolution.
//!
//! Resolution walks the import graph depth-first, splicing each imported
//! module's rules in place of its `@import` line. The canonical base
//! directories on the current path are kept on a stack; meeting one of them
//! again is an [`ImportCycle`](DescriptorError::ImportCycle).
use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};

use super::descriptor::{ModuleDescriptor, Rule};
use crate::error::DescriptorError;

/// A mapping rule tagged with the base directory it was declared in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRule {
    /// Normalized source path, relative to `base_dir`.
    pub source: String,
    /// Normalized target path, relative to the projection root.
    pub target: String,
    /// Directory of the descriptor that declared the rule.
    pub base_dir: PathBuf,
}

impl ResolvedRule {
    /// Absolute (or base-relative) source path.
    #[must_use]
    pub fn source_path(&self) -> PathBuf {
        self.base_dir.join(&self.source)
    }

    /// Target path under `root`.
    #[must_use]
    pub fn target_path(&self, root: &Path) -> PathBuf {
        root.join(&self.target)
    }
}

impl fmt::Display for ResolvedRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.source, self.target)
    }
}

/// Flattened, order-preserving list of mapping rules with no imports left.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedRuleSet {
    rules: Vec<ResolvedRule>,
}

impl ResolvedRuleSet {
    /// Number of mapping rules.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the set holds no rules.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterate over the rules in resolution order.
    pub fn iter(&self) -> std::slice::Iter<'_, ResolvedRule> {
        self.rules.iter()
    }
}

impl From<Vec<ResolvedRule>> for ResolvedRuleSet {
    fn from(rules: Vec<ResolvedRule>) -> Self {
        Self { rules }
    }
}

impl<'a> IntoIterator for &'a ResolvedRuleSet {
    type Item = &'a ResolvedRule;
    type IntoIter = std::slice::Iter<'a, ResolvedRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

/// Resolve the descriptor at `descriptor_path` and every module it imports.
///
/// Nested descriptors are looked up as
/// `<base>/<import>/<file name of descriptor_path>`.
///
/// # Errors
///
/// Returns the first [`DescriptorError`] encountered. Failures below an
/// import are wrapped in [`DescriptorError::InImport`] naming that import.
pub fn resolve(descriptor_path: &Path) -> Result<ResolvedRuleSet, DescriptorError> {
    let file_name = descriptor_path
        .file_name()
        .ok_or_else(|| DescriptorError::Unreadable {
            path: descriptor_path.to_path_buf(),
            source: std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "descriptor path has no file name",
            ),
        })?;

    let mut resolver = Resolver {
        file_name,
        path: Vec::new(),
    };
    let mut out = Vec::new();
    resolver.resolve_into(descriptor_path, &mut out)?;
    Ok(ResolvedRuleSet::from(out))
}

struct Resolver<'a> {
    file_name: &'a OsStr,
    /// Canonical base directories of the modules on the current import path.
    path: Vec<PathBuf>,
}

impl Resolver<'_> {
    fn resolve_into(
        &mut self,
        descriptor_path: &Path,
        out: &mut Vec<ResolvedRule>,
    ) -> Result<(), DescriptorError> {
        let descriptor = ModuleDescriptor::load(descriptor_path)?;
        let key = dunce::canonicalize(&descriptor.base_dir)
            .unwrap_or_else(|_| descriptor.base_dir.clone());

        if self.path.contains(&key) {
            let chain = self
                .path
                .iter()
                .chain(std::iter::once(&key))
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(" → ");
            return Err(DescriptorError::ImportCycle { chain });
        }
        self.path.push(key);

        for rule in descriptor.rules {
            match rule {
                Rule::Mapping { source, target } => out.push(ResolvedRule {
                    source,
                    target,
                    base_dir: descriptor.base_dir.clone(),
                }),
                Rule::Import { module_root } => {
                    let nested = descriptor
                        .base_dir
                        .join(&module_root)
                        .join(self.file_name);
                    if !is_readable_file(&nested) {
                        return Err(DescriptorError::ImportNotFound {
                            import: module_root,
                            path: nested,
                        });
                    }
                    self.resolve_into(&nested, out)
                        .map_err(|e| DescriptorError::InImport {
                            import: module_root,
                            source: Box::new(e),
                        })?;
                }
            }
        }

        self.path.pop();
        Ok(())
    }
}

fn is_readable_file(path: &Path) -> bool {
    path.is_file() && std::fs::File::open(path).is_ok()
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn write(path: &Path, text: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, text).unwrap();
    }

    fn pairs(set: &ResolvedRuleSet) -> Vec<(String, String)> {
        set.iter()
            .map(|r| (r.source.clone(), r.target.clone()))
            .collect()
    }

    #[test]
    fn resolves_plain_descriptor() {
        let dir = tempfile::tempdir().unwrap();
        let top = dir.path().join("modlink.map");
        write(&top, "a x\nb y\n");

        let set = resolve(&top).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.iter().all(|r| r.base_dir == dir.path()));
    }

    #[test]
    fn import_is_spliced_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let top = dir.path().join("modlink.map");
        write(&top, "first one\n@import path/to/sub\nlast two\n");
        write(&dir.path().join("path/to/sub/modlink.map"), "a x\nb y\n");

        let set = resolve(&top).unwrap();
        assert_eq!(
            pairs(&set),
            vec![
                ("first".into(), "one".into()),
                ("a".into(), "x".into()),
                ("b".into(), "y".into()),
                ("last".into(), "two".into()),
            ]
        );
    }

    #[test]
    fn nested_rules_keep_their_own_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        let top = dir.path().join("modlink.map");
        write(&top, "@import outer\n");
        write(&dir.path().join("outer/modlink.map"), "@import inner\n");
        write(&dir.path().join("outer/inner/modlink.map"), "deep.txt deep.txt\n");

        let set = resolve(&top).unwrap();
        let rule = set.iter().next().unwrap();
        assert_eq!(rule.base_dir, dir.path().join("outer/inner"));
        assert_eq!(
            rule.source_path(),
            dir.path().join("outer/inner/deep.txt")
        );
    }

    #[test]
    fn nested_lookup_uses_top_level_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let top = dir.path().join("custom.links");
        write(&top, "@import sub\n");
        write(&dir.path().join("sub/custom.links"), "a x\n");
        write(&dir.path().join("sub/modlink.map"), "wrong wrong\n");

        let set = resolve(&top).unwrap();
        assert_eq!(pairs(&set), vec![("a".into(), "x".into())]);
    }

    #[test]
    fn missing_import_is_import_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let top = dir.path().join("modlink.map");
        write(&top, "@import nowhere\n");

        let err = resolve(&top).unwrap_err();
        assert!(
            matches!(err, DescriptorError::ImportNotFound { ref import, .. } if import == "nowhere"),
            "unexpected: {err:?}"
        );
    }

    #[test]
    fn nested_failure_is_annotated_with_import() {
        let dir = tempfile::tempdir().unwrap();
        let top = dir.path().join("modlink.map");
        write(&top, "@import outer\n");
        write(&dir.path().join("outer/modlink.map"), "@import gone\n");

        let err = resolve(&top).unwrap_err();
        assert!(
            matches!(
                &err,
                DescriptorError::InImport { import, source }
                    if import == "outer"
                        && matches!(**source, DescriptorError::ImportNotFound { .. })
            ),
            "unexpected: {err:?}"
        );
    }

    #[test]
    fn missing_top_level_descriptor_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve(&dir.path().join("modlink.map")).unwrap_err();
        assert!(matches!(err, DescriptorError::Unreadable { .. }));
    }

    #[test]
    fn diamond_imports_are_not_cycles() {
        let dir = tempfile::tempdir().unwrap();
        let top = dir.path().join("modlink.map");
        write(&top, "@import left\n@import right\n");
        write(&dir.path().join("left/modlink.map"), "@import shared\n");
        write(&dir.path().join("left/shared/modlink.map"), "s left-s\n");
        write(&dir.path().join("right/modlink.map"), "@import shared\n");
        write(&dir.path().join("right/shared/modlink.map"), "s right-s\n");

        let set = resolve(&top).unwrap();
        assert_eq!(set.len(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_import_back_to_self_is_a_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let top = dir.path().join("modlink.map");
        write(&top, "a x\n@import loop\n");
        std::os::unix::fs::symlink(dir.path(), dir.path().join("loop")).unwrap();

        let err = resolve(&top).unwrap_err();
        assert!(
            matches!(
                &err,
                DescriptorError::InImport { source, .. }
                    if matches!(**source, DescriptorError::ImportCycle { .. })
            ),
            "unexpected: {err:?}"
        );
    }

    #[test]
    fn malformed_nested_descriptor_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let top = dir.path().join("modlink.map");
        write(&top, "@import sub\n");
        write(&dir.path().join("sub/modlink.map"), "only-one-token\n");

        let err = resolve(&top).unwrap_err();
        assert!(err.to_string().contains("in import 'sub'"));
        assert!(err.to_string().contains("expected 2 fields"));
    }
}
