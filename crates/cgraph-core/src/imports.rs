//! Import resolution as a caller-pluggable collaborator, scoped to one
//! preprocessor pass by an RAII guard so a hook can never outlive the pass
//! that installed it, even across an early return or a propagated error.

use std::path::Path;

/// Resolves an import statement encountered while walking `current_module`
/// to the module namespace it refers to. Implemented by the front-end's
/// embedder; this crate only defines the contract and the scoping guard.
pub trait ImportResolver {
    fn resolve(&mut self, current_module: &str, import_spec: &str) -> Option<String>;

    /// Installs this resolver's hooks (e.g. registering a package root with
    /// an underlying import machinery) and returns a guard that removes them
    /// on drop.
    fn install_hooks(&mut self, package_root: &Path) -> ImportHookGuard<'_, Self>
    where
        Self: Sized,
    {
        self.on_install(package_root);
        ImportHookGuard { resolver: self }
    }

    /// Hook point called by the default `install_hooks` implementation.
    /// Override to perform the actual side effect of scoping this resolver
    /// to `package_root`; the matching teardown goes in `on_remove`.
    fn on_install(&mut self, package_root: &Path) {
        let _ = package_root;
    }

    /// Hook point called unconditionally when the guard drops.
    fn on_remove(&mut self) {}
}

/// Releases the resolver's hooks when dropped, regardless of how the scope
/// was exited. Never construct this directly; obtain it from
/// `ImportResolver::install_hooks`.
pub struct ImportHookGuard<'a, R: ImportResolver> {
    resolver: &'a mut R,
}

impl<R: ImportResolver> Drop for ImportHookGuard<'_, R> {
    fn drop(&mut self) {
        self.resolver.on_remove();
    }
}

impl<R: ImportResolver> std::ops::Deref for ImportHookGuard<'_, R> {
    type Target = R;
    fn deref(&self) -> &R {
        self.resolver
    }
}

impl<R: ImportResolver> std::ops::DerefMut for ImportHookGuard<'_, R> {
    fn deref_mut(&mut self) -> &mut R {
        self.resolver
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::path::PathBuf;

    struct CountingResolver {
        installs: Cell<u32>,
        removes: Cell<u32>,
    }

    impl ImportResolver for CountingResolver {
        fn resolve(&mut self, _current_module: &str, import_spec: &str) -> Option<String> {
            Some(import_spec.to_string())
        }

        fn on_install(&mut self, _package_root: &Path) {
            self.installs.set(self.installs.get() + 1);
        }

        fn on_remove(&mut self) {
            self.removes.set(self.removes.get() + 1);
        }
    }

    #[test]
    fn guard_removes_hooks_on_drop() {
        let mut resolver = CountingResolver {
            installs: Cell::new(0),
            removes: Cell::new(0),
        };
        {
            let _guard = resolver.install_hooks(&PathBuf::from("/pkg"));
            assert_eq!(_guard.installs.get(), 1);
            assert_eq!(_guard.removes.get(), 0);
        }
        assert_eq!(resolver.removes.get(), 1);
    }
}
