//! Resolve a bundle name to the references a page should include.

use super::Registry;
use crate::config::Env;

/// Stateless lookup used by template layers.
pub struct Emitter<'a> {
    env: Env,
    registry: &'a Registry,
}

impl<'a> Emitter<'a> {
    pub fn new(env: Env, registry: &'a Registry) -> Self {
        Self { env, registry }
    }

    /// Production: the bundle itself. Development: its immediate entries in
    /// declared order, nested bundles left unexpanded.
    ///
    /// Unknown names resolve to themselves in both modes.
    pub fn emit(&self, name: &str) -> Vec<String> {
        match (self.env.is_development(), self.registry.get(name)) {
            (true, Some(bundle)) => bundle.entry_names().map(str::to_string).collect(),
            _ => vec![name.to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BundleDefinitions;
    use std::path::Path;

    fn registry() -> Registry {
        let mut defs = BundleDefinitions::new();
        defs.insert(
            "app.js".into(),
            vec!["https://cdn.example.com/lib.js".into(), "js/app.js".into()],
        );
        defs.insert("main.css".into(), vec!["b.css".into(), "a.css".into()]);
        defs.insert("all.css".into(), vec!["main.css".into(), "print.css".into()]);
        Registry::register(&defs, Path::new("/site")).unwrap()
    }

    #[test]
    fn test_production_emits_bundle() {
        let registry = registry();
        let emitter = Emitter::new(Env::Production, &registry);
        assert_eq!(emitter.emit("app.js"), vec!["app.js"]);
        assert_eq!(emitter.emit("all.css"), vec!["all.css"]);
    }

    #[test]
    fn test_development_emits_entries_in_order() {
        let registry = registry();
        let emitter = Emitter::new(Env::Development, &registry);
        assert_eq!(
            emitter.emit("app.js"),
            vec!["https://cdn.example.com/lib.js", "js/app.js"]
        );
        assert_eq!(emitter.emit("main.css"), vec!["b.css", "a.css"]);
        // one level only
        assert_eq!(emitter.emit("all.css"), vec!["main.css", "print.css"]);
    }

    #[test]
    fn test_unknown_bundle_emits_itself() {
        let registry = registry();
        for env in [Env::Production, Env::Development] {
            let emitter = Emitter::new(env, &registry);
            assert_eq!(emitter.emit("missing.js"), vec!["missing.js"]);
        }
    }
}
