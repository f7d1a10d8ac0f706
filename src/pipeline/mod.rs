//! Per-extension content transforms.
//!
//! A [`Hook`] post-processes one leaf's raw content before it is assembled
//! into a bundle. Hooks are registered by extension (`.tmpl`); entries with
//! no hook pass through unchanged.

mod command;

pub use command::CommandHook;

use std::path::Path;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::bundle::{BuildError, Source};
use crate::config::{BundleConfig, ConfigDiagnostics, ConfigError, section::validate_hooks};

/// What a hook knows about the entry it transforms.
pub struct HookContext<'a> {
    pub source: &'a Source,
    /// Bundle being built.
    pub bundle: &'a str,
    pub src_root: &'a Path,
}

/// Content transform for one extension. Failures abort the bundle build.
pub trait Hook: Send + Sync {
    fn apply(&self, ctx: &HookContext<'_>, content: String) -> anyhow::Result<String>;

    /// Name used in error messages.
    fn name(&self) -> &str {
        "hook"
    }
}

impl<F> Hook for F
where
    F: Fn(&HookContext<'_>, String) -> anyhow::Result<String> + Send + Sync,
{
    fn apply(&self, ctx: &HookContext<'_>, content: String) -> anyhow::Result<String> {
        self(ctx, content)
    }
}

/// Extension -> hook table.
#[derive(Default, Clone)]
pub struct Pipeline {
    hooks: FxHashMap<String, Arc<dyn Hook>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build command hooks for every `[hooks]` entry.
    pub fn from_config(config: &BundleConfig) -> Result<Self, ConfigError> {
        let mut diag = ConfigDiagnostics::new();
        validate_hooks(&config.hooks, &mut diag);
        diag.into_result().map_err(ConfigError::Diagnostics)?;

        let mut pipeline = Self::new();
        for (ext, hook) in &config.hooks {
            pipeline.register(ext.as_str(), CommandHook::new(hook.clone()));
        }
        Ok(pipeline)
    }

    /// Register `hook` for `ext` (with or without the leading dot), replacing
    /// any earlier one.
    pub fn register(&mut self, ext: &str, hook: impl Hook + 'static) -> &mut Self {
        let key = if ext.starts_with('.') {
            ext.to_string()
        } else {
            format!(".{ext}")
        };
        self.hooks.insert(key, Arc::new(hook));
        self
    }

    pub fn hook_for(&self, source: &Source) -> Option<&Arc<dyn Hook>> {
        self.hooks.get(source.extension()?.as_str())
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Apply the hook registered for the entry's extension, if any.
    pub fn transform(&self, ctx: &HookContext<'_>, content: String) -> Result<String, BuildError> {
        let Some(hook) = self.hook_for(ctx.source) else {
            return Ok(content);
        };
        hook.apply(ctx, content)
            .map_err(|e| BuildError::Transform {
                name: ctx.source.name().to_string(),
                hook: hook.name().to_string(),
                message: format!("{e:#}"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    fn ctx<'a>(source: &'a Source) -> HookContext<'a> {
        HookContext {
            source,
            bundle: "index.html",
            src_root: Path::new("/site"),
        }
    }

    #[test]
    fn test_passthrough_without_hook() {
        let pipeline = Pipeline::new();
        assert!(pipeline.is_empty());
        let source = Source::local("a.css", Path::new("/site"));
        let out = pipeline.transform(&ctx(&source), "a { }".into()).unwrap();
        assert_eq!(out, "a { }");
    }

    #[test]
    fn test_hook_selected_by_extension() {
        let mut pipeline = Pipeline::new();
        pipeline.register("tmpl", |ctx: &HookContext<'_>, content: String| -> anyhow::Result<String> {
            Ok(content.replace("{{bundle}}", ctx.bundle))
        });
        assert!(!pipeline.is_empty());
        assert_eq!(pipeline.len(), 1);

        let tmpl = Source::local("nav.tmpl", Path::new("/site"));
        let out = pipeline.transform(&ctx(&tmpl), "<b>{{bundle}}</b>".into()).unwrap();
        assert_eq!(out, "<b>index.html</b>");

        let html = Source::local("body.html", Path::new("/site"));
        let out = pipeline.transform(&ctx(&html), "{{bundle}}".into()).unwrap();
        assert_eq!(out, "{{bundle}}");
    }

    #[test]
    fn test_hook_failure_is_transform_error() {
        let mut pipeline = Pipeline::new();
        pipeline.register(".tmpl", |_: &HookContext<'_>, _: String| -> anyhow::Result<String> {
            anyhow::bail!("unbalanced braces")
        });

        let source = Source::local("nav.tmpl", Path::new("/site"));
        let err = pipeline.transform(&ctx(&source), String::new()).unwrap_err();
        match err {
            BuildError::Transform { name, message, .. } => {
                assert_eq!(name, "nav.tmpl");
                assert!(message.contains("unbalanced"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_from_config() {
        let config = test_parse_config(
            r#"
[hooks.".tmpl"]
command = ["cat"]
"#,
        );
        let pipeline = Pipeline::from_config(&config).unwrap();
        assert_eq!(pipeline.len(), 1);
        let source = Source::local("x.tmpl", Path::new("/site"));
        assert_eq!(pipeline.hook_for(&source).map(|h| h.name()), Some("cat"));
    }

    #[test]
    fn test_from_config_rejects_bad_key() {
        let config = test_parse_config(
            r#"
[hooks.tmpl]
command = ["cat"]
"#,
        );
        assert!(Pipeline::from_config(&config).is_err());
    }
}
