//! Hooks backed by an external command.

use anyhow::{Context, Result};
use rustc_hash::FxHashMap;

use super::{Hook, HookContext};
use crate::config::HookConfig;
use crate::utils::exec::Cmd;

/// Pipes raw content to a command's stdin and uses its stdout.
pub struct CommandHook {
    config: HookConfig,
}

impl CommandHook {
    pub fn new(config: HookConfig) -> Self {
        Self { config }
    }

    /// `$BUNDLE_*` variables for one invocation.
    fn vars(ctx: &HookContext<'_>) -> FxHashMap<String, String> {
        let mut vars = FxHashMap::default();
        vars.insert("BUNDLE_SOURCE".into(), ctx.source.location());
        vars.insert("BUNDLE_NAME".into(), ctx.bundle.to_string());
        vars.insert("BUNDLE_SRC_ROOT".into(), ctx.src_root.display().to_string());
        vars
    }
}

/// Replace `$KEY` occurrences with their values.
fn resolve_args(args: &[String], vars: &FxHashMap<String, String>) -> Vec<String> {
    args.iter()
        .map(|arg| {
            let mut result = arg.clone();
            for (key, value) in vars {
                result = result.replace(&format!("${key}"), value);
            }
            result
        })
        .collect()
}

impl Hook for CommandHook {
    fn apply(&self, ctx: &HookContext<'_>, content: String) -> Result<String> {
        let vars = Self::vars(ctx);
        let command = resolve_args(&self.config.command, &vars);

        crate::debug!("hook"; "`{}` on {}", self.name(), ctx.source.name());
        let stdout = Cmd::from_slice(&command)
            .cwd(ctx.src_root)
            .envs(&vars)
            .stdin(content)
            .quiet(self.config.quiet)
            .run()?;

        String::from_utf8(stdout)
            .with_context(|| format!("`{}` produced non UTF-8 output", self.name()))
    }

    fn name(&self) -> &str {
        self.config.display_name()
    }
}
