//! `emit` and `list` commands.

use anyhow::Result;
use owo_colors::{OwoColorize, Stream};

use crate::bundle::{Emitter, Registry};
use crate::config::BundleConfig;

/// Print one reference per line.
pub fn emit_bundle(config: &BundleConfig, name: &str) -> Result<()> {
    let registry = Registry::register(&config.bundles, config.src_root())?;
    let emitter = Emitter::new(config.build.env, &registry);
    for reference in emitter.emit(name) {
        println!("{reference}");
    }
    Ok(())
}

/// Print each bundle with its format and immediate entries.
pub fn list_bundles(config: &BundleConfig) -> Result<()> {
    let registry = Registry::register(&config.bundles, config.src_root())?;
    print!("{}", render_list(&registry));
    Ok(())
}

fn render_list(registry: &Registry) -> String {
    let mut out = String::new();
    for bundle in registry.iter() {
        let format = format!("({})", bundle.format());
        out.push_str(&format!(
            "{} {}\n",
            bundle.name().if_supports_color(Stream::Stdout, |t| t.bold()),
            format.if_supports_color(Stream::Stdout, |t| t.dimmed())
        ));
        for entry in bundle.entries() {
            let marker = if registry.contains(entry.name()) {
                "bundle"
            } else if entry.is_remote() {
                "remote"
            } else {
                "file"
            };
            out.push_str(&format!(
                "  - {} {}\n",
                entry.name(),
                marker.if_supports_color(Stream::Stdout, |t| t.dimmed())
            ));
        }
    }
    out
}
