//! `build` command.

use anyhow::{Result, bail};

use crate::builder::{BuildOutcome, BuildResult, Builder};
use crate::config::BundleConfig;
use crate::log;

/// Build the named bundles (or all of them) and report per-bundle outcomes.
pub fn build_bundles(config: &BundleConfig, names: &[String]) -> Result<()> {
    let builder = Builder::from_config(config)?;
    if builder.registry().is_empty() {
        log!("build"; "no bundles configured");
        return Ok(());
    }

    let results = if names.is_empty() {
        builder.build_all()
    } else {
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        builder.build_many(&names)
    };

    report(&results)
}

/// Log failures and a summary line; fail if any bundle failed.
fn report(results: &[(String, BuildResult)]) -> Result<()> {
    let mut built = 0;
    let mut fresh = 0;
    let mut failed = 0;

    for (name, result) in results {
        match result {
            Ok(BuildOutcome::Built { .. }) => built += 1,
            Ok(BuildOutcome::Fresh) => fresh += 1,
            Err(e) => {
                failed += 1;
                log!("error"; "{}: {:#}", name, anyhow::Error::new(e.clone()));
            }
        }
    }

    log!("build"; "{} built, {} fresh, {} failed", built, fresh, failed);
    if failed > 0 {
        bail!("{failed} bundle(s) failed to build");
    }
    Ok(())
}
