//! Terminal output: prefixed log lines and a build progress counter.
//!
//! ```ignore
//! log!("build"; "main.css (3 entries)");
//! debug!("detect"; "{} unchanged", name);   // only with --verbose
//!
//! let progress = Progress::new("bundles", 12);
//! progress.tick(result.is_ok());
//! progress.finish();
//! ```
//!
//! While a [`Progress`] is live, `log!` clears the counter line before
//! printing so messages and the counter do not interleave.

use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use owo_colors::{OwoColorize, Style};
use parking_lot::Mutex;
use std::{
    io::{Write, stdout},
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
};

static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Whether a progress counter currently owns the last terminal line.
static PROGRESS_ACTIVE: AtomicBool = AtomicBool::new(false);

pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::Relaxed);
}

pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::Relaxed)
}

/// Log a message with a colored module prefix.
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Like `log!`, but only with `--verbose`.
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

pub fn log(module: &str, message: &str) {
    let prefix = format!("[{module}]");
    let mut out = stdout().lock();
    if PROGRESS_ACTIVE.load(Ordering::Acquire) {
        clear_line(&mut out);
    }
    writeln!(out, "{} {message}", prefix.style(prefix_style(module))).ok();
    out.flush().ok();
}

fn prefix_style(module: &str) -> Style {
    let style = Style::new().bold();
    match module {
        "build" => style.bright_green(),
        "serve" => style.bright_blue(),
        "error" | "minify" | "fetch" => style.bright_red(),
        "hook" | "detect" => style.bright_magenta(),
        _ => style.bright_yellow(),
    }
}

fn clear_line(out: &mut impl Write) {
    execute!(out, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine)).ok();
}

/// Single-line `done/total` counter for a batch of builds.
///
/// Redraws are skipped while another worker holds the terminal so rayon
/// threads never wait on output.
pub struct Progress {
    label: &'static str,
    total: usize,
    done: AtomicUsize,
    failed: AtomicUsize,
    draw: Mutex<()>,
}

impl Progress {
    pub fn new(label: &'static str, total: usize) -> Self {
        let progress = Self {
            label,
            total,
            done: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            draw: Mutex::new(()),
        };
        if total > 0 {
            PROGRESS_ACTIVE.store(true, Ordering::Release);
            progress.draw(false);
        }
        progress
    }

    /// Count one finished item.
    pub fn tick(&self, ok: bool) {
        self.done.fetch_add(1, Ordering::Relaxed);
        if !ok {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
        if self.total > 0 && self.draw.try_lock().is_some() {
            self.draw(false);
        }
    }

    fn line(&self) -> String {
        let done = self.done.load(Ordering::Relaxed);
        let failed = self.failed.load(Ordering::Relaxed);
        let mut line = format!("{}/{} {}", done, self.total, self.label);
        if failed > 0 {
            line.push_str(&format!(" ({failed} failed)"));
        }
        line
    }

    fn draw(&self, newline: bool) {
        let mut out = stdout().lock();
        clear_line(&mut out);
        let prefix = "[build]".style(prefix_style("build"));
        if newline {
            writeln!(out, "{prefix} {}", self.line()).ok();
        } else {
            write!(out, "{prefix} {}", self.line()).ok();
        }
        out.flush().ok();
    }

    /// Leave the final count on its own line.
    pub fn finish(self) {
        if self.total > 0 {
            let _guard = self.draw.lock();
            self.draw(true);
        }
        PROGRESS_ACTIVE.store(false, Ordering::Release);
    }
}
