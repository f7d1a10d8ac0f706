//! External command execution for content hooks.
//!
//! A hook command receives the raw entry on stdin and answers with the
//! transformed content on stdout. Anything written to stderr is forwarded to
//! the log under the program's name unless the command is marked quiet.
//!
//! ```ignore
//! let css = Cmd::from_slice(&["npx", "sass", "--stdin"])
//!     .cwd(src_root)
//!     .envs([("BUNDLE_NAME", "main.css")])
//!     .stdin(raw)
//!     .run()?;
//! ```

use crate::log;
use anyhow::{Context, Result, bail};
use regex::Regex;
use std::{
    borrow::Cow,
    ffi::OsString,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
    process::{Child, Command, Output, Stdio},
    sync::LazyLock,
    thread::JoinHandle,
};

/// Lines of stderr kept in the error of a failed command.
const ERROR_TAIL: usize = 20;

static ANSI_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*[A-Za-z]").unwrap());

/// One invocation of an external program.
#[derive(Debug, Default)]
pub struct Cmd {
    program: OsString,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
    envs: Vec<(String, String)>,
    input: Option<Vec<u8>>,
    quiet: bool,
}

impl Cmd {
    /// Build from a command array: the first element is the program.
    pub fn from_slice<S: AsRef<str>>(command: &[S]) -> Self {
        let mut parts = command.iter().map(|s| OsString::from(s.as_ref()));
        Self {
            program: parts.next().unwrap_or_default(),
            args: parts.collect(),
            ..Default::default()
        }
    }

    pub fn cwd(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn envs<K, V>(mut self, vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.envs.extend(
            vars.into_iter()
                .map(|(k, v)| (k.as_ref().to_owned(), v.as_ref().to_owned())),
        );
        self
    }

    /// Data piped to the child's stdin.
    pub fn stdin(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.input = Some(data.into());
        self
    }

    /// Drop stderr output of successful runs.
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    fn name(&self) -> Cow<'_, str> {
        Path::new(&self.program)
            .file_name()
            .unwrap_or(self.program.as_os_str())
            .to_string_lossy()
    }

    /// Run to completion and return stdout.
    ///
    /// A non-zero exit status is an error carrying the tail of stderr.
    pub fn run(self) -> Result<Vec<u8>> {
        if self.program.is_empty() {
            bail!("empty command");
        }
        let name = self.name().into_owned();

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .envs(self.envs.iter().map(|(k, v)| (k, v)))
            .stdin(if self.input.is_some() { Stdio::piped() } else { Stdio::null() })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.cwd {
            command.current_dir(dir);
        }

        let mut child = command
            .spawn()
            .with_context(|| format!("failed to spawn `{name}`"))?;
        let feeder = self.input.map(|data| feed_stdin(&mut child, data));
        let output = child
            .wait_with_output()
            .with_context(|| format!("failed to wait for `{name}`"))?;

        if let Some(feeder) = feeder.flatten() {
            match feeder.join() {
                // A child may exit without draining its input.
                Ok(Err(e)) if e.kind() != ErrorKind::BrokenPipe => {
                    return Err(e).with_context(|| format!("failed to write stdin of `{name}`"));
                }
                Ok(_) => {}
                Err(_) => bail!("stdin writer of `{name}` panicked"),
            }
        }

        check_status(&name, &output)?;
        if !self.quiet {
            forward_stderr(&name, &output.stderr);
        }
        Ok(output.stdout)
    }
}

/// Write stdin from its own thread so a child that answers before reading
/// everything cannot block on a full pipe.
fn feed_stdin(child: &mut Child, data: Vec<u8>) -> Option<JoinHandle<std::io::Result<()>>> {
    let mut stdin = child.stdin.take()?;
    Some(std::thread::spawn(move || stdin.write_all(&data)))
}

fn check_status(name: &str, output: &Output) -> Result<()> {
    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let lines: Vec<_> = stderr.lines().collect();
    let tail = lines[lines.len().saturating_sub(ERROR_TAIL)..].join("\n");
    let tail = strip_ansi(tail.trim());

    if tail.is_empty() {
        bail!("`{name}` exited with {}", output.status)
    }
    bail!("`{name}` exited with {}\n{tail}", output.status)
}

fn forward_stderr(name: &str, stderr: &[u8]) {
    let stderr = String::from_utf8_lossy(stderr);
    let lines: Vec<_> = stderr
        .lines()
        .map(strip_ansi)
        .filter(|line| !line.trim().is_empty())
        .collect();

    if !lines.is_empty() {
        log!(name; "{}", lines.join("\n"));
    }
}

fn strip_ansi(s: &str) -> Cow<'_, str> {
    ANSI_ESCAPE.replace_all(s, "")
}
