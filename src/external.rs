use crate::command::{ExitCode, Invocation};
use crate::env::Environment;
use anyhow::{Context, Result, anyhow};
use std::borrow::Cow;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use tracing::debug;

/// Run `invocation` as a child process and wait for it.
///
/// The child sees `env` with the invocation's assignments applied on top. The
/// program is resolved through the resulting `PATH`, so `PATH=/opt/bin tool`
/// finds `/opt/bin/tool`. Standard streams are inherited.
pub fn run(invocation: &Invocation, env: &Environment) -> Result<ExitCode> {
    let mut effective = env.clone();
    effective.apply_assignments(&invocation.environment_assignments);

    let command = build_command(invocation, &effective)?;
    debug!(program = ?command.get_program(), args = ?invocation.arguments, "spawning");
    spawn_and_wait(command, &invocation.command)
}

fn build_command(invocation: &Invocation, env: &Environment) -> Result<Command> {
    let search_paths = env.get_var("PATH").unwrap_or_default();
    let executable = find_command_path(OsStr::new(&search_paths), Path::new(&invocation.command))
        .ok_or_else(|| anyhow!("command not found: {}", invocation.command))?;

    let mut cmd = Command::new(executable.as_os_str());
    cmd.args(&invocation.arguments)
        .env_clear()
        .envs(env.vars.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    Ok(cmd)
}

fn spawn_and_wait(mut command: Command, name: &str) -> Result<ExitCode> {
    let mut child = command
        .spawn()
        .with_context(|| format!("failed to spawn {name}"))?;
    let exit_status = child
        .wait()
        .with_context(|| format!("failed to wait for {name}"))?;
    let code = match exit_status.code() {
        Some(x) => x,
        None => terminated_by_signal(exit_status),
    };
    debug!(command = name, code, "exited");
    Ok(code)
}

#[cfg(unix)]
fn terminated_by_signal(exit_status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    match ExitStatusExt::signal(&exit_status) {
        Some(signal) => 128 + signal,
        None => -1,
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: ExitStatus) -> i32 {
    -1
}

/// Resolve a command path the way a typical shell would.
///
/// Behavior:
/// - Absolute path: returns it if it exists.
/// - Relative with multiple components (e.g., `bin/sh`): returns it if it exists.
/// - `./foo` on Unix or any `./`-prefixed path on other platforms: returns it if it exists.
/// - Single path component (no separators): search each directory in `search_paths` (PATH)
///   and return the first existing match.
/// - Empty path: returns `None`.
pub fn find_command_path<'a>(search_paths: &OsStr, path: &'a Path) -> Option<Cow<'a, Path>> {
    if path.is_absolute() {
        return find_by_path(path).map(Cow::Borrowed);
    }

    let search_in_current_dir = cfg!(not(unix)) || path.starts_with("./");
    if search_in_current_dir && path.exists() {
        return Some(Cow::Borrowed(path));
    }

    let mut components = path.components();
    match (components.next(), components.next()) {
        (None, None) => None,
        (Some(x), None) => find_in_path(search_paths, x.as_os_str()).map(Cow::Owned),
        _ => find_by_path(path).map(Cow::Borrowed),
    }
}

fn find_in_path(search_paths: &OsStr, cmd: &OsStr) -> Option<PathBuf> {
    std::env::split_paths(search_paths)
        .map(|dir| dir.join(cmd))
        .find(|path| path.is_file())
}

fn find_by_path(path: &Path) -> Option<&Path> {
    if path.exists() { Some(path) } else { None }
}
