use std::time::Duration;

use tokio::process::{Child, Command};

/// Split a command line into program and arguments on whitespace.
///
/// No quoting or escaping: `echo "a b"` yields the arguments `"a` and `b"`.
pub fn split_command(line: &str) -> Option<(&str, Vec<&str>)> {
    let mut parts = line.split_whitespace();
    let program = parts.next()?;
    Some((program, parts.collect()))
}

pub fn cmd_program(program: &str, args: &[&str]) -> Command {
    let mut cmd = Command::new(program);
    cmd.args(args);
    cmd
}

/// Ask the child to terminate, then kill it if it is still alive after `grace`.
pub async fn kill_graceful(child: &mut Child, grace: Duration) -> std::io::Result<()> {
    cfg_if::cfg_if! {
        if #[cfg(unix)] {
            if let Some(pid) = child.id() {
                // SAFETY: signals a pid we spawned and have not reaped yet.
                unsafe {
                    libc::kill(pid as libc::pid_t, libc::SIGTERM);
                }
                if tokio::time::timeout(grace, child.wait()).await.is_ok() {
                    return Ok(());
                }
            }
        } else {
            let _ = grace;
        }
    }
    child.kill().await
}
