//! Child-process supervision: spawn the payload, relay signals, relay the
//! exit code.

use anyhow::{Context, Result};
use std::ffi::OsString;
use std::path::Path;
use std::process::ExitStatus;
use tokio::process::{Child, Command};

/// Spawn the payload with the launcher's arguments forwarded verbatim and
/// the parent's standard streams inherited.
#[tracing::instrument(skip(args))]
pub fn spawn(executable: &Path, args: Vec<OsString>) -> Result<Child> {
    Command::new(executable)
        .args(args)
        .spawn()
        .with_context(|| format!("Failed to start {}", executable.display()))
}

/// The child's exit code becomes the parent's. A child that died without a
/// code (killed by a signal) counts as success.
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(0)
}

/// Wait for the child to exit, forwarding interrupt and termination
/// requests to it in the meantime.
///
/// The parent never kills the child outright on a signal; it passes the
/// signal along and keeps waiting, leaving shutdown pacing to the child.
#[cfg(unix)]
pub async fn supervise(mut child: Child) -> Result<i32> {
    use log::debug;
    use nix::sys::signal::Signal;
    use nix::unistd::Pid;
    use tokio::signal::unix::{SignalKind, signal};

    let mut interrupt =
        signal(SignalKind::interrupt()).context("Failed to install SIGINT handler")?;
    let mut terminate =
        signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?;

    // The pid is captured once; forwarding to an already-exited child is a
    // delivery error we log and ignore.
    let pid = child.id().map(|id| Pid::from_raw(id as i32));

    loop {
        let inbound = tokio::select! {
            status = child.wait() => {
                let status = status.context("Failed to wait for child process")?;
                return Ok(exit_code(status));
            }
            _ = interrupt.recv() => Signal::SIGINT,
            _ = terminate.recv() => Signal::SIGTERM,
        };

        match pid {
            Some(pid) => {
                debug!("Forwarding {:?} to child {}", inbound, pid);
                if let Err(e) = nix::sys::signal::kill(pid, inbound) {
                    debug!("Failed to forward {:?} to child: {}", inbound, e);
                }
            }
            None => debug!("Received {:?} but the child has no pid", inbound),
        }
    }
}

/// Windows has no deliverable counterpart of SIGINT/SIGTERM for an
/// unrelated process; a Ctrl-C translates to terminating the child, which
/// is also what the original launcher's `kill` amounts to there.
#[cfg(windows)]
pub async fn supervise(mut child: Child) -> Result<i32> {
    use log::debug;

    loop {
        tokio::select! {
            status = child.wait() => {
                let status = status.context("Failed to wait for child process")?;
                return Ok(exit_code(status));
            }
            _ = tokio::signal::ctrl_c() => {}
        }

        if let Err(e) = child.start_kill() {
            debug!("Failed to terminate child: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    mod unix {
        use super::*;
        use nix::sys::signal::Signal;
        use nix::unistd::Pid;
        use std::os::unix::fs::PermissionsExt;
        use tempfile::tempdir;

        fn script(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
            let path = dir.join(name);
            std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        #[tokio::test]
        async fn test_supervise_relays_exit_code() {
            let dir = tempdir().unwrap();
            let path = script(dir.path(), "exit3", "exit 3");

            let child = spawn(&path, vec![]).unwrap();
            assert_eq!(supervise(child).await.unwrap(), 3);
        }

        #[tokio::test]
        async fn test_supervise_success_is_zero() {
            let dir = tempdir().unwrap();
            let path = script(dir.path(), "ok", "exit 0");

            let child = spawn(&path, vec![]).unwrap();
            assert_eq!(supervise(child).await.unwrap(), 0);
        }

        #[tokio::test]
        async fn test_spawn_missing_executable() {
            let dir = tempdir().unwrap();
            let path = dir.path().join("does-not-exist");

            let err = spawn(&path, vec![]).unwrap_err();
            assert!(err.to_string().contains("Failed to start"));
        }

        #[tokio::test]
        async fn test_spawn_forwards_arguments() {
            let dir = tempdir().unwrap();
            let out = dir.path().join("args.txt");
            let path = script(
                dir.path(),
                "record",
                &format!("printf '%s\\n' \"$@\" > {}", out.display()),
            );

            let child = spawn(
                &path,
                vec![
                    OsString::from("--flag"),
                    OsString::from("value with spaces"),
                ],
            )
            .unwrap();
            assert_eq!(supervise(child).await.unwrap(), 0);

            let recorded = std::fs::read_to_string(&out).unwrap();
            assert_eq!(recorded, "--flag\nvalue with spaces\n");
        }

        #[tokio::test]
        async fn test_forwarded_signal_reaches_child() {
            // The child traps INT and turns it into exit 42; delivering the
            // signal to its pid must let it run that handler.
            let dir = tempdir().unwrap();
            let ready = dir.path().join("ready");
            let path = script(
                dir.path(),
                "trap42",
                &format!(
                    "trap 'exit 42' INT\ntouch {}\nwhile :; do sleep 1; done",
                    ready.display()
                ),
            );

            let mut child = spawn(&path, vec![]).unwrap();
            let pid = Pid::from_raw(child.id().unwrap() as i32);

            let deadline = std::time::Instant::now() + std::time::Duration::from_secs(10);
            while !ready.exists() {
                assert!(std::time::Instant::now() < deadline, "child never became ready");
                tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            }

            nix::sys::signal::kill(pid, Signal::SIGINT).unwrap();
            let status = child.wait().await.unwrap();
            assert_eq!(status.code(), Some(42));
        }

        #[test]
        fn test_exit_code_mapping() {
            use std::os::unix::process::ExitStatusExt;

            // Normal exits carry their code through
            let status = ExitStatus::from_raw(3 << 8);
            assert_eq!(exit_code(status), 3);

            // A SIGTERM death has no code and counts as success
            let status = ExitStatus::from_raw(15);
            assert_eq!(exit_code(status), 0);
        }
    }
}
