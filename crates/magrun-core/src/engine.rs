//! External simulation engine invocation.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{DriveError, Result};

/// How much engine stderr to retain in an error.
const STDERR_LIMIT: usize = 4096;

/// Configuration for the engine subprocess.
///
/// The engine is invoked in the run directory with the script file path as
/// its sole trailing argument; zero exit status means success. A configured
/// timeout bounds the wait; without one a hanging engine hangs the drive.
#[derive(Debug, Clone)]
pub struct Engine {
    program: PathBuf,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl Default for Engine {
    /// The stock OOMMF launcher: `oommf boxsi +fg <script>`.
    fn default() -> Self {
        Self {
            program: PathBuf::from("oommf"),
            args: vec!["boxsi".to_string(), "+fg".to_string()],
            timeout: None,
        }
    }
}

impl Engine {
    /// An engine invoked as `<program> <script>` with no preset arguments.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: None,
        }
    }

    /// Arguments inserted before the script path.
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Bound the subprocess wait.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Run the engine on `script`, working in `workdir`, and wait for exit.
    pub async fn run(&self, script: &Path, workdir: &Path) -> Result<()> {
        info!(
            program = %self.program.display(),
            script = %script.display(),
            "invoking engine"
        );

        // The child runs with its cwd set to the run directory, so a
        // caller-relative script path would no longer resolve there.
        let script = if script.is_absolute() {
            script.to_path_buf()
        } else {
            script.canonicalize()?
        };

        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(&script)
            .current_dir(workdir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // A timed-out engine must not keep writing into a run
            // directory a retry may reuse.
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| DriveError::EngineLaunch {
                program: self.program.display().to_string(),
                source: e,
            })?;

        let output = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, child.wait_with_output())
                .await
                .map_err(|_| DriveError::EngineTimeout(timeout.as_secs()))??,
            None => child.wait_with_output().await?,
        };

        if !output.status.success() {
            let tail = output.stderr.len().min(STDERR_LIMIT);
            // Truncate the raw bytes first; from_utf8_lossy turns a split
            // multi-byte character into a replacement character instead of
            // panicking on a char boundary.
            let stderr = String::from_utf8_lossy(&output.stderr[..tail]).to_string();
            return Err(DriveError::EngineFailed {
                code: output.status.code().unwrap_or(-1),
                stderr,
            });
        }

        debug!("engine exited cleanly");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    fn fake_engine(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("fake-engine.sh");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        path
    }

    #[tokio::test]
    async fn test_zero_exit_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let engine = Engine::new(fake_engine(dir.path(), "exit 0"));
        let script = dir.path().join("sample.mif");
        std::fs::write(&script, "# MIF 2.1\n").unwrap();

        engine.run(&script, dir.path()).await.unwrap();
    }

    #[tokio::test]
    async fn test_nonzero_exit_fails_with_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let engine = Engine::new(fake_engine(dir.path(), "echo 'boom' >&2; exit 3"));
        let script = dir.path().join("sample.mif");
        std::fs::write(&script, "# MIF 2.1\n").unwrap();

        let err = engine.run(&script, dir.path()).await.unwrap_err();
        match err {
            DriveError::EngineFailed { code, stderr } => {
                assert_eq!(code, 3);
                assert!(stderr.contains("boom"));
            }
            other => panic!("expected EngineFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_binary_is_launch_error() {
        let dir = tempfile::tempdir().unwrap();
        let engine = Engine::new("/nonexistent-engine-binary");
        let script = dir.path().join("sample.mif");
        std::fs::write(&script, "# MIF 2.1\n").unwrap();

        let err = engine.run(&script, dir.path()).await.unwrap_err();
        assert!(matches!(err, DriveError::EngineLaunch { .. }));
    }

    #[tokio::test]
    async fn test_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let engine = Engine::new(fake_engine(dir.path(), "sleep 5"))
            .with_timeout(Duration::from_millis(100));
        let script = dir.path().join("sample.mif");
        std::fs::write(&script, "# MIF 2.1\n").unwrap();

        let err = engine.run(&script, dir.path()).await.unwrap_err();
        assert!(matches!(err, DriveError::EngineTimeout(_)));
    }

    #[tokio::test]
    async fn test_relative_script_path_resolves_before_chdir() {
        let bin = tempfile::tempdir().unwrap();
        // The engine only succeeds if the script argument it receives
        // still points at an existing file after the chdir.
        let engine = Engine::new(fake_engine(bin.path(), "[ -f \"$1\" ] || exit 7\nexit 0"));

        let work = tempfile::tempdir_in(".").unwrap();
        let script = work.path().join("sample.mif");
        std::fs::write(&script, "# MIF 2.1\n").unwrap();
        assert!(script.is_relative());

        engine.run(&script, work.path()).await.unwrap();
    }

    #[tokio::test]
    async fn test_stderr_truncated_inside_multibyte_char() {
        let dir = tempfile::tempdir().unwrap();
        // Pad so the retention limit lands in the middle of a two-byte
        // character.
        let noise = format!("{}ééé", "a".repeat(STDERR_LIMIT - 1));
        let engine = Engine::new(fake_engine(
            dir.path(),
            &format!("printf '%s' '{noise}' >&2\nexit 1"),
        ));
        let script = dir.path().join("sample.mif");
        std::fs::write(&script, "# MIF 2.1\n").unwrap();

        let err = engine.run(&script, dir.path()).await.unwrap_err();
        match err {
            DriveError::EngineFailed { code, stderr } => {
                assert_eq!(code, 1);
                assert!(stderr.starts_with("aaa"));
                assert!(stderr.chars().count() <= STDERR_LIMIT);
            }
            other => panic!("expected EngineFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_timed_out_engine_is_killed() {
        let dir = tempfile::tempdir().unwrap();
        let engine = Engine::new(fake_engine(dir.path(), "sleep 1\ntouch late.txt"))
            .with_timeout(Duration::from_millis(100));
        let script = dir.path().join("sample.mif");
        std::fs::write(&script, "# MIF 2.1\n").unwrap();

        let err = engine.run(&script, dir.path()).await.unwrap_err();
        assert!(matches!(err, DriveError::EngineTimeout(_)));

        // The subprocess must be gone, not still running toward its
        // post-sleep write.
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(!dir.path().join("late.txt").exists());
    }
}
