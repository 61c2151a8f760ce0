//! Matting provider
//!
//! The pretrained background-removal model is an external collaborator.
//! The pipeline only sees the [`MattingProvider`] trait; a process-wide
//! handle is created once at start-up and injected.
//!
//! [`CommandMatting`] drives a `rembg`-compatible executable over temporary
//! PNG files. Invocations are serialized through a mutex. One wall-clock
//! deadline covers both waiting for the mutex and running the child, which
//! is killed once it passes. The child's stderr is kept in the temporary
//! directory and its tail is reported on failure.

use image::RgbaImage;
use std::ffi::OsString;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::{Mutex, MutexGuard, TryLockError};
use std::time::{Duration, Instant};

use super::types::MattingError;

// ============================================================
// Constants
// ============================================================

/// Default executable looked up on `PATH`
pub const DEFAULT_MATTING_COMMAND: &str = "rembg";

/// Default matting timeout in seconds
pub const DEFAULT_MATTING_TIMEOUT_SECS: u64 = 30;

/// Default alpha-matting foreground threshold (0-255)
pub const DEFAULT_FOREGROUND_THRESHOLD: u8 = 240;

/// Default alpha-matting background threshold (0-255)
pub const DEFAULT_BACKGROUND_THRESHOLD: u8 = 10;

/// Default alpha-matting erosion size in pixels
pub const DEFAULT_ERODE_SIZE: u32 = 10;

/// Child status and lock poll interval
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Bytes of child stderr carried into a failure message
const STDERR_TAIL_BYTES: usize = 500;

// ============================================================
// Types
// ============================================================

/// Alpha-matting refinement parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MattingParams {
    /// Enable alpha-matting refinement of the model output
    pub alpha_matting: bool,
    /// Trimap foreground threshold
    pub foreground_threshold: u8,
    /// Trimap background threshold
    pub background_threshold: u8,
    /// Trimap erosion size
    pub erode_size: u32,
}

impl Default for MattingParams {
    fn default() -> Self {
        Self {
            alpha_matting: true,
            foreground_threshold: DEFAULT_FOREGROUND_THRESHOLD,
            background_threshold: DEFAULT_BACKGROUND_THRESHOLD,
            erode_size: DEFAULT_ERODE_SIZE,
        }
    }
}

/// Background-removal collaborator
///
/// Implementations must be callable from many request threads at once.
pub trait MattingProvider: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &str;

    /// Whether the provider was initialized and can be called
    fn is_available(&self) -> bool {
        true
    }

    /// Remove the background from `roi`, returning an RGBA image of the
    /// same size whose alpha marks the object.
    fn matte(&self, roi: &RgbaImage, params: &MattingParams) -> Result<RgbaImage, MattingError>;
}

// ============================================================
// NoMatting
// ============================================================

/// Provider used when no matting model is installed
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMatting;

impl MattingProvider for NoMatting {
    fn name(&self) -> &str {
        "none"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn matte(&self, _roi: &RgbaImage, _params: &MattingParams) -> Result<RgbaImage, MattingError> {
        Err(MattingError::Unavailable("no matting model configured".to_string()))
    }
}

// ============================================================
// CommandMatting
// ============================================================

/// Matting through an external `rembg`-style executable
#[derive(Debug)]
pub struct CommandMatting {
    program: PathBuf,
    model: Option<String>,
    timeout: Duration,
    lock: Mutex<()>,
}

impl CommandMatting {
    /// Wrap the executable at `program`
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            model: None,
            timeout,
            lock: Mutex::new(()),
        }
    }

    /// Look `command` up on `PATH`
    pub fn discover(command: &str, timeout: Duration) -> Option<Self> {
        match which::which(command) {
            Ok(path) => {
                tracing::info!(program = %path.display(), "matting executable found");
                Some(Self::new(path, timeout))
            }
            Err(e) => {
                tracing::info!(command, error = %e, "matting executable not found");
                None
            }
        }
    }

    /// Select a named model (`-m <model>`)
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Command-line arguments for one invocation
    fn args(&self, params: &MattingParams, input: &Path, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["i".into()];

        if let Some(model) = &self.model {
            args.push("-m".into());
            args.push(model.into());
        }

        if params.alpha_matting {
            args.push("-a".into());
            args.push("-af".into());
            args.push(params.foreground_threshold.to_string().into());
            args.push("-ab".into());
            args.push(params.background_threshold.to_string().into());
            args.push("-ae".into());
            args.push(params.erode_size.to_string().into());
        }

        args.push(input.as_os_str().to_owned());
        args.push(output.as_os_str().to_owned());
        args
    }

    /// Take the shared handle, giving up at `deadline`
    fn acquire(&self, deadline: Instant) -> Result<MutexGuard<'_, ()>, MattingError> {
        loop {
            match self.lock.try_lock() {
                Ok(guard) => return Ok(guard),
                // A poisoned lock only means an earlier call panicked
                Err(TryLockError::Poisoned(poisoned)) => return Ok(poisoned.into_inner()),
                Err(TryLockError::WouldBlock) => {}
            }

            if Instant::now() >= deadline {
                tracing::warn!("matting handle busy until deadline");
                return Err(MattingError::Timeout(self.timeout.as_secs()));
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }

    /// Run the child process, killing it at `deadline`
    fn run(
        &self,
        args: &[OsString],
        stderr_log: &Path,
        deadline: Instant,
    ) -> Result<(), MattingError> {
        let stderr = File::create(stderr_log)?;
        let mut child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::from(stderr))
            .spawn()
            .map_err(|e| MattingError::Unavailable(format!("{}: {}", self.program.display(), e)))?;

        loop {
            if let Some(status) = child.try_wait()? {
                if status.success() {
                    return Ok(());
                }
                let mut message = format!("{} exited with {}", self.program.display(), status);
                if let Some(tail) = stderr_tail(stderr_log) {
                    message.push_str(": ");
                    message.push_str(&tail);
                }
                return Err(MattingError::Failed(message));
            }

            if Instant::now() >= deadline {
                let _ = child.kill();
                let _ = child.wait();
                return Err(MattingError::Timeout(self.timeout.as_secs()));
            }

            std::thread::sleep(POLL_INTERVAL);
        }
    }
}

/// Trimmed end of a captured stderr file, if it holds anything
fn stderr_tail(path: &Path) -> Option<String> {
    let bytes = std::fs::read(path).ok()?;
    let start = bytes.len().saturating_sub(STDERR_TAIL_BYTES);
    let tail = String::from_utf8_lossy(&bytes[start..]).trim().to_string();
    (!tail.is_empty()).then_some(tail)
}

impl MattingProvider for CommandMatting {
    fn name(&self) -> &str {
        "command"
    }

    fn matte(&self, roi: &RgbaImage, params: &MattingParams) -> Result<RgbaImage, MattingError> {
        let deadline = Instant::now() + self.timeout;
        let _guard = self.acquire(deadline)?;

        let dir = tempfile::tempdir()?;
        let input = dir.path().join("input.png");
        let output = dir.path().join("output.png");

        roi.save(&input)
            .map_err(|e| MattingError::Failed(format!("failed to write input: {}", e)))?;

        let args = self.args(params, &input, &output);
        tracing::debug!(program = %self.program.display(), ?args, "running matting");
        self.run(&args, &dir.path().join("stderr.log"), deadline)?;

        let matte = image::open(&output)
            .map_err(|e| MattingError::Failed(format!("unreadable matting output: {}", e)))?
            .to_rgba8();

        Ok(matte)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matting_params_default() {
        let params = MattingParams::default();
        assert!(params.alpha_matting);
        assert_eq!(params.foreground_threshold, 240);
        assert_eq!(params.background_threshold, 10);
        assert_eq!(params.erode_size, 10);
    }

    #[test]
    fn test_no_matting_unavailable() {
        let provider = NoMatting;
        assert!(!provider.is_available());
        let result = provider.matte(&RgbaImage::new(2, 2), &MattingParams::default());
        assert!(matches!(result, Err(MattingError::Unavailable(_))));
    }

    #[test]
    fn test_command_args_with_alpha_matting() {
        let provider = CommandMatting::new("rembg", Duration::from_secs(5)).with_model("u2net");
        let args = provider.args(
            &MattingParams::default(),
            Path::new("/tmp/in.png"),
            Path::new("/tmp/out.png"),
        );
        let args: Vec<String> = args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            vec![
                "i", "-m", "u2net", "-a", "-af", "240", "-ab", "10", "-ae", "10", "/tmp/in.png",
                "/tmp/out.png"
            ]
        );
    }

    #[test]
    fn test_command_args_without_alpha_matting() {
        let provider = CommandMatting::new("rembg", Duration::from_secs(5));
        let params = MattingParams {
            alpha_matting: false,
            ..Default::default()
        };
        let args = provider.args(&params, Path::new("a.png"), Path::new("b.png"));
        assert_eq!(args.len(), 3);
    }

    #[test]
    fn test_missing_executable_is_unavailable() {
        let provider = CommandMatting::new(
            "/nonexistent/definitely-not-a-matting-tool",
            Duration::from_secs(1),
        );
        let result = provider.matte(&RgbaImage::new(2, 2), &MattingParams::default());
        assert!(matches!(result, Err(MattingError::Unavailable(_))));
    }

    #[test]
    fn test_discover_missing_command() {
        assert!(
            CommandMatting::discover("definitely-not-a-matting-tool-xyz", Duration::from_secs(1))
                .is_none()
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_executable_reports_failure() {
        let provider = CommandMatting::new("false", Duration::from_secs(5));
        let result = provider.matte(&RgbaImage::new(2, 2), &MattingParams::default());
        assert!(matches!(result, Err(MattingError::Failed(_))));
    }

    /// Executable shell script in `dir`
    #[cfg(unix)]
    fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[test]
    fn test_failure_carries_stderr_tail() {
        let dir = tempfile::tempdir().unwrap();
        let script = script(dir.path(), "broken.sh", "echo 'model weights missing' >&2\nexit 1");

        let provider = CommandMatting::new(&script, Duration::from_secs(5));
        let result = provider.matte(&RgbaImage::new(2, 2), &MattingParams::default());
        match result {
            Err(MattingError::Failed(message)) => {
                assert!(message.contains("model weights missing"), "{}", message);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_stderr_tail_keeps_the_end() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("stderr.log");

        std::fs::write(&log, "  \n").unwrap();
        assert_eq!(stderr_tail(&log), None);

        let long = format!("{}last line\n", "x".repeat(2 * STDERR_TAIL_BYTES));
        std::fs::write(&log, long).unwrap();
        let tail = stderr_tail(&log).unwrap();
        assert!(tail.ends_with("last line"));
        assert!(tail.len() <= STDERR_TAIL_BYTES);

        assert_eq!(stderr_tail(&dir.path().join("missing.log")), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_concurrent_callers_share_the_deadline() {
        let dir = tempfile::tempdir().unwrap();
        let script = script(dir.path(), "slow.sh", "sleep 5");
        let timeout = Duration::from_millis(500);
        let provider = CommandMatting::new(&script, timeout);

        let elapsed: Vec<(Duration, bool)> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    scope.spawn(|| {
                        let started = Instant::now();
                        let result =
                            provider.matte(&RgbaImage::new(2, 2), &MattingParams::default());
                        (started.elapsed(), matches!(result, Err(MattingError::Timeout(_))))
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        // Serialized deadlines would put the last caller near 4x the timeout
        for (took, timed_out) in elapsed {
            assert!(timed_out);
            assert!(took < timeout + Duration::from_millis(900), "took {:?}", took);
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_slow_executable_times_out() {
        // `sleep` rejects the rembg arguments on most systems, so wrap it in sh
        let dir = tempfile::tempdir().unwrap();
        let script = script(dir.path(), "slow.sh", "sleep 5");

        let provider = CommandMatting::new(&script, Duration::from_millis(200));
        let started = Instant::now();
        let result = provider.matte(&RgbaImage::new(2, 2), &MattingParams::default());
        assert!(matches!(result, Err(MattingError::Timeout(_))));
        assert!(started.elapsed() < Duration::from_secs(4));
    }
}
