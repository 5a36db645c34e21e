//! Headless Chrome/Chromium PDF backend.
//!
//! Each conversion runs one short-lived browser process inside a private
//! temporary directory:
//!
//! ```text
//! {tmp}/
//! +-- document.html    # input, loaded via file://
//! +-- document.pdf     # written by --print-to-pdf
//! +-- chrome.log       # browser stderr
//! +-- profile/         # throwaway --user-data-dir
//! ```
//!
//! The directory is removed when the conversion returns, and a browser that
//! outlives the timeout is killed and reaped.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::consts::{CHROME_CANDIDATES, CHROME_ENV, POLL_INTERVAL, STDERR_TAIL};
use crate::error::PdfError;
use crate::sink::{PdfOptions, PdfSink};

/// Spawn attempts when the binary is momentarily busy.
const SPAWN_ATTEMPTS: usize = 3;

/// [`PdfSink`] driving a headless Chrome/Chromium binary.
#[derive(Clone, Debug)]
pub struct ChromePdfSink {
    chrome: PathBuf,
}

impl ChromePdfSink {
    /// Use a specific browser binary.
    #[must_use]
    pub fn new(chrome: PathBuf) -> Self {
        Self { chrome }
    }

    /// Locate a browser binary.
    ///
    /// Order: the explicit path, then `CHROME_BIN`, then well-known names on
    /// `PATH`.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError::InvalidChromePath`] if an explicit path does not
    /// exist, or [`PdfError::ChromeNotFound`] if nothing is found.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, PdfError> {
        if let Some(path) = explicit {
            return resolve_program(path).map(Self::new);
        }

        if let Ok(value) = std::env::var(CHROME_ENV) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return resolve_program(Path::new(trimmed)).map(Self::new);
            }
        }

        CHROME_CANDIDATES
            .iter()
            .find_map(|name| find_in_path(name))
            .map(Self::new)
            .ok_or(PdfError::ChromeNotFound)
    }

    /// Browser binary in use.
    #[must_use]
    pub fn chrome(&self) -> &Path {
        &self.chrome
    }

    fn spawn(&self, args: &[String], log: &File) -> Result<Child, PdfError> {
        let mut attempt = 1;
        loop {
            let stderr = log
                .try_clone()
                .map_err(|e| PdfError::io("clone browser log handle", e))?;
            let result = Command::new(&self.chrome)
                .args(args)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::from(stderr))
                .spawn();

            match result {
                Ok(child) => return Ok(child),
                Err(e) if e.kind() == io::ErrorKind::ExecutableFileBusy && attempt < SPAWN_ATTEMPTS => {
                    attempt += 1;
                    thread::sleep(POLL_INTERVAL);
                }
                Err(e) => {
                    return Err(PdfError::io(
                        format!("failed to launch {}", self.chrome.display()),
                        e,
                    ));
                }
            }
        }
    }
}

impl PdfSink for ChromePdfSink {
    fn convert(&self, html: &str, options: &PdfOptions) -> Result<Vec<u8>, PdfError> {
        let workdir = tempfile::Builder::new()
            .prefix("quire-pdf-")
            .tempdir()
            .map_err(|e| PdfError::io("create temporary directory", e))?;

        let input = workdir.path().join("document.html");
        let output = workdir.path().join("document.pdf");
        let log_path = workdir.path().join("chrome.log");

        fs::write(&input, with_page_size(html, options))
            .map_err(|e| PdfError::io("write document", e))?;
        let log = File::create(&log_path).map_err(|e| PdfError::io("create browser log", e))?;

        let args = chrome_args(&workdir.path().join("profile"), &output, &input);
        tracing::debug!(chrome = %self.chrome.display(), ?args, "launching browser");

        let child = self.spawn(&args, &log)?;
        let status = wait_with_timeout(child, options.timeout)
            .inspect_err(|e| tracing::error!(error = %e, "browser did not finish"))?;

        if !status.success() {
            let err = PdfError::ChromeFailed {
                status: status.to_string(),
                stderr: stderr_tail(&log_path),
            };
            tracing::error!(error = %err, "PDF conversion failed");
            return Err(err);
        }

        let bytes = read_output(&output).inspect_err(|e| {
            tracing::error!(error = %e, log = %stderr_tail(&log_path), "browser wrote no PDF");
        })?;

        tracing::info!(bytes = bytes.len(), "generated PDF");
        Ok(bytes)
    }
}

/// Command-line flags for one print-to-PDF run.
fn chrome_args(profile: &Path, output: &Path, input: &Path) -> Vec<String> {
    vec![
        "--headless=new".to_owned(),
        "--disable-gpu".to_owned(),
        "--no-sandbox".to_owned(),
        "--disable-dev-shm-usage".to_owned(),
        "--hide-scrollbars".to_owned(),
        "--disable-background-networking".to_owned(),
        "--disable-component-update".to_owned(),
        "--disable-default-apps".to_owned(),
        "--disable-sync".to_owned(),
        "--no-first-run".to_owned(),
        "--no-default-browser-check".to_owned(),
        "--no-pdf-header-footer".to_owned(),
        "--run-all-compositor-stages-before-draw".to_owned(),
        format!("--user-data-dir={}", profile.display()),
        format!("--print-to-pdf={}", output.display()),
        format!("file://{}", input.display()),
    ]
}

/// Poll the child until it exits, killing it once `timeout` has elapsed.
fn wait_with_timeout(mut child: Child, timeout: Duration) -> Result<ExitStatus, PdfError> {
    let start = Instant::now();
    loop {
        if let Some(status) = child
            .try_wait()
            .map_err(|e| PdfError::io("poll browser status", e))?
        {
            return Ok(status);
        }
        if start.elapsed() >= timeout {
            let _ = child.kill();
            let _ = child.wait();
            return Err(PdfError::Timeout(timeout));
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Read the printed PDF. A missing or empty file means the browser wrote nothing.
fn read_output(path: &Path) -> Result<Vec<u8>, PdfError> {
    match fs::read(path) {
        Ok(bytes) if bytes.is_empty() => Err(PdfError::EmptyOutput),
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(PdfError::EmptyOutput),
        Err(e) => Err(PdfError::io("read generated PDF", e)),
    }
}

/// Append the paper-size rule so it overrides any earlier `@page` size.
fn with_page_size(html: &str, options: &PdfOptions) -> String {
    let css = options.page_css();
    match html.find("</head>") {
        Some(pos) => format!("{}{css}{}", &html[..pos], &html[pos..]),
        None => format!("{html}{css}"),
    }
}

fn stderr_tail(log_path: &Path) -> String {
    let log = fs::read_to_string(log_path).unwrap_or_default();
    let log = log.trim();
    let mut start = log.len().saturating_sub(STDERR_TAIL);
    while !log.is_char_boundary(start) {
        start += 1;
    }
    log[start..].to_owned()
}

fn resolve_program(program: &Path) -> Result<PathBuf, PdfError> {
    if program.is_absolute() || program.components().count() > 1 {
        return if program.is_file() {
            Ok(program.to_path_buf())
        } else {
            Err(PdfError::InvalidChromePath(program.to_path_buf()))
        };
    }
    program
        .to_str()
        .and_then(find_in_path)
        .ok_or_else(|| PdfError::InvalidChromePath(program.to_path_buf()))
}

fn find_in_path(program: &str) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chrome_args_print_flags() {
        let args = chrome_args(
            Path::new("/tmp/x/profile"),
            Path::new("/tmp/x/document.pdf"),
            Path::new("/tmp/x/document.html"),
        );
        assert_eq!(args[0], "--headless=new");
        assert!(args.contains(&"--no-pdf-header-footer".to_owned()));
        assert!(args.contains(&"--print-to-pdf=/tmp/x/document.pdf".to_owned()));
        assert_eq!(args.last().unwrap(), "file:///tmp/x/document.html");
    }

    #[test]
    fn test_with_page_size_in_head() {
        let html = with_page_size(
            "<html><head><style>@page { size: A4; }</style></head><body></body></html>",
            &PdfOptions::default().with_paper(8.5, 11.0),
        );
        let a4 = html.find("size: A4").unwrap();
        let letter = html.find("size: 8.5in 11in").unwrap();
        assert!(a4 < letter);
        assert!(letter < html.find("</head>").unwrap());
    }

    #[test]
    fn test_with_page_size_without_head() {
        let html = with_page_size("<p>x</p>", &PdfOptions::default());
        assert!(html.starts_with("<p>x</p><style>@page"));
    }

    #[test]
    fn test_read_output_missing_or_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let missing = temp_dir.path().join("document.pdf");
        assert!(matches!(read_output(&missing), Err(PdfError::EmptyOutput)));

        fs::write(&missing, b"").unwrap();
        assert!(matches!(read_output(&missing), Err(PdfError::EmptyOutput)));
    }

    #[test]
    fn test_read_output_propagates_io_error() {
        let temp_dir = tempfile::tempdir().unwrap();

        // A directory exists but cannot be read as a file
        let err = read_output(temp_dir.path()).unwrap_err();
        assert!(matches!(err, PdfError::Io { .. }));
        assert!(err.to_string().starts_with("read generated PDF"));
    }

    #[test]
    fn test_explicit_missing_path_rejected() {
        let err = ChromePdfSink::discover(Some(Path::new("/nonexistent/chrome"))).unwrap_err();
        assert!(matches!(err, PdfError::InvalidChromePath(_)));
    }

    #[test]
    fn test_stderr_tail_limits_length() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log = temp_dir.path().join("chrome.log");
        fs::write(&log, "x".repeat(STDERR_TAIL * 2)).unwrap();
        assert_eq!(stderr_tail(&log).len(), STDERR_TAIL);
        assert_eq!(stderr_tail(&temp_dir.path().join("missing.log")), "");
    }

    #[cfg(unix)]
    mod process {
        use std::os::unix::fs::PermissionsExt;

        use super::*;

        /// Write an executable shell script standing in for the browser.
        fn fake_chrome(dir: &Path, body: &str) -> PathBuf {
            let path = dir.join("fake-chrome");
            fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        const WRITES_PDF: &str = r#"for arg in "$@"; do
  case "$arg" in
    --print-to-pdf=*) printf '%%PDF-1.4 fake' > "${arg#--print-to-pdf=}" ;;
  esac
done"#;

        #[test]
        fn test_convert_returns_written_pdf() {
            let temp_dir = tempfile::tempdir().unwrap();
            let sink = ChromePdfSink::new(fake_chrome(temp_dir.path(), WRITES_PDF));

            let bytes = sink.convert("<p>hi</p>", &PdfOptions::default()).unwrap();
            assert_eq!(bytes, b"%PDF-1.4 fake");
        }

        #[test]
        fn test_convert_reports_failure_with_stderr() {
            let temp_dir = tempfile::tempdir().unwrap();
            let sink = ChromePdfSink::new(fake_chrome(temp_dir.path(), "echo 'boom' >&2\nexit 3"));

            let err = sink.convert("<p>hi</p>", &PdfOptions::default()).unwrap_err();
            match err {
                PdfError::ChromeFailed { stderr, .. } => assert_eq!(stderr, "boom"),
                other => panic!("unexpected error: {other}"),
            }
        }

        #[test]
        fn test_convert_without_output_is_empty() {
            let temp_dir = tempfile::tempdir().unwrap();
            let sink = ChromePdfSink::new(fake_chrome(temp_dir.path(), "exit 0"));

            let err = sink.convert("<p>hi</p>", &PdfOptions::default()).unwrap_err();
            assert!(matches!(err, PdfError::EmptyOutput));
        }

        #[test]
        fn test_convert_times_out_and_kills() {
            let temp_dir = tempfile::tempdir().unwrap();
            let sink = ChromePdfSink::new(fake_chrome(temp_dir.path(), "exec sleep 10"));
            let options = PdfOptions::default().with_timeout(Duration::from_millis(200));

            let start = Instant::now();
            let err = sink.convert("<p>hi</p>", &options).unwrap_err();

            assert!(matches!(err, PdfError::Timeout(_)));
            assert!(start.elapsed() < Duration::from_secs(5));
        }

        #[test]
        fn test_discover_explicit_path() {
            let temp_dir = tempfile::tempdir().unwrap();
            let chrome = fake_chrome(temp_dir.path(), "exit 0");

            let sink = ChromePdfSink::discover(Some(&chrome)).unwrap();
            assert_eq!(sink.chrome(), chrome.as_path());
        }
    }
}
