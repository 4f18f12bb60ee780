pub mod io;

/// Reset SIGPIPE to default behavior (SIG_DFL).
/// Rust sets SIGPIPE to SIG_IGN by default, but a CLI tool whose stdout is
/// piped to a closed reader should die with exit code 141 (128 + 13) like
/// the classic utilities do. Call at the start of main().
#[inline]
pub fn reset_sigpipe() {
    #[cfg(unix)]
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }
}

/// Format an IO error message without the "(os error N)" suffix.
/// Rust's Display impl appends e.g. " (os error 2)" to "No such file or
/// directory"; user-facing diagnostics read better without it.
pub fn io_error_msg(e: &std::io::Error) -> String {
    match e.raw_os_error() {
        Some(raw) => std::io::Error::from_raw_os_error(raw)
            .to_string()
            .replace(&format!(" (os error {raw})"), ""),
        None => e.to_string(),
    }
}
