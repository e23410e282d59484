//! Interactive collaborators for token acquisition
//!
//! These are the side-effecting edges of the token flow: building the auth
//! URL, opening it in the default browser, and reading values from the
//! terminal. The service layer only ever sees them as injected callbacks.

use std::io::{self, BufRead, Write};
use std::process::Command;
use tracing::warn;

/// Builds the browser auth URL for an environment and resolve path
pub fn auth_url(env: &str, resolve_path: &str) -> String {
    format!("https://auth.{}.foo.net/{}", env, resolve_path)
}

/// Opens a URL in the user's default browser
///
/// Failure is not fatal to the token flow; the caller prints the URL so
/// the user can open it by hand.
pub fn open_browser(url: &str) -> io::Result<()> {
    #[cfg(target_os = "windows")]
    let mut command = {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", "", url]);
        c
    };

    #[cfg(target_os = "macos")]
    let mut command = {
        let mut c = Command::new("open");
        c.arg(url);
        c
    };

    #[cfg(all(unix, not(target_os = "macos")))]
    let mut command = {
        let mut c = Command::new("xdg-open");
        c.arg(url);
        c
    };

    command.spawn().map(|_| ()).map_err(|e| {
        warn!(url, error = %e, "could not open browser");
        e
    })
}

/// Prompts on stderr and reads one line from stdin
///
/// stderr carries the prompt so stdout stays reserved for the tool's
/// actual output (the export line and the raw token).
pub fn prompt_line(label: &str) -> io::Result<String> {
    eprint!("Enter value for {}: ", label);
    io::stderr().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line)
}

/// Prompts for the token with echo disabled
pub fn prompt_masked(label: &str) -> io::Result<String> {
    rpassword::prompt_password(format!("{}: ", label))
}
