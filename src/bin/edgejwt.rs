//! JWT token tool
//!
//! Resolves a token from the on-disk cache, re-acquiring it through the
//! browser auth flow when it is absent, expired, or `--renew` is given.
//! On success it prints a shell export line and writes the raw token to
//! stdout; both outputs are produced, which callers piping the token
//! should expect.

use clap::Parser;
use std::error::Error;
use std::io::Write;
use std::time::Duration;

use edgetools::cache::CacheStore;
use edgetools::cli::TokenCli;
use edgetools::secret::prompt::{auth_url, open_browser, prompt_line, prompt_masked};
use edgetools::secret::service::{
    SecretCacheService, DEFAULT_ENV_KEY, DEFAULT_EXPIRY_KEY, DEFAULT_TOKEN_TTL, RESOLVE_PATH_KEY,
};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = TokenCli::parse();

    let cache = CacheStore::new().ok_or("could not determine a cache directory")?;
    let service = SecretCacheService::new(cache);

    if let Some(env) = &cli.set_env {
        service.remember(DEFAULT_ENV_KEY, env)?;
    }
    if let Some(expiry) = cli.expiry {
        service.remember(DEFAULT_EXPIRY_KEY, &expiry.to_string())?;
    }

    if let Some(token) = &cli.set_token {
        let ttl = cli.expiry.map(Duration::from_secs).unwrap_or(DEFAULT_TOKEN_TTL);
        service.store_token(token, ttl)?;
        eprintln!("Token updated and cached.");
        return Ok(());
    }

    if cli.show {
        match service.peek_token() {
            Some(token) => println!("{}", token),
            None => eprintln!("No token cached."),
        }
        return Ok(());
    }

    let env = match &cli.env {
        Some(env) => env.clone(),
        None => service.remembered(DEFAULT_ENV_KEY, || {
            prompt_line("Default environment (ENV)")
        })?,
    };
    let resolve_path = service.remembered(RESOLVE_PATH_KEY, || {
        prompt_line("Resolve path (e.g., ID=123)")
    })?;
    let expiry = match cli.expiry {
        Some(secs) => Duration::from_secs(secs),
        None => service.default_expiry(|| prompt_line("Default expiry (seconds)"))?,
    };

    let token = service.resolve(cli.renew, expiry, || {
        let url = auth_url(&env, &resolve_path);
        if open_browser(&url).is_err() {
            eprintln!("Open this URL in your browser: {}", url);
        }
        prompt_masked("Paste the JWT token")
    })?;

    println!("export {}={}", cli.export_var(), token);
    print!("{}", token);
    std::io::stdout().flush()?;

    Ok(())
}
