//! env-http CLI: issue one request against a named environment.
//!
//! Usage:
//!   env-http-cli request <env> <method> <path> [key=value ...] [--timeout-ms <n>]
//!   env-http-cli list                          List known environments

use anyhow::{bail, Context};
use env_http::{
    create_requests_in, EnvironmentRegistry, HttpMethod, Params, RequestOptions, RequestOutcome,
};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    let result = match args[1].as_str() {
        "request" => cmd_request(&args[2..]).await,
        "list" => cmd_list(),
        "version" | "--version" | "-V" => {
            println!("env-http-cli {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn print_usage() {
    println!(
        r#"env-http-cli: environment-scoped HTTP requests

USAGE:
    env-http-cli <COMMAND> [OPTIONS]

COMMANDS:
    request <env> <method> <path> [key=value ...] [--timeout-ms <n>]
                                Send GET/POST/DELETE with form-encoded params
    list                        List known environments
    version                     Show version information
    help                        Show this help message

ENVIRONMENT:
    ENV_HTTP_REGISTRY           YAML file with extra environments
    ENV_HTTP_PROXY_URL          Proxy for all requests
    RUST_LOG                    Log filter (default: info)

Press Ctrl-C while a request is in flight to cancel it."#
    );
}

fn load_registry() -> anyhow::Result<EnvironmentRegistry> {
    let mut registry = EnvironmentRegistry::global().clone();
    if let Ok(path) = std::env::var("ENV_HTTP_REGISTRY") {
        let extra = EnvironmentRegistry::from_path(&path)
            .with_context(|| format!("loading registry from {path}"))?;
        registry.extend_from(extra)?;
    }
    Ok(registry)
}

fn cmd_list() -> anyhow::Result<()> {
    let registry = load_registry()?;
    for env in registry.iter() {
        println!("{:<16} {}", env.name, env.base_url);
    }
    Ok(())
}

async fn cmd_request(args: &[String]) -> anyhow::Result<()> {
    let [env, method, path, rest @ ..] = args else {
        bail!("usage: env-http-cli request <env> <method> <path> [key=value ...]");
    };
    let method: HttpMethod = method.parse()?;

    let mut params = Params::new();
    let mut options = RequestOptions::new();
    let mut iter = rest.iter();
    while let Some(arg) = iter.next() {
        if arg == "--timeout-ms" {
            let ms: u64 = iter
                .next()
                .context("--timeout-ms needs a value")?
                .parse()
                .context("--timeout-ms must be an integer")?;
            options = options.with_timeout(Duration::from_millis(ms));
            continue;
        }
        let Some((key, value)) = arg.split_once('=') else {
            bail!("expected key=value, got \"{arg}\"");
        };
        params.insert(key, value);
    }

    let registry = load_registry()?;
    let api = create_requests_in(&registry, env)?;
    let prepared = api.method(method).call(path, params, options);
    let cancel = prepared.cancel.clone();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    match prepared.res.execute().await? {
        RequestOutcome::Completed(resp) => {
            eprintln!("HTTP {}", resp.status);
            println!("{}", resp.text());
        }
        RequestOutcome::Cancelled => eprintln!("Request cancelled"),
    }
    Ok(())
}
