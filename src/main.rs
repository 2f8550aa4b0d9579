// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! lighthttp CLI
//!
//! Issues a single request with a configured browser and prints the
//! response.

use std::env;
use std::process::ExitCode;

use anyhow::{anyhow, bail, Context};
use lighthttp::{
    BrowserConfig, DefaultWebBrowser, EntityEnclosingWebRequest, WebBrowser, WebRequest,
    WebResponse,
};

#[derive(Debug, Default)]
struct Options {
    headers: Vec<(String, String)>,
    charset: Option<String>,
    config: Option<String>,
    positional: Vec<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("lighthttp=info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    let result = match args[1].as_str() {
        "get" => run(false, &args[2..]).await,
        "post" => run(true, &args[2..]).await,
        "--help" | "-h" | "help" => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        "--version" | "-v" | "version" => {
            println!("lighthttp {}", lighthttp::VERSION);
            return ExitCode::SUCCESS;
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            return ExitCode::from(1);
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn print_usage() {
    println!(
        r#"lighthttp - Stateful HTTP client

USAGE:
    lighthttp <COMMAND> [OPTIONS]

COMMANDS:
    get <url>                       Send a GET request
    post <url> [name=value...]      Send a url-encoded POST request
    help                            Show this help message
    version                         Show version information

OPTIONS:
    --header <name:value>           Add a request header (repeatable)
    --charset <label>               Decode the response body with this charset
    --config <file>                 Load browser settings from a JSON file

EXAMPLES:
    lighthttp get https://example.com
    lighthttp get https://example.com/ru --charset windows-1251
    lighthttp post https://example.com/login user=alice password=secret
"#
    );
}

fn parse_options(args: &[String]) -> anyhow::Result<Options> {
    let mut options = Options::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--header" => {
                let value = iter.next().ok_or_else(|| anyhow!("--header needs a value"))?;
                let (name, value) = value
                    .split_once(':')
                    .ok_or_else(|| anyhow!("header must look like name:value, got {}", value))?;
                options
                    .headers
                    .push((name.trim().to_string(), value.trim().to_string()));
            }
            "--charset" => {
                let value = iter.next().ok_or_else(|| anyhow!("--charset needs a value"))?;
                options.charset = Some(value.clone());
            }
            "--config" => {
                let value = iter.next().ok_or_else(|| anyhow!("--config needs a value"))?;
                options.config = Some(value.clone());
            }
            flag if flag.starts_with("--") => bail!("unknown option {}", flag),
            _ => options.positional.push(arg.clone()),
        }
    }

    Ok(options)
}

async fn run(post: bool, args: &[String]) -> anyhow::Result<ExitCode> {
    let options = parse_options(args)?;
    let (url, params) = options
        .positional
        .split_first()
        .ok_or_else(|| anyhow!("missing <url>"))?;

    let config = match &options.config {
        Some(path) => BrowserConfig::from_json_file(path)
            .with_context(|| format!("failed to load config {}", path))?,
        None => BrowserConfig::browser_like(),
    };
    let browser = DefaultWebBrowser::with_config(config);

    let mut request: WebRequest = if post {
        let mut request = EntityEnclosingWebRequest::post(url.as_str());
        for param in params {
            let (name, value) = param
                .split_once('=')
                .ok_or_else(|| anyhow!("param must look like name=value, got {}", param))?;
            request.add_form_param(name, value);
        }
        request.into()
    } else {
        if !params.is_empty() {
            bail!("get takes a single <url>");
        }
        WebRequest::get(url.as_str())
    };

    request.add_headers(options.headers);

    let response = match &options.charset {
        Some(charset) => browser.execute_with_charset(&request, charset).await?,
        None => browser.execute(&request).await?,
    };

    print_response(&response)?;

    for cookie in browser.cookies() {
        println!(
            "Cookie: {}={} (domain {}, path {})",
            cookie.name, cookie.value, cookie.domain, cookie.path
        );
    }

    Ok(if response.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    })
}

fn print_response(response: &WebResponse) -> anyhow::Result<()> {
    println!("=== Response ===");
    println!("Status: {}", response.status());
    println!("URL: {}", response.url());
    if response.redirected() {
        println!("Redirected: yes");
    }
    println!("Content-Type: {:?}", response.content_type());
    println!("Size: {} bytes", response.body_len());
    println!("Time: {}ms", response.response_time_ms());

    println!("\n=== Headers ===");
    for (name, value) in response.header_map() {
        println!("{}: {}", name, value.to_str().unwrap_or("<binary>"));
    }

    println!("\n=== Body ===");
    println!("{}", response.text()?);
    Ok(())
}
