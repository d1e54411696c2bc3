use std::process::ExitCode;

use anyhow::{Result, bail};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};
use try_tuple::{BoxError, IntoTuple, TryAsync, TryConfig, TrySync};
use url::Url;

const USAGE: &str = "usage: try-demo parse <json> | try-demo fetch <http-url>";

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt::init();
    let label = std::env::var("TRY_LABEL").ok();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (command, input) = match args.as_slice() {
        [command, input] => (command.as_str(), input.clone()),
        _ => {
            eprintln!("{USAGE}");
            return Ok(ExitCode::from(2));
        }
    };

    let config = TryConfig::builder()
        .maybe_label(label)
        .build();

    info!(command = %command, label = %config.label(), "Running wrapped operation");

    let failure = match command {
        "parse" => parse(&input, config)?,
        "fetch" => fetch(input, config).await?,
        _ => {
            eprintln!("{USAGE}");
            return Ok(ExitCode::from(2));
        }
    };

    match failure {
        Some(err) => {
            warn!(error = %err, "Operation failed");
            eprintln!("error: {err}");
            Ok(ExitCode::FAILURE)
        }
        None => Ok(ExitCode::SUCCESS),
    }
}

/// Parse `input` as JSON, printing the value. Returns the failure, if any.
fn parse(input: &str, config: TryConfig) -> Result<Option<BoxError>> {
    let (error, json) = TrySync::with_config(serde_json::from_str::<Value>, config)
        .call((input,))
        .into_tuple();

    if let Some(err) = error {
        if let Some(json_err) = err.downcast_ref::<serde_json::Error>() {
            debug!(category = ?json_err.classify(), line = json_err.line(), "JSON rejected");
        }
        return Ok(Some(err));
    }

    match json {
        Some(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        None => bail!("wrapped call produced neither a value nor an error"),
    }

    Ok(None)
}

/// GET `input`, printing the status line. Returns the failure, if any.
async fn fetch(input: String, config: TryConfig) -> Result<Option<BoxError>> {
    let (error, status_line) = TryAsync::with_config(get_status_line, config)
        .call((input,))
        .await
        .into_tuple();

    if let Some(err) = error {
        return Ok(Some(err));
    }

    match status_line {
        Some(status_line) => println!("{}", status_line.trim_end()),
        None => bail!("wrapped call produced neither a value nor an error"),
    }

    Ok(None)
}

/// Plain HTTP/1.1 GET returning the response's status line.
async fn get_status_line(input: String) -> Result<String, BoxError> {
    let url = Url::parse(&input)?;
    if url.scheme() != "http" {
        return Err(format!("unsupported scheme '{}', only http is supported", url.scheme()).into());
    }

    let host = url.host_str().ok_or("url has no host")?;
    let port = url.port_or_known_default().unwrap_or(80);

    debug!(host = %host, port = port, path = %url.path(), "Connecting");

    let mut stream = TcpStream::connect((host, port)).await?;
    let request = format!(
        "GET {} HTTP/1.1\r\nHost: {host}\r\nConnection: close\r\n\r\n",
        url.path()
    );
    stream.write_all(request.as_bytes()).await?;

    let mut status_line = String::new();
    BufReader::new(stream).read_line(&mut status_line).await?;

    Ok(status_line)
}
