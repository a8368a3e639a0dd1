//! Same lifecycle as `todo-client`, driven through the HTTP/JSON gateway.
//!
//! ```text
//! todo-rest-client --server http://127.0.0.1:8080
//! ```

use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use clap::Parser;
use core_config::{Environment, tracing::init_tracing};
use eyre::{Result, WrapErr, eyre};
use reqwest::{Client, RequestBuilder};
use serde_json::{Value, json};
use tracing::info;

const API_VERSION: &str = "v1";
const CALL_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Parser, Debug)]
#[command(name = "todo-rest-client", about = "Exercise the ToDo HTTP gateway end to end")]
struct Args {
    /// Base URL of the HTTP gateway
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    server: String,
}

fn entities_url(server: &str) -> String {
    format!("{}/v1/entities", server.trim_end_matches('/'))
}

/// Send `request`, log status and body, and return the body as JSON.
async fn call(op: &str, request: RequestBuilder) -> Result<Value> {
    let response = request
        .send()
        .await
        .wrap_err_with(|| format!("{op} failed"))?;
    let status = response.status();
    let body = response
        .text()
        .await
        .wrap_err_with(|| format!("{op}: failed to read response body"))?;
    info!(code = status.as_u16(), body = %body, "{op} response");

    if !status.is_success() {
        return Err(eyre!("{op} returned {status}"));
    }
    serde_json::from_str(&body).wrap_err_with(|| format!("{op}: response is not JSON"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&Environment::Development);

    let base = entities_url(&args.server);
    let client = Client::builder()
        .timeout(CALL_TIMEOUT)
        .build()
        .wrap_err("Failed to build HTTP client")?;

    let now = Utc::now();
    let reminder = (now + chrono::Duration::hours(1)).to_rfc3339_opts(SecondsFormat::Nanos, true);
    let now = now.to_rfc3339_opts(SecondsFormat::Nanos, true);

    let created = call(
        "Create",
        client.post(&base).json(&json!({
            "api": API_VERSION,
            "toDo": {
                "title": "title",
                "description": "description",
                "reminder": reminder,
                "status": "Started",
                "estimatedTimeOfCompletion": now,
                "actualTimeOfCompletion": now,
            }
        })),
    )
    .await?;
    // int64 travels as a JSON string
    let id = created["id"]
        .as_str()
        .ok_or_else(|| eyre!("Create returned no id"))?
        .to_string();

    let read = call(
        "Read",
        client
            .get(format!("{base}/{id}"))
            .query(&[("api", API_VERSION)]),
    )
    .await?;

    let mut completed = read["toDo"].clone();
    if !completed.is_object() {
        return Err(eyre!("Read returned no ToDo"));
    }
    completed["status"] = json!("Completed");
    completed["description"] = json!(format!(
        "{} (updated)",
        completed["description"].as_str().unwrap_or_default()
    ));

    call(
        "Update",
        client
            .put(format!("{base}/{id}"))
            .json(&json!({ "api": API_VERSION, "toDo": completed })),
    )
    .await?;

    call(
        "ReadAll",
        client
            .get(format!("{base}/all"))
            .query(&[("api", API_VERSION)]),
    )
    .await?;

    call(
        "Delete",
        client
            .delete(format!("{base}/{id}"))
            .query(&[("api", API_VERSION)]),
    )
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entities_url_ignores_trailing_slash() {
        assert_eq!(entities_url("http://127.0.0.1:8080"), "http://127.0.0.1:8080/v1/entities");
        assert_eq!(entities_url("http://127.0.0.1:8080/"), "http://127.0.0.1:8080/v1/entities");
    }

    #[test]
    fn test_args_default_to_local_gateway() {
        let args = Args::parse_from(["todo-rest-client"]);
        assert_eq!(args.server, "http://127.0.0.1:8080");
    }
}
