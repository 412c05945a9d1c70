//! Command handlers.

use super::OutputFormat;
use bulwark::{BulwarkConfig, ProviderError, ResponseSnapshot, RetryableError, classify_response};
use serde_json::json;

/// Print the resolved requests-per-minute table.
pub fn show_limits(
    config: &BulwarkConfig,
    provider: Option<&str>,
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let limits = config.limits();
    let rows: Vec<(String, Option<u32>)> = match provider {
        Some(provider) => vec![(
            provider.to_ascii_lowercase(),
            limits.requests_per_minute(provider),
        )],
        None => limits
            .providers
            .keys()
            .map(|name| (name.clone(), limits.requests_per_minute(name)))
            .collect(),
    };

    match format {
        OutputFormat::Json => {
            let table: serde_json::Map<String, serde_json::Value> = rows
                .into_iter()
                .map(|(name, rpm)| (name, json!(rpm)))
                .collect();
            println!("{}", serde_json::to_string_pretty(&table)?);
        }
        OutputFormat::Human => {
            println!("{:<16} {:>8}", "PROVIDER", "RPM");
            for (name, rpm) in rows {
                let rpm = rpm.map_or_else(|| "none".to_string(), |rpm| rpm.to_string());
                println!("{:<16} {:>8}", name, rpm);
            }
        }
    }
    Ok(())
}

/// Classify a described HTTP response and print the result.
pub fn classify_response_command(
    status: u16,
    headers: &[String],
    body: Option<&str>,
    provider: &str,
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut response = ResponseSnapshot::new(status);
    for header in headers {
        let (name, value) = header
            .split_once(':')
            .ok_or_else(|| format!("invalid header '{}': expected NAME:VALUE", header))?;
        response = response.with_header(name.trim(), value.trim());
    }
    if let Some(body) = body {
        response = response.with_body(body);
    }

    let error = classify_response(&response, provider);
    print_error(&error, format)?;
    Ok(())
}

fn print_error(error: &ProviderError, format: &OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => {
            let value = json!({
                "kind": error.kind().name(),
                "retryable": error.is_retryable(),
                "message": error.message(),
                "code": error.code(),
                "provider": error.provider(),
                "retry_after": error.retry_after().map(|at| at.to_rfc3339()),
                "correlation_id": error.correlation_id(),
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Human => {
            println!("kind:           {}", error.kind().name());
            println!("retryable:      {}", error.is_retryable());
            println!("message:        {}", error.message());
            if let Some(code) = error.code() {
                println!("code:           {}", code);
            }
            if let Some(at) = error.retry_after() {
                println!("retry_after:    {}", at.to_rfc3339());
            }
            if let Some(id) = error.correlation_id() {
                println!("correlation_id: {}", id);
            }
        }
    }
    Ok(())
}

/// Print one sampled delay per retry of the configured policy.
pub fn show_backoff(
    config: &BulwarkConfig,
    count: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let policy = config.retry_policy()?;
    let count = count.unwrap_or_else(|| policy.max_attempts().saturating_sub(1));

    println!(
        "max_attempts={} initial={:?} max={:?} multiplier={}",
        policy.max_attempts(),
        policy.initial_delay(),
        policy.max_delay(),
        policy.multiplier()
    );
    for attempt in 0..count {
        println!("retry {:>3}: {:?}", attempt + 1, policy.next_delay(attempt));
    }
    Ok(())
}
