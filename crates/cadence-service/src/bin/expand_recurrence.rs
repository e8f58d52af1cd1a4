use std::io::Read;

use anyhow::Context;
use cadence_core::config::load_config;
use cadence_core::telemetry::{apply_logging_config, init_tracing};
use cadence_recurrence::recurrence::{
    ExpansionOptions, RecurrenceInput, calculated_end_time, occurrences_with_options,
    parse_recurrence_input, text_value,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExpandRequest {
    recurrence: RecurrenceInput,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExpandResponse {
    description: String,
    calculated_end_time: DateTime<Utc>,
    occurrences: Vec<DateTime<Utc>>,
}

fn main() -> anyhow::Result<()> {
    let filter_handle = init_tracing()?;

    let config = load_config()?;
    tracing::debug!(config = ?config, "Configuration loaded");
    apply_logging_config(&filter_handle, &config.logging);

    let mut body = String::new();
    std::io::stdin()
        .read_to_string(&mut body)
        .context("Failed to read request from stdin")?;
    let mut request: ExpandRequest =
        serde_json::from_str(&body).context("Request is not a valid expansion request")?;

    if request
        .recurrence
        .timezone
        .as_deref()
        .is_none_or(|tz| tz.trim().is_empty())
    {
        request.recurrence.timezone = Some(config.recurrence.default_timezone.clone());
    }

    let recurrence = match parse_recurrence_input(&request.recurrence) {
        Ok(recurrence) => recurrence,
        Err(errors) => {
            println!("{}", serde_json::to_string_pretty(&errors)?);
            anyhow::bail!("Recurrence is invalid: {errors}");
        }
    };

    let occurrences = occurrences_with_options(
        &recurrence,
        request.window_start,
        request.window_end,
        ExpansionOptions::from(&config.recurrence),
    )?;
    tracing::info!(count = occurrences.len(), "Expanded recurrence");

    let response = ExpandResponse {
        description: text_value(&recurrence),
        calculated_end_time: calculated_end_time(&recurrence)?,
        occurrences,
    };
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
