//! Colored console output for the hub reader.
//!
//! Color scheme: blue+bold headers, cyan values, green success,
//! yellow warnings, dimmed secondary text.

use crate::codec::{QueryResult, ResultEnvelope, ResultType};
use crate::hub::{HubLayout, TddRecord};
use alloy_primitives::{Address, B256};
use colored::Colorize;
use std::collections::BTreeMap;

// ── Helpers ────────────────────────────────────────────────────────

/// Human-readable name of a result type.
pub fn describe_result_type(result_type: ResultType) -> &'static str {
    match result_type {
        ResultType::PositiveInteger => "positive integer",
        ResultType::PositiveDecimal => "positive decimal",
        ResultType::NegativeInteger => "negative integer",
        ResultType::NegativeDecimal => "negative decimal",
        ResultType::Text => "text",
    }
}

fn print_header(title: &str) {
    println!();
    println!("{}", format!("=== {title} ===").blue().bold());
}

// ── Codec ──────────────────────────────────────────────────────────

/// Print a decoded query result.
pub fn print_query_result(value: &QueryResult) {
    print_header("Query result");
    println!("  Type:   {}", describe_result_type(value.result_type()).cyan());
    println!("  Value:  {}", value.to_string().cyan());
}

/// Print a decoded legacy envelope.
pub fn print_envelope(envelope: &ResultEnvelope) {
    print_query_result(&envelope.result);
    println!("  Request id: {}", format!("{}", envelope.request_id).cyan());
    println!("  Source rewards ({}):", envelope.rewards.len().to_string().cyan());
    for (i, reward) in envelope.rewards.iter().enumerate() {
        println!("    {}. {}", (i + 1).to_string().dimmed(), reward.to_string().cyan());
    }
}

/// Print an encoded payload.
pub fn print_encoded(payload: &str) {
    println!("{} 0x{}", "OK".green().bold(), payload.cyan());
}

// ── Hub ────────────────────────────────────────────────────────────

/// Print the hub's counters.
pub fn print_hub_summary(layout: &HubLayout, subset_size: u64, counter: u64, storager_length: u64) {
    print_header("Desmo LD hub");
    println!("  Contract:            {}", format!("{}", layout.contract).cyan());
    println!("  TDD subset size:     {}", subset_size.to_string().cyan());
    println!("  TDD counter:         {}", counter.to_string().cyan());
    println!("  TDD storager length: {}", storager_length.to_string().cyan());
}

/// Print the registered addresses.
pub fn print_registered(addresses: &[Address]) {
    print_header("Registered addresses");
    if addresses.is_empty() {
        println!("  {}", "none".dimmed());
    }
    for (i, addr) in addresses.iter().enumerate() {
        println!("    {}. {}", (i + 1).to_string().dimmed(), format!("{addr}").cyan());
    }
}

/// Print TDD records keyed by mapping key.
pub fn print_tdds(records: &BTreeMap<B256, TddRecord>) {
    print_header("TDD records");
    for (key, record) in records {
        println!("  {}", format!("{key}").dimmed());
        if record == &TddRecord::default() {
            println!("    {}", "not registered".yellow());
            continue;
        }
        let status = if record.disabled { "disabled".yellow() } else { "enabled".green() };
        println!("    URL:    {}", record.url.cyan());
        println!("    Owner:  {}", format!("{}", record.owner).cyan());
        println!("    Status: {status}");
        println!("    Score:  {}", record.score.to_string().cyan());
    }
}

/// Print the selected TDD lists keyed by request.
pub fn print_selected(selected: &BTreeMap<B256, Vec<String>>) {
    print_header("Selected TDDs");
    for (key, urls) in selected {
        println!("  {} ({})", format!("{key}").dimmed(), urls.len().to_string().cyan());
        for url in urls {
            println!("    - {}", url.cyan());
        }
    }
}

/// Print a warning line to stderr.
pub fn print_warning(message: &str) {
    eprintln!("  {} {message}", "WARNING:".yellow().bold());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_result_type_covers_every_tag() {
        let names: Vec<&str> =
            (0..=4).map(|tag| describe_result_type(ResultType::from_tag(tag).unwrap())).collect();
        assert_eq!(
            names,
            ["positive integer", "positive decimal", "negative integer", "negative decimal", "text"]
        );
    }
}
