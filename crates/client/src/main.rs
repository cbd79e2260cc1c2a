//! # Parallax Dashboard Entry Point
//!
//! Line-oriented dashboard over the Parallax client. Glue only: every
//! piece of state-machine behavior lives in the library modules.
//!
//! ## Usage
//!
//! ```text
//! parallax-dash [config.toml]
//! ```
//!
//! Configuration precedence: defaults → optional TOML file argument →
//! `PARALLAX_*` environment variables.
//!
//! ## Commands
//!
//! - any other line — submitted as a query
//! - `:metrics` — print the current fleet metrics view
//! - `:history` — print the timeline
//! - `:quit` — stop the poller and exit

use std::env;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use parallax_client::{
    HttpInferenceClient, HttpMetricsClient, MetricsPoller, MetricsView, QueryClient,
    SessionStore, SubmitOutcome, TimelineEntry,
};
use parallax_common::ClientConfig;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();

    let mut config = match env::args().nth(1) {
        Some(path) => ClientConfig::load_from_file(&path)?,
        None => ClientConfig::default(),
    };
    config.apply_env();

    let session = SessionStore::new(&config.session_dir).get_or_create();
    info!(
        "session {} ({})",
        session.id,
        if session.durable { "durable" } else { "ephemeral" }
    );

    let timeout = Duration::from_millis(config.request_timeout_ms);
    let inference = Arc::new(HttpInferenceClient::new(
        config.inference_addr.as_str(),
        timeout,
    )?);
    let metrics = Arc::new(HttpMetricsClient::new(config.metrics_addr.as_str(), timeout)?);

    let client = Arc::new(QueryClient::new(
        inference,
        session,
        config.model_id.clone(),
        config.return_dacert,
    ));

    // History is applied before the prompt is reachable, so no
    // submission can race the session's initial fetch.
    match client.load_history().await {
        Ok(n) => {
            if n > 0 {
                println!("restored {} prior responses", n);
            }
        }
        Err(e) => warn!("history fetch failed, starting with an empty timeline: {}", e),
    }

    let poller = Arc::new(MetricsPoller::new(
        metrics,
        Duration::from_millis(config.poll_interval_ms),
    ));
    let view = poller.view_handle();
    let handle = Arc::clone(&poller).start();

    println!("parallax dashboard ready — type a query, :metrics, :history, or :quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "" => continue,
            ":quit" => break,
            ":metrics" => print_metrics(&view.read()),
            ":history" => {
                for entry in client.timeline() {
                    print_entry(&entry);
                }
            }
            query => match client.submit(query).await {
                Ok(SubmitOutcome::Accepted) => {
                    if let Some(entry) = client.timeline().into_iter().next() {
                        print_entry(&entry);
                    }
                }
                Ok(SubmitOutcome::RejectedBusy) => {
                    println!("a query is already running, try again in a moment");
                }
                Ok(SubmitOutcome::RejectedEmpty) => {}
                Err(e) => println!("query failed ({}); your input was kept, press up to retry", e),
            },
        }
    }

    handle.stop().await;
    Ok(())
}

fn print_entry(entry: &TimelineEntry) {
    let r = &entry.response.result;
    println!(
        "[{}] {} -> {} (confidence {:.2}, model {}, attestation: {})",
        entry.response.task_id, r.input, r.output, r.confidence, r.model_id, entry.verdict
    );
}

fn print_metrics(view: &MetricsView) {
    let s = &view.snapshot;
    println!(
        "nodes {} | pending {} | completed {} | avg latency {:.2}s | uptime {}",
        s.registered_nodes, s.pending_tasks, s.completed_tasks, s.average_latency, s.system_uptime
    );
    for (model, count) in &s.model_usage {
        println!("  model {}: {} tasks", model, count);
    }
    for (id, node) in &view.nodes {
        println!("  node {}: [{}] last seen {}", id, node.capabilities.join(", "), node.last_seen);
    }
}
