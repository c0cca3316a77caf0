//! Minimal metrics registry for the client.
//!
//! Per-command counters are keyed by command name in a `DashMap`; scalar
//! counters are plain atomics. Rendering follows the Prometheus text
//! exposition format with labels sorted for deterministic output.

use dashmap::DashMap;
use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

/// Counter partitioned by a single `command` label.
#[derive(Default)]
pub struct CommandCounter {
    map: DashMap<String, AtomicU64>,
}

impl CommandCounter {
    pub fn inc(&self, command: &str) {
        if let Some(counter) = self.map.get(command) {
            counter.fetch_add(1, Ordering::Relaxed);
            return;
        }
        self.map
            .entry(command.to_string())
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self, command: &str) -> u64 {
        self.map
            .get(command)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.map.iter().map(|c| c.value().load(Ordering::Relaxed)).sum()
    }

    fn render(&self, name: &str, out: &mut String) {
        let _ = writeln!(out, "# TYPE {} counter", name);
        let mut rows: Vec<(String, u64)> = self
            .map
            .iter()
            .map(|r| (r.key().clone(), r.value().load(Ordering::Relaxed)))
            .collect();
        rows.sort();
        for (command, val) in rows {
            let _ = writeln!(out, "{}{{command=\"{}\"}} {}", name, escape_label(&command), val);
        }
    }
}

#[derive(Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    fn render(&self, name: &str, out: &mut String) {
        let _ = writeln!(out, "# TYPE {} counter", name);
        let _ = writeln!(out, "{} {}", name, self.get());
    }
}

/// Counters kept by one client.
#[derive(Default)]
pub struct ClientMetrics {
    /// Envelopes written to the transport, by command.
    pub sent: CommandCounter,
    /// Envelopes decoded from the transport, by command.
    pub received: CommandCounter,
    /// Invocations naming an action that was not registered.
    pub unknown_actions: Counter,
    /// Invocations whose validation failed.
    pub rejected_actions: Counter,
    /// Invocations whose `execute` completed.
    pub executed_actions: Counter,
    /// Frames or payloads that could not be decoded.
    pub decode_failures: Counter,
    /// Asynchronous errors dropped because the error stream was full.
    pub dropped_errors: Counter,
}

impl ClientMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prometheus text exposition.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.sent.render("neuro_messages_sent_total", &mut out);
        self.received.render("neuro_messages_received_total", &mut out);
        self.unknown_actions.render("neuro_unknown_actions_total", &mut out);
        self.rejected_actions.render("neuro_rejected_actions_total", &mut out);
        self.executed_actions.render("neuro_executed_actions_total", &mut out);
        self.decode_failures.render("neuro_decode_failures_total", &mut out);
        self.dropped_errors.render("neuro_dropped_errors_total", &mut out);
        out
    }
}
