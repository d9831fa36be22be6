use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use xframe::wire::{message_type, Envelope, FrameIdentity};
use xframe::SimulationReport;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct EnvelopeOutput<'a> {
    type_name: &'static str,
    event_count: usize,
    #[serde(flatten)]
    envelope: &'a Envelope,
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
}

fn data_preview(envelope: &Envelope) -> String {
    match &envelope.data {
        Some(serde_json::Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

pub fn print_envelope(envelope: &Envelope, format: OutputFormat) {
    let type_name = message_type::type_name(&envelope.msg_type);
    let events = envelope.events.as_deref().unwrap_or_default();

    match format {
        OutputFormat::Json => {
            let out = EnvelopeOutput {
                type_name,
                event_count: envelope.event_count(),
                envelope,
            };
            println!("{}", to_json(&out));
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["TYPE", "SENTINEL", "TRANSPORT", "MESSAGE"]);
            if events.is_empty() {
                table.add_row(vec![
                    type_name.to_string(),
                    envelope.sentinel.to_string(),
                    String::new(),
                    data_preview(envelope),
                ]);
            }
            for event in events {
                table.add_row(vec![
                    type_name.to_string(),
                    envelope.sentinel.to_string(),
                    event.transport_id.to_string(),
                    event.message.clone(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "type={} ({}) sentinel={} events={}",
                envelope.msg_type,
                type_name,
                envelope.sentinel,
                envelope.event_count()
            );
            for event in events {
                println!("  [{}] {}", event.transport_id, event.message);
            }
            if envelope.data.is_some() {
                println!("  data={}", data_preview(envelope));
            }
        }
        OutputFormat::Raw => {
            for event in events {
                println!("{}", event.message);
            }
            if envelope.data.is_some() {
                println!("{}", data_preview(envelope));
            }
        }
    }
}

pub fn print_identity(identity: &FrameIdentity, payload: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json | OutputFormat::Raw => println!("{payload}"),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["SENTINEL", "SCRIPT SRC", "PAYLOAD"])
                .add_row(vec![
                    identity.sentinel.to_string(),
                    identity.script_src.clone().unwrap_or_else(|| "-".to_string()),
                    payload.to_string(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "sentinel={} script_src={} payload={}",
                identity.sentinel,
                identity.script_src.as_deref().unwrap_or("-"),
                payload
            );
        }
    }
}

pub fn print_report(report: &SimulationReport, format: OutputFormat) {
    match format {
        OutputFormat::Json => println!("{}", to_json(report)),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["VENDOR", "TRANSPORT", "EVENTS", "MESSAGES"]);
            for batch in &report.batches {
                table.add_row(vec![
                    batch.vendor.clone(),
                    batch.transport_id.clone(),
                    batch.events.len().to_string(),
                    batch.events.join(", "),
                ]);
            }
            println!("{table}");
            println!(
                "posted={} frames_created={} frames_remaining={}",
                report.posted_messages, report.frames_created, report.frames_remaining
            );
            for error in &report.reported_errors {
                println!("reported: {error}");
            }
        }
        OutputFormat::Pretty => {
            for batch in &report.batches {
                println!(
                    "vendor={} transport={} events=[{}]",
                    batch.vendor,
                    batch.transport_id,
                    batch.events.join(", ")
                );
            }
            println!(
                "posted={} frames_created={} frames_remaining={}",
                report.posted_messages, report.frames_created, report.frames_remaining
            );
            for error in &report.reported_errors {
                println!("reported: {error}");
            }
        }
        OutputFormat::Raw => {
            for batch in &report.batches {
                for event in &batch.events {
                    println!("{event}");
                }
            }
        }
    }
}
