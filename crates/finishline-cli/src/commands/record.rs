use clap::Args;
use finishline_core::{Config, InsightsBackend};
use serde_json::{json, Map, Value};

#[derive(Args)]
pub struct RecordArgs {
    /// Raw event as a JSON object; flags below override its fields
    #[arg(long)]
    json: Option<String>,
    /// Stage kind: focus, shortBreak or longBreak
    #[arg(long)]
    mode: Option<String>,
    /// Planned stage length in seconds
    #[arg(long)]
    planned: Option<f64>,
    /// Seconds actually elapsed
    #[arg(long)]
    actual: Option<f64>,
    /// completed, skipped, reset, reconfigured or abandoned
    #[arg(long)]
    reason: Option<String>,
    /// Position in the focus/break cycle
    #[arg(long)]
    cycle: Option<u32>,
    /// Mark the stage as skipped
    #[arg(long)]
    skipped: bool,
    /// ISO-8601 start time
    #[arg(long)]
    started_at: Option<String>,
    /// ISO-8601 end time
    #[arg(long)]
    ended_at: Option<String>,
}

impl RecordArgs {
    /// Merge the JSON payload and the flags into one raw event.
    fn payload(&self) -> Result<Value, serde_json::Error> {
        let base = match &self.json {
            Some(text) => serde_json::from_str(text)?,
            None => Value::Object(Map::new()),
        };
        let mut fields = match base {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        let mut put = |key: &str, value: Value| {
            fields.insert(key.to_string(), value);
        };
        if let Some(mode) = &self.mode {
            put("mode", json!(mode));
        }
        if let Some(planned) = self.planned {
            put("plannedSeconds", json!(planned));
        }
        if let Some(actual) = self.actual {
            put("actualSeconds", json!(actual));
        }
        if let Some(reason) = &self.reason {
            put("reason", json!(reason));
        }
        if let Some(cycle) = self.cycle {
            put("cycleIndex", json!(cycle));
        }
        if self.skipped {
            put("wasSkipped", json!(true));
        }
        if let Some(started_at) = &self.started_at {
            put("startedAt", json!(started_at));
        }
        if let Some(ended_at) = &self.ended_at {
            put("endedAt", json!(ended_at));
        }

        Ok(Value::Object(fields))
    }
}

pub fn run(args: RecordArgs, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let payload = args.payload()?;
    let backend = InsightsBackend::from_config(config)?;

    match backend.record_session(&payload)? {
        Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
        None => println!("{}", json!({ "persisted": false })),
    }
    Ok(())
}
