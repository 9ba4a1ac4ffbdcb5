//! Structured JSON-lines logging.
//!
//! Every record carries a run id, a monotonically increasing sequence number
//! and a domain so that aggregation rounds and report requests can be
//! reconstructed from the log alone. Records always go to stderr; when
//! `LOG_DIR` is set they are also written under `<LOG_DIR>/<run_id>/`.

use chrono::Utc;
use serde_json::{json, Map, Value};
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};
use std::time::Instant;

// =============================================================================
// Log Levels
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    Fatal = 5,
}

impl Level {
    pub fn from_env() -> Self {
        Self::parse(std::env::var("LOG_LEVEL").ok().as_deref())
    }

    /// Unknown or missing values mean `Info`.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("trace") => Level::Trace,
            Some("debug") => Level::Debug,
            Some("info") => Level::Info,
            Some("warn") => Level::Warn,
            Some("error") => Level::Error,
            Some("fatal") => Level::Fatal,
            _ => Level::Info,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Fatal => "fatal",
        }
    }
}

// =============================================================================
// Log Domains
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    Fetch,     // Single endpoint requests and decoding
    Aggregate, // Bulk rounds and view replacement
    Report,    // On-demand report lifecycle
    System,    // Startup, configuration
    Profile,   // Timing
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Fetch => "fetch",
            Domain::Aggregate => "aggregate",
            Domain::Report => "report",
            Domain::System => "system",
            Domain::Profile => "profile",
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled_in(std::env::var("LOG_DOMAINS").ok().as_deref())
    }

    /// `raw` is a comma-separated list or "all"; missing enables everything.
    pub fn enabled_in(&self, raw: Option<&str>) -> bool {
        match raw {
            Some("all") | None => true,
            Some(domains) => domains.split(',').any(|d| d.trim() == self.as_str()),
        }
    }
}

// =============================================================================
// Run context
// =============================================================================

static LOG_SEQ: AtomicU64 = AtomicU64::new(0);
static RUN_CONTEXT: OnceLock<RunContext> = OnceLock::new();

fn next_seq() -> u64 {
    LOG_SEQ.fetch_add(1, Ordering::SeqCst)
}

#[derive(Debug)]
struct RunContext {
    run_id: String,
    sink: Option<RunSink>,
}

/// File sink for one run: `events.jsonl`, `trace.jsonl` and `manifest.json`.
#[derive(Debug)]
pub struct RunSink {
    dir: PathBuf,
    events: Mutex<BufWriter<File>>,
    trace: Mutex<BufWriter<File>>,
}

impl RunSink {
    pub fn open(base: &Path, run_id: &str) -> std::io::Result<Self> {
        let dir = base.join(run_id);
        create_dir_all(&dir)?;
        std::fs::write(
            dir.join("manifest.json"),
            json!({
                "run_id": run_id,
                "ts": ts_now(),
                "pid": process::id(),
                "log_dir": dir.to_string_lossy(),
            })
            .to_string(),
        )?;
        let events = File::create(dir.join("events.jsonl"))?;
        let trace = File::create(dir.join("trace.jsonl"))?;
        Ok(Self {
            dir,
            events: Mutex::new(BufWriter::new(events)),
            trace: Mutex::new(BufWriter::new(trace)),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn write(&self, level: Level, line: &str) {
        let writer = match level {
            Level::Trace | Level::Debug => &self.trace,
            _ => &self.events,
        };
        if let Ok(mut w) = writer.lock() {
            let _ = writeln!(w, "{}", line);
            let _ = w.flush();
        }
    }
}

fn ensure_run_context() -> &'static RunContext {
    RUN_CONTEXT.get_or_init(|| {
        let run_id = std::env::var("RUN_ID")
            .unwrap_or_else(|_| format!("r-{}-{}", ts_epoch_ms(), process::id()));
        let sink = std::env::var("LOG_DIR").ok().and_then(|base| {
            RunSink::open(Path::new(&base), &run_id)
                .map_err(|err| eprintln!("[log] failed to open run dir: {}", err))
                .ok()
        });
        RunContext { run_id, sink }
    })
}

fn sanitize_fields(mut fields: Map<String, Value>) -> Map<String, Value> {
    let redacted = Value::String("[REDACTED]".to_string());
    for key in ["authorization", "Authorization", "api_key", "cookie"] {
        if fields.contains_key(key) {
            fields.insert(key.to_string(), redacted.clone());
        }
    }
    fields
}

fn split_fields(mut fields: Map<String, Value>) -> (Map<String, Value>, Map<String, Value>) {
    let mut top = Map::new();
    for key in ["category", "round", "msg"] {
        if let Some(value) = fields.remove(key) {
            top.insert(key.to_string(), value);
        }
    }
    (top, fields)
}

// =============================================================================
// Core logging functions
// =============================================================================

/// RFC3339 timestamp with milliseconds
pub fn ts_now() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

pub fn ts_epoch_ms() -> u64 {
    Utc::now().timestamp_millis() as u64
}

/// Emit a structured log entry
pub fn log(level: Level, domain: Domain, event: &str, fields: Map<String, Value>) {
    if level < Level::from_env() || !domain.is_enabled() {
        return;
    }
    let ctx = ensure_run_context();
    let line = render_record(&ctx.run_id, level, domain, event, fields);
    if let Some(sink) = &ctx.sink {
        sink.write(level, &line);
    }
    eprintln!("{}", line);
}

fn render_record(
    run_id: &str,
    level: Level,
    domain: Domain,
    event: &str,
    fields: Map<String, Value>,
) -> String {
    let fields = sanitize_fields(fields);
    let (mut top, data) = split_fields(fields);

    let msg = top.remove("msg").unwrap_or(Value::String(String::new()));
    let mut entry = Map::new();
    entry.insert("ts".to_string(), json!(ts_now()));
    entry.insert("run_id".to_string(), json!(run_id));
    entry.insert("seq".to_string(), json!(next_seq()));
    entry.insert("lvl".to_string(), json!(level.as_str().to_uppercase()));
    entry.insert("component".to_string(), json!(domain.as_str()));
    entry.insert("event".to_string(), json!(event));
    entry.insert("msg".to_string(), msg);
    for (k, v) in top {
        entry.insert(k, v);
    }
    entry.insert("data".to_string(), Value::Object(data));
    Value::Object(entry).to_string()
}

// =============================================================================
// Domain-Specific Logging Helpers
// =============================================================================

pub fn log_fetch_failure(category: &str, kind: &str, detail: &str) {
    log(
        Level::Warn,
        Domain::Fetch,
        "fetch_failed",
        obj(&[
            ("category", v_str(category)),
            ("kind", v_str(kind)),
            ("detail", v_str(detail)),
        ]),
    );
}

/// Audit entry for one aggregation round: fingerprints before and after.
pub fn log_round(round: u64, outcome: &str, failed: &[&str], before_hash: &str, after_hash: &str) {
    let level = if failed.is_empty() { Level::Info } else { Level::Warn };
    log(
        level,
        Domain::Aggregate,
        "round_settled",
        obj(&[
            ("round", json!(round)),
            ("outcome", v_str(outcome)),
            ("failed", Value::Array(failed.iter().map(|c| v_str(c)).collect())),
            ("view_before", v_str(before_hash)),
            ("view_after", v_str(after_hash)),
        ]),
    );
}

pub fn log_report_transition(from: &str, to: &str, detail: Option<&str>) {
    log(
        Level::Info,
        Domain::Report,
        "transition",
        obj(&[
            ("from", v_str(from)),
            ("to", v_str(to)),
            ("detail", detail.map(v_str).unwrap_or(Value::Null)),
        ]),
    );
}

// =============================================================================
// Utility Functions
// =============================================================================

pub fn obj(pairs: &[(&str, Value)]) -> Map<String, Value> {
    let mut map = Map::new();
    for (k, v) in pairs {
        map.insert((*k).to_string(), v.clone());
    }
    map
}

pub fn v_str(s: &str) -> Value {
    Value::String(s.to_string())
}

pub fn v_num(n: f64) -> Value {
    json!(n)
}

// =============================================================================
// Profiling Scope
// =============================================================================

/// Profiling scope that emits structured timing on drop.
pub struct ProfileScope {
    label: &'static str,
    context: Map<String, Value>,
    started: Instant,
}

impl ProfileScope {
    pub fn new(label: &'static str) -> Self {
        Self::with_context(label, &[])
    }

    pub fn with_context(label: &'static str, fields: &[(&str, Value)]) -> Self {
        Self {
            label,
            context: obj(fields),
            started: Instant::now(),
        }
    }
}

impl Drop for ProfileScope {
    fn drop(&mut self) {
        let elapsed_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        let mut fields = std::mem::take(&mut self.context);
        fields.insert("label".to_string(), v_str(self.label));
        fields.insert("elapsed_ms".to_string(), v_num(elapsed_ms));
        log(Level::Trace, Domain::Profile, "profile", fields);
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_level_ordering() {
        assert!(Level::Trace < Level::Debug);
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Warn);
        assert!(Level::Warn < Level::Error);
        assert!(Level::Error < Level::Fatal);
    }

    #[test]
    fn test_level_parse() {
        assert_eq!(Level::parse(Some("warn")), Level::Warn);
        assert_eq!(Level::parse(Some("trace")), Level::Trace);
        assert_eq!(Level::parse(Some("WARN")), Level::Info);
        assert_eq!(Level::parse(Some("verbose")), Level::Info);
        assert_eq!(Level::parse(None), Level::Info);
    }

    #[test]
    fn test_domain_filter() {
        let raw = Some("fetch, report");
        assert!(Domain::Fetch.enabled_in(raw));
        assert!(Domain::Report.enabled_in(raw));
        assert!(!Domain::Aggregate.enabled_in(raw));
        assert!(!Domain::System.enabled_in(raw));
        assert!(!Domain::Profile.enabled_in(raw));

        assert!(Domain::Profile.enabled_in(Some("all")));
        assert!(Domain::Aggregate.enabled_in(None));
    }

    #[test]
    fn test_obj_helper() {
        let m = obj(&[("key", v_str("value")), ("num", v_num(42.0))]);
        assert_eq!(m.get("key").unwrap(), "value");
        assert_eq!(m.get("num").unwrap(), 42.0);
    }

    #[test]
    fn test_seq_increments() {
        let s1 = next_seq();
        let s2 = next_seq();
        assert!(s2 > s1);
    }

    #[test]
    fn test_record_promotes_keys_and_redacts() {
        let line = render_record(
            "r-test",
            Level::Warn,
            Domain::Fetch,
            "fetch_failed",
            obj(&[
                ("category", v_str("/kpis")),
                ("msg", v_str("boom")),
                ("api_key", v_str("secret")),
                ("detail", v_str("refused")),
            ]),
        );
        let record: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(record["run_id"], "r-test");
        assert_eq!(record["lvl"], "WARN");
        assert_eq!(record["component"], "fetch");
        assert_eq!(record["category"], "/kpis");
        assert_eq!(record["msg"], "boom");
        assert_eq!(record["data"]["api_key"], "[REDACTED]");
        assert_eq!(record["data"]["detail"], "refused");
        assert!(record["data"].get("category").is_none());
    }

    #[test]
    fn test_run_sink_splits_by_level() {
        let dir = TempDir::new().unwrap();
        let sink = RunSink::open(dir.path(), "r-sink").unwrap();
        sink.write(Level::Info, r#"{"event":"round_settled"}"#);
        sink.write(Level::Trace, r#"{"event":"profile"}"#);

        let events = std::fs::read_to_string(sink.dir().join("events.jsonl")).unwrap();
        let trace = std::fs::read_to_string(sink.dir().join("trace.jsonl")).unwrap();
        assert!(events.contains("round_settled"));
        assert!(!events.contains("profile"));
        assert!(trace.contains("profile"));

        let manifest: Value =
            serde_json::from_str(&std::fs::read_to_string(sink.dir().join("manifest.json")).unwrap())
                .unwrap();
        assert_eq!(manifest["run_id"], "r-sink");
    }
}
