use anyhow::Result;
use corpus_dashboard::config::Config;
use corpus_dashboard::dashboard::Dashboard;
use corpus_dashboard::logging::{log, obj, v_str, Domain, Level};
use serde_json::json;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let want_report = std::env::args().skip(1).any(|a| a == "--report");
    let cfg = Config::from_env()?;
    let dashboard = Dashboard::connect(&cfg);

    // The fallback stays in place when the round fails; the error is only logged.
    if let Err(err) = dashboard.load_all().await {
        log(
            Level::Warn,
            Domain::System,
            "startup_round_failed",
            obj(&[("msg", v_str(&err.to_string())), ("degraded", json!(true))]),
        );
    }

    if want_report {
        dashboard.request_report().await;
    }

    println!("{}", serde_json::to_string_pretty(&dashboard.snapshot())?);
    Ok(())
}
