//! `rostersync watch`: drive the sync loop until Ctrl-C.

use std::sync::Arc;

use rostersync_core::{run_sync_loop, Config, Event, SyncLoop, SystemClock, ViewSignal};
use tokio::sync::mpsc;

use super::{client, resolve_faction, runtime};
use crate::terminal::{NameBook, NamedSource, TerminalSink};

pub fn run(faction: Option<String>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let faction_id = resolve_faction(faction, &config)?;
    let source = client(&config)?;

    let names = NameBook::default();
    let source = Arc::new(NamedSource::new(source, Arc::clone(&names)));
    let sink = TerminalSink::new(config.colors.clone(), names, !json);
    let mut engine = SyncLoop::new(sink, config.sync_settings());

    runtime()?.block_on(async move {
        let (tx, rx) = mpsc::channel(4);
        tx.send(ViewSignal::Activated {
            faction_id: Some(faction_id),
        })
        .await?;

        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                let _ = tx.send(ViewSignal::Shutdown).await;
            }
        });

        run_sync_loop(&mut engine, source, rx, &SystemClock, |events| {
            for event in events {
                report(event, json);
            }
        })
        .await;
        Ok::<_, Box<dyn std::error::Error>>(())
    })
}

fn report(event: &Event, json: bool) {
    if json {
        match serde_json::to_string(event) {
            Ok(line) => println!("{line}"),
            Err(e) => tracing::warn!(error = %e, "failed to encode event"),
        }
        return;
    }
    match event {
        Event::CooldownEntered { until, reason, .. } => {
            tracing::warn!(%until, %reason, "polling paused");
        }
        other => tracing::debug!(event = ?other),
    }
}
