//! `rostersync snapshot`: one poll, printed in urgency order.

use chrono::Utc;
use std::sync::Arc;

use rostersync_core::{Config, Event, SyncLoop};

use super::{client, resolve_faction, runtime};
use crate::terminal::{NameBook, NamedSource, TerminalSink};

pub fn run(faction: Option<String>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let faction_id = resolve_faction(faction, &config)?;
    let names = NameBook::default();
    let source = NamedSource::new(client(&config)?, Arc::clone(&names));

    let sink = TerminalSink::new(config.colors.clone(), names, false);
    let mut engine = SyncLoop::new(sink, config.sync_settings());
    engine.activate(Some(faction_id), Utc::now())?;

    let applied = runtime()?.block_on(engine.poll_once(&source, Utc::now()));
    if !applied {
        let reason = engine
            .drain_events()
            .into_iter()
            .find_map(|event| match event {
                Event::CooldownEntered { reason, .. } => Some(reason),
                _ => None,
            })
            .unwrap_or_else(|| "no roster received".to_string());
        return Err(reason.into());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&engine.sink().rows())?);
    } else {
        print!("{}", engine.sink().render_table());
    }
    Ok(())
}
