//! Terminal rendering: plain text tables or JSON

use anyhow::Result;
use ondessource::{Channel, NowPlaying, SourceFailure, StreamHealth};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

const NAME_WIDTH: usize = 36;

pub fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Shorten `text` to `width` characters, marking the cut with `…`
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

pub fn channel_line(channel: &Channel) -> String {
    let mut line = format!(
        "{:<32} {:<width$}",
        channel.id,
        truncate(&channel.name, NAME_WIDTH),
        width = NAME_WIDTH
    );

    if !channel.genres.is_empty() {
        line.push_str(&format!(" [{}]", channel.genres.join(", ")));
    }
    if let Some(listeners) = channel.listeners {
        line.push_str(&format!(" {} listening", listeners));
    }
    if let Some(np) = channel.now_playing.as_ref().and_then(NowPlaying::display) {
        line.push_str(&format!("\n{:<32} ♪ {}", "", np));
    }
    line.trim_end().to_string()
}

pub fn print_channels(channels: &[Channel], json: bool) -> Result<()> {
    if json {
        return print_json(&serde_json::to_value(channels)?);
    }

    if channels.is_empty() {
        println!("No channels.");
        return Ok(());
    }
    for channel in channels {
        println!("{}", channel_line(channel));
    }
    println!("{} channel(s)", channels.len());
    Ok(())
}

/// Source failures go to stderr so that stdout stays parseable
pub fn print_failures(failures: &[SourceFailure]) {
    for failure in failures {
        if failure.served_stale {
            eprintln!(
                "warning: {} unavailable ({}), showing cached channels",
                failure.source, failure.message
            );
        } else {
            eprintln!("warning: {} unavailable ({})", failure.source, failure.message);
        }
    }
}

pub fn now_playing_lines(np: &NowPlaying) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(show) = &np.show {
        lines.push(format!("Show:    {}", show));
    }
    if let Some(artist) = &np.artist {
        lines.push(format!("Artist:  {}", artist));
    }
    if let Some(title) = &np.title {
        lines.push(format!("Title:   {}", title));
    }
    if let Some(album) = &np.album {
        lines.push(format!("Album:   {}", album));
    }
    if let Some(started) = np.started_at {
        lines.push(format!("Started: {}", started.format("%H:%M:%S UTC")));
    }
    if let Some(artwork) = &np.artwork {
        lines.push(format!("Artwork: {}", artwork));
    }
    lines
}

pub fn print_now_playing(channel_id: &str, np: Option<&NowPlaying>, json: bool) -> Result<()> {
    if json {
        return print_json(&serde_json::json!({
            "id": channel_id,
            "now_playing": np,
        }));
    }

    match np.filter(|np| !np.is_empty()) {
        Some(np) => {
            println!("{}", channel_id);
            for line in now_playing_lines(np) {
                println!("  {}", line);
            }
        }
        None => println!("{}: nothing to report", channel_id),
    }
    Ok(())
}

pub fn health_line(key: &str, health: &StreamHealth) -> String {
    let detail = match health {
        StreamHealth::Online {
            status,
            content_type,
            latency_ms,
        } => format!(
            "{} {} in {} ms",
            status,
            content_type.as_deref().unwrap_or("unknown type"),
            latency_ms
        ),
        StreamHealth::Degraded { status, reason } => format!("{} {}", status, reason),
        StreamHealth::Offline { reason } => reason.clone(),
    };
    format!("{:<32} {:<9} {}", key, health.label(), detail)
}

pub fn print_health(results: &HashMap<String, StreamHealth>, json: bool) -> Result<()> {
    let sorted: BTreeMap<&String, &StreamHealth> = results.iter().collect();
    if json {
        return print_json(&serde_json::to_value(&sorted)?);
    }

    for (key, health) in sorted {
        println!("{}", health_line(key, health));
    }
    Ok(())
}
