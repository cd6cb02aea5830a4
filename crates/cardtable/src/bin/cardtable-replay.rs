//! Loads a replay file, seeks to a point in time, and prints the table.

use std::path::PathBuf;

use anyhow::Context;
use cardtable::prelude::*;
use chrono::NaiveDateTime;
use clap::Parser;

#[derive(Parser)]
#[command(version, about = "Inspect a recorded Cardtable game", long_about = None)]
struct Cli {
    /// Path to a gzip replay file
    path: PathBuf,

    /// Show the table as it was at this time (`YYYY-MM-DD HH:MM:SS[.ffffff]`);
    /// defaults to the end of the recording
    #[arg(long)]
    at: Option<String>,

    /// Print the players as JSON instead of text
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    cardtable::init_tracing();
    let cli = Cli::parse();

    let recorder = Recorder::read_from_file(&cli.path)
        .with_context(|| format!("failed to load {}", cli.path.display()))?;
    let mut room = Room::new(
        recorder.room(),
        RoomConfig {
            record: false,
            ..Default::default()
        },
    )?;
    let mut events = room.subscribe();
    let header = format!("room {} recorded by {}", recorder.room(), recorder.player());
    let mut replay: Replay<RoomInverse> = Replay::new(recorder)?;

    let time = match cli.at.as_deref() {
        Some(text) => NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f")
            .with_context(|| format!("bad time {text:?}"))?,
        None => match replay.end_time() {
            Some(time) => time,
            None => {
                println!("{header}: no entries");
                return Ok(());
            }
        },
    };
    replay.skip_to(time, &mut room);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&room.views())?);
        return Ok(());
    }

    println!("{header}");
    println!("entry {}/{} at {time}", replay.position(), replay.len());
    println!();
    while let Ok(event) = events.try_recv() {
        match event {
            RoomEvent::Chat { sender, text } => println!("<{sender}> {text}"),
            RoomEvent::Log(line) => println!("* {line}"),
            RoomEvent::Error { player, message } => println!("! {player}: {message}"),
            RoomEvent::PlayerAdded(_) | RoomEvent::PlayerRemoved(_) => {}
        }
    }
    for view in room.views() {
        println!();
        print_player(&view);
    }
    Ok(())
}

fn print_player(view: &PlayerView) {
    println!("{} (protocol {})", view.id, view.version);
    println!("  life       {}", view.life);
    println!("  library    {}", view.library);
    println!("  hand       {}", view.hand);
    println!("  graveyard  {}", view.graveyard.join(" "));
    println!("  exile      {}", view.exile.join(" "));
    if view.tray.is_none() {
        println!("  (spectating)");
    }
    for item in &view.battlefield {
        let mut flags = Vec::new();
        if item.tapped {
            flags.push("tapped".to_string());
        }
        if item.flipped {
            flags.push("flipped".to_string());
        }
        if !item.face_up {
            flags.push("face down".to_string());
        }
        flags.extend(item.counters.iter().map(|(kind, n)| format!("{n} {kind}")));
        println!(
            "  [{}] {} at ({:.2}, {:.2}) {}",
            item.item_id,
            item.name,
            item.x,
            item.y,
            flags.join(", ")
        );
    }
}
