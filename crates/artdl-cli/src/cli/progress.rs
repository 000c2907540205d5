//! Prints pipeline progress events as they arrive.

use artdl_core::pipeline::{Attempt, ProgressEvent};
use tokio::sync::mpsc;

pub(super) async fn print_events(mut rx: mpsc::Receiver<ProgressEvent>) {
    while let Some(event) = rx.recv().await {
        println!("{}", render(&event));
    }
}

pub(super) fn render(event: &ProgressEvent) -> String {
    match event {
        ProgressEvent::ArtistReady { name } => format!("Artist: {name}"),
        ProgressEvent::ArticlesDiscovered { count } => format!("Found {count} article(s)"),
        ProgressEvent::ImageFinished {
            done,
            total,
            attempt,
            label,
            name,
        } => {
            let retry = if *attempt == Attempt::Retry { " (retry)" } else { "" };
            format!("[{done}/{total}] {label} {name}{retry}")
        }
        ProgressEvent::RetryStarted { count } => format!("Retrying {count} failed image(s)"),
    }
}
