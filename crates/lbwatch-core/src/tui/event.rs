//! Event handling for TUI.
//!
//! A dedicated thread polls the terminal and forwards events into a tokio
//! channel so the dashboard loop can `select!` over input and fetch results.

use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};
use tokio::sync::mpsc::{self, UnboundedReceiver};

/// Application events.
#[derive(Debug)]
pub enum Event {
    /// Timer tick, redraws the clock.
    Tick,
    /// Keyboard input.
    Key(KeyEvent),
    /// Terminal resize (width, height).
    Resize(u16, u16),
}

/// Event handler that polls for terminal events in a separate thread.
pub struct EventHandler {
    rx: UnboundedReceiver<Event>,
}

impl EventHandler {
    /// Creates a new event handler with the specified tick rate.
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        let spawned = thread::Builder::new()
            .name("lbwatch-input".into())
            .spawn(move || {
                loop {
                    let event = if event::poll(tick_rate).unwrap_or(false) {
                        match event::read() {
                            Ok(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                                Event::Key(key)
                            }
                            Ok(CrosstermEvent::Resize(w, h)) => Event::Resize(w, h),
                            _ => continue,
                        }
                    } else {
                        Event::Tick
                    };
                    // Receiver gone: the dashboard has exited.
                    if tx.send(event).is_err() {
                        break;
                    }
                }
            });
        if let Err(e) = spawned {
            tracing::error!(error = %e, "failed to start input thread");
        }

        Self { rx }
    }

    /// Waits for the next event; `None` once the input thread has stopped.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}
