//! Raw-mode key loop stepping through one scope's entries.
//!
//! Every key goes through [`KeybindingConfig::command_for`] and then the view
//! coordinator; after each handled key the active entry is printed again.

use std::io::{self, Stdout, Write};
use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use tracing::warn;

use crate::app::{AppContext, Result};
use crate::cli::commands::{entry_line, open_scope};
use crate::config::{KeyAction, KeybindingConfig};
use crate::domain::Scope;
use crate::filter::FilterSpec;
use crate::selection::Command;
use crate::view::{Dispatch, ViewCoordinator};

pub enum AppEvent {
    Key(KeyEvent),
    Tick,
}

pub struct EventHandler {
    tick_rate: Duration,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        Self { tick_rate }
    }

    pub fn next(&self) -> Result<AppEvent> {
        if event::poll(self.tick_rate)? {
            // Release and repeat events would double every toggle on some terminals.
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(AppEvent::Key(key));
                }
            }
        }
        Ok(AppEvent::Tick)
    }
}

pub async fn run(ctx: &AppContext, scope: Scope, filter: FilterSpec) -> Result<()> {
    for binding in ctx.config.keybindings.invalid_bindings() {
        warn!("Ignoring unknown key binding {:?}", binding);
    }
    ctx.view.set_filter(filter);
    open_scope(ctx, scope).await?;

    enable_raw_mode()?;
    let result = run_loop(ctx).await;
    disable_raw_mode()?;
    result
}

async fn run_loop(ctx: &AppContext) -> Result<()> {
    let mut out = io::stdout();
    let events = EventHandler::new(Duration::from_millis(250));

    write_line(&mut out, &help_line(&ctx.config.keybindings))?;
    write_status(&mut out, &ctx.view)?;

    loop {
        let AppEvent::Key(key) = events.next()? else {
            continue;
        };
        let command = match ctx.config.keybindings.command_for(&key) {
            Some(KeyAction::Quit) => break,
            Some(KeyAction::Command(command)) => command,
            None => continue,
        };

        match handle(&ctx.view, command).await {
            Ok(Dispatch::Handled) => write_status(&mut out, &ctx.view)?,
            Ok(Dispatch::Ignored) => {}
            Err(e) => write_line(&mut out, &format!("error: {}", e))?,
        }
    }
    Ok(())
}

/// Dispatch one command. `Next` with nothing selected opens the first visible
/// entry, and `Next` past the end pulls in the following page first.
async fn handle(view: &ViewCoordinator, command: Command) -> Result<Dispatch> {
    if command == Command::Next && view.active_entry().is_none() {
        let first = view.visible_entries().first().map(|e| e.id);
        return match first {
            Some(id) => view.select(Some(id)).await.map(|_| Dispatch::Handled),
            None => Ok(Dispatch::Ignored),
        };
    }

    let dispatched = view.dispatch_key(command).await?;
    if dispatched == Dispatch::Ignored && command == Command::Next && view.has_more() {
        view.load_more().await?;
        return view.dispatch_key(command).await;
    }
    Ok(dispatched)
}

fn help_line(keys: &KeybindingConfig) -> String {
    format!(
        "{} previous | {} next | {} read | {} star | {} close | {} quit",
        keys.previous.join("/"),
        keys.next.join("/"),
        keys.toggle_read.join("/"),
        keys.toggle_star.join("/"),
        keys.escape.join("/"),
        keys.quit.join("/"),
    )
}

fn write_status(out: &mut Stdout, view: &ViewCoordinator) -> Result<()> {
    let line = match view.active_entry() {
        Some(entry) => entry_line(&entry),
        None => format!("({} entries, nothing open)", view.visible_entries().len()),
    };
    write_line(out, &format!("{}  | {} unread", line, view.unread_count()))
}

// Raw mode needs an explicit carriage return.
fn write_line(out: &mut Stdout, line: &str) -> Result<()> {
    write!(out, "{}\r\n", line)?;
    out.flush()?;
    Ok(())
}
