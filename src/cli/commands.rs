use tracing::warn;

use crate::app::{AppContext, Result, TributaryError};
use crate::counters::UnreadCounters;
use crate::domain::{Entry, Scope};
use crate::filter::FilterSpec;
use crate::view::PageLoad;

/// Refresh the unread aggregates, then load the first page of `scope`.
///
/// Counts are loaded first because the unread "more available" flag depends
/// on them; a failure there only degrades that flag.
pub async fn open_scope(ctx: &AppContext, scope: Scope) -> Result<()> {
    if let Err(e) = ctx.counters.reload_aggregates().await {
        warn!("Could not load unread counts: {}", e);
    }
    ctx.view.set_scope(scope).await?;
    Ok(())
}

pub async fn list_entries(ctx: &AppContext, scope: Scope, filter: FilterSpec, pages: u32) -> Result<()> {
    ctx.view.set_filter(filter);
    open_scope(ctx, scope).await?;

    for _ in 1..pages {
        if !matches!(ctx.view.load_more().await?, PageLoad::Loaded { .. }) {
            break;
        }
    }

    let entries = ctx.view.visible_entries();
    if entries.is_empty() {
        println!("No entries in {}", scope);
        return Ok(());
    }

    for entry in &entries {
        println!("{}", entry_line(entry));
    }
    println!(
        "{} shown, {} loaded of {} in {} ({} unread){}",
        entries.len(),
        ctx.view.loaded_len(),
        ctx.view.total(),
        scope,
        ctx.view.unread_count(),
        if ctx.view.has_more() { "; more with --pages" } else { "" }
    );
    Ok(())
}

pub async fn toggle_read(ctx: &AppContext, scope: Scope, entry_id: i64) -> Result<()> {
    locate(ctx, scope, entry_id).await?;
    let entry = ctx.view.toggle_read(entry_id).await?;
    println!("Marked {}: {}", entry.status.as_str(), entry.display_title());
    println!("{} unread in {}", ctx.view.unread_count(), scope);
    Ok(())
}

pub async fn toggle_star(ctx: &AppContext, scope: Scope, entry_id: i64) -> Result<()> {
    locate(ctx, scope, entry_id).await?;
    let entry = ctx.view.toggle_star(entry_id).await?;
    let verb = if entry.starred { "Starred" } else { "Unstarred" };
    println!("{}: {}", verb, entry.display_title());
    Ok(())
}

pub async fn mark_all_read(ctx: &AppContext, scope: Scope) -> Result<()> {
    open_scope(ctx, scope).await?;
    ctx.view.mark_all_read().await?;
    println!(
        "Marked everything in {} as read ({} unread left)",
        scope,
        ctx.view.unread_count()
    );
    Ok(())
}

pub async fn show_counters(ctx: &AppContext) -> Result<()> {
    ctx.counters.reload_aggregates().await?;
    let snapshot = ctx.counters.snapshot();

    println!("{} unread", snapshot.total);

    let mut groups: Vec<_> = snapshot.groups.into_iter().collect();
    groups.sort_unstable();
    for (id, unread) in groups {
        println!("  group {:>6}  {}", id, unread);
    }

    let mut feeds: Vec<_> = snapshot.feeds.into_iter().filter(|(_, n)| *n > 0).collect();
    feeds.sort_unstable();
    for (id, unread) in feeds {
        println!("  feed  {:>6}  {}", id, unread);
    }
    Ok(())
}

/// Page through `scope` until `entry_id` is loaded.
async fn locate(ctx: &AppContext, scope: Scope, entry_id: i64) -> Result<()> {
    open_scope(ctx, scope).await?;
    while ctx.view.entry(entry_id).is_none() {
        match ctx.view.load_more().await? {
            PageLoad::Loaded { .. } => {}
            _ => return Err(TributaryError::EntryNotFound(entry_id)),
        }
    }
    Ok(())
}

/// One-line listing: unread and star markers, id, date, feed, title.
pub fn entry_line(entry: &Entry) -> String {
    let read_marker = if entry.is_unread() { "●" } else { " " };
    let star_marker = if entry.starred { "★" } else { " " };
    format!(
        "{}{} {:>8} {} [{}] {}",
        read_marker,
        star_marker,
        entry.id,
        entry.created_at.format("%Y-%m-%d"),
        entry.feed.title,
        entry.display_title()
    )
}
