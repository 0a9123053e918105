use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use uuid::Uuid;

use weekfill::config::Config;
use weekfill::fill::{is_placeable, ConflictState};
use weekfill::ingest::ManualEventForm;
use weekfill::models::Weekday;
use weekfill::planner::{FillReport, PlannerSession};
use weekfill::storage::StateStore;
use weekfill::utils::{describe_event, format_time_range};

use super::{build_scheduler, open_session};

/// How a conflict raised by `fill` is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillChoice {
    /// Ask on stdin
    Prompt,
    /// Keep option 0 or 1
    Keep(usize),
    /// Leave both options in the waitlist
    Cancel,
}

/// Parameters for the add command
#[derive(Debug, Clone)]
pub struct AddParams {
    pub title: String,
    pub date: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub time_sensitive: bool,
}

/// Print the weekly grid and the waitlist
pub fn show(config: &Config) -> Result<()> {
    let session = open_session(config)?;
    let planner = session.planner();

    println!("Weekly schedule");
    println!("{:-<60}", "");
    for (day, events) in planner.schedule().iter() {
        println!("{day}");
        if events.is_empty() {
            println!("  (empty)");
        }
        for event in events {
            let times = format_time_range(event.start_time.as_deref(), event.end_time.as_deref());
            println!("  {times}  {}", event.display_title());
        }
    }

    println!();
    println!("Waitlist ({} events)", planner.waitlist().len());
    println!("{:-<60}", "");
    for event in planner.waitlist() {
        let marker = if is_placeable(event) { ' ' } else { '*' };
        println!("{marker} {}  [{}]", describe_event(event), event.id);
    }
    if planner.waitlist().iter().any(|e| !is_placeable(e)) {
        println!("* cannot be placed automatically");
    }

    Ok(())
}

/// Add an event through the manual form
pub fn add(config: &Config, params: AddParams) -> Result<()> {
    let form = ManualEventForm {
        title: params.title,
        date: params.date.unwrap_or_default(),
        start_time: params.start.unwrap_or_default(),
        end_time: params.end.unwrap_or_default(),
        address: params.address.unwrap_or_default(),
        description: params.description.unwrap_or_default(),
        time_sensitive: params.time_sensitive,
    };
    let event = form.into_event().context("Invalid event")?;
    let summary = describe_event(&event);
    let placeable = is_placeable(&event);

    let mut session = open_session(config)?;
    let id = session.submit_event(event);

    println!("Added to waitlist: {summary}  [{id}]");
    if !placeable {
        println!("Note: this event cannot be placed automatically (needs a weekday date and start/end times)");
    }
    Ok(())
}

/// Run a fill pass, resolving a conflict within the same session
pub async fn fill(config: &Config, choice: FillChoice) -> Result<()> {
    let scheduler = build_scheduler(config)?;
    let mut session = open_session(config)?;

    match session.fill(&scheduler).await {
        FillReport::Committed { placed } => {
            println!("Placed {placed} event(s); no conflicts");
            return Ok(());
        }
        FillReport::Conflict { placed, day, .. } => {
            println!("Placed {placed} event(s) before stopping at a conflict on {day}");
        }
    }

    let Some(conflict) = session.pending_conflict() else {
        return Ok(());
    };
    print_conflict(conflict);

    let choice = match choice {
        FillChoice::Prompt => prompt_choice().await?,
        other => other,
    };
    resolve(&mut session, choice)
}

fn print_conflict(conflict: &ConflictState) {
    println!();
    println!("Conflict on {}:", conflict.day());
    for (index, option) in conflict.options().iter().enumerate() {
        println!("  [{}] {}", index + 1, describe_event(option));
        if let Some(address) = option.address() {
            println!("      at {address}");
        }
    }
}

async fn prompt_choice() -> Result<FillChoice> {
    println!("Keep which event? [1/2, c to cancel]");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await.context("Failed to read choice")? {
        match line.trim() {
            "1" => return Ok(FillChoice::Keep(0)),
            "2" => return Ok(FillChoice::Keep(1)),
            "c" | "C" | "" => return Ok(FillChoice::Cancel),
            other => println!("Unrecognised choice '{other}'. Enter 1, 2 or c"),
        }
    }

    Ok(FillChoice::Cancel)
}

fn resolve<S: StateStore>(session: &mut PlannerSession<S>, choice: FillChoice) -> Result<()> {
    match choice {
        FillChoice::Keep(index) => {
            let report = session.confirm_with(index)?;
            println!(
                "Kept '{}' on {}; discarded '{}'",
                report.kept.display_title(),
                report.day,
                report.discarded.display_title()
            );
            println!("Run fill again to continue with the remaining days");
        }
        FillChoice::Cancel | FillChoice::Prompt => {
            session.cancel();
            println!("Left both events in the waitlist");
        }
    }
    Ok(())
}

/// Move a scheduled event back to the waitlist
pub fn unschedule(config: &Config, id: Uuid) -> Result<()> {
    let mut session = open_session(config)?;
    let day: Weekday = session.unschedule(id)?;
    println!("Moved {id} from {day} back to the waitlist");
    Ok(())
}
