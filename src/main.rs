mod confirm;
mod error_mapping;

use std::process::ExitCode;

use chrono::{Datelike, Local, NaiveDate, NaiveTime};
use clap::{Parser, Subcommand};
use daybook_core::{AppError, Config};
use daybook_events::{
    EventDraft, EventId, EventPatch, EventRepository, EventStore, HttpEventRepository,
};

use crate::confirm::{AssumeYes, Confirm, PromptConfirm};

#[derive(Parser)]
#[command(name = "daybook", about = "Browse and edit calendar events")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// List a day's events (today by default)
    Day { date: Option<NaiveDate> },
    /// List the days of a month that have events
    Month { year: Option<i32>, month: Option<u32> },
    /// Show one event
    Show { id: EventId },
    /// Add an event
    Add {
        title: String,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long, value_parser = parse_hhmm)]
        start: Option<NaiveTime>,
        #[arg(long, value_parser = parse_hhmm)]
        end: Option<NaiveTime>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long, default_value = "")]
        location: String,
        #[arg(long, default_value = "")]
        memo: String,
    },
    /// Change fields of an event
    Edit {
        id: EventId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long, value_parser = parse_hhmm)]
        start: Option<NaiveTime>,
        #[arg(long, value_parser = parse_hhmm)]
        end: Option<NaiveTime>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        memo: Option<String>,
    },
    /// Delete an event
    Delete {
        id: EventId,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}

fn parse_hhmm(raw: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(raw, "%H:%M").map_err(|e| format!("expected HH:MM: {}", e))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    daybook_core::init()?;

    let (config, _) = Config::load_validated()?;
    tracing::info!("Using event API at {}", config.services.events_api_url);

    let repository = HttpEventRepository::new(&config.services.events_api_url);
    let mut store = EventStore::new(repository);
    store.initialize().await.map_err(error_mapping::event_error)?;

    let today = Local::now().date_naive();
    match cli.command.unwrap_or(Command::Day { date: None }) {
        Command::Day { date } => print_day(&store, date.unwrap_or(today)),
        Command::Month { year, month } => print_month(
            &store,
            year.unwrap_or(today.year()),
            month.unwrap_or(today.month()),
        ),
        Command::Show { id } => match store.get_event_by_id(id) {
            Some(event) => {
                println!("{}", event.title);
                println!("  {} {}", event.date, event.time_range_label());
                if let Some(location) = &event.location {
                    println!("  Location: {}", location);
                }
                if let Some(memo) = &event.memo {
                    println!("  Memo: {}", memo);
                }
            }
            None => println!("No event with id {}", id),
        },
        Command::Add {
            title,
            date,
            start,
            end,
            color,
            location,
            memo,
        } => {
            let mut draft = configured_draft(&config, date.unwrap_or(today));
            draft.title = title;
            draft.location = location;
            draft.memo = memo;
            if let Some(start) = start {
                draft.start_time = start;
            }
            if let Some(end) = end {
                draft.end_time = end;
            }
            if let Some(color) = color {
                draft.color = color;
            }

            let new_event = draft.into_new_event().map_err(error_mapping::event_error)?;
            let created = store.add_event(new_event).await.map_err(error_mapping::event_error)?;
            println!("Added event {} on {}", created.id, created.date);
            print_day(&store, created.date);
        }
        Command::Edit {
            id,
            title,
            date,
            start,
            end,
            color,
            location,
            memo,
        } => {
            let patch = EventPatch {
                title,
                date,
                start_time: start,
                end_time: end,
                color,
                location,
                memo,
            };
            if patch.is_empty() {
                println!("Nothing to change");
                return Ok(());
            }
            let updated = store.update_event(id, patch).await.map_err(error_mapping::event_error)?;
            println!("Updated event {}", updated.id);
            print_day(&store, updated.date);
        }
        Command::Delete { id, yes } => {
            let mut confirm: Box<dyn Confirm> = if yes {
                Box::new(AssumeYes)
            } else {
                Box::new(PromptConfirm::stdio())
            };
            let label = store
                .get_event_by_id(id)
                .map(|e| format!("Delete \"{}\" on {}?", e.title, e.date))
                .unwrap_or_else(|| format!("Delete event {}?", id));

            if !confirm.confirm(&label)? {
                println!("Cancelled");
                return Ok(());
            }
            store.delete_event(id).await.map_err(error_mapping::event_error)?;
            println!("Deleted event {}", id);
        }
    }

    Ok(())
}

/// Form defaults from config, falling back to built-ins if the times don't parse.
fn configured_draft(config: &Config, date: NaiveDate) -> EventDraft {
    let start = NaiveTime::parse_from_str(&config.events.default_start, "%H:%M");
    let end = NaiveTime::parse_from_str(&config.events.default_end, "%H:%M");
    match (start, end) {
        (Ok(start), Ok(end)) => {
            EventDraft::with_defaults(date, &config.events.default_color, start, end)
        }
        _ => EventDraft::new(date),
    }
}

fn print_day<R: EventRepository>(store: &EventStore<R>, date: NaiveDate) {
    let events = store.get_events_for_date(date);
    if events.is_empty() {
        println!("{}: no events", date);
        return;
    }

    println!("{}:", date);
    for event in events {
        match &event.location {
            Some(location) => println!(
                "  [{}] {}  {} @ {}",
                event.id,
                event.time_range_label(),
                event.title,
                location
            ),
            None => println!("  [{}] {}  {}", event.id, event.time_range_label(), event.title),
        }
    }
}

fn print_month<R: EventRepository>(store: &EventStore<R>, year: i32, month: u32) {
    let days = store.events_in_month(year, month);
    if days.is_empty() {
        println!("{}-{:02}: no events", year, month);
        return;
    }

    for (date, events) in days {
        let first = events.first().map(|e| e.title.as_str()).unwrap_or_default();
        match events.len() {
            1 => println!("{}  {}", date, first),
            n => println!("{}  {} (+{} more)", date, first, n - 1),
        }
    }
}

/// Log the full error and tell the user what went wrong.
fn report(e: &AppError) {
    tracing::error!("{}", e);
    eprintln!("{}", failure_text(e));
}

/// The one line shown to the user for a failed command.
fn failure_text(e: &AppError) -> String {
    match e {
        AppError::Validation(detail) => format!("{} {}", e.user_message(), detail),
        _ => e.user_message().to_string(),
    }
}
