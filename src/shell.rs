// Headless shell - a line-oriented view for the speakers list
//
// Stands in for the screen that would normally render the list: it reads
// commands from stdin, turns them into coordinator intents, and prints every
// published snapshot and one-shot event on stdout.
//
// Commands:
//   load | refresh | more | near <row> | query [text] | select <row>
//   latest <row> | show | help | quit

use crate::coordinator::{ListHandle, SelectionDelegate};
use crate::model::{ListEvent, ListSnapshot, ListState, Speaker};
use anyhow::{Context, Result};
use std::fmt::Write as _;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

/// A parsed shell command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Load,
    Refresh,
    More,
    Near(usize),
    /// Set the query and reload (empty text clears the search)
    Query(String),
    Select(usize),
    Latest(usize),
    Show,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let row = |rest: &str| {
            rest.parse::<usize>()
                .map_err(|_| format!("'{}' expects a row number", word))
        };

        match word.to_lowercase().as_str() {
            "load" => Ok(Self::Load),
            "refresh" | "r" => Ok(Self::Refresh),
            "more" | "m" => Ok(Self::More),
            "near" => row(rest).map(Self::Near),
            "query" | "q" | "search" => Ok(Self::Query(rest.to_string())),
            "select" | "s" => row(rest).map(Self::Select),
            "latest" | "l" => row(rest).map(Self::Latest),
            "show" | "" => Ok(Self::Show),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(format!("Unknown command '{}' (try 'help')", other)),
        }
    }
}

const HELP: &str = "\
commands:
  load            show loading state and fetch page 1
  refresh, r      re-fetch page 1 keeping the list visible
  more, m         fetch the next page
  near <row>      report <row> as visible (loads more on the last row)
  query [text]    search for text and reload (no text clears the search)
  select <row>    open a speaker from the list
  latest <row>    open a speaker from the latest list
  show            print the list again
  quit            exit";

/// Prints navigation requests in place of a detail screen
pub struct PrintNavigator;

impl SelectionDelegate<u64> for PrintNavigator {
    fn item_selected(&self, id: u64) {
        println!("-> open speaker details #{}", id);
    }
}

/// Render a snapshot as the list screen would show it
pub fn render_snapshot(snapshot: &ListSnapshot<Speaker>) -> String {
    let mut out = String::new();

    let pages = match snapshot.total_pages {
        Some(total) => format!("{}/{}", snapshot.current_page, total),
        None => "-".to_string(),
    };
    let _ = writeln!(
        out,
        "[{}{}] page {} | query {:?} | {} speakers, {} latest",
        snapshot.state,
        if snapshot.busy { ", fetching" } else { "" },
        pages,
        snapshot.query,
        snapshot.items.len(),
        snapshot.latest.len()
    );

    match snapshot.state {
        ListState::Loading if snapshot.items.is_empty() => {
            let _ = writeln!(out, "  loading...");
            return out;
        }
        ListState::Error(reason) => {
            let _ = writeln!(out, "  {:?} - use 'refresh' to retry", reason);
            return out;
        }
        ListState::Empty => {
            let _ = writeln!(out, "  no speakers yet");
            return out;
        }
        _ => {}
    }

    // Latest speakers are only shown for the unfiltered list
    if snapshot.query.is_empty() && !snapshot.latest.is_empty() {
        let names: Vec<String> = snapshot
            .latest
            .iter()
            .enumerate()
            .map(|(row, s)| format!("{}:{}", row, s.name))
            .collect();
        let _ = writeln!(out, "  latest: {}", names.join(", "));
    }

    for (row, speaker) in snapshot.items.iter().enumerate() {
        let _ = write!(out, "  {:>3}  #{:<4} {}", row, speaker.id, speaker.name);
        if let Some(job) = &speaker.job {
            let _ = write!(out, " ({})", job);
        }
        out.push('\n');
    }
    out
}

pub fn render_event(event: ListEvent) -> &'static str {
    match event {
        ListEvent::NoMoreItems => "-- no more speakers to load",
        ListEvent::LoadMoreFailed => "-- could not load more speakers",
        ListEvent::RefreshFinished => "-- refresh finished",
    }
}

/// Forward a command to the coordinator; returns false on quit
fn dispatch(handle: &ListHandle<Speaker>, command: Command) -> bool {
    match command {
        Command::Load => handle.request_initial_load(),
        Command::Refresh => handle.refresh(),
        Command::More => handle.load_more(),
        Command::Near(row) => handle.near_end_of_list(row),
        Command::Query(text) => {
            handle.set_query(text);
            handle.request_initial_load();
        }
        Command::Select(row) => handle.select_item(row),
        Command::Latest(row) => handle.select_latest(row),
        Command::Show => print!("{}", render_snapshot(&handle.current())),
        Command::Help => println!("{}", HELP),
        Command::Quit => return false,
    }
    true
}

/// Run the shell until stdin closes or the user quits
pub async fn run(handle: ListHandle<Speaker>, initial_query: Option<String>) -> Result<()> {
    let mut snapshots = handle.subscribe();
    let mut events = handle.subscribe_events();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    if let Some(query) = initial_query {
        handle.set_query(query);
    }
    handle.request_initial_load();
    println!("{}", HELP);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    break;
                };
                match Command::parse(&line) {
                    Ok(command) => {
                        if !dispatch(&handle, command) {
                            break;
                        }
                    }
                    Err(message) => println!("{}", message),
                }
            }

            changed = snapshots.changed() => {
                if changed.is_err() {
                    tracing::warn!("List coordinator stopped");
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                print!("{}", render_snapshot(&snapshot));
            }

            event = events.recv() => match event {
                Ok(event) => println!("{}", render_event(event)),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Shell fell behind on list events");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    handle.shutdown().await;
    Ok(())
}
