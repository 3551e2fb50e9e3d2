use std::str::FromStr;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use crate::{
    error::AppError,
    models::trip::Trip,
    services::{
        fares::{assess_trip_cost, CostEstimate},
        query::{filter_trips, sort_trips, FilterKey, SortKey},
        storage::ImportStatus,
    },
    state::Session,
};

pub const MENU: &str = "\nList of commands:
add: Add a trip
view: View added trips
delete: Delete a trip
filter: Filter trips by a specific value
sort: Sort trips by budget or date
export: Export trips data to JSON
import: Import trips data from JSON
ticket-price: See best price for your trip via API
exit: Exit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Add,
    View,
    Delete,
    Filter,
    Sort,
    Export,
    Import,
    TicketPrice,
    Exit,
}

impl FromStr for Command {
    type Err = AppError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim() {
            "add" => Ok(Command::Add),
            "view" => Ok(Command::View),
            "delete" => Ok(Command::Delete),
            "filter" => Ok(Command::Filter),
            "sort" => Ok(Command::Sort),
            "export" => Ok(Command::Export),
            "import" => Ok(Command::Import),
            "ticket-price" => Ok(Command::TicketPrice),
            "exit" => Ok(Command::Exit),
            other => Err(AppError::InvalidSelector(format!("command {other:?}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Line-oriented prompt over any async reader/writer pair.
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R, W> Console<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    pub async fn say(&mut self, text: &str) -> Result<(), AppError> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.write_all(b"\n").await?;
        self.output.flush().await?;
        Ok(())
    }

    /// `None` once input is exhausted. Bytes that are not UTF-8 are replaced,
    /// so a garbled line is answered like any other bad input.
    pub async fn ask(&mut self, prompt: &str) -> Result<Option<String>, AppError> {
        self.output.write_all(prompt.as_bytes()).await?;
        self.output.flush().await?;
        let mut raw = Vec::new();
        if self.input.read_until(b'\n', &mut raw).await? == 0 {
            return Ok(None);
        }
        let line = String::from_utf8_lossy(&raw);
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

macro_rules! ask_or_exit {
    ($console:expr, $prompt:expr) => {
        match $console.ask($prompt).await? {
            Some(answer) => answer,
            None => return Ok(Flow::Exit),
        }
    };
}

/// Prompt loop: show the menu, dispatch, repeat until `exit` or end of input.
pub async fn run<R, W>(session: &mut Session, console: &mut Console<R, W>) -> Result<(), AppError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    loop {
        console.say(MENU).await?;
        let Some(choice) = console.ask("\nEnter a command: ").await? else {
            break;
        };
        if handle_command(&choice, session, console).await? == Flow::Exit {
            break;
        }
    }
    Ok(())
}

/// Runs one command. Only console I/O failures escape; everything else is
/// reported at the prompt and the loop continues.
pub async fn handle_command<R, W>(
    choice: &str,
    session: &mut Session,
    console: &mut Console<R, W>,
) -> Result<Flow, AppError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let command = match choice.parse::<Command>() {
        Ok(command) => command,
        Err(_) => {
            console.say("\nPlease enter a valid command!").await?;
            return Ok(Flow::Continue);
        }
    };
    debug!(?command, "dispatch");

    match command {
        Command::Add => add_trip(session, console).await,
        Command::View => {
            view_trips(session.store.list(), console).await?;
            Ok(Flow::Continue)
        }
        Command::Delete => delete_trip(session, console).await,
        Command::Filter => filter(session, console).await,
        Command::Sort => sort(session, console).await,
        Command::Export => {
            match session.storage.export(session.store.list()).await {
                Ok(()) => console.say("\nData is exported successfully").await?,
                Err(err) => {
                    warn!(error = %err, "export failed");
                    console.say(&format!("\n{}", err.user_message())).await?
                }
            }
            Ok(Flow::Continue)
        }
        Command::Import => import(session, console).await,
        Command::TicketPrice => ticket_price(session, console).await,
        Command::Exit => Ok(Flow::Exit),
    }
}

pub async fn view_trips<R, W>(trips: &[Trip], console: &mut Console<R, W>) -> Result<(), AppError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    if trips.is_empty() {
        return console.say("\nNo trips added yet.").await;
    }
    for (index, trip) in trips.iter().enumerate() {
        console
            .say(&format!(
                "\nTrip {}:\nStart City: {}\nDestination: {}\nDates: {}\nBudget: {}\nActivities: {}",
                index + 1,
                trip.start_city,
                trip.destination,
                trip.date,
                trip.budget,
                trip.activities_display(),
            ))
            .await?;
    }
    Ok(())
}

async fn add_trip<R, W>(session: &mut Session, console: &mut Console<R, W>) -> Result<Flow, AppError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let start_city = ask_or_exit!(console, "\nEnter start city: ");
    let destination = ask_or_exit!(console, "\nEnter destination: ");
    let date = ask_or_exit!(console, "\nEnter date: ");
    let budget = ask_or_exit!(console, "\nEnter budget: ");
    let activities = ask_or_exit!(console, "\nEnter activities (comma-separated): ");

    let created = budget
        .trim()
        .parse::<f64>()
        .map_err(|_| AppError::Validation(format!("budget {budget:?} is not a number")))
        .and_then(|budget| {
            Trip::validated(
                start_city.trim(),
                destination.trim(),
                date.trim(),
                budget,
                split_activities(&activities),
            )
        });

    match created {
        Ok(trip) => {
            session.store.add(trip);
            console.say("\nTrip added successfully.").await?;
        }
        Err(err) => {
            warn!(error = %err, "trip rejected");
            console.say(&format!("\n{}", err.user_message())).await?;
        }
    }
    Ok(Flow::Continue)
}

fn split_activities(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|activity| !activity.is_empty())
        .map(str::to_string)
        .collect()
}

async fn delete_trip<R, W>(
    session: &mut Session,
    console: &mut Console<R, W>,
) -> Result<Flow, AppError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    if session.store.is_empty() {
        console.say("\nNo trips added yet.").await?;
        return Ok(Flow::Continue);
    }
    view_trips(session.store.list(), console).await?;

    let answer = ask_or_exit!(console, "\nEnter which trip you want to delete: ");
    let Ok(position) = answer.trim().parse::<i64>() else {
        console
            .say("\nInvalid input. Please enter a valid index.")
            .await?;
        return Ok(Flow::Continue);
    };

    match session.store.remove(position.saturating_sub(1)) {
        Ok(_) => console.say("\nTrip deleted successfully.").await?,
        Err(err) => console.say(&format!("\n{}", err.user_message())).await?,
    }
    Ok(Flow::Continue)
}

async fn filter<R, W>(session: &mut Session, console: &mut Console<R, W>) -> Result<Flow, AppError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let key = ask_or_exit!(
        console,
        "\nEnter a way of filtering : \n\t1.date \n\t2.budget \n\t3.destination\n: "
    );
    let value = ask_or_exit!(console, "\nEnter the value for filtering the trip: ");

    let result = key
        .parse::<FilterKey>()
        .and_then(|key| filter_trips(session.store.list(), key, &value));
    let matches = match result {
        Ok(matches) => matches,
        Err(err) => {
            warn!(error = %err, "filter rejected");
            console.say(&format!("\n{}", err.user_message())).await?;
            Vec::new()
        }
    };
    view_trips(&matches, console).await?;
    Ok(Flow::Continue)
}

async fn sort<R, W>(session: &mut Session, console: &mut Console<R, W>) -> Result<Flow, AppError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let key = ask_or_exit!(console, "\nEnter a way of sorting : \n\t1.budget \n\t2.date\n: ");

    let trips = session.store.list();
    let sorted = match key.parse::<SortKey>() {
        Ok(key) => sort_trips(trips, key),
        Err(err) => {
            warn!(error = %err, "sort rejected, showing trips unsorted");
            console.say(&format!("\n{}", err.user_message())).await?;
            trips.to_vec()
        }
    };
    view_trips(&sorted, console).await?;
    Ok(Flow::Continue)
}

async fn import<R, W>(session: &mut Session, console: &mut Console<R, W>) -> Result<Flow, AppError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let outcome = session.storage.import().await;
    let path = session.storage.path().display().to_string();
    let message = match &outcome.status {
        ImportStatus::Imported => "\nData is imported successfully!".to_string(),
        ImportStatus::NotFound => format!("\nFile '{path}' not found."),
        ImportStatus::Malformed(_) => format!("\nError decoding JSON from file '{path}'."),
        ImportStatus::Unreadable(reason) => format!("\nCould not read file '{path}': {reason}"),
    };
    // Import replaces the session's trips, even with an empty list.
    session.store.replace_all(outcome.trips);
    console.say(&message).await?;
    Ok(Flow::Continue)
}

async fn ticket_price<R, W>(
    session: &mut Session,
    console: &mut Console<R, W>,
) -> Result<Flow, AppError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let answer = ask_or_exit!(console, "\nEnter which trip's expense you want to see: ");
    let Ok(index) = answer.trim().parse::<usize>() else {
        console.say("\nInvalid input!").await?;
        return Ok(Flow::Continue);
    };

    match assess_trip_cost(index, session.store.list(), &*session.fares).await {
        CostEstimate::NoSuchTrip => console.say("\nInvalid input!").await?,
        CostEstimate::NoFare => {
            console
                .say("\nFailed to retrieve ticket price information!")
                .await?
        }
        CostEstimate::Priced {
            price,
            within_budget,
        } => {
            if !within_budget {
                console
                    .say("\nYour budget is not enough for travelling to that point!")
                    .await?;
            }
            console.say(&format!("\nPrice: {price}")).await?;
        }
    }
    Ok(Flow::Continue)
}
