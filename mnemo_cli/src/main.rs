use chrono::Utc;
use clap::{Parser, Subcommand};
use mnemo_core::*;
use std::collections::VecDeque;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "mnemo")]
#[command(about = "Spaced-repetition flashcard scheduler", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a card to the collection
    Add {
        question: String,
        answer: String,

        /// Tag the card (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Free-form note attached to the card
        #[arg(long)]
        notes: Option<String>,
    },

    /// Review due cards (default)
    Review {
        /// Restrict the session to cards carrying any of these tags
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Present due cards in store order instead of failed-first
        #[arg(long)]
        store_order: bool,

        /// Cap the number of cards in this session
        #[arg(long)]
        limit: Option<usize>,

        /// Scripted comma-separated ratings (0-5) instead of prompting
        #[arg(long)]
        ratings: Option<String>,
    },

    /// List cards in the collection
    List {
        /// Only cards carrying any of these tags
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Only cards that are currently due
        #[arg(long)]
        due: bool,
    },

    /// Show collection statistics
    Stats {
        /// Emit statistics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Roll up the review journal into CSV
    Rollup {
        /// Clean up processed journal files after rollup
        #[arg(long)]
        cleanup: bool,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    mnemo_core::logging::init();

    let cli = Cli::parse();

    // Determine data directory
    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());

    match cli.command {
        Some(Commands::Add {
            question,
            answer,
            tags,
            notes,
        }) => cmd_add(data_dir, question, answer, tags, notes),
        Some(Commands::Review {
            tags,
            store_order,
            limit,
            ratings,
        }) => cmd_review(data_dir, tags, store_order, limit, ratings, &config),
        Some(Commands::List { tags, due }) => cmd_list(data_dir, tags, due),
        Some(Commands::Stats { json }) => cmd_stats(data_dir, json),
        Some(Commands::Rollup { cleanup }) => cmd_rollup(data_dir, cleanup),
        None => {
            // Default to a review session
            cmd_review(data_dir, vec![], false, None, None, &config)
        }
    }
}

fn store_path(data_dir: &Path) -> PathBuf {
    data_dir.join("cards.json")
}

fn journal_path(data_dir: &Path) -> PathBuf {
    data_dir.join("journal").join("reviews.jsonl")
}

fn csv_path(data_dir: &Path) -> PathBuf {
    data_dir.join("reviews.csv")
}

fn cmd_add(
    data_dir: PathBuf,
    question: String,
    answer: String,
    tags: Vec<String>,
    notes: Option<String>,
) -> Result<()> {
    let store = CardStore::new(store_path(&data_dir));
    let mut cards = store.load()?;

    let mut card = Card::new(question, answer, tags, Utc::now());
    card.notes = notes;
    let id = card.id;

    cards.push(card);
    store.save(&cards)?;

    println!("✓ Card added ({})", id);
    println!("  {} card(s) in collection", cards.len());
    Ok(())
}

fn cmd_review(
    data_dir: PathBuf,
    tags: Vec<String>,
    store_order: bool,
    limit: Option<usize>,
    ratings: Option<String>,
    config: &Config,
) -> Result<()> {
    let store = CardStore::new(store_path(&data_dir));
    let mut cards = store.load()?;
    tracing::debug!("Loaded {} cards from store", cards.len());

    if cards.is_empty() {
        println!("No cards yet. Add one with `mnemo add`.");
        return Ok(());
    }

    let now = Utc::now();
    let failed_first = !store_order && config.review.failed_first;
    let mut queue = select_due_tagged(&cards, &tags, now, failed_first);

    // Cap how many never-reviewed cards enter a single session
    let max_new = config.review.max_new_per_session;
    if max_new > 0 {
        let mut new_seen = 0;
        queue.retain(|c| {
            if c.last_rating().is_some() {
                return true;
            }
            new_seen += 1;
            new_seen <= max_new
        });
    }

    if let Some(limit) = limit {
        queue.truncate(limit);
    }

    if queue.is_empty() {
        println!("Nothing due right now.");
        return Ok(());
    }

    let total = queue.len();
    display_session_header(total);

    let mut script = parse_rating_script(ratings.as_deref())?;
    let mut sink = JsonlSink::new(journal_path(&data_dir));
    let mut session = ReviewSession::new(queue);
    let mut aborted = false;

    loop {
        let (question, answer, repeat) = match session.current() {
            Some(card) => (
                card.question.clone(),
                card.answer.clone(),
                session.state() == SessionState::Requeued,
            ),
            None => break,
        };

        display_question(&question, repeat);

        let rating = match next_rating(&mut script, &answer)? {
            Some(rating) => rating,
            None => {
                aborted = true;
                break;
            }
        };

        let (updated, step) = session.rate(rating, Utc::now())?;

        // Persist every review immediately: store first, then journal
        *find_by_id_mut(&mut cards, updated.id)? = updated.clone();
        store.save(&cards)?;
        if let Some(event) = ReviewEvent::from_card(&updated) {
            sink.append(&event)?;
        }

        match step {
            SessionStep::Requeued => println!("  ↻ Below 4 - same card again."),
            SessionStep::NextCard => {}
            SessionStep::Finished => break,
        }
    }

    let done = session.reviewed().len();
    if aborted {
        println!("\nSession ended early: {} of {} card(s) completed.", done, total);
    } else {
        println!("\n✓ Session complete: {} card(s) reviewed.", done);
    }
    Ok(())
}

fn cmd_list(data_dir: PathBuf, tags: Vec<String>, due_only: bool) -> Result<()> {
    let store = CardStore::new(store_path(&data_dir));
    let cards = store.load()?;
    let now = Utc::now();

    let mut selected = select_by_tags(&cards, &tags);
    if due_only {
        selected.retain(|c| is_due(c, now));
    }

    if selected.is_empty() {
        println!("No matching cards.");
        return Ok(());
    }

    for card in &selected {
        let due_marker = if is_due(card, now) { "●" } else { " " };
        println!(
            "{} {}  EF {:.2}  interval {}d  reps {}  due {}",
            due_marker,
            card.id,
            card.ease_factor,
            card.interval_days,
            card.repetition,
            card.due_date.format("%Y-%m-%d")
        );
        println!("    Q: {}", card.question);
        if !card.tags.is_empty() {
            println!("    tags: {}", card.tags.join(", "));
        }
    }

    println!("\n{} card(s)", selected.len());
    Ok(())
}

fn cmd_stats(data_dir: PathBuf, json: bool) -> Result<()> {
    let store = CardStore::new(store_path(&data_dir));
    let cards = store.load()?;
    let stats = compute_stats(&cards, Utc::now());

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  COLLECTION STATISTICS");
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  Total cards:      {}", stats.total_cards);
    println!("  Due now:          {}", stats.due_cards);
    println!("  Mean ease factor: {:.2}", stats.avg_ease_factor);
    println!();
    println!("  Rating distribution:");
    for (rating, count) in stats.performance_distribution.iter().enumerate() {
        println!("    {}: {}", rating, count);
    }

    if !stats.reviews_by_day.is_empty() {
        println!();
        println!("  Latest reviews by day:");
        for (day, count) in &stats.reviews_by_day {
            println!("    {}: {}", day, count);
        }
    }

    if !stats.upcoming_reviews.is_empty() {
        println!();
        println!("  Coming due (next 30 days):");
        for (day, count) in &stats.upcoming_reviews {
            println!("    {}: {}", day, count);
        }
    }

    println!();
    Ok(())
}

fn cmd_rollup(data_dir: PathBuf, cleanup: bool) -> Result<()> {
    let journal = journal_path(&data_dir);
    let csv = csv_path(&data_dir);

    if !journal.exists() {
        println!("No journal file found - nothing to roll up.");
        return Ok(());
    }

    let count = mnemo_core::csv_rollup::journal_to_csv_and_archive(&journal, &csv)?;

    println!("✓ Rolled up {} review(s) to CSV", count);
    println!("  CSV: {}", csv.display());

    if cleanup {
        let journal_dir = journal.parent().unwrap_or(&data_dir);
        let cleaned = mnemo_core::csv_rollup::cleanup_processed_journals(journal_dir)?;
        if cleaned > 0 {
            println!("✓ Cleaned up {} processed journal file(s)", cleaned);
        }
    }

    Ok(())
}

fn display_session_header(total: usize) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  REVIEW SESSION: {} card(s) due", total);
    println!("╰─────────────────────────────────────────╯");
}

fn display_question(question: &str, repeat: bool) {
    println!();
    if repeat {
        println!("  ↻ Q: {}", question);
    } else {
        println!("  Q: {}", question);
    }
}

/// Parse a `--ratings 5,2,4` script into a queue of validated ratings
fn parse_rating_script(script: Option<&str>) -> Result<Option<VecDeque<Rating>>> {
    let Some(script) = script else {
        return Ok(None);
    };

    let mut ratings = VecDeque::new();
    for part in script.split(',') {
        let value: u8 = part
            .trim()
            .parse()
            .map_err(|_| Error::Other(format!("Invalid rating in script: {:?}", part.trim())))?;
        ratings.push_back(Rating::new(value)?);
    }
    Ok(Some(ratings))
}

/// Produce the next rating: scripted if a script is active, prompted
/// otherwise. None ends the session (script exhausted or user quit).
fn next_rating(script: &mut Option<VecDeque<Rating>>, answer: &str) -> Result<Option<Rating>> {
    match script {
        Some(seq) => match seq.pop_front() {
            Some(rating) => {
                println!("  A: {}", answer);
                println!("  → rated {}", rating);
                Ok(Some(rating))
            }
            None => Ok(None),
        },
        None => prompt_rating(answer),
    }
}

fn prompt_rating(answer: &str) -> Result<Option<Rating>> {
    println!("  (press Enter to reveal the answer)");
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;

    println!("  A: {}", answer);

    loop {
        print!("Rating 0-5 (q to quit) > ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let trimmed = input.trim();

        if trimmed.eq_ignore_ascii_case("q") {
            return Ok(None);
        }

        match trimmed.parse::<u8>().map(Rating::new) {
            Ok(Ok(rating)) => return Ok(Some(rating)),
            _ => println!("Enter a number from 0 (blackout) to 5 (perfect)."),
        }
    }
}
