//! CLI binary for receipt-extract.
//!
//! A thin shim over the library crate: flags map to `ClientConfig`, every
//! command drives a `ReceiptForm` or `HttpReceiptApi`, and results are
//! printed to stdout with diagnostics on stderr.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use receipt_extract::view::{summary_lines, FETCH_ACTION_LABEL, USER_ID_PLACEHOLDER};
use receipt_extract::{
    ClientConfig, FetchOutcome, FormView, HttpReceiptApi, Notice, ReceiptApi, ReceiptForm,
    ReceiptUpload, SubmitOutcome, DEFAULT_BASE_URL,
};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Interactive form (pick a file, type a user id, extract, fetch text)
  receipt form

  # One-shot extraction, then show the stored raw text
  receipt extract ./receipt.png --user-id 42 --fetch-text

  # Raw JSON response only
  receipt extract ./receipt.png -u 42 --json > receipt.json

  # Raw text of an already extracted receipt
  receipt text 42 0b6f3c1e-5c1a-4f0e-9d0c-2f8e2b7d9a10

  # Who owes what
  receipt split 42 0b6f3c1e-5c1a-4f0e-9d0c-2f8e2b7d9a10

  # Share item #0 between participants 1 and 2
  receipt assign 42 0b6f3c1e-5c1a-4f0e-9d0c-2f8e2b7d9a10 0 1 2

ENVIRONMENT VARIABLES:
  RECEIPT_API_URL   Base URL of the receipt service (default http://localhost:8080)
  RECEIPT_TIMEOUT   Request timeout in seconds, 0 for none (default 0)
  RUST_LOG          Overrides the log filter
"#;

/// Upload receipt images for extraction and inspect the results.
#[derive(Parser, Debug)]
#[command(
    name = "receipt",
    version,
    about = "Upload receipt images for extraction and inspect the results",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Base URL of the receipt service.
    #[arg(long, global = true, env = "RECEIPT_API_URL", default_value = DEFAULT_BASE_URL)]
    api_url: String,

    /// Request timeout in seconds (0 = wait forever).
    #[arg(long, global = true, env = "RECEIPT_TIMEOUT", default_value_t = 0)]
    timeout: u64,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "RECEIPT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and results.
    #[arg(short, long, global = true, env = "RECEIPT_QUIET")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fill in the receipt form interactively.
    Form,

    /// Upload one receipt image for extraction.
    Extract {
        /// Receipt image to upload.
        file: PathBuf,

        /// User the receipt belongs to.
        #[arg(short, long)]
        user_id: Option<String>,

        /// Also fetch the stored raw text when a receipt id comes back.
        #[arg(long)]
        fetch_text: bool,

        /// Print only the JSON response.
        #[arg(long)]
        json: bool,
    },

    /// Print the stored raw text of an extracted receipt.
    Text { user_id: String, receipt_id: String },

    /// Show how much each participant owes for a receipt.
    Split {
        user_id: String,
        receipt_id: String,

        /// Print the amounts as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Assign participants to one receipt line.
    Assign {
        user_id: String,
        receipt_id: String,
        /// Zero-based index of the line in the receipt's item list.
        item_index: usize,
        /// Participant ids sharing the line.
        #[arg(required = true)]
        participants: Vec<i64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build client ─────────────────────────────────────────────────────
    let config = ClientConfig::builder()
        .base_url(cli.api_url.clone())
        .request_timeout_secs(cli.timeout)
        .build()
        .context("Invalid configuration")?;
    let api = HttpReceiptApi::new(&config).context("Failed to set up the HTTP client")?;

    match cli.command {
        Command::Form => run_form(&api, cli.quiet).await,
        Command::Extract {
            ref file,
            ref user_id,
            fetch_text,
            json,
        } => {
            run_extract(
                &api,
                file,
                user_id.clone().unwrap_or_default(),
                fetch_text,
                json,
                cli.quiet,
            )
            .await
        }
        Command::Text {
            ref user_id,
            ref receipt_id,
        } => {
            let bar = spinner("Fetching receipt text…", cli.quiet);
            let text = api.receipt_text(user_id, receipt_id).await;
            finish(bar);
            let text = text.context("Failed to fetch receipt text")?;
            println!("{text}");
            Ok(())
        }
        Command::Split {
            ref user_id,
            ref receipt_id,
            json,
        } => {
            let bar = spinner("Calculating split…", cli.quiet);
            let owed = api.calculate_split(user_id, receipt_id).await;
            finish(bar);
            let owed = owed.context("Failed to calculate split")?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&owed).context("Failed to serialise amounts")?
                );
            } else if owed.is_empty() {
                println!("{}", dim("Nobody owes anything for this receipt."));
            } else {
                println!("{}", bold("Participant   Owes"));
                for (participant, amount) in &owed {
                    println!("{:<13} ${:.2}", participant, amount);
                }
            }
            Ok(())
        }
        Command::Assign {
            ref user_id,
            ref receipt_id,
            item_index,
            ref participants,
        } => {
            let bar = spinner("Assigning participants…", cli.quiet);
            let reply = api
                .assign_users(user_id, receipt_id, item_index, participants)
                .await;
            finish(bar);
            let reply = reply.context("Failed to assign participants")?;
            println!("{} {}", green("✔"), reply);
            Ok(())
        }
    }
}

/// One-shot extraction through the same form the interactive mode uses.
async fn run_extract(
    api: &HttpReceiptApi,
    file: &Path,
    user_id: String,
    fetch_text: bool,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let mut form = ReceiptForm::new();
    form.set_file(
        ReceiptUpload::from_path(file)
            .await
            .with_context(|| format!("Failed to load receipt {}", file.display()))?,
    );
    form.set_user_id(user_id);

    let bar = spinner("Extracting receipt…", quiet);
    let outcome = form.submit(api).await;
    finish(bar);

    if fetch_text && outcome == SubmitOutcome::Extracted {
        if form.can_fetch_raw_text() {
            let bar = spinner("Fetching receipt text…", quiet);
            form.fetch_raw_text(api).await;
            finish(bar);
        } else if !quiet {
            eprintln!("{}", dim("No receipt id in the response; skipping raw text."));
        }
    }

    if json {
        if let Some(response) = form.response() {
            println!("{}", response.pretty());
        }
    } else {
        print_view(&FormView::of(&form));
    }
    if let Some(notice) = form.dismiss_notice() {
        print_notice(&notice);
    }

    match form.error() {
        Some(error) => anyhow::bail!("{error}"),
        None => Ok(()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormAction {
    ChooseFile,
    SetUserId,
    Extract,
    FetchRawText,
    Quit,
}

impl FormAction {
    fn label(self) -> &'static str {
        match self {
            FormAction::ChooseFile => "Choose receipt image…",
            FormAction::SetUserId => "Set user ID…",
            FormAction::Extract => "Extract",
            FormAction::FetchRawText => FETCH_ACTION_LABEL,
            FormAction::Quit => "Quit",
        }
    }
}

/// Interactive form loop: render, pick an action, apply it, repeat.
async fn run_form(api: &HttpReceiptApi, quiet: bool) -> Result<()> {
    let theme = ColorfulTheme::default();
    let mut form = ReceiptForm::new();

    loop {
        println!();
        print_view(&FormView::of(&form));

        // The notice blocks the form until acknowledged.
        if let Some(notice) = form.dismiss_notice() {
            print_notice(&notice);
            Confirm::with_theme(&theme)
                .with_prompt("OK")
                .default(true)
                .show_default(false)
                .interact()?;
            continue;
        }

        let mut actions = vec![FormAction::ChooseFile, FormAction::SetUserId, FormAction::Extract];
        if form.can_fetch_raw_text() {
            actions.push(FormAction::FetchRawText);
        }
        actions.push(FormAction::Quit);
        let labels: Vec<&str> = actions.iter().map(|a| a.label()).collect();

        let choice = Select::with_theme(&theme)
            .with_prompt("Action")
            .items(&labels)
            .default(0)
            .interact()?;

        match actions[choice] {
            FormAction::ChooseFile => {
                let path: String = Input::with_theme(&theme)
                    .with_prompt("Receipt image (empty to clear)")
                    .allow_empty(true)
                    .interact_text()?;
                let path = path.trim();
                if path.is_empty() {
                    form.clear_file();
                    continue;
                }
                match ReceiptUpload::from_path(path).await {
                    Ok(upload) => {
                        if !upload.is_image() {
                            eprintln!(
                                "{} {} is {}, not an image",
                                cyan("⚠"),
                                upload.file_name(),
                                upload.mime_type()
                            );
                        }
                        form.set_file(upload);
                    }
                    Err(e) => eprintln!("{} {}", red("✘"), e),
                }
            }
            FormAction::SetUserId => {
                let user_id: String = Input::with_theme(&theme)
                    .with_prompt(USER_ID_PLACEHOLDER)
                    .with_initial_text(form.user_id())
                    .allow_empty(true)
                    .interact_text()?;
                form.set_user_id(user_id);
            }
            FormAction::Extract => {
                let bar = spinner("Extracting receipt…", quiet);
                let outcome = form.submit(api).await;
                finish(bar);
                if outcome == SubmitOutcome::Extracted && !quiet {
                    eprintln!("{} extracted", green("✔"));
                }
            }
            FormAction::FetchRawText => {
                let bar = spinner("Fetching receipt text…", quiet);
                let outcome = form.fetch_raw_text(api).await;
                finish(bar);
                if outcome == FetchOutcome::Unavailable {
                    eprintln!("{}", dim("No receipt id to fetch."));
                }
            }
            FormAction::Quit => return Ok(()),
        }
    }
}

// ── Rendering ────────────────────────────────────────────────────────────────

fn print_view(view: &FormView) {
    println!("{}", bold(view.title));
    println!("  {}  {}", dim("File:   "), view.file_label);
    println!("  {}  {}", dim("User ID:"), view.user_id_label);
    if let Some(action) = &view.fetch_action {
        println!(
            "  {} {}",
            cyan(&format!("[{}]", action.label)),
            dim(&format!("receipt {}", action.receipt_id))
        );
    }
    if let Some(error) = &view.error {
        println!("  {}", red(error));
    }
    if let Some(json) = &view.response_json {
        println!();
        println!("{}", bold(receipt_extract::view::RESPONSE_TITLE));
        println!("{json}");
        if let Some(summary) = &view.summary {
            for line in summary_lines(summary) {
                println!("{}", dim(&line));
            }
        }
    }
}

fn print_notice(notice: &Notice) {
    let rule = "─".repeat(40);
    println!();
    println!("{}", cyan(&rule));
    println!("{}", bold(&format!("{}:", notice.title)));
    println!("{}", notice.body);
    println!("{}", cyan(&rule));
}

// ── Progress ─────────────────────────────────────────────────────────────────

fn spinner(message: &'static str, quiet: bool) -> Option<ProgressBar> {
    if quiet {
        return None;
    }
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(80));
    Some(bar)
}

fn finish(bar: Option<ProgressBar>) {
    if let Some(bar) = bar {
        bar.finish_and_clear();
    }
}
