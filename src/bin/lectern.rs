//! Terminal operator console.
//!
//! Runs a console against in-process collaborators: a seeded deck catalog, a
//! local session, and a headless viewer. Stdin lines become control events;
//! view events print as the console applies them. Useful for driving the
//! sync behavior by hand — run two instances against a shared store embedding
//! to watch them mirror each other.

use std::str::FromStr;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use lectern::{
    AuthProvider, ConsoleConfig, ConsoleHandle, ControlEvent, DeckId, DeckViewer, MemoryAuth,
    MemoryStore, MemoryViewer, PresenterState, StateStore, StepDirection, ViewEvent,
    spawn_console,
};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("reading stdin failed: {0}")]
    Stdin(#[from] std::io::Error),
}

/// One deck made available to the presentation, as `ID=PAGES`.
#[derive(Clone, Debug)]
struct DeckSpec {
    id: DeckId,
    pages: u32,
}

impl FromStr for DeckSpec {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let Some((id, pages)) = raw.split_once('=') else {
            return Err(format!("expected ID=PAGES, got `{raw}`"));
        };
        let id = id.trim();
        if id.is_empty() {
            return Err("deck id must not be empty".to_owned());
        }
        let pages: u32 = pages
            .trim()
            .parse()
            .map_err(|_| format!("invalid page count in `{raw}`"))?;
        if pages == 0 {
            return Err("page count must be at least 1".to_owned());
        }
        Ok(Self { id: DeckId::new(id), pages })
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "lectern",
    about = "Terminal operator console for a mirrored slide presentation"
)]
struct Cli {
    /// Decks available to this presentation.
    #[arg(long = "deck", value_name = "ID=PAGES")]
    decks: Vec<DeckSpec>,

    /// Deck to start presenting, seeded into the shared state at page 1.
    #[arg(long, value_name = "ID")]
    start_deck: Option<String>,

    /// Sign this operator in at startup.
    #[arg(long, env = "LECTERN_OPERATOR_EMAIL", value_name = "EMAIL")]
    operator_email: Option<String>,

    /// Login surface to direct sign-in requests to.
    #[arg(long, value_name = "URL")]
    login_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let env_file = dotenvy::dotenv();
    tracing_subscriber::fmt::init();
    if let Ok(path) = env_file {
        tracing::debug!(path = %path.display(), "environment loaded from file");
    }

    let cli = Cli::parse();

    let mut store = MemoryStore::new().with_decks(cli.decks.iter().map(|deck| deck.id.clone()));
    if let Some(id) = &cli.start_deck {
        store = store.with_state(&PresenterState::new(id.as_str(), 1));
    }
    let auth = match &cli.operator_email {
        Some(email) => MemoryAuth::signed_in(email),
        None => MemoryAuth::new(),
    };
    let viewer = MemoryViewer::new()
        .with_catalog(cli.decks.iter().map(|deck| (deck.id.clone(), deck.pages)));

    let mut config = ConsoleConfig::from_env();
    if let Some(url) = cli.login_url {
        config.login_url = url;
    }

    let store = Arc::new(store);
    let auth = Arc::new(auth);
    let mut handle = spawn_console(
        Arc::clone(&store) as Arc<dyn StateStore>,
        Arc::clone(&auth) as Arc<dyn AuthProvider>,
        Arc::new(viewer) as Arc<dyn DeckViewer>,
        config,
    );

    if let Some(mut events) = handle.view_events() {
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                print_event(&event);
            }
        });
    }

    print_help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if !run_command(&handle, &store, &auth, line.trim()).await {
            break;
        }
    }

    handle.shutdown().await;
    Ok(())
}

/// Execute one stdin command. Returns `false` when the session should end.
async fn run_command(
    handle: &ConsoleHandle,
    store: &MemoryStore,
    auth: &MemoryAuth,
    line: &str,
) -> bool {
    let (command, rest) = match line.split_once(' ') {
        Some((head, tail)) => (head, tail.trim()),
        None => (line, ""),
    };

    let control = match command {
        "" => None,
        "deck" => {
            if rest.is_empty() {
                eprintln!("usage: deck <id>");
                None
            } else {
                Some(ControlEvent::DeckSelected(DeckId::new(rest)))
            }
        }
        "page" => {
            if rest.is_empty() {
                eprintln!("usage: page <number>");
                None
            } else {
                Some(ControlEvent::PageEntered(rest.to_owned()))
            }
        }
        "next" => Some(ControlEvent::StepRequested(StepDirection::Forward)),
        "prev" => Some(ControlEvent::StepRequested(StepDirection::Back)),
        "login" => {
            if rest.is_empty() {
                Some(ControlEvent::LoginRequested)
            } else {
                // Stands in for the external login flow.
                let operator = auth.sign_in(rest).await;
                println!("signed in as {}", operator.email);
                None
            }
        }
        "logout" => Some(ControlEvent::LogoutRequested),
        "decks" => {
            print_decks(store).await;
            None
        }
        "status" => {
            print_status(handle, store).await;
            None
        }
        "help" => {
            print_help();
            None
        }
        "quit" | "exit" => return false,
        other => {
            eprintln!("unknown command: {other} (try `help`)");
            None
        }
    };

    match control {
        Some(event) => handle.control(event).await,
        None => true,
    }
}

fn print_event(event: &ViewEvent) {
    match event {
        ViewEvent::DeckOptions(decks) => {
            let ids: Vec<&str> = decks.iter().map(DeckId::as_str).collect();
            println!("decks available: {}", ids.join(", "));
        }
        ViewEvent::DeckShown { deck, page_count } => {
            println!("showing deck {deck} ({page_count} pages)");
        }
        ViewEvent::PageShown(page) => println!("page {page}"),
        ViewEvent::AuthChanged(Some(operator)) => println!("signed in: {}", operator.email),
        ViewEvent::AuthChanged(None) => println!("signed out"),
        ViewEvent::NavigateToLogin { url } => {
            println!("open {url} to sign in, then run `login <email>`");
        }
    }
}

async fn print_decks(store: &MemoryStore) {
    match store.list_decks().await {
        Ok(decks) => {
            for deck in decks {
                println!("{}", deck.id);
            }
        }
        Err(e) => eprintln!("deck listing failed: {e}"),
    }
}

async fn print_status(handle: &ConsoleHandle, store: &MemoryStore) {
    let panel = handle.panel().await;
    let deck = panel.selected_deck.as_ref().map_or("-", DeckId::as_str);
    let pages = panel
        .page_count
        .map_or_else(|| "-".to_owned(), |count| count.to_string());
    let operator = panel.operator.as_ref().map_or("-", |op| op.email.as_str());
    println!(
        "deck: {deck}  page: {}  pages: {pages}  operator: {operator}",
        panel.page_entry
    );

    match store.read().await {
        Ok(state) => println!("shared: deck {} page {}", state.deck, state.page),
        Err(e) => println!("shared: {e}"),
    }
}

fn print_help() {
    println!("commands:");
    println!("  decks              list decks in the store");
    println!("  deck <id>          switch the presentation to a deck");
    println!("  page <number>      jump to a page");
    println!("  next / prev        step one page");
    println!("  login [email]      open the login flow, or finish it with an email");
    println!("  logout             sign out");
    println!("  status             show panel and shared state");
    println!("  quit               exit");
}
