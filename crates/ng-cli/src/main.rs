mod agents;
mod chat;

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use ng_core::{
    ActiveContext, AgentKind, Conversation, Protocol, Registry, Severity, export_json,
    export_text, spoken_text,
};
use ng_store::{DataDir, read_json, write_json, write_text};

#[derive(Parser)]
#[command(name = "ng", about = "NeuroGlyph protocol tools and conversation CLI")]
struct Cli {
    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Style {
    /// Pictographic symbols where registered
    Symbol,
    /// Canonical `/word` identifiers
    Slash,
}

#[derive(clap::Args)]
struct Setup {
    /// Conversation topic
    #[arg(long, default_value = "Open dialogue")]
    topic: String,

    /// Comma-separated participants (defaults to the configured list)
    #[arg(long, value_delimiter = ',')]
    participants: Vec<String>,

    /// Context for the opening message
    #[arg(long)]
    context: Option<String>,

    /// Intent for the opening message
    #[arg(long)]
    intent: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a message and report its tokens and diagnostics
    Parse {
        /// Message text (reads stdin when omitted)
        text: Option<String>,

        /// Print the parsed message as JSON
        #[arg(long)]
        json: bool,

        /// Exit with an error when the message is not valid
        #[arg(long)]
        strict: bool,
    },

    /// Re-render a message in symbol or slash notation
    Format {
        /// Message text (reads stdin when omitted)
        text: Option<String>,

        /// Output notation (defaults to the configured preference)
        #[arg(long, value_enum)]
        style: Option<Style>,
    },

    /// Print the opening message for a new conversation
    Init {
        #[command(flatten)]
        setup: Setup,

        /// Save the new conversation to the data directory
        #[arg(long)]
        save: bool,
    },

    /// Run an interactive conversation over stdin
    Chat {
        #[command(flatten)]
        setup: Setup,

        /// Do not save when the session ends
        #[arg(long)]
        no_save: bool,
    },

    /// Show a saved conversation
    Show {
        /// Conversation export file
        path: PathBuf,

        /// Print the JSON export instead of the transcript
        #[arg(long)]
        json: bool,

        /// Print only what would be read aloud, one line per message
        #[arg(long, conflicts_with = "json")]
        spoken: bool,

        /// Write the transcript (or JSON with --json) to a file instead
        #[arg(long, conflicts_with = "spoken")]
        out: Option<PathBuf>,
    },

    /// Show message counts for a saved conversation
    Stats {
        /// Conversation export file
        path: PathBuf,
    },

    /// List saved conversations
    List,
}

fn open_data() -> Result<DataDir> {
    let base_dir = std::env::var("NG_DATA_DIR").ok().map(PathBuf::from);
    DataDir::open(base_dir.as_deref()).context("failed to open data directory")
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Parse { text, json, strict } => cmd_parse(text.as_deref(), *json, *strict),
        Commands::Format { text, style } => cmd_format(text.as_deref(), *style),
        Commands::Init { setup, save } => cmd_init(setup, *save),
        Commands::Chat { setup, no_save } => cmd_chat(setup, *no_save),
        Commands::Show {
            path,
            json,
            spoken,
            out,
        } => cmd_show(path, *json, *spoken, out.as_deref()),
        Commands::Stats { path } => cmd_stats(path),
        Commands::List => cmd_list(),
    }
}

fn read_input(text: Option<&str>) -> Result<String> {
    match text {
        Some(text) => Ok(text.to_string()),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

/// Empty conversation honoring the configured sticky keys and history window.
fn new_conversation(data: &DataDir) -> Conversation {
    let config = data.config();
    let mut conversation =
        Conversation::with_context(ActiveContext::with_sticky_keys(config.sticky_keys.clone()));
    conversation.history_window = config.history_window;
    conversation
}

fn participants(data: &DataDir, setup: &Setup) -> Vec<String> {
    if setup.participants.is_empty() {
        data.config().default_participants.clone()
    } else {
        setup
            .participants
            .iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect()
    }
}

fn cmd_parse(text: Option<&str>, json: bool, strict: bool) -> Result<()> {
    let text = read_input(text)?;
    let protocol = Protocol::neuroglyph();
    let message = protocol.parse(&text, "Human", AgentKind::Human);

    if json {
        let out = serde_json::to_string_pretty(&message).context("failed to serialize message")?;
        println!("{out}");
    } else {
        println!("tokens:     {}", message.tokens.len());
        for (key, value) in &message.tokens {
            println!("  {key} = {value:?}");
        }
        println!("valid:      {}", message.is_valid);
        for diagnostic in message.diagnostics(&protocol) {
            println!("{}: {}", diagnostic.severity.as_str(), diagnostic.message);
        }
    }

    if strict && !message.is_valid {
        let errors: Vec<String> = message
            .diagnostics(&protocol)
            .into_iter()
            .filter(|d| d.severity == Severity::Error)
            .map(|d| d.message)
            .collect();
        bail!("message is not valid: {}", errors.join("; "));
    }
    Ok(())
}

fn cmd_format(text: Option<&str>, style: Option<Style>) -> Result<()> {
    let text = read_input(text)?;
    let prefer_symbol = match style {
        Some(Style::Symbol) => true,
        Some(Style::Slash) => false,
        None => open_data()?.config().prefer_symbols,
    };
    let protocol = Protocol::neuroglyph();
    let tokens = protocol.tokenize(&text);
    if tokens.is_empty() {
        tracing::warn!("no tokens found in input");
    }
    println!("{}", protocol.format(&tokens, prefer_symbol));
    Ok(())
}

fn cmd_init(setup: &Setup, save: bool) -> Result<()> {
    let data = open_data()?;
    let protocol = Protocol::neuroglyph();
    let mut conversation = new_conversation(&data);
    let people = participants(&data, setup);
    let init = conversation.initialize(
        &protocol,
        &setup.topic,
        &people,
        setup.context.as_deref(),
        setup.intent.as_deref(),
    );
    println!("{}", init.raw_text);

    if save {
        let path = data
            .conversations()
            .save(&conversation)
            .context("failed to save conversation")?;
        println!("saved to {}", path.display());
    }
    Ok(())
}

fn cmd_chat(setup: &Setup, no_save: bool) -> Result<()> {
    let data = open_data()?;
    let people = participants(&data, setup);
    let conversation = new_conversation(&data);
    let mut session = chat::Session::new(&data, conversation);

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout().lock();
    session.start(
        &setup.topic,
        &people,
        setup.context.as_deref(),
        setup.intent.as_deref(),
        &mut stdout,
    )?;
    session.run(stdin.lock(), &mut stdout)?;
    drop(stdout);

    if data.config().auto_save && !no_save {
        let path = session.save().context("failed to save conversation")?;
        println!("conversation saved to {}", path.display());
    }
    Ok(())
}

fn load_conversation(data: &DataDir, path: &Path) -> Result<Conversation> {
    read_json(path, &data.config().sticky_keys)
        .with_context(|| format!("failed to load {}", path.display()))
}

fn cmd_show(path: &Path, json: bool, spoken: bool, out: Option<&Path>) -> Result<()> {
    let data = open_data()?;
    let conversation = load_conversation(&data, path)?;

    if let Some(out) = out {
        let written = if json {
            write_json(out, &conversation)
        } else {
            write_text(out, &conversation)
        };
        written.with_context(|| format!("failed to write {}", out.display()))?;
        println!("written to {}", out.display());
    } else if json {
        println!(
            "{}",
            export_json(&conversation).context("failed to serialize conversation")?
        );
    } else if spoken {
        let registry = Registry::neuroglyph();
        for msg in conversation.history() {
            let text = spoken_text(&registry, &msg.raw_text);
            if !text.is_empty() {
                println!("[{}]: {text}", msg.agent);
            }
        }
    } else {
        print!("{}", export_text(&conversation));
    }
    Ok(())
}

fn cmd_stats(path: &Path) -> Result<()> {
    let data = open_data()?;
    let conversation = load_conversation(&data, path)?;
    let stats = conversation.stats();
    let name = |kind: AgentKind| data.config().agent(kind).map_or("-", |a| a.name.as_str());

    println!("id:         {}", conversation.id);
    println!("messages:   {}", stats.total);
    println!("human:      {}", stats.human);
    println!("model_a:    {} ({})", stats.model_a, name(AgentKind::ModelA));
    println!("model_b:    {} ({})", stats.model_b, name(AgentKind::ModelB));
    println!("invalid:    {}", stats.invalid);
    println!(
        "focus:      {}",
        conversation.active_context().get("/focus").unwrap_or("-")
    );
    Ok(())
}

fn cmd_list() -> Result<()> {
    let data = open_data()?;
    let paths = data
        .conversations()
        .list()
        .context("failed to list conversations")?;
    if paths.is_empty() {
        println!("(no saved conversations)");
        return Ok(());
    }
    for path in paths {
        match read_json(&path, &data.config().sticky_keys) {
            Ok(conversation) => {
                let stats = conversation.stats();
                println!(
                    "{}  messages={}  invalid={}  focus={}",
                    conversation.id,
                    stats.total,
                    stats.invalid,
                    conversation.active_context().get("/focus").unwrap_or("-")
                );
            }
            Err(e) => tracing::warn!("skipping {}: {e}", path.display()),
        }
    }
    Ok(())
}
