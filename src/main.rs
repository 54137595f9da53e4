mod auth;
mod backend_service;
mod chat;
mod config;
mod error;
mod state;
mod translate;
mod widgets;

#[cfg(test)]
mod test_support;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use backend_service::SignupForm;
use config::Config;
use state::AppState;
use translate::RenderedTranslation;

#[derive(Parser)]
#[command(
    name = "textbook-translate",
    version,
    about = "Translation and chat client for the textbook backend"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a JSON or YAML config file.
    #[arg(short, long)]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate one or more passages.
    Translate {
        texts: Vec<String>,
        #[arg(long)]
        to: Option<String>,
        #[arg(long)]
        from: Option<String>,
        /// general, robotics, ai or programming.
        #[arg(long)]
        domain: Option<String>,
        #[arg(long)]
        context: Option<String>,
        /// Print the translation history afterwards.
        #[arg(long)]
        history: bool,
        /// Swap the source and target languages first.
        #[arg(long)]
        swap: bool,
    },
    /// Translate button: each press toggles between the passage and its translation.
    Button {
        text: String,
        #[arg(long)]
        to: Option<String>,
        #[arg(long)]
        domain: Option<String>,
        #[arg(long)]
        context: Option<String>,
        #[arg(long, default_value_t = 1)]
        presses: u32,
    },
    /// Translate several passages in a single request.
    Batch {
        texts: Vec<String>,
        #[arg(long)]
        to: Option<String>,
        #[arg(long)]
        from: Option<String>,
    },
    /// Translate a text file paragraph by paragraph.
    Page {
        path: String,
        #[arg(long)]
        to: Option<String>,
        /// Emit an HTML fragment instead of plain text.
        #[arg(long)]
        html: bool,
    },
    /// Live translation of stdin; each line replaces the current text.
    /// `:off`, `:on`, `:toggle`, `:clear`, `:lang <code>` and `:status` control the translator.
    Live {
        #[arg(long)]
        to: Option<String>,
    },
    /// Quick translator: one translation per stdin line. `:lang <code>` switches
    /// target, `:langs` toggles the language list, `:close` closes the modal.
    Quick,
    /// List supported languages.
    Languages,
    /// Show translation cache statistics.
    CacheStats,
    /// Clear the backend translation cache.
    ClearCache,
    /// Ask the textbook chatbot. Without a query, each stdin line is a question.
    Ask {
        #[arg(trailing_var_arg = true)]
        query: Vec<String>,
        #[arg(long)]
        background: Option<String>,
        /// Print the whole conversation at the end.
        #[arg(long)]
        transcript: bool,
    },
    /// Sign in and print the profile.
    Signin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account.
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "None")]
        gpu: String,
        #[arg(long, default_value = "Beginner")]
        ros_level: String,
        #[arg(long, default_value = "Beginner")]
        programming_level: String,
        #[arg(long, default_value = "en")]
        language: String,
    },
}

/// Config files tried in order when `--config` is not given.
fn config_candidates(from_env: Option<String>) -> Vec<String> {
    vec![
        from_env,
        Some("textbook.yaml".to_string()),
        Some("textbook.json".to_string()),
    ]
    .into_iter()
    .flatten()
    .collect()
}

fn load_config(explicit: Option<&str>) -> Result<Config> {
    if let Some(path) = explicit {
        return Ok(Config::load(path)?.with_env_overrides());
    }
    Ok(load_first(config_candidates(std::env::var("TEXTBOOK_CONFIG").ok())))
}

/// First candidate that loads wins; defaults when none does.
fn load_first(config_paths: Vec<String>) -> Config {
    for path in config_paths {
        match Config::load(&path) {
            Ok(cfg) => {
                info!("Loaded configuration from: {}", path);
                return cfg.with_env_overrides();
            }
            Err(e) => {
                debug!("Failed to load config from {}: {}", path, e);
            }
        }
    }

    info!("No config file found, using defaults");
    Config::default().with_env_overrides()
}

fn check_domain(domain: &str) -> Result<()> {
    if !widgets::workspace::DOMAINS.iter().any(|(value, _)| *value == domain) {
        anyhow::bail!("Unknown domain: {}", domain);
    }
    Ok(())
}

fn print_rendered(rendered: &RenderedTranslation) {
    println!("[{} {}] {}", rendered.language, rendered.direction, rendered.text);
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("textbook_translate=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(cli.config.as_deref())?;
    let state = AppState::new(config)?;

    match cli.command {
        Commands::Translate {
            texts,
            to,
            from,
            domain,
            context,
            history,
            swap,
        } => {
            let mut workspace = state.workspace();
            if let Some(to) = to {
                workspace.target_lang = to;
            }
            if let Some(from) = from {
                workspace.source_lang = from;
            }
            if swap {
                workspace.swap_languages();
            }
            if let Some(domain) = domain {
                check_domain(&domain)?;
                workspace.domain = domain;
            }
            if let Some(context) = context {
                workspace.context = context;
            }

            for text in texts {
                workspace.source_text = text;
                match workspace.translate().await {
                    Some(result) if result.success => {
                        if let Some(rendered) = workspace.rendered() {
                            print_rendered(&rendered);
                        }
                    }
                    Some(result) => {
                        eprintln!("error: {}", result.error().unwrap_or("Translation failed"));
                    }
                    None => eprintln!("skipped blank text"),
                }
            }

            if history {
                let history = workspace.history();
                if history.is_empty() {
                    println!("history is empty");
                } else {
                    println!("history ({} entries, newest first):", history.len());
                }
                for entry in history.entries() {
                    println!(
                        "{} {}->{} {} => {}",
                        entry.timestamp.format("%H:%M:%S"),
                        entry.source_lang,
                        entry.target_lang,
                        entry.original,
                        entry.translated
                    );
                }
            }
        }
        Commands::Button {
            text,
            to,
            domain,
            context,
            presses,
        } => {
            let to = to.unwrap_or_else(|| state.config.translation.default_target_language.clone());
            let mut button = state.translate_button(&text, &to);
            if let Some(domain) = domain {
                check_domain(&domain)?;
                button = button.with_domain(&domain);
            }
            if let Some(context) = context {
                button = button.with_context(&context);
            }
            if button.is_disabled() {
                anyhow::bail!("Nothing to translate");
            }

            for _ in 0..presses {
                if let Some(result) = button.press().await {
                    if let Some(error) = result.error() {
                        eprintln!("error: {}", error);
                    }
                }
                print!("({}) ", button.label());
                print_rendered(&button.display());
            }
        }
        Commands::Batch { texts, to, from } => {
            let translation = &state.config.translation;
            let to = to.unwrap_or_else(|| translation.default_target_language.clone());
            let from = from.unwrap_or_else(|| translation.default_source_language.clone());

            let results = state.translator.translate_batch(&texts, &to, &from).await;
            for result in results {
                match (result.translation(), result.error()) {
                    (Some(text), _) => println!("{}", text),
                    (None, error) => println!("error: {}", error.unwrap_or("Translation failed")),
                }
            }
        }
        Commands::Page { path, to, html } => {
            let content = std::fs::read_to_string(&path)?;
            let mut page = state.page_translator(&content);
            if let Some(to) = to {
                page.set_target_lang(&to);
            }
            match page.translate_page().await {
                Some(rendered) if html => {
                    if let Some(fragment) = page.to_html() {
                        println!("{}", fragment);
                    }
                    debug!("Rendered page in {}", rendered.direction);
                }
                Some(rendered) => print_rendered(&rendered),
                None => eprintln!("nothing to translate in {}", path),
            }
            page.close();
        }
        Commands::Live { to } => {
            let target = to.unwrap_or_else(|| state.config.translation.default_target_language.clone());
            let mut live = state.live_translator(&target).on_update(Arc::new(|original: &str, translated: &str| {
                println!("{} => {}", original, translated);
            }));

            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Some(line) = lines.next_line().await? {
                let command = line.trim();
                if let Some(code) = command.strip_prefix(":lang ") {
                    live.set_target_lang(code.trim());
                    continue;
                }
                match command {
                    ":off" => live.set_enabled(false),
                    ":on" => live.set_enabled(true),
                    ":toggle" => live.toggle(),
                    ":clear" => live.clear(),
                    ":status" => {
                        eprintln!(
                            "{:?} enabled={} target={} text={:?}",
                            live.state(),
                            live.is_enabled(),
                            live.target_lang(),
                            live.text()
                        );
                        if let Some(rendered) = live.rendered() {
                            print_rendered(&rendered);
                        }
                    }
                    _ => live.set_text(&line),
                }
            }

            // Let the last edit settle and its request finish before exiting.
            let settle = Duration::from_millis(state.config.translation.debounce_ms);
            tokio::time::sleep(settle).await;
            while live.is_translating() || state.translator.is_loading() {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            if let Some(error) = state.translator.last_error() {
                eprintln!("last error: {}", error);
            }
        }
        Commands::Quick => {
            let mut modal = state.quick_translator();
            let mut selector = state.language_selector(&state.config.translation.default_target_language);
            modal.open();

            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Some(line) = lines.next_line().await? {
                let command = line.trim();
                if let Some(code) = command.strip_prefix(":lang ") {
                    selector.select(code.trim());
                    modal.set_target_lang(selector.selected());
                    println!("target: {}", selector.selected_name().await);
                    continue;
                }
                if command == ":langs" {
                    selector.toggle();
                    if selector.is_open() {
                        for (code, name) in selector.languages().await {
                            println!("{}\t{}", code, name);
                        }
                    }
                    continue;
                }
                if command == ":close" {
                    modal.close();
                }
                if !modal.is_open() {
                    break;
                }
                modal.set_input(&line);
                modal.submit().await;
                match (modal.error(), modal.output()) {
                    (Some(error), _) => eprintln!("error: {}", error),
                    (None, Some(rendered)) => print_rendered(rendered),
                    (None, None) => {}
                }
            }
            modal.close();
        }
        Commands::Languages => {
            let selector = state.language_selector(&state.config.translation.default_target_language);
            let languages = selector.languages().await;
            if languages.is_empty() {
                if let Some(error) = state.translator.last_error() {
                    anyhow::bail!("Failed to fetch languages: {}", error);
                }
            }
            for (code, name) in languages {
                println!("{}\t{}", code, name);
            }
        }
        Commands::CacheStats => match state.translator.get_cache_stats().await {
            Some(stats) => println!("{}", serde_json::to_string_pretty(&stats)?),
            None => {
                if let Some(error) = state.translator.last_error() {
                    anyhow::bail!("{}", error);
                }
                println!("no stats");
            }
        },
        Commands::ClearCache => {
            state.translator.clear_cache().await;
            if let Some(error) = state.translator.last_error() {
                anyhow::bail!("{}", error);
            }
            println!("Translation cache cleared");
        }
        Commands::Ask {
            query,
            background,
            transcript,
        } => {
            let mut chat = state.chat_session();
            if let Some(background) = background {
                chat.set_background(&background);
            }

            if query.is_empty() {
                let mut lines = BufReader::new(tokio::io::stdin()).lines();
                while let Some(line) = lines.next_line().await? {
                    if let Some(reply) = chat.send(&line).await {
                        println!("{}", reply.text);
                    }
                }
            } else if let Some(reply) = chat.send(&query.join(" ")).await {
                println!("{}", reply.text);
            }

            if transcript {
                for message in chat.messages() {
                    let who = match message.sender {
                        chat::Sender::User => "you",
                        chat::Sender::Bot => "bot",
                    };
                    println!("{}: {}", who, message.text);
                }
            }
        }
        Commands::Signin { email, password } => {
            let mut auth = state.auth_session();
            if let Err(message) = auth.sign_in(&email, &password).await {
                anyhow::bail!(message);
            }
            if let Some(user) = auth.user() {
                println!("{}", serde_json::to_string_pretty(user)?);
            }
            // Nothing is persisted; the session ends with the command.
            auth.sign_out();
            debug!("Signed out, signed_in={}", auth.is_signed_in());
        }
        Commands::Signup {
            email,
            password,
            name,
            gpu,
            ros_level,
            programming_level,
            language,
        } => {
            let form = SignupForm {
                email,
                password,
                full_name: name,
                gpu,
                ros_level,
                programming_level,
                preferred_language: language,
            };
            let mut auth = state.auth_session();
            match auth.sign_up(&form).await {
                Ok(user) => println!("Welcome, {}", user.name.as_deref().unwrap_or(&user.email)),
                Err(message) => anyhow::bail!(message),
            }
        }
    }

    Ok(())
}
