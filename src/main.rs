use anyhow::Context;
use softsell_assistant::AssistantWidget;
use softsell_assistant::config::ConfigLoader;
use softsell_assistant::observability::init_tracing;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Terminal shell commands
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Say(String),
    Suggest(usize),
    Send,
    Open,
    Close,
    History,
    Stats,
    Help,
    Quit,
    Unknown(String),
}

impl Command {
    fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let Some(command) = trimmed.strip_prefix('/') else {
            return Command::Say(line.to_string());
        };

        let mut parts = command.split_whitespace();
        match (parts.next(), parts.next()) {
            (Some("suggest"), Some(n)) => match n.parse::<usize>() {
                Ok(n) if n > 0 => Command::Suggest(n),
                _ => Command::Unknown(trimmed.to_string()),
            },
            (Some("send"), None) => Command::Send,
            (Some("open"), None) => Command::Open,
            (Some("close"), None) => Command::Close,
            (Some("history"), None) => Command::History,
            (Some("stats"), None) => Command::Stats,
            (Some("help"), None) => Command::Help,
            (Some("quit"), None) | (Some("exit"), None) => Command::Quit,
            _ => Command::Unknown(trimmed.to_string()),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ConfigLoader::load().context("failed to load configuration")?;
    init_tracing(&config.logging).map_err(|e| anyhow::anyhow!(e))?;
    ConfigLoader::validate(&config).context("invalid configuration")?;
    info!("Starting {} ({})", config.app_name, config.environment);

    let widget = Arc::new(AssistantWidget::from_config(&config));
    widget.open();
    print_header(&widget);
    let renderer = spawn_renderer(&widget);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match Command::parse(&line) {
            Command::Quit => break,
            Command::Help => print_help(),
            Command::Open => {
                widget.open();
                print_header(&widget);
            }
            Command::Close => {
                widget.close();
                println!("(chat closed, /open to continue)");
            }
            Command::History => {
                for message in widget.messages() {
                    let who = if message.is_user() { "You" } else { widget.name() };
                    println!("[{}] {}: {}", message.display_time(), who, message.text());
                }
            }
            Command::Stats => print!("{}", widget.gather_metrics()),
            Command::Unknown(input) => println!("Unknown command {input:?}, try /help"),
            _ if !widget.is_open() => println!("(chat closed, /open to continue)"),
            Command::Suggest(n) => match widget.suggested_questions().get(n - 1) {
                Some(question) => {
                    widget.select_suggested_question(question);
                    println!("> {question}   (/send to ask)");
                }
                None => println!("No suggested question #{n}"),
            },
            Command::Send => {
                widget.send();
            }
            Command::Say(text) => {
                widget.set_input(text);
                widget.send();
            }
        }
    }

    // 已调度的回复一定会投递，退出前等待它们完成
    if widget.is_composing() {
        info!("Waiting for outstanding replies before exiting");
        let mut composing = widget.subscribe_composing();
        let _ = composing.wait_for(|busy| !*busy).await;
    }
    renderer.abort();
    Ok(())
}

fn print_header(widget: &AssistantWidget) {
    println!("{}  ({})", widget.name(), widget.status_line());
    if let Some(greeting) = widget.messages().first() {
        println!("[{}] {}: {}", greeting.display_time(), widget.name(), greeting.text());
    }
    println!("Suggested questions:");
    for (i, question) in widget.suggested_questions().iter().enumerate() {
        println!("  {}. {}", i + 1, question);
    }
}

fn print_help() {
    println!("Type a message and press Enter to ask.");
    println!("  /suggest N   put suggested question N in the input");
    println!("  /send        send the current input");
    println!("  /open        open the chat");
    println!("  /close       close the chat");
    println!("  /history     show the conversation");
    println!("  /stats       show assistant metrics");
    println!("  /quit        exit");
}

/// Prints assistant replies and the typing indicator as they happen.
fn spawn_renderer(widget: &AssistantWidget) -> JoinHandle<()> {
    let mut messages = widget.subscribe_messages();
    let mut composing = widget.subscribe_composing();
    let name = widget.name().to_string();

    tokio::spawn(async move {
        loop {
            tokio::select! {
                received = messages.recv() => match received {
                    Ok(message) if !message.is_user() => {
                        println!("[{}] {}: {}", message.display_time(), name, message.text());
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Renderer lagged, {} messages skipped", skipped);
                    }
                    Err(RecvError::Closed) => break,
                },
                changed = composing.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    if *composing.borrow_and_update() {
                        println!("{name} is typing...");
                    }
                }
            }
        }
    })
}
