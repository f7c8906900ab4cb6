use crate::chat::render::{ plain_text, render_page, WELCOME_TEXT, WELCOME_TITLE };
use crate::chat::{ ChatController, SendOutcome };
use log::{ debug, error, info };
use std::error::Error;
use std::sync::Arc;
use tokio::io::{ AsyncBufReadExt, BufReader };
use tokio::task::JoinHandle;

const HELP: &str = "Commands:
  /clear            start over
  /shop a, b, c     shopping links for the listed ingredients
  /health           check the API
  /dismiss          hide the warning banner
  /help             this text
  /quit             exit";

#[derive(Debug, PartialEq, Eq)]
pub enum Command<'a> {
    Clear,
    Shop(&'a str),
    Health,
    Dismiss,
    Help,
    Quit,
    Unknown(&'a str),
    Chat(&'a str),
}

pub fn parse_command(line: &str) -> Command<'_> {
    let line = line.trim();
    if !line.starts_with('/') {
        return Command::Chat(line);
    }
    let (name, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    match name.to_lowercase().as_str() {
        "/clear" => Command::Clear,
        "/shop" => Command::Shop(rest.trim()),
        "/health" => Command::Health,
        "/dismiss" => Command::Dismiss,
        "/help" => Command::Help,
        "/quit" | "/exit" => Command::Quit,
        _ => Command::Unknown(name),
    }
}

/// Keeps handles of turns still running; finished ones are dropped.
fn track(turns: &mut Vec<JoinHandle<()>>, turn: JoinHandle<()>) {
    turns.retain(|t| !t.is_finished());
    turns.push(turn);
}

pub struct Repl {
    controller: Arc<ChatController>,
    transcript: Option<String>,
}

impl Repl {
    pub fn new(controller: Arc<ChatController>, transcript: Option<String>) -> Self {
        Self { controller, transcript }
    }

    fn print_welcome() {
        println!("{}\n{}\nType /help for commands.\n", WELCOME_TITLE, WELCOME_TEXT);
    }

    fn write_transcript(controller: &ChatController, path: &Option<String>) {
        let Some(path) = path else {
            return;
        };
        let page = render_page(&controller.snapshot());
        if let Err(e) = std::fs::write(path, page) {
            error!("Failed to write transcript '{}': {}", path, e);
        }
    }

    fn print_banner(&self) {
        if let Some(banner) = self.controller.snapshot().banner() {
            println!("⚠️  {}\n", banner);
        }
    }

    fn spawn_turn(&self, line: String, shop: bool) -> JoinHandle<()> {
        let controller = Arc::clone(&self.controller);
        let transcript = self.transcript.clone();
        tokio::spawn(async move {
            let outcome = if shop {
                controller.shop(&line).await
            } else {
                controller.send(&line).await
            };
            match outcome {
                SendOutcome::Replied(message) => {
                    println!("\n{}\n", plain_text(&message));
                    Self::write_transcript(&controller, &transcript);
                }
                SendOutcome::Dropped => {
                    debug!("Input ignored: {}", line);
                }
            }
        })
    }

    pub async fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        Self::print_welcome();
        self.print_banner();
        Self::write_transcript(&self.controller, &self.transcript);

        let mut turns: Vec<JoinHandle<()>> = Vec::new();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            match parse_command(&line) {
                Command::Chat("") => {}
                Command::Chat(text) => {
                    if self.controller.is_processing() {
                        debug!("Request in flight, dropping: {}", text);
                        continue;
                    }
                    track(&mut turns, self.spawn_turn(text.to_string(), false));
                }
                Command::Shop("") => println!("Usage: /shop chicken, rice, broccoli"),
                Command::Shop(items) => track(&mut turns, self.spawn_turn(items.to_string(), true)),
                Command::Clear => {
                    self.controller.clear();
                    Self::write_transcript(&self.controller, &self.transcript);
                    Self::print_welcome();
                }
                Command::Health => {
                    let status = self.controller.check_health().await;
                    match status.error.as_deref() {
                        Some(e) => println!("API status: {} ({})", status.status, e),
                        None => println!("API status: {}", status.status),
                    }
                    self.print_banner();
                    Self::write_transcript(&self.controller, &self.transcript);
                }
                Command::Dismiss => {
                    self.controller.dismiss_banner();
                    Self::write_transcript(&self.controller, &self.transcript);
                }
                Command::Help => println!("{}", HELP),
                Command::Quit => break,
                Command::Unknown(name) => println!("Unknown command {}. Type /help.", name),
            }
        }
        for turn in turns {
            if let Err(e) = turn.await {
                error!("Chat turn panicked: {}", e);
            }
        }
        info!("Chat {} finished", self.controller.snapshot().id);
        Ok(())
    }
}
