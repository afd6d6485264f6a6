//! Interactive REPL for cobrowse
//!
//! Provides the main user interaction loop.

use std::io::{self, BufRead, Write};

use crate::agent::CoBrowser;
use crate::cli::commands::{handle_command, CommandResult};
use crate::core::Result;

/// Interactive REPL (Read-Eval-Print Loop)
pub struct Repl {
    agent: CoBrowser,
}

impl Repl {
    pub fn new(agent: CoBrowser) -> Self {
        Self { agent }
    }

    /// Run the REPL
    pub async fn run(&mut self) -> Result<()> {
        self.print_banner();

        if !self.agent.backend_available().await {
            println!(
                "Backend at {} is not reachable; replies will fall back to a notice.\n",
                self.agent.config().backend.url
            );
        }

        let stdin = io::stdin();
        let mut stdout = io::stdout();

        loop {
            print!("You: ");
            stdout.flush()?;

            let mut input = String::new();
            match stdin.lock().read_line(&mut input) {
                Ok(0) => {
                    // EOF (Ctrl+D)
                    println!("\nGoodbye!");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    eprintln!("Error reading input: {}", e);
                    continue;
                }
            }

            let input = input.trim();

            if input.is_empty() {
                continue;
            }

            match handle_command(input, &mut self.agent).await {
                Ok(CommandResult::Exit) => {
                    println!("\nGoodbye!");
                    break;
                }
                Ok(CommandResult::Clear) => {
                    println!("Conversation cleared.\n");
                    continue;
                }
                Ok(CommandResult::Handled(output)) => {
                    println!("{}\n", output);
                    continue;
                }
                Ok(CommandResult::Continue(input)) => {
                    let outcome = self.agent.process(&input).await;
                    println!("\nAssistant:\n{}\n", outcome.display_text());
                }
                Err(e) => {
                    eprintln!("Command error: {}\n", e);
                }
            }
        }

        Ok(())
    }

    /// Print the startup banner
    fn print_banner(&self) {
        let config = self.agent.config();
        let doc = self.agent.document().lock();

        println!("cobrowse - co-browsing agent console");
        println!("Backend:  {}", config.backend.url);
        println!("Page:     {} ({} nodes)", doc.location(), doc.len());
        println!();
        println!("Commands: help, snapshot, do, status, exit");
        println!("─────────────────────────────────────────────");
    }
}
