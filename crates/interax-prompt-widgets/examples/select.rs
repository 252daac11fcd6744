//! Pick a package manager from a list with a separator, disabled entries
//! and descriptions.
//!
//! Controls:
//! - Up/Down (or j/k): Move
//! - 1-9: Jump to the n-th entry
//! - Letters: Jump to the first entry starting with the typed text
//! - Enter: Pick
//! - Ctrl+C: Quit
//!
//! Set `INTERAX_PROMPT_LOG=select.log` to write the session's debug log to
//! a file.

use std::fs::File;

use interax_prompt_fwk::{Keybinding, PromptError};
use interax_prompt_widgets::{select, Choice, SelectConfig, SelectItem, Separator};
use tracing_subscriber::EnvFilter;

fn init_logging() -> std::io::Result<()> {
    let Ok(path) = std::env::var("INTERAX_PROMPT_LOG") else {
        return Ok(());
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(File::create(path)?)
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging()?;

    let choices: Vec<SelectItem<&str>> = vec![
        Choice::new("npm", "npm")
            .description("npm is the most popular package manager")
            .into(),
        Choice::new("yarn", "yarn")
            .description("yarn is an awesome package manager")
            .into(),
        Separator::default().into(),
        Choice::new("pnpm", "pnpm").short("pnpm!").into(),
        Choice::new("jspm", "jspm").disabled().into(),
        Choice::new("bun", "bun")
            .disabled_because("(bun is not available on this platform)")
            .into(),
    ];
    let config = SelectConfig::new("Select a package manager", choices)
        .keybindings([Keybinding::Vim]);

    match select().run(config).await {
        Ok(manager) => println!("Using {manager}"),
        Err(err @ PromptError::Exit { .. }) => eprintln!("{err}"),
        Err(err) => return Err(err.into()),
    }
    Ok(())
}
