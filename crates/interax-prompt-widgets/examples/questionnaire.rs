//! A short sign-up form chaining several prompts.
//!
//! The user name is checked by a slow validator, so the spinner shows while
//! it runs. The whole form gives up after a minute without an answer.
//!
//! Set `INTERAX_PROMPT_LOG=questionnaire.log` to write the sessions' debug
//! log to a file.

use std::fs::File;
use std::time::Duration;

use interax_prompt_fwk::{AbortController, PromptError, Validator};
use interax_prompt_widgets::{confirm, input, password, ConfirmConfig, InputConfig, PasswordConfig};
use tracing_subscriber::EnvFilter;

const TAKEN: [&str; 3] = ["admin", "root", "guest"];

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

async fn ask() -> Result<(), PromptError> {
    let timeout = AbortController::new();
    let signal = timeout.signal();
    let deadline = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(60)).await;
        timeout.abort();
    });

    let user = input()
        .session(
            InputConfig::new("User name")
                .required(true)
                .validate(Validator::new_async(|name: String| async move {
                    // Stands in for a lookup on a server.
                    tokio::time::sleep(Duration::from_millis(800)).await;
                    if TAKEN.contains(&name.as_str()) {
                        Err(format!("{name} is taken"))
                    } else {
                        Ok(())
                    }
                })),
        )
        .abort_signal(signal.clone())
        .build()
        .run()
        .await?;

    let shell = input()
        .session(InputConfig::new("Login shell").default("/bin/bash"))
        .abort_signal(signal.clone())
        .build()
        .run()
        .await?;

    let secret = password()
        .session(PasswordConfig::new("Password").mask('*').validate(Validator::new(|value| {
            if value.chars().count() >= 8 {
                Ok(())
            } else {
                Err("Use at least 8 characters".to_owned())
            }
        })))
        .abort_signal(signal.clone())
        .build()
        .run()
        .await?;

    let create = confirm()
        .session(ConfirmConfig::new(format!("Create {user} with {shell}?")))
        .abort_signal(signal.clone())
        .clear_on_done(true)
        .build()
        .run()
        .await?;

    deadline.abort();
    if create {
        println!("Created {user} ({} character password)", secret.chars().count());
    } else {
        println!("Nothing created");
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging()?;

    match ask().await {
        Ok(()) => Ok(()),
        Err(PromptError::Abort) => {
            eprintln!("Timed out");
            Ok(())
        }
        Err(err) if err.is_cancellation() => {
            eprintln!("{err}");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}
