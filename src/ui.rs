//! Terminal presentation helpers shared by the two apps.

use console::style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use spinners::{Spinner, Spinners};
use std::future::Future;

use crate::api::ChainError;

/// Reads a line of input, re-prompting until it is non-empty.
pub fn read_required(prompt: &str) -> Result<String, ChainError> {
    loop {
        let value: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;
        let value = value.trim().to_string();
        if !value.is_empty() {
            return Ok(value);
        }
        warn("Please fill in this field.");
    }
}

/// Presents a menu and returns the index of the chosen item.
pub fn menu(prompt: &str, items: &[&str]) -> Result<usize, ChainError> {
    Ok(Select::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .items(items)
        .default(0)
        .interact()?)
}

/// Runs a future behind a spinner, stopping it with a status line.
pub async fn with_spinner<F, T>(message: &str, fut: F) -> Result<T, ChainError>
where
    F: Future<Output = Result<T, ChainError>>,
{
    let mut sp = Spinner::new(Spinners::Dots9, message.into());
    let result = fut.await;
    match &result {
        Ok(_) => sp.stop_with_message("✔ Response received.".into()),
        Err(_) => sp.stop_with_message("✘ Request failed.".into()),
    }
    result
}

/// Prints a section header followed by its body text.
pub fn section(title: &str, body: &str) {
    println!("\n{}", style(title).green().bold());
    println!("{}", body);
}

/// Prints a yellow warning line.
pub fn warn(message: &str) {
    println!("{}", style(message).yellow());
}

/// Reports a per-interaction error without ending the session.
pub fn report_error(err: &ChainError) {
    eprintln!("{} {}", style("•").red().bold(), err);
}
