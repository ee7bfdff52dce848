// Terminal implementation of the core `SettingsPrompt` trait, backed by `dialoguer`.
// Refuses to prompt when stdin is not a terminal so scripted runs fail fast
// instead of hanging on a read.

use dialoguer::{Password, Select};
use regcard_uploader_core::config::Environment;
use regcard_uploader_core::contract::{PromptError, SettingsPrompt};
use std::io::IsTerminal;

pub struct TerminalPrompt;

impl TerminalPrompt {
    fn ensure_terminal(what: &'static str) -> Result<(), PromptError> {
        if std::io::stdin().is_terminal() {
            Ok(())
        } else {
            Err(PromptError::NotInteractive(what))
        }
    }
}

impl SettingsPrompt for TerminalPrompt {
    fn select_environment(&self, choices: &[Environment]) -> Result<Environment, PromptError> {
        Self::ensure_terminal("the environment")?;
        let items: Vec<&str> = choices.iter().map(Environment::as_str).collect();
        // Arrow keys + Enter, like the other interactive flows.
        let selection = Select::new()
            .with_prompt("Choose environment")
            .items(&items)
            .default(0)
            .interact()
            .map_err(|e| PromptError::Interaction(e.to_string()))?;
        choices
            .get(selection)
            .copied()
            .ok_or_else(|| PromptError::Interaction(format!("invalid selection {selection}")))
    }

    fn bearer_token(&self) -> Result<String, PromptError> {
        Self::ensure_terminal("the bearer token")?;
        // `Password` hides the token while typing.
        Password::new()
            .with_prompt("Enter Bearer token")
            .interact()
            .map_err(|e| PromptError::Interaction(e.to_string()))
    }
}
