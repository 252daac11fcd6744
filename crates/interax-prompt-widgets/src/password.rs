//! Secret text. Typed characters are never echoed.

use crossterm::cursor::Hide;
use interax_prompt_fwk::ansi::command_string;
use interax_prompt_fwk::keys::is_enter_key;
use interax_prompt_fwk::{
    create_prompt, use_prefix, Content, Done, Hooks, Prompt, PromptResult, Status, Theme,
    ValidationResult, Validator,
};

use crate::submit::{invalid_message, submit};

#[derive(Debug, Clone)]
pub struct PasswordConfig {
    pub message: String,
    /// Echo this character per typed character. Without a mask nothing is
    /// shown and the cursor is hidden.
    pub mask: Option<char>,
    pub validate: Option<Validator>,
    pub theme: Theme,
}

impl PasswordConfig {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            mask: None,
            validate: None,
            theme: Theme::default(),
        }
    }

    pub fn mask(mut self, mask: char) -> Self {
        self.mask = Some(mask);
        self
    }

    pub fn validate(mut self, validator: Validator) -> Self {
        self.validate = Some(validator);
        self
    }

    pub fn theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }
}

/// The password prompt. Settles with the typed text.
pub fn password() -> Prompt<PasswordConfig, String> {
    create_prompt(view)
}

fn view(config: &PasswordConfig, hooks: &Hooks, done: &Done<String>) -> PromptResult<Content> {
    let theme = &config.theme;
    let status = hooks.use_state(|| Status::Idle)?;
    let error = hooks.use_state(|| None::<String>)?;
    let value = hooks.use_state(String::new)?;
    let prefix = use_prefix(hooks, status.get(), theme)?;

    hooks.use_keypress({
        let hooks = hooks.clone();
        let status = status.clone();
        let error = error.clone();
        let value = value.clone();
        let done = done.clone();
        let validate = config.validate.clone();

        move |key, editor| {
            if status.get() != Status::Idle {
                return Ok(());
            }
            if !is_enter_key(key) {
                value.set(editor.line().to_owned());
                error.set(None);
                return Ok(());
            }

            let answer = value.get();
            let settle = {
                let (status, error, done) = (status.clone(), error.clone(), done.clone());
                let answer = answer.clone();
                move |result: ValidationResult| match result {
                    Ok(()) => {
                        status.set(Status::Done);
                        done.resolve(answer);
                    }
                    Err(message) => {
                        error.set(Some(invalid_message(message)));
                        status.set(Status::Idle);
                    }
                }
            };
            submit(&hooks, &status, validate.as_ref(), &answer, settle);
            Ok(())
        }
    })?;

    let is_final = status.get() == Status::Done;
    let message = (theme.style.message)(&config.message);
    let tail = match config.mask {
        Some(mask) => {
            let masked: String = value.with(|v| v.chars().map(|_| mask).collect());
            if is_final {
                (theme.style.answer)(&masked)
            } else {
                masked
            }
        }
        None if is_final => String::new(),
        None => format!(
            "{}{}",
            (theme.style.help)("[input is masked]"),
            command_string(Hide)
        ),
    };

    let bottom = error
        .get()
        .map(|message| (theme.style.error)(&message))
        .unwrap_or_default();
    Ok(Content::new(format!("{prefix} {message} {tail}")).with_bottom(bottom))
}
