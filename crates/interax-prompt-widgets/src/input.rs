//! Free text, with an optional default and validation.

use std::rc::Rc;

use interax_prompt_fwk::keys::{is_backspace_key, is_enter_key, is_tab_key};
use interax_prompt_fwk::{
    create_prompt, use_prefix, Content, Done, Hooks, Prompt, PromptResult, Status, Theme,
    ValidationResult, Validator,
};

use crate::submit::{invalid_message, submit, REQUIRED_MESSAGE};

/// Formats the typed value; the flag is `true` for the final answer.
pub type InputTransformer = Rc<dyn Fn(&str, bool) -> String>;

#[derive(Clone)]
pub struct InputConfig {
    pub message: String,
    /// Used when the answer is left empty.
    pub default: Option<String>,
    pub required: bool,
    pub validate: Option<Validator>,
    pub transformer: Option<InputTransformer>,
    pub theme: Theme,
}

impl InputConfig {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            default: None,
            required: false,
            validate: None,
            transformer: None,
            theme: Theme::default(),
        }
    }

    pub fn default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn validate(mut self, validator: Validator) -> Self {
        self.validate = Some(validator);
        self
    }

    pub fn transformer(mut self, transformer: impl Fn(&str, bool) -> String + 'static) -> Self {
        self.transformer = Some(Rc::new(transformer));
        self
    }

    pub fn theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }
}

/// The input prompt. Settles with the typed text, or the default when
/// nothing was typed.
pub fn input() -> Prompt<InputConfig, String> {
    create_prompt(view)
}

fn view(config: &InputConfig, hooks: &Hooks, done: &Done<String>) -> PromptResult<Content> {
    let theme = &config.theme;
    let status = hooks.use_state(|| Status::Idle)?;
    let default = hooks.use_state(|| config.default.clone().unwrap_or_default())?;
    let error = hooks.use_state(|| None::<String>)?;
    let value = hooks.use_state(String::new)?;
    let prefix = use_prefix(hooks, status.get(), theme)?;

    hooks.use_keypress({
        let hooks = hooks.clone();
        let status = status.clone();
        let default = default.clone();
        let error = error.clone();
        let value = value.clone();
        let done = done.clone();
        let required = config.required;
        let validate = config.validate.clone();

        move |key, editor| {
            if status.get() != Status::Idle {
                return Ok(());
            }

            if is_enter_key(key) {
                let typed = value.get();
                let answer = if typed.is_empty() {
                    default.get()
                } else {
                    typed
                };
                if required && answer.is_empty() {
                    error.set(Some(REQUIRED_MESSAGE.to_owned()));
                    return Ok(());
                }

                let settle = {
                    let (status, error, value, done) =
                        (status.clone(), error.clone(), value.clone(), done.clone());
                    let answer = answer.clone();
                    move |result: ValidationResult| match result {
                        Ok(()) => {
                            value.set(answer.clone());
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
            } else if is_backspace_key(key) && value.with(String::is_empty) {
                default.set(String::new());
            } else if is_tab_key(key) && value.with(String::is_empty) {
                let filled = default.get();
                default.set(String::new());
                editor.clear_line();
                editor.write(&filled);
                value.set(filled);
            } else {
                value.set(editor.line().to_owned());
                error.set(None);
            }
            Ok(())
        }
    })?;

    let is_final = status.get() == Status::Done;
    let message = (theme.style.message)(&config.message);
    let typed = value.get();
    let formatted = match &config.transformer {
        Some(transformer) => transformer(&typed, is_final),
        None if is_final => (theme.style.answer)(&typed),
        None => typed.clone(),
    };

    let mut main = format!("{prefix} {message}");
    let shown_default = default.get();
    if !is_final && typed.is_empty() && !shown_default.is_empty() {
        main.push(' ');
        main.push_str(&(theme.style.default_answer)(&shown_default));
    }
    main.push(' ');
    main.push_str(&formatted);

    let bottom = error
        .get()
        .map(|message| (theme.style.error)(&message))
        .unwrap_or_default();
    Ok(Content::new(main).with_bottom(bottom))
}
