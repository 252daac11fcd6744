//! Yes or no.

use std::rc::Rc;

use interax_prompt_fwk::keys::{is_enter_key, is_tab_key};
use interax_prompt_fwk::{
    create_prompt, use_prefix, Content, Done, Hooks, Prompt, PromptResult, Status, Theme,
};

/// Formats the answer shown once the prompt is done.
pub type ConfirmTransformer = Rc<dyn Fn(bool) -> String>;

#[derive(Clone)]
pub struct ConfirmConfig {
    pub message: String,
    /// Answer used when the typed text is neither yes nor no.
    pub default: bool,
    pub transformer: ConfirmTransformer,
    pub theme: Theme,
}

impl ConfirmConfig {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            default: true,
            transformer: Rc::new(|answer| if answer { "Yes" } else { "No" }.to_owned()),
            theme: Theme::default(),
        }
    }

    pub fn default(mut self, default: bool) -> Self {
        self.default = default;
        self
    }

    pub fn transformer(mut self, transformer: impl Fn(bool) -> String + 'static) -> Self {
        self.transformer = Rc::new(transformer);
        self
    }

    pub fn theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }
}

/// Read typed text as an answer: anything starting with `y` is yes,
/// anything starting with `n` is no, and the rest falls back to `default`.
fn parse_answer(value: &str, default: bool) -> bool {
    match value.trim_start().chars().next() {
        Some('y' | 'Y') => true,
        Some('n' | 'N') => false,
        _ => default,
    }
}

/// The confirm prompt. Settles with `true` for yes.
pub fn confirm() -> Prompt<ConfirmConfig, bool> {
    create_prompt(view)
}

fn view(config: &ConfirmConfig, hooks: &Hooks, done: &Done<bool>) -> PromptResult<Content> {
    let theme = &config.theme;
    let status = hooks.use_state(|| Status::Idle)?;
    let value = hooks.use_state(String::new)?;
    let prefix = use_prefix(hooks, status.get(), theme)?;

    hooks.use_keypress({
        let status = status.clone();
        let value = value.clone();
        let done = done.clone();
        let default = config.default;
        let transformer = Rc::clone(&config.transformer);

        move |key, editor| {
            if is_enter_key(key) {
                let answer = parse_answer(&value.get(), default);
                value.set(transformer(answer));
                status.set(Status::Done);
                done.resolve(answer);
            } else if is_tab_key(key) {
                // Flip whatever the current answer is.
                let answer = !parse_answer(editor.line(), default);
                let text = if answer { "Yes" } else { "No" };
                editor.clear_line();
                editor.write(text);
                value.set(text.to_owned());
            } else {
                value.set(editor.line().to_owned());
            }
            Ok(())
        }
    })?;

    let message = (theme.style.message)(&config.message);
    let main = if status.get() == Status::Done {
        format!("{prefix} {message} {}", value.with(|v| (theme.style.answer)(v)))
    } else {
        let hint = if config.default { "Y/n" } else { "y/N" };
        format!(
            "{prefix} {message} {} {}",
            (theme.style.default_answer)(hint),
            value.get()
        )
    };
    Ok(Content::from(main))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_leading_letter() {
        assert!(parse_answer("y", false));
        assert!(parse_answer("Yes please", false));
        assert!(!parse_answer("n", true));
        assert!(!parse_answer("NO", true));
    }

    #[test]
    fn falls_back_to_default() {
        assert!(parse_answer("", true));
        assert!(!parse_answer("", false));
        assert!(parse_answer("maybe", true));
        assert!(!parse_answer("  ", false));
    }
}
