//! Pick one entry from a list.
//!
//! Arrow keys (plus vim or emacs aliases when enabled) move between
//! selectable entries, number keys jump to the n-th selectable entry, and
//! typing jumps to the first entry whose name starts with the typed text.
//! The typed text is forgotten after a short pause.

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use crossterm::cursor::Hide;
use interax_prompt_fwk::ansi::command_string;
use interax_prompt_fwk::keys::{
    is_backspace_key, is_down_key, is_enter_key, is_number_key, is_up_key,
};
use interax_prompt_fwk::{
    create_prompt, find_selectable, nth_selectable, selectable_bounds, step, use_pagination,
    use_prefix, Cleanup, Content, Direction, Done, EditorHandle, Hooks, Keybinding, Prompt,
    PromptError, PromptResult, Ref, Selectable, Status, Theme,
};
use tokio::task::JoinHandle;

use crate::separator::Separator;

const SEARCH_RESET_DELAY: Duration = Duration::from_millis(700);

const NO_SELECTABLE_CHOICES: &str =
    "[select prompt] No selectable choices. All choices are disabled.";

/// Why an entry cannot be picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disabled {
    /// Shown as `(disabled)`.
    Yes,
    /// Shown in place of `(disabled)`.
    Because(String),
}

#[derive(Debug, Clone)]
pub struct Choice<V> {
    pub value: V,
    pub name: String,
    /// Shown under the list while this entry is active.
    pub description: Option<String>,
    /// Shown as the answer instead of `name`.
    pub short: Option<String>,
    pub disabled: Option<Disabled>,
}

impl<V> Choice<V> {
    pub fn new(value: V, name: impl Into<String>) -> Self {
        Self {
            value,
            name: name.into(),
            description: None,
            short: None,
            disabled: None,
        }
    }

    /// Text shown under the list while this choice is active.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Name shown as the final answer instead of the full name.
    pub fn short(mut self, short: impl Into<String>) -> Self {
        self.short = Some(short.into());
        self
    }

    /// Show the choice but never land on it. Labelled "(disabled)".
    pub fn disabled(mut self) -> Self {
        self.disabled = Some(Disabled::Yes);
        self
    }

    /// Like [`disabled`](Self::disabled), labelled with `reason`.
    pub fn disabled_because(mut self, reason: impl Into<String>) -> Self {
        self.disabled = Some(Disabled::Because(reason.into()));
        self
    }

    fn answer(&self) -> &str {
        self.short.as_deref().unwrap_or(&self.name)
    }
}

impl<V: fmt::Display> Choice<V> {
    /// A choice named after its value.
    pub fn from_value(value: V) -> Self {
        let name = value.to_string();
        Self::new(value, name)
    }
}

/// One row of a select list.
#[derive(Debug, Clone)]
pub enum SelectItem<V> {
    Choice(Choice<V>),
    Separator(Separator),
}

impl<V> SelectItem<V> {
    pub fn choice(&self) -> Option<&Choice<V>> {
        match self {
            Self::Choice(choice) => Some(choice),
            Self::Separator(_) => None,
        }
    }
}

impl<V> Selectable for SelectItem<V> {
    fn is_selectable(&self) -> bool {
        matches!(self, Self::Choice(choice) if choice.disabled.is_none())
    }
}

impl<V> From<Choice<V>> for SelectItem<V> {
    fn from(choice: Choice<V>) -> Self {
        Self::Choice(choice)
    }
}

impl<V> From<Separator> for SelectItem<V> {
    fn from(separator: Separator) -> Self {
        Self::Separator(separator)
    }
}

#[derive(Debug, Clone)]
pub struct SelectConfig<V> {
    pub message: String,
    pub choices: Rc<[SelectItem<V>]>,
    /// Value of the entry that starts active.
    pub default: Option<V>,
    pub page_size: usize,
    pub looping: bool,
    pub keybindings: Vec<Keybinding>,
    pub theme: Theme,
}

impl<V> SelectConfig<V> {
    pub fn new<I>(message: impl Into<String>, choices: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<SelectItem<V>>,
    {
        Self {
            message: message.into(),
            choices: choices.into_iter().map(Into::into).collect(),
            default: None,
            page_size: 7,
            looping: true,
            keybindings: Vec::new(),
            theme: Theme::default(),
        }
    }

    pub fn default(mut self, value: V) -> Self {
        self.default = Some(value);
        self
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn keybindings(mut self, keybindings: impl Into<Vec<Keybinding>>) -> Self {
        self.keybindings = keybindings.into();
        self
    }

    pub fn theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }
}

/// The select prompt. Settles with the value of the picked choice.
pub fn select<V: Clone + PartialEq + 'static>() -> Prompt<SelectConfig<V>, V> {
    create_prompt(view::<V>)
}

fn view<V: Clone + PartialEq + 'static>(
    config: &SelectConfig<V>,
    hooks: &Hooks,
    done: &Done<V>,
) -> PromptResult<Content> {
    let theme = &config.theme;
    let items = Rc::clone(&config.choices);
    let (first, _) =
        selectable_bounds(&items).map_err(|_| PromptError::validation(NO_SELECTABLE_CHOICES))?;

    let status = hooks.use_state(|| Status::Idle)?;
    let prefix = use_prefix(hooks, status.get(), theme)?;
    let active = hooks.use_state(|| {
        config
            .default
            .as_ref()
            .and_then(|default| {
                find_selectable(&items, |item| {
                    item.choice().is_some_and(|choice| choice.value == *default)
                })
            })
            .unwrap_or(first)
    })?;
    let show_help_tip = hooks.use_state(|| true)?;
    let search_reset: Ref<Option<JoinHandle<()>>> = hooks.use_ref(|| None)?;

    hooks.use_keypress({
        let items = Rc::clone(&items);
        let status = status.clone();
        let active = active.clone();
        let show_help_tip = show_help_tip.clone();
        let search_reset = search_reset.clone();
        let done = done.clone();
        let line_editor = hooks.line_editor();
        let keybindings = config.keybindings.clone();
        let looping = config.looping;

        move |key, editor| {
            if let Some(pending) = search_reset.take() {
                pending.abort();
            }
            let typed_number = if is_number_key(key) {
                editor.line().parse::<usize>().ok()
            } else {
                None
            };

            if is_enter_key(key) {
                if let Some(choice) = items.get(active.get()).and_then(SelectItem::choice) {
                    status.set(Status::Done);
                    done.resolve(choice.value.clone());
                }
            } else if is_up_key(key, &keybindings) || is_down_key(key, &keybindings) {
                editor.clear_line();
                let direction = if is_up_key(key, &keybindings) {
                    Direction::Up
                } else {
                    Direction::Down
                };
                active.set(step(&items, active.get(), direction, looping)?);
                show_help_tip.set(false);
            } else if let Some(position) = typed_number {
                if let Some(index) = nth_selectable(&items, position) {
                    active.set(index);
                }
                search_reset.set(Some(reset_search_later(line_editor.clone())));
            } else if is_backspace_key(key) {
                editor.clear_line();
            } else if !editor.line().is_empty() {
                let term = editor.line().to_lowercase();
                let matched = find_selectable(&items, |item| {
                    item.choice()
                        .is_some_and(|choice| choice.name.to_lowercase().starts_with(&term))
                });
                if let Some(index) = matched {
                    active.set(index);
                }
                search_reset.set(Some(reset_search_later(line_editor.clone())));
            }
            Ok(())
        }
    })?;

    hooks.use_effect(
        {
            let search_reset = search_reset.clone();
            move || {
                Some(Box::new(move || {
                    if let Some(pending) = search_reset.take() {
                        pending.abort();
                    }
                }) as Cleanup)
            }
        },
        (),
    )?;

    let page = use_pagination(
        hooks,
        &items,
        active.get(),
        config.page_size,
        config.looping,
        |item, _, is_active| render_item(item, is_active, theme),
    )?;

    let message = (theme.style.message)(&config.message);
    let active_choice = items.get(active.get()).and_then(SelectItem::choice);

    if status.get() == Status::Done {
        let answer = active_choice.map_or("", Choice::answer);
        return Ok(Content::from(format!(
            "{prefix} {message} {}",
            (theme.style.answer)(answer)
        )));
    }

    let mut header = format!("{prefix} {message}");
    let mut footer = String::new();
    if show_help_tip.get() {
        header.push(' ');
        header.push_str(&(theme.style.help)("(Use arrow keys)"));
        if items.len() > config.page_size {
            footer.push('\n');
            footer.push_str(&(theme.style.help)("(Use arrow keys to reveal more choices)"));
        }
    }
    if let Some(description) = active_choice.and_then(|choice| choice.description.as_deref()) {
        footer.push('\n');
        footer.push_str(&(theme.style.description)(description));
    }

    Ok(Content::from(format!(
        "{header}\n{page}{footer}{}",
        command_string(Hide)
    )))
}

fn render_item<V>(item: &SelectItem<V>, is_active: bool, theme: &Theme) -> String {
    let choice = match item {
        SelectItem::Separator(separator) => return format!(" {separator}"),
        SelectItem::Choice(choice) => choice,
    };
    match &choice.disabled {
        Some(disabled) => {
            let label = match disabled {
                Disabled::Yes => "(disabled)",
                Disabled::Because(reason) => reason.as_str(),
            };
            (theme.style.disabled)(&format!("  {} {label}", choice.name))
        }
        None if is_active => (theme.style.highlight)(&format!("{} {}", theme.cursor, choice.name)),
        None => format!("  {}", choice.name),
    }
}

/// Forget the typed search text after a pause.
fn reset_search_later(editor: EditorHandle) -> JoinHandle<()> {
    tokio::task::spawn_local(async move {
        tokio::time::sleep(SEARCH_RESET_DELAY).await;
        editor.clear_line();
    })
}
