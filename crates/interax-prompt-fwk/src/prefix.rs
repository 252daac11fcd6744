//! The status icon in front of a prompt's message.

use std::time::Duration;

use crate::config::Theme;
use crate::effects::Cleanup;
use crate::error::HookError;
use crate::hooks::Hooks;

/// How long a prompt must stay [`Status::Loading`] before the spinner
/// replaces the idle icon, so quick validations do not flicker.
pub const LOADING_DELAY: Duration = Duration::from_millis(300);

/// Where a prompt is in its life.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Status {
    #[default]
    Idle,
    Loading,
    Done,
}

/// The prefix for `status`: the idle or done icon, or a spinner frame
/// once loading has lasted [`LOADING_DELAY`].
///
/// Uses `tokio::task::spawn_local`, so the view must be running inside a
/// session.
pub fn use_prefix(hooks: &Hooks, status: Status, theme: &Theme) -> Result<String, HookError> {
    let show_loader = hooks.use_state(|| false)?;
    let frame = hooks.use_state(|| 0usize)?;

    {
        let show_loader = show_loader.clone();
        let frame = frame.clone();
        let interval = theme.spinner.interval;
        let frames = theme.spinner.frames.len().max(1);
        hooks.use_effect(
            move || {
                if status != Status::Loading {
                    show_loader.set(false);
                    return None;
                }
                let spinner = tokio::task::spawn_local(async move {
                    tokio::time::sleep(LOADING_DELAY).await;
                    show_loader.set(true);
                    let mut ticks = tokio::time::interval(interval);
                    ticks.tick().await;
                    loop {
                        ticks.tick().await;
                        frame.update(|n| (n + 1) % frames);
                    }
                });
                Some(Box::new(move || spinner.abort()) as Cleanup)
            },
            status,
        )?;
    }

    Ok(match status {
        Status::Loading if show_loader.get() => theme.spinner.frame(frame.get()).to_owned(),
        Status::Done => theme.prefix.done.clone(),
        Status::Idle | Status::Loading => theme.prefix.idle.clone(),
    })
}
