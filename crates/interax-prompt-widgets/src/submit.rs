//! Submitting a typed answer through user validation.

use interax_prompt_fwk::{Hooks, State, Status, ValidationResult, Validator, Verdict};

pub(crate) const REQUIRED_MESSAGE: &str = "You must provide a value";

/// The message shown for a rejection; a validator may reject without
/// saying why.
pub(crate) fn invalid_message(message: String) -> String {
    if message.is_empty() {
        "You must provide a valid value".to_owned()
    } else {
        message
    }
}

/// Validate `answer`, then hand the verdict to `settle`.
///
/// A synchronous validator settles immediately. An asynchronous one puts
/// the prompt in [`Status::Loading`] and settles from a local task, with
/// all of `settle`'s state changes batched into one render.
pub(crate) fn submit(
    hooks: &Hooks,
    status: &State<Status>,
    validator: Option<&Validator>,
    answer: &str,
    settle: impl FnOnce(ValidationResult) + 'static,
) {
    let verdict = match validator {
        Some(validator) => validator.check(answer),
        None => Verdict::Ready(Ok(())),
    };
    match verdict {
        Verdict::Ready(result) => settle(result),
        Verdict::Pending(check) => {
            status.set(Status::Loading);
            let hooks = hooks.clone();
            tokio::task::spawn_local(async move {
                let result = check.await;
                tracing::debug!(valid = result.is_ok(), "async validation finished");
                hooks.batch(|| settle(result));
            });
        }
    }
}
