//! Process signals routed to live sessions.
//!
//! The handlers for SIGINT, SIGTERM and SIGHUP are installed once per
//! process, the first time a session asks for them, and a listener thread
//! forwards each signal to every session that is running. A signal that
//! arrives while no session is running takes its default action, so a
//! process that showed a prompt can still be stopped by `kill` or by
//! closing its terminal.
//!
//! On other platforms Ctrl+C reaches the session as a key press in raw
//! mode, and nothing is installed.

use std::io;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use tokio::sync::mpsc;
#[cfg(unix)]
use tracing::{debug, warn};

/// Where a signal went.
#[cfg_attr(not(unix), allow(dead_code))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Delivery {
    /// Forwarded to this many live sessions.
    Routed(usize),
    /// No session was live.
    Unrouted,
}

#[derive(Default)]
struct Routes {
    next_id: u64,
    sessions: Vec<(u64, mpsc::UnboundedSender<&'static str>)>,
}

/// Registry of live sessions.
#[derive(Default)]
pub(crate) struct Router {
    routes: Mutex<Routes>,
}

impl Router {
    fn routes(&self) -> MutexGuard<'_, Routes> {
        self.routes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a session. It stays registered until the returned
    /// subscription is dropped.
    pub(crate) fn register(self: &Arc<Self>) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut routes = self.routes();
        let id = routes.next_id;
        routes.next_id += 1;
        routes.sessions.push((id, tx));
        Subscription {
            router: Arc::clone(self),
            id,
            rx,
        }
    }

    #[cfg_attr(not(unix), allow(dead_code))]
    pub(crate) fn deliver(&self, signal: &'static str) -> Delivery {
        let mut routes = self.routes();
        routes.sessions.retain(|(_, tx)| tx.send(signal).is_ok());
        match routes.sessions.len() {
            0 => Delivery::Unrouted,
            n => Delivery::Routed(n),
        }
    }

    #[cfg(test)]
    pub(crate) fn live(&self) -> usize {
        self.routes().sessions.len()
    }

    fn unregister(&self, id: u64) {
        self.routes().sessions.retain(|(session, _)| *session != id);
    }
}

/// A session's place in the [`Router`].
pub(crate) struct Subscription {
    router: Arc<Router>,
    id: u64,
    rx: mpsc::UnboundedReceiver<&'static str>,
}

impl Subscription {
    /// Wait for the next signal and return its name.
    pub(crate) async fn recv(&mut self) -> &'static str {
        match self.rx.recv().await {
            Some(signal) => signal,
            None => std::future::pending().await,
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.router.unregister(self.id);
    }
}

fn router() -> &'static Arc<Router> {
    static ROUTER: OnceLock<Arc<Router>> = OnceLock::new();
    ROUTER.get_or_init(Arc::default)
}

/// Subscribe to process signals, installing the handlers on first use.
pub(crate) fn subscribe() -> io::Result<Subscription> {
    let router = router();
    listen(router)?;
    Ok(router.register())
}

/// Number of sessions currently subscribed to process signals.
#[cfg(test)]
pub(crate) fn live_sessions() -> usize {
    router().live()
}

#[cfg(unix)]
fn listen(router: &Arc<Router>) -> io::Result<()> {
    use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGTERM};
    use std::thread;

    static LISTENING: Mutex<bool> = Mutex::new(false);

    let mut listening = LISTENING.lock().unwrap_or_else(PoisonError::into_inner);
    if *listening {
        return Ok(());
    }

    let mut signals = signal_hook::iterator::Signals::new([SIGINT, SIGTERM, SIGHUP])?;
    let router = Arc::clone(router);
    thread::Builder::new()
        .name("interax-prompt-signals".to_owned())
        .spawn(move || {
            for signal in signals.forever() {
                on_signal(&router, signal);
            }
        })?;
    *listening = true;
    debug!("process signal listener started");
    Ok(())
}

#[cfg(not(unix))]
fn listen(_router: &Arc<Router>) -> io::Result<()> {
    Ok(())
}

#[cfg(unix)]
fn on_signal(router: &Router, signal: i32) {
    let name = signal_name(signal);
    match router.deliver(name) {
        Delivery::Routed(sessions) => debug!(signal = name, sessions, "process signal routed"),
        Delivery::Unrouted => {
            debug!(signal = name, "no live session, taking the default action");
            if let Err(err) = signal_hook::low_level::emulate_default_handler(signal) {
                warn!(signal = name, error = %err, "default signal action failed");
            }
        }
    }
}

#[cfg(unix)]
fn signal_name(signal: i32) -> &'static str {
    use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGTERM};
    match signal {
        SIGINT => "SIGINT",
        SIGTERM => "SIGTERM",
        SIGHUP => "SIGHUP",
        _ => "signal",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn signals_reach_every_live_session() {
        let router = Arc::new(Router::default());
        let mut first = router.register();
        let mut second = router.register();

        assert_eq!(router.deliver("SIGTERM"), Delivery::Routed(2));
        assert_eq!(first.recv().await, "SIGTERM");
        assert_eq!(second.recv().await, "SIGTERM");
    }

    #[tokio::test]
    async fn signal_between_waits_is_kept() {
        let router = Arc::new(Router::default());
        let mut session = router.register();

        router.deliver("SIGINT");
        router.deliver("SIGHUP");
        assert_eq!(session.recv().await, "SIGINT");
        assert_eq!(session.recv().await, "SIGHUP");
    }

    #[test]
    fn ended_sessions_leave_signals_unrouted() {
        let router = Arc::new(Router::default());
        assert_eq!(router.deliver("SIGTERM"), Delivery::Unrouted);

        let first = router.register();
        let second = router.register();
        assert_eq!(router.live(), 2);
        drop(first);
        assert_eq!(router.deliver("SIGHUP"), Delivery::Routed(1));
        drop(second);

        assert_eq!(router.live(), 0);
        assert_eq!(router.deliver("SIGTERM"), Delivery::Unrouted);
    }

    #[cfg(unix)]
    #[test]
    fn names_the_handled_signals() {
        use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGTERM};
        assert_eq!(signal_name(SIGINT), "SIGINT");
        assert_eq!(signal_name(SIGTERM), "SIGTERM");
        assert_eq!(signal_name(SIGHUP), "SIGHUP");
    }
}
