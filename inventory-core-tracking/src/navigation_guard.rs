use async_trait::async_trait;
use inventory_core_api::ChangeResult;
use parking_lot::Mutex;
use reqwest::Url;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use crate::config::GuardConfig;
use crate::notifier::Notifier;

/// Stand-in base for relative links when no origin is configured
const LOCAL_ORIGIN: &str = "http://localhost/";

/// Blocking yes/no dialog shown before leaving the page
#[async_trait]
pub trait NavigationPrompt: Send + Sync {
    /// Returns true when the user accepts
    async fn confirm(&self, message: &str) -> bool;
}

/// Saves the pending batch on the user's request
#[async_trait]
pub trait SaveCallback: Send + Sync {
    /// Returns the number of changes still pending afterwards
    async fn save(&self) -> ChangeResult<usize>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    BeforeUnload,
    RouteChange,
    LinkClick,
    Refocus,
    Reminder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnloadDecision {
    Allow,
    /// Show the browser's native warning with this text
    Warn(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationDecision {
    Proceed,
    Stay,
}

#[derive(Default)]
struct GuardState {
    pending: usize,
    reminder_task: Option<JoinHandle<()>>,
    refocus_task: Option<JoinHandle<()>>,
    last_reminder: Option<Instant>,
}

impl GuardState {
    fn detach(&mut self) {
        if let Some(task) = self.reminder_task.take() {
            task.abort();
        }
        if let Some(task) = self.refocus_task.take() {
            task.abort();
        }
        self.last_reminder = None;
    }
}

/// Keeps the user from leaving the page with unsaved batch changes.
///
/// The guard is active exactly while batch mode is on and changes are
/// pending. Platform events reach it as method calls; while inactive every
/// event is let through and no timer runs.
pub struct NavigationGuard {
    config: GuardConfig,
    notifier: Arc<dyn Notifier>,
    prompt: Arc<dyn NavigationPrompt>,
    save: Mutex<Option<Arc<dyn SaveCallback>>>,
    state: Arc<Mutex<GuardState>>,
}

impl NavigationGuard {
    pub fn new(
        config: GuardConfig,
        notifier: Arc<dyn Notifier>,
        prompt: Arc<dyn NavigationPrompt>,
    ) -> Self {
        Self {
            config,
            notifier,
            prompt,
            save: Mutex::new(None),
            state: Arc::new(Mutex::new(GuardState::default())),
        }
    }

    pub fn set_save_callback(&self, save: Option<Arc<dyn SaveCallback>>) {
        *self.save.lock() = save;
    }

    /// Re-evaluates the guard from its inputs, attaching or detaching the
    /// listeners on a transition
    pub fn sync(&self, batch_enabled: bool, pending_changes: usize) {
        let pending = if batch_enabled { pending_changes } else { 0 };
        let mut state = self.state.lock();
        let was_active = state.pending > 0;
        state.pending = pending;

        match (was_active, pending > 0) {
            (false, true) => {
                state.reminder_task = self.spawn_reminder();
                debug!(pending, "Navigation guard attached");
            }
            (true, false) => {
                state.detach();
                debug!("Navigation guard detached");
            }
            _ => {}
        }
    }

    pub fn is_active(&self) -> bool {
        self.state.lock().pending > 0
    }

    pub fn pending_changes(&self) -> usize {
        self.state.lock().pending
    }

    pub fn attached_listeners(&self) -> Vec<ListenerKind> {
        let state = self.state.lock();
        if state.pending == 0 {
            return Vec::new();
        }
        let mut listeners = vec![
            ListenerKind::BeforeUnload,
            ListenerKind::RouteChange,
            ListenerKind::LinkClick,
            ListenerKind::Refocus,
        ];
        if state.reminder_task.is_some() {
            listeners.push(ListenerKind::Reminder);
        }
        listeners
    }

    pub fn on_before_unload(&self) -> UnloadDecision {
        match self.pending_changes() {
            0 => UnloadDecision::Allow,
            pending => UnloadDecision::Warn(format!(
                "Tienes {pending} cambios sin guardar. Si sales de la página se perderá el registro de estos cambios."
            )),
        }
    }

    /// Route change inside the application. Warns, then offers to save
    /// first when a save callback is set.
    pub async fn on_route_change(&self, target: &str) -> NavigationDecision {
        let pending = self.pending_changes();
        if pending == 0 {
            return NavigationDecision::Proceed;
        }
        debug!(route = target, pending, "Route change with pending changes");
        self.notifier
            .warning(&format!("Tienes {pending} cambios sin guardar"));

        let Some(save) = self.save_callback() else {
            return NavigationDecision::Proceed;
        };
        let question = format!("¿Quieres guardar los {pending} cambios pendientes antes de salir?");
        if self.prompt.confirm(&question).await {
            self.save_then_proceed(save).await
        } else {
            NavigationDecision::Proceed
        }
    }

    /// Click on a link. External links are not intercepted.
    pub async fn on_link_click(&self, href: &str) -> NavigationDecision {
        let pending = self.pending_changes();
        if pending == 0 || !self.is_internal_link(href) {
            return NavigationDecision::Proceed;
        }

        let question = format!("Tienes {pending} cambios sin guardar. ¿Quieres salir de todas formas?");
        if !self.prompt.confirm(&question).await {
            return NavigationDecision::Stay;
        }
        let Some(save) = self.save_callback() else {
            return NavigationDecision::Proceed;
        };
        if self.prompt.confirm("¿Guardar los cambios antes de salir?").await {
            self.save_then_proceed(save).await
        } else {
            NavigationDecision::Proceed
        }
    }

    /// The tab became visible again; a reminder follows after the debounce
    /// unless another refocus comes first
    pub fn on_refocus(&self) {
        let mut state = self.state.lock();
        if state.pending == 0 {
            return;
        }
        if let Some(task) = state.refocus_task.take() {
            task.abort();
        }
        let Ok(handle) = Handle::try_current() else {
            warn!("No async runtime, refocus reminder skipped");
            return;
        };

        let shared = Arc::downgrade(&self.state);
        let notifier = self.notifier.clone();
        let debounce = self.config.refocus_debounce();
        let cooldown = self.config.reminder_cooldown();
        state.refocus_task = Some(handle.spawn(async move {
            sleep(debounce).await;
            if let Some(shared) = shared.upgrade() {
                emit_reminder(&shared, notifier.as_ref(), cooldown);
            }
        }));
    }

    /// Resolves `href` against the configured origin and compares scheme,
    /// host and port. Without an origin only absolute URLs leave the app.
    pub fn is_internal_link(&self, href: &str) -> bool {
        let href = href.trim();
        if href.is_empty() || href.starts_with('#') {
            return false;
        }
        let origin = self.config.origin.as_deref().unwrap_or(LOCAL_ORIGIN);
        let base = match Url::parse(origin) {
            Ok(base) => base,
            Err(e) => {
                warn!(origin, error = %e, "Invalid guard origin, using local origin");
                match Url::parse(LOCAL_ORIGIN) {
                    Ok(base) => base,
                    Err(_) => return false,
                }
            }
        };
        match base.join(href) {
            Ok(target) => {
                target.scheme() == base.scheme()
                    && target.host_str() == base.host_str()
                    && target.port_or_known_default() == base.port_or_known_default()
            }
            Err(_) => false,
        }
    }

    fn save_callback(&self) -> Option<Arc<dyn SaveCallback>> {
        self.save.lock().clone()
    }

    async fn save_then_proceed(&self, save: Arc<dyn SaveCallback>) -> NavigationDecision {
        match save.save().await {
            Ok(remaining) => {
                self.sync(true, remaining);
                NavigationDecision::Proceed
            }
            Err(e) => {
                warn!(error = %e, "Save before navigation failed, staying on page");
                NavigationDecision::Stay
            }
        }
    }

    fn spawn_reminder(&self) -> Option<JoinHandle<()>> {
        let Ok(handle) = Handle::try_current() else {
            warn!("No async runtime, periodic reminder disabled");
            return None;
        };
        let shared = Arc::downgrade(&self.state);
        let notifier = self.notifier.clone();
        let period = self.config.reminder_interval();
        let cooldown = self.config.reminder_cooldown();
        Some(handle.spawn(remind_periodically(shared, notifier, period, cooldown)))
    }
}

impl Drop for NavigationGuard {
    fn drop(&mut self) {
        self.state.lock().detach();
    }
}

async fn remind_periodically(
    state: Weak<Mutex<GuardState>>,
    notifier: Arc<dyn Notifier>,
    period: Duration,
    cooldown: Duration,
) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let Some(state) = state.upgrade() else {
            break;
        };
        emit_reminder(&state, notifier.as_ref(), cooldown);
    }
}

/// At most one reminder per cool-down window, whatever triggered it
fn emit_reminder(state: &Mutex<GuardState>, notifier: &dyn Notifier, cooldown: Duration) -> bool {
    let pending = {
        let mut state = state.lock();
        if state.pending == 0 {
            return false;
        }
        let now = Instant::now();
        if state
            .last_reminder
            .is_some_and(|at| now.duration_since(at) < cooldown)
        {
            return false;
        }
        state.last_reminder = Some(now);
        state.pending
    };
    notifier.warning(&format!(
        "Recuerda: tienes {pending} cambios sin guardar en modo lote"
    ));
    true
}
