//! Console — keeps the operator's controls and the shared presenter state
//! consistent.
//!
//! DESIGN
//! ======
//! One event loop owns every mutation. Control events from the operator,
//! snapshots from the store, session flips from the auth provider, and
//! completions of the console's own background work all enter the same
//! `select!` loop, so state changes apply in event-arrival order. Slow
//! collaborator work stays out of the loop: store writes queue to a single
//! writer task that commits them in issue order, sign-outs are spawned and
//! logged, and deck loads are spawned with completions re-entering the loop
//! tagged with a generation token so a superseded load can be discarded.
//! Page moves on the viewer are awaited inline; `set_page` is expected to
//! return promptly.
//!
//! LOOPBACK
//! ========
//! Remote-origin updates never write back to the store. Only control-origin
//! changes may write, and only while an operator is signed in. Echo versus
//! intent is decided field by field: the page compares against local state
//! and the deck against the targeted deck (the pending switch if one is in
//! flight, else the confirmed one). A matching field is an echo and is
//! dropped; a differing field is applied without a write.
//!
//! LIFECYCLE
//! =========
//! 1. `spawn_console` wires channels and starts the loop
//! 2. The loop subscribes to store and auth, then requests the deck list
//! 3. Events mutate [`PanelState`] and emit [`ViewEvent`]s for the surface
//! 4. Dropping the [`ConsoleHandle`] aborts the loop; `shutdown` drains it

pub mod input;
pub mod panel;

mod paging;

use std::sync::Arc;

use tokio::sync::{RwLock, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::auth::{AuthProvider, Operator};
use crate::config::ConsoleConfig;
use crate::console::input::{ControlEvent, StepDirection, route_key};
use crate::console::panel::{PanelState, ViewEvent};
use crate::presenter::{DeckId, PresenterState, StatePatch};
use crate::store::StateStore;
use crate::viewer::{DeckViewer, PagesReady, ViewerError};

/// Depth of the queue carrying completions of the console's own background
/// work back into the loop.
const INTAKE_CAPACITY: usize = 8;

// =============================================================================
// HANDLE
// =============================================================================

/// Owner's grip on a running console.
///
/// Dropping the handle tears the console down: the event loop is aborted and
/// its store and auth subscriptions are released. Use [`ConsoleHandle::shutdown`]
/// to let already-queued events finish first.
pub struct ConsoleHandle {
    controls: mpsc::Sender<ControlEvent>,
    panel: Arc<RwLock<PanelState>>,
    views: Option<mpsc::Receiver<ViewEvent>>,
    task: Option<JoinHandle<()>>,
}

impl ConsoleHandle {
    /// Queue a control event for the console.
    ///
    /// Returns `false` if the console has stopped.
    pub async fn control(&self, event: ControlEvent) -> bool {
        self.controls.send(event).await.is_ok()
    }

    /// Snapshot of what the controls currently show.
    pub async fn panel(&self) -> PanelState {
        self.panel.read().await.clone()
    }

    /// Take the view event stream. Yields `Some` exactly once; the console
    /// runs fine if nobody ever takes or drains it.
    pub fn view_events(&mut self) -> Option<mpsc::Receiver<ViewEvent>> {
        self.views.take()
    }

    /// Stop accepting controls, let the loop finish its queue, and wait for
    /// it to exit.
    pub async fn shutdown(mut self) {
        let Some(task) = self.task.take() else { return };
        drop(self);
        if task.await.is_err() {
            debug!("console task did not exit cleanly");
        }
    }
}

impl Drop for ConsoleHandle {
    fn drop(&mut self) {
        if let Some(task) = &self.task {
            task.abort();
        }
    }
}

// =============================================================================
// SPAWN
// =============================================================================

/// Start a console over the three collaborators and hand back its controls.
#[must_use]
pub fn spawn_console(
    store: Arc<dyn StateStore>,
    auth: Arc<dyn AuthProvider>,
    viewer: Arc<dyn DeckViewer>,
    config: ConsoleConfig,
) -> ConsoleHandle {
    // Channel construction requires a non-zero depth.
    let (controls_tx, controls_rx) = mpsc::channel(config.control_capacity.max(1));
    let (views_tx, views_rx) = mpsc::channel(config.event_capacity.max(1));
    let (intake_tx, intake_rx) = mpsc::channel(INTAKE_CAPACITY);
    let writes_tx = spawn_write_worker(Arc::clone(&store), config.control_capacity.max(1));
    let panel = Arc::new(RwLock::new(PanelState::default()));

    let console = Console {
        store,
        auth,
        viewer,
        config,
        local: LocalView::default(),
        panel: Arc::clone(&panel),
        views: views_tx,
        intake: intake_tx,
        writes: writes_tx,
        generation: 0,
    };
    let task = tokio::spawn(console.run(controls_rx, intake_rx));

    ConsoleHandle {
        controls: controls_tx,
        panel,
        views: Some(views_rx),
        task: Some(task),
    }
}

/// Spawn the writer that commits state patches strictly in issue order, so
/// two rapid control writes can never land reversed. Returns the queue
/// feeding it; the worker exits once the queue closes.
fn spawn_write_worker(
    store: Arc<dyn StateStore>,
    capacity: usize,
) -> mpsc::Sender<StatePatch> {
    let (tx, mut rx) = mpsc::channel(capacity);
    tokio::spawn(async move {
        while let Some(patch) = rx.recv().await {
            if let Err(e) = store.update(patch).await {
                warn!(error = %e, "presenter state write failed");
            }
        }
    });
    tx
}

// =============================================================================
// INTAKE
// =============================================================================

/// Completions of the console's own background work, re-entering the loop.
enum Intake {
    /// Startup deck enumeration finished.
    DeckList(Vec<DeckId>),
    /// A spawned deck load resolved.
    DeckLoaded {
        deck: DeckId,
        generation: u64,
        result: Result<PagesReady, ViewerError>,
    },
}

/// A deck switch whose viewer load has not resolved yet.
///
/// `target_page` stashes a remote page that arrived mid-switch; it belongs to
/// the incoming deck and is applied once the load lands.
struct PendingLoad {
    deck: DeckId,
    generation: u64,
    target_page: Option<u32>,
}

/// The console's working copy of presenter state.
///
/// `deck` and `page` are the comparison fields for echo detection: a snapshot
/// field equal to its local counterpart (for the deck, the targeted one) is
/// this console's own write coming back, or a value already applied.
#[derive(Default)]
struct LocalView {
    deck: Option<DeckId>,
    page: u32,
    page_count: Option<u32>,
    pending: Option<PendingLoad>,
    operator: Option<Operator>,
}

impl LocalView {
    /// The deck the console is steering toward: an unresolved switch if one
    /// is pending, otherwise the confirmed deck.
    fn target_deck(&self) -> Option<&DeckId> {
        self.pending.as_ref().map(|pending| &pending.deck).or(self.deck.as_ref())
    }
}

// =============================================================================
// EVENT LOOP
// =============================================================================

struct Console {
    store: Arc<dyn StateStore>,
    auth: Arc<dyn AuthProvider>,
    viewer: Arc<dyn DeckViewer>,
    config: ConsoleConfig,
    local: LocalView,
    panel: Arc<RwLock<PanelState>>,
    views: mpsc::Sender<ViewEvent>,
    intake: mpsc::Sender<Intake>,
    writes: mpsc::Sender<StatePatch>,
    generation: u64,
}

impl Console {
    async fn run(
        mut self,
        mut controls: mpsc::Receiver<ControlEvent>,
        mut intake: mpsc::Receiver<Intake>,
    ) {
        let mut remote = self.store.subscribe().await;
        let mut sessions = self.auth.subscribe().await;

        // Prime the write gate so a control arriving ahead of the first
        // session message is gated on the real session, not the default.
        self.local.operator = self.auth.current_operator().await;
        self.panel.write().await.operator = self.local.operator.clone();

        self.request_deck_list();

        loop {
            tokio::select! {
                event = controls.recv() => {
                    let Some(event) = event else { break };
                    self.handle_control(event).await;
                }
                Some(state) = remote.recv() => {
                    self.handle_remote(state).await;
                }
                Some(session) = sessions.recv() => {
                    self.handle_session(session).await;
                }
                Some(done) = intake.recv() => {
                    self.handle_intake(done).await;
                }
            }
        }

        debug!("console event loop stopped");
    }

    // =========================================================================
    // CONTROL HANDLERS
    // =========================================================================

    async fn handle_control(&mut self, event: ControlEvent) {
        match event {
            ControlEvent::DeckSelected(deck) => self.deck_selected(deck).await,
            ControlEvent::PageEntered(raw) => self.page_entered(&raw).await,
            ControlEvent::StepRequested(direction) => self.step(direction).await,
            ControlEvent::KeyPressed(key) => {
                if let Some(direction) = route_key(key) {
                    self.step(direction).await;
                }
            }
            ControlEvent::LoginRequested => self.login_requested(),
            ControlEvent::LogoutRequested => self.logout_requested(),
        }
    }

    /// Selector changed. The selector keeps showing the operator's choice
    /// whatever happens to the load; the comparison field follows only on a
    /// confirmed load. The guard compares against the targeted deck, so
    /// re-selecting the confirmed deck while a different switch is pending
    /// counts as new intent and supersedes that switch.
    async fn deck_selected(&mut self, deck: DeckId) {
        if deck.is_empty() {
            return;
        }
        if self.local.target_deck() == Some(&deck) {
            return;
        }

        self.update_panel(|panel| panel.selected_deck = Some(deck.clone())).await;

        if self.local.operator.is_some() {
            self.queue_write(StatePatch::deck(deck.clone()));
        }
        self.begin_deck_load(deck);
    }

    /// Page field committed. Entry is parse-checked but deliberately not
    /// range-checked; the rendering side clamps.
    async fn page_entered(&mut self, raw: &str) {
        let Some(page) = paging::parse_page_entry(raw) else {
            debug!(entry = raw, "ignoring non-numeric page entry");
            return;
        };
        if page == self.local.page {
            return;
        }

        self.show_page(page).await;
        if self.local.operator.is_some() {
            self.queue_write(StatePatch::page(page));
        }
    }

    /// Prev/next control or arrow key. Clamped to the loaded deck; a step
    /// with nothing loaded has no bounds and is dropped.
    async fn step(&mut self, direction: StepDirection) {
        let Some(page_count) = self.local.page_count else {
            debug!(?direction, "step ignored: no deck loaded");
            return;
        };

        let target = paging::step_target(self.local.page, direction, page_count);
        if target == self.local.page {
            return;
        }

        self.show_page(target).await;
        if self.local.operator.is_some() {
            self.queue_write(StatePatch::page(target));
        }
    }

    fn login_requested(&mut self) {
        self.emit(ViewEvent::NavigateToLogin { url: self.config.login_url.clone() });
    }

    /// Sign-out runs in the background; the session flip comes back through
    /// the auth subscription.
    fn logout_requested(&mut self) {
        let auth = Arc::clone(&self.auth);
        tokio::spawn(async move {
            if let Err(e) = auth.sign_out().await {
                warn!(error = %e, "sign-out failed");
            }
        });
    }

    // =========================================================================
    // REMOTE HANDLERS
    // =========================================================================

    /// A store snapshot, which may be another writer's change or this
    /// console's own write coming back. Fields equal to local state are
    /// echoes and drop out here; differing fields apply without a write.
    /// The deck comparison is against the targeted deck, so a snapshot
    /// naming the switch already in flight starts nothing new.
    async fn handle_remote(&mut self, state: PresenterState) {
        debug!(deck = %state.deck, page = state.page, "remote snapshot");

        if self.local.target_deck() != Some(&state.deck) {
            self.begin_deck_load(state.deck);
        }

        if state.page != self.local.page {
            if let Some(pending) = &mut self.local.pending {
                // Belongs to the deck being switched to; applied on landing.
                pending.target_page = Some(state.page);
            } else {
                self.show_page(state.page).await;
            }
        }
    }

    async fn handle_session(&mut self, operator: Option<Operator>) {
        info!(signed_in = operator.is_some(), "session changed");
        self.local.operator = operator.clone();
        self.update_panel(|panel| panel.operator = operator.clone()).await;
        self.emit(ViewEvent::AuthChanged(operator));
    }

    async fn handle_intake(&mut self, done: Intake) {
        match done {
            Intake::DeckList(decks) => {
                self.update_panel(|panel| panel.deck_options = decks.clone()).await;
                self.emit(ViewEvent::DeckOptions(decks));
            }
            Intake::DeckLoaded { deck, generation, result } => {
                self.deck_loaded(deck, generation, result).await;
            }
        }
    }

    /// A spawned deck load resolved. Only the newest pending switch counts;
    /// completions carrying an older generation lost the race and are
    /// discarded so a stale deck can never clobber a newer one.
    async fn deck_loaded(
        &mut self,
        deck: DeckId,
        generation: u64,
        result: Result<PagesReady, ViewerError>,
    ) {
        let is_current = self
            .local
            .pending
            .as_ref()
            .is_some_and(|pending| pending.generation == generation);
        if !is_current {
            debug!(%deck, generation, "discarding superseded deck load");
            return;
        }
        let target = self.local.pending.take().and_then(|pending| pending.target_page);

        match result {
            Ok(ready) => {
                info!(%deck, pages = ready.page_count, "deck ready");
                self.local.deck = Some(deck.clone());
                self.local.page_count = Some(ready.page_count);

                let shown = deck.clone();
                let page_count = ready.page_count;
                self.update_panel(move |panel| {
                    panel.selected_deck = Some(shown);
                    panel.page_count = Some(page_count);
                })
                .await;
                self.emit(ViewEvent::DeckShown { deck, page_count });

                // Where the page lands on the new deck: a page stashed while
                // the switch was pending wins; otherwise the current page
                // carries over and the viewer, which reset during the load,
                // is driven back to it.
                match target {
                    Some(page) => self.show_page(page).await,
                    None if self.local.page > 1 => self.show_page(self.local.page).await,
                    None => {}
                }
            }
            Err(e) => {
                // Prior deck stays loaded; the selector may keep showing the
                // name that failed.
                warn!(%deck, error = %e, "deck load failed");
            }
        }
    }

    // =========================================================================
    // SHARED APPLICATION
    // =========================================================================

    /// Begin switching to `deck`, superseding whatever switch is in flight.
    /// Callers have already dropped requests naming the current target.
    fn begin_deck_load(&mut self, deck: DeckId) {
        self.generation = self.generation.wrapping_add(1);
        let generation = self.generation;
        self.local.pending =
            Some(PendingLoad { deck: deck.clone(), generation, target_page: None });

        let viewer = Arc::clone(&self.viewer);
        let intake = self.intake.clone();
        tokio::spawn(async move {
            let result = viewer.load_deck(&deck).await;
            let _ = intake.send(Intake::DeckLoaded { deck, generation, result }).await;
        });
    }

    /// Move the visible page: local state, panel text, viewer, event. The
    /// caller decides whether the move is also written to the store.
    async fn show_page(&mut self, page: u32) {
        self.local.page = page;
        self.update_panel(|panel| panel.page_entry = page.to_string()).await;
        self.viewer.set_page(page).await;
        self.emit(ViewEvent::PageShown(page));
    }

    /// Queue a store write for the writer task; patches commit in issue
    /// order. Failures are logged, never retried, and never roll back what
    /// the controls already show.
    fn queue_write(&self, patch: StatePatch) {
        match self.writes.try_send(patch) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!("write queue full; dropping state write");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!("write queue closed; dropping state write");
            }
        }
    }

    /// One-shot startup enumeration; completion order relative to other
    /// startup events is not guaranteed.
    fn request_deck_list(&self) {
        let store = Arc::clone(&self.store);
        let intake = self.intake.clone();
        tokio::spawn(async move {
            match store.list_decks().await {
                Ok(entries) => {
                    let decks = entries.into_iter().map(|entry| entry.id).collect();
                    let _ = intake.send(Intake::DeckList(decks)).await;
                }
                Err(e) => warn!(error = %e, "deck enumeration failed"),
            }
        });
    }

    async fn update_panel(&self, mutate: impl FnOnce(&mut PanelState)) {
        let mut panel = self.panel.write().await;
        mutate(&mut panel);
    }

    /// Best-effort: a surface that stops draining loses events, not the
    /// console.
    fn emit(&self, event: ViewEvent) {
        let _ = self.views.try_send(event);
    }
}

#[cfg(test)]
#[path = "console_test.rs"]
mod tests;
