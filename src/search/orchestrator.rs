use crate::search::store::{Action, Effects, FetchRequest, SearchState, SearchStore};
use crate::search::traits::SearchBackend;
use crate::search::types::{FilterChange, SearchResultSet};
use crate::search::view::{self, View};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info, warn};

/// Where the canonical query string is written back to.
/// In a browser this is `history.replaceState`; it never navigates.
pub trait History: Send {
    fn replace_state(&mut self, query_string: &str);

    fn current(&self) -> &str;
}

/// History kept in memory, recording every replacement
#[derive(Debug, Default)]
pub struct MemoryHistory {
    entries: Vec<String>,
}

impl MemoryHistory {
    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}

impl History for MemoryHistory {
    fn replace_state(&mut self, query_string: &str) {
        self.entries.push(query_string.to_string());
    }

    fn current(&self) -> &str {
        self.entries.last().map(String::as_str).unwrap_or("")
    }
}

enum Wake {
    Message(Option<Action>),
    TaskEnded(Result<(), JoinError>),
}

/// Drives a [`SearchStore`]: carries out its effects, runs fetches on the
/// tokio runtime and feeds their outcome back through the reducer.
///
/// Starting a fetch aborts the one in flight. A response that still slips
/// through carries an old generation and is dropped by the reducer.
pub struct FetchOrchestrator<H: History = MemoryHistory> {
    backend: Arc<dyn SearchBackend>,
    store: SearchStore,
    history: H,
    in_flight: Option<JoinHandle<()>>,
    tx: mpsc::UnboundedSender<Action>,
    rx: mpsc::UnboundedReceiver<Action>,
    fetches_issued: u64,
}

impl FetchOrchestrator<MemoryHistory> {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self::with_history(backend, MemoryHistory::default())
    }
}

impl<H: History> FetchOrchestrator<H> {
    pub fn with_history(backend: Arc<dyn SearchBackend>, history: H) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            backend,
            store: SearchStore::new(),
            history,
            in_flight: None,
            tx,
            rx,
            fetches_issued: 0,
        }
    }

    /// Apply an action and start whatever it asks for. Must run inside a tokio runtime.
    pub fn dispatch(&mut self, action: Action) {
        let effects = self.store.dispatch(action);
        self.run_effects(effects);
    }

    /// Wait until the latest fetch has been applied.
    ///
    /// A fetch task that dies without reporting back (a panicking backend)
    /// is turned into a failed fetch so the page never stays loading.
    pub async fn settle(&mut self) {
        while self.store.state().is_loading() {
            let wake = match self.in_flight.as_mut() {
                Some(handle) => tokio::select! {
                    action = self.rx.recv() => Wake::Message(action),
                    joined = handle => Wake::TaskEnded(joined),
                },
                None => Wake::Message(self.rx.recv().await),
            };
            match wake {
                Wake::Message(Some(action)) => self.dispatch(action),
                Wake::Message(None) => break,
                // a clean exit has already queued its result
                Wake::TaskEnded(Ok(())) => self.in_flight = None,
                Wake::TaskEnded(Err(err)) => {
                    self.in_flight = None;
                    let generation = self.store.state().generation;
                    warn!(generation, "Search task died: {}", err);
                    self.dispatch(Action::FetchFailed {
                        generation,
                        reason: err.to_string(),
                    });
                }
            }
        }
        self.in_flight = None;
    }

    /// Mount the page from a query string and wait for results
    pub async fn hydrate(&mut self, query_string: &str, initial: Option<SearchResultSet>) {
        self.dispatch(Action::Hydrate {
            query_string: query_string.to_string(),
            initial,
        });
        self.settle().await;
    }

    /// Apply one filter interaction and wait for results
    pub async fn apply(&mut self, change: FilterChange) {
        self.dispatch(Action::Filter(change));
        self.settle().await;
    }

    /// Browser navigation to a different query string
    pub async fn navigate(&mut self, query_string: &str) {
        self.dispatch(Action::UrlChanged(query_string.to_string()));
        self.settle().await;
    }

    pub fn state(&self) -> &SearchState {
        self.store.state()
    }

    pub fn view(&self) -> View {
        view::compose(self.store.state())
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    pub fn fetches_issued(&self) -> u64 {
        self.fetches_issued
    }

    fn run_effects(&mut self, effects: Effects) {
        if let Some(query_string) = effects.replace_url {
            debug!("Replacing URL query with {:?}", query_string);
            self.history.replace_state(&query_string);
        }
        if let Some(request) = effects.fetch {
            self.spawn_fetch(request);
        }
    }

    fn spawn_fetch(&mut self, request: FetchRequest) {
        if let Some(previous) = self.in_flight.take() {
            if !previous.is_finished() {
                debug!("Aborting superseded search");
                previous.abort();
            }
        }

        self.fetches_issued += 1;
        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        info!(
            generation = request.generation,
            origin = ?request.origin,
            source = backend.source_name(),
            "Starting search"
        );

        self.in_flight = Some(tokio::spawn(async move {
            let generation = request.generation;
            let action = match backend.search(&request.query).await {
                Ok(results) => Action::FetchSucceeded {
                    generation,
                    results,
                },
                Err(err) => {
                    warn!(generation, "Search failed: {:#}", err);
                    Action::FetchFailed {
                        generation,
                        reason: format!("{err:#}"),
                    }
                }
            };
            let _ = tx.send(action);
        }));
    }
}
