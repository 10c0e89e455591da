//! Shared gateway state: one independent dialogue per session id.

use dashmap::DashMap;
use feelio_core::{
    DialogueOrchestrator, DialogueSettings, EmotionClassifier, EmotionLabel, NeutralClassifier,
    SessionSummary, TextGenerator,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::info;
use uuid::Uuid;

/// One browser conversation: its orchestrator plus the latest label from the vision route.
pub struct GatewaySession {
    pub orchestrator: DialogueOrchestrator,
    pub emotion: EmotionLabel,
    pub last_active: Instant,
}

impl GatewaySession {
    pub fn touch(&mut self) {
        self.last_active = Instant::now();
    }
}

pub type SessionHandle = Arc<Mutex<GatewaySession>>;

#[derive(Clone)]
pub struct AppState {
    sessions: Arc<DashMap<Uuid, SessionHandle>>,
    default_session: Uuid,
    generator: Arc<dyn TextGenerator>,
    classifier: Arc<dyn EmotionClassifier>,
    settings: DialogueSettings,
}

impl AppState {
    pub fn new(generator: Arc<dyn TextGenerator>, settings: DialogueSettings) -> Self {
        Self::with_classifier(generator, Arc::new(NeutralClassifier), settings)
    }

    pub fn with_classifier(
        generator: Arc<dyn TextGenerator>,
        classifier: Arc<dyn EmotionClassifier>,
        settings: DialogueSettings,
    ) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            default_session: Uuid::new_v4(),
            generator,
            classifier,
            settings,
        }
    }

    pub fn classifier(&self) -> &dyn EmotionClassifier {
        self.classifier.as_ref()
    }

    fn new_session(&self) -> SessionHandle {
        Arc::new(Mutex::new(GatewaySession {
            orchestrator: DialogueOrchestrator::new(self.generator.clone(), self.settings.clone()),
            emotion: EmotionLabel::Neutral,
            last_active: Instant::now(),
        }))
    }

    pub fn create_session(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.sessions.insert(id, self.new_session());
        info!(target: "feelio::gateway", session = %id, active = self.sessions.len(), "session created");
        id
    }

    /// Clone the handle out so the map shard is not held across an await.
    pub fn session(&self, id: &Uuid) -> Option<SessionHandle> {
        self.sessions.get(id).map(|entry| entry.value().clone())
    }

    pub fn default_session_id(&self) -> Uuid {
        self.default_session
    }

    /// Session used by the single-user compatibility routes; recreated if it was ended.
    pub fn default_session(&self) -> SessionHandle {
        self.sessions
            .entry(self.default_session)
            .or_insert_with(|| self.new_session())
            .value()
            .clone()
    }

    pub fn remove_session(&self, id: &Uuid) -> Option<SessionHandle> {
        self.sessions.remove(id).map(|(_, handle)| handle)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Finalize and drop sessions untouched for at least `ttl`. Sessions busy with a turn are skipped.
    pub async fn sweep_idle(&self, ttl: Duration) -> Vec<SessionSummary> {
        let snapshot: Vec<(Uuid, SessionHandle)> = self
            .sessions
            .iter()
            .map(|e| (*e.key(), e.value().clone()))
            .collect();
        let mut summaries = Vec::new();
        for (id, handle) in snapshot {
            let Ok(mut session) = handle.try_lock() else {
                continue;
            };
            if session.last_active.elapsed() < ttl {
                continue;
            }
            self.sessions.remove(&id);
            let summary = session.orchestrator.finalize().await;
            info!(target: "feelio::gateway", session = %id, turns = summary.turns, "idle session finalized");
            summaries.push(summary);
        }
        summaries
    }

    /// Run [`AppState::sweep_idle`] every `every` until the task is aborted.
    pub fn spawn_idle_sweeper(&self, ttl: Duration, every: Duration) -> JoinHandle<()> {
        let state = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                let closed = state.sweep_idle(ttl).await;
                if !closed.is_empty() {
                    info!(target: "feelio::gateway", closed = closed.len(), active = state.session_count(), "idle sweep");
                }
            }
        })
    }

    /// Finalize and drop every open session (shutdown).
    pub async fn close_all(&self) -> Vec<SessionSummary> {
        let ids: Vec<Uuid> = self.sessions.iter().map(|e| *e.key()).collect();
        let mut summaries = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(handle) = self.remove_session(&id) {
                summaries.push(handle.lock().await.orchestrator.finalize().await);
            }
        }
        summaries
    }
}
