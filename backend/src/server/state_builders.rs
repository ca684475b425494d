//! Builders wiring adapters into the HTTP state.

use std::sync::Arc;
use std::time::Duration;

use livepoll::domain::ports::{
    ChangeFeed, MirrorSource, NoOpRealtimeMirror, PollRepository, PollsCommand, PollsQuery,
    RealtimeMirror, TextGenerator, UnconfiguredTextGenerator, UserRepository,
};
use livepoll::domain::{
    AssistService, MirrorDispatcher, MirrorOutbox, MirrorReconciler, PollService,
};
use livepoll::inbound::http::state::HttpState;
use livepoll::outbound::generative::GeminiTextGenerator;
use livepoll::outbound::memory::InMemoryPollStore;
use livepoll::outbound::persistence::{
    DbPool, DieselPollRepository, DieselUserRepository, PoolConfig, run_pending_migrations,
};
use livepoll::outbound::realtime::HttpRealtimeMirror;
use mockable::DefaultClock;
use tracing::{info, warn};

use super::config::AppSettings;

const MIRROR_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Everything the server needs besides the listener.
pub(super) struct Wiring {
    pub(super) http_state: HttpState,
    pub(super) dispatcher: MirrorDispatcher,
}

fn io_error(context: &str, error: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(format!("{context}: {error}"))
}

/// Mirror writer plus, when a broadcast store is configured, its read-back
/// source.
struct MirrorAdapters {
    writer: Arc<dyn RealtimeMirror>,
    source: Option<Arc<dyn MirrorSource>>,
}

fn build_mirror(settings: &AppSettings) -> std::io::Result<MirrorAdapters> {
    match settings.mirror().map_err(|err| io_error("mirror settings", err))? {
        Some((url, key)) => {
            info!(mirror = %url, "realtime mirror enabled");
            let mirror = Arc::new(
                HttpRealtimeMirror::new(url, key, MIRROR_REQUEST_TIMEOUT)
                    .map_err(|err| io_error("mirror client", err))?,
            );
            Ok(MirrorAdapters {
                writer: mirror.clone(),
                source: Some(mirror),
            })
        }
        None => {
            warn!("mirror url or key not configured; realtime mirroring disabled");
            Ok(MirrorAdapters {
                writer: Arc::new(NoOpRealtimeMirror),
                source: None,
            })
        }
    }
}

/// Copy broadcast store rows into `polls` when enabled.
///
/// Failures are logged; the server starts either way.
async fn reconcile_on_startup(
    settings: &AppSettings,
    source: Option<Arc<dyn MirrorSource>>,
    polls: Arc<dyn PollRepository>,
) {
    if !settings.reconcile_on_start {
        return;
    }
    let Some(source) = source else {
        warn!("reconcile requested but no realtime mirror is configured; skipping");
        return;
    };
    if let Err(error) = MirrorReconciler::new(source, polls).reconcile().await {
        warn!(error = %error, "startup reconcile failed");
    }
}

fn build_generator(settings: &AppSettings) -> std::io::Result<Arc<dyn TextGenerator>> {
    let Some(key) = settings.generative_api_key() else {
        warn!("generative api key not configured; assist features will report failures");
        return Ok(Arc::new(UnconfiguredTextGenerator));
    };
    let endpoint = settings
        .generative_endpoint()
        .map_err(|err| io_error("generative settings", err))?;
    let generator = GeminiTextGenerator::new(
        &endpoint,
        settings.generative_model(),
        key,
        settings.assist_timeout(),
    )
    .map_err(|err| io_error("generative client", err))?;
    Ok(Arc::new(generator))
}

fn build_ports<P, U>(
    polls: Arc<P>,
    users: Arc<U>,
    feed: Arc<dyn ChangeFeed>,
    generator: Arc<dyn TextGenerator>,
    assist_timeout: Duration,
) -> HttpState
where
    P: PollRepository + 'static,
    U: UserRepository + 'static,
{
    let service = Arc::new(PollService::new(
        polls,
        users,
        feed,
        Arc::new(DefaultClock),
    ));
    let command: Arc<dyn PollsCommand> = service.clone();
    let query: Arc<dyn PollsQuery> = service;
    let assist = AssistService::new(generator, query.clone(), command.clone())
        .with_timeout(assist_timeout);
    HttpState::new(command, query, Arc::new(assist))
}

/// Build storage, the mirror outbox and the assist adapter from settings.
///
/// Pending migrations are applied before the pool is opened. An enabled
/// startup reconcile runs once storage is ready.
pub(super) async fn build_wiring(settings: &AppSettings) -> std::io::Result<Wiring> {
    let mirror = build_mirror(settings)?;
    let (outbox, dispatcher) = MirrorOutbox::channel(settings.mirror_queue_capacity(), mirror.writer);
    let feed: Arc<dyn ChangeFeed> = Arc::new(outbox);
    let generator = build_generator(settings)?;
    let assist_timeout = settings.assist_timeout();

    let http_state = match settings.database_url() {
        Some(url) => {
            run_pending_migrations(url)
                .await
                .map_err(|err| io_error("database migrations", err))?;
            let pool = DbPool::new(
                PoolConfig::new(url).with_max_size(settings.db_max_connections()),
            )
            .await
            .map_err(|err| io_error("database pool", err))?;
            let polls = Arc::new(DieselPollRepository::new(pool.clone()));
            reconcile_on_startup(settings, mirror.source, polls.clone()).await;
            build_ports(
                polls,
                Arc::new(DieselUserRepository::new(pool)),
                feed,
                generator,
                assist_timeout,
            )
        }
        None => {
            warn!("database url not configured; using the in-memory store");
            let store = Arc::new(InMemoryPollStore::new());
            reconcile_on_startup(settings, mirror.source, store.clone()).await;
            build_ports(store.clone(), store, feed, generator, assist_timeout)
        }
    };

    Ok(Wiring {
        http_state,
        dispatcher,
    })
}
