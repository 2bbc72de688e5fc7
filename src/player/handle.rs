//! Public player handle

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::{Error, Result};
use crate::event::{EventSender, PlayerEvent};
use crate::logger::{log_debug, log_warn, Logger};
use crate::media::{Demuxer, Mp4Demuxer};
use crate::sink::SinkFactory;
use crate::transport::{Connector, WsConnector};

use super::config::PlayerConfig;
use super::orchestrator::Orchestrator;

/// Pluggable collaborators of a player
pub struct PlayerBackend {
    pub connector: Box<dyn Connector>,
    pub sink_factory: Box<dyn SinkFactory>,
    pub demuxer: Box<dyn Demuxer>,
}

impl PlayerBackend {
    /// WebSocket transport and MP4 demuxer around the given sink factory
    pub fn new(sink_factory: impl SinkFactory + 'static) -> Self {
        Self {
            connector: Box::new(WsConnector::new()),
            sink_factory: Box::new(sink_factory),
            demuxer: Box::new(Mp4Demuxer::new()),
        }
    }

    pub fn with_connector(mut self, connector: impl Connector + 'static) -> Self {
        self.connector = Box::new(connector);
        self
    }

    pub fn with_demuxer(mut self, demuxer: impl Demuxer + 'static) -> Self {
        self.demuxer = Box::new(demuxer);
        self
    }
}

/// A running live player
///
/// Dropping the handle destroys the player.
pub struct LivePlayer {
    events: EventSender,
    destroyed: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
    log: Logger,
}

impl LivePlayer {
    /// Validate `config` and start playing.
    ///
    /// An invalid endpoint or bound is rejected here, before any connection
    /// is attempted. Outside a Tokio runtime this returns
    /// [`Error::NoRuntime`].
    pub fn start(config: PlayerConfig, backend: PlayerBackend) -> Result<Self> {
        let log = Logger::new("player", config.debug);
        if let Err(e) = config.validate() {
            log_warn!(log, error = %e, url = %config.url, "rejecting player config");
            return Err(e);
        }
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                log_warn!(log, url = %config.url, "no tokio runtime, player not started");
                return Err(Error::NoRuntime);
            }
        };

        let (events, rx) = EventSender::channel();
        let destroyed = Arc::new(AtomicBool::new(false));
        let orchestrator =
            Orchestrator::new(&config, backend, events.clone(), Arc::clone(&destroyed));

        log_debug!(log, url = %config.url, "player start");
        let task = runtime.spawn(run(orchestrator, rx));

        Ok(Self {
            events,
            destroyed,
            task: Some(task),
            log,
        })
    }

    /// Open a fresh connection and re-arm automatic reconnection
    pub fn manual_reconnect(&self) {
        if self.is_destroyed() {
            return;
        }
        self.events.send(PlayerEvent::ManualReconnect);
    }

    /// Stop playback and release everything. Safe to call repeatedly.
    ///
    /// No callback fires for events handled after this returns.
    pub fn destroy(&self) {
        if self.destroyed.swap(true, Ordering::SeqCst) {
            return;
        }
        log_debug!(self.log, "destroy");
        self.events.send(PlayerEvent::Destroy);
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }

    /// Wait for the player task to finish (after [`LivePlayer::destroy`])
    pub async fn join(&mut self) {
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for LivePlayer {
    fn drop(&mut self) {
        self.destroy();
    }
}

async fn run(mut orchestrator: Orchestrator, mut rx: mpsc::UnboundedReceiver<PlayerEvent>) {
    orchestrator.start();
    while let Some(event) = rx.recv().await {
        if !orchestrator.dispatch(event) {
            break;
        }
    }
    orchestrator.shutdown();
}
