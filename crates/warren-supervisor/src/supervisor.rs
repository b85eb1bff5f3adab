use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use sha1::{Digest, Sha1};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command};
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use warren_dispatch::dispatch;
use warren_proto::{decode_blob, encode_blob, Blob, Construct, Destruct, Request, Response};

use crate::error::SupervisorError;
use crate::launch::LaunchSpec;
use crate::resource_finder::ResourceFinder;

pub const DEFAULT_RESTART_COOLDOWN: Duration = Duration::from_secs(5);

type RequestWaiter = oneshot::Sender<Result<Response, SupervisorError>>;
type ConstructWaiter = oneshot::Sender<Construct>;
type DestructWaiter = oneshot::Sender<Destruct>;

#[derive(Default)]
struct Tables {
    requests: HashMap<String, RequestWaiter>,
    constructs: HashMap<String, ConstructWaiter>,
    destructs: HashMap<String, DestructWaiter>,
}

impl Tables {
    /// Drains every in-flight correlation, resolving request waiters with
    /// a transport error (spec §4.4: "child death aborts all in-flight
    /// correlations... callers observe a transport error"). Construct and
    /// destruct waiters are simply dropped; their callers observe a
    /// cancelled oneshot, mapped the same way at the call site.
    fn drain(&mut self) {
        for (_, tx) in self.requests.drain() {
            let _ = tx.send(Err(SupervisorError::ChildDied));
        }
        self.constructs.clear();
        self.destructs.clear();
    }
}

struct RunningChild {
    child: Child,
    outbound: mpsc::UnboundedSender<Blob>,
    tasks: Vec<JoinHandle<()>>,
}

/// One supervisor owns one guest child process (spec §4.4). Shared
/// between the router (which issues `call`/`construct`/`destruct`) and
/// its own background tasks (reader/writer/stderr/watchdog), so it is
/// always handled behind an `Arc`.
pub struct Supervisor {
    source: String,
    launch: LaunchSpec,
    resource_finder: Arc<dyn ResourceFinder>,
    cooldown: Duration,
    path: PathBuf,
    running: Mutex<Option<RunningChild>>,
    tables: Mutex<Tables>,
    next_id: AtomicU64,
    refcount: AtomicI64,
    stopped: AtomicBool,
}

impl Supervisor {
    pub fn new(
        source: impl Into<String>,
        launch: LaunchSpec,
        resource_finder: Arc<dyn ResourceFinder>,
        cooldown: Duration,
    ) -> Arc<Self> {
        let source = source.into();
        let mut hasher = Sha1::new();
        hasher.update(source.as_bytes());
        let digest = hasher.finalize();
        let path = std::env::temp_dir().join(format!("warren-{}.guest", hex_encode(&digest)));

        Arc::new(Self {
            source,
            launch,
            resource_finder,
            cooldown,
            path,
            running: Mutex::new(None),
            tables: Mutex::new(Tables::default()),
            next_id: AtomicU64::new(1),
            refcount: AtomicI64::new(0),
            stopped: AtomicBool::new(false),
        })
    }

    pub fn refcount(&self) -> i64 {
        self.refcount.load(Ordering::SeqCst)
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    pub async fn start(self: &Arc<Self>) -> Result<(), SupervisorError> {
        if self.stopped.load(Ordering::SeqCst) {
            return Err(SupervisorError::Stopped);
        }
        self.launch_child().await
    }

    async fn write_source_once(&self) -> Result<(), SupervisorError> {
        if tokio::fs::metadata(&self.path).await.is_ok() {
            return Ok(());
        }
        tokio::fs::write(&self.path, self.source.as_bytes())
            .await
            .map_err(SupervisorError::WriteSource)
    }

    async fn launch_child(self: &Arc<Self>) -> Result<(), SupervisorError> {
        self.write_source_once().await?;
        let mut command = Command::new(&self.launch.command);
        command
            .args(&self.launch.args)
            .arg(&self.path)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .kill_on_drop(true);

        let mut child = command.spawn().map_err(SupervisorError::Spawn)?;
        debug!(pid = child.id(), path = %self.path.display(), "supervisor launched guest");

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| SupervisorError::Spawn(std::io::Error::other("child stdin unavailable")))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SupervisorError::Spawn(std::io::Error::other("child stdout unavailable")))?;
        let stderr = child.stderr.take();

        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();

        let writer_handle = tokio::spawn(writer_task(stdin, outbound_rx));
        let reader_handle = tokio::spawn(reader_task(self.clone(), stdout));
        let mut tasks = vec![writer_handle, reader_handle];
        if let Some(stderr) = stderr {
            tasks.push(tokio::spawn(stderr_task(stderr)));
        }

        let pid_for_watchdog = child.id();
        *self.running.lock().await = Some(RunningChild {
            child,
            outbound: outbound_tx,
            tasks,
        });

        tokio::spawn(watchdog(self.clone(), pid_for_watchdog));

        Ok(())
    }

    /// Kills the running child, if any, without touching `stopped` —
    /// used both by `stop()` and by the reader loop on a decode error
    /// (spec §4.4: "Unknown types stop the supervisor").
    async fn kill_child(&self) {
        if let Some(running) = self.running.lock().await.as_mut() {
            let _ = running.child.start_kill();
        }
    }

    async fn cleanup(&self) {
        if let Some(mut running) = self.running.lock().await.take() {
            for task in running.tasks.drain(..) {
                task.abort();
            }
            let _ = running.child.start_kill();
        }
        self.tables.lock().await.drain();
        // Every resource the dead child held is gone with it.
        self.refcount.store(0, Ordering::SeqCst);
    }

    pub async fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        self.kill_child().await;
        self.cleanup().await;
    }

    fn fresh_id(&self) -> String {
        format!("{:x}", self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    pub async fn call(&self, request: Request) -> Result<Response, SupervisorError> {
        if self.stopped.load(Ordering::SeqCst) {
            return Err(SupervisorError::Stopped);
        }
        let id = request.header.id.clone();
        let (tx, rx) = oneshot::channel();
        {
            let mut tables = self.tables.lock().await;
            tables.requests.insert(id.clone(), tx);
        }
        self.emit(Blob::Request(request)).await?;
        rx.await.map_err(|_| SupervisorError::ChildDied)?
    }

    pub async fn construct(&self, resource_id: &str) -> Result<bool, SupervisorError> {
        if self.stopped.load(Ordering::SeqCst) {
            return Err(SupervisorError::Stopped);
        }
        let id = self.fresh_id();
        let (tx, rx) = oneshot::channel();
        {
            let mut tables = self.tables.lock().await;
            tables.constructs.insert(id.clone(), tx);
        }
        self.emit(Blob::Construct(Construct::new(id, resource_id)))
            .await?;
        let construct = rx.await.map_err(|_| SupervisorError::ChildDied)?;
        if construct.deconstructed {
            self.refcount.fetch_add(1, Ordering::SeqCst);
        }
        Ok(construct.deconstructed)
    }

    pub async fn destruct(&self, resource_id: &str) -> Result<bool, SupervisorError> {
        if self.stopped.load(Ordering::SeqCst) {
            return Err(SupervisorError::Stopped);
        }
        let id = self.fresh_id();
        let (tx, rx) = oneshot::channel();
        {
            let mut tables = self.tables.lock().await;
            tables.destructs.insert(id.clone(), tx);
        }
        self.emit(Blob::Destruct(Destruct::new(id, resource_id)))
            .await?;
        let destruct = rx.await.map_err(|_| SupervisorError::ChildDied)?;
        if destruct.deconstructed {
            self.refcount.fetch_sub(1, Ordering::SeqCst);
        }
        Ok(destruct.deconstructed)
    }

    async fn emit(&self, blob: Blob) -> Result<(), SupervisorError> {
        let running = self.running.lock().await;
        match running.as_ref() {
            Some(running) => running
                .outbound
                .send(blob)
                .map_err(|_| SupervisorError::ChannelClosed),
            None => Err(SupervisorError::ChildDied),
        }
    }
}

async fn writer_task(stdin: ChildStdin, mut rx: mpsc::UnboundedReceiver<Blob>) {
    let mut stdin = stdin;
    while let Some(blob) = rx.recv().await {
        if encode_blob(&mut stdin, &blob).await.is_err() {
            break;
        }
    }
    let _ = stdin.shutdown().await;
}

async fn reader_task(supervisor: Arc<Supervisor>, stdout: ChildStdout) {
    let mut reader = BufReader::new(stdout);
    loop {
        match decode_blob(&mut reader).await {
            Ok(blob) => handle_inbound(&supervisor, blob).await,
            Err(warren_proto::FramingError::Eof) => break,
            Err(err) => {
                warn!("supervisor decode error, stopping for restart: {err}");
                supervisor.kill_child().await;
                break;
            }
        }
    }
}

async fn handle_inbound(supervisor: &Arc<Supervisor>, blob: Blob) {
    match blob {
        Blob::Request(request) => {
            let supervisor = supervisor.clone();
            tokio::spawn(async move {
                let response = match supervisor
                    .resource_finder
                    .handlers(&request.header.source, &request.resource)
                    .await
                {
                    Ok(handlers) => dispatch(&handlers, request).await,
                    Err(err) => Response::err(
                        request.header.id.clone(),
                        warren_proto::Error::new(err.code(), err.to_string()),
                    ),
                };
                let _ = supervisor.emit(Blob::Response(response)).await;
            });
        }
        Blob::Response(response) => {
            let waiter = supervisor.tables.lock().await.requests.remove(&response.header.id);
            if let Some(tx) = waiter {
                let _ = tx.send(Ok(response));
            }
        }
        Blob::Construct(construct) => {
            let waiter = supervisor.tables.lock().await.constructs.remove(&construct.id);
            if let Some(tx) = waiter {
                let _ = tx.send(construct);
            }
        }
        Blob::Destruct(destruct) => {
            let waiter = supervisor.tables.lock().await.destructs.remove(&destruct.id);
            if let Some(tx) = waiter {
                let _ = tx.send(destruct);
            }
        }
    }
}

async fn stderr_task(stderr: ChildStderr) {
    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        debug!("guest stderr: {line}");
    }
}

/// Polls the child's exit status rather than awaiting it while holding
/// `running`'s lock, so the lock is never held across a child-process I/O
/// wait (spec §5's leaf-lock rule).
async fn watchdog(supervisor: Arc<Supervisor>, pid: Option<u32>) {
    loop {
        tokio::time::sleep(Duration::from_millis(50)).await;
        let mut running = supervisor.running.lock().await;
        let Some(running_child) = running.as_mut() else {
            return; // superseded: stopped or cleaned up already
        };
        if running_child.child.id() != pid {
            return; // superseded by a newer generation
        }
        match running_child.child.try_wait() {
            Ok(Some(_status)) => break,
            Ok(None) => continue,
            Err(_) => break,
        }
    }
    debug!(?pid, "guest child exited");

    if supervisor.stopped.load(Ordering::SeqCst) {
        return;
    }

    tokio::time::sleep(supervisor.cooldown).await;
    supervisor.cleanup().await;

    if supervisor.stopped.load(Ordering::SeqCst) {
        return;
    }

    if let Err(err) = supervisor.launch_child().await {
        warn!("failed to relaunch guest after restart cooldown: {err}");
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
