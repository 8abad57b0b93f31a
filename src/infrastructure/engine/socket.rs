//! Engine client over a Unix domain socket
//!
//! One connection per request, plus one long-lived connection that streams
//! engine events into the [`EventBridge`].

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::protocol::{Reply, Request};
use crate::application::events::{EngineEvent, EventBridge};
use crate::application::ports::{CaptureEngine, EngineError, PipelineEngine, ShortcutEngine};
use crate::domain::capture::{CaptureTransport, KeyEvent};
use crate::domain::pipeline::{PipelineConfig, PipelineResult, PipelineState};
use crate::domain::shortcut::ShortcutBinding;

const SOCKET_NAME: &str = "hotscribe-engine.sock";

/// Engine socket path resolver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketPath {
    path: PathBuf,
}

impl SocketPath {
    /// Create socket path, preferring XDG_RUNTIME_DIR
    pub fn new() -> Self {
        let path = std::env::var("XDG_RUNTIME_DIR")
            .map(|dir| PathBuf::from(dir).join(SOCKET_NAME))
            .unwrap_or_else(|_| std::env::temp_dir().join(SOCKET_NAME));
        Self { path }
    }

    /// Use an explicit socket path
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Explicit path if given, else the default location
    pub fn resolve(explicit: Option<&str>) -> Self {
        match explicit.map(str::trim).filter(|p| !p.is_empty()) {
            Some(path) => Self::with_path(path),
            None => Self::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if socket file exists
    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

impl Default for SocketPath {
    fn default() -> Self {
        Self::new()
    }
}

/// Engine adapter speaking newline-delimited JSON
#[derive(Debug, Clone)]
pub struct SocketEngine {
    socket_path: SocketPath,
}

impl SocketEngine {
    pub fn new(socket_path: SocketPath) -> Self {
        Self { socket_path }
    }

    pub fn socket_path(&self) -> &SocketPath {
        &self.socket_path
    }

    async fn connect(&self) -> Result<UnixStream, EngineError> {
        UnixStream::connect(self.socket_path.path())
            .await
            .map_err(|e| transport(self.socket_path.path(), e))
    }

    /// Send one request and wait for its reply
    async fn call(&self, request: &Request) -> Result<Reply, EngineError> {
        let stream = self.connect().await?;
        let (reader, mut writer) = stream.into_split();

        write_line(&mut writer, request)
            .await
            .map_err(|e| transport(self.socket_path.path(), e))?;

        let mut reader = BufReader::new(reader);
        let mut response = String::new();
        let read = reader
            .read_line(&mut response)
            .await
            .map_err(|e| transport(self.socket_path.path(), e))?;
        if read == 0 {
            return Err(EngineError::Transport(
                "connection closed before reply".to_string(),
            ));
        }

        serde_json::from_str(response.trim()).map_err(|e| EngineError::Protocol(e.to_string()))
    }

    async fn request<T: DeserializeOwned>(&self, request: Request) -> Result<T, EngineError> {
        self.call(&request).await?.decode()
    }

    async fn command(&self, request: Request) -> Result<(), EngineError> {
        self.call(&request).await?.into_data().map(|_| ())
    }

    /// Open the event stream and publish every event on `bridge`.
    ///
    /// The returned task ends when the engine closes the stream.
    pub async fn subscribe(&self, bridge: EventBridge) -> Result<JoinHandle<()>, EngineError> {
        let stream = self.connect().await?;
        let (reader, mut writer) = stream.into_split();
        write_line(&mut writer, &Request::Subscribe)
            .await
            .map_err(|e| transport(self.socket_path.path(), e))?;

        info!(path = %self.socket_path.path().display(), "Subscribed to engine events");
        Ok(tokio::spawn(async move {
            // Dropping the write half would close the subscription
            let _writer = writer;
            pump_events(BufReader::new(reader), &bridge).await;
        }))
    }
}

/// Forward engine event lines to the bridge until end of stream
pub async fn pump_events<R>(reader: R, bridge: &EventBridge)
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) if line.trim().is_empty() => continue,
            Ok(Some(line)) => match serde_json::from_str::<EngineEvent>(&line) {
                Ok(event) => {
                    debug!(topic = ?event.topic(), "Engine event received");
                    bridge.publish(event);
                }
                Err(e) => warn!("Skipping unrecognised engine event: {e}"),
            },
            Ok(None) => {
                info!("Engine closed the event stream");
                break;
            }
            Err(e) => {
                warn!("Engine event stream failed: {e}");
                break;
            }
        }
    }
}

async fn write_line<W>(writer: &mut W, request: &Request) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut line = serde_json::to_string(request)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    line.push('\n');
    writer.write_all(line.as_bytes()).await?;
    writer.flush().await
}

fn transport(path: &Path, error: io::Error) -> EngineError {
    EngineError::Transport(format!("{}: {error}", path.display()))
}

#[async_trait]
impl PipelineEngine for SocketEngine {
    async fn start_recording(&self) -> Result<String, EngineError> {
        self.request(Request::PipelineStartRecording).await
    }

    async fn stop_and_process(
        &self,
        config: &PipelineConfig,
    ) -> Result<PipelineResult, EngineError> {
        self.request(Request::PipelineStopAndProcess {
            config: config.clone(),
        })
        .await
    }

    async fn cancel(&self) -> Result<(), EngineError> {
        self.command(Request::PipelineCancel).await
    }

    async fn is_running(&self) -> Result<bool, EngineError> {
        self.request(Request::IsPipelineRunning).await
    }

    async fn current_state(&self) -> Result<PipelineState, EngineError> {
        self.request(Request::GetPipelineState).await
    }

    async fn transcribe_file(
        &self,
        path: &Path,
        config: &PipelineConfig,
    ) -> Result<PipelineResult, EngineError> {
        self.request(Request::PipelineTranscribeFile {
            path: path.to_string_lossy().into_owned(),
            config: config.clone(),
        })
        .await
    }
}

#[async_trait]
impl CaptureEngine for SocketEngine {
    async fn enter_capture_mode(&self) -> Result<CaptureTransport, EngineError> {
        self.request(Request::EnterCaptureMode).await
    }

    async fn exit_capture_mode(&self) -> Result<(), EngineError> {
        self.command(Request::ExitCaptureMode).await
    }

    async fn report_key_event(&self, event: &KeyEvent) -> Result<(), EngineError> {
        self.command(Request::ReportKeyEvent(event.clone())).await
    }

    async fn check_input_monitoring(&self) -> Result<bool, EngineError> {
        self.request(Request::CheckInputMonitoring).await
    }

    async fn request_input_monitoring(&self) -> Result<(), EngineError> {
        self.command(Request::RequestInputMonitoring).await
    }
}

#[async_trait]
impl ShortcutEngine for SocketEngine {
    async fn register_shortcut(&self, binding: &ShortcutBinding) -> Result<(), EngineError> {
        self.command(Request::RegisterShortcut {
            id: binding.id.clone(),
            accelerator: binding.accelerator.clone(),
            description: binding.description.clone(),
        })
        .await
    }

    async fn unregister_shortcut(&self, id: &str) -> Result<(), EngineError> {
        self.command(Request::UnregisterShortcut { id: id.to_string() })
            .await
    }

    async fn unregister_all_shortcuts(&self) -> Result<(), EngineError> {
        self.command(Request::UnregisterAllShortcuts).await
    }

    async fn list_registered_shortcuts(&self) -> Result<Vec<ShortcutBinding>, EngineError> {
        self.request(Request::ListRegisteredShortcuts).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::events::Topic;
    use crate::infrastructure::engine::protocol::ErrorKind;
    use tokio::net::UnixListener;

    /// Answer one connection with `reply`, returning the request received
    fn serve_once(listener: UnixListener, reply: Reply) -> JoinHandle<Request> {
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let (reader, mut writer) = stream.into_split();
            let mut line = String::new();
            BufReader::new(reader).read_line(&mut line).await.unwrap();
            let request: Request = serde_json::from_str(line.trim()).unwrap();

            let mut out = serde_json::to_string(&reply).unwrap();
            out.push('\n');
            writer.write_all(out.as_bytes()).await.unwrap();
            request
        })
    }

    fn bind() -> (tempfile::TempDir, SocketPath, UnixListener) {
        let dir = tempfile::tempdir().unwrap();
        let path = SocketPath::with_path(dir.path().join("engine.sock"));
        let listener = UnixListener::bind(path.path()).unwrap();
        (dir, path, listener)
    }

    #[test]
    fn socket_path_prefers_explicit() {
        let path = SocketPath::resolve(Some("/run/user/1000/custom.sock"));
        assert_eq!(path.path(), Path::new("/run/user/1000/custom.sock"));
        let fallback = SocketPath::resolve(Some("  "));
        assert!(fallback.path().ends_with(SOCKET_NAME));
    }

    #[tokio::test]
    async fn start_recording_round_trip() {
        let (_dir, path, listener) = bind();
        let server = serve_once(listener, Reply::success("/tmp/rec.wav"));

        let engine = SocketEngine::new(path);
        assert_eq!(engine.start_recording().await.unwrap(), "/tmp/rec.wav");
        assert_eq!(server.await.unwrap(), Request::PipelineStartRecording);
    }

    #[tokio::test]
    async fn rejection_is_surfaced() {
        let (_dir, path, listener) = bind();
        serve_once(
            listener,
            Reply::failure(ErrorKind::Rejected, "Pipeline is already running"),
        );

        let engine = SocketEngine::new(path);
        assert_eq!(
            engine.start_recording().await,
            Err(EngineError::Rejected("Pipeline is already running".into()))
        );
    }

    #[tokio::test]
    async fn capture_transport_is_decoded() {
        let (_dir, path, listener) = bind();
        serve_once(listener, Reply::success("webview"));

        let engine = SocketEngine::new(path);
        assert_eq!(
            engine.enter_capture_mode().await.unwrap(),
            CaptureTransport::Fallback
        );
    }

    #[tokio::test]
    async fn missing_engine_is_a_transport_error() {
        let dir = tempfile::tempdir().unwrap();
        let engine = SocketEngine::new(SocketPath::with_path(dir.path().join("absent.sock")));
        assert!(matches!(
            engine.is_running().await,
            Err(EngineError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn garbage_reply_is_a_protocol_error() {
        let (_dir, path, listener) = bind();
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let (reader, mut writer) = stream.into_split();
            let mut line = String::new();
            BufReader::new(reader).read_line(&mut line).await.unwrap();
            writer.write_all(b"hello\n").await.unwrap();
        });

        let engine = SocketEngine::new(path);
        assert!(matches!(
            engine.cancel().await,
            Err(EngineError::Protocol(_))
        ));
    }

    #[tokio::test]
    async fn pump_publishes_known_events_and_skips_unknown() {
        let bridge = EventBridge::default();
        let mut events = bridge.subscribe(Topic::ALL);
        let stream: &[u8] = b"{\"event\":\"pipeline-progress\",\"payload\":{\"state\":\"transcribing\",\"message\":\"Transcribing...\"}}\n\
{\"event\":\"tray-clicked\",\"payload\":{}}\n\
\n\
{\"event\":\"shortcut-triggered\",\"payload\":{\"id\":\"toggle_recording\"}}\n";

        pump_events(BufReader::new(stream), &bridge).await;

        assert!(matches!(
            events.try_recv(),
            Some(EngineEvent::PipelineProgress(p)) if p.state == PipelineState::Transcribing
        ));
        assert_eq!(
            events.try_recv(),
            Some(EngineEvent::ShortcutTriggered {
                id: "toggle_recording".into()
            })
        );
        assert!(events.try_recv().is_none());
    }
}
