//! UCI engine session over an external process.

use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use uci::{EngineMessage, GuiCommand};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::reader::{spawn_reader, LINE_BUFFER};

/// How long `close` waits for the engine to exit after `quit`.
const EXIT_GRACE: Duration = Duration::from_secs(5);

type EngineInput = Box<dyn AsyncWrite + Send + Unpin>;

/// A live connection to one UCI engine.
///
/// The session turns the engine's asynchronous output into a request/response
/// primitive: [`send`](Self::send) writes a command, [`await_until`](Self::await_until)
/// drains output up to a terminating line. Every method takes `&mut self`, so
/// at most one request is in flight per engine.
///
/// Call [`close`](Self::close) when done. Dropping a session that was not
/// closed kills the engine process.
pub struct EngineSession {
    /// Engine process, absent for sessions over in-process I/O.
    child: Option<Child>,
    /// Engine standard input, taken on close.
    input: Option<EngineInput>,
    /// Lines forwarded by the reader task.
    lines: mpsc::Receiver<String>,
    reader: JoinHandle<()>,
    /// Name from `id name`, if the engine sent one.
    name: Option<String>,
    ready: bool,
    response_timeout: Duration,
}

impl EngineSession {
    /// Start the engine described by `config` and complete the UCI handshake.
    ///
    /// # Errors
    ///
    /// - `EngineError::Spawn` if the executable cannot be started
    /// - `EngineError::Handshake` if the engine exits before `readyok`
    /// - `EngineError::Timeout` if `readyok` does not arrive in time
    pub async fn open(config: &EngineConfig) -> Result<Self, EngineError> {
        info!(path = %config.path, "starting engine");

        let mut child = Command::new(&config.path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| EngineError::Spawn {
                path: config.path.clone(),
                source,
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| EngineError::Handshake("engine stdin not captured".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| EngineError::Handshake("engine stdout not captured".to_string()))?;

        Self::start(Some(child), stdout, Box::new(stdin), config).await
    }

    /// Run a session over arbitrary I/O instead of a child process.
    ///
    /// `reader` is the engine's output, `writer` its input. The handshake is
    /// the same as for [`open`](Self::open).
    pub async fn with_io<R, W>(reader: R, writer: W, config: &EngineConfig) -> Result<Self, EngineError>
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        Self::start(None, reader, Box::new(writer), config).await
    }

    async fn start<R>(
        child: Option<Child>,
        output: R,
        input: EngineInput,
        config: &EngineConfig,
    ) -> Result<Self, EngineError>
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (lines, reader) = spawn_reader(output, LINE_BUFFER);
        let mut session = Self {
            child,
            input: Some(input),
            lines,
            reader,
            name: None,
            ready: false,
            response_timeout: config.response_timeout(),
        };

        if let Err(e) = session.handshake(config).await {
            warn!(error = %e, "engine handshake failed");
            session.close().await;
            return Err(e);
        }
        Ok(session)
    }

    /// Send `uci`, the configured options and `isready`, then wait for `readyok`.
    async fn handshake(&mut self, config: &EngineConfig) -> Result<(), EngineError> {
        self.write_command(&GuiCommand::Uci).await?;
        for option in config.options() {
            self.write_command(&option).await?;
        }
        self.write_command(&GuiCommand::IsReady).await?;

        let lines = match self
            .collect_until(config.handshake_timeout(), |line| line.contains("readyok"))
            .await
        {
            Ok(lines) => lines,
            Err(EngineError::StreamClosed) => {
                return Err(EngineError::Handshake(
                    "engine exited before readyok".to_string(),
                ))
            }
            Err(e) => return Err(e),
        };

        self.name = lines.iter().find_map(|line| match EngineMessage::parse(line) {
            Some(EngineMessage::Id { name: Some(name), .. }) => Some(name),
            _ => None,
        });
        self.ready = true;
        info!(engine = self.name().unwrap_or("unknown"), "engine ready");
        Ok(())
    }

    /// Engine name reported during the handshake.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Whether the handshake completed and the session is still open.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Write one command line to the engine.
    ///
    /// # Errors
    ///
    /// - `EngineError::NotReady` before the handshake or after `close`
    /// - `EngineError::Io` if the pipe is broken
    pub async fn send(&mut self, command: &GuiCommand) -> Result<(), EngineError> {
        if !self.ready {
            return Err(EngineError::NotReady);
        }
        self.write_command(command).await
    }

    async fn write_command(&mut self, command: &GuiCommand) -> Result<(), EngineError> {
        let input = self.input.as_mut().ok_or(EngineError::NotReady)?;
        let line = command.to_uci();
        debug!(cmd = %line, "engine <");
        input.write_all(line.as_bytes()).await?;
        input.write_all(b"\n").await?;
        input.flush().await?;
        Ok(())
    }

    /// Consume output lines until one satisfies `predicate`.
    ///
    /// Returns every line observed, the terminating one last. The whole call
    /// is bounded by the configured response timeout.
    ///
    /// # Errors
    ///
    /// - `EngineError::StreamClosed` if the engine output ends first
    /// - `EngineError::Timeout` if the deadline passes first
    pub async fn await_until<F>(&mut self, predicate: F) -> Result<Vec<String>, EngineError>
    where
        F: FnMut(&str) -> bool,
    {
        if !self.ready {
            return Err(EngineError::NotReady);
        }
        self.collect_until(self.response_timeout, predicate).await
    }

    async fn collect_until<F>(&mut self, limit: Duration, mut predicate: F) -> Result<Vec<String>, EngineError>
    where
        F: FnMut(&str) -> bool,
    {
        let lines = &mut self.lines;
        let collect = async move {
            let mut seen = Vec::new();
            while let Some(line) = lines.recv().await {
                let done = predicate(&line);
                seen.push(line);
                if done {
                    return Ok(seen);
                }
            }
            Err(EngineError::StreamClosed)
        };

        match timeout(limit, collect).await {
            Ok(result) => result,
            Err(_) => Err(EngineError::Timeout(limit)),
        }
    }

    /// Send `quit` and wait for the engine to exit, killing it after a grace
    /// period. Safe to call more than once.
    pub async fn close(&mut self) {
        self.ready = false;

        if let Some(mut input) = self.input.take() {
            debug!(cmd = "quit", "engine <");
            if let Err(e) = input.write_all(b"quit\n").await {
                debug!(error = %e, "engine already gone before quit");
            }
            let _ = input.shutdown().await;
        }

        if let Some(mut child) = self.child.take() {
            match timeout(EXIT_GRACE, child.wait()).await {
                Ok(Ok(status)) => info!(%status, "engine exited"),
                Ok(Err(e)) => warn!(error = %e, "failed to wait for engine"),
                Err(_) => {
                    warn!("engine ignored quit, killing it");
                    if let Err(e) = child.kill().await {
                        warn!(error = %e, "failed to kill engine");
                    }
                }
            }
        }

        self.reader.abort();
    }
}

impl Drop for EngineSession {
    fn drop(&mut self) {
        if let Some(child) = self.child.as_mut() {
            let _ = child.start_kill();
        }
        self.reader.abort();
    }
}
