//! Background task forwarding engine output lines.

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Buffered lines between the reader task and the session.
pub const LINE_BUFFER: usize = 100;

/// Spawn a task that reads `reader` line by line and forwards every line, in
/// order, to the returned channel.
///
/// The channel closes when the output reaches end-of-stream or a read fails,
/// which is how a waiting session learns the engine has gone away. When the
/// buffer is full the task waits for the consumer.
pub fn spawn_reader<R>(reader: R, capacity: usize) -> (mpsc::Receiver<String>, JoinHandle<()>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(capacity);

    let handle = tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    debug!(line = %line, "engine >");
                    if tx.send(line).await.is_err() {
                        // Session dropped its receiver
                        break;
                    }
                }
                Ok(None) => {
                    debug!("engine output closed");
                    break;
                }
                Err(e) => {
                    warn!(error = %e, "failed to read engine output");
                    break;
                }
            }
        }
    });

    (rx, handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn test_lines_arrive_in_order_then_close() {
        let (mut engine_side, our_side) = tokio::io::duplex(1024);
        let (mut rx, handle) = spawn_reader(our_side, 4);

        engine_side
            .write_all(b"info depth 1 score cp 10\r\ninfo depth 2 score cp 20\nbestmove e2e4\n")
            .await
            .unwrap();
        drop(engine_side);

        assert_eq!(rx.recv().await.as_deref(), Some("info depth 1 score cp 10"));
        assert_eq!(rx.recv().await.as_deref(), Some("info depth 2 score cp 20"));
        assert_eq!(rx.recv().await.as_deref(), Some("bestmove e2e4"));
        assert_eq!(rx.recv().await, None);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_reader_blocks_on_full_buffer_without_losing_lines() {
        let (mut engine_side, our_side) = tokio::io::duplex(4096);
        let (mut rx, _handle) = spawn_reader(our_side, 1);

        for i in 0..20 {
            engine_side
                .write_all(format!("info depth {}\n", i).as_bytes())
                .await
                .unwrap();
        }
        drop(engine_side);

        let mut received = Vec::new();
        while let Some(line) = rx.recv().await {
            received.push(line);
        }
        assert_eq!(received.len(), 20);
        assert_eq!(received[19], "info depth 19");
    }
}
