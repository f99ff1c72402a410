//! Run-log streaming.
//!
//! The host serves a run's logs as one opaque archive. [`LogStream`] exposes
//! it as a lazy, finite, non-restartable sequence of byte chunks consumed by
//! a single downstream writer: a background task downloads and forwards
//! chunks over an mpsc channel, and dropping the stream closes the receiver,
//! which stops the producer on its next send — cancellation propagates
//! upstream to stop producing.
//!
//! The archive is forwarded verbatim and never extracted here; callers that
//! need individual log files must unpack it themselves.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio::sync::mpsc;

use overture_client::{ApiError, RepoHost};
use overture_core::{RepoSlug, RunId};

/// An async stream of raw log-archive chunks for one run.
///
/// ```rust,ignore
/// use futures::StreamExt;
///
/// let mut stream = LogStream::fetch(host, repo, run);
/// while let Some(chunk) = stream.next().await {
///     out.write_all(&chunk?)?;
/// }
/// ```
pub struct LogStream {
    rx: mpsc::Receiver<Result<Bytes, ApiError>>,
}

impl LogStream {
    /// Start downloading the log archive for `run`.
    ///
    /// The download begins lazily on the producer task; nothing is buffered
    /// beyond the channel's small backlog until the consumer pulls.
    pub fn fetch(host: RepoHost, repo: RepoSlug, run: RunId) -> Self {
        let (tx, rx) = mpsc::channel(16);

        tokio::spawn(async move {
            let response = match host.runs().logs(&repo, run).await {
                Ok(response) => response,
                Err(err) => {
                    let _ = tx.send(Err(err)).await;
                    return;
                }
            };

            let mut chunks = response.bytes_stream();
            while let Some(chunk) = chunks.next().await {
                let item = chunk.map_err(ApiError::from);
                let is_err = item.is_err();
                if tx.send(item).await.is_err() {
                    // Consumer dropped the stream: stop pulling from the host.
                    tracing::debug!(run_id = %run, "log consumer gone, aborting download");
                    break;
                }
                if is_err {
                    break;
                }
            }
        });

        LogStream { rx }
    }

    /// Test-only constructor: wrap a raw mpsc receiver as a `LogStream`.
    #[cfg(test)]
    pub(crate) fn from_channel(rx: mpsc::Receiver<Result<Bytes, ApiError>>) -> Self {
        Self { rx }
    }
}

impl Stream for LogStream {
    type Item = Result<Bytes, ApiError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn downloads_the_archive_as_chunks() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/repos/acme/api/actions/runs/42/logs")
            .with_status(200)
            .with_body(b"PK\x03\x04fake-archive-bytes".as_slice())
            .create_async()
            .await;

        let host = RepoHost::builder()
            .base_url(server.url())
            .build()
            .expect("build client");
        let mut stream = LogStream::fetch(host, RepoSlug::from("acme/api"), RunId(42));

        let mut collected = Vec::new();
        while let Some(chunk) = stream.next().await {
            collected.extend_from_slice(&chunk.expect("chunk"));
        }
        assert_eq!(collected, b"PK\x03\x04fake-archive-bytes");
    }

    #[tokio::test]
    async fn download_errors_surface_as_the_first_item() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/repos/acme/api/actions/runs/42/logs")
            .with_status(404)
            .with_body(r#"{"message":"Not Found"}"#)
            .create_async()
            .await;

        let host = RepoHost::builder()
            .base_url(server.url())
            .build()
            .expect("build client");
        let mut stream = LogStream::fetch(host, RepoSlug::from("acme/api"), RunId(42));

        let first = stream.next().await.expect("one item");
        assert!(matches!(first, Err(ApiError::NotFound(_))));
        assert!(stream.next().await.is_none(), "the sequence is finite");
    }

    #[tokio::test]
    async fn dropping_the_stream_stops_the_producer() {
        let (tx, rx) = mpsc::channel(1);
        let stream = LogStream::from_channel(rx);

        tx.send(Ok(Bytes::from_static(b"first")))
            .await
            .expect("receiver alive");
        drop(stream);

        let refused = tx.send(Ok(Bytes::from_static(b"second"))).await;
        assert!(refused.is_err(), "send after drop must fail, stopping the producer");
    }

    #[tokio::test]
    async fn stream_is_not_restartable() {
        let (tx, rx) = mpsc::channel(4);
        tx.send(Ok(Bytes::from_static(b"only"))).await.expect("send");
        drop(tx);

        let mut stream = LogStream::from_channel(rx);
        assert_eq!(
            stream.next().await.expect("item").expect("bytes"),
            Bytes::from_static(b"only")
        );
        assert!(stream.next().await.is_none());
        assert!(stream.next().await.is_none(), "exhausted for good");
    }
}
