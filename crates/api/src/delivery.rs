//! Streaming delivery of document files.

use std::pin::Pin;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    http::{
        StatusCode,
        header::{CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE},
    },
    response::Response,
};
use bytes::Bytes;
use futures::Stream;
use pin_project::{pin_project, pinned_drop};
use tracing::{debug, error, info};

use crate::error::ApiError;
use campus_core::document::{DeliveryMode, Document, DocumentDelivery};
use campus_core::storage::BlobStream;
use campus_shared::AppError;

/// Build the streaming response for an opened document.
///
/// # Errors
///
/// Returns an internal error if the headers cannot be encoded.
pub fn stream_response(delivery: DocumentDelivery) -> Result<Response, ApiError> {
    let disposition = content_disposition(delivery.mode, &delivery.document);

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, delivery.content_type)
        .header(CONTENT_DISPOSITION, disposition);

    if delivery.mode == DeliveryMode::Download {
        if let Some(length) = delivery.content_length {
            builder = builder.header(CONTENT_LENGTH, length);
        }
        builder = builder.header(CACHE_CONTROL, "no-cache");
    }

    let stream = DeliveryStream::new(delivery.stream, delivery.document.id);

    builder.body(Body::from_stream(stream)).map_err(|e| {
        error!(error = %e, document_id = delivery.document.id, "Failed to build file response");
        ApiError(AppError::Internal(e.to_string()))
    })
}

/// `Content-Disposition` value for a delivery.
///
/// Downloads are named after the title plus the stored extension, percent-encoded.
/// Inline views carry the storage key, which is already header-safe.
fn content_disposition(mode: DeliveryMode, document: &Document) -> String {
    match mode {
        DeliveryMode::Download => {
            let title = document.title.as_deref().unwrap_or("document");
            let name = format!("{title}.{}", document.file_type);
            format!("attachment; filename=\"{}\"", urlencoding::encode(&name))
        }
        DeliveryMode::View => format!("inline; filename=\"{}\"", document.file_path),
    }
}

/// Body stream that reports mid-stream failures and early client disconnects.
///
/// An error after headers are sent is passed through, which makes hyper abort
/// the connection. Dropping the stream drops the blob reader.
#[pin_project(PinnedDrop)]
pub struct DeliveryStream {
    #[pin]
    inner: BlobStream,
    document_id: i64,
    bytes_sent: u64,
    finished: bool,
}

impl DeliveryStream {
    /// Wrap a blob stream for the given document.
    #[must_use]
    pub fn new(inner: BlobStream, document_id: i64) -> Self {
        Self {
            inner,
            document_id,
            bytes_sent: 0,
            finished: false,
        }
    }
}

impl Stream for DeliveryStream {
    type Item = Result<Bytes, std::io::Error>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();

        match this.inner.poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                *this.bytes_sent += chunk.len() as u64;
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(Some(Err(e))) => {
                *this.finished = true;
                error!(
                    document_id = *this.document_id,
                    bytes_sent = *this.bytes_sent,
                    error = %e,
                    "Error while streaming file"
                );
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(None) => {
                *this.finished = true;
                debug!(
                    document_id = *this.document_id,
                    bytes_sent = *this.bytes_sent,
                    "File streamed"
                );
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

#[pinned_drop]
impl PinnedDrop for DeliveryStream {
    fn drop(self: Pin<&mut Self>) {
        let this = self.project();
        if !*this.finished {
            info!(
                document_id = *this.document_id,
                bytes_sent = *this.bytes_sent,
                "Client disconnected before file was fully sent"
            );
        }
    }
}
