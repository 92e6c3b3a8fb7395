//! Bridges a multipart upload into the blocking [`UploadWriter`].
//!
//! The file field is pumped chunk by chunk through a bounded channel into a
//! `std::io::Read` that the writer consumes on the blocking pool, so an upload
//! is never held in memory as a whole.

use std::io;
use std::sync::Arc;

use axum::extract::Multipart;
use axum::extract::multipart::{Field, MultipartError};
use axum::http::StatusCode;
use bytes::Bytes;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::io::{StreamReader, SyncIoBridge};
use tracing::{error, info};

use intake_core::storage::{
    UnexpectedCause, UploadError, UploadRequest, UploadResult, UploadWriter,
};

/// Name of the form field carrying the file.
pub const FILE_FIELD: &str = "peFile";

/// Chunks buffered between the request body and the writer.
const CHANNEL_DEPTH: usize = 8;

/// Find the file field in the form and store it.
///
/// Fields other than [`FILE_FIELD`] are skipped. A form without the field
/// is an unexpected failure with an empty declared name.
pub async fn receive_upload(writer: Arc<UploadWriter>, mut multipart: Multipart) -> UploadResult {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => {
                return Err(UploadError::aborted("", "form has no file field"));
            }
            Err(e) => return Err(body_failure(&e)),
        };

        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let declared_name = field.file_name().unwrap_or_default().to_string();
        info!(declared_name = %declared_name, "Upload received");
        return store_field(writer, field, declared_name).await;
    }
}

async fn store_field(
    writer: Arc<UploadWriter>,
    mut field: Field<'_>,
    declared_name: String,
) -> UploadResult {
    let (tx, rx) = mpsc::channel::<io::Result<Bytes>>(CHANNEL_DEPTH);
    let reader = SyncIoBridge::new(StreamReader::new(ReceiverStream::new(rx)));

    let name = declared_name.clone();
    let task =
        tokio::task::spawn_blocking(move || writer.write(UploadRequest::new(reader, name)));

    loop {
        let item = match field.chunk().await {
            Ok(Some(chunk)) => Ok(chunk),
            Ok(None) => break,
            Err(e) => Err(to_io_error(&e)),
        };
        let body_failed = item.is_err();
        // A closed channel means the writer already gave up.
        if tx.send(item).await.is_err() || body_failed {
            break;
        }
    }
    drop(tx);

    match task.await {
        Ok(result) => result,
        Err(e) => Err(UploadError::aborted(
            declared_name,
            format!("upload task failed: {e}"),
        )),
    }
}

/// Undecodable bodies are malformed streams, bodies over the limit are too
/// large, anything else is a broken transfer.
fn to_io_error(err: &MultipartError) -> io::Error {
    let text = err.body_text();
    match err.status() {
        StatusCode::BAD_REQUEST => io::Error::new(io::ErrorKind::InvalidData, text),
        StatusCode::PAYLOAD_TOO_LARGE => io::Error::new(io::ErrorKind::FileTooLarge, text),
        _ => io::Error::other(text),
    }
}

/// Classify a body failure hit before the file field was reached, the same
/// way the writer classifies a failing source.
fn body_failure(err: &MultipartError) -> UploadError {
    let source = to_io_error(err);
    if source.kind() == io::ErrorKind::InvalidData {
        UploadError::Unexpected {
            declared_name: String::new(),
            cause: UnexpectedCause::MalformedStream(source),
        }
    } else {
        UploadError::Write {
            declared_name: String::new(),
            source,
        }
    }
}

/// Operator-facing record of an upload outcome.
pub fn log_outcome(result: &UploadResult) {
    match result {
        Ok(stored) => info!(
            declared_name = %stored.declared_name,
            path = %stored.stored_path.display(),
            size = stored.size,
            "Upload stored"
        ),
        Err(e) => error!(
            kind = %e.kind(),
            declared_name = %e.declared_name(),
            error = %e,
            "Upload failed"
        ),
    }
}
