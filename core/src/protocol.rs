//! Binary wire protocol for operations.
//!
//! Every message is self-contained, big-endian:
//!
//! ```text
//! ┌────────┬──────┬─────────┬───────────┬─────────┬───────────┐
//! │ opcode │ kind │ len u16 │ path      │ len u16 │ path      │
//! │ 1 byte │ 1 b  │         │ len bytes │ (Renamed only)        │
//! └────────┴──────┴─────────┴───────────┴─────────┴───────────┘
//! ```
//!
//! Opcodes: Added=3, Modified=4, Created=5, Renamed=6, Removed=7.
//! Kinds: File=1, Directory=2. Paths are raw OS bytes. There is no framing
//! beyond the length prefixes, so a message cut short by a sink failure
//! leaves the stream unparseable from that point on.

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use bytes::{BufMut, Bytes, BytesMut};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::{Mutex, MutexGuard};

use crate::error::EncodeError;
use crate::operation::Operation;

/// Longest path that fits the 16-bit length prefix.
pub const MAX_PATH_LEN: usize = u16::MAX as usize;

/// Encode an operation into one complete message.
///
/// Fails with [`EncodeError::PathTooLong`] before producing any bytes if a
/// path does not fit the length prefix.
pub fn encode(operation: &Operation) -> Result<Bytes, EncodeError> {
    let paths = operation.paths();
    let capacity = 2 + paths.iter().map(|p| 2 + raw_bytes(p).len()).sum::<usize>();
    let mut buf = BytesMut::with_capacity(capacity);
    encode_into(operation, &mut buf)?;
    Ok(buf.freeze())
}

/// Append one message to `buf`. On error `buf` is left untouched.
pub fn encode_into(operation: &Operation, buf: &mut BytesMut) -> Result<(), EncodeError> {
    let paths = operation.paths();
    for path in &paths {
        check_len(path)?;
    }

    buf.put_u8(operation.opcode().wire_code());
    buf.put_u8(operation.kind().wire_code());
    for path in paths {
        let bytes = raw_bytes(path);
        // length checked above
        buf.put_u16(bytes.len() as u16);
        buf.put_slice(bytes);
    }

    Ok(())
}

/// Encode and write one message to a blocking sink.
///
/// `write_all` retries on [`io::ErrorKind::Interrupted`]. Returns the number
/// of bytes written.
pub fn write_operation<W: Write + ?Sized>(
    sink: &mut W,
    operation: &Operation,
) -> Result<usize, EncodeError> {
    let message = encode(operation)?;
    sink.write_all(&message)?;
    sink.flush()?;
    Ok(message.len())
}

/// Encode and write one message to an async sink.
pub async fn write_operation_async<W: AsyncWrite + Unpin + ?Sized>(
    sink: &mut W,
    operation: &Operation,
) -> Result<usize, EncodeError> {
    let message = encode(operation)?;
    write_message(sink, &message).await?;
    Ok(message.len())
}

async fn write_message<W: AsyncWrite + Unpin + ?Sized>(
    sink: &mut W,
    mut remaining: &[u8],
) -> io::Result<()> {
    while !remaining.is_empty() {
        match sink.write(remaining).await {
            Ok(0) => return Err(io::ErrorKind::WriteZero.into()),
            Ok(n) => remaining = &remaining[n..],
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    loop {
        match sink.flush().await {
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            other => return other,
        }
    }
}

fn raw_bytes(path: &Path) -> &[u8] {
    path.as_os_str().as_encoded_bytes()
}

fn check_len(path: &Path) -> Result<(), EncodeError> {
    let len = raw_bytes(path).len();
    if len > MAX_PATH_LEN {
        return Err(EncodeError::PathTooLong { len });
    }
    Ok(())
}

/// An async sink that several pipelines can write to.
///
/// The lock is held for a whole message, so messages from different
/// pipelines never interleave.
#[derive(Debug)]
pub struct SharedSink<W> {
    inner: Arc<Mutex<W>>,
}

impl<W> Clone for SharedSink<W> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<W> SharedSink<W> {
    pub fn new(sink: W) -> Self {
        Self {
            inner: Arc::new(Mutex::new(sink)),
        }
    }

    /// Exclusive access to the underlying sink.
    pub async fn lock(&self) -> MutexGuard<'_, W> {
        self.inner.lock().await
    }
}

impl<W: AsyncWrite + Unpin> SharedSink<W> {
    /// Encode outside the lock, then write the message while holding it.
    pub async fn write_operation(&self, operation: &Operation) -> Result<usize, EncodeError> {
        let message = encode(operation)?;
        let mut sink = self.inner.lock().await;
        write_message(&mut *sink, &message).await?;
        Ok(message.len())
    }
}
