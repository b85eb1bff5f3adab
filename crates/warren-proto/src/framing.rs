use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::envelope::Blob;

/// Errors from the newline-delimited JSON framing helpers.
#[derive(Debug, thiserror::Error)]
pub enum FramingError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed JSON blob: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("peer closed the stream")]
    Eof,
}

/// Encodes one `Blob` as a single line of JSON (spec §6: "newline-terminated
/// JSON values ... UTF-8 ... field ordering is not significant").
pub async fn encode_blob<W>(writer: &mut W, blob: &Blob) -> Result<(), FramingError>
where
    W: AsyncWrite + Unpin,
{
    let mut line = serde_json::to_vec(blob)?;
    line.push(b'\n');
    writer.write_all(&line).await?;
    writer.flush().await?;
    Ok(())
}

/// Reads and decodes the next `Blob` from a buffered byte stream. Returns
/// `Err(FramingError::Eof)` when the peer has closed the stream cleanly.
pub async fn decode_blob<R>(reader: &mut R) -> Result<Blob, FramingError>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    loop {
        line.clear();
        let n = reader.read_line(&mut line).await?;
        if n == 0 {
            return Err(FramingError::Eof);
        }
        if line.trim().is_empty() {
            continue;
        }
        return Ok(serde_json::from_str(line.trim_end())?);
    }
}
