//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! NETCONF message framing (RFC 6242 §4): the `]]>]]>` end-of-message
//! marker used for `<hello>` and, when the peer hasn't negotiated
//! `base:1.1`, every message; chunked framing (`\n#<n>\n...\n##\n`)
//! once both ends have advertised `urn:ietf:params:netconf:base:1.1`.

use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

const EOM_MARKER: &[u8] = b"]]>]]>";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FramingMode {
    EndOfMessage,
    Chunked,
}

/// Reads one end-of-message-framed document, per RFC 6242 §4.3.
pub async fn read_eom<R: AsyncRead + Unpin>(reader: &mut R, max_bytes: usize) -> io::Result<Option<String>> {
    let mut buf = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        let n = reader.read(&mut byte).await?;
        if n == 0 {
            return if buf.is_empty() { Ok(None) } else { Err(eof_mid_message()) };
        }
        buf.push(byte[0]);
        if buf.len() > max_bytes {
            return Err(too_big(max_bytes));
        }
        if buf.ends_with(EOM_MARKER) {
            buf.truncate(buf.len() - EOM_MARKER.len());
            return Ok(Some(decode_utf8(buf)?));
        }
    }
}

pub async fn write_eom<W: AsyncWrite + Unpin>(writer: &mut W, payload: &str) -> io::Result<()> {
    writer.write_all(payload.as_bytes()).await?;
    writer.write_all(EOM_MARKER).await?;
    writer.flush().await
}

/// Reads one chunked-framed document, per RFC 6242 §4.2: a sequence of
/// `\n#<size>\n<size bytes>` chunks terminated by `\n##\n`.
pub async fn read_chunked<R: AsyncRead + Unpin>(reader: &mut R, max_bytes: usize) -> io::Result<Option<String>> {
    let mut first_byte = [0u8; 1];
    if reader.read(&mut first_byte).await? == 0 {
        return Ok(None);
    }
    if first_byte[0] != b'\n' {
        return Err(protocol_error("chunked message must start with a newline"));
    }

    let mut message = Vec::new();
    loop {
        expect_byte(reader, b'#').await?;
        let header = read_until_newline(reader).await?;
        if header == "#" {
            expect_byte(reader, b'\n').await?;
            return Ok(Some(decode_utf8(message)?));
        }
        let size: usize = header
            .parse()
            .map_err(|_| protocol_error("malformed chunk-size header"))?;
        if size == 0 || message.len() + size > max_bytes {
            return Err(too_big(max_bytes));
        }
        let mut chunk = vec![0u8; size];
        reader.read_exact(&mut chunk).await?;
        message.extend_from_slice(&chunk);
        expect_byte(reader, b'\n').await?;
    }
}

pub async fn write_chunked<W: AsyncWrite + Unpin>(writer: &mut W, payload: &str) -> io::Result<()> {
    const MAX_CHUNK: usize = 1 << 20;
    let bytes = payload.as_bytes();
    if bytes.is_empty() {
        writer.write_all(format!("\n#{}\n", bytes.len()).as_bytes()).await?;
        writer.write_all(b"\n##\n").await?;
        return writer.flush().await;
    }
    for chunk in bytes.chunks(MAX_CHUNK) {
        writer.write_all(format!("\n#{}\n", chunk.len()).as_bytes()).await?;
        writer.write_all(chunk).await?;
    }
    writer.write_all(b"\n##\n").await?;
    writer.flush().await
}

pub async fn read_message<R: AsyncRead + Unpin>(
    reader: &mut R,
    mode: FramingMode,
    max_bytes: usize,
) -> io::Result<Option<String>> {
    match mode {
        FramingMode::EndOfMessage => read_eom(reader, max_bytes).await,
        FramingMode::Chunked => read_chunked(reader, max_bytes).await,
    }
}

pub async fn write_message<W: AsyncWrite + Unpin>(writer: &mut W, mode: FramingMode, payload: &str) -> io::Result<()> {
    match mode {
        FramingMode::EndOfMessage => write_eom(writer, payload).await,
        FramingMode::Chunked => write_chunked(writer, payload).await,
    }
}

async fn expect_byte<R: AsyncRead + Unpin>(reader: &mut R, expected: u8) -> io::Result<()> {
    let mut byte = [0u8; 1];
    reader.read_exact(&mut byte).await?;
    if byte[0] != expected {
        return Err(protocol_error("unexpected byte in chunk framing"));
    }
    Ok(())
}

async fn read_until_newline<R: AsyncRead + Unpin>(reader: &mut R) -> io::Result<String> {
    let mut s = String::new();
    let mut byte = [0u8; 1];
    loop {
        reader.read_exact(&mut byte).await?;
        if byte[0] == b'\n' {
            return Ok(s);
        }
        s.push(byte[0] as char);
    }
}

fn decode_utf8(buf: Vec<u8>) -> io::Result<String> {
    String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn protocol_error(msg: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg)
}

fn eof_mid_message() -> io::Error {
    io::Error::new(io::ErrorKind::UnexpectedEof, "connection closed mid-message")
}

fn too_big(max_bytes: usize) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, format!("message exceeds {max_bytes} bytes"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn round_trips_end_of_message_framing() {
        let mut buf = Vec::new();
        write_eom(&mut buf, "<hello/>").await.unwrap();
        let mut cursor = std::io::Cursor::new(buf);
        let msg = read_eom(&mut cursor, 1024).await.unwrap().unwrap();
        assert_eq!(msg, "<hello/>");
    }

    #[tokio::test]
    async fn round_trips_chunked_framing() {
        let mut buf = Vec::new();
        write_chunked(&mut buf, "<rpc message-id=\"1\"/>").await.unwrap();
        let mut cursor = std::io::Cursor::new(buf);
        let msg = read_chunked(&mut cursor, 1024).await.unwrap().unwrap();
        assert_eq!(msg, "<rpc message-id=\"1\"/>");
    }

    #[tokio::test]
    async fn chunked_framing_splits_large_payload_across_chunks() {
        let payload = "x".repeat(3);
        let mut buf = Vec::new();
        write_chunked(&mut buf, &payload).await.unwrap();
        // Manually splice in a second chunk header to prove multi-chunk
        // reassembly, since write_chunked alone never needs to split a
        // payload this small.
        let raw = format!("\n#{}\n{}\n#{}\n{}\n##\n", 1, &payload[..1], 2, &payload[1..]);
        let mut cursor = std::io::Cursor::new(raw.into_bytes());
        let msg = read_chunked(&mut cursor, 1024).await.unwrap().unwrap();
        assert_eq!(msg, payload);
    }

    #[tokio::test]
    async fn oversized_message_is_rejected() {
        let mut buf = Vec::new();
        write_eom(&mut buf, &"x".repeat(100)).await.unwrap();
        let mut cursor = std::io::Cursor::new(buf);
        let err = read_eom(&mut cursor, 10).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[tokio::test]
    async fn end_of_stream_before_any_bytes_returns_none() {
        let mut cursor = std::io::Cursor::new(Vec::<u8>::new());
        assert!(read_eom(&mut cursor, 1024).await.unwrap().is_none());
        let mut cursor = std::io::Cursor::new(Vec::<u8>::new());
        assert!(read_chunked(&mut cursor, 1024).await.unwrap().is_none());
    }
}
