use super::{Chunks, ChunksError};

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    Chunks(ChunksError),
    InvalidPayload,
}

/// A type for reading the `data` of server-sent events from a chunk stream.
///
/// Only the `data` field is interpreted. Comment lines and other fields
/// are skipped, and an event without data is not reported. Bytes are
/// buffered undecoded, so a UTF-8 sequence may span chunks.
pub struct Sse {
    buf: Vec<u8>,
    chunks: Chunks,
}

impl Sse {
    #[inline]
    pub fn new(chunks: Chunks) -> Self {
        Self {
            buf: Vec::new(),
            chunks,
        }
    }

    pub async fn next_event(&mut self) -> Result<Option<String>, Error> {
        loop {
            while let Some(block) = self.take_event_block() {
                if let Some(data) = parse_event_block(&block)? {
                    return Ok(Some(data));
                }
            }

            // An unterminated trailing event is discarded at the end of
            // the stream.
            match self.chunks.next_chunk().await.map_err(Error::Chunks)? {
                Some(bytes) => self.buf.extend_from_slice(&bytes),
                None => return Ok(None),
            }
        }
    }

    /// Removes the bytes before the first blank line from the buffer,
    /// together with the blank line itself.
    fn take_event_block(&mut self) -> Option<Vec<u8>> {
        let mut line_start = 0;
        let mut blank_line = None;
        for (idx, byte) in self.buf.iter().enumerate() {
            if *byte != b'\n' {
                continue;
            }
            let line = &self.buf[line_start..idx];
            if line.is_empty() || line == b"\r" {
                blank_line = Some((line_start, idx));
                break;
            }
            line_start = idx + 1;
        }

        let (block_end, blank_line_end) = blank_line?;
        let block = self.buf[..block_end].to_vec();
        self.buf.drain(..=blank_line_end);
        Some(block)
    }
}

fn parse_event_block(block: &[u8]) -> Result<Option<String>, Error> {
    let block = str::from_utf8(block).map_err(|_| Error::InvalidPayload)?;

    let mut data: Option<String> = None;
    for line in block.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => {
                (field, value.strip_prefix(' ').unwrap_or(value))
            }
            None => (line, ""),
        };
        if field != "data" {
            continue;
        }
        match &mut data {
            Some(data) => {
                data.push('\n');
                data.push_str(value);
            }
            None => data = Some(value.to_owned()),
        }
    }
    Ok(data)
}
