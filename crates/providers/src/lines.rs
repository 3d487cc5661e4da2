//! Line framing for streamed HTTP bodies (NDJSON and SSE).

/// Splits an incoming byte stream into complete lines.
///
/// Raw bytes are held until their newline arrives, so a multi-byte
/// character split across network chunks decodes intact. Only a complete
/// line is decoded, lossily.
#[derive(Debug, Default)]
pub(crate) struct LineBuffer {
    buffer: Vec<u8>,
}

impl LineBuffer {
    /// Feed bytes, returning every line they complete (without `\r\n`).
    pub(crate) fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);

        let mut lines = Vec::new();
        while let Some(line_end) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=line_end).collect();
            lines.push(decode(&line[..line_end]));
        }
        lines
    }

    /// Whatever is left once the stream has ended.
    pub(crate) fn finish(self) -> Option<String> {
        let rest = decode(&self.buffer);
        let rest = rest.trim();
        (!rest.is_empty()).then(|| rest.to_string())
    }
}

fn decode(line: &[u8]) -> String {
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    String::from_utf8_lossy(line).into_owned()
}
