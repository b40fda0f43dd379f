//! Incremental event-stream frame decoder.
//!
//! Network reads split the body at arbitrary byte offsets: inside a
//! UTF-8 sequence, inside a line, or between the two newlines of a
//! frame separator. The decoder keeps whatever it could not finish
//! and prepends it to the next read, so feeding the same bytes in any
//! number of chunks yields the same frames.

/// One complete frame as it appeared on the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    /// Value of the `event:` line, if any
    pub event: Option<String>,
    /// `data:` lines joined with `\n`
    pub data: String,
}

impl RawFrame {
    pub fn new(event: Option<&str>, data: impl Into<String>) -> Self {
        Self {
            event: event.map(str::to_string),
            data: data.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct FrameDecoder {
    /// Trailing bytes of an incomplete UTF-8 sequence
    pending_bytes: Vec<u8>,
    /// Text after the last newline seen
    line_buffer: String,
    event: Option<String>,
    data_lines: Vec<String>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a chunk and return every frame it completed, in order
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<RawFrame> {
        let text = self.decode_utf8(chunk);
        self.line_buffer.push_str(&text);

        let mut frames = Vec::new();
        while let Some(newline) = self.line_buffer.find('\n') {
            let mut line: String = self.line_buffer.drain(..=newline).collect();
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
            if let Some(frame) = self.process_line(&line) {
                frames.push(frame);
            }
        }
        frames
    }

    /// End of stream: anything not terminated by a blank line is dropped
    pub fn finish(&mut self) {
        if !self.line_buffer.is_empty() || !self.data_lines.is_empty() {
            tracing::debug!(
                "Discarding unterminated frame at end of stream ({} buffered bytes)",
                self.line_buffer.len()
            );
        }
        self.pending_bytes.clear();
        self.line_buffer.clear();
        self.event = None;
        self.data_lines.clear();
    }

    /// Whether a partially received frame is buffered
    pub fn has_partial(&self) -> bool {
        !self.pending_bytes.is_empty()
            || !self.line_buffer.is_empty()
            || !self.data_lines.is_empty()
            || self.event.is_some()
    }

    fn decode_utf8(&mut self, chunk: &[u8]) -> String {
        let mut bytes = std::mem::take(&mut self.pending_bytes);
        bytes.extend_from_slice(chunk);

        let mut out = String::with_capacity(bytes.len());
        let mut rest: &[u8] = &bytes;
        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    out.push_str(valid);
                    break;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    // Safe: from_utf8 vouched for this prefix
                    out.push_str(std::str::from_utf8(valid).unwrap_or_default());
                    match e.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[len..];
                        }
                        None => {
                            // Sequence continues in the next chunk
                            self.pending_bytes = after.to_vec();
                            break;
                        }
                    }
                }
            }
        }
        out
    }

    fn process_line(&mut self, line: &str) -> Option<RawFrame> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data_lines.push(value.to_string()),
            "id" | "retry" => {}
            other => tracing::debug!("Ignoring unknown stream field '{}'", other),
        }
        None
    }

    fn dispatch(&mut self) -> Option<RawFrame> {
        let event = self.event.take();
        if self.data_lines.is_empty() {
            return None;
        }
        let data = std::mem::take(&mut self.data_lines).join("\n");
        Some(RawFrame { event, data })
    }
}
