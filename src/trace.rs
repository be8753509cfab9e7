//! Caller-owned diagnostic trace.
//!
//! Every pipeline stage appends human-readable lines describing what it saw
//! and what it did. The trace is purely observational: nothing in the core
//! reads it back to make a decision. Callers typically surface it in a
//! debug sidebar or log sink.

/// An append-only, ordered sequence of diagnostic strings.
#[derive(Debug, Default, Clone)]
pub struct TraceLog {
    entries: Vec<String>,
}

impl TraceLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.entries.push(line.into());
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}
