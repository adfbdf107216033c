/// Buffers streamed text and reveals it one word at a time, smoothing out
/// bursts from the network.
#[derive(Debug, Clone, Default)]
pub struct WordReveal {
    text: String,
    shown: usize,
}

impl WordReveal {
    /// Reveal buffer for a message that is about to stream in.
    pub fn streaming() -> Self {
        Self::default()
    }

    pub fn push_str(&mut self, delta: &str) {
        self.text.push_str(delta);
    }

    /// Advance to the end of the next word, returning the newly shown text.
    pub fn tick(&mut self) -> Option<&str> {
        if self.is_drained() {
            return None;
        }
        let start = self.shown;
        self.shown = next_word_end(&self.text, start);
        Some(&self.text[start..self.shown])
    }

    /// Show everything that is buffered.
    pub fn flush(&mut self) -> Option<&str> {
        if self.is_drained() {
            return None;
        }
        let start = self.shown;
        self.shown = self.text.len();
        Some(&self.text[start..])
    }

    pub fn is_drained(&self) -> bool {
        self.shown >= self.text.len()
    }

}

/// Byte offset just past the next word starting at `from`: leading
/// whitespace is skipped, then the word itself.
pub fn next_word_end(text: &str, from: usize) -> usize {
    let rest = &text[from..];
    let word_start = rest
        .char_indices()
        .find(|(_, c)| !c.is_whitespace())
        .map(|(i, _)| i)
        .unwrap_or(rest.len());
    let word_end = rest[word_start..]
        .char_indices()
        .find(|(_, c)| c.is_whitespace())
        .map(|(i, _)| word_start + i)
        .unwrap_or(rest.len());
    from + word_end
}
