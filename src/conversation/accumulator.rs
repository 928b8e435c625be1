//! Accumulator: the growing content of the in-flight reply.
//!
//! The accumulator is the only writer. Readers on other threads hold a
//! [`ContentReader`] and always see the content either before or after an
//! append, never in between.

use std::sync::{Arc, PoisonError, RwLock};

/// Append-only owner of the in-flight content.
#[derive(Debug, Default)]
pub struct Accumulator {
    content: Arc<RwLock<String>>,
    deltas: usize,
}

impl Accumulator {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a delta and return the full content after it.
    pub fn append(&mut self, delta: &str) -> String {
        // Appends are never partially applied, so a poisoned lock still
        // guards consistent content.
        let mut content = self.content.write().unwrap_or_else(PoisonError::into_inner);
        content.push_str(delta);
        self.deltas += 1;
        content.clone()
    }

    /// Copy of the current content.
    pub fn snapshot(&self) -> String {
        self.content
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of deltas appended so far.
    pub const fn deltas(&self) -> usize {
        self.deltas
    }

    /// Check if any delta was ever received.
    pub const fn has_content(&self) -> bool {
        self.deltas > 0
    }

    /// A read-only handle for other threads.
    pub fn reader(&self) -> ContentReader {
        ContentReader {
            content: Arc::clone(&self.content),
        }
    }

    /// Consume the accumulator, returning the final content.
    pub fn into_content(self) -> String {
        match Arc::try_unwrap(self.content) {
            Ok(lock) => lock.into_inner().unwrap_or_else(PoisonError::into_inner),
            Err(shared) => shared.read().unwrap_or_else(PoisonError::into_inner).clone(),
        }
    }
}

/// Shared read handle to an accumulator's content.
#[derive(Debug, Clone)]
pub struct ContentReader {
    content: Arc<RwLock<String>>,
}

impl ContentReader {
    /// Copy of the current content.
    pub fn snapshot(&self) -> String {
        self.content
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Length of the current content in bytes.
    pub fn len(&self) -> usize {
        self.content.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Check if the content is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_accumulator_appends_in_order() {
        let mut acc = Accumulator::new();
        assert_eq!(acc.append("He"), "He");
        assert_eq!(acc.append("llo"), "Hello");
        assert_eq!(acc.snapshot(), "Hello");
        assert_eq!(acc.deltas(), 2);
        assert!(acc.has_content());
        assert_eq!(acc.into_content(), "Hello");
    }

    #[test]
    fn test_accumulator_empty() {
        let acc = Accumulator::new();
        assert!(!acc.has_content());
        assert!(acc.reader().is_empty());
        assert_eq!(acc.into_content(), "");
    }

    #[test]
    fn test_reader_sees_whole_appends_only() {
        let deltas: Vec<String> = (0..500).map(|i| format!("<{i}>")).collect();
        let expected: Vec<String> = deltas
            .iter()
            .scan(String::new(), |acc, d| {
                acc.push_str(d);
                Some(acc.clone())
            })
            .collect();

        let mut acc = Accumulator::new();
        let reader = acc.reader();

        let observer = thread::spawn(move || {
            let mut seen = Vec::new();
            for _ in 0..2000 {
                seen.push(reader.snapshot());
            }
            seen
        });

        for delta in &deltas {
            acc.append(delta);
        }

        for snapshot in observer.join().unwrap() {
            assert!(
                snapshot.is_empty() || expected.contains(&snapshot),
                "torn read: {snapshot}"
            );
        }
    }

    #[test]
    fn test_into_content_with_live_reader() {
        let mut acc = Accumulator::new();
        let reader = acc.reader();
        acc.append("kept");
        assert_eq!(acc.into_content(), "kept");
        assert_eq!(reader.snapshot(), "kept");
    }
}
