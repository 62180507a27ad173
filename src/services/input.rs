//! Text buffer behind the widget's input field.

use parking_lot::Mutex;
use std::sync::Arc;

/// Shared handle to the pending input text. Clones see the same buffer.
#[derive(Clone, Default)]
pub struct InputBuffer {
    text: Arc<Mutex<String>>,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, text: impl Into<String>) {
        *self.text.lock() = text.into();
    }

    pub fn get(&self) -> String {
        self.text.lock().clone()
    }

    pub fn clear(&self) {
        self.text.lock().clear();
    }

    pub fn is_blank(&self) -> bool {
        crate::services::normalizer::is_blank(&self.text.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_text() {
        let buffer = InputBuffer::new();
        let other = buffer.clone();
        buffer.set("hello");
        assert_eq!(other.get(), "hello");

        other.clear();
        assert_eq!(buffer.get(), "");
        assert!(buffer.is_blank());
    }
}
