use parking_lot::Mutex;
use tokio::sync::watch;

/// "Typing..." flag shown while replies are outstanding.
///
/// Counts outstanding replies so overlapping submissions keep the flag raised
/// until the last one is delivered. The count and the published flag change
/// under the same lock, so subscribers never see `false` while a reply is
/// outstanding.
pub struct ComposingIndicator {
    outstanding: Mutex<usize>,
    state: watch::Sender<bool>,
}

impl ComposingIndicator {
    pub fn new() -> Self {
        let (state, _) = watch::channel(false);
        Self {
            outstanding: Mutex::new(0),
            state,
        }
    }

    pub fn begin(&self) {
        let mut outstanding = self.outstanding.lock();
        *outstanding += 1;
        if *outstanding == 1 {
            self.state.send_replace(true);
        }
    }

    pub fn finish(&self) {
        let mut outstanding = self.outstanding.lock();
        if *outstanding == 0 {
            return;
        }
        *outstanding -= 1;
        if *outstanding == 0 {
            self.state.send_replace(false);
        }
    }

    pub fn is_composing(&self) -> bool {
        *self.outstanding.lock() > 0
    }

    pub fn outstanding(&self) -> usize {
        *self.outstanding.lock()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.state.subscribe()
    }
}

impl Default for ComposingIndicator {
    fn default() -> Self {
        Self::new()
    }
}
