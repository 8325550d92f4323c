//! Keyboard-wedge scanner decoding
//!
//! Scanners type the code as fast keystrokes followed by Enter. Keys further
//! apart than [`SCAN_KEY_GAP_MS`] are treated as human typing and reset the
//! buffer.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};
use shared::types::Timestamp;

/// Max gap between two keys of one scan
pub const SCAN_KEY_GAP_MS: i64 = 50;

/// Key event as delivered by the UI layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    /// Modifiers, arrows, function keys...
    Other,
}

impl Key {
    /// Map a DOM-style key name ("a", "Enter", "Shift")
    pub fn from_name(name: &str) -> Self {
        if name == "Enter" {
            return Key::Enter;
        }
        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Key::Char(c),
            _ => Key::Other,
        }
    }
}

fn is_barcode_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

type Handler = Arc<dyn Fn(&str) + Send + Sync>;

#[derive(Default)]
struct ScanBuffer {
    chars: String,
    last_key_at: Option<Timestamp>,
}

/// Decodes scans and fans them out to registered listeners
#[derive(Default)]
pub struct BarcodeScanner {
    buffer: Mutex<ScanBuffer>,
    listeners: RwLock<Vec<(ListenerId, Handler)>>,
    next_id: AtomicU64,
}

impl std::fmt::Debug for BarcodeScanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BarcodeScanner")
            .field("listeners", &self.listeners.read().len())
            .finish()
    }
}

impl BarcodeScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one key press at `at` (millis). Returns the barcode when this key
    /// completes a scan; listeners are notified before returning.
    pub fn feed_key(&self, key: Key, at: Timestamp) -> Option<String> {
        let scanned = {
            let mut buf = self.buffer.lock();
            if buf.last_key_at.is_some_and(|last| at - last > SCAN_KEY_GAP_MS) {
                buf.chars.clear();
            }
            buf.last_key_at = Some(at);

            match key {
                Key::Enter if !buf.chars.is_empty() => Some(std::mem::take(&mut buf.chars)),
                Key::Char(c) if is_barcode_char(c) => {
                    buf.chars.push(c);
                    None
                }
                _ => None,
            }
        };

        if let Some(code) = &scanned {
            tracing::debug!(barcode = %code, "Barcode scanned");
            self.notify(code);
        }
        scanned
    }

    /// Feed a whole burst of keys, returning every completed scan
    pub fn feed_keys<I>(&self, keys: I) -> Vec<String>
    where
        I: IntoIterator<Item = (Key, Timestamp)>,
    {
        keys.into_iter()
            .filter_map(|(key, at)| self.feed_key(key, at))
            .collect()
    }

    pub fn on_barcode_scanned<F>(&self, handler: F) -> ListenerId
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.write().push((id, Arc::new(handler)));
        id
    }

    /// Returns false when the id was not registered
    pub fn remove_barcode_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }

    fn notify(&self, barcode: &str) {
        // Handlers run outside the lock so they may (un)register listeners
        let handlers: Vec<Handler> = self
            .listeners
            .read()
            .iter()
            .map(|(_, h)| Arc::clone(h))
            .collect();
        for handler in handlers {
            handler(barcode);
        }
    }
}
