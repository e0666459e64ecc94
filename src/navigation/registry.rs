use std::collections::BTreeMap;

use tokio::sync::oneshot;

/// Keyed one-shot multi-waiter completion registry.
///
/// Any number of waiters may register under a key. `notify` resolves all of them at once and
/// forgets the key; `notify_all` does the same for every key. Each waiter resolves at most once.
#[derive(Debug)]
pub struct CompletionRegistry<K, V> {
    waiters: BTreeMap<K, Vec<oneshot::Sender<V>>>,
}

impl<K, V> Default for CompletionRegistry<K, V> {
    fn default() -> Self {
        Self {
            waiters: BTreeMap::new(),
        }
    }
}

/// Receiving half returned by [`CompletionRegistry::register`].
#[derive(Debug)]
pub struct Waiter<V>(oneshot::Receiver<V>);

impl<V> Waiter<V> {
    /// Wait for the value. `None` if the registry was dropped without notifying.
    pub async fn wait(self) -> Option<V> {
        self.0.await.ok()
    }
}

impl<K: Ord, V: Clone> CompletionRegistry<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, key: K) -> Waiter<V> {
        let (tx, rx) = oneshot::channel();
        self.waiters.entry(key).or_default().push(tx);
        Waiter(rx)
    }

    /// Resolve every waiter registered under `key`; returns how many were still listening.
    pub fn notify(&mut self, key: &K, value: V) -> usize {
        let Some(senders) = self.waiters.remove(key) else {
            return 0;
        };
        deliver(senders, &value)
    }

    /// Resolve every waiter under every key with `value`.
    pub fn notify_all(&mut self, value: V) -> usize {
        std::mem::take(&mut self.waiters)
            .into_values()
            .map(|senders| deliver(senders, &value))
            .sum()
    }

    pub fn pending(&self, key: &K) -> usize {
        self.waiters.get(key).map_or(0, Vec::len)
    }

    /// Total registered waiters across all keys.
    pub fn len(&self) -> usize {
        self.waiters.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.waiters.is_empty()
    }
}

fn deliver<V: Clone>(senders: Vec<oneshot::Sender<V>>, value: &V) -> usize {
    // A dropped receiver means the waiter gave up; that is not an error.
    senders
        .into_iter()
        .filter(|tx| !tx.is_closed())
        .map(|tx| tx.send(value.clone()).is_ok())
        .filter(|delivered| *delivered)
        .count()
}

#[cfg(test)]
#[path = "../../tests/unit/navigation/registry.rs"]
mod tests;
