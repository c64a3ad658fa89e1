//! Change notifications emitted by the form engine

use parking_lot::Mutex;
use std::sync::Arc;

/// What changed in a form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    /// Value, touched flag or error of a field changed
    FieldChanged { name: String },
    ValidationStarted { name: String },
    ValidationFinished { name: String, valid: bool },
    /// Submitting/submitted/error flags changed
    FormStateChanged,
    Reset,
}

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Arc<dyn Fn(&FormEvent) + Send + Sync>;

/// Registered listeners. Emitting clones the list first, so listeners run
/// without the registry lock held and may (un)subscribe from inside a callback.
#[derive(Default)]
pub(crate) struct Listeners {
    inner: Mutex<ListenerTable>,
}

#[derive(Default)]
struct ListenerTable {
    next_id: u64,
    entries: Vec<(ListenerId, Listener)>,
}

impl Listeners {
    pub(crate) fn add(&self, listener: impl Fn(&FormEvent) + Send + Sync + 'static) -> ListenerId {
        let mut table = self.inner.lock();
        let id = ListenerId(table.next_id);
        table.next_id += 1;
        table.entries.push((id, Arc::new(listener)));
        id
    }

    pub(crate) fn remove(&self, id: ListenerId) -> bool {
        let mut table = self.inner.lock();
        let before = table.entries.len();
        table.entries.retain(|(entry_id, _)| *entry_id != id);
        table.entries.len() != before
    }

    pub(crate) fn emit(&self, event: FormEvent) {
        let snapshot: Vec<Listener> = self
            .inner
            .lock()
            .entries
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in snapshot {
            listener(&event);
        }
    }
}
