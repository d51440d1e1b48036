use indexmap::IndexMap;
use tintbar_events::NotificationRecord;

/// Tracked notifications keyed by `key`, in display (insertion) order.
#[derive(Debug, Clone, Default)]
pub struct NotificationSet {
    records: IndexMap<String, NotificationRecord>,
}

impl NotificationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace. A replaced record keeps its display position.
    ///
    /// Returns the previous record under the same key.
    pub fn insert(&mut self, record: NotificationRecord) -> Option<NotificationRecord> {
        self.records.insert(record.key.clone(), record)
    }

    pub fn remove(&mut self, key: &str) -> Option<NotificationRecord> {
        self.records.shift_remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&NotificationRecord> {
        self.records.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.records.contains_key(key)
    }

    /// Replace the whole set; later duplicates of a key overwrite earlier ones.
    pub fn replace_all(&mut self, records: impl IntoIterator<Item = NotificationRecord>) {
        self.records.clear();
        for record in records {
            self.insert(record);
        }
    }

    /// Remove everything, returning the records in display order.
    pub fn drain(&mut self) -> Vec<NotificationRecord> {
        self.records.drain(..).map(|(_, record)| record).collect()
    }

    pub fn records(&self) -> impl Iterator<Item = &NotificationRecord> {
        self.records.values()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
