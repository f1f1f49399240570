//! Map whose entries expire after a fixed idle age.
//!
//! Every entry carries the time it was last touched. Nothing is evicted
//! implicitly: callers pass the current time to [`ExpiringMap::sweep`], which
//! keeps the structure deterministic under test.

use chrono::{DateTime, TimeDelta, Utc};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    touched_at: DateTime<Utc>,
}

/// Key/value map with last-touch tracking and age-based sweeping.
#[derive(Debug, Clone)]
pub struct ExpiringMap<K, V> {
    entries: HashMap<K, Entry<V>>,
    max_age: TimeDelta,
}

impl<K, V> ExpiringMap<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Create an empty map whose entries expire once idle for longer than `max_age`.
    pub fn new(max_age: TimeDelta) -> Self {
        Self {
            entries: HashMap::new(),
            max_age,
        }
    }

    pub fn max_age(&self) -> TimeDelta {
        self.max_age
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains_key(key)
    }

    /// Value and last-touch time for `key`, without touching it.
    pub fn get<Q>(&self, key: &Q) -> Option<(&V, DateTime<Utc>)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries
            .get(key)
            .map(|entry| (&entry.value, entry.touched_at))
    }

    /// Insert or replace `key`, stamping it with `now`.
    pub fn insert(&mut self, key: K, value: V, now: DateTime<Utc>) -> Option<V> {
        self.entries
            .insert(
                key,
                Entry {
                    value,
                    touched_at: now,
                },
            )
            .map(|entry| entry.value)
    }

    /// Mutable access that refreshes the last-touch time.
    ///
    /// The stamp never moves backwards, even if `now` is older than it.
    pub fn touch<Q>(&mut self, key: &Q, now: DateTime<Utc>) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get_mut(key).map(|entry| {
            entry.touched_at = entry.touched_at.max(now);
            &mut entry.value
        })
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.remove(key).map(|entry| entry.value)
    }

    /// Keys idle for strictly longer than the max age at `now`.
    pub fn expired_keys(&self, now: DateTime<Utc>) -> Vec<K> {
        self.entries
            .iter()
            .filter(|(_, entry)| self.is_expired(entry.touched_at, now))
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Number of entries still live at `now`.
    pub fn count_live(&self, now: DateTime<Utc>) -> usize {
        self.entries
            .values()
            .filter(|entry| !self.is_expired(entry.touched_at, now))
            .count()
    }

    /// Remove every expired entry and return how many were dropped.
    pub fn sweep(&mut self, now: DateTime<Utc>) -> usize {
        let expired = self.expired_keys(now);
        for key in &expired {
            self.entries.remove(key);
        }
        expired.len()
    }

    fn is_expired(&self, touched_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(touched_at) > self.max_age
    }
}

#[cfg(test)]
mod tests {
    use super::ExpiringMap;
    use chrono::{DateTime, TimeDelta, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap() + TimeDelta::hours(i64::from(hour))
    }

    fn day_map() -> ExpiringMap<String, u32> {
        ExpiringMap::new(TimeDelta::hours(24))
    }

    #[test]
    fn sweep_removes_only_entries_older_than_max_age() {
        let mut map = day_map();
        map.insert("old".to_string(), 1, at(0));
        map.insert("edge".to_string(), 2, at(1));
        map.insert("fresh".to_string(), 3, at(20));

        let now = at(25);
        let mut expired = map.expired_keys(now);
        expired.sort();
        assert_eq!(expired, vec!["old".to_string()]);
        assert_eq!(map.count_live(now), 2);

        assert_eq!(map.sweep(now), 1);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("edge"), Some((&2, at(1))));
        assert_eq!(map.get("fresh"), Some((&3, at(20))));
        assert!(!map.contains_key("old"));
    }

    #[test]
    fn expired_keys_does_not_mutate() {
        let mut map = day_map();
        map.insert("a".to_string(), 1, at(0));
        assert_eq!(map.expired_keys(at(48)).len(), 1);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn touch_refreshes_and_never_moves_backwards() {
        let mut map = day_map();
        map.insert("a".to_string(), 1, at(0));
        *map.touch("a", at(10)).expect("present") += 1;
        assert_eq!(map.get("a"), Some((&2, at(10))));

        map.touch("a", at(5));
        assert_eq!(map.get("a").map(|(_, touched)| touched), Some(at(10)));
        assert_eq!(map.sweep(at(30)), 0);
        assert!(map.touch("missing", at(1)).is_none());
    }

    #[test]
    fn insert_replaces_and_remove_returns_value() {
        let mut map = day_map();
        assert_eq!(map.insert("a".to_string(), 1, at(0)), None);
        assert_eq!(map.insert("a".to_string(), 2, at(1)), Some(1));
        assert_eq!(map.remove("a"), Some(2));
        assert_eq!(map.remove("a"), None);
        assert!(map.is_empty());
        assert_eq!(map.max_age(), TimeDelta::hours(24));
    }
}
