//! Bounded LRU cache for `(method, raw_path) -> match` lookups, matching the
//! `@lru_cache(maxsize=1200)` precedent on `Router.get_match` in
//! `examples/original_source/blacksheep/server/routing.py`.

use std::collections::HashMap;
use std::collections::VecDeque;
use std::hash::Hash;

use parking_lot::Mutex;

pub struct LruCache<K, V> {
	capacity: usize,
	inner: Mutex<Inner<K, V>>,
}

struct Inner<K, V> {
	map: HashMap<K, V>,
	order: VecDeque<K>,
}

impl<K, V> LruCache<K, V>
where
	K: Eq + Hash + Clone,
	V: Clone,
{
	pub fn new(capacity: usize) -> Self {
		Self {
			capacity,
			inner: Mutex::new(Inner {
				map: HashMap::new(),
				order: VecDeque::new(),
			}),
		}
	}

	pub fn get(&self, key: &K) -> Option<V> {
		self.inner.lock().map.get(key).cloned()
	}

	pub fn put(&self, key: K, value: V) {
		if self.capacity == 0 {
			return;
		}
		let mut inner = self.inner.lock();
		if !inner.map.contains_key(&key) {
			inner.order.push_back(key.clone());
			if inner.order.len() > self.capacity {
				if let Some(oldest) = inner.order.pop_front() {
					inner.map.remove(&oldest);
				}
			}
		}
		inner.map.insert(key, value);
	}

	pub fn len(&self) -> usize {
		self.inner.lock().map.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn evicts_oldest_beyond_capacity() {
		let cache: LruCache<u32, u32> = LruCache::new(2);
		cache.put(1, 10);
		cache.put(2, 20);
		cache.put(3, 30);
		assert_eq!(cache.len(), 2);
		assert!(cache.get(&1).is_none());
		assert_eq!(cache.get(&3), Some(30));
	}
}
