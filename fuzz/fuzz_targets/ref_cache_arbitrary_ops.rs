#![no_main]

use std::convert::Infallible;

use libfuzzer_sys::fuzz_target;
use refcache::cache::RefCountedCache;
use refcache::entry::CacheEntry;
use refcache::scope::Scope;
use refcache::traits::EntryFactory;

struct ByteFactory;

impl EntryFactory<u8> for ByteFactory {
    type Data = u8;
    type Object = u16;
    type Error = Infallible;

    fn create_entry(&mut self, key: &u8, _cached: bool) -> Result<(u8, u16), Infallible> {
        Ok((*key, u16::from(*key) * 3))
    }

    fn is_match(&self, key: &u8, entry: &CacheEntry<u8, u16>) -> bool {
        entry.data() == key
    }

    fn is_null_key(&self, key: &u8) -> bool {
        *key == 0
    }
}

// Fuzz arbitrary lookup/release sequences on RefCountedCache
//
// The first two bytes pick the limits. Remaining pairs either look up a key
// and hold the scope, release a held scope, or dispose the cache.
fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }
    let soft = usize::from(data[0] % 8) + 1;
    let hard = soft + usize::from(data[1] % 8);
    let mut cache = RefCountedCache::new(ByteFactory, soft, hard);
    let mut held: Vec<Scope<u8, u16>> = Vec::new();

    for pair in data[2..].chunks_exact(2) {
        let op = pair[0] % 8;
        let arg = pair[1];

        match op {
            0..=4 => {
                // lookup and hold
                match cache.get_entry(&arg) {
                    Ok(scope) => {
                        assert_ne!(arg, 0);
                        assert!(!cache.is_disposed());
                        assert_eq!(*scope, u16::from(arg) * 3);
                        held.push(scope);
                    }
                    Err(_) => assert!(arg == 0 || cache.is_disposed()),
                }
            }
            5 | 6 => {
                // release
                if !held.is_empty() {
                    let idx = usize::from(arg) % held.len();
                    drop(held.swap_remove(idx));
                }
            }
            7 => {
                if arg == 0 {
                    cache.dispose();
                }
            }
            _ => unreachable!(),
        }

        assert!(cache.len() <= cache.hard_limit());
        cache.check_invariants().unwrap();
        for scope in &held {
            if let Some(entry) = scope.entry() {
                assert!(entry.ref_count() >= 1);
            }
        }
    }
});
