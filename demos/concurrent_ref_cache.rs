use std::convert::Infallible;
use std::sync::Arc;
use std::thread;

use refcache::cache::ConcurrentRefCountedCache;
use refcache::entry::CacheEntry;
use refcache::traits::EntryFactory;

struct Brushes;

impl EntryFactory<u32> for Brushes {
    type Data = u32;
    type Object = String;
    type Error = Infallible;

    fn create_entry(&mut self, color: &u32, _cached: bool) -> Result<(u32, String), Infallible> {
        Ok((*color, format!("brush #{color:06x}")))
    }

    fn is_match(&self, color: &u32, entry: &CacheEntry<u32, String>) -> bool {
        entry.data() == color
    }
}

fn main() {
    let cache = Arc::new(ConcurrentRefCountedCache::new(Brushes, 4, 8));

    let workers: Vec<_> = (0..4u32)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..100u32 {
                    let brush = cache.get_entry(&((i + t) % 6 * 0x11)).unwrap();
                    assert!(brush.starts_with("brush #"));
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    let linked = cache.len();
    println!("within hard limit? {}", linked <= 8);
    cache.dispose();
    println!("after dispose: {}", cache.len());
}

// Expected output:
// within hard limit? true
// after dispose: 0
//
// Explanation: six colors cycle through a cache with soft=4, hard=8. Misses
// past the soft limit clean idle tail entries first, and the list never
// links more than eight entries regardless of how threads interleave.
