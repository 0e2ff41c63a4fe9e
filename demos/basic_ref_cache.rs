use std::convert::Infallible;

use refcache::builder::RefCacheBuilder;
use refcache::entry::CacheEntry;
use refcache::traits::EntryFactory;

struct Font {
    family: String,
}

impl Drop for Font {
    fn drop(&mut self) {
        println!("released {}", self.family);
    }
}

struct Fonts;

impl EntryFactory<str> for Fonts {
    type Data = String;
    type Object = Font;
    type Error = Infallible;

    fn create_entry(&mut self, family: &str, cached: bool) -> Result<(String, Font), Infallible> {
        println!("created {family} (cached: {cached})");
        Ok((
            family.to_string(),
            Font {
                family: family.to_string(),
            },
        ))
    }

    fn is_match(&self, family: &str, entry: &CacheEntry<String, Font>) -> bool {
        entry.data() == family
    }

    fn is_null_key(&self, family: &str) -> bool {
        family.is_empty()
    }
}

fn main() {
    let mut cache = RefCacheBuilder::new(1).hard_limit(2).build::<str, _>(Fonts);

    drop(cache.get_entry("mono").unwrap());
    let serif = cache.get_entry("serif").unwrap();

    // past the soft limit: the idle "mono" at the tail is evicted
    let sans = cache.get_entry("sans").unwrap();

    // both linked entries are referenced, so this one overflows
    let script = cache.get_entry("script").unwrap();
    println!("script overflow? {}", script.is_overflow());
    drop(script);

    println!("serif again: {}", cache.get_entry("serif").unwrap().family);
    drop((serif, sans));
    cache.dispose();
}

// Expected output:
// created mono (cached: true)
// created serif (cached: true)
// released mono
// created sans (cached: true)
// created script (cached: false)
// script overflow? true
// released script
// serif again: serif
// released sans
// released serif
//
// Explanation: soft=1, hard=2. Looking up "sans" cleans the idle tail entry
// "mono". With "serif" and "sans" both held and linked, the list is at the
// hard limit, so "script" is handed out as an overflow entry and released
// with its scope. dispose() drops the idle entries head first.
