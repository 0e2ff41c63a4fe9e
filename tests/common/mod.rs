#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};

use env_logger::Builder;
use log::LevelFilter;
use refcache::entry::CacheEntry;
use refcache::traits::EntryFactory;

static INIT: Once = Once::new();

pub fn initialize_logger() {
    INIT.call_once_force(|_| {
        let mut builder = Builder::new();
        builder
            .filter_level(LevelFilter::Info)
            .filter_module("refcache", LevelFilter::Debug)
            .format_timestamp_millis()
            .parse_default_env();
        // another test binary thread may have installed a logger already
        let _ = builder.try_init();
    });
}

/// Stand-in for a native graphics handle; counts its own release.
#[derive(Debug)]
pub struct DeviceHandle {
    pub id: usize,
    pub name: String,
    released: Arc<AtomicUsize>,
}

impl Drop for DeviceHandle {
    fn drop(&mut self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// Creates one `DeviceHandle` per miss, keyed by name. An empty name is a null key.
#[derive(Debug, Default)]
pub struct DeviceFactory {
    created: AtomicUsize,
    released: Arc<AtomicUsize>,
}

impl DeviceFactory {
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    pub fn release_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.released)
    }
}

impl EntryFactory<str> for DeviceFactory {
    type Data = String;
    type Object = DeviceHandle;
    type Error = std::convert::Infallible;

    fn create_entry(
        &mut self,
        key: &str,
        _cached: bool,
    ) -> Result<(String, DeviceHandle), Self::Error> {
        let id = self.created.fetch_add(1, Ordering::SeqCst) + 1;
        Ok((
            key.to_string(),
            DeviceHandle {
                id,
                name: key.to_string(),
                released: Arc::clone(&self.released),
            },
        ))
    }

    fn is_match(&self, key: &str, entry: &CacheEntry<String, DeviceHandle>) -> bool {
        entry.data() == key
    }

    fn is_null_key(&self, key: &str) -> bool {
        key.is_empty()
    }
}
