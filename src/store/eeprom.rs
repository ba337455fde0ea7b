//! EEPROM emulation on NOR flash.
//!
//! Leverages `sequential-storage` to keep a key/value map in a flash range, and `postcard` to
//! serialize the values. The application uses [`EmulatedEeprom::write`] to set or withdraw the
//! stay-in-boot key; the bootloader only reads.
use core::ops::Range;

use embedded_storage_async::nor_flash::NorFlash;
use sequential_storage::{
    cache::KeyPointerCache,
    map::{SerializationError, Value},
};
use serde::{Deserialize, Serialize};

use crate::{
    fmt::log,
    store::{KeyValueStore, StoreError},
};

/// Number of distinct keys the cache keeps track of.
const CACHED_KEYS: usize = 2;

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Copy)]
struct Word(u16);

impl Word {
    const fn max_serialized_size() -> usize {
        // Varint encoding of a u16, plus the key and item header.
        32
    }
}

impl<'a> Value<'a> for Word {
    fn serialize_into(&self, buffer: &mut [u8]) -> Result<usize, SerializationError> {
        let buffer = postcard::to_slice(self, buffer).map_err(|e| match e {
            postcard::Error::SerializeBufferFull => SerializationError::BufferTooSmall,
            _ => SerializationError::Custom(0),
        })?;

        Ok(buffer.len())
    }

    fn deserialize_from(buffer: &'a [u8]) -> Result<Self, SerializationError>
    where
        Self: Sized,
    {
        postcard::from_bytes(buffer).map_err(|e| match e {
            postcard::Error::DeserializeUnexpectedEnd => SerializationError::BufferTooSmall,
            postcard::Error::DeserializeBadVarint | postcard::Error::DeserializeBadEncoding => {
                SerializationError::InvalidFormat
            }
            _ => SerializationError::Custom(0),
        })
    }
}

/// Key/value store of 16-bit words in `PAGES` flash pages.
pub struct EmulatedEeprom<F: NorFlash, const PAGES: usize> {
    flash: F,
    range: Range<u32>,
    cache: KeyPointerCache<PAGES, u16, CACHED_KEYS>,
}

impl<F: NorFlash, const PAGES: usize> EmulatedEeprom<F, PAGES> {
    /// Use `range` of `flash`, which must span exactly `PAGES` erase pages.
    pub fn new(flash: F, range: Range<u32>) -> Self {
        Self {
            flash,
            range,
            cache: KeyPointerCache::new(),
        }
    }

    /// Store the whole flash device, from offset zero.
    pub fn whole(flash: F) -> Self {
        let size = flash.capacity() as u32;
        Self::new(flash, 0..size)
    }

    pub fn release(self) -> F {
        self.flash
    }

    pub async fn fetch(&mut self, key: u16) -> Result<u16, StoreError> {
        let mut data_buffer = [0u8; Word::max_serialized_size()];

        let item = sequential_storage::map::fetch_item::<u16, Word, _>(
            &mut self.flash,
            self.range.clone(),
            &mut self.cache,
            &mut data_buffer,
            &key,
        )
        .await
        .map_err(|_| StoreError::Io)?;

        match item {
            Some(Word(value)) => Ok(value),
            None => {
                log::debug!("key {=u16:#x} not present", key);
                Err(StoreError::NotFound)
            }
        }
    }

    pub async fn store(&mut self, key: u16, value: u16) -> Result<(), StoreError> {
        let mut data_buffer = [0u8; Word::max_serialized_size()];

        log::debug!("storing {=u16:#x} at key {=u16:#x}", value, key);

        sequential_storage::map::store_item::<u16, Word, _>(
            &mut self.flash,
            self.range.clone(),
            &mut self.cache,
            &mut data_buffer,
            &key,
            &Word(value),
        )
        .await
        .map_err(|_| StoreError::Io)
    }

    /// Blocking variant of [`EmulatedEeprom::store`].
    pub fn write(&mut self, key: u16, value: u16) -> Result<(), StoreError> {
        embassy_futures::block_on(self.store(key, value))
    }
}

impl<F: NorFlash, const PAGES: usize> KeyValueStore for EmulatedEeprom<F, PAGES> {
    fn read(&mut self, key: u16) -> Result<u16, StoreError> {
        embassy_futures::block_on(self.fetch(key))
    }
}
