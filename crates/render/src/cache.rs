//! Resized base-image cache
//!
//! Resizing a large site plan dominates render time, while most interactions
//! only change the overlay. Resized bitmaps are kept per `(image, zoom)`.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use std::sync::Arc;

use image::imageops::{self, FilterType};
use image::RgbImage;
use takeoff_core::{BaseImage, BaseImageId};

/// Default number of resized bitmaps kept
pub const DEFAULT_CAPACITY: usize = 4;

/// Least-recently-used map with a fixed capacity
#[derive(Debug)]
pub struct LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    capacity: usize,
    map: HashMap<K, V>,
    order: VecDeque<K>,
}

impl<K, V> LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new(capacity: usize) -> Self {
        Self { capacity: capacity.max(1), map: HashMap::new(), order: VecDeque::new() }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    pub fn get(&mut self, key: &K) -> Option<&V> {
        if self.map.contains_key(key) {
            self.touch(key);
        }
        self.map.get(key)
    }

    pub fn insert(&mut self, key: K, value: V) {
        if self.map.insert(key.clone(), value).is_some() {
            self.touch(&key);
            return;
        }

        self.order.push_back(key);
        while self.map.len() > self.capacity {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.map.remove(&oldest);
                }
                None => break,
            }
        }
    }

    pub fn clear(&mut self) {
        self.map.clear();
        self.order.clear();
    }

    fn touch(&mut self, key: &K) {
        if let Some(index) = self.order.iter().position(|existing| existing == key) {
            if let Some(found) = self.order.remove(index) {
                self.order.push_back(found);
            }
        }
    }
}

/// Output size for a zoomed bitmap: floored, never below 1x1
pub fn scaled_size(width: u32, height: u32, zoom: f64) -> (u32, u32) {
    let scale = |side: u32| ((f64::from(side) * zoom).floor() as u32).max(1);
    (scale(width), scale(height))
}

/// Resize a bitmap by `zoom` with a bicubic filter
pub fn resize_base(image: &RgbImage, zoom: f64) -> RgbImage {
    let (width, height) = scaled_size(image.width(), image.height(), zoom);
    if (width, height) == image.dimensions() {
        return image.clone();
    }
    imageops::resize(image, width, height, FilterType::CatmullRom)
}

type ResizeKey = (BaseImageId, u64);

/// Cache of resized base images keyed by image identity and exact zoom
#[derive(Debug)]
pub struct ResizeCache {
    entries: LruCache<ResizeKey, Arc<RgbImage>>,
    hits: u64,
    misses: u64,
}

impl Default for ResizeCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ResizeCache {
    pub fn new(capacity: usize) -> Self {
        Self { entries: LruCache::new(capacity), hits: 0, misses: 0 }
    }

    /// Resized bitmap for `base` at `zoom`, computed on a miss
    pub fn resized(&mut self, base: &BaseImage, zoom: f64) -> Arc<RgbImage> {
        let key = (base.id(), zoom.to_bits());
        if let Some(image) = self.entries.get(&key) {
            self.hits += 1;
            tracing::trace!(id = base.id().get(), zoom, "resize cache hit");
            return Arc::clone(image);
        }

        self.misses += 1;
        tracing::debug!(id = base.id().get(), zoom, "resize cache miss");
        let image = Arc::new(resize_base(base.image(), zoom));
        self.entries.insert(key, Arc::clone(&image));
        image
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
