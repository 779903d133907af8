//! Fixed-capacity, index-addressed storage for one object type.
//!
//! Removal swaps the last live element into the freed slot, so an index is
//! only meaningful until the next removal from the same registry.

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("registry is full ({capacity} objects)")]
    CapacityExceeded { capacity: usize },
}

#[derive(Debug, Clone)]
pub struct Registry<T> {
    items: Vec<T>,
    capacity: usize,
}

impl<T> Registry<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    /// Append at the end and return the new index.
    pub fn add(&mut self, item: T) -> Result<usize, RegistryError> {
        if self.is_full() {
            return Err(RegistryError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        self.items.push(item);
        Ok(self.items.len() - 1)
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    /// Remove `index` by moving the last element into its slot.
    pub fn swap_remove(&mut self, index: usize) -> Option<T> {
        if index >= self.items.len() {
            return None;
        }
        Some(self.items.swap_remove(index))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}
