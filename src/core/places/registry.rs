use super::place::{Buyer, Place, Storage};
use crate::core::errors::PlaceError;
use crate::core::types::PlaceId;

/// Owns every storage and buyer of a run and resolves place ids positionally:
/// storages take ids `1..=S`, buyers `S+1..=S+B`.
#[derive(Debug, Clone, Default)]
pub struct PlaceRegistry {
    storages: Vec<Storage>,
    buyers: Vec<Buyer>,
}

impl PlaceRegistry {
    pub fn new(storages: Vec<Storage>, buyers: Vec<Buyer>) -> Self {
        Self { storages, buyers }
    }

    /// Resolve an id to its place variant
    pub fn get(&self, id: PlaceId) -> Result<Place<'_>, PlaceError> {
        let index = id.index();
        if id.0 == 0 {
            return Err(PlaceError::UnknownPlace(id));
        }
        if let Some(storage) = self.storages.get(index) {
            return Ok(Place::Storage(storage));
        }
        self.buyers
            .get(index - self.storages.len())
            .map(Place::Buyer)
            .ok_or(PlaceError::UnknownPlace(id))
    }

    pub fn storage(&self, id: PlaceId) -> Result<&Storage, PlaceError> {
        match self.get(id)? {
            Place::Storage(storage) => Ok(storage),
            Place::Buyer(_) => Err(PlaceError::NotAStorage(id)),
        }
    }

    pub fn storage_mut(&mut self, id: PlaceId) -> Result<&mut Storage, PlaceError> {
        if id.0 == 0 {
            return Err(PlaceError::UnknownPlace(id));
        }
        if self.is_buyer(id) {
            return Err(PlaceError::NotAStorage(id));
        }
        self.storages
            .get_mut(id.index())
            .ok_or(PlaceError::UnknownPlace(id))
    }

    pub fn buyer(&self, id: PlaceId) -> Result<&Buyer, PlaceError> {
        match self.get(id)? {
            Place::Buyer(buyer) => Ok(buyer),
            Place::Storage(_) => Err(PlaceError::NotABuyer(id)),
        }
    }

    pub fn is_buyer(&self, id: PlaceId) -> bool {
        id.0 as usize > self.storages.len() && (id.0 as usize) <= self.len()
    }

    /// Ids of all storages in ascending order
    pub fn storage_ids(&self) -> impl Iterator<Item = PlaceId> {
        (1..=self.storages.len() as u32).map(PlaceId)
    }

    pub fn storage_count(&self) -> usize {
        self.storages.len()
    }

    pub fn buyer_count(&self) -> usize {
        self.buyers.len()
    }

    /// Total number of places
    pub fn len(&self) -> usize {
        self.storages.len() + self.buyers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
