mod modifier;
mod solid;
mod transform;

pub use modifier::Modifier;
pub use solid::{ObjectKind, SolidData, SolidId};
pub use transform::Transform;

use std::collections::HashMap;

use slotmap::SlotMap;

use crate::error::SceneError;
use crate::mesh::{Aabb, Mesh};

/// Highest numeric variant suffix tried by [`SceneStore::claim_name`].
const MAX_VARIANT: u32 = 999;

/// Central arena that owns every named solid in the scene.
///
/// Solids are addressed by opaque [`SolidId`]s; names are a separate lookup
/// index kept unique at all times.
#[derive(Debug, Default)]
pub struct SceneStore {
    solids: SlotMap<SolidId, SolidData>,
    names: HashMap<String, SolidId>,
}

impl SceneStore {
    /// Creates a new, empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of objects in the scene.
    #[must_use]
    pub fn len(&self) -> usize {
        self.solids.len()
    }

    /// Returns `true` if the scene holds no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.solids.is_empty()
    }

    /// Inserts a solid under its own name and returns its ID.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NamingCollision`] if the name is already taken.
    pub fn add(&mut self, data: SolidData) -> Result<SolidId, SceneError> {
        if self.names.contains_key(&data.name) {
            return Err(SceneError::NamingCollision(data.name));
        }
        let name = data.name.clone();
        let id = self.solids.insert(data);
        self.names.insert(name, id);
        Ok(id)
    }

    /// Returns a reference to the solid, or an error if the ID is stale.
    ///
    /// # Errors
    ///
    /// Returns an error if the solid is not in the store.
    pub fn get(&self, id: SolidId) -> Result<&SolidData, SceneError> {
        self.solids.get(id).ok_or(SceneError::StaleId)
    }

    /// Returns a mutable reference to the solid, or an error if the ID is stale.
    ///
    /// Renaming must go through [`SceneStore::rename`].
    ///
    /// # Errors
    ///
    /// Returns an error if the solid is not in the store.
    pub fn get_mut(&mut self, id: SolidId) -> Result<&mut SolidData, SceneError> {
        self.solids.get_mut(id).ok_or(SceneError::StaleId)
    }

    /// Returns `true` if the ID refers to a live solid.
    #[must_use]
    pub fn contains(&self, id: SolidId) -> bool {
        self.solids.contains_key(id)
    }

    /// Looks up a solid ID by name.
    #[must_use]
    pub fn id_of(&self, name: &str) -> Option<SolidId> {
        self.names.get(name).copied()
    }

    /// Looks up a solid by name.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NotFound`] if no object holds the name.
    pub fn find(&self, name: &str) -> Result<(SolidId, &SolidData), SceneError> {
        let id = self
            .id_of(name)
            .ok_or_else(|| SceneError::NotFound(name.to_owned()))?;
        Ok((id, self.get(id)?))
    }

    /// Returns `true` if some object holds the name.
    #[must_use]
    pub fn contains_name(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    /// All object names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.names.keys().cloned().collect();
        names.sort();
        names
    }

    /// Iterates over all solids.
    pub fn iter(&self) -> impl Iterator<Item = (SolidId, &SolidData)> {
        self.solids.iter()
    }

    /// Renames a solid.
    ///
    /// Renaming to the solid's current name is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NamingCollision`] if another object holds
    /// `new_name`, or [`SceneError::StaleId`] for a dead handle.
    pub fn rename(&mut self, id: SolidId, new_name: &str) -> Result<(), SceneError> {
        let current = self.get(id)?.name.clone();
        if current == new_name {
            return Ok(());
        }
        if self.names.contains_key(new_name) {
            return Err(SceneError::NamingCollision(new_name.to_owned()));
        }
        self.names.remove(&current);
        self.names.insert(new_name.to_owned(), id);
        self.get_mut(id)?.name = new_name.to_owned();
        Ok(())
    }

    /// Renames a solid to `desired`, or to the first free `desired.NNN`
    /// variant if the name is taken. Returns the name actually assigned.
    ///
    /// # Errors
    ///
    /// Returns an error for a dead handle or if every variant is taken.
    pub fn claim_name(&mut self, id: SolidId, desired: &str) -> Result<String, SceneError> {
        let name = self.free_variant(desired, Some(id))?;
        self.rename(id, &name)?;
        Ok(name)
    }

    /// Renames a solid to the first free `<base>.NNN` variant of its own
    /// name, marking it as a leftover copy. Returns the new name.
    ///
    /// # Errors
    ///
    /// Returns an error for a dead handle or if no variant name is free.
    pub fn demote(&mut self, id: SolidId) -> Result<String, SceneError> {
        let current = self.get(id)?.name.clone();
        if is_duplicate_variant(&current) {
            return Ok(current);
        }
        let name = self.free_variant(&current, None)?;
        self.rename(id, &name)?;
        Ok(name)
    }

    /// Copies a solid; the copy is named `<base>.NNN` after the source.
    ///
    /// # Errors
    ///
    /// Returns an error for a dead handle or if no variant name is free.
    pub fn duplicate(&mut self, id: SolidId) -> Result<SolidId, SceneError> {
        let mut copy = self.get(id)?.clone();
        copy.name = self.free_variant(base_name(&copy.name), None)?;
        self.add(copy)
    }

    /// Removes a solid and returns its data. Removing a dead handle is a no-op.
    pub fn remove(&mut self, id: SolidId) -> Option<SolidData> {
        let data = self.solids.remove(id)?;
        self.names.remove(&data.name);
        Some(data)
    }

    /// Removes the solid holding `name`, if any.
    pub fn remove_named(&mut self, name: &str) -> Option<SolidData> {
        let id = self.id_of(name)?;
        self.remove(id)
    }

    /// Mesh of a solid in world coordinates.
    ///
    /// # Errors
    ///
    /// Returns an error for a dead handle.
    pub fn world_mesh(&self, id: SolidId) -> Result<Mesh, SceneError> {
        Ok(self.get(id)?.world_mesh())
    }

    /// World-space bounding box of a solid, `None` if it has no geometry.
    ///
    /// # Errors
    ///
    /// Returns an error for a dead handle.
    pub fn world_bounding_box(&self, id: SolidId) -> Result<Option<Aabb>, SceneError> {
        Ok(self.get(id)?.world_bounding_box())
    }

    /// First of `desired`, `desired.001`, `desired.002`, ... not held by an
    /// object other than `owner`.
    fn free_variant(&self, desired: &str, owner: Option<SolidId>) -> Result<String, SceneError> {
        let is_free = |name: &str| match self.names.get(name) {
            None => true,
            Some(&holder) => Some(holder) == owner,
        };
        if owner.is_some() && is_free(desired) {
            return Ok(desired.to_owned());
        }
        (1..=MAX_VARIANT)
            .map(|n| format!("{desired}.{n:03}"))
            .find(|candidate| is_free(candidate))
            .ok_or_else(|| SceneError::NamingCollision(desired.to_owned()))
    }
}

/// Strips a trailing `.NNN` duplicate suffix.
#[must_use]
pub fn base_name(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((base, suffix))
            if !base.is_empty()
                && suffix.len() == 3
                && suffix.bytes().all(|b| b.is_ascii_digit()) =>
        {
            base
        }
        _ => name,
    }
}

/// Returns `true` if the name carries a `.NNN` duplicate suffix.
#[must_use]
pub fn is_duplicate_variant(name: &str) -> bool {
    base_name(name).len() != name.len()
}
