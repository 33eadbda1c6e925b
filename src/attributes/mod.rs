mod convert;
mod property;

pub use property::{PropertyArray, PropertyTag, PropertyType, ScalarArray};

use crate::error::PropertyError;
use crate::model::{names, EntityKind};

#[derive(Debug, Clone)]
struct PropertyEntry {
    name: String,
    data: PropertyArray,
    /// Single-element array holding the value used for new slots.
    fill: PropertyArray,
}

/// Named, typed property arrays parallel to one entity kind's index space.
///
/// Every array always has exactly [`len`](Self::len) elements; adding an
/// entity appends the property's default value to each array.
#[derive(Debug, Clone)]
pub struct AttributeStore {
    kind: EntityKind,
    len: usize,
    entries: Vec<PropertyEntry>,
}

impl AttributeStore {
    /// Creates an empty store for entities of `kind`.
    #[must_use]
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            len: 0,
            entries: Vec::new(),
        }
    }

    /// Entity kind whose index space the arrays follow.
    #[must_use]
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Number of entities (the length of every array).
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the store holds no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of properties.
    #[must_use]
    pub fn n_properties(&self) -> usize {
        self.entries.len()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }

    /// Adds a property filled with `default`.
    ///
    /// If a property called `name` already exists with element type `T`, it
    /// is returned unchanged; if it exists with another type, `None` is
    /// returned.
    pub fn add<T: PropertyType>(&mut self, name: &str, default: T) -> Option<&mut [T]> {
        let index = match self.position(name) {
            Some(i) => i,
            None => {
                self.entries.push(PropertyEntry {
                    name: name.to_owned(),
                    data: T::wrap(vec![default.clone(); self.len]),
                    fill: T::wrap(vec![default]),
                });
                self.entries.len() - 1
            }
        };
        T::view_mut(&mut self.entries[index].data)
    }

    /// Returns the property `name` if it exists with element type `T`.
    #[must_use]
    pub fn get<T: PropertyType>(&self, name: &str) -> Option<&[T]> {
        self.array(name).and_then(T::view)
    }

    /// Mutable variant of [`get`](Self::get).
    pub fn get_mut<T: PropertyType>(&mut self, name: &str) -> Option<&mut [T]> {
        let index = self.position(name)?;
        T::view_mut(&mut self.entries[index].data)
    }

    /// Returns the property `name`, adding it with `default` if missing.
    ///
    /// Returns `None` only if `name` exists with a different element type.
    pub fn get_or_add<T: PropertyType>(&mut self, name: &str, default: T) -> Option<&mut [T]> {
        self.add(name, default)
    }

    /// Returns the type-erased array of property `name`.
    #[must_use]
    pub fn array(&self, name: &str) -> Option<&PropertyArray> {
        self.entries.iter().find(|e| e.name == name).map(|e| &e.data)
    }

    /// Element type of property `name`.
    #[must_use]
    pub fn tag(&self, name: &str) -> Option<PropertyTag> {
        self.array(name).map(PropertyArray::tag)
    }

    /// Returns `true` if a property called `name` exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Removes the property `name`. Returns `false` if it does not exist or
    /// is [reserved](names::is_reserved).
    pub fn remove(&mut self, name: &str) -> bool {
        if names::is_reserved(name) {
            return false;
        }
        match self.position(name) {
            Some(i) => {
                self.entries.remove(i);
                true
            }
            None => false,
        }
    }

    /// Renames a property.
    ///
    /// Fails if `old` does not exist, `new` is already taken, or either
    /// name is reserved.
    pub fn rename(&mut self, old: &str, new: &str) -> bool {
        if self.contains(new) || names::is_reserved(old) || names::is_reserved(new) {
            return false;
        }
        match self.position(old) {
            Some(i) => {
                new.clone_into(&mut self.entries[i].name);
                true
            }
            None => false,
        }
    }

    /// Names of all properties, in insertion order.
    #[must_use]
    pub fn list(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.name.clone()).collect()
    }

    /// Converts property `name` in place to element type `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if the property does not exist, is reserved, or the
    /// conversion between the two element types is not supported.
    pub fn convert(&mut self, name: &str, target: PropertyTag) -> Result<(), PropertyError> {
        if names::is_reserved(name) {
            return Err(PropertyError::Reserved(name.to_owned()));
        }
        let Some(index) = self.position(name) else {
            return Err(PropertyError::MissingProperty {
                name: name.to_owned(),
                location: self.kind,
            });
        };
        let entry = &mut self.entries[index];
        let mismatch = || PropertyError::PropertyTypeMismatch {
            name: name.to_owned(),
            expected: format!("a type convertible to {target}"),
            found: entry.data.tag(),
        };
        let data = convert::convert(&entry.data, target).ok_or_else(mismatch)?;
        let fill = convert::convert(&entry.fill, target).ok_or_else(mismatch)?;
        entry.data = data;
        entry.fill = fill;
        Ok(())
    }

    /// Appends one element (each property's default) to every array and
    /// returns the new element's index.
    pub(crate) fn push(&mut self) -> usize {
        self.resize(self.len + 1);
        self.len - 1
    }

    /// Resizes every array to `n` elements.
    pub(crate) fn resize(&mut self, n: usize) {
        for entry in &mut self.entries {
            entry.data.resize_with_fill(n, &entry.fill);
        }
        self.len = n;
    }

    /// Compacts every array, keeping the elements whose flag in `keep` is set.
    pub(crate) fn retain(&mut self, keep: &[bool]) {
        for entry in &mut self.entries {
            entry.data.retain_mask(keep);
        }
        self.len = keep.iter().filter(|&&k| k).count();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Vec3;

    fn store_with(n: usize) -> AttributeStore {
        let mut store = AttributeStore::new(EntityKind::Vertex);
        store.resize(n);
        store
    }

    #[test]
    fn add_sizes_array_to_entity_count() {
        let mut store = store_with(4);
        let prop = store.add("v:quality", 1.5f32).unwrap();
        assert_eq!(prop, &[1.5, 1.5, 1.5, 1.5]);
    }

    #[test]
    fn add_with_other_type_fails() {
        let mut store = store_with(2);
        store.add("v:quality", 0.0f32).unwrap();
        assert!(store.add("v:quality", 0i32).is_none());
    }

    #[test]
    fn add_with_same_type_keeps_existing_values() {
        let mut store = store_with(2);
        store.add("v:quality", 0.0f32).unwrap()[1] = 7.0;
        let again = store.add("v:quality", 3.0f32).unwrap();
        assert_eq!(again, &[0.0, 7.0]);
    }

    #[test]
    fn get_checks_element_type() {
        let mut store = store_with(3);
        store.add("v:color", Vec3::zeros()).unwrap();
        assert!(store.get::<Vec3>("v:color").is_some());
        assert!(store.get::<f32>("v:color").is_none());
        assert!(store.get::<Vec3>("v:missing").is_none());
        assert_eq!(store.tag("v:color"), Some(PropertyTag::Vec3));
    }

    #[test]
    fn push_appends_default() {
        let mut store = store_with(1);
        store.add("v:flag", true).unwrap();
        store.add("v:index", 9u32).unwrap();
        let i = store.push();
        assert_eq!(i, 1);
        assert_eq!(store.get::<bool>("v:flag").unwrap(), &[true, true]);
        assert_eq!(store.get::<u32>("v:index").unwrap(), &[9, 9]);
    }

    #[test]
    fn remove_and_list() {
        let mut store = store_with(1);
        store.add("a", 0.0f64).unwrap();
        store.add("b", 0i8).unwrap();
        assert_eq!(store.list(), vec!["a".to_owned(), "b".to_owned()]);
        assert!(store.remove("a"));
        assert!(!store.remove("a"));
        assert_eq!(store.list(), vec!["b".to_owned()]);
    }

    #[test]
    fn rename_rules() {
        let mut store = store_with(1);
        store.add("a", 0u8).unwrap();
        store.add("b", 0u8).unwrap();
        assert!(!store.rename("a", "b"));
        assert!(!store.rename("missing", "c"));
        assert!(store.rename("a", "c"));
        assert!(store.contains("c"));
        assert!(!store.contains("a"));
    }

    #[test]
    fn retain_compacts_every_array() {
        let mut store = store_with(0);
        store.add("i", 0i32).unwrap();
        for k in 0..4 {
            let i = store.push();
            store.get_mut::<i32>("i").unwrap()[i] = k;
        }
        store.retain(&[true, false, true, false]);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get::<i32>("i").unwrap(), &[0, 2]);
    }

    #[test]
    fn convert_changes_element_type_and_default() {
        let mut store = store_with(2);
        store.add("s", 1.75f32).unwrap();
        store.convert("s", PropertyTag::Int).unwrap();
        assert_eq!(store.get::<i32>("s").unwrap(), &[2, 2]);
        store.push();
        assert_eq!(store.get::<i32>("s").unwrap(), &[2, 2, 2]);
    }

    #[test]
    fn convert_rejects_unsupported_pair() {
        let mut store = store_with(1);
        store.add("c", Vec3::zeros()).unwrap();
        assert!(store.convert("c", PropertyTag::Float).is_err());
        assert!(store.convert("missing", PropertyTag::Float).is_err());
    }

    #[test]
    fn reserved_arrays_stay_put() {
        let mut store = store_with(2);
        store.add(names::POINT, Vec3::zeros()).unwrap();
        assert!(!store.remove(names::POINT));
        assert!(!store.rename(names::POINT, "v:position"));
        assert!(matches!(
            store.convert(names::POINT, PropertyTag::Float),
            Err(PropertyError::Reserved(_))
        ));
        store.add("v:position", Vec3::zeros()).unwrap();
        assert!(!store.rename("v:position", names::VERTEX_DELETED));
        assert_eq!(store.get::<Vec3>(names::POINT).unwrap().len(), 2);
    }
}
