use std::fmt;

use bevy::prelude::*;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A lazily resolved reference to an asset.
///
/// Authored data only stores the asset path. At runtime the reference is either
/// already resolved to a [`Handle`] (for assets created in code) or resolved on
/// demand through the [`AssetServer`] with [`AssetRef::load`].
///
/// Serializes as `Option<String>`:
///
/// ```ron
/// mesh: Some("models/bumper_sport.glb#Mesh0/Primitive0"),
/// sound: None,
/// ```
pub struct AssetRef<A: Asset> {
    path: Option<String>,
    handle: Option<Handle<A>>,
}

impl<A: Asset> AssetRef<A> {
    /// A reference that points at nothing.
    pub fn null() -> Self {
        Self {
            path: None,
            handle: None,
        }
    }

    pub fn from_path(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            handle: None,
        }
    }

    /// Wrap an asset that already lives in `Assets<A>` (procedural meshes, generated materials).
    pub fn from_handle(handle: Handle<A>) -> Self {
        Self {
            path: None,
            handle: Some(handle),
        }
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// True when the reference has neither a path nor a handle.
    pub fn is_null(&self) -> bool {
        self.path.is_none() && self.handle.is_none()
    }

    /// The handle if this reference has already been resolved.
    pub fn loaded(&self) -> Option<&Handle<A>> {
        self.handle.as_ref()
    }

    /// Resolve the reference now: returns the existing handle, or asks the
    /// asset server to load the path. Returns `None` for a null reference.
    pub fn load(&self, asset_server: &AssetServer) -> Option<Handle<A>> {
        if let Some(handle) = &self.handle {
            return Some(handle.clone());
        }
        self.path
            .as_ref()
            .map(|path| asset_server.load(path.clone()))
    }
}

impl<A: Asset> Default for AssetRef<A> {
    fn default() -> Self {
        Self::null()
    }
}

impl<A: Asset> Clone for AssetRef<A> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            handle: self.handle.clone(),
        }
    }
}

impl<A: Asset> PartialEq for AssetRef<A> {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
            && self.handle.as_ref().map(Handle::id) == other.handle.as_ref().map(Handle::id)
    }
}

impl<A: Asset> fmt::Debug for AssetRef<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.path, &self.handle) {
            (Some(path), _) => write!(f, "AssetRef({path:?})"),
            (None, Some(handle)) => write!(f, "AssetRef({:?})", handle.id()),
            (None, None) => write!(f, "AssetRef(null)"),
        }
    }
}

impl<A: Asset> Serialize for AssetRef<A> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.path.serialize(serializer)
    }
}

impl<'de, A: Asset> Deserialize<'de> for AssetRef<A> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self {
            path: Option::<String>::deserialize(deserializer)?,
            handle: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_reference() {
        let r: AssetRef<Mesh> = AssetRef::default();
        assert!(r.is_null());
        assert!(r.loaded().is_none());
        assert!(r.path().is_none());
    }

    #[test]
    fn path_reference_is_not_loaded_until_resolved() {
        let r: AssetRef<Mesh> = AssetRef::from_path("models/bumper.glb#Mesh0/Primitive0");
        assert!(!r.is_null());
        assert!(r.loaded().is_none());
        assert_eq!(r.path(), Some("models/bumper.glb#Mesh0/Primitive0"));
    }

    #[test]
    fn equality_uses_path() {
        let a: AssetRef<StandardMaterial> = AssetRef::from_path("paint.glb#Material0");
        let b: AssetRef<StandardMaterial> = AssetRef::from_path("paint.glb#Material0");
        let c: AssetRef<StandardMaterial> = AssetRef::from_path("paint.glb#Material1");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn deserializes_from_optional_path() {
        let r: AssetRef<Mesh> = ron::from_str(r#"Some("models/wing.glb#Mesh0/Primitive0")"#).unwrap();
        assert_eq!(r.path(), Some("models/wing.glb#Mesh0/Primitive0"));

        let n: AssetRef<Mesh> = ron::from_str("None").unwrap();
        assert!(n.is_null());
    }
}
