use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

/// Global string interner for shape IDs (fast comparisons, low memory).
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// A lightweight, interned identifier for shapes on the canvas.
/// Internally a `Spur` index: 4 bytes, Copy, Eq, Hash in O(1).
///
/// IDs are assigned by the host and never change after creation.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeId(Spur);

impl ShapeId {
    /// Intern a string as a ShapeId, or return existing if already interned.
    pub fn intern(s: &str) -> Self {
        ShapeId(INTERNER.get_or_intern(s))
    }

    /// Resolve back to a string slice.
    pub fn as_str(&self) -> &'static str {
        INTERNER.resolve(&self.0)
    }

    /// Generate a unique ID with a prefix (e.g. `shape_1`, `shape_2`).
    pub fn with_prefix(prefix: &str) -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        Self::intern(&format!("{prefix}_{n}"))
    }

    /// Deterministic key for a render-internal resource (gradient, clip)
    /// owned by this shape, e.g. `scan_overlay1` for `overlay1`.
    ///
    /// `resource` must not contain `_`. Characters of the ID outside
    /// `[A-Za-z0-9-]` are escaped as `_<hex>_`, so the first `_` always
    /// ends the resource name: distinct (resource, ID) pairs never map to
    /// the same key, and the key stays a valid SVG/CSS id.
    pub fn resource_key(&self, resource: &str) -> String {
        use std::fmt::Write;
        let mut key = String::with_capacity(resource.len() + 1 + self.as_str().len());
        key.push_str(resource);
        key.push('_');
        for c in self.as_str().chars() {
            if c.is_ascii_alphanumeric() || c == '-' {
                key.push(c);
            } else {
                let _ = write!(key, "_{:x}_", c as u32);
            }
        }
        key
    }
}

impl fmt::Debug for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ShapeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ShapeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(ShapeId::intern(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_roundtrip() {
        let a = ShapeId::intern("shape:overlay-1");
        let b = ShapeId::intern("shape:overlay-1");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "shape:overlay-1");
    }

    #[test]
    fn generated_ids_are_unique() {
        let a = ShapeId::with_prefix("shape");
        let b = ShapeId::with_prefix("shape");
        assert_ne!(a, b);
    }

    #[test]
    fn resource_keys_are_stable_and_sanitized() {
        let id = ShapeId::intern("shape:abc/1");
        assert_eq!(id.resource_key("scan"), "scan_shape_3a_abc_2f_1");
        assert_eq!(id.resource_key("scan"), id.resource_key("scan"));
        assert_ne!(
            id.resource_key("scan"),
            ShapeId::intern("shape:abc/2").resource_key("scan")
        );
        // `_` is escaped too, so a look-alike ID cannot collide.
        assert_ne!(
            id.resource_key("scan"),
            ShapeId::intern("shape_3a_abc_2f_1").resource_key("scan")
        );
        // A dash in the ID cannot shift the resource boundary.
        let short = ShapeId::intern("a");
        let dashed = ShapeId::intern("scan-a");
        assert_ne!(short.resource_key("overlay-scan"), dashed.resource_key("overlay"));
        assert_ne!(short.resource_key("table-body"), ShapeId::intern("body-a").resource_key("table"));
    }

    #[test]
    fn resolved_str_outlives_the_id() {
        let names: Vec<&str> = [ShapeId::intern("keep-1"), ShapeId::intern("keep-2")]
            .into_iter()
            .map(|id| id.as_str())
            .collect();
        assert_eq!(names, vec!["keep-1", "keep-2"]);
    }
}
