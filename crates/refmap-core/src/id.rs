use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

/// Global string interner shared by every id kind.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Storage issues integer row ids, hand-written fixtures use strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Int(u64),
    Str(String),
}

macro_rules! interned_id {
    ($(#[$meta:meta])* $name:ident, $tag:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(Spur);

        impl $name {
            /// Intern a string key, or return the existing handle.
            pub fn intern(s: &str) -> Self {
                $name(INTERNER.get_or_intern(s))
            }

            /// Id for an integer storage key.
            pub fn from_raw(n: u64) -> Self {
                Self::intern(&n.to_string())
            }

            /// Resolve back to the string key.
            pub fn as_str(&self) -> &str {
                INTERNER.resolve(&self.0)
            }
        }

        impl From<u64> for $name {
            fn from(n: u64) -> Self {
                Self::from_raw(n)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::intern(s)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($tag, "#{}"), self.as_str())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                Ok(match RawId::deserialize(deserializer)? {
                    RawId::Int(n) => Self::from_raw(n),
                    RawId::Str(s) => Self::intern(&s),
                })
            }
        }
    };
}

interned_id!(
    /// A project: the unit of loading and of transient-state reset.
    ProjectId,
    "project"
);
interned_id!(
    /// A topic block on the canvas.
    TopicId,
    "topic"
);
interned_id!(
    /// A reference node (anchor) owned by one topic.
    AnchorId,
    "ref"
);
interned_id!(
    /// A directed link between two anchors.
    ConnectionId,
    "link"
);
