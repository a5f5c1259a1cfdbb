//! Discriminated union resolution
//!
//! Every union is a closed table of `(tag, variant)` pairs declared through
//! [`tagged_union!`]. Resolution reads the `model_type` key, looks the tag up
//! case-insensitively, and deserializes the remaining keys into exactly that
//! variant's struct. Variant structs deny unknown fields, so parameters meant
//! for a sibling branch are rejected rather than dropped.
//!
//! Input is buffered as a `serde_json::Value` and replayed through
//! [`ValueDeserializer`], which is generic over the error type. Errors raised
//! for a nested union therefore keep their concrete type all the way up.
//! While a value is replayed, the keys and indices leading to it are kept in
//! a per-thread stack so that errors raised anywhere below can name their
//! full path through [`current_path`].

use std::cell::RefCell;
use std::marker::PhantomData;

use serde::de::{self, DeserializeOwned, DeserializeSeed, IntoDeserializer, Visitor};
use serde::forward_to_deserialize_any;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::Result;

/// Discriminator key used at every nesting level.
pub const TAG_KEY: &str = "model_type";

/// A closed set of tagged variants.
pub trait TaggedUnion {
    /// Legal tags, in declaration order
    const TAGS: &'static [&'static str];

    fn tag(&self) -> &'static str;
}

/// Pull the discriminator out of `value`, returning the canonical tag and the
/// remaining fields.
pub fn split_tag<E: de::Error>(
    value: Value,
    tags: &'static [&'static str],
    default: Option<&'static str>,
) -> std::result::Result<(&'static str, Map<String, Value>), E> {
    let mut map = match value {
        Value::Object(map) => map,
        other => {
            return Err(E::invalid_type(unexpected(&other), &"a tagged mapping"));
        }
    };
    let tag = match map.remove(TAG_KEY) {
        Some(Value::String(raw)) => match tags.iter().find(|t| t.eq_ignore_ascii_case(&raw)) {
            Some(tag) => *tag,
            None => return Err(E::unknown_variant(&raw, tags)),
        },
        Some(other) => {
            return Err(E::invalid_type(unexpected(&other), &"a string tag"));
        }
        None => match default {
            Some(tag) => tag,
            None => return Err(E::unknown_variant("", tags)),
        },
    };
    debug!(tag, "resolved variant");
    Ok((tag, map))
}

/// Deserialize a variant body with the discriminator already removed.
pub fn variant<T: DeserializeOwned, E: de::Error>(
    body: Map<String, Value>,
) -> std::result::Result<T, E> {
    T::deserialize(ValueDeserializer::<E>::new(Value::Object(body)))
}

/// Resolve a typed value from raw key-value input.
pub fn from_value<T: DeserializeOwned>(raw: Value) -> Result<T> {
    T::deserialize(ValueDeserializer::new(raw))
}

fn unexpected(value: &Value) -> de::Unexpected<'_> {
    match value {
        Value::Null => de::Unexpected::Unit,
        Value::Bool(b) => de::Unexpected::Bool(*b),
        Value::Number(n) => match n.as_f64() {
            Some(f) => de::Unexpected::Float(f),
            None => de::Unexpected::Other("number"),
        },
        Value::String(s) => de::Unexpected::Str(s),
        Value::Array(_) => de::Unexpected::Seq,
        Value::Object(_) => de::Unexpected::Map,
    }
}

/// Declare a closed tagged union.
///
/// ```ignore
/// tagged_union! {
///     /// Computational grid
///     pub enum Cgrid default "regular" {
///         "regular" => Regular(RegularCgrid),
///         "curvilinear" => Curvilinear(CurvilinearCgrid),
///     }
/// }
/// ```
#[macro_export]
macro_rules! tagged_union {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident $(default $default:literal)? {
            $( $tag:literal => $variant:ident($inner:ty) ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, serde::Serialize)]
        #[serde(tag = "model_type")]
        $vis enum $name {
            $( #[serde(rename = $tag)] $variant($inner), )+
        }

        impl $crate::tagged::TaggedUnion for $name {
            const TAGS: &'static [&'static str] = &[$($tag),+];

            fn tag(&self) -> &'static str {
                match self {
                    $( Self::$variant(_) => $tag, )+
                }
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(d: D) -> ::std::result::Result<Self, D::Error> {
                let default: Option<&'static str> = None $( .or(Some($default)) )?;
                let raw = <serde_json::Value as serde::Deserialize>::deserialize(d)?;
                let tags = <Self as $crate::tagged::TaggedUnion>::TAGS;
                let (tag, body) = $crate::tagged::split_tag::<D::Error>(raw, tags, default)?;
                match tag {
                    $( $tag => $crate::tagged::variant::<$inner, D::Error>(body).map(Self::$variant), )+
                    other => Err(<D::Error as serde::de::Error>::unknown_variant(other, tags)),
                }
            }
        }

        $(
            impl From<$inner> for $name {
                fn from(value: $inner) -> Self {
                    Self::$variant(value)
                }
            }
        )+
    };
}

/// Let a plain struct accept its own optional discriminator.
///
/// The struct derives serde with `#[serde(remote = "Self")]`; this macro
/// supplies the trait impls, stripping a matching `model_type` key before
/// handing the remaining fields to the derived code.
#[macro_export]
macro_rules! tagged_struct {
    ($name:ident, $tag:literal) => {
        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(d: D) -> ::std::result::Result<Self, D::Error> {
                let raw = <serde_json::Value as serde::Deserialize>::deserialize(d)?;
                let (_, body) = $crate::tagged::split_tag::<D::Error>(raw, &[$tag], Some($tag))?;
                $name::deserialize($crate::tagged::ValueDeserializer::<D::Error>::new(
                    serde_json::Value::Object(body),
                ))
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, s: S) -> ::std::result::Result<S::Ok, S::Error> {
                $name::serialize(self, s)
            }
        }
    };
}

// ============================================================================
// Path tracking
// ============================================================================

thread_local! {
    static PATH: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

/// Join path segments, indices (`[2]`) attaching without a dot.
pub fn join_path<S: AsRef<str>>(segments: &[S]) -> String {
    let mut path = String::new();
    for segment in segments.iter().map(AsRef::as_ref) {
        if segment.is_empty() {
            continue;
        }
        if !path.is_empty() && !segment.starts_with('[') {
            path.push('.');
        }
        path.push_str(segment);
    }
    path
}

/// Dotted path of the value being replayed, empty at the root.
pub fn current_path() -> String {
    PATH.with(|p| join_path(&p.borrow()))
}

/// One path segment, popped again when dropped.
struct Segment;

impl Segment {
    fn enter(name: String) -> Self {
        PATH.with(|p| p.borrow_mut().push(name));
        Segment
    }
}

impl Drop for Segment {
    fn drop(&mut self) {
        PATH.with(|p| {
            p.borrow_mut().pop();
        });
    }
}

// ============================================================================
// ValueDeserializer
// ============================================================================

/// Replays a buffered `serde_json::Value` with a caller-chosen error type.
pub struct ValueDeserializer<E> {
    value: Value,
    marker: PhantomData<E>,
}

impl<E> ValueDeserializer<E> {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            marker: PhantomData,
        }
    }
}

impl<'de, E: de::Error> IntoDeserializer<'de, E> for ValueDeserializer<E> {
    type Deserializer = Self;

    fn into_deserializer(self) -> Self {
        self
    }
}

struct Entries<E> {
    iter: serde_json::map::IntoIter,
    pending: Option<(String, Value)>,
    marker: PhantomData<E>,
}

impl<'de, E: de::Error> de::MapAccess<'de> for Entries<E> {
    type Error = E;

    fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> std::result::Result<Option<K::Value>, E> {
        match self.iter.next() {
            Some((key, value)) => {
                let out = seed.deserialize(IntoDeserializer::<'de, E>::into_deserializer(key.as_str()))?;
                self.pending = Some((key, value));
                Ok(Some(out))
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> std::result::Result<V::Value, E> {
        let (key, value) = self
            .pending
            .take()
            .ok_or_else(|| E::custom("map value requested before its key"))?;
        let _segment = Segment::enter(key);
        seed.deserialize(ValueDeserializer::new(value))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct Elements<E> {
    iter: std::iter::Enumerate<std::vec::IntoIter<Value>>,
    marker: PhantomData<E>,
}

impl<'de, E: de::Error> de::SeqAccess<'de> for Elements<E> {
    type Error = E;

    fn next_element_seed<T: DeserializeSeed<'de>>(&mut self, seed: T) -> std::result::Result<Option<T::Value>, E> {
        match self.iter.next() {
            Some((i, value)) => {
                let _segment = Segment::enter(format!("[{i}]"));
                seed.deserialize(ValueDeserializer::new(value)).map(Some)
            }
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

impl<'de, E: de::Error> de::Deserializer<'de> for ValueDeserializer<E> {
    type Error = E;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> std::result::Result<V::Value, E> {
        match self.value {
            Value::Null => visitor.visit_unit(),
            Value::Bool(b) => visitor.visit_bool(b),
            Value::Number(n) => {
                if let Some(u) = n.as_u64() {
                    visitor.visit_u64(u)
                } else if let Some(i) = n.as_i64() {
                    visitor.visit_i64(i)
                } else if let Some(f) = n.as_f64() {
                    visitor.visit_f64(f)
                } else {
                    Err(E::custom(format!("unrepresentable number {n}")))
                }
            }
            Value::String(s) => visitor.visit_string(s),
            Value::Array(items) => {
                let total = items.len();
                let mut seq = Elements::<E> {
                    iter: items.into_iter().enumerate(),
                    marker: PhantomData,
                };
                let out = visitor.visit_seq(&mut seq)?;
                match seq.iter.len() {
                    0 => Ok(out),
                    rest => Err(E::invalid_length(total, &format!("{} elements", total - rest).as_str())),
                }
            }
            Value::Object(map) => {
                let total = map.len();
                let mut access = Entries::<E> {
                    iter: map.into_iter(),
                    pending: None,
                    marker: PhantomData,
                };
                let out = visitor.visit_map(&mut access)?;
                match access.iter.len() {
                    0 => Ok(out),
                    rest => Err(E::invalid_length(total, &format!("{} entries", total - rest).as_str())),
                }
            }
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> std::result::Result<V::Value, E> {
        match self.value {
            Value::Null => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> std::result::Result<V::Value, E> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> std::result::Result<V::Value, E> {
        match self.value {
            Value::String(s) => {
                visitor.visit_enum(IntoDeserializer::<'de, E>::into_deserializer(s))
            }
            other => Err(E::invalid_type(unexpected(&other), &"a keyword string")),
        }
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple tuple_struct map struct
        identifier ignored_any
    }
}
