//! Subcomponents: parameter bundles nested inside a command
//!
//! A subcomponent has no position of its own in the command file; it writes
//! its tokens into the [`TokenLine`](crate::render::TokenLine) of the command
//! that owns it.

pub mod base;
pub mod boundary;
pub mod numerics;
pub mod output;
pub mod physics;
pub mod readgrid;
pub mod spectrum;
pub mod startup;
pub mod time;

/// Declare a command fragment made of fixed keywords followed by optional
/// `key=value` parameters.
///
/// Every field is an `Option`; unset fields are not written. `field: f64 as
/// "key"` writes the field under a different keyword. A leading
/// `tagged "tag"` lets the struct accept its own `model_type` key.
macro_rules! keyword_params {
    (
        $(#[$meta:meta])*
        tagged $tag:literal pub struct $name:ident [$($kw:literal)*] { $($body:tt)* }
    ) => {
        keyword_params!(@declare [$(#[$meta])*] [#[serde(remote = "Self")]] $name [$($kw)*] { $($body)* });
        $crate::tagged_struct!($name, $tag);
    };
    (
        $(#[$meta:meta])*
        pub struct $name:ident [$($kw:literal)*] { $($body:tt)* }
    ) => {
        keyword_params!(@declare [$(#[$meta])*] [] $name [$($kw)*] { $($body)* });
    };
    (
        @declare [$(#[$meta:meta])*] [$(#[$extra:meta])*] $name:ident [$($kw:literal)*] {
            $( $field:ident : $ty:ty $(as $key:literal)? ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
        $(#[$extra])*
        #[serde(deny_unknown_fields)]
        pub struct $name {
            $( #[serde(default)] pub $field: Option<$ty>, )*
        }

        impl $name {
            pub fn write(&self, line: &mut $crate::render::TokenLine) {
                $( line.word($kw); )*
                $( line.kv_opt(keyword_params!(@key $field $($key)?), self.$field); )*
            }
        }
    };
    (@key $field:ident $key:literal) => {
        $key
    };
    (@key $field:ident) => {
        stringify!($field)
    };
}

pub(crate) use keyword_params;
