//! # Call-Signature Keys
//!
//! Derives a stable, order-independent [`CacheKey`] from a call's positional
//! and named arguments.
//!
//! ## Key Layout
//!
//! ```text
//!   Args:  positional = [url, 3]        named = { retries: 2, mode: "fast" }
//!
//!   CacheKey parts:
//!   ┌──────────┬──────────┬──────────────┬──────────────────┬────────────────┐
//!   │ Value    │ Value    │ NamedMarker  │ Named("mode",..) │ Named("retries",..)
//!   │ "url"    │ 3        │              │ "fast"           │ 2              │
//!   └──────────┴──────────┴──────────────┴──────────────────┴────────────────┘
//!                         ▲              └── sorted by name ─────────────────┘
//!                         └── only present when named args exist
//! ```
//!
//! `NamedMarker` is a key part no argument value can produce, so a positional
//! tuple can never be mistaken for a named argument. Two calls produce equal
//! keys exactly when their positional sequences are equal and their named
//! argument sets are equal, whatever order the names were supplied in.
//!
//! ## Value Identity
//!
//! | `ArgValue`   | Identity                                      |
//! |--------------|-----------------------------------------------|
//! | `Int`/`UInt` | the integer; `Int(1)` and `UInt(1)` differ    |
//! | `Float`      | bit pattern after folding `-0.0` into `0.0`   |
//! | `Float(NaN)` | none: rejected with [`UnhashableArgument`]    |
//! | `Tuple`      | element-wise, recursively                     |
//!
//! ## Example Usage
//!
//! ```
//! use memokit::key::Args;
//!
//! let a = Args::new().arg("https://example.com").named("retries", 2).named("mode", "fast");
//! let b = Args::new().arg("https://example.com").named("mode", "fast").named("retries", 2);
//! assert_eq!(a.key().unwrap(), b.key().unwrap());
//! ```

use std::collections::BTreeMap;
use std::fmt;

use crate::error::UnhashableArgument;

/// A single call argument.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Unit,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    Tuple(Vec<ArgValue>),
}

macro_rules! arg_from {
    ($variant:ident, $target:ty: $($src:ty),+) => {
        $(
            impl From<$src> for ArgValue {
                #[inline]
                fn from(value: $src) -> Self {
                    ArgValue::$variant(<$target>::from(value))
                }
            }
        )+
    };
}

arg_from!(Int, i64: i8, i16, i32, i64);
arg_from!(UInt, u64: u8, u16, u32, u64);
arg_from!(Float, f64: f32, f64);
arg_from!(Bool, bool: bool);
arg_from!(Str, String: String, &str);

impl From<()> for ArgValue {
    fn from(_: ()) -> Self {
        ArgValue::Unit
    }
}

impl From<&[u8]> for ArgValue {
    fn from(value: &[u8]) -> Self {
        ArgValue::Bytes(value.to_vec())
    }
}

impl From<Vec<ArgValue>> for ArgValue {
    fn from(value: Vec<ArgValue>) -> Self {
        ArgValue::Tuple(value)
    }
}

/// Positional and named arguments of one call.
///
/// Named arguments keep the order they were supplied in; a repeated name
/// replaces the earlier value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    positional: Vec<ArgValue>,
    named: Vec<(String, ArgValue)>,
}

impl Args {
    /// Creates an empty argument list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a positional argument.
    pub fn arg(mut self, value: impl Into<ArgValue>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Sets a named argument, replacing any earlier value under `name`.
    pub fn named(mut self, name: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.named.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = value,
            None => self.named.push((name, value)),
        }
        self
    }

    pub fn positional(&self) -> &[ArgValue] {
        &self.positional
    }

    pub fn named_args(&self) -> &[(String, ArgValue)] {
        &self.named
    }

    /// Looks up a named argument.
    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.named
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    /// Builds the cache key for these arguments.
    pub fn key(&self) -> Result<CacheKey, UnhashableArgument> {
        KeyBuilder::build(&self.positional, &self.named)
    }
}

impl<T: Into<ArgValue>> FromIterator<T> for Args {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            positional: iter.into_iter().map(Into::into).collect(),
            named: Vec::new(),
        }
    }
}

/// Hashable form of an [`ArgValue`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum KeyAtom {
    Unit,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(u64),
    Str(Box<str>),
    Bytes(Box<[u8]>),
    Tuple(Box<[KeyAtom]>),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum KeyPart {
    Value(KeyAtom),
    NamedMarker,
    Named(Box<str>, KeyAtom),
}

/// Stable identity of one call's arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    parts: Box<[KeyPart]>,
}

impl CacheKey {
    /// Number of positional arguments that formed this key.
    pub fn positional_len(&self) -> usize {
        self.parts
            .iter()
            .take_while(|part| matches!(part, KeyPart::Value(_)))
            .count()
    }

    /// Names of the named arguments, in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().filter_map(|part| match part {
            KeyPart::Named(name, _) => Some(&**name),
            _ => None,
        })
    }
}

/// Builds [`CacheKey`]s from raw argument lists.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyBuilder;

impl KeyBuilder {
    /// Builds the key for `positional` and `named`.
    ///
    /// If `named` repeats a name, the last value wins. Fails with
    /// [`UnhashableArgument`] if any value (or tuple element) is a NaN float.
    pub fn build(
        positional: &[ArgValue],
        named: &[(String, ArgValue)],
    ) -> Result<CacheKey, UnhashableArgument> {
        let sorted: BTreeMap<&str, &ArgValue> = named
            .iter()
            .map(|(name, value)| (name.as_str(), value))
            .collect();

        let marker = usize::from(!sorted.is_empty());
        let mut parts = Vec::with_capacity(positional.len() + marker + sorted.len());

        for (index, value) in positional.iter().enumerate() {
            let atom = to_atom(value)
                .map_err(|reason| unhashable(format!("positional argument {index}"), reason))?;
            parts.push(KeyPart::Value(atom));
        }

        if !sorted.is_empty() {
            parts.push(KeyPart::NamedMarker);
            for (name, value) in sorted {
                let atom = to_atom(value)
                    .map_err(|reason| unhashable(format!("named argument `{name}`"), reason))?;
                parts.push(KeyPart::Named(name.into(), atom));
            }
        }

        Ok(CacheKey {
            parts: parts.into_boxed_slice(),
        })
    }
}

fn unhashable(position: String, reason: &'static str) -> UnhashableArgument {
    UnhashableArgument {
        position,
        reason: reason.to_string(),
    }
}

fn to_atom(value: &ArgValue) -> Result<KeyAtom, &'static str> {
    Ok(match value {
        ArgValue::Unit => KeyAtom::Unit,
        ArgValue::Bool(b) => KeyAtom::Bool(*b),
        ArgValue::Int(i) => KeyAtom::Int(*i),
        ArgValue::UInt(u) => KeyAtom::UInt(*u),
        ArgValue::Float(f) if f.is_nan() => return Err("NaN has no stable identity"),
        // -0.0 == 0.0, so both must share one bit pattern
        ArgValue::Float(f) if *f == 0.0 => KeyAtom::Float(0.0f64.to_bits()),
        ArgValue::Float(f) => KeyAtom::Float(f.to_bits()),
        ArgValue::Str(s) => KeyAtom::Str(s.as_str().into()),
        ArgValue::Bytes(b) => KeyAtom::Bytes(b.as_slice().into()),
        ArgValue::Tuple(items) => KeyAtom::Tuple(
            items
                .iter()
                .map(to_atom)
                .collect::<Result<Vec<_>, _>>()?
                .into_boxed_slice(),
        ),
    })
}

impl fmt::Display for KeyAtom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyAtom::Unit => f.write_str("()"),
            KeyAtom::Bool(b) => write!(f, "{b}"),
            KeyAtom::Int(i) => write!(f, "{i}"),
            KeyAtom::UInt(u) => write!(f, "{u}"),
            KeyAtom::Float(bits) => write!(f, "{:?}", f64::from_bits(*bits)),
            KeyAtom::Str(s) => write!(f, "{s:?}"),
            KeyAtom::Bytes(b) => write!(f, "b[{} bytes]", b.len()),
            KeyAtom::Tuple(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            },
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        let mut first = true;
        for part in self.parts.iter() {
            match part {
                KeyPart::Value(atom) => {
                    if !first {
                        f.write_str(", ")?;
                    }
                    write!(f, "{atom}")?;
                },
                KeyPart::NamedMarker => {
                    if !first {
                        f.write_str("; ")?;
                    }
                    first = true;
                    continue;
                },
                KeyPart::Named(name, atom) => {
                    if !first {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}={atom}")?;
                },
            }
            first = false;
        }
        f.write_str(")")
    }
}
