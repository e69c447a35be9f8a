//! Structural canonicalization
//!
//! Renders structured values into a deterministic text form used as hashing
//! input. Values describe themselves through the [`Canonical`] visitor trait
//! using a closed set of shapes: null, scalar, sequence, mapping, set and
//! record. Optional indirection (`Option`, references, `Box`, `Rc`, `Arc`) is
//! dereferenced in place, so two values that hold equal data behind different
//! allocations render identically.
//!
//! Canonicalization never fails. Shapes that cannot be described render a
//! deterministic placeholder instead.
//!
//! Cyclic graphs are not detected; callers must pass acyclic values.

mod impls;
mod serde_bridge;

pub use serde_bridge::{canonicalize_serde, Serde};

use std::fmt::Write;

/// Marker rendered for absent values.
pub const NULL_MARKER: &str = "<nil>";

/// A value that can describe its structure to a [`Canonicalizer`].
pub trait Canonical {
    fn canonicalize(&self, out: &mut Canonicalizer);
}

/// Leaf values. Every scalar carries a type tag so `1u8` and `1i64` differ.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar<'a> {
    Bool(bool),
    Signed(&'static str, i128),
    Unsigned(&'static str, u128),
    F32(f32),
    F64(f64),
    Char(char),
    Str(&'a str),
    Bytes(&'a [u8]),
    /// A named constant such as a unit enum variant: `(kind)name`.
    Symbol { kind: &'a str, name: &'a str },
}

/// Accumulates the canonical text of one value.
#[derive(Debug, Default)]
pub struct Canonicalizer {
    buf: String,
}

impl Canonicalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume the canonicalizer and return the rendered text.
    pub fn finish(self) -> String {
        self.buf
    }

    /// Render a value into its own buffer.
    fn render<T: Canonical + ?Sized>(value: &T) -> String {
        let mut out = Canonicalizer::new();
        value.canonicalize(&mut out);
        out.finish()
    }

    pub fn null(&mut self) {
        self.buf.push_str(NULL_MARKER);
    }

    pub fn scalar(&mut self, scalar: Scalar<'_>) {
        // Writing into a String cannot fail.
        let _ = match scalar {
            Scalar::Bool(b) => write!(self.buf, "(bool){}", b),
            Scalar::Signed(kind, n) => write!(self.buf, "({}){}", kind, n),
            Scalar::Unsigned(kind, n) => write!(self.buf, "({}){}", kind, n),
            Scalar::F32(f) => write!(self.buf, "(f32){:?}", f),
            Scalar::F64(f) => write!(self.buf, "(f64){:?}", f),
            Scalar::Char(c) => write!(self.buf, "(char){:?}", c),
            Scalar::Str(s) => write!(self.buf, "(string){:?}", s),
            Scalar::Bytes(b) => write!(self.buf, "(bytes){}", hex::encode(b)),
            Scalar::Symbol { kind, name } => {
                self.buf.push('(');
                self.name(kind);
                self.buf.push(')');
                self.name(name);
                Ok(())
            }
        };
    }

    /// Ordered sequence: `[a,b,c]`.
    pub fn sequence<'a, T, I>(&mut self, items: I)
    where
        T: Canonical + ?Sized + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        self.buf.push('[');
        for (i, item) in items.into_iter().enumerate() {
            if i > 0 {
                self.buf.push(',');
            }
            item.canonicalize(self);
        }
        self.buf.push(']');
    }

    /// Key-unordered mapping: `{k:v,...}`, entries sorted by rendered key.
    pub fn mapping<'a, K, V, I>(&mut self, entries: I)
    where
        K: Canonical + ?Sized + 'a,
        V: Canonical + ?Sized + 'a,
        I: IntoIterator<Item = (&'a K, &'a V)>,
    {
        let rendered = entries
            .into_iter()
            .map(|(k, v)| (Self::render(k), Self::render(v)))
            .collect();
        self.write_sorted_entries(rendered);
    }

    /// Unordered set: rendered as a mapping whose values are absent.
    pub fn set<'a, T, I>(&mut self, items: I)
    where
        T: Canonical + ?Sized + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        let rendered = items
            .into_iter()
            .map(|item| (Self::render(item), NULL_MARKER.to_string()))
            .collect();
        self.write_sorted_entries(rendered);
    }

    /// Named-field record: `Name{field:value,...}` in the given field order.
    pub fn record(&mut self, name: &str, fields: &[(&str, &dyn Canonical)]) {
        self.name(name);
        self.buf.push('{');
        for (i, (field, value)) in fields.iter().enumerate() {
            if i > 0 {
                self.buf.push(',');
            }
            self.name(field);
            self.buf.push(':');
            value.canonicalize(self);
        }
        self.buf.push('}');
    }

    /// Deterministic placeholder for shapes that cannot be described.
    pub fn opaque(&mut self, description: &str) {
        let _ = write!(self.buf, "<unsupported:{}>", description);
    }

    /// Identifier paths (`Wheel`, `Shape::Circle`, `0`) are written bare;
    /// any other name is debug-quoted so it cannot forge structure.
    fn name(&mut self, name: &str) {
        if is_plain_name(name) {
            self.buf.push_str(name);
        } else {
            let _ = write!(self.buf, "{:?}", name);
        }
    }

    fn write_sorted_entries(&mut self, mut entries: Vec<(String, String)>) {
        entries.sort();
        self.buf.push('{');
        for (i, (k, v)) in entries.iter().enumerate() {
            if i > 0 {
                self.buf.push(',');
            }
            self.buf.push_str(k);
            self.buf.push(':');
            self.buf.push_str(v);
        }
        self.buf.push('}');
    }
}

fn is_plain_name(name: &str) -> bool {
    name.split("::").all(|segment| {
        !segment.is_empty() && segment.chars().all(|c| c.is_alphanumeric() || c == '_')
    })
}

/// Render any value into its canonical form.
pub fn canonicalize<T: Canonical + ?Sized>(value: &T) -> String {
    Canonicalizer::render(value)
}
