//! [`Canonical`] implementations for standard library types and `serde_json::Value`.

use super::{Canonical, Canonicalizer, Scalar};
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

macro_rules! signed {
    ($($t:ty),*) => {$(
        impl Canonical for $t {
            fn canonicalize(&self, out: &mut Canonicalizer) {
                out.scalar(Scalar::Signed(stringify!($t), i128::from(*self)));
            }
        }
    )*};
}

macro_rules! unsigned {
    ($($t:ty),*) => {$(
        impl Canonical for $t {
            fn canonicalize(&self, out: &mut Canonicalizer) {
                out.scalar(Scalar::Unsigned(stringify!($t), u128::from(*self)));
            }
        }
    )*};
}

signed!(i8, i16, i32, i64, i128);
unsigned!(u8, u16, u32, u64, u128);

impl Canonical for isize {
    fn canonicalize(&self, out: &mut Canonicalizer) {
        out.scalar(Scalar::Signed("isize", *self as i128));
    }
}

impl Canonical for usize {
    fn canonicalize(&self, out: &mut Canonicalizer) {
        out.scalar(Scalar::Unsigned("usize", *self as u128));
    }
}

impl Canonical for f32 {
    fn canonicalize(&self, out: &mut Canonicalizer) {
        out.scalar(Scalar::F32(*self));
    }
}

impl Canonical for f64 {
    fn canonicalize(&self, out: &mut Canonicalizer) {
        out.scalar(Scalar::F64(*self));
    }
}

impl Canonical for bool {
    fn canonicalize(&self, out: &mut Canonicalizer) {
        out.scalar(Scalar::Bool(*self));
    }
}

impl Canonical for char {
    fn canonicalize(&self, out: &mut Canonicalizer) {
        out.scalar(Scalar::Char(*self));
    }
}

impl Canonical for str {
    fn canonicalize(&self, out: &mut Canonicalizer) {
        out.scalar(Scalar::Str(self));
    }
}

impl Canonical for String {
    fn canonicalize(&self, out: &mut Canonicalizer) {
        out.scalar(Scalar::Str(self));
    }
}

impl Canonical for Cow<'_, str> {
    fn canonicalize(&self, out: &mut Canonicalizer) {
        out.scalar(Scalar::Str(self));
    }
}

impl Canonical for Path {
    fn canonicalize(&self, out: &mut Canonicalizer) {
        out.scalar(Scalar::Str(&self.to_string_lossy()));
    }
}

impl Canonical for PathBuf {
    fn canonicalize(&self, out: &mut Canonicalizer) {
        Canonical::canonicalize(self.as_path(), out);
    }
}

impl Canonical for () {
    fn canonicalize(&self, out: &mut Canonicalizer) {
        out.null();
    }
}

// Indirection: rendered as the pointee.

impl<T: Canonical + ?Sized> Canonical for &T {
    fn canonicalize(&self, out: &mut Canonicalizer) {
        (**self).canonicalize(out);
    }
}

impl<T: Canonical + ?Sized> Canonical for &mut T {
    fn canonicalize(&self, out: &mut Canonicalizer) {
        (**self).canonicalize(out);
    }
}

impl<T: Canonical + ?Sized> Canonical for Box<T> {
    fn canonicalize(&self, out: &mut Canonicalizer) {
        (**self).canonicalize(out);
    }
}

impl<T: Canonical + ?Sized> Canonical for Rc<T> {
    fn canonicalize(&self, out: &mut Canonicalizer) {
        (**self).canonicalize(out);
    }
}

impl<T: Canonical + ?Sized> Canonical for Arc<T> {
    fn canonicalize(&self, out: &mut Canonicalizer) {
        (**self).canonicalize(out);
    }
}

impl<T: Canonical> Canonical for Option<T> {
    fn canonicalize(&self, out: &mut Canonicalizer) {
        match self {
            Some(value) => value.canonicalize(out),
            None => out.null(),
        }
    }
}

// Sequences: capacity and backing storage never show up in the output.

impl<T: Canonical> Canonical for [T] {
    fn canonicalize(&self, out: &mut Canonicalizer) {
        out.sequence(self.iter());
    }
}

impl<T: Canonical, const N: usize> Canonical for [T; N] {
    fn canonicalize(&self, out: &mut Canonicalizer) {
        out.sequence(self.iter());
    }
}

impl<T: Canonical> Canonical for Vec<T> {
    fn canonicalize(&self, out: &mut Canonicalizer) {
        out.sequence(self.iter());
    }
}

impl<T: Canonical> Canonical for VecDeque<T> {
    fn canonicalize(&self, out: &mut Canonicalizer) {
        out.sequence(self.iter());
    }
}

// Mappings and sets: iteration order never shows up in the output.

impl<K: Canonical, V: Canonical, S> Canonical for HashMap<K, V, S> {
    fn canonicalize(&self, out: &mut Canonicalizer) {
        out.mapping(self.iter());
    }
}

impl<K: Canonical, V: Canonical> Canonical for BTreeMap<K, V> {
    fn canonicalize(&self, out: &mut Canonicalizer) {
        out.mapping(self.iter());
    }
}

impl<T: Canonical, S> Canonical for HashSet<T, S> {
    fn canonicalize(&self, out: &mut Canonicalizer) {
        out.set(self.iter());
    }
}

impl<T: Canonical> Canonical for BTreeSet<T> {
    fn canonicalize(&self, out: &mut Canonicalizer) {
        out.set(self.iter());
    }
}

macro_rules! tuple {
    ($($name:ident $idx:tt),+) => {
        impl<$($name: Canonical),+> Canonical for ($($name,)+) {
            fn canonicalize(&self, out: &mut Canonicalizer) {
                let items: &[&dyn Canonical] = &[$(&self.$idx),+];
                out.sequence(items.iter().copied());
            }
        }
    };
}

tuple!(A 0);
tuple!(A 0, B 1);
tuple!(A 0, B 1, C 2);
tuple!(A 0, B 1, C 2, D 3);
tuple!(A 0, B 1, C 2, D 3, E 4);
tuple!(A 0, B 1, C 2, D 3, E 4, F 5);

impl Canonical for serde_json::Value {
    fn canonicalize(&self, out: &mut Canonicalizer) {
        use serde_json::Value;
        match self {
            Value::Null => out.null(),
            Value::Bool(b) => out.scalar(Scalar::Bool(*b)),
            Value::Number(n) => {
                // Same precedence as serde_json's Serialize, so both entry points agree.
                if let Some(u) = n.as_u64() {
                    out.scalar(Scalar::Unsigned("u64", u128::from(u)));
                } else if let Some(i) = n.as_i64() {
                    out.scalar(Scalar::Signed("i64", i128::from(i)));
                } else if let Some(f) = n.as_f64() {
                    out.scalar(Scalar::F64(f));
                } else {
                    out.opaque(&n.to_string());
                }
            }
            Value::String(s) => out.scalar(Scalar::Str(s)),
            Value::Array(items) => out.sequence(items.iter()),
            Value::Object(map) => out.mapping(map.iter()),
        }
    }
}
