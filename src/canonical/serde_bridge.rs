//! Canonicalization for any `T: Serialize`.
//!
//! A `serde::Serializer` lowers the value into a shape tree over the same
//! closed set the [`Canonical`] trait uses, so `#[derive(Serialize)]` types
//! canonicalize without hand-written impls:
//!
//! - structs and struct variants become records
//! - tuple structs, newtype structs and tuple/newtype variants become records
//!   with positional field names (`0`, `1`, ...)
//! - unit variants become tagged symbols, `(Enum)Variant`
//! - `Option::None` and `()` become the null marker
//!
//! A `Serialize` impl that reports an error renders a placeholder for the
//! whole value.

use super::{Canonical, Canonicalizer, Scalar};
use serde::ser::{self, Serialize};
use std::fmt;

/// Adapter that lets any `Serialize` value take part in [`Canonical`] rendering.
pub struct Serde<'a, T: ?Sized>(pub &'a T);

impl<T: Serialize + ?Sized> Canonical for Serde<'_, T> {
    fn canonicalize(&self, out: &mut Canonicalizer) {
        match self.0.serialize(NodeSerializer) {
            Ok(node) => node.canonicalize(out),
            Err(Unsupported(msg)) => out.opaque(&msg),
        }
    }
}

/// Render a `Serialize` value into its canonical form.
pub fn canonicalize_serde<T: Serialize + ?Sized>(value: &T) -> String {
    super::canonicalize(&Serde(value))
}

#[derive(Debug)]
enum Node {
    Null,
    Bool(bool),
    Signed(&'static str, i128),
    Unsigned(&'static str, u128),
    F32(f32),
    F64(f64),
    Char(char),
    Str(String),
    Bytes(Vec<u8>),
    Symbol(&'static str, &'static str),
    Seq(Vec<Node>),
    Map(Vec<(Node, Node)>),
    Record(String, Vec<(String, Node)>),
}

impl Canonical for Node {
    fn canonicalize(&self, out: &mut Canonicalizer) {
        match self {
            Node::Null => out.null(),
            Node::Bool(b) => out.scalar(Scalar::Bool(*b)),
            Node::Signed(kind, n) => out.scalar(Scalar::Signed(*kind, *n)),
            Node::Unsigned(kind, n) => out.scalar(Scalar::Unsigned(*kind, *n)),
            Node::F32(f) => out.scalar(Scalar::F32(*f)),
            Node::F64(f) => out.scalar(Scalar::F64(*f)),
            Node::Char(c) => out.scalar(Scalar::Char(*c)),
            Node::Str(s) => out.scalar(Scalar::Str(s)),
            Node::Bytes(b) => out.scalar(Scalar::Bytes(b)),
            Node::Symbol(kind, name) => out.scalar(Scalar::Symbol { kind, name }),
            Node::Seq(items) => out.sequence(items.iter()),
            Node::Map(entries) => out.mapping(entries.iter().map(|(k, v)| (k, v))),
            Node::Record(name, fields) => {
                let fields: Vec<(&str, &dyn Canonical)> = fields
                    .iter()
                    .map(|(field, value)| (field.as_str(), value as &dyn Canonical))
                    .collect();
                out.record(name, &fields);
            }
        }
    }
}

#[derive(Debug)]
struct Unsupported(String);

impl fmt::Display for Unsupported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for Unsupported {}

impl ser::Error for Unsupported {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Unsupported(msg.to_string())
    }
}

struct NodeSerializer;

struct SeqBuilder {
    items: Vec<Node>,
}

struct MapBuilder {
    entries: Vec<(Node, Node)>,
    pending_key: Option<Node>,
}

struct RecordBuilder {
    name: String,
    fields: Vec<(String, Node)>,
}

impl RecordBuilder {
    fn new(name: String, len: usize) -> Self {
        Self {
            name,
            fields: Vec::with_capacity(len),
        }
    }

    fn push_positional<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Unsupported> {
        let node = value.serialize(NodeSerializer)?;
        self.fields.push((self.fields.len().to_string(), node));
        Ok(())
    }

    fn push_named<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), Unsupported> {
        let node = value.serialize(NodeSerializer)?;
        self.fields.push((key.to_string(), node));
        Ok(())
    }

    fn finish(self) -> Node {
        Node::Record(self.name, self.fields)
    }
}

fn variant_name(name: &str, variant: &str) -> String {
    format!("{}::{}", name, variant)
}

impl ser::Serializer for NodeSerializer {
    type Ok = Node;
    type Error = Unsupported;
    type SerializeSeq = SeqBuilder;
    type SerializeTuple = SeqBuilder;
    type SerializeTupleStruct = RecordBuilder;
    type SerializeTupleVariant = RecordBuilder;
    type SerializeMap = MapBuilder;
    type SerializeStruct = RecordBuilder;
    type SerializeStructVariant = RecordBuilder;

    fn serialize_bool(self, v: bool) -> Result<Node, Unsupported> {
        Ok(Node::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Node, Unsupported> {
        Ok(Node::Signed("i8", v.into()))
    }

    fn serialize_i16(self, v: i16) -> Result<Node, Unsupported> {
        Ok(Node::Signed("i16", v.into()))
    }

    fn serialize_i32(self, v: i32) -> Result<Node, Unsupported> {
        Ok(Node::Signed("i32", v.into()))
    }

    fn serialize_i64(self, v: i64) -> Result<Node, Unsupported> {
        Ok(Node::Signed("i64", v.into()))
    }

    fn serialize_i128(self, v: i128) -> Result<Node, Unsupported> {
        Ok(Node::Signed("i128", v))
    }

    fn serialize_u8(self, v: u8) -> Result<Node, Unsupported> {
        Ok(Node::Unsigned("u8", v.into()))
    }

    fn serialize_u16(self, v: u16) -> Result<Node, Unsupported> {
        Ok(Node::Unsigned("u16", v.into()))
    }

    fn serialize_u32(self, v: u32) -> Result<Node, Unsupported> {
        Ok(Node::Unsigned("u32", v.into()))
    }

    fn serialize_u64(self, v: u64) -> Result<Node, Unsupported> {
        Ok(Node::Unsigned("u64", v.into()))
    }

    fn serialize_u128(self, v: u128) -> Result<Node, Unsupported> {
        Ok(Node::Unsigned("u128", v))
    }

    fn serialize_f32(self, v: f32) -> Result<Node, Unsupported> {
        Ok(Node::F32(v))
    }

    fn serialize_f64(self, v: f64) -> Result<Node, Unsupported> {
        Ok(Node::F64(v))
    }

    fn serialize_char(self, v: char) -> Result<Node, Unsupported> {
        Ok(Node::Char(v))
    }

    fn serialize_str(self, v: &str) -> Result<Node, Unsupported> {
        Ok(Node::Str(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Node, Unsupported> {
        Ok(Node::Bytes(v.to_vec()))
    }

    fn serialize_none(self) -> Result<Node, Unsupported> {
        Ok(Node::Null)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<Node, Unsupported> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Node, Unsupported> {
        Ok(Node::Null)
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<Node, Unsupported> {
        Ok(Node::Record(name.to_string(), Vec::new()))
    }

    fn serialize_unit_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Node, Unsupported> {
        Ok(Node::Symbol(name, variant))
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        name: &'static str,
        value: &T,
    ) -> Result<Node, Unsupported> {
        let mut record = RecordBuilder::new(name.to_string(), 1);
        record.push_positional(value)?;
        Ok(record.finish())
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Node, Unsupported> {
        let mut record = RecordBuilder::new(variant_name(name, variant), 1);
        record.push_positional(value)?;
        Ok(record.finish())
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SeqBuilder, Unsupported> {
        Ok(SeqBuilder {
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SeqBuilder, Unsupported> {
        Ok(SeqBuilder {
            items: Vec::with_capacity(len),
        })
    }

    fn serialize_tuple_struct(
        self,
        name: &'static str,
        len: usize,
    ) -> Result<RecordBuilder, Unsupported> {
        Ok(RecordBuilder::new(name.to_string(), len))
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<RecordBuilder, Unsupported> {
        Ok(RecordBuilder::new(variant_name(name, variant), len))
    }

    fn serialize_map(self, len: Option<usize>) -> Result<MapBuilder, Unsupported> {
        Ok(MapBuilder {
            entries: Vec::with_capacity(len.unwrap_or(0)),
            pending_key: None,
        })
    }

    fn serialize_struct(
        self,
        name: &'static str,
        len: usize,
    ) -> Result<RecordBuilder, Unsupported> {
        Ok(RecordBuilder::new(name.to_string(), len))
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<RecordBuilder, Unsupported> {
        Ok(RecordBuilder::new(variant_name(name, variant), len))
    }
}

impl ser::SerializeSeq for SeqBuilder {
    type Ok = Node;
    type Error = Unsupported;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Unsupported> {
        self.items.push(value.serialize(NodeSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Node, Unsupported> {
        Ok(Node::Seq(self.items))
    }
}

impl ser::SerializeTuple for SeqBuilder {
    type Ok = Node;
    type Error = Unsupported;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Unsupported> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Node, Unsupported> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeMap for MapBuilder {
    type Ok = Node;
    type Error = Unsupported;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), Unsupported> {
        self.pending_key = Some(key.serialize(NodeSerializer)?);
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Unsupported> {
        let key = self
            .pending_key
            .take()
            .ok_or_else(|| Unsupported("map value serialized before its key".to_string()))?;
        self.entries.push((key, value.serialize(NodeSerializer)?));
        Ok(())
    }

    fn end(self) -> Result<Node, Unsupported> {
        Ok(Node::Map(self.entries))
    }
}

impl ser::SerializeTupleStruct for RecordBuilder {
    type Ok = Node;
    type Error = Unsupported;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Unsupported> {
        self.push_positional(value)
    }

    fn end(self) -> Result<Node, Unsupported> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleVariant for RecordBuilder {
    type Ok = Node;
    type Error = Unsupported;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Unsupported> {
        self.push_positional(value)
    }

    fn end(self) -> Result<Node, Unsupported> {
        Ok(self.finish())
    }
}

impl ser::SerializeStruct for RecordBuilder {
    type Ok = Node;
    type Error = Unsupported;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), Unsupported> {
        self.push_named(key, value)
    }

    fn end(self) -> Result<Node, Unsupported> {
        Ok(self.finish())
    }
}

impl ser::SerializeStructVariant for RecordBuilder {
    type Ok = Node;
    type Error = Unsupported;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), Unsupported> {
        self.push_named(key, value)
    }

    fn end(self) -> Result<Node, Unsupported> {
        Ok(self.finish())
    }
}
