// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wire codec: encoding/decoding between [`Value`] and the boundary
//! representation.
//!
//! The wire format is little-endian with natural alignment, length-prefixed
//! strings and sequences, and a discriminant ahead of every enum/union
//! payload. It is self-describing only relative to a layout descriptor:
//! both sides must decode against the same registered shape.

mod discriminant;
mod tagged;

pub use discriminant::{decode_variant, encode_variant};

use crate::descriptor::{PrimitiveKind, SequenceDescriptor, TypeDescriptor, TypeKind};
use crate::error::Error;
use crate::handle::{HandleId, HandleRegistry, Side};
use crate::value::Value;
use std::collections::HashMap;

/// Encode a value against its descriptor.
pub fn encode(
    desc: &TypeDescriptor,
    value: &Value,
    handles: &HandleRegistry,
) -> Result<Vec<u8>, Error> {
    let mut encoder = WireEncoder::new(handles);
    encoder.encode_value(desc, value)?;
    Ok(encoder.into_bytes())
}

/// Decode a value against its descriptor.
///
/// Handles decoded anywhere inside the value are transferred to `dest`; if
/// decoding fails partway, every transfer already performed is rolled back
/// so the failure is atomic. Trailing bytes after the declared contents are
/// rejected.
pub fn decode(
    desc: &TypeDescriptor,
    bytes: &[u8],
    handles: &HandleRegistry,
    dest: Side,
) -> Result<Value, Error> {
    let mut decoder = WireDecoder::new(bytes, handles, dest);
    let result = decoder.decode_value(desc).and_then(|value| {
        if decoder.remaining() > 0 {
            Err(Error::PayloadShapeMismatch {
                type_name: desc.name.clone(),
                detail: format!("{} trailing bytes after declared contents", decoder.remaining()),
            })
        } else {
            Ok(value)
        }
    });
    if result.is_err() {
        decoder.rollback_transfers();
    }
    result
}

/// Encode an ordered sequence of homogeneous elements: u32 length header,
/// then each element in order.
pub fn encode_sequence(
    element: &TypeDescriptor,
    values: &[Value],
    handles: &HandleRegistry,
) -> Result<Vec<u8>, Error> {
    let mut encoder = WireEncoder::new(handles);
    encoder.encode_elements(element, values)?;
    Ok(encoder.into_bytes())
}

/// Decode a sequence encoded by [`encode_sequence`].
///
/// Element data that ends before the declared length, or extends past it,
/// fails with `LengthMismatch`. Handle transfers roll back on failure as in
/// [`decode`].
pub fn decode_sequence(
    element: &TypeDescriptor,
    bytes: &[u8],
    handles: &HandleRegistry,
    dest: Side,
) -> Result<Vec<Value>, Error> {
    let mut decoder = WireDecoder::new(bytes, handles, dest);
    let result = decoder.decode_elements(element).and_then(|values| {
        if decoder.remaining() > 0 {
            // Trailing bytes: the wire carried more than the header declared.
            Err(Error::LengthMismatch {
                expected: values.len(),
                got: values.len() + 1,
            })
        } else {
            Ok(values)
        }
    });
    if result.is_err() {
        decoder.rollback_transfers();
    }
    result
}

fn type_mismatch(expected: &str, value: &Value) -> Error {
    Error::TypeMismatch {
        expected: expected.into(),
        found: format!("{:?}", value),
    }
}

/// Wire encoder.
pub(crate) struct WireEncoder<'r> {
    buffer: Vec<u8>,
    handles: &'r HandleRegistry,
}

impl<'r> WireEncoder<'r> {
    fn new(handles: &'r HandleRegistry) -> Self {
        Self {
            buffer: Vec::new(),
            handles,
        }
    }

    fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    pub(crate) fn align(&mut self, alignment: usize) {
        let padding = (alignment - (self.buffer.len() % alignment)) % alignment;
        self.buffer.extend(std::iter::repeat_n(0, padding));
    }

    pub(crate) fn encode_value(
        &mut self,
        desc: &TypeDescriptor,
        value: &Value,
    ) -> Result<(), Error> {
        match &desc.kind {
            TypeKind::Primitive(p) => self.encode_primitive(value, *p),
            TypeKind::Struct(fields) => {
                let Value::Struct(map) = value else {
                    return Err(type_mismatch("struct", value));
                };
                for field in fields {
                    let field_value = map.get(&field.name).ok_or_else(|| {
                        Error::InvalidData(format!(
                            "missing field '{}' in '{}'",
                            field.name, desc.name
                        ))
                    })?;
                    self.encode_value(&field.type_desc, field_value)?;
                }
                Ok(())
            }
            TypeKind::Sequence(seq) => {
                let Value::Sequence(items) = value else {
                    return Err(type_mismatch("sequence", value));
                };
                self.check_bound(seq, items.len())?;
                self.encode_elements(&seq.element_type, items)
            }
            TypeKind::Enum(e) => discriminant::encode_enum(self, desc, e, value),
            TypeKind::Union(u) => tagged::encode_union(self, desc, u, value),
            TypeKind::Handle => {
                let Value::Handle(id) = value else {
                    return Err(type_mismatch("handle", value));
                };
                // Liveness check: a released handle must never be sent.
                self.handles.owner(*id)?;
                self.align(8);
                self.buffer.extend(&id.raw().to_le_bytes());
                Ok(())
            }
            TypeKind::Nested(inner) => self.encode_value(inner, value),
        }
    }

    fn check_bound(&self, seq: &SequenceDescriptor, len: usize) -> Result<(), Error> {
        if let Some(max) = seq.max_length {
            if len > max {
                return Err(Error::InvalidData(format!(
                    "sequence length {} exceeds bound {}",
                    len, max
                )));
            }
        }
        Ok(())
    }

    fn encode_elements(
        &mut self,
        element: &TypeDescriptor,
        items: &[Value],
    ) -> Result<(), Error> {
        self.align(4);
        self.buffer.extend(&(items.len() as u32).to_le_bytes());
        for item in items {
            self.encode_value(element, item)?;
        }
        Ok(())
    }

    fn encode_primitive(&mut self, value: &Value, kind: PrimitiveKind) -> Result<(), Error> {
        match (value, kind) {
            (Value::Bool(v), PrimitiveKind::Bool) => {
                self.buffer.push(u8::from(*v));
            }
            (Value::U8(v), PrimitiveKind::U8) => {
                self.buffer.push(*v);
            }
            (Value::U16(v), PrimitiveKind::U16) => {
                self.align(2);
                self.buffer.extend(&v.to_le_bytes());
            }
            (Value::U32(v), PrimitiveKind::U32) => {
                self.align(4);
                self.buffer.extend(&v.to_le_bytes());
            }
            (Value::U64(v), PrimitiveKind::U64) => {
                self.align(8);
                self.buffer.extend(&v.to_le_bytes());
            }
            (Value::I8(v), PrimitiveKind::I8) => {
                self.buffer.push(*v as u8);
            }
            (Value::I16(v), PrimitiveKind::I16) => {
                self.align(2);
                self.buffer.extend(&v.to_le_bytes());
            }
            (Value::I32(v), PrimitiveKind::I32) => {
                self.align(4);
                self.buffer.extend(&v.to_le_bytes());
            }
            (Value::I64(v), PrimitiveKind::I64) => {
                self.align(8);
                self.buffer.extend(&v.to_le_bytes());
            }
            (Value::F32(v), PrimitiveKind::F32) => {
                self.align(4);
                self.buffer.extend(&v.to_le_bytes());
            }
            (Value::F64(v), PrimitiveKind::F64) => {
                self.align(8);
                self.buffer.extend(&v.to_le_bytes());
            }
            (Value::String(s), PrimitiveKind::String { max_length }) => {
                if let Some(max) = max_length {
                    if s.len() > max {
                        return Err(Error::InvalidData("string exceeds bound".into()));
                    }
                }
                self.align(4);
                let bytes = s.as_bytes();
                // Length includes the nul terminator.
                self.buffer
                    .extend(&((bytes.len() + 1) as u32).to_le_bytes());
                self.buffer.extend(bytes);
                self.buffer.push(0);
            }
            _ => {
                return Err(Error::TypeMismatch {
                    expected: format!("{:?}", kind),
                    found: format!("{:?}", value),
                });
            }
        }
        Ok(())
    }

    /// Write a raw discriminant in the width of `kind`.
    pub(crate) fn encode_tag(&mut self, tag: i64, kind: PrimitiveKind) -> Result<(), Error> {
        let value = match kind {
            PrimitiveKind::U8 => Value::U8(tag as u8),
            PrimitiveKind::U16 => Value::U16(tag as u16),
            PrimitiveKind::U32 => Value::U32(tag as u32),
            PrimitiveKind::I8 => Value::I8(tag as i8),
            PrimitiveKind::I16 => Value::I16(tag as i16),
            PrimitiveKind::I32 => Value::I32(tag as i32),
            PrimitiveKind::I64 => Value::I64(tag),
            _ => {
                return Err(Error::InvalidData(format!(
                    "{:?} cannot carry a discriminant",
                    kind
                )))
            }
        };
        self.encode_primitive(&value, kind)
    }
}

/// Wire decoder.
pub(crate) struct WireDecoder<'a, 'r> {
    buffer: &'a [u8],
    offset: usize,
    handles: &'r HandleRegistry,
    dest: Side,
    /// Handle transfers performed so far: (id, previous owner). Undone in
    /// reverse order if the decode fails.
    transferred: Vec<(HandleId, Side)>,
}

impl<'a, 'r> WireDecoder<'a, 'r> {
    fn new(buffer: &'a [u8], handles: &'r HandleRegistry, dest: Side) -> Self {
        Self {
            buffer,
            offset: 0,
            handles,
            dest,
            transferred: Vec::new(),
        }
    }

    fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }

    pub(crate) fn align(&mut self, alignment: usize) {
        self.offset = (self.offset + alignment - 1) & !(alignment - 1);
    }

    fn read_bytes(&mut self, count: usize) -> Result<&'a [u8], Error> {
        if self.offset + count > self.buffer.len() {
            return Err(Error::BufferTooSmall {
                need: count,
                have: self.remaining(),
            });
        }
        let slice = &self.buffer[self.offset..self.offset + count];
        self.offset += count;
        Ok(slice)
    }

    fn rollback_transfers(&mut self) {
        for (id, previous) in self.transferred.drain(..).rev() {
            // The handle was live a moment ago; restoring the old owner can
            // only fail if another thread released it mid-decode, in which
            // case there is nothing left to restore.
            let _ = self.handles.transfer(id, previous);
        }
    }

    pub(crate) fn decode_value(&mut self, desc: &TypeDescriptor) -> Result<Value, Error> {
        match &desc.kind {
            TypeKind::Primitive(p) => self.decode_primitive(*p),
            TypeKind::Struct(fields) => {
                let mut map = HashMap::new();
                for field in fields {
                    let value = self.decode_value(&field.type_desc)?;
                    map.insert(field.name.clone(), value);
                }
                Ok(Value::Struct(map))
            }
            TypeKind::Sequence(seq) => {
                let items = self.decode_elements(&seq.element_type)?;
                if let Some(max) = seq.max_length {
                    if items.len() > max {
                        return Err(Error::InvalidData(format!(
                            "sequence length {} exceeds bound {}",
                            items.len(),
                            max
                        )));
                    }
                }
                Ok(Value::Sequence(items))
            }
            TypeKind::Enum(e) => discriminant::decode_enum(self, desc, e),
            TypeKind::Union(u) => tagged::decode_union(self, desc, u),
            TypeKind::Handle => {
                self.align(8);
                let bytes = self.read_bytes(8)?;
                let id = HandleId::from_raw(u64::from_le_bytes([
                    bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
                ]));
                // Receiving a handle takes ownership; the registry rejects
                // released or stale ids here.
                let previous = self.handles.transfer(id, self.dest)?;
                self.transferred.push((id, previous));
                Ok(Value::Handle(id))
            }
            TypeKind::Nested(inner) => self.decode_value(inner),
        }
    }

    fn decode_elements(&mut self, element: &TypeDescriptor) -> Result<Vec<Value>, Error> {
        self.align(4);
        let bytes = self.read_bytes(4)?;
        let len = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
        let mut items = Vec::with_capacity(len.min(4096));
        for i in 0..len {
            match self.decode_value(element) {
                Ok(value) => items.push(value),
                // The header promised more elements than the wire carries.
                Err(Error::BufferTooSmall { .. }) => {
                    return Err(Error::LengthMismatch {
                        expected: len,
                        got: i,
                    })
                }
                Err(e) => return Err(e),
            }
        }
        Ok(items)
    }

    fn decode_primitive(&mut self, kind: PrimitiveKind) -> Result<Value, Error> {
        match kind {
            PrimitiveKind::Bool => {
                let bytes = self.read_bytes(1)?;
                Ok(Value::Bool(bytes[0] != 0))
            }
            PrimitiveKind::U8 => {
                let bytes = self.read_bytes(1)?;
                Ok(Value::U8(bytes[0]))
            }
            PrimitiveKind::U16 => {
                self.align(2);
                let bytes = self.read_bytes(2)?;
                Ok(Value::U16(u16::from_le_bytes([bytes[0], bytes[1]])))
            }
            PrimitiveKind::U32 => {
                self.align(4);
                let bytes = self.read_bytes(4)?;
                Ok(Value::U32(u32::from_le_bytes([
                    bytes[0], bytes[1], bytes[2], bytes[3],
                ])))
            }
            PrimitiveKind::U64 => {
                self.align(8);
                let bytes = self.read_bytes(8)?;
                Ok(Value::U64(u64::from_le_bytes([
                    bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
                ])))
            }
            PrimitiveKind::I8 => {
                let bytes = self.read_bytes(1)?;
                Ok(Value::I8(bytes[0] as i8))
            }
            PrimitiveKind::I16 => {
                self.align(2);
                let bytes = self.read_bytes(2)?;
                Ok(Value::I16(i16::from_le_bytes([bytes[0], bytes[1]])))
            }
            PrimitiveKind::I32 => {
                self.align(4);
                let bytes = self.read_bytes(4)?;
                Ok(Value::I32(i32::from_le_bytes([
                    bytes[0], bytes[1], bytes[2], bytes[3],
                ])))
            }
            PrimitiveKind::I64 => {
                self.align(8);
                let bytes = self.read_bytes(8)?;
                Ok(Value::I64(i64::from_le_bytes([
                    bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
                ])))
            }
            PrimitiveKind::F32 => {
                self.align(4);
                let bytes = self.read_bytes(4)?;
                Ok(Value::F32(f32::from_le_bytes([
                    bytes[0], bytes[1], bytes[2], bytes[3],
                ])))
            }
            PrimitiveKind::F64 => {
                self.align(8);
                let bytes = self.read_bytes(8)?;
                Ok(Value::F64(f64::from_le_bytes([
                    bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
                ])))
            }
            PrimitiveKind::String { max_length } => {
                self.align(4);
                let len_bytes = self.read_bytes(4)?;
                let len =
                    u32::from_le_bytes([len_bytes[0], len_bytes[1], len_bytes[2], len_bytes[3]])
                        as usize;
                if let Some(max) = max_length {
                    if len > max + 1 {
                        return Err(Error::InvalidData("string exceeds bound".into()));
                    }
                }
                if len == 0 {
                    return Ok(Value::String(String::new()));
                }
                let str_bytes = self.read_bytes(len)?;
                // Drop the nul terminator.
                let actual_len = if str_bytes[len - 1] == 0 { len - 1 } else { len };
                let s = String::from_utf8(str_bytes[..actual_len].to_vec())?;
                Ok(Value::String(s))
            }
        }
    }

    /// Read a raw discriminant in the width of `kind`.
    pub(crate) fn decode_tag(&mut self, kind: PrimitiveKind) -> Result<i64, Error> {
        let value = self.decode_primitive(kind)?;
        match value {
            Value::U8(v) => Ok(i64::from(v)),
            Value::U16(v) => Ok(i64::from(v)),
            Value::U32(v) => Ok(i64::from(v)),
            Value::I8(v) => Ok(i64::from(v)),
            Value::I16(v) => Ok(i64::from(v)),
            Value::I32(v) => Ok(i64::from(v)),
            Value::I64(v) => Ok(v),
            _ => Err(Error::InvalidData(format!(
                "{:?} cannot carry a discriminant",
                kind
            ))),
        }
    }

    /// Map truncation inside a union payload to the shape-mismatch error the
    /// taxonomy prescribes.
    pub(crate) fn payload_scope<F>(&mut self, type_name: &str, f: F) -> Result<Value, Error>
    where
        F: FnOnce(&mut Self) -> Result<Value, Error>,
    {
        match f(self) {
            Err(Error::BufferTooSmall { need, have }) => Err(Error::PayloadShapeMismatch {
                type_name: type_name.into(),
                detail: format!("payload truncated: need {} bytes, have {}", need, have),
            }),
            other => other,
        }
    }
}
