//! Container file decoder.

use std::io::{Cursor, Read};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};

use retort_core::error::{Error, Result};

use crate::container::types::{
    Entry, Group, Payload, PayloadKind, CONTAINER_MAGIC, CONTAINER_VERSION, HEADER_SIZE,
    MAX_ARRAY_ELEMENTS, MAX_GROUP_DEPTH, TRAILER_SIZE,
};

/// Read and validate a container file, reconstructing the full tree.
pub(crate) fn read_container(path: &Path) -> Result<Group> {
    let data = std::fs::read(path)?;
    if data.len() < HEADER_SIZE + TRAILER_SIZE {
        return Err(Error::Container {
            message: format!("container file too small: {} bytes", data.len()),
        });
    }

    let mut header = Cursor::new(&data[..HEADER_SIZE]);
    let mut magic = [0u8; 8];
    header.read_exact(&mut magic)?;
    if &magic != CONTAINER_MAGIC {
        return Err(Error::Container {
            message: "invalid container magic number".to_string(),
        });
    }
    let version = header.read_u32::<LittleEndian>()?;
    if version != CONTAINER_VERSION {
        return Err(Error::Container {
            message: format!("unsupported container version: {version}"),
        });
    }

    let body = &data[HEADER_SIZE..data.len() - TRAILER_SIZE];
    let stored_crc = Cursor::new(&data[data.len() - TRAILER_SIZE..]).read_u32::<LittleEndian>()?;
    let actual_crc = crc32fast::hash(body);
    if stored_crc != actual_crc {
        return Err(Error::Container {
            message: format!("checksum mismatch: stored {stored_crc:08x}, actual {actual_crc:08x}"),
        });
    }

    let mut cursor = Cursor::new(body);
    let root = decode_group(&mut cursor, 0)?;
    if (cursor.position() as usize) != body.len() {
        return Err(Error::Container {
            message: format!(
                "trailing bytes after container body: {} unread",
                body.len() - cursor.position() as usize
            ),
        });
    }
    Ok(root)
}

fn decode_group(cursor: &mut Cursor<&[u8]>, depth: usize) -> Result<Group> {
    if depth > MAX_GROUP_DEPTH {
        return Err(Error::Container {
            message: format!("group nesting deeper than {MAX_GROUP_DEPTH}"),
        });
    }
    let count = cursor.read_u32::<LittleEndian>()?;
    let mut group = Group::default();
    for _ in 0..count {
        let name = decode_name(cursor)?;
        let entry = match cursor.read_u8()? {
            0 => Entry::Group(decode_group(cursor, depth + 1)?),
            1 => Entry::Dataset(decode_payload(cursor)?),
            other => {
                return Err(Error::Container {
                    message: format!("unknown entry kind byte: 0x{other:02x}"),
                })
            }
        };
        group.children.insert(name, entry);
    }
    Ok(group)
}

fn decode_name(cursor: &mut Cursor<&[u8]>) -> Result<String> {
    let len = cursor.read_u16::<LittleEndian>()? as usize;
    decode_utf8(cursor, len)
}

fn decode_payload(cursor: &mut Cursor<&[u8]>) -> Result<Payload> {
    let tag = cursor.read_u8()?;
    let kind = PayloadKind::from_byte(tag).ok_or_else(|| Error::Container {
        message: format!("unknown payload type tag: 0x{tag:02x}"),
    })?;
    let payload = match kind {
        PayloadKind::Bool => Payload::Bool(cursor.read_u8()? != 0),
        PayloadKind::Int => Payload::Int(cursor.read_i64::<LittleEndian>()?),
        PayloadKind::Float => Payload::Float(cursor.read_f64::<LittleEndian>()?),
        PayloadKind::Str => {
            let len = cursor.read_u32::<LittleEndian>()? as usize;
            Payload::Str(decode_utf8(cursor, len)?)
        }
        PayloadKind::IntArray => {
            let (shape, n) = decode_shape(cursor)?;
            let mut data = Vec::with_capacity(n);
            for _ in 0..n {
                data.push(cursor.read_i64::<LittleEndian>()?);
            }
            Payload::IntArray { shape, data }
        }
        PayloadKind::FloatArray => {
            let (shape, n) = decode_shape(cursor)?;
            let mut data = Vec::with_capacity(n);
            for _ in 0..n {
                data.push(cursor.read_f64::<LittleEndian>()?);
            }
            Payload::FloatArray { shape, data }
        }
        PayloadKind::StrArray => {
            let (shape, n) = decode_shape(cursor)?;
            let mut data = Vec::with_capacity(n);
            for _ in 0..n {
                let len = cursor.read_u32::<LittleEndian>()? as usize;
                data.push(decode_utf8(cursor, len)?);
            }
            Payload::StrArray { shape, data }
        }
    };
    Ok(payload)
}

fn decode_shape(cursor: &mut Cursor<&[u8]>) -> Result<(Vec<u32>, usize)> {
    let ndim = cursor.read_u8()? as usize;
    let mut shape = Vec::with_capacity(ndim);
    for _ in 0..ndim {
        shape.push(cursor.read_u32::<LittleEndian>()?);
    }
    let count = shape
        .iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d as usize))
        .filter(|&n| n <= MAX_ARRAY_ELEMENTS)
        .ok_or_else(|| Error::Container {
            message: format!("array shape {shape:?} exceeds element limit"),
        })?;
    Ok((shape, count))
}

fn decode_utf8(cursor: &mut Cursor<&[u8]>, len: usize) -> Result<String> {
    let remaining = cursor.get_ref().len() - cursor.position() as usize;
    if len > remaining {
        return Err(Error::Container {
            message: format!("truncated string: {len} bytes declared, {remaining} available"),
        });
    }
    let mut bytes = vec![0u8; len];
    cursor.read_exact(&mut bytes)?;
    String::from_utf8(bytes).map_err(|e| Error::Container {
        message: format!("invalid UTF-8 in container: {e}"),
    })
}
