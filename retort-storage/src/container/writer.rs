//! Container file encoder.

use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};
use tracing::debug;

use retort_core::error::{Error, Result};

use crate::container::types::{
    Entry, Group, Payload, CONTAINER_MAGIC, CONTAINER_VERSION, MAX_ARRAY_ELEMENTS,
};

/// Serialize the whole tree to `path`, replacing any previous file.
pub(crate) fn write_container(root: &Group, path: &Path, sync: bool) -> Result<()> {
    let mut body = Vec::new();
    encode_group(root, &mut body)?;

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;
    let mut writer = BufWriter::new(file);

    writer.write_all(CONTAINER_MAGIC)?;
    writer.write_u32::<LittleEndian>(CONTAINER_VERSION)?;
    writer.write_all(&body)?;
    writer.write_u32::<LittleEndian>(crc32fast::hash(&body))?;
    writer.flush()?;
    if sync {
        writer.get_ref().sync_all()?;
    }

    debug!(
        path = %path.display(),
        bytes = body.len(),
        datasets = root.dataset_count(),
        "container saved"
    );
    Ok(())
}

fn encode_group(group: &Group, buf: &mut Vec<u8>) -> Result<()> {
    buf.write_u32::<LittleEndian>(group.children.len() as u32)?;
    for (name, entry) in &group.children {
        encode_name(name, buf)?;
        match entry {
            Entry::Group(g) => {
                buf.write_u8(0)?;
                encode_group(g, buf)?;
            }
            Entry::Dataset(p) => {
                buf.write_u8(1)?;
                encode_payload(p, buf)?;
            }
        }
    }
    Ok(())
}

fn encode_name(name: &str, buf: &mut Vec<u8>) -> Result<()> {
    let bytes = name.as_bytes();
    if bytes.len() > u16::MAX as usize {
        return Err(Error::Container {
            message: format!("entry name too long: {} bytes", bytes.len()),
        });
    }
    buf.write_u16::<LittleEndian>(bytes.len() as u16)?;
    buf.write_all(bytes)?;
    Ok(())
}

fn encode_payload(payload: &Payload, buf: &mut Vec<u8>) -> Result<()> {
    buf.write_u8(payload.kind().as_byte())?;
    match payload {
        Payload::Bool(b) => buf.write_u8(u8::from(*b))?,
        Payload::Int(i) => buf.write_i64::<LittleEndian>(*i)?,
        Payload::Float(f) => buf.write_f64::<LittleEndian>(*f)?,
        Payload::Str(s) => encode_string(s, buf)?,
        Payload::IntArray { shape, data } => {
            encode_shape(shape, data.len(), buf)?;
            for v in data {
                buf.write_i64::<LittleEndian>(*v)?;
            }
        }
        Payload::FloatArray { shape, data } => {
            encode_shape(shape, data.len(), buf)?;
            for v in data {
                buf.write_f64::<LittleEndian>(*v)?;
            }
        }
        Payload::StrArray { shape, data } => {
            encode_shape(shape, data.len(), buf)?;
            for s in data {
                encode_string(s, buf)?;
            }
        }
    }
    Ok(())
}

fn encode_string(s: &str, buf: &mut Vec<u8>) -> Result<()> {
    let bytes = s.as_bytes();
    if bytes.len() > u32::MAX as usize {
        return Err(Error::Container {
            message: format!("string payload too long: {} bytes", bytes.len()),
        });
    }
    buf.write_u32::<LittleEndian>(bytes.len() as u32)?;
    buf.write_all(bytes)?;
    Ok(())
}

fn encode_shape(shape: &[u32], element_count: usize, buf: &mut Vec<u8>) -> Result<()> {
    let expected: usize = shape
        .iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d as usize))
        .unwrap_or(usize::MAX);
    if expected != element_count || element_count > MAX_ARRAY_ELEMENTS {
        return Err(Error::Container {
            message: format!(
                "array shape {:?} does not match {} elements",
                shape, element_count
            ),
        });
    }
    if shape.len() > u8::MAX as usize {
        return Err(Error::Container {
            message: format!("too many array dimensions: {}", shape.len()),
        });
    }
    buf.write_u8(shape.len() as u8)?;
    for dim in shape {
        buf.write_u32::<LittleEndian>(*dim)?;
    }
    Ok(())
}
