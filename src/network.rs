// Wire format: every message is a frame consisting of a 4-byte little-endian body length followed
// by a JSON body. Frames above `MAX_MESSAGE_SIZE` are rejected before the body is read.
//
// Improvement potential: Switch from JSON to a binary format.

use std::io;

use byteorder::{ByteOrder, LittleEndian};
use serde::{Serialize, de};


pub const PORT: u16 = 50008;

pub const HEADER_SIZE: usize = 4;

// Largest legitimate message is a snapshot, which is a few kilobytes.
pub const MAX_MESSAGE_SIZE: usize = 64 * 1024;

#[derive(Debug)]
pub enum CommunicationError {
    Io(io::Error),
    Serde(serde_json::Error),
    MessageTooLarge(usize),
    ConnectionClosed,
}

impl From<io::Error> for CommunicationError {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            CommunicationError::ConnectionClosed
        } else {
            CommunicationError::Io(err)
        }
    }
}

impl From<serde_json::Error> for CommunicationError {
    fn from(err: serde_json::Error) -> Self { CommunicationError::Serde(err) }
}

pub fn encode_frame(obj: &impl Serialize) -> Result<Vec<u8>, CommunicationError> {
    let body = serde_json::to_vec(obj)?;
    if body.len() > MAX_MESSAGE_SIZE {
        return Err(CommunicationError::MessageTooLarge(body.len()));
    }
    let mut frame = vec![0; HEADER_SIZE];
    LittleEndian::write_u32(&mut frame, body.len() as u32);
    frame.extend_from_slice(&body);
    Ok(frame)
}

pub fn decode_frame_len(header: &[u8; HEADER_SIZE]) -> Result<usize, CommunicationError> {
    let len = LittleEndian::read_u32(header) as usize;
    if len > MAX_MESSAGE_SIZE {
        return Err(CommunicationError::MessageTooLarge(len));
    }
    Ok(len)
}

pub fn decode_frame_body<T: de::DeserializeOwned>(body: &[u8]) -> Result<T, CommunicationError> {
    Ok(serde_json::from_slice(body)?)
}

pub fn write_obj(writer: &mut impl io::Write, obj: &impl Serialize) -> Result<(), CommunicationError> {
    writer.write_all(&encode_frame(obj)?)?;
    writer.flush()?;
    Ok(())
}

pub fn read_obj<T: de::DeserializeOwned>(
    reader: &mut impl io::Read,
) -> Result<T, CommunicationError> {
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header)?;
    let len = decode_frame_len(&header)?;
    let mut body = vec![0; len];
    reader.read_exact(&mut body)?;
    decode_frame_body(&body)
}
