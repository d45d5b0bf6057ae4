// Async counterparts of `capture_go::network::{read_obj, write_obj}`, same framing.

use capture_go::network::{self, CommunicationError, HEADER_SIZE};
use futures_io::{AsyncRead, AsyncWrite};
use futures_util::{AsyncReadExt, AsyncWriteExt};
use serde::{Serialize, de};


pub async fn read_obj_async<T: de::DeserializeOwned>(
    reader: &mut (impl AsyncRead + Unpin),
) -> Result<T, CommunicationError> {
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header).await?;
    let len = network::decode_frame_len(&header)?;
    let mut body = vec![0; len];
    reader.read_exact(&mut body).await?;
    network::decode_frame_body(&body)
}

pub async fn write_obj_async(
    writer: &mut (impl AsyncWrite + Unpin), obj: &impl Serialize,
) -> Result<(), CommunicationError> {
    let frame = network::encode_frame(obj)?;
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}
