use std::io::Cursor;

use crate::error::ZclResult;
use crate::frame::ZclFrame;

/// Outbound ZCL command, addressed to a cluster on the remote device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZclRequest {
    pub cluster: u16,
    pub frame: ZclFrame,
    pub payload: Vec<u8>,
}

impl ZclRequest {
    #[must_use]
    pub const fn new(cluster: u16, frame: ZclFrame, payload: Vec<u8>) -> Self {
        Self {
            cluster,
            frame,
            payload,
        }
    }

    /// Full over-the-air bytes: frame header followed by payload.
    pub fn to_bytes(&self) -> ZclResult<Vec<u8>> {
        let mut res = self.frame.pack()?;
        res.extend_from_slice(&self.payload);
        Ok(res)
    }
}

/// Inbound ZCL command, as answered by the remote device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZclResponse {
    pub frame: ZclFrame,
    pub payload: Vec<u8>,
}

impl ZclResponse {
    #[must_use]
    pub const fn new(frame: ZclFrame, payload: Vec<u8>) -> Self {
        Self { frame, payload }
    }

    pub fn parse(data: &[u8]) -> ZclResult<Self> {
        let mut cur = Cursor::new(data);
        let frame = ZclFrame::parse(&mut cur)?;
        let payload = data[cur.position() as usize..].to_vec();
        Ok(Self { frame, payload })
    }
}
