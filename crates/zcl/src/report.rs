use std::io::{Cursor, Read, Write};

use byteorder::{LE, ReadBytesExt, WriteBytesExt};
use packed_struct::prelude::*;

use crate::attr::ZclDataType;
use crate::error::{ZclError, ZclResult};

#[derive(PrimitiveEnum_u8, Debug, Clone, Copy, Eq, PartialEq)]
pub enum ZclStatus {
    Success = 0x00,
    Failure = 0x01,
    NotAuthorized = 0x7e,
    UnsupClusterCommand = 0x81,
    UnsupGeneralCommand = 0x82,
    UnsupManufClusterCommand = 0x83,
    UnsupManufGeneralCommand = 0x84,
    UnsupportedAttribute = 0x86,
    InvalidValue = 0x87,
    InvalidDataType = 0x8d,
    UnreportableAttribute = 0x8c,
    Timeout = 0x94,
}

/// Direction field of a reporting configuration record.
#[derive(PrimitiveEnum_u8, Debug, Clone, Copy, Eq, PartialEq)]
pub enum ZclReportDirection {
    /// The receiver of the command sends reports
    Reported = 0x00,
    /// The receiver of the command expects reports
    Received = 0x01,
}

/// One record of a "configure reporting" (0x06) command, in the
/// [`ZclReportDirection::Reported`] direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZclConfigReportRecord {
    pub attr: u16,
    pub dtype: ZclDataType,
    pub min_interval: u16,
    pub max_interval: u16,
    pub reportable_change: u32,
}

impl ZclConfigReportRecord {
    fn write(&self, wr: &mut impl Write) -> ZclResult<()> {
        let width = self
            .dtype
            .reportable_change_size()
            .ok_or(ZclError::UnreportableDataType(self.dtype))?;

        wr.write_u8(ZclReportDirection::Reported.to_primitive())?;
        wr.write_u16::<LE>(self.attr)?;
        wr.write_u8(self.dtype.to_primitive())?;
        wr.write_u16::<LE>(self.min_interval)?;
        wr.write_u16::<LE>(self.max_interval)?;

        // the change field has the width of the attribute type
        wr.write_all(&self.reportable_change.to_le_bytes()[..width])?;

        Ok(())
    }

    fn from_reader(rdr: &mut impl Read) -> ZclResult<Self> {
        let direction = rdr.read_u8()?;
        if ZclReportDirection::from_primitive(direction) != Some(ZclReportDirection::Reported) {
            return Err(ZclError::PackedStructError(PackingError::InvalidValue));
        }

        let attr = rdr.read_u16::<LE>()?;
        let raw = rdr.read_u8()?;
        let dtype = ZclDataType::from_primitive(raw).ok_or(ZclError::UnknownDataType(raw))?;
        let width = dtype
            .reportable_change_size()
            .ok_or(ZclError::UnreportableDataType(dtype))?;
        let min_interval = rdr.read_u16::<LE>()?;
        let max_interval = rdr.read_u16::<LE>()?;

        let mut change = [0u8; 4];
        rdr.read_exact(&mut change[..width])?;

        Ok(Self {
            attr,
            dtype,
            min_interval,
            max_interval,
            reportable_change: u32::from_le_bytes(change),
        })
    }
}

/// Payload of a "configure reporting" (0x06) command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZclConfigReport {
    pub records: Vec<ZclConfigReportRecord>,
}

impl ZclConfigReport {
    #[must_use]
    pub fn new(record: ZclConfigReportRecord) -> Self {
        Self {
            records: vec![record],
        }
    }

    pub fn pack(&self) -> ZclResult<Vec<u8>> {
        let mut res = vec![];
        for rec in &self.records {
            rec.write(&mut res)?;
        }
        Ok(res)
    }

    pub fn parse(data: &[u8]) -> ZclResult<Self> {
        let mut records = vec![];

        let mut cur = Cursor::new(data);
        while (cur.position() as usize) < data.len() {
            records.push(ZclConfigReportRecord::from_reader(&mut cur)?);
        }

        Ok(Self { records })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZclConfigReportStatus {
    pub status: u8,
    pub direction: u8,
    /// Absent when the device answered with the short "all succeeded" form
    pub attr: Option<u16>,
}

impl ZclConfigReportStatus {
    #[must_use]
    pub fn status(&self) -> Option<ZclStatus> {
        ZclStatus::from_primitive(self.status)
    }
}

/// Payload of a "configure reporting response" (0x07) command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZclConfigReportResp {
    pub records: Vec<ZclConfigReportStatus>,
}

impl ZclConfigReportResp {
    #[must_use]
    pub fn success() -> Self {
        Self {
            records: vec![ZclConfigReportStatus {
                status: ZclStatus::Success.to_primitive(),
                direction: ZclReportDirection::Reported.to_primitive(),
                attr: None,
            }],
        }
    }

    pub fn parse(data: &[u8]) -> ZclResult<Self> {
        if data.is_empty() {
            return Err(ZclError::Truncated {
                expected: 1,
                found: 0,
            });
        }

        if data.len() == 1 {
            return Ok(Self {
                records: vec![ZclConfigReportStatus {
                    status: data[0],
                    direction: ZclReportDirection::Reported.to_primitive(),
                    attr: None,
                }],
            });
        }

        if data.len() % 4 != 0 {
            return Err(ZclError::Truncated {
                expected: data.len().next_multiple_of(4),
                found: data.len(),
            });
        }

        let records = data
            .chunks_exact(4)
            .map(|rec| ZclConfigReportStatus {
                status: rec[0],
                direction: rec[1],
                attr: Some(u16::from_le_bytes([rec[2], rec[3]])),
            })
            .collect();

        Ok(Self { records })
    }

    pub fn pack(&self) -> ZclResult<Vec<u8>> {
        let mut res = vec![];
        for rec in &self.records {
            res.write_u8(rec.status)?;
            if let Some(attr) = rec.attr {
                res.write_u8(rec.direction)?;
                res.write_u16::<LE>(attr)?;
            }
        }
        Ok(res)
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.records
            .iter()
            .all(|rec| rec.status() == Some(ZclStatus::Success))
    }
}
