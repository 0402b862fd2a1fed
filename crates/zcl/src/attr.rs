use std::fmt::Debug;
use std::io::{Cursor, Read};

use byteorder::{LE, ReadBytesExt};
use packed_struct::prelude::*;

use crate::error::{ZclError, ZclResult};

#[derive(PrimitiveEnum_u8, Debug, Clone, Copy, Eq, PartialEq)]
pub enum ZclCommand {
    ReadAttrib = 0x00,
    ReadAttribResp = 0x01,
    WriteAttrib = 0x02,
    WriteAttribUndiv = 0x03,
    WriteAttribResp = 0x04,
    WriteAttribNoResp = 0x05,
    ConfigReport = 0x06,
    ConfigReportResp = 0x07,
    ReadReportCfg = 0x08,
    ReadReportCfgResp = 0x09,
    ReportAttrib = 0x0a,
    DefaultResp = 0x0b,
    DiscAttrib = 0x0c,
    DiscAttribResp = 0x0d,
}

#[derive(PrimitiveEnum_u8, Debug, Clone, Copy, Eq, PartialEq)]
pub enum ZclDataType {
    /** Null data type */
    Null = 0x00,

    /** 8-bit value data type */
    Zcl8bit = 0x08,

    /** 16-bit value data type */
    Zcl16bit = 0x09,

    /** 32-bit value data type */
    Zcl32bit = 0x0b,

    /** Boolean data type */
    ZclBool = 0x10,

    /** 8-bit bitmap data type */
    Zcl8bitmap = 0x18,

    /** 16-bit bitmap data type */
    Zcl16bitmap = 0x19,

    /** 32-bit bitmap data type */
    Zcl32bitmap = 0x1b,

    /** Unsigned 8-bit value data type */
    ZclU8 = 0x20,

    /** Unsigned 16-bit value data type */
    ZclU16 = 0x21,

    /** Unsigned 32-bit value data type */
    ZclU32 = 0x23,

    /** Signed 16-bit value data type */
    ZclI16 = 0x29,

    /** Enumerated 8-bit value data type */
    ZclE8 = 0x30,

    /** Byte array data type */
    ZclBytearray = 0x41,

    /** Character string (array) data type */
    ZclCharstring = 0x42,

    /** IEEE address (U64) type */
    ZclIeeeaddr = 0xf0,

    /** Invalid data type */
    ZclInvalid = 0xff,
}

impl ZclDataType {
    /// Width in bytes of the "reportable change" field in a configure
    /// reporting record.
    ///
    /// Only analog types carry a reportable change; discrete types return
    /// `Some(0)`. Types that can never be reported return `None`.
    #[must_use]
    pub const fn reportable_change_size(self) -> Option<usize> {
        match self {
            Self::ZclU8 => Some(1),
            Self::ZclU16 | Self::ZclI16 => Some(2),
            Self::ZclU32 => Some(4),
            Self::Zcl8bit
            | Self::Zcl16bit
            | Self::Zcl32bit
            | Self::ZclBool
            | Self::Zcl8bitmap
            | Self::Zcl16bitmap
            | Self::Zcl32bitmap
            | Self::ZclE8
            | Self::ZclBytearray
            | Self::ZclCharstring
            | Self::ZclIeeeaddr => Some(0),
            Self::Null | Self::ZclInvalid => None,
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub enum ZclAttrValue {
    Null,
    X8(i8),
    X16(i16),
    X32(i32),
    Bool(bool),
    B8(u8),
    B16(u16),
    B32(u32),
    U8(u8),
    U16(u16),
    U32(u32),
    I16(i16),
    E8(u8),
    Bytes(Vec<u8>),
    String(String),
    IeeeAddr(u64),
}

impl ZclAttrValue {
    /// Returns the value as a `u32`, for the 32-bit integer types only.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub const fn as_u32(&self) -> Option<u32> {
        match self {
            Self::U32(val) | Self::B32(val) => Some(*val),
            Self::X32(val) => Some(*val as u32),
            _ => None,
        }
    }
}

impl Debug for ZclAttrValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => write!(f, "Null"),
            Self::X8(val) => write!(f, "x8:{val}"),
            Self::X16(val) => write!(f, "x16:{val}"),
            Self::X32(val) => write!(f, "x32:{val}"),
            Self::Bool(val) => write!(f, "bool:{val}"),
            Self::B8(val) => write!(f, "b8:{val:02X}"),
            Self::B16(val) => write!(f, "b16:{val:04X}"),
            Self::B32(val) => write!(f, "b32:{val:08X}"),
            Self::U8(val) => write!(f, "u8:{val:02X}"),
            Self::U16(val) => write!(f, "u16:{val:04X}"),
            Self::U32(val) => write!(f, "u32:{val:08X}"),
            Self::I16(val) => write!(f, "i16:{val:04X}"),
            Self::E8(val) => write!(f, "e8:{val:02X}"),
            Self::Bytes(val) => write!(f, "hex:{}", hex::encode(val)),
            Self::String(val) => write!(f, "str:{val}"),
            Self::IeeeAddr(val) => write!(f, "ieeeaddr {val:016x}"),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct ZclAttr {
    pub key: u16,
    pub value: ZclAttrValue,
}

impl Debug for ZclAttr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04x}:{:?}", self.key, self.value)
    }
}

impl ZclAttr {
    /// Read one `(attr id, data type, value)` record, as found in attribute
    /// reports.
    pub fn from_reader(rdr: &mut impl Read) -> ZclResult<Self> {
        let key = rdr.read_u16::<LE>()?;

        let raw = rdr.read_u8()?;
        let dtype = ZclDataType::from_primitive(raw).ok_or(ZclError::UnknownDataType(raw))?;

        let value = match dtype {
            ZclDataType::Null => ZclAttrValue::Null,
            ZclDataType::Zcl8bit => ZclAttrValue::X8(rdr.read_i8()?),
            ZclDataType::Zcl16bit => ZclAttrValue::X16(rdr.read_i16::<LE>()?),
            ZclDataType::Zcl32bit => ZclAttrValue::X32(rdr.read_i32::<LE>()?),
            ZclDataType::ZclBool => ZclAttrValue::Bool(rdr.read_u8()? != 0),
            ZclDataType::Zcl8bitmap => ZclAttrValue::B8(rdr.read_u8()?),
            ZclDataType::Zcl16bitmap => ZclAttrValue::B16(rdr.read_u16::<LE>()?),
            ZclDataType::Zcl32bitmap => ZclAttrValue::B32(rdr.read_u32::<LE>()?),
            ZclDataType::ZclU8 => ZclAttrValue::U8(rdr.read_u8()?),
            ZclDataType::ZclU16 => ZclAttrValue::U16(rdr.read_u16::<LE>()?),
            ZclDataType::ZclU32 => ZclAttrValue::U32(rdr.read_u32::<LE>()?),
            ZclDataType::ZclI16 => ZclAttrValue::I16(rdr.read_i16::<LE>()?),
            ZclDataType::ZclE8 => ZclAttrValue::E8(rdr.read_u8()?),
            ZclDataType::ZclBytearray => {
                let len = rdr.read_u8()?;
                let mut buf = vec![0; len as usize];
                rdr.read_exact(&mut buf)?;
                ZclAttrValue::Bytes(buf)
            }
            ZclDataType::ZclCharstring => {
                let len = rdr.read_u8()?;
                let mut buf = vec![0; len as usize];
                rdr.read_exact(&mut buf)?;
                ZclAttrValue::String(String::from_utf8(buf)?)
            }
            ZclDataType::ZclIeeeaddr => ZclAttrValue::IeeeAddr(rdr.read_u64::<LE>()?),
            ZclDataType::ZclInvalid => return Err(ZclError::UnknownDataType(raw)),
        };

        Ok(Self { key, value })
    }
}

/// Payload of a "report attributes" (0x0a) command.
#[derive(Debug, Clone)]
pub struct ZclReportAttr {
    pub attr: Vec<ZclAttr>,
}

impl ZclReportAttr {
    pub fn parse(data: &[u8]) -> ZclResult<Self> {
        let mut attr = vec![];

        let mut cur = Cursor::new(data);
        while (cur.position() as usize) < data.len() {
            attr.push(ZclAttr::from_reader(&mut cur)?);
        }

        Ok(Self { attr })
    }
}
