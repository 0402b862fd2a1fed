use packed_struct::PrimitiveEnum;
use serde::Deserialize;

use zcl::attr::{ZclCommand, ZclReportAttr};
use zcl::request::ZclResponse;

use crate::decoder::{AttributeReport, ButtonEventDecoder, ReportOutcome};
use crate::error::ZigfredResult;
use crate::event::EventSink;

pub fn u16_hex<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    u16::from_str_radix(s.trim_start_matches("0x"), 16).map_err(serde::de::Error::custom)
}

pub fn vec_hex<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    if let Some(s) = opt {
        hex::decode(s).map_err(serde::de::Error::custom)
    } else {
        Ok(vec![])
    }
}

/// One captured zigbee message: `{"cluster": "fc42", "endpoint": 5, "data": "1c9c12..."}`
#[derive(Debug, Clone, Deserialize)]
pub struct Record {
    #[serde(deserialize_with = "u16_hex")]
    pub cluster: u16,

    #[serde(default)]
    pub endpoint: Option<u8>,

    #[serde(default, deserialize_with = "vec_hex")]
    pub data: Vec<u8>,
}

/// Feeds captured attribute reports from one endpoint through a
/// [`ButtonEventDecoder`].
pub struct CaptureDecoder<S> {
    decoder: ButtonEventDecoder<S>,
    endpoint: u8,
}

impl<S: EventSink> CaptureDecoder<S> {
    pub const fn new(decoder: ButtonEventDecoder<S>, endpoint: u8) -> Self {
        Self { decoder, endpoint }
    }

    pub const fn decoder(&self) -> &ButtonEventDecoder<S> {
        &self.decoder
    }

    pub fn process(&self, rec: &Record) -> ZigfredResult<Vec<ReportOutcome>> {
        if rec.data.is_empty() {
            return Ok(vec![]);
        }

        if rec.endpoint.is_some_and(|ep| ep != self.endpoint) {
            log::trace!("Skipping message for endpoint {:?}", rec.endpoint);
            return Ok(vec![]);
        }

        let msg = ZclResponse::parse(&rec.data)?;
        if msg.frame.cluster_specific()
            || ZclCommand::from_primitive(msg.frame.cmd) != Some(ZclCommand::ReportAttrib)
        {
            log::debug!(
                "[{:04x}] {:?} {:02x} :: not an attribute report {}",
                rec.cluster,
                msg.frame.flags,
                msg.frame.cmd,
                hex::encode(&msg.payload)
            );
            return Ok(vec![]);
        }

        let report = ZclReportAttr::parse(&msg.payload)?;
        log::debug!("[{:04x}] Attr rp <- {:02x?}", rec.cluster, report.attr);

        Ok(report
            .attr
            .iter()
            .map(|attr| AttributeReport::from_zcl(rec.cluster, msg.frame.mfcode, attr))
            .map(|report| self.decoder.handle_report(&report))
            .collect())
    }

    /// Process one line of json input
    pub fn process_line(&self, line: &str) -> ZigfredResult<Vec<ReportOutcome>> {
        let rec: Record = serde_json::from_str(line.trim())?;
        self.process(&rec)
    }
}
