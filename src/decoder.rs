use packed_struct::PrimitiveEnum;
use thiserror::Error;

use zcl::attr::ZclAttr;

use crate::cluster::{
    ButtonId, PressType, SIGLIS_MANUFACTURER_CODE, ZIGFRED_BUTTONS_ATTRIBUTE_ID,
    ZIGFRED_CLUSTER_ID,
};
use crate::event::{ButtonEvent, EventSink};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Unmapped zigfred button value {0:02x}")]
    UnmappedButtonValue(u8),

    #[error("Unmapped zigfred press type {0:02x}")]
    UnmappedPressType(u8),
}

/// A single attribute update, as delivered by the zigbee stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeReport {
    pub cluster: u16,
    pub attr: u16,
    pub value: Option<u32>,
    pub mfcode: Option<u16>,
}

impl AttributeReport {
    #[must_use]
    pub const fn new(cluster: u16, attr: u16, value: Option<u32>) -> Self {
        Self {
            cluster,
            attr,
            value,
            mfcode: None,
        }
    }

    #[must_use]
    pub const fn with_mfcode(mut self, mfcode: Option<u16>) -> Self {
        self.mfcode = mfcode;
        self
    }

    /// Convert one decoded ZCL record. Values that are not 32-bit integers
    /// are reported as absent.
    #[must_use]
    pub fn from_zcl(cluster: u16, mfcode: Option<u16>, attr: &ZclAttr) -> Self {
        Self {
            cluster,
            attr: attr.key,
            value: attr.value.as_u32(),
            mfcode,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportOutcome {
    /// Not addressed to the buttons attribute; left to generic handling
    PassThrough,
    /// Buttons attribute reported without a value
    Empty,
    /// Event was decoded and emitted
    Emitted(ButtonEvent),
    /// Raw value could not be mapped; nothing was emitted
    Unmapped(DecodeError),
}

/// Split a raw buttons attribute value into a [`ButtonEvent`].
pub fn decode(value: u32) -> Result<ButtonEvent, DecodeError> {
    let [button_raw, press_raw, _, _] = value.to_le_bytes();

    let button =
        ButtonId::from_primitive(button_raw).ok_or(DecodeError::UnmappedButtonValue(button_raw))?;
    let press_type =
        PressType::from_primitive(press_raw).ok_or(DecodeError::UnmappedPressType(press_raw))?;

    Ok(ButtonEvent::new(button, press_type))
}

pub struct ButtonEventDecoder<S> {
    sink: S,
    strict_manufacturer: bool,
}

impl<S: EventSink> ButtonEventDecoder<S> {
    pub const fn new(sink: S) -> Self {
        Self {
            sink,
            strict_manufacturer: false,
        }
    }

    /// When enabled, reports carrying a manufacturer code other than
    /// [`SIGLIS_MANUFACTURER_CODE`] are passed through undecoded.
    #[must_use]
    pub const fn with_strict_manufacturer(mut self, strict: bool) -> Self {
        self.strict_manufacturer = strict;
        self
    }

    pub const fn sink(&self) -> &S {
        &self.sink
    }

    fn owns(&self, report: &AttributeReport) -> bool {
        if report.cluster != ZIGFRED_CLUSTER_ID || report.attr != ZIGFRED_BUTTONS_ATTRIBUTE_ID {
            return false;
        }

        !self.strict_manufacturer
            || report
                .mfcode
                .is_none_or(|code| code == SIGLIS_MANUFACTURER_CODE)
    }

    pub fn handle_report(&self, report: &AttributeReport) -> ReportOutcome {
        if !self.owns(report) {
            return ReportOutcome::PassThrough;
        }

        let Some(value) = report.value else {
            return ReportOutcome::Empty;
        };

        match decode(value) {
            Ok(evt) => {
                let name = evt.name();
                log::info!("Got button press on zigfred cluster: {name}");
                self.sink.emit(&name, evt.payload());
                ReportOutcome::Emitted(evt)
            }
            Err(err) => {
                log::warn!("Ignoring zigfred buttons report {value:08x}: {err}");
                ReportOutcome::Unmapped(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::cluster::{
        ButtonId, PressType, SIGLIS_MANUFACTURER_CODE, ZIGFRED_BUTTONS_ATTRIBUTE_ID,
        ZIGFRED_CLUSTER_ID,
    };
    use crate::decoder::{AttributeReport, ButtonEventDecoder, DecodeError, ReportOutcome, decode};
    use crate::event::{ButtonEvent, LogSink, MemorySink};

    const BUTTONS: [&str; 4] = ["button_1", "button_2", "button_3", "button_4"];
    const PRESSES: [&str; 4] = ["long_release", "short_press", "double_press", "long_press"];

    fn buttons_report(value: Option<u32>) -> AttributeReport {
        AttributeReport::new(ZIGFRED_CLUSTER_ID, ZIGFRED_BUTTONS_ATTRIBUTE_ID, value)
    }

    #[test]
    fn decode_known_values() {
        for (b, bname) in BUTTONS.iter().enumerate() {
            for (p, pname) in PRESSES.iter().enumerate() {
                let value = ((p as u32) << 8) | b as u32;
                let evt = decode(value).unwrap();
                assert_eq!(evt.name(), format!("{bname}_{pname}"));
                assert_eq!(evt.payload(), json!({"button": bname, "press_type": pname}));
            }
        }
    }

    #[test]
    fn decode_ignores_upper_bytes() {
        assert_eq!(
            decode(0xABCD_0302).unwrap(),
            ButtonEvent::new(ButtonId::Button3, PressType::LongPress)
        );
    }

    #[test]
    fn decode_unmapped() {
        assert_eq!(decode(0x00FF), Err(DecodeError::UnmappedButtonValue(0xff)));
        assert_eq!(decode(0x0400), Err(DecodeError::UnmappedPressType(0x04)));
        // button is checked first
        assert_eq!(decode(0x0404), Err(DecodeError::UnmappedButtonValue(0x04)));
    }

    #[test]
    fn handle_short_press() {
        let dec = ButtonEventDecoder::new(MemorySink::new());

        let res = dec.handle_report(&buttons_report(Some(0x0101)));
        assert_eq!(
            res,
            ReportOutcome::Emitted(ButtonEvent::new(ButtonId::Button2, PressType::ShortPress))
        );

        let events = dec.sink().take();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, "button_2_short_press");
        assert_eq!(
            events[0].args,
            json!({"button": "button_2", "press_type": "short_press"})
        );
    }

    #[test]
    fn handle_with_log_sink() {
        let dec = ButtonEventDecoder::new(LogSink);

        assert_eq!(
            dec.handle_report(&buttons_report(Some(0x0300))),
            ReportOutcome::Emitted(ButtonEvent::new(ButtonId::Button1, PressType::LongPress))
        );
        assert_eq!(
            dec.handle_report(&buttons_report(Some(0x00FF))),
            ReportOutcome::Unmapped(DecodeError::UnmappedButtonValue(0xff))
        );
    }

    #[test]
    fn handle_unmapped_emits_nothing() {
        let dec = ButtonEventDecoder::new(MemorySink::new());

        assert_eq!(
            dec.handle_report(&buttons_report(Some(0x00FF))),
            ReportOutcome::Unmapped(DecodeError::UnmappedButtonValue(0xff))
        );
        assert_eq!(
            dec.handle_report(&buttons_report(Some(0x0400))),
            ReportOutcome::Unmapped(DecodeError::UnmappedPressType(0x04))
        );
        assert!(dec.sink().take().is_empty());
    }

    #[test]
    fn handle_empty_value() {
        let dec = ButtonEventDecoder::new(MemorySink::new());
        assert_eq!(dec.handle_report(&buttons_report(None)), ReportOutcome::Empty);
        assert!(dec.sink().take().is_empty());
    }

    #[test]
    fn handle_other_attribute() {
        let dec = ButtonEventDecoder::new(MemorySink::new());

        let other = AttributeReport::new(ZIGFRED_CLUSTER_ID, 0x0000, Some(0x0101));
        assert_eq!(dec.handle_report(&other), ReportOutcome::PassThrough);

        let other = AttributeReport::new(0x0006, ZIGFRED_BUTTONS_ATTRIBUTE_ID, Some(0x0101));
        assert_eq!(dec.handle_report(&other), ReportOutcome::PassThrough);

        assert!(dec.sink().take().is_empty());
    }

    #[test]
    fn handle_repeated_report() {
        let dec = ButtonEventDecoder::new(MemorySink::new());
        let report = buttons_report(Some(0x0200));

        let first = dec.handle_report(&report);
        let second = dec.handle_report(&report);
        assert_eq!(first, second);

        let events = dec.sink().take();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], events[1]);
        assert_eq!(events[0].event, "button_1_double_press");
    }

    #[test]
    fn strict_manufacturer() {
        let dec = ButtonEventDecoder::new(MemorySink::new()).with_strict_manufacturer(true);

        let foreign = buttons_report(Some(0x0101)).with_mfcode(Some(0x100B));
        assert_eq!(dec.handle_report(&foreign), ReportOutcome::PassThrough);

        let siglis = buttons_report(Some(0x0101)).with_mfcode(Some(SIGLIS_MANUFACTURER_CODE));
        assert!(matches!(dec.handle_report(&siglis), ReportOutcome::Emitted(_)));

        let generic = buttons_report(Some(0x0101));
        assert!(matches!(dec.handle_report(&generic), ReportOutcome::Emitted(_)));

        assert_eq!(dec.sink().take().len(), 2);
    }

    #[test]
    fn lenient_manufacturer() {
        let dec = ButtonEventDecoder::new(MemorySink::new());

        let foreign = buttons_report(Some(0x0101)).with_mfcode(Some(0x100B));
        assert!(matches!(dec.handle_report(&foreign), ReportOutcome::Emitted(_)));
    }
}
