use std::sync::Mutex;
use std::sync::atomic::{AtomicU8, Ordering};

use async_trait::async_trait;
use packed_struct::PrimitiveEnum;

use zcl::attr::ZclCommand;
use zcl::frame::{ZclFrame, ZclFrameDirection};
use zcl::report::{ZclConfigReportResp, ZclStatus};
use zcl::request::{ZclRequest, ZclResponse};

use crate::error::ZigfredResult;

/// Request/response link to a zigbee device.
///
/// Implementations own sequence numbering, timeouts and cancellation.
#[async_trait]
pub trait ZclTransport: Send + Sync {
    async fn send(&self, req: ZclRequest) -> ZigfredResult<ZclResponse>;
}

/// Transport that never touches the radio: requests are logged and kept, and
/// answered as if the device accepted them.
#[derive(Debug, Default)]
pub struct DryRunTransport {
    seqnr: AtomicU8,
    sent: Mutex<Vec<ZclRequest>>,
}

impl DryRunTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return all requests sent so far.
    pub fn take_sent(&self) -> Vec<ZclRequest> {
        self.sent
            .lock()
            .map(|mut sent| std::mem::take(&mut *sent))
            .unwrap_or_default()
    }

    fn reply_to(frame: &ZclFrame) -> ZigfredResult<ZclResponse> {
        let mut reply = ZclFrame::profile_wide(frame.cmd, frame.mfcode).with_seqnr(frame.seqnr);
        reply.flags.direction = ZclFrameDirection::ServerToClient;
        reply.flags.disable_default_response = true;

        if ZclCommand::from_primitive(frame.cmd) == Some(ZclCommand::ConfigReport) {
            reply.cmd = ZclCommand::ConfigReportResp.to_primitive();
            Ok(ZclResponse::new(reply, ZclConfigReportResp::success().pack()?))
        } else {
            reply.cmd = ZclCommand::DefaultResp.to_primitive();
            Ok(ZclResponse::new(
                reply,
                vec![frame.cmd, ZclStatus::Success.to_primitive()],
            ))
        }
    }
}

#[async_trait]
impl ZclTransport for DryRunTransport {
    async fn send(&self, mut req: ZclRequest) -> ZigfredResult<ZclResponse> {
        req.frame.seqnr = self.seqnr.fetch_add(1, Ordering::Relaxed);

        log::info!(
            "[{:04x}] {:?} -> {}",
            req.cluster,
            req.frame.flags,
            hex::encode(req.to_bytes()?)
        );

        let resp = Self::reply_to(&req.frame);
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(req);
        }
        resp
    }
}
