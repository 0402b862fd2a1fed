use std::collections::BTreeMap;

use async_trait::async_trait;
use packed_struct::PrimitiveEnum;

use zcl::attr::{ZclCommand, ZclDataType};
use zcl::error::ZclError;
use zcl::frame::ZclFrame;
use zcl::report::{ZclConfigReport, ZclConfigReportRecord, ZclConfigReportResp};
use zcl::request::{ZclRequest, ZclResponse};

use crate::cluster::{SIGLIS_MANUFACTURER_CODE, ZIGFRED_BUTTONS_ATTRIBUTE_ID, ZIGFRED_CLUSTER_ID};
use crate::error::{ZigfredError, ZigfredResult};
use crate::transport::ZclTransport;

/// Arguments of a "configure reporting" call, as issued by the generic stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportingRequest {
    pub attr: u16,
    pub dtype: ZclDataType,
    pub min_interval: u16,
    pub max_interval: u16,
    pub reportable_change: u32,
    pub mfcode: Option<u16>,
}

impl ReportingRequest {
    const fn record(&self) -> ZclConfigReportRecord {
        ZclConfigReportRecord {
            attr: self.attr,
            dtype: self.dtype,
            min_interval: self.min_interval,
            max_interval: self.max_interval,
            reportable_change: self.reportable_change,
        }
    }
}

/// Reporting configuration that is always sent for the zigfred buttons
/// attribute. The device ignores anything that is not manufacturer scoped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportingConfig {
    pub mfcode: u16,
    pub record: ZclConfigReportRecord,
}

pub const ZIGFRED_REPORTING: ReportingConfig = ReportingConfig {
    mfcode: SIGLIS_MANUFACTURER_CODE,
    record: ZclConfigReportRecord {
        attr: ZIGFRED_BUTTONS_ATTRIBUTE_ID,
        dtype: ZclDataType::ZclU32,
        min_interval: 0,
        max_interval: 0,
        reportable_change: 0,
    },
};

#[async_trait]
pub trait ReportingConfigStrategy: Send + Sync {
    async fn configure_reporting(
        &self,
        transport: &dyn ZclTransport,
        cluster: u16,
        req: ReportingRequest,
    ) -> ZigfredResult<ZclConfigReportResp>;
}

/// Send one configure reporting command, and hand back whatever the device
/// answered. Single attempt, no retries.
async fn send_config_report(
    transport: &dyn ZclTransport,
    cluster: u16,
    record: ZclConfigReportRecord,
    mfcode: Option<u16>,
) -> ZigfredResult<ZclConfigReportResp> {
    let frame = ZclFrame::profile_wide(ZclCommand::ConfigReport.to_primitive(), mfcode);
    let payload = ZclConfigReport::new(record).pack()?;
    let req = ZclRequest::new(cluster, frame, payload);

    let resp = transport.send(req).await?;
    parse_config_report_resp(&resp)
}

fn parse_config_report_resp(resp: &ZclResponse) -> ZigfredResult<ZclConfigReportResp> {
    match ZclCommand::from_primitive(resp.frame.cmd) {
        Some(ZclCommand::ConfigReportResp) => Ok(ZclConfigReportResp::parse(&resp.payload)?),

        // a default response for our command carries the status directly
        Some(ZclCommand::DefaultResp)
            if resp.payload.first() == Some(&ZclCommand::ConfigReport.to_primitive()) =>
        {
            let status = resp.payload.get(1).copied().ok_or_else(|| ZclError::Truncated {
                expected: 2,
                found: resp.payload.len(),
            })?;
            Ok(ZclConfigReportResp::parse(&[status])?)
        }

        _ => Err(ZigfredError::UnexpectedResponse(resp.frame.cmd)),
    }
}

/// Reporting strategy for the zigfred cluster.
///
/// Every request is replaced with [`ZIGFRED_REPORTING`], regardless of
/// which attribute, intervals or threshold the caller asked for.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportConfigNegotiator;

#[async_trait]
impl ReportingConfigStrategy for ReportConfigNegotiator {
    async fn configure_reporting(
        &self,
        transport: &dyn ZclTransport,
        cluster: u16,
        req: ReportingRequest,
    ) -> ZigfredResult<ZclConfigReportResp> {
        log::info!("Configuring reporting on zigfred cluster");
        log::debug!("Overriding requested reporting configuration {req:?}");

        let cfg = ZIGFRED_REPORTING;
        let res = send_config_report(transport, cluster, cfg.record, Some(cfg.mfcode)).await;

        match &res {
            Ok(resp) if resp.is_success() => log::info!("Zigfred reporting configured"),
            Ok(resp) => log::warn!("Zigfred reporting rejected by device: {resp:?}"),
            Err(err) => log::error!("Failed to configure zigfred reporting: {err}"),
        }

        res
    }
}

/// Sends the request as given. Used for clusters without special needs.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericReporting;

#[async_trait]
impl ReportingConfigStrategy for GenericReporting {
    async fn configure_reporting(
        &self,
        transport: &dyn ZclTransport,
        cluster: u16,
        req: ReportingRequest,
    ) -> ZigfredResult<ZclConfigReportResp> {
        send_config_report(transport, cluster, req.record(), req.mfcode).await
    }
}

/// Selects a [`ReportingConfigStrategy`] by cluster id.
pub struct ReportingRegistry {
    strategies: BTreeMap<u16, Box<dyn ReportingConfigStrategy>>,
    fallback: GenericReporting,
}

impl Default for ReportingRegistry {
    fn default() -> Self {
        let mut res = Self::new();
        res.register(ZIGFRED_CLUSTER_ID, ReportConfigNegotiator);
        res
    }
}

impl ReportingRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            strategies: BTreeMap::new(),
            fallback: GenericReporting,
        }
    }

    pub fn register(&mut self, cluster: u16, strategy: impl ReportingConfigStrategy + 'static) {
        self.strategies.insert(cluster, Box::new(strategy));
    }

    #[must_use]
    pub fn strategy(&self, cluster: u16) -> &dyn ReportingConfigStrategy {
        match self.strategies.get(&cluster) {
            Some(strategy) => strategy.as_ref(),
            None => &self.fallback,
        }
    }

    pub async fn configure_reporting(
        &self,
        transport: &dyn ZclTransport,
        cluster: u16,
        req: ReportingRequest,
    ) -> ZigfredResult<ZclConfigReportResp> {
        self.strategy(cluster)
            .configure_reporting(transport, cluster, req)
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use zcl::attr::ZclDataType;
    use zcl::frame::ZclFrame;
    use zcl::report::{ZclConfigReport, ZclConfigReportResp, ZclStatus};
    use zcl::request::{ZclRequest, ZclResponse};

    use crate::cluster::{
        SIGLIS_MANUFACTURER_CODE, ZIGFRED_BUTTONS_ATTRIBUTE_ID, ZIGFRED_CLUSTER_ID,
    };
    use crate::error::{ZigfredError, ZigfredResult};
    use crate::reporting::{
        ReportConfigNegotiator, ReportingConfigStrategy, ReportingRegistry, ReportingRequest,
        ZIGFRED_REPORTING,
    };
    use crate::transport::ZclTransport;

    enum Reply {
        Raw(&'static str),
        Fail,
        Hang,
    }

    struct FakeTransport {
        sent: Mutex<Vec<ZclRequest>>,
        reply: Reply,
    }

    impl FakeTransport {
        fn new(reply: Reply) -> Self {
            Self {
                sent: Mutex::new(vec![]),
                reply,
            }
        }

        fn sent(&self) -> Vec<ZclRequest> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ZclTransport for FakeTransport {
        async fn send(&self, req: ZclRequest) -> ZigfredResult<ZclResponse> {
            self.sent.lock().unwrap().push(req);
            match self.reply {
                Reply::Raw(data) => Ok(ZclResponse::parse(&hex::decode(data)?)?),
                Reply::Fail => Err(ZigfredError::Transport("no ack from device".into())),
                Reply::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Err(ZigfredError::Timeout)
                }
            }
        }
    }

    // ms configure reporting response, all attributes ok
    const RESP_OK: &str = "1c9c12000700";

    const fn generic_request(attr: u16, min: u16, max: u16, change: u32) -> ReportingRequest {
        ReportingRequest {
            attr,
            dtype: ZclDataType::ZclU16,
            min_interval: min,
            max_interval: max,
            reportable_change: change,
            mfcode: None,
        }
    }

    fn assert_zigfred_request(req: &ZclRequest) {
        assert_eq!(req.cluster, ZIGFRED_CLUSTER_ID);
        assert!(req.frame.manufacturer_specific());
        assert_eq!(req.frame.mfcode, Some(SIGLIS_MANUFACTURER_CODE));
        assert_eq!(req.frame.cmd, 0x06);

        let cfg = ZclConfigReport::parse(&req.payload).unwrap();
        assert_eq!(cfg.records, vec![ZIGFRED_REPORTING.record]);
        assert_eq!(cfg.records[0].attr, ZIGFRED_BUTTONS_ATTRIBUTE_ID);
        assert_eq!(cfg.records[0].dtype, ZclDataType::ZclU32);
        assert_eq!(cfg.records[0].min_interval, 0);
        assert_eq!(cfg.records[0].max_interval, 0);
        assert_eq!(cfg.records[0].reportable_change, 0);
    }

    #[tokio::test]
    async fn negotiator_overrides_arguments() {
        let transport = FakeTransport::new(Reply::Raw(RESP_OK));

        for req in [
            generic_request(0x0000, 1, 300, 1),
            generic_request(0x0008, 60, 3600, 100),
            generic_request(0xffff, 0xffff, 0xffff, 0xffff_ffff),
        ] {
            let resp = ReportConfigNegotiator
                .configure_reporting(&transport, ZIGFRED_CLUSTER_ID, req)
                .await
                .unwrap();
            assert!(resp.is_success());
        }

        let sent = transport.sent();
        assert_eq!(sent.len(), 3);
        sent.iter().for_each(assert_zigfred_request);
    }

    #[tokio::test]
    async fn negotiator_exact_bytes() {
        let transport = FakeTransport::new(Reply::Raw(RESP_OK));
        ReportConfigNegotiator
            .configure_reporting(&transport, ZIGFRED_CLUSTER_ID, generic_request(1, 2, 3, 4))
            .await
            .unwrap();

        let sent = transport.sent();
        assert_eq!(
            hex::encode(sent[0].to_bytes().unwrap()),
            "049c120006000800230000000000000000"
        );
    }

    #[tokio::test]
    async fn negotiator_returns_device_status() {
        // device rejects the attribute for reporting
        let transport = FakeTransport::new(Reply::Raw("1c9c1200078c000800"));
        let resp = ReportConfigNegotiator
            .configure_reporting(&transport, ZIGFRED_CLUSTER_ID, generic_request(0, 0, 0, 0))
            .await
            .unwrap();

        assert!(!resp.is_success());
        assert_eq!(resp.records[0].status(), Some(ZclStatus::UnreportableAttribute));
        assert_eq!(resp.records[0].attr, Some(ZIGFRED_BUTTONS_ATTRIBUTE_ID));
    }

    #[tokio::test]
    async fn negotiator_default_response() {
        // default response to command 0x06: unsupported manufacturer general command
        let transport = FakeTransport::new(Reply::Raw("18000b0684"));
        let resp = ReportConfigNegotiator
            .configure_reporting(&transport, ZIGFRED_CLUSTER_ID, generic_request(0, 0, 0, 0))
            .await
            .unwrap();

        assert_eq!(
            resp.records[0].status(),
            Some(ZclStatus::UnsupManufGeneralCommand)
        );
    }

    #[tokio::test]
    async fn negotiator_unexpected_response() {
        let transport = FakeTransport::new(Reply::Raw("18000a"));
        let res = ReportConfigNegotiator
            .configure_reporting(&transport, ZIGFRED_CLUSTER_ID, generic_request(0, 0, 0, 0))
            .await;

        assert!(matches!(res, Err(ZigfredError::UnexpectedResponse(0x0a))));
    }

    #[tokio::test]
    async fn negotiator_propagates_transport_failure() {
        let transport = FakeTransport::new(Reply::Fail);
        let res = ReportConfigNegotiator
            .configure_reporting(&transport, ZIGFRED_CLUSTER_ID, generic_request(0, 0, 0, 0))
            .await;

        assert!(matches!(res, Err(ZigfredError::Transport(_))));
        // single attempt, no retries
        assert_eq!(transport.sent().len(), 1);
    }

    #[tokio::test]
    async fn caller_owns_timeout() {
        let transport = FakeTransport::new(Reply::Hang);
        let fut = ReportConfigNegotiator.configure_reporting(
            &transport,
            ZIGFRED_CLUSTER_ID,
            generic_request(0, 0, 0, 0),
        );

        assert!(
            tokio::time::timeout(Duration::from_millis(10), fut)
                .await
                .is_err()
        );
        assert_eq!(transport.sent().len(), 1);
    }

    #[tokio::test]
    async fn registry_selects_by_cluster() {
        let registry = ReportingRegistry::default();
        let transport = FakeTransport::new(Reply::Raw(RESP_OK));

        registry
            .configure_reporting(&transport, ZIGFRED_CLUSTER_ID, generic_request(0, 1, 2, 3))
            .await
            .unwrap();

        // level control: sent as requested, no manufacturer code
        let level = ReportingRequest {
            attr: 0x0000,
            dtype: ZclDataType::ZclU8,
            min_interval: 1,
            max_interval: 600,
            reportable_change: 1,
            mfcode: None,
        };
        registry
            .configure_reporting(&transport, 0x0008, level)
            .await
            .unwrap();

        let sent = transport.sent();
        assert_zigfred_request(&sent[0]);

        assert_eq!(sent[1].cluster, 0x0008);
        assert_eq!(sent[1].frame, ZclFrame::profile_wide(0x06, None));
        assert_eq!(hex::encode(&sent[1].payload), "000000200100580201");
    }

    #[tokio::test]
    async fn empty_registry_is_generic() {
        let registry = ReportingRegistry::new();
        let transport = FakeTransport::new(Reply::Raw("08000700"));

        let resp = registry
            .configure_reporting(
                &transport,
                ZIGFRED_CLUSTER_ID,
                generic_request(0x0008, 5, 10, 2),
            )
            .await
            .unwrap();
        assert_eq!(resp, ZclConfigReportResp::success());

        let sent = transport.sent();
        assert!(!sent[0].frame.manufacturer_specific());
        let cfg = ZclConfigReport::parse(&sent[0].payload).unwrap();
        assert_eq!(cfg.records[0].min_interval, 5);
        assert_eq!(cfg.records[0].max_interval, 10);
    }
}
