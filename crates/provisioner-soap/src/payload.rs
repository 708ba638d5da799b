//! CreateSubscriber request envelope.

use chrono::Local;
use provisioner_core::{RunConfig, Task};
use provisioner_dispatcher::{PayloadBuilder, TemplateError};
use quick_xml::escape::escape;

/// Protocol parameter keys read from [`RunConfig::params`].
pub mod params {
    /// Primary offering ID. Required, numeric.
    pub const OFFERING_ID: &str = "offering_id";
    /// Account bill cycle type. Required, numeric.
    pub const BILL_CYCLE_TYPE: &str = "bill_cycle_type";
    /// Business entity ID. Optional, defaults to 1001.
    pub const BE_ID: &str = "be_id";
    /// Business region ID. Optional, defaults to 101.
    pub const BR_ID: &str = "br_id";
}

const DEFAULT_BE_ID: u64 = 1001;
const DEFAULT_BR_ID: u64 = 101;

/// Numeric protocol parameters of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriberParams {
    pub offering_id: u64,
    pub bill_cycle_type: u64,
    pub be_id: u64,
    pub br_id: u64,
}

impl SubscriberParams {
    /// Read and parse the parameters from `config`.
    pub fn from_config(config: &RunConfig) -> Result<Self, TemplateError> {
        Ok(Self {
            offering_id: required(config, params::OFFERING_ID)?,
            bill_cycle_type: required(config, params::BILL_CYCLE_TYPE)?,
            be_id: optional(config, params::BE_ID, DEFAULT_BE_ID)?,
            br_id: optional(config, params::BR_ID, DEFAULT_BR_ID)?,
        })
    }
}

fn required(config: &RunConfig, name: &'static str) -> Result<u64, TemplateError> {
    let value = config
        .param(name)
        .filter(|v| !v.trim().is_empty())
        .ok_or(TemplateError::MissingParam(name))?;
    parse(name, value)
}

fn optional(config: &RunConfig, name: &'static str, default: u64) -> Result<u64, TemplateError> {
    match config.param(name).filter(|v| !v.trim().is_empty()) {
        Some(value) => parse(name, value),
        None => Ok(default),
    }
}

fn parse(name: &'static str, value: &str) -> Result<u64, TemplateError> {
    value
        .trim()
        .parse()
        .map_err(|_| TemplateError::InvalidParam {
            name,
            value: value.to_string(),
        })
}

/// Builds `CreateSubscriberRequestMsg` envelopes.
///
/// The identifier doubles as customer, account, subscriber and pay-relation
/// key, and as every contact phone number.
#[derive(Debug, Clone)]
pub struct CreateSubscriberPayload {
    version: String,
    operator_id: String,
    channel_id: String,
}

impl Default for CreateSubscriberPayload {
    fn default() -> Self {
        Self {
            version: "1".to_string(),
            operator_id: "102".to_string(),
            channel_id: "1".to_string(),
        }
    }
}

impl CreateSubscriberPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interface version sent in the request header.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Operator and channel sent in the request header.
    pub fn with_operator(mut self, operator_id: impl Into<String>, channel_id: impl Into<String>) -> Self {
        self.operator_id = operator_id.into();
        self.channel_id = channel_id.into();
        self
    }

    /// Render the envelope with an explicit message timestamp
    /// (`YYYYMMDDhhmmss`).
    pub fn render(
        &self,
        task: &Task,
        config: &RunConfig,
        timestamp: &str,
    ) -> Result<String, TemplateError> {
        let p = SubscriberParams::from_config(config)?;
        let id = task.identifier();
        let login = escape(config.credentials.login.as_str());
        let password = escape(config.credentials.password.as_str());
        let version = escape(self.version.as_str());
        let operator_id = escape(self.operator_id.as_str());
        let channel_id = escape(self.channel_id.as_str());

        Ok(format!(
            r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/" xmlns:bcs="http://www.huawei.com/bme/cbsinterface/bcservices" xmlns:cbs="http://www.huawei.com/bme/cbsinterface/cbscommon" xmlns:bcc="http://www.huawei.com/bme/cbsinterface/bccommon">
<soapenv:Header/>
<soapenv:Body>
<bcs:CreateSubscriberRequestMsg>
  <RequestHeader>
    <cbs:Version>{version}</cbs:Version>
    <cbs:BusinessCode>CreateSubscriber</cbs:BusinessCode>
    <cbs:MessageSeq>{timestamp}-{id}</cbs:MessageSeq>
    <cbs:OwnershipInfo>
      <cbs:BEID>{be_id}</cbs:BEID>
      <cbs:BRID>{br_id}</cbs:BRID>
    </cbs:OwnershipInfo>
    <cbs:AccessSecurity>
      <cbs:LoginSystemCode>{login}</cbs:LoginSystemCode>
      <cbs:Password>{password}</cbs:Password>
    </cbs:AccessSecurity>
    <cbs:OperatorInfo>
      <cbs:OperatorID>{operator_id}</cbs:OperatorID>
      <cbs:ChannelID>{channel_id}</cbs:ChannelID>
    </cbs:OperatorInfo>
    <cbs:MsgLanguageCode>2002</cbs:MsgLanguageCode>
    <cbs:TimeFormat>
      <cbs:TimeType>1</cbs:TimeType>
      <cbs:TimeZoneID>8</cbs:TimeZoneID>
    </cbs:TimeFormat>
  </RequestHeader>
  <CreateSubscriberRequest>
    <bcs:RegisterCustomer OpType="1">
      <bcs:CustKey>{id}</bcs:CustKey>
      <bcs:CustInfo/>
      <bcs:IndividualInfo/>
    </bcs:RegisterCustomer>
    <bcs:Account>
      <bcs:AcctKey>{id}</bcs:AcctKey>
      <bcs:AcctInfo>
        <bcc:AcctCode>{id}</bcc:AcctCode>
        <bcc:UserCustomerKey>{id}</bcc:UserCustomerKey>
        <bcc:AcctBasicInfo>
          <bcc:AcctName>AcctName</bcc:AcctName>
          <bcc:BillLang>2002</bcc:BillLang>
          <bcc:DunningFlag>1</bcc:DunningFlag>
          <bcc:LateFeeChargeable>N</bcc:LateFeeChargeable>
          <bcc:RedlistFlag>0</bcc:RedlistFlag>
          <bcc:ContactInfo>
            <bcc:Title>1</bcc:Title>
            <bcc:FirstName>SAF</bcc:FirstName>
            <bcc:MiddleName>PTMP</bcc:MiddleName>
            <bcc:LastName>CI</bcc:LastName>
            <bcc:OfficePhone>{id}</bcc:OfficePhone>
            <bcc:HomePhone>{id}</bcc:HomePhone>
            <bcc:MobilePhone>{id}</bcc:MobilePhone>
            <bcc:Email>123@email.com</bcc:Email>
            <bcc:Fax>{id}</bcc:Fax>
          </bcc:ContactInfo>
        </bcc:AcctBasicInfo>
        <bcc:BillCycleType>{bill_cycle_type}</bcc:BillCycleType>
        <bcc:AcctType>1</bcc:AcctType>
        <bcc:PaymentType>0</bcc:PaymentType>
        <bcc:AcctClass>2</bcc:AcctClass>
        <bcc:CurrencyID>1074</bcc:CurrencyID>
        <bcc:InitBalance>0</bcc:InitBalance>
        <bcc:AcctPayMethod>1</bcc:AcctPayMethod>
      </bcs:AcctInfo>
    </bcs:Account>
    <bcs:Subscriber>
      <bcs:SubscriberKey>{id}</bcs:SubscriberKey>
      <bcs:SubscriberInfo>
        <bcc:SubBasicInfo>
          <bcc:WrittenLang>2002</bcc:WrittenLang>
          <bcc:IVRLang>2002</bcc:IVRLang>
          <bcc:SubLevel>1</bcc:SubLevel>
          <bcc:DunningFlag>1</bcc:DunningFlag>
          <bcc:SubProperty>
            <bcc:Code>C_SUB_REGISTERED</bcc:Code>
            <bcc:Value>1</bcc:Value>
          </bcc:SubProperty>
          <bcc:SubProperty>
            <bcc:Code>C_SUB_CROSS_THRESHOLD_NOTI_FLAG</bcc:Code>
            <bcc:Value>1</bcc:Value>
          </bcc:SubProperty>
        </bcc:SubBasicInfo>
        <bcc:UserCustomerKey>{id}</bcc:UserCustomerKey>
        <bcc:SubIdentity>
          <bcc:SubIdentityType>3</bcc:SubIdentityType>
          <bcc:SubIdentity>{id}</bcc:SubIdentity>
          <bcc:PrimaryFlag>1</bcc:PrimaryFlag>
        </bcc:SubIdentity>
        <bcc:Brand>1</bcc:Brand>
        <bcc:SubClass>2</bcc:SubClass>
        <bcc:NetworkType>1</bcc:NetworkType>
        <bcc:Status>2</bcc:Status>
      </bcs:SubscriberInfo>
      <bcs:SubPaymentMode>
        <bcs:PaymentMode>0</bcs:PaymentMode>
        <bcs:PayRelationKey>{id}</bcs:PayRelationKey>
        <bcs:AcctKey>{id}</bcs:AcctKey>
      </bcs:SubPaymentMode>
    </bcs:Subscriber>
    <bcs:PrimaryOffering>
      <bcc:OfferingKey>
        <bcc:OfferingID>{offering_id}</bcc:OfferingID>
      </bcc:OfferingKey>
      <bcc:BundledFlag>S</bcc:BundledFlag>
      <bcc:OfferingClass>I</bcc:OfferingClass>
      <bcc:Status>2</bcc:Status>
      <bcc:TrialStartTime>20120701000000</bcc:TrialStartTime>
      <bcc:TrialEndTime>20370131000000</bcc:TrialEndTime>
    </bcs:PrimaryOffering>
  </CreateSubscriberRequest>
</bcs:CreateSubscriberRequestMsg>
</soapenv:Body>
</soapenv:Envelope>
"#,
            be_id = p.be_id,
            br_id = p.br_id,
            bill_cycle_type = p.bill_cycle_type,
            offering_id = p.offering_id,
        ))
    }
}

impl PayloadBuilder for CreateSubscriberPayload {
    fn validate(&self, config: &RunConfig) -> Result<(), TemplateError> {
        SubscriberParams::from_config(config).map(|_| ())
    }

    fn build(&self, task: &Task, config: &RunConfig) -> Result<Vec<u8>, TemplateError> {
        let timestamp = Local::now().format("%Y%m%d%H%M%S").to_string();
        self.render(task, config, &timestamp).map(String::into_bytes)
    }
}
