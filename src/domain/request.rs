use serde_json::{Map, Value};

/// One of the fixed Kavenegar operations, identified by a `(resource, operation)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    SmsSend,
    SmsSendArray,
    SmsStatus,
    SmsStatusByLocalId,
    SmsSelect,
    SmsSelectOutbox,
    SmsLatestOutbox,
    SmsCountOutbox,
    SmsCancel,
    SmsReceive,
    SmsCountInbox,
    SmsCountPostalCode,
    SmsSendByPostalCode,
    VerifyLookup,
    CallMakeTts,
    CallStatus,
    AccountInfo,
    AccountConfig,
}

impl Endpoint {
    /// Every supported endpoint.
    pub const ALL: [Endpoint; 18] = [
        Self::SmsSend,
        Self::SmsSendArray,
        Self::SmsStatus,
        Self::SmsStatusByLocalId,
        Self::SmsSelect,
        Self::SmsSelectOutbox,
        Self::SmsLatestOutbox,
        Self::SmsCountOutbox,
        Self::SmsCancel,
        Self::SmsReceive,
        Self::SmsCountInbox,
        Self::SmsCountPostalCode,
        Self::SmsSendByPostalCode,
        Self::VerifyLookup,
        Self::CallMakeTts,
        Self::CallStatus,
        Self::AccountInfo,
        Self::AccountConfig,
    ];

    /// First path segment after the API key (`sms`, `verify`, `call`, `account`).
    pub fn resource(self) -> &'static str {
        match self {
            Self::SmsSend
            | Self::SmsSendArray
            | Self::SmsStatus
            | Self::SmsStatusByLocalId
            | Self::SmsSelect
            | Self::SmsSelectOutbox
            | Self::SmsLatestOutbox
            | Self::SmsCountOutbox
            | Self::SmsCancel
            | Self::SmsReceive
            | Self::SmsCountInbox
            | Self::SmsCountPostalCode
            | Self::SmsSendByPostalCode => "sms",
            Self::VerifyLookup => "verify",
            Self::CallMakeTts | Self::CallStatus => "call",
            Self::AccountInfo | Self::AccountConfig => "account",
        }
    }

    /// Operation segment, without the `.json` suffix.
    pub fn operation(self) -> &'static str {
        match self {
            Self::SmsSend => "send",
            Self::SmsSendArray => "sendarray",
            Self::SmsStatus | Self::CallStatus => "status",
            Self::SmsStatusByLocalId => "statuslocalmessageid",
            Self::SmsSelect => "select",
            Self::SmsSelectOutbox => "selectoutbox",
            Self::SmsLatestOutbox => "latestoutbox",
            Self::SmsCountOutbox => "countoutbox",
            Self::SmsCancel => "cancel",
            Self::SmsReceive => "receive",
            Self::SmsCountInbox => "countinbox",
            Self::SmsCountPostalCode => "countpostalcode",
            Self::SmsSendByPostalCode => "sendbypostalcode",
            Self::VerifyLookup => "lookup",
            Self::CallMakeTts => "maketts",
            Self::AccountInfo => "info",
            Self::AccountConfig => "config",
        }
    }
}

/// Call parameters: parameter name to JSON value.
///
/// Strings, numbers and booleans are sent as-is; arrays and objects are sent as
/// JSON text, which is what Kavenegar expects for e.g. `sendarray` receptors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(Map<String, Value>);

impl Params {
    /// Empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert a value, returning the previous one for that name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(name.into(), value.into())
    }

    /// Look up a parameter by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no parameters are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over parameters in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl From<Map<String, Value>> for Params {
    fn from(value: Map<String, Value>) -> Self {
        Self(value)
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}
