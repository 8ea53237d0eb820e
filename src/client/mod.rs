//! Client layer: builds request URLs, runs one HTTP exchange per call and
//! classifies the outcome.

use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde_json::Value;
use tracing::{Span, debug, instrument};
use url::Url;

use crate::config::{Config, DEFAULT_TIMEOUT};
use crate::domain::{ApiKey, Endpoint, Params, ValidationError};
use crate::transport::{decode_envelope, encode_params};

const DEFAULT_BASE_URL: &str = "https://api.kavenegar.com";
const API_VERSION: &str = "v1";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Clone)]
struct HttpResponse {
    status: u16,
    body: String,
}

trait HttpTransport: Send + Sync {
    fn post_form<'a>(
        &'a self,
        url: &'a str,
        params: Vec<(String, String)>,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>>;
}

/// Opens a fresh `reqwest::Client` for every call; it is dropped when the call
/// finishes, whichever way it finishes.
#[derive(Debug, Clone)]
struct ReqwestTransport {
    timeout: Duration,
    proxy: Option<reqwest::Proxy>,
}

impl ReqwestTransport {
    fn session(&self) -> Result<reqwest::Client, reqwest::Error> {
        // Environment proxies are ignored; only the configured one applies.
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .no_proxy();
        if let Some(proxy) = self.proxy.clone() {
            builder = builder.proxy(proxy);
        }
        builder.build()
    }
}

impl HttpTransport for ReqwestTransport {
    fn post_form<'a>(
        &'a self,
        url: &'a str,
        params: Vec<(String, String)>,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>> {
        Box::pin(async move {
            let session = self.session()?;
            let response = session
                .post(url)
                .header(ACCEPT, "application/json")
                .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
                .header("charset", "utf-8")
                .form(&params)
                .send()
                .await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok(HttpResponse { status, body })
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Why a [`TransportError`] happened.
pub enum TransportReason {
    /// Connection could not be established or broke mid-exchange (DNS, TLS, refused, reset).
    Connect,
    /// The configured timeout elapsed.
    Timeout,
    /// A body arrived but was not a valid Kavenegar JSON envelope.
    Decode,
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
/// Transport-level failure. The message never contains the raw API key.
pub struct TransportError {
    reason: TransportReason,
    message: String,
}

impl TransportError {
    /// Which stage of the exchange failed.
    pub fn reason(&self) -> TransportReason {
        self.reason
    }

    /// Redacted, human-readable failure text.
    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Clone, thiserror::Error)]
/// Errors returned by [`KavenegarClient`] calls.
///
/// The client never retries; every failure is exactly one of these.
pub enum KavenegarError {
    /// The service answered with an application status other than 200.
    #[error("APIError[{status}] {message}")]
    Api { status: i64, message: String },

    /// Connection failure, timeout, or an undecodable response body.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

#[derive(Debug, Clone)]
/// Builder for [`KavenegarClient`].
///
/// Use this when you need a custom timeout, a proxy, or a different base URL.
pub struct KavenegarClientBuilder {
    api_key: ApiKey,
    base_url: String,
    timeout: Duration,
    proxies: HashMap<String, String>,
}

impl KavenegarClientBuilder {
    /// Create a builder with the public endpoint, a 10 second timeout and no proxy.
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: DEFAULT_TIMEOUT,
            proxies: HashMap::new(),
        }
    }

    /// Override the scheme and host requests are sent to.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the timeout applied to the whole exchange (connect, send, read body).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Register a proxy URL for a scheme.
    ///
    /// Only the `http` entry is used, and it carries all traffic.
    pub fn proxy(mut self, scheme: impl Into<String>, url: impl Into<String>) -> Self {
        self.proxies.insert(scheme.into(), url.into());
        self
    }

    /// Replace the whole scheme to proxy URL mapping.
    pub fn proxies(mut self, proxies: HashMap<String, String>) -> Self {
        self.proxies = proxies;
        self
    }

    /// Build a [`KavenegarClient`].
    pub fn build(self) -> Result<KavenegarClient, ValidationError> {
        let base_url = Url::parse(&self.base_url).map_err(|_| ValidationError::InvalidUrl {
            field: "base",
            input: self.base_url.clone(),
        })?;

        let proxy = self
            .proxies
            .get("http")
            .map(|url| {
                reqwest::Proxy::all(url.as_str()).map_err(|_| ValidationError::InvalidUrl {
                    field: "proxy",
                    input: url.clone(),
                })
            })
            .transpose()?;

        Ok(KavenegarClient {
            api_key: self.api_key,
            base_url: base_url.as_str().trim_end_matches('/').to_owned(),
            http: Arc::new(ReqwestTransport {
                timeout: self.timeout,
                proxy,
            }),
        })
    }
}

#[derive(Clone)]
/// Kavenegar API client.
///
/// Every call is a single `POST {base}/v1/{api_key}/{resource}/{operation}.json`
/// with form-encoded parameters. The client holds no per-call state, so a clone
/// can be shared freely between tasks.
pub struct KavenegarClient {
    api_key: ApiKey,
    base_url: String,
    http: Arc<dyn HttpTransport>,
}

impl fmt::Debug for KavenegarClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KavenegarClient({})", self.api_key.masked())
    }
}

impl fmt::Display for KavenegarClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KavenegarClient({})", self.api_key.masked())
    }
}

impl KavenegarClient {
    /// Create a client with default settings.
    ///
    /// For more customization, use [`KavenegarClient::builder`].
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_owned(),
            http: Arc::new(ReqwestTransport {
                timeout: DEFAULT_TIMEOUT,
                proxy: None,
            }),
        }
    }

    /// Start building a client with custom settings.
    pub fn builder(api_key: ApiKey) -> KavenegarClientBuilder {
        KavenegarClientBuilder::new(api_key)
    }

    /// Create a client from a loaded [`Config`].
    pub fn from_config(config: &Config) -> Result<Self, ValidationError> {
        Self::builder(config.api_key.clone())
            .timeout(config.timeout)
            .build()
    }

    fn url(&self, resource: &str, operation: &str) -> String {
        format!(
            "{}/{API_VERSION}/{}/{resource}/{operation}.json",
            self.base_url,
            self.api_key.path_segment()
        )
    }

    /// Call any `(resource, operation)` pair and return the `entries` payload.
    ///
    /// Errors:
    /// - [`KavenegarError::Api`] when the reply's `return.status` is not 200,
    /// - [`KavenegarError::Transport`] when the exchange fails or the body is not
    ///   a valid envelope.
    #[instrument(
        name = "kavenegar_request",
        skip_all,
        fields(
            resource = %resource,
            operation = %operation,
            key = %self.api_key,
            http.status_code = tracing::field::Empty,
            api.status = tracing::field::Empty,
        )
    )]
    pub async fn dispatch(
        &self,
        resource: &str,
        operation: &str,
        params: Option<&Params>,
    ) -> Result<Value, KavenegarError> {
        let form = encode_params(params);
        let url = self.url(resource, operation);
        debug!(params = form.len(), "sending request");

        let response = self.http.post_form(&url, form).await.map_err(|err| {
            let err = TransportError {
                reason: transport_reason(&*err),
                // The source is dropped: its Display may carry the raw key.
                message: self.api_key.redact(&error_chain(&*err)),
            };
            debug!(reason = ?err.reason, error = %err, "transport failure");
            err
        })?;

        Span::current().record("http.status_code", response.status);

        let envelope = decode_envelope(&response.body).map_err(|err| {
            let err = TransportError {
                reason: TransportReason::Decode,
                message: self.api_key.redact(&err.to_string()),
            };
            debug!(error = %err, "undecodable response");
            err
        })?;

        Span::current().record("api.status", envelope.status);

        if !envelope.is_ok() {
            debug!(api_message = ?envelope.message, "api rejected request");
            return Err(KavenegarError::Api {
                status: envelope.status,
                message: envelope.message.unwrap_or_default(),
            });
        }

        Ok(envelope.entries)
    }

    /// Call a known [`Endpoint`].
    pub async fn endpoint(
        &self,
        endpoint: Endpoint,
        params: Option<&Params>,
    ) -> Result<Value, KavenegarError> {
        self.dispatch(endpoint.resource(), endpoint.operation(), params)
            .await
    }

    /// `sms/send`: send one message to one or more receptors.
    pub async fn sms_send(&self, params: Option<&Params>) -> Result<Value, KavenegarError> {
        self.endpoint(Endpoint::SmsSend, params).await
    }

    /// `sms/sendarray`: send different messages/senders in one call.
    pub async fn sms_send_array(
        &self,
        params: Option<&Params>,
    ) -> Result<Value, KavenegarError> {
        self.endpoint(Endpoint::SmsSendArray, params).await
    }

    /// `sms/status`: delivery status by Kavenegar message id.
    pub async fn sms_status(&self, params: Option<&Params>) -> Result<Value, KavenegarError> {
        self.endpoint(Endpoint::SmsStatus, params).await
    }

    /// `sms/statuslocalmessageid`: status lookup by the caller's own message id.
    pub async fn sms_status_by_local_id(
        &self,
        params: Option<&Params>,
    ) -> Result<Value, KavenegarError> {
        self.endpoint(Endpoint::SmsStatusByLocalId, params).await
    }

    /// `sms/select`: full details of sent messages by id.
    pub async fn sms_select(&self, params: Option<&Params>) -> Result<Value, KavenegarError> {
        self.endpoint(Endpoint::SmsSelect, params).await
    }

    /// `sms/selectoutbox`: sent messages within a date range.
    pub async fn sms_select_outbox(
        &self,
        params: Option<&Params>,
    ) -> Result<Value, KavenegarError> {
        self.endpoint(Endpoint::SmsSelectOutbox, params).await
    }

    /// `sms/latestoutbox`: most recently sent messages.
    pub async fn sms_latest_outbox(
        &self,
        params: Option<&Params>,
    ) -> Result<Value, KavenegarError> {
        self.endpoint(Endpoint::SmsLatestOutbox, params).await
    }

    /// `sms/countoutbox`: number of messages sent within a date range.
    pub async fn sms_count_outbox(
        &self,
        params: Option<&Params>,
    ) -> Result<Value, KavenegarError> {
        self.endpoint(Endpoint::SmsCountOutbox, params).await
    }

    /// `sms/cancel`: cancel scheduled messages.
    pub async fn sms_cancel(&self, params: Option<&Params>) -> Result<Value, KavenegarError> {
        self.endpoint(Endpoint::SmsCancel, params).await
    }

    /// `sms/receive`: read inbound messages on a line number.
    pub async fn sms_receive(&self, params: Option<&Params>) -> Result<Value, KavenegarError> {
        self.endpoint(Endpoint::SmsReceive, params).await
    }

    /// `sms/countinbox`: number of inbound messages within a date range.
    pub async fn sms_count_inbox(
        &self,
        params: Option<&Params>,
    ) -> Result<Value, KavenegarError> {
        self.endpoint(Endpoint::SmsCountInbox, params).await
    }

    /// `sms/countpostalcode`: number of receptors in a postal code area.
    pub async fn sms_count_postal_code(
        &self,
        params: Option<&Params>,
    ) -> Result<Value, KavenegarError> {
        self.endpoint(Endpoint::SmsCountPostalCode, params).await
    }

    /// `sms/sendbypostalcode`: send to receptors in a postal code area.
    pub async fn sms_send_by_postal_code(
        &self,
        params: Option<&Params>,
    ) -> Result<Value, KavenegarError> {
        self.endpoint(Endpoint::SmsSendByPostalCode, params).await
    }

    /// `verify/lookup`: send a templated verification code.
    pub async fn verify_lookup(&self, params: Option<&Params>) -> Result<Value, KavenegarError> {
        self.endpoint(Endpoint::VerifyLookup, params).await
    }

    /// `call/maketts`: place a text-to-speech voice call.
    pub async fn call_make_tts(&self, params: Option<&Params>) -> Result<Value, KavenegarError> {
        self.endpoint(Endpoint::CallMakeTts, params).await
    }

    /// `call/status`: status of placed voice calls.
    pub async fn call_status(&self, params: Option<&Params>) -> Result<Value, KavenegarError> {
        self.endpoint(Endpoint::CallStatus, params).await
    }

    /// `account/info`: remaining credit and account type.
    pub async fn account_info(&self) -> Result<Value, KavenegarError> {
        self.endpoint(Endpoint::AccountInfo, None).await
    }

    /// `account/config`: read or change account settings.
    pub async fn account_config(&self, params: Option<&Params>) -> Result<Value, KavenegarError> {
        self.endpoint(Endpoint::AccountConfig, params).await
    }
}

fn transport_reason(err: &(dyn StdError + 'static)) -> TransportReason {
    let mut current = Some(err);
    while let Some(cause) = current {
        if cause
            .downcast_ref::<reqwest::Error>()
            .is_some_and(reqwest::Error::is_timeout)
        {
            return TransportReason::Timeout;
        }
        if cause
            .downcast_ref::<std::io::Error>()
            .is_some_and(|io| io.kind() == std::io::ErrorKind::TimedOut)
        {
            return TransportReason::Timeout;
        }
        current = cause.source();
    }
    TransportReason::Connect
}

fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
