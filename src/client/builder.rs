use crate::client::core::StreamClient;
use crate::config::ClientConfig;
use crate::diagnostics::DiagnosticSink;
use crate::pipeline::StreamFormat;
use crate::transport::{EventSource, HttpTransport};
use crate::Result;
use std::sync::Arc;

/// Builder for creating stream clients with custom configuration.
///
/// Without an explicit config the builder reads `TERRITORY_*` environment variables.
pub struct StreamClientBuilder {
    config: Option<ClientConfig>,
    source: Option<Arc<dyn EventSource>>,
    format: Option<StreamFormat>,
    sink: Arc<dyn DiagnosticSink>,
    /// Override base URL (primarily for testing with mock servers)
    base_url_override: Option<String>,
}

impl StreamClientBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            source: None,
            format: None,
            sink: crate::diagnostics::tracing_sink(),
            base_url_override: None,
        }
    }

    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Use a custom event source instead of the HTTP transport.
    pub fn event_source(mut self, source: Arc<dyn EventSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Share an existing HTTP transport (e.g. with a [`crate::api::DashboardClient`]).
    pub fn transport(mut self, transport: Arc<HttpTransport>) -> Self {
        self.format = self.format.or(Some(transport.config().stream_format));
        self.source = Some(transport);
        self
    }

    /// Override the stream framing. Defaults to the configured format.
    pub fn stream_format(mut self, format: StreamFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Inject a diagnostic sink. Default forwards to `tracing`.
    pub fn diagnostic_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Override the base URL from the configuration.
    ///
    /// This is primarily for testing with mock servers.
    pub fn base_url_override(mut self, base_url: impl Into<String>) -> Self {
        self.base_url_override = Some(base_url.into());
        self
    }

    pub fn build(self) -> Result<StreamClient> {
        let (source, config_format): (Arc<dyn EventSource>, StreamFormat) = match self.source {
            Some(source) => (source, StreamFormat::default()),
            None => {
                let mut config = match self.config {
                    Some(config) => config,
                    None => ClientConfig::from_env()?,
                };
                if let Some(url) = self.base_url_override {
                    config.base_url = url;
                }
                let format = config.stream_format;
                (Arc::new(HttpTransport::new(config)?), format)
            }
        };

        Ok(StreamClient::from_parts(
            source,
            self.format.unwrap_or(config_format),
            self.sink,
        ))
    }
}

impl Default for StreamClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
