//! Shared application state.

use std::sync::Arc;

use provisioner_dispatcher::{
    CancellationToken, Collaborators, OutcomeSink, PayloadBuilder, RemoteClient, ResponseDecoder,
};
use provisioner_soap::{CreateSubscriberPayload, HttpRemoteClient, SoapError, SoapResponseDecoder};

use crate::config::ServerConfig;

/// Shared application state.
pub struct AppState {
    /// Server configuration.
    pub config: ServerConfig,

    /// Payload builder shared by every run.
    pub payload: Arc<dyn PayloadBuilder>,

    /// Transport shared by every run.
    pub client: Arc<dyn RemoteClient>,

    /// Response decoder shared by every run.
    pub decoder: Arc<dyn ResponseDecoder>,

    /// Cancelled on shutdown; every run observes a child of it.
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Create state with the SOAP adapters.
    pub fn new(config: ServerConfig) -> Result<Arc<Self>, SoapError> {
        let client = HttpRemoteClient::new(config.request_timeout())?;
        Ok(Self::with_client(config, Arc::new(client)))
    }

    /// Create state with a custom transport.
    pub fn with_client(config: ServerConfig, client: Arc<dyn RemoteClient>) -> Arc<Self> {
        Arc::new(Self {
            config,
            payload: Arc::new(CreateSubscriberPayload::default()),
            client,
            decoder: Arc::new(SoapResponseDecoder),
            shutdown: CancellationToken::new(),
        })
    }

    /// Collaborators for one run writing to `sink`.
    pub fn collaborators(&self, sink: Arc<dyn OutcomeSink>) -> Collaborators {
        Collaborators::new(
            self.payload.clone(),
            self.client.clone(),
            self.decoder.clone(),
            sink,
        )
    }
}
