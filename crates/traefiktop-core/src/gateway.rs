// ── Remote fetch gateway ──
//
// The seam between the coordinator and the network. One operation per
// entity kind; both return a tagged result and never panic across the
// boundary. `HttpGateway` is the production implementation; tests plug in
// scripted ones.

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use tracing::debug;

use traefiktop_api::transport::{TlsMode, TransportConfig};
use traefiktop_api::{BasicAuth, TraefikClient};

use crate::config::{ConnectionOptions, Credential, Endpoint, TlsVerification};
use crate::error::{EntityKind, FetchError};
use crate::model::{Router, Service};

/// Fetches routers and services from an admin API endpoint.
pub trait Gateway: Send + Sync {
    fn fetch_routers<'a>(
        &'a self,
        endpoint: &'a Endpoint,
    ) -> BoxFuture<'a, Result<Vec<Router>, FetchError>>;

    fn fetch_services<'a>(
        &'a self,
        endpoint: &'a Endpoint,
    ) -> BoxFuture<'a, Result<Vec<Service>, FetchError>>;
}

/// `Gateway` backed by the Traefik HTTP API.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: TraefikClient,
}

impl HttpGateway {
    /// Build the underlying HTTP client from connection options.
    pub fn new(options: &ConnectionOptions) -> Result<Self, FetchError> {
        let transport = build_transport(options);
        let client = TraefikClient::new(&transport)?;
        Ok(Self { client })
    }
}

fn build_transport(options: &ConnectionOptions) -> TransportConfig {
    let tls = match &options.tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    };
    TransportConfig {
        tls,
        timeout: options.timeout,
    }
}

fn basic_auth(credential: Option<&Credential>) -> Option<BasicAuth> {
    credential.map(|c| BasicAuth::new(c.username.clone(), c.password.clone()))
}

impl Gateway for HttpGateway {
    fn fetch_routers<'a>(
        &'a self,
        endpoint: &'a Endpoint,
    ) -> BoxFuture<'a, Result<Vec<Router>, FetchError>> {
        async move {
            let auth = basic_auth(endpoint.credential.as_ref());
            let raw = self
                .client
                .list_routers(&endpoint.url, auth.as_ref())
                .await
                .map_err(|e| FetchError::from(e).with_kind(EntityKind::Routers))?;
            debug!(count = raw.len(), "fetched routers");
            Ok(raw.into_iter().map(Router::from).collect())
        }
        .boxed()
    }

    fn fetch_services<'a>(
        &'a self,
        endpoint: &'a Endpoint,
    ) -> BoxFuture<'a, Result<Vec<Service>, FetchError>> {
        async move {
            let auth = basic_auth(endpoint.credential.as_ref());
            let raw = self
                .client
                .list_services(&endpoint.url, auth.as_ref())
                .await
                .map_err(|e| FetchError::from(e).with_kind(EntityKind::Services))?;
            debug!(count = raw.len(), "fetched services");
            Ok(raw.into_iter().map(Service::from).collect())
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn transport_mirrors_connection_options() {
        let options = ConnectionOptions {
            tls: TlsVerification::DangerAcceptInvalid,
            timeout: Duration::from_secs(3),
        };
        let transport = build_transport(&options);
        assert_eq!(transport.tls, TlsMode::DangerAcceptInvalid);
        assert_eq!(transport.timeout, Duration::from_secs(3));
    }
}
