//! HTTPS transport built on `hyper` and `rustls`.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use hyper::body::to_bytes;
use hyper::client::HttpConnector;
use hyper::header::CONTENT_TYPE;
use hyper::{Body, Client, Request};
use hyper_rustls::HttpsConnector;
use rustls::{ClientConfig, OwnedTrustAnchor, RootCertStore};
use webpki_roots::TLS_SERVER_ROOTS;

use crate::traits::{Transport, TransportError, TransportRequest, TransportResponse};

type HyperClient = Client<HttpsConnector<HttpConnector>, Body>;

/// [`Transport`] that talks to the real service over HTTPS.
#[derive(Clone)]
pub struct HyperTransport {
    client: HyperClient,
}

impl fmt::Debug for HyperTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HyperTransport").finish_non_exhaustive()
    }
}

impl HyperTransport {
    /// Builds a client trusting the bundled web PKI roots.
    #[must_use]
    pub fn new() -> Self {
        let mut roots = RootCertStore::empty();
        roots.add_trust_anchors(TLS_SERVER_ROOTS.iter().map(|anchor| {
            OwnedTrustAnchor::from_subject_spki_name_constraints(
                anchor.subject,
                anchor.spki,
                anchor.name_constraints,
            )
        }));

        let config = ClientConfig::builder()
            .with_safe_defaults()
            .with_root_certificates(roots)
            .with_no_client_auth();

        let mut http = HttpConnector::new();
        http.enforce_http(false);

        let connector = HttpsConnector::from((http, Arc::new(config)));

        Self {
            client: Client::builder().build::<_, Body>(connector),
        }
    }
}

impl Default for HyperTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HyperTransport {
    async fn post_json(
        &self,
        request: TransportRequest,
    ) -> Result<TransportResponse, TransportError> {
        let mut builder = Request::post(request.endpoint.as_str())
            .header(CONTENT_TYPE, "application/json");
        for (name, value) in &request.headers {
            builder = builder.header(*name, value.as_str());
        }
        let req = builder
            .body(Body::from(request.body))
            .map_err(|err| TransportError::new(format!("failed to build request: {err}")))?;

        let response = self
            .client
            .request(req)
            .await
            .map_err(|err| TransportError::new(format!("request failed: {err}")))?;

        let status = response.status().as_u16();
        let body = to_bytes(response.into_body())
            .await
            .map_err(|err| TransportError::new(format!("failed to read response: {err}")))?;

        Ok(TransportResponse { status, body })
    }
}
