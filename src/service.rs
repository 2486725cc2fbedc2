//! The refresh cycle: fetch both manifests and the overlay concurrently,
//! then reconcile them into a new [`Catalog`] snapshot.

use std::{sync::Arc, time::Duration};

use futures::future::try_join3;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use url::Url;

use crate::{
    catalog::{reconcile, Catalog},
    decode::decode,
    error::{CatalogError, Document},
    fetch::{fetch, Endpoint, Transport, FETCH_TIMEOUT},
    install::InstallStateResolver,
    manifest::{parse_api_links, parse_mod_links, Platform},
    model::{ApiManifest, ManifestEntry},
    overlay::{parse_overlay, OverlayMap},
};

pub const MOD_LINKS_URI: &str =
    "https://raw.githubusercontent.com/hk-modding/modlinks/main/ModLinks.xml";
pub const API_LINKS_URI: &str =
    "https://raw.githubusercontent.com/hk-modding/modlinks/main/ApiLinks.xml";
pub const FALLBACK_MOD_LINKS_URI: &str =
    "https://cdn.jsdelivr.net/gh/hk-modding/modlinks@latest/ModLinks.xml";
pub const FALLBACK_API_LINKS_URI: &str =
    "https://cdn.jsdelivr.net/gh/hk-modding/modlinks@latest/ApiLinks.xml";
pub const OVERLAY_URI: &str =
    "https://ppcdn.dxinzf.com/ppstatic/tool/HollowKnight/HKChineseName.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub mod_links: Endpoint,
    pub api_links: Endpoint,
    pub overlay: Endpoint,
}

impl Endpoints {
    /// The public ModLinks repository with its CDN mirror.
    pub fn official() -> Result<Self, url::ParseError> {
        Ok(Self {
            mod_links: Endpoint::new(
                Url::parse(MOD_LINKS_URI)?,
                Url::parse(FALLBACK_MOD_LINKS_URI)?,
            ),
            api_links: Endpoint::new(
                Url::parse(API_LINKS_URI)?,
                Url::parse(FALLBACK_API_LINKS_URI)?,
            ),
            overlay: Endpoint::single(Url::parse(OVERLAY_URI)?),
        })
    }
}

/// Produces catalog snapshots from remote manifests and local install state.
///
/// Every successful [`refresh`](Self::refresh) builds a new catalog from
/// scratch and publishes it; a failed refresh leaves the last published
/// snapshot in place.
pub struct CatalogService {
    transport: Arc<dyn Transport>,
    resolver: Arc<dyn InstallStateResolver>,
    endpoints: Endpoints,
    platform: Platform,
    timeout: Duration,
    published: watch::Sender<Option<Arc<Catalog>>>,
}

impl CatalogService {
    pub fn new(
        transport: Arc<dyn Transport>,
        resolver: Arc<dyn InstallStateResolver>,
        endpoints: Endpoints,
    ) -> Self {
        let (published, _) = watch::channel(None);
        Self {
            transport,
            resolver,
            endpoints,
            platform: Platform::current(),
            timeout: FETCH_TIMEOUT,
            published,
        }
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Overrides the per-attempt timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The most recently published catalog, if any refresh has succeeded.
    pub fn current(&self) -> Option<Arc<Catalog>> {
        self.published.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<Catalog>>> {
        self.published.subscribe()
    }

    /// Runs one refresh cycle.
    ///
    /// Both manifests are required; the first failure among them ends the
    /// cycle and drops every other in-flight request. The overlay is best
    /// effort and degrades to an empty map. Cancellation ends the cycle
    /// whichever request is still in flight, and nothing is published.
    pub async fn refresh(&self, cancel: &CancellationToken) -> Result<Arc<Catalog>, CatalogError> {
        info!("Refreshing mod catalog");
        let (entries, api, overlay) = try_join3(
            self.fetch_mod_links(cancel),
            self.fetch_api_links(cancel),
            self.fetch_overlay(cancel),
        )
        .await?;
        if cancel.is_cancelled() {
            return Err(CatalogError::Cancelled);
        }

        let catalog = Arc::new(reconcile(&entries, api, &overlay, self.resolver.as_ref()));
        self.published.send_replace(Some(Arc::clone(&catalog)));
        Ok(catalog)
    }

    async fn fetch_text(
        &self,
        document: Document,
        endpoint: &Endpoint,
        cancel: &CancellationToken,
    ) -> Result<String, CatalogError> {
        let payload = fetch(self.transport.as_ref(), endpoint, self.timeout, cancel)
            .await
            .map_err(|source| CatalogError::fetch(document, source))?;
        info!("Fetched {} from {} ({})", document, payload.uri, payload.served_by);
        decode(&payload.body, payload.content_encoding.as_deref())
            .map_err(|source| CatalogError::Decode { document, source })
    }

    async fn fetch_mod_links(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<ManifestEntry>, CatalogError> {
        let document = Document::ModLinks;
        let text = self
            .fetch_text(document, &self.endpoints.mod_links, cancel)
            .await?;
        parse_mod_links(&text, self.platform)
            .map_err(|source| CatalogError::Parse { document, source })
    }

    async fn fetch_api_links(&self, cancel: &CancellationToken) -> Result<ApiManifest, CatalogError> {
        let document = Document::ApiLinks;
        let text = self
            .fetch_text(document, &self.endpoints.api_links, cancel)
            .await?;
        parse_api_links(&text, self.platform)
            .map_err(|source| CatalogError::Parse { document, source })
    }

    async fn fetch_overlay(&self, cancel: &CancellationToken) -> Result<OverlayMap, CatalogError> {
        let document = Document::Overlay;
        let result = self
            .fetch_text(document, &self.endpoints.overlay, cancel)
            .await
            .and_then(|text| {
                parse_overlay(&text).map_err(|source| CatalogError::Parse { document, source })
            });
        match result {
            Ok(overlay) => Ok(overlay),
            Err(CatalogError::Cancelled) => Err(CatalogError::Cancelled),
            Err(e) => {
                warn!("Continuing without localization: {}", e);
                Ok(OverlayMap::new())
            }
        }
    }
}
