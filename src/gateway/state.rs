use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::{HeaderConfig, ServiceConfig};
use crate::gateway::proxy::Upstream;
use crate::gateway::session::SessionValidator;
use crate::respond::Respond;

/// Gateway shared state: read-only tables fixed at startup plus the
/// validator and upstream seams. Cheap to clone per request.
#[derive(Clone)]
pub struct GatewayState {
    pub validator: Arc<dyn SessionValidator>,
    pub upstream: Arc<dyn Upstream>,
    pub services: Arc<BTreeMap<String, ServiceConfig>>,
    pub headers: Arc<HeaderConfig>,
    pub respond: Respond,
}

impl GatewayState {
    pub fn new(
        validator: Arc<dyn SessionValidator>,
        upstream: Arc<dyn Upstream>,
        services: BTreeMap<String, ServiceConfig>,
        headers: HeaderConfig,
        respond: Respond,
    ) -> Self {
        Self {
            validator,
            upstream,
            services: Arc::new(services),
            headers: Arc::new(headers),
            respond,
        }
    }
}
