//! Per-partition renderer configuration

use std::sync::Arc;

use skiff_tabs::RendererConfig;

/// Shared renderer configurations for the normal and incognito partitions.
///
/// Every tab of a partition renders with the same configuration. Once a
/// partition loses its last tab its configuration is replaced, so nothing
/// carries over into the next tab opened there.
#[derive(Debug)]
pub struct RendererConfigs {
    normal: Arc<RendererConfig>,
    incognito: Arc<RendererConfig>,
    popups_allowed: bool,
}

impl RendererConfigs {
    pub fn new(popups_allowed: bool) -> Self {
        Self {
            normal: RendererConfig::new(false, popups_allowed),
            incognito: RendererConfig::new(true, popups_allowed),
            popups_allowed,
        }
    }

    pub fn get(&self, incognito: bool) -> &Arc<RendererConfig> {
        if incognito {
            &self.incognito
        } else {
            &self.normal
        }
    }

    pub fn reset(&mut self, incognito: bool) {
        let fresh = RendererConfig::new(incognito, self.popups_allowed);
        tracing::debug!(incognito, config = %fresh.id(), "Reset renderer configuration");
        if incognito {
            self.incognito = fresh;
        } else {
            self.normal = fresh;
        }
    }

    pub fn set_popups_allowed(&mut self, allowed: bool) {
        self.popups_allowed = allowed;
        self.normal.set_popups_allowed(allowed);
        self.incognito.set_popups_allowed(allowed);
    }
}
