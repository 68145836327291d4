use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::bands::Band;
use crate::models::Target;
use crate::utils::lock_or_recover;

use super::host::{ContentLocator, ObservationHandle, ObservationHost, ObserveError};
use super::producer::create_on_visibility_change;
use super::store::SampleStore;

const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

/// Outcome of scanning one page's content regions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SamplingReport {
    pub anchored: usize,
    pub skipped: usize,
    pub observations: usize,
    pub disabled: bool,
}

/// Registers one observation per (target, band) pair and feeds transitions into
/// the shared [`SampleStore`]. Every registration is released by
/// [`VisibilitySampler::disconnect_all`] or when the sampler is dropped.
pub struct VisibilitySampler<H: ObservationHost> {
    host: Arc<H>,
    bands: Vec<Band>,
    store: Arc<Mutex<SampleStore>>,
    handles: Vec<ObservationHandle>,
    disabled: bool,
}

impl<H: ObservationHost> VisibilitySampler<H> {
    pub fn new(host: Arc<H>, bands: Vec<Band>, store: Arc<Mutex<SampleStore>>) -> Self {
        Self {
            host,
            bands,
            store,
            handles: Vec::new(),
            disabled: false,
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn active_observations(&self) -> usize {
        self.handles.len()
    }

    /// Anchors each region and observes it in every band. Regions the locator
    /// cannot anchor are skipped. A host without observation support disables
    /// the sampler instead of failing; targets are still registered so they
    /// report zero totals.
    pub fn sample_regions<L>(
        &mut self,
        locator: &L,
        href: &str,
        regions: &[H::Region],
    ) -> SamplingReport
    where
        L: ContentLocator<H::Region>,
    {
        let mut report = SamplingReport::default();
        let mut unsupported = self.disabled || !self.host.is_supported();
        let viewport_height = self.host.viewport_height();

        for region in regions {
            let located = match locator.locate(region) {
                Ok(located) => located,
                Err(err) => {
                    log_warn!("skipping content region: {}", err);
                    report.skipped += 1;
                    continue;
                }
            };

            let target = Target::from_selector(&located.selector, href, located.snippet);
            let target_id = target.id.clone();
            lock_or_recover(&self.store).register(target);
            report.anchored += 1;

            for band in &self.bands {
                if unsupported {
                    break;
                }
                let callback = create_on_visibility_change(
                    self.store.clone(),
                    target_id.clone(),
                    band.friendly_key.clone(),
                );
                match self
                    .host
                    .observe(region, band.root_margin(viewport_height), callback)
                {
                    Ok(handle) => {
                        self.handles.push(handle);
                        report.observations += 1;
                    }
                    Err(ObserveError::Unsupported) => unsupported = true,
                    Err(err) => {
                        log_warn!(
                            "failed to observe {} in band {}: {}",
                            target_id,
                            band.friendly_key,
                            err
                        );
                    }
                }
            }
        }

        if unsupported {
            self.disable();
            report.observations = 0;
        }
        report.disabled = self.disabled;

        log_info!(
            "sampling {} targets over {} bands ({} skipped, {} observations)",
            report.anchored,
            self.bands.len(),
            report.skipped,
            report.observations
        );
        report
    }

    /// Cancels every observation registered so far.
    pub fn disconnect_all(&mut self) {
        for handle in self.handles.drain(..) {
            handle.cancel();
        }
    }

    fn disable(&mut self) {
        if !self.disabled {
            log_warn!("visibility observation unavailable; reading totals stay at zero");
        }
        self.disabled = true;
        self.disconnect_all();
    }
}

impl<H: ObservationHost> Drop for VisibilitySampler<H> {
    fn drop(&mut self) {
        self.disconnect_all();
    }
}
