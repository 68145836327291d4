use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use uuid::Uuid;

use crate::aggregator::{Aggregator, Subscription};
use crate::bands::{validate_active_bands, validate_bands, Band, BandConfigError};
use crate::models::RunningTotalSnapshot;
use crate::sampling::{ContentLocator, ObservationHost, SampleStore, SamplingReport, VisibilitySampler};
use crate::settings::ReadTimeSettings;
use crate::utils::lock_or_recover;
use crate::visibility::PageVisibility;

const ENABLE_LOGS: bool = true;

use crate::log_info;

/// Owns the sampling pipeline for one page view at a time.
///
/// `end_page` (also run on drop) disconnects every observation, stops the
/// aggregator and clears the sample store, so nothing from a previous page keeps
/// firing after navigation.
pub struct ReadingSession<H: ObservationHost, L> {
    locator: L,
    store: Arc<Mutex<SampleStore>>,
    page: Arc<Mutex<PageVisibility>>,
    sampler: VisibilitySampler<H>,
    aggregator: Aggregator,
    mount_buffer: Duration,
    page_view: Option<PageView>,
}

#[derive(Debug, Clone)]
struct PageView {
    id: Uuid,
    pathname: String,
}

impl<H, L> ReadingSession<H, L>
where
    H: ObservationHost,
    L: ContentLocator<H::Region>,
{
    pub fn new(
        host: Arc<H>,
        locator: L,
        bands: Vec<Band>,
        settings: &ReadTimeSettings,
    ) -> Result<Self, BandConfigError> {
        validate_bands(&bands)?;
        validate_active_bands(&bands, &settings.active_bands)?;

        let store = Arc::new(Mutex::new(SampleStore::new()));
        let page = Arc::new(Mutex::new(PageVisibility::new()));
        let sampler = VisibilitySampler::new(host, bands, store.clone());
        let aggregator = Aggregator::new(
            store.clone(),
            page.clone(),
            settings.active_bands.clone(),
            settings.tick_interval(),
        );

        Ok(Self {
            locator,
            store,
            page,
            sampler,
            aggregator,
            mount_buffer: settings.content_root_mount_buffer(),
            page_view: None,
        })
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    pub fn get_snapshot(&self) -> Arc<RunningTotalSnapshot> {
        self.aggregator.get_snapshot()
    }

    pub fn subscribe<F>(&self, on_update: F) -> Subscription
    where
        F: Fn(&Arc<RunningTotalSnapshot>) + Send + Sync + 'static,
    {
        self.aggregator.subscribe(on_update)
    }

    pub fn current_pathname(&self) -> Option<&str> {
        self.page_view.as_ref().map(|view| view.pathname.as_str())
    }

    /// Forwards the host's page-visibility signal.
    pub fn set_page_visible(&self, is_visible: bool) {
        lock_or_recover(&self.page).set_visible(is_visible, Utc::now().timestamp_millis());
    }

    /// Scans `regions`, observes every (target, band) pair and starts the
    /// aggregator. A page already in progress is torn down first.
    pub fn begin_page(
        &mut self,
        href: &str,
        pathname: &str,
        regions: &[H::Region],
    ) -> Result<SamplingReport> {
        self.end_page();

        let view = PageView {
            id: Uuid::new_v4(),
            pathname: pathname.to_string(),
        };
        let report = self.sampler.sample_regions(&self.locator, href, regions);
        self.aggregator.start()?;

        log_info!(
            "page view {} started for {} ({} targets)",
            view.id,
            view.pathname,
            report.anchored
        );
        self.page_view = Some(view);
        Ok(report)
    }

    /// Tears down the current page, waits for the new content root to mount,
    /// then begins the new page.
    pub async fn navigate(
        &mut self,
        href: &str,
        pathname: &str,
        regions: &[H::Region],
    ) -> Result<SamplingReport> {
        self.end_page();
        tokio::time::sleep(self.mount_buffer).await;
        self.begin_page(href, pathname, regions)
    }

    /// Releases everything tied to the current page. Safe to call repeatedly.
    pub fn end_page(&mut self) {
        self.sampler.disconnect_all();
        self.aggregator.stop();
        lock_or_recover(&self.store).clear();

        if let Some(view) = self.page_view.take() {
            log_info!("page view {} ended for {}", view.id, view.pathname);
        }
    }
}

impl<H: ObservationHost, L> Drop for ReadingSession<H, L> {
    fn drop(&mut self) {
        self.sampler.disconnect_all();
        self.aggregator.stop();
        lock_or_recover(&self.store).clear();
    }
}
