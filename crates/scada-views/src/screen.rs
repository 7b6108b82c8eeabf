//! Screens — a refresh feed bound to a derived view and its view options.
//!
//! The navigation shell mounts and unmounts screens; each mount starts the
//! screen's scheduler and each unmount cancels it. Views are recomputed
//! from the current snapshot and options on demand, or pushed through a
//! `ViewWatcher` whenever either one changes.

use tokio::sync::watch;
use tracing::debug;

use scada_core::{ConfigResult, ScadaConfig, ScreenKind};
use scada_feed::{
    AlarmGenerator, EnergyGenerator, Generator, MachineGenerator, PipelineGenerator,
    RefreshScheduler, SnapshotReceiver,
};

use crate::views::*;

/// One dashboard screen.
pub struct Screen<G, V>
where
    G: Generator,
    V: DerivedView<Snapshot = G::Snapshot>,
{
    kind: ScreenKind,
    feed: RefreshScheduler<G>,
    options: watch::Sender<V::Options>,
}

pub type AlarmScreen = Screen<AlarmGenerator, AlarmView>;
pub type MaintenanceScreen = Screen<MachineGenerator, MaintenanceView>;
pub type PipelineScreen = Screen<PipelineGenerator, PipelineView>;
pub type SustainabilityScreen = Screen<EnergyGenerator, SustainabilityView>;

impl<G, V> Screen<G, V>
where
    G: Generator,
    V: DerivedView<Snapshot = G::Snapshot>,
{
    pub fn new(kind: ScreenKind, feed: RefreshScheduler<G>) -> Self {
        let (options, _) = watch::channel(V::Options::default());
        Self {
            kind,
            feed,
            options,
        }
    }

    /// Build a screen using the config's period and seed for `kind`.
    pub fn configured(kind: ScreenKind, generator: G, config: &ScadaConfig) -> ConfigResult<Self> {
        let feed = RefreshScheduler::seeded(
            kind.name(),
            generator,
            config.period(kind)?,
            config.seed_for(kind),
        );
        Ok(Self::new(kind, feed))
    }

    pub fn kind(&self) -> ScreenKind {
        self.kind
    }

    pub fn mount(&mut self) {
        self.feed.start();
    }

    pub fn unmount(&mut self) {
        self.feed.stop();
    }

    pub fn is_mounted(&self) -> bool {
        self.feed.is_running()
    }

    pub fn is_loading(&self) -> bool {
        self.feed.is_loading()
    }

    pub fn feed(&self) -> &RefreshScheduler<G> {
        &self.feed
    }

    pub fn options(&self) -> V::Options {
        self.options.borrow().clone()
    }

    /// Replace the view options. Watchers are only woken on a real change.
    pub fn set_options(&self, options: V::Options) {
        let changed = self.options.send_if_modified(|current| {
            if *current == options {
                return false;
            }
            *current = options;
            true
        });
        if changed {
            debug!(screen = %self.kind, "view options changed");
        }
    }

    /// Derived view of the current snapshot, `None` while loading.
    pub fn view(&self) -> Option<V> {
        let snapshot = self.feed.latest()?;
        let options = self.options();
        Some(V::derive(&snapshot, &options))
    }

    /// Watch for snapshot or option changes.
    pub fn watch(&self) -> ViewWatcher<V> {
        ViewWatcher {
            snapshots: self.feed.subscribe(),
            options: self.options.subscribe(),
        }
    }
}

impl AlarmScreen {
    pub fn from_config(config: &ScadaConfig) -> ConfigResult<Self> {
        Self::configured(
            ScreenKind::Alarms,
            AlarmGenerator::new(config.alarm_count()),
            config,
        )
    }

    pub fn set_show_critical_only(&self, show_critical_only: bool) {
        self.set_options(AlarmOptions { show_critical_only });
    }
}

impl MaintenanceScreen {
    pub fn from_config(config: &ScadaConfig) -> ConfigResult<Self> {
        Self::configured(ScreenKind::Maintenance, MachineGenerator, config)
    }

    pub fn set_sort_by(&self, sort_by: SortBy) {
        self.set_options(MaintenanceOptions { sort_by });
    }
}

impl PipelineScreen {
    pub fn from_config(config: &ScadaConfig) -> ConfigResult<Self> {
        Self::configured(
            ScreenKind::Pipeline,
            PipelineGenerator::new(config.anomaly_probability()?),
            config,
        )
    }
}

impl SustainabilityScreen {
    pub fn from_config(config: &ScadaConfig) -> ConfigResult<Self> {
        Self::configured(
            ScreenKind::Sustainability,
            EnergyGenerator::new(config.sustainability_metrics()),
            config,
        )
    }
}

/// Yields a freshly derived view each time the snapshot or options change.
pub struct ViewWatcher<V: DerivedView> {
    snapshots: SnapshotReceiver<V::Snapshot>,
    options: watch::Receiver<V::Options>,
}

impl<V: DerivedView> ViewWatcher<V> {
    /// Derive from whatever is current and mark both inputs as seen.
    pub fn current(&mut self) -> Option<V> {
        let snapshot = self.snapshots.borrow_and_update().clone()?;
        let options = self.options.borrow_and_update().clone();
        Some(V::derive(&snapshot, &options))
    }

    /// Wait for the next change. Returns `None` once the screen is dropped.
    pub async fn changed(&mut self) -> Option<V> {
        loop {
            tokio::select! {
                res = self.snapshots.changed() => res.ok()?,
                res = self.options.changed() => res.ok()?,
            }
            // An option change before the first snapshot has nothing to show.
            if let Some(view) = self.current() {
                return Some(view);
            }
        }
    }
}

/// Lifecycle operations shared by every screen, for the navigation shell.
pub trait ScreenLifecycle: Send {
    fn kind(&self) -> ScreenKind;
    fn mount(&mut self);
    fn unmount(&mut self);
    fn is_mounted(&self) -> bool;
    fn is_loading(&self) -> bool;
}

impl<G, V> ScreenLifecycle for Screen<G, V>
where
    G: Generator,
    V: DerivedView<Snapshot = G::Snapshot>,
{
    fn kind(&self) -> ScreenKind {
        Screen::kind(self)
    }

    fn mount(&mut self) {
        Screen::mount(self)
    }

    fn unmount(&mut self) {
        Screen::unmount(self)
    }

    fn is_mounted(&self) -> bool {
        Screen::is_mounted(self)
    }

    fn is_loading(&self) -> bool {
        Screen::is_loading(self)
    }
}

/// All four screens, independent of each other.
pub struct Dashboard {
    pub alarms: AlarmScreen,
    pub maintenance: MaintenanceScreen,
    pub pipeline: PipelineScreen,
    pub sustainability: SustainabilityScreen,
}

impl Dashboard {
    pub fn from_config(config: &ScadaConfig) -> ConfigResult<Self> {
        Ok(Self {
            alarms: AlarmScreen::from_config(config)?,
            maintenance: MaintenanceScreen::from_config(config)?,
            pipeline: PipelineScreen::from_config(config)?,
            sustainability: SustainabilityScreen::from_config(config)?,
        })
    }

    pub fn screen(&self, kind: ScreenKind) -> &dyn ScreenLifecycle {
        match kind {
            ScreenKind::Alarms => &self.alarms,
            ScreenKind::Maintenance => &self.maintenance,
            ScreenKind::Pipeline => &self.pipeline,
            ScreenKind::Sustainability => &self.sustainability,
        }
    }

    pub fn screen_mut(&mut self, kind: ScreenKind) -> &mut dyn ScreenLifecycle {
        match kind {
            ScreenKind::Alarms => &mut self.alarms,
            ScreenKind::Maintenance => &mut self.maintenance,
            ScreenKind::Pipeline => &mut self.pipeline,
            ScreenKind::Sustainability => &mut self.sustainability,
        }
    }

    pub fn mount(&mut self, kind: ScreenKind) {
        self.screen_mut(kind).mount();
    }

    pub fn unmount(&mut self, kind: ScreenKind) {
        self.screen_mut(kind).unmount();
    }

    pub fn unmount_all(&mut self) {
        for kind in ScreenKind::ALL {
            self.unmount(kind);
        }
    }

    /// Screens currently mounted, in catalogue order.
    pub fn mounted(&self) -> Vec<ScreenKind> {
        ScreenKind::ALL
            .into_iter()
            .filter(|kind| self.screen(*kind).is_mounted())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use scada_core::config::FeedConfig;
    use tokio::time::sleep;

    fn seeded_config(seed: u64) -> ScadaConfig {
        ScadaConfig {
            feed: Some(FeedConfig {
                seed: Some(seed),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn view_is_none_until_mounted() {
        let mut screen = AlarmScreen::from_config(&seeded_config(1)).unwrap();
        assert!(screen.is_loading());
        assert!(screen.view().is_none());

        screen.mount();
        let view = screen.view().unwrap();
        assert_eq!(view.total, 12);
        assert_eq!(
            view.critical_count + view.warning_count + view.normal_count,
            view.total
        );
        screen.unmount();
    }

    #[tokio::test(start_paused = true)]
    async fn option_change_recomputes_immediately() {
        let mut screen = AlarmScreen::from_config(&seeded_config(2)).unwrap();
        screen.mount();
        let mut watcher = screen.watch();
        let all = watcher.current().unwrap();
        assert!(!all.show_critical_only);

        screen.set_show_critical_only(true);
        let filtered = watcher.changed().await.unwrap();
        assert!(filtered.show_critical_only);
        assert!(filtered.alarms.iter().all(|r| r.alarm.severity >= 3));
        assert_eq!(filtered.total, all.total);
        // Same snapshot, so the counts are untouched.
        assert_eq!(filtered.critical_count, all.critical_count);
        screen.unmount();
    }

    #[tokio::test(start_paused = true)]
    async fn unchanged_options_do_not_wake_watchers() {
        let screen = MaintenanceScreen::from_config(&seeded_config(3)).unwrap();
        let mut options_rx = screen.options.subscribe();
        screen.set_sort_by(SortBy::Rul);
        assert!(!options_rx.has_changed().unwrap());
        screen.set_sort_by(SortBy::Name);
        assert!(options_rx.has_changed().unwrap());
        assert_eq!(screen.options().sort_by, SortBy::Name);
    }

    #[tokio::test(start_paused = true)]
    async fn watcher_follows_refreshes() {
        let mut screen = PipelineScreen::from_config(&seeded_config(4)).unwrap();
        let mut watcher = screen.watch();
        screen.mount();

        let first = watcher.changed().await.unwrap();
        let second = watcher.changed().await.unwrap();
        assert_eq!(screen.feed().generations(), 2);
        assert_ne!(first.reading, second.reading);
        screen.unmount();
    }

    #[tokio::test(start_paused = true)]
    async fn maintenance_sort_option_applies() {
        let mut screen = MaintenanceScreen::from_config(&seeded_config(5)).unwrap();
        screen.mount();
        screen.set_sort_by(SortBy::Status);
        let view = screen.view().unwrap();
        let statuses: Vec<_> = view.machines.iter().map(|m| m.machine.status).collect();
        let mut sorted = statuses.clone();
        sorted.sort();
        assert_eq!(statuses, sorted);
        screen.unmount();
    }

    #[tokio::test(start_paused = true)]
    async fn unmounted_screen_stops_refreshing() {
        let mut screen = SustainabilityScreen::from_config(&seeded_config(6)).unwrap();
        screen.mount();
        sleep(Duration::from_millis(15_001)).await;
        assert_eq!(screen.feed().generations(), 2);

        screen.unmount();
        sleep(Duration::from_secs(120)).await;
        assert_eq!(screen.feed().generations(), 2);
        assert_eq!(screen.view().unwrap().samples.len(), 24);
    }

    #[tokio::test(start_paused = true)]
    async fn dashboard_mounts_screens_independently() {
        let mut dashboard = Dashboard::from_config(&seeded_config(7)).unwrap();
        assert!(dashboard.mounted().is_empty());

        dashboard.mount(ScreenKind::Pipeline);
        dashboard.mount(ScreenKind::Alarms);
        assert_eq!(
            dashboard.mounted(),
            vec![ScreenKind::Alarms, ScreenKind::Pipeline]
        );
        assert!(dashboard.screen(ScreenKind::Maintenance).is_loading());
        assert!(!dashboard.screen(ScreenKind::Alarms).is_loading());

        // 6s pipeline ticks once; 8s alarms have not ticked yet.
        sleep(Duration::from_millis(6_001)).await;
        assert_eq!(dashboard.pipeline.feed().generations(), 2);
        assert_eq!(dashboard.alarms.feed().generations(), 1);

        dashboard.unmount_all();
        assert!(dashboard.mounted().is_empty());
    }

    #[test]
    fn dashboard_rejects_bad_probability() {
        let config = ScadaConfig {
            feed: Some(FeedConfig {
                anomaly_probability: Some(-0.1),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(Dashboard::from_config(&config).is_err());
    }
}
