//! scada-views — derived views and screen lifecycle for the SCADA dashboard.
//!
//! Each screen binds a refresh feed to a derived-view type and the view
//! options the user controls. Views are recomputed synchronously and in
//! full from (snapshot, options); nothing is cached between derivations.
//!
//! # Screens
//!
//! | Screen | Route | Options | View |
//! |---|---|---|---|
//! | `AlarmScreen` | `/alarms` | `show_critical_only` | `AlarmView` |
//! | `MaintenanceScreen` | `/maintenance` | `sort_by` | `MaintenanceView` |
//! | `PipelineScreen` | `/pipeline` | none | `PipelineView` |
//! | `SustainabilityScreen` | `/sustainability` | none | `SustainabilityView` |

pub mod screen;
pub mod views;

pub use screen::{
    AlarmScreen, Dashboard, MaintenanceScreen, PipelineScreen, Screen, ScreenLifecycle,
    SustainabilityScreen, ViewWatcher,
};
pub use views::*;
