//! scada-feed — periodic snapshot feeds for the SCADA screens.
//!
//! Each screen is fed by a generator that produces a complete snapshot
//! from an injected RNG, driven by a scheduler that replaces the snapshot
//! wholesale on a fixed period.
//!
//! # Architecture
//!
//! ```text
//! RefreshScheduler<G>
//!   ├── start() → generate once, then spawn the tick loop
//!   │   ├── interval (missed ticks skipped)
//!   │   ├── G::generate(rng, now) → snapshot
//!   │   └── watch::Sender<Option<Arc<snapshot>>>
//!   └── stop() / Drop → deactivate under lock, signal, abort
//! ```
//!
//! | Screen | Generator | Period |
//! |---|---|---|
//! | alarms | `AlarmGenerator` | 8s |
//! | maintenance | `MachineGenerator` | 10s |
//! | pipeline | `PipelineGenerator` | 6s |
//! | sustainability | `EnergyGenerator` | 15s |

pub mod generator;
pub mod scheduler;

pub use generator::{
    AlarmGenerator, EnergyGenerator, Generator, MachineGenerator, PipelineGenerator,
};
pub use scheduler::{RefreshScheduler, SnapshotReceiver};
