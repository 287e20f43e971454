//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured interlock events to the
//! `log` façade.  A telemetry or bus adapter would implement the same trait.

use core::fmt::Write;

use heapless::String;
use log::{error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Initialized => {
                info!("DEVICE | initialized");
            }
            AppEvent::CycleVerified { mask } => {
                info!("GATES | verified, mask={}", mask);
            }
            AppEvent::GateRejected { mask } => {
                let mut failed: String<64> = String::new();
                for gate in mask.failed() {
                    if !failed.is_empty() {
                        let _ = failed.push(',');
                    }
                    let _ = write!(failed, "{gate}");
                }
                warn!("GATES | rejected, mask={} failed={}", mask, failed);
            }
            AppEvent::PartialSpin { interference } => {
                info!("SPIN | partial, interference={:.4}", interference);
            }
            AppEvent::RetryScheduled { attempt } => {
                info!("SPIN | retry #{}", attempt);
            }
            AppEvent::MeasurementFailed { interference } => match interference {
                Some(x) => warn!("SPIN | measurement error, interference={:.4}", x),
                None => warn!("SPIN | no sample"),
            },
            AppEvent::Halted => {
                error!("DEVICE | halted, emergency latch set");
            }
        }
    }
}
