//! Control-cycle phase machine.
//!
//! One control cycle walks a fixed ring of phases:
//!
//! ```text
//! ┌──────┐   ┌─────────────────────┐   ┌────────────────┐   ┌──────────┐
//! │ Idle │──▶│ AcquireMeasurements │──▶│ ComputeDerived │──▶│ Classify │
//! └──────┘   └─────────────────────┘   └────────────────┘   └──────────┘
//!    ▲                                                            │
//!    │   ┌──────────────────┐   ┌───────────────┐   ┌─────────────▼┐
//!    └───│ PublishTelemetry │◀──│ ActuateRemote │◀──│ ActuateLocal │
//!        └──────────────────┘   └───────────────┘   └──────────────┘
//! ```
//!
//! The table is static: every phase has exactly one successor, so phases
//! can neither overlap nor be skipped.  The
//! [`ControlLoop`](crate::app::service::ControlLoop) calls
//! [`CycleFsm::advance`] and runs the work for whatever phase it lands on;
//! returning to `Idle` ends the cycle.

pub mod context;

use log::{debug, trace};

// ---------------------------------------------------------------------------
// Phase identity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CyclePhase {
    Idle = 0,
    AcquireMeasurements = 1,
    ComputeDerived = 2,
    Classify = 3,
    ActuateLocal = 4,
    ActuateRemote = 5,
    PublishTelemetry = 6,
}

impl CyclePhase {
    /// Total number of phases, used to size the table array.
    pub const COUNT: usize = 7;

    /// Convert an index back to `CyclePhase`.  Out-of-range indices map to
    /// `Idle` (debug builds assert).
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Idle,
            1 => Self::AcquireMeasurements,
            2 => Self::ComputeDerived,
            3 => Self::Classify,
            4 => Self::ActuateLocal,
            5 => Self::ActuateRemote,
            6 => Self::PublishTelemetry,
            _ => {
                debug_assert!(false, "invalid phase index: {idx}");
                Self::Idle
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Phase descriptor (one row in the table)
// ---------------------------------------------------------------------------

pub struct PhaseDescriptor {
    pub id: CyclePhase,
    pub name: &'static str,
    pub next: CyclePhase,
}

/// Build the phase ring.  Indexed by `CyclePhase as usize`.
pub fn build_phase_table() -> [PhaseDescriptor; CyclePhase::COUNT] {
    use CyclePhase::*;
    [
        PhaseDescriptor { id: Idle, name: "idle", next: AcquireMeasurements },
        PhaseDescriptor { id: AcquireMeasurements, name: "acquire", next: ComputeDerived },
        PhaseDescriptor { id: ComputeDerived, name: "derive", next: Classify },
        PhaseDescriptor { id: Classify, name: "classify", next: ActuateLocal },
        PhaseDescriptor { id: ActuateLocal, name: "actuate-local", next: ActuateRemote },
        PhaseDescriptor { id: ActuateRemote, name: "actuate-remote", next: PublishTelemetry },
        PhaseDescriptor { id: PublishTelemetry, name: "publish", next: Idle },
    ]
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

pub struct CycleFsm {
    table: [PhaseDescriptor; CyclePhase::COUNT],
    current: usize,
    /// Cycles started since construction.
    cycle_count: u64,
    /// `uptime_ms` at which the current phase was entered.
    entered_at_ms: u64,
}

impl Default for CycleFsm {
    fn default() -> Self {
        Self::new()
    }
}

impl CycleFsm {
    pub fn new() -> Self {
        let table = build_phase_table();
        debug_assert!(table.iter().enumerate().all(|(i, d)| d.id as usize == i));
        Self {
            table,
            current: CyclePhase::Idle as usize,
            cycle_count: 0,
            entered_at_ms: 0,
        }
    }

    /// Move to the successor of the current phase and return it.
    /// Leaving `Idle` starts a new cycle.
    pub fn advance(&mut self, now_ms: u64) -> CyclePhase {
        let from = &self.table[self.current];
        let next = from.next as usize;

        if from.id == CyclePhase::Idle {
            self.cycle_count += 1;
            debug!("cycle {} start", self.cycle_count);
        } else {
            trace!(
                "phase {} took {} ms",
                from.name,
                now_ms.saturating_sub(self.entered_at_ms)
            );
        }
        debug!("phase: {} -> {}", from.name, self.table[next].name);

        self.current = next;
        self.entered_at_ms = now_ms;
        self.current_phase()
    }

    pub fn current_phase(&self) -> CyclePhase {
        CyclePhase::from_index(self.current)
    }

    pub fn phase_name(&self) -> &'static str {
        self.table[self.current].name
    }

    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }
}
