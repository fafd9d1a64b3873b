//! Periodic control cycle: tick → publish → sleep to the next deadline.
//!
//! Ticks are paced against absolute deadlines (`next += period`), so
//! scheduling jitter does not accumulate into drift. An overrun is counted
//! and logged, never fatal; when the loop falls behind by more than a period
//! the deadline is re-anchored to now instead of bursting to catch up.
//!
//! ## RT Setup Sequence
//! 1. `mlockall(MCL_CURRENT | MCL_FUTURE)`: lock all pages.
//! 2. Prefault stack pages.
//! 3. `sched_setaffinity`: pin to one CPU core.
//! 4. `sched_setscheduler(SCHED_FIFO, prio)`: RT priority.
//!
//! All four are no-ops unless built with the `rt` feature.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use elevator_common::elevator::telemetry::ElevatorTelemetry;
use elevator_common::hal::ActuatorDevice;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::state::ElevatorController;
use crate::telemetry::TelemetrySink;

// ─── Cycle Statistics ───────────────────────────────────────────────

/// O(1) per-cycle timing statistics.
///
/// Updated every cycle with no allocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleStats {
    /// Total cycles executed.
    pub cycle_count: u64,
    /// Last cycle duration [ns].
    pub last_cycle_ns: u64,
    /// Minimum cycle duration [ns].
    pub min_cycle_ns: u64,
    /// Maximum cycle duration [ns].
    pub max_cycle_ns: u64,
    /// Running sum for average computation.
    pub sum_cycle_ns: u128,
    /// Cycles whose body took longer than the period.
    pub overruns: u64,
    /// Maximum wake-up latency [ns] (actual minus scheduled start).
    pub max_latency_ns: u64,
    /// Ticks that skipped commanding because a sensor read failed.
    pub skipped_ticks: u64,
    /// Ticks that reported any fault.
    pub faulted_ticks: u64,
}

impl CycleStats {
    /// Create a new zeroed stats instance.
    pub const fn new() -> Self {
        Self {
            cycle_count: 0,
            last_cycle_ns: 0,
            min_cycle_ns: u64::MAX,
            max_cycle_ns: 0,
            sum_cycle_ns: 0,
            overruns: 0,
            max_latency_ns: 0,
            skipped_ticks: 0,
            faulted_ticks: 0,
        }
    }

    /// Record a cycle duration. O(1), no allocation.
    #[inline]
    pub fn record(&mut self, duration_ns: u64, latency_ns: u64) {
        self.cycle_count += 1;
        self.last_cycle_ns = duration_ns;
        self.min_cycle_ns = self.min_cycle_ns.min(duration_ns);
        self.max_cycle_ns = self.max_cycle_ns.max(duration_ns);
        self.sum_cycle_ns += u128::from(duration_ns);
        self.max_latency_ns = self.max_latency_ns.max(latency_ns);
    }

    /// Count the outcome of one tick.
    #[inline]
    pub fn record_outcome(&mut self, telemetry: &ElevatorTelemetry) {
        if telemetry.skipped {
            self.skipped_ticks += 1;
        }
        if !telemetry.faults.is_empty() {
            self.faulted_ticks += 1;
        }
    }

    /// Average cycle time [ns] (returns 0 if no cycles).
    #[inline]
    pub fn avg_cycle_ns(&self) -> u64 {
        if self.cycle_count == 0 {
            0
        } else {
            (self.sum_cycle_ns / u128::from(self.cycle_count)) as u64
        }
    }
}

impl Default for CycleStats {
    fn default() -> Self {
        Self::new()
    }
}

// ─── RT Setup ───────────────────────────────────────────────────────

/// Errors during RT setup.
#[derive(Debug, Error)]
pub enum CycleError {
    /// RT system call failed.
    #[error("RT setup error: {0}")]
    RtSetup(String),
}

/// Lock all current and future memory pages.
#[cfg(feature = "rt")]
fn rt_mlockall() -> Result<(), CycleError> {
    use nix::sys::mman::{MlockallFlags, mlockall};
    mlockall(MlockallFlags::MCL_CURRENT | MlockallFlags::MCL_FUTURE)
        .map_err(|e| CycleError::RtSetup(format!("mlockall failed: {e}")))
}

#[cfg(not(feature = "rt"))]
fn rt_mlockall() -> Result<(), CycleError> {
    Ok(())
}

/// Touch 256 KiB of stack so the RT loop does not page-fault on it.
#[cfg(feature = "rt")]
fn prefault_stack() {
    let mut buf = [0u8; 256 * 1024];
    for byte in buf.iter_mut() {
        // SAFETY: `byte` is a valid, exclusive reference into `buf`.
        unsafe { core::ptr::write_volatile(byte, 0xFF) };
    }
    core::hint::black_box(&buf);
}

#[cfg(not(feature = "rt"))]
fn prefault_stack() {}

/// Pin the current thread to `cpu`.
#[cfg(feature = "rt")]
fn rt_set_affinity(cpu: usize) -> Result<(), CycleError> {
    use nix::sched::{CpuSet, sched_setaffinity};
    use nix::unistd::Pid;

    let mut cpuset = CpuSet::new();
    cpuset
        .set(cpu)
        .map_err(|e| CycleError::RtSetup(format!("CpuSet::set({cpu}) failed: {e}")))?;
    sched_setaffinity(Pid::from_raw(0), &cpuset)
        .map_err(|e| CycleError::RtSetup(format!("sched_setaffinity failed: {e}")))
}

#[cfg(not(feature = "rt"))]
fn rt_set_affinity(_cpu: usize) -> Result<(), CycleError> {
    Ok(())
}

/// Set SCHED_FIFO with the given RT priority.
#[cfg(feature = "rt")]
fn rt_set_scheduler(priority: i32) -> Result<(), CycleError> {
    let param = libc::sched_param {
        sched_priority: priority,
    };
    // SAFETY: `param` is a valid sched_param; pid 0 is the calling thread.
    let ret = unsafe { libc::sched_setscheduler(0, libc::SCHED_FIFO, &param) };
    if ret != 0 {
        let err = std::io::Error::last_os_error();
        return Err(CycleError::RtSetup(format!(
            "sched_setscheduler(SCHED_FIFO, {priority}) failed: {err}"
        )));
    }
    Ok(())
}

#[cfg(not(feature = "rt"))]
fn rt_set_scheduler(_priority: i32) -> Result<(), CycleError> {
    Ok(())
}

/// Perform the full RT setup sequence.
///
/// Must be called before entering the cycle loop.
pub fn rt_setup(cpu_core: usize, rt_priority: i32) -> Result<(), CycleError> {
    if !(1..=99).contains(&rt_priority) {
        return Err(CycleError::RtSetup(format!(
            "priority {rt_priority} out of range [1, 99]"
        )));
    }
    rt_mlockall()?;
    prefault_stack();
    rt_set_affinity(cpu_core)?;
    rt_set_scheduler(rt_priority)?;
    debug!(cpu_core, rt_priority, rt = cfg!(feature = "rt"), "RT setup done");
    Ok(())
}

// ─── Cycle Runner ───────────────────────────────────────────────────

/// Owns the controller and a telemetry sink and ticks them periodically.
pub struct CycleRunner<D: ActuatorDevice, S: TelemetrySink> {
    controller: ElevatorController<D>,
    sink: S,
    period: Duration,
    max_ticks: Option<u64>,
    stats: CycleStats,
}

impl<D: ActuatorDevice, S: TelemetrySink> CycleRunner<D, S> {
    /// Runner ticking every `period`.
    pub fn new(controller: ElevatorController<D>, sink: S, period: Duration) -> Self {
        Self {
            controller,
            sink,
            period,
            max_ticks: None,
            stats: CycleStats::new(),
        }
    }

    /// Stop after `ticks` cycles.
    pub fn with_max_ticks(mut self, ticks: u64) -> Self {
        self.max_ticks = Some(ticks);
        self
    }

    /// Execute one cycle body at `now`: tick, publish, count the outcome.
    pub fn run_once(&mut self, now: Instant) -> ElevatorTelemetry {
        let telemetry = self.controller.tick(now);
        self.sink.publish(&telemetry);
        self.stats.record_outcome(&telemetry);
        telemetry
    }

    /// Run until `running` is cleared or the tick limit is reached.
    pub fn run(&mut self, running: &AtomicBool) -> &CycleStats {
        info!(
            period_ms = self.period.as_millis() as u64,
            max_ticks = ?self.max_ticks,
            "entering control loop"
        );
        let mut next_wake = Instant::now();

        while running.load(Ordering::Acquire) && !self.limit_reached() {
            let cycle_start = Instant::now();
            let latency = cycle_start.saturating_duration_since(next_wake);

            self.run_once(cycle_start);

            let duration = cycle_start.elapsed();
            self.stats
                .record(duration.as_nanos() as u64, latency.as_nanos() as u64);
            if duration > self.period {
                self.stats.overruns += 1;
                warn!(
                    cycle = self.stats.cycle_count,
                    duration_us = duration.as_micros() as u64,
                    budget_us = self.period.as_micros() as u64,
                    "cycle overrun"
                );
            }

            next_wake += self.period;
            let now = Instant::now();
            if next_wake > now {
                std::thread::sleep(next_wake - now);
            } else if now - next_wake > self.period {
                next_wake = now;
            }
        }

        info!(
            cycles = self.stats.cycle_count,
            avg_us = self.stats.avg_cycle_ns() / 1000,
            max_us = self.stats.max_cycle_ns / 1000,
            overruns = self.stats.overruns,
            skipped = self.stats.skipped_ticks,
            "control loop stopped"
        );
        &self.stats
    }

    fn limit_reached(&self) -> bool {
        self.max_ticks
            .is_some_and(|max| self.controller.tick_count() >= max)
    }

    pub fn stats(&self) -> &CycleStats {
        &self.stats
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn controller(&self) -> &ElevatorController<D> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut ElevatorController<D> {
        &mut self.controller
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
