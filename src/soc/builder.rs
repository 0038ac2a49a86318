//! System Builder.
//!
//! This module defines the `System` structure, which wires the bridge engine
//! to a memory target through the event kernel. It owns the simulated clock
//! and routes downstream responses back to the bridge.

use crate::bridge::blocking::transport_blocking;
use crate::bridge::context::RequestId;
use crate::bridge::engine::BridgeEngine;
use crate::bridge::pool::PayloadHandle;
use crate::bridge::request::{AxiRequest, AxiResponse};
use crate::common::{BridgeError, ConfigError, Direction, SimTime};
use crate::config::{Config, ControllerKind};
use crate::dram::memspec::MemSpec;
use crate::sim::kernel::EventQueue;
use crate::sim::loader;
use crate::soc::memory::controller::{DramController, SimpleController};
use crate::soc::traits::MemoryTarget;
use std::collections::BTreeSet;

/// Events exchanged between the components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// The bridge dispatcher should run.
    BridgeWake,
    /// A downstream target begins the response to a chunk (BEGIN_RESP).
    ChunkResponse(PayloadHandle),
}

/// Bridge, memory target and event kernel.
pub struct System {
    kernel: EventQueue<Event>,
    /// The AXI bridge.
    pub bridge: BridgeEngine,
    /// Memory target behind the bridge.
    pub target: Box<dyn MemoryTarget>,
    pending_wakes: BTreeSet<SimTime>,
}

impl System {
    /// Creates a system instance with the specified configuration.
    ///
    /// Resolves the memory specification (unless one is passed in), builds
    /// the configured memory target and the bridge in front of it.
    ///
    /// # Arguments
    ///
    /// * `config` - Simulator configuration.
    /// * `spec` - Memory specification overriding the configured one.
    pub fn new(config: &Config, spec: Option<MemSpec>) -> Result<Self, ConfigError> {
        let spec = match spec {
            Some(spec) => spec,
            None => loader::resolve_memspec(config)?,
        };

        let target: Box<dyn MemoryTarget> = match config.memory.controller {
            ControllerKind::Dram => {
                let mapping = loader::resolve_address_mapping(config, &spec)?;
                Box::new(DramController::new(
                    spec,
                    mapping,
                    config.memory.page_policy,
                    config.memory.refresh,
                ))
            }
            ControllerKind::Simple => Box::new(SimpleController::new(
                config.memory.simple_latency(),
                spec.memory_size_bytes(),
            )),
        };

        Ok(Self::with_target(config, target))
    }

    /// Creates a system around an existing memory target.
    pub fn with_target(config: &Config, target: Box<dyn MemoryTarget>) -> Self {
        Self {
            kernel: EventQueue::new(),
            bridge: BridgeEngine::new(
                config.bridge.clone(),
                config.verbose(),
                config.general.dump_bytes,
            ),
            target,
            pending_wakes: BTreeSet::new(),
        }
    }

    /// Current simulated time.
    pub fn now(&self) -> SimTime {
        self.kernel.now()
    }

    fn wake_bridge_at(&mut self, time: SimTime) {
        let time = time.max(self.kernel.now());
        if self.pending_wakes.insert(time) {
            self.kernel.schedule_at(time, Event::BridgeWake);
        }
    }

    /// Hands a request to the bridge at the current time.
    pub fn submit(
        &mut self,
        direction: Direction,
        request: AxiRequest,
    ) -> Result<RequestId, BridgeError> {
        let id = self.bridge.submit(direction, request, self.kernel.now())?;
        self.wake_bridge_at(self.kernel.now());
        Ok(id)
    }

    /// Sends a request down the blocking path at the current time.
    ///
    /// Simulated time is not advanced; the returned delay tells the caller
    /// how long the transfer took.
    pub fn transport_blocking(
        &mut self,
        direction: Direction,
        request: &mut AxiRequest,
    ) -> Result<(AxiResponse, SimTime), BridgeError> {
        let id = self.bridge.allocate_id();
        let now = self.kernel.now();
        let config = self.bridge.config().clone();
        transport_blocking(
            id,
            direction,
            request,
            self.target.as_mut(),
            self.bridge.pool_mut(),
            &config,
            now,
        )
    }

    fn handle(&mut self, time: SimTime, event: Event, finished: &mut Vec<RequestId>) {
        match event {
            Event::BridgeWake => {
                self.pending_wakes.remove(&time);
                let step = self.bridge.pump(time, self.target.as_mut());
                for chunk in step.issued {
                    self.kernel
                        .schedule_at(chunk.respond_at, Event::ChunkResponse(chunk.payload));
                }
                finished.extend(step.finished);
                if let Some(wake) = step.wake_at {
                    self.wake_bridge_at(wake);
                }
            }
            Event::ChunkResponse(payload) => {
                match self.bridge.complete(payload, time) {
                    Ok(Some(id)) => finished.push(id),
                    Ok(None) => {}
                    Err(e) => log::warn!("dropping chunk response: {}", e),
                }
                if self.bridge.has_pending_dispatch() {
                    self.wake_bridge_at(time);
                }
            }
        }
    }

    /// Delivers every event up to and including `until`, then moves the
    /// clock to `until`.
    ///
    /// # Returns
    ///
    /// The requests finalized during the run, in completion order.
    pub fn run_until(&mut self, until: SimTime) -> Vec<RequestId> {
        let mut finished = Vec::new();
        while let Some((time, event)) = self.kernel.pop_until(until) {
            self.handle(time, event, &mut finished);
        }
        self.kernel.advance_to(until);
        finished
    }

    /// Delivers events until none are left.
    pub fn run_to_idle(&mut self) -> Vec<RequestId> {
        let mut finished = Vec::new();
        while let Some(time) = self.kernel.peek_time() {
            finished.extend(self.run_until(time));
        }
        finished
    }

    /// Time of the next pending event.
    pub fn next_event_time(&self) -> Option<SimTime> {
        self.kernel.peek_time()
    }
}
