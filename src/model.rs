//! Request Front-End.
//!
//! `AxiDramModel` lets ordinary code drive the simulated bridge. Requests can
//! be issued blocking (`write`, `read`), which advance simulated time in
//! fixed steps until the response is in, or posted (`post_write`,
//! `post_read`), which return a [`RequestHandle`] to poll while the caller
//! advances time itself.
//!
//! Posted requests wait in a backlog until the bridge has room, so they reach
//! the bridge in submission order. Responses are routed back by request
//! identifier to the handle that issued them.

use crate::bridge::context::RequestId;
use crate::bridge::request::{AxiRequest, AxiResponse, ResponseStatus};
use crate::common::{BridgeError, ConfigError, Direction, SimTime};
use crate::config::Config;
use crate::soc::builder::System;
use crate::stats::BridgeStats;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

static NEXT_MODEL_ID: AtomicU64 = AtomicU64::new(1);

/// Shared handle to a posted request.
pub type RequestHandle = Arc<PendingRequest>;

#[derive(Debug)]
struct PendingState {
    direction: Direction,
    request: AxiRequest,
    response: AxiResponse,
    posted_at: SimTime,
    latency: SimTime,
    completed: bool,
}

/// A posted request and, once available, its response.
///
/// The state sits behind a mutex so a handle can be polled from any thread.
#[derive(Debug)]
pub struct PendingRequest {
    model: u64,
    seq: u64,
    state: Mutex<PendingState>,
}

impl PendingRequest {
    fn lock(&self) -> MutexGuard<'_, PendingState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// `true` once the response has been delivered.
    pub fn is_done(&self) -> bool {
        self.lock().completed
    }

    /// Direction of the posted request.
    pub fn direction(&self) -> Direction {
        self.lock().direction
    }
}

/// Blocking and polling front-end over a simulated bridge and memory.
pub struct AxiDramModel {
    id: u64,
    system: System,
    clock_period: SimTime,
    step: SimTime,
    next_seq: u64,
    backlog: VecDeque<RequestHandle>,
    routes: HashMap<RequestId, RequestHandle>,
}

impl AxiDramModel {
    /// Builds the system described by `config`.
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self::with_system(config, System::new(config, None)?))
    }

    /// Wraps an already built system.
    pub fn with_system(config: &Config, system: System) -> Self {
        Self {
            id: NEXT_MODEL_ID.fetch_add(1, Ordering::Relaxed),
            system,
            clock_period: config.simulation.clock_period(),
            step: config.simulation.step(),
            next_seq: 0,
            backlog: VecDeque::new(),
            routes: HashMap::new(),
        }
    }

    /// Current simulated time.
    pub fn now(&self) -> SimTime {
        self.system.now()
    }

    pub fn system(&self) -> &System {
        &self.system
    }

    pub fn system_mut(&mut self) -> &mut System {
        &mut self.system
    }

    pub fn stats(&self) -> &BridgeStats {
        self.system.bridge.stats()
    }

    /// Writes `request.data` and waits for the response.
    pub fn write(&mut self, request: &AxiRequest) -> Result<AxiResponse, BridgeError> {
        let handle = self.post_write(request)?;
        self.wait_for_completion(&handle)?;
        let (response, _, _) = self.collect_response(&handle)?;
        Ok(response)
    }

    /// Reads into `request.data` and waits for the response.
    ///
    /// `request.data` is left untouched if the read fails.
    pub fn read(&mut self, request: &mut AxiRequest) -> Result<AxiResponse, BridgeError> {
        let handle = self.post_read(request)?;
        self.wait_for_completion(&handle)?;
        let (response, done, _) = self.collect_response(&handle)?;
        if response.success {
            request.data = done.data;
        }
        Ok(response)
    }

    /// Writes `data` at `address` in a single request.
    pub fn write_bytes(&mut self, address: u64, data: &[u8]) -> Result<AxiResponse, BridgeError> {
        self.write(&AxiRequest::with_data(address, data.to_vec(), 0))
    }

    /// Reads `len` bytes at `address` in a single request.
    ///
    /// A non-OK response is returned as [`BridgeError::Transfer`].
    pub fn read_bytes(&mut self, address: u64, len: usize) -> Result<Vec<u8>, BridgeError> {
        let mut request = AxiRequest::new(address, len, 0);
        let response = self.read(&mut request)?;
        if !response.success {
            log::warn!("read at {:#x} failed: {}", address, response.status);
            return Err(BridgeError::Transfer(response.status));
        }
        Ok(request.data)
    }

    /// Writes `text` followed by a NUL terminator.
    pub fn write_str(&mut self, address: u64, text: &str) -> Result<AxiResponse, BridgeError> {
        let mut data = Vec::with_capacity(text.len() + 1);
        data.extend_from_slice(text.as_bytes());
        data.push(0);
        self.write_bytes(address, &data)
    }

    /// Reads up to `max_len` bytes and returns the text before the first NUL.
    /// Invalid UTF-8 is replaced.
    pub fn read_string(&mut self, address: u64, max_len: usize) -> Result<String, BridgeError> {
        let data = self.read_bytes(address, max_len)?;
        let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
        Ok(String::from_utf8_lossy(&data[..end]).into_owned())
    }

    /// Posts a write; returns immediately.
    pub fn post_write(&mut self, request: &AxiRequest) -> Result<RequestHandle, BridgeError> {
        self.submit_request(request, Direction::Write)
    }

    /// Posts a read; the data is returned by [`AxiDramModel::collect_response`].
    pub fn post_read(&mut self, request: &AxiRequest) -> Result<RequestHandle, BridgeError> {
        self.submit_request(request, Direction::Read)
    }

    fn submit_request(
        &mut self,
        request: &AxiRequest,
        direction: Direction,
    ) -> Result<RequestHandle, BridgeError> {
        let mut request = request.clone();
        request.prepare()?;

        let seq = self.next_seq;
        self.next_seq += 1;
        let handle = Arc::new(PendingRequest {
            model: self.id,
            seq,
            state: Mutex::new(PendingState {
                direction,
                request,
                response: AxiResponse::default(),
                posted_at: self.now(),
                latency: SimTime::ZERO,
                completed: false,
            }),
        });
        self.backlog.push_back(Arc::clone(&handle));
        self.feed();
        Ok(handle)
    }

    /// Moves backlog entries into the bridge while it accepts them.
    fn feed(&mut self) {
        while let Some(handle) = self.backlog.front() {
            if !self.system.bridge.can_accept() {
                break;
            }
            let (direction, request) = {
                let state = handle.lock();
                (state.direction, state.request.clone())
            };
            match self.system.submit(direction, request) {
                Ok(id) => {
                    self.routes.insert(id, Arc::clone(handle));
                }
                Err(BridgeError::QueueFull { .. }) => break,
                Err(e) => {
                    log::warn!("request {} rejected by the bridge: {}", handle.seq, e);
                    let now = self.now();
                    let mut state = handle.lock();
                    state.response = AxiResponse::from_status(ResponseStatus::GenericError, SimTime::ZERO);
                    state.latency = now.saturating_sub(state.posted_at);
                    state.completed = true;
                }
            }
            self.backlog.pop_front();
        }
    }

    fn route(&mut self, finished: Vec<RequestId>) {
        let now = self.now();
        for id in finished {
            let Some(handle) = self.routes.remove(&id) else {
                continue;
            };
            match self.system.bridge.take_completion(id) {
                Ok(done) => {
                    let mut state = handle.lock();
                    state.response = done.response;
                    state.request = done.request;
                    state.latency = now.saturating_sub(state.posted_at);
                    state.completed = true;
                }
                Err(e) => log::warn!("no completion for {}: {}", id, e),
            }
        }
    }

    /// `true` once the request's response is available.
    pub fn is_request_done(&self, handle: &RequestHandle) -> bool {
        handle.is_done()
    }

    /// Returns the response, the request (carrying read data) and the latency
    /// from posting to completion.
    pub fn collect_response(
        &self,
        handle: &RequestHandle,
    ) -> Result<(AxiResponse, AxiRequest, SimTime), BridgeError> {
        if handle.model != self.id {
            return Err(BridgeError::InvalidHandle);
        }
        let state = handle.lock();
        if !state.completed {
            return Err(BridgeError::NotCompleted(handle.seq));
        }
        Ok((state.response, state.request.clone(), state.latency))
    }

    /// Advances simulated time by `duration`, delivering all events on the way.
    pub fn advance_for(&mut self, duration: SimTime) {
        let end = self.now() + duration;
        loop {
            self.feed();
            match self.system.next_event_time() {
                Some(t) if t <= end => {
                    let finished = self.system.run_until(t);
                    self.route(finished);
                }
                _ => break,
            }
        }
        let finished = self.system.run_until(end);
        self.route(finished);
        self.feed();
    }

    /// Advances by one step.
    pub fn advance_cycle(&mut self) {
        self.advance_for(self.step);
    }

    /// Advances by `cycles` steps.
    pub fn advance_cycles(&mut self, cycles: u64) {
        self.advance_for(self.step * cycles);
    }

    /// Sets the step used by blocking waits and `advance_cycle`.
    pub fn set_step_time(&mut self, step: SimTime) -> Result<(), BridgeError> {
        if step.is_zero() {
            return Err(BridgeError::InvalidStep);
        }
        self.step = step;
        Ok(())
    }

    pub fn step_time(&self) -> SimTime {
        self.step
    }

    pub fn clock_period(&self) -> SimTime {
        self.clock_period
    }

    fn wait_for_completion(&mut self, handle: &RequestHandle) -> Result<(), BridgeError> {
        while !handle.is_done() {
            let idle = self.backlog.is_empty() && self.system.next_event_time().is_none();
            if idle && !self.routes.values().any(|h| Arc::ptr_eq(h, handle)) {
                return Err(BridgeError::NotCompleted(handle.seq));
            }
            self.advance_cycle();
        }
        Ok(())
    }
}
