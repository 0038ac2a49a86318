//! Bridge Engine.
//!
//! The tracked (non-blocking) bridge path. Accepted requests wait in a
//! bounded FIFO; the dispatcher takes them one at a time, splits each into
//! downstream-beat-sized chunks and sends the chunks to the target in address
//! order. Completions come back through [`BridgeEngine::complete`] in any
//! order. A request is finalized when its last in-flight chunk completes
//! after the dispatcher has issued everything it is going to issue.
//!
//! The engine never waits itself. [`BridgeEngine::pump`] dispatches whatever
//! is due at the given time and reports when it wants to run again, and the
//! owner turns that into events.

use super::context::{RequestContext, RequestId};
use super::pool::{PayloadHandle, PayloadPool, SubTransaction};
use super::request::{AxiAttributes, AxiRequest, AxiResponse, ResponseStatus};
use crate::common::{BridgeError, Direction, SimTime};
use crate::config::BridgeConfig;
use crate::soc::traits::MemoryTarget;
use crate::stats::BridgeStats;
use std::collections::{HashMap, VecDeque};

/// A chunk handed to the target during a [`BridgeEngine::pump`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IssuedChunk {
    pub payload: PayloadHandle,
    /// Time the target begins its response.
    pub respond_at: SimTime,
}

/// Outcome of one dispatch pass.
#[derive(Debug, Default)]
pub struct EngineStep {
    pub issued: Vec<IssuedChunk>,
    /// Requests finalized during the pass (zero-length or stopped requests).
    pub finished: Vec<RequestId>,
    /// The dispatcher is waiting for this time.
    pub wake_at: Option<SimTime>,
}

/// Externally visible state of a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestState {
    /// Accepted, no chunk dispatched yet.
    Queued,
    /// At least one chunk dispatched.
    InFlight {
        completed_bytes: usize,
        total_bytes: usize,
        outstanding: usize,
    },
    /// Finalized; the response is waiting to be collected.
    Done(AxiResponse),
}

/// A finalized request.
#[derive(Clone, Debug)]
pub struct Completion {
    pub id: RequestId,
    pub direction: Direction,
    pub request: AxiRequest,
    pub response: AxiResponse,
}

struct Cursor {
    id: RequestId,
    offset: usize,
    index: usize,
}

/// Segmentation and completion-tracking engine.
pub struct BridgeEngine {
    config: BridgeConfig,
    verbose: bool,
    dump_bytes: usize,
    pool: PayloadPool,
    queue: VecDeque<RequestId>,
    contexts: HashMap<RequestId, RequestContext>,
    finished: HashMap<RequestId, Completion>,
    cursor: Option<Cursor>,
    next_dispatch_at: SimTime,
    outstanding: usize,
    next_id: u64,
    stats: BridgeStats,
}

impl BridgeEngine {
    /// Creates an engine.
    ///
    /// # Arguments
    ///
    /// * `config` - Beat width, latencies and queue limits.
    /// * `verbose` - Log every request and chunk response at `info` level.
    /// * `dump_bytes` - Payload bytes shown per finished request at `debug` level.
    pub fn new(config: BridgeConfig, verbose: bool, dump_bytes: usize) -> Self {
        let pool = PayloadPool::with_capacity(config.max_outstanding_val());
        Self {
            config,
            verbose,
            dump_bytes,
            pool,
            queue: VecDeque::new(),
            contexts: HashMap::new(),
            finished: HashMap::new(),
            cursor: None,
            next_dispatch_at: SimTime::ZERO,
            outstanding: 0,
            next_id: 1,
            stats: BridgeStats::default(),
        }
    }

    /// Reserves a request identifier without queuing anything.
    pub fn allocate_id(&mut self) -> RequestId {
        let id = RequestId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Accepts a request.
    ///
    /// The request is acknowledged immediately; the caller must arrange for
    /// [`BridgeEngine::pump`] to run at `now` or later.
    pub fn submit(
        &mut self,
        direction: Direction,
        mut request: AxiRequest,
        now: SimTime,
    ) -> Result<RequestId, BridgeError> {
        let depth = self.config.request_queue_depth_val();
        if self.queue.len() >= depth {
            self.stats.requests_rejected += 1;
            return Err(BridgeError::QueueFull { depth });
        }
        let total = request.prepare()?;

        let id = self.allocate_id();
        if self.verbose {
            log::info!(
                "AXI REQ(cmd={}) {} addr={:#x} total={} at {} {}",
                direction.tag(),
                id,
                request.address,
                total,
                now,
                AxiAttributes::of(&request)
            );
        }

        self.stats.requests_accepted += 1;
        match direction {
            Direction::Read => self.stats.reads += 1,
            Direction::Write => self.stats.writes += 1,
        }
        self.contexts
            .insert(id, RequestContext::new(id, direction, request, now));
        self.queue.push_back(id);
        Ok(id)
    }

    /// Dispatches every chunk that is due at `now`.
    pub fn pump(&mut self, now: SimTime, target: &mut dyn MemoryTarget) -> EngineStep {
        let mut step = EngineStep::default();
        loop {
            if self.cursor.is_none() && !self.start_next(now, &mut step) {
                break;
            }
            if self.next_dispatch_at > now {
                step.wake_at = Some(self.next_dispatch_at);
                break;
            }
            if self.outstanding >= self.config.max_outstanding_val() {
                log::trace!("dispatch stalled: {} chunks in flight", self.outstanding);
                break;
            }
            if let Some(chunk) = self.dispatch_next(now, target, &mut step) {
                step.issued.push(chunk);
            }
        }
        step
    }

    /// Pops the next queued request and positions the cursor on it.
    ///
    /// # Returns
    ///
    /// `false` if the queue is empty.
    fn start_next(&mut self, now: SimTime, step: &mut EngineStep) -> bool {
        while let Some(id) = self.queue.pop_front() {
            let Some(ctx) = self.contexts.get_mut(&id) else {
                continue;
            };
            if ctx.total_bytes() == 0 {
                ctx.mark_all_issued();
                self.finalize(id, now);
                step.finished.push(id);
                continue;
            }
            self.cursor = Some(Cursor {
                id,
                offset: 0,
                index: 0,
            });
            self.next_dispatch_at = self.next_dispatch_at.max(now) + self.config.base_latency();
            return true;
        }
        false
    }

    fn dispatch_next(
        &mut self,
        now: SimTime,
        target: &mut dyn MemoryTarget,
        step: &mut EngineStep,
    ) -> Option<IssuedChunk> {
        let cursor = self.cursor.as_mut()?;
        let id = cursor.id;
        let Some(ctx) = self.contexts.get_mut(&id) else {
            self.cursor = None;
            return None;
        };

        if let Some(error) = ctx.error() {
            log::debug!(
                "{} failed with {}, not issuing the remaining {} bytes",
                id,
                error,
                ctx.total_bytes() - cursor.offset
            );
            ctx.mark_all_issued();
            self.cursor = None;
            if ctx.is_ready() {
                self.finalize(id, now);
                step.finished.push(id);
            }
            return None;
        }

        let total = ctx.total_bytes();
        let len = self.config.beat_bytes().min(total - cursor.offset);
        let range = cursor.offset..cursor.offset + len;
        let mut sub = SubTransaction {
            parent: id,
            index: cursor.index,
            direction: ctx.direction,
            address: ctx.request.address + cursor.offset as u64,
            range: range.clone(),
            attributes: AxiAttributes::of(&ctx.request),
            status: ResponseStatus::Incomplete,
        };

        let reply = target.access(&sub, &mut ctx.request.data[range], now);
        sub.status = reply.status;
        log::trace!(
            "{} chunk {} -> {} addr={:#x} len={} accept+{} resp+{}",
            id,
            sub.index,
            target.name(),
            sub.address,
            len,
            reply.accept_delay,
            reply.response_delay
        );

        ctx.on_dispatched();
        cursor.offset += len;
        cursor.index += 1;
        if cursor.offset >= total {
            ctx.mark_all_issued();
            self.cursor = None;
        }

        let payload = self.pool.acquire(sub);
        self.outstanding += 1;
        self.stats.chunks_dispatched += 1;
        self.stats.peak_outstanding = self.stats.peak_outstanding.max(self.outstanding);
        self.next_dispatch_at = now + reply.accept_delay + self.config.beat_latency();

        Some(IssuedChunk {
            payload,
            respond_at: now + reply.response_delay,
        })
    }

    /// Accounts the response of a dispatched chunk and releases its payload.
    ///
    /// # Returns
    ///
    /// The parent request if this completion finalized it.
    pub fn complete(
        &mut self,
        payload: PayloadHandle,
        now: SimTime,
    ) -> Result<Option<RequestId>, BridgeError> {
        let sub = self.pool.release(payload)?;
        self.outstanding -= 1;

        if self.verbose {
            log::info!(
                "AXI RESP(cmd={}) {} chunk {} addr={:#x} status={} at {}",
                sub.direction.tag(),
                sub.parent,
                sub.index,
                sub.address,
                sub.status,
                now
            );
        }
        if sub.status.is_ok() {
            self.stats.bytes_transferred += sub.len() as u64;
        } else {
            self.stats.chunks_failed += 1;
        }

        let ctx = self
            .contexts
            .get_mut(&sub.parent)
            .ok_or(BridgeError::UnknownRequest(sub.parent.0))?;
        if ctx.on_chunk_complete(sub.len(), sub.status) {
            self.finalize(sub.parent, now);
            return Ok(Some(sub.parent));
        }
        Ok(None)
    }

    fn finalize(&mut self, id: RequestId, now: SimTime) {
        let Some(ctx) = self.contexts.remove(&id) else {
            return;
        };
        let response = ctx.response(now);
        self.stats.record_completion(response.success, response.latency);

        if self.verbose {
            log::info!(
                "AXI DONE(cmd={}) {} addr={:#x} bytes={}/{} resp={} latency={}",
                ctx.direction.tag(),
                id,
                ctx.request.address,
                ctx.completed_bytes(),
                ctx.total_bytes(),
                response.axi_resp.name(),
                response.latency
            );
            if self.dump_bytes > 0 && log::log_enabled!(log::Level::Debug) {
                log::debug!(
                    "{} data: {}",
                    id,
                    hex_dump(&ctx.request.data, self.dump_bytes)
                );
            }
        }

        self.finished.insert(
            id,
            Completion {
                id,
                direction: ctx.direction,
                request: ctx.request,
                response,
            },
        );
    }

    /// Current state of a request.
    pub fn poll(&self, id: RequestId) -> Result<RequestState, BridgeError> {
        if let Some(done) = self.finished.get(&id) {
            return Ok(RequestState::Done(done.response));
        }
        let ctx = self
            .contexts
            .get(&id)
            .ok_or(BridgeError::UnknownRequest(id.0))?;
        if ctx.dispatched() == 0 {
            Ok(RequestState::Queued)
        } else {
            Ok(RequestState::InFlight {
                completed_bytes: ctx.completed_bytes(),
                total_bytes: ctx.total_bytes(),
                outstanding: ctx.outstanding(),
            })
        }
    }

    /// `true` while the request has not been finalized.
    pub fn is_outstanding(&self, id: RequestId) -> bool {
        self.contexts.contains_key(&id)
    }

    /// Removes and returns a finalized request.
    pub fn take_completion(&mut self, id: RequestId) -> Result<Completion, BridgeError> {
        if let Some(done) = self.finished.remove(&id) {
            return Ok(done);
        }
        if self.contexts.contains_key(&id) {
            Err(BridgeError::NotCompleted(id.0))
        } else {
            Err(BridgeError::UnknownRequest(id.0))
        }
    }

    /// Requests waiting for or undergoing dispatch.
    pub fn has_pending_dispatch(&self) -> bool {
        self.cursor.is_some() || !self.queue.is_empty()
    }

    /// Requests accepted but not yet picked up by the dispatcher.
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Whether another request would be accepted right now.
    pub fn can_accept(&self) -> bool {
        self.queue.len() < self.config.request_queue_depth_val()
    }

    /// Chunks dispatched and not yet completed, over all requests.
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    /// Nothing queued, nothing in flight.
    pub fn is_idle(&self) -> bool {
        self.contexts.is_empty()
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn pool(&self) -> &PayloadPool {
        &self.pool
    }

    pub fn pool_mut(&mut self) -> &mut PayloadPool {
        &mut self.pool
    }

    pub fn stats(&self) -> &BridgeStats {
        &self.stats
    }

    pub fn stats_mut(&mut self) -> &mut BridgeStats {
        &mut self.stats
    }
}

/// Formats at most `limit` bytes as hex, 16 per group.
pub fn hex_dump(data: &[u8], limit: usize) -> String {
    let shown = &data[..data.len().min(limit)];
    let mut out = shown
        .chunks(16)
        .map(|line| {
            line.iter()
                .map(|b| format!("{:02x}", b))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join(" | ");
    if shown.len() < data.len() {
        out.push_str(&format!(" ... ({} more)", data.len() - shown.len()));
    }
    out
}
