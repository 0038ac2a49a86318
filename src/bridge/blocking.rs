//! Blocking bridge path.
//!
//! Segments a request exactly like the tracked engine but forwards each chunk
//! synchronously, one after the other, accumulating the delay instead of
//! scheduling events. The first failing chunk ends the transfer.

use super::context::RequestId;
use super::pool::{PayloadPool, SubTransaction};
use super::request::{AxiAttributes, AxiRequest, AxiResponse, ResponseStatus};
use crate::common::{BridgeError, Direction, SimTime};
use crate::config::BridgeConfig;
use crate::soc::traits::MemoryTarget;

/// Forwards `request` to `target` chunk by chunk.
///
/// # Arguments
///
/// * `id` - Identifier stamped on the sub-transactions.
/// * `direction` - Read or write.
/// * `request` - The request; read data lands in `request.data`.
/// * `target` - Downstream target.
/// * `pool` - Pool the sub-transactions are checked out from.
/// * `config` - Beat width and latencies.
/// * `now` - Simulated time at which the call starts.
///
/// # Returns
///
/// The aggregate response and the total annotated delay.
pub fn transport_blocking(
    id: RequestId,
    direction: Direction,
    request: &mut AxiRequest,
    target: &mut dyn MemoryTarget,
    pool: &mut PayloadPool,
    config: &BridgeConfig,
    now: SimTime,
) -> Result<(AxiResponse, SimTime), BridgeError> {
    let total = request.prepare()?;
    let beat = config.beat_bytes();
    let attributes = AxiAttributes::of(request);

    let mut delay = config.base_latency();
    let mut done = 0;
    let mut status = ResponseStatus::Ok;

    while done < total {
        let len = beat.min(total - done);
        let mut chunk = pool.scoped(SubTransaction {
            parent: id,
            index: done / beat,
            direction,
            address: request.address + done as u64,
            range: done..done + len,
            attributes,
            status: ResponseStatus::Incomplete,
        });

        let reply = target.access(&chunk, &mut request.data[done..done + len], now + delay);
        chunk.status = reply.status;
        delay += reply.response_delay + config.beat_latency();

        if !chunk.status.is_ok() {
            log::debug!(
                "{} blocking chunk at {:#x} failed with {}",
                id,
                chunk.address,
                chunk.status
            );
            status = chunk.status;
            break;
        }
        done += len;
    }

    Ok((AxiResponse::from_status(status, delay), delay))
}
