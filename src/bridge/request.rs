//! AXI Transaction Types.
//!
//! The request and response records exchanged between an initiator and the
//! bridge, and a builder for assembling requests field by field.

use crate::common::{BridgeError, SimTime};
use std::fmt;

/// Largest legal AxSIZE (128 bytes per beat).
pub const MAX_BURST_SIZE: u8 = 7;

/// AXI burst type (AxBURST).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BurstType {
    Fixed,
    #[default]
    Incr,
    Wrap,
}

/// AXI response code (xRESP).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AxiResp {
    #[default]
    Okay,
    ExOkay,
    SlvErr,
    DecErr,
}

impl AxiResp {
    pub fn name(self) -> &'static str {
        match self {
            AxiResp::Okay => "OKAY",
            AxiResp::ExOkay => "EXOKAY",
            AxiResp::SlvErr => "SLVERR",
            AxiResp::DecErr => "DECERR",
        }
    }
}

/// Transport-level status of a (sub-)transaction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResponseStatus {
    Ok,
    #[default]
    Incomplete,
    GenericError,
    AddressError,
    CommandError,
    BurstError,
    ByteEnableError,
}

impl ResponseStatus {
    pub fn is_ok(self) -> bool {
        self == ResponseStatus::Ok
    }

    /// AXI response code reported for this status.
    pub fn axi_resp(self) -> AxiResp {
        match self {
            ResponseStatus::Ok => AxiResp::Okay,
            ResponseStatus::AddressError => AxiResp::DecErr,
            _ => AxiResp::SlvErr,
        }
    }
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ResponseStatus::Ok => "OK_RESPONSE",
            ResponseStatus::Incomplete => "INCOMPLETE_RESPONSE",
            ResponseStatus::GenericError => "GENERIC_ERROR_RESPONSE",
            ResponseStatus::AddressError => "ADDRESS_ERROR_RESPONSE",
            ResponseStatus::CommandError => "COMMAND_ERROR_RESPONSE",
            ResponseStatus::BurstError => "BURST_ERROR_RESPONSE",
            ResponseStatus::ByteEnableError => "BYTE_ENABLE_ERROR_RESPONSE",
        };
        f.write_str(text)
    }
}

/// An AXI read or write request.
///
/// For writes `data` holds the payload. For reads it is a pre-sized buffer
/// that receives the data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AxiRequest {
    pub address: u64,
    pub data: Vec<u8>,
    /// Transfer length in bytes. Zero means "derive from the burst fields".
    pub data_length: usize,
    pub id: u32,
    pub burst_type: BurstType,
    /// Beats per burst (AxLEN + 1).
    pub burst_length: u32,
    /// AxSIZE; bytes per beat are `1 << burst_size`.
    pub burst_size: u8,
    pub cache: u8,
    pub prot: u8,
    pub qos: u8,
    pub region: u8,
}

impl Default for AxiRequest {
    fn default() -> Self {
        Self {
            address: 0,
            data: Vec::new(),
            data_length: 0,
            id: 0,
            burst_type: BurstType::Incr,
            burst_length: 1,
            burst_size: 0,
            cache: 0,
            prot: 0,
            qos: 0,
            region: 0,
        }
    }
}

impl AxiRequest {
    /// Request for `len` bytes at `address` with a zeroed buffer.
    pub fn new(address: u64, len: usize, id: u32) -> Self {
        Self {
            address,
            data: vec![0; len],
            data_length: len,
            id,
            ..Self::default()
        }
    }

    /// Write request carrying `data`.
    pub fn with_data(address: u64, data: Vec<u8>, id: u32) -> Self {
        Self {
            address,
            data_length: data.len(),
            data,
            id,
            ..Self::default()
        }
    }

    /// Bytes per beat.
    pub fn beat_bytes(&self) -> usize {
        1usize << self.burst_size.min(usize::BITS as u8 - 1)
    }

    /// Transfer length, falling back to `burst_length * beat_bytes` when no
    /// explicit length is set.
    pub fn total_bytes(&self) -> usize {
        if self.data_length > 0 {
            self.data_length
        } else {
            self.burst_length as usize * self.beat_bytes()
        }
    }

    /// Checks the buffer against the transfer length before segmentation.
    ///
    /// With an explicit `data_length` the buffer must match it exactly. A
    /// length derived from the burst fields zero-extends a shorter buffer.
    ///
    /// # Returns
    ///
    /// The transfer length in bytes, or [`BridgeError::InvalidBurstSize`] if
    /// AxSIZE exceeds 128 bytes per beat.
    pub fn prepare(&mut self) -> Result<usize, BridgeError> {
        if self.burst_size > MAX_BURST_SIZE {
            return Err(BridgeError::InvalidBurstSize(self.burst_size));
        }
        let total = self.total_bytes();
        if self.data_length > 0 || self.data.len() > total {
            if self.data.len() != total {
                return Err(BridgeError::LengthMismatch {
                    buffer: self.data.len(),
                    length: total,
                });
            }
        } else {
            self.data.resize(total, 0);
        }
        Ok(total)
    }
}

/// The attribute fields of a request, copied onto every sub-transaction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AxiAttributes {
    pub id: u32,
    pub burst_type: BurstType,
    pub burst_length: u32,
    pub burst_size: u8,
    pub cache: u8,
    pub prot: u8,
    pub qos: u8,
    pub region: u8,
}

impl AxiAttributes {
    pub fn of(request: &AxiRequest) -> Self {
        Self {
            id: request.id,
            burst_type: request.burst_type,
            burst_length: request.burst_length,
            burst_size: request.burst_size,
            cache: request.cache,
            prot: request.prot,
            qos: request.qos,
            region: request.region,
        }
    }
}

impl fmt::Display for AxiAttributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "id={} burst={:?} len={} size={} cache={:#x} prot={:#x} qos={} region={}",
            self.id,
            self.burst_type,
            self.burst_length,
            self.burst_size,
            self.cache,
            self.prot,
            self.qos,
            self.region
        )
    }
}

/// Result of a completed AXI request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AxiResponse {
    /// `true` iff every sub-transaction completed with [`ResponseStatus::Ok`].
    pub success: bool,
    pub status: ResponseStatus,
    pub axi_resp: AxiResp,
    /// Time from acceptance to completion.
    pub latency: SimTime,
}

impl Default for AxiResponse {
    fn default() -> Self {
        Self {
            success: false,
            status: ResponseStatus::Incomplete,
            axi_resp: AxiResp::Okay,
            latency: SimTime::ZERO,
        }
    }
}

impl AxiResponse {
    pub fn from_status(status: ResponseStatus, latency: SimTime) -> Self {
        Self {
            success: status.is_ok(),
            status,
            axi_resp: status.axi_resp(),
            latency,
        }
    }
}

/// Fluent builder for [`AxiRequest`].
#[derive(Clone, Debug, Default)]
pub struct AxiTransactionBuilder {
    request: AxiRequest,
}

impl AxiTransactionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn address(mut self, address: u64) -> Self {
        self.request.address = address;
        self
    }

    /// Sets the transfer length and resizes the buffer to match.
    pub fn data_length(mut self, len: usize) -> Self {
        self.request.data_length = len;
        self.request.data.resize(len, 0);
        self
    }

    /// Sets the payload; the transfer length follows the data.
    pub fn data(mut self, data: &[u8]) -> Self {
        self.request.data = data.to_vec();
        self.request.data_length = data.len();
        self
    }

    pub fn id(mut self, id: u32) -> Self {
        self.request.id = id;
        self
    }

    pub fn burst_type(mut self, burst_type: BurstType) -> Self {
        self.request.burst_type = burst_type;
        self
    }

    pub fn burst_length(mut self, beats: u32) -> Self {
        self.request.burst_length = beats;
        self
    }

    pub fn burst_size(mut self, size: u8) -> Self {
        self.request.burst_size = size;
        self
    }

    pub fn cache(mut self, cache: u8) -> Self {
        self.request.cache = cache;
        self
    }

    pub fn prot(mut self, prot: u8) -> Self {
        self.request.prot = prot;
        self
    }

    pub fn qos(mut self, qos: u8) -> Self {
        self.request.qos = qos;
        self
    }

    pub fn region(mut self, region: u8) -> Self {
        self.request.region = region;
        self
    }

    pub fn build(self) -> AxiRequest {
        self.request
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_bytes_falls_back_to_burst_fields() {
        let req = AxiTransactionBuilder::new()
            .address(0x100)
            .burst_length(4)
            .burst_size(3)
            .build();
        assert_eq!(req.data_length, 0);
        assert_eq!(req.total_bytes(), 32);
    }

    #[test]
    fn prepare_rejects_mismatched_buffer() {
        let mut req = AxiRequest::new(0, 16, 0);
        req.data.truncate(8);
        assert_eq!(
            req.prepare(),
            Err(BridgeError::LengthMismatch { buffer: 8, length: 16 })
        );
    }

    #[test]
    fn prepare_zero_extends_burst_derived_length() {
        let mut req = AxiTransactionBuilder::new()
            .burst_length(2)
            .burst_size(2)
            .build();
        req.data = vec![1, 2, 3];
        assert_eq!(req.prepare(), Ok(8));
        assert_eq!(req.data, vec![1, 2, 3, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn prepare_rejects_oversized_burst_size() {
        let mut req = AxiTransactionBuilder::new()
            .burst_length(1)
            .burst_size(40)
            .build();
        assert_eq!(req.prepare(), Err(BridgeError::InvalidBurstSize(40)));
        assert!(req.data.is_empty());

        req.burst_size = MAX_BURST_SIZE;
        assert_eq!(req.prepare(), Ok(128));
    }

    #[test]
    fn address_error_maps_to_decerr() {
        let rsp = AxiResponse::from_status(ResponseStatus::AddressError, SimTime::ZERO);
        assert!(!rsp.success);
        assert_eq!(rsp.axi_resp, AxiResp::DecErr);
        assert_eq!(
            AxiResponse::from_status(ResponseStatus::GenericError, SimTime::ZERO).axi_resp,
            AxiResp::SlvErr
        );
    }
}
