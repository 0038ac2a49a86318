//! Simulation statistics collection and reporting.
//!
//! Tracks request and chunk counts at the bridge, command and row-buffer
//! counts at the DRAM controller, and host execution time.

use crate::common::SimTime;
use crate::dram::command::Command;
use std::time::Instant;

/// Bridge-side statistics.
#[derive(Debug, Clone)]
pub struct BridgeStats {
    start_time: Instant,
    pub requests_accepted: u64,
    pub requests_rejected: u64,
    pub requests_completed: u64,
    pub requests_failed: u64,
    pub reads: u64,
    pub writes: u64,
    pub chunks_dispatched: u64,
    pub chunks_failed: u64,
    pub bytes_transferred: u64,
    pub peak_outstanding: usize,
    pub total_latency: SimTime,
    pub max_latency: SimTime,
}

impl Default for BridgeStats {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            requests_accepted: 0,
            requests_rejected: 0,
            requests_completed: 0,
            requests_failed: 0,
            reads: 0,
            writes: 0,
            chunks_dispatched: 0,
            chunks_failed: 0,
            bytes_transferred: 0,
            peak_outstanding: 0,
            total_latency: SimTime::ZERO,
            max_latency: SimTime::ZERO,
        }
    }
}

impl BridgeStats {
    /// Records a finalized request.
    pub fn record_completion(&mut self, success: bool, latency: SimTime) {
        self.requests_completed += 1;
        if !success {
            self.requests_failed += 1;
        }
        self.total_latency += latency;
        self.max_latency = self.max_latency.max(latency);
    }

    /// Mean request latency in nanoseconds.
    pub fn mean_latency_ns(&self) -> f64 {
        if self.requests_completed == 0 {
            0.0
        } else {
            self.total_latency.as_ns_f64() / self.requests_completed as f64
        }
    }

    /// Prints a formatted summary, together with the controller counters if a
    /// DRAM controller was used.
    pub fn print(&self, sim_time: SimTime, dram: Option<&DramStats>) {
        let seconds = self.start_time.elapsed().as_secs_f64();
        let sim_ns = sim_time.as_ns_f64();
        let bandwidth = if sim_ns > 0.0 {
            self.bytes_transferred as f64 / sim_ns
        } else {
            0.0
        };

        println!("\n==========================================================");
        println!("AXI BRIDGE SIMULATION STATISTICS");
        println!("==========================================================");
        println!("host_seconds             {:.4} s", seconds);
        println!("sim_time                 {}", sim_time);
        println!("----------------------------------------------------------");
        println!("BRIDGE");
        println!("  req.accepted           {}", self.requests_accepted);
        println!("  req.rejected           {}", self.requests_rejected);
        println!("  req.completed          {}", self.requests_completed);
        println!("  req.failed             {}", self.requests_failed);
        println!("  req.reads              {}", self.reads);
        println!("  req.writes             {}", self.writes);
        println!("  chunks.dispatched      {}", self.chunks_dispatched);
        println!("  chunks.failed          {}", self.chunks_failed);
        println!("  chunks.peak_inflight   {}", self.peak_outstanding);
        println!("  bytes                  {}", self.bytes_transferred);
        println!("  bandwidth              {:.3} GB/s", bandwidth);
        println!("  latency.mean           {:.3} ns", self.mean_latency_ns());
        println!("  latency.max            {}", self.max_latency);

        if let Some(dram) = dram {
            dram.print();
        }
        println!("==========================================================");
    }
}

/// DRAM controller statistics.
#[derive(Debug, Clone, Default)]
pub struct DramStats {
    pub commands: [u64; Command::COUNT],
    pub row_hits: u64,
    pub row_misses: u64,
    pub row_conflicts: u64,
    pub refreshes: u64,
    pub address_errors: u64,
}

impl DramStats {
    pub fn count(&mut self, command: Command) {
        self.commands[command.index()] += 1;
    }

    pub fn issued(&self, command: Command) -> u64 {
        self.commands[command.index()]
    }

    fn print(&self) {
        println!("----------------------------------------------------------");
        println!("DRAM CONTROLLER");
        for command in Command::ALL {
            let n = self.issued(command);
            if n > 0 {
                println!("  cmd.{:<18} {}", command.mnemonic().to_lowercase(), n);
            }
        }
        let accesses = self.row_hits + self.row_misses + self.row_conflicts;
        let hit_rate = if accesses > 0 {
            (self.row_hits as f64 / accesses as f64) * 100.0
        } else {
            0.0
        };
        println!(
            "  row    accesses: {:<10} | hits: {:<10} | hit_rate: {:.2}%",
            accesses, self.row_hits, hit_rate
        );
        println!("  row.conflicts          {}", self.row_conflicts);
        println!("  refreshes              {}", self.refreshes);
        println!("  address_errors         {}", self.address_errors);
    }
}
