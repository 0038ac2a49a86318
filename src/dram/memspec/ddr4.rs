//! DDR4 Timing Parameters.
//!
//! DDR4 carries the parameters LPDDR5's table lacks (tRCD, tRTP, tCCD_S/L,
//! tRRD_S/L), so its checker needs no placeholders.

use super::Architecture;
use crate::common::SimTime;
use serde::Deserialize;

/// `memtimingspec` section of a DDR4 memspec. Unused parameters (power-down
/// and DLL related) are ignored during parsing.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Ddr4TimingSpec {
    #[serde(rename = "tCK")]
    pub tck: f64,
    #[serde(rename = "CKESR")]
    pub ckesr: f64,
    #[serde(rename = "RAS")]
    pub ras: f64,
    #[serde(rename = "RC")]
    pub rc: f64,
    #[serde(rename = "RCD")]
    pub rcd: f64,
    #[serde(rename = "RL")]
    pub rl: f64,
    #[serde(rename = "RTP")]
    pub rtp: f64,
    #[serde(rename = "WL")]
    pub wl: f64,
    #[serde(rename = "WR")]
    pub wr: f64,
    #[serde(rename = "XS")]
    pub xs: f64,
    #[serde(rename = "REFI")]
    pub refi: f64,
    #[serde(rename = "RFC1")]
    pub rfc1: f64,
    #[serde(rename = "RFC2", default)]
    pub rfc2: f64,
    #[serde(rename = "RFC4", default)]
    pub rfc4: f64,
    #[serde(rename = "RP")]
    pub rp: f64,
    #[serde(rename = "CCD_S")]
    pub ccd_s: f64,
    #[serde(rename = "CCD_L")]
    pub ccd_l: f64,
    #[serde(rename = "FAW")]
    pub faw: f64,
    #[serde(rename = "RRD_S")]
    pub rrd_s: f64,
    #[serde(rename = "RRD_L")]
    pub rrd_l: f64,
    #[serde(rename = "WTR_S")]
    pub wtr_s: f64,
    #[serde(rename = "WTR_L")]
    pub wtr_l: f64,
    #[serde(rename = "AL", default)]
    pub al: f64,
    #[serde(rename = "RTRS")]
    pub rtrs: f64,
}

/// DDR4 timing constraints in simulated time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ddr4Timing {
    pub t_ck: SimTime,
    pub t_ckesr: SimTime,
    pub t_ras: SimTime,
    pub t_rc: SimTime,
    pub t_rcd: SimTime,
    pub t_rl: SimTime,
    pub t_rtp: SimTime,
    pub t_wl: SimTime,
    pub t_wr: SimTime,
    pub t_xs: SimTime,
    pub t_refi: SimTime,
    /// Refresh cycle time for the configured refresh mode.
    pub t_rfc: SimTime,
    pub t_rp: SimTime,
    pub t_ccd_s: SimTime,
    pub t_ccd_l: SimTime,
    pub t_faw: SimTime,
    pub t_rrd_s: SimTime,
    pub t_rrd_l: SimTime,
    pub t_wtr_s: SimTime,
    pub t_wtr_l: SimTime,
    pub t_al: SimTime,
    pub t_rtrs: SimTime,

    pub t_burst: SimTime,
    pub t_rdwr: SimTime,
    pub t_rdwr_r: SimTime,
    pub t_wrrd_s: SimTime,
    pub t_wrrd_l: SimTime,
    pub t_wrrd_r: SimTime,
    pub t_rdpre: SimTime,
    pub t_rdaact: SimTime,
    pub t_wrpre: SimTime,
    pub t_wraact: SimTime,
}

impl Ddr4Timing {
    /// Converts the raw cycle table and pre-derives the composite constraints.
    pub fn derive(spec: &Ddr4TimingSpec, arch: &Architecture) -> Self {
        let t_ck = SimTime::from_secs_f64(spec.tck);
        let c = |cycles: f64| SimTime::cycles(t_ck, cycles);

        let rfc_cycles = match arch.ref_mode {
            Some(2) if spec.rfc2 > 0.0 => spec.rfc2,
            Some(4) if spec.rfc4 > 0.0 => spec.rfc4,
            _ => spec.rfc1,
        };

        let t_rl = c(spec.rl);
        let t_wl = c(spec.wl);
        let t_rtp = c(spec.rtp);
        let t_rp = c(spec.rp);
        let t_al = c(spec.al);
        let t_rtrs = c(spec.rtrs);
        let t_wtr_s = c(spec.wtr_s);
        let t_wtr_l = c(spec.wtr_l);
        let t_wr = c(spec.wr);

        let t_burst = SimTime::cycles(t_ck, (arch.burst_length / arch.data_rate) as f64);

        // Two clocks of read preamble/postamble turnaround on the shared DQ bus.
        let t_rdwr = (t_rl + t_burst + t_ck * 2).saturating_sub(t_wl);
        let t_rdwr_r = (t_rl + t_burst + t_rtrs).saturating_sub(t_wl);
        let t_wrrd_s = t_wl + t_burst + t_wtr_s;
        let t_wrrd_l = t_wl + t_burst + t_wtr_l;
        let t_wrrd_r = (t_wl + t_burst + t_rtrs).saturating_sub(t_rl);
        let t_rdpre = t_al + t_rtp;
        let t_wrpre = t_wl + t_burst + t_wr;

        Self {
            t_ck,
            t_ckesr: c(spec.ckesr),
            t_ras: c(spec.ras),
            t_rc: c(spec.rc),
            t_rcd: c(spec.rcd),
            t_rl,
            t_rtp,
            t_wl,
            t_wr,
            t_xs: c(spec.xs),
            t_refi: c(spec.refi),
            t_rfc: c(rfc_cycles),
            t_rp,
            t_ccd_s: c(spec.ccd_s),
            t_ccd_l: c(spec.ccd_l),
            t_faw: c(spec.faw),
            t_rrd_s: c(spec.rrd_s),
            t_rrd_l: c(spec.rrd_l),
            t_wtr_s,
            t_wtr_l,
            t_al,
            t_rtrs,
            t_burst,
            t_rdwr,
            t_rdwr_r,
            t_wrrd_s,
            t_wrrd_l,
            t_wrrd_r,
            t_rdpre,
            t_rdaact: t_rdpre + t_rp,
            t_wrpre,
            t_wraact: t_wrpre + t_rp,
        }
    }
}
