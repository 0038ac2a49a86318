//! LPDDR5 Timing Parameters.
//!
//! Raw cycle counts as they appear in a DRAMUtils `memtimingspec` section and
//! the derived, picosecond-valued table the LPDDR5 checker works from. The
//! derived values are computed once here so that the checker's query/record
//! path is pure comparisons and additions.

use super::Architecture;
use crate::common::SimTime;
use serde::Deserialize;

/// `memtimingspec` section of an LPDDR5 memspec (cycle counts, `tCK` in seconds).
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Lpddr5TimingSpec {
    #[serde(rename = "tCK")]
    pub tck: f64,
    #[serde(rename = "REFI")]
    pub refi: f64,
    #[serde(rename = "REFIpb")]
    pub refi_pb: f64,
    #[serde(rename = "RFCab")]
    pub rfc_ab: f64,
    #[serde(rename = "RFCpb")]
    pub rfc_pb: f64,
    #[serde(rename = "RAS")]
    pub ras: f64,
    #[serde(rename = "RPab")]
    pub rp_ab: f64,
    #[serde(rename = "RPpb")]
    pub rp_pb: f64,
    #[serde(rename = "RCab")]
    pub rc_ab: f64,
    #[serde(rename = "RCpb")]
    pub rc_pb: f64,
    #[serde(rename = "PPD")]
    pub ppd: f64,
    #[serde(rename = "FAW")]
    pub faw: f64,
    #[serde(rename = "RRD")]
    pub rrd: f64,
    #[serde(rename = "RL")]
    pub rl: f64,
    #[serde(rename = "WL")]
    pub wl: f64,
    #[serde(rename = "WCK2DQO", default)]
    pub wck2dqo: f64,
    #[serde(rename = "WR")]
    pub wr: f64,
    #[serde(rename = "WTR_L")]
    pub wtr_l: f64,
    #[serde(rename = "WTR_S")]
    pub wtr_s: f64,
    #[serde(rename = "RTRS")]
    pub rtrs: f64,
}

/// LPDDR5 timing constraints in simulated time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lpddr5Timing {
    pub t_ck: SimTime,
    pub t_refi: SimTime,
    pub t_refi_pb: SimTime,
    pub t_rfc_ab: SimTime,
    pub t_rfc_pb: SimTime,
    pub t_ras: SimTime,
    pub t_rp_ab: SimTime,
    pub t_rp_pb: SimTime,
    pub t_rc_ab: SimTime,
    pub t_rc_pb: SimTime,
    pub t_ppd: SimTime,
    pub t_faw: SimTime,
    pub t_rrd: SimTime,
    pub t_rl: SimTime,
    pub t_wl: SimTime,
    pub t_wck2dqo: SimTime,
    pub t_wr: SimTime,
    pub t_wtr_l: SimTime,
    pub t_wtr_s: SimTime,
    pub t_rtrs: SimTime,

    /// Data burst duration: `(BL / dataRate) * tCK`.
    pub t_burst: SimTime,
    /// Read to write, same bank group.
    pub t_rdwr_s: SimTime,
    /// Read to write, different bank group.
    pub t_rdwr_l: SimTime,
    /// Read to write, different rank.
    pub t_rdwr_r: SimTime,
    /// Write to read, same bank group.
    pub t_wrrd_s: SimTime,
    /// Write to read, different bank group.
    pub t_wrrd_l: SimTime,
    /// Write to read, different rank.
    pub t_wrrd_r: SimTime,
    /// Read to precharge. tRTP is absent from the parameter set, so this is the
    /// read data window.
    pub t_rdpre: SimTime,
    /// Write to precharge (write recovery included).
    pub t_wrpre: SimTime,
    /// Write with auto-precharge to activate.
    pub t_wraact: SimTime,
    /// Read with auto-precharge to activate.
    pub t_rdaact: SimTime,
}

impl Lpddr5Timing {
    /// Converts the raw cycle table and pre-derives the composite constraints.
    pub fn derive(spec: &Lpddr5TimingSpec, arch: &Architecture) -> Self {
        let t_ck = SimTime::from_secs_f64(spec.tck);
        let c = |cycles: f64| SimTime::cycles(t_ck, cycles);

        let t_rl = c(spec.rl);
        let t_wl = c(spec.wl);
        let t_wr = c(spec.wr);
        let t_wtr_l = c(spec.wtr_l);
        let t_wtr_s = c(spec.wtr_s);
        let t_rtrs = c(spec.rtrs);
        let t_rp_pb = c(spec.rp_pb);

        let t_burst = SimTime::cycles(t_ck, (arch.burst_length / arch.data_rate) as f64);

        let t_rdwr_s = (t_rl + t_burst + t_wtr_s).saturating_sub(t_wl);
        let t_rdwr_l = (t_rl + t_burst + t_wtr_l).saturating_sub(t_wl);
        let t_rdwr_r = (t_rl + t_burst + t_rtrs).saturating_sub(t_wl);

        let t_wrrd_s = t_wl + t_burst + t_wtr_s;
        let t_wrrd_l = t_wl + t_burst + t_wtr_l;
        let t_wrrd_r = (t_wl + t_burst + t_rtrs).saturating_sub(t_rl);

        let t_rdpre = t_rl + t_burst;
        let t_wrpre = t_wl + t_burst + t_wr;

        Self {
            t_ck,
            t_refi: c(spec.refi),
            t_refi_pb: c(spec.refi_pb),
            t_rfc_ab: c(spec.rfc_ab),
            t_rfc_pb: c(spec.rfc_pb),
            t_ras: c(spec.ras),
            t_rp_ab: c(spec.rp_ab),
            t_rp_pb,
            t_rc_ab: c(spec.rc_ab),
            t_rc_pb: c(spec.rc_pb),
            t_ppd: c(spec.ppd),
            t_faw: c(spec.faw),
            t_rrd: c(spec.rrd),
            t_rl,
            t_wl,
            t_wck2dqo: c(spec.wck2dqo),
            t_wr,
            t_wtr_l,
            t_wtr_s,
            t_rtrs,
            t_burst,
            t_rdwr_s,
            t_rdwr_l,
            t_rdwr_r,
            t_wrrd_s,
            t_wrrd_l,
            t_wrrd_r,
            t_rdpre,
            t_wrpre,
            t_wraact: t_wrpre + t_rp_pb,
            t_rdaact: t_rdpre + t_rp_pb,
        }
    }
}
