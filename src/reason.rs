//! Enumeration failure taxonomy.
//!
//! `EnumReason` is the closed, flat set of outcomes the orchestrator can
//! report. It is also the external vocabulary printed by the console's
//! `showerrors` command (`token()`), so variant order and wording here are
//! load-bearing for anything parsing monitor output.

use core::fmt;

/// Outcome of a full enumeration attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumReason {
    /// Enumeration succeeded.
    Ok,
    /// CPU descriptor fails magic/type/widths.
    CpuDescBad,
    /// Bank descriptor fails magic/type/spec-version.
    BankDescBad,
    /// Bank data-bus width differs from the CPU's.
    BankWidthMismatch,
    /// Two non-empty windows collide per the (base, mask, opsel) rule.
    WindowCollision,
    /// A window with the `Required` bit set has no matching device instance.
    RequiredWindowMissing,
    /// Two non-empty route entries share (function, instance, channel).
    RouteDuplicate,
    /// A declared device interrupt channel has no matching route.
    RouteMissing,
    /// Some device-instance data-bus width exceeds the CPU's.
    DevWidthIncompat,
    /// Any configuration-bus transport error, excluding "no device" during slot probing.
    I2cError,
    /// Any other failure during init (e.g. CPLD bus setup).
    UnknownFail,
}

impl EnumReason {
    /// Stable external token, as printed by the console's `showerrors` command.
    pub fn token(self) -> &'static str {
        match self {
            EnumReason::Ok => "OK",
            EnumReason::CpuDescBad => "cpu_desc_bad",
            EnumReason::BankDescBad => "bank_desc_bad",
            EnumReason::BankWidthMismatch => "bank_width_mismatch",
            EnumReason::WindowCollision => "window_collision",
            EnumReason::RequiredWindowMissing => "required_window_missing",
            EnumReason::RouteDuplicate => "route_duplicate",
            EnumReason::RouteMissing => "route_missing",
            EnumReason::DevWidthIncompat => "dev_width_incompat",
            EnumReason::I2cError => "i2c_error",
            EnumReason::UnknownFail => "unknown_fail",
        }
    }

    /// True for every reason other than `Ok`.
    pub fn is_failure(self) -> bool {
        !matches!(self, EnumReason::Ok)
    }
}

impl Default for EnumReason {
    fn default() -> Self {
        EnumReason::UnknownFail
    }
}

impl fmt::Display for EnumReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}
