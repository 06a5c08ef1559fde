//! The closed set of pollutants reported by the emission stage.
//!
//! Names match the tokens written into event logs and CSV output exactly
//! (case-sensitive), e.g. `NOx`, `CO2_TOTAL`, `PM2_5`.

use std::str::FromStr;

use crate::CoreError;

/// A pollutant tracked per emission event.
///
/// Declaration order is the canonical output order.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Pollutant {
    Co,
    Co2Total,
    Fc,
    Hc,
    Nmhc,
    Nox,
    No2,
    Pm,
    So2,
    FcMj,
    Co2Rep,
    Co2e,
    Pm2_5,
    Pm2_5NonExhaust,
    PmNonExhaust,
    BcExhaust,
    BcNonExhaust,
    Benzene,
    Pn,
    Pb,
    Ch4,
    N2o,
    Nh3,
}

impl Pollutant {
    /// Every pollutant, in declaration order.
    pub const ALL: [Pollutant; 23] = [
        Pollutant::Co,
        Pollutant::Co2Total,
        Pollutant::Fc,
        Pollutant::Hc,
        Pollutant::Nmhc,
        Pollutant::Nox,
        Pollutant::No2,
        Pollutant::Pm,
        Pollutant::So2,
        Pollutant::FcMj,
        Pollutant::Co2Rep,
        Pollutant::Co2e,
        Pollutant::Pm2_5,
        Pollutant::Pm2_5NonExhaust,
        Pollutant::PmNonExhaust,
        Pollutant::BcExhaust,
        Pollutant::BcNonExhaust,
        Pollutant::Benzene,
        Pollutant::Pn,
        Pollutant::Pb,
        Pollutant::Ch4,
        Pollutant::N2o,
        Pollutant::Nh3,
    ];

    /// Symbolic name as written in event logs and CSV columns.
    pub fn as_str(self) -> &'static str {
        match self {
            Pollutant::Co              => "CO",
            Pollutant::Co2Total        => "CO2_TOTAL",
            Pollutant::Fc              => "FC",
            Pollutant::Hc              => "HC",
            Pollutant::Nmhc            => "NMHC",
            Pollutant::Nox             => "NOx",
            Pollutant::No2             => "NO2",
            Pollutant::Pm              => "PM",
            Pollutant::So2             => "SO2",
            Pollutant::FcMj            => "FC_MJ",
            Pollutant::Co2Rep          => "CO2_rep",
            Pollutant::Co2e            => "CO2e",
            Pollutant::Pm2_5           => "PM2_5",
            Pollutant::Pm2_5NonExhaust => "PM2_5_non_exhaust",
            Pollutant::PmNonExhaust    => "PM_non_exhaust",
            Pollutant::BcExhaust       => "BC_exhaust",
            Pollutant::BcNonExhaust    => "BC_non_exhaust",
            Pollutant::Benzene         => "Benzene",
            Pollutant::Pn              => "PN",
            Pollutant::Pb              => "Pb",
            Pollutant::Ch4             => "CH4",
            Pollutant::N2o             => "N2O",
            Pollutant::Nh3             => "NH3",
        }
    }
}

impl FromStr for Pollutant {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pollutant::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| CoreError::Parse(format!("unknown pollutant {s:?}")))
    }
}

impl std::fmt::Display for Pollutant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
