use uom::{
    ConstZero,
    si::{
        angle::radian,
        f64::{Angle, HeatFluxDensity, Power, Ratio},
        ratio::ratio,
    },
};

use crate::greenhouse::GeometryConfig;

/// Sun position for a sample, as a solar position algorithm reports it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunPosition {
    /// Angle between the sun and the vertical.
    pub zenith: Angle,
    /// Clockwise from north.
    pub azimuth: Angle,
}

/// The solar part of a forecast sample, at whichever stage of resolution the
/// weather client delivered it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SolarInput {
    /// Heat gain into the greenhouse air, already resolved.
    Gain(Power),
    /// Irradiance on the glazing plane.
    PlaneOfArray(HeatFluxDensity),
    /// Horizontal irradiance components for a clear sky, transposed onto the
    /// glazing and scaled for the sample's cloud cover.
    Components {
        ghi: HeatFluxDensity,
        dni: HeatFluxDensity,
        dhi: HeatFluxDensity,
        sun: SunPosition,
    },
}

impl SolarInput {
    /// No sun.
    #[must_use]
    pub fn none() -> Self {
        Self::Gain(Power::ZERO)
    }

    /// Resolves this input to a heat gain for the given greenhouse.
    ///
    /// Gains are never negative.
    #[must_use]
    pub fn gain(&self, config: &GeometryConfig, cloud_cover: Option<Ratio>) -> Power {
        let poa = match *self {
            Self::Gain(power) => return power.max(Power::ZERO),
            Self::PlaneOfArray(poa) => poa,
            Self::Components { ghi, dni, dhi, sun } => {
                let transmittance = cloud_cover.map_or(1.0, clear_sky_transmittance);
                transpose(
                    ghi,
                    dni,
                    dhi,
                    sun,
                    config.surface_tilt,
                    config.orientation,
                    config.albedo,
                ) * transmittance
            }
        };
        let gain: Power = poa * config.areas.glazing * config.solar_transmittance;
        gain.max(Power::ZERO)
    }

    pub(super) fn non_finite_field(&self) -> Option<&'static str> {
        match self {
            Self::Gain(power) => (!power.is_finite()).then_some("solar_gain"),
            Self::PlaneOfArray(poa) => (!poa.is_finite()).then_some("solar_poa"),
            Self::Components { ghi, dni, dhi, sun } => {
                if !ghi.is_finite() {
                    Some("ghi")
                } else if !dni.is_finite() {
                    Some("dni")
                } else if !dhi.is_finite() {
                    Some("dhi")
                } else if !sun.zenith.is_finite() || !sun.azimuth.is_finite() {
                    Some("sun_position")
                } else {
                    None
                }
            }
        }
    }
}

/// Fraction of clear-sky irradiance that reaches the ground under
/// `cloud_cover`, clamped to `[0, 1]`.
///
/// Uses the empirical `1 - 0.75 * cf³` relation.
#[must_use]
pub fn clear_sky_transmittance(cloud_cover: Ratio) -> f64 {
    let cf = cloud_cover.get::<ratio>();
    (1.0 - 0.75 * cf.powi(3)).clamp(0.0, 1.0)
}

/// Isotropic-sky transposition of horizontal components onto a tilted plane.
fn transpose(
    ghi: HeatFluxDensity,
    dni: HeatFluxDensity,
    dhi: HeatFluxDensity,
    sun: SunPosition,
    tilt: Angle,
    surface_azimuth: Angle,
    albedo: f64,
) -> HeatFluxDensity {
    let zenith = sun.zenith.get::<radian>();
    let tilt = tilt.get::<radian>();
    let relative_azimuth = sun.azimuth.get::<radian>() - surface_azimuth.get::<radian>();

    let cos_aoi = zenith.cos() * tilt.cos() + zenith.sin() * tilt.sin() * relative_azimuth.cos();

    let beam = dni * cos_aoi.max(0.0);
    let sky = dhi * (1.0 + tilt.cos()) / 2.0;
    let ground = ghi * albedo * (1.0 - tilt.cos()) / 2.0;
    beam + sky + ground
}
