//! The JSON forecast file: an array of hourly records.

use glasshouse_components::forecast::{Forecast, ForecastSample, SolarInput, SunPosition};
use jiff::civil::DateTime;
use serde::Deserialize;
use uom::si::{
    angle::degree,
    f64::{Angle, HeatFluxDensity, Power, Ratio, ThermodynamicTemperature, Velocity},
    heat_flux_density::watt_per_square_meter,
    power::watt,
    ratio::percent,
    thermodynamic_temperature::degree_celsius,
    velocity::meter_per_second,
};

use crate::ConfigError;

/// One forecast hour as a weather client writes it.
///
/// Solar input is given in exactly one form: a resolved `solar_gain_w`, a
/// plane-of-array `poa_w_m2`, or the full set of horizontal components with
/// the sun's position. A record with none of them has no sun.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ForecastRecord {
    pub time: DateTime,
    pub outside_c: f64,
    pub ground_c: Option<f64>,
    pub solar_gain_w: Option<f64>,
    pub poa_w_m2: Option<f64>,
    pub ghi_w_m2: Option<f64>,
    pub dni_w_m2: Option<f64>,
    pub dhi_w_m2: Option<f64>,
    pub solar_zenith_deg: Option<f64>,
    pub solar_azimuth_deg: Option<f64>,
    pub wind_speed_m_s: Option<f64>,
    pub relative_humidity_pct: Option<f64>,
    pub cloud_cover_pct: Option<f64>,
}

impl ForecastRecord {
    fn into_sample(self, index: usize) -> Result<ForecastSample, ConfigError> {
        let solar = self.solar(index)?;
        let celsius = ThermodynamicTemperature::new::<degree_celsius>;
        let pct = Ratio::new::<percent>;

        Ok(ForecastSample {
            ground: self.ground_c.map(celsius),
            wind_speed: self.wind_speed_m_s.map(Velocity::new::<meter_per_second>),
            relative_humidity: self.relative_humidity_pct.map(pct),
            cloud_cover: self.cloud_cover_pct.map(pct),
            ..ForecastSample::new(self.time, celsius(self.outside_c), solar)
        })
    }

    fn solar(&self, index: usize) -> Result<SolarInput, ConfigError> {
        let flux = HeatFluxDensity::new::<watt_per_square_meter>;
        let components = [
            self.ghi_w_m2,
            self.dni_w_m2,
            self.dhi_w_m2,
            self.solar_zenith_deg,
            self.solar_azimuth_deg,
        ];
        let given = components.iter().filter(|value| value.is_some()).count();

        match (self.solar_gain_w, self.poa_w_m2, components) {
            (Some(_), Some(_), _) => Err(ConfigError::Solar {
                index,
                reason: "both a gain and a plane-of-array irradiance",
            }),
            (Some(_), None, _) | (None, Some(_), _) if given > 0 => Err(ConfigError::Solar {
                index,
                reason: "horizontal components alongside a resolved input",
            }),
            (Some(gain), None, _) => Ok(SolarInput::Gain(Power::new::<watt>(gain))),
            (None, Some(poa), _) => Ok(SolarInput::PlaneOfArray(flux(poa))),
            (None, None, [Some(ghi), Some(dni), Some(dhi), Some(zenith), Some(azimuth)]) => {
                Ok(SolarInput::Components {
                    ghi: flux(ghi),
                    dni: flux(dni),
                    dhi: flux(dhi),
                    sun: SunPosition {
                        zenith: Angle::new::<degree>(zenith),
                        azimuth: Angle::new::<degree>(azimuth),
                    },
                })
            }
            (None, None, _) if given > 0 => Err(ConfigError::Solar {
                index,
                reason: "an incomplete set of horizontal components",
            }),
            (None, None, _) => Ok(SolarInput::none()),
        }
    }
}

/// Parses and validates a JSON forecast.
///
/// # Errors
///
/// Returns a [`ConfigError`] for malformed JSON, ambiguous solar input, or a
/// forecast that fails validation.
pub fn parse_forecast(json: &str) -> Result<Forecast, ConfigError> {
    let records: Vec<ForecastRecord> = serde_json::from_str(json)?;
    let samples = records
        .into_iter()
        .enumerate()
        .map(|(index, record)| record.into_sample(index))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Forecast::new(samples)?)
}
