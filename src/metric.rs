use crate::data::CountryRecord;
use std::str::FromStr;
use thiserror::Error;

/// An RGB triple used for choropleth scale endpoints.
pub type Rgb = (u8, u8, u8);

const LIGHT_BLUE: Rgb = (173, 216, 230);
const PURPLE: Rgb = (128, 0, 128);
const YELLOW: Rgb = (255, 255, 0);
const GREEN: Rgb = (0, 128, 0);
const PINK: Rgb = (255, 192, 203);

/// The three metrics the dashboard can color the world by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Population,
    ForestedArea,
    Co2Emissions,
}

#[derive(Debug, Error, Clone)]
#[error("unknown metric {0:?} (expected population, forested-area, or co2-emissions)")]
pub struct InvalidMetric(String);

/// How a metric is presented: map title and the color scale endpoints.
pub struct MetricSpec {
    pub title: &'static str,
    pub scale_low: Rgb,
    pub scale_high: Rgb,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Population, Metric::ForestedArea, Metric::Co2Emissions];

    pub fn spec(self) -> MetricSpec {
        match self {
            Metric::Population => MetricSpec {
                title: "Population by Country",
                scale_low: LIGHT_BLUE,
                scale_high: PURPLE,
            },
            Metric::ForestedArea => MetricSpec {
                title: "Forested Area Percentage by Country",
                scale_low: YELLOW,
                scale_high: GREEN,
            },
            Metric::Co2Emissions => MetricSpec {
                title: "CO2 Emissions by Country",
                scale_low: LIGHT_BLUE,
                scale_high: PINK,
            },
        }
    }

    /// The value this metric reads from a record.
    pub fn value(self, record: &CountryRecord) -> f64 {
        match self {
            Metric::Population => record.population,
            Metric::ForestedArea => record.forested_area_pct,
            Metric::Co2Emissions => record.co2_emissions,
        }
    }

    /// Short name for the selector and status bar.
    pub fn label(self) -> &'static str {
        match self {
            Metric::Population => "Population",
            Metric::ForestedArea => "Forested Area (%)",
            Metric::Co2Emissions => "CO2 Emissions",
        }
    }

    /// Static sidebar blurb for the current metric.
    pub fn description(self) -> &'static str {
        match self {
            Metric::Population => {
                "Explore population by country. Filter the map by population \
                 size with the threshold control, pick a country below the map \
                 to see where it sits and its full record, and compare the \
                 urban populations of the top 15 countries in the bar chart at \
                 the bottom, with total population shown in millions on each bar."
            }
            Metric::ForestedArea => {
                "Explore forested area percentages by country. Tune the map \
                 with the percentage threshold, and pick a country below the \
                 map to see its location and full record."
            }
            Metric::Co2Emissions => {
                "Explore CO2 emissions by country. Adjust the emissions \
                 threshold to refine the map, and pick a country below the map \
                 to see its location and full record."
            }
        }
    }
}

impl FromStr for Metric {
    type Err = InvalidMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "population" => Ok(Metric::Population),
            "forested-area" | "forested area (%)" | "forested-area-pct" => {
                Ok(Metric::ForestedArea)
            }
            "co2" | "co2-emissions" | "co2 emissions" => Ok(Metric::Co2Emissions),
            _ => Err(InvalidMetric(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(population: f64, forested: f64, co2: f64) -> CountryRecord {
        CountryRecord {
            country: "X".to_string(),
            population,
            forested_area_pct: forested,
            co2_emissions: co2,
            urban_population: 0.0,
            extra: Vec::new(),
        }
    }

    #[test]
    fn test_value_accessor_matches_metric() {
        let r = record(10.0, 20.0, 30.0);
        assert_eq!(Metric::Population.value(&r), 10.0);
        assert_eq!(Metric::ForestedArea.value(&r), 20.0);
        assert_eq!(Metric::Co2Emissions.value(&r), 30.0);
    }

    #[test]
    fn test_spec_scales_match_original_palette() {
        assert_eq!(Metric::Population.spec().scale_high, PURPLE);
        assert_eq!(Metric::ForestedArea.spec().scale_low, YELLOW);
        assert_eq!(Metric::Co2Emissions.spec().scale_high, PINK);
    }

    #[test]
    fn test_from_str_fails_closed() {
        assert_eq!("population".parse::<Metric>().unwrap(), Metric::Population);
        assert_eq!("CO2".parse::<Metric>().unwrap(), Metric::Co2Emissions);
        assert!("gdp".parse::<Metric>().is_err());
        assert!("".parse::<Metric>().is_err());
    }
}
