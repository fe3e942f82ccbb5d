mod shapes;

pub use shapes::{CountryShape, WorldShapes};

use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

/// Required CSV headers. These names (including the percent sign and the
/// hyphen) are the on-disk compatibility contract with the source file.
pub const COL_COUNTRY: &str = "Country";
pub const COL_POPULATION: &str = "Population";
pub const COL_FORESTED: &str = "Forested Area (%)";
pub const COL_CO2: &str = "Co2-Emissions";
pub const COL_URBAN: &str = "Urban_population";

/// Load-time failures. Malformed cells and an empty table are fatal: the
/// dashboard cannot render from a partially cleaned dataset.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("row {row}, column {column:?}: {value:?} is not a number")]
    MalformedNumericField {
        row: usize,
        column: String,
        value: String,
    },
    #[error("row {0}: empty country name")]
    EmptyCountry(usize),
    #[error("required column {0:?} is missing from the header")]
    MissingColumn(&'static str),
    #[error("the dataset contains no rows")]
    EmptyDataset,
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// One row of the country statistics table, numeric columns already cleaned.
#[derive(Debug, Clone)]
pub struct CountryRecord {
    pub country: String,
    pub population: f64,
    pub forested_area_pct: f64,
    pub co2_emissions: f64,
    pub urban_population: f64,
    /// All other columns, passed through verbatim for the detail table.
    pub extra: Vec<(String, String)>,
}

/// The cleaned table. Immutable after load; every later stage derives views
/// (index lists) from it rather than mutating it.
#[derive(Debug)]
pub struct Dataset {
    records: Vec<CountryRecord>,
}

impl Dataset {
    pub fn from_csv_path(path: &Path) -> Result<Self, DataError> {
        Self::from_reader(File::open(path)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DataError> {
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

        let headers = rdr.headers()?.clone();
        let col = |name: &'static str| -> Result<usize, DataError> {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or(DataError::MissingColumn(name))
        };
        let country_idx = col(COL_COUNTRY)?;
        let population_idx = col(COL_POPULATION)?;
        let forested_idx = col(COL_FORESTED)?;
        let co2_idx = col(COL_CO2)?;
        let urban_idx = col(COL_URBAN)?;
        let core = [country_idx, population_idx, forested_idx, co2_idx, urban_idx];

        let mut records = Vec::new();
        for (i, row) in rdr.records().enumerate() {
            let row = row?;
            // 1-based, counting the header, so it matches the row a user
            // sees when they open the file in a spreadsheet
            let row_no = i + 2;

            let country = row.get(country_idx).unwrap_or("").trim().to_string();
            if country.is_empty() {
                return Err(DataError::EmptyCountry(row_no));
            }

            let cell = |idx: usize, name: &str| -> Result<f64, DataError> {
                let raw = row.get(idx).unwrap_or("");
                parse_display_number(raw).ok_or_else(|| DataError::MalformedNumericField {
                    row: row_no,
                    column: name.to_string(),
                    value: raw.to_string(),
                })
            };

            let extra = headers
                .iter()
                .enumerate()
                .filter(|(idx, _)| !core.contains(idx))
                .map(|(idx, h)| (h.to_string(), row.get(idx).unwrap_or("").to_string()))
                .collect();

            records.push(CountryRecord {
                country,
                population: cell(population_idx, COL_POPULATION)?,
                forested_area_pct: cell(forested_idx, COL_FORESTED)?,
                co2_emissions: cell(co2_idx, COL_CO2)?,
                urban_population: cell(urban_idx, COL_URBAN)?,
                extra,
            });
        }

        if records.is_empty() {
            return Err(DataError::EmptyDataset);
        }

        Ok(Self { records })
    }

    pub fn records(&self) -> &[CountryRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Exact-match lookup by country name, over the full (unfiltered) table.
    pub fn find(&self, country: &str) -> Option<&CountryRecord> {
        self.records.iter().find(|r| r.country == country)
    }
}

/// Parse a display-formatted number: `,` thousands separators are stripped
/// and one trailing `%` is dropped. Plain numbers pass through unchanged,
/// so cleaning is idempotent.
pub fn parse_display_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_suffix('%').unwrap_or(trimmed);
    let cleaned: String = trimmed.chars().filter(|&c| c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
Country,Capital,Population,Forested Area (%),Co2-Emissions,Urban_population
Brazil,Brasilia,\"212,559,417\",58.9%,\"462,299\",\"183,241,641\"
Iceland,Reykjavik,\"341,243\",0.5%,\"2,064\",\"322,212\"
";

    #[test]
    fn test_percent_and_comma_cleaning() {
        assert_eq!(parse_display_number("37.5%"), Some(37.5));
        assert_eq!(parse_display_number("1,234,567"), Some(1_234_567.0));
        assert_eq!(parse_display_number("-12"), Some(-12.0));
    }

    #[test]
    fn test_cleaning_is_idempotent() {
        assert_eq!(parse_display_number("42.5"), Some(42.5));
        assert_eq!(parse_display_number("1234567"), Some(1_234_567.0));
    }

    #[test]
    fn test_rejects_garbage() {
        assert_eq!(parse_display_number("n/a"), None);
        assert_eq!(parse_display_number(""), None);
        assert_eq!(parse_display_number("%"), None);
        assert_eq!(parse_display_number("inf"), None);
    }

    #[test]
    fn test_load_cleans_all_numeric_columns() {
        let ds = Dataset::from_reader(CSV.as_bytes()).unwrap();
        assert_eq!(ds.len(), 2);
        let brazil = &ds.records()[0];
        assert_eq!(brazil.country, "Brazil");
        assert_eq!(brazil.population, 212_559_417.0);
        assert_eq!(brazil.forested_area_pct, 58.9);
        assert_eq!(brazil.co2_emissions, 462_299.0);
        assert_eq!(brazil.urban_population, 183_241_641.0);
    }

    #[test]
    fn test_passthrough_columns_kept_verbatim() {
        let ds = Dataset::from_reader(CSV.as_bytes()).unwrap();
        let iceland = &ds.records()[1];
        assert_eq!(
            iceland.extra,
            vec![("Capital".to_string(), "Reykjavik".to_string())]
        );
    }

    #[test]
    fn test_malformed_cell_names_row_and_column() {
        let bad = "\
Country,Population,Forested Area (%),Co2-Emissions,Urban_population
Atlantis,not-a-number,10%,5,5
";
        match Dataset::from_reader(bad.as_bytes()) {
            Err(DataError::MalformedNumericField { row, column, value }) => {
                assert_eq!(row, 2);
                assert_eq!(column, COL_POPULATION);
                assert_eq!(value, "not-a-number");
            }
            other => panic!("expected MalformedNumericField, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_dataset_is_fatal() {
        let empty = "Country,Population,Forested Area (%),Co2-Emissions,Urban_population\n";
        assert!(matches!(
            Dataset::from_reader(empty.as_bytes()),
            Err(DataError::EmptyDataset)
        ));
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let missing = "Country,Population\nA,1\n";
        assert!(matches!(
            Dataset::from_reader(missing.as_bytes()),
            Err(DataError::MissingColumn(COL_FORESTED))
        ));
    }

    #[test]
    fn test_find_is_exact_match() {
        let ds = Dataset::from_reader(CSV.as_bytes()).unwrap();
        assert!(ds.find("Iceland").is_some());
        assert!(ds.find("iceland").is_none());
        assert!(ds.find("Wakanda").is_none());
    }
}
