use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::debug;

const BUNDLED_TABLE: &str = include_str!("../../../data/elements.dat");
const BUNDLED_ORIGIN: &str = "<bundled elements.dat>";

static GLOBAL_REGISTRY: OnceLock<ElementRegistry> = OnceLock::new();

/// Reference data for one chemical element.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ElementRecord {
    /// Canonical symbol (first letter upper case, the rest lower case).
    pub symbol: String,
    pub atomic_number: u8,
    /// Standard atomic mass in g/mol.
    pub mass: f64,
    /// Single-bond covalent radius in Angstroms.
    pub covalent_radius: f64,
    #[serde(default)]
    pub vdw_radius: Option<f64>,
    #[serde(default)]
    pub electronegativity: Option<f64>,
}

#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("Invalid element record in '{path}' on line {line}: {kind}")]
    Record {
        path: String,
        line: usize,
        kind: ElementRecordErrorKind,
    },
    #[error("Duplicate element symbol '{symbol}' in '{path}' on line {line}")]
    DuplicateSymbol {
        path: String,
        line: usize,
        symbol: String,
    },
    #[error("No element records found in '{path}'")]
    Empty { path: String },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ElementRecordErrorKind {
    #[error("missing required field '{0}'")]
    MissingField(&'static str),
    #[error("invalid value '{value}' for field '{field}'")]
    InvalidNumber { field: &'static str, value: String },
    #[error("invalid element symbol '{0}'")]
    InvalidSymbol(String),
    #[error("field '{field}' must be positive (value: {value})")]
    NonPositive { field: &'static str, value: f64 },
    #[error("unexpected extra field '{0}'")]
    ExtraField(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown element symbol '{symbol}'")]
pub struct UnknownElementError {
    pub symbol: String,
}

/// Normalizes an element symbol to its canonical spelling (`"CL"` -> `"Cl"`).
///
/// Returns `None` for anything that cannot be an element symbol.
pub fn canonical_symbol(symbol: &str) -> Option<String> {
    let trimmed = symbol.trim();
    if trimmed.is_empty() || trimmed.len() > 3 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let mut chars = trimmed.chars();
    let first = chars.next()?.to_ascii_uppercase();
    Some(std::iter::once(first).chain(chars.map(|c| c.to_ascii_lowercase())).collect())
}

/// Table of per-element constants, keyed by symbol.
///
/// Loaded once and read-only afterwards, so a single instance can be shared by
/// reference across any number of parsing threads.
#[derive(Debug, Clone, Default)]
pub struct ElementRegistry {
    records: Vec<ElementRecord>,
    by_symbol: HashMap<String, usize>,
}

impl ElementRegistry {
    /// Loads a registry from a reference data file.
    ///
    /// Files ending in `.csv` are read as a headed CSV table; anything else is
    /// read as the whitespace-delimited line format
    /// `symbol atomic_number mass covalent_radius [vdw_radius [electronegativity]]`.
    ///
    /// # Errors
    ///
    /// Fails if the file is missing, any line is malformed, a symbol appears
    /// twice, or the file holds no records. A single bad line aborts the load.
    pub fn load(path: &Path) -> Result<Self, DataLoadError> {
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

        let registry = if is_csv {
            Self::load_csv(path)?
        } else {
            let content = std::fs::read_to_string(path).map_err(|e| DataLoadError::Io {
                path: path.to_string_lossy().to_string(),
                source: e,
            })?;
            Self::parse_str(&content, &path.to_string_lossy())?
        };

        debug!(
            path = %path.display(),
            elements = registry.len(),
            "Loaded element registry."
        );
        Ok(registry)
    }

    /// Parses the line-oriented format from memory. `origin` names the source in errors.
    pub fn parse_str(content: &str, origin: &str) -> Result<Self, DataLoadError> {
        let mut registry = Self::default();

        for (index, raw_line) in content.lines().enumerate() {
            let line_num = index + 1;
            let line = raw_line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }

            let record = parse_record_line(line).map_err(|kind| DataLoadError::Record {
                path: origin.to_string(),
                line: line_num,
                kind,
            })?;
            registry
                .insert(record)
                .map_err(|symbol| DataLoadError::DuplicateSymbol {
                    path: origin.to_string(),
                    line: line_num,
                    symbol,
                })?;
        }

        if registry.is_empty() {
            return Err(DataLoadError::Empty {
                path: origin.to_string(),
            });
        }
        Ok(registry)
    }

    /// The reference table shipped with the crate.
    pub fn bundled() -> Result<Self, DataLoadError> {
        Self::parse_str(BUNDLED_TABLE, BUNDLED_ORIGIN)
    }

    fn load_csv(path: &Path) -> Result<Self, DataLoadError> {
        let path_str = path.to_string_lossy().to_string();
        let csv_error = |source| DataLoadError::Csv {
            path: path_str.clone(),
            source,
        };

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .comment(Some(b'#'))
            .from_path(path)
            .map_err(csv_error)?;
        let headers = reader.headers().map_err(csv_error)?.clone();

        let mut registry = Self::default();
        for result in reader.records() {
            let row = result.map_err(csv_error)?;
            let line_num = row.position().map_or(0, |p| p.line() as usize);
            let mut record: ElementRecord = row.deserialize(Some(&headers)).map_err(csv_error)?;

            let record_error = |kind| DataLoadError::Record {
                path: path_str.clone(),
                line: line_num,
                kind,
            };
            record.symbol = canonical_symbol(&record.symbol)
                .ok_or_else(|| record_error(ElementRecordErrorKind::InvalidSymbol(record.symbol.clone())))?;
            validate_positive("mass", record.mass).map_err(record_error)?;
            validate_positive("covalent_radius", record.covalent_radius).map_err(record_error)?;

            registry
                .insert(record)
                .map_err(|symbol| DataLoadError::DuplicateSymbol {
                    path: path_str.clone(),
                    line: line_num,
                    symbol,
                })?;
        }

        if registry.is_empty() {
            return Err(DataLoadError::Empty { path: path_str });
        }
        Ok(registry)
    }

    /// Adds a record, returning the symbol back if it is already present.
    fn insert(&mut self, record: ElementRecord) -> Result<(), String> {
        if self.by_symbol.contains_key(&record.symbol) {
            return Err(record.symbol);
        }
        self.by_symbol.insert(record.symbol.clone(), self.records.len());
        self.records.push(record);
        Ok(())
    }

    /// Looks up an element by symbol, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownElementError`] if the symbol was never loaded.
    pub fn lookup(&self, symbol: &str) -> Result<&ElementRecord, UnknownElementError> {
        canonical_symbol(symbol)
            .and_then(|canonical| self.by_symbol.get(&canonical))
            .map(|&index| &self.records[index])
            .ok_or_else(|| UnknownElementError {
                symbol: symbol.trim().to_string(),
            })
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.lookup(symbol).is_ok()
    }

    /// First record loaded with the given atomic number.
    pub fn get_by_atomic_number(&self, atomic_number: u8) -> Option<&ElementRecord> {
        self.records
            .iter()
            .find(|record| record.atomic_number == atomic_number)
    }

    /// Records in load order.
    pub fn iter(&self) -> impl Iterator<Item = &ElementRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Installs this registry as the process-wide instance.
    ///
    /// Only the first call succeeds; later calls hand their registry back.
    pub fn install(self) -> Result<&'static ElementRegistry, ElementRegistry> {
        let mut candidate = Some(self);
        let installed = GLOBAL_REGISTRY.get_or_init(|| candidate.take().unwrap_or_default());
        match candidate {
            Some(rejected) => Err(rejected),
            None => Ok(installed),
        }
    }

    /// The process-wide registry, if one has been installed.
    pub fn global() -> Option<&'static ElementRegistry> {
        GLOBAL_REGISTRY.get()
    }
}

fn validate_positive(field: &'static str, value: f64) -> Result<(), ElementRecordErrorKind> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ElementRecordErrorKind::NonPositive { field, value })
    }
}

fn parse_number<T: std::str::FromStr>(
    field: &'static str,
    value: Option<&str>,
) -> Result<T, ElementRecordErrorKind> {
    let value = value.ok_or(ElementRecordErrorKind::MissingField(field))?;
    value
        .parse()
        .map_err(|_| ElementRecordErrorKind::InvalidNumber {
            field,
            value: value.to_string(),
        })
}

fn parse_optional(field: &'static str, value: Option<&str>) -> Result<Option<f64>, ElementRecordErrorKind> {
    value.map(|v| parse_number(field, Some(v))).transpose()
}

fn parse_record_line(line: &str) -> Result<ElementRecord, ElementRecordErrorKind> {
    let mut fields = line.split_whitespace();

    let raw_symbol = fields
        .next()
        .ok_or(ElementRecordErrorKind::MissingField("symbol"))?;
    let symbol = canonical_symbol(raw_symbol)
        .ok_or_else(|| ElementRecordErrorKind::InvalidSymbol(raw_symbol.to_string()))?;

    let atomic_number: u8 = parse_number("atomic_number", fields.next())?;
    let mass: f64 = parse_number("mass", fields.next())?;
    let covalent_radius: f64 = parse_number("covalent_radius", fields.next())?;
    let vdw_radius = parse_optional("vdw_radius", fields.next())?;
    let electronegativity = parse_optional("electronegativity", fields.next())?;

    if let Some(extra) = fields.next() {
        return Err(ElementRecordErrorKind::ExtraField(extra.to_string()));
    }
    validate_positive("mass", mass)?;
    validate_positive("covalent_radius", covalent_radius)?;

    Ok(ElementRecord {
        symbol,
        atomic_number,
        mass,
        covalent_radius,
        vdw_radius,
        electronegativity,
    })
}
