//! Budget program catalog loaded from the provincial budget CSV export.

mod parser;

use std::collections::{BTreeSet, HashSet};
use std::io::Read;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::workflows::bulletin::domain::{BudgetProgram, ProgramId, RecordError};

#[derive(Debug)]
pub enum CatalogImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidProgram(RecordError),
    DuplicateProgram(ProgramId),
}

impl std::fmt::Display for CatalogImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogImportError::Io(err) => write!(f, "failed to read budget catalog: {}", err),
            CatalogImportError::Csv(err) => write!(f, "invalid budget catalog CSV data: {}", err),
            CatalogImportError::InvalidProgram(err) => {
                write!(f, "invalid budget program: {}", err)
            }
            CatalogImportError::DuplicateProgram(id) => {
                write!(f, "budget program {} appears more than once", id)
            }
        }
    }
}

impl std::error::Error for CatalogImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogImportError::Io(err) => Some(err),
            CatalogImportError::Csv(err) => Some(err),
            CatalogImportError::InvalidProgram(err) => Some(err),
            CatalogImportError::DuplicateProgram(_) => None,
        }
    }
}

impl From<std::io::Error> for CatalogImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for CatalogImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<RecordError> for CatalogImportError {
    fn from(err: RecordError) -> Self {
        Self::InvalidProgram(err)
    }
}

/// Validated, duplicate-free set of budget programs.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BudgetCatalog {
    programs: Vec<BudgetProgram>,
}

impl BudgetCatalog {
    pub fn new(programs: Vec<BudgetProgram>) -> Result<Self, CatalogImportError> {
        let mut ids = HashSet::new();
        for program in &programs {
            program.validate()?;
            if !ids.insert(program.id.clone()) {
                return Err(CatalogImportError::DuplicateProgram(program.id.clone()));
            }
        }
        Ok(Self { programs })
    }

    pub fn programs(&self) -> &[BudgetProgram] {
        &self.programs
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    pub fn get(&self, id: &ProgramId) -> Option<&BudgetProgram> {
        self.programs.iter().find(|program| &program.id == id)
    }

    /// Programs of a single fiscal year, in catalog order.
    pub fn for_fiscal_year(&self, fiscal_year: i32) -> BudgetCatalog {
        BudgetCatalog {
            programs: self
                .programs
                .iter()
                .filter(|program| program.fiscal_year == fiscal_year)
                .cloned()
                .collect(),
        }
    }

    pub fn summary(&self) -> CatalogSummary {
        CatalogSummary {
            programs: self.programs.len(),
            fiscal_years: self
                .programs
                .iter()
                .map(|program| program.fiscal_year)
                .collect(),
            initial_total: self.programs.iter().map(|program| program.initial_amount).sum(),
            current_total: self.programs.iter().map(|program| program.current_amount).sum(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogSummary {
    pub programs: usize,
    pub fiscal_years: BTreeSet<i32>,
    pub initial_total: f64,
    pub current_total: f64,
}

pub struct BudgetCatalogImporter;

impl BudgetCatalogImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<BudgetCatalog, CatalogImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<BudgetCatalog, CatalogImportError> {
        let catalog = BudgetCatalog::new(parser::parse_programs(reader)?)?;
        info!(programs = catalog.len(), "budget catalog imported");
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const HEADER: &str = "id,fiscal_year,organism,program_code,subprogram_code,account_code,description,initial_amount,current_amount,funding_source\n";

    fn import(rows: &str) -> Result<BudgetCatalog, CatalogImportError> {
        BudgetCatalogImporter::from_reader(Cursor::new(format!("{HEADER}{rows}")))
    }

    #[test]
    fn importer_reads_programs_and_optional_cells() {
        let catalog = import(
            "p-1,2024,Ministerio de Salud,12,,1.2.3.4,Hospitales,1000000,800000,Obras hospitalarias\n\
             p-2,2023,Ministry of Education, 07 ,01,,Schools,500,500,\n",
        )
        .expect("import succeeds");

        assert_eq!(catalog.len(), 2);
        let first = &catalog.programs()[0];
        assert_eq!(first.subprogram_code, None);
        assert_eq!(first.account_code.as_deref(), Some("1.2.3.4"));
        assert!(first.keywords.contains("work"));
        assert!(first.keywords.contains("hospitalarias"));

        let second = catalog.get(&ProgramId("p-2".to_string())).expect("present");
        assert_eq!(second.program_code, "07");
        assert_eq!(second.subprogram_code.as_deref(), Some("01"));
        assert_eq!(second.account_code, None);
        assert!(second.keywords.is_empty());
    }

    #[test]
    fn derived_keywords_drop_short_tokens_and_stop_words() {
        let keywords = parser::derive_keywords("Fondos para la red de rutas");
        assert!(keywords.contains("fondos"));
        assert!(keywords.contains("rutas"));
        assert!(keywords.contains("route"));
        assert!(!keywords.contains("para"));
        assert!(!keywords.contains("red"));
    }

    #[test]
    fn importer_rejects_negative_current_amount() {
        let error = import("p-1,2024,Salud,12,,,Hospitales,100,-1,\n").expect_err("negative");
        match error {
            CatalogImportError::InvalidProgram(RecordError::NegativeCurrentAmount { .. }) => {}
            other => panic!("expected invalid program, got {other:?}"),
        }
    }

    #[test]
    fn importer_rejects_duplicate_ids() {
        let error = import(
            "p-1,2024,Salud,12,,,Hospitales,100,100,\np-1,2024,Salud,13,,,Clinicas,100,100,\n",
        )
        .expect_err("duplicate");
        match error {
            CatalogImportError::DuplicateProgram(id) => assert_eq!(id.0, "p-1"),
            other => panic!("expected duplicate program, got {other:?}"),
        }
    }

    #[test]
    fn importer_surfaces_csv_and_io_errors() {
        let error = import("p-1,not-a-year,Salud,12,,,Hospitales,100,100,\n").expect_err("csv");
        assert!(matches!(error, CatalogImportError::Csv(_)));

        let error = BudgetCatalogImporter::from_path("./does-not-exist.csv").expect_err("io");
        assert!(matches!(error, CatalogImportError::Io(_)));
    }

    #[test]
    fn fiscal_year_filter_and_summary() {
        let catalog = import(
            "p-1,2024,Salud,12,,,Hospitales,100,80,\np-2,2023,Salud,13,,,Clinicas,50,50,\n",
        )
        .expect("import succeeds");

        let narrowed = catalog.for_fiscal_year(2024);
        assert_eq!(narrowed.len(), 1);
        assert_eq!(narrowed.programs()[0].id.0, "p-1");

        let summary = catalog.summary();
        assert_eq!(summary.programs, 2);
        assert_eq!(summary.fiscal_years.into_iter().collect::<Vec<_>>(), vec![2023, 2024]);
        assert_eq!(summary.initial_total, 150.0);
        assert_eq!(summary.current_total, 130.0);
    }
}
