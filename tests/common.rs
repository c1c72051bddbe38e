use std::fs;
use std::path::{Path, PathBuf};

use energy_report::ReportConfig;
use tempfile::TempDir;

/// One tracker run: (cpu_energy, ram_energy, energy_consumed, duration).
pub type Run = (f64, f64, f64, f64);

/// Builds a results tree inside a temp dir that lives as long as the fixture.
#[allow(dead_code)]
pub struct ResultsFixture {
    dir: TempDir,
}

#[allow(dead_code)]
impl ResultsFixture {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp results dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn config(&self) -> ReportConfig {
        ReportConfig::new(self.root())
    }

    pub fn write_file(&self, relative: impl AsRef<Path>, contents: &str) -> PathBuf {
        let path = self.root().join(relative);
        fs::create_dir_all(path.parent().expect("file has parent")).expect("create parent dirs");
        fs::write(&path, contents).expect("write fixture file");
        path
    }

    /// Writes `{strategy}_{operation}_{size}.csv` in the strategy's sample dir,
    /// surrounded by the extra columns the tracker emits.
    pub fn write_samples(&self, size: u64, strategy: &str, operation: &str, runs: &[Run]) -> PathBuf {
        let mut contents = String::from(
            "timestamp,project_name,duration,emissions,cpu_energy,ram_energy,energy_consumed,country_name\n",
        );
        for (cpu, ram, energy, duration) in runs {
            contents.push_str(&format!(
                "2025-01-01T00:00:00,codecarbon,{duration},0.0001,{cpu},{ram},{energy},Norway\n"
            ));
        }
        self.write_file(
            format!("{size}/{strategy}_{size}_v2/{strategy}_{operation}_{size}.csv"),
            &contents,
        )
    }

    /// Derives every metric from the energy readings so each stays distinct.
    pub fn write_energy_samples(
        &self,
        size: u64,
        strategy: &str,
        operation: &str,
        energy: &[f64],
    ) -> PathBuf {
        let runs: Vec<Run> = energy
            .iter()
            .map(|e| (e * 0.5, e * 0.25, *e, e * 1000.0))
            .collect();
        self.write_samples(size, strategy, operation, &runs)
    }

    pub fn write_summary(&self, size: u64, contents: &str) -> PathBuf {
        self.write_file(
            format!("{size}/comparison/{size}_energy_comparison_summary.csv"),
            contents,
        )
    }
}

/// Parses a written CSV into its header row and data rows.
#[allow(dead_code)]
pub fn read_csv(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
    let mut reader = csv::Reader::from_path(path).expect("open csv");
    let headers = reader
        .headers()
        .expect("read headers")
        .iter()
        .map(str::to_string)
        .collect();
    let rows = reader
        .records()
        .map(|record| {
            record
                .expect("read record")
                .iter()
                .map(str::to_string)
                .collect()
        })
        .collect();
    (headers, rows)
}

/// Value of `column` in `row`, looked up through `headers`.
#[allow(dead_code)]
pub fn cell<'a>(headers: &[String], row: &'a [String], column: &str) -> &'a str {
    let idx = headers
        .iter()
        .position(|h| h == column)
        .unwrap_or_else(|| panic!("column {column} missing from {headers:?}"));
    &row[idx]
}

#[allow(dead_code)]
pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() <= 1e-6 * expected.abs().max(1.0),
        "expected {expected}, got {actual}"
    );
}
