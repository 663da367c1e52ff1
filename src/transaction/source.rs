//! Data sources that deliver the user's transactions.
//!
//! A source is asked for its transactions once per server start. The result
//! is either the complete list of transactions or an error; there is no
//! incremental sync and no retry.

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use crate::{Error, transaction::Transaction};

/// Something that can produce the full list of the user's transactions.
pub trait TransactionSource {
    /// Fetch every transaction from the source.
    ///
    /// # Errors
    /// Returns [Error::DataSourceError] if the source cannot be read and
    /// [Error::InvalidTransactionData] if a record cannot be parsed.
    fn fetch_transactions(&self) -> Result<Vec<Transaction>, Error>;

    /// A short human readable description of the source for logging.
    fn describe(&self) -> String;
}

/// Reads transactions from a JSON file containing an array of records.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    /// Create a source that reads the JSON file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TransactionSource for JsonFileSource {
    fn fetch_transactions(&self) -> Result<Vec<Transaction>, Error> {
        let file = open(&self.path)?;

        serde_json::from_reader(BufReader::new(file)).map_err(|error| {
            Error::InvalidTransactionData(format!("{}: {error}", self.path.display()))
        })
    }

    fn describe(&self) -> String {
        format!("JSON file {}", self.path.display())
    }
}

/// Reads transactions from a CSV file with a header row.
///
/// The header must name the same fields as the JSON records: `id`, `date`,
/// `amount`, `transaction_type`, `account`, `industry`, `state` and `currency`.
#[derive(Debug, Clone)]
pub struct CsvFileSource {
    path: PathBuf,
}

impl CsvFileSource {
    /// Create a source that reads the CSV file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TransactionSource for CsvFileSource {
    fn fetch_transactions(&self) -> Result<Vec<Transaction>, Error> {
        let file = open(&self.path)?;
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(BufReader::new(file));

        reader
            .deserialize()
            .enumerate()
            .map(|(index, record)| {
                record.map_err(|error| {
                    // Line 1 is the header.
                    Error::InvalidTransactionData(format!(
                        "{} line {}: {error}",
                        self.path.display(),
                        index + 2
                    ))
                })
            })
            .collect()
    }

    fn describe(&self) -> String {
        format!("CSV file {}", self.path.display())
    }
}

fn open(path: &Path) -> Result<File, Error> {
    File::open(path).map_err(|error| {
        tracing::error!("could not open {}: {error}", path.display());
        Error::DataSourceError(format!("{}: {error}", path.display()))
    })
}

/// Pick a [TransactionSource] for `path` based on its file extension.
///
/// # Errors
/// Returns [Error::UnsupportedDataSource] if the extension is not `json` or `csv`.
pub fn source_from_path(path: &Path) -> Result<Box<dyn TransactionSource + Send + Sync>, Error> {
    let extension = path
        .extension()
        .and_then(|extension| extension.to_str())
        .map(|extension| extension.to_ascii_lowercase());

    match extension.as_deref() {
        Some("json") => Ok(Box::new(JsonFileSource::new(path))),
        Some("csv") => Ok(Box::new(CsvFileSource::new(path))),
        _ => Err(Error::UnsupportedDataSource(path.display().to_string())),
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, path::PathBuf};

    use time::macros::datetime;

    use crate::{
        Error,
        transaction::{TransactionType, source::source_from_path},
    };

    use super::{CsvFileSource, JsonFileSource, TransactionSource};

    fn write_temp_file(name: &str, contents: &str) -> PathBuf {
        let directory = std::env::temp_dir().join(format!("cashview-source-{}", std::process::id()));
        fs::create_dir_all(&directory).unwrap();
        let path = directory.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn reads_json_array() {
        let path = write_temp_file(
            "transactions.json",
            r#"[
                {"id": 1, "date": 1704067200000, "amount": "10000", "transaction_type": "deposit",
                 "account": "Acme", "industry": "Retail", "state": "NY", "currency": "USD"},
                {"id": 2, "date": "2024-02-01", "amount": 5000, "transaction_type": "withdraw",
                 "account": "Acme", "industry": "Retail", "state": "CA", "currency": "USD"}
            ]"#,
        );

        let transactions = JsonFileSource::new(&path).fetch_transactions().unwrap();

        assert_eq!(transactions.len(), 2);
        assert_eq!(transactions[0].date, datetime!(2024-01-01 00:00 UTC));
        assert_eq!(transactions[1].transaction_type, TransactionType::Withdraw);
        assert_eq!(transactions[1].state, "CA");
    }

    #[test]
    fn reads_csv_with_header() {
        let path = write_temp_file(
            "transactions.csv",
            "id,date,amount,transaction_type,account,industry,state,currency\n\
             1,2024-01-01,10000,deposit,Acme,Retail,NY,USD\n\
             2, 1706745600000 ,5000,withdraw,Globex,Energy,TX,USD\n",
        );

        let transactions = CsvFileSource::new(&path).fetch_transactions().unwrap();

        assert_eq!(transactions.len(), 2);
        assert_eq!(transactions[0].id, "1");
        assert_eq!(transactions[0].amount, 10000);
        assert_eq!(transactions[1].date, datetime!(2024-02-01 00:00 UTC));
        assert_eq!(transactions[1].industry, "Energy");
    }

    #[test]
    fn csv_error_names_the_line() {
        let path = write_temp_file(
            "bad.csv",
            "id,date,amount,transaction_type,account,industry,state,currency\n\
             1,2024-01-01,10000,deposit,Acme,Retail,NY,USD\n\
             2,2024-01-02,-3,withdraw,Acme,Retail,NY,USD\n",
        );

        let error = CsvFileSource::new(&path).fetch_transactions().unwrap_err();

        match error {
            Error::InvalidTransactionData(message) => {
                assert!(message.contains("line 3"), "got {message}")
            }
            other => panic!("want InvalidTransactionData, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_a_data_source_error() {
        let result = JsonFileSource::new("/definitely/not/here.json").fetch_transactions();

        assert!(matches!(result, Err(Error::DataSourceError(_))));
    }

    #[test]
    fn picks_source_by_extension() {
        assert!(source_from_path(&PathBuf::from("data.json")).is_ok());
        assert!(source_from_path(&PathBuf::from("data.CSV")).is_ok());
        assert_eq!(
            source_from_path(&PathBuf::from("data.xlsx")).err(),
            Some(Error::UnsupportedDataSource("data.xlsx".to_owned()))
        );
    }
}
