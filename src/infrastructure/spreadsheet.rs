//! Tabular input and output
//!
//! Varieties are read from a CSV file with a `Variety` column. Results are
//! written as `Variety, Auction Site, Listing` and can be read back.

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::io::{Read, Write};
use std::path::Path;
use tracing::{debug, info};

use crate::domain::{ExportError, InputValidationError, Listing, ResultRow, ResultTable, Variety};

/// Column that must be present in the input table
pub const VARIETY_COLUMN: &str = "Variety";

/// Read the usable varieties from a CSV file.
///
/// Fails before anything else happens when the file cannot be read or has no
/// `Variety` column. Empty and whitespace-only cells are skipped.
pub fn read_varieties(path: &Path) -> Result<Vec<Variety>, InputValidationError> {
    let file = std::fs::File::open(path).map_err(|e| InputValidationError::unreadable(path, e))?;
    let varieties = read_varieties_from(file).map_err(|e| match e {
        InputValidationError::Unreadable { reason, .. } => InputValidationError::unreadable(path, reason),
        other => other,
    })?;
    info!("Loaded {} varieties from {:?}", varieties.len(), path);
    Ok(varieties)
}

pub fn read_varieties_from<R: Read>(reader: R) -> Result<Vec<Variety>, InputValidationError> {
    let mut csv_reader = ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| InputValidationError::unreadable("<input>", e))?
        .clone();
    let column = headers
        .iter()
        .position(|header| header.trim_start_matches('\u{feff}') == VARIETY_COLUMN)
        .ok_or_else(|| {
            InputValidationError::missing_column(VARIETY_COLUMN, headers.iter().map(str::to_string).collect())
        })?;

    let mut varieties = Vec::new();
    let mut skipped = 0usize;
    for record in csv_reader.records() {
        let record = record.map_err(|e| InputValidationError::unreadable("<input>", e))?;
        match record.get(column).and_then(Variety::parse) {
            Some(variety) => varieties.push(variety),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!("Skipped {} rows with an empty '{}' cell", skipped, VARIETY_COLUMN);
    }
    Ok(varieties)
}

/// Write the result table to a CSV file
pub fn write_results(path: &Path, table: &ResultTable) -> Result<(), ExportError> {
    let file = std::fs::File::create(path).map_err(|e| ExportError::write(path, e))?;
    write_results_to(file, table).map_err(|e| match e {
        ExportError::Encode(reason) => ExportError::write(path, reason),
        other => other,
    })?;
    info!("📥 Wrote {} rows to {:?}", table.len(), path);
    Ok(())
}

pub fn write_results_to<W: Write>(writer: W, table: &ResultTable) -> Result<(), ExportError> {
    let mut csv_writer = WriterBuilder::new().from_writer(writer);
    csv_writer
        .write_record(ResultTable::COLUMNS)
        .map_err(|e| ExportError::Encode(e.to_string()))?;
    for row in table.rows() {
        csv_writer
            .write_record(row.to_record())
            .map_err(|e| ExportError::Encode(e.to_string()))?;
    }
    csv_writer.flush().map_err(|e| ExportError::Encode(e.to_string()))
}

/// Read a previously exported result table
pub fn read_results(path: &Path) -> Result<ResultTable, InputValidationError> {
    let file = std::fs::File::open(path).map_err(|e| InputValidationError::unreadable(path, e))?;
    read_results_from(file)
}

/// Short rows are reported as [`InputValidationError::MalformedRow`].
pub fn read_results_from<R: Read>(reader: R) -> Result<ResultTable, InputValidationError> {
    let mut csv_reader = ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| InputValidationError::unreadable("<results>", e))?
        .clone();
    for (position, expected) in ResultTable::COLUMNS.iter().enumerate() {
        if headers.get(position) != Some(*expected) {
            return Err(InputValidationError::missing_column(
                expected,
                headers.iter().map(str::to_string).collect(),
            ));
        }
    }

    let mut rows = Vec::new();
    for (line, record) in csv_reader.records().enumerate() {
        let record = record.map_err(|e| InputValidationError::unreadable("<results>", e))?;
        rows.push(parse_result_record(&record, line as u64 + 2)?);
    }
    Ok(ResultTable::from_rows(rows))
}

fn parse_result_record(record: &StringRecord, row: u64) -> Result<ResultRow, InputValidationError> {
    let malformed = |reason: &str| InputValidationError::MalformedRow {
        row,
        reason: reason.to_string(),
    };

    let variety = record
        .get(0)
        .and_then(Variety::parse)
        .ok_or_else(|| malformed("empty variety"))?;
    let site = record.get(1).ok_or_else(|| malformed("missing auction site"))?.parse()?;
    let listing = record.get(2).ok_or_else(|| malformed("missing listing"))?;

    Ok(ResultRow {
        variety,
        site,
        listing: Listing::from_rendered(listing),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Site;

    #[test]
    fn test_reads_variety_column_and_skips_blanks() {
        let input = "Denomination,Variety,Notes\nCent,1909-S VDB,key\nCent,,\nCent,   ,x\nCent,1955 DDO,\n";
        let varieties = read_varieties_from(input.as_bytes()).unwrap();
        let names: Vec<&str> = varieties.iter().map(Variety::as_str).collect();
        assert_eq!(names, vec!["1909-S VDB", "1955 DDO"]);
    }

    #[test]
    fn test_short_rows_count_as_blank() {
        let input = "Notes,Variety\nonly notes\nx,1916-D\n";
        let varieties = read_varieties_from(input.as_bytes()).unwrap();
        assert_eq!(varieties.len(), 1);
    }

    #[test]
    fn test_missing_variety_column() {
        let err = read_varieties_from("Name,Year\nLincoln,1909\n".as_bytes()).unwrap_err();
        match err {
            InputValidationError::MissingColumn { column, found } => {
                assert_eq!(column, "Variety");
                assert_eq!(found, vec!["Name".to_string(), "Year".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_column_name_must_match_exactly() {
        assert!(read_varieties_from("variety\n1909-S VDB\n".as_bytes()).is_err());
    }

    #[test]
    fn test_byte_order_mark_is_tolerated() {
        let input = "\u{feff}Variety\n1909-S VDB\n";
        assert_eq!(read_varieties_from(input.as_bytes()).unwrap().len(), 1);
    }

    #[test]
    fn test_written_header_and_rows() {
        let variety = Variety::parse("2021-D").unwrap();
        let table = ResultTable::from_rows(vec![
            ResultRow::title(variety.clone(), Site::Ebay, "2021 D Lincoln Cent, BU"),
            ResultRow {
                variety,
                site: Site::HeritageAuctions,
                listing: Listing::Error("timeout".into()),
            },
        ]);

        let mut buffer = Vec::new();
        write_results_to(&mut buffer, &table).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(
            text,
            "Variety,Auction Site,Listing\n2021-D,eBay,\"2021 D Lincoln Cent, BU\"\n2021-D,Heritage Auctions,Error: timeout\n"
        );
    }

    #[test]
    fn test_reading_results_rejects_wrong_header() {
        let err = read_results_from("Variety,Site,Listing\n".as_bytes()).unwrap_err();
        assert!(matches!(err, InputValidationError::MissingColumn { .. }));
    }

    #[test]
    fn test_reading_results_reports_short_rows() {
        let err = read_results_from("Variety,Auction Site,Listing\n2021-D,eBay,ok\n2021-D,eBay\n".as_bytes()).unwrap_err();
        match err {
            InputValidationError::MalformedRow { row, reason } => {
                assert_eq!(row, 3);
                assert_eq!(reason, "missing listing");
            }
            other => panic!("unexpected error: {other}"),
        }

        let err = read_results_from("Variety,Auction Site,Listing\n2021-D\n".as_bytes()).unwrap_err();
        assert!(matches!(err, InputValidationError::MalformedRow { row: 2, .. }));
    }

    #[test]
    fn test_reading_results_rejects_unknown_site() {
        let err = read_results_from("Variety,Auction Site,Listing\n2021-D,Coinbase,x\n".as_bytes()).unwrap_err();
        assert!(matches!(err, InputValidationError::UnknownSite(_)));
    }
}
