// ListingDesk - core/export.rs
//
// Export of the full (unfiltered) working set in the current sort order,
// restricted to a column spec. Writers take any `Write` so callers decide
// where the bytes go.

use crate::core::model::{Field, Listing};
use crate::core::sort::{sort_indices, SortState};
use crate::util::constants::EXPORT_FILE_PREFIX;
use crate::util::error::ExportError;
use chrono::{DateTime, Local};
use std::io::Write;
use std::path::Path;

/// Which columns go out, in which order, and under which sort.
#[derive(Debug, Clone)]
pub struct ExportSpec {
    pub columns: Vec<Field>,
    pub sort: SortState,
    /// Append a column listing autofilled fields for review.
    pub include_autofill: bool,
}

impl Default for ExportSpec {
    fn default() -> Self {
        Self {
            columns: Field::all().to_vec(),
            sort: SortState::unsorted(),
            include_autofill: false,
        }
    }
}

/// Header label of the optional autofill review column.
pub const AUTOFILL_COLUMN: &str = "AUTOFILLED";

/// Shape the working set into header + rows of cell text.
pub fn export_rows(listings: &[Listing], spec: &ExportSpec) -> (Vec<String>, Vec<Vec<String>>) {
    let mut header: Vec<String> = spec.columns.iter().map(|f| f.label().to_string()).collect();
    if spec.include_autofill {
        header.push(AUTOFILL_COLUMN.to_string());
    }

    let mut order: Vec<usize> = (0..listings.len()).collect();
    sort_indices(listings, &mut order, &spec.sort);

    let rows = order
        .into_iter()
        .map(|idx| {
            let listing = &listings[idx];
            let mut row: Vec<String> = spec
                .columns
                .iter()
                .map(|&field| listing.field_text(field))
                .collect();
            if spec.include_autofill {
                let fields: Vec<&str> = listing.auto_filled.iter().map(|a| a.field.label()).collect();
                row.push(fields.join("; "));
            }
            row
        })
        .collect();

    (header, rows)
}

/// Export to CSV. Returns the number of data rows written.
pub fn export_csv<W: Write>(
    listings: &[Listing],
    spec: &ExportSpec,
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let csv_err = |e: csv::Error| ExportError::Csv {
        path: export_path.to_path_buf(),
        source: e,
    };

    let (header, rows) = export_rows(listings, spec);
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(&header).map_err(csv_err)?;

    let mut count = 0;
    for row in &rows {
        csv_writer.write_record(row).map_err(csv_err)?;
        count += 1;
    }

    csv_writer.flush().map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })?;

    tracing::info!(rows = count, path = %export_path.display(), "Exported listings to CSV");
    Ok(count)
}

/// Export to JSON (array of objects keyed by column label).
pub fn export_json<W: Write>(
    listings: &[Listing],
    spec: &ExportSpec,
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let (header, rows) = export_rows(listings, spec);
    let objects: Vec<serde_json::Map<String, serde_json::Value>> = rows
        .into_iter()
        .map(|row| {
            header
                .iter()
                .cloned()
                .zip(row.into_iter().map(serde_json::Value::String))
                .collect()
        })
        .collect();

    serde_json::to_writer_pretty(writer, &objects).map_err(|e| ExportError::Json {
        path: export_path.to_path_buf(),
        source: e,
    })?;
    Ok(objects.len())
}

/// `listings_YYYYMMDD_HHMMSS.csv` for the given moment.
pub fn default_export_file_name(now: DateTime<Local>) -> String {
    format!("{EXPORT_FILE_PREFIX}_{}.csv", now.format("%Y%m%d_%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::import::{normalise_batch, read_csv, ImportDefaults};
    use crate::core::model::{Condition, Shipping};
    use crate::core::sort::SortDirection;
    use chrono::TimeZone;

    fn make_listing(id: u64, title: &str, price: f64) -> Listing {
        Listing {
            id,
            title: title.to_string(),
            price,
            condition: Some(Condition::UsedLikeNew),
            description: "Line one, with comma\nline two".to_string(),
            category: "Home".to_string(),
            offer_shipping: Shipping::Yes,
            auto_filled: Vec::new(),
        }
    }

    fn path() -> std::path::PathBuf {
        std::path::PathBuf::from("out.csv")
    }

    #[test]
    fn test_rows_follow_sort_and_columns() {
        let listings = vec![make_listing(1, "B", 2.0), make_listing(2, "A", 1.0)];
        let spec = ExportSpec {
            columns: vec![Field::Price, Field::Title],
            sort: SortState::by(Field::Title, SortDirection::Asc),
            include_autofill: false,
        };
        let (header, rows) = export_rows(&listings, &spec);
        assert_eq!(header, ["PRICE", "TITLE"]);
        assert_eq!(rows, vec![vec!["1", "A"], vec!["2", "B"]]);
    }

    #[test]
    fn test_csv_round_trip_reproduces_field_values() {
        let listings = vec![
            make_listing(1, "Lamp \"vintage\"", 10.49),
            make_listing(2, "Desk", 120.0),
            make_listing(3, "Shelf", 0.01),
        ];
        let mut buf = Vec::new();
        let count = export_csv(&listings, &ExportSpec::default(), &mut buf, &path()).unwrap();
        assert_eq!(count, 3);

        let raw = read_csv(buf.as_slice()).unwrap();
        let batch = normalise_batch(raw, &ImportDefaults::default());
        assert!(batch.rejected.is_empty());
        for (original, reimported) in listings.iter().zip(&batch.listings) {
            let mut reimported = reimported.clone();
            reimported.id = original.id;
            assert_eq!(&reimported, original);
        }
    }

    #[test]
    fn test_csv_round_trip_keeps_blank_fields_blank() {
        let mut partial = make_listing(1, "Lamp", 0.0);
        partial.category = String::new();
        partial.condition = None;
        partial.description = String::new();
        partial.offer_shipping = Shipping::No;
        let listings = vec![partial];

        let mut buf = Vec::new();
        export_csv(&listings, &ExportSpec::default(), &mut buf, &path()).unwrap();
        let batch = normalise_batch(read_csv(buf.as_slice()).unwrap(), &ImportDefaults::default());

        assert_eq!(batch.listings.len(), 1);
        let mut reimported = batch.listings[0].clone();
        reimported.id = 1;
        assert_eq!(reimported, listings[0]);
        assert!(reimported.auto_filled.is_empty());
    }

    #[test]
    fn test_csv_round_trip_rejects_untitled_rows() {
        let listings = vec![make_listing(1, "", 5.0), make_listing(2, "Desk", 5.0)];
        let mut buf = Vec::new();
        export_csv(&listings, &ExportSpec::default(), &mut buf, &path()).unwrap();
        let batch = normalise_batch(read_csv(buf.as_slice()).unwrap(), &ImportDefaults::default());
        assert_eq!(batch.listings.len(), 1);
        assert_eq!(batch.rejected[0].batch_index, 0);
    }

    #[test]
    fn test_autofill_review_column() {
        let mut l = make_listing(1, "Lamp", 3.0);
        l.auto_filled.push(crate::core::model::AutoFill {
            field: Field::Category,
            reason: "missing".to_string(),
        });
        let spec = ExportSpec {
            include_autofill: true,
            ..Default::default()
        };
        let (header, rows) = export_rows(&[l], &spec);
        assert_eq!(header.last().map(String::as_str), Some(AUTOFILL_COLUMN));
        assert_eq!(rows[0].last().map(String::as_str), Some("CATEGORY"));
    }

    #[test]
    fn test_json_export() {
        let listings = vec![make_listing(1, "Test item", 5.0)];
        let mut buf = Vec::new();
        let count = export_json(&listings, &ExportSpec::default(), &mut buf, &path()).unwrap();
        assert_eq!(count, 1);
        let output = String::from_utf8(buf).unwrap();
        assert!(output.contains("\"TITLE\": \"Test item\""));
    }

    #[test]
    fn test_default_file_name() {
        let moment = Local.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap();
        assert_eq!(default_export_file_name(moment), "listings_20260304_050607.csv");
    }
}
