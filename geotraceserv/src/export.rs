// CSV rendering for the admin export
use crate::db::Submission;

/// Header written when there is nothing to export
pub const EMPTY_EXPORT_HEADER: [&str; 2] = ["id", "created_at"];

/// Render rows as CSV with a header row. Null cells are left empty.
pub fn render_csv(rows: &[Submission]) -> Result<String, Box<dyn std::error::Error>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    if rows.is_empty() {
        writer.write_record(EMPTY_EXPORT_HEADER)?;
    }
    for row in rows {
        writer.serialize(row)?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}
