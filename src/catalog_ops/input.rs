use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::Deserialize;

pub const DEFAULT_CSV_PATH: &str = "products.csv";

/// One line of the input CSV (`productKey,variantKey,imageUrl`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ImageRow {
    #[serde(rename = "productKey")]
    pub product_key: String,
    #[serde(rename = "variantKey")]
    pub variant_key: String,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}

pub fn read_rows_from_path(path: impl AsRef<Path>) -> Result<Vec<ImageRow>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).with_context(|| format!("open {}", path.display()))?;
    read_rows(file).with_context(|| format!("read {}", path.display()))
}

pub fn read_rows<R: Read>(reader: R) -> Result<Vec<ImageRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);
    let mut rows = Vec::new();
    for (idx, record) in rdr.deserialize::<ImageRow>().enumerate() {
        // header is line 1
        let row = record.with_context(|| format!("csv row {}", idx + 2))?;
        rows.push(row);
    }
    Ok(rows)
}

/// Group rows by product key, keeping first-appearance order of products and
/// file order of rows within a product.
pub fn group_by_product(rows: Vec<ImageRow>) -> IndexMap<String, Vec<ImageRow>> {
    let mut grouped: IndexMap<String, Vec<ImageRow>> = IndexMap::new();
    for row in rows {
        grouped.entry(row.product_key.clone()).or_default().push(row);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
productKey,variantKey,imageUrl,note
SHIRT-1,SHIRT-1-A,https://cdn.example.com/shirt.jpg,x
MUG-9,MUG-9-W,https://cdn.example.com/mug.jpg,
SHIRT-1,SHIRT-1-B,https://cdn.example.com/shirt.jpg,
";

    #[test]
    fn parses_rows_and_ignores_extra_columns() {
        let rows = read_rows(SAMPLE.as_bytes()).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows[0],
            ImageRow {
                product_key: "SHIRT-1".into(),
                variant_key: "SHIRT-1-A".into(),
                image_url: "https://cdn.example.com/shirt.jpg".into(),
            }
        );
    }

    #[test]
    fn groups_in_first_seen_order() {
        let grouped = group_by_product(read_rows(SAMPLE.as_bytes()).unwrap());
        let keys: Vec<&str> = grouped.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["SHIRT-1", "MUG-9"]);
        let skus: Vec<&str> = grouped["SHIRT-1"]
            .iter()
            .map(|r| r.variant_key.as_str())
            .collect();
        assert_eq!(skus, vec!["SHIRT-1-A", "SHIRT-1-B"]);
    }

    #[test]
    fn missing_column_is_an_error() {
        let err = read_rows("productKey,imageUrl\nSHIRT-1,u\n".as_bytes()).unwrap_err();
        assert!(format!("{err:#}").contains("csv row 2"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_rows_from_path(dir.path().join("products.csv")).unwrap_err();
        assert!(err.to_string().starts_with("open "));
    }
}
