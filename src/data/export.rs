use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use alloy::primitives::B256;
use printpdf::{BuiltinFont, Mm, PdfDocument};

use crate::data::report::{ActivityReport, TxRecord};
use crate::data::types::ResolutionResult;
use crate::error::ExportError;

/// A4 in PostScript points.
const PAGE_WIDTH_PT: f32 = 595.2756;
const PAGE_HEIGHT_PT: f32 = 841.8898;
const MARGIN_PT: f32 = 40.0;
const FONT_SIZE_PT: f32 = 10.0;
const LEADING_PT: f32 = 14.0;
const WRAP_COLUMNS: usize = 100;
const PAGE_BREAK_PT: f32 = 80.0;

/// One line of text placed at a baseline `y` (points from the page bottom).
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    pub y: f32,
}

fn pt_to_mm(pt: f32) -> Mm {
    Mm(pt * 25.4 / 72.0)
}

/// `tx_<first ten characters of the hash>.pdf`
pub fn default_pdf_name(hash: &B256) -> String {
    let hash = format!("{hash:#x}");
    format!("tx_{}.pdf", &hash[..10])
}

/// Lay the record out as wrapped `key: value` lines, a blank line after each
/// field. A page is closed once the cursor drops below the break line after
/// a field.
pub fn layout_pages(record: &TxRecord) -> Vec<Vec<PlacedLine>> {
    let top = PAGE_HEIGHT_PT - MARGIN_PT;
    let mut pages = Vec::new();
    let mut page = Vec::new();
    let mut y = top;

    for line in record.lines() {
        let wrapped = textwrap::wrap(&line, WRAP_COLUMNS);
        let wrapped: Vec<String> = if wrapped.is_empty() {
            vec![line.clone()]
        } else {
            wrapped.into_iter().map(|w| w.into_owned()).collect()
        };
        for text in wrapped {
            page.push(PlacedLine { text, y });
            y -= LEADING_PT;
        }
        // blank separator line
        y -= LEADING_PT;

        if y < PAGE_BREAK_PT {
            pages.push(std::mem::take(&mut page));
            y = top;
        }
    }
    if !page.is_empty() || pages.is_empty() {
        pages.push(page);
    }
    pages
}

/// Render the record as a plain monospaced A4 document.
pub fn render_tx_pdf(record: &TxRecord, title: &str) -> Result<Vec<u8>, ExportError> {
    let pages = layout_pages(record);
    let (doc, first_page, first_layer) = PdfDocument::new(
        title,
        pt_to_mm(PAGE_WIDTH_PT),
        pt_to_mm(PAGE_HEIGHT_PT),
        "Layer 1",
    );
    let font = doc
        .add_builtin_font(BuiltinFont::Courier)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;

    for (i, lines) in pages.iter().enumerate() {
        let (page, layer) = if i == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(
                pt_to_mm(PAGE_WIDTH_PT),
                pt_to_mm(PAGE_HEIGHT_PT),
                format!("Layer {}", i + 1),
            )
        };
        let layer = doc.get_page(page).get_layer(layer);
        for line in lines {
            if line.text.is_empty() {
                continue;
            }
            layer.use_text(
                line.text.clone(),
                FONT_SIZE_PT,
                pt_to_mm(MARGIN_PT),
                pt_to_mm(line.y),
                &font,
            );
        }
    }

    let mut bytes = Vec::new();
    doc.save(&mut BufWriter::new(&mut bytes))
        .map_err(|e| ExportError::Pdf(e.to_string()))?;
    Ok(bytes)
}

/// Write the single-transaction PDF to `path`.
pub fn export_tx_pdf(record: &TxRecord, path: &Path) -> Result<String, ExportError> {
    let title = record.get("Hash").unwrap_or("transaction");
    let bytes = render_tx_pdf(record, title)?;
    fs::write(path, bytes)?;
    Ok(format!("Exported transaction PDF to {}", path.display()))
}

/// Write one CSV row per transaction of an activity result.
///
/// Columns: block, timestamp, hash, from, to, value_wei, gas_limit,
/// gas_price_wei, category, origin, explorer_url
pub fn write_activity_csv<W: Write>(result: &ResolutionResult, writer: W) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record([
        "block",
        "timestamp",
        "hash",
        "from",
        "to",
        "value_wei",
        "gas_limit",
        "gas_price_wei",
        "category",
        "origin",
        "explorer_url",
    ])?;

    for tx in &result.transactions {
        wtr.write_record(&[
            tx.block_number.map(|n| n.to_string()).unwrap_or_default(),
            tx.block_timestamp.map(|t| t.to_string()).unwrap_or_default(),
            format!("{:#x}", tx.hash),
            tx.from.map(|a| format!("{a:#x}")).unwrap_or_default(),
            tx.to.map(|a| format!("{a:#x}")).unwrap_or_default(),
            tx.value.to_string(),
            tx.gas_limit.to_string(),
            tx.gas_price.map(|p| p.to_string()).unwrap_or_default(),
            tx.annotation(),
            tx.origin.to_string(),
            tx.explorer_url.clone().unwrap_or_default(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn export_activity_csv(result: &ResolutionResult, path: &Path) -> Result<String, ExportError> {
    let file = fs::File::create(path)?;
    write_activity_csv(result, file)?;
    Ok(format!(
        "Exported {} transactions to {}",
        result.transactions.len(),
        path.display()
    ))
}

/// Write the chart payload and totals as pretty JSON.
pub fn export_activity_json(report: &ActivityReport, path: &Path) -> Result<String, ExportError> {
    let formatted = serde_json::to_string_pretty(report)?;
    let mut file = fs::File::create(path)?;
    file.write_all(formatted.as_bytes())?;
    Ok(format!("Exported activity chart to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use alloy::primitives::{Address, U256};

    use super::*;
    use crate::data::types::{SourceOfTruth, TransactionDetail, TxStatus, fixtures};

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("tx-tracker-test-{}-{name}", std::process::id()))
    }

    fn record() -> TxRecord {
        let mut tx = fixtures::tx(0xaa, Some(Address::repeat_byte(1)), Some(Address::repeat_byte(2)), 7);
        tx.value = U256::from(1_000_000_000_000_000_000u64);
        TxRecord::from_detail(&TransactionDetail {
            tx,
            chain_name: "TestChain".into(),
            status: TxStatus::Success,
            from_label: None,
            to_label: None,
        })
    }

    fn activity() -> ResolutionResult {
        let wallet = Address::repeat_byte(1);
        let chain = fixtures::chain("TestChain");
        let txs = vec![
            fixtures::tx(0x01, Some(wallet), Some(Address::repeat_byte(2)), 9).with_explorer_links(&chain),
            fixtures::tx(0x02, Some(wallet), None, 8),
        ];
        ResolutionResult {
            seed_hash: B256::repeat_byte(0xaa),
            wallet,
            chain_name: "TestChain".into(),
            transactions: txs,
            total_value: U256::ZERO,
            source_of_truth: SourceOfTruth::NodeScan,
            blocks_scanned: 3,
        }
    }

    #[test]
    fn test_default_pdf_name() {
        assert_eq!(default_pdf_name(&B256::repeat_byte(0xab)), "tx_0xabababab.pdf");
    }

    #[test]
    fn test_layout_single_page() {
        let pages = layout_pages(&record());
        assert_eq!(pages.len(), 1);
        let lines = &pages[0];
        assert_eq!(lines.len(), 10);
        assert!(lines[0].text.starts_with("Hash: 0xaaaa"));
        assert_eq!(lines[0].y, PAGE_HEIGHT_PT - MARGIN_PT);
        // Each field is followed by a blank line.
        assert!((lines[0].y - lines[1].y - 2.0 * LEADING_PT).abs() < 1e-3);
    }

    #[test]
    fn test_layout_wraps_long_values() {
        let record = TxRecord {
            fields: vec![("Note", "word ".repeat(60))],
        };
        let pages = layout_pages(&record);
        assert_eq!(pages.len(), 1);
        assert!(pages[0].len() > 1);
        assert!(pages[0].iter().all(|l| l.text.chars().count() <= WRAP_COLUMNS));
    }

    #[test]
    fn test_layout_paginates() {
        let fields = (0..40).map(|_| ("Field", "value".to_string())).collect();
        let pages = layout_pages(&TxRecord { fields });
        assert!(pages.len() > 1);
        for page in &pages {
            assert!(page.iter().all(|l| l.y >= PAGE_BREAK_PT - 2.0 * LEADING_PT));
        }
        assert_eq!(pages.iter().map(Vec::len).sum::<usize>(), 40);
    }

    #[test]
    fn test_render_tx_pdf() {
        let bytes = render_tx_pdf(&record(), "test").unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_export_tx_pdf_writes_file() {
        let path = temp_path("tx.pdf");
        let message = export_tx_pdf(&record(), &path).unwrap();
        assert!(message.contains("tx.pdf"));
        assert!(fs::read(&path).unwrap().starts_with(b"%PDF"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_write_activity_csv() {
        let mut out = Vec::new();
        write_activity_csv(&activity(), &mut out).unwrap();
        let contents = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("block,timestamp,hash"));
        assert!(lines[1].starts_with("9,,0x0101"));
        assert!(lines[1].contains("https://explorer.test/tx/0x0101"));
        assert!(lines[2].contains("Unknown"));
    }

    #[test]
    fn test_export_activity_json() {
        let path = temp_path("chart.json");
        let report = ActivityReport::from_result(&activity());
        export_activity_json(&report, &path).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["tx_count"], 2);
        assert_eq!(json["chart"]["gas"][0], 21_000);
        let _ = fs::remove_file(path);
    }
}
