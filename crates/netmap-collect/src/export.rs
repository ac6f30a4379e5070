//! Flat tab-separated device listing.

use crate::model::{DeviceRecord, UnifiDeviceSummary};
use crate::Result;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// File name of the listing inside the output directory.
pub const TSV_FILE_NAME: &str = "devices.tsv";

/// Column header.
pub const TSV_HEADER: [&str; 6] = ["name", "model", "type", "state", "lat", "lon"];

fn cell(value: &str) -> String {
    value.replace(['\t', '\n', '\r'], " ")
}

fn opt_cell(value: Option<&str>) -> String {
    value.map(cell).unwrap_or_default()
}

/// Write the header and one row per device: UISP devices with coordinates,
/// then UniFi devices with empty coordinate cells.
pub fn write_tsv<W: Write>(
    mut writer: W,
    uisp: &[DeviceRecord],
    unifi: &[UnifiDeviceSummary],
) -> std::io::Result<()> {
    writeln!(writer, "{}", TSV_HEADER.join("\t"))?;
    for device in uisp {
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}\t{}",
            cell(&device.name),
            opt_cell(device.model.as_deref()),
            opt_cell(device.kind.as_deref()),
            opt_cell(device.state.as_deref()),
            device.latitude,
            device.longitude
        )?;
    }
    for device in unifi {
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t\t",
            opt_cell(device.name.as_deref()),
            opt_cell(device.model.as_deref()),
            opt_cell(device.kind.as_deref()),
            device.state.map(|s| s.to_string()).unwrap_or_default()
        )?;
    }
    writer.flush()
}

/// Write `<output_dir>/devices.tsv` and return the path.
pub fn write_tsv_file(
    output_dir: &Path,
    uisp: &[DeviceRecord],
    unifi: &[UnifiDeviceSummary],
) -> Result<PathBuf> {
    let path = output_dir.join(TSV_FILE_NAME);
    write_tsv(BufWriter::new(File::create(&path)?), uisp, unifi)?;
    info!(path = %path.display(), rows = uisp.len() + unifi.len(), "Wrote device listing");
    Ok(path)
}
