//! Application use cases.
//!
//! The foreground (navigation, decisions) is strictly serialized by the
//! mutable borrow of the store. Export is the one background task: it runs
//! on its own thread over a cloned snapshot, reports advisory progress
//! through a channel, and is guarded so two exports never interleave.

#![forbid(unsafe_code)]

mod export_task;

use camino::{Utf8Path, Utf8PathBuf};

pub use export_task::{ExportLauncher, ExportTask};

/// Default report destination: the result path with a `.csv` extension.
pub fn default_csv_destination(result_path: &Utf8Path) -> Utf8PathBuf {
    let mut destination = result_path.to_owned();
    destination.set_extension("csv");
    destination
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_destination_swaps_the_extension() {
        assert_eq!(
            default_csv_destination(Utf8Path::new("scans/result.json")),
            Utf8PathBuf::from("scans/result.csv")
        );
        assert_eq!(
            default_csv_destination(Utf8Path::new("plain")),
            Utf8PathBuf::from("plain.csv")
        );
    }
}
