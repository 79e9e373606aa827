//! Folder scanning
//!
//! Drives the core: list each configured folder, read and decode every file
//! in it, fingerprint the pixels and record the fingerprint in a
//! [`DuplicateIndex`]. Files that cannot be opened or decoded are logged and
//! skipped; they never reach the index.
//!
//! Folders are processed in configuration order and files in name order, so
//! "which file is the original" is stable between runs over the same tree.
//!
//! # Example
//!
//! ```rust,no_run
//! use image_dupe::core::config::ScanConfig;
//! use image_dupe::core::scanner::Scanner;
//! use image_dupe::duplicate::EntropySource;
//! use std::sync::atomic::AtomicBool;
//!
//! let config = ScanConfig::new().with_folder("D:/Photos").with_folder("E:/Backup");
//! let mut entropy = EntropySource::from_entropy();
//! let shutdown = AtomicBool::new(false);
//!
//! let report = Scanner::new(config).run(&mut entropy, &shutdown, |_| {}).unwrap();
//! for pair in &report.duplicates {
//!     println!("{} & {}", pair.original.display(), pair.duplicate.display());
//! }
//! ```

use crate::core::config::{ListErrorPolicy, ScanConfig};
use crate::core::error::{DupeError, Result};
use crate::duplicate::{
    fingerprint_image, DuplicateIndex, EntropySource, Fingerprint, Identifier, IndexStats,
    RecordOutcome,
};
use image::error::{ImageFormatHint, UnsupportedError, UnsupportedErrorKind};
use image::{DynamicImage, ImageError, ImageFormat};
use log::{debug, error, info, trace, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use walkdir::WalkDir;

/// Decoders tried in order; the first that accepts the bytes wins
const DECODERS: [ImageFormat; 3] = [ImageFormat::Png, ImageFormat::Jpeg, ImageFormat::Bmp];

/// List the files directly inside `dir`, sorted by file name.
///
/// Subdirectories are skipped without being reported.
pub fn list_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    let list_failed = |source: io::Error| DupeError::ListFailed {
        path: dir.to_path_buf(),
        source,
    };

    let metadata = fs::metadata(dir).map_err(list_failed)?;
    if !metadata.is_dir() {
        return Err(list_failed(io::Error::new(
            io::ErrorKind::Other,
            "not a directory",
        )));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| list_failed(io::Error::from(e)))?;
        if entry.file_type().is_dir() {
            trace!("Skipping subfolder {}", entry.path().display());
            continue;
        }
        files.push(entry.into_path());
    }

    Ok(files)
}

/// Decode image bytes, trying PNG, then JPEG, then BMP.
///
/// Every decoder sees the full buffer. If none accepts it, the error from
/// the last decoder is returned.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage> {
    let mut last_err = None;

    for format in DECODERS {
        match image::load_from_memory_with_format(bytes, format) {
            Ok(image) => {
                trace!("Decoded as {:?}", format);
                return Ok(image);
            }
            Err(e) => last_err = Some(e),
        }
    }

    let source = last_err.unwrap_or_else(|| {
        ImageError::Unsupported(UnsupportedError::from_format_and_kind(
            ImageFormatHint::Unknown,
            UnsupportedErrorKind::Format(ImageFormatHint::Unknown),
        ))
    });

    Err(DupeError::DecodeFailed {
        path: PathBuf::new(),
        source,
    })
}

/// Read, decode and fingerprint one file
pub fn fingerprint_file(path: &Path) -> Result<Fingerprint> {
    let bytes = fs::read(path).map_err(|source| DupeError::OpenFailed {
        path: path.to_path_buf(),
        source,
    })?;

    let image = decode(&bytes).map_err(|e| e.with_path(path))?;
    Ok(fingerprint_image(&image))
}

/// Fingerprint `files` on the rayon pool, keeping listing order.
///
/// `None` marks files skipped because shutdown was requested.
fn fingerprint_batch(
    files: &[PathBuf],
    shutdown: &AtomicBool,
) -> Vec<Option<Result<Fingerprint>>> {
    files
        .par_iter()
        .map(|path| {
            if shutdown.load(Ordering::Relaxed) {
                None
            } else {
                info!("checking {}", path.display());
                Some(fingerprint_file(path))
            }
        })
        .collect()
}

/// A file found to have the same pixels as an earlier one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicatePair {
    /// The first file seen with this fingerprint
    pub original: PathBuf,
    /// The file just checked
    pub duplicate: PathBuf,
    pub fingerprint: Fingerprint,
}

/// A folder that could not be listed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderFailure {
    pub folder: PathBuf,
    pub error: String,
}

/// Summary of one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    /// Random identifier for this run, for matching logs to reports
    pub run_id: Identifier,
    /// Folders that were listed successfully
    pub folders_scanned: usize,
    /// Folders that could not be listed
    pub failed_folders: Vec<FolderFailure>,
    /// Files taken from a listing, whether or not they decoded
    pub files_checked: usize,
    /// Files that could not be read
    pub open_failures: usize,
    /// Files that matched no known image format
    pub decode_failures: usize,
    /// Number of distinct images seen
    pub unique_images: usize,
    /// Counters from the duplicate index; only decoded files are recorded
    pub index: IndexStats,
    /// Duplicates in the order they were found
    pub duplicates: Vec<DuplicatePair>,
    /// True if the run stopped early on request
    pub interrupted: bool,
    /// Time taken (in milliseconds)
    pub elapsed_ms: u64,
}

impl ScanReport {
    fn new(run_id: Identifier) -> Self {
        Self {
            run_id,
            folders_scanned: 0,
            failed_folders: Vec::new(),
            files_checked: 0,
            open_failures: 0,
            decode_failures: 0,
            unique_images: 0,
            index: IndexStats::default(),
            duplicates: Vec::new(),
            interrupted: false,
            elapsed_ms: 0,
        }
    }
}

/// Progress information passed to the callback after each file
#[derive(Debug, Clone)]
pub struct ScanProgress {
    /// Index of the folder being scanned
    pub folder: usize,
    /// Number of configured folders
    pub folders_total: usize,
    /// Files checked so far, across all folders
    pub files_checked: usize,
    /// Duplicates found so far
    pub duplicates: usize,
    /// File just checked
    pub current_file: PathBuf,
}

/// Runs one scan over the configured folders
pub struct Scanner {
    config: ScanConfig,
    index: DuplicateIndex,
}

impl Scanner {
    pub fn new(config: ScanConfig) -> Self {
        Self {
            config,
            index: DuplicateIndex::new(),
        }
    }

    /// Scan every folder and return the report.
    ///
    /// The index lives only for the duration of this call. `shutdown` is
    /// checked between files; once set, the run stops and the partial
    /// report is returned with `interrupted` set.
    pub fn run<F>(
        mut self,
        entropy: &mut EntropySource,
        shutdown: &AtomicBool,
        mut progress: F,
    ) -> Result<ScanReport>
    where
        F: FnMut(&ScanProgress),
    {
        let start_time = Instant::now();
        let mut report = ScanReport::new(Identifier::random(entropy));
        let folders = self.config.folders.clone();

        info!(
            "Run {}: scanning {} folder(s)",
            report.run_id,
            folders.len()
        );

        for (folder_idx, folder) in folders.iter().enumerate() {
            if shutdown.load(Ordering::SeqCst) {
                report.interrupted = true;
                break;
            }

            let files = match list_dir(folder) {
                Ok(files) => files,
                Err(e) => match self.config.list_error_policy() {
                    ListErrorPolicy::Abort => return Err(e),
                    ListErrorPolicy::Skip => {
                        error!("{}", e);
                        report.failed_folders.push(FolderFailure {
                            folder: folder.clone(),
                            error: e.to_string(),
                        });
                        continue;
                    }
                },
            };

            report.folders_scanned += 1;
            debug!("Found {} file(s) in {}", files.len(), folder.display());

            // Record one result and report progress for it
            let mut record = |scanner: &mut Self,
                              path: PathBuf,
                              result: Result<Fingerprint>,
                              report: &mut ScanReport| {
                scanner.handle_file(path.clone(), result, report);
                progress(&ScanProgress {
                    folder: folder_idx,
                    folders_total: folders.len(),
                    files_checked: report.files_checked,
                    duplicates: report.duplicates.len(),
                    current_file: path,
                });
            };

            if self.config.parallel {
                let results = fingerprint_batch(&files, shutdown);
                for (path, result) in files.into_iter().zip(results) {
                    let Some(result) = result else {
                        report.interrupted = true;
                        break;
                    };
                    record(&mut self, path, result, &mut report);
                }
            } else {
                for path in files {
                    if shutdown.load(Ordering::SeqCst) {
                        report.interrupted = true;
                        break;
                    }
                    info!("checking {}", path.display());
                    let result = fingerprint_file(&path);
                    record(&mut self, path, result, &mut report);
                }
            }

            if report.interrupted {
                break;
            }
        }

        if report.interrupted {
            warn!("Scan interrupted, report is partial");
        }

        report.index = *self.index.stats();
        report.unique_images = report.index.unique;
        report.elapsed_ms = start_time.elapsed().as_millis() as u64;

        info!(
            "Checked {} file(s): {} unique, {} duplicate(s)",
            report.files_checked,
            report.unique_images,
            report.duplicates.len()
        );

        Ok(report)
    }

    fn handle_file(&mut self, path: PathBuf, result: Result<Fingerprint>, report: &mut ScanReport) {
        report.files_checked += 1;
        if self.config.parallel {
            debug!("recording {}", path.display());
        }

        let fingerprint = match result {
            Ok(fp) => fp,
            Err(e @ DupeError::OpenFailed { .. }) => {
                warn!("{}", e);
                report.open_failures += 1;
                return;
            }
            Err(e) => {
                warn!("{}", e);
                report.decode_failures += 1;
                return;
            }
        };

        match self.index.record(fingerprint, path.clone()) {
            RecordOutcome::New => {
                debug!("new: {} ({})", path.display(), fingerprint);
            }
            RecordOutcome::Duplicate { original } => {
                info!("duplicate: {} & {}", original.display(), path.display());
                report.duplicates.push(DuplicatePair {
                    original,
                    duplicate: path,
                    fingerprint,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::sync::atomic::AtomicBool;
    use tempfile::TempDir;

    fn write_image(dir: &Path, name: &str, img: &RgbImage, format: ImageFormat) -> PathBuf {
        let path = dir.join(name);
        img.save_with_format(&path, format).unwrap();
        path
    }

    fn black_2x2() -> RgbImage {
        RgbImage::from_pixel(2, 2, Rgb([0, 0, 0]))
    }

    fn scan(config: ScanConfig) -> ScanReport {
        let mut entropy = EntropySource::seeded(1);
        let shutdown = AtomicBool::new(false);
        Scanner::new(config).run(&mut entropy, &shutdown, |_| {}).unwrap()
    }

    #[test]
    fn test_list_dir_sorted_and_flat() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.png"), b"x").unwrap();
        fs::write(dir.path().join("a.png"), b"x").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("c.png"), b"x").unwrap();

        let files = list_dir(dir.path()).unwrap();
        assert_eq!(
            files,
            vec![dir.path().join("a.png"), dir.path().join("b.png")]
        );
    }

    #[test]
    fn test_list_dir_missing_folder() {
        let dir = TempDir::new().unwrap();
        let err = list_dir(&dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, DupeError::ListFailed { .. }));
    }

    #[test]
    fn test_list_dir_rejects_plain_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("file.png");
        fs::write(&file, b"x").unwrap();

        assert!(matches!(
            list_dir(&file).unwrap_err(),
            DupeError::ListFailed { .. }
        ));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = decode(b"definitely not an image").unwrap_err();
        assert!(matches!(err, DupeError::DecodeFailed { .. }));
    }

    #[test]
    fn test_decode_ignores_extension() {
        let dir = TempDir::new().unwrap();
        // BMP bytes behind a .png name still decode
        let path = write_image(dir.path(), "tmp.bmp", &black_2x2(), ImageFormat::Bmp);
        let renamed = dir.path().join("really_bmp.png");
        fs::rename(&path, &renamed).unwrap();

        let image = decode(&fs::read(&renamed).unwrap()).unwrap();
        assert_eq!((image.width(), image.height()), (2, 2));
    }

    #[test]
    fn test_reencoded_image_is_duplicate() {
        let dir = TempDir::new().unwrap();
        let png = write_image(dir.path(), "image1.png", &black_2x2(), ImageFormat::Png);
        let bmp = write_image(dir.path(), "image2.bmp", &black_2x2(), ImageFormat::Bmp);

        assert_eq!(fingerprint_file(&png).unwrap(), fingerprint_file(&bmp).unwrap());

        let report = scan(ScanConfig::new().with_folder(dir.path()));
        assert_eq!(report.files_checked, 2);
        assert_eq!(report.unique_images, 1);
        assert_eq!(report.duplicates.len(), 1);
        assert_eq!(report.duplicates[0].original, png);
        assert_eq!(report.duplicates[0].duplicate, bmp);
    }

    #[test]
    fn test_earlier_folder_wins() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        let a = write_image(second.path(), "a.png", &black_2x2(), ImageFormat::Png);
        let z = write_image(first.path(), "z.png", &black_2x2(), ImageFormat::Png);

        let report = scan(
            ScanConfig::new()
                .with_folder(first.path())
                .with_folder(second.path()),
        );
        assert_eq!(report.folders_scanned, 2);
        assert_eq!(report.duplicates[0].original, z);
        assert_eq!(report.duplicates[0].duplicate, a);
    }

    #[test]
    fn test_different_images_are_not_duplicates() {
        let dir = TempDir::new().unwrap();
        let mut other = black_2x2();
        other.put_pixel(1, 1, Rgb([0, 0, 1]));
        write_image(dir.path(), "a.png", &black_2x2(), ImageFormat::Png);
        write_image(dir.path(), "b.png", &other, ImageFormat::Png);

        let report = scan(ScanConfig::new().with_folder(dir.path()));
        assert!(report.duplicates.is_empty());
        assert_eq!(report.unique_images, 2);
    }

    #[test]
    fn test_undecodable_files_are_skipped() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("notes.txt"), b"hello").unwrap();
        write_image(dir.path(), "real.png", &black_2x2(), ImageFormat::Png);

        let report = scan(ScanConfig::new().with_folder(dir.path()));
        assert_eq!(report.files_checked, 2);
        assert_eq!(report.decode_failures, 1);
        assert_eq!(report.unique_images, 1);
        assert_eq!(
            report.index,
            IndexStats {
                recorded: 1,
                unique: 1,
                duplicates: 0,
            }
        );
        assert!(report.duplicates.is_empty());
    }

    #[test]
    fn test_missing_folder_is_skipped_by_default() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing");
        let good = TempDir::new().unwrap();
        write_image(good.path(), "a.png", &black_2x2(), ImageFormat::Png);

        let report = scan(
            ScanConfig::new()
                .with_folder(&missing)
                .with_folder(good.path()),
        );
        assert_eq!(report.failed_folders.len(), 1);
        assert_eq!(report.failed_folders[0].folder, missing);
        assert_eq!(report.folders_scanned, 1);
        assert_eq!(report.unique_images, 1);
    }

    #[test]
    fn test_missing_folder_aborts_when_configured() {
        let dir = TempDir::new().unwrap();
        let config = ScanConfig::new()
            .with_folder(dir.path().join("missing"))
            .with_list_error_policy(ListErrorPolicy::Abort);

        let mut entropy = EntropySource::seeded(1);
        let shutdown = AtomicBool::new(false);
        let result = Scanner::new(config).run(&mut entropy, &shutdown, |_| {});
        assert!(matches!(result, Err(DupeError::ListFailed { .. })));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let dir = TempDir::new().unwrap();
        let mut red = black_2x2();
        red.put_pixel(0, 0, Rgb([255, 0, 0]));
        for (name, img, format) in [
            ("a.png", black_2x2(), ImageFormat::Png),
            ("b.bmp", red.clone(), ImageFormat::Bmp),
            ("c.png", red.clone(), ImageFormat::Png),
            ("d.bmp", black_2x2(), ImageFormat::Bmp),
            ("e.png", red, ImageFormat::Png),
        ] {
            write_image(dir.path(), name, &img, format);
        }

        let sequential = scan(ScanConfig::new().with_folder(dir.path()));
        let parallel = scan(ScanConfig::new().with_folder(dir.path()).with_parallel(true));

        assert_eq!(sequential.duplicates.len(), 3);
        assert_eq!(sequential.duplicates, parallel.duplicates);
        assert_eq!(sequential.unique_images, parallel.unique_images);
    }

    #[test]
    fn test_shutdown_stops_before_first_file() {
        let dir = TempDir::new().unwrap();
        write_image(dir.path(), "a.png", &black_2x2(), ImageFormat::Png);

        let mut entropy = EntropySource::seeded(1);
        let shutdown = AtomicBool::new(true);
        let report = Scanner::new(ScanConfig::new().with_folder(dir.path()))
            .run(&mut entropy, &shutdown, |_| {})
            .unwrap();

        assert!(report.interrupted);
        assert_eq!(report.files_checked, 0);
    }

    #[test]
    fn test_progress_callback_sees_every_file() {
        let dir = TempDir::new().unwrap();
        write_image(dir.path(), "a.png", &black_2x2(), ImageFormat::Png);
        write_image(dir.path(), "b.png", &black_2x2(), ImageFormat::Png);

        let mut seen = Vec::new();
        let mut entropy = EntropySource::seeded(1);
        let shutdown = AtomicBool::new(false);
        Scanner::new(ScanConfig::new().with_folder(dir.path()))
            .run(&mut entropy, &shutdown, |p| {
                seen.push((p.files_checked, p.duplicates))
            })
            .unwrap();

        assert_eq!(seen, vec![(1, 0), (2, 1)]);
    }

    #[test]
    fn test_stop_requested_mid_folder_ends_scan() {
        let dir = TempDir::new().unwrap();
        for name in ["a.png", "b.png", "c.png"] {
            write_image(dir.path(), name, &black_2x2(), ImageFormat::Png);
        }

        let mut entropy = EntropySource::seeded(1);
        let shutdown = AtomicBool::new(false);
        let mut calls = 0;
        let report = Scanner::new(ScanConfig::new().with_folder(dir.path()))
            .run(&mut entropy, &shutdown, |_| {
                calls += 1;
                shutdown.store(true, Ordering::SeqCst);
            })
            .unwrap();

        assert_eq!(calls, 1);
        assert!(report.interrupted);
        assert_eq!(report.files_checked, 1);
        assert_eq!(report.unique_images, 1);
    }

    #[test]
    fn test_each_file_is_recorded_before_the_next_is_read() {
        let dir = TempDir::new().unwrap();
        let a = write_image(dir.path(), "a.png", &black_2x2(), ImageFormat::Png);
        let b = write_image(dir.path(), "b.png", &black_2x2(), ImageFormat::Png);

        // Deleting b while a is reported must turn b into an open failure
        let mut entropy = EntropySource::seeded(1);
        let shutdown = AtomicBool::new(false);
        let report = Scanner::new(ScanConfig::new().with_folder(dir.path()))
            .run(&mut entropy, &shutdown, |p| {
                if p.current_file == a {
                    fs::remove_file(&b).unwrap();
                }
            })
            .unwrap();

        assert_eq!(report.files_checked, 2);
        assert_eq!(report.open_failures, 1);
        assert!(report.duplicates.is_empty());
    }

    #[test]
    fn test_run_id_follows_seed() {
        let dir = TempDir::new().unwrap();
        let config = ScanConfig::new().with_folder(dir.path());

        let a = scan(config.clone());
        let b = scan(config);
        assert_eq!(a.run_id, b.run_id);
    }

    #[test]
    fn test_report_serializes_to_json() {
        let dir = TempDir::new().unwrap();
        write_image(dir.path(), "a.png", &black_2x2(), ImageFormat::Png);
        write_image(dir.path(), "b.bmp", &black_2x2(), ImageFormat::Bmp);

        let report = scan(ScanConfig::new().with_folder(dir.path()));
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["files_checked"], 2);
        assert_eq!(
            json["duplicates"][0]["fingerprint"],
            report.duplicates[0].fingerprint.to_string()
        );
    }
}
