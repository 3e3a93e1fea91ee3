//! Transfer engine
//!
//! Moves or copies every immediate entry of a source folder into
//! `<destination>/<YYYY-MM-DD>` and records the run in a `log.txt` inside
//! that dated folder. Every user-facing line is handed to an `emit`
//! callback as it happens, so a window can show the run live; the same
//! information comes back as a [`TransferOutcome`] once the run is over.

use crate::core::error::{Result, TransferError};
use crate::core::file_ops::{copy_entry, move_entry};
use crate::core::settings::{Settings, SettingsStore};
use chrono::{Local, NaiveDate};
use log::{debug, info, warn};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Name of the per-run log written inside the dated folder
pub const LOG_FILE_NAME: &str = "log.txt";

/// Format of the dated folder name and log header
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// What to transfer and how
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub source: PathBuf,
    pub destination: PathBuf,
    /// Move entries instead of copying them
    pub move_files: bool,
}

impl TransferRequest {
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>, move_files: bool) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            move_files,
        }
    }

    /// The settings record this request corresponds to
    pub fn to_settings(&self) -> Settings {
        Settings {
            source: self.source.to_string_lossy().into_owned(),
            destination: self.destination.to_string_lossy().into_owned(),
            move_files: self.move_files,
        }
    }

    fn verb(&self) -> (&'static str, &'static str) {
        if self.move_files {
            ("Moving", "Moved")
        } else {
            ("Copying", "Copied")
        }
    }
}

/// Result of transferring one entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryStatus {
    Transferred,
    Failed(String),
}

/// One source entry and what happened to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryOutcome {
    pub name: String,
    pub status: EntryStatus,
}

impl EntryOutcome {
    pub fn is_transferred(&self) -> bool {
        self.status == EntryStatus::Transferred
    }
}

/// Summary of a finished run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOutcome {
    /// Date the dated folder is named after
    pub date: NaiveDate,
    /// `<destination>/<date>`
    pub dated_folder: PathBuf,
    /// `<dated_folder>/log.txt`
    pub log_file: PathBuf,
    /// Per-entry results, in enumeration order
    pub entries: Vec<EntryOutcome>,
    /// Number of entries transferred successfully
    pub transferred: usize,
}

impl TransferOutcome {
    pub fn failed(&self) -> usize {
        self.entries.len() - self.transferred
    }
}

/// Runs transfers and remembers the fields used for each run
#[derive(Debug, Clone)]
pub struct TransferEngine {
    settings: SettingsStore,
}

impl TransferEngine {
    pub fn new(settings: SettingsStore) -> Self {
        Self { settings }
    }

    /// Run a transfer into today's dated folder
    pub fn run<F>(&self, request: &TransferRequest, emit: F) -> Result<TransferOutcome>
    where
        F: FnMut(String),
    {
        self.run_on(Local::now().date_naive(), request, emit)
    }

    /// Run a transfer into the folder for `date`
    pub fn run_on<F>(
        &self,
        date: NaiveDate,
        request: &TransferRequest,
        mut emit: F,
    ) -> Result<TransferOutcome>
    where
        F: FnMut(String),
    {
        if !request.source.is_dir() {
            return Err(TransferError::SourceNotFound(request.source.clone()));
        }
        if !request.destination.is_dir() {
            return Err(TransferError::DestinationNotFound(
                request.destination.clone(),
            ));
        }

        if let Err(e) = self.settings.save(&request.to_settings()) {
            warn!("Failed to save settings: {}", e);
            emit(format!("⚠️ Could not save settings: {}", e));
        }

        let today = date.format(DATE_FORMAT).to_string();
        let dated_folder = request.destination.join(&today);
        fs::create_dir_all(&dated_folder).map_err(|e| TransferError::io(&dated_folder, e))?;
        info!("Dated folder: {}", dated_folder.display());
        emit(format!("📂 Created folder for today: {}", dated_folder.display()));

        let log_path = dated_folder.join(LOG_FILE_NAME);
        let mut run_log = RunLog::create(&log_path)?;
        run_log.line(&format!("AutoDrop Log - {}", today));
        run_log.line("");

        let listing = fs::read_dir(&request.source)
            .map_err(|e| TransferError::io(&request.source, e))?;

        let (present, past) = request.verb();
        let mut entries = Vec::new();

        for item in listing {
            let item = match item {
                Ok(item) => item,
                Err(e) => {
                    let message = format!("❌ Error: {}", e);
                    emit(message.clone());
                    run_log.line(&message);
                    continue;
                }
            };

            let src_path = item.path();
            if same_path(&src_path, &dated_folder) {
                debug!("Skipping the dated folder itself: {}", src_path.display());
                continue;
            }

            let name = item.file_name().to_string_lossy().into_owned();
            let dest_path = dated_folder.join(item.file_name());

            emit(format!("📥 {} {}...", present, name));
            run_log.line(&format!("{}: {}", past, name));

            let result = if request.move_files {
                move_entry(&src_path, &dest_path)
            } else {
                copy_entry(&src_path, &dest_path)
            };

            let status = match result {
                Ok(()) => {
                    debug!("{} {}", past, src_path.display());
                    EntryStatus::Transferred
                }
                Err(e) => {
                    warn!("{} {} failed: {}", present, src_path.display(), e);
                    let message = format!("❌ Error: {}", e);
                    emit(message.clone());
                    run_log.line(&message);
                    EntryStatus::Failed(e.to_string())
                }
            };
            entries.push(EntryOutcome { name, status });
        }

        let transferred = entries.iter().filter(|e| e.is_transferred()).count();

        if transferred > 0 {
            emit(format!(
                "\n✅ Transfer complete! {} file(s) saved to:\n{}",
                transferred,
                dated_folder.display()
            ));
            run_log.line(&format!("\n✅ Transfer complete! {} file(s).", transferred));
        } else {
            emit("\n⚠️ No files found.".to_string());
            run_log.line("\n⚠️ No files found.");
        }

        if let Err(e) = run_log.finish() {
            warn!("Failed to write {}: {}", log_path.display(), e);
            emit(format!("⚠️ Could not write {}: {}", log_path.display(), e));
        }

        info!(
            "Transfer finished: {} transferred, {} failed",
            transferred,
            entries.len() - transferred
        );

        Ok(TransferOutcome {
            date,
            dated_folder,
            log_file: log_path,
            entries,
            transferred,
        })
    }
}

/// `log.txt` writer that keeps going after a write error and reports the
/// first one at the end.
struct RunLog {
    writer: BufWriter<File>,
    error: Option<io::Error>,
}

impl RunLog {
    fn create(path: &Path) -> Result<Self> {
        let file = File::create(path).map_err(|e| TransferError::io(path, e))?;
        Ok(Self {
            writer: BufWriter::new(file),
            error: None,
        })
    }

    fn line(&mut self, text: &str) {
        if self.error.is_some() {
            return;
        }
        if let Err(e) = writeln!(self.writer, "{}", text) {
            self.error = Some(e);
        }
    }

    fn finish(mut self) -> io::Result<()> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        self.writer.flush()
    }
}

fn same_path(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::FileTime;
    use tempfile::TempDir;

    struct Fixture {
        _temp: TempDir,
        source: PathBuf,
        destination: PathBuf,
        settings_path: PathBuf,
        engine: TransferEngine,
    }

    fn fixture() -> Fixture {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("phone");
        let destination = temp.path().join("archive");
        fs::create_dir_all(&source).unwrap();
        fs::create_dir_all(&destination).unwrap();
        let settings_path = temp.path().join("cfg").join("autodrop_config.json");
        let engine = TransferEngine::new(SettingsStore::with_path(&settings_path));
        Fixture {
            _temp: temp,
            source,
            destination,
            settings_path,
            engine,
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 17).unwrap()
    }

    fn populate(source: &Path) {
        fs::write(source.join("VID_001.mp4"), b"first video").unwrap();
        fs::write(source.join("IMG_002.jpg"), b"photo").unwrap();
        fs::create_dir_all(source.join("Album")).unwrap();
        fs::write(source.join("Album").join("inner.jpg"), b"inner").unwrap();
    }

    fn count_entries(dir: &Path) -> usize {
        fs::read_dir(dir).unwrap().count()
    }

    #[test]
    fn test_copy_transfers_every_entry_and_keeps_source() {
        let fx = fixture();
        populate(&fx.source);

        let request = TransferRequest::new(&fx.source, &fx.destination, false);
        let mut lines = Vec::new();
        let outcome = fx
            .engine
            .run_on(date(), &request, |l| lines.push(l))
            .unwrap();

        let dated = fx.destination.join("2024-05-17");
        assert_eq!(outcome.dated_folder, dated);
        assert_eq!(outcome.transferred, 3);
        assert_eq!(outcome.failed(), 0);
        assert_eq!(count_entries(&fx.source), 3);
        // three entries plus log.txt
        assert_eq!(count_entries(&dated), 4);
        assert_eq!(fs::read(dated.join("Album").join("inner.jpg")).unwrap(), b"inner");
        assert_eq!(count_entries(&fx.destination), 1);
        assert!(lines.iter().any(|l| l == "📥 Copying VID_001.mp4..."));
        assert!(lines.last().unwrap().contains("Transfer complete! 3 file(s) saved to:"));
    }

    #[test]
    fn test_move_empties_source_byte_identical() {
        let fx = fixture();
        populate(&fx.source);

        let request = TransferRequest::new(&fx.source, &fx.destination, true);
        let outcome = fx.engine.run_on(date(), &request, |_| {}).unwrap();

        assert_eq!(outcome.transferred, 3);
        assert_eq!(count_entries(&fx.source), 0);
        let dated = fx.destination.join("2024-05-17");
        assert_eq!(fs::read(dated.join("VID_001.mp4")).unwrap(), b"first video");
        assert_eq!(fs::read(dated.join("IMG_002.jpg")).unwrap(), b"photo");
    }

    #[test]
    fn test_copy_preserves_modification_time() {
        let fx = fixture();
        let file = fx.source.join("clip.mov");
        fs::write(&file, b"clip").unwrap();
        let mtime = FileTime::from_unix_time(1_600_000_000, 0);
        filetime::set_file_mtime(&file, mtime).unwrap();

        let request = TransferRequest::new(&fx.source, &fx.destination, false);
        fx.engine.run_on(date(), &request, |_| {}).unwrap();

        let copied = fx.destination.join("2024-05-17").join("clip.mov");
        let copied_mtime = FileTime::from_last_modification_time(&fs::metadata(copied).unwrap());
        assert_eq!(copied_mtime.unix_seconds(), 1_600_000_000);
    }

    #[test]
    fn test_empty_source_logs_no_files_found() {
        let fx = fixture();

        let request = TransferRequest::new(&fx.source, &fx.destination, true);
        let mut lines = Vec::new();
        let outcome = fx
            .engine
            .run_on(date(), &request, |l| lines.push(l))
            .unwrap();

        assert_eq!(outcome.transferred, 0);
        assert!(outcome.entries.is_empty());
        assert!(outcome.dated_folder.is_dir());
        assert_eq!(lines.last().unwrap(), "\n⚠️ No files found.");

        let log = fs::read_to_string(&outcome.log_file).unwrap();
        assert!(log.contains("No files found."));
    }

    #[test]
    fn test_log_file_format() {
        let fx = fixture();
        fs::write(fx.source.join("a.txt"), b"a").unwrap();

        let request = TransferRequest::new(&fx.source, &fx.destination, false);
        let outcome = fx.engine.run_on(date(), &request, |_| {}).unwrap();

        let log = fs::read_to_string(&outcome.log_file).unwrap();
        assert_eq!(
            log,
            "AutoDrop Log - 2024-05-17\n\nCopied: a.txt\n\n✅ Transfer complete! 1 file(s).\n"
        );
    }

    #[test]
    fn test_rerun_same_day_truncates_log() {
        let fx = fixture();
        fs::write(fx.source.join("a.txt"), b"a").unwrap();
        let request = TransferRequest::new(&fx.source, &fx.destination, true);
        fx.engine.run_on(date(), &request, |_| {}).unwrap();

        let outcome = fx.engine.run_on(date(), &request, |_| {}).unwrap();

        let log = fs::read_to_string(&outcome.log_file).unwrap();
        assert!(!log.contains("Moved: a.txt"));
        assert!(log.contains("No files found."));
        assert!(outcome.dated_folder.join("a.txt").exists());
    }

    #[test]
    fn test_missing_source_touches_nothing() {
        let fx = fixture();
        let request =
            TransferRequest::new(fx.source.join("does-not-exist"), &fx.destination, true);

        let err = fx.engine.run_on(date(), &request, |_| {}).unwrap_err();

        assert!(matches!(err, TransferError::SourceNotFound(_)));
        assert_eq!(count_entries(&fx.destination), 0);
        assert!(!fx.settings_path.exists());
    }

    #[test]
    fn test_missing_destination_touches_nothing() {
        let fx = fixture();
        populate(&fx.source);
        let request = TransferRequest::new(&fx.source, fx.destination.join("nope"), true);

        let err = fx.engine.run_on(date(), &request, |_| {}).unwrap_err();

        assert!(matches!(err, TransferError::DestinationNotFound(_)));
        assert_eq!(count_entries(&fx.source), 3);
        assert!(!fx.settings_path.exists());
    }

    #[test]
    fn test_source_that_is_a_file_is_rejected() {
        let fx = fixture();
        let file = fx.source.join("file.txt");
        fs::write(&file, b"x").unwrap();
        let request = TransferRequest::new(&file, &fx.destination, false);

        let err = fx.engine.run_on(date(), &request, |_| {}).unwrap_err();
        assert_eq!(err, TransferError::SourceNotFound(file));
    }

    #[test]
    fn test_run_persists_settings() {
        let fx = fixture();
        let request = TransferRequest::new(&fx.source, &fx.destination, false);
        fx.engine.run_on(date(), &request, |_| {}).unwrap();

        let saved = SettingsStore::with_path(&fx.settings_path).load();
        assert_eq!(saved, request.to_settings());
        assert!(!saved.move_files);
    }

    #[test]
    fn test_same_source_and_destination_skips_dated_folder() {
        let fx = fixture();
        fs::write(fx.source.join("a.txt"), b"a").unwrap();
        let request = TransferRequest::new(&fx.source, &fx.source, true);

        let outcome = fx.engine.run_on(date(), &request, |_| {}).unwrap();

        assert_eq!(outcome.transferred, 1);
        assert_eq!(outcome.entries.len(), 1);
        assert!(fx.source.join("2024-05-17").join("a.txt").exists());
    }

    #[test]
    fn test_destination_inside_source_folder_is_not_copied_into_itself() {
        for move_files in [false, true] {
            let fx = fixture();
            let destination = fx.source.join("archive");
            fs::create_dir_all(&destination).unwrap();
            fs::write(destination.join("old.jpg"), b"old").unwrap();
            fs::write(fx.source.join("VID_001.mp4"), b"video").unwrap();

            let request = TransferRequest::new(&fx.source, &destination, move_files);
            let mut lines = Vec::new();
            let outcome = fx
                .engine
                .run_on(date(), &request, |l| lines.push(l))
                .unwrap();

            assert_eq!(outcome.transferred, 1);
            assert_eq!(outcome.failed(), 1);
            let archive = outcome.entries.iter().find(|e| e.name == "archive").unwrap();
            match &archive.status {
                EntryStatus::Failed(message) => assert!(message.contains("into itself")),
                other => panic!("unexpected status: {:?}", other),
            }
            assert!(lines
                .iter()
                .any(|l| l.starts_with("❌ Error: Cannot transfer a folder into itself")));

            let dated = destination.join("2024-05-17");
            assert!(!dated.join("archive").exists());
            // the video plus log.txt
            assert_eq!(count_entries(&dated), 2);
            assert_eq!(fs::read(destination.join("old.jpg")).unwrap(), b"old");
            assert_eq!(fs::read(dated.join("VID_001.mp4")).unwrap(), b"video");
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_entry_is_logged_and_run_continues() {
        use std::os::unix::fs::PermissionsExt;

        let fx = fixture();
        fs::write(fx.source.join("ok.txt"), b"ok").unwrap();
        let locked = fx.source.join("locked.txt");
        fs::write(&locked, b"secret").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Root can read anything; nothing to assert in that case
        if fs::read(&locked).is_ok() {
            return;
        }

        let request = TransferRequest::new(&fx.source, &fx.destination, false);
        let mut lines = Vec::new();
        let outcome = fx
            .engine
            .run_on(date(), &request, |l| lines.push(l))
            .unwrap();

        assert_eq!(outcome.transferred, 1);
        assert_eq!(outcome.failed(), 1);
        let failed = outcome.entries.iter().find(|e| e.name == "locked.txt").unwrap();
        assert!(matches!(failed.status, EntryStatus::Failed(_)));
        assert!(lines.iter().any(|l| l.starts_with("❌ Error: ")));

        let log = fs::read_to_string(&outcome.log_file).unwrap();
        assert!(log.contains("Copied: locked.txt\n❌ Error: "));

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();
    }

    #[test]
    fn test_existing_file_in_dated_folder_is_replaced() {
        let fx = fixture();
        let dated = fx.destination.join("2024-05-17");
        fs::create_dir_all(&dated).unwrap();
        fs::write(dated.join("a.txt"), b"yesterday's run").unwrap();
        fs::write(fx.source.join("a.txt"), b"today").unwrap();

        let request = TransferRequest::new(&fx.source, &fx.destination, true);
        let outcome = fx.engine.run_on(date(), &request, |_| {}).unwrap();

        assert_eq!(outcome.transferred, 1);
        assert_eq!(fs::read(dated.join("a.txt")).unwrap(), b"today");
    }
}
