//! The merge pipeline: discover, extract, merge, encode, write.

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::config::{extract, ConfigGroup, ExtractError};
use crate::discover::{discover, Target};
use crate::document::encode;
use crate::merge::{CurrentContextPolicy, MergePlan};
use crate::Error;

/// Mode for a newly created target file. Kubeconfigs carry credentials.
#[cfg(unix)]
const NEW_FILE_MODE: u32 = 0o600;

/// Inputs of one merge run.
///
/// ```no_run
/// use kubeconfig_merge::{run, MergeOptions};
///
/// let report = run(
///     &MergeOptions::new("/home/me/.kube/config")
///         .with_directory("/etc/kubeconfigs")
///         .with_file("team.yaml"),
/// )?;
/// println!("{}", report.summary());
/// # Ok::<(), kubeconfig_merge::Error>(())
/// ```
#[derive(Debug, Clone)]
#[must_use]
pub struct MergeOptions {
    pub directories: Vec<PathBuf>,
    pub files: Vec<PathBuf>,
    pub target: PathBuf,
    pub current_context: CurrentContextPolicy,
}

impl MergeOptions {
    pub fn new(target: impl AsRef<Path>) -> Self {
        Self {
            directories: Vec::new(),
            files: Vec::new(),
            target: target.as_ref().to_path_buf(),
            current_context: CurrentContextPolicy::default(),
        }
    }

    /// Adds a directory to search recursively. Directories are walked in
    /// registration order.
    pub fn with_directory(mut self, dir: impl AsRef<Path>) -> Self {
        self.directories.push(dir.as_ref().to_path_buf());
        self
    }

    /// Adds an explicit file. Explicit files follow all directory contents.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.files.push(path.as_ref().to_path_buf());
        self
    }

    pub fn current_context(mut self, policy: CurrentContextPolicy) -> Self {
        self.current_context = policy;
        self
    }
}

/// A source left out of the merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub path: PathBuf,
    pub reason: String,
    /// The source was a recognized config document with corrupt entries,
    /// as opposed to an irrelevant or unreadable file.
    pub malformed: bool,
}

/// Outcome of a successful run.
#[derive(Debug)]
pub struct Report {
    /// Extracted groups in merge order.
    pub groups: Vec<ConfigGroup>,
    pub skipped: Vec<Skipped>,
    pub merged: ConfigGroup,
    pub target: PathBuf,
}

impl Report {
    /// Per-source listing of context names.
    pub fn summary(&self) -> Summary<'_> {
        Summary(&self.groups)
    }
}

pub struct Summary<'a>(&'a [ConfigGroup]);

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Contexts by source:")?;
        for group in self.0 {
            writeln!(f, "  {}", group.source)?;
            for context in &group.contexts {
                writeln!(f, "    - {}", context.name)?;
            }
        }
        Ok(())
    }
}

/// Runs a full merge and writes the result to the target.
///
/// Sources that are not mergeable config documents are skipped and
/// reported. The existing target, if any, is merged last and its entries
/// are protected from replacement. The target is only written once the
/// merged document has been encoded in full.
pub fn run(options: &MergeOptions) -> Result<Report, Error> {
    let discovery = discover(&options.directories, &options.files, &options.target);
    if discovery.sources.is_empty() {
        return Err(Error::NoSources);
    }

    let mut plan = MergePlan::new().current_context(options.current_context);
    let mut skipped = Vec::new();

    for path in &discovery.sources {
        match load_source(path) {
            Ok(group) => plan = plan.with_source(group),
            Err(skip) => skipped.push(skip),
        }
    }

    let target = &discovery.target;
    if target.exists() {
        let bytes = fs::read(&target.path).map_err(|source| Error::ReadTarget {
            path: target.path.clone(),
            source,
        })?;

        match extract(&bytes, &target.path.display().to_string()) {
            Ok(group) => {
                log_loaded(&group);
                plan = plan.with_authoritative(group);
            }
            Err(err @ ExtractError::Skipped { .. }) => {
                warn!(
                    source = %target.path.display(),
                    reason = %err,
                    "target is not a config document, it will be replaced"
                );
                skipped.push(Skipped {
                    path: target.path.clone(),
                    reason: err.to_string(),
                    malformed: false,
                });
            }
            Err(err) => return Err(Error::MalformedTarget(err)),
        }
    }

    if plan.is_empty() {
        return Err(Error::NoValidSources);
    }

    let (merged, groups) = plan.into_parts();
    let contents = encode(&merged)?;
    write_target(target, contents.as_bytes())?;

    info!(
        path = %target.path.display(),
        clusters = merged.clusters.len(),
        contexts = merged.contexts.len(),
        users = merged.users.len(),
        "wrote merged config"
    );

    Ok(Report {
        groups,
        skipped,
        merged,
        target: target.path.clone(),
    })
}

fn load_source(path: &Path) -> Result<ConfigGroup, Skipped> {
    let skipped = |reason: String, malformed| Skipped {
        path: path.to_path_buf(),
        reason,
        malformed,
    };

    let bytes = fs::read(path).map_err(|e| {
        warn!(source = %path.display(), error = %e, "skipping source: cannot read file");
        skipped(format!("cannot read file: {e}"), false)
    })?;

    match extract(&bytes, &path.display().to_string()) {
        Ok(group) => {
            log_loaded(&group);
            Ok(group)
        }
        Err(err) if err.is_skip() => {
            warn!(source = %path.display(), reason = %err, "skipping source");
            Err(skipped(err.to_string(), false))
        }
        Err(err) => {
            error!(
                source = %path.display(),
                error = %err,
                "malformed config document left out of merge"
            );
            Err(skipped(err.to_string(), true))
        }
    }
}

fn log_loaded(group: &ConfigGroup) {
    info!(
        source = %group.source,
        clusters = group.clusters.len(),
        contexts = group.contexts.len(),
        users = group.users.len(),
        "loaded config"
    );
}

fn write_target(target: &Target, contents: &[u8]) -> Result<(), Error> {
    if let Some(parent) = target.path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| Error::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let write_error = |source| Error::WriteTarget {
        path: target.path.clone(),
        source,
    };

    open_target(&target.path)
        .and_then(|mut file| file.write_all(contents))
        .map_err(write_error)?;

    if let Some(permissions) = &target.permissions {
        fs::set_permissions(&target.path, permissions.clone()).map_err(write_error)?;
    }
    Ok(())
}

/// Opens the target for writing, creating it with [`NEW_FILE_MODE`] (still
/// subject to the umask) when it does not exist.
#[cfg(unix)]
fn open_target(path: &Path) -> io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;

    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(NEW_FILE_MODE)
        .open(path)
}

#[cfg(not(unix))]
fn open_target(path: &Path) -> io::Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}
