//! Copy of the git history from the source to the destination
use std::{
    cell::RefCell,
    collections::HashSet,
    fs::{create_dir_all, remove_dir_all},
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use git2::{
    build::RepoBuilder, AutotagOption, Cred, FetchOptions, PushOptions, ReferenceType,
    RemoteCallbacks,
};
use log::{debug, info, warn};
use rand::{distr::Alphanumeric, rng, Rng};
use url::Url;

use crate::{
    errors::{MigratorError, MigratorErrorKind},
    platform::PlatformFuture,
    utils::redact_credentials,
};

/// Fetch refspec of a mirror clone
const MIRROR_REFSPEC: &str = "+refs/*:refs/*";

/// Name of the remote of the scratch clone
const REMOTE_NAME: &str = "origin";

/// Namespace of the scratch clone holding the refs found on the destination
const DESTINATION_NAMESPACE: &str = "refs/destination/";

/// Refspecs copying the destination branches and tags into [`DESTINATION_NAMESPACE`]
const DESTINATION_REFSPECS: [&str; 2] = [
    "+refs/heads/*:refs/destination/heads/*",
    "+refs/tags/*:refs/destination/tags/*",
];

/// One repository to mirror, URLs carry their credentials
#[derive(Clone)]
pub struct MirrorJob {
    /// Repository name, used for the scratch directory
    pub name: String,

    /// Authenticated source URL
    pub source_url: String,

    /// Authenticated destination URL
    pub destination_url: String,
}

/// Copies the complete history of a repository
pub trait HistoryTransport: Sync + Send {
    /// Make the destination refs an exact copy of the source refs
    fn transport_history(&self, job: MirrorJob) -> PlatformFuture<'_, ()>;
}

/// History transport through a bare mirror clone and a forced push of every ref
#[derive(Debug)]
pub struct MirrorTransport {
    /// Directory holding the scratch clones of this run
    scratch_root: PathBuf,

    /// Set once the run is interrupted, running and later mirrors stop
    cancelled: Arc<AtomicBool>,

    /// Held by the blocking thread for the whole mirror
    running: Arc<tokio::sync::Mutex<()>>,
}

impl MirrorTransport {
    /// Transport with a fresh scratch root in the system temp directory
    /// # Errors
    /// Error if the scratch root can't be created
    pub fn try_new() -> Result<Self, MigratorError> {
        Self::in_dir(std::env::temp_dir().join(format!("gitlab2github-{}", random_suffix())))
    }

    /// Transport with scratch clones under `scratch_root`
    /// # Errors
    /// Error if the scratch root can't be created
    pub fn in_dir(scratch_root: PathBuf) -> Result<Self, MigratorError> {
        create_dir_all(&scratch_root).map_err(|e| {
            MigratorError::new_with_source(
                &format!("Unable to create {}", scratch_root.display()),
                e,
            )
        })?;
        Ok(Self {
            scratch_root,
            cancelled: Arc::new(AtomicBool::new(false)),
            running: Arc::new(tokio::sync::Mutex::new(())),
        })
    }

    /// Directory holding the scratch clones
    pub fn scratch_root(&self) -> &Path {
        &self.scratch_root
    }

    /// Remove every scratch clone
    pub fn cleanup(&self) {
        remove_quietly(&self.scratch_root);
    }

    /// Stop the running mirror, wait for its thread to let go of the
    /// scratch clone, then remove the scratch root
    pub async fn shutdown(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        let _idle = self.running.lock().await;
        self.cleanup();
    }
}

impl Drop for MirrorTransport {
    fn drop(&mut self) {
        self.cleanup();
    }
}

impl HistoryTransport for MirrorTransport {
    fn transport_history(&self, job: MirrorJob) -> PlatformFuture<'_, ()> {
        let scratch_root = self.scratch_root.clone();
        let cancelled = Arc::clone(&self.cancelled);
        let running = Arc::clone(&self.running);
        Box::pin(async move {
            let name = job.name.clone();
            let guard = running.lock_owned().await;
            let result = tokio::task::spawn_blocking(move || {
                let _guard = guard;
                ensure_running(&cancelled)?;
                let scratch = ScratchDir::create(&scratch_root, &job.name)?;
                mirror(&job, scratch.path(), &cancelled)
            })
            .await
            .map_err(|e| {
                MigratorError::new(MigratorErrorKind::Transport)
                    .with_text(&format!("Mirror of {name} did not complete"))
                    .with_source(e)
            })?;
            match result {
                Ok((pushed, deleted)) => {
                    info!("Mirrored {name}: {pushed} refs pushed, {deleted} refs deleted");
                    Ok(())
                }
                Err(e) => Err(MigratorError::new(MigratorErrorKind::Transport)
                    .with_text(&format!("Mirror of {name}"))
                    .with_source(e)),
            }
        })
    }
}

/// Scratch clone directory, removed when dropped
struct ScratchDir {
    /// Path of the directory
    path: PathBuf,
}

impl ScratchDir {
    /// Reserve a unique directory under `root`
    fn create(root: &Path, name: &str) -> Result<Self, MigratorError> {
        let path = root.join(format!("{name}-{}.git", random_suffix()));
        create_dir_all(&path)?;
        Ok(Self { path })
    }

    /// Path of the directory
    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        remove_quietly(&self.path);
    }
}

/// Remove a directory tree, a missing one is fine
fn remove_quietly(path: &Path) {
    match remove_dir_all(path) {
        Ok(()) => debug!("Removed {}", path.display()),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!("Unable to remove {}: {e}", path.display()),
    }
}

/// Random alphanumeric suffix
fn random_suffix() -> String {
    rng()
        .sample_iter(&Alphanumeric)
        .take(10)
        .map(char::from)
        .collect()
}

/// Error out once the run is interrupted
fn ensure_running(cancelled: &AtomicBool) -> Result<(), MigratorError> {
    if cancelled.load(Ordering::SeqCst) {
        return Err(MigratorError::new(MigratorErrorKind::Transport).with_text("Interrupted"));
    }
    Ok(())
}

/// Callbacks answering credential requests with the user and password of `url`,
/// aborting the transfer once `cancelled` is set
fn remote_callbacks<'cb>(url: &str, cancelled: &'cb AtomicBool) -> RemoteCallbacks<'cb> {
    let credentials = Url::parse(url).ok().and_then(|parsed| {
        let password = parsed.password()?;
        let password = urlencoding::decode(password).ok()?.into_owned();
        Some((parsed.username().to_string(), password))
    });
    let mut attempted = false;
    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(move |_url, username_from_url, _allowed| {
        if attempted {
            return Err(git2::Error::from_str("credentials rejected"));
        }
        attempted = true;
        match &credentials {
            Some((username, password)) => {
                Cred::userpass_plaintext(username_from_url.unwrap_or(username), password)
            }
            None => Cred::default(),
        }
    });
    callbacks.transfer_progress(move |_| !cancelled.load(Ordering::SeqCst));
    callbacks.push_negotiation(move |_| {
        if cancelled.load(Ordering::SeqCst) {
            return Err(git2::Error::from_str("interrupted"));
        }
        Ok(())
    });
    callbacks
}

/// Mirror clone the source into `path`, then force push every ref to the destination.
/// Returns the number of refs pushed and deleted.
fn mirror(
    job: &MirrorJob,
    path: &Path,
    cancelled: &AtomicBool,
) -> Result<(usize, usize), MigratorError> {
    debug!(
        "Cloning '{}' to '{}'",
        redact_credentials(&job.source_url),
        path.display()
    );
    let mut builder = RepoBuilder::new();
    builder.bare(true);
    builder.remote_create(|repo, name, url| repo.remote_with_fetch(name, url, MIRROR_REFSPEC));
    let mut fetch_opts = FetchOptions::new();
    fetch_opts.remote_callbacks(remote_callbacks(&job.source_url, cancelled));
    builder.fetch_options(fetch_opts);
    let repo = builder.clone(&job.source_url, path)?;
    ensure_running(cancelled)?;

    let mut local_refs = vec![];
    for reference in repo.references()? {
        let reference = reference?;
        if reference.kind() == Some(ReferenceType::Symbolic) {
            continue;
        }
        match reference.name() {
            Some(name) if name.starts_with("refs/") && !name.starts_with("refs/remotes/") => {
                local_refs.push(name.to_string())
            }
            _ => continue,
        }
    }

    // An empty destination advertises no refs, fetching copes with it
    debug!(
        "Fetching the refs of '{}'",
        redact_credentials(&job.destination_url)
    );
    {
        let mut remote = repo.remote_anonymous(&job.destination_url)?;
        let mut opts = FetchOptions::new();
        opts.remote_callbacks(remote_callbacks(&job.destination_url, cancelled));
        opts.download_tags(AutotagOption::None);
        remote.fetch(&DESTINATION_REFSPECS, Some(&mut opts), None)?;
    }
    let local_set: HashSet<&str> = local_refs.iter().map(String::as_str).collect();
    let mut stale_refs = vec![];
    for reference in repo.references_glob(&format!("{DESTINATION_NAMESPACE}*"))? {
        let reference = reference?;
        let Some(rest) = reference
            .name()
            .and_then(|name| name.strip_prefix(DESTINATION_NAMESPACE))
        else {
            continue;
        };
        let name = format!("refs/{rest}");
        if !local_set.contains(name.as_str()) {
            stale_refs.push(name);
        }
    }
    ensure_running(cancelled)?;

    let mut refspecs: Vec<String> = local_refs
        .iter()
        .map(|name| format!("+{name}:{name}"))
        .collect();
    refspecs.extend(stale_refs.iter().map(|name| format!(":{name}")));
    if refspecs.is_empty() {
        return Ok((0, 0));
    }

    debug!(
        "Retargeting {REMOTE_NAME} to '{}'",
        redact_credentials(&job.destination_url)
    );
    repo.remote_set_url(REMOTE_NAME, &job.destination_url)?;
    let mut remote = repo.find_remote(REMOTE_NAME)?;
    let rejected = RefCell::new(vec![]);
    {
        let mut callbacks = remote_callbacks(&job.destination_url, cancelled);
        callbacks.push_update_reference(|refname, status| {
            if let Some(message) = status {
                rejected.borrow_mut().push(format!("{refname}: {message}"));
            }
            Ok(())
        });
        let mut opts = PushOptions::new();
        opts.remote_callbacks(callbacks);
        remote.push(&refspecs, Some(&mut opts))?;
    }
    let rejected = rejected.into_inner();
    if !rejected.is_empty() {
        return Err(MigratorError::new(MigratorErrorKind::Transport)
            .with_text(&format!("Rejected refs: {}", rejected.join(", "))));
    }
    Ok((local_refs.len(), stale_refs.len()))
}
