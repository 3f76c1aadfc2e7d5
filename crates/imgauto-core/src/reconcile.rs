//! The reconciliation engine.
//!
//! One call to [`Reconciler::reconcile`] performs one automation run: clone
//! the source repository, let the [`Mutator`] rewrite manifests, commit the
//! result and push it, then record the outcome on the automation's status.

use std::time::{Duration, Instant};

use chrono::{DateTime, SecondsFormat, Utc};
use imgauto_git::{Author, Backend, CheckoutRef, CommitOutcome, FetchOutcome, GitImplementation};
use tempfile::TempDir;
use tracing::{debug, error, info, warn};

use crate::access::repo_access;
use crate::automation::{
    AutomationStatus, ConditionStatus, GIT_REPOSITORY_KIND, GitSpec, ImageUpdateAutomation,
    Reason, UpdateStrategy,
};
use crate::config::ControllerConfig;
use crate::error::{Error, Result};
use crate::message::render_commit_message;
use crate::object::ObjectKey;
use crate::paths::secure_join;
use crate::signing::signing_key;
use crate::source::GitRepository;
use crate::traits::{Mutator, NoopObserver, ObjectStore, Observer, SecretStore, Severity};

/// Readiness message when the source object does not exist.
pub const SOURCE_MISSING_MESSAGE: &str = "referenced git repository is missing";

/// Readiness message when no known update strategy is given.
pub const NO_STRATEGY_MESSAGE: &str = "no known update strategy is given for object";

/// What the caller should do once a reconciliation returns successfully.
///
/// A returned error means "retry soon" through the caller's backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Nothing to do until the object or something it watches changes.
    AwaitChange,
    /// Run again after the given delay.
    RequeueAfter(Duration),
}

/// How a run ended short of an error.
#[derive(Debug)]
enum Outcome {
    SourceMissing,
    NoStrategy,
    Succeeded(String),
}

/// Drives automation runs against a store, a mutator and an observer.
pub struct Reconciler<S, M, O = NoopObserver> {
    store: S,
    mutator: M,
    observer: O,
    config: ControllerConfig,
}

impl<S, M, O> Reconciler<S, M, O>
where
    S: ObjectStore + SecretStore,
    M: Mutator,
    O: Observer,
{
    /// Create a reconciler.
    pub const fn new(store: S, mutator: M, observer: O, config: ControllerConfig) -> Self {
        Self {
            store,
            mutator,
            observer,
            config,
        }
    }

    /// The object store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// The mutator.
    pub const fn mutator(&self) -> &M {
        &self.mutator
    }

    /// The observer.
    pub const fn observer(&self) -> &O {
        &self.observer
    }

    /// Perform one run for the automation `key`.
    ///
    /// # Errors
    /// Returns the error that stopped the run. Readiness has already been
    /// set to failed when possible.
    pub async fn reconcile(&self, key: &ObjectKey) -> Result<Action> {
        let Some(mut automation) = self.store.get_automation(key).await? else {
            debug!(automation = %key, "automation not found");
            return Ok(Action::AwaitChange);
        };

        let deleting = automation.metadata.is_deleting();
        self.observer
            .record_suspend(key, automation.spec.suspend && !deleting);
        if automation.spec.suspend {
            info!(automation = %key, "automation is suspended, skipping automation run");
            return Ok(Action::AwaitChange);
        }

        let started = Instant::now();
        let now = Utc::now();
        self.observer.run_started(key);
        if let Some(elapsed) = automation.status.since_last_run(now) {
            debug!(automation = %key, since_last_run = ?elapsed, "starting automation run");
        }

        let result = self.run(&mut automation, now).await;

        self.observer
            .record_readiness(key, automation.status.ready(), deleting);
        self.observer.record_duration(key, started.elapsed());
        result
    }

    async fn run(&self, automation: &mut ImageUpdateAutomation, now: DateTime<Utc>) -> Result<Action> {
        let key = automation.metadata.key();
        let generation = automation.metadata.generation;

        if let Some(token) = automation.metadata.reconcile_request() {
            automation.status.last_handled_reconcile_at = Some(token.to_string());
            self.patch_status(&key, &automation.status).await?;
        }

        let outcome = match self.attempt(automation, now).await {
            Ok(outcome) => outcome,
            Err(err) => return self.fail(automation, err).await,
        };

        match outcome {
            Outcome::SourceMissing => {
                automation.status.set_readiness(
                    ConditionStatus::False,
                    Reason::GitRepositoryNotAvailable,
                    SOURCE_MISSING_MESSAGE,
                    generation,
                    now,
                );
                self.patch_status(&key, &automation.status).await?;
                Ok(Action::AwaitChange)
            }
            Outcome::NoStrategy => {
                info!(automation = %key, "no update strategy given in the spec");
                self.event(
                    &key,
                    Severity::Info,
                    "no known update strategy in spec, failing trivially",
                );
                automation.status.set_readiness(
                    ConditionStatus::False,
                    Reason::NoUpdateStrategy,
                    NO_STRATEGY_MESSAGE,
                    generation,
                    now,
                );
                self.patch_status(&key, &automation.status).await?;
                Ok(Action::AwaitChange)
            }
            Outcome::Succeeded(message) => {
                automation.status.last_automation_run_time = Some(now);
                automation.status.set_readiness(
                    ConditionStatus::True,
                    Reason::ReconciliationSucceeded,
                    message,
                    generation,
                    now,
                );
                self.patch_status(&key, &automation.status).await?;
                Ok(Action::RequeueAfter(requeue_interval(
                    automation.spec.interval,
                    self.config.reconcile.min_interval,
                )))
            }
        }
    }

    #[allow(clippy::too_many_lines)]
    async fn attempt(
        &self,
        automation: &mut ImageUpdateAutomation,
        now: DateTime<Utc>,
    ) -> Result<Outcome> {
        let key = automation.metadata.key();

        let source_ref = &automation.spec.source_ref;
        if source_ref.kind != GIT_REPOSITORY_KIND {
            return Err(Error::UnsupportedSourceKind(source_ref.kind.clone()));
        }
        let git_spec = automation.spec.git.clone().ok_or(Error::MissingGitSpec)?;

        let source_key = ObjectKey::new(&key.namespace, &source_ref.name);
        let Some(source) = self.store.get_git_repository(&source_key).await? else {
            error!(automation = %key, source = %source_key, "referenced git repository does not exist");
            return Ok(Outcome::SourceMissing);
        };
        debug!(automation = %key, source = %source_key, "found git repository");

        let plan = RunPlan::resolve(&git_spec, &source)?;
        let workdir = self.working_dir(&source_key)?;
        let access = repo_access(&self.store, &source).await?;
        let backend = Backend::new(
            plan.implementation,
            &self.config.git.remote,
            self.config.git.timeout,
        );

        let repo = backend
            .clone_into(&access, plan.checkout.as_ref(), workdir.path())
            .await?;

        if plan.explicit_push {
            let fetched = backend
                .fetch_branch(workdir.path(), &plan.push_branch, &access)
                .await?;
            if fetched == FetchOutcome::BranchMissing {
                debug!(automation = %key, branch = %plan.push_branch, "push branch does not exist on remote yet");
            }
            repo.switch_branch(&plan.push_branch)?;
        }
        debug!(
            automation = %key,
            source = %source_key,
            implementation = %plan.implementation,
            working = %workdir.path().display(),
            "cloned git repository"
        );

        let update = automation.spec.update.clone();
        let manifests = match update.as_ref().and_then(|u| u.path.as_deref()) {
            Some(path) if !path.is_empty() => secure_join(workdir.path(), path)?,
            _ => workdir.path().to_path_buf(),
        };

        let result = match update.map(|u| u.strategy) {
            Some(UpdateStrategy::Setters) => {
                let policies = self.store.list_image_policies(&key.namespace).await?;
                self.mutator.apply_setters(&manifests, &policies).await?
            }
            Some(UpdateStrategy::Unsupported) | None => return Ok(Outcome::NoStrategy),
        };
        debug!(automation = %key, working = %workdir.path().display(), "ran updates to working dir");

        let message = render_commit_message(
            &git_spec.commit.message_template,
            &self.config.commit.default_message_template,
            &automation.metadata,
            &result,
        )?;

        let signer = match &git_spec.commit.signing_key {
            Some(spec) => {
                let secret = ObjectKey::new(&key.namespace, &spec.secret_ref.name);
                Some(signing_key(&self.store, &secret, &self.config.commit).await?)
            }
            None => None,
        };

        let author = Author {
            name: git_spec.commit.author.name.clone(),
            email: git_spec.commit.author.email.clone(),
        };

        let committed = repo.commit_changes(&author, &message, signer.as_ref())?;
        let status_message = match committed {
            CommitOutcome::NoChanges => {
                self.event(&key, Severity::Info, "no updates made");
                debug!(automation = %key, "no changes made in working directory; no commit");
                no_changes_message(&automation.status)
            }
            CommitOutcome::Committed(oid) => {
                let revision = oid.to_string();
                backend
                    .push(workdir.path(), &plan.push_branch, &access)
                    .await?;

                self.event(
                    &key,
                    Severity::Info,
                    &format!(
                        "committed and pushed change {revision} to {}",
                        plan.push_branch
                    ),
                );
                self.observer
                    .commit_pushed(&key, &revision, &plan.push_branch);
                info!(automation = %key, revision = %revision, branch = %plan.push_branch, "pushed commit to origin");

                let status_message =
                    format!("committed and pushed {revision} to {}", plan.push_branch);
                automation.status.last_push_commit = Some(revision);
                automation.status.last_push_time = Some(now);
                status_message
            }
        };

        Ok(Outcome::Succeeded(status_message))
    }

    /// Record `err` on the automation and hand it back.
    async fn fail(&self, automation: &mut ImageUpdateAutomation, err: Error) -> Result<Action> {
        let key = automation.metadata.key();
        let message = err.to_string();

        self.event(&key, Severity::Error, &message);
        automation.status.set_readiness(
            ConditionStatus::False,
            Reason::ReconciliationFailed,
            &message,
            automation.metadata.generation,
            Utc::now(),
        );
        if let Err(patch_err) = self.patch_status(&key, &automation.status).await {
            error!(automation = %key, error = %patch_err, "failed to record reconciliation failure");
        }
        Err(err)
    }

    /// Replace the status of the current copy of `key`.
    async fn patch_status(&self, key: &ObjectKey, status: &AutomationStatus) -> Result<()> {
        let current = self
            .store
            .get_automation(key)
            .await?
            .ok_or_else(|| Error::NotFound(key.clone()))?;
        self.store.patch_automation_status(&current, status).await
    }

    fn event(&self, key: &ObjectKey, severity: Severity, message: &str) {
        match severity {
            Severity::Info => info!(automation = %key, "{message}"),
            Severity::Error => warn!(automation = %key, "{message}"),
        }
        self.observer.event(key, severity, message);
    }

    /// A fresh working directory, removed when the returned guard drops.
    fn working_dir(&self, source: &ObjectKey) -> Result<TempDir> {
        let prefix = format!("{}-{}", source.namespace, source.name);
        let mut builder = tempfile::Builder::new();
        builder.prefix(&prefix);
        let dir = match &self.config.reconcile.tmp_dir {
            Some(parent) => builder.tempdir_in(parent)?,
            None => builder.tempdir()?,
        };
        Ok(dir)
    }
}

/// Git parameters of one run, resolved before any git operation.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RunPlan {
    checkout: Option<CheckoutRef>,
    push_branch: String,
    explicit_push: bool,
    implementation: GitImplementation,
}

impl RunPlan {
    /// The automation's checkout reference wins over the source's; an
    /// explicit push branch wins over the checkout branch.
    fn resolve(git: &GitSpec, source: &GitRepository) -> Result<Self> {
        let checkout = git
            .checkout
            .as_ref()
            .map(|c| &c.reference)
            .or(source.spec.reference.as_ref())
            .map(CheckoutRef::from);

        let (push_branch, explicit_push) = match &git.push {
            Some(push) if !push.branch.is_empty() => (push.branch.clone(), true),
            _ => {
                let branch = checkout
                    .as_ref()
                    .and_then(|c| c.branch.clone())
                    .filter(|b| !b.is_empty())
                    .ok_or(Error::PushBranchUnresolved)?;
                (branch, false)
            }
        };

        let implementation = source.spec.git_implementation.parse()?;

        Ok(Self {
            checkout,
            push_branch,
            explicit_push,
            implementation,
        })
    }
}

/// Status message for a run that found nothing to commit.
fn no_changes_message(status: &AutomationStatus) -> String {
    let mut message = String::from("no updates made");
    if let Some(commit) = &status.last_push_commit {
        let short = commit.get(..7).unwrap_or(commit);
        message.push_str(&format!("; last commit {short}"));
        if let Some(at) = status.last_push_time {
            message.push_str(&format!(
                " at {}",
                at.to_rfc3339_opts(SecondsFormat::Secs, true)
            ));
        }
    }
    message
}

fn requeue_interval(interval: Duration, min_interval: Duration) -> Duration {
    interval.max(min_interval)
}
