//! End-to-end reconciliation runs against local bare repositories.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use git2::Signature;
use imgauto_core::{
    Action, AutomationSpec, AutomationStatus, CommitSpec, CommitUser, ConditionStatus,
    ControllerConfig, Error, GitCheckoutSpec, GitRepository, GitRepositoryRef, GitRepositorySpec,
    GitSpec, ImagePolicy, ImageUpdateAutomation, LocalObjectReference, MemoryStore, Mutator,
    ObjectKey, ObjectMeta, ObjectStore, Observer, PushSpec, RECONCILE_REQUEST_ANNOTATION, Reason,
    Reconciler, Secret, Severity, SigningKeySpec, SourceReference, UpdateResult, UpdateSpec,
    UpdateStrategy,
};
use tempfile::TempDir;

const SINGLE_KEY: &str = include_str!("../../imgauto-git/testdata/single-key.asc");
const TWO_KEYS: &str = include_str!("../../imgauto-git/testdata/two-keys.asc");

const NAMESPACE: &str = "default";

// === Fixtures ===

/// Bare upstream with `deploy/app.yaml` committed on `main`, plus tag
/// `v1.0.0`.
struct Upstream {
    _dir: TempDir,
    path: PathBuf,
}

impl Upstream {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("upstream.git");
        let seed = dir.path().join("seed");
        let bare = git2::Repository::init_bare(&path).unwrap();
        bare.set_head("refs/heads/main").unwrap();

        let work = git2::Repository::init(&seed).unwrap();
        fs::create_dir_all(seed.join("deploy")).unwrap();
        fs::write(seed.join("deploy/app.yaml"), "image: ghcr.io/org/app:1.0.0\n").unwrap();
        let mut index = work.index().unwrap();
        index.add_path(Path::new("deploy/app.yaml")).unwrap();
        index.write().unwrap();
        let tree = work.find_tree(index.write_tree().unwrap()).unwrap();
        let sig = Signature::now("Seed", "seed@example.com").unwrap();
        let oid = work
            .commit(None, &sig, &sig, "Initial commit", &tree, &[])
            .unwrap();
        work.reference("refs/heads/main", oid, true, "seed").unwrap();
        work.tag_lightweight("v1.0.0", &work.find_object(oid, None).unwrap(), false)
            .unwrap();
        work.remote("origin", path.to_str().unwrap())
            .unwrap()
            .push(
                &["refs/heads/main:refs/heads/main", "refs/tags/v1.0.0:refs/tags/v1.0.0"],
                None,
            )
            .unwrap();

        Self { _dir: dir, path }
    }

    fn url(&self) -> String {
        self.path.to_str().unwrap().to_string()
    }

    fn branch(&self, name: &str) -> Option<git2::Oid> {
        let repo = git2::Repository::open_bare(&self.path).unwrap();
        repo.find_reference(&format!("refs/heads/{name}"))
            .ok()
            .and_then(|r| r.target())
    }

    fn file_at(&self, branch: &str, path: &str) -> String {
        let repo = git2::Repository::open_bare(&self.path).unwrap();
        let commit = repo.find_commit(self.branch(branch).unwrap()).unwrap();
        let entry = commit.tree().unwrap().get_path(Path::new(path)).unwrap();
        let blob = repo.find_blob(entry.id()).unwrap();
        String::from_utf8(blob.content().to_vec()).unwrap()
    }

    /// Install a `pre-receive` hook refusing every push.
    #[cfg(unix)]
    fn reject_pushes(&self) {
        use std::os::unix::fs::PermissionsExt;

        let hook = self.path.join("hooks").join("pre-receive");
        fs::create_dir_all(hook.parent().unwrap()).unwrap();
        fs::write(&hook, "#!/bin/sh\necho 'pushes are frozen'\nexit 1\n").unwrap();
        fs::set_permissions(&hook, fs::Permissions::from_mode(0o755)).unwrap();
    }

    fn message_at(&self, branch: &str) -> String {
        let repo = git2::Repository::open_bare(&self.path).unwrap();
        let commit = repo.find_commit(self.branch(branch).unwrap()).unwrap();
        commit.message().unwrap().to_string()
    }
}

/// Writes every policy's latest image into one file, the way a setter
/// would, and reports the change.
#[derive(Default)]
struct SetImage {
    roots: Mutex<Vec<PathBuf>>,
}

impl Mutator for SetImage {
    async fn apply_setters(
        &self,
        root: &Path,
        policies: &[ImagePolicy],
    ) -> imgauto_core::Result<UpdateResult> {
        self.roots.lock().unwrap().push(root.to_path_buf());
        let mut result = UpdateResult::default();
        let file = root.join("app.yaml");
        if !file.exists() {
            return Ok(result);
        }

        for policy in policies {
            let Some(image) = &policy.latest_image else {
                continue;
            };
            let wanted = format!("image: {image}\n");
            if fs::read_to_string(&file)? != wanted {
                fs::write(&file, &wanted)?;
                result
                    .files
                    .entry("app.yaml".into())
                    .or_default()
                    .objects
                    .insert("Deployment/default/app".into(), vec![image.clone()]);
            }
        }
        Ok(result)
    }
}

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<(Severity, String)>>,
    suspends: Mutex<Vec<bool>>,
    runs: Mutex<usize>,
    pushes: Mutex<Vec<(String, String)>>,
}

impl Observer for Recorder {
    fn event(&self, _key: &ObjectKey, severity: Severity, message: &str) {
        self.events
            .lock()
            .unwrap()
            .push((severity, message.to_string()));
    }

    fn run_started(&self, _key: &ObjectKey) {
        *self.runs.lock().unwrap() += 1;
    }

    fn record_suspend(&self, _key: &ObjectKey, suspended: bool) {
        self.suspends.lock().unwrap().push(suspended);
    }

    fn commit_pushed(&self, _key: &ObjectKey, revision: &str, branch: &str) {
        self.pushes
            .lock()
            .unwrap()
            .push((revision.to_string(), branch.to_string()));
    }
}

fn key() -> ObjectKey {
    ObjectKey::new(NAMESPACE, "apps")
}

fn git_repository(url: &str, implementation: &str) -> GitRepository {
    GitRepository {
        metadata: ObjectMeta::new(NAMESPACE, "apps-repo"),
        spec: GitRepositorySpec {
            url: url.into(),
            reference: None,
            secret_ref: None,
            git_implementation: implementation.into(),
        },
    }
}

fn branch_ref(branch: &str) -> GitRepositoryRef {
    GitRepositoryRef {
        branch: Some(branch.into()),
        ..GitRepositoryRef::default()
    }
}

fn automation(checkout: Option<GitRepositoryRef>, push: Option<&str>) -> ImageUpdateAutomation {
    ImageUpdateAutomation {
        metadata: ObjectMeta::new(NAMESPACE, "apps"),
        spec: AutomationSpec {
            source_ref: SourceReference {
                kind: "GitRepository".into(),
                name: "apps-repo".into(),
            },
            git: Some(GitSpec {
                checkout: checkout.map(|reference| GitCheckoutSpec { reference }),
                commit: CommitSpec {
                    author: CommitUser {
                        name: "Flux".into(),
                        email: "flux@example.com".into(),
                    },
                    message_template: String::new(),
                    signing_key: None,
                },
                push: push.map(|branch| PushSpec {
                    branch: branch.into(),
                }),
            }),
            interval: Duration::from_secs(300),
            update: Some(UpdateSpec {
                strategy: UpdateStrategy::Setters,
                path: Some("./deploy".into()),
            }),
            suspend: false,
        },
        status: AutomationStatus::default(),
    }
}

fn policy(image: &str) -> ImagePolicy {
    ImagePolicy {
        metadata: ObjectMeta::new(NAMESPACE, "app"),
        latest_image: Some(image.into()),
    }
}

/// A reconciler over a store holding `automation`, the source pointing at
/// `upstream` and a policy selecting `app:1.1.0`.
struct Harness {
    reconciler: Reconciler<MemoryStore, SetImage, Recorder>,
    tmp: TempDir,
}

impl Harness {
    fn new(upstream: &Upstream, implementation: &str, automation: ImageUpdateAutomation) -> Self {
        let store = MemoryStore::new();
        store.put_git_repository(git_repository(&upstream.url(), implementation));
        store.put_image_policy(policy("ghcr.io/org/app:1.1.0"));
        store.put_automation(automation);

        let tmp = TempDir::new().unwrap();
        let mut config = ControllerConfig::default();
        config.reconcile.tmp_dir = Some(tmp.path().to_path_buf());

        Self {
            reconciler: Reconciler::new(store, SetImage::default(), Recorder::default(), config),
            tmp,
        }
    }

    fn store(&self) -> &MemoryStore {
        self.reconciler.store()
    }

    async fn reconcile(&self) -> imgauto_core::Result<Action> {
        self.reconciler.reconcile(&key()).await
    }

    async fn automation(&self) -> ImageUpdateAutomation {
        self.store().get_automation(&key()).await.unwrap().unwrap()
    }

    async fn ready(&self) -> (ConditionStatus, Reason, String) {
        let automation = self.automation().await;
        let ready = automation.status.ready().expect("readiness recorded");
        (ready.status, ready.reason, ready.message.clone())
    }

    fn working_dirs_left(&self) -> usize {
        fs::read_dir(self.tmp.path()).unwrap().count()
    }

    fn observer(&self) -> &Recorder {
        self.reconciler.observer()
    }
}

fn signing_secret(name: &str, keyring: &str) -> Secret {
    let mut secret = Secret {
        metadata: ObjectMeta::new(NAMESPACE, name),
        data: std::collections::BTreeMap::new(),
    };
    secret
        .data
        .insert("git.asc".into(), keyring.as_bytes().to_vec());
    secret
}

// === Scenarios ===

#[tokio::test]
async fn test_pushes_update_to_new_branch_with_default_message() {
    let upstream = Upstream::new();
    let main_before = upstream.branch("main");
    let harness = Harness::new(
        &upstream,
        "libgit2",
        automation(Some(branch_ref("main")), Some("flux-updates")),
    );

    let action = harness.reconcile().await.unwrap();

    assert_eq!(action, Action::RequeueAfter(Duration::from_secs(300)));
    let pushed = upstream.branch("flux-updates").expect("branch created");
    assert_eq!(upstream.branch("main"), main_before);
    assert_eq!(
        upstream.file_at("flux-updates", "deploy/app.yaml"),
        "image: ghcr.io/org/app:1.1.0\n"
    );
    assert_eq!(
        upstream.message_at("flux-updates"),
        "Update from image update automation"
    );

    let automation = harness.automation().await;
    assert_eq!(
        automation.status.last_push_commit,
        Some(pushed.to_string())
    );
    assert!(automation.status.last_push_time.is_some());
    assert!(automation.status.last_automation_run_time.is_some());

    let (status, reason, message) = harness.ready().await;
    assert_eq!(status, ConditionStatus::True);
    assert_eq!(reason, Reason::ReconciliationSucceeded);
    assert_eq!(message, format!("committed and pushed {pushed} to flux-updates"));

    let observer = harness.observer();
    assert_eq!(
        *observer.pushes.lock().unwrap(),
        vec![(pushed.to_string(), "flux-updates".to_string())]
    );
    assert!(observer.events.lock().unwrap().contains(&(
        Severity::Info,
        format!("committed and pushed change {pushed} to flux-updates")
    )));
    assert_eq!(harness.working_dirs_left(), 0);
}

#[tokio::test]
async fn test_second_run_makes_no_changes() {
    let upstream = Upstream::new();
    let harness = Harness::new(
        &upstream,
        "libgit2",
        automation(Some(branch_ref("main")), Some("flux-updates")),
    );

    harness.reconcile().await.unwrap();
    let pushed = upstream.branch("flux-updates").unwrap();

    let action = harness.reconcile().await.unwrap();

    assert_eq!(action, Action::RequeueAfter(Duration::from_secs(300)));
    assert_eq!(upstream.branch("flux-updates"), Some(pushed));
    let (status, _, message) = harness.ready().await;
    assert_eq!(status, ConditionStatus::True);
    let short = &pushed.to_string()[..7];
    assert!(
        message.starts_with(&format!("no updates made; last commit {short} at ")),
        "{message}"
    );
    assert_eq!(harness.observer().pushes.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_git_cli_pushes_to_checkout_branch() {
    let upstream = Upstream::new();
    let harness = Harness::new(&upstream, "git-cli", automation(Some(branch_ref("main")), None));

    harness.reconcile().await.unwrap();

    assert_eq!(
        upstream.file_at("main", "deploy/app.yaml"),
        "image: ghcr.io/org/app:1.1.0\n"
    );
    let (status, _, message) = harness.ready().await;
    assert_eq!(status, ConditionStatus::True);
    assert!(message.ends_with(" to main"), "{message}");
}

#[tokio::test]
async fn test_existing_push_branch_is_fetched_and_extended() {
    let upstream = Upstream::new();
    let harness = Harness::new(
        &upstream,
        "git-cli",
        automation(Some(branch_ref("main")), Some("flux-updates")),
    );
    harness.reconcile().await.unwrap();
    let first = upstream.branch("flux-updates").unwrap();

    harness.store().put_image_policy(policy("ghcr.io/org/app:1.2.0"));
    harness.reconcile().await.unwrap();

    let second = upstream.branch("flux-updates").unwrap();
    assert_ne!(first, second);
    let repo = git2::Repository::open_bare(&upstream.path).unwrap();
    let parent = repo.find_commit(second).unwrap().parent_id(0).unwrap();
    assert_eq!(parent, first);
}

#[cfg(unix)]
#[tokio::test]
async fn test_rejected_push_fails_the_run() {
    let upstream = Upstream::new();
    upstream.reject_pushes();
    let harness = Harness::new(
        &upstream,
        "git-cli",
        automation(Some(branch_ref("main")), Some("flux-updates")),
    );

    let err = harness.reconcile().await.unwrap_err();

    let Error::Git(imgauto_git::Error::PushFailed(message)) = &err else {
        panic!("expected a push failure, got {err:?}");
    };
    assert!(message.contains("pre-receive hook declined"), "{message}");
    assert!(upstream.branch("flux-updates").is_none());

    let automation = harness.automation().await;
    assert_eq!(automation.status.last_push_commit, None);
    assert_eq!(automation.status.last_push_time, None);
    let (status, reason, ready_message) = harness.ready().await;
    assert_eq!(status, ConditionStatus::False);
    assert_eq!(reason, Reason::ReconciliationFailed);
    assert_eq!(ready_message, err.to_string());
    assert!(harness.observer().pushes.lock().unwrap().is_empty());
    assert_eq!(harness.working_dirs_left(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_runs_for_different_automations_can_be_spawned() {
    let upstream = Upstream::new();
    let store = MemoryStore::new();
    store.put_git_repository(git_repository(&upstream.url(), "libgit2"));
    store.put_image_policy(policy("ghcr.io/org/app:1.1.0"));
    store.put_automation(automation(Some(branch_ref("main")), Some("flux-updates")));
    let mut other = automation(Some(branch_ref("main")), Some("flux-updates-other"));
    other.metadata = ObjectMeta::new(NAMESPACE, "more-apps");
    store.put_automation(other);

    let tmp = TempDir::new().unwrap();
    let mut config = ControllerConfig::default();
    config.reconcile.tmp_dir = Some(tmp.path().to_path_buf());
    let reconciler = Arc::new(Reconciler::new(
        store,
        SetImage::default(),
        Recorder::default(),
        config,
    ));

    let runs: Vec<_> = ["apps", "more-apps"]
        .into_iter()
        .map(|name| {
            let reconciler = Arc::clone(&reconciler);
            tokio::spawn(async move {
                reconciler
                    .reconcile(&ObjectKey::new(NAMESPACE, name))
                    .await
            })
        })
        .collect();
    for run in runs {
        let action = run.await.unwrap().unwrap();
        assert_eq!(action, Action::RequeueAfter(Duration::from_secs(300)));
    }

    assert!(upstream.branch("flux-updates").is_some());
    assert!(upstream.branch("flux-updates-other").is_some());
    assert_eq!(reconciler.observer().pushes.lock().unwrap().len(), 2);
    assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_suspended_automation_does_nothing() {
    let upstream = Upstream::new();
    let mut suspended = automation(Some(branch_ref("main")), Some("flux-updates"));
    suspended.spec.suspend = true;
    let harness = Harness::new(&upstream, "libgit2", suspended);

    let action = harness.reconcile().await.unwrap();

    assert_eq!(action, Action::AwaitChange);
    assert!(upstream.branch("flux-updates").is_none());
    assert!(harness.automation().await.status.ready().is_none());
    assert_eq!(*harness.observer().suspends.lock().unwrap(), vec![true]);
    assert_eq!(*harness.observer().runs.lock().unwrap(), 0);
}

#[tokio::test]
async fn test_missing_automation_awaits_change() {
    let upstream = Upstream::new();
    let harness = Harness::new(&upstream, "libgit2", automation(Some(branch_ref("main")), None));

    let action = harness
        .reconciler
        .reconcile(&ObjectKey::new(NAMESPACE, "nope"))
        .await
        .unwrap();

    assert_eq!(action, Action::AwaitChange);
}

#[tokio::test]
async fn test_missing_source_waits_for_it() {
    let upstream = Upstream::new();
    let harness = Harness::new(&upstream, "libgit2", automation(Some(branch_ref("main")), None));
    harness
        .store()
        .remove_git_repository(&ObjectKey::new(NAMESPACE, "apps-repo"));

    let action = harness.reconcile().await.unwrap();

    assert_eq!(action, Action::AwaitChange);
    let (status, reason, message) = harness.ready().await;
    assert_eq!(status, ConditionStatus::False);
    assert_eq!(reason, Reason::GitRepositoryNotAvailable);
    assert_eq!(message, "referenced git repository is missing");
}

#[tokio::test]
async fn test_unresolvable_push_branch_fails_before_cloning() {
    let missing = TempDir::new().unwrap();
    let store = MemoryStore::new();
    // cloning this would fail with a different error
    store.put_git_repository(git_repository(
        missing.path().join("nope.git").to_str().unwrap(),
        "libgit2",
    ));
    let tagged = GitRepositoryRef {
        tag: Some("v1.0.0".into()),
        ..GitRepositoryRef::default()
    };
    store.put_automation(automation(Some(tagged), None));
    let reconciler = Reconciler::new(
        store,
        SetImage::default(),
        Recorder::default(),
        ControllerConfig::default(),
    );

    let err = reconciler.reconcile(&key()).await.unwrap_err();

    assert!(matches!(err, Error::PushBranchUnresolved));
    let automation = reconciler.store().get_automation(&key()).await.unwrap().unwrap();
    let ready = automation.status.ready().unwrap();
    assert_eq!(ready.status, ConditionStatus::False);
    assert_eq!(ready.reason, Reason::ReconciliationFailed);
    assert_eq!(ready.message, err.to_string());
}

#[tokio::test]
async fn test_no_strategy_is_a_clean_stop() {
    let upstream = Upstream::new();
    let mut no_update = automation(Some(branch_ref("main")), Some("flux-updates"));
    no_update.spec.update = None;
    let harness = Harness::new(&upstream, "libgit2", no_update);

    let action = harness.reconcile().await.unwrap();

    assert_eq!(action, Action::AwaitChange);
    let (status, reason, message) = harness.ready().await;
    assert_eq!(status, ConditionStatus::False);
    assert_eq!(reason, Reason::NoUpdateStrategy);
    assert_eq!(message, "no known update strategy is given for object");
    assert!(upstream.branch("flux-updates").is_none());
    assert_eq!(harness.working_dirs_left(), 0);
}

#[tokio::test]
async fn test_unsupported_source_kind_fails() {
    let upstream = Upstream::new();
    let mut bucket = automation(Some(branch_ref("main")), None);
    bucket.spec.source_ref.kind = "Bucket".into();
    let harness = Harness::new(&upstream, "libgit2", bucket);

    let err = harness.reconcile().await.unwrap_err();

    assert!(matches!(err, Error::UnsupportedSourceKind(kind) if kind == "Bucket"));
    let (_, reason, message) = harness.ready().await;
    assert_eq!(reason, Reason::ReconciliationFailed);
    assert_eq!(message, "source kind \"Bucket\" not supported");
    assert!(
        harness
            .observer()
            .events
            .lock()
            .unwrap()
            .iter()
            .any(|(severity, _)| *severity == Severity::Error)
    );
}

#[tokio::test]
async fn test_reconcile_request_is_recorded_even_on_failure() {
    let upstream = Upstream::new();
    let mut requested = automation(Some(branch_ref("main")), None);
    requested.spec.git = None;
    requested
        .metadata
        .annotations
        .insert(RECONCILE_REQUEST_ANNOTATION.into(), "2024-05-01T12:00:00Z".into());
    let harness = Harness::new(&upstream, "libgit2", requested);

    let err = harness.reconcile().await.unwrap_err();

    assert!(matches!(err, Error::MissingGitSpec));
    let automation = harness.automation().await;
    assert_eq!(
        automation.status.last_handled_reconcile_at.as_deref(),
        Some("2024-05-01T12:00:00Z")
    );
}

#[tokio::test]
async fn test_unknown_git_implementation_fails() {
    let upstream = Upstream::new();
    let harness = Harness::new(&upstream, "go-git", automation(Some(branch_ref("main")), None));

    let err = harness.reconcile().await.unwrap_err();

    assert!(matches!(err, Error::Git(imgauto_git::Error::UnknownImplementation(_))));
    assert_eq!(harness.working_dirs_left(), 0);
}

#[tokio::test]
async fn test_update_path_is_passed_to_mutator() {
    let upstream = Upstream::new();
    let harness = Harness::new(&upstream, "libgit2", automation(Some(branch_ref("main")), None));

    harness.reconcile().await.unwrap();

    let roots = harness.reconciler.mutator().roots.lock().unwrap().clone();
    assert_eq!(roots.len(), 1);
    assert!(roots[0].ends_with("deploy"), "{}", roots[0].display());
}

#[tokio::test]
async fn test_message_template_sees_updates() {
    let upstream = Upstream::new();
    let mut templated = automation(Some(branch_ref("main")), Some("flux-updates"));
    if let Some(git) = templated.spec.git.as_mut() {
        git.commit.message_template =
            "{{ AutomationObject.Name }}: {{ Updated.Images|join(\", \") }}".into();
    }
    let harness = Harness::new(&upstream, "libgit2", templated);

    harness.reconcile().await.unwrap();

    assert_eq!(
        upstream.message_at("flux-updates"),
        "apps: ghcr.io/org/app:1.1.0"
    );
}

#[tokio::test]
async fn test_commit_is_signed_with_single_key() {
    let upstream = Upstream::new();
    let mut signed = automation(Some(branch_ref("main")), Some("flux-updates"));
    if let Some(git) = signed.spec.git.as_mut() {
        git.commit.signing_key = Some(SigningKeySpec {
            secret_ref: LocalObjectReference {
                name: "signing-key".into(),
            },
        });
    }
    let harness = Harness::new(&upstream, "libgit2", signed);
    harness
        .store()
        .put_secret(signing_secret("signing-key", SINGLE_KEY));

    harness.reconcile().await.unwrap();

    let repo = git2::Repository::open_bare(&upstream.path).unwrap();
    let (signature, _) = repo
        .extract_signature(&upstream.branch("flux-updates").unwrap(), None)
        .unwrap();
    assert!(
        signature
            .as_str()
            .unwrap()
            .starts_with("-----BEGIN PGP SIGNATURE-----")
    );
}

#[tokio::test]
async fn test_ambiguous_signing_key_fails_without_pushing() {
    let upstream = Upstream::new();
    let mut signed = automation(Some(branch_ref("main")), Some("flux-updates"));
    if let Some(git) = signed.spec.git.as_mut() {
        git.commit.signing_key = Some(SigningKeySpec {
            secret_ref: LocalObjectReference {
                name: "signing-key".into(),
            },
        });
    }
    let harness = Harness::new(&upstream, "libgit2", signed);
    harness
        .store()
        .put_secret(signing_secret("signing-key", TWO_KEYS));

    let err = harness.reconcile().await.unwrap_err();

    assert!(matches!(err, Error::MultipleSigningIdentities(_)));
    assert!(upstream.branch("flux-updates").is_none());
    let (_, reason, _) = harness.ready().await;
    assert_eq!(reason, Reason::ReconciliationFailed);
}
