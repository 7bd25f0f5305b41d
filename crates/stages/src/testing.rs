//! In-memory fakes shared by the stage tests.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use domain::{
    BranchName, CodeRepository, CommitOid, CommitRequest, HostingError, NodeId,
    PullRequestManager, PullRequestRequest, PullRequestUrl, RenderContext, RepositoryDescriptor,
    RepositoryNwo, TemplateError, TemplateRenderer,
};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

pub const HEAD: &str = "0123456789abcdef0123456789abcdef01234567";
pub const COMMIT: &str = "fedcba9876543210fedcba9876543210fedcba98";

/// The scenario repository: public, JavaScript, on `main`.
pub fn repository() -> RepositoryDescriptor {
    RepositoryDescriptor {
        id: NodeId::new("R_kgDOdemo").unwrap(),
        nwo: RepositoryNwo::parse("stoe/demo").unwrap(),
        default_branch: BranchName::new("main").unwrap(),
        is_private: false,
        is_archived: false,
        is_disabled: false,
        is_fork: false,
        primary_language: Some("JavaScript".into()),
        size_kb: 120,
    }
}

// ---------------------------------------------------------------------------
// Hosting fake
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    GetRepository,
    FileExists(String),
    GetBranchHead(String),
    CreateRef(String),
    CreateCommit(CommitRequest),
    CreatePullRequest(PullRequestRequest),
}

impl Call {
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::CreateRef(_) | Self::CreateCommit(_) | Self::CreatePullRequest(_)
        )
    }
}

#[derive(Debug, Clone)]
pub enum Probe {
    Absent,
    Present,
    Fails(HostingError),
}

/// Records every call; refs persist across runs against the same instance.
pub struct FakeHost {
    calls: Mutex<Vec<Call>>,
    refs: Mutex<HashSet<String>>,
    probe: Probe,
    head: Result<CommitOid, HostingError>,
    commit_error: Option<HostingError>,
    pull_request_error: Option<HostingError>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            refs: Mutex::new(HashSet::new()),
            probe: Probe::Absent,
            head: Ok(CommitOid::parse(HEAD).unwrap()),
            commit_error: None,
            pull_request_error: None,
        }
    }

    pub fn with_probe(mut self, probe: Probe) -> Self {
        self.probe = probe;
        self
    }

    pub fn with_head_error(mut self, err: HostingError) -> Self {
        self.head = Err(err);
        self
    }

    pub fn with_commit_error(mut self, err: HostingError) -> Self {
        self.commit_error = Some(err);
        self
    }

    pub fn with_pull_request_error(mut self, err: HostingError) -> Self {
        self.pull_request_error = Some(err);
        self
    }

    pub fn with_existing_ref(self, name: &str) -> Self {
        self.refs.lock().unwrap().insert(name.to_owned());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutation).collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl CodeRepository for FakeHost {
    async fn get_repository(
        &self,
        _nwo: &RepositoryNwo,
    ) -> Result<RepositoryDescriptor, HostingError> {
        self.record(Call::GetRepository);
        Ok(repository())
    }

    async fn file_exists(&self, _nwo: &RepositoryNwo, path: &str) -> Result<bool, HostingError> {
        self.record(Call::FileExists(path.to_owned()));
        match &self.probe {
            Probe::Absent => Ok(false),
            Probe::Present => Ok(true),
            Probe::Fails(err) => Err(err.clone()),
        }
    }

    async fn get_branch_head(
        &self,
        _nwo: &RepositoryNwo,
        branch: &BranchName,
    ) -> Result<CommitOid, HostingError> {
        self.record(Call::GetBranchHead(branch.to_string()));
        self.head.clone()
    }

    async fn create_ref(
        &self,
        _repository_id: &NodeId,
        branch: &BranchName,
        _oid: &CommitOid,
    ) -> Result<(), HostingError> {
        let name = branch.qualified();
        self.record(Call::CreateRef(name.clone()));
        if !self.refs.lock().unwrap().insert(name.clone()) {
            return Err(HostingError::GraphQl {
                errors: vec![format!(
                    "A ref named \"{name}\" already exists in the repository."
                )],
            });
        }
        Ok(())
    }

    async fn create_commit_on_branch(
        &self,
        request: &CommitRequest,
    ) -> Result<CommitOid, HostingError> {
        self.record(Call::CreateCommit(request.clone()));
        match &self.commit_error {
            Some(err) => Err(err.clone()),
            None => Ok(CommitOid::parse(COMMIT).unwrap()),
        }
    }
}

#[async_trait]
impl PullRequestManager for FakeHost {
    async fn create_pull_request(
        &self,
        request: &PullRequestRequest,
    ) -> Result<PullRequestUrl, HostingError> {
        self.record(Call::CreatePullRequest(request.clone()));
        match &self.pull_request_error {
            Some(err) => Err(err.clone()),
            None => Ok(PullRequestUrl::new("https://github.com/stoe/demo/pull/1").unwrap()),
        }
    }
}

// ---------------------------------------------------------------------------
// Template stub
// ---------------------------------------------------------------------------

/// Renders `name=<template> private=<bool>`; fails for one chosen template.
#[derive(Default)]
pub struct StubTemplates {
    pub failing: Option<&'static str>,
}

impl TemplateRenderer for StubTemplates {
    fn render(&self, name: &str, context: &RenderContext) -> Result<String, TemplateError> {
        if self.failing == Some(name) {
            return Err(TemplateError::Syntax {
                line: 1,
                message: "unclosed 'if isPrivate' block".into(),
            });
        }
        Ok(format!("name={name} private={}\n", context.is_private))
    }
}

// ---------------------------------------------------------------------------
// Log capture
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: Level,
    pub fields: BTreeMap<String, String>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn message(&self) -> &str {
        self.field("message").unwrap_or_default()
    }
}

struct FieldVisitor<'a>(&'a mut BTreeMap<String, String>);

impl Visit for FieldVisitor<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_owned(), value.to_owned());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.0.insert(field.name().to_owned(), format!("{value:?}"));
    }
}

#[derive(Clone, Default)]
struct CaptureLayer(Arc<Mutex<Vec<CapturedEvent>>>);

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        // Only events from this crate; adapters and dependencies are out of scope.
        if !event.metadata().target().starts_with("stages") {
            return;
        }
        let mut fields = BTreeMap::new();
        event.record(&mut FieldVisitor(&mut fields));
        self.0.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            fields,
        });
    }
}

/// Captures events on the current thread until dropped.
pub struct LogCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
    _guard: tracing::subscriber::DefaultGuard,
}

impl LogCapture {
    /// Every captured event at `INFO` or more severe.
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.level <= Level::INFO)
            .cloned()
            .collect()
    }
}

pub fn capture_logs() -> LogCapture {
    let layer = CaptureLayer::default();
    let events = Arc::clone(&layer.0);
    let subscriber = tracing_subscriber::registry().with(layer);
    LogCapture {
        events,
        _guard: tracing::subscriber::set_default(subscriber),
    }
}
