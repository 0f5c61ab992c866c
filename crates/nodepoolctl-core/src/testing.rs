//! Scripted in-memory [`ContainerEngineApi`] for unit tests

use crate::api::*;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// One scripted answer to a work request status query
#[derive(Debug, Clone)]
pub enum PollStep {
    Status(WorkRequest),
    /// Answer with a service error of this HTTP status
    Error(u16),
    /// Never answer
    Hang,
}

impl PollStep {
    pub fn status(status: WorkRequestStatus) -> Self {
        PollStep::Status(work_request(status, Vec::new()))
    }
}

pub fn work_request(status: WorkRequestStatus, resources: Vec<WorkRequestResource>) -> WorkRequest {
    WorkRequest {
        id: "wr-1".to_string(),
        operation_type: None,
        status,
        compartment_id: None,
        resources,
        time_accepted: None,
        time_started: None,
        time_finished: None,
    }
}

pub fn resource(action: ActionType, entity_type: &str, identifier: &str) -> WorkRequestResource {
    WorkRequestResource {
        entity_type: entity_type.to_string(),
        action_type: action,
        identifier: identifier.to_string(),
        entity_uri: None,
    }
}

pub fn summary(id: &str, name: &str) -> NodePoolSummary {
    NodePoolSummary {
        id: id.to_string(),
        name: name.to_string(),
        cluster_id: None,
        compartment_id: None,
        kubernetes_version: None,
        node_shape: None,
        subnet_ids: Vec::new(),
        quantity_per_subnet: None,
        lifecycle_state: None,
    }
}

pub fn node(id: &str, state: NodeLifecycleState) -> Node {
    Node {
        id: id.to_string(),
        name: None,
        availability_domain: None,
        subnet_id: None,
        private_ip: None,
        public_ip: None,
        lifecycle_state: state,
        lifecycle_details: None,
    }
}

pub fn node_pool(id: &str, subnets: usize, quantity: u32, nodes: Vec<Node>) -> NodePool {
    NodePool {
        id: id.to_string(),
        name: format!("{id}-name"),
        cluster_id: None,
        compartment_id: None,
        kubernetes_version: None,
        node_image_name: None,
        node_shape: None,
        subnet_ids: (0..subnets).map(|i| format!("subnet-{i}")).collect(),
        quantity_per_subnet: Some(quantity),
        node_config_details: None,
        initial_node_labels: Vec::new(),
        nodes,
        lifecycle_state: None,
    }
}

/// Fake engine whose answers are scripted by the test
#[derive(Default)]
pub struct FakeEngine {
    steps: Mutex<VecDeque<PollStep>>,
    polls: AtomicUsize,
    errors: Mutex<Vec<WorkRequestError>>,
    errors_hang: AtomicBool,
    pages: Mutex<HashMap<Option<String>, Result<Page<NodePoolSummary>, u16>>>,
    list_calls: Mutex<Vec<(NodePoolFilter, Option<String>)>>,
    pools: Mutex<HashMap<String, NodePool>>,
    options: Mutex<HashMap<String, NodePoolOptions>>,
    submitted: Mutex<Vec<String>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Status answers in order; the last one repeats forever
    pub fn script_work_request(&self, steps: impl IntoIterator<Item = PollStep>) {
        *self.steps.lock().unwrap() = steps.into_iter().collect();
    }

    /// Make the error listing never answer
    pub fn hang_error_listing(&self) {
        self.errors_hang.store(true, Ordering::SeqCst);
    }

    pub fn set_work_request_errors(&self, errors: Vec<WorkRequestError>) {
        *self.errors.lock().unwrap() = errors;
    }

    /// Page returned for a given cursor (`None` is the first page)
    pub fn set_page(&self, cursor: Option<&str>, page: Page<NodePoolSummary>) {
        self.pages
            .lock()
            .unwrap()
            .insert(cursor.map(str::to_string), Ok(page));
    }

    pub fn fail_page(&self, cursor: Option<&str>, status: u16) {
        self.pages
            .lock()
            .unwrap()
            .insert(cursor.map(str::to_string), Err(status));
    }

    pub fn insert_pool(&self, pool: NodePool) {
        self.pools.lock().unwrap().insert(pool.id.clone(), pool);
    }

    pub fn set_options(&self, option_id: &str, options: NodePoolOptions) {
        self.options
            .lock()
            .unwrap()
            .insert(option_id.to_string(), options);
    }

    pub fn poll_count(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }

    pub fn list_calls(&self) -> Vec<(NodePoolFilter, Option<String>)> {
        self.list_calls.lock().unwrap().clone()
    }

    /// Mutating calls received, as `"create:<name>"`, `"update:<id>"`, `"delete:<id>"`
    pub fn submitted(&self) -> Vec<String> {
        self.submitted.lock().unwrap().clone()
    }

    fn submit(&self, call: String) -> Result<WorkRequestId, ApiError> {
        self.submitted.lock().unwrap().push(call);
        Ok(WorkRequestId::new("wr-1").unwrap())
    }
}

fn not_found(what: &str) -> ApiError {
    ApiError::service(404, "NotAuthorizedOrNotFound", format!("{what} not found"))
}

#[async_trait]
impl ContainerEngineApi for FakeEngine {
    async fn create_node_pool(
        &self,
        details: &CreateNodePoolDetails,
    ) -> Result<WorkRequestId, ApiError> {
        self.submit(format!("create:{}", details.name))
    }

    async fn update_node_pool(
        &self,
        node_pool_id: &str,
        _details: &UpdateNodePoolDetails,
    ) -> Result<WorkRequestId, ApiError> {
        self.submit(format!("update:{node_pool_id}"))
    }

    async fn delete_node_pool(&self, node_pool_id: &str) -> Result<WorkRequestId, ApiError> {
        self.submit(format!("delete:{node_pool_id}"))
    }

    async fn get_node_pool(&self, node_pool_id: &str) -> Result<NodePool, ApiError> {
        self.pools
            .lock()
            .unwrap()
            .get(node_pool_id)
            .cloned()
            .ok_or_else(|| not_found(node_pool_id))
    }

    async fn list_node_pools(
        &self,
        filter: &NodePoolFilter,
        cursor: Option<&str>,
    ) -> Result<Page<NodePoolSummary>, ApiError> {
        self.list_calls
            .lock()
            .unwrap()
            .push((filter.clone(), cursor.map(str::to_string)));

        match self.pages.lock().unwrap().get(&cursor.map(str::to_string)) {
            Some(Ok(page)) => Ok(page.clone()),
            Some(Err(status)) => Err(ApiError::service(*status, "Scripted", "scripted failure")),
            None => Ok(Page::last(Vec::new())),
        }
    }

    async fn get_work_request(&self, _id: &WorkRequestId) -> Result<WorkRequest, ApiError> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        let step = {
            let mut steps = self.steps.lock().unwrap();
            if steps.len() > 1 {
                steps.pop_front()
            } else {
                steps.front().cloned()
            }
        };

        match step {
            Some(PollStep::Status(wr)) => Ok(wr),
            Some(PollStep::Error(status)) => {
                Err(ApiError::service(status, "Scripted", "scripted failure"))
            }
            Some(PollStep::Hang) => std::future::pending().await,
            None => Err(not_found("work request")),
        }
    }

    async fn list_work_request_errors(
        &self,
        _id: &WorkRequestId,
    ) -> Result<Vec<WorkRequestError>, ApiError> {
        if self.errors_hang.load(Ordering::SeqCst) {
            return std::future::pending().await;
        }
        Ok(self.errors.lock().unwrap().clone())
    }

    async fn get_node_pool_options(&self, option_id: &str) -> Result<NodePoolOptions, ApiError> {
        self.options
            .lock()
            .unwrap()
            .get(option_id)
            .cloned()
            .ok_or_else(|| not_found(option_id))
    }
}
