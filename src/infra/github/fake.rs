//! In-process fake transport for tests that do not need HTTP.
//!
//! The fake answers every request through a caller-supplied handler and
//! records each call so tests can assert how many pages were fetched or
//! how many mutations were issued.

use std::sync::Mutex;

use super::client::GraphQLTransport;
use super::error::Result;

type Handler = dyn Fn(&str, &serde_json::Value) -> Result<serde_json::Value> + Send + Sync;

/// A request observed by [`FakeTransport`].
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub query: String,
    pub variables: serde_json::Value,
}

impl RecordedCall {
    pub fn is_mutation(&self) -> bool {
        self.query.trim_start().starts_with("mutation")
    }
}

pub struct FakeTransport {
    handler: Box<Handler>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl FakeTransport {
    pub fn new(
        handler: impl Fn(&str, &serde_json::Value) -> Result<serde_json::Value> + Send + Sync + 'static,
    ) -> Self {
        Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn query_count(&self) -> usize {
        self.calls().iter().filter(|c| !c.is_mutation()).count()
    }

    pub fn mutation_count(&self) -> usize {
        self.calls().iter().filter(|c| c.is_mutation()).count()
    }

    /// Thread ids passed to the resolve mutation, in call order.
    pub fn mutated_thread_ids(&self) -> Vec<String> {
        self.calls()
            .iter()
            .filter(|c| c.is_mutation())
            .filter_map(|c| c.variables["threadId"].as_str().map(str::to_string))
            .collect()
    }
}

#[async_trait::async_trait]
impl GraphQLTransport for FakeTransport {
    async fn execute(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<serde_json::Value> {
        self.calls.lock().unwrap().push(RecordedCall {
            query: query.to_string(),
            variables: variables.clone(),
        });
        (self.handler)(query, &variables)
    }
}
