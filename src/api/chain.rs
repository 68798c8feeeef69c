//! Fluent runner for composing formatter → completion → interpreter steps.

use futures::future;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::backend::{CompletionBackend, CompletionRequest};
use super::error::ChainError;
use crate::core::parser::StructuredOutputParser;
use crate::core::template::PromptTemplate;

/// Per-step system instruction and sampling parameters.
///
/// Defaults match the most common settings of the two apps; override per
/// step with the builder methods.
#[derive(Debug, Clone)]
pub struct StepProfile {
    pub system: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
}

impl StepProfile {
    pub fn new(system: &str, model: &str) -> Self {
        Self {
            system: system.to_string(),
            model: model.to_string(),
            temperature: 0.6,
            max_tokens: 4096,
            top_p: 0.95,
        }
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn top_p(mut self, top_p: f32) -> Self {
        self.top_p = top_p;
        self
    }
}

/// One formatter → completion (→ interpreter) pass.
struct ChainStep {
    output_key: String,
    template: PromptTemplate,
    profile: StepProfile,
    parser: Option<StructuredOutputParser>,
}

/// A node in the execution order of a chain.
enum ExecutionNode {
    /// A single, sequential step.
    Step(ChainStep),
    /// Independent steps executed concurrently and joined before the chain
    /// continues.
    Parallel(Vec<ChainStep>),
}

/// Builder for a group of parallel steps.
pub struct ParallelGroupBuilder {
    steps: Vec<ChainStep>,
}

impl ParallelGroupBuilder {
    fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Adds an independent step to the group.
    pub fn step(mut self, output_key: &str, template: PromptTemplate, profile: StepProfile) -> Self {
        self.steps.push(ChainStep {
            output_key: output_key.to_string(),
            template,
            profile,
            parser: None,
        });
        self
    }
}

/// A fluent builder to define and execute a prompt chain.
///
/// Each step renders its template against the accumulated context, issues
/// one completion, and stores the result under its output key, so later
/// steps can reference earlier outputs as template variables.
pub struct ChainRunner<'a> {
    backend: &'a dyn CompletionBackend,
    nodes: Vec<ExecutionNode>,
    vars: HashMap<String, String>,
}

impl<'a> ChainRunner<'a> {
    pub fn new(backend: &'a dyn CompletionBackend) -> Self {
        Self {
            backend,
            nodes: Vec::new(),
            vars: HashMap::new(),
        }
    }

    /// Seeds the chain context with initial variables.
    pub fn vars(
        mut self,
        vars: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>,
    ) -> Self {
        self.vars = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    /// Adds a sequential step whose raw completion text becomes
    /// `{{output_key}}`.
    pub fn step(mut self, output_key: &str, template: PromptTemplate, profile: StepProfile) -> Self {
        self.nodes.push(ExecutionNode::Step(ChainStep {
            output_key: output_key.to_string(),
            template,
            profile,
            parser: None,
        }));
        self
    }

    /// Adds a sequential step whose completion is decomposed by `parser`;
    /// every extracted field lands in the context under its own name, and
    /// the raw text is still stored under `output_key`. A parse failure
    /// aborts the chain.
    pub fn parse_step(
        mut self,
        output_key: &str,
        template: PromptTemplate,
        profile: StepProfile,
        parser: StructuredOutputParser,
    ) -> Self {
        self.nodes.push(ExecutionNode::Step(ChainStep {
            output_key: output_key.to_string(),
            template,
            profile,
            parser: Some(parser),
        }));
        self
    }

    /// Adds a group of steps executed concurrently. The chain resumes only
    /// after every branch has completed; each branch owns its own request
    /// and response and only contributes its output key to the context.
    pub fn parallel<F>(mut self, build_group: F) -> Self
    where
        F: FnOnce(ParallelGroupBuilder) -> ParallelGroupBuilder,
    {
        let group = build_group(ParallelGroupBuilder::new());
        self.nodes.push(ExecutionNode::Parallel(group.steps));
        self
    }

    /// Executes the chain.
    pub async fn run(self) -> Result<ChainOutput, ChainError> {
        let context = Arc::new(Mutex::new(self.vars.clone()));

        for node in &self.nodes {
            match node {
                ExecutionNode::Step(step) => {
                    self.execute_step(step, Arc::clone(&context)).await?;
                }
                ExecutionNode::Parallel(steps) => {
                    let tasks = steps
                        .iter()
                        .map(|step| self.execute_step(step, Arc::clone(&context)))
                        .collect::<Vec<_>>();
                    future::try_join_all(tasks).await?;
                }
            }
        }

        let final_context = Arc::try_unwrap(context).ok().unwrap().into_inner().unwrap();
        Ok(ChainOutput(final_context))
    }

    async fn execute_step(
        &self,
        step: &ChainStep,
        context: Arc<Mutex<HashMap<String, String>>>,
    ) -> Result<(), ChainError> {
        let rendered = {
            let ctx = context.lock().unwrap();
            step.template.format(&ctx)?
        };

        let request = CompletionRequest {
            system: step.profile.system.clone(),
            user: rendered,
            model: step.profile.model.clone(),
            temperature: step.profile.temperature,
            max_tokens: step.profile.max_tokens,
            top_p: step.profile.top_p,
        };

        log::debug!("running chain step '{}'", step.output_key);
        let response = self.backend.complete(&request).await?;

        let parsed = match &step.parser {
            Some(parser) => Some(parser.parse(&response.text)?),
            None => None,
        };

        let mut ctx = context.lock().unwrap();
        if let Some(fields) = parsed {
            for (key, value) in fields {
                ctx.insert(key, value);
            }
        }
        ctx.insert(step.output_key.clone(), response.text);
        Ok(())
    }
}

/// Final context of a chain run: the seed variables plus one entry per step
/// output, plus any structured fields a parse step extracted.
#[derive(Debug, Clone)]
pub struct ChainOutput(HashMap<String, String>);

impl ChainOutput {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(|s| s.as_str())
    }

    /// Like [`get`](ChainOutput::get), but a missing key is an error.
    pub fn require(&self, key: &str) -> Result<&str, ChainError> {
        self.get(key).ok_or_else(|| {
            ChainError::StructureMismatch(format!("chain produced no '{}' output", key))
        })
    }

    pub fn into_map(self) -> HashMap<String, String> {
        self.0
    }
}
