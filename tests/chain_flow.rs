//! Chain behavior against in-memory completion backends: the character →
//! story composition, the parallel join, and the fail-fast credential check.

use async_trait::async_trait;
use persona_forge::{
    ChainError, ChainRunner, Character, CompletionBackend, CompletionRequest, CompletionResponse,
    GroqBackend, PromptTemplate, ResponseSchema, StepProfile, StructuredOutputParser,
};
use std::sync::Mutex;
use std::time::Duration;

const CHARACTER_TEMPLATE: &str = "Give me the name, age, and characteristics of a character from this country: {{country}} and this MBTI: {{mbti}}.\n{{format_instructions}}";
const STORY_TEMPLATE: &str = "Write a short fictional story about a person named {{name}}, who is {{age}} years old. The story should reflect the following characteristics: {{characteristics}}.";

/// Replies with the canned text of the first rule whose needle occurs in the
/// rendered user message, recording every request it sees. `delay_ms`
/// staggers replies so join behavior is observable.
struct ScriptedBackend {
    rules: Vec<(&'static str, &'static str)>,
    delay_ms: u64,
    seen: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedBackend {
    fn new(rules: Vec<(&'static str, &'static str)>) -> Self {
        Self {
            rules,
            delay_ms: 0,
            seen: Mutex::new(Vec::new()),
        }
    }

    fn with_delay(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    fn requests(&self) -> Vec<CompletionRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, ChainError> {
        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }
        self.seen.lock().unwrap().push(request.clone());
        for (needle, reply) in &self.rules {
            if request.user.contains(needle) {
                return Ok(CompletionResponse {
                    text: reply.to_string(),
                });
            }
        }
        Err(ChainError::Completion(format!(
            "no scripted reply for: {}",
            request.user
        )))
    }
}

fn character_parser() -> StructuredOutputParser {
    StructuredOutputParser::from_response_schemas(vec![
        ResponseSchema::new("name", "The name of the person"),
        ResponseSchema::new("age", "The age of the person"),
        ResponseSchema::new("characteristics", "The person's characteristics"),
    ])
}

#[tokio::test]
async fn character_chain_feeds_story_step() {
    let backend = ScriptedBackend::new(vec![
        (
            "MBTI: INTJ",
            "```json\n{\n\t\"name\": \"Aiko\",\n\t\"age\": \"29\",\n\t\"characteristics\": \"curious, reserved\"\n}\n```",
        ),
        (
            "person named Aiko",
            "Aiko walked the quiet streets of Kyoto.",
        ),
    ]);

    let parser = character_parser();
    let character_template = PromptTemplate::new(CHARACTER_TEMPLATE, &["country", "mbti"])
        .with_partial("format_instructions", parser.format_instructions());
    let story_template = PromptTemplate::new(STORY_TEMPLATE, &["name", "age", "characteristics"]);

    let output = ChainRunner::new(&backend)
        .vars([("country", "Japan"), ("mbti", "INTJ")])
        .parse_step(
            "character",
            character_template,
            StepProfile::new("You are a character generator.", "test-model"),
            parser,
        )
        .step(
            "story",
            story_template,
            StepProfile::new("You are a storyteller.", "test-model").temperature(0.7),
        )
        .run()
        .await
        .expect("chain should succeed");

    // The final output is the mocked story text, verbatim.
    assert_eq!(
        output.get("story"),
        Some("Aiko walked the quiet streets of Kyoto.")
    );

    let character = Character::from_fields(&output.clone().into_map()).unwrap();
    assert_eq!(character.name, "Aiko");
    assert_eq!(character.age, "29");
    assert_eq!(character.characteristics, "curious, reserved");

    let seen = backend.requests();
    assert_eq!(seen.len(), 2);
    // First prompt embeds both inputs and the format directions.
    assert!(seen[0].user.contains("country: Japan"));
    assert!(seen[0].user.contains("MBTI: INTJ"));
    assert!(seen[0].user.contains("```json"));
    // Second prompt embeds all three parsed fields.
    assert!(seen[1].user.contains("Aiko"));
    assert!(seen[1].user.contains("29"));
    assert!(seen[1].user.contains("curious, reserved"));
}

#[tokio::test]
async fn parse_failure_aborts_the_chain() {
    let backend = ScriptedBackend::new(vec![
        ("MBTI", "name: Aiko\nage: 29"),
        ("person named", "never reached"),
    ]);

    let parser = character_parser();
    let character_template = PromptTemplate::new(CHARACTER_TEMPLATE, &["country", "mbti"])
        .with_partial("format_instructions", parser.format_instructions());
    let story_template = PromptTemplate::new(STORY_TEMPLATE, &["name", "age", "characteristics"]);

    let err = ChainRunner::new(&backend)
        .vars([("country", "Japan"), ("mbti", "INTJ")])
        .parse_step(
            "character",
            character_template,
            StepProfile::new("You are a character generator.", "test-model"),
            parser,
        )
        .step(
            "story",
            story_template,
            StepProfile::new("You are a storyteller.", "test-model"),
        )
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, ChainError::StructureMismatch(_)));
    // The story step never ran.
    assert_eq!(backend.requests().len(), 1);
}

async fn run_assistant_pair(backend: &ScriptedBackend, input: &str) -> (String, String) {
    let general = PromptTemplate::new("Yo bro, here's the deal with your request: \"{{prompt}}\"", &["prompt"]);
    let summary = PromptTemplate::new(
        "Give a concise summary of the topic \"{{topic}}\" in max 3 key points.",
        &["topic"],
    );

    let output = ChainRunner::new(backend)
        .vars([("prompt", input), ("topic", input)])
        .parallel(|group| {
            group
                .step(
                    "general_response",
                    general,
                    StepProfile::new("Act as a cool assistant.", "test-model"),
                )
                .step(
                    "summary_response",
                    summary,
                    StepProfile::new("Act as a summarizer.", "test-model").max_tokens(512),
                )
        })
        .run()
        .await
        .expect("parallel chain should succeed");

    (
        output.require("general_response").unwrap().to_string(),
        output.require("summary_response").unwrap().to_string(),
    )
}

#[tokio::test]
async fn parallel_join_waits_for_both_branches() {
    let backend = ScriptedBackend::new(vec![
        ("your request", "General: borrow checker explained."),
        ("concise summary", "1. Ownership\n2. Borrowing\n3. Lifetimes"),
    ])
    .with_delay(25);

    let (general, summary) = run_assistant_pair(&backend, "rust ownership").await;

    // Both branches resolved before the join returned.
    assert_eq!(general, "General: borrow checker explained.");
    assert_eq!(summary, "1. Ownership\n2. Borrowing\n3. Lifetimes");
    assert_eq!(backend.requests().len(), 2);
}

#[tokio::test]
async fn parallel_branches_are_independent() {
    let scripted = |general: &'static str| {
        ScriptedBackend::new(vec![
            ("your request", general),
            ("concise summary", "1. Ownership\n2. Borrowing\n3. Lifetimes"),
        ])
    };

    let first = run_assistant_pair(&scripted("all good bro"), "rust ownership").await;
    let second = run_assistant_pair(&scripted("a different answer"), "rust ownership").await;

    // Swapping one branch's response leaves the other field unchanged.
    assert_ne!(first.0, second.0);
    assert_eq!(first.1, second.1);
}

#[test]
fn missing_credential_fails_before_any_call() {
    std::env::remove_var("GROQ_API_KEY");
    let err = GroqBackend::from_env().unwrap_err();
    assert!(matches!(err, ChainError::MissingCredential { .. }));
}
