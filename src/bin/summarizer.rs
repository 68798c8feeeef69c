//! Cool-assistant summarizer: one prompt in, two pipelines out. A general
//! response and a topic summary are generated concurrently and shown together.

use clap::Parser;
use console::style;
use persona_forge::core::config;
use persona_forge::{
    ui, ChainError, ChainRunner, CompletionBackend, GroqBackend, PromptTemplate, StepProfile,
};

const GENERAL_SYSTEM: &str = "Act as a cool assistant with point-by-point info.";
const SUMMARY_SYSTEM: &str = "Act as a cool assistant summarizing topics in a point-by-point format.";

const GENERAL_TEMPLATE: &str = "Yo bro, here's the deal with your request: \"{{prompt}}\"";
const SUMMARY_TEMPLATE: &str = "Give a concise summary of the topic \"{{topic}}\" in a cool, point-by-point format. Keep it short, snappy, and max 3 key points.";

#[derive(Parser)]
#[command(
    name = "summarizer",
    version,
    about = "Blazing-fast responses from a cool assistant: general answer plus topic summary"
)]
struct Cli;

fn main() {
    if let Err(e) = run() {
        eprintln!("• {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    Cli::parse();
    env_logger::init();

    let settings = config::load().map_err(|e| e.to_string())?;
    let backend = GroqBackend::new(&settings);

    let rt = tokio::runtime::Runtime::new().map_err(|e| e.to_string())?;
    rt.block_on(async {
        println!("{}", style("Mrs. Cool Assistant 😎").magenta().bold());
        println!("Get blazing-fast responses from a cool AI assistant. Type 'exit' to leave.\n");

        loop {
            let input = ui::read_required("💬 You").map_err(|e| e.to_string())?;
            if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
                break;
            }

            match respond(&backend, &settings.model, &input).await {
                Ok(reply) => {
                    ui::section("General Response:", &reply.general);
                    ui::section("Topic Summary:", &reply.summary);
                }
                Err(e) => ui::report_error(&e),
            }
        }
        Ok(())
    })
}

/// The joined result of the two concurrent pipelines.
struct AssistantReply {
    general: String,
    summary: String,
}

async fn respond(
    backend: &dyn CompletionBackend,
    model: &str,
    input: &str,
) -> Result<AssistantReply, ChainError> {
    let general = PromptTemplate::new(GENERAL_TEMPLATE, &["prompt"]);
    let summary = PromptTemplate::new(SUMMARY_TEMPLATE, &["topic"]);

    let output = ui::with_spinner(
        "YOY I AM COOKING...",
        ChainRunner::new(backend)
            .vars([("prompt", input), ("topic", input)])
            .parallel(|group| {
                group
                    .step(
                        "general_response",
                        general,
                        StepProfile::new(GENERAL_SYSTEM, model),
                    )
                    .step(
                        "summary_response",
                        summary,
                        StepProfile::new(SUMMARY_SYSTEM, model).max_tokens(512),
                    )
            })
            .run(),
    )
    .await?;

    Ok(AssistantReply {
        general: output.require("general_response")?.to_string(),
        summary: output.require("summary_response")?.to_string(),
    })
}
