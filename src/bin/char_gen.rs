//! Character generator: country + MBTI type in, a structured character out,
//! optionally chained into a short story about that character.

use clap::Parser;
use console::style;
use persona_forge::core::config;
use persona_forge::{
    ui, ChainError, ChainRunner, Character, CompletionBackend, GroqBackend, PromptTemplate,
    ResponseSchema, StepProfile, StructuredOutputParser,
};

const CHARACTER_SYSTEM: &str = "You are a character generator. You will generate characters based on the country and MBTI type provided.";
const STORY_SYSTEM: &str =
    "You are a storyteller who writes vivid, emotional short stories add emoji too.";

const CHARACTER_TEMPLATE: &str = "Give me the name, age, and characteristics of a character from this country: {{country}} and this MBTI: {{mbti}}.\n{{format_instructions}}";
const STORY_TEMPLATE: &str = "Write a short fictional story about a person named {{name}}, who is {{age}} years old. The story should reflect the following characteristics: {{characteristics}}. Make it engaging, vivid, and emotionally resonant.";

#[derive(Parser)]
#[command(
    name = "char-gen",
    version,
    about = "Generate a character from a country and an MBTI type, then develop a short story"
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
        println!("{}", style("🧙 Character Generator").magenta().bold());
        println!("Generate a character based on Country and MBTI personality type.\n");

        // The story action only works with a character generated earlier in
        // this session.
        let mut session: Option<Character> = None;

        loop {
            let choice = ui::menu(
                "What next?",
                &[
                    "✨ Generate character",
                    "📖 Develop a short story",
                    "♻️ Reset session",
                    "Quit",
                ],
            )
            .map_err(|e| e.to_string())?;

            match choice {
                0 => match generate_character(&backend, &settings.model).await {
                    Ok(character) => {
                        ui::section("Generated Character:", &character.to_string());
                        session = Some(character);
                    }
                    Err(e) => ui::report_error(&e),
                },
                1 => {
                    let Some(character) = session.as_ref() else {
                        ui::warn("Please generate a character first before asking for a story.");
                        continue;
                    };
                    match generate_story(&backend, &settings.model, character).await {
                        Ok(story) => ui::section("Generated Short Story:", &story),
                        Err(e) => ui::report_error(&e),
                    }
                }
                2 => {
                    session = None;
                    ui::warn("Session cleared.");
                }
                _ => break,
            }
        }
        Ok(())
    })
}

fn character_parser() -> StructuredOutputParser {
    StructuredOutputParser::from_response_schemas(vec![
        ResponseSchema::new("name", "The name of the person"),
        ResponseSchema::new("age", "The age of the person"),
        ResponseSchema::new("characteristics", "The person's characteristics"),
    ])
}

async fn generate_character(
    backend: &dyn CompletionBackend,
    model: &str,
) -> Result<Character, ChainError> {
    let country = ui::read_required("🌍 Enter Country")?;
    let mbti = ui::read_required("🧠 Enter MBTI Type (e.g., INTP, ENFJ)")?;

    let parser = character_parser();
    let template = PromptTemplate::new(CHARACTER_TEMPLATE, &["country", "mbti"])
        .with_partial("format_instructions", parser.format_instructions());

    let output = ui::with_spinner(
        "Generating character...",
        ChainRunner::new(backend)
            .vars([("country", country), ("mbti", mbti)])
            .parse_step(
                "character",
                template,
                StepProfile::new(CHARACTER_SYSTEM, model),
                parser,
            )
            .run(),
    )
    .await?;

    Character::from_fields(&output.into_map())
}

async fn generate_story(
    backend: &dyn CompletionBackend,
    model: &str,
    character: &Character,
) -> Result<String, ChainError> {
    let template = PromptTemplate::new(STORY_TEMPLATE, &["name", "age", "characteristics"]);

    let output = ui::with_spinner(
        "Generating story...",
        ChainRunner::new(backend)
            .vars([
                ("name", character.name.clone()),
                ("age", character.age.clone()),
                ("characteristics", character.characteristics.clone()),
            ])
            .step(
                "story",
                template,
                StepProfile::new(STORY_SYSTEM, model).temperature(0.7),
            )
            .run(),
    )
    .await?;

    Ok(output.require("story")?.to_string())
}
