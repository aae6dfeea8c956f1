//! The `gabarito init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create gabarito.toml
    if std::path::Path::new("gabarito.toml").exists() {
        println!("gabarito.toml already exists, skipping.");
    } else {
        std::fs::write("gabarito.toml", SAMPLE_CONFIG)?;
        println!("Created gabarito.toml");
    }

    // Create example exam
    std::fs::create_dir_all("provas")?;
    let example_path = std::path::Path::new("provas/exemplo.toml");
    if example_path.exists() {
        println!("provas/exemplo.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_EXAM)?;
        println!("Created provas/exemplo.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit gabarito.toml with your API key");
    println!("  2. Run: gabarito validate --exam provas/exemplo.toml");
    println!("  3. Run: gabarito save --exam provas/exemplo.toml");
    println!("  4. Run: gabarito print --exam provas/exemplo.toml");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# gabarito configuration

default_provider = "gemini"
default_model = "gemini-3-pro-image-preview"
store_path = "./gabarito-exams.json"
output_dir = "./gabarito-output"

[providers.gemini]
type = "gemini"
api_key = "${GEMINI_API_KEY}"

[providers.anthropic]
type = "anthropic"
api_key = "${ANTHROPIC_API_KEY}"
"#;

const EXAMPLE_EXAM: &str = r#"[exam]
title = "Prova de Exemplo"

[exam.header]
school_name = "Escola Modelo"
teacher_name = "Prof(a). Nome"
subject = "Matemática"
grade = "9º A"
instructions = "Utilize caneta azul ou preta. Preencha apenas uma alternativa por questão."

[[questions]]
text = "Quanto é 2 + 2?"
options = ["3", "4", "5", "6"]
correct_answer = "B"
points = 1.0

[[questions]]
text = "Qual é a capital do Brasil?"
options = ["Rio de Janeiro", "São Paulo", "Brasília", "Salvador"]
correct_answer = "C"
points = 1.0
"#;
