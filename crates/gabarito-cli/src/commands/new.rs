//! The `gabarito new` command.

use std::path::PathBuf;

use anyhow::Result;

use super::slugify;

pub fn execute(title: String, output: Option<PathBuf>) -> Result<()> {
    let path = output.unwrap_or_else(|| PathBuf::from(format!("provas/{}.toml", slugify(&title))));
    anyhow::ensure!(
        !path.exists(),
        "{} already exists, refusing to overwrite",
        path.display()
    );

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let date = chrono::Utc::now().format("%Y-%m-%d");
    let content = format!(
        r#"[exam]
title = "{title}"

[exam.header]
school_name = ""
teacher_name = ""
subject = ""
grade = ""
date = "{date}"
instructions = "Utilize caneta azul ou preta. Preencha apenas uma alternativa por questão."

[[questions]]
text = ""
options = ["", "", "", ""]
correct_answer = "A"
points = 1.0
"#,
        title = title.replace('"', "\\\""),
    );

    std::fs::write(&path, content)?;
    println!("Created {}", path.display());
    println!("Edit the file, then: gabarito save --exam {}", path.display());

    Ok(())
}
