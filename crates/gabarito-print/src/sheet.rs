//! Exam sheet and answer-grid HTML generator.
//!
//! Produces a single self-contained A4 page with all CSS inlined: bordered
//! school header, numbered questions, then the detachable answer-mark grid
//! below a dashed cut line. In answer-key mode the correct circle of each
//! row is filled and the sheet is labeled as the key.

use anyhow::Result;
use std::path::Path;

use gabarito_core::model::{option_letter, Exam};

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate the printable HTML for an exam.
///
/// `answer_key` switches to the teacher's copy: correct options are
/// highlighted and the grid circles for the correct letters are filled.
pub fn render_exam(exam: &Exam, answer_key: bool) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"pt-BR\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str(&format!(
        "<title>{}{}</title>\n",
        html_escape(&exam.title),
        if answer_key { " — Gabarito Oficial" } else { "" }
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n</head>\n<body>\n<div class=\"page\">\n");

    render_header(&mut html, exam, answer_key);
    render_questions(&mut html, exam, answer_key);
    render_answer_grid(&mut html, exam, answer_key);

    html.push_str("</div>\n</body>\n</html>");
    html
}

/// Write the printable HTML to a file.
pub fn write_exam_html(exam: &Exam, answer_key: bool, path: &Path) -> Result<()> {
    let html = render_exam(exam, answer_key);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    Ok(())
}

fn render_header(html: &mut String, exam: &Exam, answer_key: bool) {
    let header = &exam.header;

    html.push_str("<div class=\"exam-header\">\n");
    html.push_str("<div class=\"school\">\n");
    if let Some(logo) = &header.logo_url {
        html.push_str(&format!(
            "<img class=\"logo\" src=\"{}\" alt=\"logo\">\n",
            html_escape(logo)
        ));
    }
    let school = if header.school_name.is_empty() {
        "ESCOLA MODELO"
    } else {
        &header.school_name
    };
    html.push_str(&format!("<h1>{}</h1>\n", html_escape(school)));
    if answer_key {
        html.push_str("<div class=\"key-banner\">GABARITO OFICIAL</div>\n");
    }
    html.push_str("</div>\n");

    html.push_str("<div class=\"ident\">\n<div class=\"fields\">\n");
    html.push_str("<div class=\"row\"><strong>Aluno(a):</strong> <span class=\"blank\"></span></div>\n");
    html.push_str(&format!(
        "<div class=\"row split\"><span><strong>Prof:</strong> {}</span><span><strong>Disciplina:</strong> {}</span><span><strong>Turma:</strong> {}</span><span><strong>Data:</strong> {}</span></div>\n",
        html_escape(&header.teacher_name),
        html_escape(&header.subject),
        html_escape(&header.grade),
        html_escape(&header.date),
    ));
    html.push_str("</div>\n");
    html.push_str("<div class=\"grade-box\"><span>NOTA</span><div class=\"box\"></div></div>\n");
    html.push_str("</div>\n");

    let instructions = if header.instructions.is_empty() {
        "Utilize caneta azul ou preta. Não rasure o gabarito."
    } else {
        &header.instructions
    };
    html.push_str(&format!(
        "<div class=\"instructions\"><strong>Instruções:</strong> {}</div>\n",
        html_escape(instructions)
    ));
    html.push_str("</div>\n");
}

fn render_questions(html: &mut String, exam: &Exam, answer_key: bool) {
    html.push_str("<div class=\"questions\">\n");
    for (i, q) in exam.questions.iter().enumerate() {
        html.push_str("<div class=\"question\">\n");
        html.push_str(&format!(
            "<div class=\"stem\"><span class=\"number\">{}.</span><p>{}</p><span class=\"points\">({} pts)</span></div>\n",
            i + 1,
            html_escape(&q.text),
            q.points,
        ));
        if let Some(image) = &q.image_url {
            html.push_str(&format!(
                "<img class=\"illustration\" src=\"{}\" alt=\"questão {}\">\n",
                html_escape(image),
                i + 1
            ));
        }
        html.push_str("<div class=\"options\">\n");
        for (oi, option) in q.options.iter().enumerate() {
            let letter = option_letter(oi);
            let marked = answer_key && letter == q.correct_answer.to_ascii_uppercase();
            html.push_str(&format!(
                "<div class=\"option{}\"><strong>{}</strong>) {}</div>\n",
                if marked { " correct" } else { "" },
                letter,
                html_escape(option),
            ));
        }
        html.push_str("</div>\n</div>\n");
    }
    html.push_str("</div>\n");
}

fn render_answer_grid(html: &mut String, exam: &Exam, answer_key: bool) {
    let letters = exam.choice_letters();

    html.push_str("<div class=\"cut-line\"></div>\n");
    html.push_str("<div class=\"answer-grid\">\n");
    html.push_str("<h3>FOLHA DE RESPOSTAS (GABARITO)</h3>\n");
    html.push_str("<div class=\"ident-row\"><span>Aluno: <span class=\"blank\"></span></span><span>Turma: <span class=\"blank short\"></span></span></div>\n");
    html.push_str("<div class=\"grid\">\n");

    for (i, q) in exam.questions.iter().enumerate() {
        html.push_str(&format!(
            "<div class=\"grid-row\"><span class=\"number\">{}.</span>",
            i + 1
        ));
        for &letter in &letters {
            // Letters beyond this question's own options still print so the
            // grid stays rectangular; they are never the correct answer.
            let filled = answer_key && letter == q.correct_answer.to_ascii_uppercase();
            html.push_str(&format!(
                "<span class=\"bubble{}\">{}</span>",
                if filled { " filled" } else { "" },
                letter
            ));
        }
        html.push_str("</div>\n");
    }

    html.push_str("</div>\n");
    html.push_str(
        "<p class=\"hint\">Preencha completamente a bolinha da alternativa correta.</p>\n",
    );
    html.push_str("</div>\n");
}

const CSS: &str = r#"
@page { size: A4; margin: 10mm; }
body { font-family: Georgia, 'Times New Roman', serif; color: #000; margin: 0; }
.page { max-width: 190mm; margin: 0 auto; padding: 8mm; }
.exam-header { border: 2px solid #000; margin-bottom: 8mm; }
.exam-header .school { text-align: center; border-bottom: 2px solid #000; padding: 4mm; }
.exam-header h1 { margin: 0; font-size: 16pt; text-transform: uppercase; letter-spacing: 1px; }
.logo { max-height: 18mm; display: block; margin: 0 auto 2mm; }
.key-banner { font-weight: bold; color: #b91c1c; margin-top: 2mm; }
.ident { display: flex; }
.ident .fields { flex: 1; border-right: 1px solid #000; padding: 2mm; font-size: 10pt; }
.ident .row { margin-bottom: 1.5mm; }
.ident .split { display: flex; justify-content: space-between; gap: 4mm; }
.blank { display: inline-block; border-bottom: 1px solid #000; min-width: 60mm; }
.blank.short { min-width: 15mm; }
.grade-box { width: 22mm; display: flex; flex-direction: column; align-items: center; justify-content: center; font-weight: bold; padding: 2mm; }
.grade-box .box { border: 1px solid #000; width: 16mm; height: 8mm; margin-top: 1mm; }
.instructions { border-top: 1px solid #000; padding: 2mm; font-size: 9pt; }
.questions { line-height: 1.5; }
.question { margin-bottom: 6mm; break-inside: avoid; }
.stem { display: flex; gap: 2mm; }
.stem .number { font-weight: bold; font-size: 12pt; }
.stem p { flex: 1; margin: 0; text-align: justify; white-space: pre-wrap; }
.stem .points { font-size: 8pt; font-weight: bold; }
.illustration { max-height: 50mm; margin: 2mm 0; border: 1px solid #999; }
.options { margin-left: 6mm; font-size: 10pt; }
.option.correct { font-weight: bold; text-decoration: underline; }
.cut-line { border-top: 2px dashed #666; margin: 10mm 0 6mm; }
.answer-grid { border: 2px solid #000; border-radius: 3mm; padding: 4mm; max-width: 130mm; margin: 0 auto; break-inside: avoid; }
.answer-grid h3 { text-align: center; font-size: 10pt; border-bottom: 1px solid #000; padding-bottom: 2mm; margin: 0 0 3mm; }
.ident-row { display: flex; justify-content: space-between; font-size: 9pt; margin-bottom: 3mm; }
.grid { display: grid; grid-template-columns: 1fr 1fr; column-gap: 8mm; row-gap: 1.5mm; }
.grid-row { display: flex; align-items: center; gap: 2.5mm; border-bottom: 1px solid #ddd; padding-bottom: 1mm; }
.grid-row .number { font-weight: bold; width: 6mm; text-align: right; }
.bubble { width: 4.5mm; height: 4.5mm; border: 1px solid #000; border-radius: 50%; font-size: 6pt; font-weight: bold; display: inline-flex; align-items: center; justify-content: center; }
.bubble.filled { background: #000; color: #fff; }
.hint { text-align: center; font-size: 7pt; color: #555; margin: 3mm 0 0; }
"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_exam() -> Exam {
        let mut exam = Exam::new("Prova de Matemática");
        exam.header.school_name = "Escola Modelo".into();
        exam.header.teacher_name = "Prof. Carlos".into();
        exam.header.grade = "9º A".into();

        let q = exam.add_question();
        q.text = "Quanto é 2 + 2?".into();
        q.options = vec!["3".into(), "4".into(), "5".into(), "6".into()];
        q.correct_answer = 'B';
        q.points = 2.0;

        let q = exam.add_question();
        q.text = "Capital do Brasil?".into();
        q.options = vec!["Rio".into(), "Brasília".into(), "Salvador".into()];
        q.correct_answer = 'B';
        exam
    }

    #[test]
    fn sheet_contains_header_questions_and_grid() {
        let html = render_exam(&sample_exam(), false);
        assert!(html.contains("ESCOLA MODELO") || html.contains("Escola Modelo"));
        assert!(html.contains("Prof. Carlos"));
        assert!(html.contains("Quanto é 2 + 2?"));
        assert!(html.contains("(2 pts)"));
        assert!(html.contains("FOLHA DE RESPOSTAS"));
        // Two grid rows, four bubbles each (widest question has 4 options).
        assert_eq!(html.matches("class=\"grid-row\"").count(), 2);
        assert_eq!(html.matches("class=\"bubble\"").count(), 8);
    }

    #[test]
    fn plain_sheet_has_no_key_markings() {
        let html = render_exam(&sample_exam(), false);
        assert!(!html.contains("bubble filled"));
        assert!(!html.contains("option correct"));
        assert!(!html.contains("GABARITO OFICIAL"));
    }

    #[test]
    fn answer_key_marks_correct_letters() {
        let html = render_exam(&sample_exam(), true);
        assert!(html.contains("GABARITO OFICIAL"));
        assert_eq!(html.matches("bubble filled").count(), 2);
        assert_eq!(html.matches("option correct").count(), 2);
    }

    #[test]
    fn user_strings_are_escaped() {
        let mut exam = sample_exam();
        exam.questions[0].text = "1 < 2 & <script>alert('x')</script>".into();
        let html = render_exam(&exam, false);
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn embedded_images_are_rendered() {
        let mut exam = sample_exam();
        exam.questions[0].image_url = Some("data:image/png;base64,AAAA".into());
        exam.header.logo_url = Some("data:image/png;base64,BBBB".into());
        let html = render_exam(&exam, false);
        assert!(html.contains("data:image/png;base64,AAAA"));
        assert!(html.contains("class=\"logo\""));
    }

    #[test]
    fn write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prova.html");
        write_exam_html(&sample_exam(), false, &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<html"));
    }
}
