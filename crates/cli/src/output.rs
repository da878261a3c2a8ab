//! Terminal output

use colored::Colorize;
use formai_ai::GeneratedForm;
use formai_model::{FormElement, FormRecord};

/// One numbered line per element: `1. Label (type) *`
pub fn element_line(index: usize, element: &FormElement) -> String {
    let mut line = format!("{}. {} ({})", index + 1, element.label, element.element_type);
    if element.required {
        line.push_str(" *");
    }
    line
}

/// Plain-text rendering of a form
pub fn render_form(form: &FormRecord) -> Vec<String> {
    let mut lines = vec![form.display_title().to_string()];
    if let Some(description) = form.description.as_deref().filter(|d| !d.is_empty()) {
        lines.push(description.to_string());
    }
    lines.push(String::new());

    if form.elements.is_empty() {
        lines.push("(no elements)".to_string());
    }
    for (index, element) in form.elements.iter().enumerate() {
        lines.push(element_line(index, element));
        if element.element_type.has_options() {
            lines.push(format!("   options: {}", element.option_list().join(", ")));
        }
    }
    lines
}

pub fn print_form(form: &FormRecord) {
    let lines = render_form(form);
    let mut lines = lines.iter();
    if let Some(title) = lines.next() {
        println!("{}", title.bold());
    }
    for line in lines {
        if line.starts_with("   ") {
            println!("{}", line.dimmed());
        } else {
            println!("{}", line);
        }
    }
    println!();
    println!(
        "{} elements, {} required",
        form.element_count(),
        form.required_count()
    );
}

pub fn print_generation_summary(form: &GeneratedForm, model: &str) {
    println!(
        "{} Generated '{}' with {}",
        "✓".green().bold(),
        form.title.bold(),
        model
    );
    if !form.estimated_time.is_empty() {
        println!("  Estimated time: {}", form.estimated_time);
    }
    println!(
        "  {} ms, {} tokens",
        form.generation_time_ms, form.tokens_used
    );
}

pub fn success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

pub fn failure(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use formai_core::ElementType;

    #[test]
    fn test_element_line() {
        let element = FormElement::new("a", ElementType::Email)
            .with_label("Email")
            .required();
        assert_eq!(element_line(0, &element), "1. Email (email) *");

        let optional = FormElement::new("b", ElementType::Textarea).with_label("Notes");
        assert_eq!(element_line(4, &optional), "5. Notes (textarea)");
    }

    #[test]
    fn test_render_form() {
        let form = FormRecord::new("")
            .with_description("Tell us")
            .with_elements(vec![
                FormElement::new("a", ElementType::Radio)
                    .with_label("Color")
                    .with_options(["Red", "Blue"]),
            ]);

        assert_eq!(
            render_form(&form),
            vec![
                "Untitled Form".to_string(),
                "Tell us".to_string(),
                String::new(),
                "1. Color (radio)".to_string(),
                "   options: Red, Blue".to_string(),
            ]
        );
    }
}
