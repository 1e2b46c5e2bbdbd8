use std::collections::HashMap;
use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::classify;
use crate::config::Config;
use crate::models::{
    display_value, CategorySummary, TrajectoryNode, FIELD_COMPONENT, FIELD_EVENT_CONTEXT,
    FIELD_EVENT_NAME, FIELD_HOUR,
};
use crate::render::{self, Metadata};
use crate::session::LoadedStudent;

const UNCATEGORIZED: &str = "uncategorized";

pub fn summarize_by_category(nodes: &[TrajectoryNode]) -> Vec<CategorySummary> {
    let mut map: HashMap<&'static str, (usize, usize)> = HashMap::new();

    for node in nodes {
        let category = classify::category_of(node.text(FIELD_COMPONENT))
            .map(|category| category.as_str())
            .unwrap_or(UNCATEGORIZED);
        let entry = map.entry(category).or_insert((0, 0));
        entry.0 += 1;
        if classify::is_active_interaction(node.text(FIELD_EVENT_NAME)) {
            entry.1 += 1;
        }
    }

    let mut summaries: Vec<CategorySummary> = map
        .into_iter()
        .map(|(category, (count, active_count))| CategorySummary {
            category: category.to_string(),
            count,
            active_count,
        })
        .collect();

    summaries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.category.cmp(&b.category)));
    summaries
}

fn write_metadata(output: &mut String, metadata: &Metadata) {
    let _ = writeln!(output, "- Final grade: {}", metadata.final_grade);
    let _ = writeln!(output, "- Forum interactions: {}", metadata.forum_interactions);
    let _ = writeln!(output, "- Total interactions: {}", metadata.total_interactions);
}

/// Plain-text panel printed by `show`.
pub fn build_summary(student: &LoadedStudent, config: &Config) -> String {
    let metadata = Metadata::from_record(&student.record);
    let mut output = String::new();

    let _ = writeln!(output, "Student: {}", metadata.name);
    write_metadata(&mut output, &metadata);
    match &metadata.grades {
        None => {
            let _ = writeln!(output, "- Grades: -");
        }
        Some(grades) => {
            let _ = writeln!(output, "- Grades:");
            for (title, value) in grades {
                let _ = writeln!(output, "    {title}: {value}");
            }
        }
    }

    if student.nodes.is_empty() {
        let _ = writeln!(output, "No interactions recorded.");
        return output;
    }

    let _ = writeln!(output, "Trajectory ({} interactions):", student.nodes.len());
    for node in render::render_nodes(student, &config.colors) {
        let category = node
            .category
            .map(|category| category.as_str())
            .unwrap_or(UNCATEGORIZED);
        let _ = writeln!(
            output,
            "  {:<10} {:<13} {:<7} {}",
            node.text,
            category,
            node.activity.as_str(),
            node.color
        );
    }

    output
}

pub fn build_report(
    students: &[LoadedStudent],
    config: &Config,
    generated_at: DateTime<Utc>,
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Student Trajectory Report");
    let _ = writeln!(
        output,
        "Generated {} for {} student(s)",
        generated_at.format("%Y-%m-%d %H:%M UTC"),
        students.len()
    );

    if students.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "No students loaded.");
        return output;
    }

    for student in students {
        let metadata = Metadata::from_record(&student.record);
        let _ = writeln!(output);
        let _ = writeln!(output, "## {}", metadata.name);
        let _ = writeln!(output, "Source: {}", student.source.display());
        let _ = writeln!(output);
        write_metadata(&mut output, &metadata);

        let _ = writeln!(output);
        let _ = writeln!(output, "### Grades");
        match &metadata.grades {
            None => {
                let _ = writeln!(output, "-");
            }
            Some(grades) if grades.is_empty() => {
                let _ = writeln!(output, "No grades recorded.");
            }
            Some(grades) => {
                for (title, value) in grades {
                    let _ = writeln!(output, "- **{title}:** {value}");
                }
            }
        }

        if !student.grade_index.is_empty() {
            let _ = writeln!(output);
            let _ = writeln!(output, "### Grade Labels");
            for (title, label) in student.grade_index.iter() {
                let _ = writeln!(output, "- {label}: {title}");
            }
        }

        let _ = writeln!(output);
        let _ = writeln!(output, "### Interaction Mix");
        let summaries = summarize_by_category(&student.nodes);
        if summaries.is_empty() {
            let _ = writeln!(output, "No interactions recorded.");
            continue;
        }
        for summary in summaries.iter() {
            let _ = writeln!(
                output,
                "- {}: {} interactions ({} active)",
                summary.category, summary.count, summary.active_count
            );
        }

        let _ = writeln!(output);
        let _ = writeln!(output, "### Trajectory");
        let _ = writeln!(output, "| Node | Hour | Event Context | Category | Activity |");
        let _ = writeln!(output, "|---|---|---|---|---|");
        for (node, rendered) in student
            .nodes
            .iter()
            .zip(render::render_nodes(student, &config.colors))
        {
            let _ = writeln!(
                output,
                "| {} | {} | {} | {} | {} |",
                rendered.text,
                display_value(node.field(FIELD_HOUR)),
                display_value(node.field(FIELD_EVENT_CONTEXT)).replace('|', "\\|"),
                rendered
                    .category
                    .map(|category| category.as_str())
                    .unwrap_or(UNCATEGORIZED),
                rendered.activity.as_str()
            );
        }
    }

    output
}
