//! Presentation attributes per node and the export formats built on them.

use std::fmt::Write as _;
use std::io;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::classify::{self, Activity, Category, Shape};
use crate::config::{ColorConfig, Config, Uncategorized};
use crate::grades::GradeLabelIndex;
use crate::layout::{GraphLayout, LayoutGraph, Point, RoutedEdge};
use crate::models::{
    display_value, StudentRecord, TrajectoryNode, FIELD_COMPONENT, FIELD_EVENT_CONTEXT,
    FIELD_EVENT_NAME, FIELD_HOUR,
};
use crate::session::LoadedStudent;

/// Base DOT node width in inches, scaled by the category size.
const DOT_BASE_WIDTH: f64 = 0.6;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderNode {
    pub id: String,
    pub text: String,
    pub category: Option<Category>,
    pub shape: Option<Shape>,
    pub size: Option<f64>,
    pub activity: Activity,
    pub color: String,
    pub tooltip: String,
}

pub fn render_node(
    node: &TrajectoryNode,
    grade_index: &GradeLabelIndex,
    colors: &ColorConfig,
) -> RenderNode {
    let category = classify::category_of(node.text(FIELD_COMPONENT));
    let event_name = node.text(FIELD_EVENT_NAME);
    RenderNode {
        id: node.id.clone(),
        text: classify::display_text(node, grade_index),
        category,
        shape: category.map(Category::shape),
        size: category.map(Category::size),
        activity: classify::activity_of(event_name),
        color: classify::color_of(event_name, colors).to_string(),
        tooltip: classify::tooltip(node),
    }
}

pub fn render_nodes(student: &LoadedStudent, colors: &ColorConfig) -> Vec<RenderNode> {
    student
        .nodes
        .iter()
        .map(|node| render_node(node, &student.grade_index, colors))
        .collect()
}

/// The metadata panel, every value already formatted for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metadata {
    pub name: String,
    pub final_grade: String,
    pub forum_interactions: String,
    pub total_interactions: String,
    /// `None` when the file carries no grades at all.
    pub grades: Option<Vec<(String, String)>>,
}

impl Metadata {
    pub fn from_record(record: &StudentRecord) -> Self {
        Self {
            name: record.display_name(),
            final_grade: display_value(record.final_grade.as_ref()),
            forum_interactions: display_value(record.forum_interactions.as_ref()),
            total_interactions: display_value(record.total_interactions.as_ref()),
            grades: record.grades.as_ref().map(|grades| {
                grades
                    .iter()
                    .map(|(title, value)| (title.clone(), display_value(Some(value))))
                    .collect()
            }),
        }
    }
}

fn escape_dot(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

/// One Graphviz `digraph` per student, ready for `dot -Tsvg`.
pub fn to_dot(student: &LoadedStudent, config: &Config) -> String {
    let metadata = Metadata::from_record(&student.record);
    let mut dot = String::new();

    let _ = writeln!(dot, "digraph \"{}\" {{", escape_dot(&metadata.name));
    let _ = writeln!(dot, "    rankdir={};", config.layout.direction.rankdir());
    let _ = writeln!(dot, "    node [fontname=\"Helvetica\", fontsize=10];");
    let _ = writeln!(dot, "    // Student: {}", metadata.name.replace('\n', " "));
    let _ = writeln!(dot, "    // Final grade: {}", metadata.final_grade);
    let _ = writeln!(dot, "    // Forum interactions: {}", metadata.forum_interactions);
    let _ = writeln!(dot, "    // Total interactions: {}", metadata.total_interactions);
    let _ = writeln!(dot, "    // Load: {}", student.load_id);

    if student.nodes.is_empty() {
        let _ = writeln!(
            dot,
            "    empty [shape=plaintext, label=\"No interactions recorded.\"];"
        );
        let _ = writeln!(dot, "}}");
        return dot;
    }

    for node in render_nodes(student, &config.colors) {
        let attrs = match (node.shape, node.size) {
            (Some(shape), Some(size)) => format!(
                "shape={}, style=filled, fillcolor=\"{}\", width={:.2}, label=\"{}\"",
                shape.dot_shape(),
                escape_dot(&node.color),
                DOT_BASE_WIDTH * size,
                escape_dot(&node.text)
            ),
            _ => match config.render.uncategorized {
                Uncategorized::Hidden => format!(
                    "shape=plaintext, fontcolor=\"{}\", label=\"{}\"",
                    escape_dot(&node.color),
                    escape_dot(&node.text)
                ),
                Uncategorized::Neutral => format!(
                    "shape=point, width=0.15, style=filled, fillcolor=\"{}\", xlabel=\"{}\"",
                    escape_dot(&config.colors.neutral),
                    escape_dot(&node.text)
                ),
            },
        };
        let _ = writeln!(
            dot,
            "    n{} [{}, tooltip=\"{}\"];",
            node.id,
            attrs,
            escape_dot(&node.tooltip)
        );
    }

    for (source, target) in LayoutGraph::from_trajectory(&student.nodes).edges {
        let _ = writeln!(dot, "    n{source} -> n{target};");
    }

    let _ = writeln!(dot, "}}");
    dot
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelNode {
    #[serde(flatten)]
    pub node: RenderNode,
    pub position: Point,
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentModel {
    pub load_id: Uuid,
    pub source: String,
    pub loaded_at: DateTime<Utc>,
    pub metadata: Metadata,
    pub grade_labels: GradeLabelIndex,
    pub has_interactions: bool,
    pub nodes: Vec<ModelNode>,
    pub edges: Vec<RoutedEdge>,
}

pub fn student_model(
    student: &LoadedStudent,
    config: &Config,
    layout: &dyn GraphLayout,
) -> StudentModel {
    let placed = layout.layout(&LayoutGraph::from_trajectory(&student.nodes));
    let nodes = render_nodes(student, &config.colors)
        .into_iter()
        .zip(placed.nodes)
        .map(|(node, placed)| ModelNode {
            node,
            position: placed.position,
        })
        .collect();

    StudentModel {
        load_id: student.load_id,
        source: student.source.display().to_string(),
        loaded_at: student.loaded_at,
        metadata: Metadata::from_record(&student.record),
        grade_labels: student.grade_index.clone(),
        has_interactions: !student.nodes.is_empty(),
        nodes,
        edges: placed.edges,
    }
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    id: &'a str,
    text: &'a str,
    category: Option<Category>,
    activity: Activity,
    color: &'a str,
    hour: String,
    event_context: String,
    component: String,
    event_name: String,
}

pub fn write_csv<W: io::Write>(
    student: &LoadedStudent,
    colors: &ColorConfig,
    writer: W,
) -> Result<usize, csv::Error> {
    let mut out = csv::Writer::from_writer(writer);
    let rendered = render_nodes(student, colors);
    for (node, render) in student.nodes.iter().zip(&rendered) {
        out.serialize(CsvRow {
            id: &render.id,
            text: &render.text,
            category: render.category,
            activity: render.activity,
            color: &render.color,
            hour: display_value(node.field(FIELD_HOUR)),
            event_context: display_value(node.field(FIELD_EVENT_CONTEXT)),
            component: display_value(node.field(FIELD_COMPONENT)),
            event_name: display_value(node.field(FIELD_EVENT_NAME)),
        })?;
    }
    out.flush()?;
    Ok(rendered.len())
}
