use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use serde::Serialize;

use crate::config::ColorConfig;
use crate::grades::GradeLabelIndex;
use crate::models::{
    display_value, TrajectoryNode, FIELD_COMPONENT, FIELD_EVENT_CONTEXT, FIELD_EVENT_NAME,
    FIELD_HOUR,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Forum,
    Task,
    Content,
    Videocall,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Circle,
    Square,
    Triangle,
    Diamond,
    Star,
}

pub struct CategoryRule {
    pub category: Category,
    pub shape: Shape,
    pub size: f64,
    pub components: &'static [&'static str],
}

/// Category membership by `Componente` value, in lookup priority order.
pub static CATEGORY_RULES: [CategoryRule; 5] = [
    CategoryRule {
        category: Category::Forum,
        shape: Shape::Circle,
        size: 1.0,
        components: &["Fórum"],
    },
    CategoryRule {
        category: Category::Task,
        shape: Shape::Square,
        size: 1.0,
        components: &["Tarefa", "Questionário", "Lição", "Laboratório de Avaliação"],
    },
    CategoryRule {
        category: Category::Content,
        shape: Shape::Triangle,
        size: 0.9,
        components: &[
            "Arquivo",
            "URL",
            "Página",
            "Pasta",
            "Livro",
            "Rótulo",
            "Conteúdo do pacote IMS",
            "H5P",
        ],
    },
    CategoryRule {
        category: Category::Videocall,
        shape: Shape::Diamond,
        size: 1.1,
        components: &["BigBlueButton", "Jitsi", "Google Meet"],
    },
    CategoryRule {
        category: Category::Other,
        shape: Shape::Star,
        size: 0.8,
        components: &[
            "Sistema",
            "Relatório de usuário",
            "Relatório geral",
            "Relatório de notas do usuário",
            "Lista de usuários",
            "Notas",
        ],
    },
];

/// Event names where the student produced content.
pub const ACTIVE_EVENTS: &[&str] = &[
    "Post criado",
    "Post atualizado",
    "Discussão criada",
    "Algum conteúdo foi publicado.",
    "Um envio foi submetido.",
    "Um arquivo foi enviado.",
    "Submissão criada.",
    "Tentativa do questionário enviada",
    "Comentário criado",
    "Mensagem enviada",
    "Resposta da escolha enviada",
];

impl Category {
    pub fn rule(self) -> &'static CategoryRule {
        match self {
            Category::Forum => &CATEGORY_RULES[0],
            Category::Task => &CATEGORY_RULES[1],
            Category::Content => &CATEGORY_RULES[2],
            Category::Videocall => &CATEGORY_RULES[3],
            Category::Other => &CATEGORY_RULES[4],
        }
    }

    pub fn shape(self) -> Shape {
        self.rule().shape
    }

    pub fn size(self) -> f64 {
        self.rule().size
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Forum => "forum",
            Category::Task => "task",
            Category::Content => "content",
            Category::Videocall => "videocall",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Shape {
    pub fn dot_shape(self) -> &'static str {
        match self {
            Shape::Circle => "circle",
            Shape::Square => "box",
            Shape::Triangle => "triangle",
            Shape::Diamond => "diamond",
            Shape::Star => "star",
        }
    }
}

fn component_table() -> &'static HashMap<&'static str, Category> {
    static TABLE: OnceLock<HashMap<&'static str, Category>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = HashMap::new();
        for rule in CATEGORY_RULES.iter() {
            for component in rule.components {
                // earlier rules win
                table.entry(*component).or_insert(rule.category);
            }
        }
        table
    })
}

/// `None` means the component is outside every category.
pub fn category_of(component: &str) -> Option<Category> {
    component_table().get(component).copied()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Activity {
    Active,
    Passive,
}

impl Activity {
    pub fn as_str(self) -> &'static str {
        match self {
            Activity::Active => "active",
            Activity::Passive => "passive",
        }
    }
}

pub fn is_active_interaction(event_name: &str) -> bool {
    ACTIVE_EVENTS.contains(&event_name)
}

pub fn activity_of(event_name: &str) -> Activity {
    if is_active_interaction(event_name) {
        Activity::Active
    } else {
        Activity::Passive
    }
}

pub fn color_of<'a>(event_name: &str, colors: &'a ColorConfig) -> &'a str {
    match activity_of(event_name) {
        Activity::Active => colors.active.as_str(),
        Activity::Passive => colors.passive.as_str(),
    }
}

pub fn grade_label_of<'a>(event_context: &str, index: &'a GradeLabelIndex) -> Option<&'a str> {
    index.label_for(event_context)
}

pub fn display_text(node: &TrajectoryNode, index: &GradeLabelIndex) -> String {
    match grade_label_of(node.text(FIELD_EVENT_CONTEXT), index) {
        Some(grade_label) => format!("{} - {}", node.label, grade_label),
        None => node.label.clone(),
    }
}

pub fn tooltip(node: &TrajectoryNode) -> String {
    [FIELD_HOUR, FIELD_EVENT_CONTEXT, FIELD_COMPONENT, FIELD_EVENT_NAME]
        .iter()
        .map(|key| format!("{key}: {}", display_value(node.field(key))))
        .collect::<Vec<_>>()
        .join("\n")
}
