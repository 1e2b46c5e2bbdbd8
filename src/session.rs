use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::grades::GradeLabelIndex;
use crate::models::{StudentRecord, TrajectoryNode};
use crate::trajectory;

/// Display state shared by successive file loads: the roster of students on
/// screen and the generation of the most recent load.
#[derive(Debug, Clone)]
pub struct Session {
    capacity: usize,
    roster: Vec<String>,
    generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Accepted,
    AlreadyDisplayed,
    AtCapacity,
}

/// Handed out when a file read starts; only the newest ticket may complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub generation: u64,
    pub load_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct LoadedStudent {
    pub load_id: Uuid,
    pub source: PathBuf,
    pub loaded_at: DateTime<Utc>,
    pub name: String,
    pub record: StudentRecord,
    pub nodes: Vec<TrajectoryNode>,
    pub grade_index: GradeLabelIndex,
}

#[derive(Debug)]
pub enum LoadOutcome {
    Displayed(Box<LoadedStudent>),
    AlreadyDisplayed(String),
    AtCapacity(String),
    Stale,
}

impl Session {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            roster: Vec::new(),
            generation: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn roster(&self) -> &[String] {
        &self.roster
    }

    /// Adds `name` to the roster unless it is already there or the roster is
    /// full. Rejections leave the roster untouched.
    pub fn admit(&mut self, name: &str) -> Admission {
        if self.roster.iter().any(|existing| existing == name) {
            return Admission::AlreadyDisplayed;
        }
        if self.roster.len() >= self.capacity {
            return Admission::AtCapacity;
        }
        self.roster.push(name.to_string());
        Admission::Accepted
    }

    /// Starts a new load, superseding any load still in flight.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        let ticket = LoadTicket {
            generation: self.generation,
            load_id: Uuid::new_v4(),
        };
        debug!(generation = ticket.generation, load_id = %ticket.load_id, "load started");
        ticket
    }

    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        source: &Path,
        record: StudentRecord,
    ) -> LoadOutcome {
        if ticket.generation != self.generation {
            warn!(
                load_id = %ticket.load_id,
                generation = ticket.generation,
                current = self.generation,
                "discarding stale load of {}",
                source.display()
            );
            return LoadOutcome::Stale;
        }

        let name = record.display_name();
        match self.admit(&name) {
            Admission::AlreadyDisplayed => {
                warn!("student {name} is already displayed, skipping {}", source.display());
                LoadOutcome::AlreadyDisplayed(name)
            }
            Admission::AtCapacity => {
                warn!(
                    capacity = self.capacity,
                    "cannot display {name}: roster is full, skipping {}",
                    source.display()
                );
                LoadOutcome::AtCapacity(name)
            }
            Admission::Accepted => {
                let nodes = trajectory::build(record.interactions());
                let grade_index = GradeLabelIndex::from_optional(record.grades.as_ref());
                info!(
                    load_id = %ticket.load_id,
                    nodes = nodes.len(),
                    grades = grade_index.len(),
                    "displaying {name}"
                );
                LoadOutcome::Displayed(Box::new(LoadedStudent {
                    load_id: ticket.load_id,
                    source: source.to_path_buf(),
                    loaded_at: Utc::now(),
                    name,
                    record,
                    nodes,
                    grade_index,
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(name: &str) -> StudentRecord {
        serde_json::from_value(serde_json::json!({
            "name": name,
            "interactions": [{"Componente": "Fórum"}, {"Componente": "Tarefa"}]
        }))
        .unwrap()
    }

    #[test]
    fn admits_until_capacity() {
        let mut session = Session::new(3);
        for name in ["Ana", "Bruno", "Carla"] {
            assert_eq!(session.admit(name), Admission::Accepted);
        }
        assert_eq!(session.admit("Diego"), Admission::AtCapacity);
        assert_eq!(session.roster(), ["Ana", "Bruno", "Carla"]);
    }

    #[test]
    fn rejects_duplicate_name() {
        let mut session = Session::new(3);
        assert_eq!(session.admit("Ana"), Admission::Accepted);
        assert_eq!(session.admit("Ana"), Admission::AlreadyDisplayed);
        assert_eq!(session.roster().len(), 1);
    }

    #[test]
    fn duplicate_wins_over_full_roster() {
        let mut session = Session::new(1);
        session.admit("Ana");
        assert_eq!(session.admit("Ana"), Admission::AlreadyDisplayed);
    }

    #[test]
    fn completed_load_builds_trajectory() {
        let mut session = Session::new(3);
        let ticket = session.begin_load();
        let outcome = session.complete_load(ticket, Path::new("ana.json"), student("Ana"));
        match outcome {
            LoadOutcome::Displayed(loaded) => {
                assert_eq!(loaded.name, "Ana");
                assert_eq!(loaded.load_id, ticket.load_id);
                assert_eq!(loaded.nodes.len(), 2);
                assert_eq!(loaded.nodes[1].parent_ids, vec!["0".to_string()]);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(session.roster(), ["Ana"]);
    }

    #[test]
    fn superseded_load_is_discarded() {
        let mut session = Session::new(3);
        let first = session.begin_load();
        let second = session.begin_load();
        assert_ne!(first.load_id, second.load_id);

        let late = session.complete_load(first, Path::new("a.json"), student("Ana"));
        assert!(matches!(late, LoadOutcome::Stale));
        assert!(session.roster().is_empty());

        let current = session.complete_load(second, Path::new("b.json"), student("Bruno"));
        assert!(matches!(current, LoadOutcome::Displayed(_)));
        assert_eq!(session.roster(), ["Bruno"]);
    }

    #[test]
    fn rejected_load_leaves_roster_unchanged() {
        let mut session = Session::new(3);
        for name in ["Ana", "Bruno", "Carla", "Diego"] {
            let ticket = session.begin_load();
            session.complete_load(ticket, Path::new("x.json"), student(name));
        }
        assert_eq!(session.roster(), ["Ana", "Bruno", "Carla"]);

        let ticket = session.begin_load();
        let outcome = session.complete_load(ticket, Path::new("x.json"), student("Ana"));
        assert!(matches!(outcome, LoadOutcome::AlreadyDisplayed(name) if name == "Ana"));
        assert_eq!(session.roster().len(), 3);
    }

    #[test]
    fn unnamed_students_share_placeholder_slot() {
        let mut session = Session::new(3);
        let unnamed: StudentRecord = serde_json::from_str("{}").unwrap();
        let ticket = session.begin_load();
        session.complete_load(ticket, Path::new("a.json"), unnamed.clone());
        let ticket = session.begin_load();
        let outcome = session.complete_load(ticket, Path::new("b.json"), unnamed);
        assert!(matches!(outcome, LoadOutcome::AlreadyDisplayed(name) if name == "-"));
    }
}
