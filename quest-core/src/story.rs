//! Story graph: nodes, choices and skill checks.
//!
//! Nodes are addressed by id and form a directed graph that may contain
//! cycles. A node with an enemy is an encounter; winning it moves the player
//! to the node's post-combat id. Item and enemy references are catalog ids.

use crate::character::SkillType;
use crate::enemies;
use crate::items;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Heal amount that restores the character to full HP.
pub const FULL_HEAL: i32 = 999;

/// Errors raised while loading or validating a story graph.
#[derive(Debug, Error)]
pub enum StoryError {
    #[error("Invalid story JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Duplicate node id: {0}")]
    DuplicateNode(String),

    #[error("Start node not found: {0}")]
    MissingStart(String),

    #[error("Node {from} points at unknown node {to}")]
    DanglingEdge { from: String, to: String },

    #[error("Node {node} refers to unknown enemy {enemy}")]
    UnknownEnemy { node: String, enemy: String },

    #[error("Node {node} refers to unknown item {item}")]
    UnknownItem { node: String, item: String },
}

/// A d20 check against a skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillCheck {
    pub skill: SkillType,
    pub dc: i32,
}

impl SkillCheck {
    pub fn new(skill: SkillType, dc: i32) -> Self {
        Self { skill, dc }
    }
}

/// An edge in the story graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryChoice {
    pub text: String,
    pub next_node_id: String,
    #[serde(default)]
    pub skill_check: Option<SkillCheck>,
    /// Where a failed check leads. Without one, failure still moves to
    /// `next_node_id` but grants nothing.
    #[serde(default)]
    pub fail_node_id: Option<String>,
    #[serde(default)]
    pub required_item: Option<String>,
    #[serde(default)]
    pub grant_item: Option<String>,
    #[serde(default)]
    pub grant_gold: u32,
    #[serde(default)]
    pub grant_xp: u32,
    /// HP restored; [`FULL_HEAL`] or more means all of it.
    #[serde(default)]
    pub heal_amount: i32,
}

impl StoryChoice {
    pub fn new(text: impl Into<String>, next_node_id: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            next_node_id: next_node_id.into(),
            skill_check: None,
            fail_node_id: None,
            required_item: None,
            grant_item: None,
            grant_gold: 0,
            grant_xp: 0,
            heal_amount: 0,
        }
    }

    pub fn with_check(mut self, skill: SkillType, dc: i32) -> Self {
        self.skill_check = Some(SkillCheck::new(skill, dc));
        self
    }

    pub fn on_fail(mut self, node_id: impl Into<String>) -> Self {
        self.fail_node_id = Some(node_id.into());
        self
    }

    pub fn requires(mut self, item_id: impl Into<String>) -> Self {
        self.required_item = Some(item_id.into());
        self
    }

    pub fn grants_item(mut self, item_id: impl Into<String>) -> Self {
        self.grant_item = Some(item_id.into());
        self
    }

    pub fn grants_gold(mut self, gold: u32) -> Self {
        self.grant_gold = gold;
        self
    }

    pub fn grants_xp(mut self, xp: u32) -> Self {
        self.grant_xp = xp;
        self
    }

    pub fn heals(mut self, amount: i32) -> Self {
        self.heal_amount = amount;
        self
    }

    pub fn full_heal(self) -> Self {
        self.heals(FULL_HEAL)
    }

    pub fn is_full_heal(&self) -> bool {
        self.heal_amount >= FULL_HEAL
    }

    /// Node ids this choice can lead to.
    pub fn targets(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.next_node_id.as_str()).chain(self.fail_node_id.as_deref())
    }
}

/// A unit of narrative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryNode {
    pub id: String,
    pub title: String,
    #[serde(default = "default_chapter")]
    pub chapter: u32,
    pub text: String,
    #[serde(default)]
    pub choices: Vec<StoryChoice>,
    /// Enemy id; the node is an encounter when set.
    #[serde(default)]
    pub enemy: Option<String>,
    #[serde(default)]
    pub post_combat_node_id: Option<String>,
    #[serde(default)]
    pub is_ending: bool,
}

fn default_chapter() -> u32 {
    1
}

impl StoryNode {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        chapter: u32,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            chapter,
            text: text.into(),
            choices: Vec::new(),
            enemy: None,
            post_combat_node_id: None,
            is_ending: false,
        }
    }

    pub fn with_choice(mut self, choice: StoryChoice) -> Self {
        self.choices.push(choice);
        self
    }

    /// Make this node an encounter that leads to `after` once won.
    pub fn with_encounter(mut self, enemy_id: impl Into<String>, after: impl Into<String>) -> Self {
        self.enemy = Some(enemy_id.into());
        self.post_combat_node_id = Some(after.into());
        self
    }

    pub fn ending(mut self) -> Self {
        self.is_ending = true;
        self
    }

    pub fn is_encounter(&self) -> bool {
        self.enemy.is_some()
    }
}

/// All nodes of an adventure, keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryGraph {
    nodes: HashMap<String, StoryNode>,
}

impl StoryGraph {
    /// Build from a list of nodes, rejecting duplicate ids.
    pub fn from_nodes(nodes: impl IntoIterator<Item = StoryNode>) -> Result<Self, StoryError> {
        let mut map = HashMap::new();
        for node in nodes {
            if map.contains_key(&node.id) {
                return Err(StoryError::DuplicateNode(node.id));
            }
            map.insert(node.id.clone(), node);
        }
        Ok(Self { nodes: map })
    }

    /// Parse a JSON array of nodes and validate it from `start`.
    pub fn from_json(json: &str, start: &str) -> Result<Self, StoryError> {
        let nodes: Vec<StoryNode> = serde_json::from_str(json)?;
        let graph = Self::from_nodes(nodes)?;
        graph.validate(start)?;
        Ok(graph)
    }

    /// The built-in adventure.
    pub fn builtin() -> &'static StoryGraph {
        &BUILTIN
    }

    pub fn get(&self, id: &str) -> Option<&StoryNode> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &StoryNode> {
        self.nodes.values()
    }

    pub fn endings(&self) -> impl Iterator<Item = &StoryNode> {
        self.nodes.values().filter(|n| n.is_ending)
    }

    /// Check that `start` exists and every edge, enemy and item reference
    /// resolves.
    pub fn validate(&self, start: &str) -> Result<(), StoryError> {
        if !self.contains(start) {
            return Err(StoryError::MissingStart(start.to_string()));
        }

        let mut ids: Vec<&String> = self.nodes.keys().collect();
        ids.sort();

        for id in ids {
            let node = &self.nodes[id];
            let dangling = |to: &str| StoryError::DanglingEdge {
                from: node.id.clone(),
                to: to.to_string(),
            };

            if let Some(after) = &node.post_combat_node_id {
                if !self.contains(after) {
                    return Err(dangling(after));
                }
            }
            if let Some(enemy) = &node.enemy {
                if enemies::get_enemy(enemy).is_none() {
                    return Err(StoryError::UnknownEnemy {
                        node: node.id.clone(),
                        enemy: enemy.clone(),
                    });
                }
            }

            for choice in &node.choices {
                if let Some(to) = choice.targets().find(|t| !self.contains(t)) {
                    return Err(dangling(to));
                }
                let item_refs = choice
                    .required_item
                    .iter()
                    .chain(choice.grant_item.iter());
                for item in item_refs {
                    if items::get_item(item).is_none() {
                        return Err(StoryError::UnknownItem {
                            node: node.id.clone(),
                            item: item.clone(),
                        });
                    }
                }
            }
        }

        Ok(())
    }
}

lazy_static::lazy_static! {
    static ref BUILTIN: StoryGraph = StoryGraph {
        nodes: crate::story_data::nodes()
            .into_iter()
            .map(|n| (n.id.clone(), n))
            .collect(),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_graph() -> StoryGraph {
        StoryGraph::from_nodes(vec![
            StoryNode::new("start", "Start", 1, "A crossroads.")
                .with_choice(StoryChoice::new("Left", "left"))
                .with_choice(
                    StoryChoice::new("Climb", "cliff")
                        .with_check(SkillType::Strength, 12)
                        .on_fail("left"),
                ),
            StoryNode::new("left", "Left", 1, "A goblin!").with_encounter("goblin", "cliff"),
            StoryNode::new("cliff", "Cliff", 1, "The end.").ending(),
        ])
        .expect("unique ids")
    }

    #[test]
    fn test_lookup() {
        let graph = tiny_graph();
        assert_eq!(graph.len(), 3);
        assert_eq!(graph.get("cliff").map(|n| n.is_ending), Some(true));
        assert!(graph.get("nowhere").is_none());
        assert!(graph.validate("start").is_ok());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = StoryGraph::from_nodes(vec![
            StoryNode::new("a", "A", 1, ""),
            StoryNode::new("a", "A again", 1, ""),
        ]);
        assert!(matches!(result, Err(StoryError::DuplicateNode(id)) if id == "a"));
    }

    #[test]
    fn test_validate_catches_dangling_fail_edge() {
        let graph = StoryGraph::from_nodes(vec![StoryNode::new("start", "Start", 1, "")
            .with_choice(
                StoryChoice::new("Try", "start")
                    .with_check(SkillType::Dexterity, 10)
                    .on_fail("pit"),
            )])
        .expect("unique ids");
        match graph.validate("start") {
            Err(StoryError::DanglingEdge { from, to }) => {
                assert_eq!(from, "start");
                assert_eq!(to, "pit");
            }
            other => panic!("expected dangling edge, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_catches_unknown_references() {
        let graph = StoryGraph::from_nodes(vec![
            StoryNode::new("start", "Start", 1, "").with_encounter("lich", "start")
        ])
        .expect("unique ids");
        assert!(matches!(
            graph.validate("start"),
            Err(StoryError::UnknownEnemy { .. })
        ));

        let graph = StoryGraph::from_nodes(vec![StoryNode::new("start", "Start", 1, "")
            .with_choice(StoryChoice::new("Take", "start").grants_item("crown"))])
        .expect("unique ids");
        assert!(matches!(
            graph.validate("start"),
            Err(StoryError::UnknownItem { .. })
        ));

        assert!(matches!(
            tiny_graph().validate("elsewhere"),
            Err(StoryError::MissingStart(_))
        ));
    }

    #[test]
    fn test_from_json() {
        let json = r#"[
            {
                "id": "start",
                "title": "Gate",
                "text": "A locked gate.",
                "choices": [
                    { "text": "Unlock", "next_node_id": "yard", "required_item": "mysterious_key" },
                    { "text": "Rest", "next_node_id": "start", "heal_amount": 999 }
                ]
            },
            { "id": "yard", "title": "Yard", "chapter": 2, "text": "", "is_ending": true }
        ]"#;
        let graph = StoryGraph::from_json(json, "start").expect("valid graph");
        let start = graph.get("start").expect("start node");
        assert_eq!(start.chapter, 1);
        assert_eq!(start.choices[0].required_item.as_deref(), Some("mysterious_key"));
        assert!(start.choices[1].is_full_heal());
        assert_eq!(graph.endings().count(), 1);
    }

    #[test]
    fn test_from_json_errors() {
        assert!(matches!(
            StoryGraph::from_json("{not json", "start"),
            Err(StoryError::Json(_))
        ));
        let json = r#"[{ "id": "start", "title": "", "text": "",
            "choices": [{ "text": "Go", "next_node_id": "void" }] }]"#;
        assert!(matches!(
            StoryGraph::from_json(json, "start"),
            Err(StoryError::DanglingEdge { .. })
        ));
    }

    #[test]
    fn test_choice_targets() {
        let choice = StoryChoice::new("Sneak", "inside").on_fail("caught");
        assert_eq!(choice.targets().collect::<Vec<_>>(), vec!["inside", "caught"]);
        assert_eq!(StoryChoice::new("Walk", "road").targets().count(), 1);
    }
}
