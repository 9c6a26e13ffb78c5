use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::backend::{Message, Tokenizer};
use crate::config::ObjectivePlacement;
use crate::error::RolesError;

use super::task::{Task, TaskCatalog};

/// A role name and the instructions given to it, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSpec {
    pub name: String,
    pub instructions: Vec<String>,
}

/// Parses a roles template: a JSON object mapping role name to a list of
/// instructions (a bare string counts as a single instruction).
pub fn parse_roles(text: &str) -> Result<Vec<RoleSpec>, RolesError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    let map = value.as_object().ok_or(RolesError::NotAnObject)?;
    if map.is_empty() {
        return Err(RolesError::Empty);
    }

    map.iter()
        .map(|(name, instructions)| {
            let instructions = match instructions {
                serde_json::Value::String(s) => vec![s.clone()],
                serde_json::Value::Array(items) => items
                    .iter()
                    .map(|item| match item {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect(),
                other => {
                    return Err(RolesError::Instructions {
                        role: name.clone(),
                        found: other.to_string(),
                    })
                }
            };
            Ok(RoleSpec {
                name: name.clone(),
                instructions,
            })
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleMessages {
    pub role: String,
    pub messages: Vec<Message>,
    pub token_usage: usize,
}

/// The message sequences for one task, one per role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RolePlan {
    pub task: Task,
    pub roles: Vec<RoleMessages>,
    /// Advisory estimate, accumulated across roles.
    pub token_usage: usize,
}

pub struct PromptBuilder {
    objective: String,
    roles: Vec<RoleSpec>,
    model: String,
    placement: ObjectivePlacement,
}

impl PromptBuilder {
    pub fn new(objective: impl Into<String>, roles: Vec<RoleSpec>, model: impl Into<String>) -> Self {
        Self {
            objective: objective.into(),
            roles,
            model: model.into(),
            placement: ObjectivePlacement::default(),
        }
    }

    pub fn with_placement(mut self, placement: ObjectivePlacement) -> Self {
        self.placement = placement;
        self
    }

    pub fn roles(&self) -> &[RoleSpec] {
        &self.roles
    }

    pub fn plan(&self, catalog: &TaskCatalog, tokenizer: &dyn Tokenizer) -> Vec<RolePlan> {
        tracing::info!(target: "chatops.plan", objective = %self.objective, tasks = catalog.len());

        catalog
            .tasks()
            .iter()
            .enumerate()
            .map(|(task_idx, task)| {
                tracing::info!(target: "chatops.plan", task = %task.name, "planning task");
                let mut token_usage = 0usize;
                let roles = self
                    .roles
                    .iter()
                    .enumerate()
                    .map(|(role_idx, role)| {
                        tracing::debug!(target: "chatops.plan", task = %task.name, role = %role.name, "building role block");
                        let with_objective = match self.placement {
                            ObjectivePlacement::EveryRole => true,
                            ObjectivePlacement::FirstBlock => task_idx == 0 && role_idx == 0,
                        };
                        let messages = self.role_messages(task, role, with_objective);
                        let cost = self.estimate(role, &messages, tokenizer);
                        token_usage += cost;
                        RoleMessages {
                            role: role.name.clone(),
                            messages,
                            token_usage: cost,
                        }
                    })
                    .collect();

                RolePlan {
                    task: task.clone(),
                    roles,
                    token_usage,
                }
            })
            .collect()
    }

    fn role_messages(&self, task: &Task, role: &RoleSpec, with_objective: bool) -> Vec<Message> {
        let mut messages = Vec::with_capacity(role.instructions.len() + 2);
        if with_objective {
            messages.push(Message::system(
                json!({ "Objective": self.objective }).to_string(),
            ));
        }
        for instruction in &role.instructions {
            messages.push(Message::system(
                json!({ "Instruction": instruction }).to_string(),
            ));
        }
        messages.push(Message::user(
            json!({
                "Task": task.name,
                "Data": task.data,
                "Role": role.name,
            })
            .to_string(),
        ));
        messages
    }

    fn estimate(&self, role: &RoleSpec, messages: &[Message], tokenizer: &dyn Tokenizer) -> usize {
        let last_instruction = role
            .instructions
            .last()
            .map(|i| tokenizer.count_tokens(i, &self.model))
            .unwrap_or(0);
        let serialized = serde_json::to_string(messages).unwrap_or_default();
        last_instruction + tokenizer.count_tokens(&serialized, &self.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MessageRole;
    use pretty_assertions::assert_eq;

    struct CharTokenizer;

    impl Tokenizer for CharTokenizer {
        fn count_tokens(&self, text: &str, _model: &str) -> usize {
            text.chars().count()
        }
    }

    fn roles() -> Vec<RoleSpec> {
        parse_roles(
            r#"{
                "Writer": ["write well", "be coherent"],
                "QA": "review the content"
            }"#,
        )
        .unwrap()
    }

    fn catalog() -> TaskCatalog {
        let mut c = TaskCatalog::new();
        c.add("haiku", Some("no data".into()));
        c.add("limerick", None);
        c
    }

    #[test]
    fn parse_roles_keeps_declaration_order() {
        let roles = roles();
        assert_eq!(roles[0].name, "Writer");
        assert_eq!(roles[0].instructions, vec!["write well", "be coherent"]);
        assert_eq!(roles[1].name, "QA");
        assert_eq!(roles[1].instructions, vec!["review the content"]);
    }

    #[test]
    fn parse_roles_rejects_non_objects() {
        assert!(matches!(parse_roles("[1, 2]"), Err(RolesError::NotAnObject)));
        assert!(matches!(parse_roles("{"), Err(RolesError::Json(_))));
        assert!(matches!(parse_roles("{}"), Err(RolesError::Empty)));
        match parse_roles(r#"{"QA": 3}"#) {
            Err(RolesError::Instructions { role, found }) => {
                assert_eq!(role, "QA");
                assert_eq!(found, "3");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn every_role_block_has_objective_instructions_and_user_message() {
        let builder = PromptBuilder::new("be helpful", roles(), "gpt");
        let plans = builder.plan(&catalog(), &CharTokenizer);

        assert_eq!(plans.len(), 2);
        let writer = &plans[0].roles[0];
        assert_eq!(writer.role, "Writer");
        let kinds: Vec<_> = writer.messages.iter().map(|m| m.role).collect();
        assert_eq!(
            kinds,
            vec![
                MessageRole::System,
                MessageRole::System,
                MessageRole::System,
                MessageRole::User
            ]
        );
        assert_eq!(writer.messages[0].content, r#"{"Objective":"be helpful"}"#);
        assert_eq!(writer.messages[1].content, r#"{"Instruction":"write well"}"#);
        assert_eq!(
            writer.messages[3].content,
            r#"{"Task":"haiku","Data":"no data","Role":"Writer"}"#
        );

        let limerick_qa = &plans[1].roles[1];
        assert_eq!(
            limerick_qa.messages.last().unwrap().content,
            r#"{"Task":"limerick","Data":null,"Role":"QA"}"#
        );
    }

    #[test]
    fn first_block_placement_only_seeds_first_role_of_first_task() {
        let builder = PromptBuilder::new("be helpful", roles(), "gpt")
            .with_placement(ObjectivePlacement::FirstBlock);
        let plans = builder.plan(&catalog(), &CharTokenizer);

        let has_objective = |m: &RoleMessages| m.messages[0].content.contains("Objective");
        assert!(has_objective(&plans[0].roles[0]));
        assert!(!has_objective(&plans[0].roles[1]));
        assert!(!has_objective(&plans[1].roles[0]));
    }

    #[test]
    fn token_usage_accumulates_over_roles() {
        let builder = PromptBuilder::new("obj", roles(), "gpt");
        let plans = builder.plan(&catalog(), &CharTokenizer);
        let plan = &plans[0];

        let writer = &plan.roles[0];
        let serialized = serde_json::to_string(&writer.messages).unwrap();
        assert_eq!(
            writer.token_usage,
            "be coherent".len() + serialized.chars().count()
        );
        assert_eq!(
            plan.token_usage,
            plan.roles.iter().map(|r| r.token_usage).sum::<usize>()
        );
    }

    #[test]
    fn zero_roles_yield_empty_plan_per_task() {
        let builder = PromptBuilder::new("obj", Vec::new(), "gpt");
        let plans = builder.plan(&catalog(), &CharTokenizer);
        assert_eq!(plans.len(), 2);
        assert!(plans.iter().all(|p| p.roles.is_empty() && p.token_usage == 0));
    }
}
