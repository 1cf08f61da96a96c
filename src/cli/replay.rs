use anyhow::{anyhow, Context, Result};
use clap::Args;
use serde::Serialize;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use crate::modal::{reduce, ModalAction, ModalId, ModalStore, MountRecord};

/// Run recorded modal actions through the reducer
#[derive(Debug, Args)]
pub struct ReplayCommand {
    /// JSON file holding an array of actions, `-` reads stdin
    pub file: PathBuf,

    /// Ids to treat as already mounted, comma separated
    #[arg(short = 'm', long = "mounted", value_delimiter = ',')]
    pub mounted: Vec<String>,
}

/// Registry after one replayed action
#[derive(Debug, Serialize)]
pub struct ReplayStep {
    pub step: usize,
    pub action: ModalAction,
    /// False when the reducer returned the previous registry unchanged
    pub changed: bool,
    pub state: ModalStore,
}

impl ReplayCommand {
    pub async fn execute(&self) -> Result<()> {
        let input = self.read_input().await?;
        for step in replay(&input, &self.mounted)? {
            println!("{}", serde_json::to_string_pretty(&step)?);
        }
        Ok(())
    }

    async fn read_input(&self) -> Result<String> {
        if self.file.as_os_str() == "-" {
            debug!("Reading actions from stdin");
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| anyhow!("Failed to read from stdin: {}", e))?;
            return Ok(buffer);
        }

        tokio::fs::read_to_string(&self.file)
            .await
            .with_context(|| format!("Failed to read actions from {}", self.file.display()))
    }
}

/// Reduce every action in `input` starting from an empty registry
pub fn replay(input: &str, mounted: &[String]) -> Result<Vec<ReplayStep>> {
    let actions: Vec<ModalAction> = serde_json::from_str(input).context("Expected a JSON array of modal actions")?;

    let record = MountRecord::new();
    for id in mounted {
        record.mark(&ModalId::from(id.as_str()));
    }

    let mut state = Arc::new(ModalStore::new());
    let mut steps = Vec::with_capacity(actions.len());

    for (step, action) in actions.into_iter().enumerate() {
        let next = reduce(&state, &action, &record);
        let changed = !Arc::ptr_eq(&state, &next);
        debug!("Replayed {:?} (changed: {})", action, changed);

        state = next;
        steps.push(ReplayStep {
            step: step + 1,
            action,
            changed,
            state: state.as_ref().clone(),
        });
    }

    Ok(steps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replay_tracks_visibility() {
        let input = r#"[
            {"type": "nice-modal/show", "modalId": "a", "args": {"n": 1}},
            {"type": "nice-modal/show", "modalId": "b"},
            {"type": "nice-modal/hide", "modalId": "a"},
            {"type": "nice-modal/hide", "modalId": "a"},
            {"type": "something/else"}
        ]"#;

        let steps = replay(input, &["a".to_string()]).unwrap();
        assert_eq!(steps.len(), 5);

        let a = ModalId::from("a");
        let b = ModalId::from("b");
        assert!(steps[0].state[&a].visible);
        assert!(steps[1].state[&b].delay_visible);
        assert!(!steps[2].state[&a].visible);
        assert!(!steps[3].changed);
        assert_eq!(steps[4].action, ModalAction::Unknown);
        assert!(!steps[4].changed);
    }

    #[test]
    fn test_replay_rejects_non_array() {
        assert!(replay(r#"{"type": "nice-modal/show"}"#, &[]).is_err());
    }
}
