//! Per-run tier change report

use crate::tier_change::{ChangeDirection, TierChange};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// All tier changes detected during one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TierChangeReport {
    /// Changes in detection order
    pub changes: Vec<TierChange>,
}

impl TierChangeReport {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a change
    pub fn push(&mut self, change: TierChange) {
        self.changes.push(change);
    }

    /// Number of changes recorded
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// True when nothing moved
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Companies that moved up
    pub fn promotions(&self) -> Vec<&TierChange> {
        self.with_direction(ChangeDirection::Promoted)
    }

    /// Companies that moved down
    pub fn demotions(&self) -> Vec<&TierChange> {
        self.with_direction(ChangeDirection::Demoted)
    }

    /// Companies tiered for the first time
    pub fn new_entries(&self) -> Vec<&TierChange> {
        self.with_direction(ChangeDirection::NewEntry)
    }

    /// Changes worth surfacing to a reviewer
    pub fn notable_changes(&self) -> Vec<&TierChange> {
        self.changes.iter().filter(|c| c.is_notable()).collect()
    }

    fn with_direction(&self, direction: ChangeDirection) -> Vec<&TierChange> {
        let mut changes: Vec<&TierChange> = self
            .changes
            .iter()
            .filter(|c| c.direction == direction)
            .collect();
        changes.sort_by(|a, b| {
            b.new_tier
                .cmp(&a.new_tier)
                .then_with(|| a.company_name.cmp(&b.company_name))
        });
        changes
    }

    /// Render the report as markdown
    pub fn render_markdown(&self) -> String {
        let mut lines = vec!["# Tier Changes".to_string(), String::new()];

        if self.changes.is_empty() {
            lines.push("No tier changes.".to_string());
            return lines.join("\n");
        }

        lines.push(format!(
            "{} promoted, {} demoted, {} new, {} notable",
            self.promotions().len(),
            self.demotions().len(),
            self.new_entries().len(),
            self.notable_changes().len()
        ));
        lines.push(String::new());

        let sections = [
            ("Promotions", self.promotions()),
            ("Demotions", self.demotions()),
            ("New entries", self.new_entries()),
        ];
        for (title, changes) in sections {
            if changes.is_empty() {
                continue;
            }
            lines.push(format!("## {}", title));
            lines.push(String::new());
            for change in changes {
                lines.push(render_line(change));
            }
            lines.push(String::new());
        }

        lines.join("\n").trim_end().to_string()
    }

    /// JSON form of the report
    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "total": self.changes.len(),
            "promotions": self.promotions().len(),
            "demotions": self.demotions().len(),
            "new_entries": self.new_entries().len(),
            "notable": self.notable_changes().len(),
            "changes": serde_json::to_value(&self.changes).unwrap_or(Value::Null),
        })
    }
}

fn render_line(change: &TierChange) -> String {
    let from = change
        .old_tier
        .map(|t| t.as_str().to_string())
        .unwrap_or_else(|| "none".to_string());
    let score = |s: Option<i32>| s.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string());

    let mut line = format!(
        "- {}: {} -> {} (score {} -> {})",
        change.company_name,
        from,
        change.new_tier,
        score(change.old_score),
        score(change.new_score)
    );
    if let Some(pillar) = &change.top_pillar {
        line.push_str(&format!(", top pillar {}", pillar));
    }
    if change.is_notable() {
        line.push_str(" **notable**");
    }
    line
}
