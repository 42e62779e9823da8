use lq_domain::config::BudgetConfig;
use lq_domain::intent::QueryIntent;
use lq_domain::table::TrackedTable;
use lq_domain::trace::TraceEvent;

use crate::injection;
use crate::report::{BudgetLevel, BudgetReport};
use crate::truncation;

/// Reserved snapshot key that is not a table.
const SCHEMA_KEY: &str = "schema";

const PREAMBLE: &str = "\
You are the assistant of an online learning platform. Answer the user's \
question using the platform data provided below. If the data does not \
contain the answer, say so briefly instead of guessing. Answer in the same \
language as the question.";

const MINIMAL_PREAMBLE: &str = "\
You are the assistant of an online learning platform. The platform data was \
too large to include; answer from the schema and general knowledge, and say \
that detailed figures are unavailable.";

/// Foreign keys between tracked tables, rendered under the column lists.
const RELATIONSHIPS: &[&str] = &[
    "profiles.user_id -> users.id",
    "topics.owner_id -> users.id",
    "media.topic_id -> topics.id",
    "contents.topic_id -> topics.id",
    "tasks.topic_id -> topics.id",
    "subscriptions.user_id -> users.id",
    "subscriptions.topic_id -> topics.id",
    "submissions.task_id -> tasks.id",
    "submissions.user_id -> users.id",
    "purchases.user_id -> users.id",
    "purchases.topic_id -> topics.id",
];

fn style_hint(intent: QueryIntent) -> Option<&'static str> {
    match intent {
        QueryIntent::GraphQuery => Some(
            "The user wants a chart: answer with a compact table of label/value \
             pairs that can be plotted, then one sentence interpreting it.",
        ),
        QueryIntent::ContextQuery => {
            Some("Base the answer strictly on the DATA section and quote counts and names exactly.")
        }
        QueryIntent::Greeting | QueryIntent::Help => Some(
            "Keep the answer short and friendly and mention the kinds of questions \
             about courses, tasks and users you can answer.",
        ),
        QueryIntent::ServerStatus | QueryIntent::GenericQuery => None,
    }
}

/// The static table and relationship description used by every prompt.
pub fn static_schema() -> String {
    let mut out = String::from("Tables:\n");
    for table in TrackedTable::ALL {
        out.push_str(&format!("- {}({})\n", table.name(), table.columns()));
    }
    out.push_str("Relationships:\n");
    for rel in RELATIONSHIPS {
        out.push_str(&format!("- {rel}\n"));
    }
    out
}

/// Assembles prompts that always fit the configured ceilings.
///
/// Pure function of its inputs: full snapshot when the data fits the soft
/// ceiling, a per-table summary when it does not, and a schema-only prompt
/// with a truncated question when even that exceeds the hard ceiling. The
/// question is always the final section.
pub struct PromptBudgeter {
    pub soft_max_chars: usize,
    pub hard_max_chars: usize,
    pub summary_max_fields: usize,
    pub summary_value_chars: usize,
    pub minimal_query_chars: usize,
}

impl PromptBudgeter {
    pub fn from_config(cfg: &BudgetConfig) -> Self {
        Self {
            soft_max_chars: cfg.soft_max_chars,
            hard_max_chars: cfg.hard_max_chars,
            summary_max_fields: cfg.summary_max_fields,
            summary_value_chars: cfg.summary_value_chars,
            minimal_query_chars: cfg.minimal_query_chars,
        }
    }

    /// Build the prompt for `query` against `snapshot`.
    pub fn build(&self, query: &str, snapshot: &str, intent: QueryIntent) -> (String, BudgetReport) {
        let snapshot_chars = snapshot.len();
        let schema = static_schema();

        let (level, data_kind, data, tables_summarized) = if snapshot_chars <= self.soft_max_chars {
            (BudgetLevel::Full, "full", snapshot.to_string(), 0)
        } else {
            let summary = truncation::summarize_snapshot(
                snapshot,
                SCHEMA_KEY,
                self.summary_max_fields,
                self.summary_value_chars,
            );
            match summary {
                Some(s) => (BudgetLevel::Summarized, "summary", s.text, s.tables),
                None => (
                    BudgetLevel::Summarized,
                    "summary",
                    "(snapshot unavailable)".to_string(),
                    0,
                ),
            }
        };

        let mut assembled = String::new();
        assembled.push_str(&injection::format_instructions(PREAMBLE, style_hint(intent)));
        assembled.push_str(&injection::format_schema(&schema));
        assembled.push_str(&injection::format_data(data_kind, &data));
        assembled.push_str(&injection::format_question(query));

        let report = if assembled.len() <= self.hard_max_chars {
            BudgetReport {
                level,
                snapshot_chars,
                injected_data_chars: data.len(),
                total_chars: assembled.len(),
                query_chars: query.len(),
                query_truncated: false,
                tables_summarized,
            }
        } else {
            tracing::warn!(
                total_chars = assembled.len(),
                hard_max_chars = self.hard_max_chars,
                "prompt over hard ceiling, falling back to schema-only prompt"
            );
            let (short_query, query_truncated) =
                truncation::truncate_chars(query, self.minimal_query_chars);

            assembled.clear();
            assembled.push_str(&injection::format_instructions(MINIMAL_PREAMBLE, None));
            assembled.push_str(&injection::format_schema(&schema));
            assembled.push_str(&injection::format_question(&short_query));

            // Ceiling below the schema itself: send the question alone, cut to fit.
            let (short_query, query_truncated) = if assembled.len() > self.hard_max_chars {
                let room = self
                    .hard_max_chars
                    .saturating_sub(injection::format_question("").len());
                let (cut, cut_now) = truncation::truncate_bytes(&short_query, room);
                assembled = injection::format_question(&cut);
                (cut, query_truncated || cut_now)
            } else {
                (short_query, query_truncated)
            };

            BudgetReport {
                level: BudgetLevel::Minimal,
                snapshot_chars,
                injected_data_chars: 0,
                total_chars: assembled.len(),
                query_chars: short_query.len(),
                query_truncated,
                tables_summarized: 0,
            }
        };

        TraceEvent::PromptBudgeted {
            level: report.level.as_str().to_string(),
            snapshot_chars: report.snapshot_chars,
            injected_data_chars: report.injected_data_chars,
            total_chars: report.total_chars,
            query_truncated: report.query_truncated,
        }
        .emit();

        (assembled, report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn budgeter(soft_max_chars: usize, hard_max_chars: usize) -> PromptBudgeter {
        PromptBudgeter::from_config(&BudgetConfig {
            soft_max_chars,
            hard_max_chars,
            ..Default::default()
        })
    }

    fn snapshot_with_users(n: usize) -> String {
        let users: Vec<serde_json::Value> = (0..n)
            .map(|i| serde_json::json!({"id": i, "display_name": format!("user number {i}")}))
            .collect();
        serde_json::json!({
            "users": users,
            "schema": {"users": "id, display_name"}
        })
        .to_string()
    }

    #[test]
    fn small_snapshot_is_injected_verbatim() {
        let b = budgeter(100_000, 4_000_000);
        let snapshot = snapshot_with_users(3);
        let (prompt, report) = b.build("list users", &snapshot, QueryIntent::ContextQuery);

        assert_eq!(report.level, BudgetLevel::Full);
        assert!(prompt.contains(&snapshot));
        assert!(prompt.ends_with("list users"));
        assert_eq!(report.injected_data_chars, snapshot.len());
    }

    #[test]
    fn oversized_snapshot_is_summarized() {
        let b = budgeter(200, 4_000_000);
        let snapshot = snapshot_with_users(50);
        let (prompt, report) = b.build("how many users?", &snapshot, QueryIntent::ContextQuery);

        assert_eq!(report.level, BudgetLevel::Summarized);
        assert_eq!(report.tables_summarized, 1);
        assert!(prompt.contains("users: 50 records; example: {"));
        assert!(!prompt.contains("user number 49"));
        assert!(prompt.ends_with("how many users?"));
    }

    fn three_table_snapshot() -> String {
        let big: Vec<serde_json::Value> = (0..1000)
            .map(|i| {
                serde_json::json!({
                    "id": i, "title": format!("topic title number {i}"),
                    "a": 1, "b": 2, "c": 3, "d": 4, "e": 5
                })
            })
            .collect();
        serde_json::json!({
            "big": big,
            "empty": [],
            "single": [{"id": 7, "name": "only row"}],
        })
        .to_string()
    }

    #[test]
    fn mixed_tables_fit_under_default_ceiling() {
        let b = budgeter(100_000, 4_000_000);
        let snapshot = three_table_snapshot();
        assert!(snapshot.len() < 100_000);

        let (prompt, report) = b.build("list topics", &snapshot, QueryIntent::ContextQuery);
        assert_eq!(report.level, BudgetLevel::Full);
        assert!(prompt.contains("topic title number 0"));
        assert!(prompt.contains("topic title number 999"));
    }

    #[test]
    fn low_ceiling_collapses_large_table_to_count_and_sample() {
        let b = budgeter(1_000, 4_000_000);
        let snapshot = three_table_snapshot();
        let (full_prompt, _) =
            budgeter(usize::MAX, usize::MAX).build("list topics", &snapshot, QueryIntent::ContextQuery);

        let (prompt, report) = b.build("list topics", &snapshot, QueryIntent::ContextQuery);
        assert_eq!(report.level, BudgetLevel::Summarized);
        assert_eq!(report.tables_summarized, 3);
        assert!(prompt.len() < full_prompt.len());
        assert!(prompt.contains("empty: 0 records\n"));
        assert!(prompt.contains("single: 1 records; example: {id: 7, name: only row}"));

        let line = prompt
            .lines()
            .find(|l| l.starts_with("big: 1000 records; example: {"))
            .expect("summary line for big table");
        let sample = line.split("example: ").nth(1).unwrap();
        assert_eq!(sample.matches(": ").count(), 5);
        assert!(!prompt.contains("topic title number 1"));
        assert!(prompt.ends_with("list topics"));
    }

    #[test]
    fn unparseable_snapshot_over_soft_ceiling_is_marked_unavailable() {
        let b = budgeter(4, 4_000_000);
        let (prompt, report) = b.build("hi", "not json at all", QueryIntent::Greeting);
        assert_eq!(report.level, BudgetLevel::Summarized);
        assert!(prompt.contains("(snapshot unavailable)"));
    }

    #[test]
    fn huge_query_falls_back_to_minimal() {
        let b = budgeter(100_000, 10_000);
        let query = "x".repeat(50_000);
        let (prompt, report) = b.build(&query, "{}", QueryIntent::GenericQuery);

        assert_eq!(report.level, BudgetLevel::Minimal);
        assert!(report.query_truncated);
        assert!(prompt.len() <= 10_000);
        assert!(prompt.ends_with(&format!("{}…", "x".repeat(100))));
    }

    #[test]
    fn multi_megabyte_query_under_default_ceilings() {
        let cfg = BudgetConfig::default();
        let b = PromptBudgeter::from_config(&cfg);
        let query = "q".repeat(cfg.hard_max_chars + 1);
        let (prompt, report) = b.build(&query, "{}", QueryIntent::GenericQuery);

        assert_eq!(report.level, BudgetLevel::Minimal);
        assert!(report.query_truncated);
        assert!(prompt.len() <= cfg.hard_max_chars);
        assert_eq!(report.total_chars, prompt.len());
        assert!(prompt.contains("=== SCHEMA ==="));
        assert!(prompt.ends_with(&format!("\n{}…", "q".repeat(cfg.minimal_query_chars))));
    }

    #[test]
    fn ceiling_below_schema_sends_question_alone() {
        let b = budgeter(100, 200);
        let (prompt, report) = b.build(&"x".repeat(5_000), "{}", QueryIntent::GenericQuery);

        assert_eq!(report.level, BudgetLevel::Minimal);
        assert!(report.query_truncated);
        assert!(prompt.len() <= 200, "prompt is {} bytes", prompt.len());
        assert_eq!(report.total_chars, prompt.len());
        assert!(prompt.starts_with(injection::QUESTION_HEADER));
        assert!(prompt.ends_with("x…"));
    }

    #[test]
    fn style_hint_follows_intent() {
        let b = budgeter(100_000, 4_000_000);
        let (graph, _) = b.build("chart of purchases", "{}", QueryIntent::GraphQuery);
        let (generic, _) = b.build("why", "{}", QueryIntent::GenericQuery);
        assert!(graph.contains("label/value"));
        assert!(!generic.contains("label/value"));
    }

    #[test]
    fn schema_lists_every_table() {
        let schema = static_schema();
        for table in TrackedTable::ALL {
            assert!(schema.contains(&format!("- {}(", table.name())));
        }
        assert!(schema.contains("submissions.task_id -> tasks.id"));
    }
}
