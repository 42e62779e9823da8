//! `learnquery ask`: one question, one answer, then exit.

use std::sync::Arc;

use lq_domain::config::Config;

use crate::bootstrap;

pub async fn run(config: Arc<Config>, question: String, json_output: bool) -> anyhow::Result<()> {
    let state = bootstrap::build_app_state(config).await?;

    // Build the snapshot and check the stub up front; there is no
    // background warm-up in a one-shot command.
    if !state.snapshots.regenerate().await {
        eprintln!("warning: snapshot could not be built, answering without data");
    }
    state.stub.initialize();

    let answer = state.client.answer_detailed(&question).await;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&answer)?);
    } else {
        println!("{}", answer.text);
        match (&answer.endpoint, &answer.model) {
            (Some(endpoint), Some(model)) => {
                eprintln!("\x1b[2m[{} via {model} at {endpoint}]\x1b[0m", answer.tier.as_str());
            }
            _ => eprintln!("\x1b[2m[{}]\x1b[0m", answer.tier.as_str()),
        }
    }
    Ok(())
}
