//! `ragdock ask`: One-shot grounded answer.

use ragdock_config::AppConfig;

pub async fn run(
    config: AppConfig,
    question: String,
    top_k: Option<i64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let service = ragdock_gateway::build_service(&config).await?;

    eprint!("  Thinking...");
    let answer = service.query(&question, top_k).await;
    eprint!("\r              \r");
    let answer = answer?;

    println!("{}", answer.answer);
    if !answer.context.is_empty() {
        println!();
        println!("Context ({} passage(s)):", answer.context.len());
        for passage in &answer.context {
            let preview: String = passage.chars().take(120).collect();
            println!("  - {}", preview.replace('\n', " "));
        }
    }
    Ok(())
}
