use logprob_lens::{format_columns, Client, LensSession};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> logprob_lens::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let prompt = std::env::args()
        .skip(1)
        .collect::<Vec<_>>()
        .join(" ");
    let prompt = if prompt.is_empty() {
        "Name a primary color.".to_string()
    } else {
        prompt
    };

    let client = Client::from_env()?;
    let mut session = LensSession::new("gpt-4o-mini")
        .with_prompt(prompt)
        .with_temperature(1.0)
        .with_top_logprobs(5);
    let columns = session.run(&client).await?;
    print!("{}", format_columns(columns));
    Ok(())
}
