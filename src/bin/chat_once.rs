use anyhow::Result;
use car_chat_svc::app::build_assistant;
use car_chat_svc::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let message = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if message.trim().is_empty() {
        eprintln!("Usage: chat-once <message>");
        eprintln!("Example: chat-once \"Looking for a Honda under 500 million\"");
        std::process::exit(2);
    }

    let config = Config::from_env()?;
    println!("🤖 Running chat assistant");
    println!("Models: {:?}", config.model_candidates);
    println!("Listings file: {:?}", config.listings_file);
    println!("Message: {}", message);

    let assistant = build_assistant(&config)?;
    match assistant.handle(&message).await {
        Ok(response) => {
            println!("✅ Intent: {:?}", response.intent);
            println!("✅ Matched cars: {}", response.matched_cars);
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Err(e) => {
            println!("❌ Chat failed: {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
