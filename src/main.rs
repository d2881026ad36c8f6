//! shipx CLI
//!
//! `shipx <request.json> [carrier-id ...]` dispatches a unified request to the
//! configured carrier accounts and prints the outcome as JSON.

use shipx::config::{log_configuration, log_service_info, log_startup_complete};
use shipx::{ShipxBuilder, UnifiedRequest};

const USAGE: &str = "usage: shipx <request.json> [carrier-id ...]";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	// Load .env file if it exists
	dotenvy::dotenv().ok();

	let mut args = std::env::args().skip(1);
	let request_path = args.next().ok_or(USAGE)?;
	let carrier_ids: Vec<String> = args.collect();

	let builder = ShipxBuilder::from_config()?;
	builder.init_tracing()?;
	log_service_info();
	if let Some(settings) = builder.settings() {
		log_configuration(settings);
	}

	let shipx = builder.build()?;
	let registered: Vec<String> = shipx
		.registry()
		.list_all()
		.iter()
		.map(|metadata| metadata.id.to_string())
		.collect();
	log_startup_complete(&registered);

	let contents = std::fs::read_to_string(&request_path)
		.map_err(|e| format!("Failed to read {}: {}", request_path, e))?;
	let request: UnifiedRequest = serde_json::from_str(&contents)
		.map_err(|e| format!("Invalid request in {}: {}", request_path, e))?;

	let outcome = if carrier_ids.is_empty() {
		shipx.dispatch(request).await?
	} else {
		let ids: Vec<&str> = carrier_ids.iter().map(String::as_str).collect();
		shipx.dispatch_to(request, &ids).await?
	};

	println!("{}", serde_json::to_string_pretty(&outcome.sorted())?);
	Ok(())
}
