//! Startup logging for the shipx CLI

use std::env;

use tracing::info;

use crate::settings::Settings;

/// Logs service and environment information at startup
pub fn log_service_info() {
	info!("=== shipx starting ===");
	info!("🚚 Version: {}", env!("CARGO_PKG_VERSION"));
	info!("💻 Platform: {} ({})", env::consts::OS, env::consts::ARCH);

	if let Ok(cwd) = env::current_dir() {
		info!("📁 Working Directory: {}", cwd.display());
	}
	if let Ok(rust_log) = env::var("RUST_LOG") {
		info!("🔧 Log Level: {}", rust_log);
	}
	info!(
		"🕒 Started at: {}",
		chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
	);
}

/// Logs dispatch limits and the configured accounts, never option values
pub fn log_configuration(settings: &Settings) {
	let dispatch = &settings.dispatch;
	info!(
		"⏱️ Batch deadline {}ms, per-carrier timeout {}ms, request timeout {}ms, {} retries",
		dispatch.batch_deadline_ms,
		dispatch.per_carrier_timeout_ms,
		dispatch.request_timeout_ms,
		dispatch.retry.max_retries
	);

	for (name, account) in &settings.carriers {
		let options: Vec<String> = account
			.options
			.iter()
			.map(|(option, value)| format!("{} from {}", option, value.description()))
			.collect();
		info!(
			"📦 Account {} → {}/{} [{}] {}{}",
			name,
			account.carrier_id,
			account.account_id(name),
			account.environment,
			if account.enabled { "" } else { "(disabled) " },
			options.join(", ")
		);
	}
}

/// Logs the carriers that made it into the registry
pub fn log_startup_complete(carrier_ids: &[String]) {
	info!(
		"✅ shipx ready with {} carrier(s): {}",
		carrier_ids.len(),
		carrier_ids.join(", ")
	);
}
