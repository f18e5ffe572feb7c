use clap::Parser;
use lauflisten_map::config::cli::OutputKind;
use lauflisten_map::config::CliConfig;
use lauflisten_map::utils::error::ErrorSeverity;
use lauflisten_map::utils::{logger, validation::Validate};
use lauflisten_map::{
    JsonFileSource, MapConfig, MapError, MapSession, RecordingSurface, TracingNotifier,
};
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 驗證參數與地圖配置
    let map_config = match load_config(&cli) {
        Ok(map_config) => map_config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    // 初始化日誌
    if map_config.json_logs() {
        logger::init_json_logger(map_config.log_level());
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting lauflisten-map CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    match run(&cli, map_config).await {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Err(e) => {
            tracing::error!(
                "❌ Map run failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn load_config(cli: &CliConfig) -> lauflisten_map::Result<MapConfig> {
    cli.validate()?;
    let map_config = match &cli.config {
        Some(path) => MapConfig::from_file(path)?,
        None => MapConfig::default(),
    };
    map_config.validate()?;
    Ok(map_config)
}

async fn run(cli: &CliConfig, map_config: MapConfig) -> Result<serde_json::Value, MapError> {
    let source = JsonFileSource::new(&cli.addresses, cli.lists.as_ref().map(PathBuf::from));
    let mut session = MapSession::new(map_config, RecordingSurface::new(), TracingNotifier);

    session.reload(&source).await?;
    tracing::info!("📍 Loaded {} addresses", session.store().len());

    session.set_sidebar_visible(cli.sidebar);
    session.set_filter(cli.filter_state());

    if !cli.focus.is_empty() {
        let transition = session.select_lists(&source, cli.focus.clone()).await?;
        tracing::info!(
            "🎯 Focus {:?}: {} addresses",
            transition,
            session.focus_state().resolved_address_ids.len()
        );
    }

    let selection = match cli.polygon_ring()? {
        Some(ring) => {
            session.toggle_draw()?;
            for vertex in ring {
                session.add_polygon_vertex(vertex)?;
            }
            let selection = session.close_polygon()?;
            tracing::info!("✏️ Polygon selected {} addresses", selection.len());
            selection
        }
        None => Vec::new(),
    };

    let output = match cli.output {
        OutputKind::Markers => serde_json::to_value(session.markers())?,
        OutputKind::Selection => serde_json::to_value(&selection)?,
        OutputKind::Summary => serde_json::to_value(session.status_summary())?,
        OutputKind::Options => serde_json::to_value(session.filter_options())?,
        OutputKind::Commands => {
            let surface = session.dispose();
            serde_json::to_value(surface.as_ref().map(RecordingSurface::commands))?
        }
    };
    Ok(output)
}
